//! Export the management API OpenAPI document
//!
//! Usage: cargo run --bin export_openapi
//!
//! Writes docs/openapi.json.

use modelgate::docs::ApiDoc;
use std::fs;
use utoipa::OpenApi;

fn main() -> anyhow::Result<()> {
    let json = ApiDoc::openapi().to_pretty_json()?;

    fs::create_dir_all("docs")?;
    fs::write("docs/openapi.json", json)?;
    println!("Exported OpenAPI spec to docs/openapi.json");
    Ok(())
}
