//! Integration tests for Modelgate API endpoints

mod health;
mod models;
mod streaming;
