//! Ticker index models and schema helpers for stock-mcp.
//!
//! This crate defines the canonical data model shared by the index
//! client, the seeding path, and the MCP resource surface.

pub mod embedding;
pub mod models;
pub mod schema;

pub use models::*;
