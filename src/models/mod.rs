//! Data models for the TradeStation API.
//!
//! Endpoint payloads are passed through as the caller's own types (or
//! `serde_json::Value`); this module only holds the types the client itself
//! needs.

pub mod primitives;

pub use primitives::*;
