//! # ClauseMatch API
//!
//! HTTP surface of the template matcher: the positional
//! `/find_similar_templates/` endpoint older clients call, the explained
//! `/templates/match` endpoint, and catalog inspection and reload.

pub mod rest;

pub use rest::{configure, error_response, AppState, RestApi, ServerConfig};
