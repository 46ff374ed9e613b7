//! Cupos Lookup API Library
//!
//! Looks up a customer by identifier in the contracts dataset and returns a filtered,
//! aggregated and adaptively shaped view of that customer's records.
//!
//! # Modules
//!
//! - `core`: Lookup pipeline (normalize, lookup, aggregate, planner, report).
//! - `data`: Dataset loading and caching.
//! - `api`: HTTP handlers.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `models`: Records, columns and the loaded table.

pub mod api;
pub mod core;
pub mod data;

pub mod aggregate;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod loader;
pub mod lookup;
pub mod models;
pub mod normalize;
pub mod planner;
pub mod report;
pub mod table_cache;
