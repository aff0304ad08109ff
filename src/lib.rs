//! ipgeo - IP geolocation lookup service
//!
//! Resolves an IP address or hostname to its location using a local
//! MaxMind GeoIP2/GeoLite2 City database, with an adaptive replacement
//! cache in front of the database.
//!
//! # Architecture
//! - `cache`: ARC result cache
//! - `services`: lookup pipeline (normalizer, bogon filter, backend, shaper)
//! - `api`: HTTP handlers and middleware
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging setup

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod runtime;
pub mod services;
pub mod system;
pub mod utils;
