//! Mode routing
//!
//! - Server mode (HTTP server, default)
//! - CLI mode (one-shot lookup, sample config generation)

pub mod cli;
pub mod server;

pub use cli::{run_generate_config, run_lookup};
pub use server::run_server;
