//! Application lifecycle and execution modes
//!
//! - `lifetime`: startup wiring, database reload, shutdown
//! - `modes`: HTTP server and one-shot CLI commands

pub mod lifetime;
pub mod modes;
