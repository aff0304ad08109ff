//! System-level modules
//!
//! Process concerns that sit outside the lookup pipeline.

pub mod logging;

pub use logging::init_logging;
