//! Service layer
//!
//! Lookup pipeline pieces shared by the HTTP handlers and the CLI.

pub mod bogon;
pub mod geoip;
mod lookup;
mod metadata;
pub mod normalizer;
pub mod shaper;

pub use bogon::{BogonFilter, BogonOracle, ReservedRanges};
pub use geoip::{GeoBackend, MaxMindBackend};
pub use lookup::{LookupOutcome, LookupService};
pub use metadata::MetadataGuard;
pub use normalizer::{HostResolver, QueryNormalizer, SystemHostResolver};
pub use shaper::ResponseShape;
