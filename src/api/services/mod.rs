pub mod lookup;

pub use lookup::{LookupHandler, lookup_routes};
