//! Database metadata snapshot
//!
//! Every request reads it (for the `X-Maxmind-*` headers); a reload swaps
//! in a whole new record. Readers get an `Arc` to an immutable snapshot and
//! never wait on the writer.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tracing::info;

use crate::models::DatabaseMetadata;

#[derive(Default)]
pub struct MetadataGuard {
    current: ArcSwapOption<DatabaseMetadata>,
}

impl MetadataGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` until the first database has been loaded.
    pub fn current(&self) -> Option<Arc<DatabaseMetadata>> {
        self.current.load_full()
    }

    pub fn replace(&self, metadata: DatabaseMetadata) {
        info!(
            "Database metadata replaced: type={}, build={}",
            metadata.database_type,
            metadata.build_header()
        );
        self.current.store(Some(Arc::new(metadata)));
    }
}
