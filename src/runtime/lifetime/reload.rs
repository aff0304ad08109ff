//! Database reload
//!
//! Re-opens the database file in place. In-flight lookups keep the reader
//! they started with; the metadata snapshot is replaced only after the new
//! file opened successfully.

use std::sync::Arc;
use tracing::{error, info};

use crate::errors::{GeoError, Result};
use crate::models::DatabaseMetadata;
use crate::services::{LookupService, MaxMindBackend, MetadataGuard};

#[derive(Clone)]
pub struct DatabaseReloader {
    backend: Arc<MaxMindBackend>,
    metadata: Arc<MetadataGuard>,
    lookup_service: Arc<LookupService>,
    invalidate_cache: bool,
}

impl DatabaseReloader {
    pub fn new(
        backend: Arc<MaxMindBackend>,
        metadata: Arc<MetadataGuard>,
        lookup_service: Arc<LookupService>,
        invalidate_cache: bool,
    ) -> Self {
        Self {
            backend,
            metadata,
            lookup_service,
            invalidate_cache,
        }
    }

    /// Reload once. On failure the previous database and metadata stay.
    pub async fn reload(&self) -> Result<DatabaseMetadata> {
        let backend = self.backend.clone();
        let loaded = tokio::task::spawn_blocking(move || backend.load())
            .await
            .map_err(|e| GeoError::database_load(format!("reload task failed: {}", e)))??;

        self.metadata.replace(loaded.clone());
        if self.invalidate_cache {
            self.lookup_service.invalidate_cache().await;
        }

        info!(
            "GeoIP database reloaded from {}",
            self.backend.path().display()
        );
        Ok(loaded)
    }

    /// Reload on every `SIGHUP` until the process exits.
    #[cfg(unix)]
    pub async fn listen_for_reload(self) {
        use tokio::signal::unix::{SignalKind, signal};

        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(stream) => stream,
            Err(e) => {
                error!("Failed to install SIGHUP handler, reload disabled: {}", e);
                return;
            }
        };

        while hangup.recv().await.is_some() {
            info!("SIGHUP received, reloading GeoIP database");
            if let Err(e) = self.reload().await {
                error!("Database reload failed, keeping previous database: {}", e);
            }
        }
    }
}
