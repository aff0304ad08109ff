//! Server mode
//!
//! This module contains the HTTP server startup logic.

use actix_web::{App, HttpServer, web};
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::api::middleware::{DatabaseDetails, RequestSpan};
use crate::api::services::lookup_routes;
use crate::config::try_get_config;
use crate::runtime::lifetime;

/// Run the HTTP server
///
/// This function:
/// 1. Prepares server components (database, cache, lookup service)
/// 2. Starts the database reload listener (Unix only)
/// 3. Configures and starts the HTTP server
/// 4. Stops on Ctrl+C
///
/// **Note**: Configuration and logging must be initialized before calling
/// this function
pub async fn run_server() -> Result<()> {
    let config = try_get_config().context("Config not initialized")?;

    let startup = lifetime::startup::prepare_server_startup(&config)
        .await
        .inspect_err(|e| tracing::error!("Server startup failed: {}", e))?;

    #[cfg(unix)]
    {
        tokio::spawn(startup.reloader().listen_for_reload());
        info!("Send SIGHUP to reload the GeoIP database");
    }

    let lookup_service = startup.lookup_service.clone();
    let metadata = startup.metadata.clone();

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(DatabaseDetails::new(metadata.clone()))
            .wrap(RequestSpan) // 最外层，request span 覆盖整个请求
            .app_data(web::Data::new(lookup_service.clone()))
            .service(lookup_routes())
    })
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_millis(5000))
    .client_disconnect_timeout(Duration::from_millis(1000))
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run();

    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown() => {
            warn!("Graceful shutdown complete");
        }
    }

    Ok(())
}
