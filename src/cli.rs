//! Command-line interface definitions using clap
//!
//! Global flags override values from the config file and environment.

use clap::{Parser, Subcommand};

use crate::config::StaticConfig;

/// ipgeo - IP geolocation lookup service
#[derive(Parser, Debug)]
#[command(name = "ipgeo")]
#[command(version)]
#[command(about = "IP geolocation lookup service backed by a MaxMind database", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    /// Listen address
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Listen port
    #[arg(long, short = 'p', global = true)]
    pub port: Option<u16>,

    /// Path to the GeoIP2/GeoLite2 City database
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Maximum number of cached lookups
    #[arg(long, global = true)]
    pub cache_size: Option<usize>,

    /// Send private and reserved addresses to the database instead of
    /// rejecting them
    #[arg(long, global = true)]
    pub no_bogon_filter: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Look up a single address and print the result
    Lookup {
        /// IP address or hostname
        addr: String,

        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,

        /// Comma-separated fields to print, joined by '|'
        #[arg(long, short = 'f')]
        filter: Option<String>,
    },

    /// Generate a sample configuration file
    GenerateConfig {
        /// Output path (default: stdout)
        output_path: Option<String>,
    },
}

impl Cli {
    /// Apply command-line overrides on top of a loaded configuration.
    pub fn apply_overrides(&self, config: &mut StaticConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(db) = &self.db {
            config.database.path = db.clone();
        }
        if let Some(size) = self.cache_size {
            config.cache.capacity = size;
        }
        if self.no_bogon_filter {
            config.lookup.filter_bogons = false;
        }
    }
}
