use anyhow::{Context, Result};
use clap::Parser;

use ipgeo::cli::{Cli, Commands};
use ipgeo::config::{StaticConfig, init_config};
use ipgeo::runtime::modes;
use ipgeo::system::init_logging;

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Some(Commands::GenerateConfig { output_path }) = &cli.command {
        return modes::run_generate_config(output_path.as_deref());
    }

    let mut config =
        StaticConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);
    config
        .validate()
        .context("Invalid configuration after command-line overrides")?;

    // 单次查询时结果写在 stdout，只保留警告以上的日志
    if matches!(cli.command, Some(Commands::Lookup { .. })) {
        config.logging.level = "warn".to_string();
    }

    let config = init_config(config);
    let _guard = init_logging(&config.logging)?;

    match cli.command {
        None | Some(Commands::Serve) => modes::run_server().await,
        Some(Commands::Lookup {
            addr,
            pretty,
            filter,
        }) => modes::run_lookup(&config, &addr, pretty, filter.as_deref()).await,
        Some(Commands::GenerateConfig { .. }) => Ok(()),
    }
}
