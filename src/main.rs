mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

use fluidbean::{config, server};
use fluidbean_engine::pool::init_pool;

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting fluidbean server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    if config.auth.username.is_none() {
        tracing::warn!("No [auth] credentials configured; login will answer 503");
    }

    tracing::info!("Initializing database at {}", config.database.path);
    let db_pool = init_pool(&config.database.path)?;

    server::start_server(config, db_pool).await
}

fn validate_config(config_path: Option<&std::path::Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    println!("Configuration OK");
    println!("  server: {}:{}", config.server.host, config.server.port);
    println!(
        "  auth: {}",
        if config.auth.username.is_some() {
            "configured"
        } else {
            "not configured"
        }
    );
    println!("  database: {}", config.database.path);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "fluidbean=trace,fluidbean_engine=debug,fluidbean_record=debug,tower_http=debug"
                .to_string()
        } else {
            "fluidbean=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("fluidbean {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
