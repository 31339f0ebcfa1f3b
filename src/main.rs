//! TOOLS.API server
//!
//! ```sh
//! # Run with default config (~/.config/tools-api/config.toml)
//! tools-api
//!
//! # Custom config path and port
//! tools-api --config /etc/tools-api/config.toml --port 8080
//!
//! # Validate config without starting
//! tools-api --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info, warn};

use tools_api::config::{resolve_config_path, AppConfig};
use tools_api::server::{init_tracing, BoxError, ServerHandle, ServerOptions};

/// Account registration, JWT authentication and CEP lookup API.
#[derive(Parser, Debug)]
#[command(
    name = "tools-api",
    version,
    about = "Account registration, JWT authentication and CEP lookup API",
    long_about = "TOOLS.API: REST + GraphQL server for account registration, \
                  e-mail activation, JWT authentication and Brazilian postal code lookup.\n\n\
                  Default config: ~/.config/tools-api/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "TOOLS_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();

    let config_path = resolve_config_path(cli.config);
    let loaded = AppConfig::load_optional(&config_path)?;
    let found = loaded.is_some();
    let mut config = loaded.unwrap_or_default();

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);
    if found {
        info!("Configuration loaded from {}", config_path.display());
    } else {
        warn!(path = %config_path.display(), "Config file not found, using defaults");
    }

    if let Some(port) = cli.port {
        info!("CLI override: port = {}", port);
        config.server.port = port;
    }

    if cli.check {
        if let Err(e) = config.validate() {
            error!("{}", e);
            return Err(e.into());
        }
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Address     : {}", config.server.address());
        println!("   Database    : {}", config.database.url);
        println!("   E-mail      : {}", if config.email.enabled { "smtp" } else { "log only" });
        println!("   CEP source  : {}", config.cep.base_url);
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: cli.skip_migrations.then_some(false),
    })
    .await?;

    handle.install_signal_handler();
    info!("Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
