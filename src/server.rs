//! Server runtime.
//!
//! [`ServerHandle`] owns the whole lifecycle: metrics recorder, database and
//! migrations, service wiring, the HTTP listener and graceful shutdown.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};

use crate::application::{AccountService, CepService};
use crate::config::AppConfig;
use crate::domain::NotificationSender;
use crate::infrastructure::crypto::JwtTokenIssuer;
use crate::infrastructure::{
    init_database, run_migrations, LoggingNotificationSender, SeaOrmCepRepository,
    SeaOrmCredentialStore, SmtpNotificationSender, ViaCepGateway,
};
use crate::interfaces::http::middleware::AuthState;
use crate::interfaces::http::{create_api_router, ApiContext};
use crate::shared::{ShutdownCoordinator, ShutdownSignal, SystemClock};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Options for starting the server.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Overrides `database.run_migrations` when set.
    pub auto_migrate: Option<bool>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: None,
        }
    }
}

/// Handle to a running server.
///
/// ```rust,no_run
/// use tools_api::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), tools_api::server::BoxError> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.shutdown_signal().wait().await;
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub config: AppConfig,
    /// Bound address; the port differs from the config when it was 0.
    pub local_addr: SocketAddr,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, BoxError> {
        let app_cfg = opts.config;
        app_cfg.validate()?;

        info!("Starting TOOLS.API...");

        let prometheus_handle = prometheus_handle();

        let db = init_database(&app_cfg.database_config()).await?;
        if opts.auto_migrate.unwrap_or(app_cfg.database.run_migrations) {
            run_migrations(&db).await?;
        } else {
            info!("Skipping database migrations");
        }

        let ctx = build_context(&app_cfg, db.clone(), prometheus_handle)?;
        let api_router = create_api_router(ctx);

        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        let listener = tokio::net::TcpListener::bind(app_cfg.server.address()).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API server listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/swagger/", local_addr);
        info!("GraphQL available at http://{}/graphql", local_addr);

        let api_server = axum::serve(listener, api_router).with_graceful_shutdown(async move {
            shutdown_signal.wait().await;
            info!("REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            config: app_cfg,
            local_addr,
            db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Trigger shutdown on SIGTERM / SIGINT.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the listener to drain (bounded by `server.shutdown_timeout`),
    /// then close the database.
    pub async fn wait(self) {
        let Self {
            db,
            shutdown,
            api_task,
            ..
        } = self;

        info!("Waiting for in-flight requests...");
        let drained = shutdown
            .cleanup(async move {
                if let Err(e) = api_task.await {
                    error!("REST API server task panicked: {}", e);
                }
            })
            .await;
        if !drained {
            warn!("Forcing shutdown with requests still in flight");
        }

        if let Err(e) = db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("Database connection closed");
        }

        info!("TOOLS.API shutdown complete");
    }

    pub async fn shutdown(self) {
        info!("Shutting down TOOLS.API...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// The global recorder can only be installed once per process.
fn prometheus_handle() -> PrometheusHandle {
    static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

    PROM_HANDLE
        .get_or_init(|| {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .expect("Failed to install Prometheus metrics recorder");
            info!("Prometheus metrics recorder installed");
            handle
        })
        .clone()
}

/// Wire stores, senders and services from configuration.
pub fn build_context(
    app_cfg: &AppConfig,
    db: DatabaseConnection,
    metrics: PrometheusHandle,
) -> Result<ApiContext, BoxError> {
    let clock = Arc::new(SystemClock);
    let key = app_cfg.signing_key()?;

    let store = Arc::new(SeaOrmCredentialStore::new(
        db.clone(),
        app_cfg.identity_settings(),
        clock.clone(),
    ));

    let sender: Arc<dyn NotificationSender> = if app_cfg.email.enabled {
        Arc::new(SmtpNotificationSender::new(&app_cfg.smtp_settings())?)
    } else {
        warn!("E-mail delivery disabled; activation links are only logged");
        Arc::new(LoggingNotificationSender::new(
            app_cfg.email.activation_url.clone(),
        ))
    };

    let issuer = Arc::new(JwtTokenIssuer::new(key.clone(), clock.clone()));
    info!(
        issuer = %app_cfg.auth.valid_issuer,
        audience = %app_cfg.auth.valid_audience,
        "JWT configured with {}min token lifetime",
        app_cfg.auth.expires_in_minutes
    );

    let accounts = Arc::new(AccountService::new(
        store,
        sender,
        issuer,
        app_cfg.token_settings(),
    ));

    let gateway = Arc::new(ViaCepGateway::new(
        app_cfg.cep.base_url.clone(),
        app_cfg.cep.timeout(),
    )?);
    let ceps = Arc::new(CepService::new(
        Arc::new(SeaOrmCepRepository::new(db.clone(), clock)),
        gateway,
    ));

    Ok(ApiContext {
        accounts,
        ceps,
        db,
        auth: AuthState {
            key,
            issuer: app_cfg.auth.valid_issuer.clone(),
            audience: app_cfg.auth.valid_audience.clone(),
        },
        metrics,
        api_version: app_cfg.swagger.api_version.clone(),
        api_description: app_cfg.swagger.api_description.clone(),
    })
}

/// Install the tracing subscriber. `RUST_LOG` wins over the configured level.
///
/// Call once at process startup, before [`ServerHandle::start`].
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.server.host = "127.0.0.1".into();
        config.server.port = 0;
        config.server.shutdown_timeout = 5;
        config.database.url = "sqlite::memory:".into();
        config
    }

    #[tokio::test]
    async fn invalid_config_refuses_to_start() {
        let mut config = test_config();
        config.auth.security_key = "short".into();

        let result = ServerHandle::start(ServerOptions {
            config,
            auto_migrate: None,
        })
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn serves_until_shutdown() {
        let handle = ServerHandle::start(ServerOptions {
            config: test_config(),
            auto_migrate: None,
        })
        .await
        .unwrap();
        assert_ne!(handle.local_addr.port(), 0);
        assert!(handle.is_running());

        let url = format!("http://{}/application/healthcheck", handle.local_addr);
        let response = reqwest::get(&url).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let signal = handle.shutdown_signal();
        handle.shutdown().await;
        assert!(signal.is_triggered());
    }

    #[tokio::test]
    async fn smtp_sender_is_used_when_enabled() {
        let mut config = test_config();
        config.email.enabled = true;
        config.email.from = "not a mailbox".into();

        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        let metrics = PrometheusBuilder::new().build_recorder().handle();
        assert!(build_context(&config, db, metrics).is_err());
    }
}
