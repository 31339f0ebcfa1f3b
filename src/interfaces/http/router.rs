//! API Router with Swagger UI

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, options, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{AccountService, CepService};
use crate::domain::{AccessToken, Address};
use crate::interfaces::http::middleware::{auth_middleware, AuthState};
use crate::shared::{ApiResponse, Notice, NoticeCode};

use super::modules::{cep, config, graphql, health, metrics, request_id, security};

/// Everything the HTTP surface needs, built once at startup
#[derive(Clone)]
pub struct ApiContext {
    pub accounts: Arc<AccountService>,
    pub ceps: Arc<CepService>,
    pub db: DatabaseConnection,
    pub auth: AuthState,
    pub metrics: PrometheusHandle,
    pub api_version: String,
    pub api_description: String,
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token obtido em /security/authentication"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        security::handlers::create,
        security::handlers::authentication,
        security::handlers::activate,
        cep::handlers::get_cep,
        config::handlers::options,
        health::handlers::health_check,
    ),
    components(
        schemas(
            ApiResponse<AccessToken>,
            ApiResponse<Address>,
            ApiResponse<String>,
            AccessToken,
            Address,
            Notice,
            NoticeCode,
            security::dto::CreateRequest,
            security::dto::LoginRequest,
            security::dto::ActivateUserRequest,
            health::handlers::HealthReport,
            health::handlers::HealthCheckEntry,
            health::handlers::HealthStatus,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Security", description = "Cadastro, autenticação e ativação de usuários"),
        (name = "CEP", description = "Consulta de endereços por CEP"),
        (name = "Config", description = "Configuração da aplicação"),
        (name = "Health", description = "Estado da aplicação e dependências"),
    ),
    info(title = "TOOLS.API", version = "v1")
)]
pub struct ApiDoc;

/// OpenAPI document with title and version taken from configuration
pub fn openapi_document(api_version: &str, api_description: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = format!("{} - {}", api_description, api_version);
    doc.info.version = api_version.to_string();
    doc
}

/// Create the API router
pub fn create_api_router(ctx: ApiContext) -> Router {
    let security_routes = Router::new()
        .route("/create", post(security::handlers::create))
        .route("/authentication", post(security::handlers::authentication))
        .route("/activate", post(security::handlers::activate))
        .with_state(security::handlers::SecurityState {
            accounts: ctx.accounts.clone(),
        });

    // CEP routes (protected)
    let cep_routes = Router::new()
        .route("/", get(cep::handlers::get_cep))
        .layer(middleware::from_fn_with_state(
            ctx.auth.clone(),
            auth_middleware,
        ))
        .with_state(cep::handlers::CepState {
            ceps: ctx.ceps.clone(),
        });

    let health_routes = Router::new()
        .route("/healthcheck", get(health::handlers::health_check))
        .with_state(health::handlers::HealthState { db: ctx.db.clone() });

    let graphql_routes = Router::new()
        .route(
            "/",
            get(graphql::handlers::graphiql).post(graphql::handlers::graphql_handler),
        )
        .with_state(graphql::create_schema(ctx.ceps.clone()));

    let metrics_routes = Router::new()
        .route("/", get(metrics::prometheus_metrics))
        .with_state(metrics::MetricsState {
            handle: ctx.metrics.clone(),
        });

    let doc_url = format!("/api-docs/{}/swagger.json", ctx.api_version);
    let swagger_routes = SwaggerUi::new("/swagger").url(
        doc_url,
        openapi_document(&ctx.api_version, &ctx.api_description),
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(swagger_routes)
        .nest("/security", security_routes)
        .nest("/api/cep", cep_routes)
        .route("/api/config/options", options(config::handlers::options))
        .nest("/application", health_routes)
        .nest("/graphql", graphql_routes)
        .nest("/metrics", metrics_routes)
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
