use std::env;
use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::connect_info::ConnectInfo,
    extract::DefaultBodyLimit,
    extract::State,
    http::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    http::Method,
    http::Request,
    middleware,
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use clap::Parser;
use dotenvy::dotenv;
use governor::{
    clock::DefaultClock, middleware::NoOpMiddleware, state::keyed::DashMapStateStore, Quota,
    RateLimiter,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;

pub mod auth;
pub mod catalog;
pub mod error;
pub mod handlers;

use auth::{AuthConfig, AuthMode};
use catalog::ProjectCatalog;
use error::ApiError;
use handlers::{health, matches, projects};
use hzn_common::api::MatchSettings;
use hzn_common::embedding::{create_encoder, EncoderConfig};
use hzn_common::matching::Recommender;
use hzn_common::{artifacts, logging};

const SHUTDOWN_DRAIN_GRACE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Parser)]
#[command(name = "hzn-api", about = "HTTP API for the Horizon project recommender dashboard")]
struct Cli {
    /// Embedding matrix artifact (JSON, shape N x D)
    #[arg(long, env = "HZN_EMBEDDINGS_PATH", default_value = "models/project_embeddings.json")]
    embeddings_path: PathBuf,

    /// Project id list artifact, row-aligned with the embedding matrix
    #[arg(long, env = "HZN_PROJECT_IDS_PATH", default_value = "models/project_ids.json")]
    project_ids_path: PathBuf,

    /// Encoder selector artifact (single line)
    #[arg(long, env = "HZN_ENCODER_NAME_PATH", default_value = "models/encoder_name.txt")]
    encoder_name_path: PathBuf,

    /// Merged project metadata table for the display join
    #[arg(long, env = "HZN_PROJECT_DATA_PATH", default_value = "data/processed/project_merged.json")]
    project_data_path: PathBuf,

    /// Server port
    #[arg(long, env = "PORT", default_value_t = 3001)]
    port: u16,

    /// API key for X-API-Key authentication
    #[arg(long, env = "HZN_API_KEY")]
    api_key: Option<String>,

    /// Authentication mode: api_key | jwt
    #[arg(long, env = "AUTH_MODE", default_value = "api_key", value_enum)]
    auth_mode: AuthMode,

    /// JWT secret for AUTH_MODE=jwt
    #[arg(long, env = "JWT_SECRET")]
    jwt_secret: Option<String>,

    /// Comma separated list of allowed CORS origins
    #[arg(long, env = "HZN_CORS_ORIGINS", default_value = "http://localhost:3000")]
    cors_origins: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub auth: AuthConfig,
}

impl AppConfig {
    fn from_cli(cli: &Cli) -> Result<Self, ApiError> {
        let cors_origins = cli
            .cors_origins
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect::<Vec<_>>();

        if cors_origins.iter().any(|origin| origin == "*") {
            return Err(ApiError::BadRequest(
                "HZN_CORS_ORIGINS must list explicit origins".into(),
            ));
        }

        let auth = AuthConfig {
            mode: cli.auth_mode,
            api_key: cli.api_key.clone(),
            jwt_secret: cli.jwt_secret.clone(),
        };

        match auth.mode {
            AuthMode::ApiKey if auth.api_key.is_none() => {
                return Err(ApiError::BadRequest(
                    "HZN_API_KEY is required when AUTH_MODE=api_key".into(),
                ));
            }
            AuthMode::Jwt if auth.jwt_secret.is_none() => {
                return Err(ApiError::BadRequest(
                    "JWT_SECRET is required when AUTH_MODE=jwt".into(),
                ));
            }
            _ => {}
        }

        Ok(Self {
            port: cli.port,
            cors_origins,
            auth,
        })
    }

    pub fn for_tests(auth: AuthConfig) -> Self {
        Self {
            port: 3001,
            cors_origins: vec!["http://localhost:3000".into()],
            auth,
        }
    }
}

type IpRateLimiter = RateLimiter<IpAddr, DashMapStateStore<IpAddr>, DefaultClock, NoOpMiddleware>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub per_sec: u64,
    pub burst: u32,
}

impl RateLimitConfig {
    fn from_env() -> Self {
        Self {
            per_sec: env::var("HZN_RATE_LIMIT_PER_SEC")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(20),
            burst: env::var("HZN_RATE_LIMIT_BURST")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(40),
        }
    }
}

fn build_ip_limiter(config: &RateLimitConfig) -> Arc<IpRateLimiter> {
    let nanos_per_token = 1_000_000_000u64 / config.per_sec.max(1);
    let quota = Quota::with_period(Duration::from_nanos(nanos_per_token.max(1)))
        .unwrap()
        .allow_burst(NonZeroU32::new(config.burst.max(1)).unwrap());

    Arc::new(RateLimiter::keyed(quota))
}

pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub catalog: ProjectCatalog,
    pub settings: MatchSettings,
    pub config: AppConfig,
    pub(crate) rate_limiter: Arc<IpRateLimiter>,
    pub readiness: Arc<std::sync::atomic::AtomicBool>,
}

pub type SharedState = Arc<AppState>;

impl axum::extract::FromRef<SharedState> for AuthConfig {
    fn from_ref(input: &SharedState) -> AuthConfig {
        input.config.auth.clone()
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-api-key"),
        ])
        .allow_credentials(true)
}

fn request_ip<B>(req: &Request<B>) -> Option<IpAddr> {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip())
}

async fn global_rate_limit(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(client_ip) = request_ip(&req) {
        if state.rate_limiter.check_key(&client_ip).is_err() {
            return Err(ApiError::TooManyRequests("rate limit exceeded".into()));
        }
    }
    Ok(next.run(req).await)
}

async fn attach_request_id_context(req: Request<Body>, next: Next) -> Result<Response, ApiError> {
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());

    Ok(error::with_request_id(request_id, next.run(req)).await)
}

pub fn create_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    let request_id_header = HeaderName::from_static("x-request-id");
    let trace_header = request_id_header.clone();

    let trace = TraceLayer::new_for_http().make_span_with(move |request: &Request<Body>| {
        let request_id = request
            .headers()
            .get(&trace_header)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");

        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    });

    let api_routes = Router::new()
        .route("/matches", post(matches::find_matches))
        .route("/projects/:project_id", get(projects::get_project));

    Router::new()
        .route("/health", get(health::readyz))
        .route("/livez", get(health::livez))
        .route("/readyz", get(health::readyz))
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            global_rate_limit,
        ))
        .layer(middleware::from_fn(attach_request_id_context))
        .layer(DefaultBodyLimit::max(256 * 1024))
        .layer(trace)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(
            request_id_header,
            MakeRequestUuid::default(),
        ))
        .layer(cors)
        .with_state(state)
}

/// Load the three model artifacts and publish them into a ready recommender.
fn load_recommender(cli: &Cli) -> Result<Recommender, ApiError> {
    let encoder_name = artifacts::read_encoder_name(&cli.encoder_name_path)?;
    let ids = artifacts::read_project_ids(&cli.project_ids_path)?;
    let rows = artifacts::read_embedding_matrix(&cli.embeddings_path)?;

    // The artifact matrix decides the width; the env default only applies
    // to an empty matrix.
    let dimension = rows
        .first()
        .map(|row| row.len())
        .unwrap_or_else(|| hzn_common::embedding::load_config_from_env().dimension);

    let encoder = create_encoder(&encoder_name, EncoderConfig { dimension });
    let recommender = Recommender::new(encoder);
    recommender.load_pretrained(ids, rows)?;

    Ok(recommender)
}

pub async fn run() -> Result<(), ApiError> {
    dotenv().ok();
    logging::init("hzn-api");

    let cli = Cli::parse();
    let config = AppConfig::from_cli(&cli)?;

    let recommender = load_recommender(&cli)?;
    let catalog = ProjectCatalog::load(&cli.project_data_path)?;

    info!(
        indexed_projects = recommender.indexed_projects(),
        catalog_projects = catalog.len(),
        encoder = recommender.encoder().name(),
        encoder_version = recommender.encoder().version(),
        "artifacts loaded"
    );

    let state = Arc::new(AppState {
        recommender: Arc::new(recommender),
        catalog,
        settings: MatchSettings::from_env(),
        config: config.clone(),
        rate_limiter: build_ip_limiter(&RateLimitConfig::from_env()),
        readiness: Arc::new(std::sync::atomic::AtomicBool::new(true)),
    });

    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    let app = create_router(state.clone());

    info!(%addr, auth_mode = ?config.auth.mode, run_id = hzn_common::run_id::get(), "hzn-api listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    let service = app.into_make_service_with_connect_info::<SocketAddr>();

    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal(state.clone()))
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    Ok(())
}

async fn shutdown_signal(state: SharedState) {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
            let _ = sigterm.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    state
        .readiness
        .store(false, std::sync::atomic::Ordering::SeqCst);

    // Lets load balancers observe /readyz as not ready before axum stops
    // accepting connections.
    tokio::time::sleep(SHUTDOWN_DRAIN_GRACE).await;
}

/// Deterministic in-memory state for router tests: a hash encoder trained
/// on three tiny objectives plus a matching metadata catalog.
pub fn test_state(api_key: &str) -> SharedState {
    use hzn_common::Project;

    let encoder = create_encoder("hash", EncoderConfig { dimension: 128 });
    let recommender = Recommender::new(encoder);
    recommender
        .train(
            vec![1, 2, 3],
            &[
                "marine plastic pollution in coastal waters".to_string(),
                "machine learning for medical imaging diagnostics".to_string(),
                "social housing policy across european cities".to_string(),
            ],
        )
        .expect("training on a static corpus succeeds");

    let catalog = ProjectCatalog::from_projects(vec![
        Project {
            project_id: 1,
            acronym: Some("SEACLEAN".into()),
            title: Some("Marine plastic monitoring".into()),
            funding_scheme: Some("HORIZON-RIA".into()),
            total_cost: Some(1_200_000.0),
            ..Project::default()
        },
        Project {
            project_id: 2,
            acronym: Some("MEDIMG".into()),
            title: Some("Imaging diagnostics".into()),
            ..Project::default()
        },
        Project {
            project_id: 3,
            acronym: Some("CITYHOME".into()),
            title: Some("Housing policy lab".into()),
            ..Project::default()
        },
    ]);

    let auth = AuthConfig {
        mode: AuthMode::ApiKey,
        api_key: Some(api_key.to_string()),
        jwt_secret: None,
    };

    Arc::new(AppState {
        recommender: Arc::new(recommender),
        catalog,
        settings: MatchSettings::default(),
        config: AppConfig::for_tests(auth),
        rate_limiter: build_ip_limiter(&RateLimitConfig {
            per_sec: 1_000,
            burst: 1_000,
        }),
        readiness: Arc::new(std::sync::atomic::AtomicBool::new(true)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_GUARD: Mutex<()> = Mutex::new(());

    fn with_envs(vars: &[(&str, Option<&str>)], f: impl FnOnce()) {
        let _guard = ENV_GUARD.lock().unwrap();

        let previous: Vec<(&str, Option<String>)> = vars
            .iter()
            .map(|(var, value)| {
                let old = env::var(var).ok();
                match value {
                    Some(v) => env::set_var(var, v),
                    None => env::remove_var(var),
                }
                (*var, old)
            })
            .collect();

        f();

        for (var, previous_value) in previous {
            match previous_value {
                Some(v) => env::set_var(var, v),
                None => env::remove_var(var),
            }
        }
    }

    #[test]
    fn rate_limit_config_respects_env_overrides() {
        with_envs(
            &[
                ("HZN_RATE_LIMIT_PER_SEC", Some("5")),
                ("HZN_RATE_LIMIT_BURST", Some("9")),
            ],
            || {
                let cfg = RateLimitConfig::from_env();
                assert_eq!(
                    cfg,
                    RateLimitConfig {
                        per_sec: 5,
                        burst: 9,
                    }
                );
            },
        );
    }

    #[test]
    fn config_requires_api_key_in_api_key_mode() {
        let cli = Cli::parse_from(["hzn-api"]);
        let err = AppConfig::from_cli(&cli).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn config_rejects_wildcard_cors_origin() {
        let cli = Cli::parse_from([
            "hzn-api",
            "--api-key",
            "k",
            "--cors-origins",
            "*",
        ]);
        let err = AppConfig::from_cli(&cli).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
