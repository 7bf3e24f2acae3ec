#![allow(clippy::result_large_err)] // Server helpers return AppError for consistent diagnostics.

//! HTTP extraction service.
//!
//! `GET /?shortcuturl=<link>&fmt=json|xml` runs one normalization and returns
//! the export as an attachment. `GET /health` answers liveness checks.

use crate::core::config::{AppConfig, ServerConfig};
use crate::core::error::AppError;
use crate::core::normalizer::Normalizer;
use crate::core::session::{self, ExportFile};
use crate::core::types::{ErrorCategory, OutputFormat};
use axum::{
    body::Body,
    extract::{Extension, Query},
    http::{header, HeaderValue, Response, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, info, warn};

/// State shared across extraction requests.
pub struct ExtractionState {
    normalizer: Normalizer,
    default_format: OutputFormat,
}

impl ExtractionState {
    pub fn new(normalizer: Normalizer, default_format: OutputFormat) -> Self {
        ExtractionState {
            normalizer,
            default_format,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Ok(ExtractionState::new(
            Normalizer::new(config)?,
            config.output.default_format,
        ))
    }
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    shortcuturl: Option<String>,
    fmt: Option<String>,
}

/// Build the service router; CORS is layered on when enabled.
pub fn router(state: Arc<ExtractionState>, settings: &ServerConfig) -> Router {
    let router = Router::new()
        .route("/", get(handle_extract))
        .route("/health", get(handle_health))
        .layer(Extension(state));
    if settings.enable_cors {
        router.layer(cors_layer(&settings.allowed_origins))
    } else {
        router
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}

/// Start the extraction service and block until it terminates.
pub async fn serve(config: &AppConfig) -> Result<(), AppError> {
    serve_internal(config, None).await
}

/// Start the extraction service and notify once the bind address is known (test helper).
pub async fn serve_with_ready_notifier(
    config: &AppConfig,
    ready_notifier: oneshot::Sender<SocketAddr>,
) -> Result<(), AppError> {
    serve_internal(config, Some(ready_notifier)).await
}

async fn serve_internal(
    config: &AppConfig,
    ready_notifier: Option<oneshot::Sender<SocketAddr>>,
) -> Result<(), AppError> {
    let bind_addr: SocketAddr = config.server.bind.parse().map_err(|err| {
        AppError::new(
            ErrorCategory::ValidationError,
            format!("invalid server bind address {}: {}", config.server.bind, err),
        )
    })?;
    let state = Arc::new(ExtractionState::from_config(config)?);
    let router = router(state, &config.server);

    let listener = TcpListener::bind(bind_addr).await.map_err(|err| {
        AppError::new(
            ErrorCategory::IoError,
            format!("failed to bind extraction listener {}: {}", bind_addr, err),
        )
    })?;
    let local_addr = listener.local_addr().map_err(|err| {
        AppError::new(
            ErrorCategory::IoError,
            format!("failed to determine extraction listener address: {}", err),
        )
    })?;
    if let Some(tx) = ready_notifier {
        let _ = tx.send(local_addr);
    }
    info!("extraction service listening on {}", local_addr);
    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|err| {
            AppError::new(
                ErrorCategory::InternalError,
                format!("extraction service terminated: {}", err),
            )
        })
}

async fn handle_health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn handle_extract(
    Extension(state): Extension<Arc<ExtractionState>>,
    Query(query): Query<ExtractQuery>,
) -> Result<Response<Body>, ExtractionRejection> {
    let link = query
        .shortcuturl
        .filter(|link| !link.trim().is_empty())
        .ok_or_else(|| ExtractionRejection::bad_request("missing shortcuturl parameter"))?;
    let format = match query.fmt.as_deref() {
        None => state.default_format,
        Some(fmt) => fmt
            .parse::<OutputFormat>()
            .map_err(|_| ExtractionRejection::bad_request("fmt must be json or xml"))?,
    };
    info!("extraction request for {} as {}", link, format);

    let mut result = state.normalizer.normalize(&link).await;
    session::annotate_default_format(&mut result, format);

    if let Some(diagnostic) = &result.diagnostic {
        if result.document.is_none() {
            warn!("extraction failed: {}", diagnostic);
            return Err(ExtractionRejection::unprocessed(diagnostic.message.clone()));
        }
    }

    let export = session::export_file(&result, format).map_err(ExtractionRejection::internal)?;
    Ok(attachment(export))
}

fn attachment(export: ExportFile) -> Response<Body> {
    let disposition = format!("attachment; filename=\"{}\"", export.file_name);
    let mut response = Response::new(Body::from(export.content));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(export.content_type),
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    response
}

struct ExtractionRejection {
    status: StatusCode,
    code: String,
    message: String,
}

impl ExtractionRejection {
    fn bad_request<T: Into<String>>(message: T) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "EXTRACT-400".to_string(),
            message: message.into(),
        }
    }

    fn unprocessed(message: String) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "EXTRACT-422".to_string(),
            message,
        }
    }

    fn internal(err: AppError) -> Self {
        error!("extraction export error: {}", err);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: err.code,
            message: "internal server error".to_string(),
        }
    }
}

impl IntoResponse for ExtractionRejection {
    fn into_response(self) -> Response<Body> {
        let mut resp = Json(json!({
            "error": {
                "code": self.code,
                "message": self.message
            }
        }))
        .into_response();
        *resp.status_mut() = self.status;
        resp
    }
}
