//! HTTP request handlers for the labeling service.
//!
//! Implements login, status, text submission, feedback and the admin log
//! endpoints using axum.

use crate::accounts::AccountRegistry;
use crate::config::ServerConfig;
use crate::session::{LoginResponse, SessionError, SessionManager};
use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use bizline_classifier::{ClassifierAdapter, Coordinator, Gate};
use bizline_domain::traits::{LlmProvider, LogStore};
use bizline_domain::{
    now_epoch_secs, AccountCount, AccountId, Classification, ClassificationOutcome,
    ClassificationRequest, Label, LogSummary, ModelVariant, NewFeedback, NewRequestLog,
    RequestCompletion, RequestLogEntry,
};
use bizline_store::{SqliteStore, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info, warn};

/// File name offered to clients downloading the log database
pub const EXPORT_FILE_NAME: &str = "bizline_logs.db";

/// Shared application state
pub struct AppState<P> {
    /// Session manager for JWT token operations
    pub session_manager: Arc<SessionManager>,
    /// Login accounts
    pub accounts: Arc<AccountRegistry>,
    /// Single-flight classification coordinator
    pub coordinator: Arc<Coordinator<P>>,
    /// Request and feedback logs
    pub store: Arc<Mutex<SqliteStore>>,
    /// Accounts allowed to use the admin endpoints
    pub admin_accounts: Arc<Vec<AccountId>>,
}

impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            session_manager: Arc::clone(&self.session_manager),
            accounts: Arc::clone(&self.accounts),
            coordinator: Arc::clone(&self.coordinator),
            store: Arc::clone(&self.store),
            admin_accounts: Arc::clone(&self.admin_accounts),
        }
    }
}

impl<P> AppState<P>
where
    P: LlmProvider + 'static,
{
    /// Wire up state from configuration, a backend and an open store
    pub fn from_config(config: &ServerConfig, provider: P, store: SqliteStore) -> Self {
        let adapter = ClassifierAdapter::new(provider, config.classifier.clone());

        Self {
            session_manager: Arc::new(SessionManager::new(
                &config.jwt_secret,
                config.token_expiry_secs,
            )),
            accounts: Arc::new(AccountRegistry::from_config(config.accounts.clone())),
            coordinator: Arc::new(Coordinator::with_gate(adapter, Gate::new())),
            store: Arc::new(Mutex::new(store)),
            admin_accounts: Arc::new(
                config
                    .admin_accounts
                    .iter()
                    .map(|a| AccountId::new(a.as_str()))
                    .collect(),
            ),
        }
    }
}

impl<P> AppState<P>
where
    P: LlmProvider + 'static,
{
    /// Classify and write the outcome onto request log entry `id`
    async fn classify_and_complete(
        &self,
        id: i64,
        request: ClassificationRequest,
    ) -> Result<Classification, ApiError> {
        let started = Instant::now();
        let result = self.coordinator.classify(request).await;

        let completion = match &result {
            Ok(classification) => RequestCompletion {
                predicted_label: classification
                    .outcome
                    .predicted_label()
                    .map(|l| l.name().to_string()),
                processing_time: classification.elapsed_seconds(),
                error_message: classification.outcome.error_message(),
            },
            Err(e) => RequestCompletion {
                predicted_label: None,
                processing_time: started.elapsed().as_secs_f64(),
                error_message: Some(e.to_string()),
            },
        };
        self.store().complete_request(id, completion)?;

        result.map_err(|e| ApiError::Unexpected(e.to_string()))
    }
}

impl<P> AppState<P> {
    fn store(&self) -> MutexGuard<'_, SqliteStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_admin(&self, account: &AccountId) -> bool {
        self.admin_accounts.contains(account)
    }

    fn require_admin(&self, account: &AccountId, action: &str) -> Result<(), ApiError> {
        if self.is_admin(account) {
            Ok(())
        } else {
            warn!("Account '{}' tried to {} without admin rights", account, action);
            Err(ApiError::Forbidden(format!("Only admin can {}", action)))
        }
    }
}

/// Errors surfaced to API callers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, malformed or expired token
    #[error("{0}")]
    Unauthenticated(String),

    /// Login with a wrong username or password
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Authenticated but not allowed
    #[error("{0}")]
    Forbidden(String),

    /// Bad request payload
    #[error("{0}")]
    InvalidInput(String),

    /// Referenced resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// The classifier is in use by another account
    #[error("{0}")]
    ResourceBusy(String),

    /// A required backend capability is not configured
    #[error("{0}")]
    BackendUnavailable(String),

    /// Anything else; the detail is logged, never returned
    #[error("Internal server error")]
    Unexpected(String),
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ResourceBusy(_) => StatusCode::LOCKED,
            ApiError::BackendUnavailable(_) | ApiError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Unexpected(detail) = &self {
            error!("Request failed: {}", detail);
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (self.status(), body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Unexpected(format!("log store: {}", e))
    }
}

/// The account behind a valid bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount {
    /// Username from the token
    pub username: String,
    /// Account the user acts as
    pub account: AccountId,
}

#[async_trait]
impl<P> FromRequestParts<AppState<P>> for AuthenticatedAccount
where
    P: Send + Sync + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<P>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| ApiError::Unauthenticated("Authorization header missing".to_string()))?
            .to_str()
            .map_err(|_| ApiError::Unauthenticated("Invalid authorization format".to_string()))?;

        let claims = state
            .session_manager
            .validate_header(header)
            .map_err(|e| ApiError::Unauthenticated(e.to_string()))?;

        Ok(AuthenticatedAccount {
            account: claims.account(),
            username: claims.sub,
        })
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Human-readable banner
    pub message: String,
    /// Always "healthy" while the process serves requests
    pub status: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login name
    pub username: String,
    /// Plaintext password
    pub password: String,
}

/// Classifier status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Whether a classification is running
    pub busy: bool,
    /// Account running it
    pub owner: Option<String>,
    /// Seconds it has been running
    pub elapsed_seconds: f64,
}

/// Text submission
#[derive(Debug, Deserialize)]
pub struct LabelRequest {
    /// Text to classify
    pub text: String,
    /// Model variant name
    #[serde(default = "default_model_name")]
    pub model_name: String,
}

fn default_model_name() -> String {
    ModelVariant::default().as_str().to_string()
}

/// Result of a text submission
#[derive(Debug, Serialize, Deserialize)]
pub struct LabelResponse {
    /// Request log entry id
    pub id: i64,
    /// Text as submitted
    pub input_text: String,
    /// Model variant used
    pub model_name: String,
    /// Predicted label, if any
    pub predicted_label: Option<String>,
    /// Processing time in seconds
    pub processing_time: f64,
    /// Diagnostic when no label was produced
    pub error_message: Option<String>,
}

/// Feedback submission
#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    /// Request log entry the feedback refers to
    pub request_id: i64,
    /// Whether the prediction was acceptable
    pub is_supported: bool,
    /// Replacement label
    #[serde(default)]
    pub corrected_label: Option<String>,
}

/// Generic acknowledgment
#[derive(Debug, Serialize, Deserialize)]
pub struct AckResponse {
    /// Always "success"
    pub status: String,
    /// Human-readable detail
    pub message: String,
}

/// One taxonomy entry
#[derive(Debug, Serialize, Deserialize)]
pub struct LabelInfo {
    /// Label name
    pub name: String,
    /// What the label covers
    pub description: String,
}

/// The full taxonomy
#[derive(Debug, Serialize, Deserialize)]
pub struct LabelsResponse {
    /// Labels in taxonomy order
    pub labels: Vec<LabelInfo>,
}

/// Count for one account
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountCountResponse {
    /// Account id
    pub account_id: String,
    /// Number of log entries
    pub count: u64,
}

/// Aggregate log counts
#[derive(Debug, Serialize, Deserialize)]
pub struct LogsSummaryResponse {
    /// Total request log entries
    pub total_requests: u64,
    /// Total feedback log entries
    pub total_feedback: u64,
    /// Requests per account
    pub requests_by_account: Vec<AccountCountResponse>,
    /// Feedback per account
    pub feedback_by_account: Vec<AccountCountResponse>,
}

fn account_counts(counts: Vec<AccountCount>) -> Vec<AccountCountResponse> {
    counts
        .into_iter()
        .map(|c| AccountCountResponse {
            account_id: c.account.into_inner(),
            count: c.count,
        })
        .collect()
}

impl From<LogSummary> for LogsSummaryResponse {
    fn from(summary: LogSummary) -> Self {
        Self {
            total_requests: summary.total_requests,
            total_feedback: summary.total_feedback,
            requests_by_account: account_counts(summary.requests_by_account),
            feedback_by_account: account_counts(summary.feedback_by_account),
        }
    }
}

/// GET / - Health check
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Bizline labeling API is running".to_string(),
        status: "healthy".to_string(),
    })
}

/// POST /login - Exchange credentials for a bearer token
async fn login<P>(
    State(state): State<AppState<P>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let account = state
        .accounts
        .verify(&request.username, &request.password)
        .ok_or_else(|| {
            info!("Failed login for '{}'", request.username);
            ApiError::InvalidCredentials
        })?;

    let token = state
        .session_manager
        .generate_token(&request.username, &account)
        .map_err(|e: SessionError| ApiError::Unexpected(e.to_string()))?;

    info!("'{}' logged in as account '{}'", request.username, account);
    Ok(Json(LoginResponse::bearer(token, &account)))
}

/// GET /status - Who holds the classifier and for how long
async fn status<P>(State(state): State<AppState<P>>) -> Json<StatusResponse>
where
    P: LlmProvider + 'static,
{
    let status = state.coordinator.status();
    Json(StatusResponse {
        busy: status.busy,
        owner: status.owner.map(AccountId::into_inner),
        elapsed_seconds: status.elapsed_seconds,
    })
}

/// POST /label - Classify a text
///
/// The request log entry is written before classification and completed with
/// the outcome afterwards, including when the classifier was busy.
async fn submit_text<P>(
    State(state): State<AppState<P>>,
    caller: AuthenticatedAccount,
    Json(request): Json<LabelRequest>,
) -> Result<Json<LabelResponse>, ApiError>
where
    P: LlmProvider + 'static,
{
    let model: ModelVariant = request.model_name.parse().map_err(ApiError::InvalidInput)?;

    let classification_request =
        ClassificationRequest::new(request.text.clone(), model, caller.account.clone());
    if classification_request.normalized_text().is_empty() {
        return Err(ApiError::InvalidInput("Text must not be empty".to_string()));
    }

    if !state.coordinator.is_backend_configured() {
        error!("Classification backend has no API key configured");
        return Err(ApiError::BackendUnavailable(
            "OpenAI API key not configured".to_string(),
        ));
    }

    let id = state.store().record_request(NewRequestLog {
        account: caller.account.clone(),
        model,
        input_text: request.text.clone(),
        created_at: now_epoch_secs(),
    })?;

    // Classification and the log completion run on their own task, so a
    // dropped connection cannot leave the entry without its outcome.
    let worker = state.clone();
    let classification = tokio::spawn(async move {
        worker.classify_and_complete(id, classification_request).await
    })
    .await
    .map_err(|e| ApiError::Unexpected(format!("classification task failed: {}", e)))??;

    let outcome = &classification.outcome;
    let predicted_label = outcome.predicted_label().map(|l| l.name().to_string());
    let error_message = outcome.error_message();
    let processing_time = classification.elapsed_seconds();

    if let ClassificationOutcome::Busy { .. } = outcome {
        return Err(ApiError::ResourceBusy(error_message.unwrap_or_default()));
    }

    Ok(Json(LabelResponse {
        id,
        input_text: request.text,
        model_name: model.as_str().to_string(),
        predicted_label,
        processing_time,
        error_message,
    }))
}

fn owned_request<P>(
    state: &AppState<P>,
    request_id: i64,
    account: &AccountId,
) -> Result<RequestLogEntry, ApiError> {
    let entry = state
        .store()
        .get_request(request_id)?
        .ok_or_else(|| ApiError::NotFound("Request not found".to_string()))?;

    if !entry.is_owned_by(account) {
        warn!(
            "Account '{}' tried to give feedback on request {} owned by '{}'",
            account, request_id, entry.account
        );
        return Err(ApiError::Forbidden(
            "Not authorized to provide feedback for this request".to_string(),
        ));
    }

    Ok(entry)
}

/// POST /feedback - Accept or correct a prediction
async fn submit_feedback<P>(
    State(state): State<AppState<P>>,
    caller: AuthenticatedAccount,
    Json(request): Json<FeedbackRequest>,
) -> Result<Json<AckResponse>, ApiError> {
    owned_request(&state, request.request_id, &caller.account)?;

    let corrected_label = match request.corrected_label.as_deref() {
        None | Some("") => None,
        Some(name) => Some(
            Label::parse(name)
                .ok_or_else(|| ApiError::InvalidInput("Invalid corrected label".to_string()))?,
        ),
    };

    state.store().record_feedback(NewFeedback {
        request_id: request.request_id,
        account: caller.account,
        is_supported: request.is_supported,
        corrected_label,
        created_at: now_epoch_secs(),
    })?;

    Ok(Json(AckResponse {
        status: "success".to_string(),
        message: "Feedback submitted successfully".to_string(),
    }))
}

/// GET /labels - The taxonomy
async fn list_labels() -> Json<LabelsResponse> {
    Json(LabelsResponse {
        labels: Label::all()
            .map(|label| LabelInfo {
                name: label.name().to_string(),
                description: label.description().to_string(),
            })
            .collect(),
    })
}

/// GET /download-logs - Raw log database (admin)
async fn export_logs<P>(
    State(state): State<AppState<P>>,
    caller: AuthenticatedAccount,
) -> Result<Response, ApiError> {
    state.require_admin(&caller.account, "download logs")?;

    let path = state
        .store()
        .database_path()
        .map(|p| p.to_path_buf())
        .ok_or_else(|| ApiError::NotFound("Database file not found".to_string()))?;

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound("Database file not found".to_string()));
        }
        Err(e) => return Err(ApiError::Unexpected(format!("reading {}: {}", path.display(), e))),
    };

    info!("Account '{}' exported {} bytes of logs", caller.account, bytes.len());

    let disposition = format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME);
    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        ),
        (
            header::CONTENT_DISPOSITION,
            HeaderValue::from_str(&disposition)
                .map_err(|e| ApiError::Unexpected(e.to_string()))?,
        ),
    ];
    Ok((headers, bytes).into_response())
}

/// GET /logs-summary - Per-account counts (admin)
async fn logs_summary<P>(
    State(state): State<AppState<P>>,
    caller: AuthenticatedAccount,
) -> Result<Json<LogsSummaryResponse>, ApiError> {
    state.require_admin(&caller.account, "view logs summary")?;

    let summary = state.store().summarize()?;
    Ok(Json(summary.into()))
}

/// Create the axum router with all routes
pub fn create_router<P>(state: AppState<P>) -> AxumRouter
where
    P: LlmProvider + 'static,
{
    AxumRouter::new()
        .route("/", get(health))
        .route("/login", post(login::<P>))
        .route("/status", get(status::<P>))
        .route("/label", post(submit_text::<P>))
        .route("/feedback", post(submit_feedback::<P>))
        .route("/labels", get(list_labels))
        .route("/download-logs", get(export_logs::<P>))
        .route("/logs-summary", get(logs_summary::<P>))
        .with_state(state)
}
