use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use epic_server_app::workflow::{
    registration::RegistrationError, tournament::TournamentError,
};
use serde_json::json;

pub enum ServiceError {
    NotFound(String),
    Unauthorized(String),
    BadRequest(String),
    Registration(RegistrationError),
    Tournament(TournamentError),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ServiceError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ServiceError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ServiceError::Registration(e) => write!(f, "{}", e),
            ServiceError::Tournament(e) => write!(f, "{}", e),
        }
    }
}

impl From<RegistrationError> for ServiceError {
    fn from(value: RegistrationError) -> Self {
        ServiceError::Registration(value)
    }
}

impl From<TournamentError> for ServiceError {
    fn from(value: TournamentError) -> Self {
        ServiceError::Tournament(value)
    }
}

fn registration_status(e: &RegistrationError) -> StatusCode {
    match e {
        RegistrationError::NotFound => StatusCode::NOT_FOUND,
        RegistrationError::RegistrationClosed => StatusCode::BAD_REQUEST,
        RegistrationError::TournamentFull => StatusCode::CONFLICT,
        RegistrationError::AlreadyRegistered => StatusCode::CONFLICT,
        RegistrationError::ValidationError(_) => StatusCode::BAD_REQUEST,
        RegistrationError::Unauthenticated => StatusCode::UNAUTHORIZED,
        RegistrationError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        RegistrationError::Forbidden => StatusCode::FORBIDDEN,
        RegistrationError::InvalidTransition => StatusCode::CONFLICT,
    }
}

fn tournament_status(e: &TournamentError) -> StatusCode {
    match e {
        TournamentError::NotFound => StatusCode::NOT_FOUND,
        TournamentError::AlreadyExists => StatusCode::CONFLICT,
        TournamentError::ValidationError(_) => StatusCode::BAD_REQUEST,
        TournamentError::Forbidden => StatusCode::FORBIDDEN,
        TournamentError::InvalidTransition => StatusCode::CONFLICT,
        TournamentError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

const STORAGE_UNAVAILABLE: &str = "Storage is temporarily unavailable, try again later";

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, kind, msg, fields) = match self {
            ServiceError::NotFound(msg) => (StatusCode::NOT_FOUND, "NotFound", msg, None),
            ServiceError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "Unauthenticated", msg, None)
            }
            ServiceError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BadRequest", msg, None),
            ServiceError::Registration(e) => {
                let msg = match &e {
                    RegistrationError::StorageUnavailable(_) => STORAGE_UNAVAILABLE.to_string(),
                    e => e.to_string(),
                };
                let fields = match &e {
                    RegistrationError::ValidationError(fields) => Some(fields.clone()),
                    _ => None,
                };
                (registration_status(&e), e.kind(), msg, fields)
            }
            ServiceError::Tournament(e) => {
                let msg = match &e {
                    TournamentError::StorageUnavailable(_) => STORAGE_UNAVAILABLE.to_string(),
                    e => e.to_string(),
                };
                let fields = match &e {
                    TournamentError::ValidationError(fields) => Some(fields.clone()),
                    _ => None,
                };
                (tournament_status(&e), e.kind(), msg, fields)
            }
        };
        let body = match fields {
            Some(fields) => json!({ "error": msg, "kind": kind, "fields": fields }),
            None => json!({ "error": msg, "kind": kind }),
        };
        (status, Json(body)).into_response()
    }
}
