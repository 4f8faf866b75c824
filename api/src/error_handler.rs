use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use qa_engine::EngineError;
use serde::Serialize;
use thiserror::Error;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("missing required environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("configuration error: {0}")]
    Config(String),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Rich HTTP error mapped from lower layers with specific status & code.
    #[error("{message}")]
    Http {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            // startup-only
            AppError::MissingEnv(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,

            // custom mapped
            AppError::Http { status, .. } => *status,

            // 5xx
            AppError::Bind(_) | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::MissingEnv(_) => "MISSING_ENV",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Http { code, .. } => code,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.error_code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Convert common Axum rejections to `AppError`.
impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Convert `EngineError` to `AppError::Http` keeping the error kinds
/// distinct on the wire: client mistakes are 4xx, upstream collaborator
/// failures are 502, local misconfiguration is 500.
impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Validation(m) => AppError::Http {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                code: "VALIDATION_ERROR",
                message: m,
            },
            EngineError::Config(m) => AppError::Http {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "CONFIG_ERROR",
                message: m,
            },
            EngineError::Embedding(m) => AppError::Http {
                status: StatusCode::BAD_GATEWAY,
                code: "EMBEDDING_FAILED",
                message: m,
            },
            EngineError::Retrieval(m) => AppError::Http {
                status: StatusCode::BAD_GATEWAY,
                code: "STORE_FAILED",
                message: m,
            },
            EngineError::Generation(m) => AppError::Http {
                status: StatusCode::BAD_GATEWAY,
                code: "GENERATION_FAILED",
                message: m,
            },
            EngineError::GenerationParse(m) => AppError::Http {
                status: StatusCode::BAD_GATEWAY,
                code: "GENERATION_PARSE_FAILED",
                message: m,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_error_kinds_map_to_distinct_codes() {
        let cases = [
            (
                EngineError::Validation("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
            ),
            (
                EngineError::Embedding("x".into()),
                StatusCode::BAD_GATEWAY,
                "EMBEDDING_FAILED",
            ),
            (
                EngineError::Retrieval("x".into()),
                StatusCode::BAD_GATEWAY,
                "STORE_FAILED",
            ),
            (
                EngineError::GenerationParse("x".into()),
                StatusCode::BAD_GATEWAY,
                "GENERATION_PARSE_FAILED",
            ),
        ];
        for (engine_err, status, code) in cases {
            let app_err: AppError = engine_err.into();
            assert_eq!(app_err.status_code(), status);
            assert_eq!(app_err.error_code(), code);
        }
    }
}
