use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`,
    /// `TOKEN_MISSING`, `TOKEN_INVALID`, `INVALID_CREDENTIALS`, `LOCKED_OUT`,
    /// `NOT_FOUND`, `CONFLICT`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "El titulo es obligatorio")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    TokenMissing,
    TokenInvalid,
    /// Bad credentials. Carries the attempts-remaining message; never reveals
    /// whether the username or the password was wrong.
    InvalidCredentials(String),
    /// Login temporarily blocked. Carries seconds until retry is allowed and
    /// the throttle's user-facing wording.
    LockedOut {
        retry_after: u64,
        message: String,
    },
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_MISSING",
                    message: "Autenticación requerida".into(),
                },
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_INVALID",
                    message: "Token inválido o expirado".into(),
                },
            ),
            AppError::InvalidCredentials(msg) => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "INVALID_CREDENTIALS",
                    message: msg,
                },
            ),
            AppError::LockedOut { message, .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorBody {
                    code: "LOCKED_OUT",
                    message,
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "CONFLICT",
                    message: msg,
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "Ocurrió un error inesperado".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let retry_after = if let AppError::LockedOut { retry_after, .. } = &self {
            Some(*retry_after)
        } else {
            None
        };

        let (status, body) = self.status_and_body();

        if let Some(seconds) = retry_after {
            (status, [("Retry-After", seconds.to_string())], Json(body)).into_response()
        } else {
            (status, Json(body)).into_response()
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(path) => {
                AppError::NotFound(format!("Imagen '{path}' no encontrada"))
            }
            StorageError::SizeLimitExceeded { limit, .. } => AppError::Validation(format!(
                "La imagen supera el tamaño máximo de {limit} bytes"
            )),
            StorageError::InvalidPath(detail) => AppError::Validation(detail),
            other => AppError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_serializes_code_and_message() {
        let body = ErrorBody {
            code: "NOT_FOUND",
            message: "Blog 9 no encontrado".into(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Blog 9 no encontrado");
    }

    #[test]
    fn locked_out_answers_429_with_retry_after() {
        let response = AppError::LockedOut {
            retry_after: 55,
            message: "Demasiados intentos fallidos. Intenta nuevamente en 55 segundos.".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get("Retry-After").unwrap(), "55");
    }

    #[test]
    fn locked_out_body_carries_the_throttle_wording() {
        let (_, body) = AppError::LockedOut {
            retry_after: 60,
            message: "Demasiados intentos fallidos. Tu acceso ha sido bloqueado por 60 segundos."
                .into(),
        }
        .status_and_body();
        assert!(body.message.contains("bloqueado por 60 segundos"));
    }

    #[test]
    fn validation_answers_422() {
        let response = AppError::Validation("El campo titulo es obligatorio".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn internal_detail_is_not_exposed() {
        let (status, body) = AppError::Internal("connection refused".into()).status_and_body();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.message.contains("connection refused"));
    }
}
