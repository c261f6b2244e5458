use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Request body for trabajador login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Usuario of the account to log into.
    #[schema(example = "sysadmin_2024")]
    pub usuario: String,
    /// Account password.
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.usuario.trim().is_empty() {
        return Err(AppError::Validation(
            "El campo usuario es obligatorio".into(),
        ));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation(
            "El campo password es obligatorio".into(),
        ));
    }
    Ok(())
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// JWT bearer token valid for 7 days.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    /// Usuario of the authenticated trabajador.
    #[schema(example = "sysadmin_2024")]
    pub usuario: String,
}

/// Current authenticated trabajador's profile.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    /// Trabajador ID.
    #[schema(example = 1)]
    pub id: i32,
    /// Usuario.
    #[schema(example = "sysadmin_2024")]
    pub usuario: String,
}
