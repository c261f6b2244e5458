use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use tracing::instrument;

use crate::entity::trabajador;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::client_ip::ClientIp;
use crate::extractors::json::AppJson;
use crate::models::auth::{LoginRequest, LoginResponse, MeResponse, validate_login_request};
use crate::state::AppState;
use crate::throttle::{ThrottleGate, ThrottleVerdict};
use crate::utils::{hash, jwt};

/// Authenticate a trabajador and issue a JWT.
///
/// Failed attempts are counted per client IP; after the configured number
/// of failures the IP is locked out and further attempts answer 429 with a
/// `Retry-After` header, without touching the database.
#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 422, description = "Missing fields", body = ErrorBody),
        (status = 429, description = "Too many failed attempts", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(usuario = %payload.usuario))]
pub async fn login(
    ClientIp(client_ip): ClientIp,
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_login_request(&payload)?;

    let gate = state.throttle.check_access(&client_ip);
    if let ThrottleGate::Denied { retry_after } = &gate {
        return Err(AppError::LockedOut {
            retry_after: *retry_after,
            message: gate.message().unwrap_or_default(),
        });
    }

    let found = trabajador::Entity::find()
        .filter(trabajador::Column::Usuario.eq(payload.usuario.trim()))
        .one(&state.db)
        .await?;

    let credentials_ok = match &found {
        Some(worker) => hash::verify_password(&payload.password, &worker.password)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {e}")))?,
        None => false,
    };

    let Some(worker) = found.filter(|_| credentials_ok) else {
        let verdict = state.throttle.record_failure(&client_ip);
        let message = verdict.message();
        return Err(match verdict {
            ThrottleVerdict::LockedOutNow { retry_after } => {
                AppError::LockedOut { retry_after, message }
            }
            ThrottleVerdict::AttemptsRemaining(_) => AppError::InvalidCredentials(message),
        });
    };

    state.throttle.record_success(&client_ip);
    // Fresh session id on privilege change defeats session fixation.
    state.sessions.regenerate_id(&client_ip);

    let token = jwt::sign(worker.id, &worker.usuario, &state.config.auth.jwt_secret)
        .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))?;

    Ok(Json(LoginResponse {
        token,
        usuario: worker.usuario,
    }))
}

/// Drop the session state associated with the caller's IP.
///
/// Idempotent: logging out without a session still answers 204.
#[utoipa::path(
    post,
    path = "/logout",
    tag = "Auth",
    responses((status = 204, description = "Session dropped")),
)]
#[instrument(skip(state))]
pub async fn logout(ClientIp(client_ip): ClientIp, State(state): State<AppState>) -> StatusCode {
    state.sessions.invalidate(&client_ip);
    StatusCode::NO_CONTENT
}

/// Profile of the authenticated trabajador.
#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    security(("jwt" = [])),
    responses(
        (status = 200, description = "Current trabajador", body = MeResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
    ),
)]
pub async fn me(auth_user: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        id: auth_user.trabajador_id,
        usuario: auth_user.usuario,
    })
}
