//! Sign-in, sign-up and sign-out.

use axum::Json;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;

use digioh_core::auth::{AuthSession, Identity, SITE_ROOT_PATH, SignUpAttributes, SignUpOutcome};
use digioh_core::error::AuthError;
use digioh_core::notice::Notice;
use digioh_core::validation::{ValidationError, limits, sanitize_text, validate_credentials};

use crate::access::Visitor;
use crate::server::GatewayState;
use crate::session::{clear_session_cookie, set_session_cookie};

/// Sign-in form.
#[derive(Debug, Deserialize)]
pub struct SignInForm {
    /// E-mail.
    #[serde(default)]
    pub email: String,
    /// Password.
    #[serde(default)]
    pub password: String,
}

/// Sign-up form.
#[derive(Debug, Deserialize)]
pub struct SignUpForm {
    /// E-mail.
    #[serde(default)]
    pub email: String,
    /// Password.
    #[serde(default)]
    pub password: String,
    /// Given name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    notice: Notice,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<Identity>,
}

fn reply(status: StatusCode, notice: Notice, user: Option<Identity>) -> Response {
    (status, Json(AuthResponse { notice, user })).into_response()
}

const fn failure_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::InvalidCredentials | AuthError::SessionExpired => StatusCode::UNAUTHORIZED,
        AuthError::AccountExists(_) => StatusCode::CONFLICT,
        AuthError::Network(_) => StatusCode::BAD_GATEWAY,
        AuthError::Provider { .. } => StatusCode::BAD_REQUEST,
    }
}

/// Reply carrying a fresh session cookie.
fn with_session(state: &GatewayState, session: &AuthSession, notice: Notice) -> Response {
    let mut response = reply(StatusCode::OK, notice, Some(session.identity.clone()));
    match set_session_cookie(
        &session.access_token,
        session.expires_at,
        state.config.secure_cookies,
    ) {
        Some(cookie) => {
            response.headers_mut().insert(SET_COOKIE, cookie);
            response
        }
        None => {
            tracing::error!(user_id = %session.identity.id, "Access token is not a valid cookie value");
            reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                Notice::failure("Error", "An unexpected error occurred."),
                None,
            )
        }
    }
}

/// `GET /auth`
///
/// Signed-in callers go back to the site root.
pub async fn page(Visitor(ctx): Visitor) -> Response {
    if ctx.snapshot().user().is_some() {
        return Redirect::to(SITE_ROOT_PATH).into_response();
    }

    Json(json!({
        "forms": {
            "sign_in": { "action": "/auth/sign-in", "fields": ["email", "password"] },
            "sign_up": {
                "action": "/auth/sign-up",
                "fields": ["email", "password", "first_name", "last_name"]
            }
        }
    }))
    .into_response()
}

/// `POST /auth/sign-in`
pub async fn sign_in(
    State(state): State<GatewayState>,
    Visitor(mut ctx): Visitor,
    Json(form): Json<SignInForm>,
) -> Response {
    let email = match validate_credentials(&form.email, &form.password) {
        Ok(email) => email,
        Err(e) => {
            return reply(
                StatusCode::UNPROCESSABLE_ENTITY,
                Notice::failure("Login Failed", e.to_string()),
                None,
            );
        }
    };

    if let Err(e) = ctx.sign_in(&email, &form.password).await {
        tracing::info!("Sign-in rejected: {}", e);
        return reply(failure_status(&e), Notice::sign_in_failed(&e), None);
    }

    let snapshot = ctx.snapshot();
    match snapshot.session.as_ref() {
        Some(session) => with_session(&state, session, Notice::signed_in()),
        None => reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            Notice::failure("Error", "An unexpected error occurred."),
            None,
        ),
    }
}

fn optional_name(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<String>, ValidationError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let name = sanitize_text(field, value, limits::MAX_NAME_LENGTH)?;
    Ok(Some(name).filter(|v| !v.is_empty()))
}

fn sign_up_attributes(form: &SignUpForm) -> Result<SignUpAttributes, ValidationError> {
    Ok(SignUpAttributes {
        first_name: optional_name("first_name", form.first_name.as_deref())?,
        last_name: optional_name("last_name", form.last_name.as_deref())?,
    })
}

/// `POST /auth/sign-up`
pub async fn sign_up(
    State(state): State<GatewayState>,
    Visitor(mut ctx): Visitor,
    Json(form): Json<SignUpForm>,
) -> Response {
    let validated = validate_credentials(&form.email, &form.password)
        .and_then(|email| Ok((email, sign_up_attributes(&form)?)));
    let (email, attrs) = match validated {
        Ok(validated) => validated,
        Err(e) => {
            return reply(
                StatusCode::UNPROCESSABLE_ENTITY,
                Notice::failure("Signup Failed", e.to_string()),
                None,
            );
        }
    };

    match ctx.sign_up(&email, &form.password, &attrs).await {
        Ok(SignUpOutcome::SignedIn(session)) => with_session(&state, &session, Notice::signed_up()),
        Ok(SignUpOutcome::ConfirmationRequired) => {
            reply(StatusCode::ACCEPTED, Notice::signed_up(), None)
        }
        Err(e) => {
            tracing::info!("Sign-up rejected: {}", e);
            reply(failure_status(&e), Notice::sign_up_failed(&e), None)
        }
    }
}

/// `POST /auth/sign-out`
///
/// The cookie is cleared whatever the provider answers.
pub async fn sign_out(State(state): State<GatewayState>, Visitor(mut ctx): Visitor) -> Response {
    if let Err(e) = ctx.sign_out().await {
        tracing::warn!("Provider sign-out failed, cookie cleared anyway: {}", e);
    }

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, clear_session_cookie(state.config.secure_cookies));
    (
        StatusCode::OK,
        headers,
        Json(AuthResponse {
            notice: Notice::signed_out(),
            user: None,
        }),
    )
        .into_response()
}
