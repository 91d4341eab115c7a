// File: swagship-server/src/admin.rs
//
// The admin gate. Authorization is a middleware stage in front of the
// /admin subtree; handlers behind it never check the caller themselves.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use swagship_common::error::Error;

use crate::context::ServerContext;
use crate::handlers::{ApiResponse, AppError};

pub const TOKEN_COOKIE: &str = "token";

/// Introspects the caller's token and short-circuits before any admin
/// handler runs.
pub async fn require_admin(
    State(ctx): State<Arc<ServerContext>>,
    req: Request,
    next: Next,
) -> Response {
    let Some(token) = caller_token(&req) else {
        return challenge();
    };
    match ctx.identity.introspect(&token).await {
        Ok(true) => next.run(req).await,
        Ok(false) => challenge(),
        Err(e) => {
            warn!("token introspection failed: {e}");
            (
                StatusCode::BAD_GATEWAY,
                Json(ApiResponse::failed("Identity provider unreachable.")),
            )
                .into_response()
        }
    }
}

/// Bearer header first, then the token cookie set by the sign-in
/// callback.
fn caller_token(req: &Request) -> Option<String> {
    if let Some(value) = req.headers().get(header::AUTHORIZATION) {
        if let Ok(s) = value.to_str() {
            if let Some(t) = s.strip_prefix("Bearer ") {
                return Some(t.to_string());
            }
        }
    }
    let cookies = req.headers().get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == TOKEN_COOKIE).then(|| value.to_string())
    })
}

fn challenge() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::failed("Sign in required.")),
    )
        .into_response()
}

/// Kicks off the authorization-code flow at the identity provider.
pub async fn login(State(ctx): State<Arc<ServerContext>>) -> Result<Redirect, AppError> {
    let state = Uuid::new_v4().to_string();
    let nonce = Uuid::new_v4().to_string();
    let url = ctx.identity.authorize_url(&state, &nonce)?;
    Ok(Redirect::temporary(&url))
}

#[derive(Debug, Deserialize)]
pub struct CallbackForm {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// form_post callback from the provider: swap the code for tokens and
/// hand the access token back as the admin cookie.
pub async fn auth_callback(
    State(ctx): State<Arc<ServerContext>>,
    Form(form): Form<CallbackForm>,
) -> Result<Response, AppError> {
    if let Some(err) = form.error {
        let detail = form.error_description.unwrap_or_default();
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::failed(format!("Sign-in failed: {err} {detail}"))),
        )
            .into_response());
    }
    let code = form
        .code
        .ok_or_else(|| Error::Validation(vec!["code is required.".to_string()]))?;
    let tokens = ctx.identity.exchange_code(&code).await?;
    let cookie = format!(
        "{TOKEN_COOKIE}={}; HttpOnly; Path=/; SameSite=Lax",
        tokens.access_token
    );
    Ok((
        [(header::SET_COOKIE, cookie)],
        Redirect::to("/admin/pendingshipping"),
    )
        .into_response())
}
