use axum::{
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::warn;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub next: Option<String>,
}

/// GET /auth/callback - exchange a one-time login code for a session.
///
/// Thin pass-through to the identity provider: on success the browser is
/// sent to `next` (default `/`), on any failure back to the login page
/// with the error message in the query string. No store access.
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Redirect {
    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        return login_error("missing authorization code");
    };

    match state.identity.exchange_code(&code).await {
        Ok(()) => Redirect::to(query.next.as_deref().unwrap_or("/")),
        Err(e) => {
            warn!("Login code exchange failed: {}", e);
            login_error(&e.to_string())
        }
    }
}

fn login_error(message: &str) -> Redirect {
    let encoded: String = url::form_urlencoded::byte_serialize(message.as_bytes()).collect();
    Redirect::to(&format!("/login?error={}", encoded))
}
