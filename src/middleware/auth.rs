use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::allowlist::require_allowlisted;
use crate::error::ApiError;
use crate::identity::verify_bearer;
use crate::AppState;

/// Verified owner context injected into every authorized request
#[derive(Clone, Debug)]
pub struct VerifiedOwner {
    pub email: String,
}

/// Authentication middleware: bearer token -> verified email -> allowlist.
///
/// Every protected route runs this before its handler. On success the
/// request carries a `VerifiedOwner` extension with the normalized email;
/// any failure terminates the request with the mapped status.
pub async fn require_owner(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let email = verify_bearer(state.identity.as_ref(), &headers).await?;
    require_allowlisted(state.store.as_ref(), &email).await?;

    request.extensions_mut().insert(VerifiedOwner { email });
    Ok(next.run(request).await)
}
