//! Bearer authentication middleware.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::extractors::auth::verify_bearer;
use crate::state::AppState;

/// Rejects requests without a valid access token.
///
/// On success the verified `UserIdentity` is stored in the request
/// extensions, where `AuthUser` picks it up without verifying again.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = verify_bearer(request.headers(), &state)?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
