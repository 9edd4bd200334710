//! `ValidatedJson` extractor: JSON body that must also pass `validator` rules.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use miami_core::error::AppError;

use crate::error::ApiError;

/// Deserialized and validated request body.
///
/// Malformed JSON, a missing content type, and failed rules all surface as
/// a `Validation` error with the standard error body.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| {
                AppError::validation(format!("Invalid request body: {}", rejection.body_text()))
            })?;

        value
            .validate()
            .map_err(|e| AppError::validation(format!("Invalid request: {e}")))?;

        Ok(Self(value))
    }
}
