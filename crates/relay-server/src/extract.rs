//! Request extractors.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::error::RelayError;

/// JSON body extractor that rejects with [`RelayError::InvalidRequest`].
///
/// Axum's own `Json` rejection answers 422 when the body is valid JSON but
/// does not deserialize into the target type. A webhook payload missing its
/// required fields is a malformed request all the same, so both syntax and
/// shape failures map to 400 here.
pub struct RelayJson<T>(pub T);

impl<S, T> FromRequest<S> for RelayJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = RelayError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) =
            Json::<T>::from_request(req, state)
                .await
                .map_err(|rejection| RelayError::InvalidRequest {
                    reason: rejection.body_text(),
                })?;
        Ok(Self(value))
    }
}
