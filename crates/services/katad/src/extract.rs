//! Request body extraction.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::prelude::*;

/// JSON body extractor that ignores `Content-Type` and rejects anything
/// unparsable with [`Error::InvalidJson`].
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let bytes = Bytes::from_request(req, state).await.map_err(|err| {
            debug!("Failed to read request body - {err}");
            Error::InvalidJson
        })?;
        serde_json::from_slice(&bytes).map(JsonBody).map_err(|err| {
            debug!("Rejected request body - {err}");
            Error::InvalidJson
        })
    }
}
