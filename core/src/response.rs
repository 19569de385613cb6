//! Uniform response contract shared by every operation.
//!
//! Status >= 400 always becomes [`Error::Api`], with the real HTTP status
//! forced into the error. Anything below 400 is a success; its body is
//! either parsed into the caller's type or ignored.

use serde::de::DeserializeOwned;

use crate::error::{ApiError, Error, Result};
use crate::http::HttpResponse;

/// Decode a success body into `T`, or turn an error status into an API error.
pub fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T> {
    let body = check_status(response)?;
    serde_json::from_str(&body).map_err(Error::Decode)
}

/// Like [`decode`] for calls whose success carries no payload.
pub fn decode_empty(response: HttpResponse) -> Result<()> {
    check_status(response).map(drop)
}

fn check_status(response: HttpResponse) -> Result<String> {
    if response.is_error() {
        let err = ApiError::from_body(response.status, &response.body);
        tracing::debug!(status = err.status_code(), message = err.message(), "job service returned an error");
        return Err(Error::Api(err));
    }
    Ok(response.body)
}
