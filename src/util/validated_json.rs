use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use validator::Validate;

use crate::util::error::{HandlerError, HandlerErrorKind};

/// JSON body that has been deserialized and passed `Validate`.
///
/// The Content-Type header is not required. Broken JSON is a 400; a well-formed
/// body with missing, mistyped or invalid fields is a 422.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = HandlerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| HandlerError::new(HandlerErrorKind::BadRequest, "Unreadable request body").with_details(e.to_string()))?;

        let value = parse_body::<T>(&body)?;
        value
            .validate()
            .map_err(|e| HandlerError::validation("Request body failed validation").with_details(e.to_string()))?;
        Ok(ValidatedJson(value))
    }
}

pub(crate) fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, HandlerError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(HandlerError::validation("Request body is required"));
    }
    serde_json::from_slice(body).map_err(|e| match e.classify() {
        Category::Data => HandlerError::validation("Request body does not match the expected schema")
            .with_details(e.to_string()),
        _ => HandlerError::new(HandlerErrorKind::BadRequest, "Malformed JSON body").with_details(e.to_string()),
    })
}
