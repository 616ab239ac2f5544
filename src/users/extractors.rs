use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Request},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

use crate::{envelope::ApiError, users::dto::describe_validation};

/// JSON body that has been deserialized and passed `Validate`.
/// Every rejection is reported through the envelope.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                warn!(error = %rejection.body_text(), "rejected request body");
                match rejection {
                    JsonRejection::MissingJsonContentType(e) => {
                        ApiError::UnsupportedMediaType(e.body_text())
                    }
                    JsonRejection::BytesRejection(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                        ApiError::PayloadTooLarge(e.body_text())
                    }
                    other => ApiError::Validation(other.body_text()),
                }
            })?;

        value.validate().map_err(|errors| {
            let detail = describe_validation(&errors);
            warn!(error = %detail, "request body failed validation");
            ApiError::Validation(detail)
        })?;

        Ok(Self(value))
    }
}

/// `:id` path segment parsed as a user id.
pub struct UserIdPath(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for UserIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<Uuid>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                warn!(error = %rejection.body_text(), "rejected user id");
                ApiError::Validation(rejection.body_text())
            })?;
        Ok(Self(id))
    }
}
