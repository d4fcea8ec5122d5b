use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::AppError;

/// `Json<T>` whose rejections (wrong content type, unparsable or mistyped
/// body) are reported as validation errors.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            warn!(status = %rejection.status(), "rejected request body");
            AppError::Validation(rejection.body_text())
        })?;
        Ok(JsonBody(value))
    }
}
