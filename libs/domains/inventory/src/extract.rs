//! Request extractors that reject with [`InventoryError`] so every failure
//! reaches the client as the same JSON error body.

use axum::{
    extract::{FromRequest, FromRequestParts, Json, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::Validate;

use crate::error::InventoryError;

/// JSON body validated with the `validator` derive before reaching the handler
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = InventoryError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| InventoryError::Validation(e.body_text()))?;

        data.validate()?;
        Ok(ValidatedJson(data))
    }
}

/// Product ID path segment
pub struct IdPath(pub Uuid);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = InventoryError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| InventoryError::Validation(e.body_text()))?;

        Uuid::parse_str(&raw)
            .map(IdPath)
            .map_err(|_| InventoryError::Validation(format!("Invalid product ID: {raw}")))
    }
}

/// Path segment parsed with `FromStr`, e.g. a group key or export format
pub struct ParsedPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ParsedPath<T>
where
    T: std::str::FromStr,
    S: Send + Sync,
{
    type Rejection = InventoryError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| InventoryError::Validation(e.body_text()))?;

        raw.parse::<T>()
            .map(ParsedPath)
            .map_err(|_| InventoryError::UnsupportedFormat(raw))
    }
}
