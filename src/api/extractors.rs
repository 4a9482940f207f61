//! Request extractors.

use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::error::AppError;

/// JSON extractor that runs `validator` rules after deserialization.
///
/// Failures surface as a `Validation` error carrying a field→message map.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::validation_field("body", &e.body_text()))?;

        value
            .validate()
            .map_err(|e| AppError::Validation(validation_error_map(&e)))?;

        Ok(ValidatedJson(value))
    }
}

/// Flatten validator output into one message per field
fn validation_error_map(errors: &ValidationErrors) -> HashMap<String, String> {
    errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let message = errs
                .iter()
                .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| format!("{} is invalid", field));
            (field.to_string(), message)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize, Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "Description is required"))]
        description: String,
        #[validate(email(message = "Invalid email format"))]
        email: String,
    }

    #[test]
    fn test_validation_error_map_uses_field_messages() {
        let sample = Sample {
            description: String::new(),
            email: "not-an-email".to_string(),
        };

        let errors = sample.validate().unwrap_err();
        let map = validation_error_map(&errors);

        assert_eq!(
            map.get("description").map(String::as_str),
            Some("Description is required")
        );
        assert_eq!(
            map.get("email").map(String::as_str),
            Some("Invalid email format")
        );
    }
}
