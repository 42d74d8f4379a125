//! Payload validation at the deserialization boundary.
//!
//! Handlers take `ValidatedForm<T>` instead of `Form<T>`: the body is decoded
//! into a typed payload and every field constraint is checked before the
//! handler runs. Any violation short-circuits with a 400 whose message joins
//! all violation messages.

pub mod forms;

use axum::{
    async_trait,
    extract::{rejection::FormRejection, FromRequest, Request},
    Form,
};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use validator::{Validate, ValidationErrors};

use crate::error::AppError;

pub use forms::{ListingForm, LoginForm, ReviewForm, SignupForm};

pub struct ValidatedForm<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedForm<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Form<T>: FromRequest<S, Rejection = FormRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(payload) = Form::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                tracing::debug!("Form rejected: {}", rejection.body_text());
                AppError::bad_request(rejection.body_text())
            })?;

        payload.validate().map_err(validation_error)?;
        Ok(ValidatedForm(payload))
    }
}

/// Flatten validator output into `field -> message`, fields in sorted order
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let mut field_errors = BTreeMap::new();

    for (field, failures) in errors.field_errors() {
        let field = field.to_string();
        let messages: Vec<String> = failures
            .iter()
            .map(|failure| match &failure.message {
                Some(message) => message.to_string(),
                None => format!("\"{}\" is invalid ({})", field, failure.code),
            })
            .collect();
        field_errors.insert(field, messages.join(","));
    }

    tracing::debug!("Validation failed: {:?}", field_errors);
    AppError::validation_error(field_errors)
}
