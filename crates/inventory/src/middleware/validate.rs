use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use shared::errors::HttpError;
use validator::{Validate, ValidationErrors};

/// JSON body that is deserialized and then checked with `validator`.
pub struct SimpleValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for SimpleValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| HttpError::BadRequest(rejection.body_text()))?;

        value
            .validate()
            .map_err(|errors| HttpError::Validation(field_messages(&errors)))?;

        Ok(Self(value))
    }
}

/// `field: message` per failure, sorted by field for stable output.
pub fn field_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let mut messages = Vec::new();
    for (field, field_errors) in fields {
        for error in field_errors {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| match error.code.as_ref() {
                    "length" => "Invalid length".to_string(),
                    "range" => "Value out of range".to_string(),
                    _ => format!("Invalid {field}"),
                });
            messages.push(format!("{field}: {message}"));
        }
    }

    if messages.is_empty() {
        messages.push("Validation failed".to_string());
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::requests::inventory::CreateInventoryRequest;

    #[test]
    fn messages_name_the_field() {
        let req = CreateInventoryRequest {
            store_id: 1,
            product_id: 0,
            quantity: -4,
            low_stock_threshold: None,
        };

        let errors = req.validate().unwrap_err();

        assert_eq!(
            field_messages(&errors),
            vec![
                "product_id: product_id must be positive",
                "quantity: quantity must not be negative",
            ]
        );
    }
}
