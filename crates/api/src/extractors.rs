//! Request extractors.
//!
//! - [`ValidatedJson`] deserializes a body and runs its `validator` rules,
//!   turning failures into a per-field error map.
//! - [`PathId`] parses a positive integer path segment into a typed id.
//! - [`PageQuery`] reads `page` / `pageSize` query parameters.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::str::FromStr;

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use storekeep_core::Pagination;

use crate::error::AppError;

// =============================================================================
// JSON bodies
// =============================================================================

/// JSON body that passed its validation rules.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(error = %rejection.body_text(), "Malformed JSON body");
            AppError::BadRequest("Invalid input data".to_owned())
        })?;
        value
            .validate()
            .map_err(|errors| AppError::Validation(field_messages(&errors)))?;
        Ok(Self(value))
    }
}

/// Flatten `errors` into `field -> message`, one message per field.
///
/// Nested fields are keyed by their path, e.g. `order_items[0].product_id`.
#[must_use]
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    collect(errors, "", &mut out);
    out
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut BTreeMap<String, String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(first) = list.first() {
                    out.entry(path).or_insert_with(|| message_for(first));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

/// Human-readable message for one failed rule.
#[must_use]
pub fn message_for(error: &ValidationError) -> String {
    let param = |name: &str| error.params.get(name).map(render_param);
    match error.code.as_ref() {
        "required" => "This field is required.".to_owned(),
        "email" => "Must be a valid email address.".to_owned(),
        "gt" => format!(
            "Value must be greater than {}.",
            param("gt").unwrap_or_else(|| "0".to_owned())
        ),
        "range" => match (param("min"), param("max")) {
            (Some(min), _) => format!("Value must be greater than or equal to {min}."),
            (None, Some(max)) => format!("Value must be less than or equal to {max}."),
            (None, None) => "Invalid value.".to_owned(),
        },
        "length" => match param("min") {
            Some(min) => format!("Value length must be greater than or equal to {min}"),
            None => "Invalid value.".to_owned(),
        },
        _ => error
            .message
            .as_ref()
            .map_or_else(|| "Invalid value.".to_owned(), Cow::to_string),
    }
}

/// Bounds print without JSON quoting, and whole floats without a fraction.
fn render_param(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) if n.is_f64() => n
            .as_f64()
            .filter(|f| f.fract() == 0.0)
            .map_or_else(|| n.to_string(), |f| format!("{f:.0}")),
        other => other.to_string(),
    }
}

// =============================================================================
// Path parameters
// =============================================================================

/// A typed id taken from the `{id}` path segment.
///
/// Rejects anything but a positive integer with `400 "Invalid <label> ID"`.
pub struct PathId<T>(pub T);

/// Names the entity in the rejection message.
pub trait IdLabel {
    const LABEL: &'static str;
}

impl IdLabel for storekeep_core::ProductId {
    const LABEL: &'static str = "product";
}

impl IdLabel for storekeep_core::OrderId {
    const LABEL: &'static str = "order";
}

impl IdLabel for storekeep_core::UserId {
    const LABEL: &'static str = "user";
}

impl<S, T> FromRequestParts<S> for PathId<T>
where
    S: Send + Sync,
    T: FromStr + IdLabel + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let invalid = || AppError::BadRequest(format!("Invalid {} ID", T::LABEL));
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| invalid())?;
        raw.parse::<T>().map(Self).map_err(|_| invalid())
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// `page` and `pageSize` query parameters, validated.
pub struct PageQuery(pub Pagination);

/// Paging fields shared by every list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_count: i64,
    pub total_pages: i64,
}

impl PageMeta {
    #[must_use]
    pub fn new(page: Pagination, total_count: i64) -> Self {
        Self {
            page: page.page(),
            page_size: page.page_size(),
            total_count,
            total_pages: page.total_pages(total_count),
        }
    }
}

impl<S> FromRequestParts<S> for PageQuery
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::BadRequest("Invalid page number".to_owned()))?;

        Pagination::from_query(
            params.get("page").map(String::as_str),
            params.get("pageSize").map(String::as_str),
        )
        .map(Self)
        .map_err(|e| AppError::BadRequest(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use validator::Validate;

    use super::*;
    use crate::models::{PlaceOrderRequest, ProductRequest, RegisterRequest};

    #[test]
    fn test_messages_by_rule() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"email":"nope","password":"123"}"#).unwrap();
        let fields = field_messages(&req.validate().unwrap_err());

        assert_eq!(fields["email"], "Must be a valid email address.");
        assert_eq!(
            fields["password"],
            "Value length must be greater than or equal to 6"
        );
        assert_eq!(fields["first_name"], "This field is required.");
    }

    #[test]
    fn test_empty_string_counts_as_missing() {
        let req: RegisterRequest = serde_json::from_str(r#"{"first_name":""}"#).unwrap();
        let fields = field_messages(&req.validate().unwrap_err());
        assert_eq!(fields["first_name"], "This field is required.");
    }

    #[test]
    fn test_numeric_bounds_messages() {
        let req: ProductRequest = serde_json::from_str(
            r#"{"name":"n","category":"c","description":"d","price":-1,"stock":-5}"#,
        )
        .unwrap();
        let fields = field_messages(&req.validate().unwrap_err());
        assert_eq!(fields["price"], "Value must be greater than 0.");
        assert_eq!(fields["stock"], "Value must be greater than or equal to 0.");

        let req: ProductRequest = serde_json::from_str(
            r#"{"name":"n","category":"c","description":"d","price":2e10,"stock":1}"#,
        )
        .unwrap();
        let fields = field_messages(&req.validate().unwrap_err());
        assert_eq!(
            fields["price"],
            "Value must be less than or equal to 9999999999.99."
        );
    }

    #[test]
    fn test_nested_item_errors_are_keyed_by_path() {
        let req: PlaceOrderRequest =
            serde_json::from_str(r#"{"address_id":1,"order_items":[{"quantity":1}]}"#).unwrap();
        let fields = field_messages(&req.validate().unwrap_err());
        assert_eq!(
            fields["order_items[0].product_id"],
            "This field is required."
        );
    }
}
