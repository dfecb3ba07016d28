use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200, message = "title must be 1 to 200 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[validate(custom(function = "valid_price"))]
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,

    #[validate(range(min = 1, message = "category_id must be positive"))]
    pub category_id: i32,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Partial update. Title and category stay fixed once a product exists.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[schema(value_type = Option<String>, example = "24.50")]
    pub price: Option<Decimal>,

    #[validate(length(max = 5000, message = "description must be at most 5000 characters"))]
    pub description: Option<String>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ProductSearchQuery {
    /// Matches title, description or category name.
    pub q: Option<String>,
    pub category_id: Option<i32>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    /// Only products in stock at this store.
    pub store_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct AutocompleteQuery {
    pub q: Option<String>,
}

/// Search criteria after parsing. Unparsable price bounds are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductSearchFilter {
    pub query: Option<String>,
    pub category_id: Option<i32>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub store_id: Option<i32>,
}

impl From<&ProductSearchQuery> for ProductSearchFilter {
    fn from(query: &ProductSearchQuery) -> Self {
        let price = |raw: &Option<String>| {
            raw.as_deref()
                .and_then(|value| value.trim().parse::<Decimal>().ok())
        };

        Self {
            query: query
                .q
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
            category_id: query.category_id,
            min_price: price(&query.min_price),
            max_price: price(&query.max_price),
            store_id: query.store_id,
        }
    }
}

/// Largest price a `NUMERIC(10,2)` column holds.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

pub const PRICE_SCALE: u32 = 2;

/// Non-negative, at most two decimal places, at most [`MAX_PRICE`].
pub fn valid_price(price: &Decimal) -> Result<(), ValidationError> {
    let message = if price.is_sign_negative() && !price.is_zero() {
        "price must not be negative".to_string()
    } else if price.normalize().scale() > PRICE_SCALE {
        format!("price must have at most {PRICE_SCALE} decimal places")
    } else if *price > MAX_PRICE {
        format!("price must be at most {MAX_PRICE}")
    } else {
        return Ok(());
    };

    let mut err = ValidationError::new("price");
    err.message = Some(message.into());
    Err(err)
}

fn default_active() -> bool {
    true
}
