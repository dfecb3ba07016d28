use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::product::Product as ProductModel;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ProductResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,
    pub category: CategorySummary,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductModel> for ProductResponse {
    fn from(value: ProductModel) -> Self {
        ProductResponse {
            id: value.product_id,
            title: value.title,
            description: value.description,
            price: value.price,
            category: CategorySummary {
                id: value.category_id,
                name: value.category_name,
            },
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ProductAutocompleteResponse {
    pub id: i32,
    pub title: String,
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,
}

impl From<ProductModel> for ProductAutocompleteResponse {
    fn from(value: ProductModel) -> Self {
        ProductAutocompleteResponse {
            id: value.product_id,
            title: value.title,
            price: value.price,
        }
    }
}
