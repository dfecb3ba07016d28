use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateInventoryRequest {
    #[validate(range(min = 1, message = "store_id must be positive"))]
    pub store_id: i32,

    #[validate(range(min = 1, message = "product_id must be positive"))]
    pub product_id: i32,

    #[validate(range(min = 0, message = "quantity must not be negative"))]
    pub quantity: i32,

    #[validate(range(min = 0, message = "low_stock_threshold must not be negative"))]
    pub low_stock_threshold: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateInventoryRequest {
    #[validate(range(min = 0, message = "quantity must not be negative"))]
    pub quantity: Option<i32>,

    #[validate(range(min = 0, message = "low_stock_threshold must not be negative"))]
    pub low_stock_threshold: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct InventoryFilter {
    pub store_id: Option<i32>,
    pub product_id: Option<i32>,
    /// `true` keeps rows at or below their threshold.
    pub low_stock: Option<bool>,
}
