use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateStoreRequest {
    #[validate(length(min = 1, max = 200, message = "name must be 1 to 200 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 300, message = "location must be 1 to 300 characters"))]
    pub location: String,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateStoreRequest {
    #[validate(length(min = 1, max = 200, message = "name must be 1 to 200 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 300, message = "location must be 1 to 300 characters"))]
    pub location: Option<String>,

    pub is_active: Option<bool>,
}

fn default_active() -> bool {
    true
}
