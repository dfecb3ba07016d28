use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::store::Store as StoreModel;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct StoreResponse {
    pub id: i32,
    pub name: String,
    pub location: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<StoreModel> for StoreResponse {
    fn from(value: StoreModel) -> Self {
        StoreResponse {
            id: value.store_id,
            name: value.name,
            location: value.location,
            is_active: value.is_active,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct StoreSummary {
    pub id: i32,
    pub name: String,
}
