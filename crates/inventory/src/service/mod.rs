mod category;
mod inventory;
mod order;
mod product;
mod store;

pub use self::category::CategoryService;
pub use self::inventory::{InventoryService, InventoryServiceDeps};
pub use self::order::{
    OrderCommandService, OrderCommandServiceDeps, OrderQueryService, OrderQueryServiceDeps,
};
pub use self::product::ProductService;
pub use self::store::StoreService;
