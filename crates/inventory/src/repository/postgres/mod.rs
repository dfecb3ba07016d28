mod category;
mod inventory;
mod order_query;
mod order_transaction;
mod product;
mod store;

pub use self::category::CategoryRepository;
pub use self::inventory::InventoryRepository;
pub use self::order_query::OrderQueryRepository;
pub use self::order_transaction::{OrderTransactionManager, PgOrderTransaction};
pub use self::product::ProductRepository;
pub use self::store::StoreRepository;
