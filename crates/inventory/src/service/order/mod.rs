mod command;
mod fulfillment;
mod query;

pub use self::command::{OrderCommandService, OrderCommandServiceDeps};
pub use self::query::{OrderQueryService, OrderQueryServiceDeps};
