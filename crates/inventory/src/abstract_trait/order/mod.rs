mod repository;
mod service;
mod transaction;

pub use self::repository::*;
pub use self::service::*;
pub use self::transaction::*;
