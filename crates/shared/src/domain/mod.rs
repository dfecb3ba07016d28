mod event;
mod response;

pub use self::event::{ORDER_CONFIRMED_TOPIC, OrderEvent};
pub use self::response::ApiResponse;
