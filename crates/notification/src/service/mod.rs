mod kafka;
mod sender;

pub use self::kafka::KafkaNotificationConsumer;
pub use self::sender::LogNotificationSender;
