//! Event channel configuration

use serde::{Deserialize, Serialize};

/// Well-known queue shared by the detection and announcement processes.
pub const DEFAULT_QUEUE: &str = "detection_results";

/// Default broker address (local RabbitMQ).
pub const DEFAULT_AMQP_URI: &str = "amqp://127.0.0.1:5672/%2f";

/// Connection parameters for the event channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// AMQP broker URI.
    pub uri: String,
    /// Name of the durable queue carrying stable events.
    pub queue: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_AMQP_URI.to_string(),
            queue: DEFAULT_QUEUE.to_string(),
        }
    }
}

impl ChannelConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.uri.is_empty() {
            return Err("Broker URI must not be empty".to_string());
        }
        if !self.uri.starts_with("amqp://") && !self.uri.starts_with("amqps://") {
            return Err("Broker URI must use the amqp:// or amqps:// scheme".to_string());
        }
        if self.queue.is_empty() {
            return Err("Queue name must not be empty".to_string());
        }
        if self.queue.len() > 255 {
            return Err("Queue name too long (max 255 chars)".to_string());
        }
        Ok(())
    }
}
