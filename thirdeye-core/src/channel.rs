//! Durable event channel between the detection and announcement processes
//!
//! One named queue on an AMQP broker, FIFO with at-least-once delivery and
//! explicit per-message acknowledgment. This is the sole synchronization
//! primitive in the system: the producer never waits for the consumer, and a
//! slow announcement simply lets messages accumulate on the broker.

use crate::config::ChannelConfig;
use crate::error::{Error, Result};
use crate::types::StableEvent;
use futures_util::StreamExt;
use lapin::acker::Acker;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicPublishOptions, BasicQosOptions,
    QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, Consumer};
use tracing::{debug, info};

const CONSUMER_TAG: &str = "thirdeye-spk";

/// AMQP persistent delivery mode, so messages survive a broker restart.
const DELIVERY_MODE_PERSISTENT: u8 = 2;

async fn open_channel(config: &ChannelConfig) -> Result<(Connection, Channel)> {
    config.validate().map_err(Error::Configuration)?;

    let connection = Connection::connect(&config.uri, ConnectionProperties::default()).await?;
    let channel = connection.create_channel().await?;

    // Idempotent: redeclaring with identical parameters is a no-op.
    channel
        .queue_declare(
            &config.queue,
            QueueDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await?;

    info!("Event channel ready on queue '{}'", config.queue);
    Ok((connection, channel))
}

/// Producer side of the event channel.
pub struct EventPublisher {
    connection: Connection,
    channel: Channel,
    queue: String,
}

impl EventPublisher {
    /// Connect to the broker and declare the queue.
    pub async fn connect(config: &ChannelConfig) -> Result<Self> {
        let (connection, channel) = open_channel(config).await?;
        Ok(Self {
            connection,
            channel,
            queue: config.queue.clone(),
        })
    }

    /// Publish one stable event as a persistent message.
    pub async fn publish(&self, event: &StableEvent) -> Result<()> {
        let payload = event.to_payload()?;
        self.channel
            .basic_publish(
                "",
                &self.queue,
                BasicPublishOptions::default(),
                &payload,
                BasicProperties::default().with_delivery_mode(DELIVERY_MODE_PERSISTENT),
            )
            .await?
            .await?;
        debug!("Published stable event '{}'", event.label);
        Ok(())
    }

    /// Release the broker connection.
    pub async fn close(self) -> Result<()> {
        self.connection.close(200, "bye").await?;
        Ok(())
    }
}

/// Consumer side of the event channel.
///
/// Prefetch is pinned to one so the broker holds everything beyond the
/// message currently being announced.
pub struct EventConsumer {
    connection: Connection,
    consumer: Consumer,
}

impl EventConsumer {
    /// Connect to the broker, declare the queue, and start consuming.
    pub async fn connect(config: &ChannelConfig) -> Result<Self> {
        let (connection, channel) = open_channel(config).await?;
        channel.basic_qos(1, BasicQosOptions::default()).await?;
        let consumer = channel
            .basic_consume(
                &config.queue,
                CONSUMER_TAG,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await?;
        Ok(Self {
            connection,
            consumer,
        })
    }

    /// Wait for the next delivery.
    ///
    /// Returns `Ok(None)` when the broker closes the consume stream.
    pub async fn next_delivery(&mut self) -> Result<Option<EventDelivery>> {
        match self.consumer.next().await {
            Some(Ok(delivery)) => Ok(Some(EventDelivery {
                payload: delivery.data,
                delivery_tag: delivery.delivery_tag,
                acker: delivery.acker,
            })),
            Some(Err(e)) => Err(e.into()),
            None => Ok(None),
        }
    }

    /// Release the broker connection.
    pub async fn close(self) -> Result<()> {
        self.connection.close(200, "bye").await?;
        Ok(())
    }
}

/// One message pulled from the queue, held until acknowledged.
///
/// If this is dropped without [`ack`](Self::ack) (consumer crash or
/// disconnect), the broker redelivers the message: at-least-once semantics.
pub struct EventDelivery {
    payload: Vec<u8>,
    delivery_tag: u64,
    acker: Acker,
}

impl EventDelivery {
    /// Decode the payload into a stable event.
    pub fn decode(&self) -> Result<StableEvent> {
        StableEvent::from_payload(&self.payload)
    }

    /// Raw message body.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Broker-assigned tag identifying this delivery.
    pub fn delivery_tag(&self) -> u64 {
        self.delivery_tag
    }

    /// Acknowledge the message, letting the broker drop it.
    pub async fn ack(self) -> Result<()> {
        self.acker.ack(BasicAckOptions::default()).await?;
        Ok(())
    }
}
