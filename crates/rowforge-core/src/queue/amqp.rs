//! AMQP producer backed by lapin.
//!
//! lapin's API is async; the producer owns a single-threaded tokio runtime
//! and blocks on it, so `send`/`disconnect` are synchronous from the
//! processor's perspective. Publishes are confirmed in order, which gives
//! the message-N-before-N+1 guarantee.

use std::time::Duration;

use lapin::options::{BasicPublishOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Connection, ConnectionProperties};
use tracing::{info, warn};

use crate::config::AmqpConfig;
use crate::error::{Result, RowForgeError};

use super::{Envelope, QueueProducer, CONNECT_TIMEOUT_SECS};

#[derive(Debug)]
pub struct AmqpProducer {
    runtime: tokio::runtime::Runtime,
    connection: Connection,
    channel: lapin::Channel,
    queue: String,
    endpoint: String,
}

impl AmqpProducer {
    pub fn connect(config: &AmqpConfig) -> Result<Self> {
        let mut uri = config.connection_uri();
        if let Some(heartbeat) = config.heartbeat {
            let separator = if uri.contains('?') { '&' } else { '?' };
            uri = format!("{}{}heartbeat={}", uri, separator, heartbeat);
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| RowForgeError::Io {
                action: "starting queue runtime".to_string(),
                source: e,
            })?;

        let connect_err = |message: String| RowForgeError::QueueConnect {
            endpoint: uri.clone(),
            message,
        };

        let connection = runtime.block_on(async {
            tokio::time::timeout(
                Duration::from_secs(CONNECT_TIMEOUT_SECS),
                Connection::connect(&uri, ConnectionProperties::default()),
            )
            .await
            .map_err(|_| {
                connect_err(format!(
                    "connection timed out after {}s",
                    CONNECT_TIMEOUT_SECS
                ))
            })?
            .map_err(|e| connect_err(e.to_string()))
        })?;

        let channel = runtime
            .block_on(connection.create_channel())
            .map_err(|e| connect_err(e.to_string()))?;
        runtime
            .block_on(channel.queue_declare(
                &config.queue,
                QueueDeclareOptions::default(),
                FieldTable::default(),
            ))
            .map_err(|e| connect_err(e.to_string()))?;

        info!("Connected to AMQP broker at {}, queue {}", uri, config.queue);
        Ok(AmqpProducer {
            runtime,
            connection,
            channel,
            queue: config.queue.clone(),
            endpoint: uri,
        })
    }
}

impl QueueProducer for AmqpProducer {
    fn send(&mut self, envelope: &Envelope) -> Result<()> {
        let payload = envelope.to_json_bytes()?;
        let publish_err = |e: lapin::Error| RowForgeError::QueuePublish {
            queue: self.queue.clone(),
            message: e.to_string(),
        };

        self.runtime.block_on(async {
            let confirm = self
                .channel
                .basic_publish(
                    "",
                    &self.queue,
                    BasicPublishOptions::default(),
                    &payload,
                    BasicProperties::default(),
                )
                .await
                .map_err(publish_err)?;
            confirm.await.map_err(publish_err)?;
            Ok(())
        })
    }

    fn disconnect(&mut self) -> Result<()> {
        let result = self.runtime.block_on(self.connection.close(200, "normal"));
        if let Err(e) = result {
            // Close failures on teardown are not worth failing a run over.
            warn!("AMQP disconnect error: {}", e);
        } else {
            info!("Disconnected from AMQP broker");
        }
        Ok(())
    }

    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }
}
