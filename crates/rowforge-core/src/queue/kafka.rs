//! Kafka producer backed by rdkafka's `BaseProducer`.
//!
//! rdkafka buffers internally and dispatches from its own background
//! thread; `send` enqueues and polls, `disconnect` flushes. The connect
//! check is a metadata probe against the target topic, bounded by the
//! shared connect timeout.

use std::time::Duration;

use rdkafka::config::ClientConfig;
use rdkafka::producer::{BaseProducer, BaseRecord, Producer};
use tracing::info;

use crate::config::KafkaConfig;
use crate::error::{Result, RowForgeError};

use super::{Envelope, QueueProducer, CONNECT_TIMEOUT_SECS};

pub struct KafkaProducer {
    producer: BaseProducer,
    topic: String,
    endpoint: String,
}

impl KafkaProducer {
    pub fn connect(config: &KafkaConfig) -> Result<Self> {
        let endpoint = format!("kafka://{}", config.bootstrap_servers);
        let connect_err = |message: String| RowForgeError::QueueConnect {
            endpoint: endpoint.clone(),
            message,
        };

        let mut client_config = ClientConfig::new();
        client_config
            .set("bootstrap.servers", &config.bootstrap_servers)
            .set("message.timeout.ms", "10000");
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            client_config
                .set("security.protocol", "SASL_PLAINTEXT")
                .set("sasl.mechanism", "PLAIN")
                .set("sasl.username", username)
                .set("sasl.password", password);
        }

        let producer: BaseProducer = client_config
            .create()
            .map_err(|e| connect_err(e.to_string()))?;

        // rdkafka connects lazily; a metadata fetch forces the handshake so
        // unreachable brokers fail here, before any chunk is emitted.
        producer
            .client()
            .fetch_metadata(
                Some(&config.topic),
                Duration::from_secs(CONNECT_TIMEOUT_SECS),
            )
            .map_err(|e| connect_err(e.to_string()))?;

        info!(
            "Connected to Kafka at {}, topic {}",
            config.bootstrap_servers, config.topic
        );
        Ok(KafkaProducer {
            producer,
            topic: config.topic.clone(),
            endpoint,
        })
    }
}

impl QueueProducer for KafkaProducer {
    fn send(&mut self, envelope: &Envelope) -> Result<()> {
        let payload = envelope.to_json_bytes()?;
        self.producer
            .send(BaseRecord::<(), [u8]>::to(&self.topic).payload(payload.as_slice()))
            .map_err(|(e, _)| RowForgeError::QueuePublish {
                queue: self.topic.clone(),
                message: e.to_string(),
            })?;
        // Serve delivery callbacks without blocking the generation loop.
        self.producer.poll(Duration::from_millis(0));
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        self.producer
            .flush(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .map_err(|e| RowForgeError::QueuePublish {
                queue: self.topic.clone(),
                message: format!("flush on disconnect failed: {}", e),
            })
    }

    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }
}
