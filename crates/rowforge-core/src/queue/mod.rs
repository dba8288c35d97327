//! # Queue Producers
//!
//! The stream writer serializes each chunk into a JSON envelope and hands
//! it to a queue producer. Two implementations: AMQP (lapin) and Kafka
//! (rdkafka). Both look synchronous to the caller — the AMQP producer owns
//! a private tokio runtime, the Kafka producer polls its delivery queue
//! inline — which keeps the processor loop free of async plumbing.

pub mod amqp;
pub mod kafka;

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::StreamConfig;
use crate::error::{Result, RowForgeError};
use crate::table::Table;
use crate::writer::BatchInfo;

/// Queue connection establishment timeout.
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// The JSON message wrapper for one chunk.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub batch_info: BatchInfo,
    pub data: Vec<serde_json::Value>,
    pub metadata: EnvelopeMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnvelopeMetadata {
    pub rows: usize,
    pub columns: Vec<String>,
    pub dtypes: IndexMap<String, String>,
}

impl Envelope {
    pub fn from_table(table: &Table, batch_info: BatchInfo) -> Self {
        Envelope {
            batch_info,
            data: crate::writer::formats::json::rows_as_json(table),
            metadata: EnvelopeMetadata {
                rows: table.row_count(),
                columns: table.column_names().map(|s| s.to_string()).collect(),
                dtypes: table.dtypes(),
            },
        }
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| RowForgeError::Other(format!("serializing envelope: {}", e)))
    }
}

/// A connected message-queue producer. Implementations guarantee that
/// message N is submitted before message N+1; delivery is at-most-once
/// beyond the client's own retry policy.
pub trait QueueProducer: Send {
    fn send(&mut self, envelope: &Envelope) -> Result<()>;

    /// Flush pending sends and close the connection.
    fn disconnect(&mut self) -> Result<()>;

    /// Human-readable endpoint description for summaries.
    fn endpoint(&self) -> String;
}

/// Connect a producer for the configured endpoint. Connection failures
/// surface as `NETWORK:ERROR` within the connect timeout.
pub fn connect(config: &StreamConfig) -> Result<Box<dyn QueueProducer>> {
    config.validate()?;
    if let Some(amqp_config) = &config.amqp {
        return Ok(Box::new(amqp::AmqpProducer::connect(amqp_config)?));
    }
    if let Some(kafka_config) = &config.kafka {
        return Ok(Box::new(kafka::KafkaProducer::connect(kafka_config)?));
    }
    unreachable!("validate() enforces exactly one endpoint");
}
