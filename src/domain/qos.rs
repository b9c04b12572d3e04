//! Delivery-quality settings.
//!
//! Only reliability takes part in matching: a writer must offer at least
//! what a reader requests. Everything else is left at defaults.

use serde::{Deserialize, Serialize};

/// Ordered so that `BestEffort < Reliable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reliability {
    BestEffort,
    Reliable,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParticipantQos {
    pub name: String,
}

impl ParticipantQos {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TopicQos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PublisherQos;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataWriterQos {
    pub reliability: Reliability,
}

impl Default for DataWriterQos {
    fn default() -> Self {
        Self {
            reliability: Reliability::Reliable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataReaderQos {
    pub reliability: Reliability,
}

impl Default for DataReaderQos {
    fn default() -> Self {
        Self {
            reliability: Reliability::BestEffort,
        }
    }
}
