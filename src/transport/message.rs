use serde::{Deserialize, Serialize};

use crate::domain::{InstanceHandle, Reliability, Sample};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Join `topic` as a reader of `type_name`. Reliability defaults to best effort.
    #[serde(rename = "subscribe")]
    Subscribe {
        topic: String,
        type_name: String,
        reliability: Option<Reliability>,
    },
    #[serde(rename = "unsubscribe")]
    Unsubscribe { topic: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "subscribed")]
    Subscribed {
        topic: String,
        reader: InstanceHandle,
    },
    #[serde(rename = "unsubscribed")]
    Unsubscribed { topic: String },
    #[serde(rename = "sample")]
    Sample(Sample),
    #[serde(rename = "error")]
    Error { message: String },
}
