//! The `error` module defines the error type used throughout the crate.
//!
//! Domain entity creation and deletion, publishing, the discovery transport
//! and configuration loading all report failures through [`Error`]. Routine
//! conditions such as "no subscriber matched" are not errors and never show
//! up here.

use thiserror::Error;

use crate::domain::InstanceHandle;

#[derive(Debug, Error)]
pub enum Error {
    /// The domain refused to create another entity.
    #[error("resource limit reached: at most {limit} {entity} allowed")]
    ResourceLimit { entity: &'static str, limit: usize },

    #[error("invalid topic name {0:?}")]
    InvalidTopicName(String),

    #[error("type `{0}` is not registered with the participant")]
    TypeNotRegistered(String),

    /// A topic of that name already exists in the domain with another type.
    #[error("topic `{topic}` already exists with type `{existing}`, requested `{requested}`")]
    TopicTypeMismatch {
        topic: String,
        existing: String,
        requested: String,
    },

    #[error("participant already created topic `{0}`")]
    DuplicateTopic(String),

    #[error("type `{requested}` does not match topic type `{topic_type}`")]
    TypeMismatch {
        topic_type: String,
        requested: String,
    },

    #[error("entity {0} not found")]
    NotFound(InstanceHandle),

    /// The entity still owns children that must be deleted first.
    #[error("precondition not met: {0}")]
    PreconditionNotMet(&'static str),

    #[error("publisher is not initialized")]
    NotInitialized,

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("connection closed")]
    ConnectionClosed,

    /// The remote end reported an error over the discovery transport.
    #[error("remote error: {0}")]
    Remote(String),
}

impl Error {
    /// True when the transport underneath is gone and retrying the read
    /// cannot succeed.
    pub fn is_connection_lost(&self) -> bool {
        matches!(self, Error::WebSocket(_) | Error::Io(_) | Error::ConnectionClosed)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
