//! The `domain` module is the in-process publish/subscribe middleware the
//! hello-world publisher talks to.
//!
//! It mirrors the usual DDS entity hierarchy (participant, topic, publisher,
//! data writer, data reader) closely enough that the publisher code reads the
//! same as it would against a full implementation, while leaving out wire
//! protocols and most QoS machinery:
//!
//! - `engine`: the shared domain state, endpoint matching and sample fan-out.
//! - `entity`: typed handles returned to applications.
//! - `message`: the `Sample` envelope and the `TypeSupport` trait.
//! - `qos`: the few delivery-quality settings matching looks at.
//! - `status`: match statuses and the writer listener trait.
//! - `topic`: per-participant topic bookkeeping.

pub mod engine;
pub mod entity;
pub mod message;
pub mod qos;
pub mod status;
pub mod topic;

/// Identifies every entity created inside a domain.
pub type InstanceHandle = uuid::Uuid;

pub use engine::Domain;
pub use entity::{DataReader, DataWriter, Participant, Publisher, TopicHandle};
pub use message::{Sample, TypeSupport};
pub use qos::{DataReaderQos, DataWriterQos, ParticipantQos, PublisherQos, Reliability, TopicQos};
pub use status::{DataWriterListener, PublicationMatchedStatus};
