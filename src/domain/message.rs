//! Sample envelope and type registration.
//!
//! `Sample` is what travels from a writer to its matched readers, both in
//! process and over the discovery transport. Fields:
//! - `topic` / `type_name`: the contract the writer was created with
//! - `writer`: handle of the writing endpoint
//! - `sequence_number`: per-writer counter, starting at 1
//! - `timestamp`: milliseconds since UNIX epoch, set on write
//! - `payload`: the JSON encoding of the typed value

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::InstanceHandle;
use crate::domain::entity::Participant;
use crate::utils::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub topic: String,
    pub type_name: String,
    pub writer: InstanceHandle,
    pub sequence_number: u64,
    pub timestamp: i64,
    pub payload: String,
}

impl Sample {
    /// Decode the payload, refusing samples of another type.
    pub fn decode<T: TypeSupport>(&self) -> Result<T> {
        if self.type_name != T::TYPE_NAME {
            return Err(Error::TypeMismatch {
                topic_type: self.type_name.clone(),
                requested: T::TYPE_NAME.to_string(),
            });
        }
        Ok(serde_json::from_str(&self.payload)?)
    }
}

/// A type that can be published on a topic.
///
/// `TYPE_NAME` is the name advertised to remote readers; it must match what
/// they subscribe with.
pub trait TypeSupport: Serialize + DeserializeOwned + Send + 'static {
    const TYPE_NAME: &'static str;

    fn register_type(participant: &Participant) -> Result<()> {
        participant.register_type(Self::TYPE_NAME)
    }
}
