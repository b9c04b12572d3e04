//! Topic management
//!
//! A `Topic` is owned by one participant and names the channel plus the type
//! carried on it. Matching between writers and readers is done on names, so
//! two participants creating a topic of the same name end up on the same
//! channel. A name carries one type across the whole domain. The topic also remembers which endpoints were created on it so
//! that deleting it while in use can be refused.
//!
//! Concurrency note: callers must synchronize access to `Topic` (for example
//! via the domain lock) when modifying endpoints.

use std::collections::HashSet;

use crate::domain::InstanceHandle;

#[derive(Debug)]
pub struct Topic {
    pub name: String,
    pub type_name: String,
    pub participant: InstanceHandle,
    pub endpoints: HashSet<InstanceHandle>,
}

impl Topic {
    /// Create a new topic with the given name and type.
    pub fn new(name: &str, type_name: &str, participant: InstanceHandle) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
            participant,
            endpoints: HashSet::new(),
        }
    }

    /// Record a writer or reader created on this topic. Duplicate adds are ignored.
    pub fn attach(&mut self, endpoint: InstanceHandle) {
        self.endpoints.insert(endpoint);
    }

    /// Forget a writer or reader.
    pub fn detach(&mut self, endpoint: &InstanceHandle) {
        self.endpoints.remove(endpoint);
    }

    pub fn in_use(&self) -> bool {
        !self.endpoints.is_empty()
    }
}

/// A topic name is usable if it is non-empty and carries no whitespace.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(char::is_whitespace)
}
