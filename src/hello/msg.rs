use serde::{Deserialize, Serialize};

use crate::domain::TypeSupport;

/// The greeting published on the hello-world topic.
///
/// Subscribers must use the same type name and field layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloWorldMsg {
    pub message: String,
    pub index: u32,
}

impl HelloWorldMsg {
    pub fn new(message: impl Into<String>, index: u32) -> Self {
        Self {
            message: message.into(),
            index,
        }
    }
}

impl TypeSupport for HelloWorldMsg {
    const TYPE_NAME: &'static str = "HelloWorldMsg";
}
