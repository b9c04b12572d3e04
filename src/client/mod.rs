//! The `client` module is the remote side of the discovery transport.
//!
//! It provides [`SubscriberClient`], which connects to a publisher's
//! discovery server, subscribes with a topic/type contract and yields typed
//! samples.

pub mod subscriber_client;
pub use subscriber_client::SubscriberClient;
