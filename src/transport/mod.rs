//! The `transport` module lets subscribers in other processes join a domain.
//!
//! It defines the JSON protocol spoken over WebSocket and the server that
//! turns each remote subscription into a reader inside the [`Domain`], then
//! forwards every sample written to that reader back to the peer.
//!
//! [`Domain`]: crate::domain::Domain

pub mod connection;
pub mod message;
pub mod websocket;

pub use message::{ClientMessage, ServerMessage};
pub use websocket::{bind, serve, start_discovery_server};
