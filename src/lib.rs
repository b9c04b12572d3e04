//! # dds-hello
//!
//! `dds-hello` is a minimal periodic publisher: once per interval it sends a
//! counter-tagged greeting on a typed topic, but only while at least one
//! subscriber is matched.
//!
//! ## Core Modules
//!
//! - `domain`: the in-process publish/subscribe middleware (participants,
//!   topics, writers, readers, matching and match listeners).
//! - `transport`: the WebSocket discovery server that lets subscribers in
//!   other processes join a domain.
//! - `client`: the subscriber side of that transport.
//! - `hello`: the hello-world message, publisher, timer and emitter.
//! - `config`: configuration loading and defaults.
//! - `utils`: the crate error type and logging bootstrap.

pub mod client;
pub mod config;
pub mod domain;
pub mod hello;
pub mod transport;
pub mod utils;
