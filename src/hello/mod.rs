//! The `hello` module is the hello-world application itself: the message
//! type, the publisher that gates sends on matched subscribers, and the
//! emitter that drives it from a periodic timer.

pub mod emitter;
pub mod msg;
pub mod publisher;
pub mod timer;

pub use emitter::{EmitterState, EventEmitter, TickOutcome};
pub use msg::HelloWorldMsg;
pub use publisher::{HelloWorldPublisher, PubListener};
pub use timer::PeriodicTimer;

#[cfg(test)]
mod tests;
