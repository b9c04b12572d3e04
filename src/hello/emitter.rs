//! Event emitter
//!
//! Drives the hello-world publisher from a [`PeriodicTimer`]. Every tick
//! builds a fresh message carrying the current sequence index and tries to
//! publish it; the index only advances when the message actually went out.
//!
//! Lifecycle: `Created → Initializing → Running → Stopped`. A failed
//! initialization goes straight to `Stopped` without arming the timer, and
//! nothing leaves `Stopped`.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::{error, info, warn};

use crate::config::EmitterSettings;
use crate::hello::msg::HelloWorldMsg;
use crate::hello::publisher::HelloWorldPublisher;
use crate::hello::timer::PeriodicTimer;
use crate::utils::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterState {
    Created,
    Initializing,
    Running,
    Stopped,
}

/// What a single tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Sent { index: u32 },
    NoListener,
    Failed(String),
}

struct TickContext {
    publisher: HelloWorldPublisher,
    payload: String,
    samples_sent: Mutex<u32>,
}

impl TickContext {
    fn next_index(&self) -> u32 {
        *self.samples_sent.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // The index lock is held across the publish, so concurrent ticks never
    // send the same index twice.
    fn tick(&self) -> TickOutcome {
        let mut samples_sent = self.samples_sent.lock().unwrap_or_else(PoisonError::into_inner);
        let index = *samples_sent;
        let hello = HelloWorldMsg::new(self.payload.as_str(), index);

        match self.publisher.publish(&hello) {
            Ok(true) => {
                info!(
                    "Message: {} with index: {} SENT",
                    hello.message, hello.index
                );
                *samples_sent += 1;
                TickOutcome::Sent { index }
            }
            Ok(false) => {
                info!("No messages sent as there is no listener.");
                TickOutcome::NoListener
            }
            Err(e) => {
                error!("Failed to publish message with index {index}: {e}");
                TickOutcome::Failed(e.to_string())
            }
        }
    }
}

pub struct EventEmitter {
    state: EmitterState,
    period: Duration,
    context: Arc<TickContext>,
    timer: Option<PeriodicTimer>,
}

impl EventEmitter {
    pub fn new(publisher: HelloWorldPublisher, settings: &EmitterSettings) -> Self {
        Self {
            state: EmitterState::Created,
            period: settings.period(),
            context: Arc::new(TickContext {
                publisher,
                payload: settings.payload.clone(),
                samples_sent: Mutex::new(1),
            }),
            timer: None,
        }
    }

    /// Initializes the publisher and arms the timer. Must be called from
    /// within a tokio runtime.
    ///
    /// On initialization failure the error is logged and returned, and the
    /// timer is never armed.
    pub fn start(&mut self) -> Result<()> {
        if self.state != EmitterState::Created {
            return Err(Error::InvalidState(format!(
                "cannot start emitter in state {:?}",
                self.state
            )));
        }
        info!("Starting publisher.");
        if self.period.is_zero() {
            error!("Pub not started: emitter period must be non-zero");
            self.state = EmitterState::Stopped;
            return Err(Error::InvalidState("emitter period must be non-zero".to_string()));
        }
        self.state = EmitterState::Initializing;

        // nothing else holds the context until the timer is armed
        let Some(context) = Arc::get_mut(&mut self.context) else {
            self.state = EmitterState::Stopped;
            return Err(Error::InvalidState("tick context is shared".to_string()));
        };
        if let Err(e) = context.publisher.init() {
            error!("Pub not init'd: {e}");
            self.state = EmitterState::Stopped;
            return Err(e);
        }

        let context = Arc::clone(&self.context);
        let timer = PeriodicTimer::start(self.period, move || {
            context.tick();
        });
        match timer {
            Ok(timer) => self.timer = Some(timer),
            Err(e) => {
                error!("Timer not armed: {e}");
                self.state = EmitterState::Stopped;
                return Err(e);
            }
        }
        self.state = EmitterState::Running;
        Ok(())
    }

    /// Runs one tick on the caller's thread. Safe while the timer is armed.
    pub fn tick(&self) -> TickOutcome {
        self.context.tick()
    }

    /// Disarms the timer. Safe to call in any state.
    pub async fn stop(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.stop().await;
        }
        if self.state == EmitterState::Running {
            info!("Publisher stopped after {} messages.", self.samples_sent() - 1);
        } else if self.state != EmitterState::Stopped {
            warn!("Emitter stopped before it was running");
        }
        self.state = EmitterState::Stopped;
    }

    pub fn state(&self) -> EmitterState {
        self.state
    }

    /// The index the next successful send will carry.
    pub fn samples_sent(&self) -> u32 {
        self.context.next_index()
    }

    pub fn publisher(&self) -> &HelloWorldPublisher {
        &self.context.publisher
    }
}
