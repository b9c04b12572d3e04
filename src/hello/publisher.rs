//! Hello-world publisher
//!
//! Owns the participant → topic → publisher → data writer chain for the
//! hello-world topic and only writes while at least one subscriber is
//! matched. Messages published with nobody listening are dropped, not queued.
//!
//! Teardown happens in `Drop`, in reverse creation order, skipping whatever
//! `init` never got to create.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use tracing::{error, info, warn};

use crate::config::PublisherSettings;
use crate::domain::{
    DataWriter, DataWriterListener, DataWriterQos, Domain, Participant, ParticipantQos,
    PublicationMatchedStatus, Publisher, PublisherQos, TopicHandle, TopicQos, TypeSupport,
};
use crate::hello::msg::HelloWorldMsg;
use crate::utils::{Error, Result};

/// Tracks how many subscribers are matched with the writer.
///
/// Written from the domain's listener thread, read from the timer task.
#[derive(Debug, Default)]
pub struct PubListener {
    matched: AtomicU32,
}

impl PubListener {
    pub fn matched(&self) -> u32 {
        self.matched.load(Ordering::SeqCst)
    }
}

impl DataWriterListener for PubListener {
    fn on_publication_matched(&self, info: PublicationMatchedStatus) {
        match info.current_count_change {
            1 => {
                self.matched.store(info.current_count, Ordering::SeqCst);
                info!("Publisher matched.");
            }
            -1 => {
                self.matched.store(info.current_count, Ordering::SeqCst);
                info!("Publisher unmatched.");
            }
            other => {
                warn!(
                    "{other} is not a valid value for PublicationMatchedStatus current count change."
                );
            }
        }
    }
}

pub struct HelloWorldPublisher {
    domain: Domain,
    settings: PublisherSettings,
    participant: Option<Participant>,
    topic: Option<TopicHandle>,
    publisher: Option<Publisher>,
    writer: Option<DataWriter<HelloWorldMsg>>,
    listener: Arc<PubListener>,
}

impl HelloWorldPublisher {
    pub fn new(domain: Domain, settings: PublisherSettings) -> Self {
        Self {
            domain,
            settings,
            participant: None,
            topic: None,
            publisher: None,
            writer: None,
            listener: Arc::new(PubListener::default()),
        }
    }

    /// Initialize the publisher.
    ///
    /// Stops at the first step that fails; whatever was created up to that
    /// point is released on drop.
    pub fn init(&mut self) -> Result<()> {
        if self.participant.is_some() {
            return Err(Error::InvalidState("init already ran".to_string()));
        }

        let participant = self
            .domain
            .create_participant(ParticipantQos::named(self.settings.participant_name.as_str()))?;
        let participant = self.participant.insert(participant);

        HelloWorldMsg::register_type(participant)?;

        // topic and type names are the contract with subscribers
        let topic = participant.create_topic(
            &self.settings.topic_name,
            HelloWorldMsg::TYPE_NAME,
            &TopicQos::default(),
        )?;
        let topic = self.topic.insert(topic);

        let publisher = participant.create_publisher(&PublisherQos::default())?;
        let publisher = self.publisher.insert(publisher);

        let listener: Arc<dyn DataWriterListener> = self.listener.clone();
        let writer = publisher.create_datawriter::<HelloWorldMsg>(
            topic,
            &DataWriterQos::default(),
            Some(listener),
        )?;
        self.writer = Some(writer);
        Ok(())
    }

    /// Send a publication.
    ///
    /// Returns `Ok(false)` without writing when no subscriber is matched.
    pub fn publish(&self, hello: &HelloWorldMsg) -> Result<bool> {
        let writer = self.writer.as_ref().ok_or(Error::NotInitialized)?;
        if self.listener.matched() > 0 {
            writer.write(hello)?;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn is_initialized(&self) -> bool {
        self.writer.is_some()
    }

    pub fn matched(&self) -> u32 {
        self.listener.matched()
    }
}

impl Drop for HelloWorldPublisher {
    fn drop(&mut self) {
        if let (Some(writer), Some(publisher)) = (self.writer.take(), self.publisher.as_ref()) {
            if let Err(e) = publisher.delete_datawriter(&writer) {
                error!("Failed to delete data writer: {e}");
            }
        }
        if let (Some(publisher), Some(participant)) = (self.publisher.take(), self.participant.as_ref()) {
            if let Err(e) = participant.delete_publisher(&publisher) {
                error!("Failed to delete publisher: {e}");
            }
        }
        if let (Some(topic), Some(participant)) = (self.topic.take(), self.participant.as_ref()) {
            if let Err(e) = participant.delete_topic(&topic) {
                error!("Failed to delete topic: {e}");
            }
        }
        if let Some(participant) = self.participant.take() {
            if let Err(e) = self.domain.delete_participant(&participant) {
                error!("Failed to delete participant: {e}");
            }
        }
    }
}
