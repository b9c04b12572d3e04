//! Domain engine
//!
//! This module contains the in-memory domain implementation responsible for:
//! - creating and deleting participants, topics, publishers and endpoints
//! - matching writers with readers on topic name, type name and reliability
//! - reporting every match and unmatch to the writer's listener
//! - fanning written samples out to matched readers
//!
//! Concurrency and usage notes:
//! - All state sits behind one mutex inside [`Domain`]; the lock is only held
//!   for bookkeeping and channel hand-offs, never across I/O or callbacks.
//! - Listener events are queued while the lock is held and delivered later on
//!   the listener thread, in queue order.
//! - Reader channels are unbounded so `write` never waits on a slow reader.

use std::collections::{HashMap, HashSet};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::DomainSettings;
use crate::domain::InstanceHandle;
use crate::domain::entity::Participant;
use crate::domain::message::Sample;
use crate::domain::qos::{DataReaderQos, DataWriterQos, ParticipantQos, Reliability};
use crate::domain::status::{self, DataWriterListener, ListenerEvent, PublicationMatchedStatus};
use crate::domain::topic::{self, Topic};
use crate::utils::{Error, Result};

/// What matching looks at, shared by writers and readers.
#[derive(Debug, Clone)]
pub(crate) struct EndpointKey {
    pub topic_name: String,
    pub type_name: String,
    pub reliability: Reliability,
}

impl EndpointKey {
    fn matches_reader(&self, reader: &EndpointKey) -> bool {
        if self.topic_name != reader.topic_name {
            return false;
        }
        if self.type_name != reader.type_name {
            warn!(
                "Topic '{}': writer type '{}' does not match reader type '{}', not matching",
                self.topic_name, self.type_name, reader.type_name
            );
            return false;
        }
        if self.reliability < reader.reliability {
            warn!(
                "Topic '{}': writer offers {:?} but reader requests {:?}, not matching",
                self.topic_name, self.reliability, reader.reliability
            );
            return false;
        }
        true
    }
}

#[derive(Debug)]
pub(crate) struct ParticipantEntry {
    pub name: String,
    pub types: HashSet<String>,
}

#[derive(Debug)]
pub(crate) struct PublisherEntry {
    pub participant: InstanceHandle,
    pub writers: HashSet<InstanceHandle>,
}

pub(crate) struct WriterEntry {
    pub publisher: InstanceHandle,
    pub topic: InstanceHandle,
    pub key: EndpointKey,
    pub listener: Option<Arc<dyn DataWriterListener>>,
    pub matched: HashSet<InstanceHandle>,
    pub total_count: u32,
    pub sequence_number: u64,
}

pub(crate) struct ReaderEntry {
    /// `None` for readers created on behalf of a remote peer.
    pub participant: Option<InstanceHandle>,
    pub topic: Option<InstanceHandle>,
    pub key: EndpointKey,
    pub sender: UnboundedSender<Sample>,
    pub matched: HashSet<InstanceHandle>,
}

pub(crate) struct DomainState {
    pub participants: HashMap<InstanceHandle, ParticipantEntry>,
    pub topics: HashMap<InstanceHandle, Topic>,
    pub publishers: HashMap<InstanceHandle, PublisherEntry>,
    pub writers: HashMap<InstanceHandle, WriterEntry>,
    pub readers: HashMap<InstanceHandle, ReaderEntry>,
    events: mpsc::Sender<ListenerEvent>,
}

impl DomainState {
    fn new(events: mpsc::Sender<ListenerEvent>) -> Self {
        Self {
            participants: HashMap::new(),
            topics: HashMap::new(),
            publishers: HashMap::new(),
            writers: HashMap::new(),
            readers: HashMap::new(),
            events,
        }
    }

    fn participant(&self, id: &InstanceHandle) -> Result<&ParticipantEntry> {
        self.participants.get(id).ok_or(Error::NotFound(*id))
    }

    pub(crate) fn register_type(&mut self, participant: &InstanceHandle, type_name: &str) -> Result<()> {
        let entry = self
            .participants
            .get_mut(participant)
            .ok_or(Error::NotFound(*participant))?;
        if entry.types.insert(type_name.to_string()) {
            debug!("Registered type {type_name} with participant {}", entry.name);
        }
        Ok(())
    }

    pub(crate) fn add_topic(
        &mut self,
        participant: &InstanceHandle,
        name: &str,
        type_name: &str,
    ) -> Result<InstanceHandle> {
        if !topic::is_valid_name(name) {
            return Err(Error::InvalidTopicName(name.to_string()));
        }
        let entry = self.participant(participant)?;
        if !entry.types.contains(type_name) {
            return Err(Error::TypeNotRegistered(type_name.to_string()));
        }
        // one type per topic name across the whole domain
        if let Some(existing) = self
            .topics
            .values()
            .find(|t| t.name == name && t.type_name != type_name)
        {
            return Err(Error::TopicTypeMismatch {
                topic: name.to_string(),
                existing: existing.type_name.clone(),
                requested: type_name.to_string(),
            });
        }
        if self
            .topics
            .values()
            .any(|t| t.participant == *participant && t.name == name)
        {
            return Err(Error::DuplicateTopic(name.to_string()));
        }

        let id = Uuid::new_v4();
        self.topics
            .insert(id, Topic::new(name, type_name, *participant));
        debug!("Created topic {name} ({type_name})");
        Ok(id)
    }

    pub(crate) fn remove_topic(&mut self, participant: &InstanceHandle, id: &InstanceHandle) -> Result<()> {
        let topic = self.topics.get(id).ok_or(Error::NotFound(*id))?;
        if topic.participant != *participant {
            return Err(Error::PreconditionNotMet("topic belongs to another participant"));
        }
        if topic.in_use() {
            return Err(Error::PreconditionNotMet("topic still has writers or readers"));
        }
        self.topics.remove(id);
        Ok(())
    }

    pub(crate) fn add_publisher(&mut self, participant: &InstanceHandle) -> Result<InstanceHandle> {
        self.participant(participant)?;
        let id = Uuid::new_v4();
        self.publishers.insert(
            id,
            PublisherEntry {
                participant: *participant,
                writers: HashSet::new(),
            },
        );
        Ok(id)
    }

    pub(crate) fn remove_publisher(&mut self, participant: &InstanceHandle, id: &InstanceHandle) -> Result<()> {
        let publisher = self.publishers.get(id).ok_or(Error::NotFound(*id))?;
        if publisher.participant != *participant {
            return Err(Error::PreconditionNotMet("publisher belongs to another participant"));
        }
        if !publisher.writers.is_empty() {
            return Err(Error::PreconditionNotMet("publisher still has data writers"));
        }
        self.publishers.remove(id);
        Ok(())
    }

    pub(crate) fn add_writer(
        &mut self,
        publisher: &InstanceHandle,
        topic: &InstanceHandle,
        type_name: &str,
        qos: &DataWriterQos,
        listener: Option<Arc<dyn DataWriterListener>>,
    ) -> Result<InstanceHandle> {
        let owner = self
            .publishers
            .get(publisher)
            .ok_or(Error::NotFound(*publisher))?
            .participant;
        let topic_entry = self.topics.get_mut(topic).ok_or(Error::NotFound(*topic))?;
        if topic_entry.participant != owner {
            return Err(Error::PreconditionNotMet("topic belongs to another participant"));
        }
        if topic_entry.type_name != type_name {
            return Err(Error::TypeMismatch {
                topic_type: topic_entry.type_name.clone(),
                requested: type_name.to_string(),
            });
        }

        let id = Uuid::new_v4();
        let key = EndpointKey {
            topic_name: topic_entry.name.clone(),
            type_name: topic_entry.type_name.clone(),
            reliability: qos.reliability,
        };
        topic_entry.attach(id);
        if let Some(entry) = self.publishers.get_mut(publisher) {
            entry.writers.insert(id);
        }

        let candidates: Vec<InstanceHandle> = self
            .readers
            .iter()
            .filter(|(_, reader)| key.matches_reader(&reader.key))
            .map(|(reader_id, _)| *reader_id)
            .collect();

        debug!("Created data writer {id} on {}", key.topic_name);
        self.writers.insert(
            id,
            WriterEntry {
                publisher: *publisher,
                topic: *topic,
                key,
                listener,
                matched: HashSet::new(),
                total_count: 0,
                sequence_number: 0,
            },
        );

        for reader_id in candidates {
            self.link(&id, &reader_id);
        }
        Ok(id)
    }

    pub(crate) fn remove_writer(&mut self, publisher: &InstanceHandle, id: &InstanceHandle) -> Result<()> {
        let writer = self.writers.get(id).ok_or(Error::NotFound(*id))?;
        if writer.publisher != *publisher {
            return Err(Error::PreconditionNotMet("data writer belongs to another publisher"));
        }
        let Some(writer) = self.writers.remove(id) else {
            return Err(Error::NotFound(*id));
        };

        for reader_id in &writer.matched {
            if let Some(reader) = self.readers.get_mut(reader_id) {
                reader.matched.remove(id);
            }
        }
        if let Some(topic) = self.topics.get_mut(&writer.topic) {
            topic.detach(id);
        }
        if let Some(entry) = self.publishers.get_mut(publisher) {
            entry.writers.remove(id);
        }
        debug!("Deleted data writer {id} on {}", writer.key.topic_name);
        Ok(())
    }

    /// Adds a reader. `participant`/`topic` are `None` for remote readers,
    /// which only carry a topic/type contract.
    pub(crate) fn add_reader(
        &mut self,
        participant: Option<InstanceHandle>,
        topic: Option<InstanceHandle>,
        key: EndpointKey,
    ) -> Result<(InstanceHandle, UnboundedReceiver<Sample>)> {
        if !topic::is_valid_name(&key.topic_name) {
            return Err(Error::InvalidTopicName(key.topic_name));
        }
        let id = Uuid::new_v4();
        if let Some(topic_id) = topic {
            let topic_entry = self.topics.get_mut(&topic_id).ok_or(Error::NotFound(topic_id))?;
            if Some(topic_entry.participant) != participant {
                return Err(Error::PreconditionNotMet("topic belongs to another participant"));
            }
            topic_entry.attach(id);
        }

        let candidates: Vec<InstanceHandle> = self
            .writers
            .iter()
            .filter(|(_, writer)| writer.key.matches_reader(&key))
            .map(|(writer_id, _)| *writer_id)
            .collect();

        let (sender, receiver) = unbounded_channel();
        debug!("Created data reader {id} on {}", key.topic_name);
        self.readers.insert(
            id,
            ReaderEntry {
                participant,
                topic,
                key,
                sender,
                matched: HashSet::new(),
            },
        );

        for writer_id in candidates {
            self.link(&writer_id, &id);
        }
        Ok((id, receiver))
    }

    pub(crate) fn remove_reader(&mut self, participant: Option<InstanceHandle>, id: &InstanceHandle) -> Result<()> {
        let reader = self.readers.get(id).ok_or(Error::NotFound(*id))?;
        if reader.participant != participant {
            return Err(Error::PreconditionNotMet("data reader belongs to another participant"));
        }
        let matched: Vec<InstanceHandle> = reader.matched.iter().copied().collect();
        for writer_id in matched {
            self.unlink(&writer_id, id);
        }

        if let Some(reader) = self.readers.remove(id) {
            if let Some(topic) = reader.topic.and_then(|t| self.topics.get_mut(&t)) {
                topic.detach(id);
            }
            debug!("Deleted data reader {id} on {}", reader.key.topic_name);
        }
        Ok(())
    }

    pub(crate) fn write(&mut self, writer_id: &InstanceHandle, payload: String) -> Result<u64> {
        let writer = self
            .writers
            .get_mut(writer_id)
            .ok_or(Error::NotFound(*writer_id))?;
        writer.sequence_number += 1;

        let sample = Sample {
            topic: writer.key.topic_name.clone(),
            type_name: writer.key.type_name.clone(),
            writer: *writer_id,
            sequence_number: writer.sequence_number,
            timestamp: Utc::now().timestamp_millis(),
            payload,
        };

        for reader_id in &writer.matched {
            if let Some(reader) = self.readers.get(reader_id) {
                if let Err(e) = reader.sender.send(sample.clone()) {
                    warn!("Failed to deliver sample to reader {reader_id}: {e}");
                }
            } else {
                warn!("No reader registered with id: {reader_id}");
            }
        }
        Ok(sample.sequence_number)
    }

    pub(crate) fn matched_count(&self, writer_id: &InstanceHandle) -> Result<usize> {
        self.writers
            .get(writer_id)
            .map(|w| w.matched.len())
            .ok_or(Error::NotFound(*writer_id))
    }

    fn link(&mut self, writer_id: &InstanceHandle, reader_id: &InstanceHandle) {
        let (Some(writer), Some(reader)) = (
            self.writers.get_mut(writer_id),
            self.readers.get_mut(reader_id),
        ) else {
            return;
        };
        if !writer.matched.insert(*reader_id) {
            return;
        }
        reader.matched.insert(*writer_id);
        writer.total_count += 1;

        let status = PublicationMatchedStatus {
            total_count: writer.total_count,
            total_count_change: 1,
            current_count: writer.matched.len() as u32,
            current_count_change: 1,
            last_subscription_handle: Some(*reader_id),
        };
        debug!("Matched writer {writer_id} with reader {reader_id}");
        Self::notify(&self.events, writer.listener.as_ref(), status);
    }

    fn unlink(&mut self, writer_id: &InstanceHandle, reader_id: &InstanceHandle) {
        let Some(writer) = self.writers.get_mut(writer_id) else {
            return;
        };
        if !writer.matched.remove(reader_id) {
            return;
        }
        if let Some(reader) = self.readers.get_mut(reader_id) {
            reader.matched.remove(writer_id);
        }

        let status = PublicationMatchedStatus {
            total_count: writer.total_count,
            total_count_change: 0,
            current_count: writer.matched.len() as u32,
            current_count_change: -1,
            last_subscription_handle: Some(*reader_id),
        };
        debug!("Unmatched writer {writer_id} from reader {reader_id}");
        Self::notify(&self.events, writer.listener.as_ref(), status);
    }

    fn notify(
        events: &mpsc::Sender<ListenerEvent>,
        listener: Option<&Arc<dyn DataWriterListener>>,
        status: PublicationMatchedStatus,
    ) {
        if let Some(listener) = listener {
            let event = ListenerEvent {
                listener: Arc::clone(listener),
                status,
            };
            if events.send(event).is_err() {
                warn!("Listener dispatcher is gone, dropping match status");
            }
        }
    }
}

struct DomainInner {
    domain_id: u32,
    max_participants: usize,
    state: Mutex<DomainState>,
}

/// A data-distribution domain. Cloning yields another handle to the same
/// domain.
#[derive(Clone)]
pub struct Domain {
    inner: Arc<DomainInner>,
}

impl Domain {
    /// Creates an empty domain and starts its listener thread.
    pub fn new(settings: &DomainSettings) -> Result<Self> {
        let events = status::spawn_dispatcher(settings.domain_id)?;
        Ok(Self {
            inner: Arc::new(DomainInner {
                domain_id: settings.domain_id,
                max_participants: settings.max_participants,
                state: Mutex::new(DomainState::new(events)),
            }),
        })
    }

    pub fn domain_id(&self) -> u32 {
        self.inner.domain_id
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, DomainState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create_participant(&self, qos: ParticipantQos) -> Result<Participant> {
        let mut state = self.state();
        if state.participants.len() >= self.inner.max_participants {
            return Err(Error::ResourceLimit {
                entity: "participants",
                limit: self.inner.max_participants,
            });
        }
        let id = Uuid::new_v4();
        state.participants.insert(
            id,
            ParticipantEntry {
                name: qos.name.clone(),
                types: HashSet::new(),
            },
        );
        debug!("Created participant {} in domain {}", qos.name, self.inner.domain_id);
        Ok(Participant::new(self.clone(), id, qos.name))
    }

    /// Deletes a participant that no longer owns topics, publishers or readers.
    pub fn delete_participant(&self, participant: &Participant) -> Result<()> {
        let id = participant.handle();
        let mut state = self.state();
        state.participant(&id)?;
        let owns_entities = state.topics.values().any(|t| t.participant == id)
            || state.publishers.values().any(|p| p.participant == id)
            || state.readers.values().any(|r| r.participant == Some(id));
        if owns_entities {
            return Err(Error::PreconditionNotMet("participant still owns entities"));
        }
        state.participants.remove(&id);
        debug!("Deleted participant {}", participant.name());
        Ok(())
    }

    /// Creates a reader on behalf of a remote peer that only knows the
    /// topic/type contract.
    pub fn create_remote_reader(
        &self,
        topic_name: &str,
        type_name: &str,
        qos: &DataReaderQos,
    ) -> Result<(InstanceHandle, UnboundedReceiver<Sample>)> {
        let key = EndpointKey {
            topic_name: topic_name.to_string(),
            type_name: type_name.to_string(),
            reliability: qos.reliability,
        };
        self.state().add_reader(None, None, key)
    }

    pub fn delete_remote_reader(&self, id: &InstanceHandle) -> Result<()> {
        self.state().remove_reader(None, id)
    }

    pub fn participant_count(&self) -> usize {
        self.state().participants.len()
    }

    pub fn reader_count(&self) -> usize {
        self.state().readers.len()
    }

    pub fn writer_count(&self) -> usize {
        self.state().writers.len()
    }
}

impl std::fmt::Debug for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Domain")
            .field("domain_id", &self.inner.domain_id)
            .field("max_participants", &self.inner.max_participants)
            .finish()
    }
}
