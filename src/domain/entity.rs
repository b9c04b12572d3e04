//! Entity handles
//!
//! Handles are cheap to clone and refer to entries inside the [`Domain`].
//! Dropping a handle does not delete the entity; deletion is explicit and
//! goes through the parent entity, children first:
//! writer → publisher, reader → topic → participant.

use std::marker::PhantomData;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::error::TryRecvError;

use crate::domain::InstanceHandle;
use crate::domain::engine::{Domain, EndpointKey};
use crate::domain::message::{Sample, TypeSupport};
use crate::domain::qos::{DataReaderQos, DataWriterQos, PublisherQos, TopicQos};
use crate::domain::status::DataWriterListener;
use crate::utils::Result;

/// This process's membership in a domain.
#[derive(Debug, Clone)]
pub struct Participant {
    domain: Domain,
    handle: InstanceHandle,
    name: String,
}

impl Participant {
    pub(crate) fn new(domain: Domain, handle: InstanceHandle, name: String) -> Self {
        Self {
            domain,
            handle,
            name,
        }
    }

    pub fn handle(&self) -> InstanceHandle {
        self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Makes `type_name` available to topics created by this participant.
    pub fn register_type(&self, type_name: &str) -> Result<()> {
        self.domain.state().register_type(&self.handle, type_name)
    }

    pub fn create_topic(&self, name: &str, type_name: &str, _qos: &TopicQos) -> Result<TopicHandle> {
        let handle = self.domain.state().add_topic(&self.handle, name, type_name)?;
        Ok(TopicHandle {
            handle,
            name: name.to_string(),
            type_name: type_name.to_string(),
        })
    }

    pub fn delete_topic(&self, topic: &TopicHandle) -> Result<()> {
        self.domain.state().remove_topic(&self.handle, &topic.handle)
    }

    pub fn create_publisher(&self, _qos: &PublisherQos) -> Result<Publisher> {
        let handle = self.domain.state().add_publisher(&self.handle)?;
        Ok(Publisher {
            domain: self.domain.clone(),
            handle,
        })
    }

    pub fn delete_publisher(&self, publisher: &Publisher) -> Result<()> {
        self.domain
            .state()
            .remove_publisher(&self.handle, &publisher.handle)
    }

    pub fn create_datareader<T: TypeSupport>(
        &self,
        topic: &TopicHandle,
        qos: &DataReaderQos,
    ) -> Result<DataReader<T>> {
        let key = EndpointKey {
            topic_name: topic.name.clone(),
            type_name: T::TYPE_NAME.to_string(),
            reliability: qos.reliability,
        };
        let (handle, receiver) =
            self.domain
                .state()
                .add_reader(Some(self.handle), Some(topic.handle), key)?;
        Ok(DataReader {
            handle,
            receiver,
            _type: PhantomData,
        })
    }

    pub fn delete_datareader<T>(&self, reader: &DataReader<T>) -> Result<()> {
        self.domain
            .state()
            .remove_reader(Some(self.handle), &reader.handle)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicHandle {
    handle: InstanceHandle,
    name: String,
    type_name: String,
}

impl TopicHandle {
    pub fn handle(&self) -> InstanceHandle {
        self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

#[derive(Debug, Clone)]
pub struct Publisher {
    domain: Domain,
    handle: InstanceHandle,
}

impl Publisher {
    pub fn handle(&self) -> InstanceHandle {
        self.handle
    }

    /// Creates a writer for `T` on `topic`. Readers already present on the
    /// same topic/type are matched right away and reported to `listener`.
    pub fn create_datawriter<T: TypeSupport>(
        &self,
        topic: &TopicHandle,
        qos: &DataWriterQos,
        listener: Option<Arc<dyn DataWriterListener>>,
    ) -> Result<DataWriter<T>> {
        let handle = self.domain.state().add_writer(
            &self.handle,
            &topic.handle,
            T::TYPE_NAME,
            qos,
            listener,
        )?;
        Ok(DataWriter {
            domain: self.domain.clone(),
            handle,
            _type: PhantomData,
        })
    }

    pub fn delete_datawriter<T>(&self, writer: &DataWriter<T>) -> Result<()> {
        self.domain
            .state()
            .remove_writer(&self.handle, &writer.handle)
    }
}

pub struct DataWriter<T> {
    domain: Domain,
    handle: InstanceHandle,
    _type: PhantomData<fn(T)>,
}

impl<T: TypeSupport> DataWriter<T> {
    pub fn handle(&self) -> InstanceHandle {
        self.handle
    }

    /// Serializes `sample` and hands it to every matched reader. Returns the
    /// sequence number assigned to it.
    pub fn write(&self, sample: &T) -> Result<u64> {
        let payload = serde_json::to_string(sample)?;
        self.domain.state().write(&self.handle, payload)
    }

    /// Readers matched right now, as seen by the domain.
    pub fn matched_count(&self) -> Result<usize> {
        self.domain.state().matched_count(&self.handle)
    }
}

pub struct DataReader<T> {
    handle: InstanceHandle,
    receiver: UnboundedReceiver<Sample>,
    _type: PhantomData<fn() -> T>,
}

impl<T: TypeSupport> DataReader<T> {
    pub fn handle(&self) -> InstanceHandle {
        self.handle
    }

    /// Removes and returns the next sample if one is waiting.
    pub fn take(&mut self) -> Result<Option<T>> {
        match self.receiver.try_recv() {
            Ok(sample) => sample.decode::<T>().map(Some),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => Ok(None),
        }
    }

    /// Waits for the next sample. `None` once the reader has been deleted.
    pub async fn recv(&mut self) -> Option<Result<T>> {
        let sample = self.receiver.recv().await?;
        Some(sample.decode::<T>())
    }
}
