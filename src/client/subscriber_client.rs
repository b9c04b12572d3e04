//! Subscriber client
//!
//! `SubscriberClient` wraps one WebSocket connection to a discovery server.
//! Each subscription becomes a reader inside the publisher's domain, so the
//! publisher sees it as a matched subscriber for as long as the connection
//! stays open.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;
use tungstenite::protocol::Message as WsMessage;

use crate::domain::{InstanceHandle, Reliability, TypeSupport};
use crate::transport::message::{ClientMessage, ServerMessage};
use crate::utils::{Error, Result};

pub struct SubscriberClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl SubscriberClient {
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _response) = connect_async(url).await?;
        Ok(Self { stream })
    }

    /// Subscribe to `topic` as a reader of `T`, with default reliability.
    pub async fn subscribe<T: TypeSupport>(&mut self, topic: &str) -> Result<InstanceHandle> {
        self.subscribe_with::<T>(topic, None).await
    }

    /// Subscribe and wait for the server's acknowledgement.
    pub async fn subscribe_with<T: TypeSupport>(
        &mut self,
        topic: &str,
        reliability: Option<Reliability>,
    ) -> Result<InstanceHandle> {
        self.send(&ClientMessage::Subscribe {
            topic: topic.to_string(),
            type_name: T::TYPE_NAME.to_string(),
            reliability,
        })
        .await?;

        loop {
            match self.next_server_message().await? {
                Some(ServerMessage::Subscribed { reader, .. }) => return Ok(reader),
                Some(ServerMessage::Error { message }) => return Err(Error::Remote(message)),
                Some(other) => debug!("Ignoring {other:?} while waiting for subscription"),
                None => return Err(Error::ConnectionClosed),
            }
        }
    }

    pub async fn unsubscribe(&mut self, topic: &str) -> Result<()> {
        self.send(&ClientMessage::Unsubscribe {
            topic: topic.to_string(),
        })
        .await?;

        loop {
            match self.next_server_message().await? {
                Some(ServerMessage::Unsubscribed { .. }) => return Ok(()),
                Some(ServerMessage::Error { message }) => return Err(Error::Remote(message)),
                Some(other) => debug!("Ignoring {other:?} while waiting for unsubscribe"),
                None => return Err(Error::ConnectionClosed),
            }
        }
    }

    /// Waits for the next sample. `None` once the server closes the connection.
    pub async fn next_sample<T: TypeSupport>(&mut self) -> Result<Option<T>> {
        loop {
            match self.next_server_message().await? {
                Some(ServerMessage::Sample(sample)) => return sample.decode::<T>().map(Some),
                Some(ServerMessage::Error { message }) => return Err(Error::Remote(message)),
                Some(other) => debug!("Ignoring {other:?} while waiting for samples"),
                None => return Ok(None),
            }
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }

    async fn send(&mut self, msg: &ClientMessage) -> Result<()> {
        let json = serde_json::to_string(msg)?;
        self.stream.send(WsMessage::text(json)).await?;
        Ok(())
    }

    async fn next_server_message(&mut self) -> Result<Option<ServerMessage>> {
        while let Some(msg) = self.stream.next().await {
            let msg = msg?;
            if msg.is_close() {
                return Ok(None);
            }
            if msg.is_text() {
                return Ok(Some(serde_json::from_str(msg.to_text()?)?));
            }
        }
        Ok(None)
    }
}
