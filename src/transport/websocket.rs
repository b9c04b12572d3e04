//! WebSocket transport
//!
//! This file implements the discovery server that lets remote subscribers
//! join a domain. Responsibilities:
//! - Accept TCP/WebSocket connections
//! - Create a `Connection` for each peer
//! - Turn `subscribe`/`unsubscribe` requests into remote readers
//! - Forward samples delivered to those readers as JSON `sample` messages
//! - Delete the peer's readers when it disconnects, which unmatches them

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::spawn;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::accept_async;
use tracing::{debug, info, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::domain::{DataReaderQos, Domain, Sample};
use crate::transport::connection::Connection;
use crate::transport::message::{ClientMessage, ServerMessage};
use crate::utils::Result;

pub async fn bind(addr: &str) -> Result<TcpListener> {
    Ok(TcpListener::bind(addr).await?)
}

pub async fn start_discovery_server(addr: &str, domain: Domain) -> Result<()> {
    let listener = bind(addr).await?;
    serve(listener, domain).await;
    Ok(())
}

/// Accepts peers until the listener fails.
pub async fn serve(listener: TcpListener, domain: Domain) {
    if let Ok(local) = listener.local_addr() {
        info!("Discovery server listening on ws://{local}");
    }

    while let Ok((stream, peer)) = listener.accept().await {
        let domain = domain.clone();
        spawn(handle_connection(stream, peer, domain));
    }
    warn!("Discovery server stopped accepting connections");
}

async fn handle_connection(stream: TcpStream, peer: SocketAddr, domain: Domain) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake error from {peer}: {e}");
            return;
        }
    };
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();
    let mut connection = Connection::new(tx);
    info!("{} connected from {peer}", connection.id);

    {
        let id = connection.id.clone();
        spawn(async move {
            while let Some(msg) = rx.recv().await {
                if let Err(e) = ws_sender.send(msg).await {
                    warn!("Failed to send message to {id}: {e}");
                    break;
                }
            }
            debug!("Send loop closed for {id}");
        });
    }

    while let Some(Ok(msg)) = ws_receiver.next().await {
        if msg.is_close() {
            break;
        }
        if !msg.is_text() {
            continue;
        }
        match msg.to_text() {
            Ok(text) => handle_message(&domain, &mut connection, text),
            Err(e) => warn!("Unreadable message from {}: {e}", connection.id),
        }
    }

    connection.close(&domain);
    info!("{} disconnected", connection.id);
}

/// Applies one protocol message from a peer. Must run inside a tokio runtime.
pub(crate) fn handle_message(domain: &Domain, connection: &mut Connection, text: &str) {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Subscribe {
            topic,
            type_name,
            reliability,
        }) => {
            if connection.readers.contains_key(&topic) {
                connection.reply(&ServerMessage::Error {
                    message: format!("already subscribed to {topic}"),
                });
                return;
            }
            let mut qos = DataReaderQos::default();
            if let Some(reliability) = reliability {
                qos.reliability = reliability;
            }
            match domain.create_remote_reader(&topic, &type_name, &qos) {
                Ok((reader, samples)) => {
                    connection.readers.insert(topic.clone(), reader);
                    // acknowledge before any sample can be forwarded
                    connection.reply(&ServerMessage::Subscribed {
                        topic: topic.clone(),
                        reader,
                    });
                    forward_samples(samples, connection.sender.clone());
                    info!("{} subscribed to {topic} ({type_name})", connection.id);
                }
                Err(e) => {
                    warn!("{} could not subscribe to {topic}: {e}", connection.id);
                    connection.reply(&ServerMessage::Error {
                        message: e.to_string(),
                    });
                }
            }
        }
        Ok(ClientMessage::Unsubscribe { topic }) => match connection.readers.remove(&topic) {
            Some(reader) => {
                if let Err(e) = domain.delete_remote_reader(&reader) {
                    warn!("Failed to delete reader for {} on {topic}: {e}", connection.id);
                }
                info!("{} unsubscribed from {topic}", connection.id);
                connection.reply(&ServerMessage::Unsubscribed { topic });
            }
            None => connection.reply(&ServerMessage::Error {
                message: format!("not subscribed to {topic}"),
            }),
        },
        Err(err) => {
            warn!(
                "Invalid client message from {}: {err} | {}",
                connection.id,
                &text.chars().take(100).collect::<String>()
            );
            connection.reply(&ServerMessage::Error {
                message: format!("invalid message: {err}"),
            });
        }
    }
}

/// Relays samples of one remote reader until the reader is deleted or the
/// peer's send loop is gone.
fn forward_samples(mut samples: UnboundedReceiver<Sample>, sender: UnboundedSender<WsMessage>) {
    spawn(async move {
        while let Some(sample) = samples.recv().await {
            let text = match serde_json::to_string(&ServerMessage::Sample(sample)) {
                Ok(json) => json,
                Err(e) => {
                    warn!("Failed to serialize sample: {e}");
                    continue;
                }
            };
            if sender.send(WsMessage::text(text)).is_err() {
                break;
            }
        }
    });
}
