//! Hello-world subscriber.
//!
//! Connects to a publisher's discovery server, subscribes to the hello-world
//! topic and logs every greeting until Ctrl+C or until the publisher exits.

use dds_hello::client::SubscriberClient;
use dds_hello::config::{Settings, load_config};
use dds_hello::hello::HelloWorldMsg;
use dds_hello::utils::logging;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let settings = load_config().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration, using defaults: {e}");
        Settings::default()
    });
    logging::init(&settings.logging.level);

    let url = settings.transport.url();
    let topic = settings.publisher.topic_name.as_str();

    let mut client = match SubscriberClient::connect(&url).await {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to connect to {url}: {e}");
            return;
        }
    };
    if let Err(e) = client.subscribe::<HelloWorldMsg>(topic).await {
        error!("Failed to subscribe to {topic}: {e}");
        return;
    }
    info!("Subscriber matched on {topic}, waiting for messages.");

    loop {
        tokio::select! {
            sample = client.next_sample::<HelloWorldMsg>() => match sample {
                Ok(Some(hello)) => {
                    info!("Message: {} with index: {} RECEIVED", hello.message, hello.index);
                }
                Ok(None) => {
                    info!("Publisher closed the connection.");
                    break;
                }
                Err(e) if e.is_connection_lost() => {
                    error!("Connection lost: {e}");
                    break;
                }
                Err(e) => warn!("Failed to read sample: {e}"),
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received. Exiting gracefully.");
                if let Err(e) = client.close().await {
                    warn!("Failed to close connection: {e}");
                }
                break;
            }
        }
    }
}
