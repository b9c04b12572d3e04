//! Hello-world publisher.
//!
//! Publishes a greeting once per period for a fixed time window, then exits.
//! Subscribers in other processes join through the discovery server, e.g.
//! by running `hello_subscriber`.

use dds_hello::config::{Settings, load_config};
use dds_hello::domain::Domain;
use dds_hello::hello::{EventEmitter, HelloWorldPublisher};
use dds_hello::transport;
use dds_hello::utils::logging;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let settings = load_config().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration, using defaults: {e}");
        Settings::default()
    });
    logging::init(&settings.logging.level);

    let domain = match Domain::new(&settings.domain) {
        Ok(domain) => domain,
        Err(e) => {
            error!("Failed to create domain {}: {e}", settings.domain.domain_id);
            return;
        }
    };

    if settings.transport.enabled {
        let addr = settings.transport.address();
        let domain = domain.clone();
        tokio::spawn(async move {
            if let Err(e) = transport::start_discovery_server(&addr, domain).await {
                error!("Discovery server unavailable on {addr}: {e}");
            }
        });
    }

    let publisher = HelloWorldPublisher::new(domain, settings.publisher.clone());
    let mut emitter = EventEmitter::new(publisher, &settings.emitter);
    // failures are logged by start(); the run window still elapses
    let _ = emitter.start();

    tokio::time::sleep(settings.emitter.run_for()).await;
    emitter.stop().await;
    info!("Done.");
}
