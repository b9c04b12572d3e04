use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration settings for the application.
///
/// Every section has defaults that reproduce the stock hello-world run, so an
/// empty configuration is a valid one.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub domain: DomainSettings,
    pub publisher: PublisherSettings,
    pub emitter: EmitterSettings,
    pub transport: TransportSettings,
    pub logging: LoggingSettings,
}

/// Settings for the in-process domain.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DomainSettings {
    pub domain_id: u32,
    pub max_participants: usize,
}

/// Names used by the hello-world publisher when it builds its entities.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PublisherSettings {
    pub participant_name: String,
    pub topic_name: String,
}

/// Cadence and duration of the periodic emitter.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EmitterSettings {
    pub period_ms: u64,
    pub run_secs: u64,
    pub payload: String,
}

impl EmitterSettings {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    pub fn run_for(&self) -> Duration {
        Duration::from_secs(self.run_secs)
    }
}

/// Where the WebSocket discovery server listens, and whether it runs at all.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TransportSettings {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

impl TransportSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn url(&self) -> String {
        format!("ws://{}", self.address())
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values are filled from
/// `Settings::default()`.
#[derive(Debug, Default, Deserialize)]
pub struct PartialSettings {
    pub domain: Option<PartialDomainSettings>,
    pub publisher: Option<PartialPublisherSettings>,
    pub emitter: Option<PartialEmitterSettings>,
    pub transport: Option<PartialTransportSettings>,
    pub logging: Option<PartialLoggingSettings>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PartialDomainSettings {
    pub domain_id: Option<u32>,
    pub max_participants: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PartialPublisherSettings {
    pub participant_name: Option<String>,
    pub topic_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PartialEmitterSettings {
    pub period_ms: Option<u64>,
    pub run_secs: Option<u64>,
    pub payload: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PartialTransportSettings {
    pub enabled: Option<bool>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}

impl PartialSettings {
    /// Merge with defaults, section by section.
    pub fn merge(self, default: Settings) -> Settings {
        let domain = self.domain.unwrap_or_default();
        let publisher = self.publisher.unwrap_or_default();
        let emitter = self.emitter.unwrap_or_default();
        let transport = self.transport.unwrap_or_default();
        let logging = self.logging.unwrap_or_default();

        Settings {
            domain: DomainSettings {
                domain_id: domain.domain_id.unwrap_or(default.domain.domain_id),
                max_participants: domain
                    .max_participants
                    .unwrap_or(default.domain.max_participants),
            },
            publisher: PublisherSettings {
                participant_name: publisher
                    .participant_name
                    .unwrap_or(default.publisher.participant_name),
                topic_name: publisher
                    .topic_name
                    .unwrap_or(default.publisher.topic_name),
            },
            emitter: EmitterSettings {
                period_ms: emitter.period_ms.unwrap_or(default.emitter.period_ms),
                run_secs: emitter.run_secs.unwrap_or(default.emitter.run_secs),
                payload: emitter.payload.unwrap_or(default.emitter.payload),
            },
            transport: TransportSettings {
                enabled: transport.enabled.unwrap_or(default.transport.enabled),
                host: transport.host.unwrap_or(default.transport.host),
                port: transport.port.unwrap_or(default.transport.port),
            },
            logging: LoggingSettings {
                level: logging.level.unwrap_or(default.logging.level),
            },
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            domain: DomainSettings::default(),
            publisher: PublisherSettings::default(),
            emitter: EmitterSettings::default(),
            transport: TransportSettings {
                enabled: true,
                host: "127.0.0.1".to_string(),
                port: 7400,
            },
            logging: LoggingSettings {
                level: "info".to_string(),
            },
        }
    }
}

impl Default for DomainSettings {
    fn default() -> Self {
        Self {
            domain_id: 0,
            max_participants: 16,
        }
    }
}

impl Default for PublisherSettings {
    fn default() -> Self {
        Self {
            participant_name: "Participant_publisher".to_string(),
            topic_name: "HelloWorldTopic".to_string(),
        }
    }
}

impl Default for EmitterSettings {
    fn default() -> Self {
        Self {
            period_ms: 1000,
            run_secs: 10,
            payload: "Hullo!".to_string(),
        }
    }
}
