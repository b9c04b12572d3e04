use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::*;
use crate::config::{DomainSettings, EmitterSettings, PublisherSettings};
use crate::domain::{
    DataReader, DataReaderQos, Domain, Participant, ParticipantQos, PublicationMatchedStatus,
    TopicQos, TypeSupport,
};
use crate::domain::DataWriterListener;
use crate::utils::Error;

fn test_domain() -> Domain {
    Domain::new(&DomainSettings::default()).unwrap()
}

fn subscriber(domain: &Domain) -> (Participant, DataReader<HelloWorldMsg>) {
    let participant = domain
        .create_participant(ParticipantQos::named("Participant_subscriber"))
        .unwrap();
    HelloWorldMsg::register_type(&participant).unwrap();
    let topic = participant
        .create_topic("HelloWorldTopic", HelloWorldMsg::TYPE_NAME, &TopicQos)
        .unwrap();
    let reader = participant
        .create_datareader::<HelloWorldMsg>(&topic, &DataReaderQos::default())
        .unwrap();
    (participant, reader)
}

async fn wait_matched(publisher: &HelloWorldPublisher, expected: u32) {
    for _ in 0..400 {
        if publisher.matched() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!(
        "matched count stayed at {} instead of {expected}",
        publisher.matched()
    );
}

fn status(current_count: u32, current_count_change: i32) -> PublicationMatchedStatus {
    PublicationMatchedStatus {
        total_count: current_count,
        current_count,
        current_count_change,
        ..Default::default()
    }
}

#[test]
fn test_listener_match_accounting() {
    let listener = PubListener::default();
    listener.on_publication_matched(status(1, 1));
    assert_eq!(listener.matched(), 1);
    listener.on_publication_matched(status(2, 1));
    assert_eq!(listener.matched(), 2);
    listener.on_publication_matched(status(1, -1));
    assert_eq!(listener.matched(), 1);

    // anything but +1/-1 is reported and ignored
    listener.on_publication_matched(status(7, 0));
    listener.on_publication_matched(status(7, 2));
    listener.on_publication_matched(status(7, -3));
    assert_eq!(listener.matched(), 1);
}

#[test]
fn test_publish_before_init_is_refused() {
    let publisher = HelloWorldPublisher::new(test_domain(), PublisherSettings::default());
    let result = publisher.publish(&HelloWorldMsg::new("Hullo!", 1));
    assert!(matches!(result, Err(Error::NotInitialized)));
    assert!(!publisher.is_initialized());
}

#[test]
fn test_publish_without_subscriber_sends_nothing() {
    let domain = test_domain();
    let mut publisher = HelloWorldPublisher::new(domain.clone(), PublisherSettings::default());
    publisher.init().unwrap();

    // a reader of another type on the same topic name sees the writer but never matches
    let (_id, mut rx) = domain
        .create_remote_reader("HelloWorldTopic", "SomethingElse", &DataReaderQos::default())
        .unwrap();

    for index in 1..=3 {
        assert!(!publisher.publish(&HelloWorldMsg::new("Hullo!", index)).unwrap());
    }
    assert!(rx.try_recv().is_err());
    assert_eq!(publisher.matched(), 0);
}

#[test]
fn test_teardown_without_init_is_a_no_op() {
    let domain = test_domain();
    let publisher = HelloWorldPublisher::new(domain.clone(), PublisherSettings::default());
    drop(publisher);
    assert_eq!(domain.participant_count(), 0);
}

#[test]
fn test_teardown_releases_everything() {
    let domain = test_domain();
    let mut publisher = HelloWorldPublisher::new(domain.clone(), PublisherSettings::default());
    publisher.init().unwrap();
    assert_eq!(domain.participant_count(), 1);
    assert_eq!(domain.writer_count(), 1);

    drop(publisher);
    assert_eq!(domain.participant_count(), 0);
    assert_eq!(domain.writer_count(), 0);
}

#[test]
fn test_partial_init_is_released() {
    let domain = test_domain();
    let settings = PublisherSettings {
        topic_name: String::new(),
        ..PublisherSettings::default()
    };
    let mut publisher = HelloWorldPublisher::new(domain.clone(), settings);

    assert!(matches!(publisher.init(), Err(Error::InvalidTopicName(_))));
    assert!(!publisher.is_initialized());
    // the participant was created before the topic failed
    assert_eq!(domain.participant_count(), 1);

    drop(publisher);
    assert_eq!(domain.participant_count(), 0);
}

#[test]
fn test_init_fails_when_participants_exhausted() {
    let domain = Domain::new(&DomainSettings {
        domain_id: 0,
        max_participants: 0,
    })
    .unwrap();
    let mut publisher = HelloWorldPublisher::new(domain, PublisherSettings::default());
    assert!(matches!(publisher.init(), Err(Error::ResourceLimit { .. })));
}

#[tokio::test]
async fn test_start_failure_never_arms_timer() {
    let domain = Domain::new(&DomainSettings {
        domain_id: 0,
        max_participants: 0,
    })
    .unwrap();
    let publisher = HelloWorldPublisher::new(domain, PublisherSettings::default());
    let settings = EmitterSettings {
        period_ms: 10,
        ..EmitterSettings::default()
    };
    let mut emitter = EventEmitter::new(publisher, &settings);

    assert!(emitter.start().is_err());
    assert_eq!(emitter.state(), EmitterState::Stopped);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(emitter.samples_sent(), 1);

    // no way back out of Stopped
    assert!(matches!(emitter.start(), Err(Error::InvalidState(_))));
    emitter.stop().await;
    assert_eq!(emitter.state(), EmitterState::Stopped);
}

#[tokio::test]
async fn test_no_listener_then_match_then_unmatch() {
    let domain = test_domain();
    let publisher = HelloWorldPublisher::new(domain.clone(), PublisherSettings::default());
    // long period: ticks are driven by hand below
    let settings = EmitterSettings {
        period_ms: 60_000,
        ..EmitterSettings::default()
    };
    let mut emitter = EventEmitter::new(publisher, &settings);
    emitter.start().unwrap();
    assert_eq!(emitter.state(), EmitterState::Running);

    for _ in 0..3 {
        assert_eq!(emitter.tick(), TickOutcome::NoListener);
    }
    assert_eq!(emitter.samples_sent(), 1);

    let (participant, mut reader) = subscriber(&domain);
    wait_matched(emitter.publisher(), 1).await;

    assert_eq!(emitter.tick(), TickOutcome::Sent { index: 1 });
    assert_eq!(emitter.samples_sent(), 2);
    assert_eq!(reader.take().unwrap(), Some(HelloWorldMsg::new("Hullo!", 1)));

    participant.delete_datareader(&reader).unwrap();
    wait_matched(emitter.publisher(), 0).await;

    assert_eq!(emitter.tick(), TickOutcome::NoListener);
    assert_eq!(emitter.samples_sent(), 2);

    emitter.stop().await;
    assert_eq!(emitter.state(), EmitterState::Stopped);
}

#[tokio::test]
async fn test_timer_driven_sends_are_sequential() {
    let domain = test_domain();
    let (_participant, mut reader) = subscriber(&domain);

    let publisher = HelloWorldPublisher::new(domain.clone(), PublisherSettings::default());
    let settings = EmitterSettings {
        period_ms: 20,
        payload: "Hello".to_string(),
        ..EmitterSettings::default()
    };
    let mut emitter = EventEmitter::new(publisher, &settings);
    emitter.start().unwrap();
    wait_matched(emitter.publisher(), 1).await;

    let mut received = Vec::new();
    while received.len() < 3 {
        let msg = tokio::time::timeout(Duration::from_secs(2), reader.recv())
            .await
            .expect("no sample within 2s")
            .expect("reader closed")
            .unwrap();
        received.push(msg);
    }
    emitter.stop().await;

    // the first ticks may have fired before the match was visible
    let first = received[0].index;
    for (offset, msg) in received.iter().enumerate() {
        assert_eq!(msg.message, "Hello");
        assert_eq!(msg.index, first + offset as u32);
    }
    assert!(emitter.samples_sent() > received.last().unwrap().index);
}

#[tokio::test]
async fn test_timer_stops_ticking() {
    let count = Arc::new(AtomicUsize::new(0));
    let ticks = count.clone();
    let mut timer = PeriodicTimer::start(Duration::from_millis(10), move || {
        ticks.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();
    assert!(timer.is_running());
    assert_eq!(timer.period(), Duration::from_millis(10));

    tokio::time::sleep(Duration::from_millis(80)).await;
    timer.stop().await;
    assert!(!timer.is_running());

    let after_stop = count.load(Ordering::SeqCst);
    assert!(after_stop >= 1);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(count.load(Ordering::SeqCst), after_stop);
}

#[tokio::test]
async fn test_timer_first_tick_waits_one_period() {
    let count = Arc::new(AtomicUsize::new(0));
    let ticks = count.clone();
    let mut timer = PeriodicTimer::start(Duration::from_millis(200), move || {
        ticks.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
    timer.stop().await;
}

#[tokio::test]
async fn test_timer_rejects_zero_period() {
    let result = PeriodicTimer::start(Duration::ZERO, || {});
    assert!(matches!(result, Err(Error::InvalidState(_))));
}

#[tokio::test]
async fn test_zero_period_fails_start_before_init() {
    let domain = test_domain();
    let (_participant, _reader) = subscriber(&domain);
    let publisher = HelloWorldPublisher::new(domain.clone(), PublisherSettings::default());
    let settings = EmitterSettings {
        period_ms: 0,
        ..EmitterSettings::default()
    };
    let mut emitter = EventEmitter::new(publisher, &settings);

    assert!(matches!(emitter.start(), Err(Error::InvalidState(_))));
    assert_eq!(emitter.state(), EmitterState::Stopped);
    assert!(!emitter.publisher().is_initialized());
    // only the subscriber's participant exists
    assert_eq!(domain.participant_count(), 1);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(emitter.samples_sent(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_ticks_never_reuse_an_index() {
    let domain = test_domain();
    let (_participant, mut reader) = subscriber(&domain);
    let publisher = HelloWorldPublisher::new(domain.clone(), PublisherSettings::default());
    let settings = EmitterSettings {
        period_ms: 1,
        ..EmitterSettings::default()
    };
    let mut emitter = EventEmitter::new(publisher, &settings);
    emitter.start().unwrap();
    wait_matched(emitter.publisher(), 1).await;

    // manual ticks race the armed timer
    for _ in 0..50 {
        emitter.tick();
    }
    emitter.stop().await;

    let mut indices = Vec::new();
    while let Some(msg) = reader.take().unwrap() {
        indices.push(msg.index);
    }
    assert!(indices.len() >= 50);
    let first = indices[0];
    for (offset, index) in indices.iter().enumerate() {
        assert_eq!(*index, first + offset as u32);
    }
    assert_eq!(emitter.samples_sent(), indices.last().unwrap() + 1);
}

#[test]
fn test_message_type_contract() {
    assert_eq!(HelloWorldMsg::TYPE_NAME, "HelloWorldMsg");
    let json = serde_json::to_value(HelloWorldMsg::new("Hullo!", 4)).unwrap();
    assert_eq!(json["message"], "Hullo!");
    assert_eq!(json["index"], 4);
}
