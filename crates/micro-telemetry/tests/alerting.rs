use micro_telemetry::AlertLayer;
use micro_test_support::capture::CapturedEvents;
use micro_test_support::mocks::{FailingNotifier, RecordingNotifier};
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::layer::SubscriberExt;

#[test]
fn error_events_are_forwarded_with_channel_and_display_name() {
    let notifier = RecordingNotifier::default();
    let subscriber = tracing_subscriber::registry().with(AlertLayer::new(
        notifier.clone(),
        "#payments",
        "billing-service",
    ));

    tracing::subscriber::with_default(subscriber, || {
        error!("ledger export failed");
    });

    let alerts = notifier.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].channel, "#payments");
    assert_eq!(alerts[0].username, "billing-service");
    assert_eq!(alerts[0].text, "ledger export failed");
}

#[test]
fn events_below_error_are_not_forwarded() {
    let notifier = RecordingNotifier::default();
    let subscriber =
        tracing_subscriber::registry().with(AlertLayer::new(notifier.clone(), "#ops", "svc"));

    tracing::subscriber::with_default(subscriber, || {
        warn!("disk at 80%");
        info!("started");
        debug!("tick");
    });

    assert!(notifier.alerts().is_empty());
}

#[test]
fn delivery_failure_is_contained_and_other_sinks_still_run() {
    let notifier = FailingNotifier::default();
    let captured = CapturedEvents::default();
    let subscriber = tracing_subscriber::registry()
        .with(captured.clone())
        .with(AlertLayer::new(notifier.clone(), "#ops", "svc"));

    tracing::subscriber::with_default(subscriber, || {
        error!("first failure");
        error!("second failure");
        info!("still logging");
    });

    // Each record is attempted once, with no retry.
    assert_eq!(notifier.attempts(), 2);
    assert_eq!(
        captured.messages_at(Level::ERROR),
        vec!["first failure".to_string(), "second failure".to_string()]
    );
    assert_eq!(captured.messages_at(Level::INFO), vec!["still logging"]);
}

#[test]
fn sinks_registered_after_the_alert_layer_also_see_failed_records() {
    let notifier = FailingNotifier::default();
    let captured = CapturedEvents::default();
    let subscriber = tracing_subscriber::registry()
        .with(AlertLayer::new(notifier.clone(), "#ops", "svc"))
        .with(captured.clone());

    tracing::subscriber::with_default(subscriber, || {
        error!("upstream unavailable");
    });

    assert_eq!(notifier.attempts(), 1);
    assert_eq!(
        captured.messages_at(Level::ERROR),
        vec!["upstream unavailable"]
    );
}
