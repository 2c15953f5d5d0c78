mod common;

use std::sync::Arc;
use std::time::Duration;

use discogs_reconcile::error::Error;
use discogs_reconcile::upstream::discogs_headers;
use discogs_reconcile::worker::RateGate;
use reqwest::StatusCode;

use common::ScriptedTransport;

fn gate(transport: &Arc<ScriptedTransport>) -> RateGate {
    RateGate::spawn(transport.clone())
}

fn assert_spaced(transport: &ScriptedTransport, min_gap: Duration) {
    let calls = transport.calls();
    for pair in calls.windows(2) {
        let gap = pair[1].at - pair[0].at;
        assert!(gap >= min_gap, "calls only {gap:?} apart, expected at least {min_gap:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn sequential_calls_are_at_least_a_second_apart() {
    let transport = ScriptedTransport::new();
    let gate = gate(&transport);

    for _ in 0..4 {
        let response = gate
            .execute("https://api.discogs.test/a".to_string(), discogs_headers("t"))
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::OK);
    }

    assert_eq!(transport.calls().len(), 4);
    assert_spaced(&transport, Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn concurrent_callers_never_share_a_second() {
    let transport = ScriptedTransport::new();
    let gate = gate(&transport);

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..5 {
        let gate = gate.clone();
        tasks.spawn(async move {
            gate.execute(format!("https://api.discogs.test/{i}"), discogs_headers("t"))
                .await
        });
    }
    while let Some(joined) = tasks.join_next().await {
        assert!(joined.unwrap().is_ok());
    }

    let mut sent: Vec<_> = transport.calls().into_iter().map(|call| call.at).collect();
    sent.sort();
    assert_eq!(sent.len(), 5);
    for pair in sent.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_secs(1));
    }
}

#[tokio::test(start_paused = true)]
async fn throttled_request_waits_retry_after_then_resends_once() {
    let transport = ScriptedTransport::new();
    transport.respond(429, &[("retry-after", "5")], "");
    transport.respond(200, &[], r#"{"results": []}"#);
    let gate = gate(&transport);

    let response = gate
        .execute("https://api.discogs.test/search".to_string(), discogs_headers("t"))
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::OK);
    let calls = transport.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].url, calls[1].url);
    assert!(calls[1].at - calls[0].at >= Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn keeps_retrying_until_upstream_stops_throttling() {
    let transport = ScriptedTransport::new();
    for _ in 0..3 {
        transport.respond(429, &[("retry-after", "2")], "");
    }
    transport.respond(200, &[], "{}");
    let gate = gate(&transport);

    let response = gate
        .execute("https://api.discogs.test/x".to_string(), discogs_headers("t"))
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(transport.calls().len(), 4);
    assert_spaced(&transport, Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn missing_retry_after_backs_off_sixty_seconds() {
    let transport = ScriptedTransport::new();
    transport.respond(429, &[], "");
    let gate = gate(&transport);

    gate.execute("https://api.discogs.test/x".to_string(), discogs_headers("t"))
        .await
        .unwrap();

    let calls = transport.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[1].at - calls[0].at >= Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn exhausted_quota_waits_for_reset_window() {
    let transport = ScriptedTransport::new();
    transport.respond(
        200,
        &[
            ("x-discogs-ratelimit-remaining", "0"),
            ("x-discogs-ratelimit-reset", "7"),
        ],
        "{}",
    );
    let gate = gate(&transport);

    for _ in 0..2 {
        gate.execute("https://api.discogs.test/x".to_string(), discogs_headers("t"))
            .await
            .unwrap();
    }

    let calls = transport.calls();
    assert!(calls[1].at - calls[0].at >= Duration::from_secs(7));
}

#[tokio::test(start_paused = true)]
async fn other_statuses_are_handed_back_untouched() {
    let transport = ScriptedTransport::new();
    transport.respond(503, &[("retry-after", "30")], "down");
    let gate = gate(&transport);

    let response = gate
        .execute("https://api.discogs.test/x".to_string(), discogs_headers("t"))
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body, b"down");
    assert_eq!(transport.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn network_failure_is_returned_and_still_spaces_the_next_call() {
    let transport = ScriptedTransport::new();
    transport.fail("connection refused");
    let gate = gate(&transport);

    let err = gate
        .execute("https://api.discogs.test/x".to_string(), discogs_headers("t"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)));

    gate.execute("https://api.discogs.test/x".to_string(), discogs_headers("t"))
        .await
        .unwrap();
    assert_eq!(transport.calls().len(), 2);
    assert_spaced(&transport, Duration::from_secs(1));
}
