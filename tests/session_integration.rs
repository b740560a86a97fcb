// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for stream sessions, reconciliation and the registry
//! using wiremock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use hconnect_lib::manager::ApplianceRegistry;
use hconnect_lib::protocol::{ApiClient, BackoffPolicy};
use hconnect_lib::session::{ApplianceHandle, SessionStatus, StreamSession, reconcile};
use hconnect_lib::state::{ApplianceState, Field, FieldValue, StateReducer};
use hconnect_lib::{ApplianceEvent, ClientConfig, Error};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HA_ID: &str = "BOSCH-SMV68TX06E-68A40E000003";

fn client(server: &MockServer) -> ApiClient {
    let config = ClientConfig::new("refresh-me")
        .with_base_url(server.uri())
        .with_backoff(BackoffPolicy::new().with_unit(Duration::from_millis(50)));
    let client = ApiClient::new(&config).unwrap();
    let _ = client.tokens().clone().with_access_token("Bearer seeded");
    client
}

fn appliance_path(suffix: &str) -> String {
    format!("/api/homeappliances/{HA_ID}{suffix}")
}

fn sse(events: &[(&str, &str)]) -> ResponseTemplate {
    let body: String = events
        .iter()
        .map(|(kind, data)| format!("event: {kind}\ndata: {data}\nid: {HA_ID}\n\n"))
        .collect();
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/event-stream")
        .set_body_string(body)
}

fn items(pairs: &[(&str, serde_json::Value)]) -> String {
    let items: Vec<_> = pairs
        .iter()
        .map(|(key, value)| serde_json::json!({"key": key, "value": value}))
        .collect();
    serde_json::json!({ "items": items }).to_string()
}

async fn mount_detail(server: &MockServer, connected: bool) {
    Mock::given(method("GET"))
        .and(path(appliance_path("")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"haId": HA_ID, "type": "Dishwasher", "brand": "Bosch",
                     "vib": "SMV68TX06E", "connected": connected}
        })))
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, status: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(appliance_path("/status")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": {"status": status}})),
        )
        .mount(server)
        .await;
}

fn no_program_selected() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(serde_json::json!({
        "error": {"key": "SDK.Error.NoProgramSelected", "description": "No program selected"}
    }))
}

async fn wait_for<F>(handle: &ApplianceHandle, predicate: F)
where
    F: Fn(&ApplianceState) -> bool,
{
    let mut rx = handle.watch();
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if predicate(&*rx.borrow_and_update()) {
                return;
            }
            rx.changed().await.unwrap();
        }
    })
    .await
    .unwrap_or_else(|_| panic!("state not reached: {:?}", handle.snapshot()));
}

fn start(server: &MockServer) -> (ApplianceHandle, CancellationToken, tokio::task::JoinHandle<()>) {
    let handle = ApplianceHandle::new(HA_ID, StateReducer::default());
    let cancel = CancellationToken::new();
    let task = StreamSession::new(client(server), handle.clone(), cancel.clone()).spawn();
    (handle, cancel, task)
}

async fn stop(cancel: CancellationToken, task: tokio::task::JoinHandle<()>) {
    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap();
}

// ============================================================================
// Reconciliation Tests
// ============================================================================

mod reconciliation {
    use super::*;

    #[tokio::test]
    async fn idle_appliance_fetches_selected_program_only() {
        let server = MockServer::start().await;
        mount_detail(&server, true).await;
        mount_status(
            &server,
            serde_json::json!([
                {"key": "BSH.Common.Status.OperationState", "value": "BSH.Common.EnumType.OperationState.Ready"},
                {"key": "BSH.Common.Status.DoorState", "value": "BSH.Common.EnumType.DoorState.Closed"}
            ]),
        )
        .await;

        Mock::given(method("GET"))
            .and(path(appliance_path("/programs/selected")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"key": "Dishcare.Dishwasher.Program.Eco50", "options": [
                    {"key": "BSH.Common.Option.RemainingProgramTime", "value": 10800}
                ]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(appliance_path("/programs/active")))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let handle = ApplianceHandle::new(HA_ID, StateReducer::default());
        reconcile(&client(&server), &handle).await.unwrap();

        assert_eq!(handle.operation_state().as_deref(), Some("ready"));
        assert_eq!(handle.get(Field::DoorState).as_text(), Some("closed"));
        assert_eq!(handle.get(Field::Program).as_text(), Some("eco50"));
        assert_eq!(handle.get(Field::Remaining), FieldValue::Unknown);
    }

    #[tokio::test]
    async fn running_appliance_fetches_active_program_and_options() {
        let server = MockServer::start().await;
        mount_detail(&server, true).await;
        mount_status(
            &server,
            serde_json::json!([
                {"key": "BSH.Common.Status.OperationState", "value": "BSH.Common.EnumType.OperationState.Run"}
            ]),
        )
        .await;

        Mock::given(method("GET"))
            .and(path(appliance_path("/programs/active")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"key": "Dishcare.Dishwasher.Program.Auto2", "options": [
                    {"key": "BSH.Common.Option.RemainingProgramTime", "value": 3600},
                    {"key": "BSH.Common.Option.ProgramProgress", "value": 40}
                ]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(appliance_path("/programs/selected")))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let handle = ApplianceHandle::new(HA_ID, StateReducer::default());
        reconcile(&client(&server), &handle).await.unwrap();

        assert_eq!(handle.get(Field::Program).as_text(), Some("auto2"));
        assert_eq!(handle.get(Field::Remaining), FieldValue::Integer(3600));
        assert_eq!(handle.get(Field::Progress), FieldValue::Integer(40));
    }

    #[tokio::test]
    async fn no_program_selected_sets_placeholder() {
        let server = MockServer::start().await;
        mount_detail(&server, true).await;
        mount_status(
            &server,
            serde_json::json!([
                {"key": "BSH.Common.Status.OperationState", "value": "BSH.Common.EnumType.OperationState.Finished"}
            ]),
        )
        .await;

        Mock::given(method("GET"))
            .and(path(appliance_path("/programs/selected")))
            .respond_with(no_program_selected())
            .expect(1)
            .mount(&server)
            .await;

        let handle = ApplianceHandle::new(HA_ID, StateReducer::default());
        reconcile(&client(&server), &handle).await.unwrap();

        assert_eq!(
            handle.get(Field::Program).as_text(),
            Some("no program selected")
        );
    }

    #[tokio::test]
    async fn offline_appliance_is_reset_without_further_requests() {
        let server = MockServer::start().await;
        mount_detail(&server, false).await;

        Mock::given(method("GET"))
            .and(path(appliance_path("/status")))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let handle = ApplianceHandle::new(HA_ID, StateReducer::default());
        handle.apply("BSH.Common.Option.RemainingProgramTime", "120");
        reconcile(&client(&server), &handle).await.unwrap();

        assert_eq!(handle.operation_state().as_deref(), Some("disconnected"));
        assert_eq!(handle.get(Field::Remaining), FieldValue::Unavailable);
        assert_eq!(handle.get(Field::DoorState), FieldValue::Unknown);
    }

    #[tokio::test]
    async fn malformed_status_is_reported() {
        let server = MockServer::start().await;
        mount_detail(&server, true).await;

        Mock::given(method("GET"))
            .and(path(appliance_path("/status")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"status": "not a list"}
            })))
            .mount(&server)
            .await;

        let handle = ApplianceHandle::new(HA_ID, StateReducer::default());
        assert!(reconcile(&client(&server), &handle).await.is_err());
        assert!(handle.snapshot().is_empty());
    }

    #[tokio::test]
    async fn reconnect_after_disconnect_matches_a_fresh_snapshot() {
        let server = MockServer::start().await;
        mount_detail(&server, true).await;
        mount_status(
            &server,
            serde_json::json!([
                {"key": "BSH.Common.Status.OperationState", "value": "BSH.Common.EnumType.OperationState.Ready"},
                {"key": "BSH.Common.Status.DoorState", "value": "BSH.Common.EnumType.DoorState.Closed"}
            ]),
        )
        .await;
        Mock::given(method("GET"))
            .and(path(appliance_path("/programs/selected")))
            .respond_with(no_program_selected())
            .mount(&server)
            .await;

        let reconnected = ApplianceHandle::new(HA_ID, StateReducer::default());
        reconnected.apply("BSH.Common.Status.OperationState", "BSH.Common.EnumType.OperationState.Run");
        reconnected.apply("BSH.Common.Status.DoorState", "BSH.Common.EnumType.DoorState.Open");
        reconnected.apply("BSH.Common.Root.SelectedProgram", "Dishcare.Dishwasher.Program.Eco50");
        reconnected.apply("BSH.Common.Option.RemainingProgramTime", "300");
        reconnected.apply("BSH.Common.Option.ProgramProgress", "40");
        reconnected.disconnect();
        reconcile(&client(&server), &reconnected).await.unwrap();

        let fresh = ApplianceHandle::new(HA_ID, StateReducer::default());
        reconcile(&client(&server), &fresh).await.unwrap();

        let fresh = fresh.snapshot();
        let reconnected = reconnected.snapshot();
        for (field, value) in fresh.iter() {
            assert_eq!(reconnected.get(field), value, "{field:?}");
        }
        // Fields the snapshot does not cover keep their reset marker.
        for (field, value) in reconnected.iter().filter(|(field, _)| !fresh.contains(*field)) {
            assert!(!value.is_known(), "{field:?} kept {value:?}");
        }
        assert_eq!(reconnected.get(Field::Remaining), &FieldValue::Unavailable);
        assert_eq!(reconnected.get(Field::Progress), &FieldValue::Unavailable);
        assert_eq!(reconnected.get(Field::DoorState).as_text(), Some("closed"));
        assert_eq!(reconnected.operation_state(), Some("ready"));
    }
}

// ============================================================================
// StreamSession Tests
// ============================================================================

mod stream_session {
    use super::*;

    #[tokio::test]
    async fn door_event_updates_state() {
        let server = MockServer::start().await;
        mount_detail(&server, true).await;
        mount_status(&server, serde_json::json!([])).await;
        Mock::given(method("GET"))
            .and(path(appliance_path("/programs/active")))
            .respond_with(no_program_selected())
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(appliance_path("/events")))
            .and(header("accept", "text/event-stream"))
            .and(header("accept-language", "en-US"))
            .respond_with(sse(&[
                ("KEEP-ALIVE", ""),
                (
                    "STATUS",
                    &items(&[(
                        "BSH.Common.Status.DoorState",
                        serde_json::json!("BSH.Common.EnumType.DoorState.Open"),
                    )]),
                ),
            ]))
            .mount(&server)
            .await;

        let (handle, cancel, task) = start(&server);
        wait_for(&handle, |state| {
            state.get(Field::DoorState).as_text() == Some("open")
        })
        .await;

        stop(cancel, task).await;
        assert_eq!(handle.status(), SessionStatus::Stopped);
    }

    #[tokio::test]
    async fn notify_event_sets_remaining_time() {
        let server = MockServer::start().await;
        mount_detail(&server, true).await;
        mount_status(&server, serde_json::json!([])).await;
        Mock::given(method("GET"))
            .and(path(appliance_path("/programs/active")))
            .respond_with(no_program_selected())
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(appliance_path("/events")))
            .respond_with(sse(&[(
                "NOTIFY",
                &items(&[(
                    "BSH.Common.Option.RemainingProgramTime",
                    serde_json::json!(1800),
                )]),
            )]))
            .mount(&server)
            .await;

        let (handle, cancel, task) = start(&server);
        wait_for(&handle, |state| {
            state.get(Field::Remaining) == &FieldValue::Integer(1800)
        })
        .await;

        stop(cancel, task).await;
    }

    #[tokio::test]
    async fn disconnected_event_resets_known_fields() {
        let server = MockServer::start().await;
        mount_detail(&server, false).await;

        Mock::given(method("GET"))
            .and(path(appliance_path("/events")))
            .respond_with(sse(&[
                (
                    "NOTIFY",
                    &items(&[
                        (
                            "BSH.Common.Option.RemainingProgramTime",
                            serde_json::json!(300),
                        ),
                        ("BSH.Common.Option.ProgramProgress", serde_json::json!(90)),
                    ]),
                ),
                ("DISCONNECTED", ""),
            ]))
            .mount(&server)
            .await;

        let (handle, cancel, task) = start(&server);
        wait_for(&handle, |state| {
            state.operation_state() == Some("disconnected")
                && state.get(Field::Remaining) == &FieldValue::Unavailable
                && state.get(Field::Progress) == &FieldValue::Unavailable
        })
        .await;

        stop(cancel, task).await;
        assert_eq!(handle.get(Field::DoorState), FieldValue::Unknown);
    }

    #[tokio::test]
    async fn connect_runs_reconciliation() {
        let server = MockServer::start().await;
        mount_detail(&server, true).await;
        mount_status(
            &server,
            serde_json::json!([
                {"key": "BSH.Common.Status.OperationState", "value": "BSH.Common.EnumType.OperationState.Ready"}
            ]),
        )
        .await;

        Mock::given(method("GET"))
            .and(path(appliance_path("/programs/selected")))
            .respond_with(no_program_selected())
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(appliance_path("/events")))
            .respond_with(sse(&[("KEEP-ALIVE", "")]))
            .mount(&server)
            .await;

        let (handle, cancel, task) = start(&server);
        wait_for(&handle, |state| {
            state.operation_state() == Some("ready")
                && state.get(Field::Program).as_text() == Some("no program selected")
        })
        .await;

        stop(cancel, task).await;
    }

    #[tokio::test]
    async fn unauthorized_stream_refreshes_token() {
        let server = MockServer::start().await;
        mount_detail(&server, true).await;
        mount_status(&server, serde_json::json!([])).await;
        Mock::given(method("GET"))
            .and(path(appliance_path("/programs/active")))
            .respond_with(no_program_selected())
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/security/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh", "token_type": "Bearer", "expires_in": 86400
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(appliance_path("/events")))
            .and(header("authorization", "Bearer seeded"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(appliance_path("/events")))
            .and(header("authorization", "Bearer fresh"))
            .respond_with(sse(&[(
                "STATUS",
                &items(&[(
                    "BSH.Common.Status.LocalControlActive",
                    serde_json::json!(true),
                )]),
            )]))
            .mount(&server)
            .await;

        let (handle, cancel, task) = start(&server);
        wait_for(&handle, |state| {
            state.get(Field::LocalControlActive).as_text() == Some("true")
        })
        .await;

        stop(cancel, task).await;
    }

    #[tokio::test]
    async fn failed_connect_enters_backoff() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(appliance_path("/events")))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (handle, cancel, task) = start(&server);
        let mut status = handle.watch_status();
        let first = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let current = status.borrow_and_update().clone();
                if matches!(current, SessionStatus::Backoff { .. }) {
                    return current;
                }
                status.changed().await.unwrap();
            }
        })
        .await
        .unwrap();

        assert_eq!(
            first,
            SessionStatus::Backoff {
                attempt: 1,
                delay: Duration::from_millis(100),
            }
        );
        stop(cancel, task).await;
    }

    #[tokio::test]
    async fn cancellation_stops_a_waiting_session() {
        let server = MockServer::start().await;
        // Nothing mounted: every connect fails with 404.

        let handle = ApplianceHandle::new(HA_ID, StateReducer::default());
        let config = ClientConfig::new("refresh-me")
            .with_base_url(server.uri())
            .with_backoff(BackoffPolicy::new().with_unit(Duration::from_secs(60)));
        let client = ApiClient::new(&config).unwrap();
        let _ = client.tokens().clone().with_access_token("Bearer seeded");

        let cancel = CancellationToken::new();
        let task = StreamSession::new(client, handle.clone(), cancel.clone()).spawn();

        let mut status = handle.watch_status();
        tokio::time::timeout(Duration::from_secs(5), status.wait_for(|s| {
            matches!(s, SessionStatus::Backoff { .. })
        }))
        .await
        .unwrap()
        .unwrap();

        stop(cancel, task).await;
        assert!(handle.status().is_stopped());
    }

    #[tokio::test]
    async fn received_event_resets_backoff() {
        use hconnect_lib::subscription::Subscribable;

        let server = MockServer::start().await;
        mount_detail(&server, false).await;

        Mock::given(method("GET"))
            .and(path(appliance_path("/events")))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(appliance_path("/events")))
            .respond_with(sse(&[(
                "STATUS",
                &items(&[(
                    "BSH.Common.Status.DoorState",
                    serde_json::json!("BSH.Common.EnumType.DoorState.Open"),
                )]),
            )]))
            .mount(&server)
            .await;

        let (handle, cancel, task) = start(&server);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let _subscription = handle.on_status_changed({
            let seen = Arc::clone(&seen);
            move |status| {
                if let SessionStatus::Backoff { attempt, .. } = status {
                    seen.lock().unwrap().push(*attempt);
                }
            }
        });

        tokio::time::timeout(Duration::from_secs(5), async {
            while seen.lock().unwrap().len() < 2 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
        stop(cancel, task).await;

        // The first failure waits one step; after a delivered event the
        // next wait starts over instead of growing.
        assert_eq!(seen.lock().unwrap()[..2], [1, 1]);
    }

    #[tokio::test]
    async fn detail_requests_stay_flat_across_reconnects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(appliance_path("")))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(appliance_path("/events")))
            .respond_with(sse(&[("KEEP-ALIVE", "")]))
            .mount(&server)
            .await;

        let config = ClientConfig::new("refresh-me")
            .with_base_url(server.uri())
            .with_backoff(
                BackoffPolicy::new()
                    .with_unit(Duration::from_millis(10))
                    .with_max_delay(Duration::from_millis(40)),
            );
        let client = ApiClient::new(&config).unwrap();
        let _ = client.tokens().clone().with_access_token("Bearer seeded");
        let handle = ApplianceHandle::new(HA_ID, StateReducer::default());
        let cancel = CancellationToken::new();
        let task = StreamSession::new(client, handle, cancel.clone()).spawn();

        let count = |requests: &[wiremock::Request], suffix: &str| {
            let target = appliance_path(suffix);
            requests.iter().filter(|r| r.url.path() == target).count()
        };

        tokio::time::sleep(Duration::from_millis(300)).await;
        let first = server.received_requests().await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        let second = server.received_requests().await.unwrap();
        stop(cancel, task).await;

        let details = count(&second, "") - count(&first, "");
        let connects = count(&second, "/events") - count(&first, "/events");
        assert!(connects > 0);
        // Each connect restarts the single live reconciliation, which gets
        // at most one retry in before the next connect replaces it.
        assert!(
            details <= 2 * connects + 2,
            "{details} detail requests over {connects} connects"
        );
    }
}

// ============================================================================
// ApplianceRegistry Tests
// ============================================================================

mod registry {
    use super::*;

    async fn mount_appliances(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/homeappliances"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"homeappliances": [
                    {"haId": HA_ID, "type": "Dishwasher", "brand": "Bosch",
                     "vib": "SMV68TX06E", "connected": true},
                    {"haId": "SIEMENS-LC98KLP60-68A40E000004", "type": "Hood",
                     "brand": "Siemens", "vib": "LC98KLP60", "connected": true}
                ]}
            })))
            .mount(server)
            .await;
    }

    fn registry(server: &MockServer) -> ApplianceRegistry {
        ApplianceRegistry::with_client(client(server), StateReducer::default())
    }

    #[tokio::test]
    async fn discovery_skips_unsupported_types() {
        let server = MockServer::start().await;
        mount_appliances(&server).await;
        mount_detail(&server, false).await;
        Mock::given(method("GET"))
            .and(path(appliance_path("/events")))
            .respond_with(sse(&[("KEEP-ALIVE", "")]))
            .mount(&server)
            .await;

        let registry = registry(&server);
        let mut events = registry.subscribe();
        let sensors = registry.discover().await.unwrap();

        assert_eq!(registry.appliance_ids(), vec![HA_ID.to_string()]);
        assert_eq!(sensors.len(), 7);
        assert!(sensors.iter().all(|sensor| sensor.ha_id() == HA_ID));
        assert!(
            sensors
                .iter()
                .any(|sensor| sensor.unique_id() == format!("{HA_ID}-DoorState"))
        );

        let discovered = loop {
            if let ApplianceEvent::Discovered { ha_id, kind } = events.recv().await.unwrap() {
                break (ha_id, kind);
            }
        };
        assert_eq!(discovered, (HA_ID.to_string(), "Dishwasher".to_string()));

        registry.shutdown().await;
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn rediscovery_does_not_duplicate_sessions() {
        let server = MockServer::start().await;
        mount_appliances(&server).await;
        mount_detail(&server, false).await;
        Mock::given(method("GET"))
            .and(path(appliance_path("/events")))
            .respond_with(sse(&[("KEEP-ALIVE", "")]))
            .mount(&server)
            .await;

        let registry = registry(&server);
        assert_eq!(registry.discover().await.unwrap().len(), 7);
        assert!(registry.discover().await.unwrap().is_empty());
        assert_eq!(registry.len(), 1);

        registry.shutdown().await;
    }

    #[tokio::test]
    async fn sensors_follow_appliance_state() {
        let server = MockServer::start().await;
        mount_appliances(&server).await;
        mount_detail(&server, false).await;
        Mock::given(method("GET"))
            .and(path(appliance_path("/events")))
            .respond_with(sse(&[("KEEP-ALIVE", "")]))
            .mount(&server)
            .await;

        let registry = registry(&server);
        registry.discover().await.unwrap();

        let handle = registry.handle(HA_ID).unwrap();
        wait_for(&handle, |state| state.operation_state() == Some("disconnected")).await;

        let sensors = registry.sensors(HA_ID).unwrap();
        let operation = sensors
            .iter()
            .find(|sensor| sensor.field() == Field::OperationState)
            .unwrap();
        assert_eq!(operation.value(), FieldValue::text("disconnected"));
        assert_eq!(operation.name(), "Bosch SMV68TX06E OperationState");

        assert!(registry.remove(HA_ID).await);
        assert!(!registry.remove(HA_ID).await);
        registry.shutdown().await;
    }

    #[tokio::test]
    async fn unknown_appliance_is_an_error() {
        let server = MockServer::start().await;
        let registry = registry(&server);

        assert!(matches!(
            registry.sensors("missing"),
            Err(Error::ApplianceNotFound(id)) if id == "missing"
        ));
        assert!(registry.handle("missing").is_none());
    }
}
