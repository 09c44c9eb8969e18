//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain::{DomainEvent, HotelEvent, StayRange};
use event_store::{AppendOptions, EventStore, InMemoryEventStore, Version};
use metrics_exporter_prometheus::PrometheusHandle;
use projections::FailurePolicy;
use tower::ServiceExt;
use uuid::Uuid;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> axum::Router {
    setup_with_policy(FailurePolicy::Halt)
}

fn setup_with_policy(policy: FailurePolicy) -> axum::Router {
    setup_with_state(policy).0
}

fn setup_with_state(
    policy: FailurePolicy,
) -> (
    axum::Router,
    Arc<api::routes::AppState<InMemoryEventStore>>,
) {
    let store = InMemoryEventStore::new();
    let (state, _processor) = api::create_default_state(store, policy);
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state)
}

/// Writes a reservation for a room type that was never created straight to
/// the store, past the endpoint's validation.
async fn append_orphan_reservation(store: &InMemoryEventStore) {
    let event = HotelEvent::rooms_reserved(
        common::ReservationId::new(),
        StayRange::new(
            chrono::NaiveDate::from_ymd_opt(2016, 3, 30).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2016, 4, 3).unwrap(),
        )
        .unwrap(),
        common::RoomTypeId::new(),
        "orphan",
        1,
    );
    store
        .append(
            vec![event.to_envelope(Version::first()).unwrap()],
            AppendOptions::expect_new(),
        )
        .await
        .unwrap();
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(
        app,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

async fn post_event(app: &axum::Router, event: serde_json::Value) -> (StatusCode, serde_json::Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri("/events")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&event).unwrap()))
            .unwrap(),
    )
    .await
}

fn rooms_created(room_type_id: Uuid, description: &str, total_units: u32) -> serde_json::Value {
    serde_json::json!({
        "type": "RoomsCreated",
        "data": {
            "room_type_id": room_type_id,
            "description": description,
            "total_units": total_units,
            "hotel_id": Uuid::new_v4(),
        }
    })
}

fn rooms_reserved(room_type_id: Uuid, check_in: &str, check_out: &str, units: u32) -> serde_json::Value {
    serde_json::json!({
        "type": "RoomsReserved",
        "data": {
            "reservation_id": Uuid::new_v4(),
            "check_in": check_in,
            "check_out": check_out,
            "room_type_id": room_type_id,
            "guest_name": "guest 1",
            "units": units,
        }
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let (status, json) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["read_model"], "VacancyRepository");
    assert_eq!(json["room_types"], 0);
    assert_eq!(json["projections"], 1);
    assert_eq!(json["failure_policy"], "halt");
    assert_eq!(json["projection_position"], 0);
    assert_eq!(json["head_position"], 0);
    assert_eq!(json["lag"], 0);
    assert!(json.get("error").is_none());
}

#[tokio::test]
async fn test_no_room_types_means_no_vacancies() {
    let app = setup();

    let (status, json) = get(&app, "/vacancies?check_in=2016-07-01&check_out=2016-07-02").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!([]));
}

#[tokio::test]
async fn test_publish_returns_stored_event() {
    let app = setup();
    let room_type_id = Uuid::new_v4();

    let (status, json) = post_event(&app, rooms_created(room_type_id, "Double Room", 2)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["event_type"], "RoomsCreated");
    assert_eq!(json["aggregate_id"], room_type_id.to_string());
    assert_eq!(json["version"], 1);
    assert_eq!(json["position"], 1);
    assert!(json["event_id"].as_str().is_some());
}

#[tokio::test]
async fn test_reservation_reduces_availability() {
    let app = setup();
    let double = Uuid::new_v4();
    let single = Uuid::new_v4();

    post_event(&app, rooms_created(double, "Double Room", 1)).await;
    post_event(&app, rooms_created(single, "Single Room", 2)).await;
    let (status, json) = post_event(&app, rooms_reserved(double, "2016-03-30", "2016-04-03", 1)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["position"], 3);

    let (status, json) = get(&app, "/vacancies?check_in=2016-04-02&check_out=2016-04-03").await;

    assert_eq!(status, StatusCode::OK);
    let vacancies = json.as_array().unwrap();
    assert_eq!(vacancies.len(), 2);
    assert_eq!(vacancies[0]["room_type_id"], double.to_string());
    assert_eq!(vacancies[0]["description"], "Double Room");
    assert_eq!(vacancies[0]["total_units"], 1);
    assert_eq!(vacancies[0]["units_available"], 0);
    assert_eq!(vacancies[1]["description"], "Single Room");
    assert_eq!(vacancies[1]["units_available"], 2);

    // Check-out day is free again
    let (_, json) = get(&app, "/vacancies?check_in=2016-04-03&check_out=2016-04-04").await;
    assert_eq!(json[0]["units_available"], 1);
}

#[tokio::test]
async fn test_inverted_range_is_bad_request() {
    let app = setup();

    let (status, json) = get(&app, "/vacancies?check_in=2016-04-03&check_out=2016-04-02").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("Invalid range"));

    let (status, _) = get(&app, "/vacancies?check_in=2016-04-03&check_out=2016-04-03").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_query_is_bad_request() {
    let app = setup();

    let (status, _) = get(&app, "/vacancies?check_in=yesterday&check_out=2016-04-02").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/vacancies").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_room_type_is_rejected_and_queries_keep_working() {
    let app = setup();
    let room_type_id = Uuid::new_v4();

    let (status, _) = post_event(&app, rooms_created(room_type_id, "Double Room", 2)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = post_event(&app, rooms_created(room_type_id, "Double Room", 2)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("already exists"));

    // The rejected event never reached the log, so later events still project.
    let (status, json) = post_event(&app, rooms_created(Uuid::new_v4(), "Single Room", 1)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["position"], 2);

    let (status, json) = get(&app, "/vacancies?check_in=2016-04-01&check_out=2016-04-02").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 2);

    let (status, json) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["head_position"], 2);
    assert_eq!(json["lag"], 0);
}

#[tokio::test]
async fn test_duplicate_reservation_is_conflict_and_counted_once() {
    let app = setup();
    let room_type_id = Uuid::new_v4();
    post_event(&app, rooms_created(room_type_id, "Double Room", 2)).await;

    let reservation = rooms_reserved(room_type_id, "2016-03-30", "2016-04-03", 1);
    let (status, _) = post_event(&app, reservation.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = post_event(&app, reservation).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, json) = get(&app, "/vacancies?check_in=2016-04-01&check_out=2016-04-02").await;
    assert_eq!(json[0]["units_available"], 1);
}

#[tokio::test]
async fn test_reservation_for_unknown_room_type_is_unprocessable() {
    let app = setup();

    let (status, json) =
        post_event(&app, rooms_reserved(Uuid::new_v4(), "2016-03-30", "2016-04-03", 1)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].as_str().unwrap().contains("Unknown room type"));

    let (_, json) = get(&app, "/health").await;
    assert_eq!(json["head_position"], 0);
}

#[tokio::test]
async fn test_inverted_reservation_range_is_unprocessable() {
    let app = setup();
    let room_type_id = Uuid::new_v4();
    post_event(&app, rooms_created(room_type_id, "Double Room", 2)).await;

    let (status, json) =
        post_event(&app, rooms_reserved(room_type_id, "2016-04-03", "2016-03-30", 1)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].as_str().unwrap().contains("Invalid range"));
}

#[tokio::test]
async fn test_zero_units_is_unprocessable() {
    let app = setup();
    let room_type_id = Uuid::new_v4();

    let (status, _) = post_event(&app, rooms_created(room_type_id, "Broken Room", 0)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_halted_projection_still_serves_reads_and_reports_lag() {
    let (app, state) = setup_with_state(FailurePolicy::Halt);
    append_orphan_reservation(&state.event_store).await;

    let (status, _) = post_event(&app, rooms_created(Uuid::new_v4(), "Single Room", 1)).await;
    assert_eq!(status, StatusCode::CREATED);

    // The view stays at its last good position but queries still answer.
    let (status, json) = get(&app, "/vacancies?check_in=2016-04-01&check_out=2016-04-02").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!([]));

    let (status, json) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["projection_position"], 0);
    assert_eq!(json["head_position"], 2);
    assert_eq!(json["lag"], 2);
    assert!(json["error"].as_str().unwrap().contains("Unknown room type"));
}

#[tokio::test]
async fn test_skip_policy_projects_past_rejected_event() {
    let (app, state) = setup_with_state(FailurePolicy::Skip);
    append_orphan_reservation(&state.event_store).await;
    let room_type_id = Uuid::new_v4();

    let (status, _) = post_event(&app, rooms_created(room_type_id, "Single Room", 1)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = get(&app, "/vacancies?check_in=2016-04-01&check_out=2016-04-02").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["units_available"], 1);

    let (status, json) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["failure_policy"], "skip");
    assert_eq!(json["lag"], 0);
}

#[tokio::test]
async fn test_unknown_event_type_is_rejected() {
    let app = setup();

    let (status, _) = post_event(
        &app,
        serde_json::json!({"type": "RoomsDemolished", "data": {}}),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_get_room_type_with_reservations() {
    let app = setup();
    let room_type_id = Uuid::new_v4();

    post_event(&app, rooms_created(room_type_id, "Double Room", 2)).await;
    post_event(&app, rooms_reserved(room_type_id, "2016-03-30", "2016-04-03", 1)).await;

    let (status, json) = get(&app, &format!("/room-types/{room_type_id}")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["description"], "Double Room");
    assert_eq!(json["total_units"], 2);
    let reservations = json["reservations"].as_array().unwrap();
    assert_eq!(reservations.len(), 1);
    assert_eq!(reservations[0]["check_in"], "2016-03-30");
    assert_eq!(reservations[0]["check_out"], "2016-04-03");
    assert_eq!(reservations[0]["units"], 1);
}

#[tokio::test]
async fn test_get_unknown_room_type() {
    let app = setup();

    let (status, _) = get(&app, &format!("/room-types/{}", Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, "/room-types/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();
    let room_type_id = Uuid::new_v4();

    post_event(&app, rooms_created(room_type_id, "Double Room", 2)).await;
    get(&app, "/vacancies?check_in=2016-04-01&check_out=2016-04-02").await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("vacancy_queries_total"));
    assert!(text.contains("vacancy_room_types"));
}
