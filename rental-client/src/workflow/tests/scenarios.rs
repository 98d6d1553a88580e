use chrono::NaiveDate;
use serde_json::{Value, json};

use crate::{
    api::RentalApi,
    error::{CARD_INCOMPLETE_MESSAGE, RentalError},
    models::{Plan, SubscriptionId, UserId, VehicleId},
    session::{AuthToken, Credentials, Session},
    transport::{HttpMethod, mock::MockTransport},
    workflow::{
        ACTIVE_BANNER_TITLE, CardDetails, CurrentSubscription, FixedClock,
        PAYMENT_UNVERIFIED_MESSAGE, PlansState, RESERVATION_DATES_MESSAGE, SubscriptionState,
        SubscriptionWorkflow,
    },
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

fn session() -> Session {
    Session::Authenticated(Credentials::new(AuthToken::new("tok"), UserId::new(4)))
}

fn workflow(mock: &MockTransport) -> SubscriptionWorkflow<MockTransport, FixedClock> {
    let api = RentalApi::new(mock.clone(), "http://localhost:8000/api");
    SubscriptionWorkflow::new(api, session()).with_clock(FixedClock(today()))
}

fn plans_json() -> Value {
    json!([{
        "id_plan": 1,
        "nombre_plan": "Básico",
        "descripcion": "Plan de entrada",
        "precio_mensual": "29.99",
        "limite_km": 1000
    }])
}

fn basico() -> Plan {
    serde_json::from_value(plans_json()[0].clone()).unwrap()
}

fn subscription_json(id: u64, estado: u8) -> Value {
    json!({
        "id_suscripcion": id,
        "fecha_inicio": "2025-03-10",
        "fecha_fin": "2025-04-10",
        "fecha_pago": "2025-03-10",
        "id_usuario": 4,
        "id_plan": 1,
        "id_estado": estado
    })
}

fn payment_json(subscription: u64) -> Value {
    json!({
        "id_pago": 7,
        "id_suscripcion": subscription,
        "fecha_registro": "2025-03-10",
        "monto": "29.99"
    })
}

fn card() -> CardDetails {
    CardDetails::new("Ana López", "4111 1111 1111 1111", "12/27", "123")
}

/// Loads with no current subscription.
async fn loaded_idle(mock: &MockTransport) -> SubscriptionWorkflow<MockTransport, FixedClock> {
    mock.respond(200, plans_json()).respond(200, json!([]));
    let mut wf = workflow(mock);
    wf.load().await.unwrap();
    wf
}

/// Loads with a paid active subscription 42.
async fn loaded_active(mock: &MockTransport) -> SubscriptionWorkflow<MockTransport, FixedClock> {
    mock.respond(200, plans_json())
        .respond(200, json!([subscription_json(42, 1)]))
        .respond(200, json!([payment_json(42)]));
    let mut wf = workflow(mock);
    wf.load().await.unwrap();
    assert!(matches!(wf.state(), SubscriptionState::Active(_)));
    wf
}

#[tokio::test]
async fn test_basico_purchase_creates_subscription_then_payment() {
    let mock = MockTransport::new();
    let mut wf = loaded_idle(&mock).await;
    assert!(wf.can_purchase());

    mock.respond(201, subscription_json(42, 1)).respond(201, payment_json(42));
    let subscription = wf.subscribe(&basico(), &card()).await.unwrap();
    assert_eq!(subscription.id_suscripcion, SubscriptionId::new(42));

    let subs = mock.calls_to(HttpMethod::Post, "/suscripciones");
    assert_eq!(subs.len(), 1);
    assert_eq!(
        subs[0].body,
        Some(json!({
            "fecha_inicio": "2025-03-10",
            "fecha_fin": "2025-04-10",
            "fecha_pago": "2025-03-10",
            "id_usuario": 4,
            "id_plan": 1,
            "id_estado": 1
        }))
    );
    assert_eq!(subs[0].bearer_token.as_deref(), Some("tok"));

    let payments = mock.calls_to(HttpMethod::Post, "/pagos");
    assert_eq!(payments.len(), 1);
    assert_eq!(
        payments[0].body,
        Some(json!({"id_suscripcion": 42, "fecha_registro": "2025-03-10", "monto": "29.99"}))
    );

    let banner = wf.active_banner().unwrap();
    assert_eq!(banner.title, ACTIVE_BANNER_TITLE);
    assert_eq!(banner.plan_name.as_deref(), Some("Básico"));
    assert!(!wf.can_purchase());
}

#[tokio::test]
async fn test_blank_cvv_makes_no_calls() {
    let mock = MockTransport::new();
    let mut wf = workflow(&mock);

    let card = CardDetails::new("Ana López", "4111 1111 1111 1111", "12/27", " ");
    let err = wf.subscribe(&basico(), &card).await.unwrap_err();

    assert!(matches!(err, RentalError::Validation(_)));
    assert_eq!(mock.call_count(), 0);
    assert_eq!(wf.message(), Some(CARD_INCOMPLETE_MESSAGE));
    assert_eq!(wf.state(), &SubscriptionState::None);
}

#[tokio::test]
async fn test_inactive_subscription_shows_plans_without_banner() {
    let mock = MockTransport::new();
    mock.respond(200, plans_json()).respond(200, subscription_json(42, 2));
    let mut wf = workflow(&mock);
    wf.load().await.unwrap();

    assert_eq!(wf.plans().plans().len(), 1);
    assert_eq!(wf.current(), &CurrentSubscription::None);
    assert!(wf.active_banner().is_none());
    assert!(wf.can_purchase());
    assert!(mock.calls_to(HttpMethod::Get, "/pagos").is_empty());
}

#[tokio::test]
async fn test_not_found_means_no_subscription() {
    let mock = MockTransport::new();
    mock.respond(200, plans_json()).respond(404, json!({"message": "No encontrado"}));
    let mut wf = workflow(&mock);
    wf.load().await.unwrap();

    assert_eq!(wf.current(), &CurrentSubscription::None);
    assert!(wf.can_purchase());
}

#[tokio::test]
async fn test_plan_list_failure_is_kept_in_view() {
    let mock = MockTransport::new();
    mock.respond(500, json!({"message": "Error interno"})).respond(200, json!([]));
    let mut wf = workflow(&mock);
    wf.load().await.unwrap();

    assert_eq!(wf.plans(), &PlansState::Failed("Error interno".to_owned()));
}

#[tokio::test]
async fn test_payment_failure_leaves_orphan_then_retry_repairs_it() {
    let mock = MockTransport::new();
    let mut wf = loaded_idle(&mock).await;

    mock.respond(201, subscription_json(42, 1))
        .respond(500, json!({"message": "Pago rechazado"}));
    let err = wf.subscribe(&basico(), &card()).await.unwrap_err();

    match err {
        RentalError::OrphanedSubscription { subscription_id, .. } => {
            assert_eq!(subscription_id, SubscriptionId::new(42));
        }
        other => panic!("expected orphaned subscription, got {other:?}"),
    }
    assert!(matches!(wf.state(), SubscriptionState::SubscribedUnpaid { .. }));
    assert!(wf.active_banner().is_none());
    assert!(wf.message().unwrap().contains("#42"));

    mock.respond(201, payment_json(42));
    let repaired = wf.retry_payment().await.unwrap();
    assert_eq!(repaired.id_suscripcion, SubscriptionId::new(42));
    assert!(wf.active_banner().is_some());

    assert_eq!(mock.calls_to(HttpMethod::Post, "/suscripciones").len(), 1);
    let payments = mock.calls_to(HttpMethod::Post, "/pagos");
    assert_eq!(payments.len(), 2);
    assert_eq!(payments[1].body.as_ref().unwrap()["monto"], "29.99");
}

#[tokio::test]
async fn test_subscription_failure_returns_to_idle_without_payment() {
    let mock = MockTransport::new();
    let mut wf = loaded_idle(&mock).await;

    mock.respond(422, json!({"message": "Plan no disponible"}));
    let err = wf.subscribe(&basico(), &card()).await.unwrap_err();

    assert!(matches!(err, RentalError::Api { status: 422, .. }));
    assert_eq!(wf.state(), &SubscriptionState::None);
    assert_eq!(wf.message(), Some("Plan no disponible"));
    assert!(mock.calls_to(HttpMethod::Post, "/pagos").is_empty());
}

#[tokio::test]
async fn test_second_subscribe_rejected() {
    let mock = MockTransport::new();
    let mut wf = loaded_active(&mock).await;
    let before = mock.call_count();

    let err = wf.subscribe(&basico(), &card()).await.unwrap_err();
    assert!(matches!(err, RentalError::InvalidState { action: "subscribe", .. }));
    assert_eq!(mock.call_count(), before);
}

#[tokio::test]
async fn test_failed_check_blocks_purchase() {
    let mock = MockTransport::new();
    mock.respond(200, plans_json()).fail(RentalError::Transport("connection reset".into()));
    let mut wf = workflow(&mock);

    let err = wf.load().await.unwrap_err();
    assert!(matches!(err, RentalError::SubscriptionCheckFailed(_)));
    assert!(matches!(wf.current(), CurrentSubscription::Unknown(_)));
    assert_eq!(wf.plans().plans().len(), 1);
    assert!(!wf.can_purchase());

    let err = wf.subscribe(&basico(), &card()).await.unwrap_err();
    assert!(matches!(err, RentalError::SubscriptionCheckFailed(_)));
    assert!(mock.calls_to(HttpMethod::Post, "/suscripciones").is_empty());
}

#[tokio::test]
async fn test_unchecked_subscribe_checks_first() {
    let mock = MockTransport::new();
    mock.respond(200, json!([subscription_json(42, 1)]));
    let mut wf = workflow(&mock);

    let err = wf.subscribe(&basico(), &card()).await.unwrap_err();
    assert!(matches!(err, RentalError::InvalidState { .. }));
    assert_eq!(mock.call_count(), 1);
    assert_eq!(mock.calls()[0].path, "/suscripciones/cliente/4");
}

#[tokio::test]
async fn test_unauthenticated_subscribe_makes_no_calls() {
    let mock = MockTransport::new();
    let api = RentalApi::new(mock.clone(), "http://localhost:8000/api");
    let mut wf = SubscriptionWorkflow::new(api, Session::Unauthenticated);

    let err = wf.subscribe(&basico(), &card()).await.unwrap_err();
    assert!(matches!(err, RentalError::Unauthenticated));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_reconcile_flags_active_subscription_without_payment() {
    let mock = MockTransport::new();
    mock.respond(200, plans_json())
        .respond(200, json!({"success": true, "data": [subscription_json(42, 1)]}))
        .respond(200, json!([payment_json(41)]));
    let mut wf = workflow(&mock);
    wf.load().await.unwrap();

    match wf.state() {
        SubscriptionState::SubscribedUnpaid { subscription, amount } => {
            assert_eq!(subscription.id_suscripcion, SubscriptionId::new(42));
            assert_eq!(amount.map(|a| a.to_string()), Some("29.99".to_owned()));
        }
        other => panic!("expected unpaid state, got {other:?}"),
    }
    assert!(wf.active_banner().is_none());

    mock.respond(201, payment_json(42));
    wf.retry_payment().await.unwrap();
    assert!(matches!(wf.state(), SubscriptionState::Active(_)));
}

#[tokio::test]
async fn test_retry_payment_requires_unpaid_state() {
    let mock = MockTransport::new();
    let mut wf = workflow(&mock);
    let err = wf.retry_payment().await.unwrap_err();
    assert!(matches!(err, RentalError::InvalidState { state: "none", .. }));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_deactivate_without_subscription_is_noop() {
    let mock = MockTransport::new();
    let mut wf = workflow(&mock);
    wf.deactivate().await.unwrap();
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_deactivate_confirmed_clears_current() {
    let mock = MockTransport::new();
    let mut wf = loaded_active(&mock).await;

    mock.respond(200, subscription_json(42, 2));
    wf.deactivate().await.unwrap();

    let patches = mock.calls_to(HttpMethod::Patch, "/suscripciones/42");
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].body, Some(json!({"id_estado": 2})));
    assert_eq!(wf.state(), &SubscriptionState::None);
    assert_eq!(wf.current(), &CurrentSubscription::None);
    assert!(wf.active_banner().is_none());
}

#[tokio::test]
async fn test_payment_list_unavailable_keeps_subscription_usable() {
    let mock = MockTransport::new();
    mock.respond(200, plans_json())
        .respond(200, json!([subscription_json(42, 1)]))
        .respond(403, json!({"message": "No autorizado"}));
    let mut wf = workflow(&mock);

    wf.load().await.unwrap();
    assert!(matches!(wf.state(), SubscriptionState::Active(_)));
    assert_eq!(wf.message(), Some(PAYMENT_UNVERIFIED_MESSAGE));
    assert!(wf.active_banner().is_some());

    mock.respond(200, subscription_json(42, 2));
    wf.deactivate().await.unwrap();
    assert_eq!(mock.calls_to(HttpMethod::Patch, "/suscripciones/42").len(), 1);
    assert_eq!(wf.state(), &SubscriptionState::None);
}

#[tokio::test]
async fn test_deactivate_unexpected_status_keeps_subscription() {
    let mock = MockTransport::new();
    let mut wf = loaded_active(&mock).await;

    mock.respond(200, subscription_json(42, 5));
    let err = wf.deactivate().await.unwrap_err();

    assert!(matches!(err, RentalError::InvalidResponse(_)));
    assert!(matches!(wf.state(), SubscriptionState::Active(_)));
    assert!(wf.active_banner().is_some());
}

#[tokio::test]
async fn test_deactivate_network_failure_keeps_subscription() {
    let mock = MockTransport::new();
    let mut wf = loaded_active(&mock).await;

    mock.fail(RentalError::Transport("timeout".into()));
    assert!(wf.deactivate().await.is_err());
    assert!(matches!(wf.state(), SubscriptionState::Active(_)));
}

#[tokio::test]
async fn test_reservation_requires_active_subscription() {
    let mock = MockTransport::new();
    let mut wf = workflow(&mock);
    let from = today();
    let to = from + chrono::Days::new(3);

    let err = wf.book_reservation(VehicleId::new(3), from, to).await.unwrap_err();
    assert!(matches!(err, RentalError::InvalidState { action: "reserve", .. }));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_reservation_dates_validated_then_posted() {
    let mock = MockTransport::new();
    let mut wf = loaded_active(&mock).await;
    let from = today();
    let to = from + chrono::Days::new(3);

    let err = wf.book_reservation(VehicleId::new(3), to, from).await.unwrap_err();
    assert!(matches!(err, RentalError::Validation(msg) if msg == RESERVATION_DATES_MESSAGE));
    assert!(mock.calls_to(HttpMethod::Post, "/reservaciones").is_empty());

    mock.respond(201, json!({
        "id_reservacion": 11,
        "fecha_desde": "2025-03-10",
        "fecha_hasta": "2025-03-13",
        "id_suscripcion": 42,
        "id_vehiculo": 3
    }));
    let reservation = wf.book_reservation(VehicleId::new(3), from, to).await.unwrap().unwrap();
    assert_eq!(reservation.days(), 4);

    let posts = mock.calls_to(HttpMethod::Post, "/reservaciones");
    assert_eq!(
        posts[0].body,
        Some(json!({
            "fecha_desde": "2025-03-10",
            "fecha_hasta": "2025-03-13",
            "id_suscripcion": 42,
            "id_vehiculo": 3
        }))
    );
}

#[tokio::test]
async fn test_list_user_subscriptions() {
    let mock = MockTransport::new();
    mock.respond(200, json!([subscription_json(41, 2), subscription_json(42, 1)]));
    let mut wf = workflow(&mock);

    let subs = wf.list_user_subscriptions().await.unwrap();
    assert_eq!(subs.len(), 2);
    assert_eq!(mock.calls()[0].path, "/suscripciones/cliente/4");
}
