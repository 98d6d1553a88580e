//! Integration tests for wire models and the response envelope.
//!
//! Bodies below are shaped like real rental API responses.

use rental_client::{
    RentalError,
    api::envelope::{decode, decode_list, decode_optional, extract_error_message},
    models::{Payment, Plan, Reservation, ReservationStatus, Subscription, SubscriptionStatus},
    transport::TransportResponse,
};

fn response(status: u16, body: &str) -> TransportResponse {
    TransportResponse { status, body: body.as_bytes().to_vec() }
}

#[test]
fn test_plan_list_bare_and_wrapped_agree() {
    let bare = r#"[{"id_plan": 1, "nombre_plan": "Básico", "precio_mensual": "29.99", "limite_km": 1000}]"#;
    let wrapped = format!(r#"{{"success": true, "data": {bare}, "message": "ok"}}"#);

    let from_bare: Vec<Plan> = decode_list(&response(200, bare)).unwrap();
    let from_wrapped: Vec<Plan> = decode_list(&response(200, &wrapped)).unwrap();
    assert_eq!(from_bare, from_wrapped);
    assert_eq!(from_bare[0].precio_mensual.to_string(), "29.99");
}

#[test]
fn test_numeric_price_accepted() {
    let body = r#"[{"id_plan": 2, "nombre_plan": "Premium", "precio_mensual": 59.5}]"#;
    let plans: Vec<Plan> = decode_list(&response(200, body)).unwrap();
    assert_eq!(plans[0].precio_mensual.to_string(), "59.5");
}

#[test]
fn test_single_subscription_as_list() {
    let body = r#"{"id_suscripcion": 5, "fecha_inicio": "2025-03-01", "fecha_fin": "2025-04-01",
                  "fecha_pago": "2025-03-01 10:00:00", "id_usuario": 4, "id_plan": 1, "id_estado": 2}"#;
    let subs: Vec<Subscription> = decode_list(&response(200, body)).unwrap();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].id_estado, SubscriptionStatus::Inactive);
    assert!(!subs[0].is_active());
}

#[test]
fn test_unknown_status_preserved() {
    let body = r#"{"id_suscripcion": 5, "fecha_inicio": "2025-03-01", "fecha_fin": "2025-04-01",
                  "id_plan": 1, "id_estado": 7}"#;
    let sub: Subscription = decode(&response(200, body)).unwrap();
    assert_eq!(sub.id_estado, SubscriptionStatus::Unknown(7));
    assert_eq!(sub.id_estado.code(), 7);
}

#[test]
fn test_empty_payment_body_is_none() {
    let payment: Option<Payment> = decode_optional(&response(201, "")).unwrap();
    assert!(payment.is_none());
    let payment: Option<Payment> = decode_optional(&response(201, "null")).unwrap();
    assert!(payment.is_none());
}

#[test]
fn test_wrapped_failure_is_api_error() {
    let body = r#"{"success": false, "data": null, "message": "Plan inexistente"}"#;
    let result: Result<Vec<Plan>, _> = decode_list(&response(200, body));
    match result {
        Err(RentalError::Api { message, .. }) => assert_eq!(message.as_deref(), Some("Plan inexistente")),
        other => panic!("expected API error, got {other:?}"),
    }
}

#[test]
fn test_garbage_is_invalid_response() {
    let result: Result<Vec<Plan>, _> = decode_list(&response(200, "<html>oops</html>"));
    assert!(matches!(result, Err(RentalError::InvalidResponse(_))));
}

#[test]
fn test_reservation_with_embedded_records() {
    let body = r#"[{
        "id_reservacion": 3,
        "fecha_desde": "2025-03-10",
        "fecha_hasta": "2025-03-12",
        "fecha_registro": "2025-03-09T18:00:00.000000Z",
        "id_suscripcion": 5,
        "id_vehiculo": 2,
        "suscripcion": {"id_suscripcion": 5, "fecha_inicio": "2025-03-01", "fecha_fin": "2025-04-01",
                        "id_plan": 1, "id_estado": 2},
        "vehiculo": {"id_vehiculo": 2, "marca": "Kia", "modelo": "Rio", "anio": "2020", "placa": "P123456"}
    }]"#;
    let reservations: Vec<Reservation> = decode_list(&response(200, body)).unwrap();
    let r = &reservations[0];
    assert_eq!(r.days(), 3);
    assert_eq!(r.vehiculo.as_ref().unwrap().placa, "P123456");
    assert_eq!(ReservationStatus::from(2), ReservationStatus::Pending(2));
}

#[test]
fn test_error_message_sources() {
    assert_eq!(extract_error_message(br#"{"message": "a"}"#).as_deref(), Some("a"));
    assert_eq!(extract_error_message(br#"{"error": "b"}"#).as_deref(), Some("b"));
    assert_eq!(
        extract_error_message(br#"{"errors": {"placa": ["La placa ya existe"]}}"#).as_deref(),
        Some("La placa ya existe")
    );
    assert_eq!(extract_error_message(b"not json"), None);
}
