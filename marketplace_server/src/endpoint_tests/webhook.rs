use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, App};
use marketplace_engine::{
    db_types::PaymentStatus,
    events::EventProducers,
    traits::{PaymentGatewayError, SettlementResult},
    OrderFlowApi,
};
use mps_common::Secret;
use paystack_tools::{sign_payload, PAYSTACK_SIGNATURE_HEADER};

use super::mocks::{sample_order, MockPaymentBackend};
use crate::{middleware::HmacMiddlewareFactory, order_routes::PaystackWebhookRoute};

const WEBHOOK_SECRET: &str = "sk_test_webhook_secret";

/// Posts `body` to a webhook pipeline that mirrors production: HMAC middleware in front of the
/// handler, backed by the given mock.
async fn post_webhook(body: &str, signature: Option<String>, backend: MockPaymentBackend) -> (StatusCode, String) {
    let api = OrderFlowApi::new(backend, EventProducers::default());
    let hmac = HmacMiddlewareFactory::new(Secret::new(WEBHOOK_SECRET.to_string()), true);
    let app = App::new().app_data(web::Data::new(api)).service(
        web::scope("/order/webhook").wrap(hmac).service(PaystackWebhookRoute::<MockPaymentBackend>::new()),
    );
    let service = test::init_service(app).await;
    let mut req = TestRequest::post()
        .uri("/order/webhook")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(body.to_string());
    if let Some(signature) = signature {
        req = req.insert_header((PAYSTACK_SIGNATURE_HEADER, signature));
    }
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let (_, res) = res.into_parts();
            let status = res.status();
            let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
            (status, body)
        },
        Err(e) => (e.as_response_error().status_code(), e.to_string()),
    }
}

fn charge_success_body(reference: &str) -> String {
    format!(r#"{{"event":"charge.success","data":{{"reference":"{reference}","amount":150000}}}}"#)
}

#[actix_web::test]
async fn a_correctly_signed_charge_success_settles_orders() {
    let _ = env_logger::try_init();
    let mut backend = MockPaymentBackend::new();
    backend.expect_settle_orders_for_reference().withf(|r| r == "ref-good").returning(|_| {
        let mut order = sample_order(1);
        order.payment_status = PaymentStatus::Paid;
        Ok(SettlementResult { settled: vec![order], skipped: 0, credits: vec![] })
    });
    let body = charge_success_body("ref-good");
    let signature = sign_payload(WEBHOOK_SECRET, body.as_bytes());
    let (status, response) = post_webhook(&body, Some(signature), backend).await;
    assert_eq!(status, StatusCode::OK);
    assert!(response.contains("Payment processed successfully"));
}

#[actix_web::test]
async fn a_tampered_payload_is_rejected_and_nothing_is_settled() {
    let _ = env_logger::try_init();
    // No expectations on the mock: reaching the backend would panic the handler.
    let backend = MockPaymentBackend::new();
    let body = charge_success_body("ref-tampered");
    let signature = sign_payload(WEBHOOK_SECRET, body.as_bytes());
    let tampered = body.replace("150000", "999999");
    let (status, _response) = post_webhook(&tampered, Some(signature), backend).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn a_missing_signature_is_rejected() {
    let _ = env_logger::try_init();
    let backend = MockPaymentBackend::new();
    let body = charge_success_body("ref-unsigned");
    let (status, _response) = post_webhook(&body, None, backend).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn an_unknown_reference_is_a_404() {
    let _ = env_logger::try_init();
    let mut backend = MockPaymentBackend::new();
    backend
        .expect_settle_orders_for_reference()
        .returning(|r| Err(PaymentGatewayError::NoOrdersForReference(r.to_string())));
    let body = charge_success_body("ref-unknown");
    let signature = sign_payload(WEBHOOK_SECRET, body.as_bytes());
    let (status, response) = post_webhook(&body, Some(signature), backend).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(response.contains("Orders not found"));
}

#[actix_web::test]
async fn charge_failed_is_acknowledged_without_touching_orders() {
    let _ = env_logger::try_init();
    let backend = MockPaymentBackend::new();
    let body = r#"{"event":"charge.failed","data":{"reference":"ref-failed"}}"#;
    let signature = sign_payload(WEBHOOK_SECRET, body.as_bytes());
    let (status, response) = post_webhook(body, Some(signature), backend).await;
    assert_eq!(status, StatusCode::OK);
    assert!(response.contains("Charge failure recorded"));
}

#[actix_web::test]
async fn unrecognized_event_types_are_acknowledged_and_ignored() {
    let _ = env_logger::try_init();
    let backend = MockPaymentBackend::new();
    let body = r#"{"event":"subscription.create","data":{"reference":"ref-sub"}}"#;
    let signature = sign_payload(WEBHOOK_SECRET, body.as_bytes());
    let (status, response) = post_webhook(body, Some(signature), backend).await;
    assert_eq!(status, StatusCode::OK);
    assert!(response.contains("ignored"));
}

#[actix_web::test]
async fn database_failures_surface_as_500_not_a_hang() {
    let _ = env_logger::try_init();
    let mut backend = MockPaymentBackend::new();
    backend
        .expect_settle_orders_for_reference()
        .returning(|_| Err(PaymentGatewayError::DatabaseError("disk is on fire".to_string())));
    let body = charge_success_body("ref-dberr");
    let signature = sign_payload(WEBHOOK_SECRET, body.as_bytes());
    let (status, response) = post_webhook(&body, Some(signature), backend).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.contains("Server error"));
}
