use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use marketplace_engine::{
    db_types::{DeliveryStatus, OrderAction, OrderStatusType, Role, TransitionError},
    events::EventProducers,
    traits::PaymentGatewayError,
    OrderFlowApi,
    OrderQueryApi,
};
use serde_json::json;

use super::{
    helpers::{issue_token, send_request},
    mocks::{sample_order, MockPaymentBackend},
};
use crate::{
    order_routes::MarkOrderStatusRoute,
    routes::{MyOrdersAsBuyerRoute, OrderByIdRoute},
};

fn status_request(action: &str) -> TestRequest {
    TestRequest::patch().uri("/mark-order-status/1").set_json(json!({ "action": action }))
}

#[actix_web::test]
async fn accepting_a_pending_order_succeeds() {
    let _ = env_logger::try_init();
    let token = issue_token("seller-1", Role::Seller);
    let (status, body) = send_request(&token, status_request("accept"), configure_accept).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Order updated successfully"));
    assert!(body.contains("Confirmed"));
}

#[actix_web::test]
async fn out_of_sequence_actions_come_back_as_422() {
    let _ = env_logger::try_init();
    let token = issue_token("seller-1", Role::Seller);
    let (status, body) = send_request(&token, status_request("ship"), configure_blocked_ship).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("Cannot ship order"));
}

#[actix_web::test]
async fn acting_on_someone_elses_order_is_forbidden() {
    let _ = env_logger::try_init();
    let token = issue_token("interloper", Role::Buyer);
    let (status, _body) = send_request(&token, status_request("accept"), configure_not_party).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn unknown_action_names_fail_validation() {
    let _ = env_logger::try_init();
    let token = issue_token("seller-1", Role::Seller);
    // The backend must never be reached: no expectations are set on the mock.
    let (status, _body) = send_request(&token, status_request("explode"), configure_untouched).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn requests_without_a_token_are_unauthorized() {
    let _ = env_logger::try_init();
    let (status, _body) = send_request("", status_request("accept"), configure_untouched).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn buyers_see_their_own_orders() {
    let _ = env_logger::try_init();
    let token = issue_token("buyer-1", Role::Buyer);
    let (status, body) = send_request(&token, TestRequest::get().uri("/buyer"), configure_buyer_listing).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("ORD-SAMPLE0001"));
    assert!(body.contains("ORD-SAMPLE0002"));
    // total_value = 2 × 10,000 kobo
    assert!(body.contains("\"total_value\":20000"));
}

#[actix_web::test]
async fn order_lookup_is_scoped_to_the_acting_party() {
    let _ = env_logger::try_init();
    let token = issue_token("buyer-1", Role::Buyer);
    let (status, _body) = send_request(&token, TestRequest::get().uri("/7"), configure_order_lookup_miss).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn configure_accept(cfg: &mut ServiceConfig) {
    let mut backend = MockPaymentBackend::new();
    backend.expect_transition_order().returning(|_, id, _| {
        let mut order = sample_order(id);
        order.status = OrderStatusType::Confirmed;
        order.delivery_status = DeliveryStatus::Pending;
        Ok(order)
    });
    add_flow_api(cfg, backend);
}

fn configure_blocked_ship(cfg: &mut ServiceConfig) {
    let mut backend = MockPaymentBackend::new();
    backend.expect_transition_order().returning(|_, _, action| {
        Err(PaymentGatewayError::CannotTransition(TransitionError {
            action,
            status: OrderStatusType::Pending,
            delivery_status: DeliveryStatus::Pending,
        }))
    });
    add_flow_api(cfg, backend);
}

fn configure_not_party(cfg: &mut ServiceConfig) {
    let mut backend = MockPaymentBackend::new();
    backend.expect_transition_order().returning(|user, id, _| {
        Err(PaymentGatewayError::NotOrderParty { order_id: id, user_id: user.to_string() })
    });
    add_flow_api(cfg, backend);
}

fn configure_untouched(cfg: &mut ServiceConfig) {
    add_flow_api(cfg, MockPaymentBackend::new());
}

fn configure_buyer_listing(cfg: &mut ServiceConfig) {
    let mut backend = MockPaymentBackend::new();
    backend.expect_search_orders().returning(|_| Ok(vec![sample_order(1), sample_order(2)]));
    let api = OrderQueryApi::new(backend);
    cfg.service(MyOrdersAsBuyerRoute::<MockPaymentBackend>::new()).app_data(web::Data::new(api));
}

fn configure_order_lookup_miss(cfg: &mut ServiceConfig) {
    let mut backend = MockPaymentBackend::new();
    backend.expect_fetch_order_for_party().returning(|_, _| Ok(None));
    let api = OrderQueryApi::new(backend);
    cfg.service(OrderByIdRoute::<MockPaymentBackend>::new()).app_data(web::Data::new(api));
}

fn add_flow_api(cfg: &mut ServiceConfig, backend: MockPaymentBackend) {
    let api = OrderFlowApi::new(backend, EventProducers::default());
    cfg.service(MarkOrderStatusRoute::<MockPaymentBackend>::new()).app_data(web::Data::new(api));
}
