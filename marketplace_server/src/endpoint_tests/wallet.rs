use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use marketplace_engine::{db_types::Role, WalletApi};

use super::{
    helpers::{issue_token, send_request},
    mocks::{sample_wallet, MockPaymentBackend},
};
use crate::routes::{MyEarningsRoute, MyWalletRoute};

#[actix_web::test]
async fn sellers_can_read_their_balance() {
    let _ = env_logger::try_init();
    let token = issue_token("seller-1", Role::Seller);
    let (status, body) = send_request(&token, TestRequest::get().uri("/wallet"), configure_wallet).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"balance":80000}"#);
}

#[actix_web::test]
async fn buyers_are_locked_out_of_wallet_endpoints() {
    let _ = env_logger::try_init();
    let token = issue_token("buyer-1", Role::Buyer);
    let (status, _body) = send_request(&token, TestRequest::get().uri("/wallet"), configure_wallet).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn a_never_credited_seller_has_no_wallet() {
    let _ = env_logger::try_init();
    let token = issue_token("seller-2", Role::Seller);
    let (status, body) = send_request(&token, TestRequest::get().uri("/wallet"), configure_missing_wallet).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("No wallet exists for seller seller-2"));
}

#[actix_web::test]
async fn earnings_summary_reports_the_split() {
    let _ = env_logger::try_init();
    let token = issue_token("seller-1", Role::Seller);
    let (status, body) = send_request(&token, TestRequest::get().uri("/wallet/earnings"), configure_earnings).await;
    assert_eq!(status, StatusCode::OK);
    // total_sales 100,000 → payout 80,000 / platform 20,000
    assert!(body.contains("\"total_sales\":100000"));
    assert!(body.contains("\"payout\":80000"));
    assert!(body.contains("\"platform_share\":20000"));
}

fn configure_wallet(cfg: &mut ServiceConfig) {
    let mut backend = MockPaymentBackend::new();
    backend.expect_fetch_wallet().returning(|owner| Ok(Some(sample_wallet(owner, 80_000))));
    let api = WalletApi::new(backend);
    cfg.service(web::scope("/wallet").service(MyWalletRoute::<MockPaymentBackend>::new())).app_data(web::Data::new(api));
}

fn configure_missing_wallet(cfg: &mut ServiceConfig) {
    let mut backend = MockPaymentBackend::new();
    backend.expect_fetch_wallet().returning(|_| Ok(None));
    let api = WalletApi::new(backend);
    cfg.service(web::scope("/wallet").service(MyWalletRoute::<MockPaymentBackend>::new())).app_data(web::Data::new(api));
}

fn configure_earnings(cfg: &mut ServiceConfig) {
    let mut backend = MockPaymentBackend::new();
    backend.expect_fetch_wallet().returning(|owner| Ok(Some(sample_wallet(owner, 80_000))));
    let api = WalletApi::new(backend);
    cfg.service(web::scope("/wallet").service(MyEarningsRoute::<MockPaymentBackend>::new())).app_data(web::Data::new(api));
}
