use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use log::debug;
use marketplace_engine::db_types::Role;
use mps_common::Secret;

use crate::{auth::TokenIssuer, config::AuthConfig, middleware::JwtMiddlewareFactory};

// Creates a test `AuthConfig` for issuing tokens. DO NOT re-use this secret anywhere.
pub fn get_auth_config() -> AuthConfig {
    AuthConfig { jwt_secret: Secret::new("0f3b2a-endpoint-test-secret-do-not-reuse-77aa01".to_string()) }
}

pub fn issue_token(sub: &str, role: Role) -> String {
    TokenIssuer::new(&get_auth_config()).issue_token(sub, role, None).expect("Failed to sign token")
}

/// Runs `req` against an app that mirrors the production auth pipeline (JWT middleware + claims
/// extractor) around the routes added by `configure`. Errors raised by middleware come back as
/// their mapped status code, same as a live server.
pub async fn send_request(
    auth_header: &str,
    req: TestRequest,
    configure: fn(&mut ServiceConfig),
) -> (StatusCode, String) {
    let mut req = req;
    if !auth_header.is_empty() {
        req = req.insert_header(("Authorization", format!("Bearer {auth_header}")));
    }
    let req = req.to_request();
    let issuer = TokenIssuer::new(&get_auth_config());
    let app = App::new()
        .app_data(web::Data::new(issuer.clone()))
        .wrap(JwtMiddlewareFactory::new(issuer))
        .configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    match test::try_call_service(&service, req).await {
        Ok(res) => {
            let (_, res) = res.into_parts();
            let status = res.status();
            let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
            (status, body)
        },
        Err(e) => {
            let status = e.as_response_error().status_code();
            (status, e.to_string())
        },
    }
}
