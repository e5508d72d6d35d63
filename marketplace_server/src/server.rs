use std::{future::Future, pin::Pin, time::Duration};

use actix_web::{
    dev::{Server, Service},
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    HttpServer,
};
use futures::{future::ok, FutureExt};
use log::{info, warn};
use marketplace_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    OrderFlowApi,
    OrderQueryApi,
    SqliteDatabase,
    WalletApi,
};
use paystack_tools::PaystackApi;

use crate::{
    auth::TokenIssuer,
    config::ServerConfig,
    errors::ServerError,
    helpers::get_remote_ip,
    middleware::{HmacMiddlewareFactory, JwtMiddlewareFactory},
    order_routes::{CreateCheckoutRoute, MarkOrderStatusRoute, PaystackWebhookRoute},
    routes::{
        health,
        MyEarningsRoute,
        MyOrdersAsBuyerRoute,
        MyOrdersAsSellerRoute,
        MyPurchasesRoute,
        MyWalletRoute,
        MyWalletTransactionsRoute,
        OrderByIdRoute,
        OrdersByReferenceRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = EventHandlers::new(128, default_hooks());
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// The default event subscribers: audit-log lines for settled and annulled orders. Deployments
/// that need side effects (notifications, fulfilment kicks) replace these.
fn default_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks.on_order_paid(|event| {
        Box::pin(async move {
            info!("💸️ Order [{}] paid. Seller {} is owed fulfilment.", event.order.order_number, event.order.seller_id);
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    hooks.on_order_annulled(|event| {
        Box::pin(async move {
            info!("🚫️ Order [{}] was rejected by the seller.", event.order.order_number);
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    hooks
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let paystack_api = PaystackApi::new(config.paystack_config.api.clone())
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let order_flow_api = OrderFlowApi::new(db.clone(), producers.clone());
        let order_query_api = OrderQueryApi::new(db.clone());
        let wallet_api = WalletApi::new(db.clone());
        let token_issuer = TokenIssuer::new(&config.auth);
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("mps::access_log"))
            .app_data(web::Data::new(order_flow_api))
            .app_data(web::Data::new(order_query_api))
            .app_data(web::Data::new(wallet_api))
            .app_data(web::Data::new(paystack_api.clone()))
            .app_data(web::Data::new(token_issuer.clone()));
        // The webhook is authenticated by payload signature (and optionally an IP whitelist),
        // never by JWT. Registered before the /order scope so it matches first.
        let use_x_forwarded_for = config.use_x_forwarded_for;
        let use_forwarded = config.use_forwarded;
        let whitelist = config.paystack_config.whitelist.clone();
        let hmac = HmacMiddlewareFactory::new(
            config.paystack_config.api.secret_key.clone(),
            config.paystack_config.signature_checks,
        );
        let webhook_scope = web::scope("/order/webhook")
            .wrap(hmac)
            .wrap_fn(move |req, srv| {
                let allowed = match &whitelist {
                    None => true,
                    Some(whitelist) => get_remote_ip(req.request(), use_x_forwarded_for, use_forwarded)
                        .map(|ip| whitelist.contains(&ip))
                        .unwrap_or_else(|| {
                            warn!("No IP address found in webhook request, denying access.");
                            false
                        }),
                };
                if allowed {
                    srv.call(req).boxed_local()
                } else {
                    let e = ServerError::InsufficientPermissions("Remote peer is not whitelisted".to_string());
                    ok(req.error_response(e)).boxed_local()
                }
            })
            .service(PaystackWebhookRoute::<SqliteDatabase>::new());
        let order_scope = web::scope("/order")
            .wrap(JwtMiddlewareFactory::new(token_issuer.clone()))
            .service(CreateCheckoutRoute::<SqliteDatabase>::new())
            .service(MyOrdersAsBuyerRoute::<SqliteDatabase>::new())
            .service(MyOrdersAsSellerRoute::<SqliteDatabase>::new())
            .service(OrdersByReferenceRoute::<SqliteDatabase>::new())
            .service(MyPurchasesRoute::<SqliteDatabase>::new())
            .service(MarkOrderStatusRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new());
        let wallet_scope = web::scope("/wallet")
            .wrap(JwtMiddlewareFactory::new(token_issuer))
            .service(MyWalletTransactionsRoute::<SqliteDatabase>::new())
            .service(MyEarningsRoute::<SqliteDatabase>::new())
            .service(MyWalletRoute::<SqliteDatabase>::new());
        app.service(health).service(webhook_scope).service(order_scope).service(wallet_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
