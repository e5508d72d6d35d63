//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module
//! neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the
//! current thread will stop that worker from processing new requests. For this reason, any
//! long, non-cpu-bound operation (I/O, database calls, the outbound Paystack call) must be
//! expressed as a future and awaited, so the worker can interleave other requests.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use marketplace_engine::{
    db_types::Role,
    traits::{OrderManagement, WalletManagement},
    OrderQueryApi,
    WalletApi,
};

use crate::{auth::JwtClaims, errors::ServerError};

// Actix-web cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal requires [$($roles:expr),*]) => {
        paste::paste! { pub struct [<$name:camel Route>];}
        paste::paste! {
                impl [<$name:camel Route>] {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self { Self }
            }
        }
        paste::paste! {
            impl actix_web::dev::HttpServiceFactory for [<$name:camel Route>] {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let res = actix_web::Resource::new($path)
                        .name(stringify!($name))
                        .guard(actix_web::guard::$method())
                        .to($name)
                        .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires [$($roles:expr),*])  => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds)++ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders (read)  ----------------------------------------------
route!(my_orders_as_buyer => Get "/buyer" impl OrderManagement);
pub async fn my_orders_as_buyer<B: OrderManagement>(
    claims: JwtClaims,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET orders for buyer {}", claims.sub);
    let orders = api.orders_for_buyer(&claims.sub).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(my_orders_as_seller => Get "/seller" impl OrderManagement);
pub async fn my_orders_as_seller<B: OrderManagement>(
    claims: JwtClaims,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET orders for seller {}", claims.sub);
    let orders = api.orders_for_seller(&claims.sub).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(orders_by_reference => Get "/by-reference/{reference}" impl OrderManagement);
pub async fn orders_by_reference<B: OrderManagement>(
    path: web::Path<String>,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let reference = path.into_inner();
    debug!("💻️ GET orders for payment reference {reference}");
    let orders = api.orders_by_reference(&reference).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(my_purchases => Get "/purchases" impl OrderManagement);
pub async fn my_purchases<B: OrderManagement>(
    claims: JwtClaims,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET purchased products for {}", claims.sub);
    let products = api.purchased_products(&claims.sub).await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(order_by_id => Get "/{id}" impl OrderManagement);
pub async fn order_by_id<B: OrderManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET order {order_id} for {}", claims.sub);
    let order = api.order_for_party(&claims.sub, order_id).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Wallet  -----------------------------------------------------
route!(my_wallet => Get "" impl WalletManagement where requires [Role::Seller, Role::Admin]);
pub async fn my_wallet<A: WalletManagement>(
    claims: JwtClaims,
    api: web::Data<WalletApi<A>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET wallet for {}", claims.sub);
    let balance = api.balance(&claims.sub).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "balance": balance })))
}

route!(my_wallet_transactions => Get "/transactions" impl WalletManagement where requires [Role::Seller, Role::Admin]);
pub async fn my_wallet_transactions<A: WalletManagement>(
    claims: JwtClaims,
    api: web::Data<WalletApi<A>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET wallet transactions for {}", claims.sub);
    let transactions = api.transactions(&claims.sub).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "transactions": transactions })))
}

route!(my_earnings => Get "/earnings" impl WalletManagement where requires [Role::Seller, Role::Admin]);
pub async fn my_earnings<A: WalletManagement>(
    claims: JwtClaims,
    api: web::Data<WalletApi<A>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET earnings summary for {}", claims.sub);
    let summary = api.earnings_summary(&claims.sub).await?;
    Ok(HttpResponse::Ok().json(summary))
}
