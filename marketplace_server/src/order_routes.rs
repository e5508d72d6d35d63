//----------------------------------------------   Checkout & webhook  ----------------------------------------------
//
// The write side of the order flow: turning a cart into per-seller orders backed by one
// Paystack transaction, receiving the asynchronous charge events, and the buyer/seller
// lifecycle actions.
use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, error, info, trace, warn};
use marketplace_engine::{traits::PaymentGatewayDatabase, OrderFlowApi, PaymentGatewayError};
use paystack_tools::{ChargeEvent, CheckoutMetadata, EventKind, InitializeTransaction, PaystackApi};

use crate::{
    auth::JwtClaims,
    data_objects::{CheckoutRequest, CheckoutResponse, JsonResponse, MarkOrderStatusRequest, OrderUpdatedResponse},
    errors::ServerError,
    route,
};

route!(create_checkout => Post "/create" impl PaymentGatewayDatabase);
/// Creates the per-seller orders for the cart, then initializes one Paystack transaction that
/// funds all of them, and stamps its reference onto every order.
///
/// If the gateway call fails, the created orders deliberately stay behind as
/// `Pending`/`Unpaid` with no reference: the buyer simply retries checkout and nothing else in
/// the system ever observes them.
pub async fn create_checkout<B: PaymentGatewayDatabase>(
    claims: JwtClaims,
    body: web::Json<CheckoutRequest>,
    api: web::Data<OrderFlowApi<B>>,
    paystack: web::Data<PaystackApi>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    trace!("🛒️ Checkout request from {} with {} cart lines", claims.sub, request.cart.len());
    let checkout = request.into_new_checkout(claims.sub);
    let amount = checkout.total_amount();
    let orders = api.create_checkout_orders(checkout.clone()).await?;
    let order_ids = orders.iter().map(|o| o.id).collect::<Vec<_>>();

    let transaction = InitializeTransaction {
        amount,
        email: checkout.email.clone(),
        metadata: CheckoutMetadata {
            order_ids: order_ids.clone(),
            customer_name: checkout.customer_name.clone(),
            address: checkout.address.clone(),
            phone: checkout.phone.clone(),
            note: checkout.note.clone(),
            cart: serde_json::to_value(&checkout.cart).ok(),
        },
        callback_url: None,
    };
    let authorization = match paystack.initialize_transaction(transaction).await {
        Ok(auth) => auth,
        Err(e) => {
            // The orders stay unpaid and unreferenced; see above.
            warn!("🛒️ Could not initialize payment for {} orders: {e}", order_ids.len());
            return Err(ServerError::PaymentInitializationFailed);
        },
    };
    api.attach_payment_reference(&order_ids, &authorization.reference).await?;
    info!("🛒️ Checkout of {amount} initialized with reference {}", authorization.reference);
    Ok(HttpResponse::Ok().json(CheckoutResponse {
        message: "Payment initialized successfully".to_string(),
        order_ids,
        data: authorization,
    }))
}

route!(paystack_webhook => Post "" impl PaymentGatewayDatabase);
/// The Paystack event sink. The HMAC middleware has already authenticated the payload by the
/// time this runs.
///
/// Every path returns a structured response rather than bubbling an error, so the provider's
/// retry policy sees exactly the status codes it expects: 200 for processed or ignored events,
/// 404 when the reference matches nothing, 500 for internal failures.
pub async fn paystack_webhook<B: PaymentGatewayDatabase>(
    req: HttpRequest,
    body: web::Json<ChargeEvent>,
    api: web::Data<OrderFlowApi<B>>,
) -> HttpResponse {
    trace!("🛒️ Received webhook request: {}", req.uri());
    let event = body.into_inner();
    let reference = event.data.reference.clone();
    match event.kind() {
        EventKind::ChargeSuccess => match api.settle_orders_by_reference(&reference).await {
            Ok(result) => {
                info!(
                    "🛒️ Webhook for {reference} processed: {} orders settled, {} already paid.",
                    result.settled.len(),
                    result.skipped
                );
                HttpResponse::Ok().json(JsonResponse::success("Payment processed successfully"))
            },
            Err(PaymentGatewayError::NoOrdersForReference(_)) => {
                warn!("🛒️ Webhook for {reference} matched no orders");
                HttpResponse::NotFound().json(JsonResponse::failure("Orders not found"))
            },
            Err(e) => {
                error!("🛒️ Error processing webhook for {reference}: {e}");
                HttpResponse::InternalServerError().json(JsonResponse::failure("Server error"))
            },
        },
        EventKind::ChargeFailed => {
            api.record_failed_charge(&reference).await;
            HttpResponse::Ok().json(JsonResponse::success("Charge failure recorded"))
        },
        EventKind::Other(kind) => {
            debug!("🛒️ Ignoring webhook event type {kind}");
            HttpResponse::Ok().json(JsonResponse::success(format!("Event {kind} ignored")))
        },
    }
}

route!(mark_order_status => Patch "/mark-order-status/{id}" impl PaymentGatewayDatabase);
/// Applies a buyer/seller lifecycle action. Out-of-sequence actions come back as 422 with the
/// reason; acting on someone else's order is 403.
pub async fn mark_order_status<B: PaymentGatewayDatabase>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<MarkOrderStatusRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    let action = body.into_inner().action;
    debug!("🛒️ PATCH mark-order-status: '{action}' on order {order_id} by {}", claims.sub);
    let order = api.mark_order_status(&claims.sub, order_id, action).await?;
    Ok(HttpResponse::Ok().json(OrderUpdatedResponse { message: "Order updated successfully".to_string(), order }))
}
