use log::{debug, trace, warn};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewOrder, Order, OrderAction},
    mpe_api::order_objects::OrderQueryFilter,
    traits::PaymentGatewayError,
};

/// Inserts a new order using the given connection. Not atomic on its own; embed the call in a
/// transaction and pass `&mut *tx` when inserting a whole checkout.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, PaymentGatewayError> {
    let result = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_number,
                buyer_id,
                seller_id,
                product_id,
                quantity,
                total_price,
                customer_name,
                email,
                address,
                phone,
                note
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *;
        "#,
    )
    .bind(order.order_number.clone())
    .bind(order.buyer_id)
    .bind(order.seller_id)
    .bind(order.product_id)
    .bind(order.quantity)
    .bind(order.total_price)
    .bind(order.customer_name)
    .bind(order.email)
    .bind(order.address)
    .bind(order.phone)
    .bind(order.note)
    .fetch_one(conn)
    .await;
    match result {
        Ok(order) => {
            debug!("📝️ Order [{}] inserted", order);
            Ok(order)
        },
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(PaymentGatewayError::DuplicateOrderNumber(order.order_number))
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

/// Fetches the order only if `user_id` is the buyer or the seller on it.
pub async fn fetch_order_for_party(
    id: i64,
    user_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1 AND (buyer_id = $2 OR seller_id = $2)")
        .bind(id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// All orders stamped with the given gateway reference, oldest first. One checkout produces
/// several orders that share a reference.
pub async fn fetch_orders_by_reference(
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE payment_reference = $1 ORDER BY id ASC")
        .bind(reference)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

/// Stamps every listed order with the payment reference in a single statement.
pub async fn attach_payment_reference(
    order_ids: &[i64],
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, PaymentGatewayError> {
    if order_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::new("UPDATE orders SET updated_at = CURRENT_TIMESTAMP, payment_reference = ");
    builder.push_bind(reference);
    builder.push(" WHERE id IN (");
    let mut ids = builder.separated(", ");
    for id in order_ids {
        ids.push_bind(id);
    }
    builder.push(") RETURNING *");
    let stamped: Vec<Order> = builder.build_query_as().fetch_all(conn).await?;
    if stamped.len() != order_ids.len() {
        warn!("📝️ Tried to stamp {} orders with reference {reference}, but {} matched", order_ids.len(), stamped.len());
    }
    Ok(stamped)
}

/// Marks the order as paid iff it is still unpaid, returning `None` when another delivery beat
/// us to it. `paid_at` is written here and nowhere else.
pub async fn mark_order_paid(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, PaymentGatewayError> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders
            SET payment_status = 'Paid', paid_at = CURRENT_TIMESTAMP, updated_at = CURRENT_TIMESTAMP
            WHERE id = $1 AND payment_status = 'Unpaid'
            RETURNING *;
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Applies a lifecycle action. The state-machine precondition is part of the WHERE clause, so a
/// row is only written when the transition is legal at the moment of the update, and each date
/// column is written by exactly one action.
pub async fn apply_action(
    id: i64,
    action: OrderAction,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, PaymentGatewayError> {
    let sql = match action {
        OrderAction::Accept => {
            r#"UPDATE orders SET status = 'Confirmed', delivery_status = 'Pending', updated_at = CURRENT_TIMESTAMP
               WHERE id = $1 AND status = 'Pending' RETURNING *"#
        },
        OrderAction::Reject => {
            r#"UPDATE orders SET status = 'Cancelled', delivery_status = 'Cancelled',
                      cancelled_date = CURRENT_TIMESTAMP, updated_at = CURRENT_TIMESTAMP
               WHERE id = $1 AND status = 'Pending' RETURNING *"#
        },
        OrderAction::Ship => {
            r#"UPDATE orders SET delivery_status = 'Shipped', shipped_date = CURRENT_TIMESTAMP,
                      updated_at = CURRENT_TIMESTAMP
               WHERE id = $1 AND status = 'Confirmed' AND delivery_status = 'Pending' RETURNING *"#
        },
        OrderAction::Deliver => {
            r#"UPDATE orders SET delivery_status = 'Delivered', delivered_date = CURRENT_TIMESTAMP,
                      updated_at = CURRENT_TIMESTAMP
               WHERE id = $1 AND delivery_status = 'Shipped' RETURNING *"#
        },
        OrderAction::Receive => {
            r#"UPDATE orders SET delivery_status = 'Accepted', received_date = CURRENT_TIMESTAMP,
                      updated_at = CURRENT_TIMESTAMP
               WHERE id = $1 AND delivery_status = 'Delivered' RETURNING *"#
        },
    };
    let order = sqlx::query_as(sql).bind(id).fetch_optional(conn).await?;
    Ok(order)
}

/// Fetches orders according to the criteria in the `OrderQueryFilter`.
///
/// Resulting orders are ordered by `created_at` in ascending order.
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM orders ");
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(buyer_id) = query.buyer_id {
        where_clause.push("buyer_id = ");
        where_clause.push_bind_unseparated(buyer_id);
    }
    if let Some(seller_id) = query.seller_id {
        where_clause.push("seller_id = ");
        where_clause.push_bind_unseparated(seller_id);
    }
    if let Some(reference) = query.payment_reference {
        where_clause.push("payment_reference = ");
        where_clause.push_bind_unseparated(reference);
    }
    if let Some(order_number) = query.order_number {
        where_clause.push("order_number = ");
        where_clause.push_bind_unseparated(order_number.0);
    }
    if let Some(payment_status) = query.payment_status {
        where_clause.push("payment_status = ");
        where_clause.push_bind_unseparated(payment_status.to_string());
    }
    if query.status.as_ref().map(|s| !s.is_empty()).unwrap_or(false) {
        let statuses =
            query.status.as_ref().unwrap().iter().map(|s| format!("'{s}'")).collect::<Vec<String>>().join(",");
        where_clause.push(format!("status IN ({statuses})"));
    }
    if let Some(since) = query.since {
        where_clause.push("created_at >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = query.until {
        where_clause.push("created_at <= ");
        where_clause.push_bind_unseparated(until);
    }
    builder.push(" ORDER BY created_at ASC");

    trace!("📝️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    trace!("📝️ Result of search_orders: {:?}", orders.len());
    Ok(orders)
}
