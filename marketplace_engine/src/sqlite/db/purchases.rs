use sqlx::SqliteConnection;

use crate::traits::PaymentGatewayError;

/// Records that the buyer now owns the product. Re-recording an already-present product is a
/// no-op, which is what makes webhook redelivery safe for this table.
pub async fn record_purchase(
    buyer_id: &str,
    product_id: &str,
    conn: &mut SqliteConnection,
) -> Result<(), PaymentGatewayError> {
    sqlx::query("INSERT OR IGNORE INTO purchased_products (buyer_id, product_id) VALUES ($1, $2)")
        .bind(buyer_id)
        .bind(product_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn purchased_product_ids(
    buyer_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<String>, PaymentGatewayError> {
    let ids = sqlx::query_scalar("SELECT product_id FROM purchased_products WHERE buyer_id = $1 ORDER BY created_at")
        .bind(buyer_id)
        .fetch_all(conn)
        .await?;
    Ok(ids)
}
