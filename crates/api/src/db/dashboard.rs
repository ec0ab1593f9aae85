//! Aggregate queries for the admin dashboard.

use rust_decimal::Decimal;
use sqlx::PgPool;

use paradise_core::{OrderStatus, Price};

use super::RepositoryError;
use crate::models::DashboardStats;

/// Compute dashboard statistics.
///
/// The four aggregates are independent and run concurrently on separate
/// pool connections.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if any query fails.
pub async fn stats(
    pool: &PgPool,
    low_stock_threshold: i32,
) -> Result<DashboardStats, RepositoryError> {
    let total_orders = sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM nursery."order""#)
        .fetch_one(pool);

    let revenue = sqlx::query_scalar::<_, Decimal>(
        r#"SELECT COALESCE(SUM(total_amount), 0) FROM nursery."order" WHERE status <> $1"#,
    )
    .bind(OrderStatus::Cancelled)
    .fetch_one(pool);

    let pending_orders =
        sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM nursery."order" WHERE status = $1"#)
            .bind(OrderStatus::Pending)
            .fetch_one(pool);

    let low_stock_products =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM nursery.product WHERE stock <= $1")
            .bind(low_stock_threshold)
            .fetch_one(pool);

    let (total_orders, revenue, pending_orders, low_stock_products) =
        tokio::try_join!(total_orders, revenue, pending_orders, low_stock_products)?;

    // Revenue can exceed a single column's bound, so skip the range check
    let total_revenue = Price::from_stored(revenue);

    Ok(DashboardStats {
        total_orders,
        total_revenue,
        pending_orders,
        low_stock_products,
    })
}
