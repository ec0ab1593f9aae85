//! Admin dashboard aggregates.

use serde::Serialize;

use paradise_core::Price;

/// Store-wide counters shown on the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Every order ever placed.
    pub total_orders: i64,
    /// Sum of `total_amount` over orders that are not cancelled.
    pub total_revenue: Price,
    /// Orders still in `PENDING`.
    pub pending_orders: i64,
    /// Products whose stock is at or below the low-stock threshold.
    pub low_stock_products: i64,
}
