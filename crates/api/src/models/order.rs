//! Order domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use paradise_core::{OrderId, OrderItemId, OrderStatus, PaymentMode, Price, ProductId, UserId};

use super::Product;

/// A placed order with its lines.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: Option<UserId>,
    pub customer_name: String,
    pub phone: String,
    pub whatsapp: Option<String>,
    pub address: String,
    pub city: String,
    pub pincode: String,
    pub total_amount: Price,
    pub payment_mode: PaymentMode,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line on an order. `price` is the unit price captured at order time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub qty: i32,
    pub price: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
}

/// A requested line when placing an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub qty: u32,
}

/// Where the order ships and who to call about it.
///
/// Missing fields deserialize as empty strings and are reported by
/// [`ShippingDetails::first_missing`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShippingDetails {
    pub customer_name: String,
    pub phone: String,
    pub whatsapp: Option<String>,
    pub address: String,
    pub city: String,
    pub pincode: String,
}

impl ShippingDetails {
    /// Name of the first required field that is blank, if any.
    #[must_use]
    pub fn first_missing(&self) -> Option<&'static str> {
        [
            ("customerName", &self.customer_name),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("pincode", &self.pincode),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }
}

/// Validated order ready to be placed.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Option<UserId>,
    pub shipping: ShippingDetails,
    pub payment_mode: PaymentMode,
    pub lines: Vec<OrderLine>,
}

impl NewOrder {
    /// Merge duplicate product lines and sort by product ID.
    ///
    /// Locking rows in a fixed order keeps concurrent checkouts from
    /// deadlocking each other.
    #[must_use]
    pub fn merged_lines(&self) -> Vec<OrderLine> {
        let mut merged: Vec<OrderLine> = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            if let Some(existing) = merged.iter_mut().find(|l| l.product_id == line.product_id) {
                existing.qty = existing.qty.saturating_add(line.qty);
            } else {
                merged.push(*line);
            }
        }
        merged.sort_by_key(|l| l.product_id);
        merged
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn shipping() -> ShippingDetails {
        ShippingDetails {
            customer_name: "Asha".to_string(),
            phone: "9876543210".to_string(),
            whatsapp: None,
            address: "12 Fern Lane".to_string(),
            city: "Pune".to_string(),
            pincode: "411001".to_string(),
        }
    }

    fn line(id: i32, qty: u32) -> OrderLine {
        OrderLine {
            product_id: ProductId::new(id),
            qty,
        }
    }

    #[test]
    fn test_merged_lines_combines_duplicates_in_id_order() {
        let order = NewOrder {
            user_id: None,
            shipping: shipping(),
            payment_mode: PaymentMode::Cod,
            lines: vec![line(5, 1), line(2, 3), line(5, 2)],
        };

        assert_eq!(order.merged_lines(), vec![line(2, 3), line(5, 3)]);
    }

    #[test]
    fn test_first_missing_reports_blank_field() {
        let mut details = shipping();
        assert_eq!(details.first_missing(), None);

        details.city = "   ".to_string();
        assert_eq!(details.first_missing(), Some("city"));
    }

    #[test]
    fn test_order_line_wire_format() {
        let line: OrderLine = serde_json::from_str(r#"{"productId": 4, "qty": 2}"#).unwrap();
        assert_eq!(line.product_id, ProductId::new(4));
        assert_eq!(line.qty, 2);
    }
}
