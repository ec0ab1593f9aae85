//! Shopping cart state.
//!
//! The cart is a flat list of lines keyed by product ID. Adding a product that
//! is already present bumps its quantity; removing decrements until the line
//! disappears. Only the lines are persisted - whether the cart drawer is open
//! is presentation state and is skipped during serialization.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// Product data needed to put something in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCartItem {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: Option<String>,
}

/// A line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub quantity: u32,
}

impl CartItem {
    /// Price of this line (unit price x quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Shopping cart keyed by product ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
    #[serde(skip)]
    is_open: bool,
}

impl Cart {
    /// Create an empty, closed cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            is_open: false,
        }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    /// Add one unit of a product and open the cart.
    ///
    /// A product already in the cart has its quantity incremented; the stored
    /// name, price and image are left as they were when first added.
    pub fn add_item(&mut self, item: NewCartItem) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
            existing.quantity = existing.quantity.saturating_add(1);
        } else {
            self.items.push(CartItem {
                id: item.id,
                name: item.name,
                price: item.price,
                image: item.image,
                quantity: 1,
            });
        }
        self.is_open = true;
    }

    /// Remove one unit of a product, or the whole line when `remove_all` is set.
    ///
    /// A line with a single unit is dropped. Unknown products are ignored.
    pub fn remove_item(&mut self, id: ProductId, remove_all: bool) {
        let Some(pos) = self.items.iter().position(|i| i.id == id) else {
            return;
        };

        let drop_line = remove_all || self.items.get(pos).is_some_and(|i| i.quantity <= 1);
        if drop_line {
            self.items.remove(pos);
        } else if let Some(line) = self.items.get_mut(pos) {
            line.quantity -= 1;
        }
    }

    /// Set the quantity of an existing line.
    ///
    /// Quantities below one are ignored (use [`Cart::remove_item`] to drop a
    /// line), as are products not in the cart.
    pub fn update_quantity(&mut self, id: ProductId, quantity: u32) {
        if quantity < 1 {
            return;
        }
        if let Some(line) = self.items.iter_mut().find(|i| i.id == id) {
            line.quantity = quantity;
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub const fn toggle(&mut self) {
        self.is_open = !self.is_open;
    }

    pub const fn open(&mut self) {
        self.is_open = true;
    }

    pub const fn close(&mut self) {
        self.is_open = false;
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, i| acc.saturating_add(i.quantity))
    }

    /// Sum of price x quantity across all lines.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn plant(id: i32, cents: i64) -> NewCartItem {
        NewCartItem {
            id: ProductId::new(id),
            name: format!("Plant {id}"),
            price: Price::new(Decimal::new(cents, 2)).unwrap(),
            image: None,
        }
    }

    #[test]
    fn test_add_new_item_starts_at_one_and_opens() {
        let mut cart = Cart::new();
        cart.add_item(plant(1, 4500));

        assert!(cart.is_open());
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, 1);
    }

    #[test]
    fn test_add_existing_item_increments() {
        let mut cart = Cart::new();
        cart.add_item(plant(1, 4500));
        cart.add_item(plant(1, 4500));
        cart.add_item(plant(2, 1800));

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, 2);
        assert_eq!(cart.total_items(), 3);
    }

    #[test]
    fn test_remove_decrements_then_drops_line() {
        let mut cart = Cart::new();
        cart.add_item(plant(1, 4500));
        cart.add_item(plant(1, 4500));

        cart.remove_item(ProductId::new(1), false);
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, 1);

        cart.remove_item(ProductId::new(1), false);
        assert!(cart.get(ProductId::new(1)).is_none());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_all_drops_line_regardless_of_quantity() {
        let mut cart = Cart::new();
        cart.add_item(plant(1, 4500));
        cart.update_quantity(ProductId::new(1), 9);

        cart.remove_item(ProductId::new(1), true);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_unknown_item_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(plant(1, 4500));
        let before = cart.clone();

        cart.remove_item(ProductId::new(99), true);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_update_quantity_ignores_zero_and_unknown() {
        let mut cart = Cart::new();
        cart.add_item(plant(1, 4500));

        cart.update_quantity(ProductId::new(1), 0);
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, 1);

        cart.update_quantity(ProductId::new(2), 5);
        assert!(cart.get(ProductId::new(2)).is_none());

        cart.update_quantity(ProductId::new(1), 4);
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, 4);
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::new();
        cart.add_item(plant(1, 4500));
        cart.add_item(plant(1, 4500));
        cart.add_item(plant(2, 1850));

        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price().to_string(), "108.50");
    }

    #[test]
    fn test_clear_keeps_open_state() {
        let mut cart = Cart::new();
        cart.add_item(plant(1, 4500));
        cart.clear();

        assert!(cart.is_empty());
        assert!(cart.is_open());
        assert_eq!(cart.total_price(), Price::ZERO);
    }

    #[test]
    fn test_toggle_open_close() {
        let mut cart = Cart::new();
        cart.toggle();
        assert!(cart.is_open());
        cart.close();
        assert!(!cart.is_open());
        cart.open();
        assert!(cart.is_open());
    }

    #[test]
    fn test_open_state_is_not_persisted() {
        let mut cart = Cart::new();
        cart.add_item(plant(3, 2500));

        let json = serde_json::to_value(&cart).unwrap();
        assert!(json.get("is_open").is_none());

        let restored: Cart = serde_json::from_value(json).unwrap();
        assert!(!restored.is_open());
        assert_eq!(restored.items(), cart.items());
    }
}
