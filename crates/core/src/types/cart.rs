//! The cart reducer: line items plus derived aggregates.
//!
//! All operations are synchronous, total, and pure of I/O. The two
//! aggregates (`total_quantity`, `total_amount`) are recomputed from the
//! full item set after every mutation rather than adjusted incrementally,
//! so they can never drift from the items they summarize.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::{CurrencyCode, Price};
use super::product::Product;

/// One cart line.
///
/// `line_total` is always `unit_price × quantity`; it is carried for display
/// but recomputed whenever the quantity or price changes, and again when a
/// cart is rebuilt from stored items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product this line refers to. Unique within a cart.
    pub product_id: ProductId,
    /// Display name, snapshotted at add time.
    pub name: String,
    /// Unit price, snapshotted at add time (refreshed from remote on merge).
    pub unit_price: Price,
    /// Units of this product in the cart. Always >= 1; a line that would
    /// reach zero is removed instead.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// `unit_price × quantity`.
    #[serde(default = "zero_price")]
    pub line_total: Price,
    /// Primary image, for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

const fn default_quantity() -> u32 {
    1
}

const fn zero_price() -> Price {
    Price::zero(CurrencyCode::USD)
}

impl CartItem {
    /// Create a single-unit line from a product snapshot.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity: 1,
            line_total: product.price,
            image_url: product.image_url.clone(),
        }
    }

    fn recompute_line_total(&mut self) {
        self.line_total = self.unit_price.times(self.quantity);
    }
}

/// The local shopping cart.
///
/// Items are keyed by product id (no duplicates). Insertion order is kept
/// only for stable display; it carries no meaning.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
    total_quantity: u32,
    total_amount: Price,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            total_quantity: 0,
            total_amount: Price::zero(CurrencyCode::default()),
        }
    }

    /// Rebuild a cart from stored line items.
    ///
    /// Line totals and aggregates are recomputed from scratch, and duplicate
    /// product ids are folded together by summing quantities, so a malformed
    /// stored document can never install an inconsistent cart.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Self::new();
        for mut item in items {
            item.quantity = item.quantity.max(1);
            if let Some(existing) = cart.find_mut(&item.product_id) {
                // Saturate: a corrupt stored document must not panic the fold.
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            } else {
                cart.items.push(item);
            }
        }
        cart.recompute();
        cart
    }

    /// The line items.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Consume the cart, returning its line items.
    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    /// Look up a line by product id.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.product_id == product_id)
    }

    /// Sum of all line quantities.
    #[must_use]
    pub const fn total_quantity(&self) -> u32 {
        self.total_quantity
    }

    /// Sum of all line totals.
    #[must_use]
    pub const fn total_amount(&self) -> Price {
        self.total_amount
    }

    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add one unit of a product: a new single-unit line if the product is
    /// not in the cart, otherwise an increment of the existing line.
    pub fn add_item(&mut self, product: &Product) {
        if let Some(existing) = self.find_mut(&product.id) {
            existing.quantity += 1;
        } else {
            self.items.push(CartItem::from_product(product));
        }
        self.recompute();
    }

    /// Remove one unit of a product; the line disappears when its quantity
    /// would reach zero. Returns `false` (no-op) if the product is absent.
    pub fn remove_one(&mut self, product_id: &ProductId) -> bool {
        let Some(existing) = self.find_mut(product_id) else {
            return false;
        };
        if existing.quantity <= 1 {
            self.items.retain(|item| &item.product_id != product_id);
        } else {
            existing.quantity -= 1;
        }
        self.recompute();
        true
    }

    /// Set a line's quantity outright. Zero is unrepresentable here; callers
    /// validate raw input at the boundary instead of this layer clamping.
    /// Returns `false` (no-op) if the product is absent.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: NonZeroU32) -> bool {
        let Some(existing) = self.find_mut(product_id) else {
            return false;
        };
        existing.quantity = quantity.get();
        self.recompute();
        true
    }

    /// Reset to the empty cart. Idempotent.
    pub fn clear(&mut self) {
        self.items.clear();
        self.recompute();
    }

    /// Reconcile this (guest) cart with a remote cart at login.
    ///
    /// Union by product id: ids on one side only are kept as-is; ids on both
    /// sides keep the remote snapshot (the remote unit price is assumed
    /// fresher) with the quantities summed. Both sides represent genuine user
    /// intent, so neither is discarded.
    ///
    /// If the carts have not diverged at all (same ids, quantities, and unit
    /// prices), the remote cart is returned unchanged: there is nothing to
    /// reconcile, and summing would duplicate every line from the user's
    /// point of view. Any divergence, including a price-only one, goes
    /// through the union so both sides' quantities are honored.
    #[must_use]
    pub fn merged_with(&self, remote: &Self) -> Self {
        if self.same_contents(remote) {
            return remote.clone();
        }

        let mut merged: Vec<CartItem> = Vec::with_capacity(remote.items.len() + self.items.len());
        for remote_item in &remote.items {
            let mut item = remote_item.clone();
            if let Some(local_item) = self.get(&item.product_id) {
                item.quantity = item.quantity.saturating_add(local_item.quantity);
            }
            merged.push(item);
        }
        for local_item in &self.items {
            if remote.get(&local_item.product_id).is_none() {
                merged.push(local_item.clone());
            }
        }
        Self::from_items(merged)
    }

    /// Whether both carts hold the same product ids at the same quantities
    /// and unit prices. A quantity-only match is not enough: a stale cached
    /// price still counts as divergence.
    fn same_contents(&self, other: &Self) -> bool {
        self.items.len() == other.items.len()
            && self.items.iter().all(|item| {
                other.get(&item.product_id).is_some_and(|o| {
                    o.quantity == item.quantity && o.unit_price == item.unit_price
                })
            })
    }

    fn find_mut(&mut self, product_id: &ProductId) -> Option<&mut CartItem> {
        self.items
            .iter_mut()
            .find(|item| &item.product_id == product_id)
    }

    /// Recompute line totals and both aggregates from the full item set.
    fn recompute(&mut self) {
        for item in &mut self.items {
            item.recompute_line_total();
        }
        self.total_quantity = self
            .items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity));
        let currency = self
            .items
            .first()
            .map_or_else(CurrencyCode::default, |item| item.unit_price.currency_code);
        self.total_amount = self
            .items
            .iter()
            .fold(Price::zero(currency), |acc, item| acc.plus(&item.line_total));
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn usd(cents: i64) -> Price {
        Price::new(Decimal::new(cents, 2), CurrencyCode::USD)
    }

    fn product(id: &str, cents: i64) -> Product {
        Product::new(id, format!("Product {id}"), usd(cents))
    }

    fn assert_aggregates_consistent(cart: &Cart) {
        let quantity: u32 = cart.items().iter().map(|i| i.quantity).sum();
        assert_eq!(cart.total_quantity(), quantity);

        let mut amount = Price::zero(CurrencyCode::USD);
        for item in cart.items() {
            assert_eq!(item.line_total, item.unit_price.times(item.quantity));
            amount = amount.plus(&item.line_total);
        }
        assert_eq!(cart.total_amount().amount, amount.amount);
    }

    #[test]
    fn test_add_item_new_and_increment() {
        let mut cart = Cart::new();
        let dog_food = product("dog-food", 1999);

        cart.add_item(&dog_food);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.get(&dog_food.id).map(|i| i.quantity), Some(1));

        cart.add_item(&dog_food);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.get(&dog_food.id).map(|i| i.quantity), Some(2));
        assert_eq!(cart.total_amount(), usd(3998));
        assert_aggregates_consistent(&cart);
    }

    #[test]
    fn test_remove_one_decrements_then_deletes() {
        let mut cart = Cart::new();
        let toy = product("toy", 500);
        cart.add_item(&toy);
        cart.add_item(&toy);

        assert!(cart.remove_one(&toy.id));
        assert_eq!(cart.get(&toy.id).map(|i| i.quantity), Some(1));

        assert!(cart.remove_one(&toy.id));
        assert!(cart.is_empty());
        assert_eq!(cart.total_quantity(), 0);
        assert_aggregates_consistent(&cart);
    }

    #[test]
    fn test_remove_one_absent_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(&product("a", 100));
        let before = cart.clone();

        assert!(!cart.remove_one(&ProductId::new("missing")));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_set_quantity() {
        let mut cart = Cart::new();
        let litter = product("litter", 1250);
        cart.add_item(&litter);

        let five = NonZeroU32::new(5).expect("nonzero");
        assert!(cart.set_quantity(&litter.id, five));
        assert_eq!(cart.total_quantity(), 5);
        assert_eq!(cart.total_amount(), usd(6250));
        assert_aggregates_consistent(&cart);

        assert!(!cart.set_quantity(&ProductId::new("missing"), five));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut cart = Cart::new();
        cart.add_item(&product("a", 100));
        cart.clear();
        assert!(cart.is_empty());
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_amount(), Price::zero(CurrencyCode::USD));
    }

    #[test]
    fn test_aggregates_hold_over_operation_sequence() {
        let a = product("a", 199);
        let b = product("b", 4999);
        let c = product("c", 25);
        let mut cart = Cart::new();

        cart.add_item(&a);
        assert_aggregates_consistent(&cart);
        cart.add_item(&b);
        assert_aggregates_consistent(&cart);
        cart.add_item(&a);
        assert_aggregates_consistent(&cart);
        cart.set_quantity(&b.id, NonZeroU32::new(7).expect("nonzero"));
        assert_aggregates_consistent(&cart);
        cart.add_item(&c);
        assert_aggregates_consistent(&cart);
        cart.remove_one(&a.id);
        assert_aggregates_consistent(&cart);
        cart.remove_one(&c.id);
        assert_aggregates_consistent(&cart);
        cart.set_quantity(&a.id, NonZeroU32::new(3).expect("nonzero"));
        assert_aggregates_consistent(&cart);

        assert_eq!(cart.total_quantity(), 10);
    }

    #[test]
    fn test_default_is_the_empty_cart() {
        assert_eq!(Cart::default(), Cart::new());
        assert!(Cart::default().is_empty());
        assert_eq!(Cart::default().total_amount(), Price::zero(CurrencyCode::USD));
    }

    #[test]
    fn test_from_items_recomputes_and_dedupes() {
        let mut bad_line = CartItem::from_product(&product("a", 100));
        bad_line.quantity = 3;
        bad_line.line_total = usd(1); // stale stored aggregate
        let duplicate = CartItem::from_product(&product("a", 100));

        let cart = Cart::from_items(vec![bad_line, duplicate]);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.total_quantity(), 4);
        assert_eq!(cart.total_amount(), usd(400));
        assert_aggregates_consistent(&cart);
    }

    #[test]
    fn test_merge_sums_overlapping_quantities() {
        // guest {A: 2} ∪ remote {A: 1, B: 1} = {A: 3, B: 1}
        let a = product("A", 1000);
        let b = product("B", 2000);

        let mut guest = Cart::new();
        guest.add_item(&a);
        guest.add_item(&a);

        let mut remote = Cart::new();
        remote.add_item(&a);
        remote.add_item(&b);

        let merged = guest.merged_with(&remote);
        assert_eq!(merged.get(&a.id).map(|i| i.quantity), Some(3));
        assert_eq!(merged.get(&b.id).map(|i| i.quantity), Some(1));
        assert_eq!(merged.total_quantity(), 4);
        assert_aggregates_consistent(&merged);
    }

    #[test]
    fn test_merge_with_identical_cart_is_idempotent() {
        let mut cart = Cart::new();
        cart.add_item(&product("a", 150));
        cart.add_item(&product("b", 75));
        cart.add_item(&product("a", 150));

        let merged = cart.merged_with(&cart.clone());
        assert_eq!(merged, cart);
    }

    #[test]
    fn test_merge_remote_price_wins() {
        let mut guest = Cart::new();
        guest.add_item(&product("a", 100)); // stale cached price

        let mut remote = Cart::new();
        remote.add_item(&product("a", 120));

        let merged = guest.merged_with(&remote);
        let line = merged.get(&ProductId::new("a")).expect("line present");
        assert_eq!(line.unit_price, usd(120));
        assert_eq!(line.quantity, 2);
        assert_eq!(line.line_total, usd(240));
    }

    #[test]
    fn test_merge_same_quantities_different_price_still_sums() {
        // Equal quantities alone are not "identical carts": the price
        // diverged, so this must go through the union, not the shortcut.
        let mut guest = Cart::new();
        guest.add_item(&product("a", 100));

        let mut remote = Cart::new();
        remote.add_item(&product("a", 120));

        let merged = guest.merged_with(&remote);
        let line = merged.get(&ProductId::new("a")).expect("line present");
        assert_eq!(line.quantity, 2);
        assert_eq!(line.unit_price, usd(120));
        assert_aggregates_consistent(&merged);
    }

    #[test]
    fn test_merge_saturates_instead_of_overflowing() {
        let a = product("a", 100);

        let mut guest = Cart::new();
        guest.add_item(&a);
        guest.set_quantity(&a.id, NonZeroU32::new(u32::MAX).expect("nonzero"));

        let mut remote = Cart::new();
        remote.add_item(&a);
        remote.add_item(&a);

        let merged = guest.merged_with(&remote);
        assert_eq!(merged.get(&a.id).map(|i| i.quantity), Some(u32::MAX));
    }

    #[test]
    fn test_from_items_saturates_duplicate_fold() {
        let mut huge = CartItem::from_product(&product("a", 100));
        huge.quantity = u32::MAX;
        let more = CartItem::from_product(&product("a", 100));

        let cart = Cart::from_items(vec![huge, more]);
        assert_eq!(cart.get(&ProductId::new("a")).map(|i| i.quantity), Some(u32::MAX));
        assert_eq!(cart.total_quantity(), u32::MAX);
    }

    #[test]
    fn test_merge_with_empty_sides() {
        let mut guest = Cart::new();
        guest.add_item(&product("a", 100));

        assert_eq!(guest.merged_with(&Cart::new()), guest);
        assert_eq!(Cart::new().merged_with(&guest), guest);
    }
}
