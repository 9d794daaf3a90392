//! Milk sale tests
//!
//! Tests for the sale-side ledger and billing rules:
//! - Selling debits stock and never overdraws it
//! - Total price defaults to quantity times unit price but an explicit
//!   value is kept as given
//! - Edits move stock and customer aggregates by exact deltas
//! - Deletion restores stock, and only inside the delete window

use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::models::PaymentStatus;

const DELETE_WINDOW_HOURS: i64 = 12;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn within_delete_window(created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - created_at <= Duration::hours(DELETE_WINDOW_HOURS)
}

fn effective_total_price(
    quantity: Decimal,
    price_per_liter: Decimal,
    explicit: Option<Decimal>,
) -> Decimal {
    explicit.unwrap_or(quantity * price_per_liter)
}

/// In-memory model of one tenant's stock, one sale row, and the
/// customer's running aggregates
#[derive(Debug, Clone, PartialEq)]
struct SaleBook {
    stock: Decimal,
    sale_quantity: Decimal,
    sale_total_price: Decimal,
    customer_milk_taken: Decimal,
    customer_amount_billed: Decimal,
}

impl SaleBook {
    /// Records the initial sale; fails when stock is insufficient
    fn record(stock: Decimal, quantity: Decimal, total_price: Decimal) -> Option<Self> {
        if stock < quantity {
            return None;
        }
        Some(Self {
            stock: stock - quantity,
            sale_quantity: quantity,
            sale_total_price: total_price,
            customer_milk_taken: quantity,
            customer_amount_billed: total_price,
        })
    }

    /// Applies an edit; a quantity increase must pass the sufficiency
    /// check against the remaining stock
    fn update(&mut self, new_quantity: Decimal, new_total_price: Decimal) -> bool {
        let quantity_diff = new_quantity - self.sale_quantity;
        let price_diff = new_total_price - self.sale_total_price;

        if quantity_diff > Decimal::ZERO && self.stock < quantity_diff {
            return false;
        }

        self.stock -= quantity_diff;
        self.sale_quantity = new_quantity;
        self.sale_total_price = new_total_price;
        self.customer_milk_taken += quantity_diff;
        self.customer_amount_billed += price_diff;
        true
    }

    /// Deletes the sale, restoring stock and unwinding the aggregates
    fn delete(&mut self) {
        self.stock += self.sale_quantity;
        self.customer_milk_taken -= self.sale_quantity;
        self.customer_amount_billed -= self.sale_total_price;
        self.sale_quantity = Decimal::ZERO;
        self.sale_total_price = Decimal::ZERO;
    }
}

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Quantities between 0.01 and 200.00 liters
fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    (1..=20_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Unit prices between 0.01 and 99.99 per liter
fn price_strategy() -> impl Strategy<Value = Decimal> {
    (1..=9_999i64).prop_map(|n| Decimal::new(n, 2))
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_total_price_defaults_to_quantity_times_price() {
        assert_eq!(
            effective_total_price(dec("10.0"), dec("2.50"), None),
            dec("25.000")
        );
    }

    #[test]
    fn test_explicit_total_price_kept_as_given() {
        // Discounts and rounding are the caller's business
        assert_eq!(
            effective_total_price(dec("10.0"), dec("2.50"), Some(dec("20.00"))),
            dec("20.00")
        );
    }

    #[test]
    fn test_sale_rejected_when_stock_insufficient() {
        assert!(SaleBook::record(dec("5.0"), dec("5.01"), dec("10.0")).is_none());
    }

    #[test]
    fn test_sale_of_entire_stock_allowed() {
        let book = SaleBook::record(dec("5.0"), dec("5.0"), dec("10.0")).unwrap();
        assert_eq!(book.stock, Decimal::ZERO);
    }

    #[test]
    fn test_delete_window_boundaries() {
        let created_at = Utc::now();

        assert!(within_delete_window(
            created_at,
            created_at + Duration::hours(11)
        ));
        // The boundary itself is still deletable
        assert!(within_delete_window(
            created_at,
            created_at + Duration::hours(12)
        ));
        assert!(!within_delete_window(
            created_at,
            created_at + Duration::hours(12) + Duration::seconds(1)
        ));
        assert!(!within_delete_window(
            created_at,
            created_at + Duration::hours(13)
        ));
    }

    #[test]
    fn test_quantity_increase_beyond_stock_rejected() {
        let mut book = SaleBook::record(dec("10.0"), dec("8.0"), dec("16.0")).unwrap();
        // 2.0 left in stock; growing the sale by 2.01 must fail
        assert!(!book.update(dec("10.01"), dec("20.02")));
        assert_eq!(book.sale_quantity, dec("8.0"));
        assert_eq!(book.stock, dec("2.0"));
    }

    #[test]
    fn test_quantity_decrease_returns_stock() {
        let mut book = SaleBook::record(dec("10.0"), dec("8.0"), dec("16.0")).unwrap();
        assert!(book.update(dec("3.0"), dec("6.0")));
        assert_eq!(book.stock, dec("7.0"));
        assert_eq!(book.customer_milk_taken, dec("3.0"));
        assert_eq!(book.customer_amount_billed, dec("6.0"));
    }

    #[test]
    fn test_delete_restores_stock_and_aggregates() {
        let mut book = SaleBook::record(dec("10.0"), dec("8.0"), dec("16.0")).unwrap();
        book.delete();
        assert_eq!(book.stock, dec("10.0"));
        assert_eq!(book.customer_milk_taken, Decimal::ZERO);
        assert_eq!(book.customer_amount_billed, Decimal::ZERO);
    }

    #[test]
    fn test_rejected_update_leaves_every_figure_in_place() {
        let mut book = SaleBook::record(dec("10.0"), dec("8.0"), dec("16.0")).unwrap();

        let before = book.clone();
        assert!(!book.update(dec("10.01"), dec("20.02")));

        // A failed edit moves nothing: not the stock, not the sale
        // row, not the customer aggregates
        assert_eq!(book, before);
    }

    #[test]
    fn test_payment_status_parsing() {
        assert_eq!("paid".parse::<PaymentStatus>().ok(), Some(PaymentStatus::Paid));
        assert_eq!(
            "unpaid".parse::<PaymentStatus>().ok(),
            Some(PaymentStatus::Unpaid)
        );
        assert!("pending".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn test_payment_status_defaults_to_unpaid() {
        assert_eq!(PaymentStatus::default(), PaymentStatus::Unpaid);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        /// Stock plus the sold quantity is invariant across record,
        /// any number of accepted edits, and delete
        #[test]
        fn test_stock_plus_sale_is_conserved(
            initial_stock in quantity_strategy(),
            quantity in quantity_strategy(),
            edits in prop::collection::vec((quantity_strategy(), price_strategy()), 0..10),
        ) {
            let total_price = quantity * dec("2.0");
            let Some(mut book) = SaleBook::record(initial_stock, quantity, total_price) else {
                prop_assert!(initial_stock < quantity);
                return Ok(());
            };

            for (new_quantity, new_price) in edits {
                book.update(new_quantity, new_quantity * new_price);
                prop_assert_eq!(book.stock + book.sale_quantity, initial_stock);
                prop_assert!(book.stock >= Decimal::ZERO);
            }

            book.delete();
            prop_assert_eq!(book.stock, initial_stock);
        }

        /// Customer aggregates always mirror the surviving sale row
        #[test]
        fn test_customer_aggregates_mirror_sale(
            initial_stock in quantity_strategy(),
            quantity in quantity_strategy(),
            edits in prop::collection::vec((quantity_strategy(), price_strategy()), 0..10),
        ) {
            let total_price = quantity * dec("2.0");
            let Some(mut book) = SaleBook::record(initial_stock, quantity, total_price) else {
                return Ok(());
            };

            for (new_quantity, new_price) in edits {
                book.update(new_quantity, new_quantity * new_price);
                prop_assert_eq!(book.customer_milk_taken, book.sale_quantity);
                prop_assert_eq!(book.customer_amount_billed, book.sale_total_price);
            }
        }

        /// Any rejected edit leaves the book exactly as it was
        #[test]
        fn test_rejected_updates_change_nothing(
            initial_stock in quantity_strategy(),
            quantity in quantity_strategy(),
            attempts in prop::collection::vec((quantity_strategy(), price_strategy()), 1..10),
        ) {
            let total_price = quantity * dec("2.0");
            let Some(mut book) = SaleBook::record(initial_stock, quantity, total_price) else {
                return Ok(());
            };

            for (new_quantity, new_price) in attempts {
                let before = book.clone();
                if !book.update(new_quantity, new_quantity * new_price) {
                    prop_assert_eq!(&book, &before);
                }
            }
        }

        /// The derived total price scales linearly with quantity
        #[test]
        fn test_derived_total_price(
            quantity in quantity_strategy(),
            price in price_strategy(),
        ) {
            prop_assert_eq!(
                effective_total_price(quantity, price, None),
                quantity * price
            );
        }
    }
}
