//! Stock ledger tests
//!
//! Property-based and unit tests for the milk stock ledger rules:
//! - Conservation: balance equals total credited minus total debited
//! - Sufficiency: a debit larger than the balance is rejected
//! - Non-negativity: no accepted sequence of movements takes the
//!   balance below zero

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// In-memory model of a tenant's ledger row with the same acceptance
/// rules the database enforces under its row lock
#[derive(Debug, Default, Clone, PartialEq)]
struct Ledger {
    balance: Decimal,
}

#[derive(Debug, Clone, Copy)]
enum Movement {
    Credit(Decimal),
    Debit(Decimal),
}

impl Ledger {
    /// First write creates the row; a negative opening delta is clamped
    /// to zero
    fn open_with(delta: Decimal) -> Self {
        Self {
            balance: delta.max(Decimal::ZERO),
        }
    }

    fn credit(&mut self, amount: Decimal) {
        self.balance += amount;
    }

    /// Returns false (and leaves the balance untouched) when the debit
    /// would cross zero
    fn debit(&mut self, amount: Decimal) -> bool {
        if self.balance < amount {
            return false;
        }
        self.balance -= amount;
        true
    }

    fn apply(&mut self, movement: Movement) -> bool {
        match movement {
            Movement::Credit(amount) => {
                self.credit(amount);
                true
            }
            Movement::Debit(amount) => self.debit(amount),
        }
    }
}

/// One ledger row per tenant; every movement names the tenant it
/// belongs to, as the `admin_id` column does
#[derive(Debug, Default)]
struct TenantLedgers {
    rows: HashMap<Uuid, Ledger>,
}

impl TenantLedgers {
    fn apply(&mut self, tenant: Uuid, movement: Movement) -> bool {
        self.rows.entry(tenant).or_default().apply(movement)
    }

    /// Read-only: an absent tenant reads as zero and no row is created
    fn balance(&self, tenant: Uuid) -> Decimal {
        self.rows
            .get(&tenant)
            .map(|ledger| ledger.balance)
            .unwrap_or(Decimal::ZERO)
    }
}

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Amounts between 0.01 and 500.00 liters
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1..=50_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn movement_strategy() -> impl Strategy<Value = Movement> {
    prop_oneof![
        amount_strategy().prop_map(Movement::Credit),
        amount_strategy().prop_map(Movement::Debit),
    ]
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_new_ledger_starts_at_zero() {
        let ledger = Ledger::default();
        assert_eq!(ledger.balance, Decimal::ZERO);
    }

    #[test]
    fn test_opening_delta_is_clamped_to_zero() {
        let ledger = Ledger::open_with(dec("-5.0"));
        assert_eq!(ledger.balance, Decimal::ZERO);

        let ledger = Ledger::open_with(dec("12.5"));
        assert_eq!(ledger.balance, dec("12.5"));
    }

    #[test]
    fn test_credit_increases_balance() {
        let mut ledger = Ledger::default();
        ledger.credit(dec("10.5"));
        ledger.credit(dec("4.5"));
        assert_eq!(ledger.balance, dec("15.0"));
    }

    #[test]
    fn test_debit_decreases_balance() {
        let mut ledger = Ledger::open_with(dec("20.0"));
        assert!(ledger.debit(dec("7.5")));
        assert_eq!(ledger.balance, dec("12.5"));
    }

    #[test]
    fn test_insufficient_debit_rejected_and_balance_unchanged() {
        let mut ledger = Ledger::open_with(dec("5.0"));
        assert!(!ledger.debit(dec("5.01")));
        assert_eq!(ledger.balance, dec("5.0"));
    }

    #[test]
    fn test_debit_of_exact_balance_is_allowed() {
        let mut ledger = Ledger::open_with(dec("8.0"));
        assert!(ledger.debit(dec("8.0")));
        assert_eq!(ledger.balance, Decimal::ZERO);
    }

    #[test]
    fn test_debit_on_empty_ledger_rejected() {
        let mut ledger = Ledger::default();
        assert!(!ledger.debit(dec("0.01")));
        assert_eq!(ledger.balance, Decimal::ZERO);
    }

    #[test]
    fn test_credit_does_not_leak_across_tenants() {
        let farm_a = Uuid::new_v4();
        let farm_b = Uuid::new_v4();

        let mut ledgers = TenantLedgers::default();
        assert!(ledgers.apply(farm_a, Movement::Credit(dec("30.0"))));

        assert_eq!(ledgers.balance(farm_a), dec("30.0"));
        assert_eq!(ledgers.balance(farm_b), Decimal::ZERO);
    }

    #[test]
    fn test_debit_cannot_spend_another_tenants_stock() {
        let farm_a = Uuid::new_v4();
        let farm_b = Uuid::new_v4();

        let mut ledgers = TenantLedgers::default();
        ledgers.apply(farm_a, Movement::Credit(dec("100.0")));

        // Farm B holds nothing, no matter how much farm A has
        assert!(!ledgers.apply(farm_b, Movement::Debit(dec("1.0"))));
        assert_eq!(ledgers.balance(farm_a), dec("100.0"));
        assert_eq!(ledgers.balance(farm_b), Decimal::ZERO);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        /// Conservation: after any sequence of movements, the balance
        /// equals accepted credits minus accepted debits
        #[test]
        fn test_balance_conserves_accepted_movements(
            movements in prop::collection::vec(movement_strategy(), 0..50)
        ) {
            let mut ledger = Ledger::default();
            let mut credited = Decimal::ZERO;
            let mut debited = Decimal::ZERO;

            for movement in movements {
                if ledger.apply(movement) {
                    match movement {
                        Movement::Credit(amount) => credited += amount,
                        Movement::Debit(amount) => debited += amount,
                    }
                }
            }

            prop_assert_eq!(ledger.balance, credited - debited);
        }

        /// Non-negativity: the balance never dips below zero at any
        /// point in the sequence
        #[test]
        fn test_balance_never_negative(
            movements in prop::collection::vec(movement_strategy(), 0..50)
        ) {
            let mut ledger = Ledger::default();

            for movement in movements {
                ledger.apply(movement);
                prop_assert!(ledger.balance >= Decimal::ZERO);
            }
        }

        /// A debit exceeding the balance is always rejected, regardless
        /// of history
        #[test]
        fn test_overdraw_always_rejected(
            credits in prop::collection::vec(amount_strategy(), 0..20),
            excess in amount_strategy(),
        ) {
            let mut ledger = Ledger::default();
            for amount in &credits {
                ledger.credit(*amount);
            }

            let balance = ledger.balance;
            prop_assert!(!ledger.debit(balance + excess));
            prop_assert_eq!(ledger.balance, balance);
        }

        /// Isolation: interleaving another tenant's movements never
        /// changes a tenant's own balance
        #[test]
        fn test_tenant_balances_are_independent(
            own in prop::collection::vec(movement_strategy(), 0..30),
            other in prop::collection::vec(movement_strategy(), 0..30),
        ) {
            let farm_a = Uuid::new_v4();
            let farm_b = Uuid::new_v4();

            let mut alone = Ledger::default();
            for movement in &own {
                alone.apply(*movement);
            }

            let mut ledgers = TenantLedgers::default();
            let mut other_iter = other.iter();
            for movement in &own {
                ledgers.apply(farm_a, *movement);
                if let Some(noise) = other_iter.next() {
                    ledgers.apply(farm_b, *noise);
                }
            }
            for noise in other_iter {
                ledgers.apply(farm_b, *noise);
            }

            prop_assert_eq!(ledgers.balance(farm_a), alone.balance);
        }

        /// Credits commute: the order of a batch of credits does not
        /// change the final balance
        #[test]
        fn test_credit_order_irrelevant(
            mut amounts in prop::collection::vec(amount_strategy(), 1..20)
        ) {
            let mut forward = Ledger::default();
            for amount in &amounts {
                forward.credit(*amount);
            }

            amounts.reverse();
            let mut backward = Ledger::default();
            for amount in &amounts {
                backward.credit(*amount);
            }

            prop_assert_eq!(forward.balance, backward.balance);
        }
    }
}
