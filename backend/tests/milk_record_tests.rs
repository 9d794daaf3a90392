//! Milk production record tests
//!
//! Tests for the production-side ledger rules:
//! - Total yield is the sum of morning and evening sessions
//! - One record per animal per calendar day per tenant
//! - Edits move the ledger by exactly the yield delta, so the ledger
//!   stays equal to the sum of recorded totals

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

use shared::validation::validate_yield;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn total_yield(morning: Option<Decimal>, evening: Option<Decimal>) -> Decimal {
    morning.unwrap_or(Decimal::ZERO) + evening.unwrap_or(Decimal::ZERO)
}

/// In-memory model of a tenant's production records plus the ledger
/// adjustments each operation performs
#[derive(Debug, Default, Clone, PartialEq)]
struct ProductionBook {
    records: HashMap<(Uuid, NaiveDate), Decimal>,
    ledger: Decimal,
}

impl ProductionBook {
    /// Returns false on a duplicate (animal, date) pair
    fn add(&mut self, animal: Uuid, date: NaiveDate, total: Decimal) -> bool {
        if self.records.contains_key(&(animal, date)) {
            return false;
        }
        self.records.insert((animal, date), total);
        self.ledger += total;
        true
    }

    /// Applies the signed delta between the new and stored totals
    fn edit(&mut self, animal: Uuid, date: NaiveDate, new_total: Decimal) -> bool {
        match self.records.get_mut(&(animal, date)) {
            Some(stored) => {
                self.ledger += new_total - *stored;
                *stored = new_total;
                true
            }
            None => false,
        }
    }

    fn delete(&mut self, animal: Uuid, date: NaiveDate) -> bool {
        match self.records.remove(&(animal, date)) {
            Some(total) => {
                self.ledger -= total;
                true
            }
            None => false,
        }
    }

    fn recorded_sum(&self) -> Decimal {
        self.records.values().copied().sum()
    }
}

/// Every record and ledger lives under the tenant that wrote it;
/// lookups carry the caller's tenant the way `admin_id` scopes queries
#[derive(Debug, Default)]
struct FarmRecords {
    books: HashMap<Uuid, ProductionBook>,
}

impl FarmRecords {
    fn add(&mut self, tenant: Uuid, animal: Uuid, date: NaiveDate, total: Decimal) -> bool {
        self.books
            .entry(tenant)
            .or_default()
            .add(animal, date, total)
    }

    /// A record is only visible through its own tenant
    fn get(&self, tenant: Uuid, animal: Uuid, date: NaiveDate) -> Option<Decimal> {
        self.books
            .get(&tenant)
            .and_then(|book| book.records.get(&(animal, date)).copied())
    }

    fn delete(&mut self, tenant: Uuid, animal: Uuid, date: NaiveDate) -> bool {
        self.books
            .get_mut(&tenant)
            .is_some_and(|book| book.delete(animal, date))
    }

    fn ledger(&self, tenant: Uuid) -> Decimal {
        self.books
            .get(&tenant)
            .map(|book| book.ledger)
            .unwrap_or(Decimal::ZERO)
    }
}

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Session yields between 0.00 and 99.99 liters
fn yield_strategy() -> impl Strategy<Value = Decimal> {
    (0..=9_999i64).prop_map(|n| Decimal::new(n, 2))
}

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0..=364u64).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .checked_add_days(chrono::Days::new(offset))
            .unwrap()
    })
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_total_yield_sums_sessions() {
        assert_eq!(total_yield(Some(dec("6.5")), Some(dec("4.5"))), dec("11.0"));
    }

    #[test]
    fn test_total_yield_missing_sessions_count_as_zero() {
        assert_eq!(total_yield(None, Some(dec("3.0"))), dec("3.0"));
        assert_eq!(total_yield(Some(dec("2.0")), None), dec("2.0"));
        assert_eq!(total_yield(None, None), Decimal::ZERO);
    }

    #[test]
    fn test_zero_yield_is_valid_but_negative_is_not() {
        assert!(validate_yield(Decimal::ZERO).is_ok());
        assert!(validate_yield(dec("7.25")).is_ok());
        assert!(validate_yield(dec("-0.01")).is_err());
    }

    #[test]
    fn test_duplicate_animal_day_rejected() {
        let mut book = ProductionBook::default();
        let animal = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();

        assert!(book.add(animal, date, dec("10.0")));
        assert!(!book.add(animal, date, dec("5.0")));
        assert_eq!(book.ledger, dec("10.0"));
    }

    #[test]
    fn test_same_day_different_animals_allowed() {
        let mut book = ProductionBook::default();
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();

        assert!(book.add(Uuid::new_v4(), date, dec("10.0")));
        assert!(book.add(Uuid::new_v4(), date, dec("8.0")));
        assert_eq!(book.ledger, dec("18.0"));
    }

    #[test]
    fn test_edit_applies_signed_delta() {
        let mut book = ProductionBook::default();
        let animal = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();

        book.add(animal, date, dec("10.0"));
        book.edit(animal, date, dec("12.5"));
        assert_eq!(book.ledger, dec("12.5"));

        book.edit(animal, date, dec("4.0"));
        assert_eq!(book.ledger, dec("4.0"));
    }

    #[test]
    fn test_delete_rolls_yield_back_out() {
        let mut book = ProductionBook::default();
        let animal = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();

        book.add(animal, date, dec("10.0"));
        assert!(book.delete(animal, date));
        assert_eq!(book.ledger, Decimal::ZERO);
        assert!(!book.delete(animal, date));
    }

    #[test]
    fn test_rejected_duplicate_leaves_book_untouched() {
        let mut book = ProductionBook::default();
        let animal = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        book.add(animal, date, dec("10.0"));

        let before = book.clone();
        assert!(!book.add(animal, date, dec("5.0")));

        // Rejection means neither the record set nor the ledger moved
        assert_eq!(book, before);
    }

    #[test]
    fn test_rejected_edit_and_delete_leave_book_untouched() {
        let mut book = ProductionBook::default();
        let animal = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        book.add(animal, date, dec("10.0"));

        let before = book.clone();
        let stranger = Uuid::new_v4();
        assert!(!book.edit(stranger, date, dec("3.0")));
        assert!(!book.delete(stranger, date));
        assert_eq!(book, before);
    }

    #[test]
    fn test_record_invisible_to_other_tenant() {
        let farm_a = Uuid::new_v4();
        let farm_b = Uuid::new_v4();
        let animal = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();

        let mut farms = FarmRecords::default();
        assert!(farms.add(farm_a, animal, date, dec("10.0")));

        assert_eq!(farms.get(farm_a, animal, date), Some(dec("10.0")));
        assert_eq!(farms.get(farm_b, animal, date), None);
    }

    #[test]
    fn test_cross_tenant_delete_misses_and_changes_nothing() {
        let farm_a = Uuid::new_v4();
        let farm_b = Uuid::new_v4();
        let animal = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();

        let mut farms = FarmRecords::default();
        farms.add(farm_a, animal, date, dec("10.0"));

        assert!(!farms.delete(farm_b, animal, date));
        assert_eq!(farms.get(farm_a, animal, date), Some(dec("10.0")));
        assert_eq!(farms.ledger(farm_a), dec("10.0"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        /// Total yield never depends on which session is missing
        #[test]
        fn test_total_yield_commutative(
            morning in yield_strategy(),
            evening in yield_strategy(),
        ) {
            prop_assert_eq!(
                total_yield(Some(morning), Some(evening)),
                total_yield(Some(evening), Some(morning))
            );
        }

        /// After any mix of adds, edits and deletes, the ledger equals
        /// the sum of surviving record totals
        #[test]
        fn test_ledger_equals_sum_of_records(
            ops in prop::collection::vec(
                (0..6usize, date_strategy(), yield_strategy(), any::<bool>()),
                0..60
            )
        ) {
            // A small fixed herd so edits and deletes actually hit
            // existing records
            let herd: Vec<Uuid> = (0..6).map(|_| Uuid::new_v4()).collect();
            let mut book = ProductionBook::default();

            for (animal_idx, date, total, delete) in ops {
                let animal = herd[animal_idx];
                if delete {
                    book.delete(animal, date);
                } else if !book.add(animal, date, total) {
                    book.edit(animal, date, total);
                }
            }

            prop_assert_eq!(book.ledger, book.recorded_sum());
        }

        /// Isolation: a tenant's ledger only reflects its own records,
        /// however the two farms' writes interleave
        #[test]
        fn test_tenant_ledgers_track_only_own_records(
            ops in prop::collection::vec(
                (any::<bool>(), 0..4usize, date_strategy(), yield_strategy()),
                0..60
            )
        ) {
            let farm_a = Uuid::new_v4();
            let farm_b = Uuid::new_v4();
            // Both farms happen to tag the same animal ids, as two
            // databases might after an import
            let herd: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();

            let mut farms = FarmRecords::default();
            for (use_a, animal_idx, date, total) in ops {
                let tenant = if use_a { farm_a } else { farm_b };
                farms.add(tenant, herd[animal_idx], date, total);
            }

            for tenant in [farm_a, farm_b] {
                let own_sum = farms
                    .books
                    .get(&tenant)
                    .map(|book| book.recorded_sum())
                    .unwrap_or(Decimal::ZERO);
                prop_assert_eq!(farms.ledger(tenant), own_sum);
            }
        }

        /// An edit moves the ledger by exactly new minus old
        #[test]
        fn test_edit_delta_is_exact(
            old_total in yield_strategy(),
            new_total in yield_strategy(),
        ) {
            let mut book = ProductionBook::default();
            let animal = Uuid::new_v4();
            let date = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();

            book.add(animal, date, old_total);
            let before = book.ledger;
            book.edit(animal, date, new_total);

            prop_assert_eq!(book.ledger - before, new_total - old_total);
        }
    }
}
