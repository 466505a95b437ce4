//! Pricing

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

use crate::cart::{CartEntry, TransactionType};

/// Calculates the total for a single entry.
///
/// Purchases cost `price × quantity`; rentals cost `price × quantity × days`.
/// A missing price contributes zero. Amounts beyond the range of [`Decimal`]
/// saturate at [`Decimal::MAX`].
pub fn line_total(entry: &CartEntry) -> Decimal {
    let price = entry.price().unwrap_or(Decimal::ZERO);
    let line = price.saturating_mul(Decimal::from(entry.quantity()));

    match entry.transaction_type() {
        TransactionType::Purchase => line,
        TransactionType::Rental => line.saturating_mul(Decimal::from(entry.days())),
    }
}

/// Subtotals of a cart by transaction type.
///
/// Values are exact; rounding to two decimals only happens on display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartTotals {
    /// Sum of purchase line totals
    pub purchase: Decimal,

    /// Sum of rental line totals
    pub rental: Decimal,
}

impl CartTotals {
    /// Sums line totals of the given entries.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a CartEntry>) -> Self {
        entries
            .into_iter()
            .fold(CartTotals::default(), |mut totals, entry| {
                let line = line_total(entry);

                match entry.transaction_type() {
                    TransactionType::Purchase => {
                        totals.purchase = totals.purchase.saturating_add(line);
                    }
                    TransactionType::Rental => totals.rental = totals.rental.saturating_add(line),
                }

                totals
            })
    }

    /// Purchase subtotal plus rental subtotal, saturating at [`Decimal::MAX`].
    pub fn total(&self) -> Decimal {
        self.purchase.saturating_add(self.rental)
    }

    /// Subtotal for one transaction type.
    pub fn subtotal(&self, transaction_type: TransactionType) -> Decimal {
        match transaction_type {
            TransactionType::Purchase => self.purchase,
            TransactionType::Rental => self.rental,
        }
    }

    /// Converts the subtotals and total to money in `currency`.
    pub fn to_money(&self, currency: &'static Currency) -> MoneyTotals<'static> {
        MoneyTotals {
            purchase: money(self.purchase, currency),
            rental: money(self.rental, currency),
            total: money(self.total(), currency),
        }
    }
}

/// [`CartTotals`] expressed as money, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct MoneyTotals<'a> {
    /// Purchase subtotal
    pub purchase: Money<'a, Currency>,

    /// Rental subtotal
    pub rental: Money<'a, Currency>,

    /// Grand total
    pub total: Money<'a, Currency>,
}

/// Wraps a decimal amount as money in `currency`.
pub fn money(amount: Decimal, currency: &'static Currency) -> Money<'static, Currency> {
    Money::from_decimal(amount, currency)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::EUR;

    use super::*;
    use crate::products::{Product, ProductId};

    fn product(id: &str, sale: Option<Decimal>, rental: Option<Decimal>) -> Product {
        Product {
            id: ProductId::new(id),
            name: id.to_string(),
            category: "fiesta".to_string(),
            kind: None,
            description: None,
            sizes: vec!["M".to_string()],
            sale_price: sale,
            rental_price: rental,
            image: String::new(),
        }
    }

    #[test]
    fn purchase_line_total_is_price_times_quantity() {
        let noir = product("product-1", Some(Decimal::new(8999, 2)), None);
        let mut entry = CartEntry::new(&noir, TransactionType::Purchase, "M", 1);
        entry.set_quantity(2);

        assert_eq!(line_total(&entry), Decimal::new(17998, 2));
    }

    #[test]
    fn rental_line_total_multiplies_days() {
        let cocktail = product("rental-2", None, Some(Decimal::new(108, 0)));
        let mut entry = CartEntry::new(&cocktail, TransactionType::Rental, "M", 3);
        entry.set_quantity(2);

        assert_eq!(line_total(&entry), Decimal::new(648, 0));
    }

    #[test]
    fn missing_price_contributes_zero() {
        let rental_only = product("rental-2", None, Some(Decimal::new(108, 0)));
        let entry = CartEntry::new(&rental_only, TransactionType::Purchase, "M", 1);

        assert_eq!(line_total(&entry), Decimal::ZERO);
    }

    #[test]
    fn totals_split_by_transaction_type() {
        let noir = product("product-1", Some(Decimal::new(8999, 2)), None);
        let cocktail = product("rental-2", None, Some(Decimal::new(10800, 2)));

        let mut purchase = CartEntry::new(&noir, TransactionType::Purchase, "M", 1);
        purchase.set_quantity(2);
        let rental = CartEntry::new(&cocktail, TransactionType::Rental, "S", 1);

        let totals = CartTotals::from_entries([&purchase, &rental]);

        assert_eq!(totals.purchase, Decimal::new(17998, 2));
        assert_eq!(totals.rental, Decimal::new(108, 0));
        assert_eq!(totals.total(), Decimal::new(28798, 2));
        assert_eq!(totals.subtotal(TransactionType::Rental), totals.rental);
    }

    #[test]
    fn oversized_totals_saturate() {
        let gown = product("rental-1", None, Some(Decimal::new(50_000_000_000, 0)));
        let mut entry = CartEntry::new(&gown, TransactionType::Rental, "M", 1);
        entry.set_quantity(u32::MAX);
        entry.set_days(u32::MAX);

        assert_eq!(line_total(&entry), Decimal::MAX);

        let totals = CartTotals::from_entries([&entry, &entry]);

        assert_eq!(totals.rental, Decimal::MAX);
        assert_eq!(totals.total(), Decimal::MAX);
    }

    #[test]
    fn empty_totals_are_zero() {
        let totals = CartTotals::from_entries(std::iter::empty());

        assert_eq!(totals, CartTotals::default());
        assert_eq!(totals.total(), Decimal::ZERO);
    }

    #[test]
    fn to_money_keeps_amounts() {
        let totals = CartTotals {
            purchase: Decimal::new(4500, 2),
            rental: Decimal::new(160, 0),
        };

        let money_totals = totals.to_money(EUR);

        assert_eq!(money_totals.total.amount(), &Decimal::new(20500, 2));
        assert_eq!(money_totals.purchase.currency(), EUR);
    }
}
