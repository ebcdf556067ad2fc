//! Settlement
//!
//! Equal-split reconciliation of a project's expenses: everyone who paid
//! anything owes the same share, and the difference to what they paid is
//! what they receive or pay.

use std::collections::HashMap;

use crate::domain::{LedgerEntry, UNCATEGORIZED, UNKNOWN_PAYER};

/// Net result for one payer, rounded for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Receives(u64),
    Pays(u64),
    Settled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SettlementLine {
    pub payer: String,
    pub paid: u64,
    /// `paid - share`, unrounded
    pub balance: f64,
}

impl SettlementLine {
    /// Exact comparison against zero; rounding happens only here
    pub fn outcome(&self) -> Outcome {
        if self.balance > 0.0 {
            Outcome::Receives(round_half_up(self.balance))
        } else if self.balance < 0.0 {
            Outcome::Pays(round_half_up(self.balance.abs()))
        } else {
            Outcome::Settled
        }
    }

    pub fn message(&self) -> String {
        match self.outcome() {
            Outcome::Receives(amount) => format!("{}は{}円受け取ります", self.payer, amount),
            Outcome::Pays(amount) => format!("{}は{}円支払います", self.payer, amount),
            Outcome::Settled => format!("{}の精算は完了しています", self.payer),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Settlement {
    pub total: u64,
    /// Even share per distinct payer
    pub share: f64,
    /// One line per payer, in order of first appearance
    pub lines: Vec<SettlementLine>,
}

/// Overall and per-payer sums
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PayerTotals {
    pub overall: u64,
    pub by_payer: Vec<(String, u64)>,
}

/// `Math.round` for non-negative values: halves go up
fn round_half_up(value: f64) -> u64 {
    (value + 0.5).floor() as u64
}

/// Amount with thousands separators and the yen suffix: `12,345円`
pub fn format_yen(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.push('円');
    out
}

/// Sum amounts per key, keeping first-appearance order
fn sum_by<'a>(entries: &'a [LedgerEntry], key: impl Fn(&'a LedgerEntry) -> &'a str) -> Vec<(String, u64)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut sums: Vec<(String, u64)> = Vec::new();
    for entry in entries {
        let k = key(entry);
        match index.get(k) {
            Some(&i) => sums[i].1 += entry.amount,
            None => {
                index.insert(k, sums.len());
                sums.push((k.to_string(), entry.amount));
            }
        }
    }
    sums
}

pub fn settle(entries: &[LedgerEntry]) -> Settlement {
    let paid = sum_by(entries, |e| e.payer.as_str());
    if paid.is_empty() {
        return Settlement::default();
    }

    let total: u64 = paid.iter().map(|(_, amount)| amount).sum();
    let share = total as f64 / paid.len() as f64;
    let lines = paid
        .into_iter()
        .map(|(payer, amount)| SettlementLine {
            payer,
            paid: amount,
            balance: amount as f64 - share,
        })
        .collect();

    Settlement { total, share, lines }
}

/// Totals shown above the settlement; a blank payer counts as `不明`
pub fn payer_totals(entries: &[LedgerEntry]) -> PayerTotals {
    let by_payer = sum_by(entries, |e| {
        if e.payer.trim().is_empty() { UNKNOWN_PAYER } else { e.payer.as_str() }
    });
    PayerTotals {
        overall: by_payer.iter().map(|(_, amount)| amount).sum(),
        by_payer,
    }
}

/// Per-category sums for the chart
pub fn category_totals(entries: &[LedgerEntry]) -> Vec<(String, u64)> {
    sum_by(entries, |e| match e.category.as_deref() {
        Some(c) if !c.trim().is_empty() => c,
        _ => UNCATEGORIZED,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(payer: &str, amount: u64) -> LedgerEntry {
        LedgerEntry::new("2024-05-01", payer, amount)
    }

    #[test]
    fn test_two_payers() {
        let result = settle(&[entry("A", 300), entry("B", 100)]);
        assert_eq!(result.total, 400);
        assert_eq!(result.share, 200.0);
        assert_eq!(result.lines[0].outcome(), Outcome::Receives(100));
        assert_eq!(result.lines[1].outcome(), Outcome::Pays(100));
        assert_eq!(result.lines[0].message(), "Aは100円受け取ります");
        assert_eq!(result.lines[1].message(), "Bは100円支払います");
    }

    #[test]
    fn test_share_is_per_payer_not_per_entry() {
        let result = settle(&[entry("A", 100), entry("A", 100), entry("A", 100), entry("B", 300)]);
        assert_eq!(result.share, 300.0);
        assert!(result.lines.iter().all(|l| l.outcome() == Outcome::Settled));
    }

    #[test]
    fn test_single_payer_is_settled() {
        let result = settle(&[entry("A", 12345), entry("A", 1)]);
        assert_eq!(result.lines.len(), 1);
        assert_eq!(result.lines[0].balance, 0.0);
        assert_eq!(result.lines[0].message(), "Aの精算は完了しています");
    }

    #[test]
    fn test_no_entries() {
        let result = settle(&[]);
        assert!(result.lines.is_empty());
        assert_eq!(result.total, 0);
    }

    #[test]
    fn test_rounding_only_for_display() {
        // share = 100 / 3
        let result = settle(&[entry("A", 100), entry("B", 0), entry("C", 0)]);
        let a = &result.lines[0];
        assert!((a.balance - 66.666_666).abs() < 1e-3);
        assert_eq!(a.outcome(), Outcome::Receives(67));
        assert_eq!(result.lines[1].outcome(), Outcome::Pays(33));
    }

    #[test]
    fn test_half_rounds_up() {
        // share = 0.5
        let result = settle(&[entry("A", 1), entry("B", 0)]);
        assert_eq!(result.lines[0].outcome(), Outcome::Receives(1));
        assert_eq!(result.lines[1].outcome(), Outcome::Pays(1));
    }

    #[test]
    fn test_payer_totals_keeps_order_and_names_blank_payer() {
        let totals = payer_totals(&[entry("B", 10), entry("", 5), entry("B", 1)]);
        assert_eq!(totals.overall, 16);
        assert_eq!(totals.by_payer, vec![("B".to_string(), 11), (UNKNOWN_PAYER.to_string(), 5)]);
    }

    #[test]
    fn test_category_totals() {
        let entries = vec![
            entry("A", 100).with_category("食費"),
            entry("B", 50),
            entry("A", 25).with_category("食費"),
        ];
        assert_eq!(
            category_totals(&entries),
            vec![("食費".to_string(), 125), (UNCATEGORIZED.to_string(), 50)]
        );
    }

    #[test]
    fn test_format_yen() {
        assert_eq!(format_yen(0), "0円");
        assert_eq!(format_yen(999), "999円");
        assert_eq!(format_yen(1000), "1,000円");
        assert_eq!(format_yen(1234567), "1,234,567円");
    }

    proptest! {
        #[test]
        fn prop_balances_sum_to_zero(raw in prop::collection::vec((0usize..6, 0u64..1_000_000), 0..40)) {
            let entries: Vec<_> = raw
                .iter()
                .map(|(p, amount)| entry(&format!("P{}", p), *amount))
                .collect();
            let result = settle(&entries);
            let sum: f64 = result.lines.iter().map(|l| l.balance).sum();
            prop_assert!(sum.abs() < 1e-6 * (result.total as f64).max(1.0));
        }

        #[test]
        fn prop_paying_the_share_is_settled(payers in 1usize..8, amount in 0u64..1_000_000) {
            let entries: Vec<_> = (0..payers).map(|p| entry(&format!("P{}", p), amount)).collect();
            let result = settle(&entries);
            prop_assert!(result.lines.iter().all(|l| l.outcome() == Outcome::Settled));
        }
    }
}
