//! Donation aggregation across the roster.
//!
//! Everything here is a fold over in-memory lists, recomputed from scratch
//! on every call; there is no incremental state to invalidate.

use shared::{DonationSummary, DonationWithContext, Prayer, PrayerCard};

#[derive(Clone, Default)]
pub struct DonationService;

impl DonationService {
    pub fn new() -> Self {
        Self
    }

    /// Paid/unpaid totals and counts over a flattened roster.
    pub fn summarize(&self, prayers: &[Prayer]) -> DonationSummary {
        let mut summary = DonationSummary::default();
        for prayer in prayers {
            let mut has_unpaid = false;
            for donation in &prayer.donations {
                if donation.paid {
                    summary.total_paid += donation.amount;
                } else {
                    summary.total_unpaid += donation.amount;
                    summary.unpaid_donation_count += 1;
                    has_unpaid = true;
                }
            }
            if has_unpaid {
                summary.prayers_with_unpaid += 1;
            }
        }
        summary
    }

    /// Prayers having at least one unpaid donation.
    pub fn prayers_with_unpaid_donations<'a>(&self, prayers: &'a [Prayer]) -> Vec<&'a Prayer> {
        prayers
            .iter()
            .filter(|prayer| !prayer.unpaid_donations().is_empty())
            .collect()
    }

    /// Every donation across all cards, joined with its person and card.
    pub fn donations_with_context(&self, cards: &[PrayerCard]) -> Vec<DonationWithContext> {
        let mut result = Vec::new();
        for card in cards {
            for donation in &card.prayer.donations {
                result.push(DonationWithContext {
                    donation: donation.clone(),
                    prayer: card.prayer.clone(),
                    card: card.clone(),
                });
            }
            for child in &card.children {
                for donation in &child.donations {
                    result.push(DonationWithContext {
                        donation: donation.clone(),
                        prayer: child.clone(),
                        card: card.clone(),
                    });
                }
            }
        }
        result
    }
}

/// Render an amount as shekels with thousands separators, the shape the
/// donation screens display.
pub fn format_currency(amount: f64) -> String {
    let negative = amount < 0.0;
    let rounded = (amount.abs() * 100.0).round() / 100.0;
    let whole = rounded.trunc() as u64;
    let cents = ((rounded - rounded.trunc()) * 100.0).round() as u64;

    let digits = whole.to_string();
    let mut grouped = String::new();
    for (position, digit) in digits.chars().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if negative { "-" } else { "" };
    if cents == 0 {
        format!("₪{}{}", sign, grouped)
    } else {
        format!("₪{}{}.{:02}", sign, grouped, cents)
    }
}
