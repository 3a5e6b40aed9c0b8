//! Promotional codes: catalog, eligibility and discount computation.
//!
//! The catalog is fixed at compile time; at most one promotion is active
//! per session and applying a new code replaces the previous one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, ResultEngine};

/// How a promotion discounts the estimate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum PromoKind {
    /// Percentage of the estimate, in basis points (2_500 = 25%).
    Percent(u32),
    /// Flat amount off.
    Fixed(Money),
}

/// A catalog entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Promotion {
    pub code: &'static str,
    pub kind: PromoKind,
    /// Minimum qualifying estimate. Below this the discount is 0.
    pub min: Money,
}

/// The fixed process-wide promotion catalog.
pub const CATALOG: [Promotion; 3] = [
    Promotion {
        code: "NEWSTUDENT25",
        kind: PromoKind::Percent(2_500),
        min: Money::new(5_000),
    },
    Promotion {
        code: "MIDTERM20",
        kind: PromoKind::Fixed(Money::new(2_000)),
        min: Money::new(10_000),
    },
    Promotion {
        code: "WEEKEND15",
        kind: PromoKind::Percent(1_500),
        min: Money::new(7_500),
    },
];

/// The promotion currently applied to the session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppliedPromo {
    pub code: String,
    pub kind: PromoKind,
    pub min: Money,
    pub applied_at: DateTime<Utc>,
}

/// Session-scoped promotion state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PromoEngine {
    active: Option<AppliedPromo>,
}

/// Canonical form of a promo code: trimmed, uppercase.
fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl PromoEngine {
    /// Applies a promo code, replacing any active promotion.
    ///
    /// The input is normalized before lookup. An unknown code returns
    /// [`EngineError::InvalidPromoCode`] and leaves the state unchanged.
    pub fn apply(&mut self, code_text: &str, now: DateTime<Utc>) -> ResultEngine<&AppliedPromo> {
        let code = normalize_code(code_text);
        let entry = CATALOG
            .iter()
            .find(|p| p.code == code)
            .ok_or(EngineError::InvalidPromoCode)?;

        tracing::debug!(code = %code, "promo applied");
        Ok(self.active.insert(AppliedPromo {
            code,
            kind: entry.kind,
            min: entry.min,
            applied_at: now,
        }))
    }

    /// Removes the active promotion, if any.
    pub fn clear(&mut self) {
        self.active = None;
    }

    /// The currently active promotion.
    #[must_use]
    pub fn active(&self) -> Option<&AppliedPromo> {
        self.active.as_ref()
    }

    /// Discount for the given amount under the active promotion.
    ///
    /// Returns 0 when no promotion is active or the amount is below the
    /// promotion's minimum; otherwise the discount is clamped to
    /// `[0, amount]`. Never fails.
    #[must_use]
    pub fn compute_discount(&self, amount: Money) -> Money {
        let Some(promo) = &self.active else {
            return Money::ZERO;
        };
        if amount < promo.min {
            return Money::ZERO;
        }
        let raw = match promo.kind {
            PromoKind::Percent(bp) => amount.percent(bp),
            PromoKind::Fixed(value) => value,
        };
        raw.max(Money::ZERO).min(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        chrono::TimeZone::timestamp_opt(&Utc, 1_700_000_000, 0).unwrap()
    }

    #[test]
    fn percent_promo_discounts_eligible_estimate() {
        let mut promos = PromoEngine::default();
        promos.apply("NEWSTUDENT25", now()).unwrap();

        // 25% of $174.00 = $43.50
        assert_eq!(
            promos.compute_discount(Money::new(17_400)),
            Money::new(4_350)
        );
    }

    #[test]
    fn fixed_promo_below_minimum_discounts_nothing() {
        let mut promos = PromoEngine::default();
        promos.apply("MIDTERM20", now()).unwrap();

        assert_eq!(promos.compute_discount(Money::new(8_000)), Money::ZERO);
        assert_eq!(
            promos.compute_discount(Money::new(10_000)),
            Money::new(2_000)
        );
    }

    #[test]
    fn discount_never_exceeds_amount() {
        let mut promos = PromoEngine::default();
        promos.apply("MIDTERM20", now()).unwrap();

        // Fixed $20 off a $100 charge leaves $80; off exactly $100 min.
        let amount = Money::new(10_000);
        let d = promos.compute_discount(amount);
        assert!(d >= Money::ZERO && d <= amount);
    }

    #[test]
    fn unknown_code_is_rejected_without_state_change() {
        let mut promos = PromoEngine::default();
        promos.apply("WEEKEND15", now()).unwrap();

        let err = promos.apply("FOO123", now()).unwrap_err();
        assert_eq!(err, EngineError::InvalidPromoCode);
        assert_eq!(err.to_string(), "Invalid promo code");
        assert_eq!(promos.active().unwrap().code, "WEEKEND15");
    }

    #[test]
    fn code_is_normalized_before_lookup() {
        let mut promos = PromoEngine::default();
        promos.apply("  newstudent25 ", now()).unwrap();
        assert_eq!(promos.active().unwrap().code, "NEWSTUDENT25");
    }

    #[test]
    fn reapplying_replaces_but_keeps_terms() {
        let mut promos = PromoEngine::default();
        let first = promos.apply("NEWSTUDENT25", now()).unwrap().clone();
        let later = now() + chrono::Duration::hours(1);
        let second = promos.apply("NEWSTUDENT25", later).unwrap().clone();

        assert_eq!(first.code, second.code);
        assert_eq!(first.kind, second.kind);
        assert_eq!(first.min, second.min);
        assert_ne!(first.applied_at, second.applied_at);
    }

    #[test]
    fn applying_new_code_replaces_previous() {
        let mut promos = PromoEngine::default();
        promos.apply("NEWSTUDENT25", now()).unwrap();
        promos.apply("WEEKEND15", now()).unwrap();
        assert_eq!(promos.active().unwrap().code, "WEEKEND15");

        promos.clear();
        assert!(promos.active().is_none());
        assert_eq!(promos.compute_discount(Money::new(10_000)), Money::ZERO);
    }
}
