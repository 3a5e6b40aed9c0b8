//! Per-account wallet: balance, card registry, transaction log and the
//! funds+card settlement used at booking time.
//!
//! The transaction log is append-only. Refunds and cancellations are
//! modeled as new offsetting entries, never as edits.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

/// Card network, derived from the card number prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Discover,
    Other,
}

impl CardBrand {
    /// Derives the brand from a card number.
    ///
    /// Visa: leading 4; Mastercard: 51-55; Amex: 34/37; Discover:
    /// 6011/65; anything else is generic.
    #[must_use]
    pub fn from_number(number: &str) -> CardBrand {
        let digits: String = number.chars().filter(|c| !c.is_whitespace()).collect();
        if digits.starts_with('4') {
            CardBrand::Visa
        } else if matches!(digits.get(..2), Some("51" | "52" | "53" | "54" | "55")) {
            CardBrand::Mastercard
        } else if matches!(digits.get(..2), Some("34" | "37")) {
            CardBrand::Amex
        } else if digits.starts_with("6011") || digits.starts_with("65") {
            CardBrand::Discover
        } else {
            CardBrand::Other
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            CardBrand::Visa => "Visa",
            CardBrand::Mastercard => "Mastercard",
            CardBrand::Amex => "Amex",
            CardBrand::Discover => "Discover",
            CardBrand::Other => "Card",
        }
    }
}

/// A saved payment card. Only the last four digits are retained.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: Uuid,
    pub brand: CardBrand,
    pub last4: String,
    pub exp_month: u8,
    pub exp_year: u16,
    pub holder: String,
    pub is_default: bool,
}

/// Input for [`Wallet::add_card`]. The full number is used to derive the
/// brand and last four digits and is then discarded.
#[derive(Clone, Debug)]
pub struct CardDetails {
    pub number: String,
    pub holder: String,
    pub exp_month: u8,
    pub exp_year: u16,
}

/// One entry in the append-only transaction log.
///
/// Positive amounts are credits, negative amounts are debits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub label: String,
    pub amount: Money,
    pub occurred_at: DateTime<Utc>,
    pub card_id: Option<Uuid>,
}

/// Settlement request for [`Wallet::pay`].
#[derive(Clone, Debug)]
pub struct PaymentRequest {
    /// How much of the wallet balance the caller wants to spend.
    pub funds_requested: Money,
    /// Total owed after any discount.
    pub amount_due: Money,
    /// Explicit card choice; falls back to default, then first card.
    pub card_id: Option<Uuid>,
    /// Label for the card transaction. Defaults to "Card charge".
    pub label: Option<String>,
}

/// Breakdown of a successful settlement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub wallet_used: Money,
    pub card_charged: Money,
    pub card_id: Option<Uuid>,
}

/// Spending statistics over the current calendar month.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MonthStats {
    pub total_spent: Money,
    pub move_count: u32,
    pub avg_per_move: Money,
}

/// A wallet: stored balance, saved cards and the transaction log.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    balance: Money,
    cards: Vec<Card>,
    transactions: Vec<Transaction>,
}

impl Wallet {
    /// Current balance, never negative.
    #[must_use]
    pub fn balance(&self) -> Money {
        self.balance
    }

    /// Saved cards, in insertion order.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// The transaction log, newest first.
    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Credits the balance and logs a "Funds added" transaction.
    ///
    /// Rejects non-positive amounts without touching any state.
    pub fn add_funds(&mut self, amount: Money, now: DateTime<Utc>) -> ResultEngine<()> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be positive".to_string(),
            ));
        }
        self.balance += amount;
        self.push_transaction("Funds added", amount, now, None);
        tracing::debug!(amount = %amount, balance = %self.balance, "funds added");
        Ok(())
    }

    /// Saves a card, deriving brand and last four from the number.
    ///
    /// The full number is never stored. The first card added becomes the
    /// default. Returns the new card's id.
    pub fn add_card(&mut self, details: CardDetails) -> Uuid {
        let digits: String = details
            .number
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        let last4 = if digits.len() >= 4 {
            digits[digits.len() - 4..].to_string()
        } else {
            "0000".to_string()
        };

        let card = Card {
            id: Uuid::new_v4(),
            brand: CardBrand::from_number(&details.number),
            last4,
            exp_month: details.exp_month,
            exp_year: details.exp_year,
            holder: details.holder,
            is_default: self.cards.is_empty(),
        };
        let id = card.id;
        self.cards.push(card);
        id
    }

    /// Moves the default flag exclusively to the given card.
    ///
    /// Silently a no-op when the id is unknown.
    pub fn set_default_card(&mut self, id: Uuid) {
        if !self.cards.iter().any(|c| c.id == id) {
            return;
        }
        for card in &mut self.cards {
            card.is_default = card.id == id;
        }
    }

    /// The card `pay` would charge: the explicit choice if present in
    /// the set, else the default card, else the first card.
    #[must_use]
    pub fn resolve_card(&self, explicit: Option<Uuid>) -> Option<&Card> {
        explicit
            .and_then(|id| self.cards.iter().find(|c| c.id == id))
            .or_else(|| self.cards.iter().find(|c| c.is_default))
            .or_else(|| self.cards.first())
    }

    /// Settles `amount_due` from wallet funds plus a card charge.
    ///
    /// The wallet contribution is `min(max(0, funds_requested), balance,
    /// amount_due)`; the remainder goes to the resolved card. Card
    /// resolution is validated **before** the wallet is debited, so a
    /// failed settlement leaves the wallet untouched.
    pub fn pay(&mut self, request: PaymentRequest, now: DateTime<Utc>) -> ResultEngine<Settlement> {
        if request.amount_due.is_negative() {
            return Err(EngineError::InvalidAmount(
                "amount due cannot be negative".to_string(),
            ));
        }

        let wallet_used = request
            .funds_requested
            .max(Money::ZERO)
            .min(self.balance)
            .min(request.amount_due);
        let remainder = request.amount_due - wallet_used;

        let card_id = if remainder.is_positive() {
            let card = self
                .resolve_card(request.card_id)
                .ok_or(EngineError::NoPaymentMethod)?;
            Some(card.id)
        } else {
            None
        };

        if wallet_used.is_positive() {
            self.balance -= wallet_used;
            self.push_transaction("Wallet used", -wallet_used, now, None);
        }
        if remainder.is_positive() {
            let label = request.label.unwrap_or_else(|| "Card charge".to_string());
            self.push_transaction(&label, -remainder, now, card_id);
        }

        tracing::info!(
            wallet_used = %wallet_used,
            card_charged = %remainder,
            "settlement completed"
        );
        Ok(Settlement {
            wallet_used,
            card_charged: remainder,
            card_id,
        })
    }

    /// Debit statistics for the current calendar month.
    #[must_use]
    pub fn month_stats(&self, now: DateTime<Utc>) -> MonthStats {
        let debits: Vec<&Transaction> = self
            .transactions
            .iter()
            .filter(|t| {
                t.amount.is_negative()
                    && t.occurred_at.year() == now.year()
                    && t.occurred_at.month() == now.month()
            })
            .collect();

        let total_spent: Money = debits.iter().map(|t| t.amount.abs()).sum();
        let move_count = debits.len() as u32;
        let avg_per_move = if move_count == 0 {
            Money::ZERO
        } else {
            Money::new(total_spent.cents() / i64::from(move_count))
        };

        MonthStats {
            total_spent,
            move_count,
            avg_per_move,
        }
    }

    /// Writes the transaction log as CSV, newest first.
    pub fn export_csv<W: std::io::Write>(&self, writer: W) -> ResultEngine<()> {
        #[derive(Serialize)]
        struct ExportRow<'a> {
            occurred_at: String,
            amount_cents: i64,
            label: &'a str,
            card_id: Option<String>,
            id: String,
        }

        let mut csv_writer = csv::Writer::from_writer(writer);
        for tx in &self.transactions {
            csv_writer
                .serialize(ExportRow {
                    occurred_at: tx.occurred_at.to_rfc3339(),
                    amount_cents: tx.amount.cents(),
                    label: &tx.label,
                    card_id: tx.card_id.map(|id| id.to_string()),
                    id: tx.id.to_string(),
                })
                .map_err(|err| EngineError::Storage(err.to_string()))?;
        }
        csv_writer
            .flush()
            .map_err(|err| EngineError::Storage(err.to_string()))?;
        Ok(())
    }

    fn push_transaction(
        &mut self,
        label: &str,
        amount: Money,
        occurred_at: DateTime<Utc>,
        card_id: Option<Uuid>,
    ) {
        self.transactions.insert(
            0,
            Transaction {
                id: Uuid::new_v4(),
                label: label.to_string(),
                amount,
                occurred_at,
                card_id,
            },
        );
    }
}
