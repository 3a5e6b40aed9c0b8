//! Free-text command recognition.
//!
//! Matchers run in a fixed order and the first hit wins, so broader
//! patterns ("estimate", FAQ keywords) sit below the precise command
//! forms they would otherwise shadow. Matchers are pure text functions;
//! whether a wallet or account exists is the dispatcher's problem.

use engine::Money;

use crate::parsing::{
    contains_any, normalize, parse_fragment, parse_money_token, parse_place_ref, parse_qty,
};

/// Which end of the move a saved place is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Leg {
    Pickup,
    Dropoff,
}

impl Leg {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Leg::Pickup => "pickup",
            Leg::Dropoff => "dropoff",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaqTopic {
    Hours,
    Reschedule,
    CancelPolicy,
}

/// A recognized user command.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
    /// Answer to a pending "pickup or dropoff?" question.
    PendingLeg(Leg),
    ApplyPromo(String),
    ListPromos,
    Estimate,
    VehicleGuidance,
    PackingChecklist,
    SetHelpers(i64),
    AdjustHelpers(i64),
    ClearSupplies,
    AddSupply { term: String, qty: u32 },
    RemoveSupply { term: String, qty: u32 },
    SetVehicle(String),
    AddFunds(Money),
    WalletQuery,
    ListPlaces,
    /// Bare `#N` reference, 1-based as typed.
    PlaceRef(usize),
    UsePlace { index: usize, leg: Leg },
    ListBookings,
    CancelBooking(String),
    CompleteBooking(String),
    BookMove {
        funds: Option<Money>,
        card_last4: Option<String>,
    },
    Faq(FaqTopic),
    Fallback,
}

type Matcher = fn(&str) -> Option<Intent>;

/// First match wins. Order mirrors command precedence: precise verb
/// forms first, keyword queries after, FAQs and fallback last.
const MATCHERS: &[Matcher] = &[
    match_apply_promo,
    match_list_promos,
    match_estimate,
    match_vehicle_guidance,
    match_checklist,
    match_set_helpers,
    match_adjust_helpers,
    match_clear_supplies,
    match_supply,
    match_set_vehicle,
    match_add_funds,
    match_wallet_query,
    match_list_places,
    match_place_ref,
    match_use_place,
    match_list_bookings,
    match_booking_action,
    match_book_move,
    match_faq,
];

/// Recognizes the command in `input`.
///
/// When `pending_place` is set the assistant has just asked "pickup or
/// dropoff?", and a reply naming either leg resolves that question
/// before anything else.
#[must_use]
pub fn parse_intent(input: &str, pending_place: bool) -> Intent {
    let text = normalize(input);
    if text.is_empty() {
        return Intent::Fallback;
    }

    if pending_place {
        if text.contains("pickup") {
            return Intent::PendingLeg(Leg::Pickup);
        }
        if text.contains("dropoff") {
            return Intent::PendingLeg(Leg::Dropoff);
        }
    }

    MATCHERS
        .iter()
        .find_map(|m| m(&text))
        .unwrap_or(Intent::Fallback)
}

fn tokens(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

// "apply promo NEWSTUDENT25" / "use code weekend15"
fn match_apply_promo(text: &str) -> Option<Intent> {
    let t = tokens(text);
    t.windows(3).find_map(|w| {
        let verb = matches!(w[0], "apply" | "use");
        let noun = matches!(w[1], "promo" | "code");
        let code_ok = !w[2].is_empty()
            && w[2].chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        (verb && noun && code_ok).then(|| Intent::ApplyPromo(w[2].to_string()))
    })
}

// "what promos are available", "show discounts"
fn match_list_promos(text: &str) -> Option<Intent> {
    let topic = contains_any(text, &["promo", "discount"]);
    let query = contains_any(text, &["what", "available", "list", "show"]);
    (topic && query).then_some(Intent::ListPromos)
}

fn match_estimate(text: &str) -> Option<Intent> {
    contains_any(text, &["estimate", "cost", "how much", "price"]).then_some(Intent::Estimate)
}

fn match_vehicle_guidance(text: &str) -> Option<Intent> {
    contains_any(text, &["what size truck", "which vehicle", "vehicle size"])
        .then_some(Intent::VehicleGuidance)
}

fn match_checklist(text: &str) -> Option<Intent> {
    text.contains("checklist").then_some(Intent::PackingChecklist)
}

// "set helpers to 3"
fn match_set_helpers(text: &str) -> Option<Intent> {
    let t = tokens(text);
    t.windows(4).find_map(|w| {
        let shape = w[0] == "set" && matches!(w[1], "helper" | "helpers") && w[2] == "to";
        let n = parse_qty(w[3])?;
        shape.then_some(Intent::SetHelpers(i64::from(n)))
    })
}

// "add helpers 2", "increase helpers by 1", "reduce helpers by 2"
fn match_adjust_helpers(text: &str) -> Option<Intent> {
    let t = tokens(text);
    for (i, w) in t.windows(2).enumerate() {
        let sign = match w[0] {
            "add" | "increase" => 1i64,
            "remove" | "decrease" | "reduce" => -1i64,
            _ => continue,
        };
        if !matches!(w[1], "helper" | "helpers") {
            continue;
        }
        let rest = &t[i + 2..];
        let qty_token = match rest {
            ["by", n, ..] => n,
            [n, ..] => n,
            [] => continue,
        };
        if let Some(n) = parse_qty(qty_token) {
            return Some(Intent::AdjustHelpers(sign * i64::from(n)));
        }
    }
    None
}

// "clear supplies", "reset cart"
fn match_clear_supplies(text: &str) -> Option<Intent> {
    let t = tokens(text);
    t.windows(2)
        .any(|w| matches!(w[0], "clear" | "reset") && matches!(w[1], "supplies" | "cart"))
        .then_some(Intent::ClearSupplies)
}

// "add 3 boxes", "remove tape", "add 2 packing tape"
//
// With an explicit quantity any term is accepted so the dispatcher can
// apologize for items outside the catalog; without one the term itself
// must resolve, which keeps "add funds $50" falling through to the
// wallet matcher below.
fn match_supply(text: &str) -> Option<Intent> {
    let t = tokens(text);
    for (i, tok) in t.iter().enumerate() {
        let add = match *tok {
            "add" => true,
            "remove" => false,
            _ => continue,
        };
        let (qty, term_tokens) = match t.get(i + 1).and_then(|n| parse_qty(n)) {
            Some(n) => (Some(n), &t[i + 2..]),
            None => (None, &t[i + 1..]),
        };
        if term_tokens.is_empty() {
            continue;
        }
        let term = term_tokens.join(" ");
        if qty.is_none() && engine::SupplyItem::parse(&term).is_none() {
            continue;
        }
        let qty = qty.unwrap_or(1);
        return Some(if add {
            Intent::AddSupply { term, qty }
        } else {
            Intent::RemoveSupply { term, qty }
        });
    }
    None
}

// "set vehicle pickup truck"
fn match_set_vehicle(text: &str) -> Option<Intent> {
    let rest = text.split_once("set vehicle")?.1.trim();
    if rest.is_empty() || engine::Vehicle::parse(rest).is_none() {
        return None;
    }
    Some(Intent::SetVehicle(rest.to_string()))
}

// "add funds $50", "add funds 25.50"
fn match_add_funds(text: &str) -> Option<Intent> {
    let t = tokens(text);
    t.windows(3).find_map(|w| {
        let shape = w[0] == "add" && matches!(w[1], "fund" | "funds");
        let amount = parse_money_token(w[2])?;
        shape.then_some(Intent::AddFunds(amount))
    })
}

fn match_wallet_query(text: &str) -> Option<Intent> {
    // A booking utterance may name the wallet in an inline funds
    // directive ("book ... with $50 from wallet"); those belong to the
    // booking matcher further down the table.
    if text.starts_with("book") {
        return None;
    }
    contains_any(text, &["wallet", "balance"]).then_some(Intent::WalletQuery)
}

fn match_list_places(text: &str) -> Option<Intent> {
    contains_any(text, &["saved places", "addresses"]).then_some(Intent::ListPlaces)
}

// a bare "#2" (or "2")
fn match_place_ref(text: &str) -> Option<Intent> {
    let t = tokens(text);
    match t.as_slice() {
        [only] => parse_place_ref(only).map(Intent::PlaceRef),
        _ => None,
    }
}

// "use #1 for pickup"
fn match_use_place(text: &str) -> Option<Intent> {
    let t = tokens(text);
    t.windows(4).find_map(|w| {
        if w[0] != "use" || w[2] != "for" {
            return None;
        }
        let index = parse_place_ref(w[1])?;
        let leg = match w[3] {
            "pickup" => Leg::Pickup,
            "dropoff" => Leg::Dropoff,
            _ => return None,
        };
        Some(Intent::UsePlace { index, leg })
    })
}

fn match_list_bookings(text: &str) -> Option<Intent> {
    contains_any(text, &["my bookings", "show bookings", "history"])
        .then_some(Intent::ListBookings)
}

// "cancel #a1b2c3" / "complete a1b2c3"
//
// Exact verb tokens only, so "cancellation policy" keeps falling
// through to the FAQ matcher.
fn match_booking_action(text: &str) -> Option<Intent> {
    let t = tokens(text);
    t.windows(2).find_map(|w| {
        let frag = parse_fragment(w[1])?;
        match w[0] {
            "cancel" => Some(Intent::CancelBooking(frag)),
            "complete" => Some(Intent::CompleteBooking(frag)),
            _ => None,
        }
    })
}

// "book move", "book my move with $50 from wallet on card ending 4242"
fn match_book_move(text: &str) -> Option<Intent> {
    if !text.starts_with("book") {
        return None;
    }
    let t = tokens(text);

    let mut funds = None;
    for (i, w) in t.windows(2).enumerate() {
        if !matches!(w[0], "use" | "with") {
            continue;
        }
        if let Some(amount) = parse_money_token(w[1]) {
            let rest = &t[i + 2..];
            let wallet_next = matches!(rest, ["wallet" | "funds", ..])
                || matches!(rest, ["from", "wallet" | "funds", ..]);
            if wallet_next {
                funds = Some(amount);
                break;
            }
        }
    }

    let mut card_last4 = None;
    for (i, tok) in t.iter().enumerate() {
        if *tok != "card" {
            continue;
        }
        let digits = match &t[i + 1..] {
            ["ending", d, ..] => d,
            [d, ..] => d,
            [] => continue,
        };
        if digits.len() == 4 && digits.chars().all(|c| c.is_ascii_digit()) {
            card_last4 = Some((*digits).to_string());
            break;
        }
    }

    Some(Intent::BookMove { funds, card_last4 })
}

fn match_faq(text: &str) -> Option<Intent> {
    if contains_any(text, &["hours", "open", "closing"]) {
        return Some(Intent::Faq(FaqTopic::Hours));
    }
    if text.contains("reschedul")
        || (text.contains("change") && contains_any(text, &["move", "book"]))
    {
        return Some(Intent::Faq(FaqTopic::Reschedule));
    }
    if text.contains("cancel") && text.contains("policy") {
        return Some(Intent::Faq(FaqTopic::CancelPolicy));
    }
    None
}
