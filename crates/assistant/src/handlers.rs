//! Intent dispatch: applies a recognized command to the engine and
//! builds the reply text.

use chrono::{DateTime, Utc};
use engine::{
    BookingDraft, BookingStatus, EngineError, Money, PaymentRequest, PromoKind, Settlement,
    SupplyItem, Vehicle, CATALOG,
};

use crate::{
    intents::{FaqTopic, Intent, Leg},
    replies::{
        format_whole, short_id, FALLBACK, FAQ_CANCEL_POLICY, FAQ_HOURS, FAQ_RESCHEDULE,
        PACKING_CHECKLIST, VEHICLE_GUIDANCE,
    },
    Assistant, Reply, View,
};

impl Assistant {
    pub(crate) fn dispatch(&mut self, intent: Intent, now: DateTime<Utc>) -> Reply {
        match intent {
            Intent::PendingLeg(leg) => self.finish_pending_place(leg),
            Intent::ApplyPromo(code) => self.apply_promo(&code, now),
            Intent::ListPromos => Reply::text(list_promos()),
            Intent::Estimate => Reply::text(self.estimate_summary()),
            Intent::VehicleGuidance => Reply::text(VEHICLE_GUIDANCE),
            Intent::PackingChecklist => Reply::text(PACKING_CHECKLIST),
            Intent::SetHelpers(n) => {
                let n = self.config.set_helpers(n);
                Reply::text(format!("Set helpers to **{n}**."))
            }
            Intent::AdjustHelpers(delta) => {
                let n = self.config.adjust_helpers(delta);
                if delta >= 0 {
                    Reply::text(format!("Increased helpers to **{n}**."))
                } else {
                    Reply::text(format!("Decreased helpers to **{n}**."))
                }
            }
            Intent::ClearSupplies => {
                self.config.clear_supplies();
                Reply::text("Cleared supplies.")
            }
            Intent::AddSupply { term, qty } => self.change_supply(&term, qty, true),
            Intent::RemoveSupply { term, qty } => self.change_supply(&term, qty, false),
            Intent::SetVehicle(name) => match Vehicle::parse(&name) {
                Some(vehicle) => {
                    self.config.vehicle = Some(vehicle);
                    Reply::text(format!("Vehicle set to **{}**.", vehicle.label()))
                }
                None => Reply::text(FALLBACK),
            },
            Intent::AddFunds(amount) => self.add_funds(amount, now),
            Intent::WalletQuery => match self.store.active() {
                Some(account) => Reply::text(format!(
                    "Wallet balance: {}. Saved cards: {}.",
                    account.wallet.balance(),
                    account.wallet.cards().len()
                )),
                None => Reply::text(FALLBACK),
            },
            Intent::ListPlaces => Reply::text(self.list_places()),
            Intent::PlaceRef(n) => self.start_pending_place(n),
            Intent::UsePlace { index, leg } => self.use_place(index, leg),
            Intent::ListBookings => Reply::text(self.list_bookings()),
            Intent::CancelBooking(frag) => {
                self.booking_action(&frag, BookingStatus::Cancelled, "cancelled")
            }
            Intent::CompleteBooking(frag) => {
                self.booking_action(&frag, BookingStatus::Completed, "completed")
            }
            Intent::BookMove { funds, card_last4 } => self.book_move(funds, card_last4, now),
            Intent::Faq(FaqTopic::Hours) => Reply::text(FAQ_HOURS),
            Intent::Faq(FaqTopic::Reschedule) => Reply::text(FAQ_RESCHEDULE),
            Intent::Faq(FaqTopic::CancelPolicy) => Reply::text(FAQ_CANCEL_POLICY),
            Intent::Fallback => Reply::text(FALLBACK),
        }
    }

    fn saved_place(&self, index: usize) -> Option<(String, String)> {
        self.store
            .active()
            .and_then(|account| account.saved_places.get(index))
            .map(|p| (p.label.clone(), p.address.clone()))
    }

    fn set_leg(&mut self, leg: Leg, address: String) -> Reply {
        let text = format!("Okay, set **{}** to: {address}", leg.as_str());
        match leg {
            Leg::Pickup => self.config.pickup = address,
            Leg::Dropoff => self.config.dropoff = address,
        }
        Reply::text(text)
    }

    fn finish_pending_place(&mut self, leg: Leg) -> Reply {
        let Some(index) = self.pending_place.take() else {
            return Reply::text(FALLBACK);
        };
        match self.saved_place(index) {
            Some((_, address)) => self.set_leg(leg, address),
            None => Reply::text("I couldn't find that saved place anymore."),
        }
    }

    fn start_pending_place(&mut self, n: usize) -> Reply {
        let index = n.wrapping_sub(1);
        if n == 0 || self.saved_place(index).is_none() {
            return Reply::text("That number doesn't match a saved place.");
        }
        self.pending_place = Some(index);
        Reply::text("Use this for **pickup** or **dropoff**?")
    }

    fn use_place(&mut self, n: usize, leg: Leg) -> Reply {
        let index = n.wrapping_sub(1);
        match (n, self.saved_place(index)) {
            (0, _) | (_, None) => Reply::text("Couldn't find that saved place."),
            (_, Some((_, address))) => self.set_leg(leg, address),
        }
    }

    fn apply_promo(&mut self, code: &str, now: DateTime<Utc>) -> Reply {
        let estimate = self.config.estimate();
        match self.promo.apply(code, now) {
            Ok(applied) => {
                let code = applied.code.clone();
                let discount = self.promo.compute_discount(estimate);
                Reply::text(format!(
                    "Applied **{code}**. Instant discount: {discount}."
                ))
            }
            Err(err) => Reply::text(err.to_string()),
        }
    }

    fn estimate_summary(&self) -> String {
        let estimate = self.config.estimate();
        let discount = self.promo.compute_discount(estimate);
        let due = (estimate - discount).max(Money::ZERO);

        let mut text = format!("Estimated total: **{estimate}**");
        if discount.is_positive() {
            text.push_str(&format!(" − {discount} promo = **{due}**"));
        }
        let vehicle = self
            .config
            .vehicle
            .map_or_else(|| "None".to_string(), Vehicle::labeled);
        text.push_str(&format!(
            ".\nVehicle: {vehicle}. Helpers: {}. Supplies: {}.",
            self.config.helpers(),
            self.config.supplies_price()
        ));
        text
    }

    fn change_supply(&mut self, term: &str, qty: u32, add: bool) -> Reply {
        let Some(item) = SupplyItem::parse(term) else {
            return Reply::text("I didn't recognize that supply.");
        };
        if add {
            self.config.add_supply(item, qty);
            Reply::text(format!("Added **{qty} {}**.", item.name()))
        } else {
            self.config.remove_supply(item, qty);
            Reply::text(format!("Removed **{qty} {}**.", item.name()))
        }
    }

    fn add_funds(&mut self, amount: Money, now: DateTime<Utc>) -> Reply {
        let mut outcome = Ok(());
        match self.store.update_active(|account| {
            outcome = account.wallet.add_funds(amount, now);
        }) {
            Ok(snapshot) => match outcome {
                Ok(()) => Reply::text(format!(
                    "Added {amount}. New balance: {}.",
                    snapshot.wallet.balance()
                )),
                Err(err) => Reply::text(err.to_string()),
            },
            // No active account: same help text as any unservable ask.
            Err(_) => Reply::text(FALLBACK),
        }
    }

    fn list_places(&self) -> String {
        let places = self
            .store
            .active()
            .map(|account| account.saved_places.as_slice())
            .unwrap_or_default();
        if places.is_empty() {
            return "No saved places yet. Add them in Profile → Saved Places.".to_string();
        }
        let lines: Vec<String> = places
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{}. {} — {}", i + 1, p.label, p.address))
            .collect();
        format!(
            "Your saved places:\n{}\nSay: **use #1 for pickup** or just type **#1**.",
            lines.join("\n")
        )
    }

    fn list_bookings(&self) -> String {
        let bookings = self
            .store
            .active()
            .map(|account| account.bookings.list())
            .unwrap_or_default();
        if bookings.is_empty() {
            return "No bookings yet.".to_string();
        }
        let lines: Vec<String> = bookings
            .iter()
            .take(5)
            .map(|b| {
                format!(
                    "• #{} {} — {} → {} ({})",
                    short_id(b.id),
                    b.status.as_str(),
                    b.pickup,
                    b.dropoff,
                    format_whole(b.total)
                )
            })
            .collect();
        format!(
            "Recent bookings:\n{}\nSay: **cancel #id** or **complete #id**.",
            lines.join("\n")
        )
    }

    fn booking_action(&mut self, fragment: &str, status: BookingStatus, word: &str) -> Reply {
        let hit = self
            .store
            .active()
            .and_then(|account| account.bookings.find_by_fragment(fragment))
            .map(|b| b.id);
        let Some(id) = hit else {
            return Reply::text("Could not find that booking id.");
        };

        match self.store.update_active(|account| {
            account.bookings.update_status(id, status);
        }) {
            Ok(_) => Reply::text(format!("Booking #{} marked **{word}**.", short_id(id))),
            Err(err) => Reply::text(err.to_string()),
        }
    }

    fn book_move(
        &mut self,
        funds: Option<Money>,
        card_last4: Option<String>,
        now: DateTime<Utc>,
    ) -> Reply {
        let Some(account) = self.store.active() else {
            return Reply::goto(
                "Taking you to payment to complete the booking.",
                View::Payment,
            );
        };

        let estimate = self.config.estimate();
        let discount = self.promo.compute_discount(estimate);
        let total = (estimate - discount).max(Money::ZERO);

        let card_id = card_last4.as_deref().and_then(|last4| {
            account
                .wallet
                .cards()
                .iter()
                .find(|c| c.last4 == last4)
                .map(|c| c.id)
        });

        let pickup = nonempty_or(&self.config.pickup, "Pickup");
        let dropoff = nonempty_or(&self.config.dropoff, "Dropoff");
        let mut label = format!("Move: {pickup} → {dropoff}");
        if let Some(promo) = self.promo.active() {
            label.push_str(&format!(" ({})", promo.code));
        }

        let draft = BookingDraft {
            status: None,
            pickup,
            dropoff,
            vehicle: self
                .config
                .vehicle
                .map_or_else(|| "None".to_string(), |v| v.label().to_string()),
            helpers: self.config.helpers(),
            items: self.config.supplies().clone(),
            distance_km: self.config.distance_km(),
            total,
        };

        let request = PaymentRequest {
            funds_requested: funds.unwrap_or(Money::ZERO),
            amount_due: total,
            card_id,
            label: Some(label),
        };

        let mut outcome: Result<Settlement, EngineError> = Err(EngineError::NoPaymentMethod);
        let update = self.store.update_active(|account| {
            outcome = account.wallet.pay(request, now);
            if outcome.is_ok() {
                account.bookings.add(draft, now);
            }
        });

        match (update, outcome) {
            (Ok(snapshot), Ok(settlement)) => {
                let mut text = format!("Booked! Charged {}", settlement.card_charged);
                if let Some(card) = settlement
                    .card_id
                    .and_then(|id| snapshot.wallet.cards().iter().find(|c| c.id == id).cloned())
                {
                    text.push_str(&format!(" to card ••••{}", card.last4));
                }
                if settlement.wallet_used.is_positive() {
                    text.push_str(&format!(" and {} from wallet", settlement.wallet_used));
                }
                text.push('.');
                Reply::goto(text, View::Confirmation)
            }
            (_, Err(err)) | (Err(err), _) => {
                tracing::debug!(error = %err, "booking failed");
                Reply::goto(err.to_string(), View::Payment)
            }
        }
    }
}

fn list_promos() -> String {
    let lines: Vec<String> = CATALOG
        .iter()
        .map(|p| {
            let value = match p.kind {
                PromoKind::Percent(bp) => format!("{}%", bp / 100),
                PromoKind::Fixed(amount) => format_whole(amount),
            };
            format!("• {}: {} (min {})", p.code, value, format_whole(p.min))
        })
        .collect();
    format!("Active offers:\n{}", lines.join("\n"))
}

fn nonempty_or(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use engine::{CardDetails, Profile};

    use super::*;

    fn assistant(dir: &std::path::Path) -> Assistant {
        Assistant::builder()
            .accounts_path(dir.join("accounts.json"))
            .state_path(dir.join("state.json"))
            .build()
    }

    fn with_account(dir: &std::path::Path) -> Assistant {
        let mut a = assistant(dir);
        let id = a
            .accounts_mut()
            .create(Profile {
                username: "jordan".to_string(),
                full_name: "Jordan Smith".to_string(),
                email: "jordan@campus.edu".to_string(),
                phone: "555-0100".to_string(),
            })
            .unwrap()
            .id
            .clone();
        a.accounts_mut().set_active(&id).unwrap();
        a
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn promo_reply_includes_current_discount() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = assistant(dir.path());
        a.handle("set helpers to 2", now());
        a.handle("add 2 small boxes", now());
        a.handle("add 2 medium boxes", now());
        a.handle("add 1 packing tape", now());

        // $89 + $80 + $5 + $7 + $3 = $184.00, 25% off = $46.00.
        let reply = a.handle("apply promo newstudent25", now());
        assert_eq!(
            reply.text,
            "Applied **NEWSTUDENT25**. Instant discount: $46.00."
        );
    }

    #[test]
    fn estimate_reply_shows_discounted_total() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = assistant(dir.path());
        a.handle("set helpers to 2", now());
        a.handle("add 2 small boxes", now());

        // $89.00 + $80.00 + $5.00 = $174.00, 25% off = $130.50 due.
        a.handle("apply promo NEWSTUDENT25", now());
        let reply = a.handle("how much will it cost", now());
        assert_eq!(
            reply.text,
            "Estimated total: **$174.00** − $43.50 promo = **$130.50**.\n\
             Vehicle: Pickup Truck ($89). Helpers: 2. Supplies: $5.00."
        );
    }

    #[test]
    fn unknown_promo_reports_the_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = assistant(dir.path());
        let reply = a.handle("apply promo BOGUS99", now());
        assert_eq!(reply.text, "Invalid promo code");
    }

    #[test]
    fn promo_listing_shows_catalog_terms() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = assistant(dir.path());
        let reply = a.handle("what promos are available", now());
        assert!(reply.text.contains("• NEWSTUDENT25: 25% (min $50)"));
        assert!(reply.text.contains("• MIDTERM20: $20 (min $100)"));
        assert!(reply.text.contains("• WEEKEND15: 15% (min $75)"));
    }

    #[test]
    fn helpers_and_supplies_commands_mutate_the_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = assistant(dir.path());

        assert_eq!(a.handle("set helpers to 3", now()).text, "Set helpers to **3**.");
        assert_eq!(
            a.handle("increase helpers by 20", now()).text,
            "Increased helpers to **10**."
        );
        assert_eq!(
            a.handle("add 3 boxes", now()).text,
            "Added **3 Small Box**."
        );
        assert_eq!(
            a.handle("remove 1 box", now()).text,
            "Removed **1 Small Box**."
        );
        assert_eq!(
            a.handle("add 2 pianos", now()).text,
            "I didn't recognize that supply."
        );
        assert_eq!(a.handle("clear supplies", now()).text, "Cleared supplies.");
        assert!(a.config().supplies().is_empty());
    }

    #[test]
    fn vehicle_set_updates_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = assistant(dir.path());
        let reply = a.handle("set vehicle semi-light", now());
        assert_eq!(reply.text, "Vehicle set to **Semi-light**.");
        assert_eq!(a.config().vehicle, Some(Vehicle::SemiLight));
    }

    #[test]
    fn wallet_commands_need_an_active_account() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = assistant(dir.path());
        assert_eq!(a.handle("add funds $50", now()).text, FALLBACK);
        assert_eq!(a.handle("wallet balance", now()).text, FALLBACK);
    }

    #[test]
    fn add_funds_credits_the_active_wallet() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = with_account(dir.path());

        let reply = a.handle("add funds $50", now());
        assert_eq!(reply.text, "Added $50.00. New balance: $50.00.");
        let reply = a.handle("wallet balance", now());
        assert_eq!(reply.text, "Wallet balance: $50.00. Saved cards: 0.");
    }

    #[test]
    fn saved_place_flow_sets_the_pickup() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = with_account(dir.path());
        a.accounts_mut()
            .update_active(|account| {
                account.saved_places.push(engine::SavedPlace {
                    label: "Dorm".to_string(),
                    address: "12 Elm Hall".to_string(),
                });
            })
            .unwrap();

        let reply = a.handle("saved places", now());
        assert!(reply.text.contains("1. Dorm — 12 Elm Hall"));

        let reply = a.handle("#1", now());
        assert_eq!(reply.text, "Use this for **pickup** or **dropoff**?");

        let reply = a.handle("pickup", now());
        assert_eq!(reply.text, "Okay, set **pickup** to: 12 Elm Hall");
        assert_eq!(a.config().pickup, "12 Elm Hall");

        let reply = a.handle("use #1 for dropoff", now());
        assert_eq!(reply.text, "Okay, set **dropoff** to: 12 Elm Hall");
    }

    #[test]
    fn out_of_range_place_reference_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = with_account(dir.path());
        let reply = a.handle("#3", now());
        assert_eq!(reply.text, "That number doesn't match a saved place.");
        let reply = a.handle("use #3 for pickup", now());
        assert_eq!(reply.text, "Couldn't find that saved place.");
    }

    #[test]
    fn booking_flow_books_cancels_and_lists() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = with_account(dir.path());
        a.accounts_mut()
            .update_active(|account| {
                account.wallet.add_card(CardDetails {
                    number: "4111111111111111".to_string(),
                    holder: "Jordan Smith".to_string(),
                    exp_month: 9,
                    exp_year: 2028,
                });
            })
            .unwrap();

        a.handle("set helpers to 2", now());
        let reply = a.handle("book move", now());
        // $89 + $80 = $169.00, all on card.
        assert_eq!(reply.text, "Booked! Charged $169.00 to card ••••1111.");
        assert_eq!(reply.goto, Some(View::Confirmation));

        let listing = a.handle("show bookings", now());
        assert!(listing.text.starts_with("Recent bookings:\n• #"));
        assert!(listing.text.contains("Scheduled"));

        let id = a.account().unwrap().bookings.list()[0].id;
        let frag = short_id(id);
        let reply = a.handle(&format!("cancel #{frag}"), now());
        assert_eq!(
            reply.text,
            format!("Booking #{frag} marked **cancelled**.")
        );
        assert_eq!(
            a.account().unwrap().bookings.list()[0].status,
            BookingStatus::Cancelled
        );
    }

    #[test]
    fn unknown_booking_fragment_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = with_account(dir.path());
        let reply = a.handle("cancel #zzzz99", now());
        assert_eq!(reply.text, "Could not find that booking id.");
    }

    #[test]
    fn book_without_payment_method_goes_back_to_payment() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = with_account(dir.path());
        a.handle("add funds $50", now());

        let reply = a.handle("book my move with $200 from wallet", now());
        assert_eq!(
            reply.text,
            "No saved card available to cover the remaining balance"
        );
        assert_eq!(reply.goto, Some(View::Payment));
        // The wallet was not debited and no booking was recorded.
        assert_eq!(a.account().unwrap().wallet.balance(), Money::new(5_000));
        assert!(a.account().unwrap().bookings.list().is_empty());
    }

    #[test]
    fn book_without_account_goes_to_payment() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = assistant(dir.path());
        let reply = a.handle("book move", now());
        assert_eq!(reply.text, "Taking you to payment to complete the booking.");
        assert_eq!(reply.goto, Some(View::Payment));
    }

    #[test]
    fn booking_label_names_the_route_and_promo() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = with_account(dir.path());
        a.accounts_mut()
            .update_active(|account| {
                account.wallet.add_card(CardDetails {
                    number: "4111111111111111".to_string(),
                    holder: "Jordan Smith".to_string(),
                    exp_month: 9,
                    exp_year: 2028,
                });
            })
            .unwrap();
        a.handle("set helpers to 2", now());
        a.handle("apply promo NEWSTUDENT25", now());
        a.handle("book move", now());

        let tx = &a.account().unwrap().wallet.transactions()[0];
        assert_eq!(tx.label, "Move: Pickup → Dropoff (NEWSTUDENT25)");
    }

    #[test]
    fn pending_place_with_missing_account_apologizes() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = with_account(dir.path());
        a.accounts_mut()
            .update_active(|account| {
                account.saved_places.push(engine::SavedPlace {
                    label: "Dorm".to_string(),
                    address: "12 Elm Hall".to_string(),
                });
            })
            .unwrap();
        a.handle("#1", now());
        a.accounts_mut()
            .update_active(|account| account.saved_places.clear())
            .unwrap();

        let reply = a.handle("pickup", now());
        assert_eq!(reply.text, "I couldn't find that saved place anymore.");
    }

    #[test]
    fn fallback_mentions_example_commands() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = assistant(dir.path());
        let reply = a.handle("tell me a joke", now());
        assert!(reply.text.contains("apply promo NEWSTUDENT25"));
        assert!(reply.goto.is_none());
    }

    #[test]
    fn explicit_card_by_last4_is_charged() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = with_account(dir.path());
        a.accounts_mut()
            .update_active(|account| {
                account.wallet.add_card(CardDetails {
                    number: "4111111111111111".to_string(),
                    holder: "Jordan Smith".to_string(),
                    exp_month: 9,
                    exp_year: 2028,
                });
                account.wallet.add_card(CardDetails {
                    number: "5200828282828210".to_string(),
                    holder: "Jordan Smith".to_string(),
                    exp_month: 3,
                    exp_year: 2029,
                });
            })
            .unwrap();

        let reply = a.handle("book move with card ending 8210", now());
        assert!(reply.text.contains("to card ••••8210"), "{}", reply.text);
    }
}
