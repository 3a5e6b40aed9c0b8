//! End-to-end conversation flows against real files on disk.

use assistant::{Assistant, Role, View};
use chrono::Utc;
use engine::{BookingStatus, CardDetails, Money, Profile};

fn build(dir: &std::path::Path) -> Assistant {
    Assistant::builder()
        .accounts_path(dir.join("accounts.json"))
        .state_path(dir.join("assistant_state.json"))
        .build()
}

fn sign_up(a: &mut Assistant) {
    let id = a
        .accounts_mut()
        .create(Profile {
            username: "casey".to_string(),
            full_name: "Casey Lee".to_string(),
            email: "casey@campus.edu".to_string(),
            phone: "555-0199".to_string(),
        })
        .unwrap()
        .id
        .clone();
    a.accounts_mut().set_active(&id).unwrap();
}

#[test]
fn fresh_session_opens_with_the_greeting() {
    let dir = tempfile::tempdir().unwrap();
    let a = build(dir.path());

    let transcript = a.transcript();
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript[0].role, Role::Bot);
    assert!(transcript[0].text.starts_with("Hi! I'm your DormDash AI assistant."));
}

#[test]
fn full_booking_flow_settles_and_records() {
    let dir = tempfile::tempdir().unwrap();
    let mut a = build(dir.path());
    sign_up(&mut a);
    a.accounts_mut()
        .update_active(|account| {
            account.wallet.add_card(CardDetails {
                number: "4111111111111111".to_string(),
                holder: "Casey Lee".to_string(),
                exp_month: 6,
                exp_year: 2029,
            });
        })
        .unwrap();

    let now = Utc::now();
    a.handle("set helpers to 2", now);
    a.handle("add 2 small boxes", now);
    a.handle("apply promo NEWSTUDENT25", now);
    a.handle("add funds $50", now);

    // Estimate $174.00, promo −$43.50, due $130.50; $50 from wallet.
    let reply = a.handle("book my move with $50 from wallet", now);
    assert_eq!(
        reply.text,
        "Booked! Charged $80.50 to card ••••1111 and $50.00 from wallet."
    );
    assert_eq!(reply.goto, Some(View::Confirmation));

    let account = a.account().unwrap();
    assert_eq!(account.wallet.balance(), Money::ZERO);
    assert_eq!(account.bookings.list().len(), 1);
    assert_eq!(account.bookings.list()[0].status, BookingStatus::Scheduled);
    assert_eq!(account.bookings.list()[0].total, Money::new(13_050));

    // Newest first: card charge then wallet debit.
    let txs = account.wallet.transactions();
    assert_eq!(txs[0].amount, Money::new(-8_050));
    assert_eq!(txs[1].amount, Money::new(-5_000));
    assert_eq!(txs[1].label, "Wallet used");
}

#[test]
fn failed_booking_keeps_wallet_and_log_intact() {
    let dir = tempfile::tempdir().unwrap();
    let mut a = build(dir.path());
    sign_up(&mut a);

    let now = Utc::now();
    a.handle("add funds $50", now);
    let reply = a.handle("book move with $50 from wallet", now);

    assert_eq!(reply.goto, Some(View::Payment));
    let account = a.account().unwrap();
    assert_eq!(account.wallet.balance(), Money::new(5_000));
    assert!(account.bookings.list().is_empty());
}

#[test]
fn transcript_and_cart_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let now = Utc::now();

    {
        let mut a = build(dir.path());
        sign_up(&mut a);
        a.handle("set helpers to 2", now);
        a.handle("apply promo WEEKEND15", now);
    }

    let mut a = build(dir.path());
    // Greeting + 2 user messages + 2 bot replies.
    assert_eq!(a.transcript().len(), 5);
    assert_eq!(a.config().helpers(), 2);

    // The promotion is still applied after the restart.
    // $89 + $80 = $169.00, 15% off = $25.35.
    let reply = a.handle("estimate", now);
    assert!(
        reply.text.contains("− $25.35 promo = **$143.65**"),
        "{}",
        reply.text
    );
}

#[test]
fn accounts_file_is_shared_between_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let now = Utc::now();

    {
        let mut a = build(dir.path());
        sign_up(&mut a);
        a.handle("add funds $25", now);
    }

    let mut a = build(dir.path());
    let reply = a.handle("wallet balance", now);
    assert_eq!(reply.text, "Wallet balance: $25.00. Saved cards: 0.");
}
