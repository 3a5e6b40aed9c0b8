//! Canned reply text and small formatting helpers.
//!
//! Replies use chat markdown: `**bold**` and `•` bullets, rendered by
//! whatever front end hosts the assistant.

use engine::Money;
use uuid::Uuid;

pub(crate) const GREETING: &str = "Hi! I'm your DormDash AI assistant. I can help you with:\n\
• Planning your move and estimating costs\n\
• Choosing the right vehicle size\n\
• Creating packing checklists\n\
• Understanding pricing and policies\n\
• Scheduling and rescheduling moves\n\n\
What would you like help with today?";

pub(crate) const VEHICLE_GUIDANCE: &str = "Rule of thumb:\n\
• Dorm room / studio → Pickup Truck\n\
• 1-bedroom with furniture → Van or Semi-light\n\
• Larger than that → Semi-light\n\
Tell me: **set vehicle pickup truck**, **set vehicle van**, or **set vehicle semi-light**.";

pub(crate) const PACKING_CHECKLIST: &str = "Starter checklist:\n\
• Small/Medium/Large boxes\n\
• Packing tape, bubble wrap\n\
• Mattress bag (if moving a mattress)\n\
• Furniture pads or blankets\n\
• Labels & marker\n\
Say things like **add 3 boxes**, **add 2 tape**, or **clear supplies**.";

pub(crate) const FALLBACK: &str = "I can help with estimates, vehicle size, supplies, helpers, \
promos, wallet funds, saved places, and bookings.\n\
Try: **apply promo NEWSTUDENT25**, **add 3 boxes**, **set helpers to 2**, \
**set vehicle pickup truck**, **book move**.";

pub(crate) const FAQ_HOURS: &str = "DormDash operates 7am–9pm daily.";
pub(crate) const FAQ_RESCHEDULE: &str =
    "Reschedule from Bookings → select your move → Reschedule.";
pub(crate) const FAQ_CANCEL_POLICY: &str =
    "You can cancel from Bookings; fees may apply close to move time.";

/// Formats an amount as whole dollars, rounding half-up ($174).
pub(crate) fn format_whole(amount: Money) -> String {
    let cents = amount.cents();
    let sign = if cents < 0 { "-" } else { "" };
    let dollars = (cents.abs() + 50) / 100;
    format!("{sign}${dollars}")
}

/// Six-character id prefix shown in booking summaries.
pub(crate) fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..6].to_string()
}
