//! Loan policy: due dates, late fines and the currency/date formats used in
//! notifications and exports. Pure functions only; the borrow engine applies them.

use chrono::{DateTime, Duration, Utc};

/// Length of a loan, counted from the moment the borrow is requested.
pub const LOAN_PERIOD_DAYS: i64 = 14;

/// Fine charged for each started day past the due date.
pub const FINE_PER_DAY: i64 = 1000;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

pub fn due_date_for(borrow_date: DateTime<Utc>) -> DateTime<Utc> {
    borrow_date + Duration::days(LOAN_PERIOD_DAYS)
}

/// Days late, rounded up on the millisecond difference. Zero when returned on or before `due`.
pub fn days_late(due: DateTime<Utc>, returned_at: DateTime<Utc>) -> i64 {
    if returned_at <= due {
        return 0;
    }
    let late_ms = (returned_at - due).num_milliseconds();
    (late_ms + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}

pub fn fine_for(due: DateTime<Utc>, returned_at: DateTime<Utc>) -> i64 {
    days_late(due, returned_at) * FINE_PER_DAY
}

/// `2000` → `"Rp 2,000"`.
pub fn format_rupiah(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("Rp -{}", grouped)
    } else {
        format!("Rp {}", grouped)
    }
}

/// Long form used in notifications, e.g. `Mar 4, 2025`.
pub fn format_due_date(date: DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// `YYYY-MM-DD`, used by the export projection.
pub fn format_export_date(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}
