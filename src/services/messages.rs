//! Notification texts emitted by the borrow lifecycle and bookmarks.

use chrono::{DateTime, Utc};

use super::policy::{format_due_date, format_rupiah};

pub fn borrow_pending(book: &str) -> String {
    format!("Your borrow request for \"{}\" is pending approval.", book)
}

pub fn admin_new_request(username: &str, book: &str) -> String {
    format!(
        "📚 New borrow request: {} wants to borrow \"{}\"",
        username, book
    )
}

pub fn borrow_rejected(book: &str) -> String {
    format!("Your borrow request for \"{}\" has been rejected.", book)
}

pub fn admin_rejected(username: &str, book: &str) -> String {
    format!(
        "Borrow rejected: {}'s request for \"{}\" was rejected",
        username, book
    )
}

pub fn borrow_approved(book: &str, due: DateTime<Utc>) -> String {
    format!(
        "Your borrow request for \"{}\" has been approved! Due date: {}",
        book,
        format_due_date(due)
    )
}

pub fn admin_approved(username: &str, book: &str) -> String {
    format!(
        "Borrow approved: {}'s request for \"{}\" was approved",
        username, book
    )
}

pub fn borrow_closed_with_fine(book: &str, fine: i64) -> String {
    format!(
        "Your borrow for \"{}\" is closed. Fine: {} for late return.",
        book,
        format_rupiah(fine)
    )
}

pub fn borrow_closed_on_time(book: &str) -> String {
    format!(
        "Your borrow for \"{}\" has been closed. Thank you for returning on time!",
        book
    )
}

pub fn admin_returned(username: &str, book: &str, fine: i64) -> String {
    if fine > 0 {
        format!(
            "Book returned: {} returned \"{}\" (Fine: {})",
            username,
            book,
            format_rupiah(fine)
        )
    } else {
        format!("Book returned: {} returned \"{}\"", username, book)
    }
}

pub fn bookmark_added(book: &str) -> String {
    format!("\"{}\" has been added to your bookmarks.", book)
}
