pub mod book;
pub mod bookmark;
pub mod borrow;
pub mod notification;
pub mod user;

pub use book::{Book, BookInput, BookQuery, Category};
pub use bookmark::BookmarkedBook;
pub use borrow::{
    AdminBorrowQuery, AdminBorrowRow, Borrow, BorrowRequest, BorrowStatus, BorrowSummary,
    ExportRow, StatusChange, StatusUpdate, Transition, UserBorrowRow, UserStats,
};
pub use notification::{Notification, NotificationKind};
pub use user::{Caller, ProfileInput, Role, User, UserInput, UserUpdateInput};
