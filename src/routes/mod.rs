pub mod auth;
pub mod bookmarks;
pub mod books;
pub mod borrows;
pub mod health;
pub mod notifications;
pub mod users;

use actix_web::web;

/// Mounts every `/api` route. Expects `AppState` in app data.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/auth").service(auth::login))
    .service(
        web::scope("/books")
            .service(books::get_books)
            .service(books::create_book)
            .service(books::get_book)
            .service(books::update_book)
            .service(books::delete_book),
    )
    .service(
        web::scope("/users")
            .service(users::get_users)
            .service(users::create_user)
            .service(users::get_profile)
            .service(users::update_profile)
            .service(users::update_user)
            .service(users::delete_user),
    )
    .service(
        web::scope("/borrows")
            .service(borrows::request_borrow)
            .service(borrows::get_borrows)
            .service(borrows::get_my_borrows)
            .service(borrows::get_summary)
            .service(borrows::get_stats)
            .service(borrows::export_borrows)
            .service(borrows::change_status),
    )
    .service(
        web::scope("/bookmarks")
            .service(bookmarks::get_bookmarks)
            .service(bookmarks::is_bookmarked)
            .service(bookmarks::add_bookmark)
            .service(bookmarks::remove_bookmark),
    )
    .service(
        web::scope("/notifications")
            .service(notifications::get_notifications)
            .service(notifications::unread_count)
            .service(notifications::mark_all_read)
            .service(notifications::mark_read)
            .service(notifications::delete_notification),
    );
}
