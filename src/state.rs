use sqlx::PgPool;

use crate::services::{
    BookmarkService, BorrowService, CatalogService, NotificationService, ProjectionService,
    UserService,
};

/// Services shared by all workers. Each one wraps a clone of the same pool.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub borrows: BorrowService,
    pub notifications: NotificationService,
    pub bookmarks: BookmarkService,
    pub catalog: CatalogService,
    pub users: UserService,
    pub projections: ProjectionService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self {
            borrows: BorrowService::new(pool.clone()),
            notifications: NotificationService::new(pool.clone()),
            bookmarks: BookmarkService::new(pool.clone()),
            catalog: CatalogService::new(pool.clone()),
            users: UserService::new(pool.clone()),
            projections: ProjectionService::new(pool.clone()),
            pool,
        }
    }
}
