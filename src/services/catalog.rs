use sqlx::PgPool;

use super::{like_pattern, validate_input};
use crate::error::ServiceError;
use crate::models::{Book, BookInput, BookQuery, Caller};

const BOOK_COLUMNS: &str = "book_id, name, author, publisher, description, category, \
                            year_published, stock, image, created_at";

/// Catalog browsing for everyone, editing for admins.
#[derive(Clone)]
pub struct CatalogService {
    pool: PgPool,
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Books newest first, optionally narrowed by a name/author search and a category.
    pub async fn list(&self, query: &BookQuery) -> Result<Vec<Book>, ServiceError> {
        let mut sql = format!("SELECT {} FROM books", BOOK_COLUMNS);
        let mut conditions: Vec<String> = Vec::new();
        let mut param_count = 1;

        if query.search.is_some() {
            conditions.push(format!(
                "(name ILIKE ${0} ESCAPE '\\' OR author ILIKE ${0} ESCAPE '\\')",
                param_count
            ));
            param_count += 1;
        }
        if query.category.is_some() {
            conditions.push(format!("category = ${}", param_count));
        }

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY book_id DESC");

        let mut query_builder = sqlx::query_as::<_, Book>(&sql);
        if let Some(search) = &query.search {
            query_builder = query_builder.bind(like_pattern(search));
        }
        if let Some(category) = query.category {
            query_builder = query_builder.bind(category);
        }

        let books = query_builder.fetch_all(&self.pool).await?;
        Ok(books)
    }

    pub async fn get(&self, book_id: i32) -> Result<Book, ServiceError> {
        sqlx::query_as::<_, Book>(&format!("SELECT {} FROM books WHERE book_id = $1", BOOK_COLUMNS))
            .bind(book_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ServiceError::NotFound("Book"))
    }

    pub async fn create(&self, caller: &Caller, input: &BookInput) -> Result<Book, ServiceError> {
        caller.require_admin()?;
        validate_input(input)?;

        let book = sqlx::query_as::<_, Book>(&format!(
            "INSERT INTO books (name, author, publisher, description, category, year_published, stock, image)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {}",
            BOOK_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.author)
        .bind(&input.publisher)
        .bind(&input.description)
        .bind(input.category)
        .bind(&input.year_published)
        .bind(input.stock)
        .bind(&input.image)
        .fetch_one(&self.pool)
        .await?;

        log::info!("book {} added to catalog by admin {}", book.book_id, caller.user_id);
        Ok(book)
    }

    /// Replaces a book's editable fields. Setting `stock` here is the admin override
    /// outside the borrow lifecycle.
    pub async fn update(
        &self,
        caller: &Caller,
        book_id: i32,
        input: &BookInput,
    ) -> Result<Book, ServiceError> {
        caller.require_admin()?;
        validate_input(input)?;

        sqlx::query_as::<_, Book>(&format!(
            "UPDATE books
             SET name = $1, author = $2, publisher = $3, description = $4, category = $5,
                 year_published = $6, stock = $7, image = $8
             WHERE book_id = $9
             RETURNING {}",
            BOOK_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.author)
        .bind(&input.publisher)
        .bind(&input.description)
        .bind(input.category)
        .bind(&input.year_published)
        .bind(input.stock)
        .bind(&input.image)
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ServiceError::NotFound("Book"))
    }

    pub async fn delete(&self, caller: &Caller, book_id: i32) -> Result<(), ServiceError> {
        caller.require_admin()?;

        let result = sqlx::query("DELETE FROM books WHERE book_id = $1")
            .bind(book_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound("Book"));
        }
        log::info!("book {} removed from catalog by admin {}", book_id, caller.user_id);
        Ok(())
    }
}
