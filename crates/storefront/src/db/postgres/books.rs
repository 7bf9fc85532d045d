//! Book queries, including search predicate rendering.

use sqlx::{PgConnection, Postgres, QueryBuilder};
use tracing::instrument;

use bookstore_core::{BookId, BookPredicate, CategoryId};

use super::{BOOK_SELECT, BookRow, PgStore, fetch_book};
use crate::db::{BookRepository, Page, RepositoryError, conflict_on_unique};
use crate::models::{Book, NewBook};

/// Append `predicate` as a SQL boolean expression.
///
/// Column names come from `BookField::key`, a closed set; values are always
/// bound parameters.
fn push_predicate(qb: &mut QueryBuilder<'_, Postgres>, predicate: &BookPredicate) {
    match predicate {
        BookPredicate::All => {
            qb.push("TRUE");
        }
        BookPredicate::AnyOf { field, values } => {
            qb.push("b.")
                .push(field.key())
                .push(" = ANY(")
                .push_bind(values.clone())
                .push(")");
        }
        BookPredicate::And(parts) if parts.is_empty() => {
            qb.push("TRUE");
        }
        BookPredicate::And(parts) => {
            qb.push("(");
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    qb.push(" AND ");
                }
                push_predicate(qb, part);
            }
            qb.push(")");
        }
    }
}

/// Book query filtered by `filter`, grouped, ordered by id and paginated.
fn book_query<'a>(
    filter: impl FnOnce(&mut QueryBuilder<'a, Postgres>),
    page: Page,
) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new(BOOK_SELECT);
    qb.push(" AND ");
    filter(&mut qb);
    qb.push(" GROUP BY b.id ORDER BY b.id LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    qb
}

/// Link a book to every live category among `category_ids`.
async fn link_categories(
    conn: &mut PgConnection,
    book: BookId,
    category_ids: &[i64],
) -> Result<(), RepositoryError> {
    if category_ids.is_empty() {
        return Ok(());
    }

    // Using runtime query to avoid SQLx offline mode cache requirements
    sqlx::query(
        r"
        INSERT INTO bookstore.book_category (book_id, category_id)
        SELECT $1, c.id
        FROM bookstore.category c
        WHERE c.id = ANY($2) AND NOT c.is_deleted
        ",
    )
    .bind(book)
    .bind(category_ids)
    .execute(conn)
    .await?;

    Ok(())
}

fn category_ids(book: &NewBook) -> Vec<i64> {
    book.category_ids.iter().map(CategoryId::as_i64).collect()
}

impl BookRepository for PgStore {
    #[instrument(skip(self))]
    async fn find_book(&self, id: BookId) -> Result<Option<Book>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        fetch_book(&mut conn, id).await
    }

    #[instrument(skip(self))]
    async fn list_books(&self, page: Page) -> Result<Vec<Book>, RepositoryError> {
        let rows = book_query(
            |qb| {
                qb.push("TRUE");
            },
            page,
        )
        .build_query_as::<BookRow>()
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    #[instrument(skip(self))]
    async fn search_books(
        &self,
        predicate: &BookPredicate,
        page: Page,
    ) -> Result<Vec<Book>, RepositoryError> {
        let rows = book_query(|qb| push_predicate(qb, predicate), page)
            .build_query_as::<BookRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    #[instrument(skip(self))]
    async fn books_by_category(
        &self,
        category: CategoryId,
        page: Page,
    ) -> Result<Vec<Book>, RepositoryError> {
        let rows = book_query(
            |qb| {
                qb.push(
                    "EXISTS (SELECT 1 FROM bookstore.book_category f \
                     WHERE f.book_id = b.id AND f.category_id = ",
                )
                .push_bind(category)
                .push(")");
            },
            page,
        )
        .build_query_as::<BookRow>()
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    #[instrument(skip(self, book), fields(isbn = %book.isbn))]
    async fn insert_book(&self, book: &NewBook) -> Result<Book, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Using runtime query to avoid SQLx offline mode cache requirements
        let id: BookId = sqlx::query_scalar(
            r"
            INSERT INTO bookstore.book (title, author, isbn, price, description, cover_image)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.price)
        .bind(&book.description)
        .bind(&book.cover_image)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "isbn"))?;

        link_categories(&mut tx, id, &category_ids(book)).await?;
        let saved = fetch_book(&mut tx, id)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        Ok(saved)
    }

    #[instrument(skip(self, book))]
    async fn update_book(&self, id: BookId, book: &NewBook) -> Result<Option<Book>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Using runtime query to avoid SQLx offline mode cache requirements
        let updated = sqlx::query(
            r"
            UPDATE bookstore.book
            SET title = $2, author = $3, isbn = $4, price = $5,
                description = $6, cover_image = $7
            WHERE id = $1 AND NOT is_deleted
            ",
        )
        .bind(id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.price)
        .bind(&book.description)
        .bind(&book.cover_image)
        .execute(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "isbn"))?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        // Using runtime query to avoid SQLx offline mode cache requirements
        sqlx::query("DELETE FROM bookstore.book_category WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        link_categories(&mut tx, id, &category_ids(book)).await?;

        let saved = fetch_book(&mut tx, id).await?;
        tx.commit().await?;
        Ok(saved)
    }

    #[instrument(skip(self))]
    async fn delete_book(&self, id: BookId) -> Result<bool, RepositoryError> {
        // Using runtime query to avoid SQLx offline mode cache requirements
        let result = sqlx::query(
            "UPDATE bookstore.book SET is_deleted = TRUE WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use bookstore_core::BookField;

    use super::*;

    fn render(predicate: &BookPredicate) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("");
        push_predicate(&mut qb, predicate);
        qb.sql().to_owned()
    }

    #[test]
    fn test_all_renders_true() {
        assert_eq!(render(&BookPredicate::All), "TRUE");
    }

    #[test]
    fn test_any_of_binds_values() {
        let p = BookPredicate::any_of(BookField::Author, ["Bloch", "Martin"]);
        assert_eq!(render(&p), "b.author = ANY($1)");
    }

    #[test]
    fn test_and_joins_in_order() {
        let p = BookPredicate::any_of(BookField::Title, ["Dune"])
            .and(BookPredicate::any_of(BookField::Isbn, ["42"]));
        assert_eq!(render(&p), "(b.title = ANY($1) AND b.isbn = ANY($2))");
    }

    #[test]
    fn test_page_is_bound_after_filter() {
        let p = BookPredicate::any_of(BookField::Title, ["Dune"]);
        let qb = book_query(|qb| push_predicate(qb, &p), Page::new(1, 10));
        let sql = qb.sql();
        assert!(sql.contains("AND b.title = ANY($1) GROUP BY b.id ORDER BY b.id LIMIT $2 OFFSET $3"));
    }
}
