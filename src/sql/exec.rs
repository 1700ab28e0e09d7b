//! Running built queries: rows, counts and pages.

use super::builder::{ListQuery, QueryBuf};
use crate::bind_params;
use crate::error::AppError;
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};

/// One page of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub pages: i64,
}

impl<T> Page<T> {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }
}

/// Number of pages for `total` rows; an empty listing still has one page.
pub fn page_count(total: i64, per_page: i64) -> i64 {
    if per_page <= 0 {
        return 1;
    }
    let full = total / per_page;
    let partial = i64::from(total % per_page != 0);
    (full + partial).max(1)
}

/// Rows skipped before `page`, or `None` when it does not fit in an `i64`.
pub fn page_offset(page: i64, per_page: i64) -> Option<i64> {
    page.checked_sub(1)?.checked_mul(per_page)
}

pub async fn fetch_all<T>(pool: &PgPool, q: &QueryBuf) -> Result<Vec<T>, AppError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let rows = bind_params!(sqlx::query_as::<_, T>(&q.sql), q.params)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn fetch_count(pool: &PgPool, q: &QueryBuf) -> Result<i64, AppError> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "count");
    let n: i64 = bind_params!(sqlx::query_scalar::<_, i64>(&q.sql), q.params)
        .fetch_one(pool)
        .await?;
    Ok(n)
}

/// A page of `list`. Pages past the end come back empty.
pub async fn fetch_page<T>(pool: &PgPool, list: &ListQuery, page: i64, per_page: i64) -> Result<Page<T>, AppError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    paginate(pool, list, page, per_page, false).await
}

/// Like [`fetch_page`], but a page past the end is moved back to the last page.
pub async fn fetch_page_clamped<T>(
    pool: &PgPool,
    list: &ListQuery,
    page: i64,
    per_page: i64,
) -> Result<Page<T>, AppError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    paginate(pool, list, page, per_page, true).await
}

async fn paginate<T>(pool: &PgPool, list: &ListQuery, page: i64, per_page: i64, clamp: bool) -> Result<Page<T>, AppError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let total = fetch_count(pool, &list.count_sql()).await?;
    let pages = page_count(total, per_page);
    let page = if clamp { page.clamp(1, pages) } else { page.max(1) };
    let offset = page_offset(page, per_page).ok_or_else(|| AppError::BadRequest("Número de página inválido".into()))?;
    let q = list.select_sql(Some(per_page), Some(offset));
    let items = fetch_all(pool, &q).await?;
    Ok(Page {
        items,
        page,
        per_page,
        total,
        pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, 9), 1);
        assert_eq!(page_count(9, 9), 1);
        assert_eq!(page_count(10, 9), 2);
        assert_eq!(page_count(1, i64::MAX), 1);
        assert_eq!(page_count(i64::MAX, 1), i64::MAX);
    }

    #[test]
    fn huge_pages_do_not_overflow() {
        assert_eq!(page_offset(3, 9), Some(18));
        assert_eq!(page_offset(1, i64::MAX), Some(0));
        assert_eq!(page_offset(i64::MAX, 10), None);
        assert_eq!(page_offset(2, i64::MAX), Some(i64::MAX));
    }

    #[test]
    fn prev_next() {
        let p: Page<()> = Page {
            items: vec![],
            page: 2,
            per_page: 9,
            total: 20,
            pages: 3,
        };
        assert!(p.has_prev());
        assert!(p.has_next());
    }
}
