//! Publications: admin CRUD with the publication-date transitions, and the public queries.

use crate::config::{MAX_ELEMENTS_ON_PAGE, PUBLISHED_STATE};
use crate::error::AppError;
use crate::models::{Publication, PublicationRow};
use crate::sql::{fetch_page, ListQuery, Op, Page};
use crate::validation::publications::{
    check_order_params, check_publication_fields, ApiPublicationQuery, PublicationForm, PublicationListParams,
    AUTHOR_MISSING, AUTHOR_NOT_EDITOR,
};
use sqlx::PgPool;

pub const PUBLICATION_NOT_FOUND: &str = "Publicación no encontrada";
pub const NOT_YOUR_PUBLICATION: &str = "No puedes modificar esta publicacion";

const ROW_COLUMNS: &str = "p.id, p.publication_date, p.creation_date, p.update_date, p.title, p.summary, p.content, \
     p.author_id, p.state, u.alias AS author";
const ROW_FROM: &str = "publications p JOIN users u ON u.id = p.author_id";

/// Field rules, then the author must exist and be an editor.
async fn check_create_params(pool: &PgPool, form: &PublicationForm) -> Result<i64, AppError> {
    check_publication_fields(form).map_err(AppError::invalid)?;
    let author_id = form.author().ok_or_else(|| AppError::invalid(AUTHOR_MISSING))?;
    if super::users::find_user_by_id(pool, author_id).await?.is_none() {
        return Err(AppError::invalid(AUTHOR_MISSING));
    }
    if !super::users::has_role(pool, author_id, crate::config::EDITOR_ROLE).await? {
        return Err(AppError::invalid(AUTHOR_NOT_EDITOR));
    }
    Ok(author_id)
}

/// Publication date after moving from `old_state` to `new_state`.
pub fn next_publication_date(
    old_state: Option<&str>,
    new_state: &str,
    current: Option<chrono::DateTime<chrono::Utc>>,
    now: chrono::DateTime<chrono::Utc>,
) -> Option<chrono::DateTime<chrono::Utc>> {
    let was_published = old_state == Some(PUBLISHED_STATE);
    match (was_published, new_state == PUBLISHED_STATE) {
        (false, true) => Some(now),
        (true, true) => current,
        (_, false) => None,
    }
}

pub async fn create_publication(pool: &PgPool, form: &PublicationForm) -> Result<Publication, AppError> {
    let author_id = check_create_params(pool, form).await?;
    let publication_date = next_publication_date(None, &form.state, None, chrono::Utc::now());
    let publication = sqlx::query_as::<_, Publication>(
        "INSERT INTO publications (publication_date, title, summary, content, author_id, state) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(publication_date)
    .bind(form.title.trim())
    .bind(form.summary.trim())
    .bind(&form.content)
    .bind(author_id)
    .bind(&form.state)
    .fetch_one(pool)
    .await?;
    tracing::info!(publication_id = publication.id, state = %publication.state, "publication created");
    Ok(publication)
}

async fn find_publication(pool: &PgPool, id: i64) -> Result<Publication, AppError> {
    sqlx::query_as::<_, Publication>("SELECT * FROM publications WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(PUBLICATION_NOT_FOUND.into()))
}

/// Only the author or an administrator may edit. Authors keep themselves as author.
pub async fn update_publication(
    pool: &PgPool,
    id: i64,
    form: &PublicationForm,
    editor_id: i64,
    editor_is_admin: bool,
) -> Result<Publication, AppError> {
    let current = find_publication(pool, id).await?;
    if current.author_id != editor_id && !editor_is_admin {
        return Err(AppError::Denied(NOT_YOUR_PUBLICATION.into()));
    }
    let mut form = form.clone();
    if !editor_is_admin {
        form.author_id = current.author_id.to_string();
    }
    let author_id = check_create_params(pool, &form).await?;
    let publication_date = next_publication_date(
        Some(&current.state),
        &form.state,
        current.publication_date,
        chrono::Utc::now(),
    );
    let publication = sqlx::query_as::<_, Publication>(
        "UPDATE publications SET publication_date = $2, title = $3, summary = $4, content = $5, author_id = $6, \
         state = $7, update_date = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(publication_date)
    .bind(form.title.trim())
    .bind(form.summary.trim())
    .bind(&form.content)
    .bind(author_id)
    .bind(&form.state)
    .fetch_one(pool)
    .await?;
    tracing::info!(publication_id = id, state = %publication.state, "publication updated");
    Ok(publication)
}

pub async fn get_publication(pool: &PgPool, id: i64) -> Result<PublicationRow, AppError> {
    let sql = format!("SELECT {} FROM {} WHERE p.id = $1", ROW_COLUMNS, ROW_FROM);
    sqlx::query_as::<_, PublicationRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(PUBLICATION_NOT_FOUND.into()))
}

pub async fn delete_publication(pool: &PgPool, id: i64) -> Result<(), AppError> {
    let done = sqlx::query("DELETE FROM publications WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if done.rows_affected() == 0 {
        return Err(AppError::NotFound("No se encontró la publicación".into()));
    }
    tracing::info!(publication_id = id, "publication deleted");
    Ok(())
}

fn order_column(order_by: &str) -> &'static str {
    match order_by {
        "title" => "p.title",
        "publication_date" => "p.publication_date",
        _ => "p.creation_date",
    }
}

pub async fn search_and_order_publications(
    pool: &PgPool,
    params: &PublicationListParams,
) -> Result<Page<PublicationRow>, AppError> {
    check_order_params(params).map_err(AppError::BadRequest)?;
    let mut list = ListQuery::new(ROW_COLUMNS, ROW_FROM);
    let value = Some(params.search_value.trim()).filter(|v| !v.is_empty());
    match params.search_by.as_str() {
        "title" => list = list.filter_opt("p.title", Op::LowerLike, value),
        "author_alias" => list = list.filter_opt("u.alias", Op::LowerLike, value),
        "author_id" => {
            if let Some(v) = value {
                let id: i64 = v
                    .parse()
                    .map_err(|_| AppError::BadRequest("Parámetro de búsqueda inválido".into()))?;
                list = list.filter("p.author_id", Op::Eq, id);
            }
        }
        "creation_date" => {
            list = list
                .filter_opt("p.creation_date::date", Op::Gte, params.start())
                .filter_opt("p.creation_date::date", Op::Lte, params.end());
        }
        "publication_date" => {
            list = list
                .filter_opt("p.publication_date::date", Op::Gte, params.start())
                .filter_opt("p.publication_date::date", Op::Lte, params.end());
        }
        _ => {}
    }
    let list = list.order_by(order_column(&params.order_by), params.order == "asc");
    fetch_page(pool, &list, params.page, MAX_ELEMENTS_ON_PAGE).await
}

/// Published rows for the public site, newest first.
pub async fn get_publications_api(pool: &PgPool, q: &ApiPublicationQuery) -> Result<Page<PublicationRow>, AppError> {
    if let Some(alias) = &q.author {
        if super::users::find_user_by_alias(pool, alias).await?.is_none() {
            return Err(AppError::BadRequest(AUTHOR_MISSING.into()));
        }
    }
    let list = ListQuery::new(ROW_COLUMNS, ROW_FROM)
        .condition("p.state = 'Publicado'")
        .filter_opt("LOWER(u.alias)", Op::Eq, q.author.as_ref().map(|a| a.to_lowercase()))
        .filter_opt("p.publication_date::date", Op::Gte, q.published_from)
        .filter_opt("p.publication_date::date", Op::Lte, q.published_to)
        .order_by("p.publication_date", false);
    fetch_page(pool, &list, q.page, q.per_page).await
}

/// A single publication, visible only while published.
pub async fn get_published(pool: &PgPool, id: i64) -> Result<PublicationRow, AppError> {
    let row = get_publication(pool, id).await?;
    if row.publication.state != PUBLISHED_STATE {
        return Err(AppError::NotFound(PUBLICATION_NOT_FOUND.into()));
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn publication_date_transitions() {
        let then = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        assert_eq!(next_publication_date(None, "Publicado", None, now), Some(now));
        assert_eq!(next_publication_date(None, "Borrador", None, now), None);
        assert_eq!(next_publication_date(Some("Borrador"), "Publicado", None, now), Some(now));
        assert_eq!(next_publication_date(Some("Publicado"), "Publicado", Some(then), now), Some(then));
        assert_eq!(next_publication_date(Some("Publicado"), "Archivado", Some(then), now), None);
    }

    #[test]
    fn order_columns() {
        assert_eq!(order_column("title"), "p.title");
        assert_eq!(order_column("anything"), "p.creation_date");
    }
}

#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::config::EDITOR_ROLE;
    use crate::service::fixtures;

    fn form(author_id: i64, state: &str) -> PublicationForm {
        PublicationForm {
            title: "Jornada de puertas abiertas".into(),
            summary: "Invitamos a las familias".into(),
            content: "<p>Los esperamos en el predio.</p>".into(),
            state: state.into(),
            author_id: author_id.to_string(),
        }
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "needs a Postgres server in DATABASE_URL"]
    async fn publication_date_follows_the_state(pool: PgPool) {
        fixtures::schema(&pool).await;
        let editor = fixtures::user(&pool, "editora", &[EDITOR_ROLE]).await;

        let draft = create_publication(&pool, &form(editor, "Borrador")).await.expect("create");
        assert!(draft.publication_date.is_none());

        let published = update_publication(&pool, draft.id, &form(editor, "Publicado"), editor, false)
            .await
            .expect("publish");
        let stamp = published.publication_date.expect("publication date");

        let edited = update_publication(&pool, draft.id, &form(editor, "Publicado"), editor, false)
            .await
            .expect("edit");
        assert_eq!(edited.publication_date, Some(stamp));

        let archived = update_publication(&pool, draft.id, &form(editor, "Archivado"), editor, false)
            .await
            .expect("archive");
        assert!(archived.publication_date.is_none());
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "needs a Postgres server in DATABASE_URL"]
    async fn only_the_author_or_an_admin_edits(pool: PgPool) {
        fixtures::schema(&pool).await;
        let author = fixtures::user(&pool, "editora", &[EDITOR_ROLE]).await;
        let other = fixtures::user(&pool, "editor_dos", &[EDITOR_ROLE]).await;
        let draft = create_publication(&pool, &form(author, "Borrador")).await.expect("create");

        let refused = update_publication(&pool, draft.id, &form(other, "Borrador"), other, false).await;
        assert!(matches!(refused, Err(AppError::Denied(m)) if m == NOT_YOUR_PUBLICATION));

        // a non-admin editor cannot reassign authorship
        let kept = update_publication(&pool, draft.id, &form(other, "Borrador"), author, false)
            .await
            .expect("edit");
        assert_eq!(kept.author_id, author);

        let reassigned = update_publication(&pool, draft.id, &form(other, "Borrador"), other, true)
            .await
            .expect("admin edit");
        assert_eq!(reassigned.author_id, other);
    }
}
