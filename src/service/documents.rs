//! Files and links attached to employees, riders and horses. One implementation serves the
//! three document tables; [`DocumentOwner`] picks the table and the rules that differ.

use crate::config::MAX_ELEMENTS_ON_PAGE;
use crate::error::AppError;
use crate::models::{Document, DocumentFormat, DocumentOwner};
use crate::sql::{fetch_page, ListQuery, Op, Page};
use crate::storage::{object_name, ObjectStore};
use crate::validation::documents::{check_link, check_modify, check_upload, UploadedFile};
use crate::validation::fields::file_extension;
use crate::validation::team::check_document_title;
use serde::Deserialize;
use sqlx::PgPool;
use std::future::Future;

pub const DOCUMENT_NOT_FOUND: &str = "Documento no encontrado";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DocumentListParams {
    pub page: Option<i64>,
    pub title: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub order: String,
}

/// Title, type and (for links) the new URL.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct DocumentForm {
    pub title: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub url: String,
}

/// What a download resolves to.
#[derive(Debug)]
pub enum Download {
    File {
        filename: String,
        content_type: &'static str,
        bytes: Vec<u8>,
    },
    Link(String),
}

fn columns(owner: DocumentOwner) -> &'static str {
    match owner {
        DocumentOwner::Employee => "id, title, type, format, source, created_at, updated_at, employee_id AS owner_id",
        DocumentOwner::Rider => "id, title, type, format, source, created_at, updated_at, rider_id AS owner_id",
        DocumentOwner::Horse => "id, title, type, format, source, created_at, updated_at, horse_id AS owner_id",
    }
}

fn owner_condition(owner: DocumentOwner) -> &'static str {
    match owner {
        DocumentOwner::Employee => "employee_id = $?",
        DocumentOwner::Rider => "rider_id = $?",
        DocumentOwner::Horse => "horse_id = $?",
    }
}

/// Orders accepted per owner, mapped to (column, ascending).
fn order_for(owner: DocumentOwner, order: &str) -> Option<(&'static str, bool)> {
    match (owner, order) {
        (DocumentOwner::Employee, "") => Some(("created_at", false)),
        (DocumentOwner::Rider, "" | "mas_recientes") => Some(("created_at", false)),
        (DocumentOwner::Rider, "mas_viejos") => Some(("created_at", true)),
        (DocumentOwner::Rider, "nombre_asc") => Some(("title", true)),
        (DocumentOwner::Rider, "nombre_desc") => Some(("title", false)),
        (DocumentOwner::Horse, "" | "newer") => Some(("created_at", false)),
        (DocumentOwner::Horse, "older") => Some(("created_at", true)),
        (DocumentOwner::Horse, "titleA-Z") => Some(("title", true)),
        (DocumentOwner::Horse, "titleZ-A") => Some(("title", false)),
        _ => None,
    }
}

fn missing_owner(owner: DocumentOwner) -> AppError {
    match owner {
        DocumentOwner::Rider => AppError::RiderNotFound,
        other => AppError::NotFound(other.not_found().into()),
    }
}

pub async fn ensure_owner(pool: &PgPool, owner: DocumentOwner, owner_id: i64) -> Result<(), AppError> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", owner.owner_table());
    let exists: bool = sqlx::query_scalar(&sql).bind(owner_id).fetch_one(pool).await?;
    if exists {
        Ok(())
    } else {
        Err(missing_owner(owner))
    }
}

pub async fn list(
    pool: &PgPool,
    owner: DocumentOwner,
    owner_id: i64,
    params: &DocumentListParams,
) -> Result<Page<Document>, AppError> {
    ensure_owner(pool, owner, owner_id).await?;
    let (column, ascending) =
        order_for(owner, &params.order).ok_or_else(|| AppError::BadRequest("Orden no válido".into()))?;
    let page = params.page.unwrap_or(1);
    if page < 1 {
        return Err(AppError::BadRequest("Número de página inválido".into()));
    }
    let mut query = ListQuery::new(columns(owner), owner.table()).condition_with(owner_condition(owner), owner_id);
    if !params.title.trim().is_empty() {
        query = query.filter("title", Op::ILike, params.title.trim());
    }
    if !params.doc_type.is_empty() {
        if let Some(types) = owner.types() {
            if !types.contains(&params.doc_type.as_str()) {
                return Err(AppError::BadRequest("Tipo de documento no válido".into()));
            }
        }
        query = query.filter("type", Op::Eq, params.doc_type.as_str());
    }
    let query = query.order_by(column, ascending);
    fetch_page(pool, &query, page, MAX_ELEMENTS_ON_PAGE).await
}

pub async fn get(pool: &PgPool, owner: DocumentOwner, owner_id: i64, id: i64) -> Result<Document, AppError> {
    let sql = format!(
        "SELECT {} FROM {} WHERE id = $1 AND {} = $2",
        columns(owner),
        owner.table(),
        owner.owner_column()
    );
    sqlx::query_as::<_, Document>(&sql)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(DOCUMENT_NOT_FOUND.into()))
}

async fn insert(
    pool: &PgPool,
    owner: DocumentOwner,
    owner_id: i64,
    title: &str,
    doc_type: &str,
    format: DocumentFormat,
    source: &str,
) -> Result<Document, AppError> {
    let sql = format!(
        "INSERT INTO {} (title, type, format, source, {}) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
        owner.table(),
        owner.owner_column(),
        columns(owner)
    );
    let doc = sqlx::query_as::<_, Document>(&sql)
        .bind(title)
        .bind(doc_type)
        .bind(format.as_str())
        .bind(source)
        .bind(owner_id)
        .fetch_one(pool)
        .await?;
    tracing::info!(table = owner.table(), owner_id, document_id = doc.id, format = format.as_str(), "document added");
    Ok(doc)
}

fn type_or_default(owner: DocumentOwner, doc_type: &str) -> String {
    match owner.types() {
        None => owner.default_type().to_string(),
        Some(_) => doc_type.to_string(),
    }
}

/// Stores the file in the bucket and records it.
pub async fn upload(
    pool: &PgPool,
    store: &dyn ObjectStore,
    owner: DocumentOwner,
    owner_id: i64,
    title: &str,
    doc_type: &str,
    file: Option<UploadedFile>,
) -> Result<Document, AppError> {
    ensure_owner(pool, owner, owner_id).await?;
    AppError::check(check_upload(file.as_ref(), title, doc_type, owner.types()))?;
    let Some(file) = file else {
        return Err(AppError::invalid("Debe seleccionar un archivo"));
    };
    let name = object_name(&file.filename);
    let doc_type = type_or_default(owner, doc_type);
    let record = insert(pool, owner, owner_id, title.trim(), &doc_type, DocumentFormat::File, &name);
    put_then_record(store, &name, file, record).await
}

/// Puts the object, then awaits `record`. A failed `record` removes the object again.
async fn put_then_record<T, F>(store: &dyn ObjectStore, name: &str, file: UploadedFile, record: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    store.put(name, file.bytes, &file.content_type).await?;
    match record.await {
        Ok(value) => Ok(value),
        Err(e) => {
            if let Err(cleanup) = store.delete(name).await {
                tracing::warn!(object = %name, error = %cleanup, "orphan object left in storage");
            }
            Err(e)
        }
    }
}

pub async fn add_link(
    pool: &PgPool,
    owner: DocumentOwner,
    owner_id: i64,
    title: &str,
    url: &str,
    doc_type: &str,
) -> Result<Document, AppError> {
    ensure_owner(pool, owner, owner_id).await?;
    AppError::check(check_link(title, url, doc_type, owner.types()))?;
    let doc_type = type_or_default(owner, doc_type);
    insert(pool, owner, owner_id, title.trim(), &doc_type, DocumentFormat::Link, url.trim()).await
}

fn content_type_for(filename: &str) -> &'static str {
    match file_extension(filename).as_deref() {
        Some(".pdf") => "application/pdf",
        Some(".doc") => "application/msword",
        Some(".docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some(".xls") => "application/vnd.ms-excel",
        Some(".xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some(".jpeg" | ".jpg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// Download name: the title plus the extension of the stored object.
pub fn download_name(title: &str, source: &str) -> String {
    match file_extension(source) {
        Some(ext) if !title.to_lowercase().ends_with(&ext) => format!("{}{}", title, ext),
        _ => title.to_string(),
    }
}

pub async fn download(
    pool: &PgPool,
    store: &dyn ObjectStore,
    owner: DocumentOwner,
    owner_id: i64,
    id: i64,
) -> Result<Download, AppError> {
    let doc = get(pool, owner, owner_id, id).await?;
    if !doc.is_file() {
        return Ok(Download::Link(doc.source));
    }
    let bytes = store.get(&doc.source).await?;
    Ok(Download::File {
        filename: download_name(&doc.title, &doc.source),
        content_type: content_type_for(&doc.source),
        bytes,
    })
}

/// Edits the title and type, and the URL of link documents. Employee documents only
/// take a new title.
pub async fn modify(
    pool: &PgPool,
    owner: DocumentOwner,
    owner_id: i64,
    id: i64,
    form: &DocumentForm,
) -> Result<Document, AppError> {
    ensure_owner(pool, owner, owner_id).await?;
    let doc = get(pool, owner, owner_id, id).await?;
    let title = form.title.trim();
    let url = (!doc.is_file()).then(|| form.url.trim()).filter(|u| !u.is_empty());
    let messages = match owner {
        DocumentOwner::Employee => check_document_title(title),
        _ => check_modify(title, &form.doc_type, url, owner.types()),
    };
    AppError::check(messages)?;
    let doc_type = if owner.types().is_some() {
        form.doc_type.clone()
    } else {
        doc.doc_type.clone()
    };
    let source = url.map(str::to_string).unwrap_or_else(|| doc.source.clone());
    let sql = format!(
        "UPDATE {} SET title = $1, type = $2, source = $3, updated_at = NOW() WHERE id = $4 RETURNING {}",
        owner.table(),
        columns(owner)
    );
    let updated = sqlx::query_as::<_, Document>(&sql)
        .bind(title)
        .bind(&doc_type)
        .bind(&source)
        .bind(id)
        .fetch_one(pool)
        .await?;
    tracing::info!(table = owner.table(), document_id = id, "document modified");
    Ok(updated)
}

/// Deletes the row and, for files, the stored object.
pub async fn delete(
    pool: &PgPool,
    store: &dyn ObjectStore,
    owner: DocumentOwner,
    owner_id: i64,
    id: i64,
) -> Result<(), AppError> {
    let doc = get(pool, owner, owner_id, id).await?;
    if doc.is_file() {
        store.delete(&doc.source).await?;
    }
    let sql = format!("DELETE FROM {} WHERE id = $1", owner.table());
    sqlx::query(&sql).bind(id).execute(pool).await?;
    tracing::info!(table = owner.table(), document_id = id, "document deleted");
    Ok(())
}

/// Object names of the file documents of `owner_id`.
pub async fn stored_files(pool: &PgPool, owner: DocumentOwner, owner_id: i64) -> Result<Vec<String>, AppError> {
    let sql = format!(
        "SELECT source FROM {} WHERE {} = $1 AND format = 'file'",
        owner.table(),
        owner.owner_column()
    );
    Ok(sqlx::query_scalar(&sql).bind(owner_id).fetch_all(pool).await?)
}

/// Deletes `sources` from the bucket once their rows are gone. Failures are logged and
/// skipped; returns how many objects were removed.
pub async fn remove_objects(store: &dyn ObjectStore, sources: &[String]) -> usize {
    let mut removed = 0;
    for source in sources {
        match store.delete(source).await {
            Ok(()) => removed += 1,
            Err(e) => tracing::warn!(object = %source, error = %e, "could not remove stored object"),
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn orders_depend_on_owner() {
        assert_eq!(order_for(DocumentOwner::Rider, "nombre_desc"), Some(("title", false)));
        assert_eq!(order_for(DocumentOwner::Horse, "titleA-Z"), Some(("title", true)));
        assert_eq!(order_for(DocumentOwner::Horse, "nombre_asc"), None);
        assert_eq!(order_for(DocumentOwner::Employee, ""), Some(("created_at", false)));
    }

    #[test]
    fn download_name_keeps_extension() {
        assert_eq!(download_name("Informe", "3f2a-informe.PDF"), "Informe.pdf");
        assert_eq!(download_name("informe.pdf", "3f2a-informe.pdf"), "informe.pdf");
        assert!(content_type_for("x.docx").ends_with("document"));
    }

    #[test]
    fn employee_documents_use_fixed_type() {
        assert_eq!(type_or_default(DocumentOwner::Employee, "cualquiera"), "Archivo");
        assert_eq!(type_or_default(DocumentOwner::Rider, "evaluacion"), "evaluacion");
    }

    fn pdf(name: &str) -> UploadedFile {
        UploadedFile {
            filename: name.into(),
            content_type: "application/pdf".into(),
            bytes: vec![0x25, 0x50, 0x44, 0x46],
        }
    }

    #[tokio::test]
    async fn failed_record_removes_the_object() {
        let store = MemoryStore::new();
        let failed: Result<i64, AppError> = put_then_record(&store, "a-informe.pdf", pdf("informe.pdf"), async {
            Err(AppError::Db(sqlx::Error::PoolTimedOut))
        })
        .await;
        assert!(matches!(failed, Err(AppError::Db(sqlx::Error::PoolTimedOut))));
        assert!(!store.contains("a-informe.pdf"));

        let kept = put_then_record(&store, "b-informe.pdf", pdf("informe.pdf"), async { Ok(7) }).await;
        assert_eq!(kept.ok(), Some(7));
        assert!(store.contains("b-informe.pdf"));
    }

    /// Refuses every delete.
    struct StuckStore;

    #[async_trait::async_trait]
    impl ObjectStore for StuckStore {
        async fn put(&self, _: &str, _: Vec<u8>, _: &str) -> Result<(), AppError> {
            Ok(())
        }
        async fn get(&self, name: &str) -> Result<Vec<u8>, AppError> {
            Err(AppError::Storage(name.to_string()))
        }
        async fn delete(&self, name: &str) -> Result<(), AppError> {
            Err(AppError::Storage(name.to_string()))
        }
    }

    #[tokio::test]
    async fn object_removal_is_best_effort() {
        let store = MemoryStore::new();
        store.put("a-uno.pdf", vec![1], "application/pdf").await.unwrap();
        store.put("b-dos.pdf", vec![2], "application/pdf").await.unwrap();
        let sources = vec!["a-uno.pdf".to_string(), "b-dos.pdf".to_string()];
        assert_eq!(remove_objects(&store, &sources).await, 2);
        assert!(!store.contains("a-uno.pdf"));
        assert_eq!(remove_objects(&StuckStore, &sources).await, 0);
    }
}
