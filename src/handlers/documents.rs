//! Document endpoints shared by employees, riders and horses. The owner comes from the
//! matched route prefix, so the same handlers serve `/employees/:id/documents`,
//! `/riders/:id/documents` and `/horses/:id/documents`.

use crate::error::AppError;
use crate::extractors::{CurrentUser, JsonBody};
use crate::models::DocumentOwner;
use crate::response::{created_with_message, success_one_ok, success_page, with_message};
use crate::service::documents::{self, Download, DocumentForm, DocumentListParams};
use crate::state::AppState;
use crate::validation::documents::UploadedFile;
use async_trait::async_trait;
use axum::extract::{FromRequestParts, MatchedPath, Multipart, Path, Query, State};
use axum::http::{header, request::Parts};
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;

/// Which document table a request addresses.
#[derive(Debug, Clone, Copy)]
pub struct Owner(pub DocumentOwner);

pub fn owner_for_path(path: &str) -> Option<DocumentOwner> {
    let first = path.trim_start_matches('/').split('/').next()?;
    match first {
        "employees" => Some(DocumentOwner::Employee),
        "riders" => Some(DocumentOwner::Rider),
        "horses" => Some(DocumentOwner::Horse),
        _ => None,
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Owner {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<MatchedPath>()
            .and_then(|p| owner_for_path(p.as_str()))
            .map(Owner)
            .ok_or_else(|| AppError::Internal("document route without owner".into()))
    }
}

#[derive(Clone, Copy)]
enum Access {
    Read,
    Write,
    Remove,
}

fn authorize(user: &CurrentUser, owner: DocumentOwner, access: Access) -> Result<(), AppError> {
    let prefix = match owner {
        DocumentOwner::Employee => return user.require_admin(),
        DocumentOwner::Rider => "rider",
        DocumentOwner::Horse => "horse",
    };
    let action = match access {
        Access::Read => "show",
        Access::Write => "update",
        Access::Remove => "destroy",
    };
    user.require(&format!("{}_{}", prefix, action))
}

/// GET /{owner}/:id/documents
pub async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
    Owner(owner): Owner,
    Path(owner_id): Path<i64>,
    Query(params): Query<DocumentListParams>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&user, owner, Access::Read)?;
    Ok(success_page(documents::list(&state.pool, owner, owner_id, &params).await?))
}

/// GET /{owner}/:id/documents/:doc_id
pub async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    Owner(owner): Owner,
    Path((owner_id, id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&user, owner, Access::Read)?;
    Ok(success_one_ok(documents::get(&state.pool, owner, owner_id, id).await?))
}

struct UploadParts {
    title: String,
    doc_type: String,
    file: Option<UploadedFile>,
}

async fn read_upload(mut multipart: Multipart) -> Result<UploadParts, AppError> {
    let bad = |e: axum::extract::multipart::MultipartError| {
        tracing::debug!(error = %e, "malformed multipart body");
        AppError::BadRequest("El formulario enviado no es válido".into())
    };
    let mut upload = UploadParts {
        title: String::new(),
        doc_type: String::new(),
        file: None,
    };
    while let Some(field) = multipart.next_field().await.map_err(bad)? {
        match field.name().unwrap_or_default() {
            "title" => upload.title = field.text().await.map_err(bad)?,
            "type" => upload.doc_type = field.text().await.map_err(bad)?,
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(bad)?.to_vec();
                if !filename.is_empty() || !bytes.is_empty() {
                    upload.file = Some(UploadedFile {
                        filename,
                        content_type,
                        bytes,
                    });
                }
            }
            _ => {}
        }
    }
    Ok(upload)
}

/// POST /{owner}/:id/documents (multipart: title, type, file)
pub async fn upload(
    State(state): State<AppState>,
    user: CurrentUser,
    Owner(owner): Owner,
    Path(owner_id): Path<i64>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    authorize(&user, owner, Access::Write)?;
    let form = read_upload(multipart).await?;
    let doc = documents::upload(
        &state.pool,
        state.storage.as_ref(),
        owner,
        owner_id,
        &form.title,
        &form.doc_type,
        form.file,
    )
    .await?;
    Ok(created_with_message(doc, "Se ha subido el archivo correctamente"))
}

/// POST /{owner}/:id/links
pub async fn add_link(
    State(state): State<AppState>,
    user: CurrentUser,
    Owner(owner): Owner,
    Path(owner_id): Path<i64>,
    JsonBody(form): JsonBody<DocumentForm>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&user, owner, Access::Write)?;
    let doc = documents::add_link(&state.pool, owner, owner_id, &form.title, &form.url, &form.doc_type).await?;
    Ok(created_with_message(doc, "Se ha subido el enlace correctamente"))
}

/// PUT /{owner}/:id/documents/:doc_id
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Owner(owner): Owner,
    Path((owner_id, id)): Path<(i64, i64)>,
    JsonBody(form): JsonBody<DocumentForm>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&user, owner, Access::Write)?;
    let doc = documents::modify(&state.pool, owner, owner_id, id, &form).await?;
    Ok(with_message(doc, "Se ha modificado el documento correctamente"))
}

/// DELETE /{owner}/:id/documents/:doc_id
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Owner(owner): Owner,
    Path((owner_id, id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&user, owner, Access::Remove)?;
    documents::delete(&state.pool, state.storage.as_ref(), owner, owner_id, id).await?;
    Ok(with_message(serde_json::json!({ "id": id }), "Documento eliminado exitosamente"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DownloadParams {
    /// Serve inline instead of as an attachment.
    pub inline: bool,
}

/// GET /{owner}/:id/documents/:doc_id/download. Links redirect to their URL.
pub async fn download(
    State(state): State<AppState>,
    user: CurrentUser,
    Owner(owner): Owner,
    Path((owner_id, id)): Path<(i64, i64)>,
    Query(params): Query<DownloadParams>,
) -> Result<Response, AppError> {
    authorize(&user, owner, Access::Read)?;
    match documents::download(&state.pool, state.storage.as_ref(), owner, owner_id, id).await? {
        Download::Link(url) => Ok(Redirect::temporary(&url).into_response()),
        Download::File {
            filename,
            content_type,
            bytes,
        } => {
            let disposition = content_disposition(&filename, params.inline);
            Ok((
                [
                    (header::CONTENT_TYPE, content_type.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            )
                .into_response())
        }
    }
}

fn content_disposition(filename: &str, inline: bool) -> String {
    let safe: String = filename
        .chars()
        .map(|c| if c == '"' || c.is_control() || !c.is_ascii() { '_' } else { c })
        .collect();
    let kind = if inline { "inline" } else { "attachment" };
    format!("{}; filename=\"{}\"", kind, safe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_comes_from_route_prefix() {
        assert!(matches!(owner_for_path("/employees/:id/documents"), Some(DocumentOwner::Employee)));
        assert!(matches!(owner_for_path("/riders/:id/links"), Some(DocumentOwner::Rider)));
        assert!(matches!(owner_for_path("/horses/:id/documents/:doc_id"), Some(DocumentOwner::Horse)));
        assert!(owner_for_path("/charges/:id").is_none());
    }

    #[test]
    fn disposition_escapes_quotes_and_non_ascii() {
        assert_eq!(content_disposition("informe.pdf", false), "attachment; filename=\"informe.pdf\"");
        assert_eq!(content_disposition("a\"ñ.pdf", true), "inline; filename=\"a__.pdf\"");
    }
}
