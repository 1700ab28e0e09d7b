//! Standard response envelope helpers.

use crate::sql::Page;
use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct SuccessOne<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

#[derive(Serialize)]
pub struct SuccessMany<T> {
    pub data: Vec<T>,
    pub meta: MetaCount,
}

#[derive(Serialize)]
pub struct MetaCount {
    pub count: u64,
}

#[derive(Serialize)]
pub struct SuccessPage<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub pages: i64,
    pub has_prev: bool,
    pub has_next: bool,
}

pub type Reply<T> = (StatusCode, Json<SuccessOne<T>>);

pub fn success_one<T: Serialize>(data: T) -> Reply<T> {
    (StatusCode::CREATED, Json(SuccessOne { data, meta: None }))
}

pub fn success_one_ok<T: Serialize>(data: T) -> Reply<T> {
    (StatusCode::OK, Json(SuccessOne { data, meta: None }))
}

/// 200 with a user-facing notice in `meta.message`.
pub fn with_message<T: Serialize>(data: T, message: impl Into<String>) -> Reply<T> {
    (
        StatusCode::OK,
        Json(SuccessOne {
            data,
            meta: Some(serde_json::json!({ "message": message.into() })),
        }),
    )
}

/// 201 with a user-facing notice in `meta.message`.
pub fn created_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Reply<T> {
    let (_, body) = with_message(data, message);
    (StatusCode::CREATED, body)
}

/// A registration step result: the notice plus the next step and its one-time token.
pub fn with_next_step<T: Serialize>(data: T, message: &str, step: &str, token: &str) -> Reply<T> {
    (
        StatusCode::CREATED,
        Json(SuccessOne {
            data,
            meta: Some(serde_json::json!({
                "message": message,
                "next": { "step": step, "token": token }
            })),
        }),
    )
}

pub fn success_many<T: Serialize>(data: Vec<T>) -> (StatusCode, Json<SuccessMany<T>>) {
    let count = data.len() as u64;
    (
        StatusCode::OK,
        Json(SuccessMany {
            data,
            meta: MetaCount { count },
        }),
    )
}

pub fn success_page<T: Serialize>(page: Page<T>) -> (StatusCode, Json<SuccessPage<T>>) {
    let meta = PageMeta {
        page: page.page,
        per_page: page.per_page,
        total: page.total,
        pages: page.pages,
        has_prev: page.has_prev(),
        has_next: page.has_next(),
    };
    (StatusCode::OK, Json(SuccessPage { data: page.items, meta }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_step_meta() {
        let (status, Json(body)) = with_next_step(serde_json::json!({"id": 4}), "ok", "disability", "abc");
        assert_eq!(status, StatusCode::CREATED);
        let meta = body.meta.unwrap_or_default();
        assert_eq!(meta["next"]["step"], "disability");
        assert_eq!(meta["next"]["token"], "abc");
    }

    #[test]
    fn page_meta_flags() {
        let page = Page {
            items: vec![1, 2],
            page: 1,
            per_page: 2,
            total: 3,
            pages: 2,
        };
        let (_, Json(body)) = success_page(page);
        assert!(!body.meta.has_prev);
        assert!(body.meta.has_next);
        assert_eq!(body.data, vec![1, 2]);
    }
}
