//! Router assembly: health, the public API, the admin API and the OpenAPI document.

pub mod admin;
pub mod common;
pub mod public;

pub use admin::admin_routes;
pub use common::common_routes;
pub use public::public_routes;

use crate::config::MAX_FILE_SIZE_BYTES;
use crate::handlers::auth::LoginForm;
use crate::models::{Publication, PublicationRow};
use crate::service::documents::DocumentForm;
use crate::state::AppState;
use crate::validation::charges::ChargeForm;
use crate::validation::contacts::{ContactMessage, ContactUpdateForm};
use crate::validation::horses::HorseForm;
use crate::validation::payments::PaymentForm;
use crate::validation::publications::PublicationForm;
use crate::validation::riders::{
    DisabilityForm, InstitutionalWorkForm, InsuranceSchoolForm, PersonalDataForm, TutorFields, TutorsForm,
};
use crate::validation::team::EmployeeForm;
use crate::validation::users::{AcceptPendingForm, UserForm};
use axum::extract::DefaultBodyLimit;
use axum::{routing::get, Json, Router};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Room for one maximum-size upload plus the multipart framing.
const BODY_LIMIT: usize = MAX_FILE_SIZE_BYTES + 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CEDICA Admin API",
        version = "0.1.0",
        description = "Administration of riders, staff, horses, charges, payments and publications"
    ),
    components(schemas(
        LoginForm,
        UserForm,
        AcceptPendingForm,
        EmployeeForm,
        HorseForm,
        PersonalDataForm,
        DisabilityForm,
        InsuranceSchoolForm,
        TutorFields,
        TutorsForm,
        InstitutionalWorkForm,
        DocumentForm,
        ChargeForm,
        PaymentForm,
        PublicationForm,
        Publication,
        PublicationRow,
        ContactMessage,
        ContactUpdateForm
    ))
)]
pub struct ApiDoc;

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// The whole application.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(public_routes(state.clone()))
        .merge(admin_routes(state))
        .route("/openapi.json", get(openapi))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::session_cookie;
    use crate::auth::Session;
    use crate::config::Settings;
    use crate::storage::MemoryStore;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/cedica_test")
            .expect("lazy pool");
        AppState::new(pool, Settings::local(), Arc::new(MemoryStore::new()))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn health_is_up() {
        let response = app(test_state())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn admin_routes_need_a_session() {
        for uri in ["/users", "/riders", "/reports/charts", "/employees/1/documents"] {
            let response = app(test_state())
                .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }
    }

    #[tokio::test]
    async fn malformed_contact_message_is_rejected() {
        let response = app(test_state())
            .oneshot(json_request("POST", "/api/messages/", "{not json"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_contact_fields_come_back_as_a_list() {
        let response = app(test_state())
            .oneshot(json_request(
                "POST",
                "/api/messages/",
                r#"{"recaptchaToken":"x","title":"","full_name":"","email":"nope","message":""}"#,
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body.as_array().map(|a| !a.is_empty()).unwrap_or(false));
    }

    #[tokio::test]
    async fn unsolved_recaptcha_is_rejected() {
        let response = app(test_state())
            .oneshot(json_request(
                "POST",
                "/api/messages/",
                r#"{"recaptchaToken":"","title":"Consulta","full_name":"Ana Perez","email":"ana@example.com","message":"Hola"}"#,
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, serde_json::json!(["No se pudo validar el reCaptcha"]));
    }

    #[tokio::test]
    async fn bad_publication_page_is_a_plain_string() {
        let response = app(test_state())
            .oneshot(
                Request::builder()
                    .uri("/api/publications/?page=0")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, serde_json::json!("Número de página inválido"));
    }

    #[tokio::test]
    async fn registration_step_needs_its_token() {
        let state = test_state();
        let session = Session::new(1, "juan@gmail.com".into(), "juan".into(), true, vec![], vec![]);
        let id = state.sessions.create(session).await;
        let mut request = json_request("POST", "/riders/7/disability?token=forged", "{}");
        request
            .headers_mut()
            .insert(header::COOKIE, session_cookie(&id, false, 60).parse().expect("cookie"));
        let response = app(state).oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn permissions_are_checked_before_the_database() {
        let state = test_state();
        let session = Session::new(
            2,
            "user2@gmail.com".into(),
            "user2".into(),
            false,
            vec!["Voluntariado".into()],
            vec!["publication_index".into()],
        );
        let id = state.sessions.create(session).await;
        let request = Request::builder()
            .uri("/payments")
            .header(header::COOKIE, format!("cedica_session={}", id))
            .body(Body::empty())
            .expect("request");
        let response = app(state).oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    fn session_request(uri: &str, id: &uuid::Uuid) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::COOKIE, session_cookie(id, false, 60))
            .body(Body::empty())
            .expect("request")
    }

    #[tokio::test]
    async fn report_index_needs_its_own_permission() {
        let state = test_state();
        let shower = Session::new(3, "user3@gmail.com".into(), "user3".into(), false, vec![], vec![
            "report_show".into(),
        ]);
        let indexer = Session::new(4, "user4@gmail.com".into(), "user4".into(), false, vec![], vec![
            "report_index".into(),
        ]);
        let shower = state.sessions.create(shower).await;
        let indexer = state.sessions.create(indexer).await;

        let response = app(state.clone())
            .oneshot(session_request("/reports", &shower))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app(state.clone())
            .oneshot(session_request("/reports", &indexer))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"].as_array().map(Vec::len), Some(6));

        let response = app(state)
            .oneshot(session_request("/reports/proposals/download", &indexer))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unknown_chart_is_not_found() {
        let state = test_state();
        let admin = Session::new(1, "juan@gmail.com".into(), "juan".into(), true, vec![], vec![]);
        let id = state.sessions.create(admin).await;
        let response = app(state)
            .oneshot(session_request("/reports/charts/horses/download", &id))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn login_cookie_carries_max_age() {
        let cookie = session_cookie(&uuid::Uuid::new_v4(), false, Settings::local().session_max_age_secs());
        assert!(cookie.contains("Max-Age=28800"));
    }

    #[tokio::test]
    async fn openapi_lists_the_forms() {
        let response = app(test_state())
            .oneshot(Request::builder().uri("/openapi.json").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let doc = body_json(response).await;
        assert!(doc["components"]["schemas"]["PersonalDataForm"].is_object());
    }
}
