//! Session-protected administration routes. Guards live in the handlers.

use crate::handlers::{
    auth, charges, contacts, documents, horses, options, payments, publications, reports, riders, team, users,
};
use crate::state::AppState;
use axum::routing::{delete, get, post};
use axum::Router;

/// Document routes for one owner prefix (`/employees`, `/riders` or `/horses`).
fn document_routes(prefix: &str) -> Router<AppState> {
    Router::new()
        .route(
            &format!("{}/:id/documents", prefix),
            get(documents::index).post(documents::upload),
        )
        .route(
            &format!("{}/:id/documents/:doc_id", prefix),
            get(documents::show).put(documents::update).delete(documents::delete),
        )
        .route(
            &format!("{}/:id/documents/:doc_id/download", prefix),
            get(documents::download),
        )
        .route(&format!("{}/:id/links", prefix), post(documents::add_link))
}

pub fn admin_routes(state: AppState) -> Router {
    Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/profile", get(users::profile).put(users::update_profile))
        .route("/users", get(users::index).post(users::create))
        .route("/users/:id", get(users::show).put(users::update))
        .route("/users/:id/toggle", post(users::toggle))
        .route("/publishers", get(users::publishers))
        .route("/pending-users", get(users::pending_index))
        .route("/pending-users/:id", delete(users::pending_delete))
        .route("/pending-users/:id/accept", post(users::pending_accept))
        .route("/employees", get(team::index).post(team::create))
        .route("/employees/:id", get(team::show).put(team::update))
        .route("/employees/:id/toggle", post(team::toggle))
        .route("/horses", get(horses::index).post(horses::create))
        .route("/horses/:id", get(horses::show).put(horses::update))
        .route("/horses/:id/toggle", post(horses::toggle))
        .route("/riders", get(riders::index).post(riders::create))
        .route(
            "/riders/:id",
            get(riders::show).put(riders::update).delete(riders::delete),
        )
        .route(
            "/riders/:id/disability",
            post(riders::register_disability).put(riders::update_disability),
        )
        .route(
            "/riders/:id/insurance_and_school",
            post(riders::register_insurance_and_school).put(riders::update_insurance_and_school),
        )
        .route(
            "/riders/:id/tutors",
            post(riders::register_tutors).put(riders::update_tutors),
        )
        .route(
            "/riders/:id/institutional_work",
            post(riders::register_institutional_work).put(riders::update_institutional_work),
        )
        .merge(document_routes("/employees"))
        .merge(document_routes("/riders"))
        .merge(document_routes("/horses"))
        .route("/charges", get(charges::index).post(charges::create))
        .route(
            "/charges/:id",
            get(charges::show).put(charges::update).delete(charges::delete),
        )
        .route("/payments", get(payments::index).post(payments::create))
        .route(
            "/payments/:id",
            get(payments::show).put(payments::update).delete(payments::delete),
        )
        .route("/publications", get(publications::index).post(publications::create))
        .route(
            "/publications/:id",
            get(publications::show)
                .put(publications::update)
                .delete(publications::delete),
        )
        .route("/contacts", get(contacts::index))
        .route(
            "/contacts/:id",
            get(contacts::show).put(contacts::update).delete(contacts::delete),
        )
        .route("/reports", get(reports::index))
        .route("/reports/proposals", get(reports::proposals))
        .route("/reports/proposals/download", get(reports::proposals_pdf))
        .route("/reports/debtors", get(reports::debtors))
        .route("/reports/debtors/download", get(reports::debtors_pdf))
        .route("/reports/incomplete-riders", get(reports::incomplete_riders))
        .route("/reports/incomplete-riders/download", get(reports::incomplete_riders_pdf))
        .route("/reports/charts", get(reports::charts))
        .route("/reports/charts/:chart/download", get(reports::chart_png))
        .route("/options/horse-form", get(options::horse_form))
        .route("/options/institutional-work", get(options::institutional_work))
        .route("/options/available-horses", get(options::available_horses))
        .route("/options/charge-form", get(options::charge_form))
        .route("/options/employees", get(options::employees))
        .with_state(state)
}
