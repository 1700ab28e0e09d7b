//! Report listings, chart series and their PDF/PNG downloads. The index needs `report_index`,
//! everything else `report_show`.

use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::response::{success_many, success_one_ok};
use crate::service::exports::{self, Chart, PDF, PNG};
use crate::service::reports;
use crate::state::AppState;
use crate::validation::today;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// One entry of the report index.
#[derive(Debug, Clone, Serialize)]
pub struct ReportLink {
    pub name: &'static str,
    pub path: &'static str,
    pub download: &'static str,
}

pub const REPORTS: &[ReportLink] = &[
    ReportLink {
        name: "Ranking de propuestas",
        path: "/reports/proposals",
        download: "/reports/proposals/download",
    },
    ReportLink {
        name: "Jinetes deudores",
        path: "/reports/debtors",
        download: "/reports/debtors/download",
    },
    ReportLink {
        name: "Jinetes con información incompleta",
        path: "/reports/incomplete-riders",
        download: "/reports/incomplete-riders/download",
    },
    ReportLink {
        name: "Diagnósticos de discapacidad",
        path: "/reports/charts",
        download: "/reports/charts/diagnoses/download",
    },
    ReportLink {
        name: "Jinetes becados",
        path: "/reports/charts",
        download: "/reports/charts/scholarships/download",
    },
    ReportLink {
        name: "Empleados activos por puesto laboral",
        path: "/reports/charts",
        download: "/reports/charts/job-positions/download",
    },
];

fn attachment(content_type: &'static str, filename: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
        ],
        bytes,
    )
        .into_response()
}

/// GET /reports
pub async fn index(user: CurrentUser) -> Result<impl IntoResponse, AppError> {
    user.require("report_index")?;
    Ok(success_many(REPORTS.to_vec()))
}

/// GET /reports/proposals
pub async fn proposals(State(state): State<AppState>, user: CurrentUser) -> Result<impl IntoResponse, AppError> {
    user.require("report_show")?;
    Ok(success_many(reports::ranking_proposals(&state.pool).await?))
}

/// GET /reports/proposals/download
pub async fn proposals_pdf(State(state): State<AppState>, user: CurrentUser) -> Result<Response, AppError> {
    user.require("report_show")?;
    let ranking = reports::ranking_proposals(&state.pool).await?;
    let pdf = exports::render_pdf(&exports::proposals_table(&ranking, today()))?;
    Ok(attachment(PDF, "ranking_propuestas.pdf", pdf))
}

/// GET /reports/debtors
pub async fn debtors(State(state): State<AppState>, user: CurrentUser) -> Result<impl IntoResponse, AppError> {
    user.require("report_show")?;
    Ok(success_many(reports::riders_in_debt(&state.pool).await?))
}

/// GET /reports/debtors/download
pub async fn debtors_pdf(State(state): State<AppState>, user: CurrentUser) -> Result<Response, AppError> {
    user.require("report_show")?;
    let riders = reports::riders_in_debt(&state.pool).await?;
    let pdf = exports::render_pdf(&exports::debtors_table(&riders, today()))?;
    Ok(attachment(PDF, "jinetes_deudores.pdf", pdf))
}

/// GET /reports/incomplete-riders
pub async fn incomplete_riders(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    user.require("report_show")?;
    Ok(success_many(reports::incomplete_riders(&state.pool).await?))
}

/// GET /reports/incomplete-riders/download
pub async fn incomplete_riders_pdf(State(state): State<AppState>, user: CurrentUser) -> Result<Response, AppError> {
    user.require("report_show")?;
    let riders = reports::incomplete_riders(&state.pool).await?;
    let pdf = exports::render_pdf(&exports::incomplete_riders_table(&riders, today()))?;
    Ok(attachment(PDF, "jinetes_incompletos.pdf", pdf))
}

/// GET /reports/charts
pub async fn charts(State(state): State<AppState>, user: CurrentUser) -> Result<impl IntoResponse, AppError> {
    user.require("report_show")?;
    Ok(success_one_ok(reports::charts(&state.pool).await?))
}

/// GET /reports/charts/:chart/download where `chart` is diagnoses, scholarships or job-positions.
pub async fn chart_png(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    user.require("report_show")?;
    let chart = Chart::from_slug(&slug).ok_or_else(|| AppError::NotFound("Gráfico no encontrado".into()))?;
    let data = match chart {
        Chart::Diagnoses => reports::diagnosis_frequencies(&state.pool).await?,
        Chart::Scholarships => reports::scholarship_proportion(&state.pool).await?,
        Chart::JobPositions => reports::employees_per_job_position(&state.pool).await?,
    };
    let png = exports::render_chart(chart, &data, today())?;
    Ok(attachment(PNG, chart.filename(), png))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_download_has_an_index_entry() {
        assert_eq!(REPORTS.len(), 6);
        assert!(REPORTS.iter().all(|r| r.download.ends_with("/download")));
        assert!(REPORTS
            .iter()
            .filter(|r| r.path == "/reports/charts")
            .all(|r| r.download.split('/').nth(3).and_then(Chart::from_slug).is_some()));
    }
}
