//! Report listings and chart data. Everything is computed from live tables.

use crate::config::{DISABILITIES_IN_SYSTEM, JOB_POSITIONS, PROPOSALS};
use crate::error::AppError;
use crate::models::RiderRow;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Count {
    pub label: String,
    pub count: i64,
}

const SI: &str = "SI";
const NO: &str = "NO";

/// One rider with some registration section still missing.
#[derive(Debug, Clone, Serialize)]
pub struct IncompleteRider {
    pub last_name: String,
    pub first_name: String,
    pub dni: i64,
    pub disability: &'static str,
    pub insurance: &'static str,
    pub institutional_work: &'static str,
    pub tutors: &'static str,
}

#[derive(Debug, FromRow)]
struct CompletenessRow {
    last_name: String,
    name: String,
    dni: i64,
    disability_id: Option<i64>,
    benefit_id: Option<i64>,
    insurance_id: Option<i64>,
    school_id: Option<i64>,
    institutional_work_id: Option<i64>,
    has_primary_tutor: bool,
}

fn flag(present: bool) -> &'static str {
    if present {
        SI
    } else {
        NO
    }
}

impl CompletenessRow {
    fn into_report(self) -> IncompleteRider {
        IncompleteRider {
            disability: flag(self.disability_id.is_some() && self.benefit_id.is_some()),
            insurance: flag(self.insurance_id.is_some() && self.school_id.is_some()),
            institutional_work: flag(self.institutional_work_id.is_some()),
            tutors: flag(self.has_primary_tutor),
            last_name: self.last_name,
            first_name: self.name,
            dni: self.dni,
        }
    }
}

/// Every catalog label with its stored count (zero when absent), catalog order kept.
fn zero_filled(catalog: &[&str], stored: &[(String, i64)]) -> Vec<Count> {
    catalog
        .iter()
        .map(|label| Count {
            label: label.to_string(),
            count: stored
                .iter()
                .find(|(l, _)| l == label)
                .map(|(_, c)| *c)
                .unwrap_or(0),
        })
        .collect()
}

/// Institutional works per proposal, zero-count proposals included, most frequent first.
pub async fn ranking_proposals(pool: &PgPool) -> Result<Vec<Count>, AppError> {
    let stored: Vec<(String, i64)> =
        sqlx::query_as("SELECT proposal, COUNT(*) FROM institutional_works GROUP BY proposal")
            .fetch_all(pool)
            .await?;
    Ok(rank(PROPOSALS, &stored))
}

fn rank(catalog: &[&str], stored: &[(String, i64)]) -> Vec<Count> {
    let mut ranking = zero_filled(catalog, stored);
    // stable: ties keep catalog order
    ranking.sort_by(|a, b| b.count.cmp(&a.count));
    ranking
}

pub async fn riders_in_debt(pool: &PgPool) -> Result<Vec<RiderRow>, AppError> {
    let rows = sqlx::query_as::<_, RiderRow>(
        "SELECT id, dni, name, last_name, has_debt, NULL::text AS professionals FROM riders \
         WHERE has_debt ORDER BY last_name ASC, name ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Riders lacking any section or a primary tutor, by last name.
pub async fn incomplete_riders(pool: &PgPool) -> Result<Vec<IncompleteRider>, AppError> {
    let rows = sqlx::query_as::<_, CompletenessRow>(
        "SELECT r.last_name, r.name, r.dni, r.disability_id, r.benefit_id, r.insurance_id, r.school_id, \
         r.institutional_work_id, \
         EXISTS (SELECT 1 FROM rider_tutors rt WHERE rt.rider_id = r.id AND rt.is_primary) AS has_primary_tutor \
         FROM riders r ORDER BY r.last_name ASC, r.name ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(CompletenessRow::into_report)
        .filter(|r| [r.disability, r.insurance, r.institutional_work, r.tutors].contains(&NO))
        .collect())
}

/// Diagnosis counts, restricted to diagnoses in the catalog.
pub async fn diagnosis_frequencies(pool: &PgPool) -> Result<Vec<Count>, AppError> {
    let stored: Vec<(String, i64)> = sqlx::query_as(
        "SELECT diagnosis, COUNT(*) FROM disabilities WHERE diagnosis IS NOT NULL AND diagnosis <> '' \
         GROUP BY diagnosis ORDER BY diagnosis",
    )
    .fetch_all(pool)
    .await?;
    Ok(in_catalog(DISABILITIES_IN_SYSTEM, stored))
}

fn in_catalog(catalog: &[&str], stored: Vec<(String, i64)>) -> Vec<Count> {
    stored
        .into_iter()
        .filter(|(label, _)| catalog.contains(&label.as_str()))
        .map(|(label, count)| Count { label, count })
        .collect()
}

/// `becados` and `no becados` rider counts.
pub async fn scholarship_proportion(pool: &PgPool) -> Result<Vec<Count>, AppError> {
    let (holders, others): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*) FILTER (WHERE scholarship_holder), COUNT(*) FILTER (WHERE NOT scholarship_holder) \
         FROM riders",
    )
    .fetch_one(pool)
    .await?;
    Ok(vec![
        Count {
            label: "becados".into(),
            count: holders,
        },
        Count {
            label: "no becados".into(),
            count: others,
        },
    ])
}

/// Active employees per job position, every position listed.
pub async fn employees_per_job_position(pool: &PgPool) -> Result<Vec<Count>, AppError> {
    let stored: Vec<(String, i64)> =
        sqlx::query_as("SELECT job_position, COUNT(*) FROM employees WHERE active GROUP BY job_position")
            .fetch_all(pool)
            .await?;
    Ok(zero_filled(JOB_POSITIONS, &stored))
}

/// All chart series in one payload.
#[derive(Debug, Clone, Serialize)]
pub struct Charts {
    pub diagnoses: Vec<Count>,
    pub scholarships: Vec<Count>,
    pub job_positions: Vec<Count>,
}

pub async fn charts(pool: &PgPool) -> Result<Charts, AppError> {
    Ok(Charts {
        diagnoses: diagnosis_frequencies(pool).await?,
        scholarships: scholarship_proportion(pool).await?,
        job_positions: employees_per_job_position(pool).await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(pairs: &[(&str, i64)]) -> Vec<(String, i64)> {
        pairs.iter().map(|(l, c)| (l.to_string(), *c)).collect()
    }

    #[test]
    fn ranking_includes_missing_proposals() {
        let ranking = rank(&["A", "B", "C"], &stored(&[("C", 4), ("A", 1)]));
        let labels: Vec<_> = ranking.iter().map(|c| (c.label.as_str(), c.count)).collect();
        assert_eq!(labels, vec![("C", 4), ("A", 1), ("B", 0)]);
    }

    #[test]
    fn job_positions_are_zero_filled() {
        let counts = zero_filled(JOB_POSITIONS, &stored(&[("Terapeuta", 2)]));
        assert_eq!(counts.len(), JOB_POSITIONS.len());
        assert!(counts.iter().any(|c| c.label == "Terapeuta" && c.count == 2));
        assert_eq!(counts.iter().map(|c| c.count).sum::<i64>(), 2);
    }

    #[test]
    fn diagnoses_outside_the_catalog_are_dropped() {
        let known = DISABILITIES_IN_SYSTEM[0];
        let counts = in_catalog(DISABILITIES_IN_SYSTEM, stored(&[(known, 3), ("inventado", 9)]));
        assert_eq!(
            counts,
            vec![Count {
                label: known.to_string(),
                count: 3
            }]
        );
    }

    #[test]
    fn completeness_flags() {
        let row = CompletenessRow {
            last_name: "Gómez".into(),
            name: "Ana".into(),
            dni: 40111222,
            disability_id: Some(1),
            benefit_id: None,
            insurance_id: Some(2),
            school_id: Some(3),
            institutional_work_id: None,
            has_primary_tutor: true,
        };
        let report = row.into_report();
        assert_eq!(report.disability, "NO");
        assert_eq!(report.insurance, "SI");
        assert_eq!(report.institutional_work, "NO");
        assert_eq!(report.tutors, "SI");
    }
}
