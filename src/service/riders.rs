//! Riders ("jinetes/amazonas"): listing, the full detail view and deletion.
//! Creation and section edits live in [`super::registration`].

use crate::config::MAX_ELEMENTS_ON_PAGE;
use crate::error::AppError;
use crate::models::{
    Benefits, Disability, DocumentOwner, InstitutionalWork, Insurance, Rider, RiderDetail, RiderRow, School,
    TutorLink,
};
use crate::sql::{fetch_page_clamped, ListQuery, Op, Page};
use crate::storage::ObjectStore;
use crate::validation::riders::validate_listing;
use sqlx::PgPool;
use std::collections::HashMap;

const ROW_COLUMNS: &str = "r.id, r.dni, r.name, r.last_name, r.has_debt, s.professionals";
const ROW_FROM: &str = "riders r LEFT JOIN schools s ON s.id = r.school_id";

pub const HAS_CHARGES: &str =
    "No se puede eliminar al jinete porque tiene cobros asociados. Elimine los cobros primero.";

fn page_param(params: &HashMap<String, String>) -> Result<i64, AppError> {
    match params.get("page").map(|p| p.trim()) {
        None | Some("") => Ok(1),
        Some(p) => match p.parse::<i64>() {
            Ok(0) => Err(AppError::BadRequest("No existe esa página, reintente".into())),
            Ok(n) if n > 0 => Ok(n),
            _ => Err(AppError::BadRequest("Número de página inválido".into())),
        },
    }
}

/// Listing with the name, last_name, dni, professionals/employee and order keys.
/// A page past the end is moved back to the last one.
pub async fn index(pool: &PgPool, params: &HashMap<String, String>) -> Result<Page<RiderRow>, AppError> {
    AppError::check(validate_listing(params))?;
    let page = page_param(params)?;
    let get = |k: &str| params.get(k).map(|v| v.trim()).unwrap_or("");

    let mut list = ListQuery::new(ROW_COLUMNS, ROW_FROM);
    if !get("dni").is_empty() {
        let dni: i64 = get("dni")
            .parse()
            .map_err(|_| AppError::BadRequest("D.N.I inválido".into()))?;
        list = list.filter("r.dni", Op::Eq, dni);
    }
    if !get("name").is_empty() {
        list = list.filter("r.name", Op::ILike, get("name"));
    }
    if !get("last_name").is_empty() {
        list = list.filter("r.last_name", Op::ILike, get("last_name"));
    }
    for key in ["professionals", "employee"] {
        if !get(key).is_empty() {
            list = list.filter("s.professionals", Op::ILike, get(key));
        }
    }
    list = match params.get("order").map(String::as_str).unwrap_or("apellidoA-Z") {
        "nombreA-Z" => list.order_by("r.name", true),
        "nombreZ-A" => list.order_by("r.name", false),
        "apellidoZ-A" => list.order_by("r.last_name", false),
        "" => list.order_by("r.id", true),
        _ => list.order_by("r.last_name", true),
    };
    fetch_page_clamped(pool, &list, page, MAX_ELEMENTS_ON_PAGE).await
}

pub async fn find_rider(pool: &PgPool, id: i64) -> Result<Option<Rider>, AppError> {
    Ok(sqlx::query_as::<_, Rider>("SELECT * FROM riders WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

pub async fn get_rider(pool: &PgPool, id: i64) -> Result<Rider, AppError> {
    find_rider(pool, id).await?.ok_or(AppError::RiderNotFound)
}

pub async fn find_rider_by_dni(pool: &PgPool, dni: i64) -> Result<Option<Rider>, AppError> {
    Ok(sqlx::query_as::<_, Rider>("SELECT * FROM riders WHERE dni = $1")
        .bind(dni)
        .fetch_optional(pool)
        .await?)
}

async fn fetch_by_id<T>(pool: &PgPool, sql: &'static str, id: Option<i64>) -> Result<Option<T>, AppError>
where
    T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
{
    let Some(id) = id else {
        return Ok(None);
    };
    Ok(sqlx::query_as::<_, T>(sql).bind(id).fetch_optional(pool).await?)
}

pub async fn get_tutors(pool: &PgPool, rider_id: i64) -> Result<Vec<TutorLink>, AppError> {
    Ok(sqlx::query_as::<_, TutorLink>(
        "SELECT t.*, rt.kinship, rt.is_primary FROM tutors t JOIN rider_tutors rt ON rt.tutor_id = t.id \
         WHERE rt.rider_id = $1 ORDER BY rt.is_primary DESC",
    )
    .bind(rider_id)
    .fetch_all(pool)
    .await?)
}

/// The rider with every section that has been filled in.
pub async fn show(pool: &PgPool, id: i64) -> Result<RiderDetail, AppError> {
    let rider = get_rider(pool, id).await?;
    let disability: Option<Disability> =
        fetch_by_id(pool, "SELECT * FROM disabilities WHERE id = $1", rider.disability_id).await?;
    let benefits: Option<Benefits> = fetch_by_id(pool, "SELECT * FROM benefits WHERE id = $1", rider.benefit_id).await?;
    let insurance: Option<Insurance> =
        fetch_by_id(pool, "SELECT * FROM insurances WHERE id = $1", rider.insurance_id).await?;
    let school: Option<School> = fetch_by_id(pool, "SELECT * FROM schools WHERE id = $1", rider.school_id).await?;
    let institutional_work: Option<InstitutionalWork> = fetch_by_id(
        pool,
        "SELECT * FROM institutional_works WHERE id = $1",
        rider.institutional_work_id,
    )
    .await?;
    let tutors = get_tutors(pool, id).await?;
    Ok(RiderDetail {
        rider,
        disability,
        benefits,
        insurance,
        school,
        tutors,
        institutional_work,
    })
}

/// Refused while the rider has charges. Otherwise the stored files, tutor links and the
/// rider go; document rows follow by cascade.
pub async fn delete(pool: &PgPool, store: &dyn ObjectStore, id: i64) -> Result<(), AppError> {
    get_rider(pool, id).await?;
    let has_charges: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM charges WHERE rider_id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if has_charges {
        return Err(AppError::Conflict(HAS_CHARGES.into()));
    }
    let sources = super::documents::stored_files(pool, DocumentOwner::Rider, id).await?;
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM rider_tutors WHERE rider_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM riders WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    let files = super::documents::remove_objects(store, &sources).await;
    tracing::info!(rider_id = id, files, "rider deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn page_zero_is_rejected() {
        assert_eq!(page_param(&params(&[])).ok(), Some(1));
        assert_eq!(page_param(&params(&[("page", "3")])).ok(), Some(3));
        assert!(matches!(
            page_param(&params(&[("page", "0")])),
            Err(AppError::BadRequest(m)) if m == "No existe esa página, reintente"
        ));
        assert!(page_param(&params(&[("page", "dos")])).is_err());
    }
}

#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::service::fixtures;
    use crate::storage::MemoryStore;

    #[sqlx::test(migrations = false)]
    #[ignore = "needs a Postgres server in DATABASE_URL"]
    async fn riders_with_charges_are_kept(pool: PgPool) {
        fixtures::schema(&pool).await;
        let rider_id = fixtures::rider(&pool, 40111222).await;
        let receiver_id = fixtures::employee(&pool, "30111222", true).await;
        sqlx::query(
            "INSERT INTO charges (rider_id, charge_date, payment_method, amount, receiver_id) \
             VALUES ($1, '2024-05-02', 'EFECTIVO', 1500, $2)",
        )
        .bind(rider_id)
        .bind(receiver_id)
        .execute(&pool)
        .await
        .expect("charge");

        let refused = delete(&pool, &MemoryStore::new(), rider_id).await;
        assert!(matches!(refused, Err(AppError::Conflict(m)) if m == HAS_CHARGES));
        assert!(find_rider(&pool, rider_id).await.expect("lookup").is_some());
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "needs a Postgres server in DATABASE_URL"]
    async fn deleting_a_rider_drops_its_documents_and_files(pool: PgPool) {
        fixtures::schema(&pool).await;
        let rider_id = fixtures::rider(&pool, 40111222).await;
        let store = MemoryStore::new();
        store
            .put("1714650000-informe.pdf", b"%PDF".to_vec(), "application/pdf")
            .await
            .expect("put");
        sqlx::query(
            "INSERT INTO rider_documents (title, type, format, source, rider_id) VALUES \
             ('Informe', 'Evaluación', 'file', '1714650000-informe.pdf', $1), \
             ('Planilla', 'Planificación', 'link', 'https://example.org/planilla', $1)",
        )
        .bind(rider_id)
        .execute(&pool)
        .await
        .expect("documents");

        delete(&pool, &store, rider_id).await.expect("delete");
        assert!(find_rider(&pool, rider_id).await.expect("lookup").is_none());
        assert!(!store.contains("1714650000-informe.pdf"));
        let left: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rider_documents WHERE rider_id = $1")
            .bind(rider_id)
            .fetch_one(&pool)
            .await
            .expect("count");
        assert_eq!(left, 0);
    }
}
