//! Tutors and their kinship links to riders.
//!
//! A rider has at most one primary and one secondary tutor. Tutors are shared between riders
//! and identified by DNI, so saving a tutor block either updates the tutor already in the slot,
//! swaps it for another (existing or new) tutor, or refuses to put the same person in both slots.

use crate::error::AppError;
use crate::models::{Tutor, TutorLink};
use crate::validation::fields::format_name;
use crate::validation::riders::TutorFields;
use sqlx::PgConnection;

pub const SAME_TUTOR_TWICE: &str = "No puede agregar dos veces el mismo tutor a un solo jinete";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TutorSlot {
    Primary,
    Secondary,
}

impl TutorSlot {
    pub fn is_primary(self) -> bool {
        self == TutorSlot::Primary
    }
}

/// What saving a tutor block into a slot amounts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KinshipAction {
    /// The slot is empty: find or create the tutor by DNI and link it.
    Link,
    /// The slot already holds this tutor: update its data and the kinship.
    UpdateCurrent { tutor_id: i64 },
    /// The DNI belongs to the tutor of the other slot.
    Duplicate,
    /// Another tutor holds the slot: unlink it, then find or create by DNI and link.
    Replace { old_tutor_id: i64 },
}

/// Decides how a tutor with `dni` goes into a slot given the current links of the rider.
pub fn reconcile(current: Option<&TutorLink>, other: Option<&TutorLink>, dni: &str) -> KinshipAction {
    if other.is_some_and(|o| o.tutor.dni == dni) {
        return KinshipAction::Duplicate;
    }
    match current {
        None => KinshipAction::Link,
        Some(c) if c.tutor.dni == dni => KinshipAction::UpdateCurrent { tutor_id: c.tutor.id },
        Some(c) => KinshipAction::Replace {
            old_tutor_id: c.tutor.id,
        },
    }
}

/// Values stored for a tutor block. Numbers were validated beforehand.
struct TutorValues {
    dni: String,
    name: String,
    last_name: String,
    street_number: i64,
    floor: Option<i64>,
    department_number: Option<String>,
}

fn values(fields: &TutorFields) -> Result<TutorValues, AppError> {
    let street_number = fields
        .numero_calle
        .trim()
        .parse()
        .map_err(|_| AppError::invalid("Número de calle inválido"))?;
    let floor = match fields.piso.trim() {
        "" => None,
        p => Some(p.parse().map_err(|_| AppError::invalid("Piso inválido"))?),
    };
    let department = fields.departamento.trim();
    Ok(TutorValues {
        dni: fields.dni.trim().to_string(),
        name: format_name(fields.nombre.trim()),
        last_name: format_name(fields.apellido.trim()),
        street_number,
        floor,
        department_number: (!department.is_empty()).then(|| department.to_string()),
    })
}

pub async fn find_tutor_by_dni(conn: &mut PgConnection, dni: &str) -> Result<Option<Tutor>, AppError> {
    Ok(sqlx::query_as::<_, Tutor>("SELECT * FROM tutors WHERE dni = $1")
        .bind(dni)
        .fetch_optional(&mut *conn)
        .await?)
}

/// Updates the tutor with the block's DNI, or creates it. Returns its id.
async fn upsert_tutor(conn: &mut PgConnection, fields: &TutorFields) -> Result<i64, AppError> {
    let v = values(fields)?;
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO tutors (dni, name, last_name, province, locality, street, street_number, floor, \
         department_number, phone_number, email, scholarity_level, occupation) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
         ON CONFLICT (dni) DO UPDATE SET name = EXCLUDED.name, last_name = EXCLUDED.last_name, \
         province = EXCLUDED.province, locality = EXCLUDED.locality, street = EXCLUDED.street, \
         street_number = EXCLUDED.street_number, floor = EXCLUDED.floor, \
         department_number = EXCLUDED.department_number, phone_number = EXCLUDED.phone_number, \
         email = EXCLUDED.email, scholarity_level = EXCLUDED.scholarity_level, occupation = EXCLUDED.occupation \
         RETURNING id",
    )
    .bind(&v.dni)
    .bind(&v.name)
    .bind(&v.last_name)
    .bind(&fields.provincia)
    .bind(fields.localidad.trim())
    .bind(fields.calle.trim())
    .bind(v.street_number)
    .bind(v.floor)
    .bind(v.department_number)
    .bind(fields.celular.trim())
    .bind(fields.email.trim().to_lowercase())
    .bind(&fields.escolaridad)
    .bind(fields.ocupacion.trim())
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

async fn link(conn: &mut PgConnection, rider_id: i64, tutor_id: i64, slot: TutorSlot, kinship: &str) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO rider_tutors (rider_id, tutor_id, kinship, is_primary) VALUES ($1, $2, $3, $4) \
         ON CONFLICT (rider_id, tutor_id) DO UPDATE SET kinship = EXCLUDED.kinship, is_primary = EXCLUDED.is_primary",
    )
    .bind(rider_id)
    .bind(tutor_id)
    .bind(kinship.trim())
    .bind(slot.is_primary())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn unlink(conn: &mut PgConnection, rider_id: i64, tutor_id: i64) -> Result<(), AppError> {
    sqlx::query("DELETE FROM rider_tutors WHERE rider_id = $1 AND tutor_id = $2")
        .bind(rider_id)
        .bind(tutor_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn get_links(conn: &mut PgConnection, rider_id: i64) -> Result<Vec<TutorLink>, AppError> {
    Ok(sqlx::query_as::<_, TutorLink>(
        "SELECT t.*, rt.kinship, rt.is_primary FROM tutors t JOIN rider_tutors rt ON rt.tutor_id = t.id \
         WHERE rt.rider_id = $1",
    )
    .bind(rider_id)
    .fetch_all(&mut *conn)
    .await?)
}

/// Saves one tutor block into `slot` of `rider_id`.
pub async fn save_slot(
    conn: &mut PgConnection,
    rider_id: i64,
    slot: TutorSlot,
    fields: &TutorFields,
) -> Result<KinshipAction, AppError> {
    let links = get_links(conn, rider_id).await?;
    let current = links.iter().find(|l| l.is_primary == slot.is_primary());
    let other = links.iter().find(|l| l.is_primary != slot.is_primary());
    let action = reconcile(current, other, fields.dni.trim());
    match &action {
        KinshipAction::Duplicate => return Err(AppError::Conflict(SAME_TUTOR_TWICE.into())),
        KinshipAction::UpdateCurrent { .. } | KinshipAction::Link => {}
        KinshipAction::Replace { old_tutor_id } => unlink(conn, rider_id, *old_tutor_id).await?,
    }
    let tutor_id = upsert_tutor(conn, fields).await?;
    link(conn, rider_id, tutor_id, slot, &fields.parentesco).await?;
    tracing::info!(rider_id, tutor_id, ?slot, "tutor saved");
    Ok(action)
}

/// Removes whatever tutor holds the secondary slot.
pub async fn clear_secondary(conn: &mut PgConnection, rider_id: i64) -> Result<u64, AppError> {
    let done = sqlx::query("DELETE FROM rider_tutors WHERE rider_id = $1 AND NOT is_primary")
        .bind(rider_id)
        .execute(&mut *conn)
        .await?;
    Ok(done.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link_with(id: i64, dni: &str, is_primary: bool) -> TutorLink {
        TutorLink {
            tutor: Tutor {
                id,
                dni: dni.into(),
                name: "Marta".into(),
                last_name: "Gomez".into(),
                province: "Buenos Aires".into(),
                locality: "La Plata".into(),
                street: "7".into(),
                street_number: 1200,
                floor: None,
                department_number: None,
                phone_number: "2215551234".into(),
                email: "marta@mail.com".into(),
                scholarity_level: "secundario".into(),
                occupation: "Docente".into(),
            },
            kinship: "Madre".into(),
            is_primary,
        }
    }

    #[test]
    fn empty_slot_links() {
        assert_eq!(reconcile(None, None, "30111222"), KinshipAction::Link);
    }

    #[test]
    fn same_dni_updates_current() {
        let current = link_with(4, "30111222", true);
        assert_eq!(
            reconcile(Some(&current), None, "30111222"),
            KinshipAction::UpdateCurrent { tutor_id: 4 }
        );
    }

    #[test]
    fn other_slot_dni_is_duplicate() {
        let current = link_with(4, "30111222", true);
        let other = link_with(5, "28999888", false);
        assert_eq!(reconcile(Some(&current), Some(&other), "28999888"), KinshipAction::Duplicate);
        assert_eq!(reconcile(None, Some(&other), "28999888"), KinshipAction::Duplicate);
    }

    #[test]
    fn new_dni_replaces() {
        let current = link_with(4, "30111222", true);
        assert_eq!(
            reconcile(Some(&current), None, "27000111"),
            KinshipAction::Replace { old_tutor_id: 4 }
        );
    }

    #[test]
    fn values_are_normalized() {
        let fields = TutorFields {
            dni: " 30111222 ".into(),
            nombre: "marta elena".into(),
            apellido: "gomez".into(),
            numero_calle: "1200".into(),
            piso: "".into(),
            departamento: "B".into(),
            ..Default::default()
        };
        let v = values(&fields).unwrap();
        assert_eq!(v.dni, "30111222");
        assert_eq!(v.name, "Marta Elena");
        assert_eq!(v.floor, None);
        assert_eq!(v.department_number.as_deref(), Some("B"));
    }
}
