//! Row types. Each struct mirrors one table (or one joined listing row) and derives `sqlx::FromRow`.

mod charge;
mod contact;
mod document;
mod employee;
mod horse;
mod payment;
mod publication;
mod rider;
mod user;

pub use charge::{Charge, ChargeRow};
pub use contact::Contact;
pub use document::{Document, DocumentFormat, DocumentOwner};
pub use employee::{Employee, EmployeeSummary};
pub use horse::{Horse, HorseRow};
pub use payment::{Payment, PaymentRow};
pub use publication::{Publication, PublicationRow};
pub use rider::{
    Benefits, Disability, InstitutionalWork, Insurance, Rider, RiderDetail, RiderRow, School, Tutor, TutorLink,
};
pub use user::{PendingUser, Role, User, UserProfile};
