pub mod entity;
pub mod error;
pub mod model;
pub mod time;

pub use entity::{Entity, EntityKind, IdRef};
pub use error::{CoreError, ErrorCategory, Result};
pub use model::{
    Appointment, AppointmentStatus, ContactInfo, EmergencyContact, MedicalInfo, MedicalRecord,
    Patient,
};
pub use crate::time::{Clock, FixedClock, SystemClock, Timestamp};
