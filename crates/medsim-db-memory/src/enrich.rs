//! Derived attributes attached to read responses.

use crate::storage::EntityStore;
use medsim_core::{Entity, EntityKind, IdRef, Timestamp};
use serde_json::Value;
use time::OffsetDateTime;

/// Display name used when a `patientId` resolves to no patient.
pub const UNKNOWN_PATIENT: &str = "Unknown Patient";

pub const RECENT_RECORDS_LIMIT: usize = 3;
pub const UPCOMING_APPOINTMENTS_LIMIT: usize = 3;

/// `"{firstName} {lastName}"` of the related patient, or [`UNKNOWN_PATIENT`].
pub fn patient_name(store: &EntityStore, entity: &Entity) -> String {
    entity
        .patient_ref()
        .and_then(|patient_ref| store.find_patient(&patient_ref))
        .map(Entity::full_name)
        .unwrap_or_else(|| UNKNOWN_PATIENT.to_string())
}

/// JSON view of an appointment or record with `patientName` attached.
pub fn with_patient_name(store: &EntityStore, entity: &Entity) -> Value {
    let mut value = entity.to_value();
    if let Value::Object(object) = &mut value {
        object.insert(
            "patientName".to_string(),
            Value::String(patient_name(store, entity)),
        );
    }
    value
}

fn belongs_to(entity: &Entity, patient: &IdRef) -> bool {
    entity.patient_ref().as_ref() == Some(patient)
}

/// First records of the patient in store order; not date-sorted.
pub fn recent_records<'a>(store: &'a EntityStore, patient: &IdRef) -> Vec<&'a Entity> {
    store
        .collection(EntityKind::Record)
        .iter()
        .filter(|record| belongs_to(record, patient))
        .take(RECENT_RECORDS_LIMIT)
        .collect()
}

/// Appointments of the patient dated strictly after `now`, soonest first.
///
/// Rows with a missing or unparseable `date` are never upcoming. Ties keep
/// store order.
pub fn upcoming_appointments<'a>(
    store: &'a EntityStore,
    patient: &IdRef,
    now: OffsetDateTime,
) -> Vec<&'a Entity> {
    let now = Timestamp::new(now);
    let mut upcoming: Vec<(Timestamp, &Entity)> = store
        .collection(EntityKind::Appointment)
        .iter()
        .filter(|appointment| belongs_to(appointment, patient))
        .filter_map(|appointment| appointment.date().map(|date| (date, appointment)))
        .filter(|(date, _)| *date > now)
        .collect();
    upcoming.sort_by_key(|(date, _)| *date);
    upcoming
        .into_iter()
        .take(UPCOMING_APPOINTMENTS_LIMIT)
        .map(|(_, appointment)| appointment)
        .collect()
}

/// Patient row plus `recentRecords` and `upcomingAppointments`.
pub fn patient_detail(store: &EntityStore, patient: &Entity, now: OffsetDateTime) -> Value {
    let patient_ref = patient.id_ref();
    let recent: Vec<Value> = recent_records(store, &patient_ref)
        .into_iter()
        .map(Entity::to_value)
        .collect();
    let upcoming: Vec<Value> = upcoming_appointments(store, &patient_ref, now)
        .into_iter()
        .map(Entity::to_value)
        .collect();

    let mut value = patient.to_value();
    if let Value::Object(object) = &mut value {
        object.insert("recentRecords".to_string(), Value::Array(recent));
        object.insert("upcomingAppointments".to_string(), Value::Array(upcoming));
    }
    value
}
