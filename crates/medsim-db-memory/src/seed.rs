//! Fixture dataset loaded into a freshly seeded store.

use medsim_core::{
    Appointment, AppointmentStatus, ContactInfo, EmergencyContact, Entity, MedicalInfo,
    MedicalRecord, Patient,
};
use serde::Serialize;
use serde_json::Map;

fn rows<T: Serialize>(items: Vec<(u64, T)>) -> Vec<Entity> {
    items
        .into_iter()
        .filter_map(|(id, item)| match Entity::from_model(id, &item) {
            Ok(entity) => Some(entity),
            Err(err) => {
                tracing::warn!(id, error = %err, "skipping fixture row");
                None
            }
        })
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn patients() -> Vec<Entity> {
    rows(vec![
        (
            1,
            Patient {
                first_name: "John".into(),
                last_name: "Smith".into(),
                date_of_birth: Some("1985-04-15".into()),
                gender: Some("Male".into()),
                service: Some("Army".into()),
                rank: Some("E-5".into()),
                status: Some("Active Duty".into()),
                contact_info: Some(ContactInfo {
                    email: "john.smith@example.com".into(),
                    phone: "555-123-4567".into(),
                    address: "123 Military Ave, Base City, ST 12345".into(),
                }),
                emergency_contact: Some(EmergencyContact {
                    name: "Jane Smith".into(),
                    relationship: "Spouse".into(),
                    phone: "555-987-6543".into(),
                }),
                medical_info: MedicalInfo {
                    blood_type: "O+".into(),
                    allergies: strings(&["Penicillin"]),
                    conditions: strings(&["Hypertension"]),
                    medications: strings(&["Lisinopril"]),
                },
                ..Default::default()
            },
        ),
        (
            2,
            Patient {
                first_name: "Maria".into(),
                last_name: "Rodriguez".into(),
                date_of_birth: Some("1990-08-22".into()),
                gender: Some("Female".into()),
                service: Some("Navy".into()),
                rank: Some("O-2".into()),
                status: Some("Active Duty".into()),
                contact_info: Some(ContactInfo {
                    email: "maria.rodriguez@example.com".into(),
                    phone: "555-234-5678".into(),
                    address: "456 Naval Blvd, Port City, ST 67890".into(),
                }),
                emergency_contact: Some(EmergencyContact {
                    name: "Carlos Rodriguez".into(),
                    relationship: "Brother".into(),
                    phone: "555-876-5432".into(),
                }),
                medical_info: MedicalInfo {
                    blood_type: "A-".into(),
                    ..Default::default()
                },
                ..Default::default()
            },
        ),
    ])
}

pub fn appointments() -> Vec<Entity> {
    rows(vec![
        (
            101,
            Appointment {
                id: None,
                patient_id: 1,
                date: "2025-04-20T09:30:00".into(),
                kind: "Follow-up".into(),
                provider: "Dr. Wilson".into(),
                status: AppointmentStatus::Scheduled,
                notes: "Blood pressure check".into(),
                extra: Map::new(),
            },
        ),
        (
            102,
            Appointment {
                id: None,
                patient_id: 2,
                date: "2025-04-21T13:15:00".into(),
                kind: "Annual Physical".into(),
                provider: "Dr. Johnson".into(),
                status: AppointmentStatus::Scheduled,
                notes: "Routine annual physical examination".into(),
                extra: Map::new(),
            },
        ),
    ])
}

pub fn records() -> Vec<Entity> {
    rows(vec![
        (
            201,
            MedicalRecord {
                id: None,
                patient_id: 1,
                date: "2025-03-15".into(),
                kind: "Physical Examination".into(),
                provider: "Dr. Wilson".into(),
                status: "Completed".into(),
                notes: "Patient appears healthy. Blood pressure slightly elevated at 130/85."
                    .into(),
                extra: Map::new(),
            },
        ),
        (
            202,
            MedicalRecord {
                id: None,
                patient_id: 1,
                date: "2025-02-10".into(),
                kind: "Laboratory Test".into(),
                provider: "Dr. Johnson".into(),
                status: "Completed".into(),
                notes: "Blood work shows normal cholesterol levels.".into(),
                extra: Map::new(),
            },
        ),
    ])
}
