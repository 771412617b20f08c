//! Typed views of the three collections.
//!
//! Rows are stored as raw JSON (see [`crate::Entity`]); these types describe the
//! load-bearing attributes and are used to build the fixture dataset and to give
//! Rust callers a checked view of a row. Unknown attributes pass through in
//! `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<ContactInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<EmergencyContact>,
    #[serde(default)]
    pub medical_info: MedicalInfo,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    pub name: String,
    pub relationship: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MedicalInfo {
    #[serde(default)]
    pub blood_type: String,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub medications: Vec<String>,
}

/// Appointment status. The set is open: unrecognised values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    Other(String),
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for AppointmentStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Scheduled" => Self::Scheduled,
            "Completed" => Self::Completed,
            "Cancelled" => Self::Cancelled,
            _ => Self::Other(s),
        }
    }
}

impl From<AppointmentStatus> for String {
    fn from(status: AppointmentStatus) -> Self {
        match status {
            AppointmentStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub patient_id: u64,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub provider: String,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub patient_id: u64,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub provider: String,
    pub status: String,
    #[serde(default)]
    pub notes: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_appointment_status_open_set() {
        let known: AppointmentStatus = serde_json::from_value(json!("Cancelled")).unwrap();
        assert_eq!(known, AppointmentStatus::Cancelled);

        let other: AppointmentStatus = serde_json::from_value(json!("No-Show")).unwrap();
        assert_eq!(other, AppointmentStatus::Other("No-Show".to_string()));
        assert_eq!(serde_json::to_value(&other).unwrap(), json!("No-Show"));
    }

    #[test]
    fn test_patient_camel_case_and_passthrough() {
        let patient: Patient = serde_json::from_value(json!({
            "id": 1,
            "firstName": "John",
            "lastName": "Smith",
            "medicalInfo": {"bloodType": "O+", "allergies": ["Penicillin"]},
            "deployments": [{"location": "Afghanistan"}]
        }))
        .unwrap();

        assert_eq!(patient.full_name(), "John Smith");
        assert_eq!(patient.medical_info.allergies, vec!["Penicillin"]);
        assert!(patient.medical_info.conditions.is_empty());
        assert!(patient.extra.contains_key("deployments"));
    }

    #[test]
    fn test_record_type_field_rename() {
        let record = MedicalRecord {
            id: None,
            patient_id: 1,
            date: "2025-03-15".into(),
            kind: "Physical Examination".into(),
            provider: "Dr. Wilson".into(),
            status: "Completed".into(),
            notes: String::new(),
            extra: Map::new(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "Physical Examination");
        assert_eq!(value["patientId"], 1);
        assert!(value.get("id").is_none());
    }
}
