//! Built-in example records, served only when no real source answers.

use super::types::{
  AsnData, EducationData, EmployeeRecord, EmployeeType, EmploymentStatus, NonAsnData,
};

/// Placeholder records for a first run with no connectivity and no local data.
pub fn fallback_records() -> Vec<EmployeeRecord> {
  vec![
    EmployeeRecord {
      id: "198501012010011001".to_string(),
      full_name: "Example Teacher (fill in your data)".to_string(),
      nik: "3500000000000001".to_string(),
      nip: Some("198501012010011001".to_string()),
      status: EmploymentStatus::Pns,
      employee_type: EmployeeType::Teacher,
      position: "Teacher".to_string(),
      unit: "SMPN 3 Pacet".to_string(),
      asn_data: Some(AsnData {
        asn_type: "PNS".to_string(),
        rank: "III/b".to_string(),
        ..Default::default()
      }),
      education: EducationData {
        level: "S1".to_string(),
        ..Default::default()
      },
      ..Default::default()
    },
    EmployeeRecord {
      id: "3500000000000002".to_string(),
      full_name: "Example Honorary Staff (fill in your data)".to_string(),
      nik: "3500000000000002".to_string(),
      status: EmploymentStatus::Honorer,
      employee_type: EmployeeType::EducationStaff,
      position: "Administration".to_string(),
      unit: "SMPN 3 Pacet".to_string(),
      non_asn_data: Some(NonAsnData {
        honor_source: "BOS".to_string(),
        ..Default::default()
      }),
      education: EducationData {
        level: "SMA".to_string(),
        ..Default::default()
      },
      ..Default::default()
    },
  ]
}
