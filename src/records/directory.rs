//! Login directory: who can be picked on the login screen.

use serde::{Deserialize, Serialize};

use super::types::EmployeeRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Employee,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginEntry {
  pub login_key: String,
  pub display_name: String,
  pub role: Role,
}

/// The synthesized administrator account listed ahead of employees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminIdentity {
  pub login_key: String,
  pub display_name: String,
}

impl Default for AdminIdentity {
  fn default() -> Self {
    Self {
      login_key: "admin".to_string(),
      display_name: "Administrator".to_string(),
    }
  }
}

impl LoginEntry {
  pub fn admin(identity: &AdminIdentity) -> Self {
    Self {
      login_key: identity.login_key.clone(),
      display_name: identity.display_name.clone(),
      role: Role::Admin,
    }
  }

  /// Employees log in by email, else civil-service number, else national ID.
  pub fn for_employee(record: &EmployeeRecord) -> Self {
    let login_key = [
      Some(record.email.as_str()),
      record.nip.as_deref(),
      Some(record.nik.as_str()),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .find(|k| !k.is_empty())
    .unwrap_or(record.id.as_str())
    .to_string();

    Self {
      login_key,
      display_name: record.full_name.clone(),
      role: Role::Employee,
    }
  }
}

/// Admin first, then one entry per record in snapshot order.
pub fn build_directory(admin: &AdminIdentity, records: &[EmployeeRecord]) -> Vec<LoginEntry> {
  std::iter::once(LoginEntry::admin(admin))
    .chain(records.iter().map(LoginEntry::for_employee))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_login_key_priority() {
    let mut record = EmployeeRecord {
      id: "E1".into(),
      full_name: "Budi".into(),
      email: "budi@school.test".into(),
      nip: Some("1985".into()),
      nik: "3201".into(),
      ..Default::default()
    };
    assert_eq!(LoginEntry::for_employee(&record).login_key, "budi@school.test");

    record.email.clear();
    assert_eq!(LoginEntry::for_employee(&record).login_key, "1985");

    record.nip = None;
    assert_eq!(LoginEntry::for_employee(&record).login_key, "3201");

    record.nik.clear();
    assert_eq!(LoginEntry::for_employee(&record).login_key, "E1");
  }

  #[test]
  fn test_directory_starts_with_admin() {
    let records = vec![
      EmployeeRecord {
        id: "1".into(),
        full_name: "A".into(),
        nik: "11".into(),
        ..Default::default()
      },
      EmployeeRecord {
        id: "2".into(),
        full_name: "B".into(),
        nik: "22".into(),
        ..Default::default()
      },
    ];
    let directory = build_directory(&AdminIdentity::default(), &records);

    assert_eq!(directory.len(), 3);
    assert_eq!(directory[0].role, Role::Admin);
    assert_eq!(directory[0].login_key, "admin");
    assert_eq!(directory[1].display_name, "A");
    assert_eq!(directory[2].login_key, "22");
    assert!(directory[1..].iter().all(|e| e.role == Role::Employee));
  }
}
