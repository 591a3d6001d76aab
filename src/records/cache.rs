//! Caching implementations for employee records.

use crate::cache::Cacheable;

use super::types::EmployeeRecord;

/// Local store key holding the employee snapshot.
pub const SNAPSHOT_KEY: &str = "staffsync.employees";

impl Cacheable for EmployeeRecord {
  fn cache_key(&self) -> String {
    self.id.clone()
  }

  fn entity_type() -> &'static str {
    "employee"
  }
}
