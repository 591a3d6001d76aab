use serde::Serialize;

use super::types::{EmployeeRecord, EmploymentStatus};

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
  pub total_employees: usize,
  pub total_pns: usize,
  pub total_pppk: usize,
  /// Honorer, GTT and PTT together
  pub total_honorary: usize,
  pub documents_uploaded: usize,
}

impl DashboardStats {
  pub fn from_records(records: &[EmployeeRecord]) -> Self {
    records.iter().fold(Self::default(), |mut stats, record| {
      stats.total_employees += 1;
      match record.status {
        EmploymentStatus::Pns => stats.total_pns += 1,
        EmploymentStatus::Pppk => stats.total_pppk += 1,
        EmploymentStatus::Honorer | EmploymentStatus::Gtt | EmploymentStatus::Ptt => {
          stats.total_honorary += 1
        }
      }
      stats.documents_uploaded += record.documents.iter().filter(|d| d.is_present()).count();
      stats
    })
  }
}
