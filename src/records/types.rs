//! Employee record types, serialized with the backend's camelCase keys.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::documents::DocumentItem;

/// Employment classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmploymentStatus {
  /// Permanent civil servant
  #[serde(rename = "PNS")]
  Pns,
  /// Contracted civil servant
  #[serde(rename = "PPPK")]
  Pppk,
  #[default]
  Honorer,
  /// Non-permanent teacher
  #[serde(rename = "GTT")]
  Gtt,
  /// Non-permanent staff
  #[serde(rename = "PTT")]
  Ptt,
}

impl EmploymentStatus {
  pub fn is_civil_servant(&self) -> bool {
    matches!(self, EmploymentStatus::Pns | EmploymentStatus::Pppk)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      EmploymentStatus::Pns => "PNS",
      EmploymentStatus::Pppk => "PPPK",
      EmploymentStatus::Honorer => "Honorer",
      EmploymentStatus::Gtt => "GTT",
      EmploymentStatus::Ptt => "PTT",
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
  #[default]
  #[serde(rename = "Laki-laki")]
  Male,
  #[serde(rename = "Perempuan")]
  Female,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmployeeType {
  #[default]
  #[serde(rename = "Guru")]
  Teacher,
  #[serde(rename = "Tenaga Kependidikan")]
  EducationStaff,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
  #[serde(rename = "Suami/Istri")]
  Spouse,
  #[default]
  #[serde(rename = "Anak")]
  Child,
  #[serde(rename = "Ayah")]
  Father,
  #[serde(rename = "Ibu")]
  Mother,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationStatus {
  #[default]
  #[serde(rename = "Belum Diverifikasi")]
  Unverified,
  #[serde(rename = "Disetujui")]
  Approved,
  #[serde(rename = "Perlu Perbaikan")]
  NeedsRevision,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerificationData {
  #[serde(deserialize_with = "lenient_enum")]
  pub is_verified: VerificationStatus,
  #[serde(deserialize_with = "lenient_string")]
  pub admin_notes: String,
  #[serde(deserialize_with = "lenient_string")]
  pub last_updated: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationData {
  /// SMA, D3, S1, S2, ...
  #[serde(deserialize_with = "lenient_string")]
  pub level: String,
  #[serde(deserialize_with = "lenient_string")]
  pub major: String,
  #[serde(deserialize_with = "lenient_string")]
  pub institution: String,
  #[serde(deserialize_with = "lenient_string")]
  pub graduation_year: String,
  #[serde(deserialize_with = "lenient_string")]
  pub certificate_number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FamilyMember {
  #[serde(deserialize_with = "lenient_string")]
  pub id: String,
  #[serde(deserialize_with = "lenient_string")]
  pub name: String,
  #[serde(deserialize_with = "lenient_enum")]
  pub relation: Relation,
  #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
  pub nik: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
  pub birth_place: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
  pub birth_date: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
  pub education: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
  pub job: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_bool")]
  pub is_dependent: Option<bool>,
  /// Biological/step/adopted for children, living/deceased for parents
  #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
  pub status: Option<String>,
}

/// Civil-servant (PNS/PPPK) employment data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AsnData {
  #[serde(deserialize_with = "lenient_string")]
  pub asn_type: String,
  /// Golongan
  #[serde(deserialize_with = "lenient_string")]
  pub rank: String,
  #[serde(deserialize_with = "lenient_string")]
  pub pangkat: String,
  #[serde(deserialize_with = "lenient_string")]
  pub tmt_golongan: String,
  #[serde(deserialize_with = "lenient_u32")]
  pub working_period_year: u32,
  #[serde(deserialize_with = "lenient_u32")]
  pub working_period_month: u32,
  #[serde(deserialize_with = "lenient_string")]
  pub karpeg: String,
  #[serde(deserialize_with = "lenient_string")]
  pub taspen: String,
  #[serde(deserialize_with = "lenient_string")]
  pub bpjs_health: String,
  #[serde(deserialize_with = "lenient_string")]
  pub bpjs_labor: String,
  #[serde(deserialize_with = "lenient_string")]
  pub npwp: String,
  #[serde(deserialize_with = "lenient_string")]
  pub bank_account: String,
  #[serde(deserialize_with = "lenient_string")]
  pub bank_name: String,
  #[serde(deserialize_with = "lenient_bool")]
  pub is_certified: bool,
  #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
  pub cert_number: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
  pub nrg: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
  pub cert_year: Option<String>,
}

/// Honorary/contract worker employment data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NonAsnData {
  #[serde(deserialize_with = "lenient_string")]
  pub contract_number: String,
  #[serde(deserialize_with = "lenient_string")]
  pub contract_start: String,
  #[serde(deserialize_with = "lenient_string")]
  pub contract_end: String,
  /// BOS, APBD, ...
  #[serde(deserialize_with = "lenient_string")]
  pub honor_source: String,
  #[serde(deserialize_with = "lenient_f64")]
  pub honor_amount: f64,
  #[serde(deserialize_with = "lenient_string")]
  pub bank_account: String,
  #[serde(deserialize_with = "lenient_string")]
  pub bank_name: String,
}

/// The employment sub-record that applies to a given status.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EmploymentDetails<'a> {
  CivilServant(Option<&'a AsnData>),
  ContractWorker(Option<&'a NonAsnData>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployeeRecord {
  #[serde(deserialize_with = "lenient_string")]
  pub id: String,

  // Personal
  #[serde(deserialize_with = "lenient_string")]
  pub full_name: String,
  #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
  pub front_title: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
  pub back_title: Option<String>,
  /// National ID number
  #[serde(deserialize_with = "lenient_string")]
  pub nik: String,
  /// Civil-service number
  #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
  pub nip: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
  pub nuptk: Option<String>,
  #[serde(deserialize_with = "lenient_string")]
  pub birth_place: String,
  #[serde(deserialize_with = "lenient_string")]
  pub birth_date: String,
  #[serde(deserialize_with = "lenient_enum")]
  pub gender: Gender,
  #[serde(deserialize_with = "lenient_string")]
  pub religion: String,
  #[serde(deserialize_with = "lenient_string")]
  pub marital_status: String,
  #[serde(deserialize_with = "lenient_string")]
  pub address: String,
  #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
  pub village: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
  pub district: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
  pub city: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
  pub province: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
  pub postal_code: Option<String>,
  #[serde(deserialize_with = "lenient_string")]
  pub phone: String,
  #[serde(deserialize_with = "lenient_string")]
  pub email: String,

  // Employment
  #[serde(deserialize_with = "lenient_enum")]
  pub status: EmploymentStatus,
  #[serde(deserialize_with = "lenient_enum")]
  pub employee_type: EmployeeType,
  #[serde(deserialize_with = "lenient_string")]
  pub position: String,
  #[serde(deserialize_with = "lenient_string")]
  pub main_task: String,
  #[serde(deserialize_with = "lenient_string")]
  pub unit: String,
  #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
  pub subject: Option<String>,
  #[serde(deserialize_with = "lenient_string")]
  pub tmt_duty: String,
  #[serde(deserialize_with = "lenient_u32")]
  pub teaching_hours: u32,
  #[serde(deserialize_with = "lenient_string")]
  pub sk_number: String,
  #[serde(deserialize_with = "lenient_string")]
  pub sk_official: String,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub asn_data: Option<AsnData>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub non_asn_data: Option<NonAsnData>,

  pub education: EducationData,
  pub family: Vec<FamilyMember>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub documents: Vec<DocumentItem>,

  pub verification: VerificationData,
  /// Advisory percentage supplied by the form
  #[serde(deserialize_with = "lenient_f64")]
  pub completeness: f64,

  /// Keys this crate does not model, kept so a save never drops them.
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl EmployeeRecord {
  /// Identifier for a record saved without one:
  /// civil-service number, else national ID, else `EMP-<unix millis>`.
  pub fn derive_id(&self, now: DateTime<Utc>) -> String {
    let nip = self.nip.as_deref().map(str::trim).unwrap_or_default();
    if !nip.is_empty() {
      return nip.to_string();
    }
    let nik = self.nik.trim();
    if !nik.is_empty() {
      return nik.to_string();
    }
    format!("EMP-{}", now.timestamp_millis())
  }

  /// The employment sub-record selected by `status`; the other is ignored.
  pub fn employment_details(&self) -> EmploymentDetails<'_> {
    if self.status.is_civil_servant() {
      EmploymentDetails::CivilServant(self.asn_data.as_ref())
    } else {
      EmploymentDetails::ContractWorker(self.non_asn_data.as_ref())
    }
  }

  /// Name with academic titles, e.g. "Dra. Siti Aminah, M.Pd."
  pub fn display_name(&self) -> String {
    let mut name = String::new();
    if let Some(front) = self.front_title.as_deref().filter(|t| !t.is_empty()) {
      name.push_str(front);
      name.push(' ');
    }
    name.push_str(&self.full_name);
    if let Some(back) = self.back_title.as_deref().filter(|t| !t.is_empty()) {
      name.push_str(", ");
      name.push_str(back);
    }
    name
  }

  /// Append a family member with a fresh `fam-<millis>` id unique in this list.
  pub fn add_family_member(&mut self, name: &str, relation: Relation) -> &mut FamilyMember {
    let mut stamp = Utc::now().timestamp_millis();
    while self
      .family
      .iter()
      .any(|m| m.id == format!("fam-{}", stamp))
    {
      stamp += 1;
    }

    self.family.push(FamilyMember {
      id: format!("fam-{}", stamp),
      name: name.to_string(),
      relation,
      is_dependent: Some(false),
      ..Default::default()
    });
    let last = self.family.len() - 1;
    &mut self.family[last]
  }

  /// Admin verification decision.
  pub fn set_verification(&mut self, status: VerificationStatus, note: &str) {
    self.verification = VerificationData {
      is_verified: status,
      admin_notes: note.to_string(),
      last_updated: Utc::now().to_rfc3339(),
    };
  }

  /// Insert or replace a document entry by id.
  pub fn attach_document(&mut self, item: DocumentItem) {
    match self.documents.iter_mut().find(|d| d.id == item.id) {
      Some(existing) => *existing = item,
      None => self.documents.push(item),
    }
  }
}

/// Sheet-backed endpoints often send numbers as strings.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
  D: Deserializer<'de>,
{
  match Value::deserialize(deserializer)? {
    Value::Number(n) => n
      .as_f64()
      .ok_or_else(|| serde::de::Error::custom("number out of range")),
    Value::String(s) if s.trim().is_empty() => Ok(0.0),
    Value::String(s) => s
      .trim()
      .parse()
      .map_err(|_| serde::de::Error::custom(format!("not a number: {}", s))),
    Value::Null => Ok(0.0),
    other => Err(serde::de::Error::custom(format!("not a number: {}", other))),
  }
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
  D: Deserializer<'de>,
{
  let v = lenient_f64(deserializer)?;
  if v < 0.0 || v > u32::MAX as f64 {
    return Err(serde::de::Error::custom(format!("out of range: {}", v)));
  }
  Ok(v.round() as u32)
}

/// Sheet cells holding digits (phone numbers, years, ids) arrive as numbers.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  match Value::deserialize(deserializer)? {
    Value::Null => Ok(None),
    Value::String(s) => Ok(Some(s)),
    Value::Number(n) => Ok(Some(n.to_string())),
    Value::Bool(b) => Ok(Some(b.to_string())),
    other => Err(serde::de::Error::custom(format!("not text: {}", other))),
  }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(lenient_opt_bool(deserializer)?.unwrap_or_default())
}

/// Checkbox cells: true/false, "TRUE"/"ya", 1/0, or blank.
fn lenient_opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
  D: Deserializer<'de>,
{
  match Value::deserialize(deserializer)? {
    Value::Bool(b) => Ok(Some(b)),
    Value::Number(n) => Ok(Some(n.as_f64().is_some_and(|v| v != 0.0))),
    Value::String(s) => match s.trim().to_lowercase().as_str() {
      "" => Ok(None),
      "true" | "ya" | "yes" | "1" => Ok(Some(true)),
      "false" | "tidak" | "no" | "0" => Ok(Some(false)),
      other => Err(serde::de::Error::custom(format!("not a yes/no value: {}", other))),
    },
    Value::Null => Ok(None),
    other => Err(serde::de::Error::custom(format!("not a yes/no value: {}", other))),
  }
}

/// Blank or unrecognized choice cells read as the type's default.
fn lenient_enum<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: DeserializeOwned + Default,
{
  let value = match Value::deserialize(deserializer)? {
    Value::String(s) => Value::String(s.trim().to_string()),
    other => other,
  };
  Ok(serde_json::from_value(value).unwrap_or_default())
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;
  use serde_json::json;

  fn at_millis(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).unwrap()
  }

  #[test]
  fn test_derive_id_prefers_nip() {
    let record = EmployeeRecord {
      nip: Some("198501012010011001".into()),
      nik: "3201000000000099".into(),
      ..Default::default()
    };
    assert_eq!(record.derive_id(at_millis(1)), "198501012010011001");
  }

  #[test]
  fn test_derive_id_falls_back_to_nik_then_timestamp() {
    let mut record = EmployeeRecord {
      nip: Some("  ".into()),
      nik: "3201000000000099".into(),
      ..Default::default()
    };
    assert_eq!(record.derive_id(at_millis(1)), "3201000000000099");

    record.nik.clear();
    assert_eq!(record.derive_id(at_millis(1_700_000_000_123)), "EMP-1700000000123");
  }

  #[test]
  fn test_employment_details_follow_status() {
    let mut record = EmployeeRecord {
      status: EmploymentStatus::Honorer,
      asn_data: Some(AsnData::default()),
      non_asn_data: Some(NonAsnData {
        honor_source: "BOS".into(),
        ..Default::default()
      }),
      ..Default::default()
    };
    match record.employment_details() {
      EmploymentDetails::ContractWorker(Some(d)) => assert_eq!(d.honor_source, "BOS"),
      other => panic!("unexpected: {:?}", other),
    }

    record.status = EmploymentStatus::Pppk;
    assert!(matches!(
      record.employment_details(),
      EmploymentDetails::CivilServant(Some(_))
    ));
  }

  #[test]
  fn test_family_ids_unique() {
    let mut record = EmployeeRecord::default();
    let first = record.add_family_member("Rina", Relation::Spouse).id.clone();
    let second = record.add_family_member("Dimas", Relation::Child).id.clone();
    let third = record.add_family_member("Ayu", Relation::Child).id.clone();

    assert!(first.starts_with("fam-"));
    assert_ne!(first, second);
    assert_ne!(second, third);
    assert_ne!(first, third);
    assert_eq!(record.family[1].name, "Dimas");
    assert_eq!(record.family[1].is_dependent, Some(false));
  }

  #[test]
  fn test_deserialize_wire_names_and_lenient_numbers() {
    let record: EmployeeRecord = serde_json::from_value(json!({
      "id": "E1",
      "fullName": "Siti Aminah",
      "nik": "3201",
      "gender": "Perempuan",
      "status": "PPPK",
      "employeeType": "Tenaga Kependidikan",
      "teachingHours": "24",
      "completeness": 87.5,
      "verification": { "isVerified": "Perlu Perbaikan", "adminNotes": "SK blur", "lastUpdated": "" },
      "rowNumber": 7
    }))
    .unwrap();

    assert_eq!(record.gender, Gender::Female);
    assert_eq!(record.status, EmploymentStatus::Pppk);
    assert_eq!(record.employee_type, EmployeeType::EducationStaff);
    assert_eq!(record.teaching_hours, 24);
    assert_eq!(record.completeness, 87.5);
    assert_eq!(record.verification.is_verified, VerificationStatus::NeedsRevision);
    assert_eq!(record.extra.get("rowNumber"), Some(&json!(7)));

    // unknown keys survive serialization
    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["rowNumber"], 7);
    assert_eq!(value["fullName"], "Siti Aminah");
    assert!(value.get("nip").is_none());
  }

  #[test]
  fn test_blank_and_unknown_choice_cells_use_defaults() {
    let record: EmployeeRecord = serde_json::from_value(json!({
      "id": "E1",
      "gender": "",
      "status": "",
      "employeeType": "Kontrak",
      "verification": { "isVerified": null },
      "family": [{ "id": "fam-1", "name": "Nadia", "relation": "" }]
    }))
    .unwrap();

    assert_eq!(record.gender, Gender::Male);
    assert_eq!(record.status, EmploymentStatus::Honorer);
    assert_eq!(record.employee_type, EmployeeType::Teacher);
    assert_eq!(record.verification.is_verified, VerificationStatus::Unverified);
    assert_eq!(record.family[0].relation, Relation::Child);

    let padded: EmployeeRecord = serde_json::from_value(json!({ "status": " PNS " })).unwrap();
    assert_eq!(padded.status, EmploymentStatus::Pns);
  }

  #[test]
  fn test_numeric_cells_read_as_text() {
    let record: EmployeeRecord = serde_json::from_value(json!({
      "id": 42,
      "nik": 3201000000000099u64,
      "nip": null,
      "phone": 81234567,
      "postalCode": 65145,
      "education": { "level": "S1", "graduationYear": 1998 },
      "family": [{ "id": "fam-1", "name": "Nadia", "nik": 3201000000000100u64 }],
      "asnData": { "karpeg": 12345, "isCertified": "TRUE", "certYear": 2015 }
    }))
    .unwrap();

    assert_eq!(record.id, "42");
    assert_eq!(record.nik, "3201000000000099");
    assert_eq!(record.nip, None);
    assert_eq!(record.phone, "81234567");
    assert_eq!(record.postal_code.as_deref(), Some("65145"));
    assert_eq!(record.education.graduation_year, "1998");
    assert_eq!(record.family[0].nik.as_deref(), Some("3201000000000100"));
    let asn = record.asn_data.unwrap();
    assert_eq!(asn.karpeg, "12345");
    assert!(asn.is_certified);
    assert_eq!(asn.cert_year.as_deref(), Some("2015"));
  }

  #[test]
  fn test_checkbox_cells() {
    let member: FamilyMember = serde_json::from_value(json!({ "isDependent": "ya" })).unwrap();
    assert_eq!(member.is_dependent, Some(true));
    let member: FamilyMember = serde_json::from_value(json!({ "isDependent": "" })).unwrap();
    assert_eq!(member.is_dependent, None);
    let member: FamilyMember = serde_json::from_value(json!({ "isDependent": 0 })).unwrap();
    assert_eq!(member.is_dependent, Some(false));
    assert!(serde_json::from_value::<FamilyMember>(json!({ "isDependent": "maybe" })).is_err());
  }

  #[test]
  fn test_display_name_with_titles() {
    let record = EmployeeRecord {
      full_name: "Siti Aminah".into(),
      front_title: Some("Dra.".into()),
      back_title: Some("M.Pd.".into()),
      ..Default::default()
    };
    assert_eq!(record.display_name(), "Dra. Siti Aminah, M.Pd.");
  }

  #[test]
  fn test_set_verification_stamps_time() {
    let mut record = EmployeeRecord::default();
    record.set_verification(VerificationStatus::Approved, "ok");
    assert_eq!(record.verification.is_verified, VerificationStatus::Approved);
    assert_eq!(record.verification.admin_notes, "ok");
    assert!(!record.verification.last_updated.is_empty());
  }
}
