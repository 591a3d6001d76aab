//! Document checklist for an employee file.
//!
//! The school expects a fixed set of documents per employee. What has
//! actually been uploaded is stored on the record; [`reconcile`] lines the two
//! up by document id.

use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Upload limit enforced before anything is sent.
pub const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
  #[default]
  Missing,
  Uploaded,
  Verified,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentItem {
  pub id: String,
  #[serde(rename = "type")]
  pub doc_type: String,
  pub label: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub url: Option<String>,
  pub status: DocumentStatus,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub uploaded_at: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub file_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub size: Option<String>,
}

impl DocumentItem {
  /// Placeholder for a required document nobody has uploaded yet.
  pub fn missing(required: &RequiredDocument) -> Self {
    Self {
      id: required.id.to_string(),
      doc_type: required.id.to_string(),
      label: required.label.to_string(),
      status: DocumentStatus::Missing,
      ..Default::default()
    }
  }

  /// Entry for a file the remote just accepted.
  pub fn uploaded(doc_id: &str, file_name: &str, url: String, size_bytes: usize) -> Self {
    let label = required_label(doc_id).unwrap_or(file_name).to_string();
    Self {
      id: doc_id.to_string(),
      doc_type: doc_id.to_string(),
      label,
      url: Some(url),
      status: DocumentStatus::Uploaded,
      uploaded_at: Some(Utc::now().format("%Y-%m-%d").to_string()),
      file_name: Some(file_name.to_string()),
      size: Some(format_size(size_bytes)),
    }
  }

  pub fn is_present(&self) -> bool {
    self.status != DocumentStatus::Missing
  }
}

/// One entry of the required-document template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredDocument {
  pub id: &'static str,
  pub label: &'static str,
}

const REQUIRED_DOCUMENTS: &[RequiredDocument] = &[
  RequiredDocument { id: "ktp", label: "Identity card (KTP)" },
  RequiredDocument { id: "kk", label: "Family card (KK)" },
  RequiredDocument { id: "ijazah", label: "Highest diploma (Ijazah)" },
  RequiredDocument { id: "sk_pengangkatan", label: "Appointment decree (SK)" },
  RequiredDocument { id: "npwp", label: "Tax ID card (NPWP)" },
  RequiredDocument { id: "pas_foto", label: "Passport photo" },
];

/// The standard checklist every employee file is measured against.
pub fn default_required_documents() -> &'static [RequiredDocument] {
  REQUIRED_DOCUMENTS
}

fn required_label(doc_id: &str) -> Option<&'static str> {
  REQUIRED_DOCUMENTS
    .iter()
    .find(|r| r.id == doc_id)
    .map(|r| r.label)
}

/// Line up a required template against the documents actually on file.
///
/// Every required id appears exactly once, in template order: the uploaded
/// item when one exists, a `missing` placeholder otherwise. Uploaded items
/// outside the template follow in their original order.
pub fn reconcile(required: &[RequiredDocument], actual: &[DocumentItem]) -> Vec<DocumentItem> {
  let mut list: Vec<DocumentItem> = required
    .iter()
    .map(|req| {
      actual
        .iter()
        .find(|d| d.id == req.id)
        .cloned()
        .unwrap_or_else(|| DocumentItem::missing(req))
    })
    .collect();

  let required_ids: HashSet<&str> = required.iter().map(|r| r.id).collect();
  let mut seen_extra = HashSet::new();
  for item in actual {
    if !required_ids.contains(item.id.as_str()) && seen_extra.insert(item.id.as_str()) {
      list.push(item.clone());
    }
  }

  list
}

/// "1.50 MB" style size, as shown next to uploaded files.
pub fn format_size(bytes: usize) -> String {
  format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn uploaded(id: &str) -> DocumentItem {
    DocumentItem::uploaded(id, &format!("{}.pdf", id), format!("https://drive.test/{}", id), 1024)
  }

  #[test]
  fn test_reconcile_fills_missing_in_template_order() {
    let actual = vec![uploaded("npwp"), uploaded("ktp")];
    let list = reconcile(default_required_documents(), &actual);

    assert_eq!(list.len(), REQUIRED_DOCUMENTS.len());
    assert_eq!(list[0].id, "ktp");
    assert_eq!(list[0].status, DocumentStatus::Uploaded);
    assert_eq!(list[1].id, "kk");
    assert_eq!(list[1].status, DocumentStatus::Missing);
    assert_eq!(list[1].label, "Family card (KK)");
    assert_eq!(list[4].id, "npwp");
    assert!(list[4].url.is_some());
  }

  #[test]
  fn test_reconcile_keeps_extras_once() {
    let actual = vec![uploaded("sertifikat"), uploaded("ktp"), uploaded("sertifikat")];
    let list = reconcile(default_required_documents(), &actual);

    assert_eq!(list.len(), REQUIRED_DOCUMENTS.len() + 1);
    let extra = list.last().unwrap();
    assert_eq!(extra.id, "sertifikat");
    assert_eq!(extra.label, "sertifikat.pdf");
  }

  #[test]
  fn test_reconcile_empty_template() {
    let actual = vec![uploaded("a"), uploaded("b")];
    let list = reconcile(&[], &actual);
    assert_eq!(list, actual);
  }

  #[test]
  fn test_format_size() {
    assert_eq!(format_size(0), "0.00 MB");
    assert_eq!(format_size(MAX_UPLOAD_BYTES), "2.00 MB");
    assert_eq!(format_size(1_572_864), "1.50 MB");
  }

  #[test]
  fn test_uploaded_item_uses_template_label() {
    let item = uploaded("ijazah");
    assert_eq!(item.label, "Highest diploma (Ijazah)");
    assert_eq!(item.file_name.as_deref(), Some("ijazah.pdf"));
    assert!(item.is_present());
  }
}
