//! Subcommands of the `staffsync` binary.

use clap::{Subcommand, ValueEnum};
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;

use staffsync::cache::{CacheSource, CacheStorage};
use staffsync::records::documents::{default_required_documents, reconcile};
use staffsync::records::{EmployeeRecord, SaveOutcome, VerificationStatus};
use staffsync::remote::RemoteBackend;
use staffsync::RecordRepository;

#[derive(Subcommand, Debug)]
pub enum Command {
  /// List every employee record
  List,
  /// Print one record as JSON
  Show { id: String },
  /// Save a record read from a JSON file
  Save { file: PathBuf },
  /// List the accounts that can sign in
  Logins,
  /// Dashboard counters
  Stats,
  /// Record a verification decision for an employee
  Verify {
    id: String,
    #[arg(value_enum)]
    status: VerifyStatus,
    /// Note shown to the employee
    #[arg(short, long, default_value = "")]
    note: String,
  },
  /// Upload a document file and attach it to the record
  Upload {
    id: String,
    doc_type: String,
    file: PathBuf,
  },
  /// Show the document checklist for an employee
  Documents { id: String },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum VerifyStatus {
  Unverified,
  Approved,
  NeedsRevision,
}

impl From<VerifyStatus> for VerificationStatus {
  fn from(status: VerifyStatus) -> Self {
    match status {
      VerifyStatus::Unverified => VerificationStatus::Unverified,
      VerifyStatus::Approved => VerificationStatus::Approved,
      VerifyStatus::NeedsRevision => VerificationStatus::NeedsRevision,
    }
  }
}

pub async fn execute<B: RemoteBackend, S: CacheStorage>(
  repo: &RecordRepository<B, S>,
  command: Command,
) -> Result<()> {
  match command {
    Command::List => {
      let result = repo.list_all_resolved().await;
      announce_source(result.source);
      for record in &result.data {
        println!(
          "{:<20} {:<40} {:<8} {}",
          record.id,
          record.display_name(),
          record.status.as_str(),
          record.unit
        );
      }
    }
    Command::Show { id } => {
      let record = find(repo, &id).await?;
      println!("{}", serde_json::to_string_pretty(&record)?);
    }
    Command::Save { file } => {
      let contents = tokio::fs::read_to_string(&file)
        .await
        .map_err(|e| eyre!("Failed to read {}: {}", file.display(), e))?;
      let record: EmployeeRecord = serde_json::from_str(&contents)
        .map_err(|e| eyre!("Invalid record in {}: {}", file.display(), e))?;
      report(repo.save(record).await);
    }
    Command::Logins => {
      for entry in repo.get_login_directory().await {
        println!("{:<32} {:<40} {:?}", entry.login_key, entry.display_name, entry.role);
      }
    }
    Command::Stats => {
      let stats = repo.stats().await;
      println!("Employees:          {}", stats.total_employees);
      println!("PNS:                {}", stats.total_pns);
      println!("PPPK:               {}", stats.total_pppk);
      println!("Honorary:           {}", stats.total_honorary);
      println!("Documents uploaded: {}", stats.documents_uploaded);
    }
    Command::Verify { id, status, note } => {
      let outcome = repo
        .verify(&id, status.into(), &note)
        .await
        .ok_or_else(|| eyre!("No employee with id {}", id))?;
      report(outcome);
    }
    Command::Upload { id, doc_type, file } => {
      let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| eyre!("Not a file path: {}", file.display()))?
        .to_string();
      let content = tokio::fs::read(&file)
        .await
        .map_err(|e| eyre!("Failed to read {}: {}", file.display(), e))?;

      let mut record = find(repo, &id).await?;
      let item = repo
        .upload_document(&id, &doc_type, &file_name, &content)
        .await?;
      println!("Uploaded {} ({})", item.label, item.url.as_deref().unwrap_or("-"));
      record.attach_document(item);
      report(repo.save(record).await);
    }
    Command::Documents { id } => {
      let record = find(repo, &id).await?;
      for doc in reconcile(default_required_documents(), &record.documents) {
        println!(
          "{:<16} {:<32} {:<9} {}",
          doc.id,
          doc.label,
          format!("{:?}", doc.status).to_lowercase(),
          doc.size.as_deref().unwrap_or("")
        );
      }
    }
  }

  Ok(())
}

async fn find<B: RemoteBackend, S: CacheStorage>(
  repo: &RecordRepository<B, S>,
  id: &str,
) -> Result<EmployeeRecord> {
  repo
    .get_by_id(id)
    .await
    .ok_or_else(|| eyre!("No employee with id {}", id))
}

fn announce_source(source: CacheSource) {
  match source {
    CacheSource::Offline => eprintln!("offline: showing records saved on this device"),
    CacheSource::Fallback => eprintln!("offline: showing example data, nothing saved locally yet"),
    CacheSource::Network | CacheSource::Memory => {}
  }
}

fn report(outcome: SaveOutcome) {
  match outcome.warning() {
    Some(warning) => eprintln!("{}", warning),
    None => println!("Saved {}", outcome.id()),
  }
}
