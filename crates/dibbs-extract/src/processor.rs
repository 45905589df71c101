//! Batch processing of the solicitation inbox.

use crate::crm::{crm_export_path, publish_solicitation, CrmExport};
use crate::error::{ExtractError, ExtractResult};
use crate::pdf::PdfFile;
use crate::qualify::{Qualification, Qualifier};
use crate::solicitation::{hash_file, SolicitationExtractor};
use crate::summary::SummaryWriter;
use chrono::{DateTime, Local, Utc};
use dibbs_config::{Config, FolderConfig, ProcessingConfig, QualificationConfig};
use dibbs_core::ExtractedSolicitation;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// What happened to one PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Met every rule; filed under the automation folder.
    Qualified,
    /// Failed at least one rule; filed under reviewed.
    Skipped,
    /// Same content as an earlier PDF in this batch; left untouched.
    Duplicate,
}

/// Result of processing one PDF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    pub file_name: String,
    pub status: FileStatus,
    pub reasons: Vec<String>,
    pub destination: Option<PathBuf>,
    pub opportunity_id: Option<String>,
    pub solicitation: Option<ExtractedSolicitation>,
}

/// A PDF that could not be processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFailure {
    pub file_name: String,
    pub error: String,
}

/// Counts for a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub files_processed: usize,
    pub qualified: usize,
    pub skipped: usize,
    pub duplicates: usize,
    pub errors: usize,
}

/// Everything recorded about one run over the inbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub inbox: PathBuf,
    pub dry_run: bool,
    pub filter_settings: QualificationConfig,
    pub files: Vec<FileOutcome>,
    pub failures: Vec<FileFailure>,
    pub summary_file: Option<PathBuf>,
    pub crm_export_file: Option<PathBuf>,
}

impl BatchReport {
    pub fn summary(&self) -> BatchSummary {
        let count = |status: FileStatus| self.files.iter().filter(|f| f.status == status).count();
        BatchSummary {
            files_processed: self.files.len(),
            qualified: count(FileStatus::Qualified),
            skipped: count(FileStatus::Skipped),
            duplicates: count(FileStatus::Duplicate),
            errors: self.failures.len(),
        }
    }

    /// Write `pdf_processing_report_<timestamp>.json` into `output_dir`.
    pub fn save(&self, output_dir: &Path) -> ExtractResult<PathBuf> {
        std::fs::create_dir_all(output_dir)?;
        let timestamp = self.finished_at.with_timezone(&Local).format("%Y%m%d_%H%M%S");
        let path = output_dir.join(format!("pdf_processing_report_{}.json", timestamp));

        let mut value = serde_json::to_value(self)?;
        if let Some(map) = value.as_object_mut() {
            map.insert("summary".to_string(), serde_json::to_value(self.summary())?);
        }
        std::fs::write(&path, serde_json::to_string_pretty(&value)?)?;

        info!("Processing report saved to {:?}", path);
        Ok(path)
    }
}

/// Per-run state: open output files and the hashes seen so far.
struct Session {
    summary: Option<SummaryWriter>,
    crm: Option<(CrmExport, PathBuf)>,
    seen_hashes: HashSet<String>,
}

impl Session {
    fn finish(self) -> ExtractResult<(Option<PathBuf>, Option<PathBuf>)> {
        let summary_file = self.summary.map(|s| s.path().to_path_buf());
        let crm_file = match self.crm {
            Some((mut export, path)) if !export.is_empty() => {
                export.save_to(&path)?;
                Some(path)
            }
            _ => None,
        };
        Ok((summary_file, crm_file))
    }
}

/// Runs extract, qualify, summarise and file for each PDF.
pub struct Processor {
    extractor: SolicitationExtractor,
    qualifier: Qualifier,
    qualification: QualificationConfig,
    folders: FolderConfig,
    processing: ProcessingConfig,
    dry_run: bool,
}

impl Processor {
    pub fn new(config: &Config) -> ExtractResult<Self> {
        Ok(Self {
            extractor: SolicitationExtractor::new(&config.extraction),
            qualifier: Qualifier::from_config(&config.qualification)?,
            qualification: config.qualification.clone(),
            folders: config.folders.clone(),
            processing: config.processing.clone(),
            dry_run: false,
        })
    }

    /// Extract and qualify without writing or moving anything.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Read another inbox instead of the configured one.
    pub fn with_inbox(mut self, inbox: impl Into<String>) -> Self {
        self.folders.inbox = inbox.into();
        self
    }

    pub fn move_files(mut self, move_files: bool) -> Self {
        self.processing.move_files = move_files;
        self
    }

    pub fn inbox(&self) -> PathBuf {
        self.folders.inbox_dir()
    }

    /// Qualification verdict for an already-extracted record.
    pub fn qualify(&self, solicitation: &ExtractedSolicitation) -> Qualification {
        self.qualifier.evaluate(&solicitation.record)
    }

    fn begin(&self) -> ExtractResult<Session> {
        if self.dry_run {
            return Ok(Session {
                summary: None,
                crm: None,
                seen_hashes: HashSet::new(),
            });
        }

        self.folders.ensure_dirs()?;
        let output_dir = self.folders.output_dir();
        let today = Local::now().date_naive();

        let summary = SummaryWriter::open(&output_dir, today)?;
        let crm = if self.processing.write_crm_export {
            let path = crm_export_path(&output_dir, today);
            Some((CrmExport::load_or_new(&path)?, path))
        } else {
            None
        };

        Ok(Session {
            summary: Some(summary),
            crm,
            seen_hashes: HashSet::new(),
        })
    }

    /// Process a single PDF outside of a batch.
    pub fn process_file(&self, path: &Path) -> ExtractResult<FileOutcome> {
        let mut session = self.begin()?;
        let outcome = self.process_in(path, &mut session)?;
        session.finish()?;
        Ok(outcome)
    }

    /// Every `*.pdf` directly inside the inbox, sorted by name.
    pub fn pending_pdfs(&self) -> ExtractResult<Vec<PathBuf>> {
        let inbox = self.inbox();
        if !inbox.exists() {
            return Err(ExtractError::FileNotFound(inbox));
        }

        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(&inbox)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file() && PdfFile::is_pdf(p))
            .filter(|p| {
                !p.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with('.'))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();
        Ok(files)
    }

    /// Process every PDF in the inbox.
    ///
    /// A failing PDF is recorded and the batch carries on.
    pub fn process_inbox(&self) -> ExtractResult<BatchReport> {
        self.process_paths(&self.pending_pdfs()?)
    }

    /// Process a given list of PDFs as one batch.
    pub fn process_paths(&self, paths: &[PathBuf]) -> ExtractResult<BatchReport> {
        self.process_paths_with(paths, |_| {})
    }

    /// Like [`Processor::process_paths`], calling `on_file` before each PDF.
    pub fn process_paths_with<F>(
        &self,
        paths: &[PathBuf],
        mut on_file: F,
    ) -> ExtractResult<BatchReport>
    where
        F: FnMut(&Path),
    {
        let started_at = Utc::now();
        let mut session = self.begin()?;
        let mut files = Vec::new();
        let mut failures = Vec::new();

        info!("Processing {} PDFs from {:?}", paths.len(), self.inbox());

        for path in paths {
            on_file(path);
            match self.process_in(path, &mut session) {
                Ok(outcome) => files.push(outcome),
                Err(e) => {
                    error!("Error processing {:?}: {}", path, e);
                    failures.push(FileFailure {
                        file_name: file_name(path),
                        error: e.to_string(),
                    });
                }
            }
        }

        let (summary_file, crm_export_file) = session.finish()?;

        let report = BatchReport {
            started_at,
            finished_at: Utc::now(),
            inbox: self.inbox(),
            dry_run: self.dry_run,
            filter_settings: self.qualification.clone(),
            files,
            failures,
            summary_file,
            crm_export_file,
        };

        if !self.dry_run {
            report.save(&self.folders.output_dir())?;
        }

        Ok(report)
    }

    fn process_in(&self, path: &Path, session: &mut Session) -> ExtractResult<FileOutcome> {
        let name = file_name(path);

        if self.processing.skip_duplicates {
            let hash = hash_file(path)?;
            if !session.seen_hashes.insert(hash) {
                warn!("Skipping duplicate PDF: {}", name);
                return Ok(FileOutcome {
                    file_name: name,
                    status: FileStatus::Duplicate,
                    reasons: vec!["Duplicate of a PDF already processed in this batch".to_string()],
                    destination: None,
                    opportunity_id: None,
                    solicitation: None,
                });
            }
        }

        let solicitation = self.extractor.extract_file(path)?;
        self.settle(path, solicitation, session)
    }

    /// Qualify, file, publish and summarise one extracted PDF.
    fn settle(
        &self,
        path: &Path,
        mut solicitation: ExtractedSolicitation,
        session: &mut Session,
    ) -> ExtractResult<FileOutcome> {
        let name = file_name(path);
        let qualification = self.qualify(&solicitation);

        let (status, destination, opportunity_id) = if qualification.is_qualified() {
            info!("Qualified: {}", name);
            // A failed move must leave the CRM export untouched.
            let destination = self.file_qualified(path, &solicitation)?;
            let opportunity_id = match session.crm.as_mut() {
                Some((export, _)) => Some(publish_solicitation(export, &solicitation)?.opportunity_id),
                None => None,
            };
            (FileStatus::Qualified, destination, opportunity_id)
        } else {
            info!("Skipped {}: {}", name, qualification.summary());
            solicitation.mark_skipped();
            let destination = self.file_reviewed(path)?;
            (FileStatus::Skipped, destination, None)
        };

        if let Some(summary) = session.summary.as_mut() {
            summary.write(&solicitation)?;
        }

        Ok(FileOutcome {
            file_name: name,
            status,
            reasons: qualification.reasons,
            destination,
            opportunity_id,
            solicitation: Some(solicitation),
        })
    }

    fn should_move(&self) -> bool {
        self.processing.move_files && !self.dry_run
    }

    /// Move to `automation/<nsn>/<request>/` with a JSON summary beside it.
    fn file_qualified(
        &self,
        path: &Path,
        solicitation: &ExtractedSolicitation,
    ) -> ExtractResult<Option<PathBuf>> {
        if !self.should_move() {
            return Ok(None);
        }

        let request = solicitation.record.request_number.as_deref().ok_or_else(|| {
            ExtractError::ProcessingError(format!("{} has no request number", file_name(path)))
        })?;

        let dir = self
            .folders
            .automation_dir()
            .join(&solicitation.record.nsn)
            .join(request);
        std::fs::create_dir_all(&dir)?;
        std::fs::write(
            dir.join(format!("{}.json", request)),
            solicitation.to_json_pretty()?,
        )?;

        move_into(path, &dir).map(Some)
    }

    fn file_reviewed(&self, path: &Path) -> ExtractResult<Option<PathBuf>> {
        if !self.should_move() {
            return Ok(None);
        }
        move_into(path, &self.folders.reviewed_dir()).map(Some)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Move `source` into `dir`, replacing a file of the same name.
pub fn move_into(source: &Path, dir: &Path) -> ExtractResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let destination = dir.join(file_name(source));

    if destination.exists() {
        debug!("Replacing existing {:?}", destination);
        std::fs::remove_file(&destination)?;
    }

    if std::fs::rename(source, &destination).is_err() {
        // Cross-device moves need a copy.
        std::fs::copy(source, &destination)?;
        std::fs::remove_file(source)?;
    }

    debug!("Moved {:?} to {:?}", source, destination);
    Ok(destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config_in(root: &Path) -> Config {
        let mut config = Config::default();
        config.folders = FolderConfig {
            inbox: root.join("inbox").to_string_lossy().to_string(),
            output: root.join("out").to_string_lossy().to_string(),
            automation: root.join("auto").to_string_lossy().to_string(),
            reviewed: root.join("reviewed").to_string_lossy().to_string(),
        };
        config
    }

    #[test]
    fn test_move_into_replaces_existing() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.pdf");
        let target_dir = dir.path().join("target");
        std::fs::create_dir_all(&target_dir).unwrap();
        std::fs::write(target_dir.join("a.pdf"), b"old").unwrap();
        std::fs::write(&source, b"new").unwrap();

        let moved = move_into(&source, &target_dir).unwrap();
        assert!(!source.exists());
        assert_eq!(std::fs::read(moved).unwrap(), b"new");
    }

    #[test]
    fn test_pending_pdfs_filters_case_insensitively() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let inbox = dir.path().join("inbox");
        std::fs::create_dir_all(inbox.join("nested")).unwrap();
        for name in ["b.PDF", "a.pdf", "notes.txt", ".hidden.pdf"] {
            std::fs::write(inbox.join(name), b"x").unwrap();
        }
        std::fs::write(inbox.join("nested").join("c.pdf"), b"x").unwrap();

        let processor = Processor::new(&config).unwrap();
        let names: Vec<String> = processor
            .pending_pdfs()
            .unwrap()
            .iter()
            .map(|p| file_name(p))
            .collect();
        assert_eq!(names, vec!["a.pdf".to_string(), "b.PDF".to_string()]);
    }

    #[test]
    fn test_missing_inbox() {
        let dir = tempdir().unwrap();
        let processor = Processor::new(&config_in(dir.path())).unwrap();
        assert!(matches!(
            processor.pending_pdfs(),
            Err(ExtractError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_batch_continues_past_failures() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let inbox = dir.path().join("inbox");
        std::fs::create_dir_all(&inbox).unwrap();
        std::fs::write(inbox.join("one.pdf"), b"not a pdf").unwrap();
        std::fs::write(inbox.join("two.pdf"), b"also not a pdf").unwrap();

        let report = Processor::new(&config).unwrap().process_inbox().unwrap();
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.summary().errors, 2);
        assert!(report.files.is_empty());

        // Failed PDFs stay in the inbox.
        assert!(inbox.join("one.pdf").exists());

        let reports: Vec<_> = std::fs::read_dir(dir.path().join("out"))
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|n| n.starts_with("pdf_processing_report_"))
            .collect();
        assert_eq!(reports.len(), 1);
    }

    #[test]
    fn test_duplicates_detected_before_extraction() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let inbox = dir.path().join("inbox");
        std::fs::create_dir_all(&inbox).unwrap();
        std::fs::write(inbox.join("a.pdf"), b"same bytes").unwrap();
        std::fs::write(inbox.join("b.pdf"), b"same bytes").unwrap();

        let report = Processor::new(&config)
            .unwrap()
            .dry_run(true)
            .process_inbox()
            .unwrap();

        // The first copy fails to parse, the second is flagged as a duplicate.
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files[0].status, FileStatus::Duplicate);
        assert_eq!(report.files[0].file_name, "b.pdf");
        assert!(!dir.path().join("out").exists());
    }

    fn qualified_solicitation(path: &Path) -> ExtractedSolicitation {
        use dibbs_core::{BuyerBlock, SolicitationRecord, YesNo, MANUALLY_CHECK};

        let record = SolicitationRecord {
            request_number: Some("SPE7M124T1234".to_string()),
            open_date: None,
            close_date: None,
            purchase_number: "7006123456".to_string(),
            nsn: "5331012345678".to_string(),
            fsc: "5331".to_string(),
            delivery_days: "180".to_string(),
            payment_history: MANUALLY_CHECK.to_string(),
            unit: Some("EA".to_string()),
            quantity: 10,
            fob: "DESTINATION".to_string(),
            iso: YesNo::No,
            inspection_point: Some("DESTINATION".to_string()),
            sampling: YesNo::No,
            product_description: "O-RING".to_string(),
            mfr: "PARKER-HANNIFIN CORPORATION 83259 P/N 708009-12".to_string(),
            packaging: MANUALLY_CHECK.to_string(),
            package_type: None,
            buyer: BuyerBlock::unmatched(),
        };
        ExtractedSolicitation::new(record, path.to_string_lossy().to_string())
    }

    #[test]
    fn test_qualified_pdf_is_filed_and_published() {
        let dir = tempdir().unwrap();
        let processor = Processor::new(&config_in(dir.path())).unwrap();
        let inbox = dir.path().join("inbox");
        std::fs::create_dir_all(&inbox).unwrap();
        let pdf = inbox.join("SPE7M124T1234.pdf");
        std::fs::write(&pdf, b"pdf").unwrap();

        let mut session = processor.begin().unwrap();
        let outcome = processor
            .settle(&pdf, qualified_solicitation(&pdf), &mut session)
            .unwrap();

        assert_eq!(outcome.status, FileStatus::Qualified);
        assert!(outcome.opportunity_id.is_some());
        let filed = dir
            .path()
            .join("auto")
            .join("5331012345678")
            .join("SPE7M124T1234");
        assert!(filed.join("SPE7M124T1234.pdf").exists());
        assert!(filed.join("SPE7M124T1234.json").exists());
        assert!(!pdf.exists());

        let (_, crm_file) = session.finish().unwrap();
        let export = CrmExport::load_or_new(&crm_file.unwrap()).unwrap();
        assert_eq!(export.opportunities.len(), 1);
    }

    #[test]
    fn test_failed_move_leaves_crm_export_untouched() {
        let dir = tempdir().unwrap();
        let processor = Processor::new(&config_in(dir.path())).unwrap();
        let inbox = dir.path().join("inbox");
        std::fs::create_dir_all(&inbox).unwrap();
        let pdf = inbox.join("SPE7M124T1234.pdf");
        std::fs::write(&pdf, b"pdf").unwrap();

        let mut session = processor.begin().unwrap();
        // A plain file where the NSN folder should go makes filing fail.
        std::fs::write(dir.path().join("auto").join("5331012345678"), b"in the way").unwrap();

        let result = processor.settle(&pdf, qualified_solicitation(&pdf), &mut session);
        assert!(result.is_err());
        assert!(pdf.exists());

        let (export, _) = session.crm.as_ref().unwrap();
        assert!(export.is_empty());
        assert!(export.accounts.is_empty());
        assert!(export.products.is_empty());
        assert!(export.qpl_entries.is_empty());

        let (_, crm_file) = session.finish().unwrap();
        assert!(crm_file.is_none());
    }

    #[test]
    fn test_report_summary_counts() {
        let outcome = |status| FileOutcome {
            file_name: "x.pdf".to_string(),
            status,
            reasons: Vec::new(),
            destination: None,
            opportunity_id: None,
            solicitation: None,
        };
        let report = BatchReport {
            started_at: Utc::now(),
            finished_at: Utc::now(),
            inbox: PathBuf::from("inbox"),
            dry_run: false,
            filter_settings: QualificationConfig::default(),
            files: vec![
                outcome(FileStatus::Qualified),
                outcome(FileStatus::Skipped),
                outcome(FileStatus::Skipped),
            ],
            failures: Vec::new(),
            summary_file: None,
            crm_export_file: None,
        };

        assert_eq!(
            report.summary(),
            BatchSummary {
                files_processed: 3,
                qualified: 1,
                skipped: 2,
                duplicates: 0,
                errors: 0,
            }
        );
    }
}
