//! Dibbs Extract - Field extraction and batch processing for DIBBs solicitations.
//!
//! This crate provides:
//! - Page access to solicitation PDFs
//! - Field and table extractors producing a `SolicitationRecord`
//! - Qualification rules for automatic quoting
//! - Batch processing with CSV summaries and a CRM import file
//! - Inbox watching for newly arrived PDFs

pub mod crm;
mod error;
pub mod extractors;
mod pdf;
mod processor;
mod qualify;
mod solicitation;
mod summary;
mod watcher;

pub use crm::{publish_solicitation, CrmExport, CrmSink, Opportunity, PublishedRecords};
pub use error::{ExtractError, ExtractResult};
pub use pdf::{PageSource, PageText, PdfFile};
pub use processor::{
    move_into, BatchReport, BatchSummary, FileFailure, FileOutcome, FileStatus, Processor,
};
pub use qualify::{Qualification, Qualifier};
pub use solicitation::{hash_file, SolicitationExtractor, TableLocator};
pub use summary::{summary_path, summary_row, SummaryWriter, SUMMARY_COLUMNS};
pub use watcher::{should_ignore_path, InboxWatcher, InboxWatcherConfig, WatchEvent};
