//! Turning one solicitation PDF into a [`SolicitationRecord`].

use crate::error::{ExtractError, ExtractResult};
use crate::extractors::{self, extract_table};
use crate::pdf::{PageSource, PdfFile};
use dibbs_config::ExtractionConfig;
use dibbs_core::{ExtractedSolicitation, SolicitationRecord, UnitDetails};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::{debug, info};

/// Where to find a table and how many lines to skip after its header.
#[derive(Debug, Clone)]
pub struct TableLocator {
    pub header: String,
    pub skip_count: usize,
}

impl TableLocator {
    pub fn new(header: impl Into<String>, skip_count: usize) -> Self {
        Self {
            header: header.into(),
            skip_count,
        }
    }

    /// Cut this table's block out of the first page that mentions it.
    pub fn locate(&self, source: &dyn PageSource) -> ExtractResult<Option<String>> {
        let Some(page) = source.find_page(&self.header)? else {
            debug!("Table header not found: {:?}", self.header.trim());
            return Ok(None);
        };
        Ok(extract_table(&page, &self.header, self.skip_count))
    }
}

/// Runs every field extractor over a solicitation.
#[derive(Debug, Clone)]
pub struct SolicitationExtractor {
    payment_history: TableLocator,
    unit_table: TableLocator,
}

impl SolicitationExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            payment_history: TableLocator::new(
                &config.payment_history_header,
                config.payment_history_skip,
            ),
            unit_table: TableLocator::new(&config.unit_table_header, config.unit_table_skip),
        }
    }

    /// Extract a record from any page source.
    ///
    /// Text fields work on the concatenated document; the two tables each
    /// look their page up separately.
    pub fn extract(&self, source: &dyn PageSource) -> ExtractResult<SolicitationRecord> {
        let text = source.full_text()?;

        let (open_date, close_date) = extractors::find_bid_dates(&text);
        let (nsn, fsc) = extractors::find_nsn_and_fsc(&text);
        let payment_history = self.payment_history(source)?;
        let UnitDetails { unit, quantity } = self.unit_details(source)?;

        Ok(SolicitationRecord {
            request_number: extractors::find_request_numbers(&text),
            open_date,
            close_date,
            purchase_number: extractors::find_purchase_numbers(&text),
            nsn,
            fsc,
            delivery_days: extractors::find_delivery_days(&text),
            payment_history,
            unit,
            quantity,
            fob: extractors::find_fob(&text),
            iso: extractors::find_iso(&text),
            inspection_point: extractors::find_inspection_point(&text),
            sampling: extractors::find_sampling(&text),
            product_description: extractors::find_product_description(&text),
            mfr: extractors::find_mfr(&text),
            packaging: extractors::find_packaging(&text),
            package_type: extractors::find_package_type(&text),
            buyer: extractors::find_buyer(&text),
        })
    }

    pub fn payment_history(&self, source: &dyn PageSource) -> ExtractResult<String> {
        let table = self.payment_history.locate(source)?;
        extractors::parse_payment_history(table.as_deref())
    }

    pub fn unit_details(&self, source: &dyn PageSource) -> ExtractResult<UnitDetails> {
        let table = self.unit_table.locate(source)?;
        extractors::parse_unit_details(table.as_deref())
    }

    /// Extract a PDF on disk, tagging the record with its origin and hash.
    pub fn extract_file(&self, path: &Path) -> ExtractResult<ExtractedSolicitation> {
        let pdf = PdfFile::open(path)?;
        info!("Extracting solicitation: {:?}", path);

        let content_hash = hash_file(path)?;
        let record = self.extract(&pdf).map_err(|e| match e {
            ExtractError::MalformedTable { table, row, message } => ExtractError::MalformedTable {
                table,
                row,
                message: format!("{} ({})", message, path.display()),
            },
            other => other,
        })?;

        debug!(
            "Extracted {:?}: request {:?}, nsn {}",
            path, record.request_number, record.nsn
        );

        Ok(
            ExtractedSolicitation::new(record, path.to_string_lossy().to_string())
                .with_content_hash(content_hash),
        )
    }
}

impl Default for SolicitationExtractor {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

/// SHA-256 of a file's bytes, hex encoded.
pub fn hash_file(path: &Path) -> ExtractResult<String> {
    let bytes = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}
