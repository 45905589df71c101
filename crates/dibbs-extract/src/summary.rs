//! Daily CSV summary of processed solicitations.

use crate::error::ExtractResult;
use chrono::NaiveDate;
use dibbs_core::ExtractedSolicitation;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Column headers, in output order.
pub const SUMMARY_COLUMNS: [&str; 30] = [
    "PDF File",
    "PDF Name",
    "REQUEST NO.",
    "Open Date",
    "Close Date",
    "PURCHASE NO",
    "NSN",
    "FSC",
    "Delivery Days",
    "Payment History",
    "Unit",
    "Quantity",
    "FOB",
    "ISO",
    "Inspection Point",
    "Sampling",
    "Product Description",
    "MFR",
    "Packaging",
    "Package Type",
    "Skipped",
    "office",
    "division",
    "address",
    "buyer",
    "buyer_code",
    "telephone",
    "email",
    "fax",
    "buyer_info",
];

/// `<date>_output.csv` inside `output_dir`.
pub fn summary_path(output_dir: &Path, date: NaiveDate) -> PathBuf {
    output_dir.join(format!("{}_output.csv", date.format("%Y-%m-%d")))
}

/// One CSV row for a solicitation, in [`SUMMARY_COLUMNS`] order.
pub fn summary_row(solicitation: &ExtractedSolicitation) -> Vec<String> {
    let record = &solicitation.record;
    let buyer = &record.buyer;
    let opt = |value: &Option<String>| value.clone().unwrap_or_default();

    vec![
        solicitation.source_path.clone(),
        solicitation.pdf_name.clone(),
        opt(&record.request_number),
        opt(&record.open_date),
        opt(&record.close_date),
        record.purchase_number.clone(),
        record.nsn.clone(),
        record.fsc.clone(),
        record.delivery_days.clone(),
        record.payment_history.clone(),
        opt(&record.unit),
        record.quantity.to_string(),
        record.fob.clone(),
        record.iso.to_string(),
        opt(&record.inspection_point),
        record.sampling.to_string(),
        record.product_description.clone(),
        record.mfr.clone(),
        record.packaging.clone(),
        opt(&record.package_type),
        if solicitation.skipped { "True" } else { "False" }.to_string(),
        buyer.office.clone(),
        buyer.division.clone(),
        buyer.address.clone(),
        buyer.name.clone(),
        buyer.buyer_code.clone(),
        buyer.tel.clone(),
        buyer.email.clone(),
        buyer.fax.clone(),
        opt(&buyer.info),
    ]
}

/// Appends rows to a day's summary file, writing the header only once.
pub struct SummaryWriter {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows: usize,
}

impl SummaryWriter {
    /// Open (or create) the summary file for `date`.
    pub fn open(output_dir: &Path, date: NaiveDate) -> ExtractResult<Self> {
        std::fs::create_dir_all(output_dir)?;
        let path = summary_path(output_dir, date);

        let is_new = std::fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

        if is_new {
            debug!("Starting summary file {:?}", path);
            writer.write_record(SUMMARY_COLUMNS)?;
            writer.flush()?;
        }

        Ok(Self {
            path,
            writer,
            rows: 0,
        })
    }

    pub fn write(&mut self, solicitation: &ExtractedSolicitation) -> ExtractResult<()> {
        self.writer.write_record(summary_row(solicitation))?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows written through this writer.
    pub fn rows_written(&self) -> usize {
        self.rows
    }
}
