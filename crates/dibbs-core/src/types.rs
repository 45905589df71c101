//! Core domain types for Dibbs.
//!
//! A [`SolicitationRecord`] is the flat output of extracting one DIBBs PDF.
//! Fields that could not be located carry fixed sentinel literals rather than
//! errors, so the record always serializes to the shape downstream CRM
//! importers expect.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for extracted solicitations.
pub type SolicitationId = String;

/// Generate a new unique ID.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Sentinel for fields that need a human to read the PDF.
pub const MANUALLY_CHECK: &str = "Manually Check";

/// Sentinel for buyer-block fields when the block could not be matched.
pub const CHECK_MANUALLY: &str = "Check Manually";

/// Sentinel for the packaging field.
pub const MANUALLY_CHECK_PDF: &str = "Manually Check PDF";

/// Delivery days reported when no "DELIVER BY" clause exists.
///
/// This is "no constraint found", not a real lead time.
pub const DELIVERY_DAYS_NOT_FOUND: &str = "999";

/// Quantity reported when the unit/quantity table is missing.
pub const QUANTITY_NOT_FOUND: i64 = -999;

/// Fax value when the buyer block matched without a fax line.
pub const NO_FAX: &str = "N/A";

/// A YES/NO flag as printed in solicitation summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum YesNo {
    Yes,
    #[default]
    No,
}

impl YesNo {
    pub fn as_str(&self) -> &'static str {
        match self {
            YesNo::Yes => "YES",
            YesNo::No => "NO",
        }
    }

    pub fn from_bool(present: bool) -> Self {
        if present {
            YesNo::Yes
        } else {
            YesNo::No
        }
    }
}

impl std::str::FromStr for YesNo {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "YES" => Ok(YesNo::Yes),
            "NO" => Ok(YesNo::No),
            other => Err(Error::InvalidInput(format!("expected YES or NO, got '{}'", other))),
        }
    }
}

impl std::fmt::Display for YesNo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Buyer and contracting office details.
///
/// The eight block fields are all-or-nothing: either every one came from a
/// single match of the buyer block, or every one is [`CHECK_MANUALLY`].
/// `info` is extracted independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerBlock {
    pub office: String,
    pub division: String,
    pub address: String,
    pub name: String,
    pub buyer_code: String,
    pub tel: String,
    pub fax: String,
    pub email: String,
    pub info: Option<String>,
}

impl BuyerBlock {
    /// A block whose composite match failed.
    pub fn unmatched() -> Self {
        Self {
            office: CHECK_MANUALLY.to_string(),
            division: CHECK_MANUALLY.to_string(),
            address: CHECK_MANUALLY.to_string(),
            name: CHECK_MANUALLY.to_string(),
            buyer_code: CHECK_MANUALLY.to_string(),
            tel: CHECK_MANUALLY.to_string(),
            fax: CHECK_MANUALLY.to_string(),
            email: CHECK_MANUALLY.to_string(),
            info: None,
        }
    }

    pub fn with_info(mut self, info: Option<String>) -> Self {
        self.info = info;
        self
    }

    /// Whether the composite buyer block was matched.
    pub fn is_matched(&self) -> bool {
        self.office != CHECK_MANUALLY
    }
}

impl Default for BuyerBlock {
    fn default() -> Self {
        Self::unmatched()
    }
}

/// Unit of issue and quantity from the CLIN table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDetails {
    pub unit: Option<String>,
    pub quantity: i64,
}

impl UnitDetails {
    pub fn new(unit: impl Into<String>, quantity: i64) -> Self {
        Self {
            unit: Some(unit.into()),
            quantity,
        }
    }

    /// The `(None, -999)` result for a missing table.
    pub fn not_found() -> Self {
        Self {
            unit: None,
            quantity: QUANTITY_NOT_FOUND,
        }
    }

    pub fn is_found(&self) -> bool {
        self.unit.is_some()
    }
}

/// Fields extracted from one solicitation PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolicitationRecord {
    pub request_number: Option<String>,
    pub open_date: Option<String>,
    pub close_date: Option<String>,
    pub purchase_number: String,
    pub nsn: String,
    pub fsc: String,
    pub delivery_days: String,
    pub payment_history: String,
    pub unit: Option<String>,
    pub quantity: i64,
    pub fob: String,
    pub iso: YesNo,
    /// Nullable with no sentinel, unlike its neighbours.
    pub inspection_point: Option<String>,
    pub sampling: YesNo,
    pub product_description: String,
    pub mfr: String,
    pub packaging: String,
    pub package_type: Option<String>,
    pub buyer: BuyerBlock,
}

impl SolicitationRecord {
    /// Delivery days as a number, or `None` for the "999" sentinel and
    /// anything unparsable.
    pub fn delivery_days_value(&self) -> Option<u32> {
        if self.delivery_days == DELIVERY_DAYS_NOT_FOUND {
            return None;
        }
        self.delivery_days.parse().ok()
    }

    pub fn has_mfr(&self) -> bool {
        self.mfr != MANUALLY_CHECK
    }

    pub fn has_nsn(&self) -> bool {
        self.nsn != MANUALLY_CHECK
    }
}

/// One (manufacturer, CAGE, part number) triple from an MFR string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManufacturerEntry {
    pub manufacturer_name: String,
    pub cage_code: String,
    pub part_number: String,
}

impl ManufacturerEntry {
    pub fn new(
        manufacturer_name: impl Into<String>,
        cage_code: impl Into<String>,
        part_number: impl Into<String>,
    ) -> Self {
        Self {
            manufacturer_name: manufacturer_name.into(),
            cage_code: cage_code.into(),
            part_number: part_number.into(),
        }
    }
}

/// A record together with where and when it was extracted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedSolicitation {
    pub id: SolicitationId,
    pub pdf_name: String,
    pub source_path: String,
    pub content_hash: Option<String>,
    pub extracted_at: DateTime<Utc>,
    pub skipped: bool,
    #[serde(flatten)]
    pub record: SolicitationRecord,
}

impl ExtractedSolicitation {
    pub fn new(record: SolicitationRecord, source_path: impl Into<String>) -> Self {
        let source_path = source_path.into();
        let pdf_name = std::path::Path::new(&source_path)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| source_path.clone());

        Self {
            id: new_id(),
            pdf_name,
            source_path,
            content_hash: None,
            extracted_at: Utc::now(),
            skipped: false,
            record,
        }
    }

    pub fn with_content_hash(mut self, hash: impl Into<String>) -> Self {
        self.content_hash = Some(hash.into());
        self
    }

    pub fn mark_skipped(&mut self) {
        self.skipped = true;
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
