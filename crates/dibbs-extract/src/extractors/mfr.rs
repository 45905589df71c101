//! Manufacturer string parsing for QPL entries.

use dibbs_core::ManufacturerEntry;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // The lazy name group is what splits back-to-back manufacturer blocks.
    static ref MANUFACTURER: Regex =
        Regex::new(r"([A-Z][A-Z\s&.,()-]+?)\s+(\d{5})\s+P/N\s+([\w/-]+)").unwrap();
}

/// Split an MFR field into `(name, CAGE, part number)` entries, in order.
///
/// Unlike the MFR line finder, the CAGE code here must be five digits.
pub fn parse_mfr_string(mfr: &str) -> Vec<ManufacturerEntry> {
    if mfr.is_empty() {
        return Vec::new();
    }

    MANUFACTURER
        .captures_iter(mfr)
        .map(|caps| {
            ManufacturerEntry::new(caps[1].trim(), caps[2].trim(), caps[3].trim())
        })
        .collect()
}
