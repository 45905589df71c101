//! Single-field extractors over the whole-document text.

use dibbs_core::{YesNo, DELIVERY_DAYS_NOT_FOUND, MANUALLY_CHECK, MANUALLY_CHECK_PDF};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref REQUEST_NO: Regex = Regex::new(r"1\. REQUEST NO\.\s*(\S+)\s*").unwrap();
    static ref PURCHASE_NO: Regex =
        Regex::new(r"3\.\s*REQUISITION/PURCHASE REQUEST NO\.\s*(\S+)\s*").unwrap();
    static ref NSN_FSC: Regex = Regex::new(r"NSN/FSC:(\d+)/(\d+)").unwrap();
    static ref NSN_MATERIAL: Regex = Regex::new(r"NSN/MATERIAL:(\d+)").unwrap();
    // '.' after the 6 is unescaped and matches any character.
    static ref DELIVER_BY: Regex = Regex::new(r"6. DELIVER BY\s*\S*\s*(\d+)").unwrap();
    static ref FOB: Regex = Regex::new(r"FOB:\s*(\w+)").unwrap();
    static ref ISO: Regex = Regex::new(r"ISO").unwrap();
    static ref INSPECTION_POINT: Regex = Regex::new(r"INSPECTION\s*POINT:\s*(\w+)").unwrap();
    static ref SAMPLING: Regex = Regex::new(r"SAMPLING").unwrap();
    static ref ITEM_DESCRIPTION: Regex = Regex::new(r"ITEM\s*DESCRIPTION \s*(.*)").unwrap();
    static ref MFR_LINE: Regex = Regex::new(r"(?m)^(.+?\s+\w{5}\s+P/N\s+.+)$").unwrap();
    static ref BID_DATE: Regex = Regex::new(r"(\d{4})\s+(\w{3})\s+(\d{1,2})").unwrap();
    static ref PACKAGING: Regex = Regex::new(r"(?s)PKGING DATA - (.+?)(?:\n\s*\n|\z)").unwrap();
    static ref MIL_STD: Regex = Regex::new(r"(MIL-STD-\S*)").unwrap();
}

/// Prefix assumed for bare NSN/MATERIAL numbers.
const DEFAULT_NSN_CLASS: &str = "5331";

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Solicitation number from box 1.
pub fn find_request_numbers(text: &str) -> Option<String> {
    first_capture(&REQUEST_NO, text)
}

/// Purchase request number from box 3.
pub fn find_purchase_numbers(text: &str) -> String {
    first_capture(&PURCHASE_NO, text).unwrap_or_else(|| MANUALLY_CHECK.to_string())
}

/// Returns `(nsn, fsc)`.
///
/// `NSN/FSC:<nsn>/<fsc>` yields the FSC prepended to the NSN digits.
/// Failing that, `NSN/MATERIAL:<digits>` yields the digits (prefixed with
/// 5331 unless they already start with 5330 or 5331) and an unknown FSC.
pub fn find_nsn_and_fsc(text: &str) -> (String, String) {
    if let Some(caps) = NSN_FSC.captures(text) {
        let fsc = caps[2].to_string();
        let nsn = format!("{}{}", fsc, &caps[1]);
        return (nsn, fsc);
    }

    if let Some(digits) = first_capture(&NSN_MATERIAL, text) {
        let nsn = if digits.starts_with("5331") || digits.starts_with("5330") {
            digits
        } else {
            format!("{}{}", DEFAULT_NSN_CLASS, digits)
        };
        return (nsn, MANUALLY_CHECK.to_string());
    }

    (MANUALLY_CHECK.to_string(), MANUALLY_CHECK.to_string())
}

/// Days from box 6, or "999" when the clause is absent.
pub fn find_delivery_days(text: &str) -> String {
    first_capture(&DELIVER_BY, text).unwrap_or_else(|| DELIVERY_DAYS_NOT_FOUND.to_string())
}

pub fn find_fob(text: &str) -> String {
    first_capture(&FOB, text).unwrap_or_else(|| MANUALLY_CHECK.to_string())
}

/// YES whenever the text mentions ISO anywhere.
pub fn find_iso(text: &str) -> YesNo {
    YesNo::from_bool(ISO.is_match(text))
}

/// Inspection point, or `None`. Unlike its neighbours it has no sentinel.
pub fn find_inspection_point(text: &str) -> Option<String> {
    first_capture(&INSPECTION_POINT, text)
}

pub fn find_sampling(text: &str) -> YesNo {
    YesNo::from_bool(SAMPLING.is_match(text))
}

/// Rest of the line following "ITEM DESCRIPTION".
pub fn find_product_description(text: &str) -> String {
    first_capture(&ITEM_DESCRIPTION, text).unwrap_or_else(|| MANUALLY_CHECK.to_string())
}

/// Every line shaped like `<name> <5 chars> P/N <part>`, joined with newlines.
pub fn find_mfr(text: &str) -> String {
    let lines: Vec<&str> = MFR_LINE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .collect();

    if lines.is_empty() {
        MANUALLY_CHECK.to_string()
    } else {
        lines.join("\n")
    }
}

/// Returns `(open_date, close_date)` as "MON DD, YYYY".
///
/// The first two `YYYY MON DD` dates in document order are used. With fewer
/// than two, neither date is reported.
pub fn find_bid_dates(text: &str) -> (Option<String>, Option<String>) {
    let dates: Vec<String> = BID_DATE
        .captures_iter(text)
        .take(2)
        .map(|caps| format!("{} {}, {}", &caps[2], &caps[3], &caps[1]))
        .collect();

    match dates.as_slice() {
        [open, close] => (Some(open.clone()), Some(close.clone())),
        _ => (None, None),
    }
}

/// Packaging text after "PKGING DATA - " up to the next blank line.
pub fn find_packaging(text: &str) -> String {
    first_capture(&PACKAGING, text).unwrap_or_else(|| MANUALLY_CHECK_PDF.to_string())
}

/// "ASTM" if mentioned at all, else the first MIL-STD code without commas.
pub fn find_package_type(text: &str) -> Option<String> {
    if text.contains("ASTM") {
        return Some("ASTM".to_string());
    }
    first_capture(&MIL_STD, text).map(|code| code.replace(',', ""))
}
