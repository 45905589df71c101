//! Field extractors for solicitation text.
//!
//! Every extractor is a pure function of its input text. A field that is not
//! present yields its documented sentinel; only the table parsers can fail,
//! and only when a table was found but one of its rows is corrupt.

mod buyer;
mod fields;
mod mfr;
mod payment;
mod table;
mod units;

pub use buyer::find_buyer;
pub use fields::{
    find_bid_dates, find_delivery_days, find_fob, find_inspection_point, find_iso, find_mfr,
    find_nsn_and_fsc, find_package_type, find_packaging, find_product_description,
    find_purchase_numbers, find_request_numbers, find_sampling,
};
pub use mfr::parse_mfr_string;
pub use payment::{parse_payment_history, PAYMENT_HISTORY_COLUMNS};
pub use table::{extract_table, starts_with_word_without_digits};
pub use units::parse_unit_details;
