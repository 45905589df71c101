//! Procurement history ("payment history") table parsing.
//!
//! Column positions come from a fixed header list, never from the header row
//! printed in the PDF. "Contract Number" spans two list entries but one
//! whitespace-split column, so every column after it sits one slot earlier.

use crate::error::{ExtractError, ExtractResult};
use dibbs_core::MANUALLY_CHECK;

/// Assumed header layout of the procurement history table.
pub const PAYMENT_HISTORY_COLUMNS: [&str; 7] = [
    "CAGE",
    "Contract",
    "Number",
    "Quantity",
    "Unit Cost",
    "AWD Date",
    "Surplus Material",
];

const TABLE: &str = "payment history";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnLayout {
    cage: usize,
    quantity: usize,
    cost: usize,
    date: usize,
}

impl ColumnLayout {
    fn from_headers(headers: &[&str]) -> Option<Self> {
        let mut cage = None;
        let mut quantity = None;
        let mut cost = None;
        let mut date = None;

        for (i, header) in headers.iter().enumerate() {
            if header.contains("CAGE") {
                cage = Some(i);
            } else if header.contains("Quantity") {
                quantity = i.checked_sub(1);
            } else if header.contains("Unit") && header.contains("Cost") {
                cost = i.checked_sub(1);
            } else if header.contains("AWD") && header.contains("Date") {
                date = i.checked_sub(1);
            }
        }

        Some(Self {
            cage: cage?,
            quantity: quantity?,
            cost: cost?,
            date: date?,
        })
    }

    fn width(&self) -> usize {
        [self.cage, self.quantity, self.cost, self.date]
            .into_iter()
            .max()
            .unwrap_or(0)
            + 1
    }
}

fn parse_number(value: &str, column: &str, row: usize) -> ExtractResult<f64> {
    value.parse::<f64>().map_err(|_| {
        ExtractError::malformed(TABLE, row, format!("{} '{}' is not a number", column, value))
    })
}

/// Render a payment history table block as `"<qty>@ $<cost> on <date>\n"` lines.
///
/// `None` (no table on any page) yields "Manually Check". Any data row with
/// too few columns or a non-numeric quantity or cost fails the whole table.
pub fn parse_payment_history(table: Option<&str>) -> ExtractResult<String> {
    let Some(table) = table else {
        return Ok(MANUALLY_CHECK.to_string());
    };

    let Some(layout) = ColumnLayout::from_headers(&PAYMENT_HISTORY_COLUMNS) else {
        return Ok(MANUALLY_CHECK.to_string());
    };

    let mut message = String::new();

    for (row, line) in table.trim().split('\n').enumerate().skip(1) {
        let values: Vec<&str> = line.split_whitespace().collect();
        if values.len() < layout.width() {
            return Err(ExtractError::malformed(
                TABLE,
                row,
                format!(
                    "expected at least {} columns, found {}",
                    layout.width(),
                    values.len()
                ),
            ));
        }

        let quantity = parse_number(values[layout.quantity], "quantity", row)?;
        let cost = parse_number(values[layout.cost], "unit cost", row)?;
        let date = values[layout.date];

        message.push_str(&format!(
            "{}@ ${:.2} on {}\n",
            quantity.round_ties_even() as i64,
            cost,
            date
        ));
    }

    Ok(message)
}
