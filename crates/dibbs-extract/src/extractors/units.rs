//! CLIN unit/quantity table parsing.
//!
//! Unlike the payment history table, columns here are located by name in the
//! header row actually printed in the table block.

use crate::error::{ExtractError, ExtractResult};
use dibbs_core::UnitDetails;

const TABLE: &str = "unit/quantity";

fn column_index(headers: &[&str], name: &str) -> ExtractResult<usize> {
    headers
        .iter()
        .position(|header| *header == name)
        .ok_or_else(|| ExtractError::malformed(TABLE, 0, format!("no {} column in header", name)))
}

/// Unit of issue and quantity from the first data row.
///
/// `None` yields `(None, -999)`. The quantity keeps only digits and periods
/// before being parsed and rounded half to even.
pub fn parse_unit_details(table: Option<&str>) -> ExtractResult<UnitDetails> {
    let Some(table) = table else {
        return Ok(UnitDetails::not_found());
    };

    let lines: Vec<&str> = table.split('\n').collect();
    let headers: Vec<&str> = lines[0].split_whitespace().collect();
    let ui_index = column_index(&headers, "UI")?;
    let quantity_index = column_index(&headers, "QUANTITY")?;

    let row: Vec<&str> = lines
        .get(1)
        .map(|line| line.split_whitespace().collect())
        .unwrap_or_default();

    let (Some(unit), Some(raw_quantity)) = (row.get(ui_index), row.get(quantity_index)) else {
        return Err(ExtractError::malformed(
            TABLE,
            1,
            format!(
                "expected UI at column {} and QUANTITY at column {}, found {} columns",
                ui_index,
                quantity_index,
                row.len()
            ),
        ));
    };

    let digits: String = raw_quantity
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let quantity = digits.parse::<f64>().map_err(|_| {
        ExtractError::malformed(TABLE, 1, format!("quantity '{}' is not a number", raw_quantity))
    })?;

    Ok(UnitDetails::new(*unit, quantity.round_ties_even() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dibbs_core::QUANTITY_NOT_FOUND;

    const HEADER: &str =
        "CLIN  PR              PRLI       UI    QUANTITY          UNIT PRICE       TOTAL PRICE      . ";

    #[test]
    fn test_no_table() {
        let details = parse_unit_details(None).unwrap();
        assert_eq!(details.unit, None);
        assert_eq!(details.quantity, QUANTITY_NOT_FOUND);
    }

    #[test]
    fn test_columns_found_by_name() {
        let table = format!("{}\n0001 7006123456 0001 EA 25.000\n", HEADER);
        let details = parse_unit_details(Some(&table)).unwrap();
        assert_eq!(details, UnitDetails::new("EA", 25));
    }

    #[test]
    fn test_reordered_header_is_respected() {
        let table = "QUANTITY UI CLIN\n1,250.4 PG 0001\n";
        let details = parse_unit_details(Some(table)).unwrap();
        assert_eq!(details, UnitDetails::new("PG", 1250));
    }

    #[test]
    fn test_quantity_strips_noise_and_rounds() {
        let table = "UI QUANTITY\nEA 12.5EA\n";
        assert_eq!(parse_unit_details(Some(table)).unwrap().quantity, 12);
    }

    #[test]
    fn test_header_without_row_is_malformed() {
        let table = format!("{}\n", HEADER);
        assert!(matches!(
            parse_unit_details(Some(&table)),
            Err(ExtractError::MalformedTable { row: 1, .. })
        ));
    }

    #[test]
    fn test_header_without_ui_is_malformed() {
        assert!(matches!(
            parse_unit_details(Some("CLIN QTY\n0001 5\n")),
            Err(ExtractError::MalformedTable { row: 0, .. })
        ));
    }
}
