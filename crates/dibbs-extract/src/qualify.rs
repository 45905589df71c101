//! Deciding whether a solicitation is worth quoting automatically.

use crate::error::ExtractResult;
use dibbs_config::{QualificationConfig, ANY};
use dibbs_core::{SolicitationRecord, YesNo};
use serde::{Deserialize, Serialize};

/// Outcome of checking one record against the qualification rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qualification {
    /// Human-readable reasons the record was rejected. Empty means qualified.
    pub reasons: Vec<String>,
}

impl Qualification {
    pub fn is_qualified(&self) -> bool {
        self.reasons.is_empty()
    }

    /// Reasons joined for reports, or "Meets automation criteria".
    pub fn summary(&self) -> String {
        if self.reasons.is_empty() {
            "Meets automation criteria".to_string()
        } else {
            self.reasons.join("; ")
        }
    }
}

/// Qualification rules resolved from config.
///
/// `None` on a flag or inspection point means the check is disabled.
#[derive(Debug, Clone)]
pub struct Qualifier {
    min_delivery_days: u32,
    iso: Option<YesNo>,
    sampling: Option<YesNo>,
    inspection_point: Option<String>,
    manufacturers: Vec<String>,
}

fn flag_rule(value: &str) -> ExtractResult<Option<YesNo>> {
    if value.trim().eq_ignore_ascii_case(ANY) {
        return Ok(None);
    }
    Ok(Some(value.parse()?))
}

impl Qualifier {
    pub fn from_config(config: &QualificationConfig) -> ExtractResult<Self> {
        let inspection_point = config.inspection_point.trim();
        let inspection_point = if inspection_point.is_empty() || inspection_point.eq_ignore_ascii_case(ANY)
        {
            None
        } else {
            Some(inspection_point.to_uppercase())
        };

        Ok(Self {
            min_delivery_days: config.min_delivery_days,
            iso: flag_rule(&config.iso)?,
            sampling: flag_rule(&config.sampling)?,
            inspection_point,
            manufacturers: config
                .manufacturers
                .iter()
                .map(|m| m.trim().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        })
    }

    /// Check a record against every rule, collecting all failures.
    pub fn evaluate(&self, record: &SolicitationRecord) -> Qualification {
        let mut reasons = Vec::new();

        if record.request_number.is_none() {
            reasons.push("Missing request number".to_string());
        }

        // Missing or unparsable delivery days never disqualify.
        if let Some(days) = record.delivery_days_value() {
            if days < self.min_delivery_days {
                reasons.push(format!(
                    "Delivery too short: {} days (minimum: {})",
                    days, self.min_delivery_days
                ));
            }
        }

        if let Some(required) = self.iso {
            if record.iso != required {
                reasons.push(format!(
                    "ISO mismatch: requires {}, solicitation has {}",
                    required, record.iso
                ));
            }
        }

        if let Some(required) = self.sampling {
            if record.sampling != required {
                reasons.push(format!(
                    "Sampling mismatch: requires {}, solicitation has {}",
                    required, record.sampling
                ));
            }
        }

        if let Some(required) = &self.inspection_point {
            let matches = record
                .inspection_point
                .as_deref()
                .map(|point| point.trim().to_uppercase() == *required)
                .unwrap_or(false);
            if !matches {
                reasons.push(format!(
                    "Inspection point mismatch: requires {}, solicitation has '{}'",
                    required,
                    record.inspection_point.as_deref().unwrap_or("")
                ));
            }
        }

        if !self.manufacturers.is_empty() {
            if !record.has_mfr() {
                reasons.push("Missing manufacturer information".to_string());
            } else {
                let mfr = record.mfr.to_lowercase();
                if !self.manufacturers.iter().any(|m| mfr.contains(m.as_str())) {
                    reasons.push(format!(
                        "Manufacturer not in list: '{}' matches none of {}",
                        record.mfr.replace('\n', " / "),
                        self.manufacturers.join(", ")
                    ));
                }
            }
        }

        Qualification { reasons }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use dibbs_core::{BuyerBlock, MANUALLY_CHECK};

    fn record() -> SolicitationRecord {
        SolicitationRecord {
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
        }
    }

    fn default_qualifier() -> Qualifier {
        Qualifier::from_config(&QualificationConfig::default()).unwrap()
    }

    #[test]
    fn test_default_rules_accept_good_record() {
        let result = default_qualifier().evaluate(&record());
        assert!(result.is_qualified(), "{:?}", result.reasons);
        assert_eq!(result.summary(), "Meets automation criteria");
    }

    #[test]
    fn test_short_delivery_is_rejected() {
        let mut r = record();
        r.delivery_days = "0090".to_string();
        let result = default_qualifier().evaluate(&r);
        assert_eq!(
            result.reasons,
            vec!["Delivery too short: 90 days (minimum: 120)".to_string()]
        );
    }

    #[test]
    fn test_missing_delivery_never_disqualifies() {
        let mut r = record();
        r.delivery_days = "999".to_string();
        assert!(default_qualifier().evaluate(&r).is_qualified());

        r.delivery_days = "ten".to_string();
        assert!(default_qualifier().evaluate(&r).is_qualified());
    }

    #[test]
    fn test_every_failure_is_reported() {
        let mut r = record();
        r.iso = YesNo::Yes;
        r.sampling = YesNo::Yes;
        r.inspection_point = None;
        r.mfr = "MOOG INC 94697 P/N 58532-012".to_string();

        let result = default_qualifier().evaluate(&r);
        assert_eq!(result.reasons.len(), 4);
        assert!(result.reasons[0].starts_with("ISO mismatch"));
        assert!(result.reasons[1].starts_with("Sampling mismatch"));
        assert!(result.reasons[2].starts_with("Inspection point mismatch"));
        assert!(result.reasons[3].starts_with("Manufacturer not in list"));
    }

    #[test]
    fn test_any_disables_checks() {
        let config = QualificationConfig {
            iso: "any".to_string(),
            sampling: "ANY".to_string(),
            inspection_point: "ANY".to_string(),
            manufacturers: Vec::new(),
            ..QualificationConfig::default()
        };
        let mut r = record();
        r.iso = YesNo::Yes;
        r.sampling = YesNo::Yes;
        r.inspection_point = None;
        r.mfr = MANUALLY_CHECK.to_string();

        assert!(Qualifier::from_config(&config).unwrap().evaluate(&r).is_qualified());
    }

    #[test]
    fn test_manufacturer_match_is_case_insensitive() {
        let mut r = record();
        r.mfr = "MOOG INC 94697 P/N 1\nparker aerospace 83259 P/N 2".to_string();
        assert!(default_qualifier().evaluate(&r).is_qualified());
    }

    #[test]
    fn test_inspection_point_must_match_exactly() {
        let config = QualificationConfig {
            inspection_point: "dest".to_string(),
            ..QualificationConfig::default()
        };
        let qualifier = Qualifier::from_config(&config).unwrap();

        let r = record();
        let result = qualifier.evaluate(&r);
        assert_eq!(
            result.reasons,
            vec!["Inspection point mismatch: requires DEST, solicitation has 'DESTINATION'".to_string()]
        );

        let mut r = record();
        r.inspection_point = Some("destination".to_string());
        assert!(default_qualifier().evaluate(&r).is_qualified());
    }

    #[test]
    fn test_missing_mfr_is_reported() {
        let mut r = record();
        r.mfr = MANUALLY_CHECK.to_string();
        assert_eq!(
            default_qualifier().evaluate(&r).reasons,
            vec!["Missing manufacturer information".to_string()]
        );
    }

    #[test]
    fn test_missing_request_number() {
        let mut r = record();
        r.request_number = None;
        assert!(!default_qualifier().evaluate(&r).is_qualified());
    }

    #[test]
    fn test_bad_flag_rule_is_an_error() {
        let config = QualificationConfig {
            iso: "MAYBE".to_string(),
            ..QualificationConfig::default()
        };
        assert!(matches!(
            Qualifier::from_config(&config),
            Err(ExtractError::Core(_))
        ));
    }
}
