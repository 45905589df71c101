//! Publishing qualified solicitations into a CRM.
//!
//! [`CrmSink`] is the seam to whatever CRM sits downstream. [`CrmExport`] is
//! the built-in sink: it keeps create-or-find semantics in memory and is
//! written out as a JSON import file.

use crate::error::ExtractResult;
use crate::extractors::parse_mfr_string;
use chrono::{DateTime, NaiveDate, Utc};
use dibbs_core::{new_id, ExtractedSolicitation, ManufacturerEntry, CHECK_MANUALLY, MANUALLY_CHECK};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Opportunity fields handed to [`CrmSink::create_opportunity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opportunity {
    pub name: String,
    pub request_number: Option<String>,
    pub purchase_number: String,
    pub bid_date: Option<String>,
    pub close_date: Option<String>,
    pub quantity: i64,
    pub unit: Option<String>,
    pub delivery_days: String,
    pub fob: String,
    pub iso: String,
    pub sampling: String,
    pub mfr: String,
    pub packaging: String,
    pub packaging_type: Option<String>,
    pub payment_history: String,
    pub buyer: String,
    pub document: String,
    pub product_id: Option<String>,
    pub account_id: Option<String>,
    pub contact_id: Option<String>,
}

/// The create-or-find operations a CRM must offer.
pub trait CrmSink {
    fn create_or_find_account(
        &mut self,
        office: &str,
        division: &str,
        address: &str,
    ) -> ExtractResult<String>;

    /// Vendor account for a manufacturer, found by CAGE code. An existing
    /// account takes the newer name.
    fn create_or_update_vendor_account(
        &mut self,
        manufacturer_name: &str,
        cage_code: &str,
    ) -> ExtractResult<String>;

    fn create_or_find_contact(
        &mut self,
        name: &str,
        email: &str,
        account_id: Option<&str>,
    ) -> ExtractResult<String>;

    fn create_or_find_product(&mut self, nsn: &str, description: &str) -> ExtractResult<String>;

    fn create_opportunity(&mut self, opportunity: Opportunity) -> ExtractResult<String>;

    fn create_qpl_entry(
        &mut self,
        entry: &ManufacturerEntry,
        product_id: &str,
    ) -> ExtractResult<String>;
}

/// IDs produced by publishing one solicitation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedRecords {
    pub opportunity_id: String,
    pub account_id: Option<String>,
    pub contact_id: Option<String>,
    pub product_id: Option<String>,
    pub vendor_account_ids: Vec<String>,
    pub qpl_ids: Vec<String>,
}

fn known(value: &str) -> bool {
    !value.is_empty() && value != CHECK_MANUALLY && value != MANUALLY_CHECK
}

/// Push one solicitation through a sink.
///
/// The buyer account and contact are only created when the buyer block was
/// matched. Product and QPL entries need a known NSN. Each manufacturer in the
/// MFR field gets a vendor account keyed by its CAGE code.
pub fn publish_solicitation(
    sink: &mut dyn CrmSink,
    solicitation: &ExtractedSolicitation,
) -> ExtractResult<PublishedRecords> {
    let record = &solicitation.record;
    let buyer = &record.buyer;

    let account_id = if known(&buyer.office) {
        Some(sink.create_or_find_account(&buyer.office, &buyer.division, &buyer.address)?)
    } else {
        None
    };

    let contact_id = if known(&buyer.email) && known(&buyer.name) {
        Some(sink.create_or_find_contact(&buyer.name, &buyer.email, account_id.as_deref())?)
    } else {
        None
    };

    let product_id = if record.has_nsn() {
        Some(sink.create_or_find_product(&record.nsn, &record.product_description)?)
    } else {
        None
    };

    let name = match &record.request_number {
        Some(request) => format!("{} - {}", request, record.product_description),
        None => format!("{} - {}", solicitation.pdf_name, record.product_description),
    };

    let opportunity_id = sink.create_opportunity(Opportunity {
        name,
        request_number: record.request_number.clone(),
        purchase_number: record.purchase_number.clone(),
        bid_date: record.open_date.clone(),
        close_date: record.close_date.clone(),
        quantity: record.quantity,
        unit: record.unit.clone(),
        delivery_days: record.delivery_days.clone(),
        fob: record.fob.clone(),
        iso: record.iso.to_string(),
        sampling: record.sampling.to_string(),
        mfr: record.mfr.clone(),
        packaging: record.packaging.clone(),
        packaging_type: record.package_type.clone(),
        payment_history: record.payment_history.clone(),
        buyer: buyer.name.clone(),
        document: solicitation.pdf_name.clone(),
        product_id: product_id.clone(),
        account_id: account_id.clone(),
        contact_id: contact_id.clone(),
    })?;

    let mut published = PublishedRecords {
        opportunity_id,
        account_id,
        contact_id,
        product_id,
        ..PublishedRecords::default()
    };

    if let Some(product_id) = published.product_id.clone() {
        for entry in parse_mfr_string(&record.mfr) {
            let vendor =
                sink.create_or_update_vendor_account(&entry.manufacturer_name, &entry.cage_code)?;
            published.vendor_account_ids.push(vendor);
            published.qpl_ids.push(sink.create_qpl_entry(&entry, &product_id)?);
        }
    }

    debug!(
        "Published {:?}: opportunity {}, {} QPL entries",
        record.request_number,
        published.opportunity_id,
        published.qpl_ids.len()
    );

    Ok(published)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmAccount {
    pub id: String,
    pub name: String,
    pub division: String,
    pub address: String,
    /// Set on vendor accounts only.
    #[serde(default)]
    pub cage: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmContact {
    pub id: String,
    pub name: String,
    pub email: String,
    pub account_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmProduct {
    pub id: String,
    pub name: String,
    pub nsn: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmOpportunity {
    pub id: String,
    #[serde(flatten)]
    pub opportunity: Opportunity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QplEntry {
    pub id: String,
    pub product_id: String,
    #[serde(flatten)]
    pub manufacturer: ManufacturerEntry,
}

/// In-memory CRM import, deduplicated the way create-or-find would be.
///
/// Buyer accounts are keyed by office name, vendor accounts by CAGE code,
/// contacts by email
/// (case-insensitive), products by NSN, QPL entries by CAGE code, part
/// number and product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrmExport {
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub accounts: Vec<CrmAccount>,
    #[serde(default)]
    pub contacts: Vec<CrmContact>,
    #[serde(default)]
    pub products: Vec<CrmProduct>,
    #[serde(default)]
    pub opportunities: Vec<CrmOpportunity>,
    #[serde(default)]
    pub qpl_entries: Vec<QplEntry>,
}

impl Default for CrmExport {
    fn default() -> Self {
        Self {
            generated_at: Utc::now(),
            accounts: Vec::new(),
            contacts: Vec::new(),
            products: Vec::new(),
            opportunities: Vec::new(),
            qpl_entries: Vec::new(),
        }
    }
}

/// `<date>_crm_import.json` inside `output_dir`.
pub fn crm_export_path(output_dir: &Path, date: NaiveDate) -> PathBuf {
    output_dir.join(format!("{}_crm_import.json", date.format("%Y-%m-%d")))
}

impl CrmExport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an existing import file so a second run on the same day extends it.
    pub fn load_or_new(path: &Path) -> ExtractResult<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save_to(&mut self, path: &Path) -> ExtractResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.generated_at = Utc::now();
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!(
            "Wrote CRM import {:?} ({} opportunities)",
            path,
            self.opportunities.len()
        );
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.opportunities.is_empty()
    }
}

impl CrmSink for CrmExport {
    fn create_or_find_account(
        &mut self,
        office: &str,
        division: &str,
        address: &str,
    ) -> ExtractResult<String> {
        if let Some(account) = self
            .accounts
            .iter_mut()
            .find(|a| a.cage.is_none() && a.name == office)
        {
            if account.address.is_empty() && !address.is_empty() {
                account.address = address.to_string();
            }
            return Ok(account.id.clone());
        }

        let account = CrmAccount {
            id: new_id(),
            name: office.to_string(),
            division: division.to_string(),
            address: address.to_string(),
            cage: None,
        };
        let id = account.id.clone();
        self.accounts.push(account);
        Ok(id)
    }

    fn create_or_update_vendor_account(
        &mut self,
        manufacturer_name: &str,
        cage_code: &str,
    ) -> ExtractResult<String> {
        if let Some(account) = self
            .accounts
            .iter_mut()
            .find(|a| a.cage.as_deref() == Some(cage_code))
        {
            if account.name != manufacturer_name {
                debug!(
                    "Renaming vendor {} ({} -> {})",
                    cage_code, account.name, manufacturer_name
                );
                account.name = manufacturer_name.to_string();
            }
            return Ok(account.id.clone());
        }

        let account = CrmAccount {
            id: new_id(),
            name: manufacturer_name.to_string(),
            division: format!("CAGE {}", cage_code),
            address: String::new(),
            cage: Some(cage_code.to_string()),
        };
        let id = account.id.clone();
        self.accounts.push(account);
        Ok(id)
    }

    fn create_or_find_contact(
        &mut self,
        name: &str,
        email: &str,
        account_id: Option<&str>,
    ) -> ExtractResult<String> {
        if let Some(contact) = self
            .contacts
            .iter()
            .find(|c| c.email.eq_ignore_ascii_case(email))
        {
            return Ok(contact.id.clone());
        }

        let contact = CrmContact {
            id: new_id(),
            name: name.to_string(),
            email: email.to_string(),
            account_id: account_id.map(str::to_string),
        };
        let id = contact.id.clone();
        self.contacts.push(contact);
        Ok(id)
    }

    fn create_or_find_product(&mut self, nsn: &str, description: &str) -> ExtractResult<String> {
        if let Some(product) = self.products.iter().find(|p| p.nsn == nsn) {
            return Ok(product.id.clone());
        }

        let description = if known(description) {
            description.trim().to_string()
        } else {
            String::new()
        };
        let name = if description.is_empty() {
            format!("Product for NSN {}", nsn)
        } else {
            description.clone()
        };

        let product = CrmProduct {
            id: new_id(),
            name,
            nsn: nsn.to_string(),
            description,
        };
        let id = product.id.clone();
        self.products.push(product);
        Ok(id)
    }

    fn create_opportunity(&mut self, opportunity: Opportunity) -> ExtractResult<String> {
        let id = new_id();
        self.opportunities.push(CrmOpportunity {
            id: id.clone(),
            opportunity,
        });
        Ok(id)
    }

    fn create_qpl_entry(
        &mut self,
        entry: &ManufacturerEntry,
        product_id: &str,
    ) -> ExtractResult<String> {
        if let Some(existing) = self.qpl_entries.iter().find(|q| {
            q.product_id == product_id
                && q.manufacturer.cage_code == entry.cage_code
                && q.manufacturer.part_number == entry.part_number
        }) {
            return Ok(existing.id.clone());
        }

        let qpl = QplEntry {
            id: new_id(),
            product_id: product_id.to_string(),
            manufacturer: entry.clone(),
        };
        let id = qpl.id.clone();
        self.qpl_entries.push(qpl);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dibbs_core::{BuyerBlock, SolicitationRecord, YesNo};
    use tempfile::tempdir;

    fn buyer() -> BuyerBlock {
        BuyerBlock {
            office: "DLA LAND AND MARITIME".to_string(),
            division: "DIVISION 3".to_string(),
            address: "PO BOX 3990 COLUMBUS OH".to_string(),
            name: "JANE Q BUYER".to_string(),
            buyer_code: "PMDA123".to_string(),
            tel: "614-692-0000".to_string(),
            fax: "N/A".to_string(),
            email: "jane.buyer@dla.mil".to_string(),
            info: None,
        }
    }

    fn solicitation(request: &str, nsn: &str, buyer: BuyerBlock) -> ExtractedSolicitation {
        let record = SolicitationRecord {
            request_number: Some(request.to_string()),
            open_date: Some("JUN 17, 2024".to_string()),
            close_date: Some("SEP 27, 2024".to_string()),
            purchase_number: "7006123456".to_string(),
            nsn: nsn.to_string(),
            fsc: "5331".to_string(),
            delivery_days: "180".to_string(),
            payment_history: MANUALLY_CHECK.to_string(),
            unit: Some("EA".to_string()),
            quantity: 25,
            fob: "DESTINATION".to_string(),
            iso: YesNo::No,
            inspection_point: Some("DESTINATION".to_string()),
            sampling: YesNo::No,
            product_description: "O-RING".to_string(),
            mfr: "PARKER-HANNIFIN CORPORATION 83259 P/N 708009-12 MOOG INC 94697 P/N 58532-012"
                .to_string(),
            packaging: MANUALLY_CHECK.to_string(),
            package_type: None,
            buyer,
        };
        ExtractedSolicitation::new(record, format!("{}.pdf", request))
    }

    #[test]
    fn test_publish_links_everything() {
        let mut export = CrmExport::new();
        let published =
            publish_solicitation(&mut export, &solicitation("SPE1", "5331012345678", buyer()))
                .unwrap();

        assert_eq!(export.accounts.len(), 3);
        assert_eq!(export.contacts.len(), 1);
        assert_eq!(export.products.len(), 1);
        assert_eq!(export.opportunities.len(), 1);
        assert_eq!(export.qpl_entries.len(), 2);

        let opportunity = &export.opportunities[0];
        assert_eq!(opportunity.id, published.opportunity_id);
        assert_eq!(opportunity.opportunity.name, "SPE1 - O-RING");
        assert_eq!(opportunity.opportunity.account_id, published.account_id);
        assert_eq!(opportunity.opportunity.contact_id, published.contact_id);
        assert_eq!(export.contacts[0].account_id, published.account_id);
        assert_eq!(export.qpl_entries[1].manufacturer.cage_code, "94697");
        assert_eq!(published.vendor_account_ids.len(), 2);
    }

    #[test]
    fn test_create_or_find_dedups() {
        let mut export = CrmExport::new();
        let first =
            publish_solicitation(&mut export, &solicitation("SPE1", "5331012345678", buyer()))
                .unwrap();
        let second =
            publish_solicitation(&mut export, &solicitation("SPE2", "5331012345678", buyer()))
                .unwrap();

        assert_eq!(first.account_id, second.account_id);
        assert_eq!(first.contact_id, second.contact_id);
        assert_eq!(first.product_id, second.product_id);
        assert_eq!(first.qpl_ids, second.qpl_ids);
        assert_ne!(first.opportunity_id, second.opportunity_id);
        assert_eq!(export.accounts.len(), 3);
        assert_eq!(export.opportunities.len(), 2);
        assert_eq!(export.qpl_entries.len(), 2);
    }

    #[test]
    fn test_vendor_accounts_keyed_by_cage() {
        let mut export = CrmExport::new();

        let parker = export
            .create_or_update_vendor_account("PARKER-HANNIFIN CORPORATION", "83259")
            .unwrap();
        let renamed = export
            .create_or_update_vendor_account("PARKER HANNIFIN CORP", "83259")
            .unwrap();
        assert_eq!(parker, renamed);
        assert_eq!(export.accounts.len(), 1);
        assert_eq!(export.accounts[0].name, "PARKER HANNIFIN CORP");
        assert_eq!(export.accounts[0].division, "CAGE 83259");

        let first = export.create_or_update_vendor_account("ACME INC", "11111").unwrap();
        let second = export.create_or_update_vendor_account("ACME INC", "22222").unwrap();
        assert_ne!(first, second);

        let acme = export.accounts.iter().filter(|a| a.name == "ACME INC").count();
        assert_eq!(acme, 2);
    }

    #[test]
    fn test_vendor_and_buyer_accounts_do_not_merge() {
        let mut export = CrmExport::new();
        let vendor = export
            .create_or_update_vendor_account("DLA LAND AND MARITIME", "12345")
            .unwrap();
        let buyer = export
            .create_or_find_account("DLA LAND AND MARITIME", "DIVISION 3", "PO BOX 3990")
            .unwrap();
        assert_ne!(vendor, buyer);
        assert_eq!(export.accounts.len(), 2);
    }

    #[test]
    fn test_unmatched_buyer_creates_no_account_or_contact() {
        let mut export = CrmExport::new();
        let published = publish_solicitation(
            &mut export,
            &solicitation("SPE1", "5331012345678", BuyerBlock::unmatched()),
        )
        .unwrap();

        assert!(published.account_id.is_none());
        assert!(published.contact_id.is_none());
        assert!(export.contacts.is_empty());
        // Only the two vendor accounts.
        assert_eq!(export.accounts.len(), 2);
    }

    #[test]
    fn test_unknown_nsn_skips_product_and_qpl() {
        let mut export = CrmExport::new();
        let published =
            publish_solicitation(&mut export, &solicitation("SPE1", MANUALLY_CHECK, buyer()))
                .unwrap();

        assert!(published.product_id.is_none());
        assert!(export.products.is_empty());
        assert!(export.qpl_entries.is_empty());
        assert_eq!(export.opportunities.len(), 1);
    }

    #[test]
    fn test_product_name_fallback() {
        let mut export = CrmExport::new();
        export
            .create_or_find_product("5331000000001", MANUALLY_CHECK)
            .unwrap();
        assert_eq!(export.products[0].name, "Product for NSN 5331000000001");
        assert_eq!(export.products[0].description, "");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 6, 17).unwrap();
        let path = crm_export_path(dir.path(), date);
        assert!(path.ends_with("2024-06-17_crm_import.json"));

        let mut export = CrmExport::load_or_new(&path).unwrap();
        assert!(export.is_empty());
        publish_solicitation(&mut export, &solicitation("SPE1", "5331012345678", buyer()))
            .unwrap();
        export.save_to(&path).unwrap();

        let mut reloaded = CrmExport::load_or_new(&path).unwrap();
        assert_eq!(reloaded.opportunities, export.opportunities);

        publish_solicitation(&mut reloaded, &solicitation("SPE2", "5331012345678", buyer()))
            .unwrap();
        assert_eq!(reloaded.products.len(), 1);
        assert_eq!(reloaded.opportunities.len(), 2);
    }
}
