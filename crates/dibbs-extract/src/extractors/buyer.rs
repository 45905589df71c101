//! Buyer / contracting office block.

use dibbs_core::{BuyerBlock, NO_FAX};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BUYER_BLOCK: Regex = Regex::new(
        r"(?mix)
        ^(?P<office>DLA.*?)\n                    # office
        (?P<division>.*?)\n                      # division
        (?P<street>.*?)\n                        # street address
        (?P<city>.*?)\n                          # city, state, zip
        (USA)\s*\n
        Name:\s*(?P<name>.*?)\s+
        Buyer\s*Code:(?P<code>\w+)\s+
        Tel:\s*(?P<tel>.*?)\s+
        (?:Fax:\s*(?P<fax>[\d-]+)\s+)?
        Email:\s*(?P<email>[^\s]+@[^\s]+)
        "
    )
    .unwrap();
    static ref BUYER_INFO: Regex = Regex::new(r"(?s)(DLA.*?)\s*6\. DELIVER").unwrap();
}

/// Extract the buyer block and the free-text buyer info.
///
/// The block is all-or-nothing: unless every line matches, all eight fields
/// are "Check Manually". `info` is the last "DLA ... 6. DELIVER" span in the
/// document, trimmed, independent of the block.
pub fn find_buyer(text: &str) -> BuyerBlock {
    let buyer = match BUYER_BLOCK.captures(text) {
        Some(caps) => BuyerBlock {
            office: caps["office"].to_string(),
            division: caps["division"].to_string(),
            address: format!("{} {}", &caps["street"], &caps["city"]),
            name: caps["name"].to_string(),
            buyer_code: caps["code"].to_string(),
            tel: caps["tel"].to_string(),
            fax: caps
                .name("fax")
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| NO_FAX.to_string()),
            email: caps["email"].to_string(),
            info: None,
        },
        None => BuyerBlock::unmatched(),
    };

    let info = BUYER_INFO
        .captures_iter(text)
        .last()
        .map(|caps| caps[1].trim().to_string());

    buyer.with_info(info)
}
