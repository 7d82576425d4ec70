// src/normalize.rs

use serde::Serialize;
use std::collections::HashSet;

use crate::countries::Iso2Resolver;
use crate::decode::DonorRecord;

/// Flag shortcode for the European Union, which is not an ISO3 country code
/// and never resolves through the mapping table.
const EU_FLAG_TOKEN: &str = ":eu: ";

/// One output row. Field order here is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRow {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Rank")]
    pub rank: i64,
    #[serde(rename = "DonorName")]
    pub donor_name: String,
    #[serde(rename = "DonorNameWithFlag")]
    pub donor_name_with_flag: String,
    #[serde(rename = "Iso3")]
    pub iso3: String,
    #[serde(rename = "Iso2")]
    pub iso2: String,
    #[serde(rename = "Earmarked")]
    pub earmarked: String,
    #[serde(rename = "UnEarmarked")]
    pub un_earmarked: String,
    #[serde(rename = "Total")]
    pub total: String,
}

/// Apply the per-record transformation rules, preserving input order:
/// drop aggregate rows, resolve the flag token and ISO variants, attach the
/// year. A code missing from the mapping table degrades silently to empty
/// iso2 and no flag.
pub fn normalize(
    records: &[DonorRecord],
    year: i32,
    resolver: &dyn Iso2Resolver,
    ignored_codes: &HashSet<String>,
) -> Vec<NormalizedRow> {
    records
        .iter()
        .filter_map(|record| {
            let iso3 = record.country_code.trim().to_lowercase();
            if iso3.is_empty() || ignored_codes.contains(&iso3) {
                return None;
            }

            let iso2 = resolver.resolve_iso2(&iso3).unwrap_or_default();
            let flag = if iso3 == "eu" {
                EU_FLAG_TOKEN.to_string()
            } else if iso2.is_empty() {
                String::new()
            } else {
                format!(":{iso2}: ")
            };

            Some(NormalizedRow {
                year,
                rank: record.rank,
                donor_name: record.donor_name.clone(),
                donor_name_with_flag: format!("{flag}{}", record.donor_name),
                iso3,
                iso2,
                earmarked: record.earmarked.clone(),
                un_earmarked: record.un_earmarked.clone(),
                total: record.total.clone(),
            })
        })
        .collect()
}
