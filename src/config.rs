// src/config.rs

use chrono::{Datelike, Utc};
use std::collections::HashSet;
use std::path::PathBuf;

pub static ENDPOINT: &str = "https://oct.unocha.org/OCTws/OCHAOnline.asmx";
pub static SOAP_ACTION: &str = "https://oct.unocha.org/OCTws/GetDonorRankingForOCHAOnlineV2";

/// Fixed identifiers baked into every donor-ranking request.
#[derive(Debug, Clone, Copy)]
pub struct RequestIds {
    pub multi_donor_funds: u32,
    pub un_and_other_agencies: u32,
    pub private_donations: u32,
    pub exclude_donors: u32,
    pub project_group: u32,
}

impl Default for RequestIds {
    fn default() -> Self {
        Self {
            multi_donor_funds: 330,
            un_and_other_agencies: 330,
            private_donations: 44,
            exclude_donors: 44,
            project_group: 192,
        }
    }
}

/// Creation-date range filter carried in configuration.
///
/// Present for parity with the upstream job, which defines this filter but
/// never folds it into the request body. We keep that behavior: the filter
/// is logged at startup and otherwise unused.
#[derive(Debug, Clone)]
pub struct DateFilter {
    pub field: String,
    pub from: String,
    pub to: String,
}

/// One immutable configuration value for a whole run.
#[derive(Debug, Clone)]
pub struct Config {
    /// First year to query.
    pub start_year: i32,
    /// Exclusive upper bound, recomputed at each run start.
    pub end_year: i32,
    /// Lower-cased country codes excluded from output. These are aggregate
    /// rows (UN pooled funds, the "A" category, private contributions), not
    /// donor countries.
    pub ignored_codes: HashSet<String>,
    pub out_dir: PathBuf,
    pub endpoint: String,
    pub request: RequestIds,
    pub date_filter: Option<DateFilter>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start_year: 2008,
            end_year: Utc::now().year() + 1,
            ignored_codes: ["un", "a", "pri_con"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            out_dir: PathBuf::from("."),
            endpoint: ENDPOINT.to_string(),
            request: RequestIds::default(),
            date_filter: Some(DateFilter {
                field: "date.created".to_string(),
                from: "2024-01-01T00:00:00+00:00".to_string(),
                to: "2024-12-31T23:59:59+00:00".to_string(),
            }),
        }
    }
}
