// src/fetch.rs

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::{Config, SOAP_ACTION};

/// Build the SOAP request body for one year. Everything except `year` is a
/// constant identifier from the configuration.
pub fn build_envelope(config: &Config, year: i32) -> String {
    let ids = &config.request;
    [
        r#"<?xml version="1.0" encoding="utf-8"?>"#.to_string(),
        r#"<soap:Envelope xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">"#.to_string(),
        "    <soap:Body>".to_string(),
        r#"    <GetDonorRankingForOCHAOnlineV2 xmlns="https://oct.unocha.org/OCTws/">"#.to_string(),
        format!("        <year>{}</year>", year),
        format!("        <MultiDonorFundsIds>{}</MultiDonorFundsIds>", ids.multi_donor_funds),
        format!("        <UNandOtherAgenciesIds>{}</UNandOtherAgenciesIds>", ids.un_and_other_agencies),
        format!("        <PrivateDonationsIds>{}</PrivateDonationsIds>", ids.private_donations),
        format!("        <ExcludeDonorIds>{}</ExcludeDonorIds>", ids.exclude_donors),
        format!("        <ProjectGroupID>{}</ProjectGroupID>", ids.project_group),
        "    </GetDonorRankingForOCHAOnlineV2>".to_string(),
        "    </soap:Body>".to_string(),
        "</soap:Envelope>".to_string(),
    ]
    .join("\n")
}

/// Issue the donor-ranking request for `year` and return the raw response
/// body. One POST per call, no retries: a partial or replayed response cannot
/// be trusted for a historical dataset, so any transport fault is fatal to
/// the run.
pub async fn fetch_year(client: &Client, config: &Config, year: i32) -> Result<String> {
    let url = Url::parse(&config.endpoint)
        .with_context(|| format!("Invalid endpoint {}", config.endpoint))?;
    debug!(%url, year, "Fetching donor ranking");
    client
        .post(url.clone())
        .header("Content-Type", "text/xml;charset=UTF-8")
        .header("SOAPAction", SOAP_ACTION)
        .body(build_envelope(config, year))
        .send()
        .await
        .with_context(|| format!("POST {} failed for year {}", url, year))?
        .error_for_status()
        .with_context(|| format!("Non-success status for year {}", year))?
        .text()
        .await
        .with_context(|| format!("Reading response body for year {}", year))
}
