// src/pipeline.rs

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::fs;
use tracing::{debug, info};

use crate::config::Config;
use crate::countries::{CountryTable, Iso2Resolver};
use crate::decode::{self, DonorRecord};
use crate::emit::{self, FileSink, Sink};
use crate::fetch;
use crate::normalize::normalize;

/// Where a year's donor records come from. The production source is the SOAP
/// service; tests substitute a canned one.
#[async_trait]
pub trait DonorSource: Send + Sync {
    async fn donors_for_year(&self, year: i32) -> Result<Vec<DonorRecord>>;
}

/// Fetch + decode against the real endpoint.
pub struct SoapSource {
    client: Client,
    config: Config,
}

impl SoapSource {
    pub fn new(client: Client, config: Config) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl DonorSource for SoapSource {
    async fn donors_for_year(&self, year: i32) -> Result<Vec<DonorRecord>> {
        let body = fetch::fetch_year(&self.client, &self.config, year).await?;
        decode::decode(&body).with_context(|| format!("decoding response for year {}", year))
    }
}

/// Drives the year loop: fetch, decode, normalize, emit. Strictly sequential;
/// the first fetch, decode, or filesystem failure aborts the run. Files for
/// years already completed stay on disk as written.
pub struct Pipeline<S> {
    config: Config,
    source: S,
    resolver: Box<dyn Iso2Resolver + Send + Sync>,
}

impl<S: DonorSource> Pipeline<S> {
    pub fn new(config: Config, source: S) -> Self {
        Self {
            config,
            source,
            resolver: Box::new(CountryTable),
        }
    }

    pub fn with_resolver(mut self, resolver: Box<dyn Iso2Resolver + Send + Sync>) -> Self {
        self.resolver = resolver;
        self
    }

    pub async fn run(&self) -> Result<()> {
        let out_dir = &self.config.out_dir;
        fs::create_dir_all(out_dir)
            .with_context(|| format!("creating output directory {}", out_dir.display()))?;

        if let Some(filter) = &self.config.date_filter {
            // Configured upstream but never wired into the request body.
            debug!(
                field = %filter.field,
                from = %filter.from,
                to = %filter.to,
                "Date filter configured but not applied to requests"
            );
        }

        let mut cumulative = FileSink::create(out_dir.join("data.csv"))?;
        let mut needs_header = true;

        for year in self.config.start_year..self.config.end_year {
            info!("Processing {year}");
            let records = self.source.donors_for_year(year).await?;
            let rows = normalize(
                &records,
                year,
                self.resolver.as_ref(),
                &self.config.ignored_codes,
            );

            cumulative.write_text(&emit::render(&rows, needs_header)?)?;
            needs_header = false;

            let mut year_sink = FileSink::create(out_dir.join(format!("data_{year}.csv")))?;
            year_sink.write_text(&emit::render(&rows, true)?)?;
            year_sink.close()?;
        }

        cumulative.close()
    }
}
