//! Assembles the most recent N net values of a fund from a paged provider.
use crate::core::error::{FundError, Result};
use crate::core::fund::{FundInfo, NavProvider, NetValuePoint};
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// Progress callback invoked after each page with (page number, points so far).
pub type PageCallback = dyn Fn(u32, usize) + Send + Sync;

pub struct WindowAssembler<P: NavProvider> {
    provider: P,
    on_page: Option<Box<PageCallback>>,
}

/// Rejects requests that can never be satisfied, before any I/O.
pub fn validate_request(fund_id: &str, num_days: i64) -> Result<usize> {
    if fund_id.trim().is_empty() {
        return Err(FundError::InvalidInput(
            "fund id must not be empty".to_string(),
        ));
    }
    if num_days <= 0 {
        return Err(FundError::InvalidInput(format!(
            "number of days must be positive, got {num_days}"
        )));
    }
    usize::try_from(num_days)
        .map_err(|_| FundError::InvalidInput(format!("number of days is too large: {num_days}")))
}

impl<P: NavProvider> WindowAssembler<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            on_page: None,
        }
    }

    pub fn with_progress(mut self, on_page: impl Fn(u32, usize) + Send + Sync + 'static) -> Self {
        self.on_page = Some(Box::new(on_page));
        self
    }

    /// Looks the fund up in the provider's directory.
    pub async fn fund_info(&self, fund_id: &str) -> Result<FundInfo> {
        let directory = self.provider.fetch_fund_directory().await?;
        debug!(funds = directory.len(), "Fetched fund directory");
        directory
            .get(fund_id)
            .cloned()
            .ok_or_else(|| FundError::FundNotFound(fund_id.to_string()))
    }

    /// Returns exactly `num_days` points, oldest first, ending at the most
    /// recent point the provider knows of.
    ///
    /// Pages are requested strictly in order. The first occurrence of a date
    /// wins; a later page repeating it is ignored. Fails with
    /// [`FundError::InsufficientHistory`] when the provider runs out first.
    #[instrument(name = "AssembleWindow", skip(self))]
    pub async fn assemble(&self, fund_id: &str, num_days: i64) -> Result<Vec<NetValuePoint>> {
        let wanted = validate_request(fund_id, num_days)?;

        let mut accumulated: Vec<NetValuePoint> =
            Vec::with_capacity(wanted.min(self.provider.page_size()));
        let mut seen = HashSet::new();
        let mut page_number = 1;

        loop {
            let page = self
                .provider
                .fetch_net_value_page(fund_id, page_number)
                .await?;

            let before = accumulated.len();
            for point in page.points {
                if seen.insert(point.date) {
                    accumulated.push(point);
                }
            }
            let added = accumulated.len() - before;
            debug!(page_number, added, total = accumulated.len(), "Merged page");

            if let Some(on_page) = &self.on_page {
                on_page(page_number, accumulated.len());
            }

            if accumulated.len() >= wanted || !page.has_more || added == 0 {
                break;
            }
            page_number += 1;
        }

        if accumulated.len() < wanted {
            return Err(FundError::InsufficientHistory {
                fund_id: fund_id.to_string(),
                requested: wanted,
                available: accumulated.len(),
            });
        }

        accumulated.sort_by_key(|point| point.date);
        let window = accumulated.split_off(accumulated.len() - wanted);
        info!(
            pages = page_number,
            points = window.len(),
            "Assembled net value window"
        );
        Ok(window)
    }
}
