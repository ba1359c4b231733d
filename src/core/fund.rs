//! Fund directory and net value abstractions

use crate::core::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundInfo {
    pub identifier: String,
    pub name: String,
}

/// Fund identifier to fund info, as published by a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundDirectory {
    pub funds: HashMap<String, FundInfo>,
}

impl FundDirectory {
    pub fn new(funds: impl IntoIterator<Item = FundInfo>) -> Self {
        Self {
            funds: funds
                .into_iter()
                .map(|info| (info.identifier.clone(), info))
                .collect(),
        }
    }

    pub fn get(&self, fund_id: &str) -> Option<&FundInfo> {
        self.funds.get(fund_id)
    }

    pub fn len(&self) -> usize {
        self.funds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funds.is_empty()
    }
}

/// Net value of one fund unit on one trading day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetValuePoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

/// One provider-defined batch of a fund's net value history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub page_number: u32,
    pub points: Vec<NetValuePoint>,
    pub has_more: bool,
    pub total_count: Option<u64>,
}

#[async_trait]
pub trait NavProvider: Send + Sync {
    /// Namespace used to scope cached data for this provider.
    fn name(&self) -> &str;

    /// Number of points per page, part of every page's request identity.
    fn page_size(&self) -> usize;

    async fn fetch_fund_directory(&self) -> Result<FundDirectory>;

    async fn fetch_net_value_page(&self, fund_id: &str, page_number: u32) -> Result<Page>;
}

#[async_trait]
impl<T: NavProvider + ?Sized> NavProvider for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn page_size(&self) -> usize {
        (**self).page_size()
    }

    async fn fetch_fund_directory(&self) -> Result<FundDirectory> {
        (**self).fetch_fund_directory().await
    }

    async fn fetch_net_value_page(&self, fund_id: &str, page_number: u32) -> Result<Page> {
        (**self).fetch_net_value_page(fund_id, page_number).await
    }
}
