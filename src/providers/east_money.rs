use crate::core::config::EastMoneyProviderConfig;
use crate::core::error::{FundError, Result};
use crate::core::fund::{FundDirectory, FundInfo, NavProvider, NetValuePoint, Page};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use tracing::{debug, instrument};

pub const NAMESPACE: &str = "east-money";
const REFERER: &str = "http://fundf10.eastmoney.com/";

/// Client for the East Money fund directory and NAV history endpoints.
pub struct EastMoneyProvider {
    fund_list_url: String,
    api_base_url: String,
    page_size: usize,
    client: reqwest::Client,
}

impl EastMoneyProvider {
    pub fn new(config: &EastMoneyProviderConfig) -> Result<Self> {
        if config.page_size == 0 {
            return Err(FundError::InvalidInput(
                "page size must be positive".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .user_agent("navstat/0.1")
            .build()
            .map_err(|e| FundError::transport("building HTTP client", e))?;
        Ok(Self {
            fund_list_url: config.fund_list_url.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size,
            client,
        })
    }

    async fn get_text(&self, url: &str, operation: &str) -> Result<String> {
        debug!("Requesting {} from {}", operation, url);
        let response = self
            .client
            .get(url)
            .header(reqwest::header::REFERER, REFERER)
            .send()
            .await
            .map_err(|e| FundError::transport(operation, e))?
            .error_for_status()
            .map_err(|e| FundError::transport(operation, e))?;

        response
            .text()
            .await
            .map_err(|e| FundError::transport(operation, e))
    }
}

/// Parses `var r = [["000001","HXCZHH","Name","Type","PINYIN"], ...];`.
fn parse_fund_directory(body: &str) -> Result<FundDirectory> {
    const OPERATION: &str = "fund directory";
    let start = body
        .find('[')
        .ok_or_else(|| FundError::decode(OPERATION, "no array literal in response"))?;
    let end = body
        .rfind(']')
        .filter(|end| *end >= start)
        .ok_or_else(|| FundError::decode(OPERATION, "unterminated array literal"))?;

    let rows: Vec<Vec<String>> =
        serde_json::from_str(&body[start..=end]).map_err(|e| FundError::decode(OPERATION, e))?;

    let funds = rows
        .into_iter()
        .map(|row| match (row.first(), row.get(2)) {
            (Some(identifier), Some(name)) if !identifier.is_empty() => Ok(FundInfo {
                identifier: identifier.clone(),
                name: name.clone(),
            }),
            _ => Err(FundError::decode(
                OPERATION,
                format!("unexpected fund row: {row:?}"),
            )),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(FundDirectory::new(funds))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LsjzResponse {
    /// An object on success, an empty string when the provider reports an error.
    #[serde(default)]
    data: serde_json::Value,
    err_code: i64,
    #[serde(default)]
    err_msg: Option<String>,
    #[serde(default)]
    total_count: u64,
}

#[derive(Debug, Deserialize)]
struct LsjzData {
    #[serde(rename = "LSJZList", default)]
    lsjz_list: Vec<LsjzRow>,
}

#[derive(Debug, Deserialize)]
struct LsjzRow {
    /// Net value date.
    #[serde(rename = "FSRQ")]
    fsrq: String,
    /// Unit net value; empty for non-trading placeholder rows.
    #[serde(rename = "DWJZ", default)]
    dwjz: String,
}

fn parse_net_value_page(
    body: &str,
    operation: &str,
    page_number: u32,
    page_size: usize,
) -> Result<Page> {
    let response: LsjzResponse =
        serde_json::from_str(body).map_err(|e| FundError::decode(operation, e))?;

    if response.err_code != 0 {
        return Err(FundError::transport(
            operation,
            format!(
                "provider error {}: {}",
                response.err_code,
                response.err_msg.unwrap_or_default()
            ),
        ));
    }

    let rows = if response.data.is_object() {
        serde_json::from_value::<LsjzData>(response.data)
            .map_err(|e| FundError::decode(operation, e))?
            .lsjz_list
    } else {
        Vec::new()
    };
    let mut points = Vec::with_capacity(rows.len());
    for row in rows {
        if row.dwjz.trim().is_empty() {
            debug!("Skipping row without net value for {}", row.fsrq);
            continue;
        }
        let date = NaiveDate::parse_from_str(row.fsrq.trim(), "%Y-%m-%d")
            .map_err(|e| FundError::decode(operation, format!("bad date '{}': {e}", row.fsrq)))?;
        let value = Decimal::from_str(row.dwjz.trim()).map_err(|e| {
            FundError::decode(operation, format!("bad net value '{}': {e}", row.dwjz))
        })?;
        points.push(NetValuePoint { date, value });
    }

    let fetched_through = u64::from(page_number) * page_size as u64;
    Ok(Page {
        page_number,
        points,
        has_more: fetched_through < response.total_count,
        total_count: Some(response.total_count),
    })
}

#[async_trait]
impl NavProvider for EastMoneyProvider {
    fn name(&self) -> &str {
        NAMESPACE
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    #[instrument(name = "EastMoneyDirectoryFetch", skip(self))]
    async fn fetch_fund_directory(&self) -> Result<FundDirectory> {
        let body = self.get_text(&self.fund_list_url, "fund directory").await?;
        let directory = parse_fund_directory(&body)?;
        debug!(funds = directory.len(), "Parsed fund directory");
        Ok(directory)
    }

    #[instrument(name = "EastMoneyPageFetch", skip(self))]
    async fn fetch_net_value_page(&self, fund_id: &str, page_number: u32) -> Result<Page> {
        if fund_id.is_empty() {
            return Err(FundError::InvalidInput(
                "fund id must not be empty".to_string(),
            ));
        }
        if page_number == 0 {
            return Err(FundError::InvalidInput(
                "page numbers start at 1".to_string(),
            ));
        }

        let operation = format!("net values page {page_number} for fund {fund_id}");
        let page_index = page_number.to_string();
        let page_size = self.page_size.to_string();
        let url = reqwest::Url::parse_with_params(
            &format!("{}/f10/lsjz", self.api_base_url),
            &[
                ("fundCode", fund_id),
                ("pageIndex", page_index.as_str()),
                ("pageSize", page_size.as_str()),
            ],
        )
        .map_err(|e| FundError::transport(operation.as_str(), e))?;
        let body = self.get_text(url.as_str(), &operation).await?;
        parse_net_value_page(&body, &operation, page_number, self.page_size)
    }
}
