use super::ui;
use crate::core::{NavProvider, StatisticsResult, WindowAssembler, compute_basics, window};
use anyhow::Result;
use chrono::NaiveDate;
use tracing::info;

/// Everything needed to render the statistics report for one fund.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsReport {
    pub fund_id: String,
    pub fund_name: String,
    pub num_days: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub statistics: StatisticsResult,
}

/// Looks the fund up, assembles the window and computes its statistics.
pub async fn calculate<P: NavProvider>(
    assembler: &WindowAssembler<P>,
    fund_id: &str,
    num_days: i64,
) -> Result<StatisticsReport> {
    window::validate_request(fund_id, num_days)?;

    let fund = assembler.fund_info(fund_id).await?;
    let points = assembler.assemble(fund_id, num_days).await?;
    let statistics = compute_basics(&points)?;

    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        anyhow::bail!("Net value window for fund {fund_id} is empty");
    };

    Ok(StatisticsReport {
        fund_id: fund.identifier,
        fund_name: fund.name,
        num_days: points.len(),
        start_date: first.date,
        end_date: last.date,
        statistics,
    })
}

pub fn render_report(report: &StatisticsReport) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Fund ID"),
        ui::header_cell("Name"),
        ui::header_cell("Days"),
        ui::header_cell("Max"),
        ui::header_cell("Min"),
        ui::header_cell("Average"),
    ]);
    table.add_row(vec![
        comfy_table::Cell::new(&report.fund_id),
        comfy_table::Cell::new(&report.fund_name),
        ui::value_cell(report.num_days),
        ui::value_cell(report.statistics.max),
        ui::value_cell(report.statistics.min),
        ui::highlight_cell(format!("{:.4}", report.statistics.average)),
    ]);

    format!(
        "\n{}\n{table}\n{}",
        ui::style_text(
            &format!("Net value statistics: last {} days", report.num_days),
            ui::StyleType::Title
        ),
        ui::style_text(
            &format!("Window: {} to {}", report.start_date, report.end_date),
            ui::StyleType::Subtle
        ),
    )
}

pub async fn run<P: NavProvider>(provider: P, fund_id: &str, num_days: i64) -> Result<()> {
    info!("Calculating statistics for fund {}...", fund_id);

    let pb = ui::new_spinner("Fetching net value history");
    let progress = pb.clone();
    let assembler = WindowAssembler::new(provider).with_progress(move |page, total| {
        progress.set_message(format!("Fetched page {page} ({total} net values)"));
    });

    let report = calculate(&assembler, fund_id, num_days).await;
    pb.finish_and_clear();

    println!("{}", render_report(&report?));
    Ok(())
}
