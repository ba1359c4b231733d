//! Aggregate statistics over a window of net values.
use crate::core::error::{FundError, Result};
use crate::core::fund::NetValuePoint;
use rust_decimal::Decimal;

/// Basic aggregates of a net value window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatisticsResult {
    pub max: Decimal,
    pub min: Decimal,
    pub average: Decimal,
}

/// Computes max, min and arithmetic mean of the point values.
///
/// The result does not depend on the order of `points`. Averages are computed
/// in `Decimal`, so the four decimal digits carried by fund NAVs survive
/// summation without drift.
pub fn compute_basics(points: &[NetValuePoint]) -> Result<StatisticsResult> {
    let first = points.first().ok_or_else(|| {
        FundError::EmptyInput("cannot compute statistics over zero net values".to_string())
    })?;

    let mut max = first.value;
    let mut min = first.value;
    let mut sum = Decimal::ZERO;
    for point in points {
        max = max.max(point.value);
        min = min.min(point.value);
        sum = sum
            .checked_add(point.value)
            .ok_or_else(|| FundError::InvalidInput("net value sum overflowed".to_string()))?;
    }

    let average = sum / Decimal::from(points.len());
    Ok(StatisticsResult {
        max,
        min,
        average: average.normalize(),
    })
}
