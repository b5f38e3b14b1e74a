//! Performance columns derived from the `AdditionalInfo` JSON of VM rows.

use crate::error::{EncodeError, Result};
use polars::prelude::*;
use serde_json::Value;

pub const ADDITIONAL_INFO: &str = "AdditionalInfo";
pub const CONSUMED_QTY: &str = "ConsumedQty";
pub const VCPUS: &str = "VCPUs";

fn parse_info(text: Option<&str>) -> Option<Value> {
    serde_json::from_str::<Value>(text?)
        .ok()
        .filter(Value::is_object)
}

/// `ConsumedQuantity` member of an `AdditionalInfo` cell.
pub fn consumed_quantity(text: Option<&str>) -> Option<f64> {
    parse_info(text)?.get("ConsumedQuantity")?.as_f64()
}

/// `VCPUs` member of an `AdditionalInfo` cell.
pub fn vcpus(text: Option<&str>) -> Option<i64> {
    parse_info(text)?.get("VCPUs")?.as_i64()
}

/// Append `ConsumedQty` (Float64) and `VCPUs` (Int64). Unparseable cells give nulls.
pub fn add_performance_columns(mut df: DataFrame) -> Result<DataFrame> {
    let info = df
        .column(ADDITIONAL_INFO)
        .map_err(|_| EncodeError::MissingColumn(ADDITIONAL_INFO.to_owned()))?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let info = info.str()?;

    let consumed: Vec<Option<f64>> = info.into_iter().map(consumed_quantity).collect();
    let cpus: Vec<Option<i64>> = info.into_iter().map(vcpus).collect();

    df.with_column(Series::new(CONSUMED_QTY.into(), consumed))?;
    df.with_column(Series::new(VCPUS.into(), cpus))?;
    Ok(df)
}
