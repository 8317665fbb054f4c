// src/present/chart.rs

use serde_json::{json, Value};
use tracing::warn;

use crate::table::{Indicator, IndicatorTable, DATE_COLUMN};

const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// A titled Vega-Lite chart ready to be embedded in the page.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSection {
    pub heading: &'static str,
    pub spec: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

fn base(records: &[Value], dims: Dimensions, mark: &str) -> Value {
    json!({
        "$schema": VEGA_LITE_SCHEMA,
        "width": dims.width,
        "height": dims.height,
        "data": { "values": records },
        "mark": mark,
    })
}

/// Records carry date-only strings, which Vega reads as UTC midnight.
fn date_axis() -> Value {
    json!({
        "field": DATE_COLUMN,
        "type": "temporal",
        "timeUnit": "utcyearmonth",
        "title": DATE_COLUMN,
    })
}

fn quantity(name: &str) -> Value {
    json!({ "field": name, "type": "quantitative", "title": name })
}

fn with_encoding(mut spec: Value, encoding: Value) -> Value {
    spec["encoding"] = encoding;
    spec
}

/// Line chart of one indicator over time, with a date/value tooltip.
pub fn trend_line(records: &[Value], dims: Dimensions, indicator: Indicator) -> Value {
    let name = indicator.name();
    with_encoding(
        base(records, dims, "line"),
        json!({
            "x": date_axis(),
            "y": quantity(name),
            "tooltip": [date_axis(), quantity(name)],
        }),
    )
}

/// Several indicators folded into `variable`/`value` and drawn as one line per indicator.
pub fn folded_lines(records: &[Value], dims: Dimensions, indicators: &[Indicator]) -> Value {
    let names: Vec<&str> = indicators.iter().map(|i| i.name()).collect();
    let mut spec = with_encoding(
        base(records, dims, "line"),
        json!({
            "x": date_axis(),
            "y": { "field": "value", "type": "quantitative" },
            "color": { "field": "variable", "type": "nominal" },
            "tooltip": [
                date_axis(),
                { "field": "variable", "type": "nominal" },
                { "field": "value", "type": "quantitative" },
            ],
        }),
    );
    spec["transform"] = json!([{ "fold": names, "as": ["variable", "value"] }]);
    spec
}

/// Bar chart of one indicator over time, with a date/value tooltip.
pub fn bars(records: &[Value], dims: Dimensions, indicator: Indicator) -> Value {
    let name = indicator.name();
    with_encoding(
        base(records, dims, "bar"),
        json!({
            "x": date_axis(),
            "y": quantity(name),
            "tooltip": [date_axis(), quantity(name)],
        }),
    )
}

/// The three dashboard charts, in page order.
pub fn dashboard_charts(table: &IndicatorTable, dims: Dimensions) -> Vec<ChartSection> {
    let charted = [
        Indicator::Population,
        Indicator::MalePopulation,
        Indicator::FemalePopulation,
        Indicator::GrowthRate,
    ];
    for ind in charted {
        if !table.has_column(ind.name()) {
            warn!(column = ind.name(), "charted column missing; chart will be empty");
        }
    }

    let records = table.to_records();
    vec![
        ChartSection {
            heading: "人口數變化趨勢",
            spec: trend_line(&records, dims, Indicator::Population),
        },
        ChartSection {
            heading: "男女人口數變化趨勢",
            spec: folded_lines(
                &records,
                dims,
                &[Indicator::MalePopulation, Indicator::FemalePopulation],
            ),
        },
        ChartSection {
            heading: "人口增加率變化趨勢",
            spec: bars(&records, dims, Indicator::GrowthRate),
        },
    ]
}
