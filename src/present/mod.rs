// src/present/mod.rs

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::table::IndicatorTable;

pub mod chart;
mod page;

pub use chart::{dashboard_charts, ChartSection, Dimensions};

/// Shown above the data when the remote endpoint could not be used.
pub const FALLBACK_NOTICE: &str = "無法抓取網路資料，使用本地備份資料";

const TABLE_HEADING: &str = "人口指數資料表";
const FAILURE_HEADING: &str = "資料載入失敗";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    #[default]
    Wide,
    Centered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOptions {
    pub title: String,
    /// Emoji used as the favicon.
    pub icon: String,
    pub layout: Layout,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            title: "台灣人口指數資料".to_string(),
            icon: "📊".to_string(),
            layout: Layout::Wide,
            chart_width: 800,
            chart_height: 400,
        }
    }
}

impl PageOptions {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.chart_width,
            height: self.chart_height,
        }
    }
}

/// Render the dashboard: optional notice, the table view, then the three charts.
pub fn render(table: &IndicatorTable, options: &PageOptions, notice: Option<&str>) -> String {
    let mut body = String::new();
    if let Some(msg) = notice {
        body.push_str(&page::banner("warning", msg));
    }

    body.push_str(&page::heading(TABLE_HEADING));
    body.push_str(&page::table_view(table));

    let mut scripts = String::new();
    for (i, chart) in dashboard_charts(table, options.dimensions()).iter().enumerate() {
        let id = format!("chart-{i}");
        body.push_str(&page::heading(chart.heading));
        body.push_str(&page::chart_slot(&id));
        scripts.push_str(&page::embed_script(&id, &chart.spec.to_string()));
    }

    page::assemble(options, &body, &scripts)
}

/// Render the total-failure state: title and an error banner, no charts.
pub fn render_failure(error: &Error, options: &PageOptions) -> String {
    let mut body = page::heading(FAILURE_HEADING);
    body.push_str(&page::banner("error", &format!("[{}] {}", error.kind(), error)));
    page::assemble(options, &body, "")
}
