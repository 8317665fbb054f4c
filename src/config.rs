// src/config.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use url::Url;

use crate::error::{Error, Result};
use crate::present::{Layout, PageOptions};
use crate::reshape::{IndexPolicy, MonthAnchor, MonthlyCalendar, ReshapeOptions, SeriesBinding};

pub const DEFAULT_ENDPOINT: &str = "https://nstatdb.dgbas.gov.tw/dgbasall/webMain.aspx?sdmx/a130201010/1+2+3+4+5+6+7+8+9+10+11+12...M.&startTime=2019&endTime=2024-M4";

/// Top-level settings, read from YAML. Every field has a default, so an
/// empty file is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub source: SourceConfig,
    pub index: IndexConfig,
    pub series: SeriesConfig,
    pub page: PageConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub url: String,
    pub fallback: PathBuf,
    pub timeout_secs: u64,
    pub cache_ttl_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENDPOINT.to_string(),
            fallback: PathBuf::from("data/population_fallback.json"),
            timeout_secs: 10,
            cache_ttl_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexSource {
    #[default]
    Synthetic,
    TimeDimension,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    pub source: IndexSource,
    pub start: NaiveDate,
    pub anchor: MonthAnchor,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            source: IndexSource::Synthetic,
            start: MonthlyCalendar::default().start(),
            anchor: MonthAnchor::MonthStart,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesOrder {
    #[default]
    Document,
    KeyOrdinal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeriesConfig {
    pub order: SeriesOrder,
    /// Explicit series keys, one per indicator column; overrides `order`.
    pub keys: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    pub title: String,
    pub icon: String,
    pub layout: Layout,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for PageConfig {
    fn default() -> Self {
        let page = PageOptions::default();
        Self {
            title: page.title,
            icon: page.icon,
            layout: page.layout,
            chart_width: page.chart_width,
            chart_height: page.chart_height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub html: PathBuf,
    pub parquet: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            html: PathBuf::from("dashboard.html"),
            parquet: None,
        }
    }
}

impl Config {
    /// Read a YAML config file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::from_io(path, e))?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: Config = if text.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(text).map_err(|e| Error::Config(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.endpoint()?;
        if self.source.timeout_secs == 0 {
            return Err(Error::Config("source.timeout_secs must be positive".into()));
        }
        if self.page.chart_width == 0 || self.page.chart_height == 0 {
            return Err(Error::Config("chart dimensions must be positive".into()));
        }
        if let Some(keys) = &self.series.keys {
            if keys.len() != crate::table::INDICATOR_COUNT {
                return Err(Error::Config(format!(
                    "series.keys lists {} keys, expected {}",
                    keys.len(),
                    crate::table::INDICATOR_COUNT
                )));
            }
        }
        Ok(())
    }

    pub fn endpoint(&self) -> Result<Url> {
        Url::parse(&self.source.url)
            .map_err(|e| Error::Config(format!("source.url {:?}: {e}", self.source.url)))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.source.cache_ttl_secs)
    }

    pub fn reshape_options(&self) -> ReshapeOptions {
        let binding = match (&self.series.keys, self.series.order) {
            (Some(keys), _) => SeriesBinding::Explicit(keys.clone()),
            (None, SeriesOrder::Document) => SeriesBinding::Document,
            (None, SeriesOrder::KeyOrdinal) => SeriesBinding::KeyOrdinal,
        };
        let index = match self.index.source {
            IndexSource::Synthetic => {
                IndexPolicy::Synthetic(MonthlyCalendar::new(self.index.start, self.index.anchor))
            }
            IndexSource::TimeDimension => IndexPolicy::TimeDimension(self.index.anchor),
        };
        ReshapeOptions { binding, index }
    }

    pub fn page_options(&self) -> PageOptions {
        PageOptions {
            title: self.page.title.clone(),
            icon: self.page.icon.clone(),
            layout: self.page.layout,
            chart_width: self.page.chart_width,
            chart_height: self.page.chart_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.reshape_options(), ReshapeOptions::default());
        assert_eq!(config.endpoint().unwrap().host_str(), Some("nstatdb.dgbas.gov.tw"));
    }

    #[test]
    fn partial_yaml_overrides_only_given_fields() {
        let yaml = r#"
source:
  fallback: /srv/popdash/snapshot.json
  timeout_secs: 3
index:
  source: time_dimension
  anchor: month_end
page:
  layout: centered
output:
  parquet: out/indicators.parquet
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.source.url, DEFAULT_ENDPOINT);
        assert_eq!(config.source.fallback, PathBuf::from("/srv/popdash/snapshot.json"));
        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert_eq!(
            config.reshape_options().index,
            IndexPolicy::TimeDimension(MonthAnchor::MonthEnd)
        );
        assert_eq!(config.page_options().layout, Layout::Centered);
        assert_eq!(config.page_options().chart_width, 800);
        assert_eq!(config.output.html, PathBuf::from("dashboard.html"));
        assert_eq!(config.output.parquet, Some(PathBuf::from("out/indicators.parquet")));
    }

    #[test]
    fn synthetic_start_is_configurable() {
        let config = Config::from_yaml("index:\n  start: 2020-07-01\n").unwrap();
        match config.reshape_options().index {
            IndexPolicy::Synthetic(cal) => {
                assert_eq!(cal.start(), NaiveDate::from_ymd_opt(2020, 7, 1).unwrap())
            }
            other => panic!("unexpected policy {other:?}"),
        }
    }

    #[test]
    fn explicit_keys_take_precedence() {
        let keys: Vec<String> = (0..12).map(|n| format!("{n}:0:0")).collect();
        let yaml = format!("series:\n  order: key_ordinal\n  keys: {keys:?}\n");
        let config = Config::from_yaml(&yaml).unwrap();
        assert_eq!(config.reshape_options().binding, SeriesBinding::Explicit(keys));
    }

    #[test]
    fn invalid_values_are_config_errors() {
        for yaml in [
            "source:\n  url: not a url\n",
            "source:\n  timeout_secs: 0\n",
            "series:\n  keys: [\"0:0\"]\n",
            "page:\n  chart_width: 0\n",
            "colour: blue\n",
        ] {
            assert_eq!(Config::from_yaml(yaml).unwrap_err().kind(), "config", "{yaml}");
        }
    }

    #[test]
    fn example_file_spells_out_the_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("popdash.example.yaml");
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }

    #[test]
    fn load_reads_from_disk() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "source:\n  cache_ttl_secs: 30").unwrap();
        assert_eq!(Config::load(f.path()).unwrap().cache_ttl(), Duration::from_secs(30));

        let missing = f.path().with_extension("absent.yaml");
        assert_eq!(Config::load(&missing).unwrap_err().kind(), "not_found");
    }
}
