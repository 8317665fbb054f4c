// src/pipeline.rs

use std::{fs, path::Path};
use tracing::{error, info, instrument, warn};

use crate::config::{Config, OutputConfig};
use crate::error::{Error, Result};
use crate::fetch::{Clock, DataSource, DocumentSource, Origin, RemoteSource, SystemClock};
use crate::present::{self, PageOptions, FALLBACK_NOTICE};
use crate::reshape::{transform, ReshapeOptions};
use crate::table::IndicatorTable;

/// Result of one successful run.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub table: IndicatorTable,
    pub origin: Origin,
}

/// Fetch → reshape → render, one run at a time. The data source (and its
/// cache) lives as long as the dashboard.
pub struct Dashboard<S: DocumentSource, C: Clock = SystemClock> {
    source: DataSource<S, C>,
    reshape: ReshapeOptions,
    page: PageOptions,
}

impl Dashboard<RemoteSource, SystemClock> {
    pub fn from_config(config: &Config) -> Result<Self> {
        let remote = RemoteSource::new(config.endpoint()?, config.timeout())?;
        let source = DataSource::new(remote, config.cache_ttl(), config.source.fallback.clone());
        Ok(Self::new(source, config.reshape_options(), config.page_options()))
    }
}

impl<S: DocumentSource, C: Clock> Dashboard<S, C> {
    pub fn new(source: DataSource<S, C>, reshape: ReshapeOptions, page: PageOptions) -> Self {
        Self {
            source,
            reshape,
            page,
        }
    }

    /// Load the document and reshape it into the indicator table.
    pub fn snapshot(&mut self) -> Result<Snapshot> {
        let loaded = self.source.load()?;
        let table = transform(&loaded.document, &self.reshape)?;
        Ok(Snapshot {
            table,
            origin: loaded.origin,
        })
    }

    /// HTML for the run: the dashboard on success, the failure page otherwise.
    pub fn render(&mut self) -> (String, Result<Snapshot>) {
        match self.snapshot() {
            Ok(snap) => {
                let notice = snap.origin.is_fallback().then_some(FALLBACK_NOTICE);
                (present::render(&snap.table, &self.page, notice), Ok(snap))
            }
            Err(e) => (present::render_failure(&e, &self.page), Err(e)),
        }
    }

    /// Run once and write the page (and the optional Parquet export).
    ///
    /// The failure page is written before the error is returned. When that
    /// write fails too, the run's own error is still the one returned.
    #[instrument(level = "info", skip_all, fields(html = %output.html.display()))]
    pub fn publish(&mut self, output: &OutputConfig) -> Result<Origin> {
        let (html, outcome) = self.render();
        let written = write_page(&output.html, &html);

        match outcome {
            Ok(snap) => {
                written?;
                if snap.origin.is_fallback() {
                    warn!("{}", FALLBACK_NOTICE);
                }
                if let Some(path) = &output.parquet {
                    snap.table.write_parquet(path)?;
                }
                info!(rows = snap.table.num_rows(), origin = ?snap.origin, "dashboard published");
                Ok(snap.origin)
            }
            Err(e) => {
                match written {
                    Ok(()) => error!(kind = e.kind(), error = %e, "run failed; wrote failure page"),
                    Err(w) => error!(
                        kind = e.kind(),
                        error = %e,
                        write_error = %w,
                        "run failed; could not write failure page"
                    ),
                }
                Err(e)
            }
        }
    }
}

fn write_page(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::from_io(parent, e))?;
    }
    fs::write(path, html).map_err(|e| Error::from_io(path, e))
}
