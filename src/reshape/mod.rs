// src/reshape/mod.rs

use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::document::{first_scalar, RawDocument, Series};
use crate::error::{Error, Result};
use crate::table::{IndicatorTable, INDICATOR_COUNT};

pub mod calendar;

pub use calendar::{parse_period, MonthAnchor, MonthlyCalendar};

/// How source series are matched to the twelve indicator columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SeriesBinding {
    /// Series in the order they appear in the document.
    #[default]
    Document,
    /// Series sorted by the numeric parts of their `a:b:c` keys.
    KeyOrdinal,
    /// One series key per column, in column order.
    Explicit(Vec<String>),
}

/// How each row gets its date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexPolicy {
    /// Row `i` is dated by position only; time indices are never parsed.
    Synthetic(MonthlyCalendar),
    /// Rows are dated from the document's time dimension.
    TimeDimension(MonthAnchor),
}

impl Default for IndexPolicy {
    fn default() -> Self {
        IndexPolicy::Synthetic(MonthlyCalendar::default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReshapeOptions {
    pub binding: SeriesBinding,
    pub index: IndexPolicy,
}

fn key_ordinal(key: &str) -> Result<Vec<u64>> {
    key.split(':')
        .map(|part| {
            part.trim()
                .parse::<u64>()
                .map_err(|_| Error::Schema(format!("series key {key:?} is not ordinal")))
        })
        .collect()
}

impl SeriesBinding {
    fn arrange<'a>(&self, mut series: Vec<Series<'a>>) -> Result<Vec<Series<'a>>> {
        let bound = match self {
            SeriesBinding::Document => series,
            SeriesBinding::KeyOrdinal => {
                let mut keyed = series
                    .drain(..)
                    .map(|s| key_ordinal(s.key).map(|k| (k, s)))
                    .collect::<Result<Vec<_>>>()?;
                keyed.sort_by(|a, b| a.0.cmp(&b.0));
                keyed.into_iter().map(|(_, s)| s).collect()
            }
            SeriesBinding::Explicit(keys) => {
                if keys.len() != INDICATOR_COUNT {
                    return Err(Error::Config(format!(
                        "explicit series binding lists {} keys, expected {}",
                        keys.len(),
                        INDICATOR_COUNT
                    )));
                }
                let by_key: HashMap<&str, Series<'a>> =
                    series.iter().map(|s| (s.key, *s)).collect();
                if by_key.len() > keys.len() {
                    debug!(
                        ignored = by_key.len() - keys.len(),
                        "document has series outside the explicit binding"
                    );
                }
                keys.iter()
                    .map(|k| {
                        by_key.get(k.as_str()).copied().ok_or_else(|| {
                            Error::Schema(format!("bound series key {k:?} is absent"))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?
            }
        };

        if bound.len() != INDICATOR_COUNT {
            return Err(Error::Shape {
                at: "series list".into(),
                expected: INDICATOR_COUNT,
                found: bound.len(),
            });
        }
        Ok(bound)
    }
}

/// Group observations by time index, one value per bound series, keeping
/// rows in order of first appearance.
fn accumulate_rows(series: &[Series<'_>]) -> Result<Vec<(String, Vec<Option<f64>>)>> {
    let mut rows: Vec<(String, Vec<Option<f64>>)> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();

    for s in series {
        for (time_index, obs) in s.observations {
            let value = first_scalar(obs).map_err(|e| match e {
                Error::Schema(msg) => {
                    Error::Schema(format!("series {:?}, time index {time_index:?}: {msg}", s.key))
                }
                other => other,
            })?;
            let at = *slot.entry(time_index.as_str()).or_insert_with(|| {
                rows.push((time_index.clone(), Vec::with_capacity(INDICATOR_COUNT)));
                rows.len() - 1
            });
            rows[at].1.push(value);
        }
    }
    Ok(rows)
}

fn dates_for(
    doc: &RawDocument,
    rows: &[(String, Vec<Option<f64>>)],
    policy: &IndexPolicy,
) -> Result<Vec<chrono::NaiveDate>> {
    match policy {
        IndexPolicy::Synthetic(calendar) => calendar.dates(rows.len()),
        IndexPolicy::TimeDimension(anchor) => {
            let periods = doc.time_periods()?;
            rows.iter()
                .map(|(time_index, _)| {
                    let id = time_index
                        .parse::<usize>()
                        .ok()
                        .and_then(|i| periods.get(i))
                        .ok_or_else(|| {
                            Error::Schema(format!(
                                "time index {time_index:?} has no entry in the time dimension"
                            ))
                        })?;
                    parse_period(id, *anchor)
                })
                .collect()
        }
    }
}

/// Reshape an SDMX observation document into the monthly indicator table.
#[instrument(level = "debug", skip_all)]
pub fn transform(doc: &RawDocument, options: &ReshapeOptions) -> Result<IndicatorTable> {
    let series = options.binding.arrange(doc.series()?)?;
    let rows = accumulate_rows(&series)?;
    let dates = dates_for(doc, &rows, &options.index)?;
    debug!(series = series.len(), rows = rows.len(), "reshaped observations");
    IndicatorTable::try_new(&dates, &rows)
}
