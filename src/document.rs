// src/document.rs

use serde_json::{Map, Value};
use std::{fs, path::Path};

use crate::error::{Error, Result};

/// An SDMX-JSON response as returned by the statistics endpoint, kept opaque
/// until the reshaper walks it.
///
/// Object keys keep the order in which they appear in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument(Value);

/// One series and its observations, borrowed from a [`RawDocument`].
#[derive(Debug, Clone, Copy)]
pub struct Series<'a> {
    pub key: &'a str,
    pub observations: &'a Map<String, Value>,
}

impl RawDocument {
    /// Parse a JSON body. `origin` names the URL or path for error messages.
    pub fn from_slice(bytes: &[u8], origin: &str) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map(RawDocument)
            .map_err(|source| Error::Parse {
                origin: origin.to_string(),
                source,
            })
    }

    pub fn from_value(value: Value) -> Self {
        RawDocument(value)
    }

    /// Read and parse a document stored on disk.
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| Error::from_io(path, e))?;
        Self::from_slice(&bytes, &path.display().to_string())
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// `data.dataSets[0].series`, in document order.
    pub fn series(&self) -> Result<Vec<Series<'_>>> {
        let data_sets = self
            .0
            .get("data")
            .ok_or_else(|| Error::Schema("missing `data`".into()))?
            .get("dataSets")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::Schema("missing `data.dataSets` array".into()))?;
        let first = data_sets
            .first()
            .ok_or_else(|| Error::Schema("`data.dataSets` is empty".into()))?;
        let series = first
            .get("series")
            .and_then(Value::as_object)
            .ok_or_else(|| Error::Schema("missing `data.dataSets[0].series` object".into()))?;

        series
            .iter()
            .map(|(key, entry)| {
                let observations = entry
                    .get("observations")
                    .and_then(Value::as_object)
                    .ok_or_else(|| {
                        Error::Schema(format!("series {key:?} has no `observations` object"))
                    })?;
                Ok(Series {
                    key: key.as_str(),
                    observations,
                })
            })
            .collect()
    }

    /// Ids of the time dimension values, e.g. `["2019-M01", "2019-M02", ...]`.
    ///
    /// Picks the observation dimension with id `TIME_PERIOD` or role `time`,
    /// falling back to the only dimension if there is exactly one.
    pub fn time_periods(&self) -> Result<Vec<&str>> {
        let dims = self
            .0
            .pointer("/data/structure/dimensions/observation")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                Error::Schema("missing `data.structure.dimensions.observation`".into())
            })?;

        let is_time = |d: &&Value| {
            d.get("id").and_then(Value::as_str) == Some("TIME_PERIOD")
                || d.get("role").and_then(Value::as_str) == Some("time")
        };
        let dim = match dims.iter().find(is_time) {
            Some(d) => d,
            None if dims.len() == 1 => &dims[0],
            None => return Err(Error::Schema("no time dimension among observation dimensions".into())),
        };

        dim.get("values")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::Schema("time dimension has no `values` array".into()))?
            .iter()
            .enumerate()
            .map(|(i, v)| {
                v.get("id")
                    .and_then(Value::as_str)
                    .ok_or_else(|| Error::Schema(format!("time dimension value #{i} has no `id`")))
            })
            .collect()
    }
}

/// First scalar of an observation array: a number, a numeric string, or null.
pub fn first_scalar(obs: &Value) -> Result<Option<f64>> {
    let first = obs
        .as_array()
        .and_then(|a| a.first())
        .ok_or_else(|| Error::Schema(format!("observation {obs} is not a non-empty array")))?;
    match first {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| Error::Schema(format!("observation value {n} is not representable"))),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| Error::Schema(format!("observation value {s:?} is not numeric"))),
        other => Err(Error::Schema(format!("observation value {other} is not a scalar"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn series_keep_document_order() {
        let text = r#"{"data":{"dataSets":[{"series":{
            "0:0":{"observations":{"0":[1]}},
            "10:0":{"observations":{"0":[2]}},
            "2:0":{"observations":{"0":[3]}}
        }}]}}"#;
        let doc = RawDocument::from_slice(text.as_bytes(), "inline").unwrap();
        let keys: Vec<_> = doc.series().unwrap().iter().map(|s| s.key).collect();
        assert_eq!(keys, vec!["0:0", "10:0", "2:0"]);
    }

    #[test]
    fn missing_levels_are_schema_errors() {
        let cases = [
            json!({}),
            json!({"data": {}}),
            json!({"data": {"dataSets": []}}),
            json!({"data": {"dataSets": [{}]}}),
            json!({"data": {"dataSets": [{"series": {"0": {}}}]}}),
        ];
        for value in cases {
            let err = RawDocument::from_value(value.clone()).series().unwrap_err();
            assert_eq!(err.kind(), "schema", "case {value}");
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = RawDocument::from_slice(b"<html>busy</html>", "https://example.test").unwrap_err();
        assert_eq!(err.kind(), "parse");
        assert!(err.to_string().contains("https://example.test"));
    }

    #[test]
    fn scalar_variants() {
        assert_eq!(first_scalar(&json!([1.5, 0])).unwrap(), Some(1.5));
        assert_eq!(first_scalar(&json!([" 42 "])).unwrap(), Some(42.0));
        assert_eq!(first_scalar(&json!([null])).unwrap(), None);
        assert!(first_scalar(&json!([])).is_err());
        assert!(first_scalar(&json!(3)).is_err());
        assert!(first_scalar(&json!(["n/a"])).is_err());
        assert!(first_scalar(&json!([true])).is_err());
    }

    #[test]
    fn time_periods_prefer_time_dimension() {
        let doc = RawDocument::from_value(json!({"data": {"structure": {"dimensions": {"observation": [
            {"id": "OTHER", "values": [{"id": "x"}]},
            {"id": "TIME_PERIOD", "values": [{"id": "2019-M01"}, {"id": "2019-M02"}]}
        ]}}}}));
        assert_eq!(doc.time_periods().unwrap(), vec!["2019-M01", "2019-M02"]);

        let single = RawDocument::from_value(json!({"data": {"structure": {"dimensions": {"observation": [
            {"id": "PERIOD", "values": [{"id": "2020-03"}]}
        ]}}}}));
        assert_eq!(single.time_periods().unwrap(), vec!["2020-03"]);

        let missing = RawDocument::from_value(json!({"data": {}}));
        assert_eq!(missing.time_periods().unwrap_err().kind(), "schema");
    }
}
