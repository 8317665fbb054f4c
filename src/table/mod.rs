// src/table/mod.rs

use arrow::{
    array::{Array, ArrayRef, Date32Array, Float64Array},
    datatypes::{DataType, Field, Schema, SchemaRef},
    record_batch::RecordBatch,
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::error::{Error, Result};

pub mod export;

/// Name of the date index column.
pub const DATE_COLUMN: &str = "date";

/// Number of indicator columns every row must carry.
pub const INDICATOR_COUNT: usize = 12;

/// The twelve published indicators, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    LandArea,
    Districts,
    Villages,
    Neighborhoods,
    Households,
    Population,
    GrowthRate,
    MalePopulation,
    FemalePopulation,
    SexRatio,
    HouseholdSize,
    Density,
}

impl Indicator {
    pub const ALL: [Indicator; INDICATOR_COUNT] = [
        Indicator::LandArea,
        Indicator::Districts,
        Indicator::Villages,
        Indicator::Neighborhoods,
        Indicator::Households,
        Indicator::Population,
        Indicator::GrowthRate,
        Indicator::MalePopulation,
        Indicator::FemalePopulation,
        Indicator::SexRatio,
        Indicator::HouseholdSize,
        Indicator::Density,
    ];

    /// Column label, exactly as published by DGBAS.
    pub fn name(self) -> &'static str {
        match self {
            Indicator::LandArea => "土地面積(平方公里)",
            Indicator::Districts => "鄉鎮市區數",
            Indicator::Villages => "村里數",
            Indicator::Neighborhoods => "鄰數",
            Indicator::Households => "戶數(戶)",
            Indicator::Population => "人口數(人)",
            Indicator::GrowthRate => "人口增加率(‰)",
            Indicator::MalePopulation => "男性人口數(人)",
            Indicator::FemalePopulation => "女性人口數(人)",
            Indicator::SexRatio => "人口性比例(每百女子所當男子數)",
            Indicator::HouseholdSize => "戶量(人/戶)",
            Indicator::Density => "人口密度(人/平方公里)",
        }
    }

    /// Position of this indicator in the table, after the date column.
    pub fn position(self) -> usize {
        self as usize
    }
}

static SCHEMA: Lazy<SchemaRef> = Lazy::new(|| {
    let mut fields = Vec::with_capacity(INDICATOR_COUNT + 1);
    fields.push(Field::new(DATE_COLUMN, DataType::Date32, false));
    fields.extend(
        Indicator::ALL
            .iter()
            .map(|ind| Field::new(ind.name(), DataType::Float64, /* nullable = */ true)),
    );
    Arc::new(Schema::new(fields))
});

/// Arrow schema shared by every [`IndicatorTable`]: `date` then the twelve indicators.
pub fn indicator_schema() -> SchemaRef {
    Arc::clone(&SCHEMA)
}

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch is a valid date")
}

/// Monthly indicator table. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorTable {
    batch: RecordBatch,
}

impl IndicatorTable {
    /// Build a table from one date and one row of values per month.
    ///
    /// Fails with [`Error::Shape`] on the first row that does not hold exactly
    /// [`INDICATOR_COUNT`] values; rows are never padded or truncated.
    pub fn try_new(dates: &[NaiveDate], rows: &[(String, Vec<Option<f64>>)]) -> Result<Self> {
        if dates.len() != rows.len() {
            return Err(Error::Shape {
                at: "date index".into(),
                expected: rows.len(),
                found: dates.len(),
            });
        }
        if let Some((label, values)) = rows.iter().find(|(_, v)| v.len() != INDICATOR_COUNT) {
            return Err(Error::Shape {
                at: format!("time index {label:?}"),
                expected: INDICATOR_COUNT,
                found: values.len(),
            });
        }

        let days: Vec<i32> = dates
            .iter()
            .map(|d| (*d - epoch()).num_days() as i32)
            .collect();
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(INDICATOR_COUNT + 1);
        columns.push(Arc::new(Date32Array::from(days)));
        for col in 0..INDICATOR_COUNT {
            let values: Float64Array = rows.iter().map(|(_, v)| v[col]).collect();
            columns.push(Arc::new(values));
        }

        let batch = RecordBatch::try_new(indicator_schema(), columns)?;
        Ok(Self { batch })
    }

    /// Wrap a batch read back from storage, checking it has the indicator schema.
    pub fn from_batch(batch: RecordBatch) -> Result<Self> {
        let expected = indicator_schema();
        let found = batch.schema();
        if found.fields().len() != expected.fields().len() {
            return Err(Error::Shape {
                at: "stored schema".into(),
                expected: expected.fields().len(),
                found: found.fields().len(),
            });
        }
        for (want, got) in expected.fields().iter().zip(found.fields()) {
            if want.name() != got.name() || want.data_type() != got.data_type() {
                return Err(Error::Schema(format!(
                    "stored column {:?} ({}) does not match {:?} ({})",
                    got.name(),
                    got.data_type(),
                    want.name(),
                    want.data_type()
                )));
            }
        }
        // Normalise nullability and metadata to the canonical schema.
        let batch = RecordBatch::try_new(expected, batch.columns().to_vec())?;
        Ok(Self { batch })
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.batch
            .schema_ref()
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.batch.schema_ref().index_of(name).is_ok()
    }

    fn date_array(&self) -> &Date32Array {
        self.batch
            .column(0)
            .as_any()
            .downcast_ref::<Date32Array>()
            .expect("column 0 is Date32 by construction")
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        let arr = self.date_array();
        (0..arr.len()).filter_map(|i| arr.value_as_date(i)).collect()
    }

    pub fn column(&self, indicator: Indicator) -> &Float64Array {
        self.batch
            .column(indicator.position() + 1)
            .as_any()
            .downcast_ref::<Float64Array>()
            .expect("indicator columns are Float64 by construction")
    }

    pub fn value(&self, row: usize, indicator: Indicator) -> Option<f64> {
        let col = self.column(indicator);
        if row >= col.len() || col.is_null(row) {
            None
        } else {
            Some(col.value(row))
        }
    }

    /// One JSON object per row, `{"date": "YYYY-MM-DD", <indicator>: value|null, ...}`.
    pub fn to_records(&self) -> Vec<Value> {
        let dates = self.dates();
        dates
            .iter()
            .enumerate()
            .map(|(row, date)| {
                let mut obj = Map::with_capacity(INDICATOR_COUNT + 1);
                obj.insert(
                    DATE_COLUMN.to_string(),
                    Value::String(date.format("%Y-%m-%d").to_string()),
                );
                for ind in Indicator::ALL {
                    let v = self
                        .value(row, ind)
                        .and_then(serde_json::Number::from_f64)
                        .map(Value::Number)
                        .unwrap_or(Value::Null);
                    obj.insert(ind.name().to_string(), v);
                }
                Value::Object(obj)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(label: &str, base: f64) -> (String, Vec<Option<f64>>) {
        (
            label.to_string(),
            (0..INDICATOR_COUNT).map(|i| Some(base + i as f64)).collect(),
        )
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn builds_date_plus_twelve_columns() {
        let dates = [ymd(2019, 1, 1), ymd(2019, 2, 1)];
        let table = IndicatorTable::try_new(&dates, &[row("0", 0.0), row("1", 100.0)]).unwrap();

        assert_eq!(table.num_rows(), 2);
        let names = table.column_names();
        assert_eq!(names.len(), 13);
        assert_eq!(names[0], DATE_COLUMN);
        assert_eq!(names[6], "人口數(人)");
        assert_eq!(table.dates(), dates.to_vec());
        assert_eq!(table.value(1, Indicator::Population), Some(105.0));
        assert_eq!(table.value(0, Indicator::Density), Some(11.0));
        assert_eq!(table.value(5, Indicator::Density), None);
    }

    #[test]
    fn short_row_is_rejected_not_padded() {
        let mut short = row("7", 0.0);
        short.1.pop();
        let err = IndicatorTable::try_new(&[ymd(2019, 1, 1), ymd(2019, 2, 1)], &[row("6", 0.0), short])
            .unwrap_err();
        match err {
            Error::Shape { at, expected, found } => {
                assert_eq!(at, "time index \"7\"");
                assert_eq!(expected, 12);
                assert_eq!(found, 11);
            }
            other => panic!("expected shape error, got {other:?}"),
        }
    }

    #[test]
    fn records_carry_nulls_and_iso_dates() {
        let mut r = row("0", 1.0);
        r.1[Indicator::GrowthRate.position()] = None;
        let table = IndicatorTable::try_new(&[ymd(2024, 4, 1)], &[r]).unwrap();
        let records = table.to_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0][DATE_COLUMN], "2024-04-01");
        assert!(records[0]["人口增加率(‰)"].is_null());
        assert_eq!(records[0]["人口數(人)"], 6.0);
    }

    #[test]
    fn indicator_positions_follow_declared_order() {
        for (i, ind) in Indicator::ALL.iter().enumerate() {
            assert_eq!(ind.position(), i);
        }
    }
}
