use super::{float_key, RowIdentity};
use crate::dataset::ColumnarRow;
use arrow::array::{ArrayRef, Float64Array, Int32Array};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Datelike, Timelike};
use chrono_tz::Tz;
use std::sync::Arc;

/// Calendar decomposition of an event timestamp in a given timezone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EventInstant {
    pub epoch_millis: i64,
    /// Epoch seconds with millisecond fraction.
    pub start_time: f64,
    pub hour: i32,
    pub day: i32,
    /// ISO-8601 week of year.
    pub week: i32,
    pub month: i32,
    pub year: i32,
    /// ISO day of week, Monday = 1 ... Sunday = 7.
    pub weekday: i32,
}

impl EventInstant {
    /// `None` when the timestamp is outside the representable calendar range.
    pub fn from_epoch_millis(ts: i64, tz: &Tz) -> Option<Self> {
        let local = DateTime::from_timestamp_millis(ts)?.with_timezone(tz);
        Some(Self {
            epoch_millis: ts,
            start_time: ts as f64 / 1000.0,
            hour: local.hour() as i32,
            day: local.day() as i32,
            week: local.iso_week().week() as i32,
            month: local.month() as i32,
            year: local.year(),
            weekday: local.weekday().number_from_monday() as i32,
        })
    }

    pub fn timestamp_micros(&self) -> i64 {
        self.epoch_millis.saturating_mul(1000)
    }
}

/// Row of the `time` dimension, partitioned by `(year, month)`.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeRecord {
    pub start_time: f64,
    pub hour: i32,
    pub day: i32,
    pub week: i32,
    pub month: i32,
    pub year: i32,
    pub weekday: i32,
}

impl From<&EventInstant> for TimeRecord {
    fn from(instant: &EventInstant) -> Self {
        Self {
            start_time: instant.start_time,
            hour: instant.hour,
            day: instant.day,
            week: instant.week,
            month: instant.month,
            year: instant.year,
            weekday: instant.weekday,
        }
    }
}

impl RowIdentity for TimeRecord {
    type Key = (Option<u64>, i32, i32, i32, i32, i32, i32);

    fn row_key(&self) -> Self::Key {
        (
            float_key(Some(self.start_time)),
            self.hour,
            self.day,
            self.week,
            self.month,
            self.year,
            self.weekday,
        )
    }
}

fn int_column(rows: &[&TimeRecord], get: impl Fn(&TimeRecord) -> i32) -> ArrayRef {
    Arc::new(Int32Array::from(
        rows.iter().map(|r| get(*r)).collect::<Vec<i32>>(),
    ))
}

impl ColumnarRow for TimeRecord {
    const TABLE: &'static str = "time";
    const PARTITION_COLUMNS: &'static [&'static str] = &["year", "month"];

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("start_time", DataType::Float64, false),
            Field::new("hour", DataType::Int32, false),
            Field::new("day", DataType::Int32, false),
            Field::new("week", DataType::Int32, false),
            Field::new("month", DataType::Int32, false),
            Field::new("year", DataType::Int32, false),
            Field::new("weekday", DataType::Int32, false),
        ]))
    }

    fn to_batch(rows: &[&Self]) -> Result<RecordBatch, ArrowError> {
        RecordBatch::try_new(
            Self::schema(),
            vec![
                Arc::new(Float64Array::from(
                    rows.iter().map(|r| r.start_time).collect::<Vec<f64>>(),
                )) as ArrayRef,
                int_column(rows, |r| r.hour),
                int_column(rows, |r| r.day),
                int_column(rows, |r| r.week),
                int_column(rows, |r| r.month),
                int_column(rows, |r| r.year),
                int_column(rows, |r| r.weekday),
            ],
        )
    }

    fn partition_values(&self) -> Vec<Option<String>> {
        vec![Some(self.year.to_string()), Some(self.month.to_string())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decomposes_utc_instant() {
        let instant = EventInstant::from_epoch_millis(1541121934796, &Tz::UTC).unwrap();
        assert_eq!(instant.start_time, 1541121934.796);
        assert_eq!(instant.year, 2018);
        assert_eq!(instant.month, 11);
        assert_eq!(instant.day, 2);
        assert_eq!(instant.hour, 1);
        assert_eq!(instant.week, 44);
        // 2018-11-02 was a Friday
        assert_eq!(instant.weekday, 5);
        assert_eq!(instant.timestamp_micros(), 1541121934796000);
    }

    #[test]
    fn timezone_shifts_calendar_fields() {
        // 2018-11-02T01:25:34Z is still Nov 1st in Los Angeles
        let instant =
            EventInstant::from_epoch_millis(1541121934796, &Tz::America__Los_Angeles).unwrap();
        assert_eq!(instant.day, 1);
        assert_eq!(instant.hour, 18);
        assert_eq!(instant.weekday, 4);
        assert_eq!(instant.start_time, 1541121934.796);
    }

    #[test]
    fn iso_week_spans_new_year() {
        // 2018-12-31 belongs to ISO week 1 of 2019
        let instant = EventInstant::from_epoch_millis(1546214400000, &Tz::UTC).unwrap();
        assert_eq!((instant.year, instant.month, instant.day), (2018, 12, 31));
        assert_eq!(instant.week, 1);
        assert_eq!(instant.weekday, 1);
    }

    #[test]
    fn out_of_range_timestamp_is_none() {
        assert!(EventInstant::from_epoch_millis(i64::MAX, &Tz::UTC).is_none());
    }

    #[test]
    fn time_row_partitions_by_year_and_month() {
        let instant = EventInstant::from_epoch_millis(1541121934796, &Tz::UTC).unwrap();
        let row = TimeRecord::from(&instant);
        assert_eq!(
            row.partition_values(),
            vec![Some("2018".to_string()), Some("11".to_string())]
        );
    }
}
