use crate::utils::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const APP_NAME: &str = "TripEventsTask";

/// Input column names, positions 0..=10.
pub const TRIP_HEADER: [&str; TRIP_FIELD_COUNT] = [
    "id",
    "duration",
    "start_date",
    "start_station_name",
    "start_station_id",
    "end_date",
    "end_station_name",
    "end_station_id",
    "bike_id",
    "subscription_type",
    "zip_code",
];

/// Output column order of every event row.
pub const EVENT_HEADER: [&str; EVENT_FIELD_COUNT] = [
    "id",
    "duration",
    "event_time",
    "event_action",
    "station_name",
    "station_id",
    "bike_id",
    "subscription_type",
    "zip_code",
];

pub const TRIP_FIELD_COUNT: usize = 11;
pub const EVENT_FIELD_COUNT: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripRecord {
    pub id: String,
    pub duration: String,
    pub start_time: String,
    pub start_station_name: String,
    pub start_station_id: String,
    pub end_time: String,
    pub end_station_name: String,
    pub end_station_id: String,
    pub bike_id: String,
    pub subscription_type: String,
    pub zip_code: String,
}

impl TripRecord {
    /// Positional parse of one comma-delimited line. Fields past index 10 are ignored.
    pub fn parse(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < TRIP_FIELD_COUNT {
            return Err(EtlError::MalformedRecord {
                expected: TRIP_FIELD_COUNT,
                found: fields.len(),
                line: line.to_string(),
            });
        }

        Ok(Self {
            id: fields[0].to_string(),
            duration: fields[1].to_string(),
            start_time: fields[2].to_string(),
            start_station_name: fields[3].to_string(),
            start_station_id: fields[4].to_string(),
            end_time: fields[5].to_string(),
            end_station_name: fields[6].to_string(),
            end_station_id: fields[7].to_string(),
            bike_id: fields[8].to_string(),
            subscription_type: fields[9].to_string(),
            zip_code: fields[10].to_string(),
        })
    }

    pub fn split(&self) -> [EventRecord; 2] {
        [
            self.event(
                EventAction::Start,
                &self.start_time,
                &self.start_station_name,
                &self.start_station_id,
            ),
            self.event(
                EventAction::End,
                &self.end_time,
                &self.end_station_name,
                &self.end_station_id,
            ),
        ]
    }

    fn event(
        &self,
        event_action: EventAction,
        event_time: &str,
        station_name: &str,
        station_id: &str,
    ) -> EventRecord {
        EventRecord {
            id: self.id.clone(),
            duration: self.duration.clone(),
            event_time: event_time.to_string(),
            event_action,
            station_name: station_name.to_string(),
            station_id: station_id.to_string(),
            bike_id: self.bike_id.clone(),
            subscription_type: self.subscription_type.clone(),
            zip_code: self.zip_code.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventAction {
    Start,
    End,
}

impl EventAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventAction::Start => "START",
            EventAction::End => "END",
        }
    }
}

impl fmt::Display for EventAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub duration: String,
    pub event_time: String,
    pub event_action: EventAction,
    pub station_name: String,
    pub station_id: String,
    pub bike_id: String,
    pub subscription_type: String,
    pub zip_code: String,
}

impl EventRecord {
    /// Values in `EVENT_HEADER` order.
    pub fn fields(&self) -> [&str; EVENT_FIELD_COUNT] {
        [
            &self.id,
            &self.duration,
            &self.event_time,
            self.event_action.as_str(),
            &self.station_name,
            &self.station_id,
            &self.bike_id,
            &self.subscription_type,
            &self.zip_code,
        ]
    }

    pub fn to_csv_line(&self) -> String {
        self.fields().join(",")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveFormat {
    Csv,
    Txt,
    Parquet,
}

impl SaveFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaveFormat::Csv => "csv",
            SaveFormat::Txt => "txt",
            SaveFormat::Parquet => "parquet",
        }
    }

    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl FromStr for SaveFormat {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(SaveFormat::Csv),
            "txt" => Ok(SaveFormat::Txt),
            "parquet" => Ok(SaveFormat::Parquet),
            _ => Err(EtlError::UnsupportedFormat {
                format: s.to_string(),
                target: "output".to_string(),
            }),
        }
    }
}

impl fmt::Display for SaveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which formulation(s) of the split a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Lines,
    Table,
    Both,
}

impl RunMode {
    pub fn runs(&self, kind: PipelineKind) -> bool {
        match self {
            RunMode::Both => true,
            RunMode::Lines => kind == PipelineKind::Lines,
            RunMode::Table => kind == PipelineKind::Table,
        }
    }
}

impl FromStr for RunMode {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lines" => Ok(RunMode::Lines),
            "table" => Ok(RunMode::Table),
            "both" => Ok(RunMode::Both),
            _ => Err(EtlError::InvalidConfigValueError {
                field: "mode".to_string(),
                value: s.to_string(),
                reason: "Expected one of: lines, table, both".to_string(),
            }),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunMode::Lines => "lines",
            RunMode::Table => "table",
            RunMode::Both => "both",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineKind {
    Lines,
    Table,
}

impl PipelineKind {
    pub fn folder_name(&self) -> &'static str {
        match self {
            PipelineKind::Lines => "lines",
            PipelineKind::Table => "table",
        }
    }
}
