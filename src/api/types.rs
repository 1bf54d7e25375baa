//! Backend wire types and worker communication structures

use bevy::prelude::*;
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, mpsc::Receiver};
use tokio::sync::mpsc::UnboundedSender;

use crate::api::error::ApiError;
use crate::geometry::Geometry;
use crate::geometry::types::{deserialize_geojson, deserialize_optional_geojson};
use crate::request::RequestTicket;

/// Uploaded area of interest; replaced wholesale by the next upload.
#[derive(Clone, Debug, PartialEq)]
pub struct AreaOfInterest {
    pub id: i64,
    pub name: String,
    pub geometry: Geometry,
}

/// Upload reply; the backend may leave the geometry out.
#[derive(Debug, Deserialize)]
pub struct UploadedAoi {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_optional_geojson")]
    pub geometry: Option<Geometry>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Satellite {
    pub id: i64,
    pub name: String,
    #[serde(default, alias = "noradId")]
    pub norad_id: Option<i64>,
}

impl Satellite {
    pub fn label(&self) -> String {
        match self.norad_id {
            Some(norad) => format!("{} (NORAD {})", self.name, norad),
            None => self.name.clone(),
        }
    }
}

/// The two roster shapes the satellites endpoint may answer with.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RosterResponse {
    Bare(Vec<Satellite>),
    Wrapped {
        #[serde(default)]
        items: Vec<Satellite>,
    },
}

impl RosterResponse {
    pub fn into_items(self) -> Vec<Satellite> {
        match self {
            RosterResponse::Bare(items) | RosterResponse::Wrapped { items } => items,
        }
    }
}

/// One predicted visibility pass over the AOI.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Pass {
    #[serde(alias = "startTime", deserialize_with = "deserialize_timestamp")]
    pub start_time: DateTime<Utc>,
    #[serde(alias = "endTime", deserialize_with = "deserialize_timestamp")]
    pub end_time: DateTime<Utc>,
    #[serde(alias = "maxElevationDeg")]
    pub max_elevation_deg: f64,
    #[serde(
        default,
        alias = "maxElevationTime",
        deserialize_with = "deserialize_optional_timestamp"
    )]
    pub max_elevation_time: Option<DateTime<Utc>>,
    #[serde(
        rename = "track_geojson",
        alias = "trackGeometry",
        alias = "track_geometry",
        deserialize_with = "deserialize_geojson"
    )]
    pub track_geometry: Geometry,
}

impl Pass {
    pub fn duration(&self) -> Duration {
        self.end_time.signed_duration_since(self.start_time)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn starting_at(start: DateTime<Utc>, hours: u32) -> Self {
        Self {
            start,
            end: start + Duration::hours(i64::from(hours)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PassComputeRequest {
    pub satellite_id: i64,
    pub aoi_id: i64,
    pub window: TimeWindow,
    pub min_elevation_deg: f64,
}

/// Ingest reply; the body is optional and only used for the status line.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct IngestSummary {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub satellites: Vec<i64>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ApiRequest {
    UploadAoi { name: String, path: PathBuf },
    ListSatellites { limit: usize },
    IngestTles { text: String },
    ComputePasses(PassComputeRequest),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ApiPayload {
    Aoi(AreaOfInterest),
    Roster(Vec<Satellite>),
    Ingested(IngestSummary),
    Passes(Vec<Pass>),
}

/// A request handed to the worker together with the ticket it answers to.
#[derive(Debug)]
pub struct ApiCommand {
    pub ticket: RequestTicket,
    pub request: ApiRequest,
}

#[derive(Debug)]
pub struct ApiReply {
    pub ticket: RequestTicket,
    pub outcome: Result<ApiPayload, ApiError>,
}

/// Resource containing channels for communicating with the API worker thread
#[derive(Resource)]
pub struct ApiChannels {
    pub cmd_tx: UnboundedSender<ApiCommand>,
    pub res_rx: Arc<Mutex<Receiver<ApiReply>>>,
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let value = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    // Naive timestamps from the backend are UTC.
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| Utc.from_utc_datetime(&dt))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp {:?}", raw)))
}

fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp {:?}", raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn satellite_label_includes_norad_when_known() {
        let sat: Satellite =
            serde_json::from_str(r#"{"id": 7, "name": "ISS (ZARYA)", "norad_id": 25544}"#).unwrap();
        assert_eq!(sat.label(), "ISS (ZARYA) (NORAD 25544)");
        let camel: Satellite =
            serde_json::from_str(r#"{"id": 8, "name": "NOAA 19", "noradId": 33591}"#).unwrap();
        assert_eq!(camel.norad_id, Some(33591));
        let bare: Satellite = serde_json::from_str(r#"{"id": 9, "name": "DEMO"}"#).unwrap();
        assert_eq!(bare.label(), "DEMO");
    }

    #[test]
    fn timestamps_accept_offset_and_naive_forms() {
        let with_offset = parse_timestamp("2025-03-01T12:00:00+00:00").unwrap();
        let zulu = parse_timestamp("2025-03-01T12:00:00Z").unwrap();
        let naive = parse_timestamp("2025-03-01T12:00:00").unwrap();
        let fractional = parse_timestamp("2025-03-01 12:00:00.250").unwrap();
        assert_eq!(with_offset, zulu);
        assert_eq!(zulu, naive);
        assert_eq!(fractional.timestamp_subsec_millis(), 250);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn compute_request_serializes_to_backend_shape() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let request = PassComputeRequest {
            satellite_id: 7,
            aoi_id: 1,
            window: TimeWindow::starting_at(start, 24),
            min_elevation_deg: 10.0,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["satellite_id"], 7);
        assert_eq!(value["aoi_id"], 1);
        assert_eq!(value["window"]["start"], "2025-03-01T00:00:00Z");
        assert_eq!(value["window"]["end"], "2025-03-02T00:00:00Z");
        assert_eq!(value["min_elevation_deg"], 10.0);
    }
}
