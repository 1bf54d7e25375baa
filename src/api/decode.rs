//! Response body decoding

use crate::api::error::ApiError;
use crate::api::types::{AreaOfInterest, IngestSummary, Pass, RosterResponse, Satellite, UploadedAoi};
use crate::geometry::Geometry;

pub fn decode_roster(body: &str) -> Result<Vec<Satellite>, ApiError> {
    let roster: RosterResponse = serde_json::from_str(body)?;
    Ok(roster.into_items())
}

pub fn decode_passes(body: &str) -> Result<Vec<Pass>, ApiError> {
    Ok(serde_json::from_str(body)?)
}

/// Decode the upload reply, falling back to the geometry parsed from the
/// uploaded file when the backend does not echo it.
pub fn decode_uploaded_aoi(body: &str, local: Option<Geometry>) -> Result<AreaOfInterest, ApiError> {
    let uploaded: UploadedAoi = serde_json::from_str(body)?;
    let geometry = uploaded
        .geometry
        .or(local)
        .ok_or_else(|| ApiError::Decode("AOI response carries no geometry".to_string()))?;
    Ok(AreaOfInterest {
        id: uploaded.id,
        name: uploaded.name,
        geometry,
    })
}

/// The ingest body only feeds the status line, so anything unparseable is
/// treated as an empty summary.
pub fn decode_ingest(body: &str) -> IngestSummary {
    serde_json::from_str(body).unwrap_or_default()
}
