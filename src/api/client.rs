//! HTTP client for the pass-planning backend

use reqwest::multipart::{Form, Part};
use std::path::Path;
use std::time::Duration;

use crate::api::decode::{decode_ingest, decode_passes, decode_roster, decode_uploaded_aoi};
use crate::api::error::ApiError;
use crate::api::types::{
    ApiPayload, ApiRequest, AreaOfInterest, IngestSummary, Pass, PassComputeRequest, Satellite,
};
use crate::geometry::parse_aoi_document;

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn execute(&self, request: ApiRequest) -> Result<ApiPayload, ApiError> {
        match request {
            ApiRequest::UploadAoi { name, path } => {
                self.upload_aoi(&name, &path).await.map(ApiPayload::Aoi)
            }
            ApiRequest::ListSatellites { limit } => {
                self.list_satellites(limit).await.map(ApiPayload::Roster)
            }
            ApiRequest::IngestTles { text } => {
                self.ingest_tles(&text).await.map(ApiPayload::Ingested)
            }
            ApiRequest::ComputePasses(body) => {
                self.compute_passes(&body).await.map(ApiPayload::Passes)
            }
        }
    }

    /// Upload a GeoJSON file as multipart `name` + `file`.
    ///
    /// The file is parsed locally first so a broken document never leaves the
    /// machine, and so the outline is known even if the reply omits it.
    pub async fn upload_aoi(&self, name: &str, path: &Path) -> Result<AreaOfInterest, ApiError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::LocalFile(format!("Could not read {}: {}", path.display(), e)))?;
        let local = parse_aoi_document(&bytes)
            .map_err(|e| ApiError::LocalFile(format!("Invalid GeoJSON file: {}", e)))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "aoi.geojson".to_string());
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/geo+json")?;
        let form = Form::new().text("name", name.to_string()).part("file", part);

        let resp = self.client.post(self.url("/aois/upload")).multipart(form).send().await?;
        let body = read_success_body(resp).await?;
        decode_uploaded_aoi(&body, Some(local))
    }

    pub async fn list_satellites(&self, limit: usize) -> Result<Vec<Satellite>, ApiError> {
        let resp = self
            .client
            .get(self.url("/satellites"))
            .query(&[("limit", limit)])
            .send()
            .await?;
        let body = read_success_body(resp).await?;
        decode_roster(&body)
    }

    pub async fn ingest_tles(&self, text: &str) -> Result<IngestSummary, ApiError> {
        let resp = self
            .client
            .post(self.url("/tles/ingest"))
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(text.trim().to_string())
            .send()
            .await?;
        let body = read_success_body(resp).await?;
        Ok(decode_ingest(&body))
    }

    pub async fn compute_passes(&self, request: &PassComputeRequest) -> Result<Vec<Pass>, ApiError> {
        let payload = serde_json::to_vec(request)?;
        let resp = self
            .client
            .post(self.url("/passes/compute"))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await?;
        let body = read_success_body(resp).await?;
        decode_passes(&body)
    }
}

async fn read_success_body(resp: reqwest::Response) -> Result<String, ApiError> {
    let status = resp.status();
    let body = resp.text().await?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(ApiError::from_status(status.as_u16(), &body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_joined_without_double_slash() {
        let client = ApiClient::new("http://localhost:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.url("/satellites"), "http://localhost:8000/satellites");
    }

    #[tokio::test]
    async fn missing_file_fails_before_any_request() {
        // Port 9 is discard; the request must never be attempted anyway.
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let err = client
            .upload_aoi("A", Path::new("/definitely/not/here.geojson"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::LocalFile(_)));
    }

    #[tokio::test]
    async fn invalid_document_fails_locally() {
        let path = std::env::temp_dir().join(format!("aoi-invalid-{}.geojson", std::process::id()));
        std::fs::write(&path, br#"{"type":"FeatureCollection","features":[]}"#).unwrap();
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let err = client.upload_aoi("A", &path).await.unwrap_err();
        let _ = std::fs::remove_file(&path);
        match err {
            ApiError::LocalFile(msg) => assert!(msg.starts_with("Invalid GeoJSON file")),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
