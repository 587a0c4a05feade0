//! Cloudinary implementation of MediaRelay
//!
//! Talks to the signed REST upload API. Requests are signed with SHA-256,
//! so the Cloudinary account must be configured for SHA-256 signatures.

use crate::config::MediaConfig;
use crate::media::{MediaError, MediaRelay, ResourceKind, UploadedMedia};
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::Path;

pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
    resource_type: String,
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct CloudinaryRelay {
    client: reqwest::Client,
    api_base: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl CloudinaryRelay {
    pub fn new(config: &MediaConfig) -> Result<Self, MediaError> {
        if config.cloud_name.is_empty() || config.api_key.is_empty() || config.api_secret.is_empty() {
            return Err(MediaError::Rejected(
                "Cloudinary cloud name, api key and api secret must all be configured".to_string(),
            ));
        }
        info!("Using Cloudinary media relay for cloud {}", config.cloud_name);
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            api_base: DEFAULT_API_BASE.to_string(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    /// Point the relay at another API root (proxies, test doubles)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn endpoint(&self, resource_type: &str, action: &str) -> String {
        format!("{}/{}/{}/{}", self.api_base.trim_end_matches('/'), self.cloud_name, resource_type, action)
    }

    /// SHA-256 over the sorted `key=value` pairs joined by `&`, followed by the secret
    pub(crate) fn sign(&self, params: &[(&str, String)]) -> String {
        let mut sorted: Vec<_> = params.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        let to_sign = sorted
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(self.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    async fn rejection(response: reqwest::Response) -> MediaError {
        let status = response.status();
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error.message,
            Err(_) => format!("HTTP {}", status),
        };
        MediaError::Rejected(message)
    }
}

fn parse_kind(resource_type: &str) -> ResourceKind {
    match resource_type {
        "image" => ResourceKind::Image,
        "video" => ResourceKind::Video,
        _ => ResourceKind::Raw,
    }
}

#[async_trait]
impl MediaRelay for CloudinaryRelay {
    async fn upload(&self, local_file: &Path) -> Result<UploadedMedia, MediaError> {
        let bytes = match tokio::fs::read(local_file).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MediaError::MissingFile(local_file.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };
        let file_name = local_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[("timestamp", timestamp.clone())]);
        let form = Form::new()
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .part("file", Part::bytes(bytes).file_name(file_name));

        debug!("Uploading {} to Cloudinary", local_file.display());
        let response = self.client.post(self.endpoint("auto", "upload")).multipart(form).send().await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let uploaded: UploadResponse = response.json().await?;
        info!("Uploaded {} as {}", local_file.display(), uploaded.public_id);
        Ok(UploadedMedia {
            url: uploaded.secure_url,
            kind: parse_kind(&uploaded.resource_type),
            public_id: uploaded.public_id,
            duration_seconds: uploaded.duration,
        })
    }

    async fn destroy(&self, public_id: &str, kind: ResourceKind) -> Result<(), MediaError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[("public_id", public_id.to_string()), ("timestamp", timestamp.clone())]);
        let params = [
            ("public_id", public_id.to_string()),
            ("timestamp", timestamp),
            ("api_key", self.api_key.clone()),
            ("signature", signature),
        ];

        let response = self
            .client
            .post(self.endpoint(kind.as_str(), "destroy"))
            .form(&params)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let outcome: DestroyResponse = response.json().await?;
        match outcome.result.as_str() {
            "ok" => {
                info!("Destroyed {} {}", kind, public_id);
                Ok(())
            }
            "not found" => {
                warn!("{} {} was already gone from Cloudinary", kind, public_id);
                Ok(())
            }
            other => Err(MediaError::Rejected(format!("destroy of {} returned {:?}", public_id, other))),
        }
    }
}
