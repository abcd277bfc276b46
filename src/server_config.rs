//! Configuration payload of the download server
//!
//! Passive data shape: every field is optional, there are no defaults and no
//! validation beyond JSON types. `cookies_location` and `exclude_tags` only
//! accept `null`.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies_location: Option<()>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ffmpeg_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub itag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_quality: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_tags: Option<()>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_cover: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overwrite: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print_exceptions: Option<bool>,
}

impl ServerConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Serialize, omitting unset fields
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
