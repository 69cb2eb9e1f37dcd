/// メディア（動画・音声・画像）のメタデータ
use serde::{Deserialize, Serialize};

use super::validation::{is_http_url, optional_text, ValidationErrors};

/// GET /media が返す最大件数
pub const MEDIA_LIST_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Video,
    Audio,
    Image,
}

impl MediaType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "video" => Some(Self::Video),
            "audio" => Some(Self::Audio),
            "image" => Some(Self::Image),
            _ => None,
        }
    }
}

/// POST /media のリクエストボディ
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMediaInput {
    pub title: Option<String>,
    pub url: Option<String>,
    pub media_type: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDraft {
    pub title: String,
    pub url: String,
    pub media_type: MediaType,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: String,
    pub title: String,
    pub url: String,
    pub media_type: MediaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub uploaded_by: String,
    pub created_at: String,
}

impl Media {
    pub fn new(id: String, uploaded_by: String, draft: MediaDraft, created_at: String) -> Self {
        Self {
            id,
            title: draft.title,
            url: draft.url,
            media_type: draft.media_type,
            description: draft.description,
            uploaded_by,
            created_at,
        }
    }
}

impl CreateMediaInput {
    pub fn validate(self) -> Result<MediaDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title = errors.require_text("title", self.title);

        let url = errors.require_text("url", self.url);
        if let Some(url) = &url {
            if !is_http_url(url) {
                errors.push("url", "url must be an http(s) URL");
            }
        }

        let media_type = match errors.require_text("mediaType", self.media_type) {
            Some(value) => {
                let parsed = MediaType::parse(&value);
                if parsed.is_none() {
                    errors.push("mediaType", "mediaType must be one of video, audio, image");
                }
                parsed
            }
            None => None,
        };

        match (title, url, media_type) {
            (Some(title), Some(url), Some(media_type)) if errors.is_empty() => Ok(MediaDraft {
                title,
                url,
                media_type,
                description: optional_text(self.description),
            }),
            _ => Err(errors),
        }
    }
}
