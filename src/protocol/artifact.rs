//! Artifact types for invocation outputs

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::error::A2AError;

/// A named, typed unit of output produced by an invocation
///
/// Common fields live on the struct; the variant-specific fields are carried
/// by [`ArtifactDetail`], flattened into the same wire object under the
/// `type` discriminator. `size` and `checksum` always describe the serialized
/// content as of the last update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub content: Value,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Byte length of the serialized content
    pub size: u64,

    /// SHA-256 hex digest of the serialized content
    pub checksum: String,

    #[serde(flatten)]
    pub detail: ArtifactDetail,
}

/// Variant-specific artifact fields, discriminated by `type` on the wire
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ArtifactDetail {
    Document {},

    Image {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<String>,
    },

    Data {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        schema: Option<Value>,
        #[serde(default)]
        encoding: super::message::DataEncoding,
    },

    Code {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
}

impl Artifact {
    fn build(name: impl Into<String>, content: Value, detail: ArtifactDetail) -> Self {
        let now = Utc::now();
        let serialized = serialize_content(&content);
        Self {
            id: Uuid::now_v7().to_string(),
            name: name.into(),
            description: None,
            checksum: checksum_hex(&serialized),
            size: serialized.len() as u64,
            content,
            metadata: Map::new(),
            created_at: now,
            updated_at: now,
            detail,
        }
    }

    /// Create a document artifact from text content
    pub fn document(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::build(name, Value::String(text.into()), ArtifactDetail::Document {})
    }

    /// Create an image artifact from raw bytes
    pub fn image(name: impl Into<String>, bytes: &[u8], format: impl Into<String>) -> Self {
        let encoded = general_purpose::STANDARD.encode(bytes);
        Self::build(
            name,
            Value::String(encoded),
            ArtifactDetail::Image {
                width: None,
                height: None,
                format: Some(format.into()),
            },
        )
    }

    /// Create a data artifact from a structured value
    pub fn data(name: impl Into<String>, value: Value) -> Self {
        Self::build(
            name,
            value,
            ArtifactDetail::Data {
                schema: None,
                encoding: Default::default(),
            },
        )
    }

    /// Create a code artifact from source text
    pub fn code(
        name: impl Into<String>,
        source: impl Into<String>,
        language: Option<String>,
    ) -> Self {
        Self::build(
            name,
            Value::String(source.into()),
            ArtifactDetail::Code { language },
        )
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replace the content, recomputing `size` and `checksum` together and
    /// refreshing `updated_at`.
    pub fn update_content(&mut self, content: Value) {
        let serialized = serialize_content(&content);
        self.checksum = checksum_hex(&serialized);
        self.size = serialized.len() as u64;
        self.content = content;
        self.updated_at = Utc::now();
    }

    /// Verify that `checksum` still matches the current content
    pub fn verify_checksum(&self) -> bool {
        checksum_hex(&serialize_content(&self.content)) == self.checksum
    }

    /// The wire discriminator for this artifact's variant
    pub fn kind(&self) -> &'static str {
        match self.detail {
            ArtifactDetail::Document {} => "document",
            ArtifactDetail::Image { .. } => "image",
            ArtifactDetail::Data { .. } => "data",
            ArtifactDetail::Code { .. } => "code",
        }
    }

    /// Parse an artifact from its wire representation.
    ///
    /// An unknown `type` discriminator is a validation error.
    pub fn from_wire(value: &Value) -> Result<Self, A2AError> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| A2AError::Validation("artifact is missing the \"type\" field".into()))?;

        match kind {
            "document" | "image" | "data" | "code" => serde_json::from_value(value.clone())
                .map_err(|e| A2AError::Validation(format!("invalid {} artifact: {}", kind, e))),
            other => Err(A2AError::Validation(format!(
                "unknown artifact type: {}",
                other
            ))),
        }
    }

    /// Serialize to the wire representation
    pub fn to_wire(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    fn content_text(&self) -> Option<&str> {
        self.content.as_str()
    }

    // ── Document-derived operations ──────────────────────────

    pub fn word_count(&self) -> Option<usize> {
        match self.detail {
            ArtifactDetail::Document {} => {
                Some(self.content_text()?.split_whitespace().count())
            }
            _ => None,
        }
    }

    pub fn line_count(&self) -> Option<usize> {
        match self.detail {
            ArtifactDetail::Document {} => Some(self.content_text()?.lines().count()),
            _ => None,
        }
    }

    pub fn paragraph_count(&self) -> Option<usize> {
        match self.detail {
            ArtifactDetail::Document {} => Some(
                self.content_text()?
                    .split("\n\n")
                    .filter(|p| !p.trim().is_empty())
                    .count(),
            ),
            _ => None,
        }
    }

    /// Estimated reading time in minutes at 200 words per minute, minimum 1
    pub fn reading_time_minutes(&self) -> Option<usize> {
        self.word_count().map(|words| (words / 200).max(1))
    }

    /// Markdown headings in document content, leading `#` markers stripped
    pub fn headings(&self) -> Option<Vec<String>> {
        match self.detail {
            ArtifactDetail::Document {} => Some(
                self.content_text()?
                    .lines()
                    .filter(|l| l.starts_with('#'))
                    .map(|l| l.trim_start_matches('#').trim().to_string())
                    .collect(),
            ),
            _ => None,
        }
    }

    // ── Image-derived operations ─────────────────────────────

    /// Render image content as a `data:` URL
    pub fn data_url(&self) -> Option<String> {
        match &self.detail {
            ArtifactDetail::Image { format, .. } => {
                let format = format.as_deref().unwrap_or("png");
                Some(format!(
                    "data:image/{};base64,{}",
                    format,
                    self.content_text()?
                ))
            }
            _ => None,
        }
    }

    pub fn aspect_ratio(&self) -> Option<f64> {
        match self.detail {
            ArtifactDetail::Image {
                width: Some(w),
                height: Some(h),
                ..
            } if h > 0 => Some(f64::from(w) / f64::from(h)),
            _ => None,
        }
    }

    // ── Data-derived operations ──────────────────────────────

    /// Top-level keys of a data artifact's object content
    pub fn data_keys(&self) -> Option<Vec<String>> {
        match self.detail {
            ArtifactDetail::Data { .. } => Some(
                self.content
                    .as_object()
                    .map(|o| o.keys().cloned().collect())
                    .unwrap_or_default(),
            ),
            _ => None,
        }
    }

    /// Look up a value by key in a data artifact's object content
    pub fn data_get(&self, key: &str) -> Option<&Value> {
        match self.detail {
            ArtifactDetail::Data { .. } => self.content.get(key),
            _ => None,
        }
    }

    // ── Code-derived operations ──────────────────────────────

    /// The declared language, or a best-effort detection from the source
    pub fn language(&self) -> Option<String> {
        match &self.detail {
            ArtifactDetail::Code { language } => language
                .clone()
                .or_else(|| self.content_text().and_then(detect_language)),
            _ => None,
        }
    }

    /// Names of functions and classes found in code content
    pub fn definitions(&self) -> Option<Vec<String>> {
        match self.detail {
            ArtifactDetail::Code { .. } => {
                Some(extract_definitions(self.content_text()?))
            }
            _ => None,
        }
    }

    /// Render code content as an HTML block for syntax highlighting
    pub fn to_html(&self) -> Option<String> {
        match self.detail {
            ArtifactDetail::Code { .. } => {
                let language = self.language().unwrap_or_else(|| "text".into());
                let escaped = self
                    .content_text()?
                    .replace('&', "&amp;")
                    .replace('<', "&lt;")
                    .replace('>', "&gt;");
                Some(format!(
                    "<pre><code class=\"language-{}\">{}</code></pre>",
                    language, escaped
                ))
            }
            _ => None,
        }
    }
}

/// Canonical byte form of artifact content: strings verbatim, everything else
/// as compact JSON.
fn serialize_content(content: &Value) -> Vec<u8> {
    match content {
        Value::String(s) => s.clone().into_bytes(),
        other => serde_json::to_vec(other).unwrap_or_default(),
    }
}

fn checksum_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

fn detect_language(source: &str) -> Option<String> {
    let markers: [(&str, &[&str]); 4] = [
        ("rust", &["fn ", "impl ", "let mut ", "pub struct"]),
        ("python", &["def ", "import ", "self."]),
        ("javascript", &["function ", "const ", "=>"]),
        ("ruby", &["def ", "end\n", "require "]),
    ];
    markers
        .iter()
        .max_by_key(|(_, needles)| {
            needles
                .iter()
                .filter(|needle| source.contains(*needle))
                .count()
        })
        .filter(|(_, needles)| {
            needles
                .iter()
                .any(|needle| source.contains(*needle))
        })
        .map(|(name, _)| (*name).to_string())
}

fn extract_definitions(source: &str) -> Vec<String> {
    let prefixes = ["fn ", "pub fn ", "def ", "function ", "class ", "struct "];
    source
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim_start();
            prefixes.iter().find_map(|prefix| {
                trimmed.strip_prefix(prefix).map(|rest| {
                    rest.chars()
                        .take_while(|c| c.is_alphanumeric() || *c == '_')
                        .collect::<String>()
                })
            })
        })
        .filter(|name| !name.is_empty())
        .collect()
}
