//! Message and content part types

use std::path::Path;

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::error::A2AError;

/// A single content unit inside a [`Message`]
///
/// Parts form a closed set discriminated by the `type` field on the wire:
/// `"text"`, `"file"`, or `"data"`. An unrecognized discriminator fails
/// deserialization with a validation error rather than defaulting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Part {
    /// Plain text content
    Text(TextPart),

    /// Reference to a file on disk
    File(FilePart),

    /// Structured data with a declared encoding
    Data(DataPart),
}

impl Part {
    /// Create a text part
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(TextPart {
            content: content.into(),
            metadata: Map::new(),
        })
    }

    /// Create a file part
    pub fn file(file_path: impl Into<String>, content_type: impl Into<String>) -> Self {
        let file_path = file_path.into();
        let filename = Path::new(&file_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        Self::File(FilePart {
            file_path,
            content_type: content_type.into(),
            size: None,
            filename,
            metadata: Map::new(),
        })
    }

    /// Create a data part with the default json encoding
    pub fn data(data: Value) -> Self {
        Self::Data(DataPart {
            data,
            schema: None,
            encoding: DataEncoding::Json,
            metadata: Map::new(),
        })
    }

    /// Parse a part from its wire representation.
    ///
    /// Dispatches on the `type` discriminator; an unknown type is a
    /// [`A2AError::Validation`], never a silent fallback.
    pub fn from_wire(value: &Value) -> Result<Self, A2AError> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| A2AError::Validation("part is missing the \"type\" field".into()))?;

        match kind {
            "text" | "file" | "data" => serde_json::from_value(value.clone())
                .map_err(|e| A2AError::Validation(format!("invalid {} part: {}", kind, e))),
            other => Err(A2AError::Validation(format!(
                "unknown part type: {}",
                other
            ))),
        }
    }

    /// Serialize to the wire representation
    pub fn to_wire(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// The wire discriminator for this variant
    pub fn kind(&self) -> &'static str {
        match self {
            Part::Text(_) => "text",
            Part::File(_) => "file",
            Part::Data(_) => "data",
        }
    }
}

/// Text content part
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextPart {
    /// The text content
    pub content: String,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl TextPart {
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }

    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    /// Truncate to at most `max_chars` characters, appending an ellipsis when
    /// content was cut.
    pub fn truncated(&self, max_chars: usize) -> String {
        if self.char_count() <= max_chars {
            return self.content.clone();
        }
        let cut: String = self.content.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

/// File reference part
///
/// The only part variant that performs I/O: [`FilePart::encode_base64`] reads
/// the referenced path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilePart {
    /// Path to the file on the producing host
    pub file_path: String,

    /// MIME type of the file
    pub content_type: String,

    /// Size in bytes, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl FilePart {
    pub fn exists(&self) -> bool {
        Path::new(&self.file_path).exists()
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    pub fn is_text(&self) -> bool {
        self.content_type.starts_with("text/")
            || matches!(
                self.content_type.as_str(),
                "application/json" | "application/xml" | "application/yaml"
            )
    }

    pub fn is_document(&self) -> bool {
        matches!(
            self.content_type.as_str(),
            "application/pdf"
                | "application/msword"
                | "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        ) || self.content_type == "text/markdown"
    }

    pub fn is_binary(&self) -> bool {
        !self.is_text()
    }

    /// Read the file and return its content base64-encoded
    pub fn encode_base64(&self) -> Result<String, A2AError> {
        let bytes = std::fs::read(&self.file_path)
            .map_err(|e| A2AError::Validation(format!("cannot read {}: {}", self.file_path, e)))?;
        Ok(general_purpose::STANDARD.encode(bytes))
    }
}

/// Encoding of a [`DataPart`]'s payload on the wire
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DataEncoding {
    #[default]
    Json,
    Yaml,
    Xml,
    Csv,
}

/// Structured data part
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataPart {
    /// The structured payload
    pub data: Value,

    /// Optional JSON-Schema-like shape description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,

    #[serde(default)]
    pub encoding: DataEncoding,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl DataPart {
    /// Serialize the payload into the declared encoding
    pub fn serialize(&self) -> Result<String, A2AError> {
        match self.encoding {
            DataEncoding::Json => serde_json::to_string(&self.data)
                .map_err(|e| A2AError::Validation(format!("json serialization failed: {}", e))),
            DataEncoding::Yaml => serde_yaml::to_string(&self.data)
                .map_err(|e| A2AError::Validation(format!("yaml serialization failed: {}", e))),
            DataEncoding::Csv => encode_csv(&self.data),
            DataEncoding::Xml => Ok(encode_xml("data", &self.data)),
        }
    }

    /// Parse a string in the declared encoding back into a payload.
    ///
    /// XML parse-back is not supported; the encoding tag itself still
    /// round-trips on the wire.
    pub fn parse_back(&self, input: &str) -> Result<Value, A2AError> {
        match self.encoding {
            DataEncoding::Json => serde_json::from_str(input)
                .map_err(|e| A2AError::Validation(format!("invalid json: {}", e))),
            DataEncoding::Yaml => serde_yaml::from_str(input)
                .map_err(|e| A2AError::Validation(format!("invalid yaml: {}", e))),
            DataEncoding::Csv => decode_csv(input),
            DataEncoding::Xml => Err(A2AError::Validation(
                "xml parse-back is not supported".into(),
            )),
        }
    }

    /// Shallow type-shape validation against the declared schema.
    ///
    /// Checks the top-level `type`, per-property types for objects, and the
    /// `required` property list. A part without a schema always validates.
    pub fn validate_schema(&self) -> Result<(), A2AError> {
        let Some(schema) = &self.schema else {
            return Ok(());
        };

        if let Some(expected) = schema.get("type").and_then(Value::as_str) {
            let actual = json_type_name(&self.data);
            if expected != actual {
                return Err(A2AError::Validation(format!(
                    "data is {} but schema expects {}",
                    actual, expected
                )));
            }
        }

        let (Some(obj), Some(props)) = (
            self.data.as_object(),
            schema.get("properties").and_then(Value::as_object),
        ) else {
            return Ok(());
        };

        if let Some(required) = schema.get("required").and_then(Value::as_array) {
            for key in required.iter().filter_map(Value::as_str) {
                if !obj.contains_key(key) {
                    return Err(A2AError::Validation(format!(
                        "missing required property: {}",
                        key
                    )));
                }
            }
        }

        for (key, prop_schema) in props {
            let (Some(value), Some(expected)) = (
                obj.get(key),
                prop_schema.get("type").and_then(Value::as_str),
            ) else {
                continue;
            };
            let actual = json_type_name(value);
            if expected != actual {
                return Err(A2AError::Validation(format!(
                    "property {} is {} but schema expects {}",
                    key, actual, expected
                )));
            }
        }

        Ok(())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Render an array of flat objects as CSV. Scalar cells only.
fn encode_csv(data: &Value) -> Result<String, A2AError> {
    let rows = data
        .as_array()
        .ok_or_else(|| A2AError::Validation("csv encoding requires an array of objects".into()))?;

    let Some(first) = rows.first().and_then(Value::as_object) else {
        return Ok(String::new());
    };

    let headers: Vec<&String> = first.keys().collect();
    let mut out = headers
        .iter()
        .map(|h| h.as_str())
        .collect::<Vec<_>>()
        .join(",");
    out.push('\n');

    for row in rows {
        let obj = row
            .as_object()
            .ok_or_else(|| A2AError::Validation("csv rows must be objects".into()))?;
        let line: Vec<String> = headers
            .iter()
            .map(|h| match obj.get(*h) {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            })
            .collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }

    Ok(out)
}

/// Parse CSV produced by [`encode_csv`]: header line plus string-valued rows.
fn decode_csv(input: &str) -> Result<Value, A2AError> {
    let mut lines = input.lines();
    let Some(header) = lines.next() else {
        return Ok(Value::Array(vec![]));
    };
    let headers: Vec<&str> = header.split(',').collect();

    let rows: Vec<Value> = lines
        .filter(|l| !l.is_empty())
        .map(|line| {
            let cells = line.split(',');
            let obj: Map<String, Value> = headers
                .iter()
                .zip(cells)
                .map(|(h, c)| ((*h).to_string(), Value::String(c.to_string())))
                .collect();
            Value::Object(obj)
        })
        .collect();

    Ok(Value::Array(rows))
}

fn encode_xml(tag: &str, value: &Value) -> String {
    match value {
        Value::Object(obj) => {
            let inner: String = obj.iter().map(|(k, v)| encode_xml(k, v)).collect();
            format!("<{}>{}</{}>", tag, inner, tag)
        }
        Value::Array(items) => items.iter().map(|v| encode_xml(tag, v)).collect(),
        Value::String(s) => format!("<{}>{}</{}>", tag, xml_escape(s), tag),
        other => format!("<{}>{}</{}>", tag, other, tag),
    }
}

fn xml_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
    System,
}

/// A message in the A2A protocol
///
/// An ordered sequence of parts with an identity, a role, and a timestamp
/// that is refreshed whenever the message is mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: String,

    pub role: Role,

    pub parts: Vec<Part>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,

    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new message with a generated id
    pub fn new(role: Role, parts: Vec<Part>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            role,
            parts,
            metadata: Map::new(),
            timestamp: Utc::now(),
        }
    }

    /// Create a user message with text content
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![Part::text(text)])
    }

    /// Create an agent message with text content
    pub fn agent(text: impl Into<String>) -> Self {
        Self::new(Role::Agent, vec![Part::text(text)])
    }

    /// Append a part, refreshing the timestamp
    pub fn push_part(&mut self, part: Part) {
        self.parts.push(part);
        self.timestamp = Utc::now();
    }

    /// Set a metadata field, refreshing the timestamp
    pub fn set_metadata(&mut self, key: impl Into<String>, value: Value) {
        self.metadata.insert(key.into(), value);
        self.timestamp = Utc::now();
    }

    /// Parse a message from its wire representation, validating every part.
    ///
    /// A missing `id` is generated; an invalid member part is a validation
    /// error, not a crash.
    pub fn from_wire(value: &Value) -> Result<Self, A2AError> {
        let obj = value
            .as_object()
            .ok_or_else(|| A2AError::Validation("message must be an object".into()))?;

        let role: Role = obj
            .get("role")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| A2AError::Validation(format!("invalid role: {}", e)))?
            .ok_or_else(|| A2AError::Validation("message is missing role".into()))?;

        let raw_parts = obj
            .get("parts")
            .and_then(Value::as_array)
            .ok_or_else(|| A2AError::Validation("message is missing parts".into()))?;

        let parts = raw_parts
            .iter()
            .map(Part::from_wire)
            .collect::<Result<Vec<_>, _>>()?;

        let id = obj
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::now_v7().to_string());

        let metadata = obj
            .get("metadata")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let timestamp = obj
            .get("timestamp")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Utc::now);

        Ok(Self {
            id,
            role,
            parts,
            metadata,
            timestamp,
        })
    }

    /// Serialize to the wire representation
    pub fn to_wire(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
