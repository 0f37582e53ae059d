//! SARIF 2.1.0 log types shared by every lintkit check.

use serde::{Deserialize, Serialize};
use std::io::Write;

/// SARIF schema version.
pub const VERSION: &str = "2.1.0";

pub const SCHEMA: &str = "https://json.schemastore.org/sarif-2.1.0.json";

/// Top-level SARIF document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Log {
    pub version: String,
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub runs: Vec<Run>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Run {
    pub tool: Tool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<SarifResult>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Tool {
    pub driver: Driver,
}

/// Identity of the tool that produced a run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub information_uri: Option<String>,
}

/// A single finding. Named to avoid clashing with `std::result::Result`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SarifResult {
    pub rule_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>, // error, warning, note
    pub message: Message,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub text: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub physical_location: PhysicalLocation,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalLocation {
    pub artifact_location: ArtifactLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ArtifactLocation {
    pub uri: String,
}

/// A span within a file. Unset fields are left out of the output.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_column: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column: Option<usize>,
}

impl Log {
    pub fn new() -> Self {
        Log {
            version: VERSION.to_string(),
            schema: Some(SCHEMA.to_string()),
            runs: Vec::new(),
        }
    }
}

impl Default for Log {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes logs as 2-space indented JSON followed by a newline.
pub struct Encoder<W: Write> {
    writer: W,
}

impl<W: Write> Encoder<W> {
    pub fn new(writer: W) -> Self {
        Encoder { writer }
    }

    pub fn encode(&mut self, log: &Log) -> crate::Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, log)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Convenience wrapper around [`Encoder`] for in-memory output.
pub fn to_string(log: &Log) -> crate::Result<String> {
    let mut enc = Encoder::new(Vec::new());
    enc.encode(log)?;
    Ok(String::from_utf8_lossy(&enc.into_inner()).into_owned())
}
