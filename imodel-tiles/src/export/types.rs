//! Export domain types and the wire-shape adapter.
//!
//! The service returns export records in two shapes: nested under `export`
//! (single-export endpoints) or flat (list entries, some single responses).
//! Both are decoded into the wire types below and normalized onto
//! [`ExportRecord`] before anything else sees them.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Mesh format produced by an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportType {
    /// Cesium-flavoured 3D Tiles.
    Cesium,
    /// Generic 3D Tiles.
    ThreeDTiles,
}

impl ExportType {
    /// Wire name of the export type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportType::Cesium => "CESIUM",
            ExportType::ThreeDTiles => "3DTILES",
        }
    }
}

impl fmt::Display for ExportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CESIUM" => Ok(ExportType::Cesium),
            "3DTILES" => Ok(ExportType::ThreeDTiles),
            _ => Err(format!("unknown export type '{}'", s)),
        }
    }
}

/// Server-side status of an export job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ExportStatus {
    NotStarted,
    Queued,
    InProgress,
    Complete,
    Invalid,
    Error,
    /// A status this client does not know; treated as non-terminal.
    Other(String),
}

impl ExportStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, ExportStatus::Complete)
    }

    /// Terminal statuses from which the export will never complete.
    pub fn is_failure(&self) -> bool {
        matches!(self, ExportStatus::Invalid | ExportStatus::Error)
    }

    pub fn is_terminal(&self) -> bool {
        self.is_complete() || self.is_failure()
    }
}

impl From<String> for ExportStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "NotStarted" => ExportStatus::NotStarted,
            "Queued" => ExportStatus::Queued,
            "InProgress" => ExportStatus::InProgress,
            "Complete" => ExportStatus::Complete,
            "Invalid" => ExportStatus::Invalid,
            "Error" | "Failed" => ExportStatus::Error,
            _ => ExportStatus::Other(s),
        }
    }
}

impl fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportStatus::NotStarted => "NotStarted",
            ExportStatus::Queued => "Queued",
            ExportStatus::InProgress => "InProgress",
            ExportStatus::Complete => "Complete",
            ExportStatus::Invalid => "Invalid",
            ExportStatus::Error => "Error",
            ExportStatus::Other(s) => s,
        };
        f.write_str(name)
    }
}

/// What export is wanted: an iModel, optionally at a changeset, in a format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub imodel_id: String,
    /// Empty means the latest changeset.
    pub changeset_id: String,
    pub export_type: ExportType,
}

impl ExportRequest {
    pub fn new(imodel_id: impl Into<String>, export_type: ExportType) -> Self {
        Self {
            imodel_id: imodel_id.into(),
            changeset_id: String::new(),
            export_type,
        }
    }

    pub fn with_changeset(mut self, changeset_id: impl Into<String>) -> Self {
        self.changeset_id = changeset_id.into();
        self
    }

    /// The changeset, if one was requested.
    pub fn changeset(&self) -> Option<&str> {
        let id = self.changeset_id.trim();
        (!id.is_empty()).then_some(id)
    }
}

/// Normalized export record, independent of the response shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRecord {
    pub id: String,
    pub display_name: Option<String>,
    pub status: ExportStatus,
    /// Export type as reported by the server.
    pub export_type: Option<String>,
    pub imodel_id: Option<String>,
    pub changeset_id: Option<String>,
    /// Link to the exported mesh, usually carrying a SAS query string.
    pub mesh_link: Option<String>,
}

impl ExportRecord {
    /// Returns true if the server reports the given export type.
    pub fn is_type(&self, export_type: ExportType) -> bool {
        self.export_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(export_type.as_str()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireExport {
    id: String,
    #[serde(default)]
    display_name: Option<String>,
    status: ExportStatus,
    #[serde(default)]
    request: Option<WireRequest>,
    #[serde(rename = "_links", default)]
    links: Option<WireLinks>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest {
    #[serde(default)]
    i_model_id: Option<String>,
    #[serde(default)]
    changeset_id: Option<String>,
    #[serde(default)]
    export_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireLinks {
    #[serde(default)]
    mesh: Option<WireLink>,
}

#[derive(Debug, Deserialize)]
struct WireLink {
    href: String,
}

/// Response of the list endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse {
    #[serde(default)]
    pub exports: Vec<WireExport>,
}

/// Response of the single-export and create endpoints.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SingleResponse {
    Nested { export: WireExport },
    Flat(WireExport),
}

impl SingleResponse {
    pub fn into_record(self) -> ExportRecord {
        match self {
            SingleResponse::Nested { export } => export.into(),
            SingleResponse::Flat(export) => export.into(),
        }
    }
}

impl From<WireExport> for ExportRecord {
    fn from(wire: WireExport) -> Self {
        let (imodel_id, changeset_id, export_type) = match wire.request {
            Some(r) => (r.i_model_id, r.changeset_id, r.export_type),
            None => (None, None, None),
        };
        Self {
            id: wire.id,
            display_name: wire.display_name,
            status: wire.status,
            export_type,
            imodel_id,
            changeset_id,
            mesh_link: wire.links.and_then(|l| l.mesh).map(|m| m.href),
        }
    }
}
