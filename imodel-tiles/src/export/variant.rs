//! Viewer variants and the export settings each one implies.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::locator::LocatePolicy;
use super::types::ExportType;

/// The tile viewer a tileset is acquired for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewerVariant {
    /// CesiumJS viewer, consuming `CESIUM` exports.
    Cesium,
    /// three.js with 3DTilesRenderer, consuming `3DTILES` exports.
    ThreeJs,
}

impl ViewerVariant {
    pub fn export_type(&self) -> ExportType {
        match self {
            ViewerVariant::Cesium => ExportType::Cesium,
            ViewerVariant::ThreeJs => ExportType::ThreeDTiles,
        }
    }

    /// Cesium only reuses finished exports; the three.js viewer takes the
    /// first export of its type and lets the poller wait for it.
    pub fn locate_policy(&self) -> LocatePolicy {
        match self {
            ViewerVariant::Cesium => LocatePolicy::CompleteOnly,
            ViewerVariant::ThreeJs => LocatePolicy::FirstMatch,
        }
    }

    pub fn default_poll_interval(&self) -> Duration {
        match self {
            ViewerVariant::Cesium => Duration::from_secs(5),
            ViewerVariant::ThreeJs => Duration::from_secs(3),
        }
    }

    /// Cesium needs an Ion token for its base layers.
    pub fn requires_ion_token(&self) -> bool {
        matches!(self, ViewerVariant::Cesium)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ViewerVariant::Cesium => "cesium",
            ViewerVariant::ThreeJs => "three-js",
        }
    }
}

impl fmt::Display for ViewerVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ViewerVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cesium" => Ok(ViewerVariant::Cesium),
            "three-js" | "threejs" | "three" => Ok(ViewerVariant::ThreeJs),
            _ => Err(format!("unknown viewer variant '{}'", s)),
        }
    }
}
