//! `tileset.json` manifest types.
//!
//! Only the parts needed to place the model and enumerate tile content are
//! modeled; unknown fields are ignored.

use glam::{DMat4, DVec3};
use serde::Deserialize;

/// WGS84 semi-major axis, meters.
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 first eccentricity squared.
const WGS84_E2: f64 = 6.694_379_990_14e-3;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TilesetManifest {
    pub asset: Asset,
    #[serde(default)]
    pub geometric_error: f64,
    pub root: Tile,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub version: String,
    #[serde(default)]
    pub tileset_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    pub bounding_volume: BoundingVolume,
    #[serde(default)]
    pub geometric_error: f64,
    #[serde(default)]
    pub refine: Option<String>,
    /// Column-major 4x4 matrix.
    #[serde(default)]
    pub transform: Option<[f64; 16]>,
    #[serde(default)]
    pub content: Option<TileContent>,
    #[serde(default)]
    pub children: Vec<Tile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TileContent {
    /// `url` is the pre-1.0 spelling.
    #[serde(alias = "url")]
    pub uri: String,
}

/// One of the three bounding volume kinds.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BoundingVolume {
    /// Center followed by three half-axis vectors.
    #[serde(rename = "box", default)]
    pub obb: Option<[f64; 12]>,
    /// Center and radius.
    #[serde(default)]
    pub sphere: Option<[f64; 4]>,
    /// West, south, east, north (radians), min and max height (meters).
    #[serde(default)]
    pub region: Option<[f64; 6]>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: DVec3,
    pub radius: f64,
}

impl BoundingSphere {
    pub fn new(center: DVec3, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Applies an affine transform, growing the radius by the largest axis
    /// scale.
    pub fn transformed(&self, matrix: &DMat4) -> Self {
        let scale = [matrix.x_axis, matrix.y_axis, matrix.z_axis]
            .iter()
            .map(|axis| axis.truncate().length())
            .fold(0.0_f64, f64::max);
        Self {
            center: matrix.transform_point3(self.center),
            radius: self.radius * scale,
        }
    }
}

impl BoundingVolume {
    /// Sphere enclosing the volume, in the volume's own frame.
    ///
    /// Box takes precedence over sphere, sphere over region.
    pub fn bounding_sphere(&self) -> Option<BoundingSphere> {
        if let Some(b) = &self.obb {
            let center = DVec3::new(b[0], b[1], b[2]);
            let x = DVec3::new(b[3], b[4], b[5]);
            let y = DVec3::new(b[6], b[7], b[8]);
            let z = DVec3::new(b[9], b[10], b[11]);
            let radius = (x.length_squared() + y.length_squared() + z.length_squared()).sqrt();
            return Some(BoundingSphere::new(center, radius));
        }
        if let Some(s) = &self.sphere {
            return Some(BoundingSphere::new(DVec3::new(s[0], s[1], s[2]), s[3]));
        }
        self.region.as_ref().map(region_bounding_sphere)
    }

    fn is_region_only(&self) -> bool {
        self.obb.is_none() && self.sphere.is_none() && self.region.is_some()
    }
}

impl Tile {
    /// Bounding sphere with this tile's transform applied.
    ///
    /// Regions are already earth-fixed and ignore the transform.
    pub fn bounding_sphere(&self) -> Option<BoundingSphere> {
        let sphere = self.bounding_volume.bounding_sphere()?;
        match &self.transform {
            Some(cols) if !self.bounding_volume.is_region_only() => {
                Some(sphere.transformed(&DMat4::from_cols_array(cols)))
            }
            _ => Some(sphere),
        }
    }

    /// Content URIs of this tile and its descendants, depth first.
    pub fn content_uris(&self) -> Vec<&str> {
        let mut uris = Vec::new();
        self.collect_uris(&mut uris);
        uris
    }

    fn collect_uris<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(content) = &self.content {
            out.push(content.uri.as_str());
        }
        for child in &self.children {
            child.collect_uris(out);
        }
    }

    pub fn tile_count(&self) -> usize {
        1 + self.children.iter().map(Tile::tile_count).sum::<usize>()
    }
}

impl TilesetManifest {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Earth-fixed bounding sphere of the whole tileset.
    pub fn bounding_sphere(&self) -> Option<BoundingSphere> {
        self.root.bounding_sphere()
    }

    pub fn content_uris(&self) -> Vec<&str> {
        self.root.content_uris()
    }
}

/// Geodetic position (radians, meters) to earth-centered earth-fixed.
pub fn cartographic_to_ecef(longitude: f64, latitude: f64, height: f64) -> DVec3 {
    let (sin_lat, cos_lat) = latitude.sin_cos();
    let (sin_lon, cos_lon) = longitude.sin_cos();
    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    DVec3::new(
        (n + height) * cos_lat * cos_lon,
        (n + height) * cos_lat * sin_lon,
        (n * (1.0 - WGS84_E2) + height) * sin_lat,
    )
}

/// Samples a 3x3 grid at both heights and encloses the samples.
fn region_bounding_sphere(region: &[f64; 6]) -> BoundingSphere {
    let [west, south, east, north, min_h, max_h] = *region;
    let mut east = east;
    if east < west {
        east += std::f64::consts::TAU;
    }

    let mut points = Vec::with_capacity(18);
    for height in [min_h, max_h] {
        for i in 0..3u8 {
            let lon = west + (east - west) * f64::from(i) / 2.0;
            for j in 0..3u8 {
                let lat = south + (north - south) * f64::from(j) / 2.0;
                points.push(cartographic_to_ecef(lon, lat, height));
            }
        }
    }

    let (min, max) = points.iter().fold(
        (DVec3::splat(f64::INFINITY), DVec3::splat(f64::NEG_INFINITY)),
        |(min, max), p| (min.min(*p), max.max(*p)),
    );
    let center = (min + max) * 0.5;
    let radius = points
        .iter()
        .map(|p| p.distance(center))
        .fold(0.0_f64, f64::max);
    BoundingSphere::new(center, radius)
}
