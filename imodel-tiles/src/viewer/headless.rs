//! A viewer without a renderer.

use tracing::{debug, info};

use super::manifest::TilesetManifest;
use super::placement::ViewFit;
use super::{ViewerAdapter, ViewerError};
use crate::export::{TilesetUrl, TilesetUrlError};
use crate::http::{AsyncHttpClient, HttpRequest};

/// Fetches `tileset.json` and computes the placement a renderer would use.
pub struct HeadlessViewer<C: AsyncHttpClient> {
    http_client: C,
}

/// A fetched tileset manifest and the URL it came from.
#[derive(Debug, Clone)]
pub struct LoadedTileset {
    pub url: TilesetUrl,
    pub manifest: TilesetManifest,
}

impl LoadedTileset {
    /// Fetchable URLs of every tile's content, carrying the access query.
    pub fn content_urls(&self) -> Result<Vec<String>, TilesetUrlError> {
        self.manifest
            .content_uris()
            .into_iter()
            .map(|uri| self.url.sign_resource(uri))
            .collect()
    }
}

impl<C: AsyncHttpClient> HeadlessViewer<C> {
    pub fn new(http_client: C) -> Self {
        Self { http_client }
    }
}

impl<C: AsyncHttpClient> ViewerAdapter for HeadlessViewer<C> {
    type Handle = LoadedTileset;

    async fn load_tileset(&self, url: &TilesetUrl) -> Result<LoadedTileset, ViewerError> {
        debug!(url = %url, "Fetching tileset manifest");
        let response = self
            .http_client
            .send(HttpRequest::get(url.as_str()).header("Accept", "application/json"))
            .await?;

        if !response.is_success() {
            return Err(ViewerError::Status {
                url: url.to_string(),
                status: response.status,
            });
        }

        let manifest =
            TilesetManifest::from_slice(&response.body).map_err(|e| ViewerError::Manifest {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        info!(
            version = %manifest.asset.version,
            tiles = manifest.root.tile_count(),
            "Loaded tileset"
        );

        Ok(LoadedTileset {
            url: url.clone(),
            manifest,
        })
    }

    fn fit_view_to(&self, handle: &LoadedTileset) -> Result<ViewFit, ViewerError> {
        let sphere = handle
            .manifest
            .bounding_sphere()
            .ok_or(ViewerError::NoBoundingVolume)?;
        let fit = ViewFit::from_bounding_sphere(&sphere);
        debug!(
            radius = fit.radius,
            distance = fit.distance_to_ellipsoid_center,
            "Fitted view to tileset"
        );
        Ok(fit)
    }
}
