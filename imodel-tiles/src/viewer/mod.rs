//! Viewer adapters.
//!
//! A viewer takes a resolved [`TilesetUrl`], loads the tileset, and fits its
//! view to the model. Renderers implement [`ViewerAdapter`]; the crate ships
//! [`HeadlessViewer`], which fetches the root manifest over HTTP and computes
//! the placement a renderer would apply.

mod headless;
mod manifest;
mod placement;

use std::future::Future;

use thiserror::Error;

use crate::export::{TilesetUrl, TilesetUrlError};
use crate::http::HttpError;

pub use headless::{HeadlessViewer, LoadedTileset};
pub use manifest::{
    cartographic_to_ecef, Asset, BoundingSphere, BoundingVolume, Tile, TileContent,
    TilesetManifest,
};
pub use placement::ViewFit;

/// Errors loading or fitting a tileset.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("tileset request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid tileset manifest at {url}: {reason}")]
    Manifest { url: String, reason: String },

    /// The root tile has no usable bounding volume.
    #[error("tileset root has no bounding volume")]
    NoBoundingVolume,

    #[error(transparent)]
    Tileset(#[from] TilesetUrlError),
}

/// A tile renderer.
pub trait ViewerAdapter: Send + Sync {
    /// Renderable handle for a loaded tileset.
    type Handle: Send;

    fn load_tileset(
        &self,
        url: &TilesetUrl,
    ) -> impl Future<Output = Result<Self::Handle, ViewerError>> + Send;

    fn fit_view_to(&self, handle: &Self::Handle) -> Result<ViewFit, ViewerError>;
}

/// Loads a tileset and fits the view to it, once each.
pub async fn show_tileset<V: ViewerAdapter>(
    viewer: &V,
    url: &TilesetUrl,
) -> Result<(V::Handle, ViewFit), ViewerError> {
    let handle = viewer.load_tileset(url).await?;
    let fit = viewer.fit_view_to(&handle)?;
    Ok((handle, fit))
}
