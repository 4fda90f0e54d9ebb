//! Persistence stage - mirrors captures into the system library.

use std::sync::Arc;

use crate::models::{GeoLocation, LibraryAssetId};
use crate::orchestrator::errors::PersistenceError;
use crate::services::{MediaLibrary, SavePayload};

/// Writes finished payloads into the system library.
///
/// The library's save is all-or-nothing, so a failure here leaves no
/// asset behind and nothing to clean up.
pub struct PersistenceStage {
    library: Arc<dyn MediaLibrary>,
}

impl PersistenceStage {
    pub fn new(library: Arc<dyn MediaLibrary>) -> Self {
        Self { library }
    }

    pub fn name(&self) -> &'static str {
        "Persist"
    }

    /// Save `payload`, returning its library reference.
    pub async fn persist(
        &self,
        payload: &SavePayload,
        album: Option<&str>,
        location: Option<GeoLocation>,
    ) -> Result<LibraryAssetId, PersistenceError> {
        // Blank album names mean the library default.
        let album = album.map(str::trim).filter(|name| !name.is_empty());

        self.library
            .save(payload, album, location)
            .await
            .map_err(|e| PersistenceError::write_failed(e.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImagePayload;
    use crate::sim::SimLibrary;
    use std::path::PathBuf;

    #[tokio::test]
    async fn saves_into_named_album() {
        let library = Arc::new(SimLibrary::new());
        let stage = PersistenceStage::new(library.clone());
        let location = GeoLocation {
            latitude: 48.85,
            longitude: 2.35,
            altitude: None,
        };

        let payload = SavePayload::Image(Arc::new(ImagePayload::new(2, 2, vec![1; 16])));
        let id = stage
            .persist(&payload, Some("Trips"), Some(location))
            .await
            .unwrap();

        let assets = library.assets();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].id, id);
        assert_eq!(assets[0].album.as_deref(), Some("Trips"));
        assert_eq!(assets[0].location, Some(location));
    }

    #[tokio::test]
    async fn blank_album_uses_default() {
        let library = Arc::new(SimLibrary::new());
        let stage = PersistenceStage::new(library.clone());

        let payload = SavePayload::Video(PathBuf::from("/tmp/v.mov"));
        stage.persist(&payload, Some("  "), None).await.unwrap();

        assert_eq!(library.assets()[0].album, None);
    }

    #[tokio::test]
    async fn failure_maps_to_write_failed() {
        let library = Arc::new(SimLibrary::failing("not authorized"));
        let stage = PersistenceStage::new(library.clone());

        let payload = SavePayload::Video(PathBuf::from("/tmp/v.mov"));
        let err = stage.persist(&payload, None, None).await.unwrap_err();

        assert_eq!(err, PersistenceError::write_failed("not authorized"));
        assert!(library.assets().is_empty());
    }
}
