//! PhotoCollection - Top-level owner of photo records and their derived route
//!
//! This module provides the high-level API for ingesting photos, keeping them in
//! capture-time order and deriving the route and viewport consumed by renderers.

use crate::gps::Coordinates;
use crate::photo::{PhotoId, PhotoRecord};
use crate::route::{self, Route};
use crate::sort::sort_by_time;
use crate::viewport::{self, MapViewport};
use crate::{Error, Result};

use once_cell::sync::OnceCell;
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

/// Information about the photo collection
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollectionInfo {
    /// Number of photos loaded
    pub photo_count: usize,
    /// Number of photos with resolvable coordinates
    pub geotagged_count: usize,
    /// Length of the route in kilometers
    pub route_distance_km: f64,
    /// Earliest and latest capture time (epoch ms), `None` if empty
    pub time_span: Option<(i64, i64)>,
}

/// Owner of all photos, kept in capture-time order
#[derive(Clone, Debug, Default)]
pub struct PhotoCollection {
    /// Photos, stably ordered by capture time
    photos: Vec<PhotoRecord>,
    /// Ids present in `photos`
    ids: HashSet<PhotoId>,
    /// Route of the current contents (dropped on every mutation)
    route_cache: OnceCell<Arc<Route>>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl PhotoCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a photo to the collection
    ///
    /// The collection is re-sorted by capture time afterwards; photos with equal
    /// timestamps keep their insertion order.
    pub fn add(&mut self, photo: PhotoRecord) -> Result<()> {
        if self.ids.contains(photo.id()) {
            return Err(Error::DuplicatePhoto(photo.id().clone()));
        }
        photo.prepare();
        self.ids.insert(photo.id().clone());
        self.photos.push(photo);
        self.after_mutation();
        Ok(())
    }

    /// Add multiple photos, deriving their metadata in parallel
    ///
    /// Either all photos are added or, when an id collides, none are.
    pub fn add_many(&mut self, photos: Vec<PhotoRecord>) -> Result<()> {
        let mut incoming = HashSet::with_capacity(photos.len());
        for photo in &photos {
            if self.ids.contains(photo.id()) || !incoming.insert(photo.id().clone()) {
                return Err(Error::DuplicatePhoto(photo.id().clone()));
            }
        }

        // Normalization is pure per photo
        photos.par_iter().for_each(PhotoRecord::prepare);

        let added = photos.len();
        self.ids.extend(incoming);
        self.photos.extend(photos);
        self.after_mutation();

        tracing::info!(
            "Added {} photos ({} in collection)",
            added,
            self.photos.len()
        );
        Ok(())
    }

    /// Remove a photo by id
    pub fn remove(&mut self, id: &PhotoId) -> Result<PhotoRecord> {
        let index = self
            .photos
            .iter()
            .position(|p| p.id() == id)
            .ok_or_else(|| Error::UnknownPhoto(id.clone()))?;
        let photo = self.photos.remove(index);
        self.ids.remove(id);
        self.after_mutation();
        Ok(photo)
    }

    /// Clear all photos from the collection
    pub fn clear(&mut self) {
        self.photos.clear();
        self.ids.clear();
        self.route_cache = OnceCell::new();
    }

    /// Get a photo by id
    pub fn get(&self, id: &PhotoId) -> Option<&PhotoRecord> {
        if !self.ids.contains(id) {
            return None;
        }
        self.photos.iter().find(|p| p.id() == id)
    }

    /// All photos, in capture-time order
    #[inline]
    pub fn photos(&self) -> &[PhotoRecord] {
        &self.photos
    }

    /// Photos freshly ordered by capture time
    pub fn sorted(&self) -> Vec<&PhotoRecord> {
        sort_by_time(&self.photos)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.photos.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// Route of the current contents
    ///
    /// Built once per mutation; repeated calls return the same route (and thus
    /// the same revision) until the collection changes.
    pub fn route(&self) -> Arc<Route> {
        self.route_cache
            .get_or_init(|| Arc::new(route::build_route(&self.photos)))
            .clone()
    }

    /// Every resolved photo position, in collection order
    pub fn gps_coordinates(&self) -> Vec<Coordinates> {
        self.photos
            .iter()
            .filter_map(|p| p.metadata().coords)
            .collect()
    }

    /// Viewport containing every geotagged photo
    pub fn viewport(&self) -> Option<MapViewport> {
        viewport::compute_viewport(&self.gps_coordinates())
    }

    /// Get collection information
    pub fn info(&self) -> CollectionInfo {
        let route = self.route();
        let time_span = match (self.photos.first(), self.photos.last()) {
            (Some(first), Some(last)) => Some((first.capture_time(), last.capture_time())),
            _ => None,
        };
        CollectionInfo {
            photo_count: self.photos.len(),
            geotagged_count: route.len(),
            route_distance_km: route.total_distance_km(),
            time_span,
        }
    }

    fn after_mutation(&mut self) {
        // Stable, so insertion order breaks ties
        self.photos.sort_by_key(PhotoRecord::capture_time);
        self.route_cache = OnceCell::new();
    }
}
