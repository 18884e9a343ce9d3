//! R-tree nodes for spatial indexing.
//!
//! Wraps graph subjects that carry a WGS84 coordinate pair so bounding-box
//! queries can skip a scan over every subject in the store.

use rstar::{RTreeObject, AABB};

use crate::models::term::Term;

// ============================================================================
// Coordinate Spatial Node
// ============================================================================

#[derive(Clone, Debug)]
pub struct CoordinateNode {
    pub subject: Term,
    /// Position of the subject's first triple in the dataset, shared by all of its nodes
    pub ordinal: usize,
    point: [f64; 2],
}

impl CoordinateNode {
    pub fn new(subject: Term, ordinal: usize, longitude: f64, latitude: f64) -> Self {
        Self {
            subject,
            ordinal,
            point: [longitude, latitude],
        }
    }
}

impl RTreeObject for CoordinateNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

