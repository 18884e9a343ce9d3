//! In-memory triple store backed by a decoded dataset.
//!
//! Stores every triple once, with per-position lookup maps for pattern
//! matching and an R-tree over subjects that carry WGS84 coordinates.

use std::collections::HashMap;

use rstar::{RTree, AABB};

use crate::identifiers::Iri;
use crate::models::term::{Term, Triple};
use crate::spatial::index::CoordinateNode;
use crate::spatial::queries::BoundingBox;
use crate::vocab::wgs;

/// Read-only, queryable graph
#[derive(Clone)]
pub struct GraphStore {
    // Core data, in dataset order
    triples: Vec<Triple>,

    // Lookup maps (indices into `triples`)
    by_subject: HashMap<Term, Vec<usize>>,
    by_predicate: HashMap<Iri, Vec<usize>>,
    by_object: HashMap<Term, Vec<usize>>,

    // Spatial index over wgs:lat / wgs:long
    coordinate_tree: RTree<CoordinateNode>,
}

impl GraphStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::from_triples(Vec::new())
    }

    /// Build the store and its indices from decoded triples
    pub fn from_triples(triples: Vec<Triple>) -> Self {
        let mut by_subject: HashMap<Term, Vec<usize>> = HashMap::new();
        let mut by_predicate: HashMap<Iri, Vec<usize>> = HashMap::new();
        let mut by_object: HashMap<Term, Vec<usize>> = HashMap::new();

        for (index, triple) in triples.iter().enumerate() {
            by_subject.entry(triple.subject.clone()).or_default().push(index);
            by_predicate.entry(triple.predicate.clone()).or_default().push(index);
            by_object.entry(triple.object.clone()).or_default().push(index);
        }

        let coordinate_tree = RTree::bulk_load(coordinate_nodes(&triples, &by_subject));

        Self {
            triples,
            by_subject,
            by_predicate,
            by_object,
            coordinate_tree,
        }
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Number of coordinate pairs in the spatial index
    pub fn located_points(&self) -> usize {
        self.coordinate_tree.size()
    }

    /// All triples matching the given pattern, in dataset order.
    ///
    /// `None` acts as a wildcard for that position.
    pub fn match_pattern<'a>(
        &'a self,
        subject: Option<&'a Term>,
        predicate: Option<&'a Iri>,
        object: Option<&'a Term>,
    ) -> impl Iterator<Item = &'a Triple> + 'a {
        // Drive the scan from the most selective bound position
        let candidates: Option<&[usize]> = [
            subject.map(|s| self.by_subject.get(s).map(Vec::as_slice).unwrap_or(&[])),
            object.map(|o| self.by_object.get(o).map(Vec::as_slice).unwrap_or(&[])),
            predicate.map(|p| self.by_predicate.get(p).map(Vec::as_slice).unwrap_or(&[])),
        ]
        .into_iter()
        .flatten()
        .min_by_key(|indices| indices.len());

        let indices: Box<dyn Iterator<Item = usize> + 'a> = match candidates {
            Some(indices) => Box::new(indices.iter().copied()),
            None => Box::new(0..self.triples.len()),
        };

        indices
            .map(move |index| &self.triples[index])
            .filter(move |triple| {
                subject.map_or(true, |s| &triple.subject == s)
                    && predicate.map_or(true, |p| &triple.predicate == p)
                    && object.map_or(true, |o| &triple.object == o)
            })
    }

    /// Subjects whose `wgs:long`/`wgs:lat` pair lies inside `bbox`, in dataset order
    pub fn subjects_within(&self, bbox: &BoundingBox) -> Vec<Term> {
        let (min, max) = bbox.corners();
        self.subjects_in_envelope(min, max)
    }

    /// Subjects whose `[long, lat]` lies between the `min` and `max` corners, in dataset order
    pub fn subjects_in_envelope(&self, min: [f64; 2], max: [f64; 2]) -> Vec<Term> {
        let mut nodes: Vec<&CoordinateNode> = self
            .coordinate_tree
            .locate_in_envelope(&AABB::from_corners(min, max))
            .collect();
        nodes.sort_by_key(|node| node.ordinal);
        nodes.dedup_by_key(|node| node.ordinal);
        nodes.into_iter().map(|node| node.subject.clone()).collect()
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore")
            .field("triples", &self.triples.len())
            .field("subjects", &self.by_subject.len())
            .field("located_points", &self.coordinate_tree.size())
            .finish()
    }
}

fn coordinate_nodes(
    triples: &[Triple],
    by_subject: &HashMap<Term, Vec<usize>>,
) -> Vec<CoordinateNode> {
    let mut nodes = Vec::new();

    for (subject, indices) in by_subject {
        let numeric = |predicate: &str| -> Vec<f64> {
            indices
                .iter()
                .map(|&index| &triples[index])
                .filter(|triple| triple.predicate.as_str() == predicate)
                .filter_map(|triple| triple.object.as_f64())
                .filter(|value| value.is_finite())
                .collect()
        };

        // One node per long/lat combination so multi-valued subjects stay reachable
        let latitudes = numeric(wgs::LAT);
        for longitude in numeric(wgs::LONG) {
            for &latitude in &latitudes {
                nodes.push(CoordinateNode::new(subject.clone(), indices[0], longitude, latitude));
            }
        }
    }

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::term::Literal;
    use crate::spatial::queries::{buffer_bounding_box, GeoPoint};
    use crate::vocab::{gtfs, rdf, schema};

    fn station(id: &str, name: &str, longitude: &str, latitude: &str) -> Vec<Triple> {
        let subject = Term::iri(id);
        vec![
            Triple::new(subject.clone(), Iri::new(rdf::TYPE), Term::iri(gtfs::STATION)),
            Triple::new(subject.clone(), Iri::new(schema::NAME), Literal::string(name).into()),
            Triple::new(subject.clone(), Iri::new(wgs::LAT), Literal::string(latitude).into()),
            Triple::new(subject, Iri::new(wgs::LONG), Literal::string(longitude).into()),
        ]
    }

    fn sample_store() -> GraphStore {
        let mut triples = station("http://irail.be/stations/NMBS/008821006", "Antwerpen-Centraal", "4.421101", "51.2172");
        triples.extend(station("http://irail.be/stations/NMBS/008821063", "Antwerpen-Berchem", "4.432221", "51.19923"));
        triples.extend(station("http://irail.be/stations/NMBS/008892007", "Gent-Sint-Pieters", "3.710675", "51.035896"));
        GraphStore::from_triples(triples)
    }

    #[test]
    fn test_empty_store() {
        let store = GraphStore::new();
        assert!(store.is_empty());
        assert_eq!(store.match_pattern(None, None, None).count(), 0);
    }

    #[test]
    fn test_match_pattern() {
        let store = sample_store();
        assert_eq!(store.len(), 12);
        assert_eq!(store.located_points(), 3);

        let name = Iri::new(schema::NAME);
        let names: Vec<&str> = store
            .match_pattern(None, Some(&name), None)
            .map(|t| t.object.value())
            .collect();
        assert_eq!(names, vec!["Antwerpen-Centraal", "Antwerpen-Berchem", "Gent-Sint-Pieters"]);

        let gent = Term::iri("http://irail.be/stations/NMBS/008892007");
        assert_eq!(store.match_pattern(Some(&gent), None, None).count(), 4);
        assert_eq!(store.match_pattern(Some(&gent), Some(&name), None).count(), 1);

        let unknown = Term::iri("http://example.org/nowhere");
        assert_eq!(store.match_pattern(Some(&unknown), None, None).count(), 0);
    }

    #[test]
    fn test_subjects_within() {
        let store = sample_store();
        let bbox = buffer_bounding_box(GeoPoint::new(4.42, 51.21).unwrap(), 5.0).unwrap();

        let found: Vec<String> = store
            .subjects_within(&bbox)
            .iter()
            .map(|s| s.value().to_string())
            .collect();
        assert_eq!(
            found,
            vec![
                "http://irail.be/stations/NMBS/008821006",
                "http://irail.be/stations/NMBS/008821063",
            ]
        );
    }

    #[test]
    fn test_multi_valued_coordinates_indexed_once_per_subject() {
        let mut triples = station("http://example.org/s/moved", "Moved", "4.4", "10.0");
        triples.push(Triple::new(
            Term::iri("http://example.org/s/moved"),
            Iri::new(wgs::LAT),
            Literal::string("51.2").into(),
        ));
        let store = GraphStore::from_triples(triples);
        assert_eq!(store.located_points(), 2);

        let near = store.subjects_in_envelope([4.33, 51.15], [4.47, 51.25]);
        assert_eq!(near, vec![Term::iri("http://example.org/s/moved")]);

        let everywhere = store.subjects_in_envelope([-180.0, -90.0], [180.0, 90.0]);
        assert_eq!(everywhere.len(), 1);
    }
}
