//! Candidates and ranked results.

use std::fmt;

use nearby_graph::GeoPoint;
use strum::EnumDiscriminants;

use crate::error::ResolveError;

/// An OpenStreetMap tag selecting a category of places, e.g. `tourism=museum`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PlaceKind {
    key: String,
    value: String,
}

impl PlaceKind {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn tourism(value: impl Into<String>) -> Self {
        Self::new("tourism", value)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for PlaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Which knowledge source a query goes to
#[derive(Clone, Debug, PartialEq, Eq, EnumDiscriminants)]
#[strum_discriminants(name(SourceTag), derive(Hash, strum::Display))]
pub enum SourceKind {
    /// Train stations from the local graph
    Stations,
    /// Tagged places from the remote endpoint
    Places(PlaceKind),
}

/// One `(origin, radius, source)` request
#[derive(Clone, Debug, PartialEq)]
pub struct ProximityQuery {
    pub origin: GeoPoint,
    pub radius_km: f64,
    pub source: SourceKind,
}

impl ProximityQuery {
    pub fn new(origin: GeoPoint, radius_km: f64, source: SourceKind) -> Self {
        Self {
            origin,
            radius_km,
            source,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub identifier: String,
    pub display_name: String,
    pub link_target: Option<String>,
    /// Great-circle distance from the query origin
    pub distance_km: f64,
    pub position: Option<GeoPoint>,
}

impl Candidate {
    /// Where a rendered entry should link to
    pub fn href(&self) -> &str {
        self.link_target.as_deref().unwrap_or(&self.identifier)
    }
}

/// Candidates of one source, nearest first
#[derive(Clone, Debug)]
pub struct RankedResult {
    pub source: SourceTag,
    pub candidates: Vec<Candidate>,
    /// Why the source produced nothing, if it failed
    pub failure: Option<ResolveError>,
}

impl RankedResult {
    /// Sort by distance, keeping source order among ties, then apply `cap`
    pub fn ranked(source: SourceTag, mut candidates: Vec<Candidate>, cap: Option<usize>) -> Self {
        candidates.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        if let Some(cap) = cap {
            candidates.truncate(cap);
        }
        Self {
            source,
            candidates,
            failure: None,
        }
    }

    /// Empty result standing in for a source that failed
    pub fn degraded(source: SourceTag, failure: ResolveError) -> Self {
        Self {
            source,
            candidates: Vec::new(),
            failure: Some(failure),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.failure.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.candidates.iter()
    }
}

impl<'a> IntoIterator for &'a RankedResult {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoDiscriminant;

    fn candidate(id: &str, distance_km: f64) -> Candidate {
        Candidate {
            identifier: id.to_string(),
            display_name: id.to_uppercase(),
            link_target: None,
            distance_km,
            position: None,
        }
    }

    #[test]
    fn test_ranked_is_stable() {
        let result = RankedResult::ranked(
            SourceTag::Stations,
            vec![candidate("c", 3.0), candidate("a", 1.0), candidate("b1", 2.0), candidate("b2", 2.0)],
            None,
        );
        let ids: Vec<&str> = result.iter().map(|c| c.identifier.as_str()).collect();
        assert_eq!(ids, vec!["a", "b1", "b2", "c"]);
        assert!(!result.is_degraded());
    }

    #[test]
    fn test_ranked_cap() {
        let candidates = (0..8).rev().map(|i| candidate(&format!("p{i}"), i as f64)).collect();
        let result = RankedResult::ranked(SourceTag::Places, candidates, Some(5));
        assert_eq!(result.len(), 5);
        assert_eq!(result.candidates[0].identifier, "p0");
        assert_eq!(result.candidates[4].identifier, "p4");
    }

    #[test]
    fn test_href_falls_back_to_identifier() {
        let mut museum = candidate("https://www.openstreetmap.org/node/1", 0.4);
        assert_eq!(museum.href(), "https://www.openstreetmap.org/node/1");
        museum.link_target = Some("https://museum.example".into());
        assert_eq!(museum.href(), "https://museum.example");
    }

    #[test]
    fn test_source_tags() {
        assert_eq!(SourceKind::Stations.discriminant(), SourceTag::Stations);
        let museums = SourceKind::Places(PlaceKind::tourism("museum"));
        assert_eq!(museums.discriminant(), SourceTag::Places);
        assert_eq!(SourceTag::Places.to_string(), "Places");
        assert_eq!(PlaceKind::tourism("museum").to_string(), "tourism=museum");
    }
}
