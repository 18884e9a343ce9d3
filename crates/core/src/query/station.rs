use std::fmt;
use std::sync::Arc;

use nearby_graph::vocab::{gtfs, rdf, schema, wgs, xsd};
use nearby_graph::{BoundingBox, PatternTerm, RangeFilter, SelectQuery, TriplePattern};

use crate::error::Result;

/// Stations of the local graph whose coordinates fall inside a box
#[derive(Clone, Debug, PartialEq)]
pub struct BoundingBoxQuery {
    bbox: BoundingBox,
    select: Arc<SelectQuery>,
}

impl BoundingBoxQuery {
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// The structured form evaluated against the store
    pub fn select(&self) -> &Arc<SelectQuery> {
        &self.select
    }
}

impl fmt::Display for BoundingBoxQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.select)
    }
}

/// `?station a gtfs:Station` with name and coordinates, range-filtered on both axes.
///
/// Coordinates are compared numerically through `xsd:double`. No limit is applied.
pub fn station_query(bbox: &BoundingBox) -> Result<BoundingBoxQuery> {
    let station = || PatternTerm::var("station");

    let select = SelectQuery::new()
        .prefix("xsd", xsd::NS)
        .prefix("schema", schema::NS)
        .prefix("wgs", wgs::NS)
        .prefix("gtfs", gtfs::NS)
        .pattern(TriplePattern::new(station(), rdf::TYPE, PatternTerm::iri(gtfs::STATION)))
        .pattern(TriplePattern::new(station(), schema::NAME, PatternTerm::var("name")))
        .pattern(TriplePattern::new(station(), wgs::LAT, PatternTerm::var("lat")))
        .pattern(TriplePattern::new(station(), wgs::LONG, PatternTerm::var("long")))
        .filter(RangeFilter::new("lat", bbox.lat_min(), bbox.lat_max())?)
        .filter(RangeFilter::new("long", bbox.lon_min(), bbox.lon_max())?);

    Ok(BoundingBoxQuery {
        bbox: *bbox,
        select: Arc::new(select),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nearby_graph::{GeoPoint, buffer_bounding_box};

    #[test]
    fn test_station_query_structure() {
        let bbox = buffer_bounding_box(GeoPoint::new(4.4, 51.2).unwrap(), 5.0).unwrap();
        let query = station_query(&bbox).unwrap();
        let text = query.to_string();

        assert!(text.contains("PREFIX gtfs: <http://vocab.gtfs.org/terms#>"));
        assert!(text.contains("?station a gtfs:Station ."));
        assert!(text.contains("?station schema:name ?name ."));
        assert!(text.contains("?station wgs:lat ?lat ."));
        assert!(text.contains("?station wgs:long ?long ."));
        assert!(text.contains(&format!(
            "FILTER(xsd:double(?lat) >= {} && xsd:double(?lat) <= {})",
            bbox.lat_min(),
            bbox.lat_max()
        )));
        assert!(text.contains(&format!(
            "FILTER(xsd:double(?long) >= {} && xsd:double(?long) <= {})",
            bbox.lon_min(),
            bbox.lon_max()
        )));
        assert!(!text.contains("LIMIT"));
    }

    #[test]
    fn test_text_and_structure_agree() {
        let bbox = buffer_bounding_box(GeoPoint::new(3.72, 51.05).unwrap(), 2.0).unwrap();
        let query = station_query(&bbox).unwrap();

        let lat = query.select().filters().iter().find(|f| f.variable.as_str() == "lat").unwrap();
        assert_eq!(lat.min(), bbox.lat_min());
        assert_eq!(lat.max(), bbox.lat_max());
        assert_eq!(query.select().patterns().len(), 4);
        assert_eq!(query.bbox(), &bbox);
    }
}
