//! RDF vocabulary constants used by the station dataset and the query dialects.

/// RDF vocabulary
pub mod rdf {
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
}

/// XSD datatypes
pub mod xsd {
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema#";

    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
}

/// schema.org
pub mod schema {
    pub const NS: &str = "http://schema.org/";

    pub const NAME: &str = "http://schema.org/name";
}

/// W3C WGS84 basic geo vocabulary
pub mod wgs {
    pub const NS: &str = "http://www.w3.org/2003/01/geo/wgs84_pos#";

    pub const LAT: &str = "http://www.w3.org/2003/01/geo/wgs84_pos#lat";
    pub const LONG: &str = "http://www.w3.org/2003/01/geo/wgs84_pos#long";
}

/// GTFS linked-data vocabulary
pub mod gtfs {
    pub const NS: &str = "http://vocab.gtfs.org/terms#";

    pub const STATION: &str = "http://vocab.gtfs.org/terms#Station";
}

/// OpenStreetMap keys and metadata as published by Sophox-style endpoints
pub mod osm {
    /// `osmt:` tag keys
    pub const TAG_NS: &str = "https://wiki.openstreetmap.org/wiki/Key:";

    /// `osmm:` element metadata
    pub const META_NS: &str = "https://www.openstreetmap.org/meta/";
}

/// OGC GeoSPARQL
pub mod geosparql {
    pub const NS: &str = "http://www.opengis.net/ont/geosparql#";

    pub const FUNCTION_NS: &str = "http://www.opengis.net/def/geosparql/function/";

    /// OGC units of measure
    pub const UOM_NS: &str = "http://www.opengis.net/def/uom/OGC/1.0/";
}

/// OpenLink Virtuoso built-in functions
pub mod bif {
    pub const NS: &str = "http://www.openlinksw.com/schemas/bif#";
}
