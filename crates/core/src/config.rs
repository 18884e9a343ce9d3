//! Runtime configuration for the resolver and its sources.

use serde::Deserialize;

/// Public CORS relay used when a relay is requested without a prefix
pub const DEFAULT_RELAY: &str = "https://proxy.linkeddatafragments.org/";

/// Upper bound on candidates returned by the remote source
pub const MAX_PLACE_RESULTS: usize = 5;

/// Geofunction flavour understood by the remote endpoint
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Dialect {
    /// `bif:st_distance` over `bif:st_geomfromtext`, scoped with `FROM <graph>`
    #[default]
    Virtuoso,
    /// `geof:distance` over a `geo:wktLiteral`
    GeoSparql,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RemoteEndpointConfig {
    pub endpoint: String,
    /// Prefix the percent-encoded request URL is appended to
    pub relay: Option<String>,
    /// Named graph for the `FROM` clause
    pub graph: Option<String>,
    pub dialect: Dialect,
    /// `LIMIT` of the place query, between 1 and [`MAX_PLACE_RESULTS`]
    pub limit: usize,
}

impl Default for RemoteEndpointConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://era.ilabt.imec.be/virtuoso/sparql".to_string(),
            relay: None,
            graph: Some("https://openstreetmap.org/graph".to_string()),
            dialect: Dialect::Virtuoso,
            limit: MAX_PLACE_RESULTS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct NearbyConfig {
    /// JSON-LD document the station graph is built from
    pub dataset_url: String,
    pub remote: RemoteEndpointConfig,
    pub station_radius_km: f64,
    pub place_radius_km: f64,
    pub user_agent: String,
}

impl Default for NearbyConfig {
    fn default() -> Self {
        Self {
            dataset_url: "https://graph.irail.be/sncb/stops".to_string(),
            remote: RemoteEndpointConfig::default(),
            station_radius_km: 5.0,
            place_radius_km: 10.0,
            user_agent: concat!("nearby/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_defaults() {
        let config = NearbyConfig::default();
        assert_eq!(config.dataset_url, "https://graph.irail.be/sncb/stops");
        assert_eq!(config.station_radius_km, 5.0);
        assert_eq!(config.place_radius_km, 10.0);
        assert_eq!(config.remote.limit, 5);
        assert_eq!(config.remote.dialect, Dialect::Virtuoso);
        assert!(config.remote.relay.is_none());
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config: NearbyConfig = serde_json::from_str(
            r#"{ "place_radius_km": 2.5, "remote": { "dialect": "geosparql", "graph": null } }"#,
        )
        .unwrap();
        assert_eq!(config.place_radius_km, 2.5);
        assert_eq!(config.station_radius_km, 5.0);
        assert_eq!(config.remote.dialect, Dialect::GeoSparql);
        assert_eq!(config.remote.graph, None);
        assert_eq!(config.remote.endpoint, "https://era.ilabt.imec.be/virtuoso/sparql");
    }

    #[test]
    fn test_dialect_names() {
        assert_eq!(Dialect::from_str("virtuoso").unwrap(), Dialect::Virtuoso);
        assert_eq!(Dialect::GeoSparql.to_string(), "geosparql");
        assert!(Dialect::from_str("oracle").is_err());
    }
}
