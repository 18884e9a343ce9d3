use std::fmt;

use nearby_graph::vocab::{bif, geosparql, osm};
use nearby_graph::{GeoPoint, escape_string_literal};

use crate::candidate::PlaceKind;
use crate::config::{Dialect, MAX_PLACE_RESULTS, RemoteEndpointConfig};
use crate::error::{ResolveError, Result};

/// Tagged places within a radius of a point, distance computed by the endpoint
#[derive(Clone, Debug, PartialEq)]
pub struct RadiusQuery {
    text: String,
    origin: GeoPoint,
    limit: usize,
}

impl RadiusQuery {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Validated origin the endpoint measures distances from
    pub fn origin(&self) -> GeoPoint {
        self.origin
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl fmt::Display for RadiusQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Build the geofunction query for `kind` around `origin`.
///
/// Selects `?osmid ?name ?website ?geom ?distance` where `?website` is optional,
/// keeps rows with `?distance < radius_km`, nearest first, capped at the
/// configured limit, which may not exceed [`MAX_PLACE_RESULTS`].
pub fn place_query(
    origin: &GeoPoint,
    radius_km: f64,
    kind: &PlaceKind,
    endpoint: &RemoteEndpointConfig,
) -> Result<RadiusQuery> {
    let origin = GeoPoint::new(origin.longitude, origin.latitude)?;
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(ResolveError::InvalidRadius(radius_km));
    }
    if !(1..=MAX_PLACE_RESULTS).contains(&endpoint.limit) {
        return Err(ResolveError::InvalidQueryParameter {
            name: "limit",
            value: endpoint.limit as f64,
        });
    }
    // Must render as a prefixed name `osmt:<key>`
    let mut key = kind.key().chars();
    let key_ok = key
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ':'))
        && key.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':'));
    if !key_ok {
        return Err(ResolveError::InvalidPlaceKind(kind.to_string()));
    }

    let text = Template {
        origin: &origin,
        radius_km,
        kind,
        endpoint,
    }
    .to_string();

    Ok(RadiusQuery {
        text,
        origin,
        limit: endpoint.limit,
    })
}

struct Template<'a> {
    origin: &'a GeoPoint,
    radius_km: f64,
    kind: &'a PlaceKind,
    endpoint: &'a RemoteEndpointConfig,
}

impl fmt::Display for Template<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Template {
            origin,
            radius_km,
            kind,
            endpoint,
        } = self;
        let point = format!("POINT({} {})", origin.longitude, origin.latitude);
        writeln!(f, "PREFIX osmt: <{}>", osm::TAG_NS)?;
        writeln!(f, "PREFIX osmm: <{}>", osm::META_NS)?;
        match endpoint.dialect {
            Dialect::Virtuoso => writeln!(f, "PREFIX bif: <{}>", bif::NS)?,
            Dialect::GeoSparql => {
                writeln!(f, "PREFIX geo: <{}>", geosparql::NS)?;
                writeln!(f, "PREFIX geof: <{}>", geosparql::FUNCTION_NS)?;
                writeln!(f, "PREFIX uom: <{}>", geosparql::UOM_NS)?;
            }
        }
        writeln!(f)?;

        writeln!(f, "SELECT ?osmid ?name ?website ?geom ?distance")?;
        if let (Dialect::Virtuoso, Some(graph)) = (endpoint.dialect, &endpoint.graph) {
            writeln!(f, "FROM <{graph}>")?;
        }
        writeln!(f, "WHERE {{")?;
        writeln!(
            f,
            "  ?osmid osmt:{} \"{}\" ;",
            kind.key(),
            escape_string_literal(kind.value())
        )?;
        writeln!(f, "         osmt:name ?name ;")?;
        writeln!(f, "         osmm:loc ?geom .")?;
        writeln!(f, "  OPTIONAL {{ ?osmid osmt:website ?website . }}")?;

        match endpoint.dialect {
            // bif:st_distance reports kilometres
            Dialect::Virtuoso => writeln!(
                f,
                "  BIND(bif:st_distance(bif:st_geomfromtext(bif:st_astext(?geom)), bif:st_geomfromtext(\"{point}\")) AS ?distance)"
            )?,
            Dialect::GeoSparql => writeln!(
                f,
                "  BIND(geof:distance(?geom, \"{point}\"^^geo:wktLiteral, uom:metre) / 1000 AS ?distance)"
            )?,
        }
        writeln!(f, "  FILTER(?distance < {radius_km})")?;
        writeln!(f, "}}")?;
        writeln!(f, "ORDER BY ASC(?distance)")?;
        write!(f, "LIMIT {}", endpoint.limit)?;

        Ok(())
    }
}
