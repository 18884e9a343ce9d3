//! Proximity resolution: bounding box, query, execution, normalization, ranking.
//!
//! Each call is independent. The only state shared between calls is the
//! station graph, which the [`StoreLoader`] builds once per resolver. A source
//! that cannot answer yields an empty, degraded [`RankedResult`] instead of an
//! error, so sibling sources are never affected.

use std::sync::Arc;

use futures_util::future::join_all;
use nearby_graph::{
    Binding, DataFetcher, GeoPoint, StoreLoader, buffer_bounding_box, great_circle_distance_km,
};
use strum::IntoDiscriminant;

use crate::candidate::{Candidate, PlaceKind, ProximityQuery, RankedResult, SourceKind, SourceTag};
use crate::config::NearbyConfig;
use crate::error::{ResolveError, Result};
use crate::executor::{BindingSource, LocalExecutor, RemoteExecutor};
use crate::query::{place_query, station_query};

pub struct Resolver {
    config: NearbyConfig,
    local: LocalExecutor,
    remote: RemoteExecutor,
}

impl Resolver {
    pub fn new(config: NearbyConfig, fetcher: Arc<dyn DataFetcher>) -> Self {
        Self::with_client(config, fetcher, reqwest::Client::new())
    }

    /// Share an existing HTTP client with the remote executor
    pub fn with_client(config: NearbyConfig, fetcher: Arc<dyn DataFetcher>, client: reqwest::Client) -> Self {
        let loader = StoreLoader::new(fetcher, config.dataset_url.clone());
        let local = LocalExecutor::new(Arc::new(loader));
        let remote = RemoteExecutor::new(client, config.remote.clone(), config.user_agent.clone());

        Self {
            config,
            local,
            remote,
        }
    }

    pub fn config(&self) -> &NearbyConfig {
        &self.config
    }

    pub fn store_loader(&self) -> &Arc<StoreLoader> {
        self.local.loader()
    }

    /// Candidates of `source` within `radius_km` of `origin`, nearest first.
    ///
    /// Fails only on invalid input. A source that cannot be reached or parsed
    /// produces an empty result with [`RankedResult::failure`] set.
    pub async fn resolve(&self, origin: GeoPoint, radius_km: f64, source: &SourceKind) -> Result<RankedResult> {
        let origin = GeoPoint::new(origin.longitude, origin.latitude)?;
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(ResolveError::InvalidRadius(radius_km));
        }

        let tag = source.discriminant();
        let outcome = match source {
            SourceKind::Stations => self.resolve_stations(origin, radius_km).await,
            SourceKind::Places(kind) => self.resolve_places(origin, radius_km, kind).await,
        };

        match outcome {
            Ok(result) => {
                tracing::debug!(source = %tag, candidates = result.len(), "resolved");
                Ok(result)
            }
            Err(e) if e.is_invalid_input() => Err(e),
            Err(e) => {
                tracing::warn!(source = %tag, error = %e, "source degraded to an empty result");
                Ok(RankedResult::degraded(tag, e))
            }
        }
    }

    pub async fn resolve_query(&self, query: &ProximityQuery) -> Result<RankedResult> {
        self.resolve(query.origin, query.radius_km, &query.source).await
    }

    /// Resolve every request concurrently on the current task; results keep request order
    pub async fn resolve_all(&self, queries: &[ProximityQuery]) -> Vec<Result<RankedResult>> {
        join_all(queries.iter().map(|query| self.resolve_query(query))).await
    }

    async fn resolve_stations(&self, origin: GeoPoint, radius_km: f64) -> Result<RankedResult> {
        let bbox = buffer_bounding_box(origin, radius_km)?;
        let query = station_query(&bbox)?;
        tracing::debug!(%query, "station query");

        let rows = self.local.evaluate(&query).await?;
        let candidates = rows
            .iter()
            .filter_map(|row| station_candidate(origin, row))
            .collect();

        Ok(RankedResult::ranked(SourceTag::Stations, candidates, None))
    }

    async fn resolve_places(&self, origin: GeoPoint, radius_km: f64, kind: &PlaceKind) -> Result<RankedResult> {
        let query = place_query(&origin, radius_km, kind, &self.config.remote)?;

        let rows = self.remote.evaluate(&query).await?;
        let candidates = rows
            .iter()
            .filter_map(|row| place_candidate(query.origin(), row))
            .collect();

        // Server ordering and limit are re-applied here
        Ok(RankedResult::ranked(SourceTag::Places, candidates, Some(query.limit())))
    }
}

fn station_candidate(origin: GeoPoint, row: &Binding) -> Option<Candidate> {
    let fields = (
        row.get("station"),
        row.get("name"),
        row.get("long").and_then(|t| t.as_f64()),
        row.get("lat").and_then(|t| t.as_f64()),
    );
    let (Some(station), Some(name), Some(longitude), Some(latitude)) = fields else {
        tracing::debug!(?row, "skipping incomplete station row");
        return None;
    };
    let position = GeoPoint::new(longitude, latitude).ok()?;

    Some(Candidate {
        identifier: station.value().to_string(),
        display_name: name.value().to_string(),
        link_target: Some(station.value().to_string()),
        distance_km: great_circle_distance_km(origin, position),
        position: Some(position),
    })
}

fn place_candidate(origin: GeoPoint, row: &Binding) -> Option<Candidate> {
    let (Some(osmid), Some(name)) = (row.get("osmid"), row.get("name")) else {
        tracing::debug!(?row, "skipping incomplete place row");
        return None;
    };

    let position = row.get("geom").and_then(|geom| parse_wkt_point(geom.value()));
    let reported = row
        .get("distance")
        .and_then(|t| t.as_f64())
        .filter(|d| d.is_finite() && *d >= 0.0);

    let Some(distance_km) = reported.or_else(|| position.map(|p| great_circle_distance_km(origin, p))) else {
        tracing::debug!(osmid = osmid.value(), "skipping place without distance or geometry");
        return None;
    };

    Some(Candidate {
        identifier: osmid.value().to_string(),
        display_name: name.value().to_string(),
        link_target: row.get("website").map(|w| w.value().to_string()),
        distance_km,
        position,
    })
}

/// `POINT(lon lat)`, optionally preceded by a CRS IRI or an `SRID=..;` prefix
fn parse_wkt_point(text: &str) -> Option<GeoPoint> {
    let start = text.to_ascii_uppercase().find("POINT")?;
    let inner = text[start + "POINT".len()..].trim_start().strip_prefix('(')?;
    let inner = inner.split(')').next()?;

    let mut numbers = inner.split_whitespace().map(str::parse::<f64>);
    let longitude = numbers.next()?.ok()?;
    let latitude = numbers.next()?.ok()?;
    GeoPoint::new(longitude, latitude).ok()
}
