use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use nearby_core::{Candidate, RankedResult, SourceKind};
use std::fmt::Write;
use std::path::Path;

/// Round to two decimals the way the info rows always have
fn round_km(distance_km: f64) -> f64 {
    ((distance_km + f64::EPSILON) * 100.0).round() / 100.0
}

fn label(source: &SourceKind) -> String {
    match source {
        SourceKind::Stations => "Stations".to_string(),
        SourceKind::Places(kind) => {
            let mut value = kind.value().to_string();
            if let Some(first) = value.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            format!("{value}s")
        }
    }
}

fn entry(candidate: &Candidate) -> String {
    format!(
        "{} ({} km) <{}>",
        candidate.display_name,
        round_km(candidate.distance_km),
        candidate.href()
    )
}

/// One comma-separated row per source
pub fn render_text(results: &[(SourceKind, RankedResult)]) -> String {
    let mut out = String::new();
    for (source, result) in results {
        let row = if result.is_degraded() {
            "unavailable".to_string()
        } else if result.is_empty() {
            "none nearby".to_string()
        } else {
            result.iter().map(entry).collect::<Vec<_>>().join(", ")
        };
        let _ = writeln!(out, "{}: {}", label(source), row);
    }
    out
}

fn candidate_to_feature(candidate: &Candidate, source: &SourceKind) -> Option<Feature> {
    let position = candidate.position?;

    let mut properties = serde_json::Map::new();
    properties.insert("source".to_string(), serde_json::json!(label(source)));
    properties.insert("identifier".to_string(), serde_json::json!(candidate.identifier));
    properties.insert("name".to_string(), serde_json::json!(candidate.display_name));
    properties.insert("href".to_string(), serde_json::json!(candidate.href()));
    properties.insert("distance_km".to_string(), serde_json::json!(candidate.distance_km));

    Some(Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![position.longitude, position.latitude]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    })
}

/// Point features for every candidate with a known position
pub fn to_feature_collection(results: &[(SourceKind, RankedResult)]) -> FeatureCollection {
    let features = results
        .iter()
        .flat_map(|(source, result)| result.iter().filter_map(move |c| candidate_to_feature(c, source)))
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Write to `output_path`, or stdout when none is given
pub fn write_geojson(collection: &FeatureCollection, output_path: Option<&Path>) -> Result<()> {
    let geojson = GeoJson::from(collection.clone());
    let json_string = serde_json::to_string_pretty(&geojson)
        .context("Failed to serialize GeoJSON")?;

    match output_path {
        Some(path) => {
            std::fs::write(path, json_string)
                .with_context(|| format!("Failed to write GeoJSON to {}", path.display()))?;
            tracing::info!("Wrote {} features to {}", collection.features.len(), path.display());
        }
        None => println!("{json_string}"),
    }

    Ok(())
}

/// Write the text listing to `output_path`, or stdout when none is given
pub fn write_text(text: &str, output_path: Option<&Path>) -> Result<()> {
    match output_path {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("Failed to write listing to {}", path.display()))?;
            tracing::info!("Wrote {} rows to {}", text.lines().count(), path.display());
        }
        None => print!("{text}"),
    }

    Ok(())
}
