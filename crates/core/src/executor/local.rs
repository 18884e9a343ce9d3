use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::StreamExt;
use nearby_graph::{Binding, StoreLoader, evaluate};

use crate::error::Result;
use crate::executor::BindingSource;
use crate::query::BoundingBoxQuery;

/// Evaluates station queries against the session's graph store
pub struct LocalExecutor {
    loader: Arc<StoreLoader>,
}

impl LocalExecutor {
    pub fn new(loader: Arc<StoreLoader>) -> Self {
        Self { loader }
    }

    pub fn loader(&self) -> &Arc<StoreLoader> {
        &self.loader
    }
}

impl BindingSource for LocalExecutor {
    type Query = BoundingBoxQuery;

    fn evaluate<'a>(
        &'a self,
        query: &'a BoundingBoxQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Binding>>> + Send + 'a>> {
        Box::pin(async move {
            let store = self.loader.get_store().await?;

            // Drain the whole stream before anyone sorts
            let rows: Vec<Binding> = evaluate(store, Arc::clone(query.select())).collect().await;

            tracing::debug!(rows = rows.len(), "local query finished");
            Ok(rows)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;
    use crate::query::station_query;
    use nearby_graph::{DataFetcher, GeoPoint, GraphError, LoadState, buffer_bounding_box};

    const STOPS: &str = r#"{
        "@context": {
            "gtfs": "http://vocab.gtfs.org/terms#",
            "name": "http://schema.org/name",
            "latitude": "http://www.w3.org/2003/01/geo/wgs84_pos#lat",
            "longitude": "http://www.w3.org/2003/01/geo/wgs84_pos#long"
        },
        "@graph": [
            { "@id": "http://irail.be/stations/NMBS/008821006", "@type": "gtfs:Station",
              "name": "Antwerpen-Centraal", "latitude": "51.2172", "longitude": "4.421101" },
            { "@id": "http://irail.be/stations/NMBS/008892007", "@type": "gtfs:Station",
              "name": "Gent-Sint-Pieters", "latitude": "51.035896", "longitude": "3.710675" }
        ]
    }"#;

    struct StaticFetcher(Option<&'static str>);

    impl DataFetcher for StaticFetcher {
        fn fetch<'a>(
            &'a self,
            url: &'a str,
        ) -> Pin<Box<dyn Future<Output = nearby_graph::Result<Vec<u8>>> + Send + 'a>> {
            Box::pin(async move {
                self.0
                    .map(|body| body.as_bytes().to_vec())
                    .ok_or_else(|| GraphError::FetchFailed {
                        url: url.to_string(),
                        reason: "connection reset".into(),
                    })
            })
        }
    }

    fn executor(body: Option<&'static str>) -> LocalExecutor {
        let loader = StoreLoader::new(Arc::new(StaticFetcher(body)), "https://graph.irail.be/sncb/stops");
        LocalExecutor::new(Arc::new(loader))
    }

    #[tokio::test]
    async fn test_collects_rows_in_box() {
        let executor = executor(Some(STOPS));
        let bbox = buffer_bounding_box(GeoPoint::new(4.4, 51.2).unwrap(), 5.0).unwrap();
        let rows = executor.evaluate(&station_query(&bbox).unwrap()).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name").unwrap().value(), "Antwerpen-Centraal");
        assert_eq!(
            rows[0].get("station").unwrap().value(),
            "http://irail.be/stations/NMBS/008821006"
        );
        assert_eq!(executor.loader().state().await, LoadState::Ready);
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let executor = executor(None);
        let bbox = buffer_bounding_box(GeoPoint::new(4.4, 51.2).unwrap(), 5.0).unwrap();
        let err = executor.evaluate(&station_query(&bbox).unwrap()).await.unwrap_err();
        assert!(matches!(err, ResolveError::SourceUnavailable(_)));
    }
}
