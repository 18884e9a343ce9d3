//! HTTP implementation of the graph crate's [`DataFetcher`].

use std::future::Future;
use std::pin::Pin;

use nearby_graph::{DataFetcher, GraphError};
use reqwest::header::{ACCEPT, USER_AGENT};

const JSON_LD: &str = "application/ld+json, application/json;q=0.9";

/// Fetches dataset documents with reqwest
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            user_agent: user_agent.into(),
        }
    }
}

impl DataFetcher for HttpFetcher {
    fn fetch<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = nearby_graph::Result<Vec<u8>>> + Send + 'a>> {
        Box::pin(async move {
            let failed = |reason: String| GraphError::FetchFailed {
                url: url.to_string(),
                reason,
            };

            let response = self
                .client
                .get(url)
                .header(ACCEPT, JSON_LD)
                .header(USER_AGENT, &self.user_agent)
                .send()
                .await
                .map_err(|e| failed(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(failed(format!("HTTP {status}")));
            }

            let body = response.bytes().await.map_err(|e| failed(e.to_string()))?;
            tracing::debug!(url, bytes = body.len(), "fetched dataset");
            Ok(body.to_vec())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_fetches_body() {
        let base = serve(Router::new().route("/stops", get(|| async { r#"{"@graph":[]}"# }))).await;
        let fetcher = HttpFetcher::new(reqwest::Client::new(), "nearby-test");

        let body = fetcher.fetch(&format!("{base}/stops")).await.unwrap();
        assert_eq!(body, br#"{"@graph":[]}"#);
    }

    #[tokio::test]
    async fn test_error_status_is_fetch_failure() {
        let base = serve(Router::new().route(
            "/stops",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        ))
        .await;
        let fetcher = HttpFetcher::new(reqwest::Client::new(), "nearby-test");

        let err = fetcher.fetch(&format!("{base}/stops")).await.unwrap_err();
        assert!(matches!(err, GraphError::FetchFailed { ref reason, .. } if reason.contains("503")));
    }
}
