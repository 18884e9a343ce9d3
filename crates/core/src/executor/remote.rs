use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use nearby_graph::vocab::xsd;
use nearby_graph::{Binding, BlankNode, Iri, Literal, Term, Variable};
use reqwest::Url;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;

use crate::candidate::SourceTag;
use crate::config::RemoteEndpointConfig;
use crate::error::{QueryExecutionError, Result};
use crate::executor::BindingSource;
use crate::query::RadiusQuery;

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Sends radius queries to a SPARQL endpoint over HTTP GET
pub struct RemoteExecutor {
    client: reqwest::Client,
    config: RemoteEndpointConfig,
    user_agent: String,
}

impl RemoteExecutor {
    pub fn new(client: reqwest::Client, config: RemoteEndpointConfig, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            config,
            user_agent: user_agent.into(),
        }
    }

    pub fn config(&self) -> &RemoteEndpointConfig {
        &self.config
    }

    /// Endpoint URL carrying the query, wrapped by the relay when one is configured
    pub fn request_url(&self, query: &RadiusQuery) -> std::result::Result<Url, QueryExecutionError> {
        let direct = Url::parse_with_params(&self.config.endpoint, &[("query", query.as_str())])
            .map_err(invalid_url)?;

        match &self.config.relay {
            Some(relay) => Url::parse(&format!("{relay}{}", urlencoding::encode(direct.as_str())))
                .map_err(invalid_url),
            None => Ok(direct),
        }
    }
}

impl BindingSource for RemoteExecutor {
    type Query = RadiusQuery;

    fn evaluate<'a>(
        &'a self,
        query: &'a RadiusQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Binding>>> + Send + 'a>> {
        Box::pin(async move {
            let failed = |e: reqwest::Error| QueryExecutionError::new(SourceTag::Places, e);
            let url = self.request_url(query)?;

            tracing::debug!(endpoint = %self.config.endpoint, query = %query, "sending remote query");

            let response = self
                .client
                .get(url)
                .header(ACCEPT, SPARQL_RESULTS_JSON)
                .header(USER_AGENT, &self.user_agent)
                .send()
                .await
                .map_err(failed)?;

            let status = response.status();
            if !status.is_success() {
                tracing::warn!(endpoint = %self.config.endpoint, %status, "remote endpoint refused query");
                return Ok(Vec::new());
            }

            let body = response.bytes().await.map_err(failed)?;
            let rows = parse_results(&body)?;

            tracing::debug!(rows = rows.len(), "remote query finished");
            Ok(rows)
        })
    }
}

fn invalid_url(error: impl ToString) -> QueryExecutionError {
    QueryExecutionError::new(SourceTag::Places, format!("invalid request URL: {}", error.to_string()))
}

#[derive(Deserialize)]
struct SparqlResults {
    results: ResultSet,
}

#[derive(Deserialize)]
struct ResultSet {
    bindings: Vec<HashMap<String, RdfValue>>,
}

#[derive(Deserialize)]
struct RdfValue {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    value: String,
    #[serde(default)]
    datatype: Option<String>,
    #[serde(rename = "xml:lang", default)]
    language: Option<String>,
}

impl RdfValue {
    fn into_term(self) -> Term {
        match self.kind.as_deref() {
            Some("uri") => Term::iri(self.value),
            Some("bnode") => Term::Blank(BlankNode::new(format!("_:{}", self.value))),
            _ => match (self.language, self.datatype) {
                (Some(language), _) => Literal::lang(self.value, language).into(),
                (None, Some(datatype)) => Literal::typed(self.value, Iri::new(datatype)).into(),
                (None, None) => Literal::typed(self.value, Iri::new(xsd::STRING)).into(),
            },
        }
    }
}

/// Decode a `application/sparql-results+json` document into rows
pub fn parse_results(body: &[u8]) -> std::result::Result<Vec<Binding>, QueryExecutionError> {
    let document: SparqlResults = serde_json::from_slice(body)
        .map_err(|e| QueryExecutionError::new(SourceTag::Places, format!("malformed results: {e}")))?;

    let rows = document
        .results
        .bindings
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|(name, value)| (Variable::new(name), value.into_term()))
                .collect()
        })
        .collect();

    Ok(rows)
}
