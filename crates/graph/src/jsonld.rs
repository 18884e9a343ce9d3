//! JSON-LD to triples.
//!
//! Covers the parts of JSON-LD expansion that published linked-data datasets
//! rely on: inline contexts (prefixes, term definitions with `@id`/`@type`
//! coercion and `@language`, `@vocab`, `@base`), `@graph`, `@id`, `@type`,
//! value objects, `@list`/`@set` and nested node objects. Remote context
//! references are not dereferenced. Properties that do not expand to an IRI are
//! dropped, as in JSON-LD expansion.

use std::borrow::Cow;
use std::collections::HashMap;

use serde_json::{Map, Number, Value};

use crate::identifiers::{BlankNode, Iri};
use crate::models::term::{Literal, Term, Triple};
use crate::models::types::{GraphError, Result};
use crate::vocab::{rdf, xsd};

/// Decode a JSON-LD document into triples, in document order
pub fn decode(document: &[u8]) -> Result<Vec<Triple>> {
    let value: Value =
        serde_json::from_slice(document).map_err(|e| GraphError::DecodeError(e.to_string()))?;
    decode_value(&value)
}

/// Decode an already-parsed JSON-LD document
pub fn decode_value(value: &Value) -> Result<Vec<Triple>> {
    if !value.is_object() && !value.is_array() {
        return Err(GraphError::DecodeError(
            "JSON-LD document must be an object or an array".into(),
        ));
    }

    let mut decoder = Decoder::default();
    decoder.element(value, &Context::default());
    Ok(decoder.triples)
}

// ============================================================================
// Context
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
enum Coercion {
    Id,
    Vocab,
    Datatype(String),
}

#[derive(Clone, Debug)]
struct TermDefinition {
    iri: String,
    coercion: Option<Coercion>,
    language: Option<String>,
}

#[derive(Clone, Debug, Default)]
struct Context {
    terms: HashMap<String, TermDefinition>,
    vocab: Option<String>,
    base: Option<String>,
    language: Option<String>,
}

/// Split `prefix:suffix`, rejecting absolute IRIs such as `http://…`
fn split_compact(value: &str) -> Option<(&str, &str)> {
    let (prefix, suffix) = value.split_once(':')?;
    if prefix.is_empty() || prefix.contains('/') || suffix.starts_with("//") {
        return None;
    }
    Some((prefix, suffix))
}

fn is_absolute(value: &str) -> bool {
    match value.split_once(':') {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme.as_bytes()[0].is_ascii_alphabetic()
                && scheme
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'-' || b == b'.')
        }
        None => false,
    }
}

impl Context {
    /// Apply a local `@context` value on top of this one
    fn merged(&self, local: &Value) -> Context {
        let mut context = self.clone();
        match local {
            Value::Null => context = Context::default(),
            Value::Object(definitions) => context.define(definitions),
            Value::Array(items) => {
                for item in items {
                    context = context.merged(item);
                }
            }
            Value::String(url) => {
                tracing::warn!(%url, "skipping remote JSON-LD context");
            }
            _ => {}
        }
        context
    }

    fn define(&mut self, definitions: &Map<String, Value>) {
        match definitions.get("@base") {
            Some(Value::String(base)) => self.base = Some(base.clone()),
            Some(Value::Null) => self.base = None,
            _ => {}
        }
        match definitions.get("@vocab") {
            Some(Value::String(vocab)) => {
                self.vocab = Some(self.expand_iri(vocab, true).unwrap_or_else(|| vocab.clone()))
            }
            Some(Value::Null) => self.vocab = None,
            _ => {}
        }
        match definitions.get("@language") {
            Some(Value::String(language)) => self.language = Some(language.clone()),
            Some(Value::Null) => self.language = None,
            _ => {}
        }

        // Definitions may refer to each other in any order; retry until settled
        let mut pending: Vec<(&String, &Value)> = definitions
            .iter()
            .filter(|(term, _)| !term.starts_with('@'))
            .collect();

        loop {
            let before = pending.len();
            pending.retain(|(term, definition)| {
                if definition.is_null() {
                    self.terms.remove(term.as_str());
                    return false;
                }
                match self.parse_definition(term, definition, definitions) {
                    Some(parsed) => {
                        self.terms.insert(term.to_string(), parsed);
                        false
                    }
                    None => true,
                }
            });
            if pending.is_empty() || pending.len() == before {
                break;
            }
        }

        for (term, _) in pending {
            tracing::debug!(%term, "dropping unresolvable JSON-LD term definition");
        }
    }

    /// `None` means the definition depends on a term not defined yet
    fn parse_definition(
        &self,
        term: &str,
        definition: &Value,
        local: &Map<String, Value>,
    ) -> Option<TermDefinition> {
        let waits_on_local = |value: &str| {
            split_compact(value).is_some_and(|(prefix, _)| {
                prefix != term && local.contains_key(prefix) && !self.terms.contains_key(prefix)
            })
        };

        match definition {
            Value::String(iri) => {
                if waits_on_local(iri) {
                    return None;
                }
                Some(TermDefinition {
                    iri: self.expand_iri(iri, true)?,
                    coercion: None,
                    language: None,
                })
            }
            Value::Object(entry) => {
                let id = entry.get("@id").and_then(Value::as_str).unwrap_or(term);
                let datatype = entry.get("@type").and_then(Value::as_str);
                if waits_on_local(id) || datatype.is_some_and(waits_on_local) {
                    return None;
                }

                let coercion = match datatype {
                    Some("@id") => Some(Coercion::Id),
                    Some("@vocab") => Some(Coercion::Vocab),
                    Some(datatype) => Some(Coercion::Datatype(self.expand_iri(datatype, true)?)),
                    None => None,
                };

                Some(TermDefinition {
                    iri: self.expand_iri(id, true)?,
                    coercion,
                    language: entry
                        .get("@language")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                })
            }
            _ => None,
        }
    }

    /// Expand a term, compact IRI or relative reference.
    ///
    /// `vocab` selects `@vocab` resolution (properties, types) over `@base`
    /// resolution (`@id` values).
    fn expand_iri(&self, value: &str, vocab: bool) -> Option<String> {
        if value.starts_with("_:") {
            return Some(value.to_string());
        }
        if vocab {
            if let Some(definition) = self.terms.get(value) {
                return Some(definition.iri.clone());
            }
        }
        if let Some((prefix, suffix)) = split_compact(value) {
            if let Some(definition) = self.terms.get(prefix) {
                return Some(format!("{}{}", definition.iri, suffix));
            }
        }
        if is_absolute(value) {
            return Some(value.to_string());
        }
        if value.starts_with('@') {
            return None;
        }

        let base = if vocab { self.vocab.as_ref() } else { self.base.as_ref() };
        base.map(|base| format!("{base}{value}"))
    }
}

// ============================================================================
// Decoder
// ============================================================================

#[derive(Default)]
struct Decoder {
    triples: Vec<Triple>,
    blank_counter: usize,
}

fn as_items(value: &Value) -> &[Value] {
    match value {
        Value::Array(items) => items,
        other => std::slice::from_ref(other),
    }
}

fn number_literal(number: &Number, datatype: Option<&str>) -> Literal {
    let datatype = match datatype {
        Some(datatype) => datatype,
        None if number.is_f64() => xsd::DOUBLE,
        None => xsd::INTEGER,
    };
    Literal::typed(number.to_string(), Iri::new(datatype))
}

impl Decoder {
    fn fresh_blank(&mut self) -> Term {
        self.blank_counter += 1;
        Term::Blank(BlankNode::new(format!("_:b{}", self.blank_counter)))
    }

    /// Top-level element or `@graph` member
    fn element(&mut self, value: &Value, context: &Context) {
        match value {
            Value::Array(items) => {
                for item in items {
                    self.element(item, context);
                }
            }
            Value::Object(object) => {
                let only_graph = object.contains_key("@graph")
                    && object.keys().all(|k| k == "@graph" || k == "@context");
                if only_graph {
                    let context = match object.get("@context") {
                        Some(local) => Cow::Owned(context.merged(local)),
                        None => Cow::Borrowed(context),
                    };
                    self.element(&object["@graph"], &context);
                } else {
                    self.node(object, context);
                }
            }
            _ => {}
        }
    }

    /// Emit the triples of a node object and return its subject
    fn node(&mut self, object: &Map<String, Value>, context: &Context) -> Term {
        let context = match object.get("@context") {
            Some(local) => Cow::Owned(context.merged(local)),
            None => Cow::Borrowed(context),
        };

        let subject = match object.get("@id").and_then(Value::as_str) {
            Some(id) if id.starts_with("_:") => Term::Blank(BlankNode::new(id)),
            Some(id) => Term::iri(context.expand_iri(id, false).unwrap_or_else(|| id.to_string())),
            None => self.fresh_blank(),
        };

        for (key, value) in object {
            match key.as_str() {
                "@context" | "@id" => {}
                "@type" => {
                    for class in as_items(value).iter().filter_map(Value::as_str) {
                        if let Some(iri) = context.expand_iri(class, true) {
                            self.triples.push(Triple::new(
                                subject.clone(),
                                Iri::new(rdf::TYPE),
                                Term::iri(iri),
                            ));
                        }
                    }
                }
                "@graph" => self.element(value, &context),
                keyword if keyword.starts_with('@') => {}
                property => {
                    let Some(predicate) = context
                        .expand_iri(property, true)
                        .filter(|iri| !iri.starts_with("_:"))
                    else {
                        continue;
                    };
                    let definition = context.terms.get(property).cloned();

                    for item in as_items(value) {
                        let mut objects = Vec::new();
                        self.object(item, definition.as_ref(), &context, &mut objects);
                        for object in objects {
                            self.triples.push(Triple::new(
                                subject.clone(),
                                Iri::new(&predicate),
                                object,
                            ));
                        }
                    }
                }
            }
        }

        subject
    }

    fn object(
        &mut self,
        value: &Value,
        definition: Option<&TermDefinition>,
        context: &Context,
        out: &mut Vec<Term>,
    ) {
        let coercion = definition.and_then(|d| d.coercion.as_ref());

        match value {
            Value::Null => {}
            Value::String(text) => out.push(match coercion {
                Some(Coercion::Id) => {
                    if text.starts_with("_:") {
                        Term::Blank(BlankNode::new(text))
                    } else {
                        Term::iri(context.expand_iri(text, false).unwrap_or_else(|| text.clone()))
                    }
                }
                Some(Coercion::Vocab) => {
                    Term::iri(context.expand_iri(text, true).unwrap_or_else(|| text.clone()))
                }
                Some(Coercion::Datatype(datatype)) => {
                    Literal::typed(text, Iri::new(datatype)).into()
                }
                None => match definition
                    .and_then(|d| d.language.as_ref())
                    .or(context.language.as_ref())
                {
                    Some(language) => Literal::lang(text, language).into(),
                    None => Literal::string(text).into(),
                },
            }),
            Value::Number(number) => {
                let datatype = match coercion {
                    Some(Coercion::Datatype(datatype)) => Some(datatype.as_str()),
                    _ => None,
                };
                out.push(number_literal(number, datatype).into());
            }
            Value::Bool(flag) => {
                out.push(Literal::typed(flag.to_string(), Iri::new(xsd::BOOLEAN)).into())
            }
            Value::Array(items) => {
                for item in items {
                    self.object(item, definition, context, out);
                }
            }
            Value::Object(object) => {
                if let Some(literal) = object.get("@value") {
                    if let Some(literal) = value_object(literal, object, context) {
                        out.push(literal.into());
                    }
                } else if let Some(items) = object.get("@list").or_else(|| object.get("@set")) {
                    self.object(items, definition, context, out);
                } else {
                    out.push(self.node(object, context));
                }
            }
        }
    }
}

fn value_object(value: &Value, object: &Map<String, Value>, context: &Context) -> Option<Literal> {
    let datatype = object
        .get("@type")
        .and_then(Value::as_str)
        .and_then(|datatype| context.expand_iri(datatype, true));

    let literal = match value {
        Value::String(text) => match (datatype, object.get("@language").and_then(Value::as_str)) {
            (Some(datatype), _) => Literal::typed(text, Iri::new(datatype)),
            (None, Some(language)) => Literal::lang(text, language),
            (None, None) => Literal::string(text),
        },
        Value::Number(number) => number_literal(number, datatype.as_deref()),
        Value::Bool(flag) => Literal::typed(
            flag.to_string(),
            Iri::new(datatype.as_deref().unwrap_or(xsd::BOOLEAN)),
        ),
        _ => return None,
    };

    Some(literal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{gtfs, schema, wgs};
    use serde_json::json;

    fn objects<'a>(triples: &'a [Triple], subject: &str, predicate: &str) -> Vec<&'a Term> {
        triples
            .iter()
            .filter(|t| t.subject.value() == subject && t.predicate.as_str() == predicate)
            .map(|t| &t.object)
            .collect()
    }

    #[test]
    fn test_station_dataset() {
        let document = json!({
            "@context": {
                "xsd": "http://www.w3.org/2001/XMLSchema#",
                "schema": "http://schema.org/",
                "wgs": "http://www.w3.org/2003/01/geo/wgs84_pos#",
                "gtfs": "http://vocab.gtfs.org/terms#",
                "name": "schema:name",
                "latitude": { "@id": "wgs:lat", "@type": "xsd:double" },
                "longitude": "wgs:long"
            },
            "@graph": [
                {
                    "@id": "http://irail.be/stations/NMBS/008821006",
                    "@type": "gtfs:Station",
                    "name": "Antwerpen-Centraal",
                    "latitude": "51.2172",
                    "longitude": 4.421101
                },
                {
                    "@id": "http://irail.be/stations/NMBS/008892007",
                    "@type": ["gtfs:Station"],
                    "name": [{ "@value": "Gent-Sint-Pieters", "@language": "nl" }, "Gand-Saint-Pierre"],
                    "latitude": "51.035896",
                    "longitude": 3.710675
                }
            ]
        });

        let triples = decode_value(&document).unwrap();
        assert_eq!(triples.len(), 9);

        let antwerp = "http://irail.be/stations/NMBS/008821006";
        assert_eq!(objects(&triples, antwerp, rdf::TYPE), vec![&Term::iri(gtfs::STATION)]);
        assert_eq!(objects(&triples, antwerp, schema::NAME)[0].value(), "Antwerpen-Centraal");

        let lat = objects(&triples, antwerp, wgs::LAT)[0];
        assert_eq!(lat, &Term::Literal(Literal::typed("51.2172", Iri::new(xsd::DOUBLE))));

        let long = objects(&triples, antwerp, wgs::LONG)[0];
        assert_eq!(long.as_f64(), Some(4.421101));

        let gent_names = objects(&triples, "http://irail.be/stations/NMBS/008892007", schema::NAME);
        assert_eq!(gent_names.len(), 2);
        assert_eq!(gent_names[0], &Term::Literal(Literal::lang("Gent-Sint-Pieters", "nl")));
    }

    #[test]
    fn test_definition_order_independent() {
        // "name" refers to the "s" prefix which is defined after it
        let document = json!({
            "@context": { "name": "s:name", "s": "http://schema.org/" },
            "@id": "http://example.org/a",
            "name": "A"
        });

        let triples = decode_value(&document).unwrap();
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].predicate.as_str(), schema::NAME);
    }

    #[test]
    fn test_vocab_base_and_nested_nodes() {
        let document = json!({
            "@context": {
                "@vocab": "http://schema.org/",
                "@base": "http://example.org/places/",
                "sameAs": { "@type": "@id" }
            },
            "@id": "museum-1",
            "name": "MAS",
            "sameAs": "museum-1-alt",
            "address": { "streetAddress": "Hanzestedenplaats 1" },
            "openOnSunday": true,
            "closedOn": null
        });

        let triples = decode_value(&document).unwrap();
        let subject = "http://example.org/places/museum-1";

        assert_eq!(objects(&triples, subject, "http://schema.org/name")[0].value(), "MAS");
        assert_eq!(
            objects(&triples, subject, "http://schema.org/sameAs")[0],
            &Term::iri("http://example.org/places/museum-1-alt")
        );

        let address = objects(&triples, subject, "http://schema.org/address")[0];
        assert!(matches!(address, Term::Blank(_)));
        assert_eq!(
            objects(&triples, address.value(), "http://schema.org/streetAddress")[0].value(),
            "Hanzestedenplaats 1"
        );

        let open = objects(&triples, subject, "http://schema.org/openOnSunday")[0];
        assert_eq!(open, &Term::Literal(Literal::typed("true", Iri::new(xsd::BOOLEAN))));
    }

    #[test]
    fn test_unmapped_properties_dropped() {
        let document = json!([{ "@id": "http://example.org/a", "title": "no context", "@type": "Thing" }]);
        assert!(decode_value(&document).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_documents() {
        assert!(matches!(decode(b"not json"), Err(GraphError::DecodeError(_))));
        assert!(matches!(decode(b"42"), Err(GraphError::DecodeError(_))));
    }
}
