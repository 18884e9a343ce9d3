//! RDF terms and triples.

use std::fmt;
use std::sync::Arc;

use crate::identifiers::{BlankNode, Iri};
use crate::vocab::xsd;

/// A literal value with its datatype and optional language tag
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    pub lexical: Arc<str>,
    pub datatype: Iri,
    pub language: Option<Arc<str>>,
}

impl Literal {
    /// Plain `xsd:string` literal
    pub fn string(value: impl AsRef<str>) -> Self {
        Self::typed(value, Iri::new(xsd::STRING))
    }

    pub fn typed(value: impl AsRef<str>, datatype: Iri) -> Self {
        Self {
            lexical: value.as_ref().into(),
            datatype,
            language: None,
        }
    }

    pub fn lang(value: impl AsRef<str>, language: impl AsRef<str>) -> Self {
        Self {
            lexical: value.as_ref().into(),
            datatype: Iri::new(crate::vocab::rdf::LANG_STRING),
            language: Some(language.as_ref().into()),
        }
    }
}

/// A node or value in the graph
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    Iri(Iri),
    Blank(BlankNode),
    Literal(Literal),
}

impl Term {
    pub fn iri(value: impl AsRef<str>) -> Self {
        Term::Iri(Iri::new(value))
    }

    /// The IRI, blank node label or lexical form
    pub fn value(&self) -> &str {
        match self {
            Term::Iri(iri) => iri.as_str(),
            Term::Blank(node) => node.as_str(),
            Term::Literal(literal) => &literal.lexical,
        }
    }

    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// `xsd:double` cast of a literal.
    ///
    /// Returns `None` for IRIs, blank nodes and lexical forms that are not numbers,
    /// which a filter treats as a non-match.
    pub fn as_f64(&self) -> Option<f64> {
        let Term::Literal(literal) = self else {
            return None;
        };

        let value = match literal.lexical.trim() {
            "INF" | "+INF" => f64::INFINITY,
            "-INF" => f64::NEG_INFINITY,
            "NaN" => f64::NAN,
            // Rust's float parser also takes `inf`, `infinity` and `nan` in any case
            other if other.bytes().all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E')) => {
                other.parse::<f64>().ok()?
            }
            _ => return None,
        };

        Some(value)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{iri}>"),
            Term::Blank(node) => write!(f, "{node}"),
            Term::Literal(literal) => {
                write!(f, "\"{}\"", escape_string_literal(&literal.lexical))?;
                match &literal.language {
                    Some(lang) => write!(f, "@{lang}"),
                    None if literal.datatype.as_str() == xsd::STRING => Ok(()),
                    None => write!(f, "^^<{}>", literal.datatype),
                }
            }
        }
    }
}

impl From<Iri> for Term {
    fn from(iri: Iri) -> Self {
        Term::Iri(iri)
    }
}

impl From<Literal> for Term {
    fn from(literal: Literal) -> Self {
        Term::Literal(literal)
    }
}

/// A subject-predicate-object statement
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Iri,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: Iri, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

/// Escape a value for use inside a double-quoted SPARQL/Turtle string literal
pub fn escape_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_cast() {
        let lat = Term::Literal(Literal::string("51.2172"));
        assert_eq!(lat.as_f64(), Some(51.2172));

        let typed = Term::Literal(Literal::typed("4.421", Iri::new(xsd::DOUBLE)));
        assert_eq!(typed.as_f64(), Some(4.421));

        assert_eq!(Term::Literal(Literal::string("north")).as_f64(), None);
        assert_eq!(Term::iri("http://example.org/1").as_f64(), None);
    }

    #[test]
    fn test_numeric_cast_special_values() {
        let cast = |lexical: &str| Term::Literal(Literal::string(lexical)).as_f64();
        assert_eq!(cast("INF"), Some(f64::INFINITY));
        assert_eq!(cast("-INF"), Some(f64::NEG_INFINITY));
        assert!(cast("NaN").is_some_and(f64::is_nan));
        assert_eq!(cast("1.5E2"), Some(150.0));
        for spelling in ["inf", "infinity", "Infinity", "-inf", "nan", "NAN", "1e"] {
            assert_eq!(cast(spelling), None, "{spelling}");
        }
    }

    #[test]
    fn test_numeric_cast_is_not_lexical() {
        // "9.5" sorts after "10.0" lexically but not numerically
        let small = Term::Literal(Literal::string("9.5")).as_f64().unwrap();
        let large = Term::Literal(Literal::string("10.0")).as_f64().unwrap();
        assert!(small < large);
    }

    #[test]
    fn test_display() {
        assert_eq!(Term::iri("http://schema.org/name").to_string(), "<http://schema.org/name>");
        assert_eq!(
            Term::Literal(Literal::string("Antwerpen-\"Centraal\"")).to_string(),
            "\"Antwerpen-\\\"Centraal\\\"\""
        );
        assert_eq!(Term::Literal(Literal::lang("Gent", "nl")).to_string(), "\"Gent\"@nl");
    }
}
