//! Basic graph pattern queries with numeric range filters.

use std::fmt;

use crate::identifiers::{Iri, Variable};
use crate::models::term::Term;
use crate::models::types::{GraphError, Result};
use crate::vocab::{rdf, xsd};

/// Subject or object position of a triple pattern
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatternTerm {
    Var(Variable),
    Const(Term),
}

impl PatternTerm {
    pub fn var(name: impl AsRef<str>) -> Self {
        PatternTerm::Var(Variable::new(name))
    }

    pub fn iri(iri: impl AsRef<str>) -> Self {
        PatternTerm::Const(Term::iri(iri))
    }

    pub fn as_var(&self) -> Option<&Variable> {
        match self {
            PatternTerm::Var(variable) => Some(variable),
            PatternTerm::Const(_) => None,
        }
    }
}

/// A triple pattern with a fixed predicate
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriplePattern {
    pub subject: PatternTerm,
    pub predicate: Iri,
    pub object: PatternTerm,
}

impl TriplePattern {
    pub fn new(subject: PatternTerm, predicate: impl AsRef<str>, object: PatternTerm) -> Self {
        Self {
            subject,
            predicate: Iri::new(predicate),
            object,
        }
    }
}

/// `FILTER(xsd:double(?var) >= min && xsd:double(?var) <= max)`
#[derive(Clone, Debug, PartialEq)]
pub struct RangeFilter {
    pub variable: Variable,
    min: f64,
    max: f64,
}

impl RangeFilter {
    /// Both bounds must be finite and ordered
    pub fn new(variable: impl AsRef<str>, min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() {
            return Err(GraphError::InvalidQueryParameter { name: "min", value: min });
        }
        if !max.is_finite() || max < min {
            return Err(GraphError::InvalidQueryParameter { name: "max", value: max });
        }
        Ok(Self {
            variable: Variable::new(variable),
            min,
            max,
        })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Numeric comparison; terms without a numeric value never match
    pub fn accepts(&self, term: &Term) -> bool {
        term.as_f64()
            .is_some_and(|value| value >= self.min && value <= self.max)
    }
}

/// `SELECT * WHERE { patterns . filters }`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectQuery {
    prefixes: Vec<(String, String)>,
    patterns: Vec<TriplePattern>,
    filters: Vec<RangeFilter>,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.prefixes.push((prefix.into(), namespace.into()));
        self
    }

    pub fn pattern(mut self, pattern: TriplePattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    pub fn filter(mut self, filter: RangeFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn patterns(&self) -> &[TriplePattern] {
        &self.patterns
    }

    pub fn filters(&self) -> &[RangeFilter] {
        &self.filters
    }

    pub fn filter_on(&self, variable: &Variable) -> Option<&RangeFilter> {
        self.filters.iter().find(|f| &f.variable == variable)
    }

    fn compact(&self, iri: &str) -> String {
        let local_ok = |local: &str| {
            !local.is_empty()
                && local
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        };

        self.prefixes
            .iter()
            .find_map(|(prefix, namespace)| {
                iri.strip_prefix(namespace.as_str())
                    .filter(|local| local_ok(local))
                    .map(|local| format!("{prefix}:{local}"))
            })
            .unwrap_or_else(|| format!("<{iri}>"))
    }

    fn render_term(&self, term: &PatternTerm) -> String {
        match term {
            PatternTerm::Var(variable) => format!("?{variable}"),
            PatternTerm::Const(Term::Iri(iri)) => self.compact(iri.as_str()),
            PatternTerm::Const(other) => other.to_string(),
        }
    }
}

impl fmt::Display for SelectQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (prefix, namespace) in &self.prefixes {
            writeln!(f, "PREFIX {prefix}: <{namespace}>")?;
        }
        writeln!(f, "SELECT *")?;
        writeln!(f, "WHERE {{")?;

        for pattern in &self.patterns {
            let predicate = if pattern.predicate.as_str() == rdf::TYPE {
                "a".to_string()
            } else {
                self.compact(pattern.predicate.as_str())
            };
            writeln!(
                f,
                "  {} {} {} .",
                self.render_term(&pattern.subject),
                predicate,
                self.render_term(&pattern.object)
            )?;
        }

        let cast = self.compact(xsd::DOUBLE);
        for filter in &self.filters {
            let var = &filter.variable;
            writeln!(
                f,
                "  FILTER({cast}(?{var}) >= {} && {cast}(?{var}) <= {})",
                filter.min, filter.max
            )?;
        }

        write!(f, "}}")
    }
}
