//! Query solutions.

use std::collections::BTreeMap;

use crate::identifiers::Variable;
use crate::models::term::Term;

/// A single result row, mapping variable names to values
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Binding {
    values: BTreeMap<Variable, Term>,
}

impl Binding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, variable: &str) -> Option<&Term> {
        self.values.get(&Variable::new(variable))
    }

    /// Bind a variable, returning `false` if it is already bound to a different value
    pub fn bind(&mut self, variable: Variable, value: Term) -> bool {
        match self.values.get(&variable) {
            Some(existing) => existing == &value,
            None => {
                self.values.insert(variable, value);
                true
            }
        }
    }

    pub fn with(mut self, variable: impl Into<Variable>, value: Term) -> Self {
        self.values.insert(variable.into(), value);
        self
    }

    pub fn lookup(&self, variable: &Variable) -> Option<&Term> {
        self.values.get(variable)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Term)> {
        self.values.iter()
    }
}

impl FromIterator<(Variable, Term)> for Binding {
    fn from_iter<I: IntoIterator<Item = (Variable, Term)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::term::Literal;

    #[test]
    fn test_bind_conflict() {
        let mut binding = Binding::new();
        assert!(binding.bind(Variable::new("name"), Term::Literal(Literal::string("Gent-Sint-Pieters"))));
        assert!(binding.bind(Variable::new("name"), Term::Literal(Literal::string("Gent-Sint-Pieters"))));
        assert!(!binding.bind(Variable::new("name"), Term::Literal(Literal::string("Gent-Dampoort"))));
        assert_eq!(binding.len(), 1);
        assert_eq!(binding.get("name").map(Term::value), Some("Gent-Sint-Pieters"));
    }
}
