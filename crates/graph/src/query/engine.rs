//! Streaming evaluation of [`SelectQuery`] against a [`GraphStore`].
//!
//! Solutions are produced lazily, one seed at a time. A seed is either a
//! solution of the first pattern or, when the query bounds a subject's
//! `wgs:lat`/`wgs:long` by range filters, a subject found through the store's
//! R-tree. Every seed still goes through all patterns and filters, so the
//! spatial shortcut never changes the result set. The stream is finite and a
//! fresh one can be started at any time by calling [`evaluate`] again.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;

use futures_core::Stream;

use crate::identifiers::Variable;
use crate::models::binding::Binding;
use crate::models::term::Term;
use crate::query::pattern::{PatternTerm, SelectQuery, TriplePattern};
use crate::store::GraphStore;
use crate::vocab::wgs;

/// Lazy, finite sequence of solutions
pub type BindingStream = Pin<Box<dyn Stream<Item = Binding> + Send>>;

/// Start evaluating `query`; rows are produced as the stream is polled
pub fn evaluate(store: Arc<GraphStore>, query: Arc<SelectQuery>) -> BindingStream {
    Box::pin(futures_util::stream::iter(Solutions::new(store, query)))
}

struct Solutions {
    store: Arc<GraphStore>,
    query: Arc<SelectQuery>,
    seeds: std::vec::IntoIter<Binding>,
    /// Index of the first pattern not applied to the seeds
    remaining_from: usize,
    pending: VecDeque<Binding>,
}

impl Solutions {
    fn new(store: Arc<GraphStore>, query: Arc<SelectQuery>) -> Self {
        let (seeds, remaining_from) = match spatial_seeds(&store, &query) {
            Some(seeds) => (seeds, 0),
            None => match query.patterns().first() {
                Some(first) => (extend(&store, &Binding::new(), first), 1),
                None => (Vec::new(), 0),
            },
        };

        tracing::trace!(seeds = seeds.len(), "query plan ready");

        Self {
            store,
            query,
            seeds: seeds.into_iter(),
            remaining_from,
            pending: VecDeque::new(),
        }
    }

    fn expand_seed(&self, seed: Binding) -> Vec<Binding> {
        let mut partial = vec![seed];
        for pattern in &self.query.patterns()[self.remaining_from..] {
            partial = partial
                .iter()
                .flat_map(|binding| extend(&self.store, binding, pattern))
                .collect();
            if partial.is_empty() {
                break;
            }
        }

        partial.retain(|binding| {
            self.query.filters().iter().all(|filter| {
                binding
                    .lookup(&filter.variable)
                    .is_some_and(|term| filter.accepts(term))
            })
        });
        partial
    }
}

impl Iterator for Solutions {
    type Item = Binding;

    fn next(&mut self) -> Option<Binding> {
        loop {
            if let Some(solution) = self.pending.pop_front() {
                return Some(solution);
            }
            let seed = self.seeds.next()?;
            let solutions = self.expand_seed(seed);
            self.pending.extend(solutions);
        }
    }
}

fn resolve<'a>(term: &'a PatternTerm, binding: &'a Binding) -> Option<&'a Term> {
    match term {
        PatternTerm::Const(term) => Some(term),
        PatternTerm::Var(variable) => binding.lookup(variable),
    }
}

/// All extensions of `binding` that satisfy `pattern`
fn extend(store: &GraphStore, binding: &Binding, pattern: &TriplePattern) -> Vec<Binding> {
    let subject = resolve(&pattern.subject, binding);
    let object = resolve(&pattern.object, binding);

    store
        .match_pattern(subject, Some(&pattern.predicate), object)
        .filter_map(|triple| {
            let mut next = binding.clone();
            let bound = [
                (&pattern.subject, &triple.subject),
                (&pattern.object, &triple.object),
            ]
            .into_iter()
            .all(|(slot, value)| match slot {
                PatternTerm::Var(variable) => next.bind(variable.clone(), value.clone()),
                PatternTerm::Const(_) => true,
            });
            bound.then_some(next)
        })
        .collect()
}

/// Seed a subject variable from the R-tree when its coordinates are range-bounded
fn spatial_seeds(store: &GraphStore, query: &SelectQuery) -> Option<Vec<Binding>> {
    let object_var = |subject: &Variable, predicate: &str| {
        query.patterns().iter().find_map(|p| {
            (p.predicate.as_str() == predicate && p.subject.as_var() == Some(subject))
                .then(|| p.object.as_var())
                .flatten()
        })
    };

    query.patterns().iter().find_map(|pattern| {
        let subject = pattern.subject.as_var()?;
        let lat = query.filter_on(object_var(subject, wgs::LAT)?)?;
        let long = query.filter_on(object_var(subject, wgs::LONG)?)?;

        let seeds = store
            .subjects_in_envelope([long.min(), lat.min()], [long.max(), lat.max()])
            .into_iter()
            .map(|node| Binding::new().with(subject.clone(), node))
            .collect();
        Some(seeds)
    })
}
