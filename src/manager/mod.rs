//! Query planning
//!
//! `FilterManager` composes a request into a query source in a fixed order:
//! where, then order, then skip, then take.
//!
//! Filters are grouped by member (ignoring case, first appearance order).
//! Filters on the same member are ORed, groups are ANDed.
//!
//! Pagination runs at exactly one stage. It is pushed down to the remote
//! source unless some filter or sort targets a computed-only field, in which
//! case it is deferred until after in-memory evaluation. A deferred page
//! re-sorts by every requested key, so in-memory records must carry the
//! model's declared names.

use tracing::debug;

use crate::config::ManagerConfig;
use crate::ordering::{OrderKey, OrderingBuilder};
use crate::predicate::{Predicate, PredicateBuilder, Target};
use crate::request::{Filter, RequestDataSource, Sort};
use crate::shape::RecordShape;
use crate::source::{LazyCollection, QuerySource};
use crate::value::Record;

/// Plans and applies filters, orderings and paging
#[derive(Debug, Clone, Default)]
pub struct FilterManager {
    config: ManagerConfig,
    predicates: PredicateBuilder,
}

impl FilterManager {
    pub fn new(config: ManagerConfig) -> Self {
        Self {
            predicates: PredicateBuilder::new(config.clone()),
            config,
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// True when pagination must wait for the in-memory stage
    pub fn requires_memory_stage(&self, model: &RecordShape, request: &RequestDataSource) -> bool {
        request.targets_computed(model)
    }

    /// Combined predicate for `filters` at one stage.
    ///
    /// Same member: OR. Different members: AND.
    pub fn build_filter(
        &self,
        model: &RecordShape,
        target: Target<'_>,
        filters: &[Filter],
    ) -> Predicate {
        let mut groups: Vec<(String, Vec<&Filter>)> = Vec::new();
        for filter in filters {
            let key = filter.member.trim().to_ascii_lowercase();
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(filter),
                None => groups.push((key, vec![filter])),
            }
        }

        Predicate::all(groups.into_iter().map(|(_, members)| {
            Predicate::any(
                members
                    .into_iter()
                    .map(|f| self.predicates.build(model, target, f)),
            )
        }))
    }

    /// Order keys applicable at one stage, first key primary
    pub fn build_ordering(
        &self,
        model: &RecordShape,
        target: Target<'_>,
        sorts: &[Sort],
    ) -> Vec<OrderKey> {
        OrderingBuilder::build_all(model, target, sorts)
    }

    /// Composes the remote stage onto `source`.
    ///
    /// Computed-only filters and sorts are left for `filter_memory`.
    pub fn filter_remote<Q: QuerySource>(
        &self,
        model: &RecordShape,
        entity: &RecordShape,
        source: Q,
        request: &RequestDataSource,
    ) -> Q {
        let paginate = !self.requires_memory_stage(model, request);
        self.compose(model, Target::Remote(entity), source, request, paginate)
    }

    /// Applies the in-memory stage to already materialized records.
    pub fn filter_memory<R: Record>(
        &self,
        model: &RecordShape,
        records: Vec<R>,
        request: &RequestDataSource,
    ) -> Vec<R> {
        let paginate = self.requires_memory_stage(model, request);
        self.compose(model, Target::Model, LazyCollection::new(records), request, paginate)
            .collect()
    }

    fn compose<Q: QuerySource>(
        &self,
        model: &RecordShape,
        target: Target<'_>,
        source: Q,
        request: &RequestDataSource,
        paginate: bool,
    ) -> Q {
        if request.is_empty() {
            return source;
        }

        let stage = if target.is_remote() { "remote" } else { "memory" };
        let mut source = source;

        let predicate = self.build_filter(model, target, &request.filters);
        if !predicate.is_always() {
            source = source.filter(predicate);
        }

        // A deferred page needs the whole ordering, not only the computed keys.
        let keys = match target {
            Target::Model if paginate => OrderingBuilder::build_declared(model, &request.sorts),
            _ => self.build_ordering(model, target, &request.sorts),
        };
        let ordered = keys.len();
        if !keys.is_empty() {
            source = source.order_by(keys);
        }

        let mut skip = None;
        let mut take = None;
        if paginate {
            skip = request.skip();
            take = request.take().map(|t| self.config.clamp_take(t));
            if let Some(count) = skip {
                source = source.skip(count);
            }
            if let Some(count) = take {
                source = source.take(count);
            }
        }

        debug!(stage, ordered, paginate, ?skip, ?take, "composed query");
        source
    }
}
