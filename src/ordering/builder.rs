//! Sort descriptor to `OrderKey` conversion

use tracing::debug;

use super::key::OrderKey;
use crate::predicate::Target;
use crate::request::Sort;
use crate::shape::RecordShape;

/// Builds one `OrderKey` per applicable sort
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderingBuilder;

impl OrderingBuilder {
    /// None when the member does not resolve or belongs to the other stage.
    pub fn build(model: &RecordShape, target: Target<'_>, sort: &Sort) -> Option<OrderKey> {
        let Some(class) = model.resolve(&sort.member) else {
            debug!(member = %sort.member, "sort ignored: unknown member");
            return None;
        };

        match target.address(&class) {
            Ok(field) => Some(OrderKey::new(field, class.kind.clone(), sort.direction)),
            Err(reason) => {
                debug!(member = %sort.member, %reason, "sort skipped");
                None
            }
        }
    }

    /// Keys for every applicable sort, in request order.
    pub fn build_all(model: &RecordShape, target: Target<'_>, sorts: &[Sort]) -> Vec<OrderKey> {
        sorts
            .iter()
            .filter_map(|sort| Self::build(model, target, sort))
            .collect()
    }

    /// Keys for every resolvable sort, addressed by declared name.
    ///
    /// Used when the in-memory stage owns pagination: the whole ordering is
    /// re-applied there so the first sort stays primary.
    pub fn build_declared(model: &RecordShape, sorts: &[Sort]) -> Vec<OrderKey> {
        sorts
            .iter()
            .filter_map(|sort| {
                let class = model.resolve(&sort.member)?;
                Some(OrderKey::new(class.name, class.kind.clone(), sort.direction))
            })
            .collect()
    }
}
