// Selections - chainable, lazily evaluated queries anchored on an entity

pub mod insights;
pub mod posts;
pub mod selection;

#[cfg(test)]
pub(crate) mod support;

pub use insights::{
    InsightsData, InsightsSelection, MetricRequest, MetricSpec, Row, RowSet, TimeBucket,
};
pub use posts::PostSelection;
pub use selection::{Selection, SelectionMeta, SelectionState};
