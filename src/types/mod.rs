pub(crate) mod condition;
mod dataset;
mod decision_list;
mod error;
mod feature;
mod rule;
mod stats;
mod value;

pub use condition::{CompareOp, Condition};
pub use dataset::{Dataset, Row};
pub(crate) use decision_list::{resolve_rule, RawCondition};
pub use decision_list::{DecisionList, DecisionListBuilder, RuleBuilder};
pub use error::{SchemaError, StructuralError};
pub use feature::{Feature, FeatureCatalog};
pub use rule::{ReportedCounts, Rule, RuleStats};
pub use stats::{AggregateStats, LabelStats};
pub use value::Value;
