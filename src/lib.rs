mod compile;
mod config;
mod error;
mod evaluate;
mod filter;
pub mod parse;
mod rank;
mod session;
mod types;

pub use compile::{Dag, DagNode, NodeKind};
pub use config::SessionConfig;
pub use error::RulescopeError;
pub use filter::{FilterCriteria, Predicate, RegexCriteria, RuleFilter};
pub use rank::{rank_features, RankedFeature};
pub use session::Session;
pub use types::{
    AggregateStats, CompareOp, Condition, Dataset, DecisionList, DecisionListBuilder, Feature,
    FeatureCatalog, LabelStats, ReportedCounts, Row, Rule, RuleBuilder, RuleStats, SchemaError,
    StructuralError, Value,
};
