use thiserror::Error;

/// The dataset or a rule disagrees with the declared features.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("no label defined in dataset; name the label column '{column}'")]
    NoLabel { column: String },

    #[error("dataset has an empty header row")]
    EmptyHeader,

    #[error("duplicate column name '{name}'")]
    DuplicateColumn { name: String },

    #[error("row {row} has {found} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("no dataset loaded; import a dataset before its rules")]
    NoDataset,

    #[error("feature '{feature}' does not exist")]
    UnknownFeature { feature: String },

    #[error("feature '{feature}' is not numeric and cannot take a range criterion")]
    NonNumericRange { feature: String },

    #[error("line {line}: feature '{feature}' does not exist")]
    UnknownRuleFeature { line: usize, feature: String },

    #[error("line {line}: label '{label}' does not occur in the label set")]
    LabelNotInDomain { line: usize, label: String },

    #[error("line {line}: rule conditions on the label feature '{feature}'")]
    ConditionOnLabel { line: usize, feature: String },
}

/// The compiled rule graph violates a structural invariant.
///
/// Construction is acyclic by design, so these indicate a defect rather
/// than bad input.
#[derive(Debug, Error)]
pub enum StructuralError {
    #[error("cycle detected: only {ordered} of {total} nodes could be ordered")]
    Cycle { ordered: usize, total: usize },

    #[error("rule {rule} conditions on feature '{feature}', which is missing from the feature order")]
    UnrankedFeature { rule: usize, feature: String },

    #[error("graph construction exceeded its bound of {bound} steps")]
    BoundExceeded { bound: usize },

    #[error("decision list is empty")]
    EmptyList,
}
