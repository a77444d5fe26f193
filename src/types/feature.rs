use std::collections::{HashMap, HashSet};

use super::error::SchemaError;
use super::value::Value;

/// One dataset column: its name, observed value domain and numeric summary.
///
/// Built while the dataset is imported and immutable afterwards.
#[derive(Debug, Clone)]
pub struct Feature {
    name: String,
    is_label: bool,
    domain: Vec<Value>,
    seen: HashSet<Value>,
    is_numeric: bool,
    min: Option<f64>,
    max: Option<f64>,
}

impl Feature {
    pub(crate) fn new(name: impl Into<String>, is_label: bool) -> Self {
        Self {
            name: name.into(),
            is_label,
            domain: Vec::new(),
            seen: HashSet::new(),
            is_numeric: true,
            min: None,
            max: None,
        }
    }

    /// Record an observed cell. Empty cells are passed as `None` and ignored.
    pub(crate) fn observe(&mut self, cell: Option<&Value>) {
        let Some(value) = cell else {
            return;
        };
        if !self.seen.insert(value.clone()) {
            return;
        }
        self.domain.push(value.clone());
        match value.as_number() {
            Some(n) if self.is_numeric => {
                self.min = Some(self.min.map_or(n, |m| m.min(n)));
                self.max = Some(self.max.map_or(n, |m| m.max(n)));
            }
            Some(_) => {}
            None => {
                self.is_numeric = false;
                self.min = None;
                self.max = None;
            }
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_label(&self) -> bool {
        self.is_label
    }

    /// True iff every observed value is a number (vacuously true for an
    /// all-empty column).
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.is_numeric
    }

    /// Smallest observed value; `None` unless the feature is numeric and non-empty.
    #[must_use]
    pub fn min(&self) -> Option<f64> {
        self.min
    }

    /// Largest observed value; `None` unless the feature is numeric and non-empty.
    #[must_use]
    pub fn max(&self) -> Option<f64> {
        self.max
    }

    /// Distinct observed values in first-seen order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.domain
    }

    #[must_use]
    pub fn value_count(&self) -> usize {
        self.domain.len()
    }

    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        self.seen.contains(value)
    }

    /// Position of a value in [`values()`](Self::values).
    #[must_use]
    pub fn position(&self, value: &Value) -> Option<usize> {
        if !self.contains(value) {
            return None;
        }
        self.domain.iter().position(|v| v == value)
    }
}

/// All features of the imported dataset, indexed by column position.
///
/// Exactly one feature is the label.
#[derive(Debug, Clone)]
pub struct FeatureCatalog {
    features: Vec<Feature>,
    by_name: HashMap<String, usize>,
    label: usize,
    contains_and: bool,
}

impl FeatureCatalog {
    /// Build an empty-domain catalog from a header row.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the header is empty, repeats a column name,
    /// or has no column called `label_column`.
    pub fn from_header<S: AsRef<str>>(
        header: &[S],
        label_column: &str,
    ) -> Result<Self, SchemaError> {
        if header.is_empty() {
            return Err(SchemaError::EmptyHeader);
        }
        let mut features = Vec::with_capacity(header.len());
        let mut by_name = HashMap::with_capacity(header.len());
        let mut label = None;
        for (idx, name) in header.iter().enumerate() {
            let name = name.as_ref();
            if by_name.insert(name.to_owned(), idx).is_some() {
                return Err(SchemaError::DuplicateColumn {
                    name: name.to_owned(),
                });
            }
            let is_label = name == label_column;
            if is_label {
                label = Some(idx);
            }
            features.push(Feature::new(name, is_label));
        }
        let label = label.ok_or_else(|| SchemaError::NoLabel {
            column: label_column.to_owned(),
        })?;
        let contains_and = features.iter().any(|f| f.name.contains("and"));
        Ok(Self {
            features,
            by_name,
            label,
            contains_and,
        })
    }

    pub(crate) fn observe_row(&mut self, cells: &[Option<Value>]) {
        for (feature, cell) in self.features.iter_mut().zip(cells) {
            feature.observe(cell.as_ref());
        }
    }

    /// Look up the column index for a feature name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Like [`get`](Self::get), but reports unknown names as an error.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownFeature`] if no column has this name.
    pub fn resolve(&self, name: &str) -> Result<usize, SchemaError> {
        self.get(name).ok_or_else(|| SchemaError::UnknownFeature {
            feature: name.to_owned(),
        })
    }

    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn feature(&self, index: usize) -> &Feature {
        &self.features[index]
    }

    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    #[must_use]
    pub fn label_index(&self) -> usize {
        self.label
    }

    #[must_use]
    pub fn label(&self) -> &Feature {
        &self.features[self.label]
    }

    /// Whether any feature name contains the substring `and`, which makes
    /// splitting rule conditions on ` and ` ambiguous.
    #[must_use]
    pub fn contains_and(&self) -> bool {
        self.contains_and
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_registers_columns_in_order() {
        let catalog = FeatureCatalog::from_header(&["age", "color", "label"], "label").unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get("age"), Some(0));
        assert_eq!(catalog.get("color"), Some(1));
        assert_eq!(catalog.label_index(), 2);
        assert!(catalog.label().is_label());
        assert!(!catalog.feature(0).is_label());
    }

    #[test]
    fn missing_label_column() {
        let err = FeatureCatalog::from_header(&["age", "class"], "label").unwrap_err();
        assert!(matches!(err, SchemaError::NoLabel { .. }));
    }

    #[test]
    fn duplicate_column() {
        let err = FeatureCatalog::from_header(&["age", "age", "label"], "label").unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateColumn { name } if name == "age"));
    }

    #[test]
    fn empty_header() {
        let header: [&str; 0] = [];
        let err = FeatureCatalog::from_header(&header, "label").unwrap_err();
        assert!(matches!(err, SchemaError::EmptyHeader));
    }

    #[test]
    fn resolve_unknown() {
        let catalog = FeatureCatalog::from_header(&["label"], "label").unwrap();
        assert!(matches!(
            catalog.resolve("nope"),
            Err(SchemaError::UnknownFeature { feature }) if feature == "nope"
        ));
    }

    #[test]
    fn numeric_feature_tracks_min_max() {
        let mut f = Feature::new("age", false);
        for n in [30.0, 12.0, 45.0, 30.0] {
            f.observe(Some(&Value::Number(n)));
        }
        f.observe(None);
        assert!(f.is_numeric());
        assert_eq!(f.min(), Some(12.0));
        assert_eq!(f.max(), Some(45.0));
        assert_eq!(f.value_count(), 3);
    }

    #[test]
    fn one_text_value_makes_feature_categorical() {
        let mut f = Feature::new("zip", false);
        f.observe(Some(&Value::Number(1234.0)));
        f.observe(Some(&Value::Text("n/a".into())));
        f.observe(Some(&Value::Number(99.0)));
        assert!(!f.is_numeric());
        assert_eq!(f.min(), None);
        assert_eq!(f.max(), None);
        assert_eq!(f.value_count(), 3);
    }

    #[test]
    fn empty_column_is_vacuously_numeric() {
        let f = Feature::new("blank", false);
        assert!(f.is_numeric());
        assert_eq!(f.min(), None);
        assert_eq!(f.value_count(), 0);
    }

    #[test]
    fn detects_and_in_names() {
        let catalog = FeatureCatalog::from_header(&["brand", "label"], "label").unwrap();
        assert!(catalog.contains_and());
        let catalog = FeatureCatalog::from_header(&["age", "label"], "label").unwrap();
        assert!(!catalog.contains_and());
    }

    #[test]
    fn value_positions_follow_first_seen_order() {
        let mut f = Feature::new("label", true);
        f.observe(Some(&Value::from("b")));
        f.observe(Some(&Value::from("a")));
        f.observe(Some(&Value::from("b")));
        assert_eq!(f.position(&Value::from("b")), Some(0));
        assert_eq!(f.position(&Value::from("a")), Some(1));
        assert_eq!(f.position(&Value::from("c")), None);
    }
}
