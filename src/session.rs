use std::path::Path;

use tracing::{debug, info, warn};

use crate::parse::{parse_dataset, parse_rules};
use crate::{
    rank_features, AggregateStats, Dag, Dataset, DecisionList, FeatureCatalog, FilterCriteria,
    RankedFeature, RegexCriteria, Rule, RuleFilter, RulescopeError, SchemaError, SessionConfig,
};

/// Everything derived from one imported rule list.
#[derive(Debug, Clone)]
struct Analysis {
    list: DecisionList,
    ranked: Vec<RankedFeature>,
    dag: Dag,
    claims: Vec<usize>,
    visible: Vec<usize>,
}

/// One analysis session: a dataset, the decision list learned from it, the
/// active filters and every derived view.
///
/// Imports are atomic. A rejected import leaves the session exactly as it
/// was; accessors hand out shared references only.
///
/// # Example
///
/// ```
/// use rulescope::{Session, SessionConfig};
///
/// let mut session = Session::new(SessionConfig::default());
/// session
///     .import_dataset("age,label\n35,approve\n20,reject\n")
///     .unwrap();
/// session
///     .import_rules("if age >= 30 then approve (1/0)\nelse reject (1/0)")
///     .unwrap();
/// assert_eq!(session.aggregate().unwrap().accuracy, 100.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Session {
    config: SessionConfig,
    dataset: Option<Dataset>,
    analysis: Option<Analysis>,
    criteria: FilterCriteria,
    regex: RegexCriteria,
    rule_filter: RuleFilter,
    filtered: Vec<usize>,
}

impl Session {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        let rule_filter = config.rule_filter.clone();
        Self {
            config,
            rule_filter,
            ..Self::default()
        }
    }

    // -- Imports ----------------------------------------------------------------

    /// Replace the dataset. The rule list, graph and dataset filters belong
    /// to the old catalog and are cleared; the rule filter returns to the
    /// configured one.
    ///
    /// # Errors
    ///
    /// Returns [`RulescopeError`] if the text is not a valid dataset.
    pub fn import_dataset(&mut self, text: &str) -> Result<(), RulescopeError> {
        let dataset = parse_dataset(text, self.config.delimiter, &self.config.label_column)
            .inspect_err(|err| warn!(error = %err, "rejected dataset import"))?;

        info!(
            rows = dataset.len(),
            columns = dataset.catalog().len(),
            labels = dataset.catalog().label().value_count(),
            "imported dataset"
        );
        self.filtered = dataset.all_indices();
        self.dataset = Some(dataset);
        self.analysis = None;
        self.criteria = FilterCriteria::default();
        self.regex = RegexCriteria::default();
        self.rule_filter = self.config.rule_filter.clone();
        Ok(())
    }

    /// Parse a rule list against the current dataset, then rank features,
    /// compile the graph, evaluate over the filtered rows and apply the rule
    /// filter.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NoDataset`] before any dataset is imported, and
    /// any grammar, schema or structural error of the rule text.
    pub fn import_rules(&mut self, text: &str) -> Result<(), RulescopeError> {
        self.install(|catalog| parse_rules(text, catalog))
    }

    /// Read and import a dataset file.
    ///
    /// # Errors
    ///
    /// Returns [`RulescopeError::Io`] if the file cannot be read, or any
    /// error of [`import_dataset`](Self::import_dataset).
    pub fn import_dataset_file(&mut self, path: impl AsRef<Path>) -> Result<(), RulescopeError> {
        let text = std::fs::read_to_string(path)?;
        self.import_dataset(&text)
    }

    /// Read and import a rule file.
    ///
    /// # Errors
    ///
    /// Returns [`RulescopeError::Io`] if the file cannot be read, or any
    /// error of [`import_rules`](Self::import_rules).
    pub fn import_rules_file(&mut self, path: impl AsRef<Path>) -> Result<(), RulescopeError> {
        let text = std::fs::read_to_string(path)?;
        self.import_rules(&text)
    }

    fn install(
        &mut self,
        load: impl FnOnce(&FeatureCatalog) -> Result<DecisionList, RulescopeError>,
    ) -> Result<(), RulescopeError> {
        let analysis = self
            .analyze(load)
            .inspect_err(|err| warn!(error = %err, "rejected rule import"))?;
        info!(
            rules = analysis.list.len(),
            nodes = analysis.dag.len(),
            visible = analysis.visible.len(),
            "imported rules"
        );
        self.analysis = Some(analysis);
        Ok(())
    }

    fn analyze(
        &self,
        load: impl FnOnce(&FeatureCatalog) -> Result<DecisionList, RulescopeError>,
    ) -> Result<Analysis, RulescopeError> {
        let dataset = self.dataset.as_ref().ok_or(SchemaError::NoDataset)?;
        let catalog = dataset.catalog();
        let mut list = load(catalog)?;

        let ranked = rank_features(&list, catalog);
        let order: Vec<usize> = ranked.iter().map(|r| r.feature).collect();
        let dag = Dag::compile(&list, catalog, &order)?;
        let claims = list.evaluate(dataset, &self.filtered);
        let visible = self.rule_filter.apply(&list, catalog, &self.criteria)?;

        Ok(Analysis {
            list,
            ranked,
            dag,
            claims,
            visible,
        })
    }

    // -- Filters ----------------------------------------------------------------

    /// Replace the dataset filter, then re-evaluate from the full dataset and
    /// re-apply the rule filter.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] without a dataset, or for criteria naming an
    /// unknown feature or putting a range on a categorical one.
    pub fn set_dataset_filter(&mut self, criteria: FilterCriteria) -> Result<(), RulescopeError> {
        let filtered = self.select_rows(&criteria, &self.regex)?;
        self.commit_rows(criteria, self.regex.clone(), filtered)
    }

    /// Replace the regular-expression filter, combined with the dataset
    /// filter by conjunction.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] without a dataset or for an unknown feature.
    pub fn set_regex_filter(&mut self, regex: RegexCriteria) -> Result<(), RulescopeError> {
        let filtered = self.select_rows(&self.criteria, &regex)?;
        self.commit_rows(self.criteria.clone(), regex, filtered)
    }

    /// Replace the rule filter. Statistics are unchanged, so nothing is
    /// re-evaluated.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownFeature`] if the interest selection
    /// names an unknown feature.
    pub fn set_rule_filter(&mut self, filter: RuleFilter) -> Result<(), RulescopeError> {
        if let (Some(dataset), Some(analysis)) = (self.dataset.as_ref(), self.analysis.as_mut()) {
            analysis.visible = filter.apply(&analysis.list, dataset.catalog(), &self.criteria)?;
            debug!(visible = analysis.visible.len(), "applied rule filter");
        } else if let Some(dataset) = self.dataset.as_ref() {
            for name in &filter.interest {
                dataset.catalog().resolve(name)?;
            }
        }
        self.rule_filter = filter;
        Ok(())
    }

    fn select_rows(
        &self,
        criteria: &FilterCriteria,
        regex: &RegexCriteria,
    ) -> Result<Vec<usize>, RulescopeError> {
        let dataset = self.dataset.as_ref().ok_or(SchemaError::NoDataset)?;
        let rows = criteria.apply(dataset, &dataset.all_indices())?;
        Ok(regex.apply(dataset, &rows)?)
    }

    fn commit_rows(
        &mut self,
        criteria: FilterCriteria,
        regex: RegexCriteria,
        filtered: Vec<usize>,
    ) -> Result<(), RulescopeError> {
        if let (Some(dataset), Some(analysis)) = (self.dataset.as_ref(), self.analysis.as_mut()) {
            analysis.claims = analysis.list.evaluate(dataset, &filtered);
            analysis.visible = self
                .rule_filter
                .apply(&analysis.list, dataset.catalog(), &criteria)?;
            info!(
                rows = filtered.len(),
                visible = analysis.visible.len(),
                accuracy = analysis.list.aggregate().accuracy,
                "re-evaluated after filter change"
            );
        }
        self.criteria = criteria;
        self.regex = regex;
        self.filtered = filtered;
        Ok(())
    }

    // -- Accessors --------------------------------------------------------------

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    #[must_use]
    pub fn catalog(&self) -> Option<&FeatureCatalog> {
        self.dataset.as_ref().map(Dataset::catalog)
    }

    #[must_use]
    pub fn decision_list(&self) -> Option<&DecisionList> {
        self.analysis.as_ref().map(|a| &a.list)
    }

    /// Rules in list order with their current statistics; empty before a
    /// successful rule import.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        self.analysis.as_ref().map(|a| a.list.rules()).unwrap_or_default()
    }

    /// Indices of the rules passing the rule filter, in list order.
    #[must_use]
    pub fn visible(&self) -> &[usize] {
        self.analysis.as_ref().map(|a| a.visible.as_slice()).unwrap_or_default()
    }

    /// The rules passing the rule filter, with their list indices.
    pub fn visible_rules(&self) -> impl Iterator<Item = (usize, &Rule)> + '_ {
        let rules = self.rules();
        self.visible().iter().map(move |&i| (i, &rules[i]))
    }

    #[must_use]
    pub fn ranked_features(&self) -> &[RankedFeature] {
        self.analysis.as_ref().map(|a| a.ranked.as_slice()).unwrap_or_default()
    }

    #[must_use]
    pub fn aggregate(&self) -> Option<&AggregateStats> {
        self.analysis.as_ref().map(|a| a.list.aggregate())
    }

    #[must_use]
    pub fn dag(&self) -> Option<&Dag> {
        self.analysis.as_ref().map(|a| &a.dag)
    }

    /// Dataset row indices passing the dataset filters.
    #[must_use]
    pub fn filtered_rows(&self) -> &[usize] {
        &self.filtered
    }

    /// Claiming rule of each filtered row, aligned with
    /// [`filtered_rows`](Self::filtered_rows).
    #[must_use]
    pub fn claims(&self) -> &[usize] {
        self.analysis.as_ref().map(|a| a.claims.as_slice()).unwrap_or_default()
    }

    #[must_use]
    pub fn dataset_filter(&self) -> &FilterCriteria {
        &self.criteria
    }

    #[must_use]
    pub fn rule_filter(&self) -> &RuleFilter {
        &self.rule_filter
    }
}
