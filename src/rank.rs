use std::cmp::Ordering;

use crate::{DecisionList, FeatureCatalog};

/// A feature's position in the ranked order.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedFeature {
    /// Column index in the catalog.
    pub feature: usize,
    pub name: String,
    /// Summed `tp / (tp + fp)` over the rules conditioning on this feature.
    pub strength: f64,
}

/// Order features by descending summed strength of the rules that reference
/// them, using the learner-reported counts.
///
/// Features no rule references are left out. Ties keep first-seen order
/// (rule order, then condition order). The label feature always comes last.
#[must_use]
pub fn rank_features(list: &DecisionList, catalog: &FeatureCatalog) -> Vec<RankedFeature> {
    let mut ranked: Vec<RankedFeature> = Vec::new();
    for rule in list.rules() {
        let strength = rule.reported().strength();
        for condition in rule.conditions() {
            let feature = condition.feature();
            match ranked.iter_mut().find(|r| r.feature == feature) {
                Some(entry) => entry.strength += strength,
                None => ranked.push(RankedFeature {
                    feature,
                    name: catalog.feature(feature).name().to_owned(),
                    strength,
                }),
            }
        }
    }

    // sort_by is stable, which keeps first-seen order among ties
    ranked.sort_by(|a, b| b.strength.partial_cmp(&a.strength).unwrap_or(Ordering::Equal));

    let label = catalog.label_index();
    ranked.push(RankedFeature {
        feature: label,
        name: catalog.label().name().to_owned(),
        strength: 0.0,
    });
    ranked
}
