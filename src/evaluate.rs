use std::collections::HashMap;

use tracing::debug;

use crate::{AggregateStats, Dataset, DecisionList, LabelStats, RuleStats, Value};

#[allow(clippy::cast_precision_loss)]
fn percent(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let n = values.len();
    if n == 0 {
        0.0
    } else {
        values.sum::<f64>() / n as f64
    }
}

/// One first-match pass over the snapshot `rows` (indices into `dataset`).
///
/// Replaces every rule's [`RuleStats`] and the list aggregate. Returns the
/// claiming rule index for each snapshot row, in snapshot order. Indices
/// outside the dataset are skipped.
pub(crate) fn evaluate(list: &mut DecisionList, dataset: &Dataset, rows: &[usize]) -> Vec<usize> {
    let catalog = dataset.catalog();
    let label_column = catalog.label_index();
    let labels = catalog.label().values();
    let label_pos: HashMap<&Value, usize> =
        labels.iter().enumerate().map(|(i, v)| (v, i)).collect();

    let predicted: Vec<Option<usize>> = list
        .rules
        .iter()
        .map(|rule| label_pos.get(rule.label()).copied())
        .collect();

    let mut claimed = vec![0_usize; list.rules.len()];
    let mut per_label = vec![vec![0_usize; labels.len()]; list.rules.len()];
    let mut true_positive = vec![0_usize; labels.len()];
    let mut false_positive = vec![0_usize; labels.len()];
    let mut ground_truth = vec![0_usize; labels.len()];
    let mut claims = Vec::with_capacity(rows.len());
    let mut total = 0;
    let mut correct = 0;

    for row in rows.iter().filter_map(|&i| dataset.rows().get(i)) {
        total += 1;
        let truth = row
            .get(label_column)
            .and_then(|v| label_pos.get(v).copied());
        if let Some(t) = truth {
            ground_truth[t] += 1;
        }

        // The default rule matches every row.
        let Some(r) = list.first_match(|f| row.get(f)) else {
            continue;
        };
        claims.push(r);
        claimed[r] += 1;
        if let Some(t) = truth {
            per_label[r][t] += 1;
        }

        match predicted[r] {
            Some(p) if truth == Some(p) => {
                correct += 1;
                true_positive[p] += 1;
            }
            Some(p) => false_positive[p] += 1,
            None => {}
        }
    }

    for (r, rule) in list.rules.iter_mut().enumerate() {
        let true_count = predicted[r].map_or(0, |p| per_label[r][p]);
        rule.stats = RuleStats {
            claimed: claimed[r],
            per_label: std::mem::take(&mut per_label[r]),
            true_count,
            false_count: claimed[r] - true_count,
            support: percent(claimed[r], total),
            confidence: percent(true_count, claimed[r]),
        };
    }

    let per_label: Vec<LabelStats> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| LabelStats {
            label: label.clone(),
            true_positive: true_positive[i],
            false_positive: false_positive[i],
            ground_truth: ground_truth[i],
            precision: percent(true_positive[i], true_positive[i] + false_positive[i]),
            recall: percent(true_positive[i], ground_truth[i]),
        })
        .collect();

    let precision = mean(per_label.iter().map(|l| l.precision));
    let recall = mean(per_label.iter().map(|l| l.recall));
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };

    list.aggregate = AggregateStats {
        rows: total,
        correct,
        accuracy: percent(correct, total),
        precision,
        recall,
        f1,
        per_label,
    };

    debug!(
        rows = total,
        rules = list.rules.len(),
        accuracy = list.aggregate.accuracy,
        "evaluated decision list"
    );
    claims
}
