use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::{CompareOp, DecisionList, FeatureCatalog, StructuralError, Value};

/// What a DAG node does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Tests `feature op value`.
    Condition(CompareOp),
    /// A leaf predicting `value` for the label feature.
    Outcome,
}

/// One node of the compiled rule graph.
#[derive(Debug, Clone, PartialEq)]
pub struct DagNode {
    /// Position in topological order.
    pub id: usize,
    /// Index of the owning rule. Outcome nodes are shared by every rule
    /// predicting the same label and record the first of them.
    pub rule: usize,
    /// Tested feature; the label feature for outcome nodes.
    pub feature: usize,
    /// Tested literal, or the predicted label.
    pub value: Value,
    pub kind: NodeKind,
    /// Next test when the condition holds.
    pub true_child: Option<usize>,
    /// First test of the next rule when the condition fails.
    pub false_child: Option<usize>,
}

impl DagNode {
    #[must_use]
    pub fn is_outcome(&self) -> bool {
        self.kind == NodeKind::Outcome
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum NodeKey {
    Condition { rule: usize, feature: usize, value: Value },
    Outcome { label: Value },
}

/// A decision list compiled into a graph with shared nodes, topologically
/// ordered so every edge points to a higher id.
///
/// Condition nodes belong to one rule: two rules opening with the same test
/// still get separate nodes. Sharing comes from every false edge of a rule
/// meeting at the next rule's first node, and from one outcome per label.
#[derive(Debug, Clone)]
pub struct Dag {
    nodes: Vec<DagNode>,
    rule_roots: Vec<usize>,
    depth: usize,
    height: usize,
}

impl Dag {
    /// Compile `list`, testing each rule's conditions in the given feature
    /// `order` (catalog indices, usually from
    /// [`rank_features`](crate::rank_features)).
    ///
    /// # Errors
    ///
    /// Returns [`StructuralError`] if a condition's feature is missing from
    /// `order`, construction creates more than `rules × (order + 1)` nodes,
    /// or the graph cannot be topologically sorted.
    pub fn compile(
        list: &DecisionList,
        catalog: &FeatureCatalog,
        order: &[usize],
    ) -> Result<Dag, StructuralError> {
        if list.is_empty() {
            return Err(StructuralError::EmptyList);
        }
        check_order(list, catalog, order)?;

        let mut builder = Builder {
            list,
            label: catalog.label_index(),
            order,
            nodes: Vec::new(),
            lookup: HashMap::new(),
            bound: list.len() * (order.len() + 1),
        };
        builder.build()?;

        let nodes = topological_sort(builder.nodes)?;

        let mut rule_roots = Vec::with_capacity(list.len());
        let mut depth = 0;
        let mut cursor = Some(0);
        while let Some(id) = cursor {
            rule_roots.push(id);
            depth = depth.max(true_chain_len(&nodes, id));
            cursor = nodes[id].false_child;
        }
        let height = nodes.iter().filter(|n| n.is_outcome()).count();

        debug!(nodes = nodes.len(), depth, height, "compiled decision list graph");
        Ok(Dag {
            nodes,
            rule_roots,
            depth,
            height,
        })
    }

    /// Nodes in topological order; `nodes()[i].id == i`.
    #[must_use]
    pub fn nodes(&self) -> &[DagNode] {
        &self.nodes
    }

    /// # Panics
    ///
    /// Panics if `id` is out of bounds.
    #[must_use]
    pub fn node(&self, id: usize) -> &DagNode {
        &self.nodes[id]
    }

    /// The first rule's first test. Always 0.
    #[must_use]
    pub fn root(&self) -> usize {
        0
    }

    /// First node of every rule, reached from the root by false edges.
    #[must_use]
    pub fn rule_roots(&self) -> &[usize] {
        &self.rule_roots
    }

    /// Longest true-edge chain from any rule's first node, counting the
    /// outcome leaf.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of outcome nodes.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn check_order(
    list: &DecisionList,
    catalog: &FeatureCatalog,
    order: &[usize],
) -> Result<(), StructuralError> {
    for (idx, rule) in list.rules().iter().enumerate() {
        for condition in rule.conditions() {
            if !order.contains(&condition.feature()) {
                return Err(StructuralError::UnrankedFeature {
                    rule: idx,
                    feature: catalog.feature(condition.feature()).name().to_owned(),
                });
            }
        }
    }
    Ok(())
}

struct Builder<'a> {
    list: &'a DecisionList,
    label: usize,
    order: &'a [usize],
    nodes: Vec<DagNode>,
    lookup: HashMap<NodeKey, usize>,
    bound: usize,
}

impl Builder<'_> {
    /// Build every rule's true-chain in list order. Condition nodes of a
    /// rule wait in `open` until the next rule's first node exists, which
    /// becomes their false child. Returns the first rule's first node.
    fn build(&mut self) -> Result<usize, StructuralError> {
        let mut first = None;
        let mut open: Vec<usize> = Vec::new();
        for rule in 0..self.list.len() {
            let (head, conditions) = self.chain(rule)?;
            for id in open.drain(..) {
                self.nodes[id].false_child = Some(head);
            }
            open = conditions;
            first.get_or_insert(head);
        }
        first.ok_or(StructuralError::EmptyList)
    }

    /// Nodes for `rule`: one per condition in ranked order, then the
    /// outcome. Returns the chain's head and its condition nodes.
    fn chain(&mut self, rule: usize) -> Result<(usize, Vec<usize>), StructuralError> {
        let (list, order) = (self.list, self.order);
        let current = &list.rules()[rule];

        let mut conditions: Vec<usize> = Vec::new();
        for condition in order.iter().filter_map(|&f| current.condition_on(f)) {
            let key = NodeKey::Condition {
                rule,
                feature: condition.feature(),
                value: condition.value().clone(),
            };
            let id = match self.lookup.get(&key) {
                Some(&id) => id,
                None => {
                    let id = self.push(DagNode {
                        id: 0,
                        rule,
                        feature: condition.feature(),
                        value: condition.value().clone(),
                        kind: NodeKind::Condition(condition.op()),
                        true_child: None,
                        false_child: None,
                    })?;
                    self.lookup.insert(key, id);
                    id
                }
            };
            if let Some(&prev) = conditions.last() {
                self.nodes[prev].true_child = Some(id);
            }
            conditions.push(id);
        }

        let key = NodeKey::Outcome {
            label: current.label().clone(),
        };
        let outcome = match self.lookup.get(&key) {
            Some(&id) => id,
            None => {
                let id = self.push(DagNode {
                    id: 0,
                    rule,
                    feature: self.label,
                    value: current.label().clone(),
                    kind: NodeKind::Outcome,
                    true_child: None,
                    false_child: None,
                })?;
                self.lookup.insert(key, id);
                id
            }
        };
        if let Some(&last) = conditions.last() {
            self.nodes[last].true_child = Some(outcome);
        }

        let head = conditions.first().copied().unwrap_or(outcome);
        Ok((head, conditions))
    }

    fn push(&mut self, mut node: DagNode) -> Result<usize, StructuralError> {
        if self.nodes.len() >= self.bound {
            return Err(StructuralError::BoundExceeded { bound: self.bound });
        }
        let id = self.nodes.len();
        node.id = id;
        self.nodes.push(node);
        Ok(id)
    }
}

/// Kahn's algorithm; re-ids nodes by sorted position.
fn topological_sort(nodes: Vec<DagNode>) -> Result<Vec<DagNode>, StructuralError> {
    let mut in_degree = vec![0_usize; nodes.len()];
    for node in &nodes {
        for child in [node.true_child, node.false_child].into_iter().flatten() {
            in_degree[child] += 1;
        }
    }

    let mut queue: VecDeque<usize> = (0..nodes.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut sorted = Vec::with_capacity(nodes.len());

    while let Some(id) = queue.pop_front() {
        let node = &nodes[id];
        for child in [node.true_child, node.false_child].into_iter().flatten() {
            in_degree[child] -= 1;
            if in_degree[child] == 0 {
                queue.push_back(child);
            }
        }
        sorted.push(id);
    }

    if sorted.len() != nodes.len() {
        return Err(StructuralError::Cycle {
            ordered: sorted.len(),
            total: nodes.len(),
        });
    }

    let mut new_id = vec![0_usize; nodes.len()];
    for (pos, &old) in sorted.iter().enumerate() {
        new_id[old] = pos;
    }
    let mut slots: Vec<Option<DagNode>> = nodes.into_iter().map(Some).collect();
    Ok(sorted
        .iter()
        .enumerate()
        .filter_map(|(pos, &old)| {
            slots[old].take().map(|mut node| {
                node.id = pos;
                node.true_child = node.true_child.map(|c| new_id[c]);
                node.false_child = node.false_child.map(|c| new_id[c]);
                node
            })
        })
        .collect())
}

fn true_chain_len(nodes: &[DagNode], start: usize) -> usize {
    let mut len = 1;
    let mut cursor = nodes[start].true_child;
    while let Some(id) = cursor {
        len += 1;
        cursor = nodes[id].true_child;
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{parse_dataset, parse_rules};
    use crate::rank_features;

    const DATA: &str = "age,color,size,label\n35,red,2,yes\n20,blue,5,no\n";

    fn compile(rules: &str) -> (Dag, FeatureCatalog) {
        let ds = parse_dataset(DATA, ',', "label").unwrap();
        let list = parse_rules(rules, ds.catalog()).unwrap();
        let order: Vec<usize> = rank_features(&list, ds.catalog())
            .iter()
            .map(|r| r.feature)
            .collect();
        let dag = Dag::compile(&list, ds.catalog(), &order).unwrap();
        (dag, ds.catalog().clone())
    }

    fn assert_topological(dag: &Dag) {
        for (i, node) in dag.nodes().iter().enumerate() {
            assert_eq!(node.id, i);
            for child in [node.true_child, node.false_child].into_iter().flatten() {
                assert!(child > node.id, "edge {} -> {child} not increasing", node.id);
            }
            if node.is_outcome() {
                assert!(node.true_child.is_none() && node.false_child.is_none());
            }
        }
    }

    #[test]
    fn default_only_list() {
        let (dag, catalog) = compile("else no (1/1)");
        assert_eq!(dag.len(), 1);
        assert_eq!(dag.depth(), 1);
        assert_eq!(dag.height(), 1);
        assert_eq!(dag.rule_roots(), &[0]);
        assert_eq!(dag.node(0).feature, catalog.label_index());
        assert_eq!(dag.node(0).value, Value::from("no"));
    }

    #[test]
    fn single_condition_rule() {
        let (dag, _) = compile("if age >= 30 then yes (80/20)\nelse no (10/90)");
        assert_topological(&dag);
        assert_eq!(dag.len(), 3);
        let root = dag.node(dag.root());
        assert_eq!(root.kind, NodeKind::Condition(CompareOp::Gte));
        assert_eq!(root.value, Value::Number(30.0));
        let yes = dag.node(root.true_child.unwrap());
        let no = dag.node(root.false_child.unwrap());
        assert_eq!(yes.value, Value::from("yes"));
        assert_eq!(no.value, Value::from("no"));
        assert_eq!(dag.depth(), 2);
        assert_eq!(dag.height(), 2);
    }

    #[test]
    fn conditions_follow_ranked_order() {
        // size ranks above age, so it is tested first
        let (dag, catalog) = compile(
            "if age > 30 and size < 3 then yes (1/1)\nif size < 3 then yes (9/1)\nelse no (1/1)",
        );
        assert_topological(&dag);
        let root = dag.node(0);
        assert_eq!(catalog.feature(root.feature).name(), "size");
        let second = dag.node(root.true_child.unwrap());
        assert_eq!(catalog.feature(second.feature).name(), "age");
        assert_eq!(dag.depth(), 3);
    }

    #[test]
    fn false_edges_share_next_rule_node() {
        let (dag, _) = compile(
            "if age > 30 and color = red then yes (5/1)\nif color = blue then no (4/1)\nelse no (1/1)",
        );
        assert_topological(&dag);
        let root = dag.node(0);
        let second = dag.node(root.true_child.unwrap());
        assert!(!second.is_outcome());
        assert_eq!(root.false_child, second.false_child);
        let next_rule = dag.node(root.false_child.unwrap());
        assert_eq!(next_rule.rule, 1);
        assert_eq!(next_rule.value, Value::from("blue"));
        let blue_nodes = dag
            .nodes()
            .iter()
            .filter(|n| n.value == Value::from("blue"))
            .count();
        assert_eq!(blue_nodes, 1);
    }

    #[test]
    fn outcome_nodes_shared_by_label() {
        let (dag, _) = compile(
            "if age > 30 then yes (5/1)\nif color = red then yes (4/1)\nif size > 3 then no (1/1)\nelse no (1/1)",
        );
        assert_topological(&dag);
        assert_eq!(dag.height(), 2);
        assert_eq!(dag.len(), 5);
        assert_eq!(dag.rule_roots().len(), 4);
    }

    #[test]
    fn long_list_compiles_without_recursion() {
        let ds = parse_dataset("x,label\n1,a\n2,b\n", ',', "label").unwrap();
        let mut text = String::new();
        for i in 0..20_000 {
            text.push_str(&format!("if x = {i} then a (1/1)\n"));
        }
        text.push_str("else b (1/1)\n");
        let list = parse_rules(&text, ds.catalog()).unwrap();
        let order: Vec<usize> = rank_features(&list, ds.catalog())
            .iter()
            .map(|r| r.feature)
            .collect();

        let dag = Dag::compile(&list, ds.catalog(), &order).unwrap();
        assert_eq!(dag.len(), 20_002);
        assert_eq!(dag.rule_roots().len(), 20_001);
        assert_eq!(dag.depth(), 2);
        assert_eq!(dag.height(), 2);
        assert_topological(&dag);
    }

    #[test]
    fn identical_tests_in_different_rules_are_not_merged() {
        let (dag, _) = compile("if age > 30 then yes (5/1)\nif age > 30 then no (1/1)\nelse no (1/1)");
        let age_nodes = dag.nodes().iter().filter(|n| !n.is_outcome()).count();
        assert_eq!(age_nodes, 2);
    }

    #[test]
    fn unranked_feature_is_structural_error() {
        let ds = parse_dataset(DATA, ',', "label").unwrap();
        let list = parse_rules("if age > 3 then yes (1/1)\nelse no (1/1)", ds.catalog()).unwrap();
        let err = Dag::compile(&list, ds.catalog(), &[ds.catalog().label_index()]).unwrap_err();
        assert!(matches!(err, StructuralError::UnrankedFeature { rule: 0, .. }));
    }

    #[test]
    fn cycle_is_detected() {
        let node = |id, true_child| DagNode {
            id,
            rule: 0,
            feature: 0,
            value: Value::Number(1.0),
            kind: NodeKind::Condition(CompareOp::Eq),
            true_child,
            false_child: None,
        };
        let err = topological_sort(vec![node(0, Some(1)), node(1, Some(0))]).unwrap_err();
        assert!(matches!(err, StructuralError::Cycle { ordered: 0, total: 2 }));
    }
}
