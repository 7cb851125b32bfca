//! Logic graph analysis.
//!
//! Navigation actions (`jump`, `skip`) are edges from a rule's trigger
//! field to the action's target. The graph must be acyclic: a cycle lets a
//! respondent loop forever between pages. `show`, `hide` and `set_value`
//! never move the respondent and are not part of the graph.

use std::collections::{HashMap, HashSet};

use form_types::{FieldId, Form, LogicRule, RuleId, Severity};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::references::ReferenceType;

// ── Findings ────────────────────────────────────────────────────────────

/// A closed navigation loop.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CyclePath {
    /// Field ids along the loop; the last entry repeats the first.
    pub path: Vec<FieldId>,
    /// Rule contributing each edge of `path`, in the same order.
    pub rules: Vec<RuleId>,
}

impl CyclePath {
    /// Whether `field_id` lies on the loop.
    pub fn contains(&self, field_id: &str) -> bool {
        self.path.iter().any(|f| f.as_str() == field_id)
    }
}

impl std::fmt::Display for CyclePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", join_path(&self.path))
    }
}

/// A problem in the logic rule set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogicError {
    /// Navigation actions form a loop.
    #[error("logic cycle: {cycle}")]
    Cycle { cycle: CyclePath },

    /// A rule names a field that does not exist on the form.
    #[error("rule {rule_id} references missing field {field_id} in {reference}")]
    DanglingReference {
        rule_id: RuleId,
        field_id: FieldId,
        reference: ReferenceType,
    },
}

impl LogicError {
    pub fn severity(&self) -> Severity {
        match self {
            Self::Cycle { .. } => Severity::Blocking,
            Self::DanglingReference { .. } => Severity::Warning,
        }
    }
}

fn join_path(path: &[FieldId]) -> String {
    path.iter()
        .map(FieldId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

// ── Graph ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug)]
struct Edge<'a> {
    to: &'a FieldId,
    rule: &'a RuleId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Directed graph of navigation edges, borrowed from a rule set.
#[derive(Debug, Default)]
pub struct NavigationGraph<'a> {
    /// Trigger fields in rule order; traversal starts from these.
    roots: Vec<&'a FieldId>,
    edges: HashMap<&'a str, Vec<Edge<'a>>>,
    edge_count: usize,
}

impl<'a> NavigationGraph<'a> {
    /// Build the graph from `jump` / `skip` actions. Rules without a
    /// trigger contribute no edges.
    pub fn from_rules(rules: &'a [LogicRule]) -> Self {
        let mut graph = Self::default();
        let mut seen_roots: HashSet<&str> = HashSet::new();

        for rule in rules {
            let Some(trigger) = rule.trigger() else {
                continue;
            };
            for target in rule.navigation_targets() {
                if seen_roots.insert(trigger.as_str()) {
                    graph.roots.push(trigger);
                }
                graph.edges.entry(trigger.as_str()).or_default().push(Edge {
                    to: target,
                    rule: &rule.id,
                });
                graph.edge_count += 1;
            }
        }

        graph
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Distinct fields appearing as an edge source or target.
    pub fn node_count(&self) -> usize {
        let mut nodes: HashSet<&str> = self.edges.keys().copied().collect();
        nodes.extend(self.edges.values().flatten().map(|e| e.to.as_str()));
        nodes.len()
    }

    /// Navigation targets reachable in one step from `field_id`.
    pub fn successors(&self, field_id: &str) -> impl Iterator<Item = &'a FieldId> + '_ {
        self.edges_from(field_id).iter().map(|e| e.to)
    }

    fn edges_from(&self, field_id: &str) -> &[Edge<'a>] {
        self.edges.get(field_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every cycle reachable from a trigger field.
    ///
    /// Iterative depth-first search with in-progress / done marking. Each
    /// edge back to an in-progress node closes one cycle; the search keeps
    /// going afterwards so independent loops are all reported. Runs in
    /// O(V + E).
    pub fn find_cycles(&self) -> Vec<CyclePath> {
        let mut marks: HashMap<&str, Mark> = HashMap::new();
        let mut cycles = Vec::new();

        for &root in &self.roots {
            if marks.contains_key(root.as_str()) {
                continue;
            }

            // (node, index of next edge to follow)
            let mut stack: Vec<(&'a FieldId, usize)> = vec![(root, 0)];
            // rule of the edge leading into stack[i + 1]
            let mut via: Vec<&'a RuleId> = Vec::new();
            marks.insert(root.as_str(), Mark::InProgress);

            while let Some(&(node, next)) = stack.last() {
                let edges = self.edges_from(node.as_str());
                let Some(edge) = edges.get(next).copied() else {
                    marks.insert(node.as_str(), Mark::Done);
                    stack.pop();
                    via.pop();
                    continue;
                };
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }

                match marks.get(edge.to.as_str()) {
                    None => {
                        marks.insert(edge.to.as_str(), Mark::InProgress);
                        stack.push((edge.to, 0));
                        via.push(edge.rule);
                    }
                    Some(Mark::InProgress) => {
                        let start = stack
                            .iter()
                            .position(|(n, _)| *n == edge.to)
                            .unwrap_or(0);
                        let mut path: Vec<FieldId> =
                            stack[start..].iter().map(|(n, _)| (*n).clone()).collect();
                        path.push(edge.to.clone());
                        let mut rules: Vec<RuleId> =
                            via[start..].iter().map(|r| (*r).clone()).collect();
                        rules.push(edge.rule.clone());
                        cycles.push(CyclePath { path, rules });
                    }
                    Some(Mark::Done) => {}
                }
            }
        }

        cycles
    }
}

// ── Analysis ────────────────────────────────────────────────────────────

/// Find navigation cycles and dangling field references in the form's
/// logic.
///
/// Cycles come first (blocking), followed by dangling references
/// (warnings). A rule naming a missing field is never fatal to the
/// analysis.
pub fn detect_logic_cycles(form: &Form) -> Vec<LogicError> {
    let graph = NavigationGraph::from_rules(&form.logic);
    let cycles = graph.find_cycles();

    debug!(
        form = %form.id,
        rules = form.logic.len(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        cycles = cycles.len(),
        "Analyzed logic graph"
    );

    let mut errors: Vec<LogicError> = cycles
        .into_iter()
        .map(|cycle| {
            warn!(form = %form.id, path = %cycle, "Logic cycle detected");
            LogicError::Cycle { cycle }
        })
        .collect();

    errors.extend(dangling_references(form));
    errors
}

fn dangling_references(form: &Form) -> Vec<LogicError> {
    let known = form.field_ids();
    let mut found = Vec::new();

    for rule in &form.logic {
        let mut reported: HashSet<(&str, ReferenceType)> = HashSet::new();
        let inputs = rule
            .trigger_field
            .iter()
            .chain(rule.conditions.iter().map(|c| &c.field_id))
            .map(|f| (f, ReferenceType::Condition));
        let outputs = rule
            .actions
            .iter()
            .map(|a| (&a.target, ReferenceType::Action));

        for (field_id, reference) in inputs.chain(outputs) {
            if known.contains(field_id.as_str()) || !reported.insert((field_id.as_str(), reference))
            {
                continue;
            }
            found.push(LogicError::DanglingReference {
                rule_id: rule.id.clone(),
                field_id: field_id.clone(),
                reference,
            });
        }
    }

    found
}
