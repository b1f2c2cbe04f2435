use crate::condition::parse_condition;
use crate::flow::{FlowDocument, RuleTarget};
use crate::report::{Diagnostic, DiagnosticCode, Diagnostics, Location, StageReport};
use ahash::{AHashMap, AHashSet};
use serde_json::json;

/// Stage 4: the document as a directed graph.
///
/// Steps are nodes; every `Proceed` rule target contributes an edge. This
/// stage checks the global properties the earlier stages cannot see:
/// cycles, reachability from the entry step, presence of a terminal step,
/// condition well-formedness and completion rules on manual steps.
#[derive(Debug, Default)]
pub struct FlowValidator;

impl FlowValidator {
    pub fn new() -> Self {
        FlowValidator
    }

    pub fn validate(&self, document: &FlowDocument) -> StageReport<()> {
        let mut diags = Diagnostics::default();
        let steps_loc = Location::root().key("steps");

        let step_ids: AHashSet<&str> = document.steps.iter().map(|s| s.id.as_str()).collect();

        // Node per step, edge per resolvable Proceed target. The semantic
        // stage has already flagged unresolvable targets.
        let mut adjacency: AHashMap<&str, Vec<&str>> = AHashMap::new();
        for step in &document.steps {
            let targets = adjacency.entry(step.id.as_str()).or_default();
            for rule in &step.rules {
                if let RuleTarget::Proceed { step_id } = &rule.target
                    && step_ids.contains(step_id.as_str())
                {
                    targets.push(step_id.as_str());
                }
            }
        }

        for cycle in self.find_cycles(document, &adjacency) {
            diags.push(
                Diagnostic::new(
                    DiagnosticCode::FlowCircularDependency,
                    steps_loc.clone(),
                    format!("Steps form a circular dependency: {}", cycle.join(" -> ")),
                )
                .with_details(json!({ "cycle": cycle })),
            );
        }

        self.check_reachability(document, &adjacency, &steps_loc, &mut diags);

        if !document.steps.iter().any(|s| s.final_step) {
            diags.push(Diagnostic::new(
                DiagnosticCode::FlowNoFinalStep,
                Location::root(),
                "No step is marked as final_step; the flow has no explicit terminal state",
            ));
        }

        for (step_idx, step) in document.steps.iter().enumerate() {
            let step_loc = steps_loc.index(step_idx);

            for (rule_idx, rule) in step.rules.iter().enumerate() {
                let condition = rule.condition.trim();
                if condition.is_empty() {
                    continue;
                }
                if let Err(e) = parse_condition(condition) {
                    diags.push(
                        Diagnostic::new(
                            DiagnosticCode::FlowInvalidCondition,
                            step_loc.key("rules").index(rule_idx).key("condition"),
                            format!("Condition in step '{}' is not well formed: {}", step.id, e),
                        )
                        .with_details(json!({ "offset": e.offset() })),
                    );
                }
            }

            // A step the user must complete by hand needs at least one rule
            // to move the flow forward.
            if step.auto_proceed == Some(false) && step.rules.is_empty() {
                diags.push(Diagnostic::new(
                    DiagnosticCode::FlowNoCompletionRule,
                    step_loc,
                    format!(
                        "Step '{}' is marked auto_proceed = false but defines no completion rules",
                        step.id
                    ),
                ));
            }
        }

        diags.into_report(())
    }

    /// Depth-first cycle search. Every node is expanded at most once, so
    /// each back edge is reported exactly once, as the full path from the
    /// first on-path occurrence back to the repeated node.
    fn find_cycles<'a>(
        &self,
        document: &'a FlowDocument,
        adjacency: &AHashMap<&'a str, Vec<&'a str>>,
    ) -> Vec<Vec<&'a str>> {
        let mut visited: AHashSet<&str> = AHashSet::new();
        let mut cycles = Vec::new();

        for step in &document.steps {
            if !visited.contains(step.id.as_str()) {
                let mut path = Vec::new();
                Self::dfs(
                    step.id.as_str(),
                    adjacency,
                    &mut visited,
                    &mut path,
                    &mut cycles,
                );
            }
        }

        cycles
    }

    fn dfs<'a>(
        node: &'a str,
        adjacency: &AHashMap<&'a str, Vec<&'a str>>,
        visited: &mut AHashSet<&'a str>,
        path: &mut Vec<&'a str>,
        cycles: &mut Vec<Vec<&'a str>>,
    ) {
        visited.insert(node);
        path.push(node);

        for &next in adjacency.get(node).into_iter().flatten() {
            if let Some(pos) = path.iter().position(|&n| n == next) {
                let mut cycle: Vec<&str> = path[pos..].to_vec();
                cycle.push(next);
                cycles.push(cycle);
            } else if !visited.contains(next) {
                Self::dfs(next, adjacency, visited, path, cycles);
            }
        }

        path.pop();
    }

    /// Marks every step reachable by following rule edges from the entry
    /// step (lowest `sequence`), then warns on the rest.
    fn check_reachability(
        &self,
        document: &FlowDocument,
        adjacency: &AHashMap<&str, Vec<&str>>,
        steps_loc: &Location,
        diags: &mut Diagnostics,
    ) {
        let Some(entry) = document.entry_step() else {
            return;
        };

        let mut reached: AHashSet<&str> = AHashSet::new();
        let mut stack = vec![entry.id.as_str()];
        while let Some(node) = stack.pop() {
            if !reached.insert(node) {
                continue;
            }
            for &next in adjacency.get(node).into_iter().flatten() {
                if !reached.contains(next) {
                    stack.push(next);
                }
            }
        }

        for (step_idx, step) in document.steps.iter().enumerate() {
            if !reached.contains(step.id.as_str()) {
                diags.push(Diagnostic::new(
                    DiagnosticCode::FlowUnreachableStep,
                    steps_loc.index(step_idx),
                    format!(
                        "Step '{}' cannot be reached from the entry step '{}'",
                        step.id, entry.id
                    ),
                ));
            }
        }
    }
}
