use std::collections::BTreeSet;
use shared::{Predicate, Rule};
use crate::reasoning::classification::ClassificationResult;

/// Contains a method to convert a specific data structure into a representation in the DOT language
/// For better visualisation
pub trait ToDot {
    fn to_dot(&self) -> String;
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

fn node_id(predicate: &Predicate) -> String {
    format!("\"{}\"", escape(&predicate.to_string()))
}

fn create_nodes(classification: &ClassificationResult, out: &mut String) {
    let mut predicates: BTreeSet<&Predicate> = BTreeSet::new();
    predicates.extend(classification.edb().keys());
    predicates.extend(classification.idb());
    predicates.extend(classification.aliased_predicates());
    predicates.extend(classification.aliased_sources().values());
    predicates.extend(classification.rules().iter().flat_map(|rule| rule.predicates()));

    for predicate in predicates {
        let id = node_id(predicate);
        if let Some(source) = classification.primary_source(predicate) {
            out.push_str(&format!(
                "{} [label=\"{}\\n{}\", shape=box]\n",
                id,
                escape(&predicate.to_string()),
                escape(&source.to_string())
            ));
        } else if classification.is_alias(predicate) {
            out.push_str(&format!("{} [shape=box, style=dashed]\n", id));
        } else {
            out.push_str(&format!("{} [shape=ellipse]\n", id));
        }
    }
}

fn rule_edges(rule: &Rule, style: &str, out: &mut String) {
    for head in rule.head_predicates() {
        for literal in rule.body().iter() {
            let negation = if literal.is_negated() { ", color=red, label=\"not\"" } else { "" };
            out.push_str(&format!(
                "{} -> {} [{}{}]\n",
                node_id(literal.predicate()),
                node_id(head),
                style,
                negation
            ));
        }
    }
}

/// Dependency graph of the predicates: data flows from body predicates to head predicates,
/// bridging rules are drawn dashed.
impl ToDot for ClassificationResult {
    fn to_dot(&self) -> String {
        let mut out = String::new();
        out.push_str("digraph {\n");

        create_nodes(self, &mut out);

        out.push('\n'); // Whitespace between nodes and relations

        for rule in self.rules() {
            rule_edges(rule, "style=solid", &mut out);
        }
        for rule in self.bridging_rules() {
            rule_edges(rule, "style=dashed", &mut out);
        }

        out.push('}');
        out
    }
}
