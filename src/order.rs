//! Declaration order for attribute specification records
//!
//! A dimension table points at the specs of other attributes, so those specs
//! must be declared first. The order is input order with each attribute
//! pulled behind its dimension attributes; inputs that already satisfy this
//! come out unchanged.

use std::collections::HashMap;

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::diagnostics::Diagnostics;

/// Compute the declaration order of `dimension_refs.len()` attributes.
///
/// `names[i]` is the name of attribute `i`; `dimension_refs[i]` lists the
/// names it uses as dimensions. Names that match no attribute are ignored
/// here. Cycles are reported and broken by input order.
pub fn declaration_order(
    names: &[&str],
    dimension_refs: &[Vec<String>],
    diagnostics: &mut Diagnostics,
) -> Vec<usize> {
    let mut first_index: HashMap<&str, usize> = HashMap::with_capacity(names.len());
    for (idx, name) in names.iter().enumerate() {
        first_index.entry(*name).or_insert(idx);
    }

    let deps: Vec<Vec<usize>> = dimension_refs
        .iter()
        .map(|refs| refs.iter().filter_map(|r| first_index.get(r.as_str()).copied()).collect())
        .collect();

    report_cycles(names, &deps, diagnostics);

    let mut state = vec![Visit::Pending; names.len()];
    let mut order = Vec::with_capacity(names.len());
    for idx in 0..names.len() {
        visit(idx, &deps, &mut state, &mut order);
    }
    order
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Pending,
    InProgress,
    Done,
}

/// Post-order walk from `root`, dependencies in listed order.
///
/// Uses an explicit stack of `(node, next dependency)` frames so that long
/// dimension chains don't grow the call stack.
fn visit(root: usize, deps: &[Vec<usize>], state: &mut [Visit], order: &mut Vec<usize>) {
    if state[root] != Visit::Pending {
        return;
    }
    state[root] = Visit::InProgress;
    let mut stack: Vec<(usize, usize)> = vec![(root, 0)];

    while let Some(frame) = stack.last_mut() {
        let (idx, next) = *frame;
        match deps[idx].get(next) {
            Some(&dep) => {
                frame.1 += 1;
                if state[dep] == Visit::Pending {
                    state[dep] = Visit::InProgress;
                    stack.push((dep, 0));
                }
            }
            None => {
                stack.pop();
                state[idx] = Visit::Done;
                order.push(idx);
            }
        }
    }
}

fn report_cycles(names: &[&str], deps: &[Vec<usize>], diagnostics: &mut Diagnostics) {
    let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(names.len(), names.len());
    let nodes: Vec<NodeIndex> = (0..names.len()).map(|idx| graph.add_node(idx)).collect();
    for (from, targets) in deps.iter().enumerate() {
        for &to in targets {
            graph.add_edge(nodes[from], nodes[to], ());
        }
    }

    let mut cycles: Vec<Vec<usize>> = kosaraju_scc(&graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
        .map(|scc| {
            let mut members: Vec<usize> = scc.iter().map(|n| graph[*n]).collect();
            members.sort_unstable();
            members
        })
        .collect();
    cycles.sort();

    for members in cycles {
        let cycle: Vec<String> = members.iter().map(|&i| names[i].to_string()).collect();
        diagnostics.dimension_cycle(&cycle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticCode;

    fn refs(list: &[&[&str]]) -> Vec<Vec<String>> {
        list.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_sorted_input_is_unchanged() {
        let mut diags = Diagnostics::new();
        let order = declaration_order(
            &["n", "m", "grid"],
            &refs(&[&[], &[], &["n", "m"]]),
            &mut diags,
        );
        assert_eq!(order, vec![0, 1, 2]);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_dimension_pulled_forward() {
        let mut diags = Diagnostics::new();
        let order = declaration_order(
            &["grid", "title", "n"],
            &refs(&[&["n"], &[], &[]]),
            &mut diags,
        );
        assert_eq!(order, vec![2, 0, 1]);
    }

    #[test]
    fn test_unknown_dimension_ignored() {
        let mut diags = Diagnostics::new();
        let order = declaration_order(&["grid"], &refs(&[&["ghost"]]), &mut diags);
        assert_eq!(order, vec![0]);
    }

    #[test]
    fn test_cycle_reported_and_broken() {
        let mut diags = Diagnostics::new();
        let order = declaration_order(
            &["a", "b", "c"],
            &refs(&[&["b"], &["a"], &["c"]]),
            &mut diags,
        );
        assert_eq!(order, vec![1, 0, 2]);

        let cycles: Vec<_> = diags.with_code(DiagnosticCode::DimensionCycle).collect();
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0].context, vec!["cycle: a -> b".to_string()]);
        assert_eq!(cycles[1].context, vec!["cycle: c".to_string()]);
    }

    #[test]
    fn test_long_dimension_chain() {
        // a0 uses a1 uses a2 ... so the whole chain is declared back to front
        let count = 100_000;
        let names: Vec<String> = (0..count).map(|i| format!("a{}", i)).collect();
        let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let dims: Vec<Vec<String>> = (0..count)
            .map(|i| {
                if i + 1 < count {
                    vec![format!("a{}", i + 1)]
                } else {
                    Vec::new()
                }
            })
            .collect();

        let mut diags = Diagnostics::new();
        let order = declaration_order(&name_refs, &dims, &mut diags);

        assert_eq!(order, (0..count).rev().collect::<Vec<_>>());
        assert!(diags.is_empty());
    }
}
