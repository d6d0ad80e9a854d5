//! Sheet-level dependency graph and circular reference detection
//!
//! Each formula cell points at the cells its formula reads. Range references
//! contribute only their two endpoints (`A1:A10` adds `A1` and `A10`); interior
//! cells are not enumerated. Addresses are normalized (`$` removed, uppercased)
//! so `$A$1` and `A1` are the same node.
//!
//! Two searches are available and flag the same cells:
//!
//! - [`CycleStrategy::PathCopy`] runs a depth-first search per formula cell and
//!   gives every expansion its own copy of the visited path, so a cell reached
//!   through one branch never prunes another. This is exponential on dense,
//!   highly cyclic graphs and quadratic on long chains. A per-cell work budget
//!   bounds it: once one search runs out, that cell and every cell not yet
//!   searched are answered from the strongly connected components.
//! - [`CycleStrategy::StronglyConnected`] computes strongly connected components
//!   (iterative Tarjan) once and flags every member of a component with more than
//!   one cell, plus cells that reference themselves. Linear time.

use crate::inspector::{analyze_formula, FormulaAnalysis};
use ahash::{AHashMap, AHashSet};
use sheetlint_core::address::{normalize_address, range_endpoints};
use std::collections::BTreeSet;

/// Default work allowed per start cell in the path-copying search
pub const DEFAULT_VISIT_BUDGET: usize = 100_000;

/// Cycle search algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStrategy {
    /// Per-cell path-copying depth-first search; `visit_budget` bounds the work
    /// spent on one start cell
    PathCopy { visit_budget: usize },
    /// One pass of strongly connected component detection
    StronglyConnected,
}

impl Default for CycleStrategy {
    fn default() -> Self {
        CycleStrategy::PathCopy {
            visit_budget: DEFAULT_VISIT_BUDGET,
        }
    }
}

/// Cells found to lie on at least one dependency cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CircularReferenceReport {
    cells: BTreeSet<String>,
}

impl CircularReferenceReport {
    pub fn contains(&self, cell: &str) -> bool {
        self.cells.contains(&normalize_address(cell))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Flagged cells in address-text order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(String::as_str)
    }
}

impl IntoIterator for CircularReferenceReport {
    type Item = String;
    type IntoIter = std::collections::btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.into_iter()
    }
}

/// Dependency graph for the formula cells of one sheet
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    /// Formula cell → cells it reads
    precedents: AHashMap<String, AHashSet<String>>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from `(cell, formula text)` pairs
    pub fn from_formulas<'a, I>(formulas: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut graph = Self::new();
        for (cell, formula) in formulas {
            graph.add_formula(cell, &analyze_formula(formula));
        }
        graph
    }

    /// Record the dependencies of the formula in `cell`
    pub fn add_formula(&mut self, cell: &str, analysis: &FormulaAnalysis) {
        let cell = normalize_address(cell);
        let edges = self.precedents.entry(cell).or_default();
        edges.extend(analysis.dependencies.iter().map(|d| normalize_address(d)));
        for range in &analysis.used_ranges {
            if let Some((first, last)) = range_endpoints(range) {
                // `A1:` has no second endpoint
                edges.extend(
                    [first, last]
                        .into_iter()
                        .map(normalize_address)
                        .filter(|endpoint| !endpoint.is_empty()),
                );
            }
        }
    }

    /// Add a dependency: `cell` reads `dependency`
    pub fn add_dependency(&mut self, cell: &str, dependency: &str) {
        self.precedents
            .entry(normalize_address(cell))
            .or_default()
            .insert(normalize_address(dependency));
    }

    /// Cells the given cell depends on
    pub fn precedents(&self, cell: &str) -> impl Iterator<Item = &str> + '_ {
        self.precedents
            .get(&normalize_address(cell))
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Number of formula cells recorded
    pub fn len(&self) -> usize {
        self.precedents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.precedents.is_empty()
    }

    fn has_outgoing(&self, cell: &str) -> bool {
        self.precedents.get(cell).map_or(false, |set| !set.is_empty())
    }

    /// Find every cell on a cycle using the default strategy
    pub fn find_circular_references(&self) -> CircularReferenceReport {
        self.find_circular_references_with(CycleStrategy::default())
    }

    /// Find every cell on a cycle with one strongly connected component pass
    pub fn find_circular_references_scc(&self) -> CircularReferenceReport {
        self.find_circular_references_with(CycleStrategy::StronglyConnected)
    }

    pub fn find_circular_references_with(&self, strategy: CycleStrategy) -> CircularReferenceReport {
        let cells = match strategy {
            CycleStrategy::PathCopy { visit_budget } => self.path_copy_search(visit_budget),
            CycleStrategy::StronglyConnected => self.cyclic_components(),
        };
        tracing::debug!(
            "dependency graph: {} formula cells, {} on cycles",
            self.len(),
            cells.len()
        );
        CircularReferenceReport {
            cells: cells.into_iter().map(str::to_string).collect(),
        }
    }

    fn path_copy_search(&self, visit_budget: usize) -> AHashSet<&str> {
        let mut flagged = AHashSet::new();
        // Once one search runs out of budget, the components answer the rest
        let mut fallback: Option<AHashSet<&str>> = None;

        for start in self.precedents.keys().map(String::as_str) {
            if !self.has_outgoing(start) {
                continue;
            }
            let on_cycle = match &fallback {
                Some(cyclic) => cyclic.contains(start),
                None => match self.reaches_itself(start, visit_budget) {
                    Some(found) => found,
                    None => {
                        tracing::warn!(
                            "cycle search from {start} exceeded its budget of {visit_budget}; \
                             using strongly connected components for the remaining cells"
                        );
                        fallback
                            .get_or_insert_with(|| self.cyclic_components())
                            .contains(start)
                    }
                },
            };
            if on_cycle {
                flagged.insert(start);
            }
        }
        flagged
    }

    /// Depth-first search from `start` for a path back to `start`.
    ///
    /// Each expansion costs one unit plus the length of the path it copies.
    /// Returns `None` when the budget runs out before the search completes.
    fn reaches_itself(&self, start: &str, visit_budget: usize) -> Option<bool> {
        let mut root_path = AHashSet::new();
        root_path.insert(start);
        let mut stack: Vec<(&str, AHashSet<&str>)> = vec![(start, root_path)];
        let mut spent = 0usize;

        while let Some((cell, path)) = stack.pop() {
            spent += 1;
            if spent > visit_budget {
                return None;
            }
            tracing::trace!("cycle search from {start}: expanding {cell}");

            let Some(precedents) = self.precedents.get(cell) else {
                continue;
            };
            for dep in precedents.iter().map(String::as_str) {
                if dep == start {
                    return Some(true);
                }
                if path.contains(dep) || !self.has_outgoing(dep) {
                    continue;
                }
                spent += path.len();
                let mut branch = path.clone();
                branch.insert(dep);
                stack.push((dep, branch));
            }
        }
        Some(false)
    }

    /// Members of strongly connected components that contain a cycle
    fn cyclic_components(&self) -> AHashSet<&str> {
        let cells: Vec<&str> = self
            .precedents
            .iter()
            .filter(|(_, deps)| !deps.is_empty())
            .map(|(cell, _)| cell.as_str())
            .collect();
        let position: AHashMap<&str, usize> =
            cells.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        let adjacency: Vec<Vec<usize>> = cells
            .iter()
            .map(|cell| {
                self.precedents(cell)
                    .filter_map(|dep| position.get(dep).copied())
                    .collect()
            })
            .collect();

        let mut cyclic = AHashSet::new();
        for component in tarjan(&adjacency) {
            let is_cycle = match component.as_slice() {
                [single] => adjacency[*single].contains(single),
                _ => true,
            };
            if is_cycle {
                cyclic.extend(component.into_iter().map(|i| cells[i]));
            }
        }
        cyclic
    }
}

/// Strongly connected components of a graph given as adjacency lists
fn tarjan(adjacency: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let n = adjacency.len();
    let mut index: Vec<Option<usize>> = vec![None; n];
    let mut lowlink = vec![0usize; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    let mut components = Vec::new();
    let mut next_index = 0usize;

    for root in 0..n {
        if index[root].is_some() {
            continue;
        }

        // (node, next child position)
        let mut call: Vec<(usize, usize)> = vec![(root, 0)];
        index[root] = Some(next_index);
        lowlink[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;

        while let Some(&(v, child)) = call.last() {
            if let Some(&w) = adjacency[v].get(child) {
                if let Some(frame) = call.last_mut() {
                    frame.1 += 1;
                }
                match index[w] {
                    None => {
                        index[w] = Some(next_index);
                        lowlink[w] = next_index;
                        next_index += 1;
                        stack.push(w);
                        on_stack[w] = true;
                        call.push((w, 0));
                    }
                    Some(w_index) if on_stack[w] => {
                        lowlink[v] = lowlink[v].min(w_index);
                    }
                    Some(_) => {}
                }
                continue;
            }

            call.pop();
            if let Some(&(parent, _)) = call.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[v]);
            }
            if index[v] == Some(lowlink[v]) {
                let mut component = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    component.push(w);
                    if w == v {
                        break;
                    }
                }
                components.push(component);
            }
        }
    }

    components
}
