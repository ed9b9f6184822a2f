//! Import graph and cycle detection.
//!
//! An edge from A → B means "A imports B". Cycles are the strongly connected
//! components with more than one file, plus files that import themselves.

use std::collections::VecDeque;
use std::sync::Arc;

use petgraph::Direction;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};

use super::index::WorkspaceSymbolIndex;
use crate::project::ImportResolver;

/// A circular import chain. `files` starts at the lexicographically smallest
/// URI of the cycle and each file imports the one after it; the last imports
/// the first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportCycle {
    pub files: Vec<Arc<str>>,
}

impl ImportCycle {
    pub fn contains(&self, uri: &str) -> bool {
        self.files.iter().any(|f| f.as_ref() == uri)
    }

    /// `a.proto -> b.proto -> a.proto`
    pub fn describe(&self) -> String {
        let mut names: Vec<&str> = self.files.iter().map(|f| f.as_ref()).collect();
        if let Some(first) = self.files.first() {
            names.push(first);
        }
        names.join(" -> ")
    }
}

/// Directed graph of resolved imports between indexed files.
pub struct ImportGraph {
    graph: DiGraph<Arc<str>, ()>,
    nodes: FxHashMap<Arc<str>, NodeIndex>,
}

impl ImportGraph {
    /// Build the graph of every indexed file, resolving import paths with
    /// `resolver`. Unresolved imports contribute no edge.
    pub fn build(index: &WorkspaceSymbolIndex, resolver: &ImportResolver) -> Self {
        let mut graph = Self {
            graph: DiGraph::new(),
            nodes: FxHashMap::default(),
        };
        for uri in index.uris() {
            graph.add_file(uri.clone());
        }
        for uri in index.uris() {
            for edge in index.import_edges(uri) {
                if let Some(target) = resolver.resolve(uri, &edge.path, index.uris()) {
                    graph.add_import(uri, &target);
                }
            }
        }
        graph
    }

    fn add_file(&mut self, uri: Arc<str>) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(&uri) {
            return idx;
        }
        let idx = self.graph.add_node(uri.clone());
        self.nodes.insert(uri, idx);
        idx
    }

    fn add_import(&mut self, from: &Arc<str>, to: &Arc<str>) {
        let from = self.add_file(from.clone());
        let to = self.add_file(to.clone());
        if !self.graph.contains_edge(from, to) {
            self.graph.add_edge(from, to, ());
        }
    }

    /// All import cycles, sorted by their first file. Every file of a
    /// strongly connected component appears in at least one of them: the
    /// shortest cycle through each member is reported once.
    pub fn cycles(&self) -> Vec<ImportCycle> {
        let mut cycles = Vec::new();
        for component in algo::tarjan_scc(&self.graph) {
            if component.len() == 1 && !self.graph.contains_edge(component[0], component[0]) {
                continue;
            }
            let members: FxHashSet<NodeIndex> = component.iter().copied().collect();
            for &node in &component {
                let files = self.shortest_cycle(node, &members);
                if !files.is_empty() {
                    cycles.push(ImportCycle { files });
                }
            }
        }
        cycles.sort_by(|a, b| a.files.cmp(&b.files));
        cycles.dedup();
        cycles
    }

    /// Breadth-first walk from `start` back to itself, staying inside
    /// `members` and visiting neighbours in URI order. The result is rotated
    /// to begin at its smallest URI.
    fn shortest_cycle(&self, start: NodeIndex, members: &FxHashSet<NodeIndex>) -> Vec<Arc<str>> {
        let mut parent: FxHashMap<NodeIndex, NodeIndex> = FxHashMap::default();
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            let mut next: Vec<NodeIndex> = self
                .graph
                .neighbors_directed(node, Direction::Outgoing)
                .filter(|n| members.contains(n))
                .collect();
            if next.contains(&start) {
                let mut path = vec![node];
                let mut at = node;
                while let Some(&prev) = parent.get(&at) {
                    path.push(prev);
                    at = prev;
                }
                path.reverse();
                let mut files: Vec<Arc<str>> =
                    path.into_iter().map(|n| self.graph[n].clone()).collect();
                let smallest = files
                    .iter()
                    .enumerate()
                    .min_by(|a, b| a.1.cmp(b.1))
                    .map_or(0, |(i, _)| i);
                files.rotate_left(smallest);
                return files;
            }
            next.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
            next.dedup();
            for n in next {
                if n != start && !parent.contains_key(&n) {
                    parent.insert(n, node);
                    queue.push_back(n);
                }
            }
        }
        Vec::new()
    }
}
