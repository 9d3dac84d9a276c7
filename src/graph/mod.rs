// src/graph/mod.rs

//! Shared-library dependency graph construction
//!
//! Builds the transitive soname requirement graph for one starting binary
//! by expanding dynamic-linker dependency listings depth-first. Nodes are
//! keyed by soname and created once on first discovery; the visited record
//! is owned by a single `build` invocation, so repeated or concurrent
//! builds never leak state between runs.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// One shared library (or the root binary) in the requirement graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyNode {
    /// Soname for libraries, basename for the root binary
    pub soname: String,
    /// Path the dynamic linker resolved the soname to, when it did
    pub path: Option<String>,
    pub resolved: bool,
}

/// Directed edge: `from` requires `to`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub from: String,
    pub to: String,
}

/// Soname requirement graph, reachable from one root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SonameGraph {
    pub root: String,
    nodes: HashMap<String, DependencyNode>,
    /// Discovery order of node keys, for reproducible iteration
    order: Vec<String>,
    edges: Vec<DependencyEdge>,
}

impl SonameGraph {
    pub fn new(root: impl Into<String>) -> Self {
        let root = root.into();
        let mut graph = Self {
            root: root.clone(),
            nodes: HashMap::new(),
            order: Vec::new(),
            edges: Vec::new(),
        };
        graph.add_node(DependencyNode {
            soname: root,
            path: None,
            resolved: true,
        });
        graph
    }

    /// Insert a node unless one with the same soname already exists
    pub fn add_node(&mut self, node: DependencyNode) {
        if !self.nodes.contains_key(&node.soname) {
            self.order.push(node.soname.clone());
            self.nodes.insert(node.soname.clone(), node);
        }
    }

    /// Add an edge, ignoring exact duplicates. Multiple edges into the same
    /// node from different dependents are legal (shared dependency).
    pub fn add_edge(&mut self, from: &str, to: &str) {
        let edge = DependencyEdge {
            from: from.to_string(),
            to: to.to_string(),
        };
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
    }

    pub fn node(&self, soname: &str) -> Option<&DependencyNode> {
        self.nodes.get(soname)
    }

    pub fn contains(&self, soname: &str) -> bool {
        self.nodes.contains_key(soname)
    }

    /// All node keys in discovery order, root first
    pub fn sonames(&self) -> &[String] {
        &self.order
    }

    /// Sonames the root transitively requires (every node except the root),
    /// in discovery order
    pub fn required_sonames(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|s| **s != self.root)
            .cloned()
            .collect()
    }

    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    /// Edges pointing into the given node
    pub fn incoming(&self, soname: &str) -> Vec<&DependencyEdge> {
        self.edges.iter().filter(|e| e.to == soname).collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Dependency listing collaborator: answers with the raw dynamic-linker
/// output (`soname => path (0xADDR)` lines) for one binary or library.
pub trait DependencyLister {
    fn list_dependencies(&self, target: &str) -> Result<String>;
}

/// Parse one dependency-listing line into `(soname, resolved path)`.
///
/// Lines without `=>` are skipped; a target that is not an absolute path
/// (e.g. `not found`) leaves the soname unresolved.
pub fn parse_dependency_line(line: &str) -> Option<(String, Option<String>)> {
    let line = line.trim();
    let (before, after) = line.split_once("=>")?;
    let soname = before.split_whitespace().next()?.to_string();
    let path = after
        .split_whitespace()
        .next()
        .filter(|t| t.starts_with('/'))
        .map(str::to_string);
    Some((soname, path))
}

/// Depth-first graph builder over a dependency-listing collaborator
pub struct GraphBuilder<'a, L: DependencyLister + ?Sized> {
    lister: &'a L,
}

impl<'a, L: DependencyLister + ?Sized> GraphBuilder<'a, L> {
    pub fn new(lister: &'a L) -> Self {
        Self { lister }
    }

    /// Build the full transitive requirement graph for `root`.
    ///
    /// The visited set lives on this call's stack; two independent builds
    /// on identical input produce identical node and edge sets.
    pub fn build(&self, root: &str) -> Result<SonameGraph> {
        let root_name = root.rsplit('/').next().unwrap_or(root).to_string();
        let mut graph = SonameGraph::new(root_name.clone());
        let mut visited = HashSet::new();
        visited.insert(root_name.clone());

        let listing = self.lister.list_dependencies(root)?;
        self.expand(&root_name, &listing, &mut graph, &mut visited);

        debug!(
            root = %root,
            nodes = graph.node_count(),
            edges = graph.edges().len(),
            "dependency graph sealed"
        );
        Ok(graph)
    }

    fn expand(
        &self,
        from: &str,
        listing: &str,
        graph: &mut SonameGraph,
        visited: &mut HashSet<String>,
    ) {
        for line in listing.lines() {
            let Some((soname, path)) = parse_dependency_line(line) else {
                continue;
            };

            graph.add_node(DependencyNode {
                soname: soname.clone(),
                path: path.clone(),
                resolved: path.is_some(),
            });
            graph.add_edge(from, &soname);

            // Visited nodes are never re-expanded; recursion depth is
            // bounded by the number of distinct sonames.
            if !visited.insert(soname.clone()) {
                continue;
            }

            let Some(target) = path else {
                debug!(soname = %soname, "soname unresolved, kept as leaf");
                continue;
            };

            match self.lister.list_dependencies(&target) {
                Ok(child_listing) => self.expand(&soname, &child_listing, graph, visited),
                // A dependency the linker resolved but we cannot re-list
                // degrades to a leaf instead of failing the whole build.
                Err(err) => warn!(soname = %soname, error = %err, "dependency listing failed"),
            }
        }
    }
}
