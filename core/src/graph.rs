//! The compiled matching graph.
//!
//! A [`Graph`] is the flat form of an expression: two sentinel nodes
//! ([`NodeId::INITIAL`], [`NodeId::TERMINAL`]) plus one node per leaf. Edges
//! carry the capture-group markers crossed when they are traversed.
//!
//! Graphs are produced by [`build_graph`](crate::build_graph) and never mutated
//! afterwards, so one graph can serve any number of concurrent runs.

use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::TokenMatcher;

/// Index of a node inside a [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The entry sentinel. Matching starts here.
    pub const INITIAL: NodeId = NodeId(0);
    /// The exit sentinel. A position with an edge here accepts.
    pub const TERMINAL: NodeId = NodeId(1);

    /// Raw index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::INITIAL => f.write_str("initial"),
            Self::TERMINAL => f.write_str("terminal"),
            NodeId(i) => write!(f, "#{i}"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Edge metadata
// ═══════════════════════════════════════════════════════════════════════════════

/// A capture-group boundary crossed on an edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Marker {
    /// The named group opens.
    Start(String),
    /// The named group closes.
    Stop(String),
}

impl Marker {
    /// The group name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Start(name) | Self::Stop(name) => name,
        }
    }
}

/// Ordered capture markers on one edge.
///
/// The order matters: nested groups close innermost first, and an edge that
/// skips an empty group carries both its `Start` and its `Stop`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Markers(Vec<Marker>);

impl Markers {
    /// No markers.
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns `true` if no group boundary is crossed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Markers in traversal order.
    pub fn iter(&self) -> std::slice::Iter<'_, Marker> {
        self.0.iter()
    }

    /// Names of the groups opened on this edge, in order.
    pub fn start_captures(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().filter_map(|m| match m {
            Marker::Start(name) => Some(name.as_str()),
            Marker::Stop(_) => None,
        })
    }

    /// Names of the groups closed on this edge, in order.
    pub fn stop_captures(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().filter_map(|m| match m {
            Marker::Stop(name) => Some(name.as_str()),
            Marker::Start(_) => None,
        })
    }

    /// `self` followed by `next`. Used when two edges are fused into one.
    #[must_use]
    pub fn merge(&self, next: &Markers) -> Markers {
        let mut merged = self.0.clone();
        merged.extend(next.0.iter().cloned());
        Markers(merged)
    }

    /// `self` followed by `Start(name)`.
    #[must_use]
    pub(crate) fn then_start(&self, name: &str) -> Markers {
        let mut markers = self.0.clone();
        markers.push(Marker::Start(name.to_owned()));
        Markers(markers)
    }

    /// `Stop(name)` followed by `self`.
    #[must_use]
    pub(crate) fn after_stop(&self, name: &str) -> Markers {
        let mut markers = Vec::with_capacity(self.0.len() + 1);
        markers.push(Marker::Stop(name.to_owned()));
        markers.extend(self.0.iter().cloned());
        Markers(markers)
    }
}

impl FromIterator<Marker> for Markers {
    fn from_iter<I: IntoIterator<Item = Marker>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Markers {
    type Item = &'a Marker;
    type IntoIter = std::slice::Iter<'a, Marker>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A directed edge and the markers it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// Destination node.
    pub target: NodeId,
    /// Capture markers crossed on traversal.
    pub markers: Markers,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Graph
// ═══════════════════════════════════════════════════════════════════════════════

/// A node of the compiled graph.
pub enum Node<Tok, Out> {
    /// Entry sentinel.
    Initial,
    /// Exit sentinel.
    Terminal,
    /// One leaf of the source expression.
    Leaf(Arc<dyn TokenMatcher<Tok, Out>>),
}

impl<Tok, Out> Debug for Node<Tok, Out> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initial => f.write_str("Initial"),
            Self::Terminal => f.write_str("Terminal"),
            Self::Leaf(m) => f.debug_tuple("Leaf").field(m).finish(),
        }
    }
}

/// Flat, immutable matching graph.
pub struct Graph<Tok, Out = Tok> {
    nodes: Vec<Node<Tok, Out>>,
    successors: Vec<Vec<Edge>>,
}

impl<Tok, Out> Graph<Tok, Out> {
    /// Assemble a graph. `nodes[0]` must be `Initial`, `nodes[1]` `Terminal`.
    pub(crate) fn from_parts(nodes: Vec<Node<Tok, Out>>, successors: Vec<Vec<Edge>>) -> Self {
        debug_assert_eq!(nodes.len(), successors.len());
        debug_assert!(matches!(nodes.first(), Some(Node::Initial)));
        debug_assert!(matches!(nodes.get(1), Some(Node::Terminal)));
        Self { nodes, successors }
    }

    /// The node at `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this graph.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node<Tok, Out> {
        &self.nodes[id.0]
    }

    /// Outgoing edges of `id`, in a stable order.
    #[must_use]
    pub fn successors(&self, id: NodeId) -> &[Edge] {
        self.successors.get(id.0).map_or(&[], Vec::as_slice)
    }

    /// The matcher of a leaf node, or `None` for sentinels.
    #[must_use]
    pub fn matcher(&self, id: NodeId) -> Option<&dyn TokenMatcher<Tok, Out>> {
        match self.nodes.get(id.0)? {
            Node::Leaf(m) => Some(m.as_ref()),
            Node::Initial | Node::Terminal => None,
        }
    }

    /// Returns `true` if `id` has a direct edge to [`NodeId::TERMINAL`].
    #[must_use]
    pub fn accepts(&self, id: NodeId) -> bool {
        self.successors(id)
            .iter()
            .any(|e| e.target == NodeId::TERMINAL)
    }

    /// Total node count, sentinels included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total edge count.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.successors.iter().map(Vec::len).sum()
    }

    /// All node ids, sentinels first, then leaves in allocation order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Ids of the nodes with an edge into `id`. Computed on demand.
    #[must_use]
    pub fn predecessors(&self, id: NodeId) -> Vec<NodeId> {
        self.node_ids()
            .filter(|&from| self.successors(from).iter().any(|e| e.target == id))
            .collect()
    }
}

impl<Tok, Out> Debug for Graph<Tok, Out> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for id in self.node_ids() {
            let targets: Vec<String> = self
                .successors(id)
                .iter()
                .map(|e| {
                    if e.markers.is_empty() {
                        e.target.to_string()
                    } else {
                        format!("{} {:?}", e.target, e.markers.0)
                    }
                })
                .collect();
            map.entry(&format_args!("{id} {:?}", self.node(id)), &targets);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExactMatcher;

    fn start(n: &str) -> Marker {
        Marker::Start(n.into())
    }

    fn stop(n: &str) -> Marker {
        Marker::Stop(n.into())
    }

    #[test]
    fn markers_split_into_start_and_stop_lists() {
        let m: Markers = [stop("b"), stop("a"), start("c")].into_iter().collect();
        assert_eq!(m.stop_captures().collect::<Vec<_>>(), ["b", "a"]);
        assert_eq!(m.start_captures().collect::<Vec<_>>(), ["c"]);
    }

    #[test]
    fn merge_concatenates_in_order() {
        let incoming: Markers = [start("x")].into_iter().collect();
        let outgoing: Markers = [stop("x"), start("y")].into_iter().collect();
        let merged = incoming.merge(&outgoing);
        assert_eq!(
            merged.iter().cloned().collect::<Vec<_>>(),
            [start("x"), stop("x"), start("y")]
        );
        assert!(Markers::new().merge(&Markers::new()).is_empty());
    }

    #[test]
    fn capture_helpers_place_markers() {
        let base: Markers = [start("a")].into_iter().collect();
        assert_eq!(
            base.then_start("b").iter().cloned().collect::<Vec<_>>(),
            [start("a"), start("b")]
        );
        assert_eq!(
            base.after_stop("b").iter().cloned().collect::<Vec<_>>(),
            [stop("b"), start("a")]
        );
    }

    #[test]
    fn accepts_and_counts() {
        let leaf = NodeId(2);
        let graph: Graph<char> = Graph::from_parts(
            vec![
                Node::Initial,
                Node::Terminal,
                Node::Leaf(Arc::new(ExactMatcher::new('a'))),
            ],
            vec![
                vec![Edge {
                    target: leaf,
                    markers: Markers::new(),
                }],
                vec![],
                vec![Edge {
                    target: NodeId::TERMINAL,
                    markers: Markers::new(),
                }],
            ],
        );
        assert!(!graph.accepts(NodeId::INITIAL));
        assert!(graph.accepts(leaf));
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.matcher(leaf).is_some());
        assert!(graph.matcher(NodeId::INITIAL).is_none());
        assert_eq!(graph.predecessors(NodeId::TERMINAL), vec![leaf]);
        assert!(format!("{graph:?}").contains("terminal"));
    }

    #[test]
    fn node_id_display() {
        assert_eq!(NodeId::INITIAL.to_string(), "initial");
        assert_eq!(NodeId::TERMINAL.to_string(), "terminal");
        assert_eq!(NodeId(7).to_string(), "#7");
    }
}
