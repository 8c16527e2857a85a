//! Expression → graph compilation.
//!
//! The expression is placed between the two sentinels
//! (`Initial → root → Terminal`), then every composite node is rewritten into
//! its children until only leaves remain. Each rewrite detaches the node's
//! incoming edges, outgoing edges and self-loops, and reconnects them to the
//! children according to the node kind:
//!
//! | Node | Rewrite |
//! |------|---------|
//! | `Concat(L, R)` | `in → L`, `L → R`, `R → out` |
//! | `Alt(L, R)` | `in → L, R`; `L, R → out` |
//! | `Maybe(X)` | `in → X → out`, plus `in → out` carrying both edges' markers |
//! | `Repeat(X)` | as `Maybe`, plus `X → X` |
//! | `Capture(n, X)` | `in → X` gains `Start(n)`; `X → out` gains `Stop(n)` |
//!
//! A self-loop on a composite node (from `Repeat` around it) becomes an edge
//! from each of its exits back to each of its entries.
//!
//! Every leaf occurrence gets its own node, even when the same matcher is
//! reachable through several paths of the expression.

use std::collections::HashSet;
use std::sync::Arc;

use crate::graph::{Edge, Graph, Markers, Node, NodeId};
use crate::{Expr, TokenMatcher};

/// Compile `expr` into a flat [`Graph`].
///
/// The expression is copied first; the caller keeps ownership of `expr`.
///
/// ```
/// use tokre::{build_graph, seq, NodeId};
///
/// let graph = build_graph(&seq("ab".chars()));
/// assert_eq!(graph.node_count(), 4); // initial, terminal, 'a', 'b'
/// assert!(!graph.accepts(NodeId::INITIAL));
/// ```
pub fn build_graph<Tok, Out>(expr: &Expr<Tok, Out>) -> Graph<Tok, Out> {
    let mut builder = Builder::new();
    let root = builder.alloc(expr.clone());
    builder.link(INITIAL, root, Markers::new());
    builder.link(root, TERMINAL, Markers::new());

    while let Some(id) = builder.pending.pop() {
        builder.rewrite(id);
    }

    builder.freeze()
}

const INITIAL: usize = 0;
const TERMINAL: usize = 1;

/// A composite node awaiting rewrite, with its children already unboxed.
enum Composite<Tok, Out> {
    Concat(Expr<Tok, Out>, Expr<Tok, Out>),
    Alt(Expr<Tok, Out>, Expr<Tok, Out>),
    Maybe(Expr<Tok, Out>),
    Repeat(Expr<Tok, Out>),
    Capture(String, Expr<Tok, Out>),
}

enum Slot<Tok, Out> {
    Sentinel,
    Leaf(Arc<dyn TokenMatcher<Tok, Out>>),
    Composite(Composite<Tok, Out>),
    Rewritten,
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct WorkEdge {
    from: usize,
    to: usize,
    markers: Markers,
}

/// Edges of a node being rewritten, split by direction.
#[derive(Default)]
struct Detached {
    incoming: Vec<(usize, Markers)>,
    outgoing: Vec<(usize, Markers)>,
    loops: Vec<Markers>,
}

struct Builder<Tok, Out> {
    slots: Vec<Slot<Tok, Out>>,
    /// Edges in insertion order, indexed by edge id. Removed edges leave `None`.
    edges: Vec<Option<WorkEdge>>,
    /// Per slot, ids of the edges it is an endpoint of, in increasing order.
    /// May hold ids of edges already removed through the other endpoint.
    touching: Vec<Vec<usize>>,
    /// Same content as the live `edges`, for duplicate detection.
    seen: HashSet<WorkEdge>,
    pending: Vec<usize>,
}

impl<Tok, Out> Builder<Tok, Out> {
    fn new() -> Self {
        Self {
            slots: vec![Slot::Sentinel, Slot::Sentinel],
            edges: Vec::new(),
            touching: vec![Vec::new(), Vec::new()],
            seen: HashSet::new(),
            pending: Vec::new(),
        }
    }

    /// Allocate a fresh slot for `expr`. Composites are queued for rewrite.
    fn alloc(&mut self, expr: Expr<Tok, Out>) -> usize {
        let id = self.slots.len();
        let slot = match expr {
            Expr::Leaf(matcher) => Slot::Leaf(matcher),
            Expr::Concat(l, r) => Slot::Composite(Composite::Concat(*l, *r)),
            Expr::Alt(l, r) => Slot::Composite(Composite::Alt(*l, *r)),
            Expr::Maybe(x) => Slot::Composite(Composite::Maybe(*x)),
            Expr::Repeat(x) => Slot::Composite(Composite::Repeat(*x)),
            Expr::Capture { name, inner } => Slot::Composite(Composite::Capture(name, *inner)),
        };
        if matches!(slot, Slot::Composite(_)) {
            self.pending.push(id);
        }
        self.slots.push(slot);
        self.touching.push(Vec::new());
        id
    }

    /// Add `from → to`, unless an identical edge already exists.
    fn link(&mut self, from: usize, to: usize, markers: Markers) {
        let edge = WorkEdge { from, to, markers };
        if !self.seen.insert(edge.clone()) {
            return;
        }
        let eid = self.edges.len();
        self.edges.push(Some(edge));
        self.touching[from].push(eid);
        if to != from {
            self.touching[to].push(eid);
        }
    }

    /// Remove every edge touching `id`. Only `id`'s own edges are visited;
    /// they come back in insertion order.
    fn detach(&mut self, id: usize) -> Detached {
        let mut detached = Detached::default();
        for eid in std::mem::take(&mut self.touching[id]) {
            let Some(edge) = self.edges[eid].take() else {
                continue;
            };
            self.seen.remove(&edge);
            match (edge.from == id, edge.to == id) {
                (true, true) => detached.loops.push(edge.markers),
                (false, true) => detached.incoming.push((edge.from, edge.markers)),
                _ => detached.outgoing.push((edge.to, edge.markers)),
            }
        }
        detached
    }

    fn rewrite(&mut self, id: usize) {
        let composite = match std::mem::replace(&mut self.slots[id], Slot::Rewritten) {
            Slot::Composite(composite) => composite,
            other => {
                self.slots[id] = other;
                return;
            }
        };
        let Detached {
            incoming,
            outgoing,
            loops,
        } = self.detach(id);

        match composite {
            Composite::Concat(left, right) => {
                let l = self.alloc(left);
                let r = self.alloc(right);
                for (p, md) in incoming {
                    self.link(p, l, md);
                }
                self.link(l, r, Markers::new());
                for (s, md) in outgoing {
                    self.link(r, s, md);
                }
                for md in loops {
                    self.link(r, l, md);
                }
            }
            Composite::Alt(left, right) => {
                let l = self.alloc(left);
                let r = self.alloc(right);
                for (p, md) in incoming {
                    self.link(p, l, md.clone());
                    self.link(p, r, md);
                }
                for (s, md) in outgoing {
                    self.link(l, s, md.clone());
                    self.link(r, s, md);
                }
                for md in loops {
                    for (from, to) in [(l, l), (l, r), (r, l), (r, r)] {
                        self.link(from, to, md.clone());
                    }
                }
            }
            Composite::Maybe(inner) => {
                let x = self.alloc(inner);
                self.optional(x, incoming, outgoing, loops);
            }
            Composite::Repeat(inner) => {
                let x = self.alloc(inner);
                self.optional(x, incoming, outgoing, loops);
                self.link(x, x, Markers::new());
            }
            Composite::Capture(name, inner) => {
                let x = self.alloc(inner);
                for (p, md) in incoming {
                    self.link(p, x, md.then_start(&name));
                }
                for (s, md) in outgoing {
                    self.link(x, s, md.after_stop(&name));
                }
                for md in loops {
                    self.link(x, x, md.after_stop(&name).then_start(&name));
                }
            }
        }
    }

    /// Shared by `Maybe` and `Repeat`: bypass edges plus the single pass.
    fn optional(
        &mut self,
        x: usize,
        incoming: Vec<(usize, Markers)>,
        outgoing: Vec<(usize, Markers)>,
        loops: Vec<Markers>,
    ) {
        for (p, in_md) in &incoming {
            for (s, out_md) in &outgoing {
                self.link(*p, *s, in_md.merge(out_md));
            }
        }
        for (p, md) in incoming {
            self.link(p, x, md);
        }
        for (s, md) in outgoing {
            self.link(x, s, md);
        }
        for md in loops {
            self.link(x, x, md);
        }
    }

    /// Compact slot ids (sentinels, then leaves in allocation order) and
    /// group edges by source.
    fn freeze(self) -> Graph<Tok, Out> {
        let mut remap = vec![None; self.slots.len()];
        let mut nodes = Vec::with_capacity(self.slots.len());

        for (old, slot) in self.slots.into_iter().enumerate() {
            let node = match slot {
                Slot::Sentinel if old == INITIAL => Node::Initial,
                Slot::Sentinel => Node::Terminal,
                Slot::Leaf(matcher) => Node::Leaf(matcher),
                Slot::Composite(_) | Slot::Rewritten => continue,
            };
            remap[old] = Some(NodeId(nodes.len()));
            nodes.push(node);
        }

        let mut successors: Vec<Vec<Edge>> = vec![Vec::new(); nodes.len()];
        for edge in self.edges.into_iter().flatten() {
            if let (Some(from), Some(to)) = (remap[edge.from], remap[edge.to]) {
                successors[from.0].push(Edge {
                    target: to,
                    markers: edge.markers,
                });
            }
        }

        Graph::from_parts(nodes, successors)
    }
}
