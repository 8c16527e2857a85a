//! Frontier simulation of a compiled [`Graph`].
//!
//! The engine keeps a *frontier* of explorers (a graph position plus the trail
//! of outputs accepted so far) and advances all of them on every token. There
//! is no backtracking and no deduplication: two explorers on the same node with
//! different trails are different interpretations of the input, and both are
//! kept.
//!
//! Trails share their common prefix through reference-counted links, so
//! forking an explorer is O(1).

use std::borrow::Borrow;
use std::rc::Rc;

use crate::graph::{Graph, Markers, NodeId};
use crate::trace::StepTrace;
use crate::{MatchError, MAX_FRONTIER};

/// Run-time limits applied while matching.
///
/// ```
/// use tokre::Limits;
///
/// let strict = Limits::default().with_max_frontier(128);
/// assert_eq!(strict.max_frontier, Some(128));
/// assert_eq!(Limits::unbounded().max_frontier, None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Largest frontier allowed after any step. `None` disables the check.
    pub max_frontier: Option<usize>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_frontier: Some(MAX_FRONTIER),
        }
    }
}

impl Limits {
    /// No limits at all. Ambiguous patterns may then grow without bound.
    #[must_use]
    pub fn unbounded() -> Self {
        Self { max_frontier: None }
    }

    /// Replace the frontier ceiling.
    #[must_use]
    pub fn with_max_frontier(mut self, max: usize) -> Self {
        self.max_frontier = Some(max);
        self
    }
}

/// One accepted token: the matcher's output and the markers of the edge that
/// led to it.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailItem<'g, Out> {
    /// Value produced by the leaf's matcher.
    pub output: Out,
    /// Capture markers crossed on the way in.
    pub markers: &'g Markers,
}

/// An explorer that consumed the whole input and can reach `Terminal`.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptingPath<'g, Out> {
    /// The node the explorer stopped on.
    pub node: NodeId,
    /// Everything accepted along the way, in input order.
    pub trail: Vec<TrailItem<'g, Out>>,
}

/// Run `graph` over `input` and return every accepting path.
///
/// No match is an empty `Vec`, not an error.
///
/// # Errors
///
/// [`MatchError::FrontierExceeded`] if the frontier outgrows
/// `limits.max_frontier`.
///
/// ```
/// use tokre::{build_graph, run, seq, Limits};
///
/// let graph = build_graph(&seq("ab".chars()));
/// assert_eq!(run(&graph, "ab".chars(), Limits::default()).unwrap().len(), 1);
/// assert!(run(&graph, "abc".chars(), Limits::default()).unwrap().is_empty());
/// ```
pub fn run<'g, Tok, Out, I, B>(
    graph: &'g Graph<Tok, Out>,
    input: I,
    limits: Limits,
) -> Result<Vec<AcceptingPath<'g, Out>>, MatchError>
where
    Out: Clone,
    I: IntoIterator<Item = B>,
    B: Borrow<Tok>,
{
    let mut frontier = Frontier::new(graph, limits);
    for token in input {
        frontier.advance(token.borrow())?;
        if frontier.is_empty() {
            break;
        }
    }
    Ok(frontier.accepting())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Frontier
// ═══════════════════════════════════════════════════════════════════════════════

/// Persistent singly-linked trail, newest item first.
struct TrailLink<'g, Out> {
    item: TrailItem<'g, Out>,
    prev: Option<Rc<TrailLink<'g, Out>>>,
}

impl<Out> Drop for TrailLink<'_, Out> {
    // Unlink iteratively so very long trails do not recurse on drop.
    fn drop(&mut self) {
        let mut prev = self.prev.take();
        while let Some(link) = prev {
            match Rc::try_unwrap(link) {
                Ok(mut owned) => prev = owned.prev.take(),
                Err(_) => break,
            }
        }
    }
}

struct Explorer<'g, Out> {
    node: NodeId,
    trail: Option<Rc<TrailLink<'g, Out>>>,
}

/// The set of live explorers after some prefix of the input.
pub(crate) struct Frontier<'g, Tok, Out> {
    graph: &'g Graph<Tok, Out>,
    limits: Limits,
    explorers: Vec<Explorer<'g, Out>>,
    position: usize,
    scratch: Vec<Out>,
}

impl<'g, Tok, Out> Frontier<'g, Tok, Out> {
    /// A single explorer on `Initial` with an empty trail.
    pub(crate) fn new(graph: &'g Graph<Tok, Out>, limits: Limits) -> Self {
        Self {
            graph,
            limits,
            explorers: vec![Explorer {
                node: NodeId::INITIAL,
                trail: None,
            }],
            position: 0,
            scratch: Vec::new(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.explorers.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.explorers.len()
    }

    /// Number of tokens consumed so far.
    pub(crate) fn position(&self) -> usize {
        self.position
    }

    /// Feed one token to every explorer.
    ///
    /// Explorers are produced in a stable order: source explorer, then edge,
    /// then matcher output.
    pub(crate) fn advance(&mut self, token: &Tok) -> Result<StepTrace, MatchError> {
        let graph = self.graph;
        let frontier_before = self.explorers.len();
        let mut edges_tried = 0;
        let mut next = Vec::new();

        for explorer in &self.explorers {
            for edge in graph.successors(explorer.node) {
                let Some(matcher) = graph.matcher(edge.target) else {
                    continue;
                };
                edges_tried += 1;
                self.scratch.clear();
                matcher.matches(token, &mut self.scratch);

                for output in self.scratch.drain(..) {
                    next.push(Explorer {
                        node: edge.target,
                        trail: Some(Rc::new(TrailLink {
                            item: TrailItem {
                                output,
                                markers: &edge.markers,
                            },
                            prev: explorer.trail.clone(),
                        })),
                    });
                    if let Some(max) = self.limits.max_frontier {
                        if next.len() > max {
                            return Err(MatchError::FrontierExceeded {
                                size: next.len(),
                                max,
                                position: self.position,
                            });
                        }
                    }
                }
            }
        }

        let step = StepTrace {
            position: self.position,
            frontier_before,
            edges_tried,
            frontier_after: next.len(),
        };
        self.explorers = next;
        self.position += 1;
        Ok(step)
    }

    /// How many explorers could stop here.
    pub(crate) fn accepting_count(&self) -> usize {
        self.explorers
            .iter()
            .filter(|e| self.graph.accepts(e.node))
            .count()
    }

    /// Explorers whose node has an edge to `Terminal`, with materialized
    /// trails.
    pub(crate) fn accepting(&self) -> Vec<AcceptingPath<'g, Out>>
    where
        Out: Clone,
    {
        self.explorers
            .iter()
            .filter(|e| self.graph.accepts(e.node))
            .map(|e| AcceptingPath {
                node: e.node,
                trail: collect_trail(e.trail.as_deref()),
            })
            .collect()
    }
}

fn collect_trail<'g, Out: Clone>(mut link: Option<&TrailLink<'g, Out>>) -> Vec<TrailItem<'g, Out>> {
    let mut items = Vec::new();
    while let Some(current) = link {
        items.push(current.item.clone());
        link = current.prev.as_deref();
    }
    items.reverse();
    items
}
