//! Capture-group reconstruction and match presentation.
//!
//! An accepting path is a flat trail of outputs, each tagged with the capture
//! markers crossed just before it. [`reconstruct`] replays those markers with a
//! stack of open groups and rebuilds the nested [`Match`] tree.

use std::collections::BTreeMap;
use std::ops::{Deref, Index};

use crate::engine::TrailItem;
use crate::graph::Marker;
use crate::MatchError;

/// One match, or one occurrence of a capture group inside a match.
///
/// `T` is the trail type: `Vec<Out>` by default, or a joined value such as
/// `String` (see [`JoinTrail`]).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Match<T> {
    start: usize,
    trail: T,
    groups: BTreeMap<String, Vec<Match<T>>>,
}

impl<T> Match<T> {
    /// Input position where this match (or group occurrence) starts.
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// The outputs accepted inside this match.
    #[must_use]
    pub fn trail(&self) -> &T {
        &self.trail
    }

    /// Consume the match, keeping only its trail.
    #[must_use]
    pub fn into_trail(self) -> T {
        self.trail
    }

    /// All groups opened directly inside this match, by name.
    #[must_use]
    pub fn groups(&self) -> &BTreeMap<String, Vec<Match<T>>> {
        &self.groups
    }

    /// Every occurrence of `name`, in input order. Empty if it never matched.
    #[must_use]
    pub fn group(&self, name: &str) -> &[Match<T>] {
        self.groups.get(name).map_or(&[], Vec::as_slice)
    }

    /// First occurrence of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Match<T>> {
        self.group(name).first()
    }

    /// Transform every trail in the tree.
    pub fn map_trail<U>(self, mut f: impl FnMut(T) -> U) -> Match<U> {
        self.map_with(&mut f)
    }

    fn map_with<U, F: FnMut(T) -> U>(self, f: &mut F) -> Match<U> {
        Match {
            start: self.start,
            trail: f(self.trail),
            groups: self
                .groups
                .into_iter()
                .map(|(name, list)| (name, list.into_iter().map(|m| m.map_with(f)).collect()))
                .collect(),
        }
    }
}

impl<Out: JoinTrail> Match<Vec<Out>> {
    /// Replace every trail by its joined form (e.g. `Vec<char>` → `String`).
    #[must_use]
    pub fn joined(self) -> Match<Out::Joined> {
        self.map_trail(Out::join_trail)
    }
}

/// First occurrence of a group.
///
/// # Panics
///
/// Panics if the group never matched. Use [`Match::get`] to avoid panicking.
impl<T> Index<&str> for Match<T> {
    type Output = Match<T>;

    fn index(&self, name: &str) -> &Match<T> {
        match self.get(name) {
            Some(m) => m,
            None => panic!("no capture group named \"{name}\" in this match"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MatchList
// ═══════════════════════════════════════════════════════════════════════════════

/// Every accepting interpretation of one input, in frontier order.
///
/// Dereferences to a slice of [`Match`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct MatchList<T>(Vec<Match<T>>);

impl<T> MatchList<T> {
    /// First occurrence of `name` in the first match.
    #[must_use]
    pub fn get_group(&self, name: &str) -> Option<&Match<T>> {
        self.0.first()?.get(name)
    }

    /// Consume the list.
    #[must_use]
    pub fn into_vec(self) -> Vec<Match<T>> {
        self.0
    }
}

impl<Out: JoinTrail> MatchList<Vec<Out>> {
    /// Join the trails of every match. See [`Match::joined`].
    #[must_use]
    pub fn joined(self) -> MatchList<Out::Joined> {
        self.0.into_iter().map(Match::joined).collect()
    }
}

impl<T> Default for MatchList<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> Deref for MatchList<T> {
    type Target = [Match<T>];

    fn deref(&self) -> &[Match<T>] {
        &self.0
    }
}

impl<T> FromIterator<Match<T>> for MatchList<T> {
    fn from_iter<I: IntoIterator<Item = Match<T>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for MatchList<T> {
    type Item = Match<T>;
    type IntoIter = std::vec::IntoIter<Match<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a MatchList<T> {
    type Item = &'a Match<T>;
    type IntoIter = std::slice::Iter<'a, Match<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Joining
// ═══════════════════════════════════════════════════════════════════════════════

/// Output types whose trails can be concatenated into a single value.
pub trait JoinTrail: Sized {
    /// The concatenated form.
    type Joined;

    /// Concatenate a trail.
    fn join_trail(items: Vec<Self>) -> Self::Joined;
}

impl JoinTrail for char {
    type Joined = String;

    fn join_trail(items: Vec<char>) -> String {
        items.into_iter().collect()
    }
}

impl JoinTrail for String {
    type Joined = String;

    fn join_trail(items: Vec<String>) -> String {
        items.concat()
    }
}

impl JoinTrail for &str {
    type Joined = String;

    fn join_trail(items: Vec<Self>) -> String {
        items.concat()
    }
}

impl JoinTrail for u8 {
    type Joined = Vec<u8>;

    fn join_trail(items: Vec<u8>) -> Vec<u8> {
        items
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Reconstruction
// ═══════════════════════════════════════════════════════════════════════════════

struct OpenGroup<Out> {
    start: usize,
    trail: Vec<Out>,
    /// Child groups as `(name, arena index)`, in opening order.
    children: Vec<(String, usize)>,
}

impl<Out> OpenGroup<Out> {
    fn at(start: usize) -> Self {
        Self {
            start,
            trail: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// Rebuild the capture tree of one accepting trail.
///
/// Markers of each item are replayed in order before the item's output is
/// recorded: `Stop` closes the innermost open group, `Start` opens a new
/// occurrence under it. The output is then appended to the root and to every
/// open group. Groups still open at the end of the trail are closed
/// implicitly.
///
/// # Errors
///
/// [`MatchError::MalformedGraph`] if a `Stop` does not close the innermost
/// open group. Graphs built by [`build_graph`](crate::build_graph) never do
/// this.
pub fn reconstruct<Out: Clone>(trail: &[TrailItem<'_, Out>]) -> Result<Match<Vec<Out>>, MatchError> {
    let mut arena = vec![OpenGroup::at(0)];
    let mut stack: Vec<(&str, usize)> = Vec::new();

    for (position, item) in trail.iter().enumerate() {
        for marker in item.markers {
            match marker {
                Marker::Stop(name) => match stack.last() {
                    Some((open, _)) if *open == name.as_str() => {
                        stack.pop();
                    }
                    other => {
                        return Err(MatchError::MalformedGraph {
                            expected: other.map(|(open, _)| (*open).to_owned()),
                            found: name.clone(),
                            position,
                        });
                    }
                },
                Marker::Start(name) => {
                    let parent = stack.last().map_or(0, |&(_, idx)| idx);
                    let idx = arena.len();
                    arena.push(OpenGroup::at(position));
                    arena[parent].children.push((name.clone(), idx));
                    stack.push((name.as_str(), idx));
                }
            }
        }

        arena[0].trail.push(item.output.clone());
        for &(_, idx) in &stack {
            arena[idx].trail.push(item.output.clone());
        }
    }

    Ok(assemble(arena))
}

/// Fold the arena into a tree. Children always sit after their parent, so
/// walking backwards finishes every child before it is claimed.
fn assemble<Out>(arena: Vec<OpenGroup<Out>>) -> Match<Vec<Out>> {
    let mut done: Vec<Option<Match<Vec<Out>>>> = Vec::with_capacity(arena.len());
    done.resize_with(arena.len(), || None);

    for (idx, group) in arena.into_iter().enumerate().rev() {
        let mut groups: BTreeMap<String, Vec<Match<Vec<Out>>>> = BTreeMap::new();
        for (name, child) in group.children {
            if let Some(m) = done[child].take() {
                groups.entry(name).or_default().push(m);
            }
        }
        done[idx] = Some(Match {
            start: group.start,
            trail: group.trail,
            groups,
        });
    }

    done.into_iter().next().flatten().unwrap_or(Match {
        start: 0,
        trail: Vec::new(),
        groups: BTreeMap::new(),
    })
}
