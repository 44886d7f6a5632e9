//! Reference-counted allocation regions for raw nodes.
//!
//! An arena owns the nodes allocated into it; nodes are never freed
//! individually and die only when the last handle to their arena goes away.
//! A tree may interleave nodes from several arenas -- each arena retains the
//! arenas its nodes point into, so holding any one handle keeps the whole
//! tree readable.

use std::fmt;
use std::ptr::NonNull;
use std::sync::{Mutex, PoisonError};

use rustc_hash::FxHashSet;
use text_size::TextSize;
use triomphe::Arc;

use crate::raw::{Presence, RawNode, RawNodeId, RawNodeRef};
use crate::{Shape, SyntaxKind};

const FIRST_CHUNK: usize = 16;

/// Reference-counted handle to an allocation region.
///
/// Cloning is cheap and shares the region.
#[derive(Clone)]
pub struct Arena {
    inner: Arc<ArenaInner>,
}

struct ArenaInner {
    state: Mutex<ArenaState>,
}

struct ArenaState {
    /// Chunks are pre-reserved and never reallocated, so node addresses stay
    /// stable for the arena's lifetime.
    chunks: Vec<Vec<RawNode>>,
    len: usize,
    /// Foreign arenas referenced by nodes allocated here; kept alive for as
    /// long as this arena. Never contains the arena itself.
    retained: Vec<Arena>,
    retained_keys: FxHashSet<usize>,
}

impl Arena {
    pub fn new() -> Self {
        let state = ArenaState {
            chunks: Vec::new(),
            len: 0,
            retained: Vec::new(),
            retained_keys: FxHashSet::default(),
        };
        Self { inner: Arc::new(ArenaInner { state: Mutex::new(state) }) }
    }

    /// Number of nodes allocated into this arena.
    pub fn len(&self) -> usize {
        self.lock().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ArenaState> {
        // Allocation is append-only, so a poisoned lock left no torn state.
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn key(&self) -> usize {
        std::ptr::from_ref::<ArenaInner>(&*self.inner) as usize
    }

    /// Returns `true` if both handles refer to the same region.
    pub fn same_arena(&self, other: &Self) -> bool {
        self.key() == other.key()
    }

    fn alloc(&self, raw: RawNode) -> RawNodeRef {
        let mut guard = self.lock();
        let state = &mut *guard;
        if state.chunks.last().is_none_or(|chunk| chunk.len() == chunk.capacity()) {
            let capacity = state.chunks.last().map_or(FIRST_CHUNK, |chunk| chunk.capacity() * 2);
            state.chunks.push(Vec::with_capacity(capacity));
        }
        let chunk = state.chunks.last_mut().expect("chunk was just ensured");
        chunk.push(raw);
        state.len += 1;
        let node = chunk.last().expect("node was just pushed");
        RawNodeRef::new(NonNull::from(node))
    }

    /// Keeps `arena` alive for as long as `self`.
    fn retain(&self, arena: &Self) {
        if self.same_arena(arena) {
            return;
        }
        let key = arena.key();
        let mut state = self.lock();
        if state.retained_keys.insert(key) {
            state.retained.push(arena.clone());
        }
    }

    /// Allocates a leaf with the given text.
    pub fn token(&self, text: &str) -> RawElement {
        let raw = self.alloc(RawNode::new_leaf(text.into(), Presence::Present));
        RawElement { raw, arena: self.clone() }
    }

    /// Allocates a zero-width leaf standing in for absent source text.
    pub fn missing_token(&self) -> RawElement {
        let raw = self.alloc(RawNode::new_leaf("".into(), Presence::Missing));
        RawElement { raw, arena: self.clone() }
    }

    /// Allocates a present layout or collection node from its slots.
    ///
    /// Panics on a shape violation: wrong arity, an absent required slot, or
    /// a child kind the slot does not allow.
    pub fn node<I>(&self, kind: SyntaxKind, slots: I) -> RawElement
    where
        I: IntoIterator<Item = Option<RawElement>>,
    {
        self.layout(kind, slots.into_iter().collect(), Presence::Present)
    }

    /// Allocates a collection node from its elements.
    pub fn collection<I>(&self, kind: SyntaxKind, elements: I) -> RawElement
    where
        I: IntoIterator<Item = RawElement>,
    {
        self.layout(kind, elements.into_iter().map(Some).collect(), Presence::Present)
    }

    /// Allocates an all-absent missing node of the given layout kind.
    pub fn missing_node(&self, kind: SyntaxKind) -> RawElement {
        let Shape::Layout(slots) = kind.shape() else {
            panic!("{kind:?} is not a layout kind");
        };
        self.layout(kind, vec![None; slots.len()], Presence::Missing)
    }

    /// Allocates a node of `kind` from a full slot array.
    ///
    /// This is the rebuild primitive: the slot array must match the kind's
    /// shape exactly, and every present child stays alive because this arena
    /// retains the child's arena before the element keep-alives are dropped.
    pub fn layout(
        &self,
        kind: SyntaxKind,
        slots: Vec<Option<RawElement>>,
        presence: Presence,
    ) -> RawElement {
        check_shape(kind, &slots, presence);

        let mut text_len = TextSize::new(0);
        let mut raw_slots = Vec::with_capacity(slots.len());
        for slot in &slots {
            match slot {
                Some(element) => {
                    self.retain(element.arena());
                    text_len += element.get().text_len();
                    raw_slots.push(Some(element.raw()));
                }
                None => raw_slots.push(None),
            }
        }

        let raw = self.alloc(RawNode::new_layout(
            kind,
            presence,
            raw_slots.into_boxed_slice(),
            text_len,
        ));
        RawElement { raw, arena: self.clone() }
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena").field("len", &self.len()).finish_non_exhaustive()
    }
}

fn check_shape(kind: SyntaxKind, slots: &[Option<RawElement>], presence: Presence) {
    match kind.shape() {
        Shape::Token => panic!("shape violation: {kind:?} is a leaf kind and takes no slots"),
        Shape::Layout(infos) => {
            assert_eq!(
                slots.len(),
                infos.len(),
                "shape violation: {kind:?} has {} slots, got {}",
                infos.len(),
                slots.len(),
            );
            for (slot, info) in slots.iter().zip(infos) {
                match slot {
                    Some(element) => assert!(
                        info.allowed.contains(element.kind()),
                        "shape violation: {:?} is not allowed in slot `{}` of {kind:?}",
                        element.kind(),
                        info.name,
                    ),
                    None => assert!(
                        info.optional || matches!(presence, Presence::Missing),
                        "shape violation: slot `{}` of {kind:?} is required",
                        info.name,
                    ),
                }
            }
        }
        Shape::Collection(allowed) => {
            for (index, slot) in slots.iter().enumerate() {
                let Some(element) = slot else {
                    panic!("shape violation: element {index} of {kind:?} cannot be absent");
                };
                assert!(
                    allowed.contains(element.kind()),
                    "shape violation: {:?} is not allowed in {kind:?}",
                    element.kind(),
                );
            }
        }
    }
}

/// A raw node paired with an arena handle that keeps it alive.
///
/// The arena is not necessarily the owning one; any arena retaining the
/// owner works just as well.
#[derive(Clone)]
pub struct RawElement {
    raw: RawNodeRef,
    arena: Arena,
}

impl RawElement {
    pub(crate) fn new(raw: RawNodeRef, arena: Arena) -> Self {
        Self { raw, arena }
    }

    pub fn get(&self) -> &RawNode {
        // The `arena` field keeps the node alive for as long as `self`.
        unsafe { self.raw.get() }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.get().kind()
    }

    pub fn id(&self) -> RawNodeId {
        self.raw.id()
    }

    pub(crate) fn raw(&self) -> RawNodeRef {
        self.raw
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }
}

impl fmt::Debug for RawElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawElement").field("kind", &self.kind()).field("id", &self.id()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyntaxKind::*;

    #[test]
    fn len_counts_allocations() {
        let arena = Arena::new();
        assert!(arena.is_empty());

        let token = arena.token("x");
        let name = arena.node(NAME, [Some(token)]);
        assert_eq!(arena.len(), 2);
        assert_eq!(name.kind(), NAME);
        assert_eq!(u32::from(name.get().text_len()), 1);
    }

    #[test]
    fn identity_is_per_allocation() {
        let arena = Arena::new();
        let a = arena.token("x");
        let b = arena.token("x");

        assert_ne!(a.id(), b.id());
        assert_eq!(a.id(), a.clone().id());
    }

    #[test]
    fn foreign_arenas_are_retained() {
        let old = Arena::new();
        let token = old.token("val");

        let session = Arena::new();
        let binding = session.node(
            BINDING,
            [Some(token), Some(session.node(NAME, [Some(session.token("x"))])), None, None],
        );

        // Dropping the last direct handle to `old` must not invalidate the
        // mixed tree: `session` retains it.
        drop(old);
        let slots = binding.get().slot_count();
        assert_eq!(slots, 4);
        assert_eq!(u32::from(binding.get().text_len()), 4);
    }

    #[test]
    fn missing_nodes_elide_required_slots() {
        let arena = Arena::new();
        let missing = arena.missing_node(NAME);

        assert!(missing.get().is_missing());
        assert_eq!(u32::from(missing.get().text_len()), 0);
    }

    #[test]
    #[should_panic(expected = "shape violation")]
    fn wrong_arity_panics() {
        let arena = Arena::new();
        let token = arena.token("1");
        arena.node(LITERAL, [Some(token), None]);
    }

    #[test]
    #[should_panic(expected = "shape violation")]
    fn wrong_child_kind_panics() {
        let arena = Arena::new();
        let literal = arena.node(LITERAL, [Some(arena.token("1"))]);
        arena.node(NAME, [Some(literal)]);
    }

    #[test]
    #[should_panic(expected = "shape violation")]
    fn absent_required_slot_panics() {
        let arena = Arena::new();
        arena.node(NAME, [None]);
    }
}
