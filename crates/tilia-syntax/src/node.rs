//! Node handles: a raw node plus the context needed to navigate it.
//!
//! Handles pair the position-independent raw node with an arena keep-alive,
//! a parent link, and positional data (absolute offset, index in parent)
//! computed during descent rather than stored in the node itself. Cloning a
//! handle is cheap.

use std::fmt;
use std::iter;

use text_size::{TextRange, TextSize};
use triomphe::Arc;

use crate::SyntaxKind;
use crate::arena::{Arena, RawElement};
use crate::raw::{Presence, RawNode, RawNodeId, RawNodeRef};

/// Node or token element of a tree.
pub type SyntaxElement = NodeOrToken<SyntaxNode, SyntaxToken>;

/// Handle to a layout or collection node.
#[derive(Clone)]
pub struct SyntaxNode {
    raw: RawNodeRef,
    /// Keeps `raw` alive: its owning arena or one retaining it.
    arena: Arena,
    parent: Option<Arc<SyntaxNode>>,
    offset: TextSize,
    index_in_parent: u32,
}

impl SyntaxNode {
    /// Root handle for a detached tree.
    ///
    /// Panics if `element` is a token.
    pub fn new_root(element: RawElement) -> Self {
        assert!(
            !element.kind().is_token(),
            "a tree root must be a layout or collection node, got {:?}",
            element.kind(),
        );
        Self {
            raw: element.raw(),
            arena: element.arena().clone(),
            parent: None,
            offset: TextSize::new(0),
            index_in_parent: 0,
        }
    }

    fn raw_node(&self) -> &RawNode {
        // The `arena` field keeps the node alive for as long as `self`.
        unsafe { self.raw.get() }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.raw_node().kind()
    }

    pub fn presence(&self) -> Presence {
        self.raw_node().presence()
    }

    pub fn is_missing(&self) -> bool {
        self.raw_node().is_missing()
    }

    pub fn text_len(&self) -> TextSize {
        self.raw_node().text_len()
    }

    /// Absolute offset of this node within its tree.
    pub fn offset(&self) -> TextSize {
        self.offset
    }

    /// Absolute range covered by this node.
    pub fn text_range(&self) -> TextRange {
        TextRange::at(self.offset, self.text_len())
    }

    /// Slot index this node occupies in its parent; zero for roots.
    pub fn index_in_parent(&self) -> usize {
        self.index_in_parent as usize
    }

    pub fn parent(&self) -> Option<&SyntaxNode> {
        self.parent.as_deref()
    }

    /// Iterates this node and its ancestors, innermost first.
    pub fn ancestors(&self) -> impl Iterator<Item = &SyntaxNode> {
        iter::successors(Some(self), |node| node.parent())
    }

    /// Topmost node of the tree this handle is threaded into.
    pub fn root(&self) -> &SyntaxNode {
        self.ancestors().last().expect("ancestors always yields self")
    }

    /// Identity of the underlying raw node.
    pub fn raw_id(&self) -> RawNodeId {
        self.raw.id()
    }

    /// The underlying raw node paired with this handle's keep-alive.
    pub fn raw_element(&self) -> RawElement {
        RawElement::new(self.raw, self.arena.clone())
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Number of slots, absent ones included.
    pub fn slot_count(&self) -> usize {
        self.raw_node().slot_count()
    }

    /// Iterates every slot in order; absent slots yield `None`.
    pub fn slots(&self) -> Slots<'_> {
        Slots {
            raw_slots: self.raw_node().slots().iter(),
            parent: Arc::new(self.clone()),
            offset: self.offset,
            index: 0,
        }
    }

    /// The element at `index`, if the slot exists and is present.
    pub fn slot(&self, index: usize) -> Option<SyntaxElement> {
        self.slots().nth(index).flatten()
    }

    /// Iterates present children, tokens included.
    pub fn children_with_tokens(&self) -> impl Iterator<Item = SyntaxElement> + '_ {
        self.slots().flatten()
    }

    /// Iterates present child nodes, skipping tokens.
    pub fn children(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.children_with_tokens().filter_map(SyntaxElement::into_node)
    }

    /// Owning variant of [`SyntaxNode::children_with_tokens`].
    pub fn elements(&self) -> SyntaxElements {
        SyntaxElements { parent: Arc::new(self.clone()), next_slot: 0, offset: self.offset }
    }

    /// Snapshots the full slot array, pairing every present child with a
    /// keep-alive through this node's arena.
    pub fn slot_elements(&self) -> Vec<Option<RawElement>> {
        self.raw_node()
            .slots()
            .iter()
            .map(|slot| slot.map(|raw| RawElement::new(raw, self.arena.clone())))
            .collect()
    }

    /// Standalone handle to the same node: no parent, offset zero.
    pub fn detach(&self) -> Self {
        Self {
            raw: self.raw,
            arena: self.arena.clone(),
            parent: None,
            offset: TextSize::new(0),
            index_in_parent: 0,
        }
    }

    /// Splices `replacement` into this node's position, rebuilding the
    /// ancestor spine into `arena`.
    ///
    /// Every ancestor on the path to the root is rebuilt with one slot
    /// swapped; everything off the path is shared with the original tree.
    /// Returns the element at this node's position in the new document tree.
    pub fn replacing_self(&self, replacement: RawElement, arena: &Arena) -> SyntaxElement {
        let mut new_raw = replacement;
        let mut path = Vec::new();
        let mut cursor = self;
        while let Some(parent) = cursor.parent() {
            let mut layout = parent.slot_elements();
            let index = cursor.index_in_parent();
            layout[index] = Some(new_raw);
            new_raw = arena.layout(parent.kind(), layout, parent.presence());
            path.push(index);
            cursor = parent;
        }

        let mut element = SyntaxElement::Node(Self::new_root(new_raw));
        for &index in path.iter().rev() {
            let node = element.into_node().expect("spine elements are layout nodes");
            element = node.slot(index).expect("spine slots are present");
        }
        element
    }
}

impl PartialEq for SyntaxNode {
    fn eq(&self, other: &Self) -> bool {
        self.raw_id() == other.raw_id() && self.offset == other.offset
    }
}

impl Eq for SyntaxNode {}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.text_range())
    }
}

/// Handle to a leaf.
#[derive(Clone)]
pub struct SyntaxToken {
    raw: RawNodeRef,
    arena: Arena,
    parent: Option<Arc<SyntaxNode>>,
    offset: TextSize,
    index_in_parent: u32,
}

impl SyntaxToken {
    /// Standalone handle to a freshly built leaf.
    ///
    /// Panics if `element` is not a token.
    pub fn new_detached(element: RawElement) -> Self {
        assert!(element.kind().is_token(), "expected a token, got {:?}", element.kind());
        Self {
            raw: element.raw(),
            arena: element.arena().clone(),
            parent: None,
            offset: TextSize::new(0),
            index_in_parent: 0,
        }
    }

    fn raw_node(&self) -> &RawNode {
        // The `arena` field keeps the node alive for as long as `self`.
        unsafe { self.raw.get() }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.raw_node().kind()
    }

    pub fn presence(&self) -> Presence {
        self.raw_node().presence()
    }

    pub fn is_missing(&self) -> bool {
        self.raw_node().is_missing()
    }

    /// The token's lexical text.
    pub fn text(&self) -> &str {
        self.raw_node().text().expect("tokens carry a leaf payload")
    }

    pub fn text_len(&self) -> TextSize {
        self.raw_node().text_len()
    }

    pub fn offset(&self) -> TextSize {
        self.offset
    }

    pub fn text_range(&self) -> TextRange {
        TextRange::at(self.offset, self.text_len())
    }

    pub fn index_in_parent(&self) -> usize {
        self.index_in_parent as usize
    }

    pub fn parent(&self) -> Option<&SyntaxNode> {
        self.parent.as_deref()
    }

    pub fn raw_id(&self) -> RawNodeId {
        self.raw.id()
    }

    pub fn raw_element(&self) -> RawElement {
        RawElement::new(self.raw, self.arena.clone())
    }

    pub fn detach(&self) -> Self {
        Self {
            raw: self.raw,
            arena: self.arena.clone(),
            parent: None,
            offset: TextSize::new(0),
            index_in_parent: 0,
        }
    }
}

impl PartialEq for SyntaxToken {
    fn eq(&self, other: &Self) -> bool {
        self.raw_id() == other.raw_id() && self.offset == other.offset
    }
}

impl Eq for SyntaxToken {}

impl fmt::Debug for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?} {:?}", self.kind(), self.text_range(), self.text())
    }
}

/// Iterator over every slot of a node, absent slots included.
pub struct Slots<'a> {
    raw_slots: std::slice::Iter<'a, Option<RawNodeRef>>,
    parent: Arc<SyntaxNode>,
    offset: TextSize,
    index: u32,
}

impl Iterator for Slots<'_> {
    type Item = Option<SyntaxElement>;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = *self.raw_slots.next()?;
        let index = self.index;
        self.index += 1;
        let Some(raw) = slot else { return Some(None) };

        // The parent handle's arena keeps every node reachable from it alive.
        let (is_token, text_len) = {
            let node = unsafe { raw.get() };
            (node.kind().is_token(), node.text_len())
        };
        let offset = self.offset;
        self.offset += text_len;

        let element = if is_token {
            SyntaxElement::Token(SyntaxToken {
                raw,
                arena: self.parent.arena.clone(),
                parent: Some(self.parent.clone()),
                offset,
                index_in_parent: index,
            })
        } else {
            SyntaxElement::Node(SyntaxNode {
                raw,
                arena: self.parent.arena.clone(),
                parent: Some(self.parent.clone()),
                offset,
                index_in_parent: index,
            })
        };
        Some(Some(element))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.raw_slots.size_hint()
    }
}

impl ExactSizeIterator for Slots<'_> {
    fn len(&self) -> usize {
        self.raw_slots.len()
    }
}

/// Owning iterator over the present children of a node.
pub struct SyntaxElements {
    parent: Arc<SyntaxNode>,
    next_slot: usize,
    offset: TextSize,
}

impl Iterator for SyntaxElements {
    type Item = SyntaxElement;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let slot = *self.parent.raw_node().slots().get(self.next_slot)?;
            let index = self.next_slot as u32;
            self.next_slot += 1;
            let Some(raw) = slot else { continue };

            let (is_token, text_len) = {
                let node = unsafe { raw.get() };
                (node.kind().is_token(), node.text_len())
            };
            let offset = self.offset;
            self.offset += text_len;

            let element = if is_token {
                SyntaxElement::Token(SyntaxToken {
                    raw,
                    arena: self.parent.arena.clone(),
                    parent: Some(self.parent.clone()),
                    offset,
                    index_in_parent: index,
                })
            } else {
                SyntaxElement::Node(SyntaxNode {
                    raw,
                    arena: self.parent.arena.clone(),
                    parent: Some(self.parent.clone()),
                    offset,
                    index_in_parent: index,
                })
            };
            return Some(element);
        }
    }
}

/// Node-or-token wrapper used throughout the API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeOrToken<N, T> {
    Node(N),
    Token(T),
}

impl<N, T> NodeOrToken<N, T> {
    pub fn into_node(self) -> Option<N> {
        match self {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    pub fn into_token(self) -> Option<T> {
        match self {
            NodeOrToken::Node(_) => None,
            NodeOrToken::Token(token) => Some(token),
        }
    }

    pub fn as_node(&self) -> Option<&N> {
        match self {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&T> {
        match self {
            NodeOrToken::Node(_) => None,
            NodeOrToken::Token(token) => Some(token),
        }
    }
}

impl SyntaxElement {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            NodeOrToken::Node(node) => node.kind(),
            NodeOrToken::Token(token) => token.kind(),
        }
    }

    pub fn is_missing(&self) -> bool {
        match self {
            NodeOrToken::Node(node) => node.is_missing(),
            NodeOrToken::Token(token) => token.is_missing(),
        }
    }

    pub fn text_range(&self) -> TextRange {
        match self {
            NodeOrToken::Node(node) => node.text_range(),
            NodeOrToken::Token(token) => token.text_range(),
        }
    }

    pub fn index_in_parent(&self) -> usize {
        match self {
            NodeOrToken::Node(node) => node.index_in_parent(),
            NodeOrToken::Token(token) => token.index_in_parent(),
        }
    }

    pub fn parent(&self) -> Option<&SyntaxNode> {
        match self {
            NodeOrToken::Node(node) => node.parent(),
            NodeOrToken::Token(token) => token.parent(),
        }
    }

    pub fn raw_id(&self) -> RawNodeId {
        match self {
            NodeOrToken::Node(node) => node.raw_id(),
            NodeOrToken::Token(token) => token.raw_id(),
        }
    }

    pub fn raw_element(&self) -> RawElement {
        match self {
            NodeOrToken::Node(node) => node.raw_element(),
            NodeOrToken::Token(token) => token.raw_element(),
        }
    }

    pub fn detach(&self) -> SyntaxElement {
        match self {
            NodeOrToken::Node(node) => NodeOrToken::Node(node.detach()),
            NodeOrToken::Token(token) => NodeOrToken::Token(token.detach()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyntaxKind::*;

    fn sample(arena: &Arena) -> SyntaxNode {
        // val x = 1; represented as BINDING[val, NAME[x], =, LITERAL[1]]
        let binding = arena.node(
            BINDING,
            [
                Some(arena.token("val")),
                Some(arena.node(NAME, [Some(arena.token("x"))])),
                Some(arena.token("=")),
                Some(arena.node(LITERAL, [Some(arena.token("1"))])),
            ],
        );
        let stmts = arena.collection(STMT_LIST, [binding]);
        SyntaxNode::new_root(arena.node(SOURCE_FILE, [Some(stmts)]))
    }

    #[test]
    fn offsets_accumulate_over_siblings() {
        let arena = Arena::new();
        let root = sample(&arena);

        assert_eq!(u32::from(root.text_len()), 6);
        let binding = root.children().next().unwrap().children().next().unwrap();
        assert_eq!(binding.kind(), BINDING);

        let children: Vec<_> = binding.children_with_tokens().collect();
        assert_eq!(children.len(), 4);
        assert_eq!(u32::from(children[0].text_range().start()), 0);
        assert_eq!(u32::from(children[1].text_range().start()), 3);
        assert_eq!(u32::from(children[2].text_range().start()), 4);
        assert_eq!(u32::from(children[3].text_range().start()), 5);
        assert_eq!(children[3].index_in_parent(), 3);
    }

    #[test]
    fn absent_slots_are_preserved_in_iteration() {
        let arena = Arena::new();
        let binding = arena.node(
            BINDING,
            [
                Some(arena.token("val")),
                Some(arena.node(NAME, [Some(arena.token("x"))])),
                None,
                None,
            ],
        );
        let node = SyntaxNode::new_root(binding);

        let slots: Vec<_> = node.slots().map(|slot| slot.is_some()).collect();
        assert_eq!(slots, [true, true, false, false]);
        assert_eq!(node.children_with_tokens().count(), 2);
    }

    #[test]
    fn parent_chain_reaches_the_root() {
        let arena = Arena::new();
        let root = sample(&arena);

        let name = root
            .children()
            .next()
            .unwrap()
            .children()
            .next()
            .unwrap()
            .children()
            .next()
            .unwrap();
        assert_eq!(name.kind(), NAME);
        assert_eq!(name.ancestors().count(), 4);
        assert_eq!(name.root().kind(), SOURCE_FILE);
        assert_eq!(name.root().raw_id(), root.raw_id());
    }

    #[test]
    fn replacing_self_shares_everything_off_the_spine() {
        let arena = Arena::new();
        let root = sample(&arena);

        let stmts = root.children().next().unwrap();
        let binding = stmts.children().next().unwrap();
        let value = binding.slot(3).unwrap().into_node().unwrap();

        let session = Arena::new();
        let new_value = session.node(LITERAL, [Some(session.token("2"))]);
        let spliced = session.len();
        let replaced = value.replacing_self(new_value, &session);

        // One new node per ancestor on the path to the root.
        assert_eq!(session.len() - spliced, 3);

        let new_root = replaced.parent().unwrap().root();
        assert_eq!(new_root.kind(), SOURCE_FILE);
        assert_ne!(new_root.raw_id(), root.raw_id());

        // Slots off the spine are shared by identity.
        let new_binding = replaced.parent().unwrap();
        assert_eq!(
            new_binding.slot(1).unwrap().raw_id(),
            binding.slot(1).unwrap().raw_id(),
        );
        assert_eq!(u32::from(new_root.text_len()), 6);
    }

    #[test]
    fn detach_resets_position() {
        let arena = Arena::new();
        let root = sample(&arena);
        let literal = root
            .children()
            .next()
            .unwrap()
            .children()
            .next()
            .unwrap()
            .slot(3)
            .unwrap()
            .into_node()
            .unwrap();

        assert_eq!(u32::from(literal.offset()), 5);
        let detached = literal.detach();
        assert!(detached.parent().is_none());
        assert_eq!(u32::from(detached.offset()), 0);
        assert_eq!(detached.raw_id(), literal.raw_id());
    }
}
