//! Immutable, arena-allocated syntax trees with structural sharing.
//!
//! Raw nodes live in reference-counted arenas and are never mutated after
//! construction; handles pair a raw node with the keep-alive and positional
//! context needed to navigate it. Replacing a subtree rebuilds only the spine
//! above it -- everything else is shared by identity between the old and the
//! new tree.

/// Typed AST wrappers around the raw syntax tree.
pub mod ast;

mod arena;
mod cursor;
mod node;
mod raw;
mod syntax_kind;
mod syntax_set;
mod view;

/// Allocation regions and the raw-node/keep-alive pair.
pub use arena::{Arena, RawElement};
/// Preorder traversal over handles.
pub use cursor::{Preorder, PreorderWithTokens, WalkEvent, WalkEventWithTokens};
/// Node handles and child iterators.
pub use node::{NodeOrToken, Slots, SyntaxElement, SyntaxElements, SyntaxNode, SyntaxToken};
/// Raw node surface: presence flag, node payload, and identity.
pub use raw::{Presence, RawNode, RawNodeId};
/// The kind catalog and its shape tables.
pub use syntax_kind::{EXPR_KINDS, STMT_KINDS, Shape, SlotInfo, SyntaxKind};
/// Compact set for grouping `SyntaxKind` values.
pub use syntax_set::SyntaxSet;
/// Traversal filter.
pub use view::ViewMode;
