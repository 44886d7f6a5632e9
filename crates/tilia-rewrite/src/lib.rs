//! Copy-on-write rewriting over tilia syntax trees.
//!
//! The rewriter walks a tree depth-first, dispatches each node to the most
//! specific policy operation for its kind, and rebuilds a layout only when a
//! child actually changed identity. Cost is proportional to the changed
//! nodes and their ancestors, never to the size of the tree.

mod rewriter;
mod visitor;

pub use rewriter::{Rewrite, SyntaxRewriter, rewrite, rewrite_in};
pub use visitor::{VisitControl, Visitor, walk};
