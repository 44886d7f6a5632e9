//! Traversal filters.

use crate::SyntaxElement;

/// Determines which nodes are visible during a walk.
///
/// Filtering affects visitation only; the structure stored in the tree is
/// never altered by a view mode.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ViewMode {
    /// Skip nodes with no corresponding source text (synthesized during
    /// error recovery).
    #[default]
    SourceAccurate,
    /// Visit every node, missing ones included.
    FixedUp,
}

impl ViewMode {
    pub fn should_traverse(self, element: &SyntaxElement) -> bool {
        match self {
            Self::SourceAccurate => !element.is_missing(),
            Self::FixedUp => true,
        }
    }
}
