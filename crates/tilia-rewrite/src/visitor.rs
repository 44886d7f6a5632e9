//! Read-only traversal.

use tilia_syntax::{SyntaxElement, SyntaxNode, SyntaxToken, ViewMode};

/// What the walk should do after visiting a node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VisitControl {
    /// Descend into the children.
    Continue,
    /// Skip the children but still call `leave_node`.
    SkipChildren,
    /// Halt the walk immediately; no further callbacks fire.
    Stop,
}

/// Read-only tree visitor with pre- and post-order callbacks.
pub trait Visitor {
    /// Traversal filter for this walk.
    fn view_mode(&self) -> ViewMode {
        ViewMode::SourceAccurate
    }

    fn visit_node(&mut self, _node: &SyntaxNode) -> VisitControl {
        VisitControl::Continue
    }

    fn leave_node(&mut self, _node: &SyntaxNode) {}

    fn visit_token(&mut self, _token: &SyntaxToken) {}
}

/// Walks `root` depth-first, children in source order.
///
/// Returns `false` if the visitor stopped the walk early.
pub fn walk<V: Visitor + ?Sized>(visitor: &mut V, root: &SyntaxNode) -> bool {
    let view = visitor.view_mode();
    walk_element(visitor, view, &SyntaxElement::Node(root.clone()))
}

fn walk_element<V: Visitor + ?Sized>(
    visitor: &mut V,
    view: ViewMode,
    element: &SyntaxElement,
) -> bool {
    if !view.should_traverse(element) {
        return true;
    }
    match element {
        SyntaxElement::Token(token) => {
            visitor.visit_token(token);
            true
        }
        SyntaxElement::Node(node) => {
            match visitor.visit_node(node) {
                VisitControl::Stop => return false,
                VisitControl::SkipChildren => {}
                VisitControl::Continue => {
                    for child in node.children_with_tokens() {
                        if !walk_element(visitor, view, &child) {
                            return false;
                        }
                    }
                }
            }
            visitor.leave_node(node);
            true
        }
    }
}
