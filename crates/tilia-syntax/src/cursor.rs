//! Preorder traversal over node handles.

use crate::node::{SyntaxElement, SyntaxElements, SyntaxNode, SyntaxToken};

/// Preorder walk event for nodes.
#[derive(Clone, Debug)]
pub enum WalkEvent {
    Enter(SyntaxNode),
    Leave(SyntaxNode),
}

/// Preorder walk event including tokens.
#[derive(Clone, Debug)]
pub enum WalkEventWithTokens {
    EnterNode(SyntaxNode),
    LeaveNode(SyntaxNode),
    Token(SyntaxToken),
}

/// Preorder traversal over nodes.
pub struct Preorder {
    inner: PreorderWithTokens,
}

impl Preorder {
    /// Skips the rest of the subtree the walk is currently inside.
    pub fn skip_subtree(&mut self) {
        self.inner.skip_subtree();
    }
}

impl Iterator for Preorder {
    type Item = WalkEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.find_map(|event| match event {
            WalkEventWithTokens::EnterNode(node) => Some(WalkEvent::Enter(node)),
            WalkEventWithTokens::LeaveNode(node) => Some(WalkEvent::Leave(node)),
            WalkEventWithTokens::Token(_) => None,
        })
    }
}

/// Preorder traversal over nodes and tokens.
pub struct PreorderWithTokens {
    stack: Vec<(SyntaxNode, SyntaxElements)>,
    root: Option<SyntaxNode>,
}

impl PreorderWithTokens {
    fn new(start: SyntaxNode) -> Self {
        Self { stack: Vec::with_capacity(16), root: Some(start) }
    }

    /// Skips the rest of the subtree the walk is currently inside.
    pub fn skip_subtree(&mut self) {
        assert!(self.stack.pop().is_some(), "must have a subtree to skip");
    }
}

impl Iterator for PreorderWithTokens {
    type Item = WalkEventWithTokens;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.root.take() {
            self.stack.push((root.clone(), root.elements()));
            return Some(WalkEventWithTokens::EnterNode(root));
        }

        let (_, active) = self.stack.last_mut()?;
        match active.next() {
            Some(SyntaxElement::Node(child)) => {
                self.stack.push((child.clone(), child.elements()));
                Some(WalkEventWithTokens::EnterNode(child))
            }
            Some(SyntaxElement::Token(token)) => Some(WalkEventWithTokens::Token(token)),
            None => {
                let (exited, _) = self.stack.pop().expect("a frame is active");
                Some(WalkEventWithTokens::LeaveNode(exited))
            }
        }
    }
}

impl SyntaxNode {
    /// Returns a preorder iterator over nodes.
    pub fn preorder(&self) -> Preorder {
        Preorder { inner: self.preorder_with_tokens() }
    }

    /// Returns a preorder iterator over nodes and tokens.
    pub fn preorder_with_tokens(&self) -> PreorderWithTokens {
        PreorderWithTokens::new(self.clone())
    }
}
