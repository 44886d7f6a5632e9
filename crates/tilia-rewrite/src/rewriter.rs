//! The tree-rewriting engine.
//!
//! A [`SyntaxRewriter`] decides *what* changes; [`Rewrite`] drives the walk,
//! detects changes by node identity, rebuilds only the layouts that actually
//! changed, and reattaches the result to the original ancestor chain unless
//! the caller detaches it.

use std::panic::{self, AssertUnwindSafe};

use tilia_syntax::ast::{
    ArgList, AstNode, BinaryExpr, Binding, Block, CallExpr, ExprStmt, IfExpr, Literal, Name,
    ParenExpr, PrefixExpr, SourceFile, StmtList,
};
use tilia_syntax::{
    Arena, RawElement, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken, ViewMode,
};

/// A tree-rewriting policy.
///
/// Every per-kind operation defaults to "recurse into the children and
/// rebuild this node around the result"; override the ones the policy cares
/// about. An unchanged subtree is returned as-is, identity included, so a
/// policy that changes nothing allocates nothing.
pub trait SyntaxRewriter {
    /// Traversal filter for this pass.
    fn view_mode(&self) -> ViewMode {
        ViewMode::SourceAccurate
    }

    /// Called before dispatching every visited element.
    fn enter(&mut self, _element: &SyntaxElement) {}

    /// Called after every visited element.
    ///
    /// Fires exactly once per visited element, including when the pass
    /// unwinds out of it.
    fn leave(&mut self, _element: &SyntaxElement) {}

    /// Whole-element interception point, consulted for every element before
    /// kind-specific dispatch -- and before the view mode is applied.
    ///
    /// Returning `Some` replaces the element without visiting its children;
    /// call [`Rewrite::visit`] from the override to recurse explicitly.
    fn rewrite_any(
        &mut self,
        _element: &SyntaxElement,
        _rewrite: &mut Rewrite,
    ) -> Option<SyntaxElement> {
        None
    }

    /// Rewrites a leaf. Defaults to returning it unchanged.
    fn rewrite_token(&mut self, token: &SyntaxToken, _rewrite: &mut Rewrite) -> SyntaxToken {
        token.clone()
    }

    fn rewrite_source_file(&mut self, node: &SourceFile, rewrite: &mut Rewrite) -> SyntaxNode {
        rewrite.rewrite_children(self, node.syntax())
    }

    fn rewrite_block(&mut self, node: &Block, rewrite: &mut Rewrite) -> SyntaxNode {
        rewrite.rewrite_children(self, node.syntax())
    }

    fn rewrite_expr_stmt(&mut self, node: &ExprStmt, rewrite: &mut Rewrite) -> SyntaxNode {
        rewrite.rewrite_children(self, node.syntax())
    }

    fn rewrite_binding(&mut self, node: &Binding, rewrite: &mut Rewrite) -> SyntaxNode {
        rewrite.rewrite_children(self, node.syntax())
    }

    fn rewrite_if_expr(&mut self, node: &IfExpr, rewrite: &mut Rewrite) -> SyntaxNode {
        rewrite.rewrite_children(self, node.syntax())
    }

    fn rewrite_call_expr(&mut self, node: &CallExpr, rewrite: &mut Rewrite) -> SyntaxNode {
        rewrite.rewrite_children(self, node.syntax())
    }

    fn rewrite_binary_expr(&mut self, node: &BinaryExpr, rewrite: &mut Rewrite) -> SyntaxNode {
        rewrite.rewrite_children(self, node.syntax())
    }

    fn rewrite_prefix_expr(&mut self, node: &PrefixExpr, rewrite: &mut Rewrite) -> SyntaxNode {
        rewrite.rewrite_children(self, node.syntax())
    }

    fn rewrite_paren_expr(&mut self, node: &ParenExpr, rewrite: &mut Rewrite) -> SyntaxNode {
        rewrite.rewrite_children(self, node.syntax())
    }

    fn rewrite_literal(&mut self, node: &Literal, rewrite: &mut Rewrite) -> SyntaxNode {
        rewrite.rewrite_children(self, node.syntax())
    }

    fn rewrite_name(&mut self, node: &Name, rewrite: &mut Rewrite) -> SyntaxNode {
        rewrite.rewrite_children(self, node.syntax())
    }

    fn rewrite_stmt_list(&mut self, node: &StmtList, rewrite: &mut Rewrite) -> SyntaxNode {
        rewrite.rewrite_children(self, node.syntax())
    }

    fn rewrite_arg_list(&mut self, node: &ArgList, rewrite: &mut Rewrite) -> SyntaxNode {
        rewrite.rewrite_children(self, node.syntax())
    }

    fn rewrite_error(&mut self, node: &SyntaxNode, rewrite: &mut Rewrite) -> SyntaxNode {
        rewrite.rewrite_children(self, node)
    }
}

/// Rewrites the tree rooted at `node`.
///
/// With `detach` the result is returned standalone; otherwise it is spliced
/// back into `node`'s ancestor chain, yielding an element reachable from a
/// new document root that shares everything outside the rewritten path. If
/// the policy changed nothing, the original handle comes back unchanged.
pub fn rewrite<R: SyntaxRewriter + ?Sized>(
    rewriter: &mut R,
    node: &SyntaxNode,
    detach: bool,
) -> SyntaxElement {
    let mut pass = Rewrite::new(rewriter.view_mode());
    rewrite_impl(rewriter, node, detach, &mut pass)
}

/// Like [`rewrite`], but allocating every node built by the pass into
/// `arena` instead of a lazily created session arena.
pub fn rewrite_in<R: SyntaxRewriter + ?Sized>(
    rewriter: &mut R,
    node: &SyntaxNode,
    detach: bool,
    arena: &Arena,
) -> SyntaxElement {
    let mut pass = Rewrite { view_mode: rewriter.view_mode(), session: Some(arena.clone()) };
    rewrite_impl(rewriter, node, detach, &mut pass)
}

fn rewrite_impl<R: SyntaxRewriter + ?Sized>(
    rewriter: &mut R,
    node: &SyntaxNode,
    detach: bool,
    pass: &mut Rewrite,
) -> SyntaxElement {
    let element = SyntaxElement::Node(node.clone());
    let rewritten = pass.visit(rewriter, &element);
    if detach || node.parent().is_none() {
        return rewritten.detach();
    }
    if rewritten.raw_id() == node.raw_id() {
        return element;
    }
    let arena = pass.session_arena().clone();
    node.replacing_self(rewritten.raw_element(), &arena)
}

/// State of one in-flight rewrite pass.
pub struct Rewrite {
    view_mode: ViewMode,
    session: Option<Arena>,
}

impl Rewrite {
    fn new(view_mode: ViewMode) -> Self {
        Self { view_mode, session: None }
    }

    /// The arena receiving nodes built during this pass, created on first
    /// use so that a pass which changes nothing allocates nothing.
    pub fn session_arena(&mut self) -> &Arena {
        self.session.get_or_insert_with(Arena::new)
    }

    /// Visits one element: override hook, hooks, kind dispatch.
    pub fn visit<R: SyntaxRewriter + ?Sized>(
        &mut self,
        rewriter: &mut R,
        element: &SyntaxElement,
    ) -> SyntaxElement {
        // The dynamic override sees every element, even ones the view mode
        // hides. An element it declines and the view mode hides is returned
        // untouched: no hooks, no dispatch.
        let overridden = rewriter.rewrite_any(element, self);
        if overridden.is_none() && !self.view_mode.should_traverse(element) {
            return element.clone();
        }

        rewriter.enter(element);
        let result = match overridden {
            Some(replacement) => Ok(replacement),
            None => panic::catch_unwind(AssertUnwindSafe(|| self.dispatch(rewriter, element))),
        };
        // `leave` fires on the unwind path as well.
        rewriter.leave(element);
        match result {
            Ok(rewritten) => rewritten,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    fn dispatch<R: SyntaxRewriter + ?Sized>(
        &mut self,
        rewriter: &mut R,
        element: &SyntaxElement,
    ) -> SyntaxElement {
        let node = match element {
            SyntaxElement::Token(token) => {
                return SyntaxElement::Token(rewriter.rewrite_token(token, self));
            }
            SyntaxElement::Node(node) => node,
        };
        let rewritten = match node.kind() {
            SyntaxKind::TOKEN => unreachable!("token handles are dispatched above"),
            SyntaxKind::SOURCE_FILE => rewriter.rewrite_source_file(&cast(node), self),
            SyntaxKind::BLOCK => rewriter.rewrite_block(&cast(node), self),
            SyntaxKind::EXPR_STMT => rewriter.rewrite_expr_stmt(&cast(node), self),
            SyntaxKind::BINDING => rewriter.rewrite_binding(&cast(node), self),
            SyntaxKind::IF_EXPR => rewriter.rewrite_if_expr(&cast(node), self),
            SyntaxKind::CALL_EXPR => rewriter.rewrite_call_expr(&cast(node), self),
            SyntaxKind::BINARY_EXPR => rewriter.rewrite_binary_expr(&cast(node), self),
            SyntaxKind::PREFIX_EXPR => rewriter.rewrite_prefix_expr(&cast(node), self),
            SyntaxKind::PAREN_EXPR => rewriter.rewrite_paren_expr(&cast(node), self),
            SyntaxKind::LITERAL => rewriter.rewrite_literal(&cast(node), self),
            SyntaxKind::NAME => rewriter.rewrite_name(&cast(node), self),
            SyntaxKind::STMT_LIST => rewriter.rewrite_stmt_list(&cast(node), self),
            SyntaxKind::ARG_LIST => rewriter.rewrite_arg_list(&cast(node), self),
            SyntaxKind::ERROR => rewriter.rewrite_error(node, self),
        };
        SyntaxElement::Node(rewritten)
    }

    /// Rewrites `node`'s children and rebuilds `node` only if one of them
    /// changed identity.
    pub fn rewrite_children<R: SyntaxRewriter + ?Sized>(
        &mut self,
        rewriter: &mut R,
        node: &SyntaxNode,
    ) -> SyntaxNode {
        // Stays `None` until a child is actually rewritten; only then is the
        // full slot array copied, unvisited slots included, so filtered or
        // absent slots are never lost.
        let mut new_layout: Option<Vec<Option<RawElement>>> = None;

        for (index, slot) in node.slots().enumerate() {
            let Some(child) = slot else { continue };
            let rewritten = self.visit(rewriter, &child);
            if rewritten.raw_id() == child.raw_id() {
                continue;
            }
            let layout = new_layout.get_or_insert_with(|| node.slot_elements());
            // The element carries the new child's arena keep-alive until the
            // node built from this layout retains it.
            layout[index] = Some(rewritten.raw_element());
        }

        match new_layout {
            None => node.clone(),
            Some(layout) => {
                let raw = self.session_arena().layout(node.kind(), layout, node.presence());
                SyntaxNode::new_root(raw)
            }
        }
    }
}

fn cast<N: AstNode>(node: &SyntaxNode) -> N {
    N::cast(node.clone()).expect("node kind was just matched")
}
