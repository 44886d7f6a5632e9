//! Typed views over the raw syntax tree.

use crate::SyntaxKind::*;
use crate::{SyntaxNode, SyntaxToken};

/// A typed wrapper around a syntax node of a known kind.
pub trait AstNode: Sized {
    fn cast(syntax: SyntaxNode) -> Option<Self>;

    fn syntax(&self) -> &SyntaxNode;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile(SyntaxNode);

impl SourceFile {
    pub fn statements(&self) -> Option<StmtList> {
        self.0.slot(0)?.into_node().and_then(StmtList::cast)
    }
}

impl AstNode for SourceFile {
    fn cast(syntax: SyntaxNode) -> Option<Self> {
        (syntax.kind() == SOURCE_FILE).then_some(Self(syntax))
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block(SyntaxNode);

impl Block {
    pub fn l_brace(&self) -> Option<SyntaxToken> {
        self.0.slot(0)?.into_token()
    }

    pub fn statements(&self) -> Option<StmtList> {
        self.0.slot(1)?.into_node().and_then(StmtList::cast)
    }

    pub fn r_brace(&self) -> Option<SyntaxToken> {
        self.0.slot(2)?.into_token()
    }
}

impl AstNode for Block {
    fn cast(syntax: SyntaxNode) -> Option<Self> {
        (syntax.kind() == BLOCK).then_some(Self(syntax))
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExprStmt(SyntaxNode);

impl ExprStmt {
    pub fn expr(&self) -> Option<Expr> {
        self.0.slot(0)?.into_node().and_then(Expr::cast)
    }

    pub fn semicolon(&self) -> Option<SyntaxToken> {
        self.0.slot(1)?.into_token()
    }
}

impl AstNode for ExprStmt {
    fn cast(syntax: SyntaxNode) -> Option<Self> {
        (syntax.kind() == EXPR_STMT).then_some(Self(syntax))
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding(SyntaxNode);

impl Binding {
    pub fn val_token(&self) -> Option<SyntaxToken> {
        self.0.slot(0)?.into_token()
    }

    pub fn name(&self) -> Option<Name> {
        self.0.slot(1)?.into_node().and_then(Name::cast)
    }

    pub fn eq_token(&self) -> Option<SyntaxToken> {
        self.0.slot(2)?.into_token()
    }

    pub fn value(&self) -> Option<Expr> {
        self.0.slot(3)?.into_node().and_then(Expr::cast)
    }
}

impl AstNode for Binding {
    fn cast(syntax: SyntaxNode) -> Option<Self> {
        (syntax.kind() == BINDING).then_some(Self(syntax))
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IfExpr(SyntaxNode);

impl IfExpr {
    pub fn if_token(&self) -> Option<SyntaxToken> {
        self.0.slot(0)?.into_token()
    }

    pub fn condition(&self) -> Option<Expr> {
        self.0.slot(1)?.into_node().and_then(Expr::cast)
    }

    pub fn then_branch(&self) -> Option<Block> {
        self.0.slot(2)?.into_node().and_then(Block::cast)
    }

    pub fn else_token(&self) -> Option<SyntaxToken> {
        self.0.slot(3)?.into_token()
    }

    pub fn else_branch(&self) -> Option<Expr> {
        self.0.slot(4)?.into_node().and_then(Expr::cast)
    }
}

impl AstNode for IfExpr {
    fn cast(syntax: SyntaxNode) -> Option<Self> {
        (syntax.kind() == IF_EXPR).then_some(Self(syntax))
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallExpr(SyntaxNode);

impl CallExpr {
    pub fn callee(&self) -> Option<Expr> {
        self.0.slot(0)?.into_node().and_then(Expr::cast)
    }

    pub fn args(&self) -> Option<ArgList> {
        self.0.slot(2)?.into_node().and_then(ArgList::cast)
    }
}

impl AstNode for CallExpr {
    fn cast(syntax: SyntaxNode) -> Option<Self> {
        (syntax.kind() == CALL_EXPR).then_some(Self(syntax))
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryExpr(SyntaxNode);

impl BinaryExpr {
    pub fn lhs(&self) -> Option<Expr> {
        self.0.slot(0)?.into_node().and_then(Expr::cast)
    }

    pub fn op(&self) -> Option<SyntaxToken> {
        self.0.slot(1)?.into_token()
    }

    pub fn rhs(&self) -> Option<Expr> {
        self.0.slot(2)?.into_node().and_then(Expr::cast)
    }
}

impl AstNode for BinaryExpr {
    fn cast(syntax: SyntaxNode) -> Option<Self> {
        (syntax.kind() == BINARY_EXPR).then_some(Self(syntax))
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrefixExpr(SyntaxNode);

impl PrefixExpr {
    pub fn op(&self) -> Option<SyntaxToken> {
        self.0.slot(0)?.into_token()
    }

    pub fn operand(&self) -> Option<Expr> {
        self.0.slot(1)?.into_node().and_then(Expr::cast)
    }
}

impl AstNode for PrefixExpr {
    fn cast(syntax: SyntaxNode) -> Option<Self> {
        (syntax.kind() == PREFIX_EXPR).then_some(Self(syntax))
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParenExpr(SyntaxNode);

impl ParenExpr {
    pub fn expr(&self) -> Option<Expr> {
        self.0.slot(1)?.into_node().and_then(Expr::cast)
    }
}

impl AstNode for ParenExpr {
    fn cast(syntax: SyntaxNode) -> Option<Self> {
        (syntax.kind() == PAREN_EXPR).then_some(Self(syntax))
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Literal(SyntaxNode);

impl Literal {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.0.slot(0)?.into_token()
    }
}

impl AstNode for Literal {
    fn cast(syntax: SyntaxNode) -> Option<Self> {
        (syntax.kind() == LITERAL).then_some(Self(syntax))
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Name(SyntaxNode);

impl Name {
    pub fn ident(&self) -> Option<SyntaxToken> {
        self.0.slot(0)?.into_token()
    }
}

impl AstNode for Name {
    fn cast(syntax: SyntaxNode) -> Option<Self> {
        (syntax.kind() == NAME).then_some(Self(syntax))
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StmtList(SyntaxNode);

impl StmtList {
    pub fn statements(&self) -> impl Iterator<Item = Stmt> + '_ {
        self.0.children().filter_map(Stmt::cast)
    }
}

impl AstNode for StmtList {
    fn cast(syntax: SyntaxNode) -> Option<Self> {
        (syntax.kind() == STMT_LIST).then_some(Self(syntax))
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArgList(SyntaxNode);

impl ArgList {
    pub fn args(&self) -> impl Iterator<Item = Expr> + '_ {
        self.0.children().filter_map(Expr::cast)
    }
}

impl AstNode for ArgList {
    fn cast(syntax: SyntaxNode) -> Option<Self> {
        (syntax.kind() == ARG_LIST).then_some(Self(syntax))
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Block(Block),
    If(IfExpr),
    Call(CallExpr),
    Binary(BinaryExpr),
    Prefix(PrefixExpr),
    Paren(ParenExpr),
    Literal(Literal),
    Name(Name),
}

impl AstNode for Expr {
    fn cast(syntax: SyntaxNode) -> Option<Self> {
        match syntax.kind() {
            BLOCK => Expr::Block(Block(syntax)).into(),
            IF_EXPR => Expr::If(IfExpr(syntax)).into(),
            CALL_EXPR => Expr::Call(CallExpr(syntax)).into(),
            BINARY_EXPR => Expr::Binary(BinaryExpr(syntax)).into(),
            PREFIX_EXPR => Expr::Prefix(PrefixExpr(syntax)).into(),
            PAREN_EXPR => Expr::Paren(ParenExpr(syntax)).into(),
            LITERAL => Expr::Literal(Literal(syntax)).into(),
            NAME => Expr::Name(Name(syntax)).into(),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Expr::Block(it) => it.syntax(),
            Expr::If(it) => it.syntax(),
            Expr::Call(it) => it.syntax(),
            Expr::Binary(it) => it.syntax(),
            Expr::Prefix(it) => it.syntax(),
            Expr::Paren(it) => it.syntax(),
            Expr::Literal(it) => it.syntax(),
            Expr::Name(it) => it.syntax(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Stmt {
    Expr(ExprStmt),
    Binding(Binding),
}

impl AstNode for Stmt {
    fn cast(syntax: SyntaxNode) -> Option<Self> {
        match syntax.kind() {
            EXPR_STMT => Stmt::Expr(ExprStmt(syntax)).into(),
            BINDING => Stmt::Binding(Binding(syntax)).into(),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Stmt::Expr(it) => it.syntax(),
            Stmt::Binding(it) => it.syntax(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    #[test]
    fn typed_accessors_follow_slots() {
        let arena = Arena::new();
        let value = arena.node(
            BINARY_EXPR,
            [
                Some(arena.node(NAME, [Some(arena.token("a"))])),
                Some(arena.token("+")),
                Some(arena.node(LITERAL, [Some(arena.token("1"))])),
            ],
        );
        let binding = arena.node(
            BINDING,
            [
                Some(arena.token("val")),
                Some(arena.node(NAME, [Some(arena.token("x"))])),
                Some(arena.token("=")),
                Some(value),
            ],
        );

        let binding = Binding::cast(SyntaxNode::new_root(binding)).unwrap();
        assert_eq!(binding.val_token().unwrap().text(), "val");
        assert_eq!(binding.name().unwrap().ident().unwrap().text(), "x");

        let Some(Expr::Binary(value)) = binding.value() else {
            panic!("expected a binary expression value");
        };
        assert_eq!(value.op().unwrap().text(), "+");
        let Some(Expr::Name(lhs)) = value.lhs() else {
            panic!("expected a name lhs");
        };
        assert_eq!(lhs.ident().unwrap().text(), "a");
    }

    #[test]
    fn optional_slots_read_as_none() {
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

        let binding = Binding::cast(SyntaxNode::new_root(binding)).unwrap();
        assert!(binding.eq_token().is_none());
        assert!(binding.value().is_none());
    }

    #[test]
    fn list_wrappers_iterate_elements() {
        let arena = Arena::new();
        let stmt = |text: &str| {
            arena.node(
                EXPR_STMT,
                [Some(arena.node(NAME, [Some(arena.token(text))])), None],
            )
        };
        let stmts = arena.collection(STMT_LIST, [stmt("a"), stmt("b"), stmt("c")]);
        let file = SourceFile::cast(SyntaxNode::new_root(
            arena.node(SOURCE_FILE, [Some(stmts)]),
        ))
        .unwrap();

        let statements: Vec<_> = file.statements().unwrap().statements().collect();
        assert_eq!(statements.len(), 3);
        assert!(matches!(statements[0], Stmt::Expr(_)));
    }
}
