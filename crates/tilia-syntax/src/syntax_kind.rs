//! The closed catalog of node kinds and their fixed shapes.
//!
//! Everything the tree machinery knows about a kind -- slot arity, slot
//! names, which kinds a slot admits -- is fixed here at compile time. The
//! engine itself never hardcodes per-kind structure; it reads it from
//! [`SyntaxKind::shape`].

use crate::SyntaxSet;

#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u16)]
pub enum SyntaxKind {
    /// Leaf carrying opaque lexical text.
    TOKEN,

    SOURCE_FILE,
    BLOCK,
    EXPR_STMT,
    BINDING,
    IF_EXPR,
    CALL_EXPR,
    BINARY_EXPR,
    PREFIX_EXPR,
    PAREN_EXPR,
    LITERAL,
    NAME,

    STMT_LIST,
    ARG_LIST,
    ERROR,
}

use SyntaxKind::*;

/// Kinds that may appear in expression position.
pub const EXPR_KINDS: SyntaxSet = SyntaxSet::new([
    BLOCK,
    IF_EXPR,
    CALL_EXPR,
    BINARY_EXPR,
    PREFIX_EXPR,
    PAREN_EXPR,
    LITERAL,
    NAME,
    ERROR,
]);

/// Kinds that may appear in statement position.
pub const STMT_KINDS: SyntaxSet = SyntaxSet::new([EXPR_STMT, BINDING, ERROR]);

const TOKEN_ONLY: SyntaxSet = SyntaxSet::new([TOKEN]);

const ANY_KIND: SyntaxSet = SyntaxSet::new([
    TOKEN,
    SOURCE_FILE,
    BLOCK,
    EXPR_STMT,
    BINDING,
    IF_EXPR,
    CALL_EXPR,
    BINARY_EXPR,
    PREFIX_EXPR,
    PAREN_EXPR,
    LITERAL,
    NAME,
    STMT_LIST,
    ARG_LIST,
    ERROR,
]);

/// One fixed child position of a layout kind.
#[derive(Clone, Copy, Debug)]
pub struct SlotInfo {
    pub name: &'static str,
    /// Whether the slot may be explicitly absent.
    pub optional: bool,
    /// Kinds a child occupying this slot may have.
    pub allowed: SyntaxSet,
}

const fn slot(name: &'static str, allowed: SyntaxSet) -> SlotInfo {
    SlotInfo { name, optional: false, allowed }
}

const fn optional(name: &'static str, allowed: SyntaxSet) -> SlotInfo {
    SlotInfo { name, optional: true, allowed }
}

const SOURCE_FILE_SLOTS: &[SlotInfo] = &[slot("statements", SyntaxSet::new([STMT_LIST]))];

const BLOCK_SLOTS: &[SlotInfo] = &[
    slot("l_brace", TOKEN_ONLY),
    slot("statements", SyntaxSet::new([STMT_LIST])),
    slot("r_brace", TOKEN_ONLY),
];

const EXPR_STMT_SLOTS: &[SlotInfo] =
    &[slot("expr", EXPR_KINDS), optional("semicolon", TOKEN_ONLY)];

const BINDING_SLOTS: &[SlotInfo] = &[
    slot("val_token", TOKEN_ONLY),
    slot("name", SyntaxSet::new([NAME])),
    optional("eq_token", TOKEN_ONLY),
    optional("value", EXPR_KINDS),
];

const IF_EXPR_SLOTS: &[SlotInfo] = &[
    slot("if_token", TOKEN_ONLY),
    slot("condition", EXPR_KINDS),
    slot("then_branch", SyntaxSet::new([BLOCK])),
    optional("else_token", TOKEN_ONLY),
    optional("else_branch", SyntaxSet::new([BLOCK, IF_EXPR])),
];

const CALL_EXPR_SLOTS: &[SlotInfo] = &[
    slot("callee", EXPR_KINDS),
    slot("l_paren", TOKEN_ONLY),
    slot("args", SyntaxSet::new([ARG_LIST])),
    slot("r_paren", TOKEN_ONLY),
];

const BINARY_EXPR_SLOTS: &[SlotInfo] =
    &[slot("lhs", EXPR_KINDS), slot("op", TOKEN_ONLY), slot("rhs", EXPR_KINDS)];

const PREFIX_EXPR_SLOTS: &[SlotInfo] = &[slot("op", TOKEN_ONLY), slot("operand", EXPR_KINDS)];

const PAREN_EXPR_SLOTS: &[SlotInfo] = &[
    slot("l_paren", TOKEN_ONLY),
    slot("expr", EXPR_KINDS),
    slot("r_paren", TOKEN_ONLY),
];

const LITERAL_SLOTS: &[SlotInfo] = &[slot("token", TOKEN_ONLY)];

const NAME_SLOTS: &[SlotInfo] = &[slot("ident", TOKEN_ONLY)];

/// Structural description of a kind.
#[derive(Clone, Copy, Debug)]
pub enum Shape {
    /// Opaque leaf.
    Token,
    /// Fixed, positionally-meaningful slots.
    Layout(&'static [SlotInfo]),
    /// Ordered homogeneous children drawn from the set.
    Collection(SyntaxSet),
}

impl SyntaxKind {
    /// Returns the shape shared by every node of this kind.
    pub fn shape(self) -> Shape {
        match self {
            TOKEN => Shape::Token,
            SOURCE_FILE => Shape::Layout(SOURCE_FILE_SLOTS),
            BLOCK => Shape::Layout(BLOCK_SLOTS),
            EXPR_STMT => Shape::Layout(EXPR_STMT_SLOTS),
            BINDING => Shape::Layout(BINDING_SLOTS),
            IF_EXPR => Shape::Layout(IF_EXPR_SLOTS),
            CALL_EXPR => Shape::Layout(CALL_EXPR_SLOTS),
            BINARY_EXPR => Shape::Layout(BINARY_EXPR_SLOTS),
            PREFIX_EXPR => Shape::Layout(PREFIX_EXPR_SLOTS),
            PAREN_EXPR => Shape::Layout(PAREN_EXPR_SLOTS),
            LITERAL => Shape::Layout(LITERAL_SLOTS),
            NAME => Shape::Layout(NAME_SLOTS),
            STMT_LIST => Shape::Collection(STMT_KINDS),
            ARG_LIST => Shape::Collection(EXPR_KINDS),
            ERROR => Shape::Collection(ANY_KIND),
        }
    }

    pub fn is_token(self) -> bool {
        matches!(self, TOKEN)
    }

    pub fn is_layout(self) -> bool {
        matches!(self.shape(), Shape::Layout(_))
    }

    pub fn is_collection(self) -> bool {
        matches!(self.shape(), Shape::Collection(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_arity_is_fixed() {
        let Shape::Layout(slots) = BINDING.shape() else {
            panic!("BINDING should be a layout kind");
        };

        assert_eq!(slots.len(), 4);
        assert!(!slots[1].optional);
        assert!(slots[3].optional);
        assert!(slots[3].allowed.contains(LITERAL));
        assert!(!slots[3].allowed.contains(TOKEN));
    }

    #[test]
    fn collections_admit_their_elements() {
        let Shape::Collection(allowed) = STMT_LIST.shape() else {
            panic!("STMT_LIST should be a collection kind");
        };

        assert!(allowed.contains(BINDING));
        assert!(allowed.contains(EXPR_STMT));
        assert!(!allowed.contains(SOURCE_FILE));
    }

    #[test]
    fn token_is_the_only_leaf() {
        for kind in [SOURCE_FILE, BLOCK, STMT_LIST, ERROR] {
            assert!(!kind.is_token(), "{kind:?} is not a leaf");
        }
        assert!(TOKEN.is_token());
        assert!(!TOKEN.is_layout());
        assert!(!TOKEN.is_collection());
    }
}
