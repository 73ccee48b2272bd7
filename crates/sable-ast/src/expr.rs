//! Expression and type-expression nodes.

use sable_token::{Id, Map};

use crate::effect::{Effect, Flags};
use crate::node::{Loc, Node};

/// Operator id for a call expression: the `(` token.
pub const OP_CALL: Id = Id::OPEN_PAREN;
/// Operator id for an index expression: the `[` token.
pub const OP_INDEX: Id = Id::OPEN_BRACKET;
/// Operator id for a slice expression: the `..` token.
pub const OP_SLICE: Id = Id::DOT_DOT;
/// Operator id for a selector expression: the `.` token.
pub const OP_SELECTOR: Id = Id::DOT;
/// Operator id for a bracketed list expression: the `,` token.
pub const OP_LIST: Id = Id::COMMA;

/// An expression node.
///
/// The `operator` distinguishes the shape; [`Id::INVALID`] means a leaf
/// (literal or identifier) whose value is `ident`. For compound shapes the
/// operand slots are used as follows:
///
/// | operator | ident | lhs | mhs | rhs | args |
/// |---|---|---|---|---|---|
/// | leaf | value | | | | |
/// | unary form | | | | operand | |
/// | binary form | | left | | right (`as`: type expr) | |
/// | associative form | | | | | operands |
/// | [`OP_CALL`] | | callee | | | named args |
/// | [`OP_INDEX`] | | array | | index | |
/// | [`OP_SLICE`] | | array | low | high | |
/// | [`OP_SELECTOR`] | field | container | | | |
/// | [`OP_LIST`] | | | | | elements |
///
/// Call expressions carry their effect in `flags`; every other shape is
/// constructed effect-free.
#[derive(Debug)]
pub struct Expr {
    pub loc: Loc,
    pub flags: Flags,
    pub operator: Id,
    pub ident: Id,
    pub lhs: Option<Box<Node>>,
    pub mhs: Option<Box<Node>>,
    pub rhs: Option<Box<Node>>,
    pub args: Vec<Node>,
}

impl Expr {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        loc: Loc,
        flags: Flags,
        operator: Id,
        ident: Id,
        lhs: Option<Box<Node>>,
        mhs: Option<Box<Node>>,
        rhs: Option<Box<Node>>,
        args: Vec<Node>,
    ) -> Expr {
        Expr {
            loc,
            flags,
            operator,
            ident,
            lhs,
            mhs,
            rhs,
            args,
        }
    }

    /// A leaf expression: a lone literal or identifier.
    pub fn leaf(loc: Loc, ident: Id) -> Expr {
        Expr::new(loc, Flags::default(), Id::INVALID, ident, None, None, None, Vec::new())
    }

    /// This node's own effect (children not considered).
    pub fn effect(&self) -> Effect {
        Effect::from_flags(self.flags)
    }

    /// Whether any strict sub-expression carries an effect.
    ///
    /// A top-level effect-annotated call answers `false` here; the same
    /// call nested under an operator makes the parent answer `true`.
    pub fn sub_expr_has_effect(&self) -> bool {
        self.children().any(tree_has_effect)
    }

    /// For a selector expression rooted at the bare identifier `args`,
    /// the selected field; `None` otherwise.
    pub fn is_args_dot_foo(&self) -> Option<Id> {
        if self.operator != OP_SELECTOR {
            return None;
        }
        match self.lhs_expr() {
            Some(root) if root.operator == Id::INVALID && root.ident == Id::ARGS => {
                Some(self.ident)
            }
            _ => None,
        }
    }

    pub fn lhs_expr(&self) -> Option<&Expr> {
        self.lhs.as_deref().and_then(Node::as_expr)
    }

    pub fn rhs_expr(&self) -> Option<&Expr> {
        self.rhs.as_deref().and_then(Node::as_expr)
    }

    fn children(&self) -> impl Iterator<Item = &Node> {
        self.lhs
            .as_deref()
            .into_iter()
            .chain(self.mhs.as_deref())
            .chain(self.rhs.as_deref())
            .chain(self.args.iter())
    }

    /// Render this expression in source shape for diagnostics.
    pub fn str(&self, map: &Map) -> String {
        match self.operator {
            Id::INVALID => map.by_id(self.ident).to_string(),
            OP_CALL => {
                let args = self
                    .args
                    .iter()
                    .map(|a| node_str(a, map))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "{}{}({})",
                    opt_str(&self.lhs, map),
                    self.effect(),
                    args
                )
            }
            OP_INDEX => format!("{}[{}]", opt_str(&self.lhs, map), opt_str(&self.rhs, map)),
            OP_SLICE => format!(
                "{}[{} .. {}]",
                opt_str(&self.lhs, map),
                opt_str(&self.mhs, map),
                opt_str(&self.rhs, map)
            ),
            OP_SELECTOR => format!("{}.{}", opt_str(&self.lhs, map), map.by_id(self.ident)),
            OP_LIST => {
                let elems = self
                    .args
                    .iter()
                    .map(|a| node_str(a, map))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("[{}]", elems)
            }
            op if op == Id::X_UNARY_NOT => format!("not {}", opt_str(&self.rhs, map)),
            op if op.0 >= Id::X_UNARY_PLUS.0 && op.0 <= Id::X_UNARY_NOT.0 => {
                format!("{}{}", map.by_id(op), opt_str(&self.rhs, map))
            }
            op if op.0 >= Id::X_ASSOCIATIVE_PLUS.0 => {
                let sep = format!(" {} ", map.by_id(op));
                self.args
                    .iter()
                    .map(|a| node_str(a, map))
                    .collect::<Vec<_>>()
                    .join(&sep)
            }
            op => format!(
                "{} {} {}",
                opt_str(&self.lhs, map),
                map.by_id(op),
                opt_str(&self.rhs, map)
            ),
        }
    }
}

/// Whether `e` or anything below it carries an effect.
fn tree_has_effect(node: &Node) -> bool {
    match node {
        Node::Expr(e) => !e.effect().is_pure() || e.children().any(tree_has_effect),
        Node::Arg(a) => !a.value.effect().is_pure() || a.value.children().any(tree_has_effect),
        _ => false,
    }
}

fn opt_str(node: &Option<Box<Node>>, map: &Map) -> String {
    node.as_deref().map(|n| node_str(n, map)).unwrap_or_default()
}

fn node_str(node: &Node, map: &Map) -> String {
    match node {
        Node::Expr(e) => e.str(map),
        Node::TypeExpr(t) => t.str(map),
        Node::Arg(a) => format!("{}: {}", map.by_id(a.name), a.value.str(map)),
        _ => String::new(),
    }
}

/// A type expression.
///
/// `decorator` is [`Id::INVALID`] for a plain qualified name, or one of
/// `nptr`, `ptr`, `array`, `roarray`, `slice`, `roslice`, `table`,
/// `rotable` wrapping `inner`. For `array`/`roarray` the element count
/// lives in `lhs`; for a refined numeric base type `lhs`/`mhs` hold the
/// `[lo ..= hi]` bounds.
#[derive(Debug)]
pub struct TypeExpr {
    pub loc: Loc,
    pub decorator: Id,
    pub pkg: Id,
    pub name: Id,
    pub lhs: Option<Box<Expr>>,
    pub mhs: Option<Box<Expr>>,
    pub inner: Option<Box<TypeExpr>>,
}

impl TypeExpr {
    pub fn new(
        loc: Loc,
        decorator: Id,
        pkg: Id,
        name: Id,
        lhs: Option<Box<Expr>>,
        mhs: Option<Box<Expr>>,
        inner: Option<Box<TypeExpr>>,
    ) -> TypeExpr {
        TypeExpr {
            loc,
            decorator,
            pkg,
            name,
            lhs,
            mhs,
            inner,
        }
    }

    /// The qualified name `(pkg, name)`; both are [`Id::INVALID`] on
    /// decorated types.
    pub fn qid(&self) -> (Id, Id) {
        (self.pkg, self.name)
    }

    /// Whether a refinement `[lo ..= hi]` is attached. Only meaningful on
    /// non-decorated types; decorated arrays keep their length in the same
    /// slot.
    pub fn is_refined(&self) -> bool {
        self.lhs.is_some() || self.mhs.is_some()
    }

    /// Whether this is an undecorated numeric base-type name.
    pub fn is_num_type(&self) -> bool {
        self.decorator == Id::INVALID && self.name.is_num_type()
    }

    /// Follow `inner` links down to the undecorated core type.
    pub fn innermost(&self) -> &TypeExpr {
        let mut t = self;
        while let Some(inner) = t.inner.as_deref() {
            t = inner;
        }
        t
    }

    /// Render this type in source shape for diagnostics.
    pub fn str(&self, map: &Map) -> String {
        match self.decorator {
            Id::INVALID => {
                let mut s = String::new();
                if self.pkg != Id::INVALID {
                    s.push_str(map.by_id(self.pkg));
                    s.push('.');
                }
                s.push_str(map.by_id(self.name));
                if self.is_refined() {
                    let lo = self.lhs.as_deref().map(|e| e.str(map)).unwrap_or_default();
                    let hi = self.mhs.as_deref().map(|e| e.str(map)).unwrap_or_default();
                    s.push_str(&format!("[{} ..= {}]", lo, hi));
                }
                s
            }
            Id::ARRAY | Id::ROARRAY => {
                let len = self.lhs.as_deref().map(|e| e.str(map)).unwrap_or_default();
                let inner = self.inner.as_deref().map(|t| t.str(map)).unwrap_or_default();
                format!("{}[{}] {}", map.by_id(self.decorator), len, inner)
            }
            decorator => {
                let inner = self.inner.as_deref().map(|t| t.str(map)).unwrap_or_default();
                format!("{} {}", map.by_id(decorator), inner)
            }
        }
    }
}
