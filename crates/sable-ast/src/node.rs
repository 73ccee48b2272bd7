//! Declaration and statement nodes, the `Node` sum, and block queries.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use sable_token::Id;

use crate::effect::{Effect, Flags};
use crate::expr::{Expr, TypeExpr};

/// Upper bound on a struct's `implements` list.
pub const MAX_IMPLEMENTS: usize = 16;

/// Source attribution: the file a node came from and the 1-based line of
/// its first token.
#[derive(Clone, Debug)]
pub struct Loc {
    pub filename: Rc<str>,
    pub line: u32,
}

impl Loc {
    pub fn new(filename: Rc<str>, line: u32) -> Loc {
        Loc { filename, line }
    }
}

/// The closed sum of AST node kinds.
#[derive(Debug)]
pub enum Node {
    Use(Use),
    Const(Const),
    Func(Func),
    Status(Status),
    Struct(Struct),
    Field(Field),
    TypeExpr(TypeExpr),
    Expr(Expr),
    Assert(Assert),
    Assign(Assign),
    Var(Var),
    Arg(Arg),
    Ret(Ret),
    Jump(Jump),
    While(Rc<While>),
    Iterate(Rc<Iterate>),
    If(If),
    IOManip(IOManip),
    Choose(Choose),
}

impl Node {
    pub fn as_expr(&self) -> Option<&Expr> {
        match self {
            Node::Expr(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_type_expr(&self) -> Option<&TypeExpr> {
        match self {
            Node::TypeExpr(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_assert(&self) -> Option<&Assert> {
        match self {
            Node::Assert(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<&Field> {
        match self {
            Node::Field(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_assign(&self) -> Option<&Assign> {
        match self {
            Node::Assign(a) => Some(a),
            _ => None,
        }
    }
}

macro_rules! into_node {
    ($($kind:ident($ty:ty)),+ $(,)?) => {
        $(impl From<$ty> for Node {
            fn from(n: $ty) -> Node {
                Node::$kind(n)
            }
        })+
    };
}

into_node! {
    Use(Use),
    Const(Const),
    Func(Func),
    Status(Status),
    Struct(Struct),
    Field(Field),
    TypeExpr(TypeExpr),
    Expr(Expr),
    Assert(Assert),
    Assign(Assign),
    Var(Var),
    Arg(Arg),
    Ret(Ret),
    Jump(Jump),
    While(Rc<While>),
    Iterate(Rc<Iterate>),
    If(If),
    IOManip(IOManip),
    Choose(Choose),
}

/// A parsed source file: the root of the tree.
#[derive(Debug)]
pub struct File {
    pub filename: Rc<str>,
    pub decls: Vec<Node>,
}

impl File {
    pub fn new(filename: Rc<str>, decls: Vec<Node>) -> File {
        File { filename, decls }
    }
}

/// `use "path"`.
#[derive(Debug)]
pub struct Use {
    pub loc: Loc,
    pub path: Id,
}

impl Use {
    pub fn new(loc: Loc, path: Id) -> Use {
        Use { loc, path }
    }
}

/// `pub const NAME : type = value` (or `pri`).
#[derive(Debug)]
pub struct Const {
    pub loc: Loc,
    pub flags: Flags,
    pub name: Id,
    pub xtype: TypeExpr,
    pub value: Expr,
}

impl Const {
    pub fn new(loc: Loc, flags: Flags, name: Id, xtype: TypeExpr, value: Expr) -> Const {
        Const {
            loc,
            flags,
            name,
            xtype,
            value,
        }
    }
}

/// `pub status "message"` (or `pri`).
#[derive(Debug)]
pub struct Status {
    pub loc: Loc,
    pub flags: Flags,
    pub message: Id,
}

impl Status {
    pub fn new(loc: Loc, flags: Flags, message: Id) -> Status {
        Status {
            loc,
            flags,
            message,
        }
    }
}

/// A struct field or function argument: `name : type`.
#[derive(Debug)]
pub struct Field {
    pub loc: Loc,
    pub flags: Flags,
    pub name: Id,
    pub xtype: TypeExpr,
}

impl Field {
    pub fn new(loc: Loc, flags: Flags, name: Id, xtype: TypeExpr) -> Field {
        Field {
            loc,
            flags,
            name,
            xtype,
        }
    }
}

/// A struct declaration. Function in-parameters reuse this shape as an
/// anonymous struct named `args`.
#[derive(Debug)]
pub struct Struct {
    pub loc: Loc,
    pub flags: Flags,
    pub name: Id,
    pub implements: Vec<Node>,
    pub fields: Vec<Node>,
}

impl Struct {
    pub fn new(loc: Loc, flags: Flags, name: Id, implements: Vec<Node>, fields: Vec<Node>) -> Struct {
        Struct {
            loc,
            flags,
            name,
            implements,
            fields,
        }
    }
}

/// A function declaration, free-standing or attached to a receiver.
#[derive(Debug)]
pub struct Func {
    pub loc: Loc,
    pub flags: Flags,
    pub receiver: Id,
    pub name: Id,
    /// The in-parameters, wrapped as a struct named `args`.
    pub args: Struct,
    pub out: Option<TypeExpr>,
    pub asserts: Vec<Node>,
    pub body: Vec<Node>,
}

impl Func {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        loc: Loc,
        flags: Flags,
        receiver: Id,
        name: Id,
        args: Struct,
        out: Option<TypeExpr>,
        asserts: Vec<Node>,
        body: Vec<Node>,
    ) -> Func {
        Func {
            loc,
            flags,
            receiver,
            name,
            args,
            out,
            asserts,
            body,
        }
    }

    pub fn effect(&self) -> Effect {
        Effect::from_flags(self.flags)
    }
}

/// An assertion clause: `assert`, `pre`, `inv`, `post` or `choose`,
/// optionally with a `via "reason" (args)` tail.
#[derive(Debug)]
pub struct Assert {
    pub loc: Loc,
    pub keyword: Id,
    pub condition: Expr,
    pub reason: Id,
    pub args: Vec<Node>,
}

impl Assert {
    pub fn new(loc: Loc, keyword: Id, condition: Expr, reason: Id, args: Vec<Node>) -> Assert {
        Assert {
            loc,
            keyword,
            condition,
            reason,
            args,
        }
    }

    /// Whether a `choose` clause's condition selects on CPU architecture:
    /// `cpu_arch >= <built-in arch id>`.
    pub fn is_choose_cpu_arch(&self) -> bool {
        let c = &self.condition;
        if c.operator != Id::X_BINARY_GREATER_EQ {
            return false;
        }
        let lhs_is_cpu_arch = c
            .lhs_expr()
            .is_some_and(|l| l.operator == Id::INVALID && l.ident == Id::CPU_ARCH);
        let rhs_is_arch = c
            .rhs_expr()
            .is_some_and(|r| r.operator == Id::INVALID && r.ident.is_cpu_arch());
        lhs_is_cpu_arch && rhs_is_arch
    }
}

/// An assignment statement, or a bare expression statement (operator `=`
/// with no LHS).
#[derive(Debug)]
pub struct Assign {
    pub loc: Loc,
    pub operator: Id,
    pub lhs: Option<Expr>,
    pub rhs: Expr,
}

impl Assign {
    pub fn new(loc: Loc, operator: Id, lhs: Option<Expr>, rhs: Expr) -> Assign {
        Assign {
            loc,
            operator,
            lhs,
            rhs,
        }
    }
}

/// `var name : type`.
#[derive(Debug)]
pub struct Var {
    pub loc: Loc,
    pub name: Id,
    pub xtype: TypeExpr,
}

impl Var {
    pub fn new(loc: Loc, name: Id, xtype: TypeExpr) -> Var {
        Var { loc, name, xtype }
    }
}

/// A named call argument: `name : value`.
#[derive(Debug)]
pub struct Arg {
    pub loc: Loc,
    pub name: Id,
    pub value: Expr,
}

impl Arg {
    pub fn new(loc: Loc, name: Id, value: Expr) -> Arg {
        Arg { loc, name, value }
    }
}

/// `return value` or `yield? value`.
#[derive(Debug)]
pub struct Ret {
    pub loc: Loc,
    pub keyword: Id,
    pub value: Expr,
}

impl Ret {
    pub fn new(loc: Loc, keyword: Id, value: Expr) -> Ret {
        Ret {
            loc,
            keyword,
            value,
        }
    }
}

/// `break` or `continue`, optionally labeled, resolved to its loop.
#[derive(Debug)]
pub struct Jump {
    pub loc: Loc,
    pub keyword: Id,
    pub label: Id,
    pub target: JumpTarget,
}

impl Jump {
    pub fn new(loc: Loc, keyword: Id, label: Id, target: JumpTarget) -> Jump {
        Jump {
            loc,
            keyword,
            label,
            target,
        }
    }
}

/// Weak handle to the loop a jump exits or restarts. Weak, so the
/// loop-body-contains-jump cycle cannot leak.
#[derive(Clone, Debug)]
pub enum JumpTarget {
    While(Weak<While>),
    Iterate(Weak<Iterate>),
}

/// `if.likely?/unlikely? cond { } else ...` chain.
#[derive(Debug)]
pub struct If {
    pub loc: Loc,
    pub likelihood: Id,
    pub condition: Expr,
    pub body_if_true: Vec<Node>,
    pub body_if_false: Vec<Node>,
    pub else_if: Option<Box<If>>,
}

impl If {
    pub fn new(
        loc: Loc,
        likelihood: Id,
        condition: Expr,
        body_if_true: Vec<Node>,
        body_if_false: Vec<Node>,
        else_if: Option<Box<If>>,
    ) -> If {
        If {
            loc,
            likelihood,
            condition,
            body_if_true,
            body_if_false,
            else_if,
        }
    }
}

/// Break/continue bookkeeping shared by the two loop kinds. The parser
/// records jumps while the loop is still open on its stack, hence `Cell`s.
#[derive(Debug, Default)]
pub struct LoopMarks {
    has_break: Cell<bool>,
    has_continue: Cell<bool>,
    has_deep_break: Cell<bool>,
    has_deep_continue: Cell<bool>,
}

impl LoopMarks {
    pub fn set_has_break(&self, deep: bool) {
        self.has_break.set(true);
        if deep {
            self.has_deep_break.set(true);
        }
    }

    pub fn set_has_continue(&self, deep: bool) {
        self.has_continue.set(true);
        if deep {
            self.has_deep_continue.set(true);
        }
    }

    pub fn has_break(&self) -> bool {
        self.has_break.get()
    }

    pub fn has_continue(&self) -> bool {
        self.has_continue.get()
    }

    pub fn has_deep_break(&self) -> bool {
        self.has_deep_break.get()
    }

    pub fn has_deep_continue(&self) -> bool {
        self.has_deep_continue.get()
    }
}

/// `while.label? cond, asserts { body } endwhile.label?`.
///
/// The body is filled in once after the header goes on the loop stack.
#[derive(Debug)]
pub struct While {
    pub loc: Loc,
    pub label: Id,
    pub condition: Expr,
    pub asserts: Vec<Node>,
    pub body: RefCell<Vec<Node>>,
    pub marks: LoopMarks,
}

impl While {
    pub fn new(loc: Loc, label: Id, condition: Expr, asserts: Vec<Node>) -> While {
        While {
            loc,
            label,
            condition,
            asserts,
            body: RefCell::new(Vec::new()),
            marks: LoopMarks::default(),
        }
    }

    pub fn set_body(&self, body: Vec<Node>) {
        *self.body.borrow_mut() = body;
    }

    /// Whether the condition is the bare literal `true`.
    pub fn is_while_true(&self) -> bool {
        self.condition.operator == Id::INVALID && self.condition.ident == Id::TRUE
    }
}

/// `iterate.label? (assigns) (length: N, advance: M, unroll: U) { body }`
/// with an optional chained `else` iterate block.
#[derive(Debug)]
pub struct Iterate {
    pub loc: Loc,
    pub label: Id,
    pub assigns: Vec<Node>,
    pub length: Id,
    pub advance: Id,
    pub unroll: Id,
    pub asserts: Vec<Node>,
    pub body: RefCell<Vec<Node>>,
    pub else_iterate: RefCell<Option<Rc<Iterate>>>,
    pub marks: LoopMarks,
}

impl Iterate {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        loc: Loc,
        label: Id,
        assigns: Vec<Node>,
        length: Id,
        advance: Id,
        unroll: Id,
        asserts: Vec<Node>,
    ) -> Iterate {
        Iterate {
            loc,
            label,
            assigns,
            length,
            advance,
            unroll,
            asserts,
            body: RefCell::new(Vec::new()),
            else_iterate: RefCell::new(None),
            marks: LoopMarks::default(),
        }
    }

    pub fn set_body(&self, body: Vec<Node>) {
        *self.body.borrow_mut() = body;
    }

    pub fn set_else_iterate(&self, tail: Rc<Iterate>) {
        *self.else_iterate.borrow_mut() = Some(tail);
    }
}

/// `io_bind (io: a, data: b, history_position: c) { body }` or
/// `io_limit (io: a, limit: b) { body }`.
#[derive(Debug)]
pub struct IOManip {
    pub loc: Loc,
    pub keyword: Id,
    pub io: Expr,
    pub arg1: Expr,
    pub history_position: Option<Expr>,
    pub body: Vec<Node>,
}

impl IOManip {
    pub fn new(
        loc: Loc,
        keyword: Id,
        io: Expr,
        arg1: Expr,
        history_position: Option<Expr>,
        body: Vec<Node>,
    ) -> IOManip {
        IOManip {
            loc,
            keyword,
            io,
            arg1,
            history_position,
            body,
        }
    }
}

/// The `choose` statement: `choose name = [candidate, ...]`.
#[derive(Debug)]
pub struct Choose {
    pub loc: Loc,
    pub name: Id,
    pub args: Vec<Node>,
}

impl Choose {
    pub fn new(loc: Loc, name: Id, args: Vec<Node>) -> Choose {
        Choose { loc, name, args }
    }
}

/// Whether a block provably transfers control out of its enclosing loop:
/// its last statement is a jump, a `return`, or an if/else-if chain with a
/// final else all of whose branches terminate.
pub fn terminates(body: &[Node]) -> bool {
    match body.last() {
        Some(Node::Jump(_)) => true,
        Some(Node::Ret(r)) => r.keyword == Id::RETURN,
        Some(Node::If(i)) => if_terminates(i),
        _ => false,
    }
}

fn if_terminates(i: &If) -> bool {
    if !terminates(&i.body_if_true) {
        return false;
    }
    if let Some(else_if) = &i.else_if {
        return if_terminates(else_if);
    }
    !i.body_if_false.is_empty() && terminates(&i.body_if_false)
}
