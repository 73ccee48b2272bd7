//! Abstract syntax tree for the Sable language.
//!
//! Node kinds form a closed sum: [`Node`] is a tagged enum over declaration,
//! statement and expression nodes, and operations that branch on node kind
//! pattern-match on it. Every node carries a [`Loc`] whose line is the line
//! of the node's first constituent token.
//!
//! Loop nodes ([`While`], [`Iterate`]) are reference-counted so the
//! parser's loop stack and `break`/`continue` jump targets can refer to a
//! loop while it sits in the tree; their break/continue records are `Cell`s
//! and bodies are filled in once after the loop header is parsed. Jump
//! targets hold `Weak` handles, keeping the tree acyclic for drop purposes.

mod effect;
mod expr;
mod node;

pub use crate::effect::{Effect, Flags};
pub use crate::expr::{Expr, TypeExpr, OP_CALL, OP_INDEX, OP_LIST, OP_SELECTOR, OP_SLICE};
pub use crate::node::{
    terminates, Arg, Assert, Assign, Choose, Const, Field, File, Func, IOManip, If, Iterate,
    Jump, JumpTarget, Loc, LoopMarks, Node, Ret, Status, Struct, Use, Var, While, MAX_IMPLEMENTS,
};
