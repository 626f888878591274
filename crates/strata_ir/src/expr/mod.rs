//! The expression core: a hash-consed DAG of four-state expressions.
//!
//! Nodes are constants, variables or calls of a fixed [`Func`] on child
//! nodes. Every module owns one [`ExprManager`]; the flattened design owns
//! another, into which module expressions are translated.

pub mod func;
pub mod manager;
pub mod var;

pub use func::{Func, Simplified};
pub use manager::{ExprManager, ExprNode};
pub use var::{VarName, Variable};
