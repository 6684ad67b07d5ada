//! # Reducer Contract
//!
//! The harness drives any tree reducer through [`Reducer`]: an annotation pass,
//! value reduction toward a target kind, and a reachability query. Reducers
//! keep per-node results in an [`Annotations`] side table, so trees stay
//! read-only after loading.
//!
//! [`calculator`] is the reducer the command-line tool ships with.

use std::fmt;

use thiserror::Error;

use crate::ast::{Annotations, NodeId, Tree};
use crate::registry::{Nonterminal, OpCode};

pub mod calculator;

pub use calculator::{Calculator, CalculatorReducer, StateId};

/// A tree reducer under test.
///
/// One instance is reused for every testcase; each testcase gets a fresh
/// annotation table.
pub trait Reducer {
    /// Semantic actions consulted during reduction.
    type Context;
    /// Per-node label written by [`Reducer::label`]. Shown in tree dumps.
    type Annotation: fmt::Display;

    /// Annotates every node of `tree`. Never alters shape or payloads.
    fn label(
        &mut self,
        ctx: &Self::Context,
        tree: Option<&Tree>,
        annotations: &mut Annotations<Self::Annotation>,
    );

    /// Reduces a labeled tree to a value of kind `goal`.
    fn reduce(
        &self,
        ctx: &Self::Context,
        tree: Option<&Tree>,
        annotations: &Annotations<Self::Annotation>,
        goal: Nonterminal,
    ) -> Result<Value, ReductionError>;

    /// Whether a labeled tree has any derivation to `goal`. Never fails.
    fn can_produce(
        &self,
        tree: Option<&Tree>,
        annotations: &Annotations<Self::Annotation>,
        goal: Nonterminal,
    ) -> bool;
}

/// The result of a reduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Str(String),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            Value::Int(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Str(_) => "string",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Str(s) => f.write_str(s),
        }
    }
}

/// Why a reduction could not complete. Recorded against the testcase; the
/// run carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReductionError {
    #[error("empty tree cannot produce {0}")]
    EmptyTree(Nonterminal),
    #[error("node {0} was never labeled")]
    Unlabeled(NodeId),
    #[error("no derivation of {goal} for {op} at node {node}")]
    NoDerivation {
        node: NodeId,
        op: OpCode,
        goal: Nonterminal,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow in {0}")]
    Overflow(OpCode),
    #[error("{op} cannot take {count} operands")]
    Arity { op: OpCode, count: usize },
    #[error("{action} expected a {expected} operand, got {found}")]
    OperandMismatch {
        action: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}
