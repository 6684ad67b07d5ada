//! # Name Registry
//!
//! Single source of truth for the two closed name sets the harness knows about:
//! operation codes ([`OpCode`]) and target kinds ([`Nonterminal`]).
//!
//! ## Registry Invariant
//! Each set is declared once through [`name_table!`]; the declaration produces
//! the enum, its canonical name list, and the name-to-value map used for
//! resolution. Resolution and rendering therefore read the same table, so
//! `OpCode::resolve(op.name()) == Ok(op)` for every code.
//!
//! ```rust
//! use treecheck::registry::OpCode;
//! let add = OpCode::resolve("Add").unwrap();
//! assert_eq!(add.name(), "Add");
//! assert!(OpCode::resolve("add").is_err());
//! ```

use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Declares a closed name set: the enum, `ALL`, `name()`, and `Display`.
macro_rules! name_table {
    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($(#[$vmeta:meta])* $variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every member, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The canonical (case-sensitive) name.
            pub const fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

// ============================================================================
// TABLES
// ============================================================================

name_table! {
    /// The kind of a computation node.
    pub enum OpCode {
        Add,
        AddStrict,
        Concat,
        Divide,
        IntLiteral,
        Multiply,
        Negate,
        QualifiedLiteral,
        ShortLiteral,
        StringLiteral,
        Subtract,
    }
}

name_table! {
    /// The value-kind a tree is expected to reduce to.
    pub enum Nonterminal {
        Int,
        Short,
        String,
    }
}

lazy_static! {
    static ref OPS_BY_NAME: HashMap<&'static str, OpCode> =
        OpCode::ALL.iter().map(|&op| (op.name(), op)).collect();
    static ref KINDS_BY_NAME: HashMap<&'static str, Nonterminal> =
        Nonterminal::ALL.iter().map(|&nt| (nt.name(), nt)).collect();
}

/// A name that is not in its table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("unrecognized operation '{0}'")]
    UnrecognizedOperation(String),
    #[error("unknown target kind '{0}'")]
    UnresolvedNonterminal(String),
}

/// How the oracle compares an expected literal against a reduced value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueClass {
    Integer,
    Text,
}

impl OpCode {
    pub fn resolve(name: &str) -> Result<Self, LookupError> {
        OPS_BY_NAME
            .get(name)
            .copied()
            .ok_or_else(|| LookupError::UnrecognizedOperation(name.to_string()))
    }

    /// Only string literals carry their `content` verbatim; every other op
    /// reads it as an integer.
    pub fn is_string_literal(self) -> bool {
        self == OpCode::StringLiteral
    }
}

impl Nonterminal {
    pub fn resolve(name: &str) -> Result<Self, LookupError> {
        KINDS_BY_NAME
            .get(name)
            .copied()
            .ok_or_else(|| LookupError::UnresolvedNonterminal(name.to_string()))
    }

    pub fn value_class(self) -> ValueClass {
        match self {
            Nonterminal::Int | Nonterminal::Short => ValueClass::Integer,
            Nonterminal::String => ValueClass::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_op_round_trips_through_its_name() {
        for &op in OpCode::ALL {
            assert_eq!(OpCode::resolve(op.name()), Ok(op));
        }
    }

    #[test]
    fn every_kind_round_trips_through_its_name() {
        for &nt in Nonterminal::ALL {
            assert_eq!(Nonterminal::resolve(nt.name()), Ok(nt));
        }
    }

    #[test]
    fn names_are_case_sensitive() {
        assert_eq!(
            OpCode::resolve("intliteral"),
            Err(LookupError::UnrecognizedOperation("intliteral".into()))
        );
        assert!(Nonterminal::resolve("int").is_err());
    }

    #[test]
    fn only_string_literal_keeps_raw_content() {
        let raw: Vec<_> = OpCode::ALL
            .iter()
            .filter(|op| op.is_string_literal())
            .collect();
        assert_eq!(raw, vec![&OpCode::StringLiteral]);
    }

    #[test]
    fn string_kind_compares_as_text() {
        assert_eq!(Nonterminal::String.value_class(), ValueClass::Text);
        assert_eq!(Nonterminal::Short.value_class(), ValueClass::Integer);
    }
}
