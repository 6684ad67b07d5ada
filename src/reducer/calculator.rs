//! # Calculator Reducer
//!
//! A cost-driven bottom-up rewriter over integer and string arithmetic.
//!
//! Labeling walks a tree children-first. For each node it matches every
//! pattern for the node's op against the children's cost tables, keeps the
//! cheapest rule per target kind, and then applies conversion rules until
//! nothing improves. Each distinct resulting table is interned as a numbered
//! [`StateId`], which is the node's annotation.
//!
//! Reduction picks each node's rule top-down from its state, then evaluates
//! children before parents and hands the operand values to [`Calculator`],
//! which owns the semantic actions.
//!
//! ## Rules
//!
//! | Op | Operands | Produces |
//! |---|---|---|
//! | `IntLiteral` | none | `Int` |
//! | `ShortLiteral` | none, value fits `i16` | `Short` |
//! | `StringLiteral` | none | `String` |
//! | `Add` | one or more `Int` | `Int` |
//! | `AddStrict`, `Subtract`, `Multiply`, `Divide` | two `Int` | `Int` |
//! | `Negate` | one `Int` | `Int` |
//! | `Concat` | one or more `String` | `String` |
//!
//! Conversions: `Short` to `Int`, `Int` to `String`.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use tracing::trace;

use super::{Reducer, ReductionError, Value};
use crate::ast::{Annotations, Node, NodeId, Payload, Tree};
use crate::registry::Nonterminal::{Int, Short, String as Text};
use crate::registry::{Nonterminal, OpCode};

// ============================================================================
// RULE TABLES
// ============================================================================

/// Children a pattern accepts, and the kind each must derive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Leaf,
    Fixed(usize, Nonterminal),
    Variadic(Nonterminal),
}

impl Shape {
    fn accepts(self, count: usize) -> bool {
        match self {
            Shape::Leaf => count == 0,
            Shape::Fixed(n, _) => count == n,
            Shape::Variadic(_) => count >= 1,
        }
    }

    fn operand(self) -> Option<Nonterminal> {
        match self {
            Shape::Leaf => None,
            Shape::Fixed(_, kind) | Shape::Variadic(kind) => Some(kind),
        }
    }
}

/// Semantic action run when a pattern is reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Literal,
    Sum,
    Difference,
    Product,
    Quotient,
    Negation,
    Concatenation,
}

/// Semantic action run when a conversion is reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionAction {
    Widen,
    Format,
}

impl ConversionAction {
    pub fn name(self) -> &'static str {
        match self {
            ConversionAction::Widen => "widening",
            ConversionAction::Format => "formatting",
        }
    }
}

struct Pattern {
    op: OpCode,
    produces: Nonterminal,
    shape: Shape,
    cost: u32,
    guard: fn(&Node) -> bool,
    action: Action,
}

struct Conversion {
    from: Nonterminal,
    to: Nonterminal,
    cost: u32,
    action: ConversionAction,
}

const fn pattern(
    op: OpCode,
    produces: Nonterminal,
    shape: Shape,
    guard: fn(&Node) -> bool,
    action: Action,
) -> Pattern {
    Pattern {
        op,
        produces,
        shape,
        cost: 1,
        guard,
        action,
    }
}

fn any(_: &Node) -> bool {
    true
}

fn has_int(node: &Node) -> bool {
    node.int_value().is_some()
}

fn fits_short(node: &Node) -> bool {
    node.int_value().is_some_and(|n| i16::try_from(n).is_ok())
}

fn has_str(node: &Node) -> bool {
    node.str_value().is_some()
}

const PATTERNS: &[Pattern] = &[
    pattern(OpCode::IntLiteral, Int, Shape::Leaf, has_int, Action::Literal),
    pattern(OpCode::ShortLiteral, Short, Shape::Leaf, fits_short, Action::Literal),
    pattern(OpCode::StringLiteral, Text, Shape::Leaf, has_str, Action::Literal),
    pattern(OpCode::Add, Int, Shape::Variadic(Int), any, Action::Sum),
    pattern(OpCode::AddStrict, Int, Shape::Fixed(2, Int), any, Action::Sum),
    pattern(OpCode::Subtract, Int, Shape::Fixed(2, Int), any, Action::Difference),
    pattern(OpCode::Multiply, Int, Shape::Fixed(2, Int), any, Action::Product),
    pattern(OpCode::Divide, Int, Shape::Fixed(2, Int), any, Action::Quotient),
    pattern(OpCode::Negate, Int, Shape::Fixed(1, Int), any, Action::Negation),
    pattern(OpCode::Concat, Text, Shape::Variadic(Text), any, Action::Concatenation),
];

const CONVERSIONS: &[Conversion] = &[
    Conversion {
        from: Short,
        to: Int,
        cost: 1,
        action: ConversionAction::Widen,
    },
    Conversion {
        from: Int,
        to: Text,
        cost: 1,
        action: ConversionAction::Format,
    },
];

// ============================================================================
// SEMANTIC ACTIONS
// ============================================================================

/// Checked integer and string arithmetic.
#[derive(Debug, Clone, Copy, Default)]
pub struct Calculator;

impl Calculator {
    /// Runs a pattern's action over its already-reduced operands.
    pub fn apply(&self, action: Action, node: &Node, operands: Vec<Value>) -> Result<Value, ReductionError> {
        let op = node.op();
        match action {
            Action::Literal => match node.payload() {
                Some(Payload::Int(n)) => Ok(Value::Int(*n)),
                Some(Payload::Str(s)) => Ok(Value::Str(s.clone())),
                None => Err(ReductionError::OperandMismatch {
                    action: op.name(),
                    expected: "literal",
                    found: "nothing",
                }),
            },
            Action::Sum => operands.iter().try_fold(0i64, |total, value| {
                total
                    .checked_add(int_operand(op, value)?)
                    .ok_or(ReductionError::Overflow(op))
            })
            .map(Value::Int),
            Action::Difference => {
                let (a, b) = int_pair(op, &operands)?;
                a.checked_sub(b).map(Value::Int).ok_or(ReductionError::Overflow(op))
            }
            Action::Product => {
                let (a, b) = int_pair(op, &operands)?;
                a.checked_mul(b).map(Value::Int).ok_or(ReductionError::Overflow(op))
            }
            Action::Quotient => {
                let (a, b) = int_pair(op, &operands)?;
                if b == 0 {
                    return Err(ReductionError::DivisionByZero);
                }
                a.checked_div(b).map(Value::Int).ok_or(ReductionError::Overflow(op))
            }
            Action::Negation => match operands.as_slice() {
                [value] => int_operand(op, value)?
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or(ReductionError::Overflow(op)),
                _ => Err(ReductionError::Arity {
                    op,
                    count: operands.len(),
                }),
            },
            Action::Concatenation => {
                let mut joined = String::new();
                for value in &operands {
                    let text = value.as_str().ok_or(ReductionError::OperandMismatch {
                        action: op.name(),
                        expected: "string",
                        found: value.type_name(),
                    })?;
                    joined.push_str(text);
                }
                Ok(Value::Str(joined))
            }
        }
    }

    /// Runs a conversion's action.
    pub fn convert(&self, action: ConversionAction, value: Value) -> Result<Value, ReductionError> {
        match (action, value) {
            (ConversionAction::Widen, Value::Int(n)) => Ok(Value::Int(n)),
            (ConversionAction::Format, Value::Int(n)) => Ok(Value::Str(n.to_string())),
            (action, value) => Err(ReductionError::OperandMismatch {
                action: action.name(),
                expected: "integer",
                found: value.type_name(),
            }),
        }
    }
}

fn int_operand(op: OpCode, value: &Value) -> Result<i64, ReductionError> {
    value.as_int().ok_or(ReductionError::OperandMismatch {
        action: op.name(),
        expected: "integer",
        found: value.type_name(),
    })
}

fn int_pair(op: OpCode, operands: &[Value]) -> Result<(i64, i64), ReductionError> {
    match operands {
        [a, b] => Ok((int_operand(op, a)?, int_operand(op, b)?)),
        _ => Err(ReductionError::Arity {
            op,
            count: operands.len(),
        }),
    }
}

// ============================================================================
// LABELING
// ============================================================================

/// Which rule a derivation uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Pattern(usize),
    Conversion(usize),
}

/// The cheapest known way to derive one kind at a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Derivation {
    pub cost: u32,
    pub rule: Rule,
}

/// Cheapest derivation per kind.
pub type CostTable = BTreeMap<Nonterminal, Derivation>;

/// An interned cost table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateId(pub u32);

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Labels trees with interned states and reduces them with a [`Calculator`].
///
/// States are shared across every tree this reducer labels, so structurally
/// identical subtrees always get the same state number.
#[derive(Debug, Default)]
pub struct CalculatorReducer {
    states: Vec<CostTable>,
    interned: HashMap<CostTable, StateId>,
}

impl CalculatorReducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct states seen so far.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn cost_table(&self, state: StateId) -> Option<&CostTable> {
        self.states.get(state.0 as usize)
    }

    fn intern(&mut self, table: CostTable) -> StateId {
        if let Some(&state) = self.interned.get(&table) {
            return state;
        }
        let state = StateId(self.states.len() as u32);
        trace!(%state, kinds = table.len(), "new state");
        self.states.push(table.clone());
        self.interned.insert(table, state);
        state
    }

    fn table_of(&self, id: NodeId, annotations: &Annotations<StateId>) -> Option<&CostTable> {
        annotations.get(id).and_then(|&state| self.cost_table(state))
    }

    fn match_node(&self, node: &Node, annotations: &Annotations<StateId>) -> CostTable {
        let mut table = CostTable::new();
        for (index, pattern) in PATTERNS.iter().enumerate() {
            if pattern.op != node.op() {
                continue;
            }
            if let Some(cost) = self.pattern_cost(pattern, node, annotations) {
                offer(
                    &mut table,
                    pattern.produces,
                    Derivation {
                        cost,
                        rule: Rule::Pattern(index),
                    },
                );
            }
        }
        close(&mut table);
        table
    }

    fn pattern_cost(&self, pattern: &Pattern, node: &Node, annotations: &Annotations<StateId>) -> Option<u32> {
        let children = node.children();
        if !pattern.shape.accepts(children.len()) || !(pattern.guard)(node) {
            return None;
        }
        let Some(operand) = pattern.shape.operand() else {
            return Some(pattern.cost);
        };
        children.iter().try_fold(pattern.cost, |total, child| {
            let derivation = self.table_of(child.node()?, annotations)?.get(&operand)?;
            Some(total.saturating_add(derivation.cost))
        })
    }

    /// Follows conversions from `goal` down to the pattern that derives it at
    /// `id`. Conversions come back outermost first.
    fn plan_node(
        &self,
        tree: &Tree,
        id: NodeId,
        annotations: &Annotations<StateId>,
        goal: Nonterminal,
    ) -> Result<Plan, ReductionError> {
        let table = self
            .table_of(id, annotations)
            .ok_or(ReductionError::Unlabeled(id))?;
        let mut conversions = Vec::new();
        let mut kind = goal;
        loop {
            let derivation = table.get(&kind).ok_or(ReductionError::NoDerivation {
                node: id,
                op: tree.node(id).op(),
                goal,
            })?;
            match derivation.rule {
                Rule::Conversion(index) => {
                    conversions.push(index);
                    kind = CONVERSIONS[index].from;
                }
                Rule::Pattern(pattern) => {
                    return Ok(Plan {
                        goal,
                        pattern,
                        conversions,
                    })
                }
            }
        }
    }

    /// Chooses a rule for every node top-down, then evaluates children before
    /// parents. Neither pass recurses, so tree depth is unbounded.
    fn evaluate(
        &self,
        ctx: &Calculator,
        tree: &Tree,
        annotations: &Annotations<StateId>,
        goal: Nonterminal,
    ) -> Result<Value, ReductionError> {
        let mut plans: Vec<Option<Plan>> = vec![None; tree.len()];
        let mut pending = vec![(tree.root(), goal)];

        while let Some((id, goal)) = pending.pop() {
            let plan = self.plan_node(tree, id, annotations, goal)?;
            if let Some(operand) = PATTERNS[plan.pattern].shape.operand() {
                for child in tree.node(id).children() {
                    let child = child.node().ok_or(ReductionError::NoDerivation {
                        node: id,
                        op: tree.node(id).op(),
                        goal,
                    })?;
                    pending.push((child, operand));
                }
            }
            plans[id.index()] = Some(plan);
        }

        let mut values: Vec<Option<Value>> = vec![None; tree.len()];
        for id in tree.bottom_up() {
            let Some(plan) = plans[id.index()].take() else {
                continue;
            };
            let node = tree.node(id);
            let pattern = &PATTERNS[plan.pattern];
            let operands = match pattern.shape.operand() {
                None => Vec::new(),
                Some(_) => node
                    .children()
                    .iter()
                    .filter_map(|child| child.node())
                    .map(|child| values[child.index()].take().ok_or(ReductionError::Unlabeled(child)))
                    .collect::<Result<Vec<_>, _>>()?,
            };
            let mut value = ctx.apply(pattern.action, node, operands)?;
            for &index in plan.conversions.iter().rev() {
                value = ctx.convert(CONVERSIONS[index].action, value)?;
            }
            trace!(node = %id, goal = %plan.goal, "reduced");
            values[id.index()] = Some(value);
        }

        values[tree.root().index()]
            .take()
            .ok_or(ReductionError::Unlabeled(tree.root()))
    }
}

/// How one node reduces to the kind its parent asked for.
#[derive(Debug, Clone)]
struct Plan {
    goal: Nonterminal,
    pattern: usize,
    conversions: Vec<usize>,
}

/// Records `candidate` if it beats the current entry for `kind`.
fn offer(table: &mut CostTable, kind: Nonterminal, candidate: Derivation) -> bool {
    match table.get(&kind) {
        Some(existing) if existing.cost <= candidate.cost => false,
        _ => {
            table.insert(kind, candidate);
            true
        }
    }
}

/// Applies conversions until no entry improves.
fn close(table: &mut CostTable) {
    loop {
        let mut changed = false;
        for (index, conversion) in CONVERSIONS.iter().enumerate() {
            let Some(source) = table.get(&conversion.from).copied() else {
                continue;
            };
            changed |= offer(
                table,
                conversion.to,
                Derivation {
                    cost: source.cost.saturating_add(conversion.cost),
                    rule: Rule::Conversion(index),
                },
            );
        }
        if !changed {
            break;
        }
    }
}

impl Reducer for CalculatorReducer {
    type Context = Calculator;
    type Annotation = StateId;

    fn label(&mut self, _ctx: &Calculator, tree: Option<&Tree>, annotations: &mut Annotations<StateId>) {
        let Some(tree) = tree else {
            return;
        };
        for id in tree.bottom_up() {
            let table = self.match_node(tree.node(id), annotations);
            let state = self.intern(table);
            annotations.set(id, state);
        }
    }

    fn reduce(
        &self,
        ctx: &Calculator,
        tree: Option<&Tree>,
        annotations: &Annotations<StateId>,
        goal: Nonterminal,
    ) -> Result<Value, ReductionError> {
        let tree = tree.ok_or(ReductionError::EmptyTree(goal))?;
        self.evaluate(ctx, tree, annotations, goal)
    }

    fn can_produce(&self, tree: Option<&Tree>, annotations: &Annotations<StateId>, goal: Nonterminal) -> bool {
        tree.and_then(|tree| self.table_of(tree.root(), annotations))
            .is_some_and(|table| table.contains_key(&goal))
    }
}
