//! Condition tree nodes and their canonical string form
//!
//! The canonical `Display` form is what script equality compares: two
//! scripts with different spacing or redundant grouping are equal when
//! their parsed trees print the same.

use crate::arithmetic::ExprMode;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Comparison operators in leaf conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
        }
    }

    /// Ordering operators coerce both sides to numbers
    pub fn is_ordering(&self) -> bool {
        !matches!(self, CompareOp::Eq | CompareOp::Ne)
    }
}

/// A chain root or call argument, typed at parse time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChainArg {
    /// Inferred literal value
    Literal(Value),
    /// Resolved against the assigned-variable map at invocation time;
    /// falls back to its own name as a string when never assigned
    Variable(String),
}

/// One `.name(args)` call in a chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub name: String,
    pub args: Vec<ChainArg>,
}

/// A root operand followed by method calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainExpr {
    pub root: ChainArg,
    pub calls: Vec<MethodCall>,
}

/// How an operand resolves to text at evaluation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OperandResolver {
    /// Arithmetic or passthrough, decided once at parse time
    Expr(ExprMode),
    /// Dispatched through the registry, final value rendered to text
    Chain(ChainExpr),
}

/// One side of a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operand {
    /// Escape-processed raw text, also the display form
    pub text: String,
    pub resolver: OperandResolver,
}

/// Leaf comparison condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub op: CompareOp,
    pub left: Operand,
    pub right: Operand,
    pub negated: bool,
}

/// Leaf method-chain condition in truth position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodChain {
    pub chain: ChainExpr,
    /// Full chain text, used as the failure-pair left side
    pub text: String,
    pub negated: bool,
}

/// A parsed condition tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConditionNode {
    Comparison(Comparison),
    MethodChain(MethodChain),
    OrGroup(Vec<ConditionNode>),
    AndGroup(Vec<ConditionNode>),
}

impl ConditionNode {
    /// Build an OR group, collapsing structurally-identical children
    pub fn or_group(children: Vec<ConditionNode>) -> Self {
        ConditionNode::OrGroup(dedup_children(children))
    }

    /// Build an AND group, collapsing structurally-identical children
    pub fn and_group(children: Vec<ConditionNode>) -> Self {
        ConditionNode::AndGroup(dedup_children(children))
    }
}

/// Insertion-ordered set semantics: identity is the canonical string form
pub(crate) fn push_unique(children: &mut Vec<ConditionNode>, node: ConditionNode) {
    let canonical = node.to_string();
    if children.iter().all(|child| child.to_string() != canonical) {
        children.push(node);
    }
}

fn dedup_children(children: Vec<ConditionNode>) -> Vec<ConditionNode> {
    let mut unique = Vec::with_capacity(children.len());
    for child in children {
        push_unique(&mut unique, child);
    }
    unique
}

impl std::fmt::Display for ConditionNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConditionNode::Comparison(cmp) => {
                let negation = if cmp.negated { "!" } else { "" };
                write!(
                    f,
                    "{}{}{}{}",
                    negation,
                    cmp.left.text,
                    cmp.op.symbol(),
                    cmp.right.text
                )
            }
            ConditionNode::MethodChain(chain) => {
                let negation = if chain.negated { "!" } else { "" };
                write!(f, "{}{}", negation, chain.text)
            }
            ConditionNode::OrGroup(children) => {
                write!(f, "Or({})", join_children(children, " || "))
            }
            ConditionNode::AndGroup(children) => {
                write!(f, "And({})", join_children(children, " && "))
            }
        }
    }
}

fn join_children(children: &[ConditionNode], separator: &str) -> String {
    children
        .iter()
        .map(|child| child.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparison(left: &str, op: CompareOp, right: &str, negated: bool) -> ConditionNode {
        ConditionNode::Comparison(Comparison {
            op,
            left: Operand {
                text: left.to_string(),
                resolver: OperandResolver::Expr(ExprMode::Passthrough),
            },
            right: Operand {
                text: right.to_string(),
                resolver: OperandResolver::Expr(ExprMode::Passthrough),
            },
            negated,
        })
    }

    #[test]
    fn test_canonical_comparison_form() {
        let node = comparison("'a'", CompareOp::Eq, "'b'", false);
        assert_eq!(node.to_string(), "'a'=='b'");

        let negated = comparison("x", CompareOp::Gt, "5", true);
        assert_eq!(negated.to_string(), "!x>5");
    }

    #[test]
    fn test_group_duplicates_collapse() {
        let group = ConditionNode::and_group(vec![
            comparison("a", CompareOp::Eq, "b", false),
            comparison("a", CompareOp::Eq, "b", false),
            comparison("c", CompareOp::Eq, "d", false),
        ]);
        match &group {
            ConditionNode::AndGroup(children) => assert_eq!(children.len(), 2),
            other => panic!("expected AndGroup, got {:?}", other),
        }
        assert_eq!(group.to_string(), "And(a==b && c==d)");
    }

    #[test]
    fn test_or_group_form() {
        let group = ConditionNode::or_group(vec![
            comparison("a", CompareOp::Eq, "b", false),
            comparison("c", CompareOp::Ne, "d", false),
        ]);
        assert_eq!(group.to_string(), "Or(a==b || c!=d)");
    }
}
