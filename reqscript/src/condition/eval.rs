//! Condition tree evaluation
//!
//! Evaluation never mutates the tree, so applying a substitution is
//! idempotent across repeated calls. Ordering comparisons propagate
//! numeric coercion failures; a failing method handler is logged and
//! degrades its node to false.

use super::error::{EvalError, EvalResult};
use super::node::{
    ChainArg, ChainExpr, CompareOp, Comparison, ConditionNode, MethodChain, Operand,
    OperandResolver,
};
use crate::arithmetic::{self, ExprMode};
use crate::logging::codes;
use crate::registry::{DispatchMiss, MethodRegistry};
use crate::scanner;
use crate::value::{TypeTag, Value};
use std::collections::HashMap;

/// The failing leaf's resolved (left, right) text
pub type FailurePair = (String, String);

/// Everything evaluation needs, borrowed from the owning script and engine
pub struct EvalContext<'a> {
    pub vars: &'a HashMap<String, Value>,
    pub registry: &'a MethodRegistry,
    pub subst: Option<&'a dyn Fn(&str) -> String>,
}

impl<'a> EvalContext<'a> {
    fn apply(&self, text: &str) -> String {
        match self.subst {
            Some(subst) => subst(text),
            None => text.to_string(),
        }
    }
}

impl ConditionNode {
    pub fn evaluate(&self, ctx: &EvalContext) -> EvalResult<bool> {
        match self {
            ConditionNode::Comparison(cmp) => Ok(cmp.outcome(ctx)?.passed),
            ConditionNode::MethodChain(chain) => chain.truth(ctx),
            ConditionNode::OrGroup(children) => {
                for child in children {
                    if child.evaluate(ctx)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            ConditionNode::AndGroup(children) => {
                for child in children {
                    if !child.evaluate(ctx)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    /// None on success, otherwise the failing leaf's pair
    ///
    /// An AND group reports its first failing child. An OR group reports
    /// nothing if any child passes, else the pair of the last child it
    /// evaluated.
    pub fn evaluate_or_failure(&self, ctx: &EvalContext) -> EvalResult<Option<FailurePair>> {
        match self {
            ConditionNode::Comparison(cmp) => {
                let outcome = cmp.outcome(ctx)?;
                Ok(if outcome.passed {
                    None
                } else {
                    Some(outcome.pair)
                })
            }
            ConditionNode::MethodChain(chain) => Ok(if chain.truth(ctx)? {
                None
            } else {
                Some((chain.text.clone(), String::new()))
            }),
            ConditionNode::OrGroup(children) => {
                let mut last_failure = None;
                for child in children {
                    match child.evaluate_or_failure(ctx)? {
                        None => return Ok(None),
                        failure => last_failure = failure,
                    }
                }
                Ok(last_failure)
            }
            ConditionNode::AndGroup(children) => {
                for child in children {
                    if let Some(pair) = child.evaluate_or_failure(ctx)? {
                        return Ok(Some(pair));
                    }
                }
                Ok(None)
            }
        }
    }
}

struct Outcome {
    passed: bool,
    pair: FailurePair,
}

impl Comparison {
    fn outcome(&self, ctx: &EvalContext) -> EvalResult<Outcome> {
        let left = resolve_operand(&self.left, ctx)?;
        let right = resolve_operand(&self.right, ctx)?;
        let (left, right) = match (left, right) {
            (Resolved::Text(left), Resolved::Text(right)) => (left, right),
            // A handler already failed and was reported; the node is false.
            _ => {
                return Ok(Outcome {
                    passed: false,
                    pair: (self.left.text.clone(), self.right.text.clone()),
                })
            }
        };

        let raw = match self.op {
            CompareOp::Eq => left == right,
            CompareOp::Ne => left != right,
            CompareOp::Gt => parse_number(&left)? > parse_number(&right)?,
            CompareOp::Ge => parse_number(&left)? >= parse_number(&right)?,
            CompareOp::Lt => parse_number(&left)? < parse_number(&right)?,
            CompareOp::Le => parse_number(&left)? <= parse_number(&right)?,
        };

        Ok(Outcome {
            passed: raw != self.negated,
            pair: (left, right),
        })
    }
}

enum Resolved {
    Text(String),
    /// A chain operand whose handler failed
    Failed,
}

/// Resolution order: assigned variable by exact token, substitution,
/// then the operand's cached resolver. A result still wrapped in outer
/// quotes is unquoted so both sides compare on content.
fn resolve_operand(operand: &Operand, ctx: &EvalContext) -> EvalResult<Resolved> {
    if let Some(value) = ctx.vars.get(&operand.text) {
        return Ok(Resolved::Text(value.render()));
    }

    let text = ctx.apply(&operand.text);
    let resolved = match &operand.resolver {
        OperandResolver::Expr(ExprMode::Arithmetic) => arithmetic::evaluate_lenient(&text, true),
        OperandResolver::Expr(ExprMode::Passthrough) => text,
        OperandResolver::Chain(chain) => match chain.run(ctx, false)? {
            ChainOutcome::Value(value) => value.render(),
            ChainOutcome::Truth(result) => result.to_string(),
            ChainOutcome::Failed => return Ok(Resolved::Failed),
        },
    };
    Ok(Resolved::Text(scanner::unquote(&resolved).to_string()))
}

fn parse_number(text: &str) -> EvalResult<f64> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| EvalError::numeric_coercion_failed(text))
}

/// What a chain produced
pub(crate) enum ChainOutcome {
    /// A call returned a Bool in truth position
    Truth(bool),
    /// The final value of the last call
    Value(Value),
    /// A handler failed; already reported to the error channel
    Failed,
}

impl ChainExpr {
    fn resolve_arg(&self, arg: &ChainArg, ctx: &EvalContext) -> Value {
        match arg {
            ChainArg::Literal(Value::Str(s)) => Value::Str(ctx.apply(s)),
            ChainArg::Literal(value) => value.clone(),
            ChainArg::Variable(name) => match ctx.vars.get(name) {
                Some(Value::Str(s)) => Value::Str(ctx.apply(s)),
                Some(value) => value.clone(),
                None => Value::Str(ctx.apply(name)),
            },
        }
    }

    /// Run the calls left to right
    ///
    /// In truth position the first Bool short-circuits; otherwise values
    /// feed the next call as its receiver.
    pub(crate) fn run(&self, ctx: &EvalContext, truth_position: bool) -> EvalResult<ChainOutcome> {
        let mut current = self.resolve_arg(&self.root, ctx);
        for call in &self.calls {
            let name = ctx.apply(&call.name);
            let mut argv = Vec::with_capacity(call.args.len() + 1);
            argv.push(current.clone());
            for arg in &call.args {
                argv.push(self.resolve_arg(arg, ctx));
            }
            let kinds: Vec<TypeTag> = argv.iter().map(Value::tag).collect();

            let handler = ctx
                .registry
                .find(current.tag(), &name, &kinds)
                .map_err(|miss| match miss {
                    DispatchMiss::UnknownType | DispatchMiss::UnknownMethod => {
                        EvalError::unknown_method(current.tag(), &name)
                    }
                    DispatchMiss::NoMatchingOverload => {
                        EvalError::no_matching_overload(current.tag(), &name, &kinds)
                    }
                })?;

            match handler(&argv) {
                Ok(Value::Bool(result)) if truth_position => {
                    return Ok(ChainOutcome::Truth(result))
                }
                Ok(value) => current = value,
                Err(reason) => {
                    log_error!(
                        codes::eval::INVOCATION_FAILED,
                        "Method invocation failed",
                        "method" => name,
                        "receiver" => current.tag(),
                        "reason" => reason,
                    );
                    return Ok(ChainOutcome::Failed);
                }
            }
        }
        Ok(ChainOutcome::Value(current))
    }
}

impl MethodChain {
    fn truth(&self, ctx: &EvalContext) -> EvalResult<bool> {
        match self.chain.run(ctx, true)? {
            ChainOutcome::Truth(result) => Ok(result != self.negated),
            ChainOutcome::Value(_) => Ok(self.negated),
            ChainOutcome::Failed => Ok(false),
        }
    }
}
