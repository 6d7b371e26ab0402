//! Condition trees: parsing, canonical form and evaluation

pub mod error;
pub mod eval;
pub mod node;
pub mod parser;

pub use error::{EvalError, EvalResult, ParseError, ParseResult};
pub use eval::{EvalContext, FailurePair};
pub use node::{
    ChainArg, ChainExpr, CompareOp, Comparison, ConditionNode, MethodCall, MethodChain, Operand,
    OperandResolver,
};
pub use parser::parse_script;
