//! reqscript: a small requirement-scripting engine
//!
//! Scripts are boolean conditions over comparisons, arithmetic and
//! method chains, in the style of
//! `'%player_money%'>=1000&&%rank%.starts_with('vip')`. A script is
//! parsed once into a condition tree; placeholder substitution and
//! variable assignment happen at evaluation time, so one parsed script
//! serves many evaluations.
//!
//! ```
//! use reqscript::Engine;
//!
//! let engine = Engine::new();
//! let mut script = engine.create("money>=1000&&rank.starts_with('vip')").unwrap();
//! script.assign("money", 2500i64).assign("rank", "vip_gold");
//! assert_eq!(script.evaluate(), Ok(true));
//! ```

#[macro_use]
pub mod logging;

pub mod arithmetic;
pub mod condition;
pub mod config;
pub mod registry;
pub mod scanner;
pub mod script;
pub mod value;

pub use arithmetic::{evaluate_lenient, evaluate_strict, ArithmeticError, ExprMode};
pub use condition::{ConditionNode, EvalError, FailurePair, ParseError};
pub use registry::{MethodDef, MethodRegistry, RegistryError};
pub use script::{ConditionScript, Engine, EngineError};
pub use value::{TypeTag, Value};
