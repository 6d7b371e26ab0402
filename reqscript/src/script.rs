//! Engine and script handles
//!
//! [`Engine`] owns the method registry and hands out [`ConditionScript`]
//! handles. A script is parsed once into a condition tree and then
//! evaluated any number of times, with per-evaluation substitutions and
//! assigned variables applied without mutating the tree.

use crate::condition::{
    parse_script, ConditionNode, EvalContext, EvalError, EvalResult, FailurePair, ParseError,
    ParseResult,
};
use crate::config::runtime::EnginePreferences;
use crate::logging::codes;
use crate::registry::MethodRegistry;
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Any error the engine surfaces, parse or evaluation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Script factory bound to a method registry
pub struct Engine {
    registry: Arc<MethodRegistry>,
    preferences: EnginePreferences,
}

impl Engine {
    /// Engine with the built-in string methods exposed
    pub fn new() -> Self {
        Self::with_registry(Arc::new(MethodRegistry::with_builtin_strings()))
    }

    pub fn with_registry(registry: Arc<MethodRegistry>) -> Self {
        crate::logging::init_global_logging();
        log_success!(
            codes::success::SYSTEM_INITIALIZED,
            "Script engine initialized"
        );
        Self {
            registry,
            preferences: EnginePreferences::default(),
        }
    }

    /// The registry scripts from this engine dispatch through
    ///
    /// Exposing or unexposing types here affects scripts that are
    /// already parsed.
    pub fn registry(&self) -> &Arc<MethodRegistry> {
        &self.registry
    }

    /// Parse `text` now and return the script handle
    pub fn create(&self, text: &str) -> ParseResult<ConditionScript> {
        let mut script = self.create_deferred(text);
        script.parse_script()?;
        if self.preferences.log_parse_events {
            log_success!(
                codes::success::SCRIPT_PARSED,
                "Script parsed",
                "length" => text.len(),
            );
        }
        Ok(script)
    }

    /// Return a handle without parsing; call `parse_script` later
    pub fn create_deferred(&self, text: &str) -> ConditionScript {
        ConditionScript {
            source: text.to_string(),
            root: None,
            vars: HashMap::new(),
            registry: Arc::clone(&self.registry),
        }
    }

    /// One-shot parse and evaluate
    pub fn evaluate(&self, text: &str) -> Result<bool, EngineError> {
        let script = self.create(text)?;
        Ok(script.evaluate()?)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// A parsed (or deferred) script bound to assigned variables
#[derive(Clone)]
pub struct ConditionScript {
    source: String,
    root: Option<ConditionNode>,
    vars: HashMap<String, Value>,
    registry: Arc<MethodRegistry>,
}

impl ConditionScript {
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed tree, if `parse_script` has run
    pub fn root(&self) -> Option<&ConditionNode> {
        self.root.as_ref()
    }

    /// Replace the script text; assigned variables are kept
    pub fn set_script(&mut self, text: &str, parse_now: bool) -> ParseResult<()> {
        self.source = text.to_string();
        self.root = None;
        if parse_now {
            self.parse_script()?;
        }
        Ok(())
    }

    /// Parse the source into the condition tree
    pub fn parse_script(&mut self) -> ParseResult<()> {
        self.root = Some(parse_script(&self.source, &self.vars)?);
        Ok(())
    }

    /// Bind a name to a value for operand and chain-argument resolution
    ///
    /// Assigning after parsing works: variables are looked up at
    /// evaluation time.
    pub fn assign(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.vars.insert(name.to_string(), value.into());
        self
    }

    pub fn evaluate(&self) -> EvalResult<bool> {
        self.with_context(None, |node, ctx| node.evaluate(ctx))
    }

    /// Evaluate with `subst` applied to operand and argument text
    pub fn apply_then_evaluate(&self, subst: impl Fn(&str) -> String) -> EvalResult<bool> {
        self.with_context(Some(&subst), |node, ctx| node.evaluate(ctx))
    }

    /// None on success, otherwise the failing leaf's resolved pair
    pub fn evaluate_or_failure(&self) -> EvalResult<Option<FailurePair>> {
        self.with_context(None, |node, ctx| node.evaluate_or_failure(ctx))
    }

    pub fn apply_then_evaluate_or_failure(
        &self,
        subst: impl Fn(&str) -> String,
    ) -> EvalResult<Option<FailurePair>> {
        self.with_context(Some(&subst), |node, ctx| node.evaluate_or_failure(ctx))
    }

    fn with_context<T>(
        &self,
        subst: Option<&dyn Fn(&str) -> String>,
        run: impl FnOnce(&ConditionNode, &EvalContext) -> EvalResult<T>,
    ) -> EvalResult<T> {
        let root = self.root.as_ref().ok_or_else(EvalError::not_parsed)?;
        let ctx = EvalContext {
            vars: &self.vars,
            registry: &self.registry,
            subst,
        };
        run(root, &ctx)
    }
}

impl std::fmt::Display for ConditionScript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.root {
            Some(root) => write!(f, "{{Script={}}}, {{Condition={}}}", self.source, root),
            None => write!(f, "{{Script={}}}, {{Condition=unparsed}}", self.source),
        }
    }
}

/// Two scripts are equal when their parsed trees print the same
/// canonical form; unparsed scripts fall back to source equality.
impl PartialEq for ConditionScript {
    fn eq(&self, other: &Self) -> bool {
        match (&self.root, &other.root) {
            (Some(a), Some(b)) => a.to_string() == b.to_string(),
            _ => self.source == other.source,
        }
    }
}

impl std::fmt::Debug for ConditionScript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionScript")
            .field("source", &self.source)
            .field("root", &self.root)
            .field("vars", &self.vars)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging;
    use crate::value::TypeTag;
    use assert_matches::assert_matches;

    fn engine() -> Engine {
        Engine::new()
    }

    #[test]
    fn test_one_shot_evaluate() {
        let engine = engine();
        assert_eq!(engine.evaluate("1+1==2"), Ok(true));
        assert_eq!(engine.evaluate("'a'=='b'"), Ok(false));
        assert_eq!(engine.evaluate("10>=5&&'x'=='x'"), Ok(true));
    }

    #[test]
    fn test_parse_errors_surface_from_create() {
        let engine = engine();
        assert_matches!(engine.create(""), Err(ParseError::EmptyScript));
        assert_matches!(
            engine.create("no operators here"),
            Err(ParseError::UnrecognizedCondition { .. })
        );
    }

    #[test]
    fn test_deferred_script_requires_parse() {
        let engine = engine();
        let mut script = engine.create_deferred("1==1");
        assert_matches!(script.evaluate(), Err(EvalError::NotParsed));
        script.parse_script().expect("parses");
        assert_eq!(script.evaluate(), Ok(true));
    }

    #[test]
    fn test_set_script_replaces_tree() {
        let engine = engine();
        let mut script = engine.create("1==1").expect("parses");
        assert_eq!(script.evaluate(), Ok(true));
        script.set_script("1==2", true).expect("parses");
        assert_eq!(script.evaluate(), Ok(false));
        script.set_script("2==2", false).expect("no parse requested");
        assert_matches!(script.evaluate(), Err(EvalError::NotParsed));
    }

    #[test]
    fn test_assigned_variables() {
        let engine = engine();
        let mut script = engine.create("money>=1000&&rank=='vip'").expect("parses");
        script.assign("money", 2500i64).assign("rank", "vip");
        assert_eq!(script.evaluate(), Ok(true));
        script.assign("money", 500i64);
        assert_eq!(script.evaluate(), Ok(false));
    }

    #[test]
    fn test_substitution_is_idempotent() {
        let engine = engine();
        let script = engine.create("'%money%'>=1000").expect("parses");
        let subst = |text: &str| text.replace("%money%", "1500");
        assert_eq!(script.apply_then_evaluate(subst), Ok(true));
        assert_eq!(script.apply_then_evaluate(subst), Ok(true));
        // Without the substitution the placeholder is not numeric.
        assert_matches!(
            script.evaluate(),
            Err(EvalError::NumericCoercionFailed { .. })
        );
    }

    #[test]
    fn test_quoted_escapes_compare_on_content() {
        let engine = engine();
        assert_eq!(engine.evaluate(r"'it\'s'=='it\'s'"), Ok(true));
        assert_eq!(engine.evaluate(r"'it\'s'=='its'"), Ok(false));
    }

    #[test]
    fn test_failure_pair_reports_resolved_text() {
        let engine = engine();
        let script = engine.create("'a'=='a'&&'b'=='c'").expect("parses");
        assert_eq!(
            script.evaluate_or_failure(),
            Ok(Some(("b".to_string(), "c".to_string())))
        );
    }

    #[test]
    fn test_failure_pair_with_substitution() {
        let engine = engine();
        let script = engine.create("'%rank%'=='warlord'").expect("parses");
        let pair = script
            .apply_then_evaluate_or_failure(|text| text.replace("%rank%", "recruit"))
            .expect("evaluates");
        assert_eq!(pair, Some(("recruit".to_string(), "warlord".to_string())));
    }

    #[test]
    fn test_ordering_on_text_fails() {
        let engine = engine();
        assert_matches!(
            engine.evaluate("'abc'>5"),
            Err(EngineError::Eval(EvalError::NumericCoercionFailed { text })) if text == "abc"
        );
    }

    #[test]
    fn test_string_methods_through_the_engine() {
        let engine = engine();
        assert_eq!(engine.evaluate("'abc'.length()==3"), Ok(true));
        assert_eq!(engine.evaluate("'vip_gold'.starts_with('vip')"), Ok(true));
        assert_eq!(engine.evaluate("!'member'.contains('vip')"), Ok(true));
    }

    #[test]
    fn test_unexpose_affects_parsed_scripts() {
        let registry = Arc::new(MethodRegistry::with_builtin_strings());
        let engine = Engine::with_registry(Arc::clone(&registry));
        let script = engine.create("'abc'.length()==3").expect("parses");
        assert_eq!(script.evaluate(), Ok(true));

        registry.unexpose(TypeTag::Str);
        assert_matches!(
            script.evaluate(),
            Err(EvalError::UnknownMethod { method, .. }) if method == "length"
        );
    }

    #[test]
    fn test_invocation_failure_reaches_error_channel() {
        let engine = engine();
        let script = engine.create("'abc'.substring(9).is_empty()").expect("parses");
        assert_eq!(script.evaluate(), Ok(false));

        if let Some(memory) = logging::memory_channel() {
            assert!(memory
                .errors()
                .iter()
                .any(|event| event.code.as_str() == "E034"));
        }
    }

    #[test]
    fn test_equality_ignores_spacing_and_grouping() {
        let engine = engine();
        let a = engine.create("'a'=='b'&&'c'=='d'").expect("parses");
        let b = engine.create("('a' == 'b') && ('c' == 'd')").expect("parses");
        assert_eq!(a, b);

        let c = engine.create("'a'=='b'||'c'=='d'").expect("parses");
        assert_ne!(a, c);
    }

    #[test]
    fn test_display_form() {
        let engine = engine();
        let script = engine.create("'a'=='a'&&'b'=='b'").expect("parses");
        let shown = script.to_string();
        assert!(shown.starts_with("{Script='a'=='a'&&'b'=='b'}"));
        assert!(shown.contains("{Condition=And('a'=='a' && 'b'=='b')}"));

        let deferred = engine.create_deferred("1==1");
        assert!(deferred.to_string().contains("{Condition=unparsed}"));
    }

    #[test]
    fn test_variable_chain_receiver() {
        let engine = engine();
        let mut script = engine.create("name.to_upper_case()=='ABC'").expect("parses");
        script.assign("name", "abc");
        assert_eq!(script.evaluate(), Ok(true));
    }
}
