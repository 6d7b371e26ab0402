//! Script text to condition tree
//!
//! Top level: scripts mixing `&&` and `||` outside quotes are split into
//! top-level segments (parenthesized groups or bare leaf runs) and folded
//! left to right: a segment joined by `&&` is split on `||` into an OR
//! bucket which is sealed into the AND bucket, and symmetrically for
//! `||`. This flattening is deliberately simple, not a precedence parse,
//! and its output shape is pinned by tests. A leaf that matches no known
//! shape fails the whole parse rather than being silently dropped.

use super::error::{ParseError, ParseResult};
use super::node::{
    push_unique, ChainArg, ChainExpr, Comparison, CompareOp, ConditionNode, MethodCall,
    MethodChain, Operand, OperandResolver,
};
use crate::arithmetic::ExprMode;
use crate::config::compile_time::parsing::{MAX_CHAIN_CALLS, MAX_SCRIPT_LENGTH};
use crate::scanner;
use crate::value::Value;
use std::collections::HashMap;

const AND: &str = "&&";
const OR: &str = "||";

/// Parse a script into a condition tree
///
/// `vars` is the owning script's assigned-variable map; it drives literal
/// inference for chain roots and arguments.
pub fn parse_script(
    script: &str,
    vars: &HashMap<String, Value>,
) -> ParseResult<ConditionNode> {
    if script.len() > MAX_SCRIPT_LENGTH {
        return Err(ParseError::script_too_long(script.len(), MAX_SCRIPT_LENGTH));
    }
    if script.is_empty() {
        return Err(ParseError::empty_script());
    }

    let has_or = scanner::contains_ignoring_quotes(script, OR);
    let has_and = scanner::contains_ignoring_quotes(script, AND);

    match (has_or, has_and) {
        (true, true) => parse_mixed(script, vars),
        (true, false) => {
            let mut children = Vec::new();
            append_split(&mut children, script, OR, vars)?;
            Ok(ConditionNode::OrGroup(children))
        }
        (false, true) => {
            let mut children = Vec::new();
            append_split(&mut children, script, AND, vars)?;
            Ok(ConditionNode::AndGroup(children))
        }
        (false, false) => parse_leaf(script, vars),
    }
}

/// The mixed `&&`/`||` case, folded over top-level segments
fn parse_mixed(script: &str, vars: &HashMap<String, Value>) -> ParseResult<ConditionNode> {
    let (segments, operators) = scanner::split_top_level(script);
    if operators.is_empty() {
        return Err(ParseError::unrecognized(script));
    }

    let mut or_children: Vec<ConditionNode> = Vec::new();
    let mut and_children: Vec<ConditionNode> = Vec::new();
    let mut top_level_or = false;

    for (index, segment) in segments.iter().enumerate() {
        let content = scanner::unwrap_outer_group(segment);
        // The trailing segment reuses the operator before it.
        match operators[index.min(operators.len() - 1)].as_str() {
            AND => {
                append_split(&mut or_children, &content, OR, vars)?;
                push_unique(
                    &mut and_children,
                    ConditionNode::or_group(std::mem::take(&mut or_children)),
                );
            }
            _ => {
                append_split(&mut and_children, &content, AND, vars)?;
                push_unique(
                    &mut or_children,
                    ConditionNode::and_group(std::mem::take(&mut and_children)),
                );
                top_level_or = true;
            }
        }
    }

    Ok(if top_level_or {
        ConditionNode::OrGroup(or_children)
    } else {
        ConditionNode::AndGroup(and_children)
    })
}

/// Split `text` on `separator` and append each piece as a leaf
fn append_split(
    children: &mut Vec<ConditionNode>,
    text: &str,
    separator: &str,
    vars: &HashMap<String, Value>,
) -> ParseResult<()> {
    for piece in scanner::split_ignoring_quotes(text, separator) {
        push_unique(children, parse_leaf(&piece, vars)?);
    }
    Ok(())
}

/// Parse one leaf: comparison, method chain, or nothing recognizable
fn parse_leaf(text: &str, vars: &HashMap<String, Value>) -> ParseResult<ConditionNode> {
    let clean = scanner::strip_spacing_and_parens(text);
    if clean.is_empty() {
        return Err(ParseError::unrecognized(text));
    }

    // Operator order matters: two-character operators are tested before
    // their one-character prefixes.
    const OPERATORS: [(CompareOp, &str); 6] = [
        (CompareOp::Eq, "=="),
        (CompareOp::Ne, "!="),
        (CompareOp::Ge, ">="),
        (CompareOp::Gt, ">"),
        (CompareOp::Le, "<="),
        (CompareOp::Lt, "<"),
    ];
    for (op, symbol) in OPERATORS {
        if scanner::contains_ignoring_quotes(&clean, symbol) {
            let pieces = scanner::split_ignoring_quotes_bounded(&clean, symbol, 2);
            let mut left = pieces.first().cloned().unwrap_or_default();
            let right = pieces.get(1).cloned().unwrap_or_default();
            let negated = left.starts_with('!');
            if negated {
                left.remove(0);
            }
            return Ok(ConditionNode::Comparison(Comparison {
                op,
                left: make_operand(&left, vars),
                right: make_operand(&right, vars),
                negated,
            }));
        }
    }

    if scanner::contains_ignoring_quotes(&clean, ".") {
        let negated = clean.starts_with('!');
        let body = if negated { &clean[1..] } else { clean.as_str() };
        let chain = parse_chain(body, vars)?;
        return Ok(ConditionNode::MethodChain(MethodChain {
            chain,
            text: scanner::process_escapes(body),
            negated,
        }));
    }

    Err(ParseError::unrecognized(&clean))
}

/// Build a comparison operand, routing chain-shaped text through dispatch
fn make_operand(raw: &str, vars: &HashMap<String, Value>) -> Operand {
    let resolver = if is_chain_operand(raw) {
        match parse_chain(raw, vars) {
            Ok(chain) => OperandResolver::Chain(chain),
            Err(_) => OperandResolver::Expr(ExprMode::detect(raw)),
        }
    } else {
        OperandResolver::Expr(ExprMode::detect(raw))
    };
    Operand {
        text: scanner::process_escapes(raw),
        resolver,
    }
}

/// Operand-position chains must look like calls
///
/// A bare dotted token such as `%stats.kills%` stays a passthrough
/// operand; only `receiver.method(...)` shapes go through dispatch.
fn is_chain_operand(raw: &str) -> bool {
    scanner::contains_ignoring_quotes(raw, ".")
        && scanner::contains_ignoring_quotes(raw, "(")
        && !scanner::contains_decimal_shape(raw)
        && ExprMode::detect(raw) == ExprMode::Passthrough
}

/// Parse `root.name(args).name(args)...`
fn parse_chain(text: &str, vars: &HashMap<String, Value>) -> ParseResult<ChainExpr> {
    let segments = scanner::split_ignoring_quotes(text, ".");
    if segments.len() < 2 || segments[0].is_empty() {
        return Err(ParseError::unrecognized(text));
    }
    if segments.len() - 1 > MAX_CHAIN_CALLS {
        return Err(ParseError::unrecognized(text));
    }

    let root = infer_chain_arg(&segments[0], vars);
    let mut calls = Vec::with_capacity(segments.len() - 1);
    for segment in &segments[1..] {
        let name = scanner::split_ignoring_quotes(segment, "(")
            .into_iter()
            .next()
            .unwrap_or_default();
        if name.is_empty() {
            return Err(ParseError::unrecognized(segment));
        }
        let mut args = Vec::new();
        if let Some(arg_text) = scanner::extract_balanced(segment, '(', ')').into_iter().next() {
            if !arg_text.is_empty() {
                for piece in scanner::split_ignoring_quotes(&arg_text, ",") {
                    args.push(infer_chain_arg(piece.trim(), vars));
                }
            }
        }
        calls.push(MethodCall { name, args });
    }
    Ok(ChainExpr { root, calls })
}

/// Literal inference for chain roots and arguments
///
/// Order: assigned variable by exact token, quoted string, boolean,
/// decimal, integer, then an unresolved variable reference.
fn infer_chain_arg(token: &str, vars: &HashMap<String, Value>) -> ChainArg {
    if vars.contains_key(token) {
        return ChainArg::Variable(token.to_string());
    }
    if scanner::is_quoted(token) {
        let inner = scanner::process_escapes(scanner::unquote(token));
        return ChainArg::Literal(Value::Str(inner));
    }
    match token {
        "true" => return ChainArg::Literal(Value::Bool(true)),
        "false" => return ChainArg::Literal(Value::Bool(false)),
        _ => {}
    }
    if scanner::is_decimal_literal(token) {
        if let Ok(value) = token.parse::<f64>() {
            return ChainArg::Literal(Value::Double(value));
        }
    }
    if scanner::is_integer_literal(token) {
        if let Ok(value) = token.parse::<i64>() {
            return ChainArg::Literal(Value::Int(value));
        }
    }
    ChainArg::Variable(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn parse(script: &str) -> ConditionNode {
        match parse_script(script, &HashMap::new()) {
            Ok(node) => node,
            Err(error) => panic!("'{}' failed to parse: {}", script, error),
        }
    }

    #[test]
    fn test_empty_script() {
        assert_matches!(
            parse_script("", &HashMap::new()),
            Err(ParseError::EmptyScript)
        );
    }

    #[test]
    fn test_unrecognized_condition() {
        assert_matches!(
            parse_script("no operators here", &HashMap::new()),
            Err(ParseError::UnrecognizedCondition { .. })
        );
    }

    #[test]
    fn test_leaf_comparisons() {
        assert_eq!(parse("'a'=='b'").to_string(), "'a'=='b'");
        assert_eq!(parse(" 'a' == 'b' ").to_string(), "'a'=='b'");
        assert_eq!(parse("%money%>=1000").to_string(), "%money%>=1000");
        assert_eq!(parse("x<=5").to_string(), "x<=5");
        assert_eq!(parse("x!=y").to_string(), "x!=y");
    }

    #[test]
    fn test_negated_leaf() {
        let node = parse("!'a'=='b'");
        assert_eq!(node.to_string(), "!'a'=='b'");
        match node {
            ConditionNode::Comparison(cmp) => {
                assert!(cmp.negated);
                assert_eq!(cmp.left.text, "'a'");
            }
            other => panic!("expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_quoted_operator_is_not_an_operator() {
        // The && inside the literal must not split the condition.
        let node = parse("'a&&b'=='a&&b'");
        assert_eq!(node.to_string(), "'a&&b'=='a&&b'");
    }

    #[test]
    fn test_escaped_quote_round_trip() {
        let node = parse("'it\\'s'=='it\\'s'");
        match node {
            ConditionNode::Comparison(cmp) => {
                assert_eq!(cmp.left.text, "'it's'");
                assert_eq!(cmp.right.text, "'it's'");
            }
            other => panic!("expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_and_only_script() {
        let node = parse("a==b&&c==d&&e==f");
        assert_eq!(node.to_string(), "And(a==b && c==d && e==f)");
    }

    #[test]
    fn test_or_only_script_with_groups() {
        let node = parse("(a==b)||(c==d)");
        assert_eq!(node.to_string(), "Or(a==b || c==d)");
    }

    #[test]
    fn test_duplicate_children_collapse() {
        let node = parse("a==b&&a==b&&c==d");
        assert_eq!(node.to_string(), "And(a==b && c==d)");
    }

    #[test]
    fn test_mixed_operators_flatten_left_to_right() {
        let node = parse("(a==b)&&(c==d)||(e==f)");
        assert_eq!(
            node.to_string(),
            "Or(And(Or(a==b) && c==d) || And(e==f))"
        );
    }

    #[test]
    fn test_mixed_operators_trailing_and_group() {
        let node = parse("(a==b||c==d)&&(e==f)");
        assert_eq!(
            node.to_string(),
            "And(Or(a==b || c==d) && Or(e==f))"
        );
    }

    #[test]
    fn test_mixed_operators_without_groups() {
        // Bare segments fold exactly like parenthesized ones.
        let node = parse("a==b&&c==d||e==f");
        assert_eq!(
            node.to_string(),
            "Or(And(Or(a==b) && c==d) || And(e==f))"
        );
    }

    #[test]
    fn test_mixed_operators_with_ungrouped_tail() {
        let node = parse("(a==b||c==d)&&e==f");
        assert_eq!(
            node.to_string(),
            "And(Or(a==b || c==d) && Or(e==f))"
        );
    }

    #[test]
    fn test_method_chain_leaf() {
        let node = parse("%rank%.starts_with('vip')");
        match &node {
            ConditionNode::MethodChain(chain) => {
                assert!(!chain.negated);
                assert_eq!(chain.chain.calls.len(), 1);
                assert_eq!(chain.chain.calls[0].name, "starts_with");
                assert_eq!(
                    chain.chain.calls[0].args,
                    vec![ChainArg::Literal(Value::Str("vip".into()))]
                );
            }
            other => panic!("expected chain, got {:?}", other),
        }
    }

    #[test]
    fn test_negated_method_chain() {
        let node = parse("!%rank%.is_empty()");
        match node {
            ConditionNode::MethodChain(chain) => assert!(chain.negated),
            other => panic!("expected chain, got {:?}", other),
        }
    }

    #[test]
    fn test_chain_argument_inference() {
        let mut vars = HashMap::new();
        vars.insert("limit".to_string(), Value::Int(3));
        let node = match parse_script("name.substring(0,limit)", &vars) {
            Ok(node) => node,
            Err(error) => panic!("parse failed: {}", error),
        };
        match node {
            ConditionNode::MethodChain(chain) => {
                assert_eq!(
                    chain.chain.calls[0].args,
                    vec![
                        ChainArg::Literal(Value::Int(0)),
                        ChainArg::Variable("limit".to_string()),
                    ]
                );
            }
            other => panic!("expected chain, got {:?}", other),
        }
    }

    #[test]
    fn test_chain_operand_in_comparison() {
        let node = parse("'abc'.length()==3");
        match node {
            ConditionNode::Comparison(cmp) => {
                assert_matches!(cmp.left.resolver, OperandResolver::Chain(_));
                assert_matches!(cmp.right.resolver, OperandResolver::Expr(_));
            }
            other => panic!("expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_dotted_placeholder_is_not_a_chain() {
        let node = parse("%stats.kills%>=10");
        match node {
            ConditionNode::Comparison(cmp) => {
                assert_eq!(
                    cmp.left.resolver,
                    OperandResolver::Expr(ExprMode::Passthrough)
                );
            }
            other => panic!("expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_script_too_long() {
        let long = "x".repeat(MAX_SCRIPT_LENGTH + 1);
        assert_matches!(
            parse_script(&long, &HashMap::new()),
            Err(ParseError::ScriptTooLong { .. })
        );
    }
}
