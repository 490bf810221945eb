//! Integration tests for signature parsing, dependency tracing and
//! context/config files

use snippetjs::config::{InterpreterConfig, RunContextFile};
use snippetjs::{Ast, build, interpret_with, interpret_with_state, parse_signature, tokenize, trace_dependencies};

#[ctor::ctor]
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn ast(source: &str) -> Ast {
    build(&tokenize(source).unwrap()).unwrap()
}

// ============================================
// Signatures
// ============================================

#[test]
fn test_signature_of_entry() {
    let signature = parse_signature(&ast("function price(token, amount = 1) { return amount; } function helper() {}")).unwrap();
    assert_eq!(signature.name, "price");
    assert_eq!(signature.args, ["token", "amount"]);
    assert_eq!(signature.to_string(), "price(token, amount)");
}

#[test]
fn test_signature_requires_function() {
    let err = parse_signature(&ast("var a = 1;")).unwrap_err();
    assert_eq!(err.kind(), "ParseError");
}

// ============================================
// Dependencies
// ============================================

#[test]
fn test_dependencies_across_functions() {
    let source = "
        function main() {
            var pool = '0xPool';
            var a = staticcallContract(pool, 'reserves()', undefined);
            return helper(a) + executeToken(3);
        }
        function helper(x) {
            return executeToken(9, x) + staticcallContract('0xOracle', 'price()', undefined);
        }";
    let deps = trace_dependencies(&ast(source), &snippetjs::RunContext::new());
    assert_eq!(deps.contract_dependees, ["0xOracle", "0xPool"]);
    let tokens: Vec<String> = deps.exe_token_dependees.iter().map(ToString::to_string).collect();
    assert_eq!(tokens, ["3", "9"]);
}

#[test]
fn test_dependencies_json() {
    let deps = trace_dependencies(
        &ast("function f() { return executeToken(2) + staticcallContract('0xA', 'f()', undefined); }"),
        &snippetjs::RunContext::new(),
    );
    assert_eq!(
        serde_json::to_string(&deps).unwrap(),
        r#"{"contractDependees":["0xA"],"exeTokenDependees":["2"]}"#
    );
}

// ============================================
// Context and config files
// ============================================

#[test]
fn test_context_file_drives_run() {
    let file = RunContextFile::from_json_str(
        r#"{
            "args": [40],
            "identifiers": [{"name": "tokenAttributes", "value": {"bonus": 2, "tags": ["x"]}}]
        }"#,
    )
    .unwrap();
    let context = file.into_context();
    let program = ast("function f(base) { return base + tokenAttributes.bonus + tokenAttributes.tags.length; }");
    assert_eq!(interpret_with_state(&program, &context).unwrap().to_string(), "43");
}

#[test]
fn test_context_file_start_node() {
    let program = ast("function a() { return 'a'; } function b() { return 'b'; }");
    let (second, _) = program.functions().nth(1).unwrap();
    let file = RunContextFile::from_json_str(&format!(r#"{{"startNodeIndex": {}}}"#, second.0)).unwrap();
    assert_eq!(interpret_with_state(&program, &file.into_context()).unwrap().to_string(), "b");
}

#[test]
fn test_config_file_limits_run() {
    let config = InterpreterConfig::from_toml_str("step_budget = 50\n").unwrap();
    let program = ast("function f() { var i = 0; while (i < 1000) { i++; } return i; }");
    let err = interpret_with(&program, &snippetjs::RunContext::new(), &config, &Default::default()).unwrap_err();
    assert_eq!(err.kind(), "ResourceExhausted");

    let config = InterpreterConfig::from_toml_str("max_string_length = 4\n").unwrap();
    let program = ast("function f() { return 'abc' + 'de'; }");
    let err = interpret_with(&program, &snippetjs::RunContext::new(), &config, &Default::default()).unwrap_err();
    assert_eq!(err.message(), "string length 5 exceeds limit 4");
}
