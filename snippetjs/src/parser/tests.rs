//! Parser tests for the SnippetJS grammar

use crate::ast::{AssignOp, Ast, BinaryOp, Literal, LogicalOp, MemberProperty, Node, NodeId, UnaryOp, UpdateOp};
use crate::lexer::tokenize;
use crate::parser::build;

/// Helper to tokenize and build a program
fn parse_program(source: &str) -> crate::Result<Ast> {
    let tokens = tokenize(source)?;
    build(&tokens)
}

/// Helper to parse and expect success
fn parse_ok(source: &str) -> Ast {
    parse_program(source).expect("Parse should succeed")
}

/// Helper to get the parse error message
fn parse_err(source: &str) -> String {
    parse_program(source).expect_err("Parse should fail").message().to_string()
}

/// Expression of the first statement in the first function body
fn first_expr(ast: &Ast) -> NodeId {
    let (_, func) = ast.functions().next().expect("function");
    let Node::Block { body } = &ast[func.body] else {
        panic!("Expected Block");
    };
    match &ast[body[0]] {
        Node::Expression { expression } => *expression,
        Node::Return { argument: Some(arg) } => *arg,
        other => panic!("Expected expression statement, got {other:?}"),
    }
}

fn expr_of(body: &str) -> (Ast, NodeId) {
    let ast = parse_ok(&format!("function f() {{ {body} }}"));
    let id = first_expr(&ast);
    (ast, id)
}

// ============================================
// Program structure
// ============================================

#[test]
fn test_program_is_root() {
    let ast = parse_ok("function func(arg1, arg2) {}");
    let Node::Program { body } = &ast[NodeId::ROOT] else {
        panic!("Expected Program at root");
    };
    assert_eq!(body.len(), 1);
    let func = ast[body[0]].as_function().expect("FunctionDecl");
    assert_eq!(func.name, "func");
    let names: Vec<_> = func.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["arg1", "arg2"]);
}

#[test]
fn test_default_params() {
    let ast = parse_ok("function func(count=0, res='') {}");
    let (_, func) = ast.functions().next().unwrap();
    let default = func.params[1].default.expect("default");
    assert!(matches!(&ast[default], Node::Literal(Literal::String(s)) if s.is_empty()));
}

#[test]
fn test_empty_program() {
    let ast = parse_ok("");
    assert!(ast.program_body().is_empty());
}

#[test]
fn test_nested_function_rejected() {
    assert!(parse_err("function f() { function g() {} }").contains("top level"));
}

// ============================================
// Statements
// ============================================

#[test]
fn test_optional_semicolons() {
    let ast = parse_ok("function func() { var c = [1]; c[0] = 2 return c[0]; }");
    let (_, func) = ast.functions().next().unwrap();
    let Node::Block { body } = &ast[func.body] else { panic!() };
    assert_eq!(body.len(), 3);
    assert!(matches!(ast[body[2]], Node::Return { argument: Some(_) }));
}

#[test]
fn test_stray_semicolons() {
    let ast = parse_ok("function f() { while (a < 3) { ++a; }; ; return a }");
    let (_, func) = ast.functions().next().unwrap();
    let Node::Block { body } = &ast[func.body] else { panic!() };
    assert!(matches!(ast[body[1]], Node::Empty));
}

#[test]
fn test_var_multiple_declarators() {
    let ast = parse_ok("function f() { var a, b = 1; }");
    let (_, func) = ast.functions().next().unwrap();
    let Node::Block { body } = &ast[func.body] else { panic!() };
    let Node::VarDecl { declarations } = &ast[body[0]] else {
        panic!("Expected VarDecl");
    };
    assert_eq!(declarations.len(), 2);
    assert!(declarations[0].init.is_none());
    assert!(declarations[1].init.is_some());
}

#[test]
fn test_else_if_chain_nests() {
    let ast = parse_ok("function f() { if (c) { return 1; } else if (d) { return 2; } else { return c } }");
    let (_, func) = ast.functions().next().unwrap();
    let Node::Block { body } = &ast[func.body] else { panic!() };
    let Node::If { alternate: Some(alt), .. } = &ast[body[0]] else {
        panic!("Expected If with else");
    };
    assert!(matches!(ast[*alt], Node::If { alternate: Some(_), .. }));
}

#[test]
fn test_for_with_empty_clauses() {
    let ast = parse_ok("function f() { for (;;) { break; } }");
    let (_, func) = ast.functions().next().unwrap();
    let Node::Block { body } = &ast[func.body] else { panic!() };
    assert!(matches!(
        ast[body[0]],
        Node::For { init: None, test: None, update: None, .. }
    ));
}

#[test]
fn test_for_with_var_init() {
    let ast = parse_ok("function f() { for (var i = 0; i < 3; ++i) { c++; } }");
    let (_, func) = ast.functions().next().unwrap();
    let Node::Block { body } = &ast[func.body] else { panic!() };
    let Node::For { init: Some(init), .. } = &ast[body[0]] else {
        panic!("Expected For");
    };
    assert!(matches!(ast[*init], Node::VarDecl { .. }));
}

#[test]
fn test_comments_are_ignored() {
    let ast = parse_ok("function func(/*comment*/) { /* a */\n return 2; // b\n }");
    assert!(matches!(ast[first_expr(&ast)], Node::Literal(Literal::Number(_))));
}

// ============================================
// Expressions
// ============================================

#[test]
fn test_multiplication_binds_tighter() {
    let (ast, id) = expr_of("return 1 + 2 * 3;");
    let Node::Binary { op, right, .. } = &ast[id] else { panic!() };
    assert_eq!(*op, BinaryOp::Add);
    assert!(matches!(ast[*right], Node::Binary { op: BinaryOp::Mul, .. }));
}

#[test]
fn test_exponent_is_right_associative() {
    let (ast, id) = expr_of("return 2 ** 3 ** 2;");
    let Node::Binary { op, right, .. } = &ast[id] else { panic!() };
    assert_eq!(*op, BinaryOp::Exp);
    assert!(matches!(ast[*right], Node::Binary { op: BinaryOp::Exp, .. }));
}

#[test]
fn test_logical_precedence() {
    let (ast, id) = expr_of("return a || b && c;");
    let Node::Logical { op, right, .. } = &ast[id] else { panic!() };
    assert_eq!(*op, LogicalOp::Or);
    assert!(matches!(ast[*right], Node::Logical { op: LogicalOp::And, .. }));
}

#[test]
fn test_compound_assignment() {
    let (ast, id) = expr_of("c >>>= 3;");
    assert!(matches!(
        ast[id],
        Node::Assign { op: AssignOp::Compound(BinaryOp::UShr), .. }
    ));
}

#[test]
fn test_assignment_is_right_associative() {
    let (ast, id) = expr_of("a = b = 1;");
    let Node::Assign { value, .. } = &ast[id] else { panic!() };
    assert!(matches!(ast[*value], Node::Assign { .. }));
}

#[test]
fn test_conditional_and_sequence() {
    let (ast, id) = expr_of("return a ? 1 : 2, 3;");
    let Node::Sequence { expressions } = &ast[id] else { panic!() };
    assert_eq!(expressions.len(), 2);
    assert!(matches!(ast[expressions[0]], Node::Conditional { .. }));
}

#[test]
fn test_nested_prefix_update() {
    let (ast, id) = expr_of("++++c[0];");
    let Node::Update { op, prefix, argument } = &ast[id] else { panic!() };
    assert_eq!(*op, UpdateOp::Increment);
    assert!(*prefix);
    assert!(matches!(ast[*argument], Node::Update { prefix: true, .. }));
}

#[test]
fn test_postfix_update() {
    let (ast, id) = expr_of("c--;");
    assert!(matches!(
        ast[id],
        Node::Update { op: UpdateOp::Decrement, prefix: false, .. }
    ));
}

#[test]
fn test_member_chain() {
    let (ast, id) = expr_of("return c[0][\"a\"].b;");
    let Node::Member { object, property } = &ast[id] else { panic!() };
    assert!(matches!(property, MemberProperty::Named(name) if name == "b"));
    assert!(matches!(ast[*object], Node::Member { property: MemberProperty::Computed(_), .. }));
}

#[test]
fn test_method_call() {
    let (ast, id) = expr_of("arr.push(1, 2);");
    let Node::Call { callee, arguments } = &ast[id] else { panic!() };
    assert_eq!(arguments.len(), 2);
    assert!(matches!(ast[*callee], Node::Member { .. }));
}

#[test]
fn test_array_holes_dropped() {
    let (ast, id) = expr_of("return [1,,2,];");
    let Node::Array { elements } = &ast[id] else { panic!() };
    assert_eq!(elements.len(), 2);
}

#[test]
fn test_object_keys_kept_with_duplicates() {
    let (ast, id) = expr_of("return {int:1, 'two':2, 3:3, null:4, int:99};");
    let Node::Object { properties } = &ast[id] else { panic!() };
    let keys: Vec<_> = properties.iter().map(|p| p.key.as_str()).collect();
    assert_eq!(keys, vec!["int", "two", "3", "null", "int"]);
}

// ============================================
// Errors
// ============================================

#[test]
fn test_unexpected_token() {
    assert!(parse_err("function f() { return ); }").contains("unexpected token"));
    assert!(parse_err("function f( {").contains("unexpected token"));
}

#[test]
fn test_unterminated_block() {
    assert!(parse_err("function f() { return 1;").contains("unterminated block"));
}

#[test]
fn test_invalid_assignment_target() {
    assert_eq!(parse_err("function f() { 1 = 2; }"), "invalid assignment target");
    assert_eq!(parse_err("function f() { ++1; }"), "invalid update target");
}

#[test]
fn test_regex_literal_rejected() {
    assert_eq!(parse_err("function f() { return /ab/g; }"), "regex literal is not supported");
}

#[test]
fn test_lex_error_passes_through() {
    let err = parse_program("function f() { return 0b2; }").unwrap_err();
    assert_eq!(err.kind(), "LexError");
}

#[test]
fn test_deeply_nested_parentheses() {
    let depth = 50_000;
    let (ast, id) = expr_of(&format!("return {}1{};", "(".repeat(depth), ")".repeat(depth)));
    assert!(matches!(ast[id], Node::Literal(_)));
}

#[test]
fn test_deeply_nested_arrays_blocks_and_unaries() {
    let depth = 20_000;
    let (ast, id) = expr_of(&format!("return {}{};", "[".repeat(depth), "]".repeat(depth)));
    assert!(matches!(ast[id], Node::Array { .. }));

    let source = format!("function f() {{ {}return 1;{} }}", "{".repeat(depth), "}".repeat(depth));
    assert!(parse_program(&source).is_ok());

    let (ast, id) = expr_of(&format!("return {}x;", "!".repeat(depth)));
    assert!(matches!(ast[id], Node::Unary { op: UnaryOp::Not, .. }));
}
