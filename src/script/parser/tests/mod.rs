
use super::ast::{BinOp, Expr, Program, Stmt, StmtKind, UnOp};
use super::{parse, ParseError};
use crate::script::lexer::tokenize;

fn parse_src(source: &str) -> Result<Program, ParseError> {
    let tokens = tokenize(source).unwrap();
    parse(&tokens)
}

fn single_stmt(source: &str) -> Stmt {
    let mut program = parse_src(source).unwrap();
    assert_eq!(program.stmts.len(), 1, "expected one statement");
    program.stmts.pop().unwrap()
}

fn single_expr(source: &str) -> Expr {
    match single_stmt(source).kind {
        StmtKind::Expr(expr) => expr,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

#[test]
fn empty_program() {
    let program = parse_src("").unwrap();
    assert!(program.stmts.is_empty());
}

#[test]
fn let_binding() {
    match single_stmt("let answer = 42;").kind {
        StmtKind::Let { name, value } => {
            assert_eq!(name, "answer");
            assert!(matches!(value, Expr::Int(42, _)));
        }
        other => panic!("unexpected statement {other:?}"),
    }
}

#[test]
fn assignment_statement() {
    match single_stmt("answer = 7;").kind {
        StmtKind::Assign { name, value } => {
            assert_eq!(name, "answer");
            assert!(matches!(value, Expr::Int(7, _)));
        }
        other => panic!("unexpected statement {other:?}"),
    }
}

#[test]
fn equality_is_not_assignment() {
    // `a == b;` must stay an expression statement.
    match single_expr("a == b;") {
        Expr::BinOp { op: BinOp::Eq, .. } => {}
        other => panic!("unexpected expression {other:?}"),
    }
}

#[test]
fn precedence_mul_over_add() {
    // 1 + 2 * 3 parses as 1 + (2 * 3)
    match single_expr("1 + 2 * 3;") {
        Expr::BinOp {
            op: BinOp::Add,
            left,
            right,
            ..
        } => {
            assert!(matches!(*left, Expr::Int(1, _)));
            assert!(matches!(*right, Expr::BinOp { op: BinOp::Mul, .. }));
        }
        other => panic!("unexpected expression {other:?}"),
    }
}

#[test]
fn parens_override_precedence() {
    match single_expr("(1 + 2) * 3;") {
        Expr::BinOp {
            op: BinOp::Mul,
            left,
            ..
        } => {
            assert!(matches!(*left, Expr::BinOp { op: BinOp::Add, .. }));
        }
        other => panic!("unexpected expression {other:?}"),
    }
}

#[test]
fn subtraction_is_left_associative() {
    // 10 - 2 - 3 parses as (10 - 2) - 3
    match single_expr("10 - 2 - 3;") {
        Expr::BinOp {
            op: BinOp::Sub,
            left,
            right,
            ..
        } => {
            assert!(matches!(*left, Expr::BinOp { op: BinOp::Sub, .. }));
            assert!(matches!(*right, Expr::Int(3, _)));
        }
        other => panic!("unexpected expression {other:?}"),
    }
}

#[test]
fn comparison_binds_tighter_than_logic() {
    // a < b && c parses as (a < b) && c
    match single_expr("a < b && c;") {
        Expr::BinOp {
            op: BinOp::And,
            left,
            ..
        } => {
            assert!(matches!(*left, Expr::BinOp { op: BinOp::Lt, .. }));
        }
        other => panic!("unexpected expression {other:?}"),
    }
}

#[test]
fn unary_binds_tighter_than_binary() {
    // -a * b parses as (-a) * b
    match single_expr("-a * b;") {
        Expr::BinOp {
            op: BinOp::Mul,
            left,
            ..
        } => {
            assert!(matches!(*left, Expr::UnOp { op: UnOp::Neg, .. }));
        }
        other => panic!("unexpected expression {other:?}"),
    }
}

#[test]
fn unary_negation_of_call() {
    // -f(x) parses as -(f(x))
    match single_expr("-f(x);") {
        Expr::UnOp {
            op: UnOp::Neg,
            operand,
            ..
        } => {
            assert!(matches!(*operand, Expr::Call { .. }));
        }
        other => panic!("unexpected expression {other:?}"),
    }
}

#[test]
fn call_with_arguments() {
    match single_expr("clamp(x, 0, 255);") {
        Expr::Call { callee, args, .. } => {
            assert!(matches!(*callee, Expr::Var(ref name, _) if name == "clamp"));
            assert_eq!(args.len(), 3);
        }
        other => panic!("unexpected expression {other:?}"),
    }
}

#[test]
fn chained_postfix() {
    // m.points[0] parses field access before indexing.
    match single_expr("m.points[0];") {
        Expr::Index { target, .. } => {
            assert!(matches!(*target, Expr::Field { .. }));
        }
        other => panic!("unexpected expression {other:?}"),
    }
}

#[test]
fn list_literal() {
    match single_expr("[1, 2.5, \"x\"];") {
        Expr::List(items, _) => assert_eq!(items.len(), 3),
        other => panic!("unexpected expression {other:?}"),
    }
}

#[test]
fn empty_list_literal() {
    match single_expr("[];") {
        Expr::List(items, _) => assert!(items.is_empty()),
        other => panic!("unexpected expression {other:?}"),
    }
}

#[test]
fn function_definition() {
    let source = "fn scale(v, s) { return v * s; }";
    match single_stmt(source).kind {
        StmtKind::Fn { name, params, body } => {
            assert_eq!(name, "scale");
            assert_eq!(params, vec!["v".to_string(), "s".to_string()]);
            assert_eq!(body.len(), 1);
            assert!(matches!(body[0].kind, StmtKind::Return(Some(_))));
        }
        other => panic!("unexpected statement {other:?}"),
    }
}

#[test]
fn function_without_parameters() {
    match single_stmt("fn origin() { return [0, 0, 0]; }").kind {
        StmtKind::Fn { params, .. } => assert!(params.is_empty()),
        other => panic!("unexpected statement {other:?}"),
    }
}

#[test]
fn bare_return() {
    let source = "fn noop() { return; }";
    match single_stmt(source).kind {
        StmtKind::Fn { body, .. } => {
            assert!(matches!(body[0].kind, StmtKind::Return(None)));
        }
        other => panic!("unexpected statement {other:?}"),
    }
}

#[test]
fn if_without_else() {
    match single_stmt("if ready { go(); }").kind {
        StmtKind::If {
            then_body,
            else_body,
            ..
        } => {
            assert_eq!(then_body.len(), 1);
            assert!(else_body.is_none());
        }
        other => panic!("unexpected statement {other:?}"),
    }
}

#[test]
fn if_else_chain_nests() {
    let source = "if a { x(); } else if b { y(); } else { z(); }";
    match single_stmt(source).kind {
        StmtKind::If { else_body, .. } => {
            let else_body = else_body.unwrap();
            assert_eq!(else_body.len(), 1);
            match &else_body[0].kind {
                StmtKind::If { else_body, .. } => assert!(else_body.is_some()),
                other => panic!("expected nested if, got {other:?}"),
            }
        }
        other => panic!("unexpected statement {other:?}"),
    }
}

#[test]
fn while_loop_with_break_and_continue() {
    let source = "while true { if done { break; } continue; }";
    match single_stmt(source).kind {
        StmtKind::While { body, .. } => {
            assert_eq!(body.len(), 2);
            assert!(matches!(body[1].kind, StmtKind::Continue));
        }
        other => panic!("unexpected statement {other:?}"),
    }
}

#[test]
fn use_statement() {
    match single_stmt("use math;").kind {
        StmtKind::Use { name } => assert_eq!(name, "math"),
        other => panic!("unexpected statement {other:?}"),
    }
}

#[test]
fn missing_semicolon_is_reported() {
    let err = parse_src("let x = 1").unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedEof));
}

#[test]
fn missing_semicolon_before_next_statement() {
    let err = parse_src("let x = 1 let y = 2;").unwrap_err();
    match err {
        ParseError::Expected { expected, found, .. } => {
            assert_eq!(expected, "`;`");
            assert_eq!(found, "`let`");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn unclosed_block_is_reported() {
    let err = parse_src("while true { go();").unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedEof));
}

#[test]
fn stray_operator_is_reported() {
    let err = parse_src("let x = * 2;").unwrap_err();
    match err {
        ParseError::UnexpectedToken { found, position } => {
            assert_eq!(found, "`*`");
            assert_eq!(position.line, 1);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn use_requires_identifier() {
    let err = parse_src("use 3;").unwrap_err();
    assert!(matches!(err, ParseError::Expected { .. }));
}

#[test]
fn spans_cover_statements() {
    let stmt = single_stmt("let total = 1 + 2;");
    assert_eq!(stmt.span.start.line, 1);
    assert_eq!(stmt.span.start.column, 1);
    assert_eq!(stmt.span.end.column, 19);
}
