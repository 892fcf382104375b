//! Script engine integration tests
//!
//! Runs whole rig programs through the public entry points and checks the
//! resulting values and module bindings.

use std::fs;

use camrig::eval_str;
use camrig::run_file;
use camrig::script::value::Value;

#[test]
fn arithmetic_follows_precedence() {
    assert_eq!(eval_str("1 + 2 * 3;").unwrap(), Value::Int(7));
    assert_eq!(eval_str("(1 + 2) * 3;").unwrap(), Value::Int(9));
    assert_eq!(eval_str("10 - 4 - 3;").unwrap(), Value::Int(3));
    assert_eq!(eval_str("7 % 3;").unwrap(), Value::Int(1));
}

#[test]
fn mixed_numeric_expressions_promote_to_float() {
    assert_eq!(eval_str("1 + 0.5;").unwrap(), Value::Float(1.5));
    assert_eq!(eval_str("2 == 2.0;").unwrap(), Value::Bool(true));
    assert_eq!(eval_str("3 < 3.5;").unwrap(), Value::Bool(true));
}

#[test]
fn bindings_and_reassignment() {
    let value = eval_str("let x = 4; x = x + 1; x * x;").unwrap();
    assert_eq!(value, Value::Int(25));
}

#[test]
fn functions_support_recursion() {
    let source = r#"
        fn fib(n) {
            if n < 2 {
                return n;
            }
            return fib(n - 1) + fib(n - 2);
        }
        fib(12);
    "#;
    assert_eq!(eval_str(source).unwrap(), Value::Int(144));
}

#[test]
fn while_loops_with_break_and_continue() {
    let source = r#"
        let total = 0;
        let i = 0;
        while true {
            i = i + 1;
            if i > 10 {
                break;
            }
            if i % 2 == 0 {
                continue;
            }
            total = total + i;
        }
        total;
    "#;
    // 1 + 3 + 5 + 7 + 9
    assert_eq!(eval_str(source).unwrap(), Value::Int(25));
}

#[test]
fn else_if_chains_pick_the_first_true_branch() {
    let source = r#"
        fn grade(score) {
            if score >= 90 {
                return "sharp";
            } else if score >= 50 {
                return "usable";
            } else {
                return "blurry";
            }
        }
        grade(64);
    "#;
    assert_eq!(eval_str(source).unwrap(), Value::str("usable"));
}

#[test]
fn lists_index_push_and_measure() {
    let source = r#"
        let points = [3, 1, 4];
        push(points, 1);
        points[3] + len(points);
    "#;
    assert_eq!(eval_str(source).unwrap(), Value::Int(5));
}

#[test]
fn strings_concatenate_and_count_characters() {
    assert_eq!(
        eval_str(r#""cam" + "rig";"#).unwrap(),
        Value::str("camrig")
    );
    // len counts characters, not bytes.
    assert_eq!(eval_str(r#"len("héllo");"#).unwrap(), Value::Int(5));
}

#[test]
fn the_math_module_is_always_importable() {
    let source = r#"
        use math;
        math.floor(math.sqrt(2.0) * 100.0);
    "#;
    assert_eq!(eval_str(source).unwrap(), Value::Int(141));
    assert_eq!(
        eval_str("use math; math.max(3, 1.5, 2);").unwrap(),
        Value::Int(3)
    );
}

#[test]
fn runtime_errors_carry_positions() {
    let err = eval_str("let x = 1 / 0;").unwrap_err();
    assert!(err.to_string().contains("division by zero at 1:9"));

    let err = eval_str("missing;").unwrap_err();
    assert!(err.to_string().contains("undefined name `missing` at 1:1"));
}

#[test]
fn conditions_must_be_booleans() {
    let err = eval_str("if 1 { let x = 2; }").unwrap_err();
    assert!(err.to_string().contains("expected bool, got int"));
}

#[test]
fn run_file_executes_and_returns_the_module() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("survey.rig");
    fs::write(
        &path,
        "fn area(w, h) { return w * h; }\nlet sensor = area(36, 24);\n",
    )
    .unwrap();

    let module = run_file(&path).unwrap();
    assert_eq!(module.name, "survey");
    assert_eq!(module.get("sensor"), Some(Value::Int(864)));
}

#[test]
fn run_file_reports_the_failing_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.rig");
    fs::write(&path, "let x = ;").unwrap();

    let err = run_file(&path).unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("broken.rig"));
}
