//! Builtin functions and modules available to every script.

use std::rc::Rc;

use crate::loader::module::{LoadedModule, ModuleHandle, ModuleOrigin};
use crate::script::value::{NativeFn, Value};

/// Globals visible from every namespace, after locals and module bindings.
const GLOBALS: &[NativeFn] = &[
    NativeFn {
        name: "print",
        call: native_print,
    },
    NativeFn {
        name: "len",
        call: native_len,
    },
    NativeFn {
        name: "str",
        call: native_str,
    },
    NativeFn {
        name: "push",
        call: native_push,
    },
];

pub fn lookup_global(name: &str) -> Option<Value> {
    GLOBALS
        .iter()
        .find(|native| native.name == name)
        .map(|native| Value::Native(*native))
}

/// Builtin modules reachable through `use` when no loaded module shadows them.
pub fn builtin_module(name: &str) -> Option<ModuleHandle> {
    match name {
        "math" => Some(math_module()),
        _ => None,
    }
}

thread_local! {
    static MATH: ModuleHandle = build_math_module();
}

/// The shared `math` module instance. Every `use math;` binds the same handle.
fn math_module() -> ModuleHandle {
    MATH.with(Rc::clone)
}

const MATH_FNS: &[NativeFn] = &[
    NativeFn {
        name: "abs",
        call: math_abs,
    },
    NativeFn {
        name: "sqrt",
        call: math_sqrt,
    },
    NativeFn {
        name: "floor",
        call: math_floor,
    },
    NativeFn {
        name: "min",
        call: math_min,
    },
    NativeFn {
        name: "max",
        call: math_max,
    },
];

fn build_math_module() -> ModuleHandle {
    let module = LoadedModule::new("math", ModuleOrigin::Host);
    module.set("pi", Value::Float(std::f64::consts::PI));
    for native in MATH_FNS {
        module.set(native.name, Value::Native(*native));
    }
    module
}

fn type_error(expected: &str, got: &Value) -> String {
    format!("expected {expected}, got {}", got.type_name())
}

fn expect_arity(args: &[Value], count: usize) -> Result<(), String> {
    if args.len() == count {
        Ok(())
    } else {
        Err(format!("expected {count} argument(s), got {}", args.len()))
    }
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Int(v) => Some(*v as f64),
        Value::Float(v) => Some(*v),
        _ => None,
    }
}

fn native_print(args: &[Value]) -> Result<Value, String> {
    let rendered: Vec<String> = args.iter().map(ToString::to_string).collect();
    println!("{}", rendered.join(" "));
    Ok(Value::Unit)
}

fn native_len(args: &[Value]) -> Result<Value, String> {
    expect_arity(args, 1)?;
    match &args[0] {
        Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
        Value::List(items) => Ok(Value::Int(items.borrow().len() as i64)),
        other => Err(type_error("a str or list", other)),
    }
}

fn native_str(args: &[Value]) -> Result<Value, String> {
    expect_arity(args, 1)?;
    Ok(Value::str(args[0].to_string()))
}

fn native_push(args: &[Value]) -> Result<Value, String> {
    expect_arity(args, 2)?;
    match &args[0] {
        Value::List(items) => {
            items.borrow_mut().push(args[1].clone());
            Ok(Value::Unit)
        }
        other => Err(type_error("a list", other)),
    }
}

fn math_abs(args: &[Value]) -> Result<Value, String> {
    expect_arity(args, 1)?;
    match &args[0] {
        Value::Int(v) => v
            .checked_abs()
            .map(Value::Int)
            .ok_or_else(|| "integer overflow".to_string()),
        Value::Float(v) => Ok(Value::Float(v.abs())),
        other => Err(type_error("a number", other)),
    }
}

fn math_sqrt(args: &[Value]) -> Result<Value, String> {
    expect_arity(args, 1)?;
    let v = as_float(&args[0]).ok_or_else(|| type_error("a number", &args[0]))?;
    if v < 0.0 {
        return Err("cannot take the square root of a negative number".to_string());
    }
    Ok(Value::Float(v.sqrt()))
}

fn math_floor(args: &[Value]) -> Result<Value, String> {
    expect_arity(args, 1)?;
    match &args[0] {
        Value::Int(v) => Ok(Value::Int(*v)),
        Value::Float(v) => {
            let floored = v.floor();
            if !floored.is_finite() || floored < i64::MIN as f64 || floored > i64::MAX as f64 {
                return Err(format!("{v} cannot be floored to an int"));
            }
            Ok(Value::Int(floored as i64))
        }
        other => Err(type_error("a number", other)),
    }
}

fn math_min(args: &[Value]) -> Result<Value, String> {
    extremum(args, |best, candidate| best <= candidate)
}

fn math_max(args: &[Value]) -> Result<Value, String> {
    extremum(args, |best, candidate| best >= candidate)
}

/// Keeps the winning argument's own type, so mins of ints stay ints.
fn extremum(args: &[Value], keep_left: fn(f64, f64) -> bool) -> Result<Value, String> {
    let (first, rest) = args
        .split_first()
        .ok_or_else(|| "expected at least 1 argument".to_string())?;
    let mut best = first.clone();
    let mut best_key = as_float(&best).ok_or_else(|| type_error("a number", &best))?;
    for arg in rest {
        let key = as_float(arg).ok_or_else(|| type_error("a number", arg))?;
        if !keep_left(best_key, key) {
            best = arg.clone();
            best_key = key;
        }
    }
    Ok(best)
}
