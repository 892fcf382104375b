//! Tree-walking evaluator.
//!
//! Programs execute against the namespace of a [`LoadedModule`]: top-level
//! statements bind directly into the module, function calls get a private
//! frame that falls back to the function's defining module, then to the
//! global builtins.
//!
//! [`LoadedModule`]: crate::loader::module::LoadedModule

use std::rc::Rc;

use crate::loader::module::ModuleHandle;
use crate::loader::registry::ModuleRegistry;
use crate::script::builtins;
use crate::script::parser::ast::{BinOp, Expr, Program, Stmt, StmtKind, UnOp};
use crate::script::span::{Position, Span};
use crate::script::value::{FuncValue, Namespace, Value};

/// Evaluation error
#[derive(Debug, Clone, thiserror::Error)]
pub enum EvalError {
    #[error("undefined name `{name}` at {position}")]
    UndefinedName { name: String, position: Position },
    #[error("no loaded module or builtin named `{name}` at {position}")]
    UnknownModule { name: String, position: Position },
    #[error("`{op}` is not supported between {left} and {right} at {position}")]
    UnsupportedBinary {
        op: &'static str,
        left: &'static str,
        right: &'static str,
        position: Position,
    },
    #[error("`{op}` is not supported on {operand} at {position}")]
    UnsupportedUnary {
        op: &'static str,
        operand: &'static str,
        position: Position,
    },
    #[error("a {type_name} is not callable at {position}")]
    NotCallable {
        type_name: &'static str,
        position: Position,
    },
    #[error("{name} expects {expected} argument(s), got {got} at {position}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
        position: Position,
    },
    #[error("expected {expected}, got {got} at {position}")]
    TypeMismatch {
        expected: &'static str,
        got: &'static str,
        position: Position,
    },
    #[error("index {index} is out of bounds for a list of length {len} at {position}")]
    IndexOutOfBounds {
        index: i64,
        len: usize,
        position: Position,
    },
    #[error("module `{module}` has no member `{name}` at {position}")]
    NoSuchMember {
        module: String,
        name: String,
        position: Position,
    },
    #[error("division by zero at {position}")]
    DivisionByZero { position: Position },
    #[error("integer overflow in `{op}` at {position}")]
    IntegerOverflow { op: &'static str, position: Position },
    #[error("call depth exceeded {limit} frames at {position}")]
    CallDepthExceeded { limit: usize, position: Position },
    #[error("{name}: {message} at {position}")]
    Builtin {
        name: String,
        message: String,
        position: Position,
    },
    #[error("`break` outside of a loop at {position}")]
    BreakOutsideLoop { position: Position },
    #[error("`continue` outside of a loop at {position}")]
    ContinueOutsideLoop { position: Position },
    #[error("`return` outside of a function at {position}")]
    ReturnOutsideFunction { position: Position },
}

pub type EvalResult<T> = Result<T, EvalError>;

/// Evaluator limits.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of nested script call frames.
    pub max_call_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_call_depth: 200,
        }
    }
}

/// Run a program in the given module's namespace.
///
/// Returns the value of the final expression statement, or [`Value::Unit`]
/// when the program ends with a declaration.
pub fn run_program(
    program: &Program,
    module: &ModuleHandle,
    registry: &ModuleRegistry,
    config: &EngineConfig,
) -> EvalResult<Value> {
    let mut evaluator = Evaluator {
        registry,
        config,
        depth: 0,
    };
    let mut ctx = Ctx::module_scope(module.clone());
    match evaluator.exec_block(&program.stmts, &mut ctx)? {
        Flow::Normal(value) => Ok(value),
        Flow::Break(position) => Err(EvalError::BreakOutsideLoop { position }),
        Flow::Continue(position) => Err(EvalError::ContinueOutsideLoop { position }),
        Flow::Return(_, position) => Err(EvalError::ReturnOutsideFunction { position }),
    }
}

enum Flow {
    Normal(Value),
    Break(Position),
    Continue(Position),
    Return(Value, Position),
}

impl Flow {
    fn normal() -> Self {
        Flow::Normal(Value::Unit)
    }
}

/// Name resolution context: an optional call frame over a module namespace.
struct Ctx {
    module: ModuleHandle,
    locals: Option<Namespace>,
}

impl Ctx {
    fn module_scope(module: ModuleHandle) -> Self {
        Self {
            module,
            locals: None,
        }
    }

    fn call_frame(module: ModuleHandle, frame: Namespace) -> Self {
        Self {
            module,
            locals: Some(frame),
        }
    }

    fn define(&mut self, name: &str, value: Value) {
        match &mut self.locals {
            Some(frame) => {
                frame.insert(name.to_string(), value);
            }
            None => self.module.set(name, value),
        }
    }

    /// Rebind an existing name. Fails if the name was never defined.
    fn assign(&mut self, name: &str, value: Value) -> bool {
        if let Some(frame) = &mut self.locals {
            if let Some(slot) = frame.get_mut(name) {
                *slot = value;
                return true;
            }
        }
        if self.module.contains(name) {
            self.module.set(name, value);
            return true;
        }
        false
    }

    fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(frame) = &self.locals {
            if let Some(value) = frame.get(name) {
                return Some(value.clone());
            }
        }
        if let Some(value) = self.module.get(name) {
            return Some(value);
        }
        builtins::lookup_global(name)
    }
}

struct Evaluator<'a> {
    registry: &'a ModuleRegistry,
    config: &'a EngineConfig,
    depth: usize,
}

impl Evaluator<'_> {
    fn exec_block(&mut self, stmts: &[Stmt], ctx: &mut Ctx) -> EvalResult<Flow> {
        let mut last = Value::Unit;
        for stmt in stmts {
            match self.exec_stmt(stmt, ctx)? {
                Flow::Normal(value) => {
                    if matches!(stmt.kind, StmtKind::Expr(_)) {
                        last = value;
                    }
                }
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal(last))
    }

    fn exec_stmt(&mut self, stmt: &Stmt, ctx: &mut Ctx) -> EvalResult<Flow> {
        match &stmt.kind {
            StmtKind::Let { name, value } => {
                let value = self.eval_expr(value, ctx)?;
                ctx.define(name, value);
                Ok(Flow::normal())
            }
            StmtKind::Assign { name, value } => {
                let value = self.eval_expr(value, ctx)?;
                if ctx.assign(name, value) {
                    Ok(Flow::normal())
                } else {
                    Err(EvalError::UndefinedName {
                        name: name.clone(),
                        position: stmt.span.start,
                    })
                }
            }
            StmtKind::Fn { name, params, body } => {
                let func = FuncValue {
                    name: name.clone(),
                    params: params.clone(),
                    body: body.clone(),
                    module: ctx.module.clone(),
                };
                ctx.define(name, Value::Func(Rc::new(func)));
                Ok(Flow::normal())
            }
            StmtKind::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.eval_expr(expr, ctx)?,
                    None => Value::Unit,
                };
                Ok(Flow::Return(value, stmt.span.start))
            }
            StmtKind::If {
                condition,
                then_body,
                else_body,
            } => {
                if self.eval_condition(condition, ctx)? {
                    self.exec_block(then_body, ctx)
                } else if let Some(body) = else_body {
                    self.exec_block(body, ctx)
                } else {
                    Ok(Flow::normal())
                }
            }
            StmtKind::While { condition, body } => {
                while self.eval_condition(condition, ctx)? {
                    match self.exec_block(body, ctx)? {
                        Flow::Normal(_) | Flow::Continue(_) => {}
                        Flow::Break(_) => break,
                        ret @ Flow::Return(..) => return Ok(ret),
                    }
                }
                Ok(Flow::normal())
            }
            StmtKind::Break => Ok(Flow::Break(stmt.span.start)),
            StmtKind::Continue => Ok(Flow::Continue(stmt.span.start)),
            StmtKind::Use { name } => {
                let module = self.resolve_module(name, stmt.span.start)?;
                ctx.define(name, Value::Module(module));
                Ok(Flow::normal())
            }
            StmtKind::Expr(expr) => Ok(Flow::Normal(self.eval_expr(expr, ctx)?)),
        }
    }

    /// Loaded modules shadow builtin modules of the same name.
    fn resolve_module(&self, name: &str, position: Position) -> EvalResult<ModuleHandle> {
        if let Some(module) = self.registry.get(name) {
            return Ok(module);
        }
        if let Some(module) = builtins::builtin_module(name) {
            return Ok(module);
        }
        Err(EvalError::UnknownModule {
            name: name.to_string(),
            position,
        })
    }

    fn eval_condition(&mut self, condition: &Expr, ctx: &Ctx) -> EvalResult<bool> {
        let value = self.eval_expr(condition, ctx)?;
        self.expect_bool(value, condition.span())
    }

    fn expect_bool(&self, value: Value, span: Span) -> EvalResult<bool> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(EvalError::TypeMismatch {
                expected: "bool",
                got: other.type_name(),
                position: span.start,
            }),
        }
    }

    fn eval_expr(&mut self, expr: &Expr, ctx: &Ctx) -> EvalResult<Value> {
        match expr {
            Expr::Int(value, _) => Ok(Value::Int(*value)),
            Expr::Float(value, _) => Ok(Value::Float(*value)),
            Expr::Bool(value, _) => Ok(Value::Bool(*value)),
            Expr::Str(value, _) => Ok(Value::str(value.clone())),
            Expr::Var(name, span) => {
                ctx.lookup(name).ok_or_else(|| EvalError::UndefinedName {
                    name: name.clone(),
                    position: span.start,
                })
            }
            Expr::List(items, _) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_expr(item, ctx)?);
                }
                Ok(Value::list(values))
            }
            Expr::UnOp { op, operand, span } => {
                let value = self.eval_expr(operand, ctx)?;
                self.eval_unop(*op, value, span.start)
            }
            Expr::BinOp {
                op: BinOp::And,
                left,
                right,
                ..
            } => {
                let lhs = self.eval_expr(left, ctx)?;
                if !self.expect_bool(lhs, left.span())? {
                    return Ok(Value::Bool(false));
                }
                let rhs = self.eval_expr(right, ctx)?;
                Ok(Value::Bool(self.expect_bool(rhs, right.span())?))
            }
            Expr::BinOp {
                op: BinOp::Or,
                left,
                right,
                ..
            } => {
                let lhs = self.eval_expr(left, ctx)?;
                if self.expect_bool(lhs, left.span())? {
                    return Ok(Value::Bool(true));
                }
                let rhs = self.eval_expr(right, ctx)?;
                Ok(Value::Bool(self.expect_bool(rhs, right.span())?))
            }
            Expr::BinOp {
                op,
                left,
                right,
                span,
            } => {
                let lhs = self.eval_expr(left, ctx)?;
                let rhs = self.eval_expr(right, ctx)?;
                self.eval_binop(*op, lhs, rhs, span.start)
            }
            Expr::Call { callee, args, span } => {
                let callee = self.eval_expr(callee, ctx)?;
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_expr(arg, ctx)?);
                }
                self.call_value(callee, values, span.start)
            }
            Expr::Index {
                target,
                index,
                span,
            } => {
                let target = self.eval_expr(target, ctx)?;
                let index = self.eval_expr(index, ctx)?;
                self.eval_index(target, index, span.start)
            }
            Expr::Field { target, name, span } => {
                let target = self.eval_expr(target, ctx)?;
                match target {
                    Value::Module(module) => {
                        module.get(name).ok_or_else(|| EvalError::NoSuchMember {
                            module: module.name.clone(),
                            name: name.clone(),
                            position: span.start,
                        })
                    }
                    other => Err(EvalError::TypeMismatch {
                        expected: "module",
                        got: other.type_name(),
                        position: span.start,
                    }),
                }
            }
        }
    }

    fn eval_unop(&self, op: UnOp, value: Value, position: Position) -> EvalResult<Value> {
        match (op, value) {
            (UnOp::Neg, Value::Int(v)) => v
                .checked_neg()
                .map(Value::Int)
                .ok_or(EvalError::IntegerOverflow { op: "-", position }),
            (UnOp::Neg, Value::Float(v)) => Ok(Value::Float(-v)),
            (UnOp::Not, Value::Bool(v)) => Ok(Value::Bool(!v)),
            (op, value) => Err(EvalError::UnsupportedUnary {
                op: op.symbol(),
                operand: value.type_name(),
                position,
            }),
        }
    }

    fn eval_binop(
        &self,
        op: BinOp,
        left: Value,
        right: Value,
        position: Position,
    ) -> EvalResult<Value> {
        match op {
            BinOp::Add => match (&left, &right) {
                (Value::Int(a), Value::Int(b)) => a
                    .checked_add(*b)
                    .map(Value::Int)
                    .ok_or(EvalError::IntegerOverflow { op: "+", position }),
                (Value::Str(a), Value::Str(b)) => Ok(Value::str(format!("{a}{b}"))),
                (Value::List(a), Value::List(b)) => {
                    let mut items = a.borrow().clone();
                    items.extend(b.borrow().iter().cloned());
                    Ok(Value::list(items))
                }
                _ => self.numeric_float(op, &left, &right, position, |a, b| a + b),
            },
            BinOp::Sub => match (&left, &right) {
                (Value::Int(a), Value::Int(b)) => a
                    .checked_sub(*b)
                    .map(Value::Int)
                    .ok_or(EvalError::IntegerOverflow { op: "-", position }),
                _ => self.numeric_float(op, &left, &right, position, |a, b| a - b),
            },
            BinOp::Mul => match (&left, &right) {
                (Value::Int(a), Value::Int(b)) => a
                    .checked_mul(*b)
                    .map(Value::Int)
                    .ok_or(EvalError::IntegerOverflow { op: "*", position }),
                _ => self.numeric_float(op, &left, &right, position, |a, b| a * b),
            },
            BinOp::Div => match (&left, &right) {
                (Value::Int(_), Value::Int(0)) => Err(EvalError::DivisionByZero { position }),
                (Value::Int(a), Value::Int(b)) => a
                    .checked_div(*b)
                    .map(Value::Int)
                    .ok_or(EvalError::IntegerOverflow { op: "/", position }),
                _ => self.numeric_float(op, &left, &right, position, |a, b| a / b),
            },
            BinOp::Rem => match (&left, &right) {
                (Value::Int(_), Value::Int(0)) => Err(EvalError::DivisionByZero { position }),
                (Value::Int(a), Value::Int(b)) => a
                    .checked_rem(*b)
                    .map(Value::Int)
                    .ok_or(EvalError::IntegerOverflow { op: "%", position }),
                _ => self.numeric_float(op, &left, &right, position, |a, b| a % b),
            },
            BinOp::Eq => Ok(Value::Bool(left == right)),
            BinOp::Neq => Ok(Value::Bool(left != right)),
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                let ordering = match (&left, &right) {
                    (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
                    (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
                    (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
                    (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
                    (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
                    _ => {
                        return Err(EvalError::UnsupportedBinary {
                            op: op.symbol(),
                            left: left.type_name(),
                            right: right.type_name(),
                            position,
                        })
                    }
                };
                // NaN comparisons are false, like the underlying floats.
                let Some(ordering) = ordering else {
                    return Ok(Value::Bool(false));
                };
                Ok(Value::Bool(match op {
                    BinOp::Lt => ordering.is_lt(),
                    BinOp::Le => ordering.is_le(),
                    BinOp::Gt => ordering.is_gt(),
                    BinOp::Ge => ordering.is_ge(),
                    _ => unreachable!(),
                }))
            }
            // Short-circuit operators are handled in eval_expr.
            BinOp::And | BinOp::Or => unreachable!("short-circuit ops evaluated eagerly"),
        }
    }

    fn numeric_float(
        &self,
        op: BinOp,
        left: &Value,
        right: &Value,
        position: Position,
        apply: fn(f64, f64) -> f64,
    ) -> EvalResult<Value> {
        let promote = |value: &Value| match value {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        };
        match (promote(left), promote(right)) {
            (Some(a), Some(b)) => Ok(Value::Float(apply(a, b))),
            _ => Err(EvalError::UnsupportedBinary {
                op: op.symbol(),
                left: left.type_name(),
                right: right.type_name(),
                position,
            }),
        }
    }

    fn eval_index(&self, target: Value, index: Value, position: Position) -> EvalResult<Value> {
        let items = match &target {
            Value::List(items) => items,
            other => {
                return Err(EvalError::TypeMismatch {
                    expected: "list",
                    got: other.type_name(),
                    position,
                })
            }
        };
        let index = match index {
            Value::Int(i) => i,
            other => {
                return Err(EvalError::TypeMismatch {
                    expected: "int",
                    got: other.type_name(),
                    position,
                })
            }
        };
        let items = items.borrow();
        if index < 0 || index as usize >= items.len() {
            return Err(EvalError::IndexOutOfBounds {
                index,
                len: items.len(),
                position,
            });
        }
        Ok(items[index as usize].clone())
    }

    fn call_value(&mut self, callee: Value, args: Vec<Value>, position: Position) -> EvalResult<Value> {
        match callee {
            Value::Func(func) => self.call_func(&func, args, position),
            Value::Native(native) => {
                (native.call)(&args).map_err(|message| EvalError::Builtin {
                    name: native.name.to_string(),
                    message,
                    position,
                })
            }
            other => Err(EvalError::NotCallable {
                type_name: other.type_name(),
                position,
            }),
        }
    }

    fn call_func(
        &mut self,
        func: &FuncValue,
        args: Vec<Value>,
        position: Position,
    ) -> EvalResult<Value> {
        if args.len() != func.params.len() {
            return Err(EvalError::ArityMismatch {
                name: func.name.clone(),
                expected: func.params.len(),
                got: args.len(),
                position,
            });
        }
        if self.depth >= self.config.max_call_depth {
            return Err(EvalError::CallDepthExceeded {
                limit: self.config.max_call_depth,
                position,
            });
        }

        let mut frame = Namespace::new();
        for (param, arg) in func.params.iter().zip(args) {
            frame.insert(param.clone(), arg);
        }
        let mut ctx = Ctx::call_frame(func.module.clone(), frame);

        self.depth += 1;
        let flow = self.exec_block(&func.body, &mut ctx);
        self.depth -= 1;

        match flow? {
            Flow::Return(value, _) => Ok(value),
            Flow::Normal(_) => Ok(Value::Unit),
            Flow::Break(position) => Err(EvalError::BreakOutsideLoop { position }),
            Flow::Continue(position) => Err(EvalError::ContinueOutsideLoop { position }),
        }
    }
}
