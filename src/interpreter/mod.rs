/*
 * ==========================================================================
 * WARDEN - sandboxed scripting language evaluator
 * ==========================================================================
 *
 * Evaluator Entry & Runtime Bootstrap
 * ------------------------------------
 * This module is the primary runtime entrypoint. It owns:
 *
 *  - The top-level `evaluate(globals, source)` entry point
 *  - The non-local control-flow signal threaded by statement execution
 *  - `Ctx`, the small per-call-frame context (current loop label, the
 *    class a method body is executing under) passed by value instead of
 *    tracked through mutable global state
 *
 * All other evaluation logic is delegated to the following submodules:
 *
 *  - statements.rs  -> statement execution (exec_stmt / exec_block)
 *  - expressions.rs -> expression evaluation (eval_expr)
 *  - calls.rs       -> function/native invocation
 *  - classes.rs     -> class construction and instance dispatch
 *  - display.rs     -> value formatting utilities
 *
 * Author:   Sam Wilcox
 * Email:    sam@pawx-lang.com
 * Website:  https://www.pawx-lang.com
 * Github:   https://github.com/samwilcox/pawx
 *
 * License:
 * This file is part of the Warden project.
 *
 * Warden is dual-licensed under the terms of:
 *   - The MIT license
 *   - The Apache License, Version 2.0
 *
 * You may choose either license to govern your use of this software.
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under these licenses is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *
 * ==========================================================================
 */

pub mod calls;
pub mod classes;
pub mod display;
pub mod expressions;
pub mod statements;

use std::rc::Rc;

use crate::ast::StmtKind;
use crate::class::ClassObject;
use crate::environment::Environment;
use crate::error::EvalError;
use crate::value::Value;

/// Non-local control-flow produced by executing a statement. `throw` and
/// internal runtime faults both travel through `Result::Err(EvalError)`
/// instead of a dedicated signal variant, so `try`/`catch` only has to
/// unify one channel rather than two.
#[derive(Debug, Clone)]
pub enum ExecSignal {
    None,
    Return(Value),
    Break(Option<String>),
    Continue(Option<String>),
}

/// Context threaded explicitly through every statement/expression
/// evaluation call instead of tracked via mutable globals:
///
/// - `label` is the label directly wrapping the statement currently
///   executing, cleared again once that statement finishes — this is how
///   `break outer;` is matched against the right enclosing loop.
/// - `home_class` is the class whose method body is currently executing,
///   used to resolve `super.m()` against an explicit superclass handle.
#[derive(Clone, Default)]
pub struct Ctx {
    pub label: Option<Rc<str>>,
    pub home_class: Option<Rc<ClassObject>>,
}

impl Ctx {
    pub fn with_label(&self, label: Option<Rc<str>>) -> Self {
        Ctx { label, home_class: self.home_class.clone() }
    }

    pub fn with_home_class(&self, home_class: Option<Rc<ClassObject>>) -> Self {
        Ctx { label: self.label.clone(), home_class }
    }

    pub fn cleared_label(&self) -> Self {
        Ctx { label: None, home_class: self.home_class.clone() }
    }
}

/// Parses and evaluates `source` in `globals`. `globals` is used as-is: the
/// evaluator never seeds it with anything by default (see `crate::prelude`
/// for an explicit, opt-in convenience helper).
pub async fn evaluate(globals: &Environment, source: &str) -> Result<Value, EvalError> {
    let program = crate::parser::parse_program(source)?;
    let ctx = Ctx::default();
    let mut last = Value::Undefined;
    for stmt in &program.body {
        // A bare top-level expression statement is the one place its value
        // isn't thrown away: a script's (or a REPL line's) result is
        // whatever its last expression evaluated to, same as the value a
        // REPL echoes back after every line.
        if let StmtKind::Expr(expr) = &stmt.kind {
            last = expressions::eval_expr(expr, globals, &ctx).await?;
            continue;
        }
        match statements::exec_stmt(stmt, globals, &ctx).await? {
            ExecSignal::None => {}
            ExecSignal::Return(v) => {
                last = v;
                break;
            }
            ExecSignal::Break(_) | ExecSignal::Continue(_) => {
                return Err(EvalError::syntax("illegal break/continue outside of a loop", stmt.span));
            }
        }
    }
    Ok(last)
}
