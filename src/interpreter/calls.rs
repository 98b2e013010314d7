/*
 * ==========================================================================
 * WARDEN - sandboxed scripting language evaluator
 * ==========================================================================
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

use std::rc::Rc;

use crate::environment::Environment;
use crate::error::EvalError;
use crate::function::FunctionObject;
use crate::interpreter::statements::exec_stmt_list;
use crate::interpreter::Ctx;
use crate::pattern::{self, BindMode};
use crate::promise::FunctionPromise;
use crate::span::Span;
use crate::value::Value;

/// Dispatches a call expression's already-evaluated callee to whichever
/// variant actually knows how to be invoked. `this_val` is `None` for a
/// bare call (`f()`); method-style calls thread it in explicitly from
/// `classes::call_property_method`.
pub async fn call_value(callee: Value, this_val: Option<Value>, args: Vec<Value>, span: Span) -> Result<Value, EvalError> {
    match callee {
        Value::Function(f) => call_function(f, this_val, args, Ctx::default()).await,
        Value::Native(native) => native(this_val, args),
        other => Err(EvalError::type_error(format!("{} is not callable", other.type_name()), span)),
    }
}

/// Invokes a user-defined function. Builds a fresh activation scope chained
/// to the function's captured environment (not the caller's), binds
/// parameters — including a single trailing rest parameter — and runs the
/// body. An `async function` settles its body immediately and hands back an
/// already-resolved [`FunctionPromise`]: there is no real task scheduler in
/// this single-threaded evaluator, so eagerly settling reproduces the
/// observable behavior (a thrown error only surfaces once something
/// `await`s or inspects the promise) without needing one.
pub async fn call_function(func: Rc<FunctionObject>, this_val: Option<Value>, args: Vec<Value>, ctx: Ctx) -> Result<Value, EvalError> {
    let call_env = Environment::new(Some(func.captured_env.clone()));

    let this_binding = if func.is_arrow { func.bound_this.clone() } else { this_val };
    if let Some(this) = this_binding {
        call_env.define("this", this);
    }

    let span = func.body.first().map(|s| s.span).unwrap_or_else(Span::none);
    let body_ctx = if func.is_arrow { ctx } else { ctx.cleared_label() };

    let outcome: Result<Value, EvalError> = async {
        bind_params(&func.params, args, &call_env, span).await?;
        run_body(&func.body, &call_env, &body_ctx).await
    }
    .await;
    call_env.release();

    // An `async function` settles its body immediately and hands back an
    // already-resolved promise instead of propagating `?` here, so a thrown
    // error surfaces only once something awaits or inspects the promise —
    // not at the call site itself.
    if func.is_async {
        Ok(Value::HostOpaque(FunctionPromise::settled(outcome)))
    } else {
        outcome
    }
}

async fn bind_params(params: &[crate::ast::Param], args: Vec<Value>, env: &Environment, span: Span) -> Result<(), EvalError> {
    for (index, param) in params.iter().enumerate() {
        if param.is_rest {
            let remainder: Vec<Value> = args.iter().skip(index).cloned().collect();
            pattern::bind_pattern(&param.pattern, Value::array(remainder), env, BindMode::Define, &pattern::no_defaults, span).await?;
            break;
        }
        let value = args.get(index).cloned().unwrap_or(Value::Undefined);
        pattern::bind_pattern(&param.pattern, value, env, BindMode::Define, &pattern::no_defaults, span).await?;
    }
    Ok(())
}

async fn run_body(body: &[crate::ast::Stmt], env: &Environment, ctx: &Ctx) -> Result<Value, EvalError> {
    match exec_stmt_list(body, env, ctx).await? {
        crate::interpreter::ExecSignal::Return(v) => Ok(v),
        crate::interpreter::ExecSignal::None => Ok(Value::Undefined),
        crate::interpreter::ExecSignal::Break(_) | crate::interpreter::ExecSignal::Continue(_) => {
            Err(EvalError::syntax("illegal break/continue outside of a loop", Span::none()))
        }
    }
}
