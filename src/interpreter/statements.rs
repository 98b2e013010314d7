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

use crate::ast::*;
use crate::environment::Environment;
use crate::error::EvalError;
use crate::function::FunctionObject;
use crate::interpreter::expressions::{self, eval_expr};
use crate::interpreter::classes;
use crate::interpreter::{Ctx, ExecSignal};
use crate::pattern::BindMode;
use crate::value::Value;

enum LoopAction {
    Next,
    Stop,
    Propagate(ExecSignal),
}

fn classify(signal: ExecSignal, my_label: &Option<Rc<str>>) -> LoopAction {
    match signal {
        ExecSignal::None => LoopAction::Next,
        ExecSignal::Return(v) => LoopAction::Propagate(ExecSignal::Return(v)),
        ExecSignal::Break(None) => LoopAction::Stop,
        ExecSignal::Break(Some(l)) => {
            if my_label.as_deref() == Some(l.as_str()) {
                LoopAction::Stop
            } else {
                LoopAction::Propagate(ExecSignal::Break(Some(l)))
            }
        }
        ExecSignal::Continue(None) => LoopAction::Next,
        ExecSignal::Continue(Some(l)) => {
            if my_label.as_deref() == Some(l.as_str()) {
                LoopAction::Next
            } else {
                LoopAction::Propagate(ExecSignal::Continue(Some(l)))
            }
        }
    }
}

#[async_recursion::async_recursion(?Send)]
pub async fn exec_block(stmts: &[Stmt], parent_env: &Environment, ctx: &Ctx) -> Result<ExecSignal, EvalError> {
    let scope = Environment::new(Some(parent_env.clone()));
    let result = exec_stmt_list(stmts, &scope, ctx).await;
    scope.release();
    result
}

pub(crate) async fn exec_stmt_list(stmts: &[Stmt], env: &Environment, ctx: &Ctx) -> Result<ExecSignal, EvalError> {
    for stmt in stmts {
        match exec_stmt(stmt, env, ctx).await? {
            ExecSignal::None => {}
            other => return Ok(other),
        }
    }
    Ok(ExecSignal::None)
}

#[async_recursion::async_recursion(?Send)]
pub async fn exec_stmt(stmt: &Stmt, env: &Environment, ctx: &Ctx) -> Result<ExecSignal, EvalError> {
    match &stmt.kind {
        StmtKind::Empty => Ok(ExecSignal::None),

        StmtKind::Expr(expr) => {
            eval_expr(expr, env, ctx).await?;
            Ok(ExecSignal::None)
        }

        StmtKind::VarDecl { declarations, .. } => {
            for (pattern, init) in declarations {
                let value = match init {
                    Some(e) => eval_expr(e, env, ctx).await?,
                    None => Value::Undefined,
                };
                expressions::bind_pattern_here(pattern, value, env, BindMode::Define, ctx, stmt.span).await?;
            }
            Ok(ExecSignal::None)
        }

        StmtKind::FunctionDecl(node) => {
            let func = FunctionObject::new(node, env.clone(), None);
            let name = node.name.clone().unwrap_or_else(|| "anonymous".to_string());
            env.define(name, Value::Function(func));
            Ok(ExecSignal::None)
        }

        StmtKind::ClassDecl(node) => {
            let class_val = classes::build_class_value(node, env, ctx).await?;
            if let Some(name) = &node.name {
                env.define(name.clone(), class_val);
            }
            Ok(ExecSignal::None)
        }

        StmtKind::Return(value) => {
            let v = match value {
                Some(e) => eval_expr(e, env, ctx).await?,
                None => Value::Undefined,
            };
            Ok(ExecSignal::Return(v))
        }

        StmtKind::Break(label) => Ok(ExecSignal::Break(label.clone())),
        StmtKind::Continue(label) => Ok(ExecSignal::Continue(label.clone())),

        StmtKind::Throw(expr) => {
            let v = eval_expr(expr, env, ctx).await?;
            Err(EvalError::thrown(v, stmt.span))
        }

        StmtKind::If { test, then_branch, else_branch } => {
            let t = eval_expr(test, env, ctx).await?;
            if t.is_truthy() {
                exec_stmt(then_branch, env, ctx).await
            } else if let Some(else_branch) = else_branch {
                exec_stmt(else_branch, env, ctx).await
            } else {
                Ok(ExecSignal::None)
            }
        }

        StmtKind::While { test, body } => {
            let my_label = ctx.label.clone();
            let inner_ctx = ctx.cleared_label();
            loop {
                let t = eval_expr(test, env, ctx).await?;
                if !t.is_truthy() {
                    return Ok(ExecSignal::None);
                }
                let signal = exec_stmt(body, env, &inner_ctx).await?;
                match classify(signal, &my_label) {
                    LoopAction::Next => continue,
                    LoopAction::Stop => return Ok(ExecSignal::None),
                    LoopAction::Propagate(s) => return Ok(s),
                }
            }
        }

        StmtKind::DoWhile { body, test } => {
            let my_label = ctx.label.clone();
            let inner_ctx = ctx.cleared_label();
            loop {
                let signal = exec_stmt(body, env, &inner_ctx).await?;
                match classify(signal, &my_label) {
                    LoopAction::Next => {}
                    LoopAction::Stop => return Ok(ExecSignal::None),
                    LoopAction::Propagate(s) => return Ok(s),
                }
                let t = eval_expr(test, env, ctx).await?;
                if !t.is_truthy() {
                    return Ok(ExecSignal::None);
                }
            }
        }

        StmtKind::For { init, test, update, body } => {
            let my_label = ctx.label.clone();
            let inner_ctx = ctx.cleared_label();
            let loop_env = Environment::new(Some(env.clone()));
            let result = (async {
                if let Some(init) = init {
                    exec_stmt(init, &loop_env, &inner_ctx).await?;
                }
                loop {
                    if let Some(test) = test {
                        let t = eval_expr(test, &loop_env, &inner_ctx).await?;
                        if !t.is_truthy() {
                            return Ok(ExecSignal::None);
                        }
                    }
                    let signal = exec_stmt(body, &loop_env, &inner_ctx).await?;
                    match classify(signal, &my_label) {
                        LoopAction::Next => {}
                        LoopAction::Stop => return Ok(ExecSignal::None),
                        LoopAction::Propagate(s) => return Ok(s),
                    }
                    if let Some(update) = update {
                        eval_expr(update, &loop_env, &inner_ctx).await?;
                    }
                }
            })
            .await;
            loop_env.release();
            result
        }

        StmtKind::ForIn { decl_kind, pattern, object, body } => {
            let my_label = ctx.label.clone();
            let inner_ctx = ctx.cleared_label();
            let object_val = eval_expr(object, env, ctx).await?;
            let keys = enumerate_keys(&object_val, stmt.span)?;
            for key in keys {
                let iter_env = Environment::new(Some(env.clone()));
                let bind_result = (async {
                    let mode = if decl_kind.is_some() { BindMode::Define } else { BindMode::Assign };
                    expressions::bind_pattern_here(pattern, Value::string(key), &iter_env, mode, &inner_ctx, stmt.span).await?;
                    exec_stmt(body, &iter_env, &inner_ctx).await
                })
                .await;
                iter_env.release();
                let signal = bind_result?;
                match classify(signal, &my_label) {
                    LoopAction::Next => continue,
                    LoopAction::Stop => return Ok(ExecSignal::None),
                    LoopAction::Propagate(s) => return Ok(s),
                }
            }
            Ok(ExecSignal::None)
        }

        StmtKind::ForOf { decl_kind, pattern, iterable, body } => {
            let my_label = ctx.label.clone();
            let inner_ctx = ctx.cleared_label();
            let iterable_val = eval_expr(iterable, env, ctx).await?;
            let items = enumerate_items(&iterable_val, stmt.span)?;
            for item in items {
                let iter_env = Environment::new(Some(env.clone()));
                let bind_result = (async {
                    let mode = if decl_kind.is_some() { BindMode::Define } else { BindMode::Assign };
                    expressions::bind_pattern_here(pattern, item, &iter_env, mode, &inner_ctx, stmt.span).await?;
                    exec_stmt(body, &iter_env, &inner_ctx).await
                })
                .await;
                iter_env.release();
                let signal = bind_result?;
                match classify(signal, &my_label) {
                    LoopAction::Next => continue,
                    LoopAction::Stop => return Ok(ExecSignal::None),
                    LoopAction::Propagate(s) => return Ok(s),
                }
            }
            Ok(ExecSignal::None)
        }

        StmtKind::Switch { discriminant, cases } => {
            let my_label = ctx.label.clone();
            let inner_ctx = ctx.cleared_label();
            let disc = eval_expr(discriminant, env, ctx).await?;
            let scope = Environment::new(Some(env.clone()));
            let result = exec_switch(&disc, cases, &scope, &inner_ctx).await;
            scope.release();
            match classify(result?, &my_label) {
                LoopAction::Next | LoopAction::Stop => Ok(ExecSignal::None),
                LoopAction::Propagate(s) => Ok(s),
            }
        }

        StmtKind::Try { block, catch, finally } => {
            let try_result = exec_block(block, env, ctx).await;

            let mut outcome = match try_result {
                Ok(signal) => Ok(signal),
                Err(err) => {
                    if let Some(catch) = catch {
                        let scope = Environment::new(Some(env.clone()));
                        let bind_result = match &catch.param {
                            Some(p) => expressions::bind_pattern_here(p, err.into_catch_value(), &scope, BindMode::Define, ctx, stmt.span).await,
                            None => Ok(()),
                        };
                        let result = match bind_result {
                            Ok(()) => exec_stmt_list(&catch.body, &scope, ctx).await,
                            Err(e) => Err(e),
                        };
                        scope.release();
                        result
                    } else {
                        Err(err)
                    }
                }
            };

            if let Some(finally) = finally {
                let finally_result = exec_block(finally, env, ctx).await;
                match finally_result {
                    Ok(ExecSignal::None) => {}
                    other => outcome = other,
                }
            }

            outcome
        }

        StmtKind::Labeled { label, body } => {
            let label_rc: Rc<str> = Rc::from(label.as_str());
            let labeled_ctx = ctx.with_label(Some(label_rc.clone()));
            let signal = exec_stmt(body, env, &labeled_ctx).await?;
            match signal {
                ExecSignal::Break(Some(l)) if l == label.as_str() => Ok(ExecSignal::None),
                other => Ok(other),
            }
        }

        StmtKind::Block(stmts) => exec_block(stmts, env, ctx).await,
    }
}

async fn exec_switch(disc: &Value, cases: &[SwitchCase], env: &Environment, ctx: &Ctx) -> Result<ExecSignal, EvalError> {
    let mut matched = false;
    let mut default_index = None;
    for (i, case) in cases.iter().enumerate() {
        match &case.test {
            Some(test_expr) if !matched => {
                let test_val = eval_expr(test_expr, env, ctx).await?;
                if Value::strict_eq(disc, &test_val) {
                    matched = true;
                }
            }
            None => default_index = Some(i),
            _ => {}
        }
        if matched {
            match exec_stmt_list(&case.body, env, ctx).await? {
                ExecSignal::None => {}
                other => return Ok(other),
            }
        }
    }
    if !matched {
        if let Some(start) = default_index {
            for case in &cases[start..] {
                match exec_stmt_list(&case.body, env, ctx).await? {
                    ExecSignal::None => {}
                    other => return Ok(other),
                }
            }
        }
    }
    Ok(ExecSignal::None)
}

fn enumerate_keys(value: &Value, span: crate::span::Span) -> Result<Vec<String>, EvalError> {
    match value {
        Value::Object(fields) => Ok(fields.borrow().keys().cloned().collect()),
        Value::Error(fields) => Ok(fields.borrow().keys().cloned().collect()),
        Value::Instance(inst) => Ok(inst.fields.borrow().keys().cloned().collect()),
        Value::Array(items) => Ok((0..items.borrow().len()).map(|i| i.to_string()).collect()),
        _ => Err(EvalError::type_error("for-in requires an object or array", span)),
    }
}

fn enumerate_items(value: &Value, span: crate::span::Span) -> Result<Vec<Value>, EvalError> {
    match value {
        Value::Array(items) => Ok(items.borrow().clone()),
        Value::String(s) => Ok(s.chars().map(|c| Value::string(c.to_string())).collect()),
        _ => Err(EvalError::type_error("for-of requires an array or string", span)),
    }
}
