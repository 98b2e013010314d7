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

//! Binds a destructuring [`Pattern`] against a [`Value`], either by
//! *defining* fresh names in an environment (`let {a, b} = obj;`, function
//! parameters, `for-of` loop targets) or by *assigning* into existing
//! bindings reachable from an environment (`({a, b} = obj);`).
//!
//! Evaluating an object property's default expression requires calling back
//! into the expression evaluator, which itself binds patterns (function
//! parameters); `DefaultEvaluator` breaks that cycle with a small callback
//! the interpreter supplies rather than a direct module dependency.

use futures::future::LocalBoxFuture;
use indexmap::IndexMap;

use crate::ast::{Expr, Pattern};
use crate::environment::Environment;
use crate::error::EvalError;
use crate::span::Span;
use crate::value::Value;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum BindMode {
    Define,
    Assign,
}

pub type DefaultEvaluator<'a> = &'a dyn Fn(&Expr) -> LocalBoxFuture<'static, Result<Value, EvalError>>;

#[async_recursion::async_recursion(?Send)]
pub async fn bind_pattern(
    pattern: &Pattern,
    value: Value,
    env: &Environment,
    mode: BindMode,
    eval_default: &dyn for<'a> Fn(&'a Expr) -> LocalBoxFuture<'static, Result<Value, EvalError>>,
    span: Span,
) -> Result<(), EvalError> {
    match pattern {
        Pattern::Identifier(name) => match mode {
            BindMode::Define => {
                env.define(name.clone(), value);
                Ok(())
            }
            BindMode::Assign => {
                if env.assign(name, value) {
                    Ok(())
                } else {
                    Err(EvalError::reference(format!("'{}' is not defined", name), span))
                }
            }
        },
        Pattern::Array { elements, rest } => {
            let items: Vec<Value> = match &value {
                Value::Array(items) => items.borrow().clone(),
                _ => return Err(EvalError::type_error("cannot destructure a non-array value as an array pattern", span)),
            };
            for (i, element) in elements.iter().enumerate() {
                if let Some(sub_pattern) = element {
                    let item = items.get(i).cloned().unwrap_or(Value::Undefined);
                    bind_pattern(sub_pattern, item, env, mode, eval_default, span).await?;
                }
            }
            if let Some(rest_pattern) = rest {
                let remainder: Vec<Value> = items.iter().skip(elements.len()).cloned().collect();
                bind_pattern(rest_pattern, Value::array(remainder), env, mode, eval_default, span).await?;
            }
            Ok(())
        }
        Pattern::Object { props, rest } => {
            let fields: IndexMap<String, Value> = match &value {
                Value::Object(fields) => fields.borrow().clone(),
                Value::Instance(inst) => inst.fields.borrow().clone(),
                Value::Error(fields) => fields.borrow().clone(),
                _ => return Err(EvalError::type_error("cannot destructure a non-object value as an object pattern", span)),
            };
            let mut consumed = std::collections::HashSet::new();
            for prop in props {
                consumed.insert(prop.key.clone());
                let found = fields.get(&prop.key).cloned().unwrap_or(Value::Undefined);
                let bound = if found.is_nullish() {
                    match &prop.default {
                        Some(expr) => eval_default(expr).await?,
                        None => found,
                    }
                } else {
                    found
                };
                bind_pattern(&prop.value, bound, env, mode, eval_default, span).await?;
            }
            if let Some(rest_name) = rest {
                let mut remainder = IndexMap::new();
                for (k, v) in fields.iter() {
                    if !consumed.contains(k) {
                        remainder.insert(k.clone(), v.clone());
                    }
                }
                match mode {
                    BindMode::Define => env.define(rest_name.clone(), Value::object(remainder)),
                    BindMode::Assign => {
                        if !env.assign(rest_name, Value::object(remainder)) {
                            return Err(EvalError::reference(format!("'{}' is not defined", rest_name), span));
                        }
                    }
                }
            }
            Ok(())
        }
    }
}

/// A [`DefaultEvaluator`] that rejects any default expression. Used where a
/// pattern is known never to carry one (plain array destructuring has no
/// per-element default in this grammar).
pub fn no_defaults(expr: &Expr) -> LocalBoxFuture<'static, Result<Value, EvalError>> {
    let span = expr.span;
    Box::pin(async move { Err(EvalError::unsupported("default expressions in this position", span)) })
}
