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

use indexmap::IndexMap;

use crate::ast::*;
use crate::environment::Environment;
use crate::error::EvalError;
use crate::function::FunctionObject;
use crate::interpreter::calls;
use crate::interpreter::classes;
use crate::interpreter::Ctx;
use crate::pattern;
use crate::span::Span;
use crate::value::Value;

#[async_recursion::async_recursion(?Send)]
pub async fn eval_expr(expr: &Expr, env: &Environment, ctx: &Ctx) -> Result<Value, EvalError> {
    match &expr.kind {
        ExprKind::Undefined => Ok(Value::Undefined),
        ExprKind::Null => Ok(Value::Null),
        ExprKind::Bool(b) => Ok(Value::Bool(*b)),
        ExprKind::Number(n) => Ok(Value::Number(*n)),
        ExprKind::StringLit(s) => Ok(Value::string(s.clone())),

        ExprKind::Template { quasis, exprs } => {
            let mut out = String::new();
            for (i, quasi) in quasis.iter().enumerate() {
                out.push_str(quasi);
                if let Some(e) = exprs.get(i) {
                    let v = eval_expr(e, env, ctx).await?;
                    out.push_str(&v.to_display_string());
                }
            }
            Ok(Value::string(out))
        }

        ExprKind::Identifier(name) => env
            .get(name)
            .ok_or_else(|| EvalError::reference(format!("'{}' is not defined", name), expr.span)),

        ExprKind::This => env
            .get("this")
            .ok_or_else(|| EvalError::syntax("'this' is not available here", expr.span)),

        ExprKind::Super => Err(EvalError::syntax("'super' may only be used in a member or call expression", expr.span)),

        ExprKind::Array(elements) => {
            let mut items = Vec::new();
            for el in elements {
                match el {
                    None => items.push(Value::Undefined),
                    Some(ArrayElement::Item(e)) => items.push(eval_expr(e, env, ctx).await?),
                    Some(ArrayElement::Spread(e)) => {
                        let spread_val = eval_expr(e, env, ctx).await?;
                        push_spread(&mut items, spread_val, e.span)?;
                    }
                }
            }
            Ok(Value::array(items))
        }

        ExprKind::Object(props) => {
            let mut fields = IndexMap::new();
            for prop in props {
                match prop {
                    ObjectProp::KeyValue { key, value } => {
                        let k = eval_prop_key(key, env, ctx).await?;
                        let v = eval_expr(value, env, ctx).await?;
                        fields.insert(k, v);
                    }
                    ObjectProp::Shorthand(name) => {
                        let v = env
                            .get(name)
                            .ok_or_else(|| EvalError::reference(format!("'{}' is not defined", name), expr.span))?;
                        fields.insert(name.clone(), v);
                    }
                    ObjectProp::Spread(e) => {
                        let v = eval_expr(e, env, ctx).await?;
                        match v {
                            Value::Object(src) => {
                                for (k, val) in src.borrow().iter() {
                                    fields.insert(k.clone(), val.clone());
                                }
                            }
                            Value::Instance(inst) => {
                                for (k, val) in inst.fields.borrow().iter() {
                                    fields.insert(k.clone(), val.clone());
                                }
                            }
                            _ => return Err(EvalError::type_error("spread in object literal requires an object", e.span)),
                        }
                    }
                    ObjectProp::Method { key, func } | ObjectProp::Getter { key, func } | ObjectProp::Setter { key, func } => {
                        // Object-literal accessors are stored as plain
                        // callable fields; only class getters/setters are
                        // dispatched implicitly on property access.
                        let k = eval_prop_key(key, env, ctx).await?;
                        let f = FunctionObject::new(func, env.clone(), None);
                        fields.insert(k, Value::Function(f));
                    }
                }
            }
            Ok(Value::object(fields))
        }

        ExprKind::Function(node) => Ok(Value::Function(FunctionObject::new(node, env.clone(), None))),

        ExprKind::Arrow(node) => {
            let bound_this = env.get("this");
            Ok(Value::Function(FunctionObject::new(node, env.clone(), bound_this)))
        }

        ExprKind::Class(node) => classes::build_class_value(node, env, ctx).await,

        ExprKind::Binary { op, left, right } => {
            let l = eval_expr(left, env, ctx).await?;
            let r = eval_expr(right, env, ctx).await?;
            eval_binary(*op, l, r, expr.span)
        }

        ExprKind::Logical { op, left, right } => {
            let l = eval_expr(left, env, ctx).await?;
            match op {
                LogicalOp::And => {
                    if l.is_truthy() {
                        eval_expr(right, env, ctx).await
                    } else {
                        Ok(l)
                    }
                }
                LogicalOp::Or => {
                    if l.is_truthy() {
                        Ok(l)
                    } else {
                        eval_expr(right, env, ctx).await
                    }
                }
                LogicalOp::NullishCoalesce => {
                    if l.is_nullish() {
                        eval_expr(right, env, ctx).await
                    } else {
                        Ok(l)
                    }
                }
            }
        }

        ExprKind::Unary { op, argument } => {
            if *op == UnaryOp::TypeOf {
                if let ExprKind::Identifier(name) = &argument.kind {
                    if env.get(name).is_none() {
                        return Ok(Value::string("undefined"));
                    }
                }
            }
            let v = eval_expr(argument, env, ctx).await?;
            Ok(match op {
                UnaryOp::Neg => Value::Number(-v.to_number()),
                UnaryOp::Plus => Value::Number(v.to_number()),
                UnaryOp::Not => Value::Bool(!v.is_truthy()),
                UnaryOp::BitNot => Value::Number(!(v.to_number() as i64 as i32) as f64),
                UnaryOp::TypeOf => Value::string(v.type_name()),
            })
        }

        ExprKind::Update { op, argument, prefix } => {
            let old = eval_expr(argument, env, ctx).await?;
            let old_num = old.to_number();
            let new_num = match op {
                UpdateOp::Increment => old_num + 1.0,
                UpdateOp::Decrement => old_num - 1.0,
            };
            let new_val = Value::Number(new_num);
            assign_to_target(argument, new_val.clone(), env, ctx).await?;
            Ok(if *prefix { new_val } else { Value::Number(old_num) })
        }

        ExprKind::Assign { op, target, value } => {
            let new_value = match op {
                AssignOp::Assign => eval_expr(value, env, ctx).await?,
                AssignOp::NullishAssign => {
                    let current = eval_expr(target, env, ctx).await?;
                    if current.is_nullish() {
                        eval_expr(value, env, ctx).await?
                    } else {
                        return Ok(current);
                    }
                }
                AssignOp::OrAssign => {
                    let current = eval_expr(target, env, ctx).await?;
                    if current.is_truthy() {
                        return Ok(current);
                    }
                    eval_expr(value, env, ctx).await?
                }
                AssignOp::AndAssign => {
                    let current = eval_expr(target, env, ctx).await?;
                    if !current.is_truthy() {
                        return Ok(current);
                    }
                    eval_expr(value, env, ctx).await?
                }
                compound => {
                    let current = eval_expr(target, env, ctx).await?;
                    let rhs = eval_expr(value, env, ctx).await?;
                    let bin_op = match compound {
                        AssignOp::Add => BinaryOp::Add,
                        AssignOp::Sub => BinaryOp::Sub,
                        AssignOp::Mul => BinaryOp::Mul,
                        AssignOp::Div => BinaryOp::Div,
                        AssignOp::Mod => BinaryOp::Mod,
                        _ => unreachable!(),
                    };
                    eval_binary(bin_op, current, rhs, expr.span)?
                }
            };
            assign_to_target(target, new_value.clone(), env, ctx).await?;
            Ok(new_value)
        }

        ExprKind::Member { object, property, optional } => {
            if matches!(object.kind, ExprKind::Super) {
                let home = ctx
                    .home_class
                    .clone()
                    .ok_or_else(|| EvalError::syntax("'super' may only be used inside a method", expr.span))?;
                let this_val = env
                    .get("this")
                    .ok_or_else(|| EvalError::syntax("'super' may only be used inside a method", expr.span))?;
                let name = match property {
                    MemberProp::Identifier(n) => n.clone(),
                    MemberProp::Computed(e) => eval_expr(e, env, ctx).await?.to_display_string(),
                };
                return classes::get_super_bound_method(&home, &name, this_val, expr.span);
            }

            let object_val = eval_expr(object, env, ctx).await?;
            if *optional && object_val.is_nullish() {
                return Ok(Value::Undefined);
            }
            let name = match property {
                MemberProp::Identifier(n) => n.clone(),
                MemberProp::Computed(e) => eval_expr(e, env, ctx).await?.to_display_string(),
            };
            if matches!(object_val, Value::Instance(_)) {
                classes::read_property_with_accessors(&object_val, &name, expr.span).await
            } else {
                get_property(&object_val, &name, expr.span)
            }
        }

        ExprKind::Call { callee, args, optional } => {
            if let ExprKind::Member { object, property, optional: member_optional } = &callee.kind {
                if matches!(object.kind, ExprKind::Super) {
                    let home = ctx
                        .home_class
                        .clone()
                        .ok_or_else(|| EvalError::syntax("'super' may only be used inside a method", expr.span))?;
                    let this_val = env
                        .get("this")
                        .ok_or_else(|| EvalError::syntax("'super' may only be used inside a method", expr.span))?;
                    let name = match property {
                        MemberProp::Identifier(n) => n.clone(),
                        MemberProp::Computed(e) => eval_expr(e, env, ctx).await?.to_display_string(),
                    };
                    let method = classes::lookup_super_method_raw(&home, &name, expr.span)?;
                    let arg_values = eval_arguments(args, env, ctx).await?;
                    let super_ctx = ctx.with_home_class(home.superclass.clone());
                    return calls::call_function(method, Some(this_val), arg_values, super_ctx).await;
                }

                let object_val = eval_expr(object, env, ctx).await?;
                if *member_optional && object_val.is_nullish() {
                    return Ok(Value::Undefined);
                }
                let name = match property {
                    MemberProp::Identifier(n) => n.clone(),
                    MemberProp::Computed(e) => eval_expr(e, env, ctx).await?.to_display_string(),
                };
                let arg_values = eval_arguments(args, env, ctx).await?;
                return classes::call_property_method(&object_val, &name, arg_values, expr.span).await;
            }

            if matches!(callee.kind, ExprKind::Super) {
                let home = ctx
                    .home_class
                    .clone()
                    .ok_or_else(|| EvalError::syntax("'super' may only be used inside a constructor", expr.span))?;
                let this_val = env
                    .get("this")
                    .ok_or_else(|| EvalError::syntax("'super' may only be used inside a constructor", expr.span))?;
                let arg_values = eval_arguments(args, env, ctx).await?;
                return classes::call_super_constructor(&home, this_val, arg_values, expr.span).await;
            }

            let callee_val = eval_expr(callee, env, ctx).await?;
            if *optional && callee_val.is_nullish() {
                return Ok(Value::Undefined);
            }
            let arg_values = eval_arguments(args, env, ctx).await?;
            calls::call_value(callee_val, None, arg_values, expr.span).await
        }

        ExprKind::New { callee, args } => {
            let callee_val = eval_expr(callee, env, ctx).await?;
            let class = match callee_val {
                Value::Class(c) => c,
                _ => return Err(EvalError::type_error("'new' requires a class", expr.span)),
            };
            let arg_values = eval_arguments(args, env, ctx).await?;
            classes::construct_instance(class, arg_values, expr.span).await
        }

        ExprKind::Conditional { test, consequent, alternate } => {
            let t = eval_expr(test, env, ctx).await?;
            if t.is_truthy() {
                eval_expr(consequent, env, ctx).await
            } else {
                eval_expr(alternate, env, ctx).await
            }
        }

        ExprKind::Sequence(items) => {
            let mut last = Value::Undefined;
            for item in items {
                last = eval_expr(item, env, ctx).await?;
            }
            Ok(last)
        }

        ExprKind::Await(inner) => {
            let v = eval_expr(inner, env, ctx).await?;
            match &v {
                Value::HostOpaque(h) => match h.await_promise() {
                    Some(fut) => fut.await,
                    None => Ok(v),
                },
                _ => Ok(v),
            }
        }

        ExprKind::Spread(_) => Err(EvalError::syntax("unexpected spread outside of a call, array, or object literal", expr.span)),
    }
}

fn push_spread(items: &mut Vec<Value>, value: Value, span: Span) -> Result<(), EvalError> {
    match value {
        Value::Array(arr) => {
            items.extend(arr.borrow().iter().cloned());
            Ok(())
        }
        Value::String(s) => {
            items.extend(s.chars().map(|c| Value::string(c.to_string())));
            Ok(())
        }
        _ => Err(EvalError::type_error("spread requires an array or string", span)),
    }
}

async fn eval_prop_key(key: &PropKey, env: &Environment, ctx: &Ctx) -> Result<String, EvalError> {
    Ok(match key {
        PropKey::Identifier(s) => s.clone(),
        PropKey::StringLit(s) => s.clone(),
        PropKey::NumberLit(n) => n.to_string(),
        PropKey::Computed(e) => eval_expr(e, env, ctx).await?.to_display_string(),
    })
}

pub async fn eval_arguments(args: &[Argument], env: &Environment, ctx: &Ctx) -> Result<Vec<Value>, EvalError> {
    let mut out = Vec::new();
    for arg in args {
        match arg {
            Argument::Normal(e) => out.push(eval_expr(e, env, ctx).await?),
            Argument::Spread(e) => {
                let v = eval_expr(e, env, ctx).await?;
                push_spread(&mut out, v, e.span)?;
            }
        }
    }
    Ok(out)
}

pub fn get_property(object_val: &Value, name: &str, span: Span) -> Result<Value, EvalError> {
    match object_val {
        Value::Array(items) => {
            if name == "length" {
                return Ok(Value::Number(items.borrow().len() as f64));
            }
            if let Ok(index) = name.parse::<usize>() {
                return Ok(items.borrow().get(index).cloned().unwrap_or(Value::Undefined));
            }
            Ok(Value::Undefined)
        }
        Value::String(s) => {
            if name == "length" {
                return Ok(Value::Number(s.chars().count() as f64));
            }
            if let Ok(index) = name.parse::<usize>() {
                return Ok(s.chars().nth(index).map(|c| Value::string(c.to_string())).unwrap_or(Value::Undefined));
            }
            Ok(Value::Undefined)
        }
        Value::Object(fields) => Ok(fields.borrow().get(name).cloned().unwrap_or(Value::Undefined)),
        Value::Error(fields) => Ok(fields.borrow().get(name).cloned().unwrap_or(Value::Undefined)),
        Value::Instance(_) | Value::Class(_) => classes::get_property(object_val, name, span),
        Value::Undefined | Value::Null => Err(EvalError::type_error(
            format!("cannot read property '{}' of {}", name, object_val.type_name()),
            span,
        )),
        _ => Ok(Value::Undefined),
    }
}

pub fn set_property(object_val: &Value, name: &str, value: Value, span: Span) -> Result<(), EvalError> {
    match object_val {
        Value::Array(items) => {
            if name == "length" {
                let new_len = value.to_number().max(0.0) as usize;
                let mut items = items.borrow_mut();
                items.resize(new_len, Value::Undefined);
                return Ok(());
            }
            if let Ok(index) = name.parse::<usize>() {
                let mut items = items.borrow_mut();
                if index >= items.len() {
                    items.resize(index + 1, Value::Undefined);
                }
                items[index] = value;
                return Ok(());
            }
            Ok(())
        }
        Value::Object(fields) => {
            fields.borrow_mut().insert(name.to_string(), value);
            Ok(())
        }
        Value::Error(fields) => {
            fields.borrow_mut().insert(name.to_string(), value);
            Ok(())
        }
        Value::Instance(_) => classes::set_property(object_val, name, value, span),
        Value::Undefined | Value::Null => Err(EvalError::type_error(
            format!("cannot set property '{}' of {}", name, object_val.type_name()),
            span,
        )),
        _ => Err(EvalError::type_error(format!("cannot set property '{}' on a {}", name, object_val.type_name()), span)),
    }
}

#[async_recursion::async_recursion(?Send)]
pub async fn assign_to_target(target: &Expr, value: Value, env: &Environment, ctx: &Ctx) -> Result<(), EvalError> {
    match &target.kind {
        ExprKind::Identifier(name) => {
            if env.assign(name, value) {
                Ok(())
            } else {
                Err(EvalError::reference(format!("'{}' is not defined", name), target.span))
            }
        }
        ExprKind::Member { object, property, .. } => {
            let object_val = eval_expr(object, env, ctx).await?;
            let name = match property {
                MemberProp::Identifier(n) => n.clone(),
                MemberProp::Computed(e) => eval_expr(e, env, ctx).await?.to_display_string(),
            };
            if matches!(object_val, Value::Instance(_)) {
                classes::write_property_with_accessors(&object_val, &name, value, target.span).await
            } else {
                set_property(&object_val, &name, value, target.span)
            }
        }
        ExprKind::Array(elements) => {
            let items = match value {
                Value::Array(items) => items.borrow().clone(),
                _ => return Err(EvalError::type_error("cannot destructure a non-array value", target.span)),
            };
            for (i, el) in elements.iter().enumerate() {
                match el {
                    Some(ArrayElement::Item(e)) => {
                        let item = items.get(i).cloned().unwrap_or(Value::Undefined);
                        assign_to_target(e, item, env, ctx).await?;
                    }
                    Some(ArrayElement::Spread(e)) => {
                        let remainder: Vec<Value> = items.iter().skip(i).cloned().collect();
                        assign_to_target(e, Value::array(remainder), env, ctx).await?;
                    }
                    None => {}
                }
            }
            Ok(())
        }
        ExprKind::Object(props) => {
            let fields = match &value {
                Value::Object(fields) => fields.borrow().clone(),
                Value::Instance(inst) => inst.fields.borrow().clone(),
                _ => return Err(EvalError::type_error("cannot destructure a non-object value", target.span)),
            };
            for prop in props {
                if let ObjectProp::Shorthand(name) = prop {
                    let v = fields.get(name).cloned().unwrap_or(Value::Undefined);
                    if !env.assign(name, v) {
                        return Err(EvalError::reference(format!("'{}' is not defined", name), target.span));
                    }
                } else if let ObjectProp::KeyValue { key, value: target_expr } = prop {
                    let k = match key {
                        PropKey::Identifier(s) | PropKey::StringLit(s) => s.clone(),
                        PropKey::NumberLit(n) => n.to_string(),
                        PropKey::Computed(e) => eval_expr(e, env, ctx).await?.to_display_string(),
                    };
                    let v = fields.get(&k).cloned().unwrap_or(Value::Undefined);
                    assign_to_target(target_expr, v, env, ctx).await?;
                }
            }
            Ok(())
        }
        _ => Err(EvalError::syntax("invalid assignment target", target.span)),
    }
}

pub async fn bind_pattern_here(
    pattern_node: &Pattern,
    value: Value,
    env: &Environment,
    mode: pattern::BindMode,
    ctx: &Ctx,
    span: Span,
) -> Result<(), EvalError> {
    let env2 = env.clone();
    let ctx2 = ctx.clone();
    let eval_default = move |expr: &Expr| {
        let expr = expr.clone();
        let env = env2.clone();
        let ctx = ctx2.clone();
        Box::pin(async move { eval_expr(&expr, &env, &ctx).await }) as futures::future::LocalBoxFuture<'static, Result<Value, EvalError>>
    };
    pattern::bind_pattern(pattern_node, value, env, mode, &eval_default, span).await
}

pub fn eval_binary(op: BinaryOp, l: Value, r: Value, span: Span) -> Result<Value, EvalError> {
    use BinaryOp::*;
    Ok(match op {
        Add => match (&l, &r) {
            (Value::String(_), _) | (_, Value::String(_)) => Value::string(format!("{}{}", l.to_display_string(), r.to_display_string())),
            _ => Value::Number(l.to_number() + r.to_number()),
        },
        Sub => Value::Number(l.to_number() - r.to_number()),
        Mul => Value::Number(l.to_number() * r.to_number()),
        Div => Value::Number(l.to_number() / r.to_number()),
        Mod => Value::Number(l.to_number() % r.to_number()),
        Pow => Value::Number(l.to_number().powf(r.to_number())),
        Eq => Value::Bool(Value::loose_eq(&l, &r)),
        NotEq => Value::Bool(!Value::loose_eq(&l, &r)),
        StrictEq => Value::Bool(Value::strict_eq(&l, &r)),
        StrictNotEq => Value::Bool(!Value::strict_eq(&l, &r)),
        Lt | Gt | Le | Ge => {
            let ordering = match (&l, &r) {
                (Value::String(a), Value::String(b)) => a.as_ref().partial_cmp(b.as_ref()),
                _ => l.to_number().partial_cmp(&r.to_number()),
            };
            let result = match ordering {
                Some(std::cmp::Ordering::Less) => matches!(op, Lt | Le),
                Some(std::cmp::Ordering::Greater) => matches!(op, Gt | Ge),
                Some(std::cmp::Ordering::Equal) => matches!(op, Le | Ge),
                None => false,
            };
            Value::Bool(result)
        }
        BitAnd => Value::Number(((l.to_number() as i64 as i32) & (r.to_number() as i64 as i32)) as f64),
        BitOr => Value::Number(((l.to_number() as i64 as i32) | (r.to_number() as i64 as i32)) as f64),
        BitXor => Value::Number(((l.to_number() as i64 as i32) ^ (r.to_number() as i64 as i32)) as f64),
        Shl => Value::Number(((l.to_number() as i64 as i32) << ((r.to_number() as i64 as i32) & 31)) as f64),
        Shr => Value::Number(((l.to_number() as i64 as i32) >> ((r.to_number() as i64 as i32) & 31)) as f64),
    })
}
