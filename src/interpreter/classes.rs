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

use indexmap::IndexMap;

use crate::ast::{ClassNode, MethodKind, PropKey};
use crate::class::{ClassObject, Instance};
use crate::environment::Environment;
use crate::error::EvalError;
use crate::function::FunctionObject;
use crate::interpreter::calls::call_function;
use crate::interpreter::expressions::eval_expr;
use crate::interpreter::Ctx;
use crate::span::Span;
use crate::value::Value;

pub async fn build_class_value(node: &ClassNode, env: &Environment, ctx: &Ctx) -> Result<Value, EvalError> {
    let superclass = match &node.superclass {
        Some(expr) => {
            let v = eval_expr(expr, env, ctx).await?;
            match v {
                Value::Class(c) => Some(c),
                _ => return Err(EvalError::type_error("a class may only extend another class", expr.span)),
            }
        }
        None => None,
    };

    let mut constructor = None;
    let mut methods = IndexMap::new();
    let mut getters = IndexMap::new();
    let mut setters = IndexMap::new();
    let mut static_methods = IndexMap::new();
    let mut static_getters = IndexMap::new();
    let mut static_setters = IndexMap::new();

    for member in &node.members {
        let name = member_name(&member.name, env, ctx).await?;
        let func = FunctionObject::new(&member.func, env.clone(), None);
        match (member.kind.clone(), member.is_static) {
            (MethodKind::Constructor, _) => constructor = Some(func),
            (MethodKind::Method, false) => {
                methods.insert(name, func);
            }
            (MethodKind::Method, true) => {
                static_methods.insert(name, func);
            }
            (MethodKind::Getter, false) => {
                getters.insert(name, func);
            }
            (MethodKind::Getter, true) => {
                static_getters.insert(name, func);
            }
            (MethodKind::Setter, false) => {
                setters.insert(name, func);
            }
            (MethodKind::Setter, true) => {
                static_setters.insert(name, func);
            }
        }
    }

    let mut field_inits = Vec::new();
    let mut static_fields = IndexMap::new();
    for field in &node.fields {
        if field.is_static {
            let value = match &field.value {
                Some(e) => eval_expr(e, env, ctx).await?,
                None => Value::Undefined,
            };
            static_fields.insert(field.name.clone(), value);
        } else {
            field_inits.push((field.name.clone(), field.value.clone()));
        }
    }

    let name = node.name.clone().unwrap_or_else(|| "anonymous".to_string());
    let class = ClassObject::new(
        name,
        superclass,
        constructor,
        methods,
        getters,
        setters,
        static_methods,
        static_getters,
        static_setters,
        static_fields,
        field_inits,
        env.clone(),
    );
    Ok(Value::Class(class))
}

async fn member_name(key: &PropKey, env: &Environment, ctx: &Ctx) -> Result<String, EvalError> {
    Ok(match key {
        PropKey::Identifier(s) | PropKey::StringLit(s) => s.clone(),
        PropKey::NumberLit(n) => n.to_string(),
        PropKey::Computed(e) => eval_expr(e, env, ctx).await?.to_display_string(),
    })
}

/// Constructs a new instance: runs the constructor chain (own constructor,
/// or an implicit one that forwards to the superclass and then runs this
/// class's own field initializers) and returns the finished `this`.
pub async fn construct_instance(class: Rc<ClassObject>, args: Vec<Value>, span: Span) -> Result<Value, EvalError> {
    let instance = Rc::new(Instance { class: class.clone(), fields: std::cell::RefCell::new(IndexMap::new()) });
    let this_val = Value::Instance(instance);
    run_constructor_chain(&class, this_val.clone(), args, span).await?;
    Ok(this_val)
}

#[async_recursion::async_recursion(?Send)]
async fn run_constructor_chain(class: &Rc<ClassObject>, this_val: Value, args: Vec<Value>, span: Span) -> Result<(), EvalError> {
    match &class.constructor {
        Some(ctor) => {
            // A base class's constructor has no `super()` to run its field
            // inits after, so they run right away, before the constructor
            // body sees `this`. A derived class's constructor runs them once
            // its own `super()` call completes (`call_super_constructor`),
            // matching the order its body actually executes in.
            if class.superclass.is_none() {
                run_own_field_inits(class, &this_val, span).await?;
            }
            let ctx = Ctx::default().with_home_class(Some(class.clone()));
            call_function(ctor.clone(), Some(this_val), args, ctx).await?;
        }
        None => {
            if let Some(super_class) = &class.superclass {
                run_constructor_chain(super_class, this_val.clone(), args, span).await?;
            }
            run_own_field_inits(class, &this_val, span).await?;
        }
    }
    Ok(())
}

async fn run_own_field_inits(class: &Rc<ClassObject>, this_val: &Value, span: Span) -> Result<(), EvalError> {
    for (name, init) in &class.field_inits {
        let value = match init {
            Some(expr) => {
                let field_env = Environment::new(Some(class.defining_env.clone()));
                field_env.define("this", this_val.clone());
                let ctx = Ctx::default().with_home_class(Some(class.clone()));
                let result = eval_expr(expr, &field_env, &ctx).await;
                field_env.release();
                result?
            }
            None => Value::Undefined,
        };
        crate::interpreter::expressions::set_property(this_val, name, value, span)?;
    }
    Ok(())
}

/// `super(...)` inside a constructor: runs the superclass's own constructor
/// chain (which in turn runs its own field initializers) bound to the
/// already-allocated `this`, then runs this class's own field initializers —
/// field initializers always run after the super-constructor they depend on.
pub async fn call_super_constructor(home: &Rc<ClassObject>, this_val: Value, args: Vec<Value>, span: Span) -> Result<Value, EvalError> {
    let super_class = home.superclass.clone().ok_or_else(|| EvalError::syntax("'super' call with no superclass", span))?;
    run_constructor_chain(&super_class, this_val.clone(), args, span).await?;
    run_own_field_inits(home, &this_val, span).await?;
    Ok(Value::Undefined)
}

pub fn lookup_super_method_raw(home: &Rc<ClassObject>, name: &str, span: Span) -> Result<Rc<FunctionObject>, EvalError> {
    home.lookup_super_method(name)
        .ok_or_else(|| EvalError::type_error(format!("super has no method '{}'", name), span))
}

pub fn get_super_bound_method(home: &Rc<ClassObject>, name: &str, _this_val: Value, span: Span) -> Result<Value, EvalError> {
    let func = lookup_super_method_raw(home, name, span)?;
    Ok(Value::Function(func))
}

/// Reads `name` off an instance or class: instance field, inherited method
/// (bound lazily when called, not here), or a static class member. Getters
/// are not consulted here — callers that need getter dispatch on a plain
/// (non-call) read go through [`read_property_with_accessors`] instead.
pub fn get_property(object_val: &Value, name: &str, span: Span) -> Result<Value, EvalError> {
    match object_val {
        Value::Instance(inst) => {
            if let Some(v) = inst.fields.borrow().get(name) {
                return Ok(v.clone());
            }
            if let Some(method) = inst.class.lookup_method(name) {
                return Ok(Value::Function(method));
            }
            Ok(Value::Undefined)
        }
        Value::Class(class) => {
            if let Some(v) = class.static_fields.borrow().get(name) {
                return Ok(v.clone());
            }
            if let Some(method) = class.lookup_static(name) {
                return Ok(Value::Function(method));
            }
            Ok(Value::Undefined)
        }
        _ => Err(EvalError::type_error(format!("cannot read property '{}' of {}", name, object_val.type_name()), span)),
    }
}

pub fn set_property(object_val: &Value, name: &str, value: Value, span: Span) -> Result<(), EvalError> {
    match object_val {
        Value::Instance(inst) => {
            inst.fields.borrow_mut().insert(name.to_string(), value);
            Ok(())
        }
        Value::Class(class) => {
            class.static_fields.borrow_mut().insert(name.to_string(), value);
            Ok(())
        }
        _ => Err(EvalError::type_error(format!("cannot set property '{}' on a {}", name, object_val.type_name()), span)),
    }
}

/// Calls `object.name(args)`, dispatching a getter-backed property is not
/// applicable here (getters only fire on plain reads) but an instance
/// method, a field holding a callable, or a static class method all resolve
/// through this single path so `obj.method(...)` binds `this` correctly
/// regardless of which of the three it turns out to be.
pub async fn call_property_method(object_val: &Value, name: &str, args: Vec<Value>, span: Span) -> Result<Value, EvalError> {
    match object_val {
        Value::Instance(inst) => {
            if let Some(field_val) = inst.fields.borrow().get(name).cloned() {
                return crate::interpreter::calls::call_value(field_val, Some(object_val.clone()), args, span).await;
            }
            if let Some(method) = inst.class.lookup_method(name) {
                let ctx = Ctx::default().with_home_class(Some(inst.class.clone()));
                return call_function(method, Some(object_val.clone()), args, ctx).await;
            }
            Err(EvalError::type_error(format!("'{}' is not a function", name), span))
        }
        Value::Class(class) => {
            if let Some(method) = class.lookup_static(name) {
                let ctx = Ctx::default().with_home_class(Some(class.clone()));
                return call_function(method, Some(object_val.clone()), args, ctx).await;
            }
            Err(EvalError::type_error(format!("'{}' is not a function", name), span))
        }
        other => {
            let value = crate::interpreter::expressions::get_property(other, name, span)?;
            crate::interpreter::calls::call_value(value, Some(object_val.clone()), args, span).await
        }
    }
}

/// Invokes a getter/setter pair for a plain (non-call) property read when one
/// is defined on the instance's class, falling back to a stored field.
pub async fn read_property_with_accessors(object_val: &Value, name: &str, span: Span) -> Result<Value, EvalError> {
    if let Value::Instance(inst) = object_val {
        if let Some(getter) = inst.class.lookup_getter(name) {
            let ctx = Ctx::default().with_home_class(Some(inst.class.clone()));
            return call_function(getter, Some(object_val.clone()), Vec::new(), ctx).await;
        }
    }
    get_property(object_val, name, span)
}

/// Invokes a setter when one is defined on the instance's class, falling
/// back to a plain field write.
pub async fn write_property_with_accessors(object_val: &Value, name: &str, value: Value, span: Span) -> Result<(), EvalError> {
    if let Value::Instance(inst) = object_val {
        if let Some(setter) = inst.class.lookup_setter(name) {
            let ctx = Ctx::default().with_home_class(Some(inst.class.clone()));
            call_function(setter, Some(object_val.clone()), vec![value], ctx).await?;
            return Ok(());
        }
    }
    set_property(object_val, name, value, span)
}
