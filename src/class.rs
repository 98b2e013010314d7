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

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::Expr;
use crate::environment::Environment;
use crate::function::FunctionObject;

/// A single-inheritance class. `superclass` is an explicit handle to the
/// parent `ClassObject`, not a runtime prototype slot — `super.m()` looks
/// the method up directly on this handle rather than walking a mutable
/// prototype chain, so reassigning a superclass's method after a subclass
/// is built never changes what `super` already resolved to.
pub struct ClassObject {
    pub name: String,
    pub superclass: Option<Rc<ClassObject>>,
    pub constructor: Option<Rc<FunctionObject>>,
    pub methods: IndexMap<String, Rc<FunctionObject>>,
    pub getters: IndexMap<String, Rc<FunctionObject>>,
    pub setters: IndexMap<String, Rc<FunctionObject>>,
    pub static_methods: IndexMap<String, Rc<FunctionObject>>,
    pub static_getters: IndexMap<String, Rc<FunctionObject>>,
    pub static_setters: IndexMap<String, Rc<FunctionObject>>,
    pub static_fields: RefCell<IndexMap<String, crate::value::Value>>,
    /// Instance field initializers, evaluated fresh in the constructor's
    /// activation scope for every `new` so mutable defaults (an array
    /// literal, say) are never shared between instances.
    pub field_inits: Vec<(String, Option<Expr>)>,
    /// The scope the `class` expression was evaluated in, so field
    /// initializers and method bodies can close over outer bindings the
    /// same way a plain function would. Held with the same logical-refcount
    /// discipline as [`FunctionObject::captured_env`].
    pub defining_env: Environment,
    /// Mirrors `FunctionObject::owns_capture_ref`: waived when a class is
    /// stored back into the very environment it was defined in.
    pub(crate) owns_capture_ref: Cell<bool>,
}

impl ClassObject {
    pub fn new(
        name: String,
        superclass: Option<Rc<ClassObject>>,
        constructor: Option<Rc<FunctionObject>>,
        methods: IndexMap<String, Rc<FunctionObject>>,
        getters: IndexMap<String, Rc<FunctionObject>>,
        setters: IndexMap<String, Rc<FunctionObject>>,
        static_methods: IndexMap<String, Rc<FunctionObject>>,
        static_getters: IndexMap<String, Rc<FunctionObject>>,
        static_setters: IndexMap<String, Rc<FunctionObject>>,
        static_fields: IndexMap<String, crate::value::Value>,
        field_inits: Vec<(String, Option<Expr>)>,
        defining_env: Environment,
    ) -> Rc<Self> {
        defining_env.add_ref();
        Rc::new(Self {
            name,
            superclass,
            constructor,
            methods,
            getters,
            setters,
            static_methods,
            static_getters,
            static_setters,
            static_fields: RefCell::new(static_fields),
            field_inits,
            defining_env,
            owns_capture_ref: Cell::new(true),
        })
    }

    /// Resolves an instance method by walking from `self` up the explicit
    /// superclass chain, as `this.m()` does. Used for the initial lookup.
    pub fn lookup_method(&self, name: &str) -> Option<Rc<FunctionObject>> {
        if let Some(m) = self.methods.get(name) {
            return Some(m.clone());
        }
        self.superclass.as_ref().and_then(|s| s.lookup_method(name))
    }

    pub fn lookup_getter(&self, name: &str) -> Option<Rc<FunctionObject>> {
        if let Some(m) = self.getters.get(name) {
            return Some(m.clone());
        }
        self.superclass.as_ref().and_then(|s| s.lookup_getter(name))
    }

    pub fn lookup_setter(&self, name: &str) -> Option<Rc<FunctionObject>> {
        if let Some(m) = self.setters.get(name) {
            return Some(m.clone());
        }
        self.superclass.as_ref().and_then(|s| s.lookup_setter(name))
    }

    pub fn lookup_static(&self, name: &str) -> Option<Rc<FunctionObject>> {
        if let Some(m) = self.static_methods.get(name) {
            return Some(m.clone());
        }
        self.superclass.as_ref().and_then(|s| s.lookup_static(name))
    }

    /// `super.m()` bypasses `self` entirely and resolves directly on the
    /// superclass handle captured at method-definition time.
    pub fn lookup_super_method(&self, name: &str) -> Option<Rc<FunctionObject>> {
        self.superclass.as_ref().and_then(|s| s.lookup_method(name))
    }

    pub fn is_or_extends(&self, other: &Rc<ClassObject>) -> bool {
        if std::ptr::eq(self, other.as_ref()) {
            return true;
        }
        match &self.superclass {
            Some(s) => s.is_or_extends(other),
            None => false,
        }
    }
}

impl Drop for ClassObject {
    fn drop(&mut self) {
        if self.owns_capture_ref.get() {
            self.defining_env.release();
        }
    }
}

impl fmt::Debug for ClassObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Class {}]", self.name)
    }
}

/// A live instance. Distinct from plain objects so that method/getter
/// dispatch can consult the originating class instead of a per-value
/// prototype pointer.
pub struct Instance {
    pub class: Rc<ClassObject>,
    pub fields: RefCell<IndexMap<String, crate::value::Value>>,
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Instance {}]", self.class.name)
    }
}
