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

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::ast::{FunctionNode, Param};
use crate::environment::Environment;
use crate::memory;

/// A closure: a parsed function body paired with the environment it was
/// defined in. Looking up a free variable inside the body walks this
/// captured chain, not the caller's environment.
pub struct FunctionObject {
    pub name: Option<String>,
    pub params: Vec<Param>,
    pub body: Rc<Vec<crate::ast::Stmt>>,
    pub captured_env: Environment,
    pub is_async: bool,
    pub is_arrow: bool,
    /// Arrow functions close over the `this` of their defining scope instead
    /// of rebinding one per call.
    pub bound_this: Option<crate::value::Value>,
    /// Whether this function still owes its captured environment a logical
    /// release. Set false when the environment that stores this function
    /// back into itself waives the reference at definition time, which is
    /// what actually breaks the direct self-capture cycle (see
    /// `Environment::release`'s doc comment) rather than merely documenting
    /// an intent the refcount arithmetic never carried out.
    pub(crate) owns_capture_ref: Cell<bool>,
}

impl FunctionObject {
    pub fn new(node: &FunctionNode, captured_env: Environment, bound_this: Option<crate::value::Value>) -> Rc<Self> {
        captured_env.add_ref();
        memory::function_created();
        Rc::new(Self {
            name: node.name.clone(),
            params: node.params.clone(),
            body: Rc::new(node.body.clone()),
            captured_env,
            is_async: node.is_async,
            is_arrow: node.is_arrow,
            bound_this,
            owns_capture_ref: Cell::new(true),
        })
    }
}

impl Drop for FunctionObject {
    fn drop(&mut self) {
        if self.owns_capture_ref.get() {
            self.captured_env.release();
        }
        memory::function_destroyed();
    }
}

impl fmt::Debug for FunctionObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Function {}]", self.name.as_deref().unwrap_or("anonymous"))
    }
}
