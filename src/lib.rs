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

//! A sandboxed tree-walking evaluator for a practical subset of a
//! C-family/JS-like scripting language: first-class functions and closures,
//! single-inheritance classes, destructuring, spread/rest, template strings,
//! structured control flow, and cooperative asynchronous evaluation through
//! a caller-supplied promise abstraction.
//!
//! The crate never performs ambient I/O and never seeds the global
//! environment with anything on its own — see [`prelude`] for an opt-in
//! convenience helper. A host embeds this evaluator by building an
//! [`Environment`], defining whatever globals the sandboxed program should
//! see, and calling [`interpreter::evaluate`].

pub mod ast;
pub mod class;
pub mod diagnostics;
pub mod environment;
pub mod error;
pub mod function;
pub mod history;
pub mod interpreter;
pub mod lexer;
pub mod memory;
pub mod parser;
pub mod pattern;
pub mod prelude;
pub mod promise;
pub mod span;
pub mod token;
pub mod value;

pub use environment::Environment;
pub use error::{ErrorKind, EvalError};
pub use interpreter::evaluate;
pub use promise::{FunctionPromise, HostValue};
pub use span::Span;
pub use value::Value;
