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

use thiserror::Error;

use crate::span::Span;
use crate::value::Value;

/// Stable taxonomy of evaluator faults. `UserThrown` carries an arbitrary
/// script-level value (the operand of a `throw` statement); every other
/// variant is raised by the runtime itself.
#[derive(Debug, Clone, Error)]
pub enum ErrorKind {
    #[error("ReferenceError: {0}")]
    Reference(String),

    #[error("TypeError: {0}")]
    Type(String),

    #[error("SyntaxError: {0}")]
    Syntax(String),

    #[error("{0} is not supported")]
    Unsupported(String),

    #[error("uncaught exception")]
    UserThrown(Value),
}

/// A fault raised anywhere during parsing or evaluation.
///
/// `EvalError` is the single channel both internal runtime faults and
/// explicit script-level `throw`s flow through, so `try`/`catch` can treat
/// them uniformly instead of juggling two separate signal types.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct EvalError {
    pub kind: ErrorKind,
    pub span: Span,
    pub help: Option<String>,
}

impl EvalError {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        Self { kind, span, help: None }
    }

    pub fn reference(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Reference(message.into()), span)
    }

    pub fn type_error(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Type(message.into()), span)
    }

    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Syntax(message.into()), span)
    }

    pub fn unsupported(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Unsupported(message.into()), span)
    }

    pub fn thrown(value: Value, span: Span) -> Self {
        Self::new(ErrorKind::UserThrown(value), span)
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// The stable diagnostic code shown in `error[CODE]: ...` output.
    pub fn code(&self) -> &'static str {
        match &self.kind {
            ErrorKind::Reference(_) => "E_REFERENCE",
            ErrorKind::Type(_) => "E_TYPE",
            ErrorKind::Syntax(_) => "E_SYNTAX",
            ErrorKind::Unsupported(_) => "E_UNSUPPORTED",
            ErrorKind::UserThrown(_) => "E_THROWN",
        }
    }

    /// The value a `catch` clause binds for this fault. Internal faults are
    /// normalized into a plain `Error` value; user throws surface the thrown
    /// value unchanged.
    pub fn into_catch_value(self) -> Value {
        match self.kind {
            ErrorKind::UserThrown(v) => v,
            other => Value::make_error(other.to_string()),
        }
    }
}
