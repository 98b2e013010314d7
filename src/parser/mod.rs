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

pub mod expressions;
pub mod helpers;
pub mod parser;
pub mod statements;

pub use parser::Parser;

use crate::ast::Program;
use crate::error::EvalError;

pub fn parse_program(source: &str) -> Result<Program, EvalError> {
    let tokens = crate::lexer::tokenize(source)?;
    let mut parser = Parser::new(tokens);
    let body = parser.parse_all_statements()?;
    Ok(Program { body })
}
