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

use crate::ast::{FunctionNode, ObjectPatternProp, Param, Pattern};
use crate::error::EvalError;
use crate::parser::Parser;
use crate::token::{Tok, Token};

impl Parser {
    /// Parses a single binding pattern: an identifier, or a nested
    /// object/array destructuring pattern. Default values on nested object
    /// properties are parsed here; a bare array/identifier default is
    /// handled by the caller (declaration initializer or parameter default).
    pub(crate) fn parse_pattern(&mut self) -> Result<Pattern, EvalError> {
        if self.check_punct("{") {
            return self.parse_object_pattern();
        }
        if self.check_punct("[") {
            return self.parse_array_pattern();
        }
        let name = self.expect_identifier()?;
        Ok(Pattern::Identifier(name))
    }

    fn parse_object_pattern(&mut self) -> Result<Pattern, EvalError> {
        self.expect_punct("{")?;
        let mut props = Vec::new();
        let mut rest = None;
        while !self.check_punct("}") {
            if self.match_punct("...") {
                rest = Some(self.expect_identifier()?);
                break;
            }
            let key = self.expect_identifier()?;
            let value = if self.match_punct(":") {
                self.parse_pattern()?
            } else {
                Pattern::Identifier(key.clone())
            };
            let default = if self.match_punct("=") {
                Some(self.parse_assignment_expr()?)
            } else {
                None
            };
            props.push(ObjectPatternProp { key, value, default });
            if !self.match_punct(",") {
                break;
            }
        }
        self.expect_punct("}")?;
        Ok(Pattern::Object { props, rest })
    }

    fn parse_array_pattern(&mut self) -> Result<Pattern, EvalError> {
        self.expect_punct("[")?;
        let mut elements = Vec::new();
        let mut rest = None;
        while !self.check_punct("]") {
            if self.match_punct(",") {
                elements.push(None);
                continue;
            }
            if self.match_punct("...") {
                rest = Some(Box::new(self.parse_pattern()?));
                break;
            }
            elements.push(Some(self.parse_pattern()?));
            if !self.match_punct(",") {
                break;
            }
        }
        self.expect_punct("]")?;
        Ok(Pattern::Array { elements, rest })
    }

    pub(crate) fn parse_param_list(&mut self) -> Result<Vec<Param>, EvalError> {
        self.expect_punct("(")?;
        let mut params = Vec::new();
        while !self.check_punct(")") {
            let is_rest = self.match_punct("...");
            let pattern = self.parse_pattern()?;
            // Default parameter values are parsed for grammar completeness
            // but are not currently surfaced on `Param`; unset parameters
            // bind to `undefined`, matching the plain-value call contract.
            if self.match_punct("=") {
                self.parse_assignment_expr()?;
            }
            params.push(Param { pattern, is_rest });
            if !self.match_punct(",") {
                break;
            }
        }
        self.expect_punct(")")?;
        Ok(params)
    }

    pub(crate) fn parse_block_body(&mut self) -> Result<Vec<crate::ast::Stmt>, EvalError> {
        self.expect_punct("{")?;
        let mut stmts = Vec::new();
        while !self.check_punct("}") {
            stmts.push(self.parse_statement()?);
        }
        self.expect_punct("}")?;
        Ok(stmts)
    }

    pub(crate) fn parse_function_tail(&mut self, name: Option<String>, is_async: bool) -> Result<FunctionNode, EvalError> {
        let span = self.span();
        let params = self.parse_param_list()?;
        let body = self.parse_block_body()?;
        Ok(FunctionNode { name, params, body, is_async, is_arrow: false, span })
    }

    /// Re-lexes and parses a standalone expression from raw source text,
    /// used to parse the inside of a template literal's `${...}` slot.
    pub(crate) fn parse_expr_from_source(source: &str) -> Result<crate::ast::Expr, EvalError> {
        let mut tokens = crate::lexer::tokenize(source)?;
        if !matches!(tokens.last().map(|t| &t.kind), Some(Tok::Eof)) {
            tokens.push(Token::new(Tok::Eof, crate::span::Span::none()));
        }
        let mut parser = Parser::new(tokens);
        let expr = parser.parse_expression()?;
        Ok(expr)
    }
}
