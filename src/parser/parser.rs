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

use crate::ast::Stmt;
use crate::error::EvalError;
use crate::span::Span;
use crate::token::{Tok, Token};

/// A straightforward recursive-descent / Pratt parser over the flat token
/// stream produced by the lexer. `statements.rs` and `expressions.rs` add
/// the grammar productions as `impl Parser` blocks; this module only owns
/// token navigation.
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse_all_statements(&mut self) -> Result<Vec<Stmt>, EvalError> {
        let mut stmts = Vec::new();
        while !self.is_eof() {
            stmts.push(self.parse_statement()?);
        }
        Ok(stmts)
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_at(&self, offset: usize) -> &Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    pub(crate) fn span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn is_eof(&self) -> bool {
        matches!(self.peek().kind, Tok::Eof)
    }

    pub(crate) fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if !self.is_eof() {
            self.pos += 1;
        }
        tok
    }

    pub(crate) fn check_punct(&self, p: &str) -> bool {
        matches!(&self.peek().kind, Tok::Punct(s) if *s == p)
    }

    pub(crate) fn check_keyword(&self, k: &str) -> bool {
        matches!(&self.peek().kind, Tok::Keyword(s) if *s == k)
    }

    pub(crate) fn match_punct(&mut self, p: &str) -> bool {
        if self.check_punct(p) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn match_keyword(&mut self, k: &str) -> bool {
        if self.check_keyword(k) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_punct(&mut self, p: &str) -> Result<(), EvalError> {
        if self.match_punct(p) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", p)))
        }
    }

    pub(crate) fn expect_keyword(&mut self, k: &str) -> Result<(), EvalError> {
        if self.match_keyword(k) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", k)))
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, EvalError> {
        match &self.peek().kind {
            Tok::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    /// Consumes an optional statement-terminating `;`. Warden does not
    /// implement automatic semicolon insertion; a missing `;` is only
    /// tolerated directly before `}` or end of input, matching the common
    /// "semicolons optional at block/file boundaries" convenience found in
    /// scripting-language parsers without building a full ASI state machine.
    pub(crate) fn consume_statement_end(&mut self) {
        self.match_punct(";");
    }

    pub(crate) fn unexpected(&self, expected: &str) -> EvalError {
        let found = match &self.peek().kind {
            Tok::Eof => "end of input".to_string(),
            Tok::Identifier(s) => format!("identifier '{}'", s),
            Tok::Keyword(s) => format!("keyword '{}'", s),
            Tok::Punct(s) => format!("'{}'", s),
            Tok::Number(n) => format!("number '{}'", n),
            Tok::String(_) => "string literal".to_string(),
            Tok::Template(_, _) => "template literal".to_string(),
        };
        EvalError::syntax(format!("expected {} but found {}", expected, found), self.span())
    }
}
