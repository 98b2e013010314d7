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

use crate::error::EvalError;
use crate::span::Span;
use crate::token::{keyword_lookup, Tok, Token};

const PUNCTUATORS: &[&str] = &[
    "...", "=>", "===", "!==", "**=", "??=", "&&=", "||=",
    "==", "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--",
    "+=", "-=", "*=", "/=", "%=", "**",
    "(", ")", "{", "}", "[", "]", ",", ".", ";", ":", "?",
    "+", "-", "*", "/", "%", "=", "<", ">", "!", "&", "|", "^", "~",
];

pub struct Lexer<'a> {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    _source: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            _source: source,
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, EvalError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let is_eof = matches!(tok.kind, Tok::Eof);
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn span(&self) -> Span {
        Span::new(self.line, self.column)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    self.advance();
                    self.advance();
                    while let Some(c) = self.peek() {
                        if c == '*' && self.peek_at(1) == Some('/') {
                            self.advance();
                            self.advance();
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, EvalError> {
        self.skip_trivia();
        let span = self.span();

        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(Token::new(Tok::Eof, span)),
        };

        if c.is_ascii_digit() || (c == '.' && self.peek_at(1).map_or(false, |n| n.is_ascii_digit())) {
            return self.read_number(span);
        }

        if c == '"' || c == '\'' {
            return self.read_string(c, span);
        }

        if c == '`' {
            return self.read_template(span);
        }

        if c.is_alphabetic() || c == '_' || c == '$' {
            return self.read_identifier(span);
        }

        for punct in PUNCTUATORS {
            if self.matches_literal(punct) {
                for _ in 0..punct.chars().count() {
                    self.advance();
                }
                return Ok(Token::new(Tok::Punct(punct), span));
            }
        }

        Err(EvalError::syntax(format!("unexpected character '{}'", c), span))
    }

    fn matches_literal(&self, lit: &str) -> bool {
        let mut idx = self.pos;
        for expected in lit.chars() {
            match self.chars.get(idx) {
                Some(&c) if c == expected => idx += 1,
                _ => return false,
            }
        }
        true
    }

    fn read_number(&mut self, span: Span) -> Result<Token, EvalError> {
        let start = self.pos;
        let mut seen_dot = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else if c == '.' && !seen_dot {
                seen_dot = true;
                self.advance();
            } else if c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let text: String = self.chars[start..self.pos].iter().filter(|&&c| c != '_').collect();
        let value = text.parse::<f64>().map_err(|_| {
            EvalError::syntax(format!("invalid number literal '{}'", text), span)
        })?;
        Ok(Token::new(Tok::Number(value), span))
    }

    fn read_escape(&mut self) -> Option<char> {
        match self.advance()? {
            'n' => Some('\n'),
            't' => Some('\t'),
            'r' => Some('\r'),
            '\\' => Some('\\'),
            '0' => Some('\0'),
            '`' => Some('`'),
            '$' => Some('$'),
            other => Some(other),
        }
    }

    fn read_string(&mut self, quote: char, span: Span) -> Result<Token, EvalError> {
        self.advance();
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(EvalError::syntax("unterminated string literal", span)),
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    if let Some(c) = self.read_escape() {
                        out.push(c);
                    }
                }
                Some(c) => {
                    out.push(c);
                    self.advance();
                }
            }
        }
        Ok(Token::new(Tok::String(out), span))
    }

    /// Splits a template literal into its literal runs and the raw source of
    /// each `${...}` slot. The parser re-lexes and re-parses each slot as a
    /// full expression, so nested templates and brace-balancing inside a
    /// slot (`${ {a:1}.a }`) fall out naturally.
    fn read_template(&mut self, span: Span) -> Result<Token, EvalError> {
        self.advance();
        let mut quasis = Vec::new();
        let mut exprs = Vec::new();
        let mut current = String::new();
        loop {
            match self.peek() {
                None => return Err(EvalError::syntax("unterminated template literal", span)),
                Some('`') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    if let Some(c) = self.read_escape() {
                        current.push(c);
                    }
                }
                Some('$') if self.peek_at(1) == Some('{') => {
                    self.advance();
                    self.advance();
                    quasis.push(std::mem::take(&mut current));
                    let mut depth = 1usize;
                    let mut slot = String::new();
                    loop {
                        match self.peek() {
                            None => return Err(EvalError::syntax("unterminated template expression", span)),
                            Some('{') => {
                                depth += 1;
                                slot.push('{');
                                self.advance();
                            }
                            Some('}') => {
                                depth -= 1;
                                self.advance();
                                if depth == 0 {
                                    break;
                                }
                                slot.push('}');
                            }
                            Some(c) => {
                                slot.push(c);
                                self.advance();
                            }
                        }
                    }
                    exprs.push(slot);
                }
                Some(c) => {
                    current.push(c);
                    self.advance();
                }
            }
        }
        quasis.push(current);
        Ok(Token::new(Tok::Template(quasis, exprs), span))
    }

    fn read_identifier(&mut self, span: Span) -> Result<Token, EvalError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                self.advance();
            } else {
                break;
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        if let Some(kw) = keyword_lookup(&text) {
            Ok(Token::new(Tok::Keyword(kw), span))
        } else {
            Ok(Token::new(Tok::Identifier(text), span))
        }
    }
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, EvalError> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_a_small_expression() {
        let tokens = tokenize("let x = 1 + 2;").unwrap();
        assert!(matches!(tokens[0].kind, Tok::Keyword("let")));
        assert!(matches!(tokens[1].kind, Tok::Identifier(ref s) if s == "x"));
        assert!(matches!(tokens[2].kind, Tok::Punct("=")));
        assert!(matches!(tokens[3].kind, Tok::Number(n) if n == 1.0));
    }

    #[test]
    fn splits_template_literal_slots() {
        let tokens = tokenize("`a${1+1}b`").unwrap();
        match &tokens[0].kind {
            Tok::Template(quasis, exprs) => {
                assert_eq!(quasis, &vec!["a".to_string(), "b".to_string()]);
                assert_eq!(exprs, &vec!["1+1".to_string()]);
            }
            other => panic!("expected template token, got {:?}", other),
        }
    }
}
