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

use crate::ast::*;
use crate::error::EvalError;
use crate::parser::Parser;
use crate::token::Tok;

impl Parser {
    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, EvalError> {
        let span = self.span();

        if self.check_punct(";") {
            self.advance();
            return Ok(Stmt::new(span, StmtKind::Empty));
        }

        if self.check_punct("{") {
            let body = self.parse_block_body()?;
            return Ok(Stmt::new(span, StmtKind::Block(body)));
        }

        if self.check_keyword("let") || self.check_keyword("const") || self.check_keyword("var") {
            return self.parse_var_decl();
        }

        if self.check_keyword("function") {
            self.advance();
            let name = Some(self.expect_identifier()?);
            let func = self.parse_function_tail(name, false)?;
            return Ok(Stmt::new(span, StmtKind::FunctionDecl(func)));
        }

        if self.check_keyword("async") && matches!(self.peek_at(1).kind, Tok::Keyword("function")) {
            self.advance();
            self.advance();
            let name = Some(self.expect_identifier()?);
            let func = self.parse_function_tail(name, true)?;
            return Ok(Stmt::new(span, StmtKind::FunctionDecl(func)));
        }

        if self.check_keyword("class") {
            let node = self.parse_class_node()?;
            return Ok(Stmt::new(span, StmtKind::ClassDecl(node)));
        }

        if self.match_keyword("return") {
            let value = if self.check_punct(";") || self.check_punct("}") || self.is_eof() {
                None
            } else {
                Some(self.parse_expression()?)
            };
            self.consume_statement_end();
            return Ok(Stmt::new(span, StmtKind::Return(value)));
        }

        if self.match_keyword("break") {
            let label = self.parse_optional_label();
            self.consume_statement_end();
            return Ok(Stmt::new(span, StmtKind::Break(label)));
        }

        if self.match_keyword("continue") {
            let label = self.parse_optional_label();
            self.consume_statement_end();
            return Ok(Stmt::new(span, StmtKind::Continue(label)));
        }

        if self.match_keyword("throw") {
            let value = self.parse_expression()?;
            self.consume_statement_end();
            return Ok(Stmt::new(span, StmtKind::Throw(value)));
        }

        if self.check_keyword("if") {
            return self.parse_if_stmt();
        }

        if self.check_keyword("while") {
            return self.parse_while_stmt();
        }

        if self.check_keyword("do") {
            return self.parse_do_while_stmt();
        }

        if self.check_keyword("for") {
            return self.parse_for_stmt();
        }

        if self.check_keyword("switch") {
            return self.parse_switch_stmt();
        }

        if self.check_keyword("try") {
            return self.parse_try_stmt();
        }

        // A lone identifier followed by `:` and not `::`/ternary starts a
        // labeled statement (`outer: while (...) { ... }`).
        if let Tok::Identifier(name) = &self.peek().kind.clone() {
            if matches!(self.peek_at(1).kind, Tok::Punct(":")) {
                self.advance();
                self.advance();
                let body = self.parse_statement()?;
                return Ok(Stmt::new(span, StmtKind::Labeled { label: name.clone(), body: Box::new(body) }));
            }
        }

        let expr = self.parse_expression()?;
        self.consume_statement_end();
        Ok(Stmt::new(span, StmtKind::Expr(expr)))
    }

    fn parse_optional_label(&mut self) -> Option<String> {
        if let Tok::Identifier(name) = &self.peek().kind.clone() {
            if !self.check_punct(";") {
                self.advance();
                return Some(name.clone());
            }
        }
        None
    }

    fn decl_kind_from_keyword(&mut self) -> DeclKind {
        if self.match_keyword("let") {
            DeclKind::Let
        } else if self.match_keyword("const") {
            DeclKind::Const
        } else {
            self.expect_keyword("var").ok();
            DeclKind::Var
        }
    }

    fn parse_var_decl(&mut self) -> Result<Stmt, EvalError> {
        let span = self.span();
        let kind = self.decl_kind_from_keyword();
        let mut declarations = Vec::new();
        loop {
            let pattern = self.parse_pattern()?;
            let init = if self.match_punct("=") {
                Some(self.parse_assignment_expr()?)
            } else {
                None
            };
            declarations.push((pattern, init));
            if !self.match_punct(",") {
                break;
            }
        }
        self.consume_statement_end();
        Ok(Stmt::new(span, StmtKind::VarDecl { kind, declarations }))
    }

    fn parse_if_stmt(&mut self) -> Result<Stmt, EvalError> {
        let span = self.span();
        self.expect_keyword("if")?;
        self.expect_punct("(")?;
        let test = self.parse_expression()?;
        self.expect_punct(")")?;
        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.match_keyword("else") {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Stmt::new(span, StmtKind::If { test, then_branch, else_branch }))
    }

    fn parse_while_stmt(&mut self) -> Result<Stmt, EvalError> {
        let span = self.span();
        self.expect_keyword("while")?;
        self.expect_punct("(")?;
        let test = self.parse_expression()?;
        self.expect_punct(")")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::new(span, StmtKind::While { test, body }))
    }

    fn parse_do_while_stmt(&mut self) -> Result<Stmt, EvalError> {
        let span = self.span();
        self.expect_keyword("do")?;
        let body = Box::new(self.parse_statement()?);
        self.expect_keyword("while")?;
        self.expect_punct("(")?;
        let test = self.parse_expression()?;
        self.expect_punct(")")?;
        self.consume_statement_end();
        Ok(Stmt::new(span, StmtKind::DoWhile { body, test }))
    }

    fn parse_for_stmt(&mut self) -> Result<Stmt, EvalError> {
        let span = self.span();
        self.expect_keyword("for")?;
        self.expect_punct("(")?;

        let decl_kind = if self.check_keyword("let") {
            Some(DeclKind::Let)
        } else if self.check_keyword("const") {
            Some(DeclKind::Const)
        } else if self.check_keyword("var") {
            Some(DeclKind::Var)
        } else {
            None
        };

        if decl_kind.is_some() {
            let checkpoint = self.pos;
            let kind = self.decl_kind_from_keyword();
            let pattern = self.parse_pattern()?;
            if self.match_keyword("of") {
                let iterable = self.parse_assignment_expr()?;
                self.expect_punct(")")?;
                let body = Box::new(self.parse_statement()?);
                return Ok(Stmt::new(span, StmtKind::ForOf { decl_kind: Some(kind), pattern, iterable, body }));
            }
            if self.match_keyword("in") {
                let object = self.parse_assignment_expr()?;
                self.expect_punct(")")?;
                let body = Box::new(self.parse_statement()?);
                return Ok(Stmt::new(span, StmtKind::ForIn { decl_kind: Some(kind), pattern, object, body }));
            }
            // Not a for-in/for-of: fall through to the classic C-style form.
            self.pos = checkpoint;
        } else if !self.check_punct(";") {
            // `for (x of xs)` without a declaration keyword.
            let checkpoint = self.pos;
            if let Ok(pattern) = self.parse_pattern() {
                if self.match_keyword("of") {
                    let iterable = self.parse_assignment_expr()?;
                    self.expect_punct(")")?;
                    let body = Box::new(self.parse_statement()?);
                    return Ok(Stmt::new(span, StmtKind::ForOf { decl_kind: None, pattern, iterable, body }));
                }
                if self.match_keyword("in") {
                    let object = self.parse_assignment_expr()?;
                    self.expect_punct(")")?;
                    let body = Box::new(self.parse_statement()?);
                    return Ok(Stmt::new(span, StmtKind::ForIn { decl_kind: None, pattern, object, body }));
                }
            }
            self.pos = checkpoint;
        }

        let init = if self.check_punct(";") {
            None
        } else if self.check_keyword("let") || self.check_keyword("const") || self.check_keyword("var") {
            Some(Box::new(self.parse_var_decl()?))
        } else {
            let e = self.parse_expression()?;
            self.expect_punct(";")?;
            Some(Box::new(Stmt::new(e.span, StmtKind::Expr(e))))
        };
        if init.is_none() {
            self.expect_punct(";")?;
        }

        let test = if self.check_punct(";") { None } else { Some(self.parse_expression()?) };
        self.expect_punct(";")?;
        let update = if self.check_punct(")") { None } else { Some(self.parse_expression()?) };
        self.expect_punct(")")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::new(span, StmtKind::For { init, test, update, body }))
    }

    fn parse_switch_stmt(&mut self) -> Result<Stmt, EvalError> {
        let span = self.span();
        self.expect_keyword("switch")?;
        self.expect_punct("(")?;
        let discriminant = self.parse_expression()?;
        self.expect_punct(")")?;
        self.expect_punct("{")?;
        let mut cases = Vec::new();
        while !self.check_punct("}") {
            let test = if self.match_keyword("case") {
                let e = self.parse_expression()?;
                self.expect_punct(":")?;
                Some(e)
            } else {
                self.expect_keyword("default")?;
                self.expect_punct(":")?;
                None
            };
            let mut body = Vec::new();
            while !self.check_keyword("case") && !self.check_keyword("default") && !self.check_punct("}") {
                body.push(self.parse_statement()?);
            }
            cases.push(SwitchCase { test, body });
        }
        self.expect_punct("}")?;
        Ok(Stmt::new(span, StmtKind::Switch { discriminant, cases }))
    }

    fn parse_try_stmt(&mut self) -> Result<Stmt, EvalError> {
        let span = self.span();
        self.expect_keyword("try")?;
        let block = self.parse_block_body()?;

        let catch = if self.match_keyword("catch") {
            let param = if self.match_punct("(") {
                let p = self.parse_pattern()?;
                self.expect_punct(")")?;
                Some(p)
            } else {
                None
            };
            let body = self.parse_block_body()?;
            Some(CatchClause { param, body })
        } else {
            None
        };

        let finally = if self.match_keyword("finally") {
            Some(self.parse_block_body()?)
        } else {
            None
        };

        Ok(Stmt::new(span, StmtKind::Try { block, catch, finally }))
    }
}
