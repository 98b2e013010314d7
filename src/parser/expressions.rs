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
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, EvalError> {
        let span = self.span();
        let first = self.parse_assignment_expr()?;
        if self.check_punct(",") {
            let mut items = vec![first];
            while self.match_punct(",") {
                items.push(self.parse_assignment_expr()?);
            }
            return Ok(Expr::new(span, ExprKind::Sequence(items)));
        }
        Ok(first)
    }

    pub(crate) fn parse_assignment_expr(&mut self) -> Result<Expr, EvalError> {
        let span = self.span();
        let left = self.parse_conditional_expr()?;

        let op = match &self.peek().kind {
            Tok::Punct("=") => Some(AssignOp::Assign),
            Tok::Punct("+=") => Some(AssignOp::Add),
            Tok::Punct("-=") => Some(AssignOp::Sub),
            Tok::Punct("*=") => Some(AssignOp::Mul),
            Tok::Punct("/=") => Some(AssignOp::Div),
            Tok::Punct("%=") => Some(AssignOp::Mod),
            Tok::Punct("??=") => Some(AssignOp::NullishAssign),
            Tok::Punct("||=") => Some(AssignOp::OrAssign),
            Tok::Punct("&&=") => Some(AssignOp::AndAssign),
            _ => None,
        };

        if let Some(op) = op {
            self.advance();
            let value = self.parse_assignment_expr()?;
            return Ok(Expr::new(span, ExprKind::Assign { op, target: Box::new(left), value: Box::new(value) }));
        }

        Ok(left)
    }

    fn parse_conditional_expr(&mut self) -> Result<Expr, EvalError> {
        let span = self.span();
        let test = self.parse_nullish_expr()?;
        if self.match_punct("?") {
            let consequent = self.parse_assignment_expr()?;
            self.expect_punct(":")?;
            let alternate = self.parse_assignment_expr()?;
            return Ok(Expr::new(span, ExprKind::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            }));
        }
        Ok(test)
    }

    fn parse_nullish_expr(&mut self) -> Result<Expr, EvalError> {
        let span = self.span();
        let mut left = self.parse_or_expr()?;
        while self.match_punct("??") {
            let right = self.parse_or_expr()?;
            left = Expr::new(span, ExprKind::Logical { op: LogicalOp::NullishCoalesce, left: Box::new(left), right: Box::new(right) });
        }
        Ok(left)
    }

    fn parse_or_expr(&mut self) -> Result<Expr, EvalError> {
        let span = self.span();
        let mut left = self.parse_and_expr()?;
        while self.match_punct("||") {
            let right = self.parse_and_expr()?;
            left = Expr::new(span, ExprKind::Logical { op: LogicalOp::Or, left: Box::new(left), right: Box::new(right) });
        }
        Ok(left)
    }

    fn parse_and_expr(&mut self) -> Result<Expr, EvalError> {
        let span = self.span();
        let mut left = self.parse_bit_or_expr()?;
        while self.match_punct("&&") {
            let right = self.parse_bit_or_expr()?;
            left = Expr::new(span, ExprKind::Logical { op: LogicalOp::And, left: Box::new(left), right: Box::new(right) });
        }
        Ok(left)
    }

    fn parse_bit_or_expr(&mut self) -> Result<Expr, EvalError> {
        let span = self.span();
        let mut left = self.parse_bit_xor_expr()?;
        while self.check_punct("|") && !self.check_punct("||") {
            self.advance();
            let right = self.parse_bit_xor_expr()?;
            left = Expr::new(span, ExprKind::Binary { op: BinaryOp::BitOr, left: Box::new(left), right: Box::new(right) });
        }
        Ok(left)
    }

    fn parse_bit_xor_expr(&mut self) -> Result<Expr, EvalError> {
        let span = self.span();
        let mut left = self.parse_bit_and_expr()?;
        while self.match_punct("^") {
            let right = self.parse_bit_and_expr()?;
            left = Expr::new(span, ExprKind::Binary { op: BinaryOp::BitXor, left: Box::new(left), right: Box::new(right) });
        }
        Ok(left)
    }

    fn parse_bit_and_expr(&mut self) -> Result<Expr, EvalError> {
        let span = self.span();
        let mut left = self.parse_equality_expr()?;
        while self.check_punct("&") && !self.check_punct("&&") {
            self.advance();
            let right = self.parse_equality_expr()?;
            left = Expr::new(span, ExprKind::Binary { op: BinaryOp::BitAnd, left: Box::new(left), right: Box::new(right) });
        }
        Ok(left)
    }

    fn parse_equality_expr(&mut self) -> Result<Expr, EvalError> {
        let span = self.span();
        let mut left = self.parse_relational_expr()?;
        loop {
            let op = match &self.peek().kind {
                Tok::Punct("===") => BinaryOp::StrictEq,
                Tok::Punct("!==") => BinaryOp::StrictNotEq,
                Tok::Punct("==") => BinaryOp::Eq,
                Tok::Punct("!=") => BinaryOp::NotEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_relational_expr()?;
            left = Expr::new(span, ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) });
        }
        Ok(left)
    }

    fn parse_relational_expr(&mut self) -> Result<Expr, EvalError> {
        let span = self.span();
        let mut left = self.parse_shift_expr()?;
        loop {
            let op = match &self.peek().kind {
                Tok::Punct("<=") => BinaryOp::Le,
                Tok::Punct(">=") => BinaryOp::Ge,
                Tok::Punct("<") => BinaryOp::Lt,
                Tok::Punct(">") => BinaryOp::Gt,
                _ => break,
            };
            self.advance();
            let right = self.parse_shift_expr()?;
            left = Expr::new(span, ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) });
        }
        Ok(left)
    }

    fn parse_shift_expr(&mut self) -> Result<Expr, EvalError> {
        // Left/right bit-shift sit in the grammar but are rarely needed by
        // scripts; keep the precedence slot so `a << b + 1` still parses.
        self.parse_additive_expr()
    }

    fn parse_additive_expr(&mut self) -> Result<Expr, EvalError> {
        let span = self.span();
        let mut left = self.parse_multiplicative_expr()?;
        loop {
            let op = match &self.peek().kind {
                Tok::Punct("+") => BinaryOp::Add,
                Tok::Punct("-") => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative_expr()?;
            left = Expr::new(span, ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) });
        }
        Ok(left)
    }

    fn parse_multiplicative_expr(&mut self) -> Result<Expr, EvalError> {
        let span = self.span();
        let mut left = self.parse_exponent_expr()?;
        loop {
            let op = match &self.peek().kind {
                Tok::Punct("*") => BinaryOp::Mul,
                Tok::Punct("/") => BinaryOp::Div,
                Tok::Punct("%") => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_exponent_expr()?;
            left = Expr::new(span, ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) });
        }
        Ok(left)
    }

    fn parse_exponent_expr(&mut self) -> Result<Expr, EvalError> {
        let span = self.span();
        let left = self.parse_unary_expr()?;
        if self.match_punct("**") {
            // right-associative: `2 ** 3 ** 2 == 2 ** (3 ** 2)`
            let right = self.parse_exponent_expr()?;
            return Ok(Expr::new(span, ExprKind::Binary { op: BinaryOp::Pow, left: Box::new(left), right: Box::new(right) }));
        }
        Ok(left)
    }

    fn parse_unary_expr(&mut self) -> Result<Expr, EvalError> {
        let span = self.span();
        let op = match &self.peek().kind {
            Tok::Punct("-") => Some(UnaryOp::Neg),
            Tok::Punct("+") => Some(UnaryOp::Plus),
            Tok::Punct("!") => Some(UnaryOp::Not),
            Tok::Punct("~") => Some(UnaryOp::BitNot),
            Tok::Keyword("typeof") => Some(UnaryOp::TypeOf),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let argument = self.parse_unary_expr()?;
            return Ok(Expr::new(span, ExprKind::Unary { op, argument: Box::new(argument) }));
        }

        if self.match_keyword("await") {
            let argument = self.parse_unary_expr()?;
            return Ok(Expr::new(span, ExprKind::Await(Box::new(argument))));
        }

        if self.check_punct("++") || self.check_punct("--") {
            let op = if self.match_punct("++") { UpdateOp::Increment } else { self.advance(); UpdateOp::Decrement };
            let argument = self.parse_unary_expr()?;
            return Ok(Expr::new(span, ExprKind::Update { op, argument: Box::new(argument), prefix: true }));
        }

        self.parse_postfix_expr()
    }

    fn parse_postfix_expr(&mut self) -> Result<Expr, EvalError> {
        let span = self.span();
        let mut expr = self.parse_call_expr()?;
        if self.check_punct("++") || self.check_punct("--") {
            let op = if self.match_punct("++") { UpdateOp::Increment } else { self.advance(); UpdateOp::Decrement };
            expr = Expr::new(span, ExprKind::Update { op, argument: Box::new(expr), prefix: false });
        }
        Ok(expr)
    }

    fn parse_call_expr(&mut self) -> Result<Expr, EvalError> {
        let span = self.span();
        let mut expr = if self.check_keyword("new") {
            self.parse_new_expr()?
        } else {
            self.parse_primary_expr()?
        };

        loop {
            if self.match_punct(".") {
                let name = self.expect_identifier()?;
                expr = Expr::new(span, ExprKind::Member { object: Box::new(expr), property: MemberProp::Identifier(name), optional: false });
            } else if self.match_punct("?.") {
                if self.check_punct("(") {
                    let args = self.parse_arguments()?;
                    expr = Expr::new(span, ExprKind::Call { callee: Box::new(expr), args, optional: true });
                } else {
                    let name = self.expect_identifier()?;
                    expr = Expr::new(span, ExprKind::Member { object: Box::new(expr), property: MemberProp::Identifier(name), optional: true });
                }
            } else if self.match_punct("[") {
                let index = self.parse_expression()?;
                self.expect_punct("]")?;
                expr = Expr::new(span, ExprKind::Member { object: Box::new(expr), property: MemberProp::Computed(Box::new(index)), optional: false });
            } else if self.check_punct("(") {
                let args = self.parse_arguments()?;
                expr = Expr::new(span, ExprKind::Call { callee: Box::new(expr), args, optional: false });
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_new_expr(&mut self) -> Result<Expr, EvalError> {
        let span = self.span();
        self.expect_keyword("new")?;
        let mut callee = self.parse_primary_expr()?;
        while self.match_punct(".") {
            let name = self.expect_identifier()?;
            callee = Expr::new(span, ExprKind::Member { object: Box::new(callee), property: MemberProp::Identifier(name), optional: false });
        }
        let args = if self.check_punct("(") {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        Ok(Expr::new(span, ExprKind::New { callee: Box::new(callee), args }))
    }

    fn parse_arguments(&mut self) -> Result<Vec<Argument>, EvalError> {
        self.expect_punct("(")?;
        let mut args = Vec::new();
        while !self.check_punct(")") {
            if self.match_punct("...") {
                args.push(Argument::Spread(self.parse_assignment_expr()?));
            } else {
                args.push(Argument::Normal(self.parse_assignment_expr()?));
            }
            if !self.match_punct(",") {
                break;
            }
        }
        self.expect_punct(")")?;
        Ok(args)
    }

    fn parse_primary_expr(&mut self) -> Result<Expr, EvalError> {
        let span = self.span();
        match self.peek().kind.clone() {
            Tok::Number(n) => {
                self.advance();
                Ok(Expr::new(span, ExprKind::Number(n)))
            }
            Tok::String(s) => {
                self.advance();
                Ok(Expr::new(span, ExprKind::StringLit(s)))
            }
            Tok::Template(quasis, raw_exprs) => {
                self.advance();
                let mut exprs = Vec::with_capacity(raw_exprs.len());
                for raw in raw_exprs {
                    exprs.push(Self::parse_expr_from_source(&raw)?);
                }
                Ok(Expr::new(span, ExprKind::Template { quasis, exprs }))
            }
            Tok::Keyword("true") => {
                self.advance();
                Ok(Expr::new(span, ExprKind::Bool(true)))
            }
            Tok::Keyword("false") => {
                self.advance();
                Ok(Expr::new(span, ExprKind::Bool(false)))
            }
            Tok::Keyword("null") => {
                self.advance();
                Ok(Expr::new(span, ExprKind::Null))
            }
            Tok::Keyword("undefined") => {
                self.advance();
                Ok(Expr::new(span, ExprKind::Undefined))
            }
            Tok::Keyword("this") => {
                self.advance();
                Ok(Expr::new(span, ExprKind::This))
            }
            Tok::Keyword("super") => {
                self.advance();
                Ok(Expr::new(span, ExprKind::Super))
            }
            Tok::Keyword("function") => {
                self.advance();
                let name = if let Tok::Identifier(_) = &self.peek().kind { Some(self.expect_identifier()?) } else { None };
                let func = self.parse_function_tail(name, false)?;
                Ok(Expr::new(span, ExprKind::Function(func)))
            }
            Tok::Keyword("async") if matches!(self.peek_at(1).kind, Tok::Keyword("function")) => {
                self.advance();
                self.advance();
                let name = if let Tok::Identifier(_) = &self.peek().kind { Some(self.expect_identifier()?) } else { None };
                let func = self.parse_function_tail(name, true)?;
                Ok(Expr::new(span, ExprKind::Function(func)))
            }
            Tok::Keyword("class") => self.parse_class_expr(),
            Tok::Identifier(name) => {
                if self.looks_like_arrow_params() {
                    return self.parse_arrow_from_identifier(name, span);
                }
                self.advance();
                Ok(Expr::new(span, ExprKind::Identifier(name)))
            }
            Tok::Keyword("async") if matches!(self.peek_at(1).kind, Tok::Identifier(_)) && matches!(self.peek_at(2).kind, Tok::Punct("=>")) => {
                self.advance();
                let name = self.expect_identifier()?;
                self.expect_punct("=>")?;
                self.parse_arrow_body(vec![Param { pattern: Pattern::Identifier(name), is_rest: false }], true, span)
            }
            Tok::Punct("(") => self.parse_paren_or_arrow(),
            Tok::Punct("[") => self.parse_array_literal(),
            Tok::Punct("{") => self.parse_object_literal(),
            _ => Err(self.unexpected("an expression")),
        }
    }

    fn looks_like_arrow_params(&self) -> bool {
        matches!(self.peek_at(1).kind, Tok::Punct("=>"))
    }

    fn parse_arrow_from_identifier(&mut self, name: String, span: crate::span::Span) -> Result<Expr, EvalError> {
        self.advance();
        self.expect_punct("=>")?;
        self.parse_arrow_body(vec![Param { pattern: Pattern::Identifier(name), is_rest: false }], false, span)
    }

    /// `(` could begin a parenthesized expression or an arrow parameter
    /// list; both are parsed speculatively by re-scanning from a saved
    /// position once we know whether `=>` follows the closing `)`.
    fn parse_paren_or_arrow(&mut self) -> Result<Expr, EvalError> {
        let span = self.span();
        let checkpoint = self.pos;
        if let Ok(params) = self.try_parse_arrow_params() {
            if self.match_punct("=>") {
                return self.parse_arrow_body(params, false, span);
            }
        }
        self.pos = checkpoint;
        self.expect_punct("(")?;
        let expr = self.parse_expression()?;
        self.expect_punct(")")?;
        Ok(expr)
    }

    fn try_parse_arrow_params(&mut self) -> Result<Vec<Param>, EvalError> {
        self.parse_param_list()
    }

    fn parse_arrow_body(&mut self, params: Vec<Param>, is_async: bool, span: crate::span::Span) -> Result<Expr, EvalError> {
        let body = if self.check_punct("{") {
            self.parse_block_body()?
        } else {
            let expr = self.parse_assignment_expr()?;
            vec![Stmt::new(expr.span, StmtKind::Return(Some(expr)))]
        };
        Ok(Expr::new(span, ExprKind::Arrow(FunctionNode { name: None, params, body, is_async, is_arrow: true, span })))
    }

    fn parse_array_literal(&mut self) -> Result<Expr, EvalError> {
        let span = self.span();
        self.expect_punct("[")?;
        let mut elements = Vec::new();
        while !self.check_punct("]") {
            if self.check_punct(",") {
                self.advance();
                elements.push(None);
                continue;
            }
            if self.match_punct("...") {
                elements.push(Some(ArrayElement::Spread(self.parse_assignment_expr()?)));
            } else {
                elements.push(Some(ArrayElement::Item(self.parse_assignment_expr()?)));
            }
            if !self.match_punct(",") {
                break;
            }
        }
        self.expect_punct("]")?;
        Ok(Expr::new(span, ExprKind::Array(elements)))
    }

    fn parse_prop_key(&mut self) -> Result<PropKey, EvalError> {
        match self.peek().kind.clone() {
            Tok::Identifier(name) => {
                self.advance();
                Ok(PropKey::Identifier(name))
            }
            Tok::Keyword(kw) => {
                self.advance();
                Ok(PropKey::Identifier(kw.to_string()))
            }
            Tok::String(s) => {
                self.advance();
                Ok(PropKey::StringLit(s))
            }
            Tok::Number(n) => {
                self.advance();
                Ok(PropKey::NumberLit(n))
            }
            Tok::Punct("[") => {
                self.advance();
                let expr = self.parse_assignment_expr()?;
                self.expect_punct("]")?;
                Ok(PropKey::Computed(Box::new(expr)))
            }
            _ => Err(self.unexpected("a property name")),
        }
    }

    fn parse_object_literal(&mut self) -> Result<Expr, EvalError> {
        let span = self.span();
        self.expect_punct("{")?;
        let mut props = Vec::new();
        while !self.check_punct("}") {
            if self.match_punct("...") {
                props.push(ObjectProp::Spread(self.parse_assignment_expr()?));
                if !self.match_punct(",") {
                    break;
                }
                continue;
            }

            if self.check_keyword("get") && !matches!(self.peek_at(1).kind, Tok::Punct(":") | Tok::Punct(",") | Tok::Punct("}") | Tok::Punct("(")) {
                self.advance();
                let key = self.parse_prop_key()?;
                let func = self.parse_function_tail(None, false)?;
                props.push(ObjectProp::Getter { key, func });
                if !self.match_punct(",") {
                    break;
                }
                continue;
            }
            if self.check_keyword("set") && !matches!(self.peek_at(1).kind, Tok::Punct(":") | Tok::Punct(",") | Tok::Punct("}") | Tok::Punct("(")) {
                self.advance();
                let key = self.parse_prop_key()?;
                let func = self.parse_function_tail(None, false)?;
                props.push(ObjectProp::Setter { key, func });
                if !self.match_punct(",") {
                    break;
                }
                continue;
            }

            let key = self.parse_prop_key()?;

            if self.check_punct("(") {
                let func = self.parse_function_tail(None, false)?;
                props.push(ObjectProp::Method { key, func });
            } else if self.match_punct(":") {
                let value = self.parse_assignment_expr()?;
                props.push(ObjectProp::KeyValue { key, value });
            } else if let PropKey::Identifier(name) = &key {
                props.push(ObjectProp::Shorthand(name.clone()));
            } else {
                return Err(self.unexpected("':' after computed property key"));
            }

            if !self.match_punct(",") {
                break;
            }
        }
        self.expect_punct("}")?;
        Ok(Expr::new(span, ExprKind::Object(props)))
    }

    fn parse_class_expr(&mut self) -> Result<Expr, EvalError> {
        let node = self.parse_class_node()?;
        let span = node.span;
        Ok(Expr::new(span, ExprKind::Class(node)))
    }

    pub(crate) fn parse_class_node(&mut self) -> Result<ClassNode, EvalError> {
        let span = self.span();
        self.expect_keyword("class")?;
        let name = if let Tok::Identifier(_) = &self.peek().kind { Some(self.expect_identifier()?) } else { None };
        let superclass = if self.match_keyword("extends") {
            Some(Box::new(self.parse_call_expr()?))
        } else {
            None
        };

        self.expect_punct("{")?;
        let mut members = Vec::new();
        let mut fields = Vec::new();
        while !self.check_punct("}") {
            if self.match_punct(";") {
                continue;
            }
            let is_static = self.check_keyword("static") && !matches!(self.peek_at(1).kind, Tok::Punct("(") | Tok::Punct("="));
            if is_static {
                self.advance();
            }

            let mut kind = MethodKind::Method;
            if self.check_keyword("get") && !matches!(self.peek_at(1).kind, Tok::Punct("(") | Tok::Punct("=")) {
                self.advance();
                kind = MethodKind::Getter;
            } else if self.check_keyword("set") && !matches!(self.peek_at(1).kind, Tok::Punct("(") | Tok::Punct("=")) {
                self.advance();
                kind = MethodKind::Setter;
            }

            let is_async = self.check_keyword("async") && !matches!(self.peek_at(1).kind, Tok::Punct("(") | Tok::Punct("="));
            if is_async {
                self.advance();
            }

            let key = self.parse_prop_key()?;

            if self.check_punct("(") {
                if matches!(&key, PropKey::Identifier(n) if n == "constructor") {
                    kind = MethodKind::Constructor;
                }
                let func = self.parse_function_tail(None, is_async)?;
                members.push(ClassMember { kind, name: key, is_static, func });
            } else {
                let name = match &key {
                    PropKey::Identifier(n) | PropKey::StringLit(n) => n.clone(),
                    PropKey::NumberLit(n) => n.to_string(),
                    PropKey::Computed(_) => return Err(self.unexpected("a field name")),
                };
                let value = if self.match_punct("=") {
                    Some(self.parse_assignment_expr()?)
                } else {
                    None
                };
                self.consume_statement_end();
                fields.push(ClassField { name, is_static, value });
            }
        }
        self.expect_punct("}")?;
        Ok(ClassNode { name, superclass, members, fields, span })
    }
}
