//! Recursive-descent parser building the arena AST
//!
//! Expressions use precedence climbing for the binary operator levels
//! between `||` and `**`; everything else is one function per grammar rule.

use crate::ast::{
    AssignOp, Ast, BinaryOp, Declarator, Function, Literal, LogicalOp, MemberProperty, Node, NodeId, Param,
    Property, Span, UnaryOp, UpdateOp,
};
use crate::error::{Result, SnippetError};
use crate::lexer::{SourceToken, Token};

#[cfg(test)]
mod tests;

/// Stack growth parameters for deeply nested source
const STACK_RED_ZONE: usize = 128 * 1024; // 128KB remaining triggers growth
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024; // Grow by 4MB each time

/// Build an AST from a token list. The returned arena has the `Program` at `NodeId::ROOT`.
pub fn build(tokens: &[SourceToken]) -> Result<Ast> {
    let mut parser = Parser::new(tokens);
    parser.parse_program()?;
    log::debug!("built {} nodes", parser.ast.len());
    Ok(parser.ast)
}

/// Binary operator with its precedence. Higher binds tighter.
#[derive(Clone, Copy)]
enum InfixOp {
    Logical(LogicalOp),
    Binary(BinaryOp),
}

const PREC_EXPONENT: u8 = 11;

fn infix_op(token: &Token) -> Option<(InfixOp, u8)> {
    use InfixOp::{Binary, Logical};
    let op = match token {
        Token::PipePipe => (Logical(LogicalOp::Or), 1),
        Token::AmpAmp => (Logical(LogicalOp::And), 2),
        Token::Pipe => (Binary(BinaryOp::BitOr), 3),
        Token::Caret => (Binary(BinaryOp::BitXor), 4),
        Token::Amp => (Binary(BinaryOp::BitAnd), 5),
        Token::EqEq => (Binary(BinaryOp::Eq), 6),
        Token::NotEq => (Binary(BinaryOp::Ne), 6),
        Token::EqEqEq => (Binary(BinaryOp::StrictEq), 6),
        Token::NotEqEq => (Binary(BinaryOp::StrictNe), 6),
        Token::Lt => (Binary(BinaryOp::Lt), 7),
        Token::Gt => (Binary(BinaryOp::Gt), 7),
        Token::LtEq => (Binary(BinaryOp::Le), 7),
        Token::GtEq => (Binary(BinaryOp::Ge), 7),
        Token::LtLt => (Binary(BinaryOp::Shl), 8),
        Token::GtGt => (Binary(BinaryOp::Shr), 8),
        Token::GtGtGt => (Binary(BinaryOp::UShr), 8),
        Token::Plus => (Binary(BinaryOp::Add), 9),
        Token::Minus => (Binary(BinaryOp::Sub), 9),
        Token::Star => (Binary(BinaryOp::Mul), 10),
        Token::Slash => (Binary(BinaryOp::Div), 10),
        Token::Percent => (Binary(BinaryOp::Rem), 10),
        Token::StarStar => (Binary(BinaryOp::Exp), PREC_EXPONENT),
        _ => return None,
    };
    Some(op)
}

fn assign_op(token: &Token) -> Option<AssignOp> {
    let op = match token {
        Token::Eq => return Some(AssignOp::Assign),
        Token::PlusEq => BinaryOp::Add,
        Token::MinusEq => BinaryOp::Sub,
        Token::StarEq => BinaryOp::Mul,
        Token::SlashEq => BinaryOp::Div,
        Token::PercentEq => BinaryOp::Rem,
        Token::StarStarEq => BinaryOp::Exp,
        Token::LtLtEq => BinaryOp::Shl,
        Token::GtGtEq => BinaryOp::Shr,
        Token::GtGtGtEq => BinaryOp::UShr,
        Token::AmpEq => BinaryOp::BitAnd,
        Token::PipeEq => BinaryOp::BitOr,
        Token::CaretEq => BinaryOp::BitXor,
        _ => return None,
    };
    Some(AssignOp::Compound(op))
}

struct Parser<'t> {
    tokens: &'t [SourceToken],
    pos: usize,
    ast: Ast,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [SourceToken]) -> Self {
        Parser {
            tokens,
            pos: 0,
            ast: Ast::new(),
        }
    }

    // ============================================
    // Token cursor
    // ============================================

    fn current(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn current_span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some(t) => t.span,
            None => {
                let end = self.tokens.last().map_or(0, |t| t.span.end);
                Span::new(end, end)
            }
        }
    }

    /// Span from `start` to the end of the last consumed token
    fn span_from(&self, start: Span) -> Span {
        let end = self
            .pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(start.end, |t| t.span.end);
        Span::new(start.start, end.max(start.end))
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.current();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, token: &Token) -> bool {
        self.current() == Some(token)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<Span> {
        if self.check(token) {
            let span = self.current_span();
            self.pos += 1;
            Ok(span)
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        match self.current() {
            Some(Token::Ident(name)) => {
                self.pos += 1;
                Ok(name.clone())
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Statements may end with `;` but do not have to
    fn consume_semicolon(&mut self) {
        self.eat(&Token::Semi);
    }

    fn unexpected(&self) -> SnippetError {
        let span = self.current_span();
        match self.current() {
            Some(Token::Regex(_)) => SnippetError::parse("regex literal is not supported", span),
            Some(token) => SnippetError::parse(format!("unexpected token '{token}'"), span),
            None => SnippetError::parse("unexpected token: end of input", span),
        }
    }

    // ============================================
    // Statements
    // ============================================

    fn parse_program(&mut self) -> Result<()> {
        let mut body = Vec::new();
        while self.current().is_some() {
            let stmt = if self.check(&Token::Function) {
                self.parse_function()?
            } else {
                self.parse_statement()?
            };
            body.push(stmt);
        }
        let end = self.tokens.last().map_or(0, |t| t.span.end);
        self.ast.replace(NodeId::ROOT, Node::Program { body }, Span::new(0, end));
        Ok(())
    }

    fn parse_function(&mut self) -> Result<NodeId> {
        let start = self.expect(&Token::Function)?;
        let name = self.expect_ident()?;
        self.expect(&Token::LParen)?;
        let mut params = Vec::new();
        while !self.check(&Token::RParen) {
            let name = self.expect_ident()?;
            let default = if self.eat(&Token::Eq) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            params.push(Param { name, default });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RParen)?;
        let body = self.parse_block()?;
        let span = self.span_from(start);
        Ok(self.ast.push(Node::FunctionDecl(Function { name, params, body }), span))
    }

    fn parse_statement(&mut self) -> Result<NodeId> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.parse_statement_inner())
    }

    fn parse_statement_inner(&mut self) -> Result<NodeId> {
        let start = self.current_span();
        match self.current() {
            Some(Token::Function) => Err(SnippetError::parse(
                "function declaration is only allowed at top level",
                start,
            )),
            Some(Token::Var | Token::Let | Token::Const) => {
                let decl = self.parse_var_decl()?;
                self.consume_semicolon();
                Ok(decl)
            }
            Some(Token::LBrace) => self.parse_block(),
            Some(Token::If) => self.parse_if(),
            Some(Token::For) => self.parse_for(),
            Some(Token::While) => self.parse_while(),
            Some(Token::Break) => {
                self.advance();
                self.consume_semicolon();
                Ok(self.ast.push(Node::Break, start))
            }
            Some(Token::Continue) => {
                self.advance();
                self.consume_semicolon();
                Ok(self.ast.push(Node::Continue, start))
            }
            Some(Token::Return) => self.parse_return(),
            Some(Token::Semi) => {
                self.advance();
                Ok(self.ast.push(Node::Empty, start))
            }
            Some(_) => {
                let expression = self.parse_expression()?;
                self.consume_semicolon();
                let span = self.span_from(start);
                Ok(self.ast.push(Node::Expression { expression }, span))
            }
            None => Err(self.unexpected()),
        }
    }

    fn parse_block(&mut self) -> Result<NodeId> {
        let start = self.expect(&Token::LBrace)?;
        let mut body = Vec::new();
        while !self.check(&Token::RBrace) {
            if self.current().is_none() {
                return Err(SnippetError::parse("unexpected token: unterminated block", start));
            }
            body.push(self.parse_statement()?);
        }
        self.expect(&Token::RBrace)?;
        let span = self.span_from(start);
        Ok(self.ast.push(Node::Block { body }, span))
    }

    /// `var a, b = 1` without the trailing semicolon
    fn parse_var_decl(&mut self) -> Result<NodeId> {
        let start = self.current_span();
        self.advance();
        let mut declarations = Vec::new();
        loop {
            let name = self.expect_ident()?;
            let init = if self.eat(&Token::Eq) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            declarations.push(Declarator { name, init });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        let span = self.span_from(start);
        Ok(self.ast.push(Node::VarDecl { declarations }, span))
    }

    fn parse_if(&mut self) -> Result<NodeId> {
        let start = self.expect(&Token::If)?;
        self.expect(&Token::LParen)?;
        let test = self.parse_expression()?;
        self.expect(&Token::RParen)?;
        let consequent = self.parse_statement()?;
        let alternate = if self.eat(&Token::Else) {
            Some(self.parse_statement()?)
        } else {
            None
        };
        let span = self.span_from(start);
        Ok(self.ast.push(Node::If { test, consequent, alternate }, span))
    }

    fn parse_for(&mut self) -> Result<NodeId> {
        let start = self.expect(&Token::For)?;
        self.expect(&Token::LParen)?;
        let init = match self.current() {
            Some(Token::Semi) => None,
            Some(Token::Var | Token::Let | Token::Const) => Some(self.parse_var_decl()?),
            _ => Some(self.parse_expression()?),
        };
        self.expect(&Token::Semi)?;
        let test = if self.check(&Token::Semi) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&Token::Semi)?;
        let update = if self.check(&Token::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&Token::RParen)?;
        let body = self.parse_statement()?;
        let span = self.span_from(start);
        Ok(self.ast.push(Node::For { init, test, update, body }, span))
    }

    fn parse_while(&mut self) -> Result<NodeId> {
        let start = self.expect(&Token::While)?;
        self.expect(&Token::LParen)?;
        let test = self.parse_expression()?;
        self.expect(&Token::RParen)?;
        let body = self.parse_statement()?;
        let span = self.span_from(start);
        Ok(self.ast.push(Node::While { test, body }, span))
    }

    fn parse_return(&mut self) -> Result<NodeId> {
        let start = self.expect(&Token::Return)?;
        let argument = match self.current() {
            None | Some(Token::Semi | Token::RBrace) => None,
            Some(_) => Some(self.parse_expression()?),
        };
        self.consume_semicolon();
        let span = self.span_from(start);
        Ok(self.ast.push(Node::Return { argument }, span))
    }

    // ============================================
    // Expressions
    // ============================================

    /// Comma-separated sequence
    fn parse_expression(&mut self) -> Result<NodeId> {
        let start = self.current_span();
        let first = self.parse_assignment()?;
        if !self.check(&Token::Comma) {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.eat(&Token::Comma) {
            expressions.push(self.parse_assignment()?);
        }
        let span = self.span_from(start);
        Ok(self.ast.push(Node::Sequence { expressions }, span))
    }

    fn parse_assignment(&mut self) -> Result<NodeId> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.parse_assignment_inner())
    }

    fn parse_assignment_inner(&mut self) -> Result<NodeId> {
        let start = self.current_span();
        let target = self.parse_conditional()?;
        let Some(op) = self.current().and_then(assign_op) else {
            return Ok(target);
        };
        if !self.ast[target].is_assignable() {
            return Err(SnippetError::parse("invalid assignment target", self.ast.span(target)));
        }
        self.advance();
        let value = self.parse_assignment()?;
        let span = self.span_from(start);
        Ok(self.ast.push(Node::Assign { op, target, value }, span))
    }

    fn parse_conditional(&mut self) -> Result<NodeId> {
        let start = self.current_span();
        let test = self.parse_binary(1)?;
        if !self.eat(&Token::Question) {
            return Ok(test);
        }
        let consequent = self.parse_assignment()?;
        self.expect(&Token::Colon)?;
        let alternate = self.parse_assignment()?;
        let span = self.span_from(start);
        Ok(self.ast.push(Node::Conditional { test, consequent, alternate }, span))
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<NodeId> {
        let start = self.current_span();
        let mut left = self.parse_unary()?;
        while let Some((op, prec)) = self.current().and_then(infix_op) {
            if prec < min_prec {
                break;
            }
            self.advance();
            // `**` is right-associative
            let next_min = if prec == PREC_EXPONENT { prec } else { prec + 1 };
            let right = self.parse_binary(next_min)?;
            let span = self.span_from(start);
            let node = match op {
                InfixOp::Logical(op) => Node::Logical { op, left, right },
                InfixOp::Binary(op) => Node::Binary { op, left, right },
            };
            left = self.ast.push(node, span);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<NodeId> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.parse_unary_inner())
    }

    fn parse_unary_inner(&mut self) -> Result<NodeId> {
        let start = self.current_span();
        let op = match self.current() {
            Some(Token::Plus) => UnaryOp::Plus,
            Some(Token::Minus) => UnaryOp::Minus,
            Some(Token::Bang) => UnaryOp::Not,
            Some(Token::Tilde) => UnaryOp::BitNot,
            Some(Token::Typeof) => UnaryOp::Typeof,
            Some(Token::Void) => UnaryOp::Void,
            Some(Token::PlusPlus | Token::MinusMinus) => return self.parse_prefix_update(),
            _ => return self.parse_postfix(),
        };
        self.advance();
        let argument = self.parse_unary()?;
        let span = self.span_from(start);
        Ok(self.ast.push(Node::Unary { op, argument }, span))
    }

    /// `++x`, `--a[0]`, and nested forms such as `++++x`
    fn parse_prefix_update(&mut self) -> Result<NodeId> {
        let start = self.current_span();
        let op = match self.advance() {
            Some(Token::PlusPlus) => UpdateOp::Increment,
            _ => UpdateOp::Decrement,
        };
        let argument = self.parse_unary()?;
        let valid = match &self.ast[argument] {
            Node::Update { prefix, .. } => *prefix,
            node => node.is_assignable(),
        };
        if !valid {
            return Err(SnippetError::parse("invalid update target", self.ast.span(argument)));
        }
        let span = self.span_from(start);
        Ok(self.ast.push(Node::Update { op, prefix: true, argument }, span))
    }

    fn parse_postfix(&mut self) -> Result<NodeId> {
        let start = self.current_span();
        let argument = self.parse_call_member()?;
        let op = match self.current() {
            Some(Token::PlusPlus) => UpdateOp::Increment,
            Some(Token::MinusMinus) => UpdateOp::Decrement,
            _ => return Ok(argument),
        };
        if !self.ast[argument].is_assignable() {
            return Err(SnippetError::parse("invalid update target", self.ast.span(argument)));
        }
        self.advance();
        let span = self.span_from(start);
        Ok(self.ast.push(Node::Update { op, prefix: false, argument }, span))
    }

    /// Member and call chains: `a.b[c](d).e`
    fn parse_call_member(&mut self) -> Result<NodeId> {
        let start = self.current_span();
        let mut expr = self.parse_primary()?;
        loop {
            let node = match self.current() {
                Some(Token::Dot) => {
                    self.advance();
                    let name = self.parse_property_name()?;
                    Node::Member {
                        object: expr,
                        property: MemberProperty::Named(name),
                    }
                }
                Some(Token::LBracket) => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect(&Token::RBracket)?;
                    Node::Member {
                        object: expr,
                        property: MemberProperty::Computed(index),
                    }
                }
                Some(Token::LParen) => {
                    let arguments = self.parse_arguments()?;
                    Node::Call { callee: expr, arguments }
                }
                _ => break,
            };
            let span = self.span_from(start);
            expr = self.ast.push(node, span);
        }
        Ok(expr)
    }

    /// Name after `.`; keywords are allowed
    fn parse_property_name(&mut self) -> Result<String> {
        match self.current() {
            Some(Token::Ident(name)) => {
                self.advance();
                Ok(name.clone())
            }
            Some(token) if token.category() == crate::lexer::Category::Keyword => {
                self.advance();
                Ok(token.to_string())
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<NodeId>> {
        self.expect(&Token::LParen)?;
        let mut arguments = Vec::new();
        while !self.check(&Token::RParen) {
            arguments.push(self.parse_assignment()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RParen)?;
        Ok(arguments)
    }

    fn parse_primary(&mut self) -> Result<NodeId> {
        let start = self.current_span();
        let node = match self.current() {
            Some(Token::Number(n) | Token::BigInt(n)) => Node::Literal(Literal::Number(n.clone())),
            Some(Token::Str(s)) => Node::Literal(Literal::String(s.clone())),
            Some(Token::True) => Node::Literal(Literal::Boolean(true)),
            Some(Token::False) => Node::Literal(Literal::Boolean(false)),
            Some(Token::Null) => Node::Literal(Literal::Null),
            Some(Token::Undefined) => Node::Literal(Literal::Undefined),
            Some(Token::Ident(name)) => Node::Identifier(name.clone()),
            Some(Token::LParen) => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(&Token::RParen)?;
                return Ok(inner);
            }
            Some(Token::LBracket) => return self.parse_array(),
            Some(Token::LBrace) => return self.parse_object(),
            _ => return Err(self.unexpected()),
        };
        self.advance();
        Ok(self.ast.push(node, start))
    }

    /// Array literal; holes such as `[1,,2]` are dropped
    fn parse_array(&mut self) -> Result<NodeId> {
        let start = self.expect(&Token::LBracket)?;
        let mut elements = Vec::new();
        loop {
            if self.eat(&Token::RBracket) {
                break;
            }
            if self.eat(&Token::Comma) {
                continue;
            }
            elements.push(self.parse_assignment()?);
            if !self.eat(&Token::Comma) {
                self.expect(&Token::RBracket)?;
                break;
            }
        }
        let span = self.span_from(start);
        Ok(self.ast.push(Node::Array { elements }, span))
    }

    fn parse_object(&mut self) -> Result<NodeId> {
        let start = self.expect(&Token::LBrace)?;
        let mut properties = Vec::new();
        while !self.check(&Token::RBrace) {
            let key = match self.current() {
                Some(Token::Ident(name)) => name.clone(),
                Some(Token::Str(s)) => s.clone(),
                Some(token @ (Token::Number(_) | Token::BigInt(_))) => token.to_string(),
                Some(token) if token.category() == crate::lexer::Category::Keyword => token.to_string(),
                _ => return Err(self.unexpected()),
            };
            self.advance();
            self.expect(&Token::Colon)?;
            let value = self.parse_assignment()?;
            properties.push(Property { key, value });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RBrace)?;
        let span = self.span_from(start);
        Ok(self.ast.push(Node::Object { properties }, span))
    }
}
