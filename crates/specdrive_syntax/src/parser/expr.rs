/// Expression parsing methods.
///
/// Precedence ladder, lowest first:
/// `or` → `and` → equality → comparison → additive → multiplicative → unary → primary.
impl<'a> Parser<'a> {
    // ========================================================================
    // Expressions
    // ========================================================================

    fn expression(&mut self) -> Result<Spanned<Expr>, CompileError> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let mut left = self.and_expr()?;
        while self.match_keyword(KeywordId::Or) {
            let right = self.and_expr()?;
            left = binary(left, BinaryOp::Or, right);
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let mut left = self.equality()?;
        while self.match_keyword(KeywordId::And) {
            let right = self.equality()?;
            left = binary(left, BinaryOp::And, right);
        }
        Ok(left)
    }

    fn equality(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let mut left = self.comparison()?;
        loop {
            let op = if self.match_op(OperatorId::EqEq) {
                BinaryOp::Eq
            } else if self.match_op(OperatorId::NotEq) {
                BinaryOp::NotEq
            } else {
                break;
            };
            let right = self.comparison()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn comparison(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let mut left = self.additive()?;
        loop {
            let op = if self.match_op(OperatorId::Lt) {
                BinaryOp::Lt
            } else if self.match_op(OperatorId::LtEq) {
                BinaryOp::LtEq
            } else if self.match_op(OperatorId::Gt) {
                BinaryOp::Gt
            } else if self.match_op(OperatorId::GtEq) {
                BinaryOp::GtEq
            } else {
                break;
            };
            let right = self.additive()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn additive(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let mut left = self.multiplicative()?;
        loop {
            let op = if self.match_op(OperatorId::Plus) {
                BinaryOp::Add
            } else if self.match_op(OperatorId::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };
            let right = self.multiplicative()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let mut left = self.unary()?;
        loop {
            let op = if self.match_op(OperatorId::Star) {
                BinaryOp::Mul
            } else if self.match_op(OperatorId::Slash) {
                BinaryOp::Div
            } else if self.match_op(OperatorId::Percent) {
                BinaryOp::Mod
            } else {
                break;
            };
            let right = self.unary()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let op = if self.match_op(OperatorId::Minus) {
            UnaryOp::Neg
        } else if self.match_keyword(KeywordId::Not) {
            UnaryOp::Not
        } else {
            return self.primary();
        };
        let start = self.previous_span().start;
        let operand = self.unary()?;
        let span = Span::new(start, operand.span.end);
        Ok(Spanned::new(Expr::Unary(op, Box::new(operand)), span))
    }

    fn primary(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let span = self.current_span();

        if let Some(lit) = self.try_literal() {
            return Ok(Spanned::new(Expr::Literal(lit), span));
        }

        if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            self.advance();
            return Ok(Spanned::new(Expr::Ident(name), span));
        }

        if self.match_punct(PunctuationId::LBracket) {
            let elements = self.comma_separated(PunctuationId::RBracket)?;
            self.expect_punct(PunctuationId::RBracket, "Expected `]` to close list")?;
            return Ok(Spanned::new(Expr::List(elements), span.merge(self.previous_span())));
        }

        if self.match_punct(PunctuationId::LParen) {
            let inner = self.expression()?;
            self.expect_punct(PunctuationId::RParen, "Expected `)` to close parenthesized expression")?;
            return Ok(Spanned::new(Expr::Paren(Box::new(inner)), span.merge(self.previous_span())));
        }

        Err(self.unexpected("Expected expression"))
    }

    fn try_literal(&mut self) -> Option<Literal> {
        let lit = match &self.peek().kind {
            TokenKind::Int(v) => Literal::Int(*v),
            TokenKind::Float(v) => Literal::Float(*v),
            TokenKind::String(s) => Literal::String(s.clone()),
            TokenKind::Keyword(KeywordId::True) => Literal::Bool(true),
            TokenKind::Keyword(KeywordId::False) => Literal::Bool(false),
            TokenKind::Keyword(KeywordId::Null) => Literal::Null,
            _ => return None,
        };
        self.advance();
        Some(lit)
    }
}

fn binary(left: Spanned<Expr>, op: BinaryOp, right: Spanned<Expr>) -> Spanned<Expr> {
    let span = left.span.merge(right.span);
    Spanned::new(Expr::Binary(Box::new(left), op, Box::new(right)), span)
}
