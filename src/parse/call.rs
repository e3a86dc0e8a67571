use super::error::{ParseError, ParseErrorKind};
use super::Context;
use crate::ast::{self, join_spans};
use crate::lex::TokenKind;

impl<'s> Context<'s> {
    pub fn parse_call(&mut self) -> Result<ast::Call, ParseError> {
        let start = self.peek().span.clone();

        let stage = if let Some(span) = self.take_if(&TokenKind::Const)? {
            Some((ast::StageKeyword::Const, span))
        } else {
            self.take_if(&TokenKind::Runtime)?
                .map(|span| (ast::StageKeyword::Runtime, span))
        };

        let target = if let Some(operator_span) = self.take_if(&TokenKind::Operator)? {
            let found = self.peek().kind.description();
            match self.take_symbols(&['('])? {
                Some((symbol, span)) => ast::Target::Operator { symbol, span },
                None => {
                    return Err(ParseError {
                        kind: ParseErrorKind::Expected {
                            what: "operator symbol",
                            found,
                        },
                        span: join_spans(&operator_span, &self.peek().span),
                    })
                }
            }
        } else {
            let (name, span) = self.expect_ident("builtin function or type name")?;
            ast::Target::Named {
                name: name.to_string(),
                span,
            }
        };

        let template_args = if self.take_if(&TokenKind::Symbol('<'))?.is_some() {
            let (args, _close) =
                self.parse_list('>', "to close template argument list", |ctx| ctx.expect_type())?;
            args
        } else {
            vec![]
        };

        self.expect_symbol('(', "to start argument list")?;
        let (args, close) =
            self.parse_list(')', "to close argument list", |ctx| ctx.expect_type())?;

        Ok(ast::Call {
            stage,
            target,
            template_args,
            args,
            span: join_spans(&start, &close),
        })
    }
}
