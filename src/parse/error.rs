//! Parsing errors.

use crate::ast::Span;
use crate::error;
use crate::lex::{BracketPosition, TokenError};

use std::borrow::Cow;
use std::io;

#[derive(Debug)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum ParseErrorKind {
    LexError(TokenError),
    Expected {
        what: &'static str,
        found: String,
    },
    ExpectedSymbol {
        symbol: char,
        context: &'static str,
        found: String,
    },
    ExpectedType {
        found: String,
    },
    ExpectedTypeParameterBracket {
        constructor: String,
        constructor_span: Span,
        position: BracketPosition,
    },
    UnknownType(String),
    UnknownEnumerant {
        kind: &'static str,
        name: String,
    },
    ArrayLengthZero,
}

impl error::AriadneReport for ParseError {
    fn write_with_config<W>(
        &self,
        stream: W,
        cache: &mut error::Cache,
        config: ariadne::Config,
    ) -> io::Result<()>
    where
        W: io::Write,
    {
        use ariadne::{Report, ReportKind};

        let (source_id, range) = self.span.clone();
        let mut builder =
            Report::build(ReportKind::Error, source_id, range.start).with_config(config);

        let label: Cow<'static, str> = match self.kind {
            ParseErrorKind::LexError(ref lex_error) => {
                builder.set_message(lex_error.message());
                "bad token".into()
            }
            ParseErrorKind::Expected { what, ref found } => {
                builder.set_message(format!("Expected {}, found {}", what, found));
                format!("expected {} here", what).into()
            }
            ParseErrorKind::ExpectedSymbol {
                symbol,
                context,
                ref found,
            } => {
                builder.set_message(format!(
                    "Expected `{}` {}, found {}",
                    symbol, context, found
                ));
                format!("expected `{}` here", symbol).into()
            }
            ParseErrorKind::ExpectedType { ref found } => {
                builder.set_message(format!("Expected a type, found {}", found));
                builder.set_help(
                    "Types are written as in WGSL, like `vec3<f32>`, \
                     or as `abstract-int` and `abstract-float`.",
                );
                "expected type here".into()
            }
            ParseErrorKind::ExpectedTypeParameterBracket {
                ref constructor,
                ref constructor_span,
                position,
            } => {
                let description = position.angle_description();
                builder.set_message(format!(
                    "Expected {} for `{}` type parameter",
                    description, constructor
                ));
                builder.add_label(
                    ariadne::Label::new(constructor_span.clone())
                        .with_message("type constructor"),
                );
                builder.set_help(format!(
                    "Type parameters are surrounded by `<` and `>` characters, like `{}<f32>`.",
                    constructor
                ));
                format!("expected {} bracket here", description).into()
            }
            ParseErrorKind::UnknownType(ref name) => {
                builder.set_message(format!("Unknown type `{}`", name));
                "not a type".into()
            }
            ParseErrorKind::UnknownEnumerant { kind, ref name } => {
                builder.set_message(format!("`{}` is not a valid {}", name, kind));
                format!("expected {} here", kind).into()
            }
            ParseErrorKind::ArrayLengthZero => {
                builder.set_message("Array length must be greater than zero");
                "zero-length array".into()
            }
        };

        builder.add_label(ariadne::Label::new(self.span.clone()).with_message(label));

        let report = builder.finish();
        report.write(cache, stream)
    }
}

impl From<TokenError> for ParseError {
    fn from(token_error: TokenError) -> Self {
        let span = token_error.span.clone();
        ParseError {
            kind: ParseErrorKind::LexError(token_error),
            span,
        }
    }
}
