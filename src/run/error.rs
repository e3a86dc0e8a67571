//! Errors reported while evaluating a call script.

use crate::ast::Span;
use crate::error;
use crate::resolve;
use std::io;

/// A call that could not be looked up at all.
///
/// Calls that name a real intrinsic but match none of its overloads are not
/// errors at this level: their diagnostics go into the transcript.
#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub span: Span,
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum ErrorKind {
    /// No builtin function or type has this name.
    UnknownName(String),

    /// No operator is spelled with this symbol and number of operands.
    UnknownOperator { symbol: String, operands: usize },

    /// A vector, matrix, or atomic component that isn't a scalar.
    NotScalar { constructor: &'static str },

    /// The resolver broke one of its own invariants.
    Resolve(resolve::Error),
}

impl error::AriadneReport for Error {
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
        let mut builder = Report::<Span>::build(ReportKind::Error, source_id, range.start)
            .with_config(config.clone());

        let label = match self.kind {
            ErrorKind::UnknownName(ref name) => {
                builder.set_message(format!("no builtin function or type named `{name}`"));
                "unknown name"
            }
            ErrorKind::UnknownOperator {
                ref symbol,
                operands,
            } => {
                let arity = if operands == 1 { "unary" } else { "binary" };
                builder.set_message(format!("no {arity} operator `{symbol}`"));
                if operands > 2 {
                    builder.set_help("operators take one or two operands");
                }
                "unknown operator"
            }
            ErrorKind::NotScalar { constructor } => {
                builder.set_message(format!("`{constructor}` components must be scalar types"));
                "not a scalar"
            }
            ErrorKind::Resolve(ref inner) => {
                return error::AriadneReport::write_with_config(inner, stream, cache, config);
            }
        };

        builder.add_label(ariadne::Label::new(self.span.clone()).with_message(label));
        let report = builder.finish();
        report.write(cache, stream)
    }
}
