//! Overload resolution.
//!
//! Given an intrinsic, the types of a call's arguments, and the stage at
//! which the call is evaluated, pick the overload from the [`Table`] that the
//! call refers to, and compute the types its parameters and result take.
//!
//! Every lookup runs the same driver:
//!
//! 1. Each overload is scored against the call in declaration order, giving
//!    up on an overload at its first mismatch. See [`matcher`].
//!
//! 2. If nothing matched, every overload is scored again in full, and the
//!    candidates are listed in the diagnostic from closest to farthest.
//!
//! 3. If several overloads matched, the one whose parameters need the least
//!    conversion wins. Constructors beat conversions of equal rank. Any
//!    remaining tie goes to the earliest declaration, with a warning.
//!
//! 4. At runtime stage, abstract types left in the result are replaced by
//!    their defaults.

mod error;
mod matcher;
mod print;

#[cfg(test)]
mod tests;

pub use error::{Error, ErrorKind};
pub use print::{call_signature, overload as print_overload};

use crate::ast::Span;
use crate::table::{
    self, BinaryOp, BuiltinFn, CtorConv, OverloadInfo, ParameterUsage, Table, UnaryOp,
};
use crate::ty::{Handle, Rank, Stage, Types};
use matcher::{Call, Candidate, Mode};

pub type Result<T> = std::result::Result<T, Error>;

/// How the chosen overload was picked from those that matched.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    /// It was the only match.
    Unique,
    /// Its parameters needed less conversion than the others'.
    Rank,
    /// It tied with a conversion of the same type, and constructors win.
    ConstructorPreferred,
    /// It tied, and was declared first.
    DeclarationOrder,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Parameter {
    pub ty: Handle,
    pub usage: Option<ParameterUsage>,
}

/// A resolved call.
#[derive(Debug)]
pub struct Overload<'t> {
    pub info: &'t OverloadInfo,
    pub return_type: Option<Handle>,
    pub parameters: Vec<Parameter>,

    /// The constant evaluation function, passed along from the table.
    pub const_eval: Option<&'t str>,

    pub decided_by: Decision,

    /// True if an abstract type was made concrete to resolve the call.
    pub defaulted: bool,
}

/// The kind of thing being called, which decides how a failure is worded.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Family {
    Function,
    Operator,
    CtorConv,
}

/// The overloads a call chooses from, and the name they print under.
struct Intrinsic<'t> {
    name: String,
    overloads: &'t [OverloadInfo],
    family: Family,
}

/// Ambient state for overload resolution.
///
/// The table is only read. New types, like the result types of calls, are
/// interned in `types`.
pub struct Context<'t, 'ty> {
    pub table: &'t Table,
    pub types: &'ty mut Types,
}

impl<'t, 'ty> Context<'t, 'ty> {
    pub fn new(table: &'t Table, types: &'ty mut Types) -> Self {
        Context { table, types }
    }

    /// Resolve a call to the builtin function `builtin`.
    pub fn lookup_fn(
        &mut self,
        builtin: BuiltinFn,
        template_args: &[Handle],
        args: &[Handle],
        stage: Stage,
        span: Span,
    ) -> Result<Overload<'t>> {
        let intrinsic = Intrinsic {
            name: self.table.builtin_name(builtin).to_string(),
            overloads: self.table.builtin_overloads(builtin),
            family: Family::Function,
        };
        self.match_intrinsic(&intrinsic, template_args, args, stage, span)
    }

    /// Resolve an application of the unary operator `op`.
    pub fn lookup_unary(
        &mut self,
        op: UnaryOp,
        arg: Handle,
        stage: Stage,
        span: Span,
    ) -> Result<Overload<'t>> {
        let intrinsic = Intrinsic {
            name: table::unary_name(op),
            overloads: self.table.unary_overloads(op),
            family: Family::Operator,
        };
        self.match_intrinsic(&intrinsic, &[], &[arg], stage, span)
    }

    /// Resolve an application of the binary operator `op`.
    ///
    /// If `is_compound` is set, the call is the compound assignment `lhs op=
    /// rhs`. This only changes how the operator is named in diagnostics.
    pub fn lookup_binary(
        &mut self,
        op: BinaryOp,
        lhs: Handle,
        rhs: Handle,
        stage: Stage,
        span: Span,
        is_compound: bool,
    ) -> Result<Overload<'t>> {
        let intrinsic = Intrinsic {
            name: table::binary_name(op, is_compound),
            overloads: self.table.binary_overloads(op),
            family: Family::Operator,
        };
        self.match_intrinsic(&intrinsic, &[], &[lhs, rhs], stage, span)
    }

    /// Resolve a value constructor or conversion, like `vec3<f32>(x)`.
    pub fn lookup_ctor_conv(
        &mut self,
        ctor_conv: CtorConv,
        template_args: &[Handle],
        args: &[Handle],
        stage: Stage,
        span: Span,
    ) -> Result<Overload<'t>> {
        let intrinsic = Intrinsic {
            name: self.table.ctor_conv_name(ctor_conv).to_string(),
            overloads: self.table.ctor_conv_overloads(ctor_conv),
            family: Family::CtorConv,
        };
        self.match_intrinsic(&intrinsic, template_args, args, stage, span)
    }

    fn match_intrinsic(
        &mut self,
        intrinsic: &Intrinsic<'t>,
        template_args: &[Handle],
        args: &[Handle],
        stage: Stage,
        span: Span,
    ) -> Result<Overload<'t>> {
        // Arguments are loaded through references before matching.
        let args: Vec<Handle> = args.iter().map(|&arg| self.types.unwrap_ref(arg)).collect();
        let call = Call {
            template_args,
            args: &args,
            stage,
        };
        let signature = call_signature(&intrinsic.name, template_args, &args, self.types);
        let internal = |detail: String| Error {
            kind: ErrorKind::Internal {
                signature: signature.clone(),
                detail,
            },
            span: span.clone(),
        };

        let mut matched = vec![];
        for (index, info) in intrinsic.overloads.iter().enumerate() {
            let candidate = matcher::score(
                self.table,
                self.types,
                info,
                index,
                &call,
                Mode::EarlyReject,
            )
            .map_err(&internal)?;
            log::trace!(
                "{}: candidate {} scored {}",
                signature,
                index,
                candidate.score
            );
            if candidate.score == 0 {
                matched.push(candidate);
            }
        }

        if matched.is_empty() {
            let message = self
                .no_match_message(intrinsic, &call, &signature)
                .map_err(&internal)?;
            return Err(Error {
                kind: ErrorKind::NoMatch { signature, message },
                span,
            });
        }

        log::debug!("{}: {} candidates matched", signature, matched.len());
        let (chosen, decided_by) = self
            .choose(intrinsic, matched, &args, &signature)
            .ok_or_else(|| internal("no candidate left to choose".to_string()))?;

        let Candidate {
            info,
            mut parameters,
            mut return_type,
            mut defaulted,
            ..
        } = chosen;

        // Abstract types cannot survive to runtime.
        if stage == Stage::Runtime {
            for param in &mut parameters {
                let concrete = self.types.default_type(param.ty);
                defaulted |= concrete != param.ty;
                param.ty = concrete;
            }
            if let Some(ty) = return_type {
                let concrete = self.types.default_type(ty);
                defaulted |= concrete != ty;
                return_type = Some(concrete);
            }
        }

        log::debug!(
            "{}: resolved to {} ({:?}{})",
            signature,
            print_overload(&intrinsic.name, info, self.table),
            decided_by,
            if defaulted { ", defaulted" } else { "" }
        );

        Ok(Overload {
            info,
            return_type,
            parameters,
            const_eval: info.const_eval.as_deref(),
            decided_by,
            defaulted,
        })
    }

    /// Pick one of several matching candidates.
    fn choose(
        &self,
        intrinsic: &Intrinsic<'t>,
        matched: Vec<Candidate<'t>>,
        args: &[Handle],
        signature: &str,
    ) -> Option<(Candidate<'t>, Decision)> {
        if matched.len() == 1 {
            return matched.into_iter().next().map(|c| (c, Decision::Unique));
        }

        // A candidate is only as good as its worst parameter.
        let ranks: Vec<Rank> = matched
            .iter()
            .map(|candidate| {
                candidate
                    .parameters
                    .iter()
                    .zip(args)
                    .map(|(param, &arg)| self.types.conversion_rank(arg, param.ty))
                    .max()
                    .unwrap_or(Rank::Exact)
            })
            .collect();
        let best = ranks.iter().copied().min()?;
        let mut tied: Vec<Candidate<'t>> = matched
            .into_iter()
            .zip(ranks)
            .filter(|&(_, rank)| rank == best)
            .map(|(candidate, _)| candidate)
            .collect();
        if tied.len() == 1 {
            return tied.pop().map(|c| (c, Decision::Rank));
        }

        let has_ctor = tied.iter().any(|c| c.info.is_constructor());
        let has_conv = tied.iter().any(|c| c.info.is_converter());
        if has_ctor && has_conv {
            tied.retain(|c| c.info.is_constructor());
            if tied.len() == 1 {
                return tied.pop().map(|c| (c, Decision::ConstructorPreferred));
            }
        }

        let mut message = format!(
            "ambiguous overload while attempting to match {}",
            signature
        );
        for candidate in &tied {
            message.push_str("\n  ");
            message.push_str(&print_overload(&intrinsic.name, candidate.info, self.table));
        }
        log::warn!("{}", message);

        tied.into_iter()
            .next()
            .map(|c| (c, Decision::DeclarationOrder))
    }

    /// Score every overload in full and list them, closest first.
    fn no_match_message(
        &mut self,
        intrinsic: &Intrinsic<'t>,
        call: &Call,
        signature: &str,
    ) -> std::result::Result<String, String> {
        let mut candidates = intrinsic
            .overloads
            .iter()
            .enumerate()
            .map(|(index, info)| {
                matcher::score(self.table, self.types, info, index, call, Mode::Full)
            })
            .collect::<std::result::Result<Vec<_>, String>>()?;
        for candidate in &candidates {
            log::trace!(
                "{}: candidate {} scored {} in full",
                signature,
                candidate.index,
                candidate.score
            );
        }
        candidates.sort_by_key(|candidate| candidate.score);

        let mut message = match intrinsic.family {
            Family::Function => format!("no matching call to {}\n", signature),
            Family::Operator => format!("no matching overload for {}\n", signature),
            Family::CtorConv => format!("no matching constructor for {}\n", signature),
        };

        let mut list = |what: &str, infos: Vec<&OverloadInfo>| {
            if infos.is_empty() {
                return;
            }
            message.push_str(&format!(
                "\n{} candidate {}{}:\n",
                infos.len(),
                what,
                if infos.len() > 1 { "s" } else { "" }
            ));
            for info in infos {
                message.push_str("  ");
                message.push_str(&print_overload(&intrinsic.name, info, self.table));
                message.push('\n');
            }
        };

        let infos = candidates.iter().map(|candidate| candidate.info);
        match intrinsic.family {
            Family::Function => list("function", infos.collect()),
            Family::Operator => list("operator", infos.collect()),
            Family::CtorConv => {
                let (ctors, convs): (Vec<_>, Vec<_>) =
                    infos.partition(|info| !info.is_converter());
                list("constructor", ctors);
                list("conversion", convs);
            }
        }

        Ok(message)
    }
}
