//! Scoring one overload against a call.
//!
//! A candidate's score is zero if it matches the call. Otherwise the score
//! says how far off it was, which orders the candidate list of a "no matching
//! call" diagnostic: fewer wrong parameters sort first.

use super::Parameter;
use crate::table::{Members, Number, OverloadInfo, Pattern, Table, TemplateKind};
use crate::ty::{
    Access, AddressSpace, Enumerant, Handle, Rank, Scalar, Stage, TexelFormat, Texture, Type,
    Types, VectorSize,
};

const PARAM_COUNT_PENALTY: usize = 3;
const EXPLICIT_COUNT_PENALTY: usize = 10;
const PARAM_TYPE_PENALTY: usize = 2;
const EXPLICIT_TYPE_PENALTY: usize = 1;
const INFERRED_TEMPLATE_PENALTY: usize = 1;

/// The order in which constraint members are tried when an inferred template
/// is finalized. The first member that accepts the binding replaces it.
const PRECEDENCE: &[Scalar] = &[
    Scalar::AbstractInt,
    Scalar::AbstractFloat,
    Scalar::I32,
    Scalar::U32,
    Scalar::F32,
    Scalar::F16,
    Scalar::Bool,
];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum Mode {
    /// Give up at the first mismatch. Used for the pass that finds matches.
    EarlyReject,
    /// Accumulate every penalty. Used to order the candidates of a
    /// diagnostic.
    Full,
}

/// The argument side of a match: what the call supplied.
pub(super) struct Call<'a> {
    pub template_args: &'a [Handle],
    pub args: &'a [Handle],
    pub stage: Stage,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Binding {
    Unbound,
    Type(Handle),
    Number(u32),
}

#[derive(Debug)]
pub(super) struct Candidate<'t> {
    pub info: &'t OverloadInfo,

    /// Position in declaration order.
    pub index: usize,

    pub score: usize,

    /// The parameters, built from the final template bindings. Empty unless
    /// `score` is zero.
    pub parameters: Vec<Parameter>,
    pub return_type: Option<Handle>,

    /// True if finalizing a template replaced an abstract binding with a
    /// concrete type.
    pub defaulted: bool,
}

/// Score `info` against `call`.
///
/// Errors are internal invariant violations, described as text.
pub(super) fn score<'t>(
    table: &Table,
    types: &mut Types,
    info: &'t OverloadInfo,
    index: usize,
    call: &Call,
    mode: Mode,
) -> Result<Candidate<'t>, String> {
    let mut candidate = Candidate {
        info,
        index,
        score: 0,
        parameters: vec![],
        return_type: None,
        defaulted: false,
    };

    macro_rules! mismatch {
        ($penalty:expr) => {
            match mode {
                Mode::EarlyReject => {
                    candidate.score = 1;
                    return Ok(candidate);
                }
                Mode::Full => candidate.score += $penalty,
            }
        };
    }

    let mut matcher = Matcher {
        table,
        types,
        info,
        stage: call.stage,
        bindings: vec![Binding::Unbound; info.templates.len()],
        defaulted: false,
    };

    let num_params = info.parameters.len();
    let num_args = call.args.len();
    if num_params != num_args {
        mismatch!(PARAM_COUNT_PENALTY * num_params.abs_diff(num_args));
    }

    // With no template arguments, an overload whose explicit templates all
    // appear in its parameters infers them.
    let supplied = call.template_args;
    let infer_explicit = supplied.is_empty() && info.infers_explicit;
    if candidate.score == 0 && supplied.len() != info.num_explicit && !infer_explicit {
        mismatch!(EXPLICIT_COUNT_PENALTY * info.num_explicit.abs_diff(supplied.len()));
    }

    if !supplied.is_empty() && supplied.len() == info.num_explicit {
        if candidate.score == 0 {
            for (index, &ty) in supplied.iter().enumerate() {
                if !matcher.bind_explicit(index, ty) {
                    mismatch!(EXPLICIT_TYPE_PENALTY);
                }
            }
        } else {
            for (binding, &ty) in matcher.bindings.iter_mut().zip(supplied) {
                *binding = Binding::Type(ty);
            }
        }
    }

    // Inferred templates bind and refine here; their constraints are
    // checked once every parameter has been seen.
    for (param, &arg) in info.parameters.iter().zip(call.args) {
        if matcher.match_type(&param.pattern, arg).is_none() {
            mismatch!(PARAM_TYPE_PENALTY);
        }
    }

    let first_inferred = if infer_explicit { 0 } else { info.num_explicit };
    if candidate.score == 0 {
        for index in first_inferred..info.templates.len() {
            if !matcher.finalize(index) {
                mismatch!(INFERRED_TEMPLATE_PENALTY);
            }
        }
    }

    if candidate.score != 0 {
        return Ok(candidate);
    }

    // Match each parameter again against the finalized bindings to get the
    // types the arguments convert to.
    for (param, &arg) in info.parameters.iter().zip(call.args) {
        let ty = matcher.match_type(&param.pattern, arg).ok_or_else(|| {
            format!(
                "parameter {} no longer matches after templates were finalized",
                candidate.parameters.len()
            )
        })?;
        candidate.parameters.push(Parameter {
            ty,
            usage: param.usage,
        });
    }

    candidate.return_type = match info.return_type {
        Some(ref pattern) => Some(matcher.build(pattern)?),
        None => None,
    };
    candidate.defaulted = matcher.defaulted;

    Ok(candidate)
}

/// True if a value of type `from` may be passed where the constraint member
/// or parameter scalar `to` is expected, at `stage`.
///
/// Abstract members only accept at constant stage, so that runtime calls
/// materialize abstract arguments.
pub(super) fn accepts(to: Scalar, from: Scalar, stage: Stage) -> bool {
    if to.is_abstract() && stage != Stage::Constant {
        return false;
    }
    from.conversion_rank(to) != Rank::Never
}

/// Template bindings for one overload, and the matching operations over them.
struct Matcher<'a> {
    table: &'a Table,
    types: &'a mut Types,
    info: &'a OverloadInfo,
    stage: Stage,
    bindings: Vec<Binding>,
    defaulted: bool,
}

impl Matcher<'_> {
    /// Bind explicit template `index` to the supplied type `ty`, if its
    /// constraint allows it.
    fn bind_explicit(&mut self, index: usize, ty: Handle) -> bool {
        let table = self.table;
        let template = match self.info.templates.get(index) {
            Some(template) => template,
            None => return false,
        };
        let bound = match (template.kind, template.constraint) {
            (TemplateKind::Number(_), _) => None,
            (TemplateKind::Type, None) => Some(ty),
            (TemplateKind::Type, Some(constraint)) => {
                match table.constraints.get(constraint).map(|c| &c.members) {
                    Some(Members::Types(members)) => self.select_member(members, ty),
                    _ => None,
                }
            }
        };
        match bound {
            Some(ty) => {
                self.bindings[index] = Binding::Type(ty);
                true
            }
            None => false,
        }
    }

    /// Check inferred template `index` against its constraint, replacing a
    /// type binding with the constraint member chosen by precedence.
    fn finalize(&mut self, index: usize) -> bool {
        let table = self.table;
        let constraint = match self.info.templates.get(index).and_then(|t| t.constraint) {
            Some(constraint) => constraint,
            None => return true,
        };
        let members = match table.constraints.get(constraint) {
            Some(constraint) => &constraint.members,
            None => return false,
        };
        match (members, self.bindings[index]) {
            (Members::Types(members), Binding::Type(bound)) => {
                match self.select_member(members, bound) {
                    Some(chosen) => {
                        if self.types.contains_abstract(bound)
                            && !self.types.contains_abstract(chosen)
                        {
                            self.defaulted = true;
                        }
                        self.bindings[index] = Binding::Type(chosen);
                        true
                    }
                    None => false,
                }
            }
            (Members::Numbers { codes, .. }, Binding::Number(value)) => codes.contains(&value),
            _ => false,
        }
    }

    /// The first member of `members`, in precedence order, that accepts the
    /// scalar type `ty`.
    fn select_member(&mut self, members: &[Scalar], ty: Handle) -> Option<Handle> {
        let scalar = self.types.as_scalar(ty)?;
        let chosen = PRECEDENCE
            .iter()
            .copied()
            .filter(|member| members.contains(member))
            .find(|&member| accepts(member, scalar, self.stage))?;
        Some(self.types.scalar(chosen))
    }

    /// Match `arg` against `pattern`, binding or refining templates as
    /// needed. Returns the type `arg` converts to.
    fn match_type(&mut self, pattern: &Pattern, arg: Handle) -> Option<Handle> {
        let ty = self.types.get(arg).clone();
        match (pattern, ty) {
            (&Pattern::Template(index), _) => self.bind_type(index, arg),
            (&Pattern::Scalar(scalar), Type::Scalar(from)) => {
                if accepts(scalar, from, self.stage) {
                    Some(self.types.scalar(scalar))
                } else {
                    None
                }
            }
            (
                &Pattern::Vector { size, ref element },
                Type::Vector {
                    size: arg_size,
                    element: arg_element,
                },
            ) => {
                if !self.match_number(size, arg_size as u32) {
                    return None;
                }
                let element = self.match_type(element, arg_element)?;
                Some(self.types.vector(arg_size, element))
            }
            (
                &Pattern::Matrix {
                    columns,
                    rows,
                    ref element,
                },
                Type::Matrix {
                    columns: arg_columns,
                    rows: arg_rows,
                    element: arg_element,
                },
            ) => {
                if !self.match_number(columns, arg_columns as u32)
                    || !self.match_number(rows, arg_rows as u32)
                {
                    return None;
                }
                let element = self.match_type(element, arg_element)?;
                Some(self.types.matrix(arg_columns, arg_rows, element))
            }
            (Pattern::Atomic(element), Type::Atomic(arg_element)) => {
                let element = self.match_type(element, arg_element)?;
                Some(self.types.insert(Type::Atomic(element)))
            }
            (
                Pattern::RuntimeArray(element),
                Type::Array {
                    element: arg_element,
                    count: None,
                },
            ) => {
                let element = self.match_type(element, arg_element)?;
                Some(self.types.insert(Type::Array {
                    element,
                    count: None,
                }))
            }
            (
                &Pattern::Pointer {
                    space,
                    ref store,
                    access,
                },
                Type::Pointer {
                    space: arg_space,
                    store: arg_store,
                    access: arg_access,
                },
            ) => {
                if !self.match_number(space, arg_space.code())
                    || !self.match_number(access, arg_access.code())
                {
                    return None;
                }
                let store = self.match_type(store, arg_store)?;
                Some(self.types.pointer(arg_space, store, arg_access))
            }
            (&Pattern::Sampler { comparison }, Type::Sampler { comparison: arg_comparison })
                if comparison == arg_comparison =>
            {
                Some(arg)
            }
            (
                &Pattern::SampledTexture {
                    dim,
                    multisampled,
                    ref sampled,
                },
                Type::Texture(texture),
            ) => {
                let (arg_dim, arg_sampled, arg_multisampled) = match texture {
                    Texture::Sampled { dim, sampled } => (dim, sampled, false),
                    Texture::Multisampled { dim, sampled } => (dim, sampled, true),
                    _ => return None,
                };
                if arg_dim != dim || arg_multisampled != multisampled {
                    return None;
                }
                let sampled = self.match_type(sampled, arg_sampled)?;
                Some(self.types.texture(if multisampled {
                    Texture::Multisampled { dim, sampled }
                } else {
                    Texture::Sampled { dim, sampled }
                }))
            }
            (&Pattern::DepthTexture { dim, multisampled }, Type::Texture(texture)) => {
                match texture {
                    Texture::Depth(arg_dim) if !multisampled && arg_dim == dim => Some(arg),
                    Texture::DepthMultisampled(arg_dim) if multisampled && arg_dim == dim => {
                        Some(arg)
                    }
                    _ => None,
                }
            }
            (
                &Pattern::StorageTexture {
                    dim,
                    format,
                    access,
                },
                Type::Texture(Texture::Storage {
                    dim: arg_dim,
                    format: arg_format,
                    access: arg_access,
                }),
            ) => {
                let matched = arg_dim == dim
                    && self.match_number(format, arg_format.code())
                    && self.match_number(access, arg_access.code());
                matched.then_some(arg)
            }
            (Pattern::ExternalTexture, Type::Texture(Texture::External)) => Some(arg),
            _ => None,
        }
    }

    /// Bind type template `index` to `arg`, or refine its binding to the
    /// common type of both.
    fn bind_type(&mut self, index: usize, arg: Handle) -> Option<Handle> {
        let refined = match *self.bindings.get(index)? {
            Binding::Unbound => arg,
            Binding::Type(bound) => self.types.common(bound, arg)?,
            Binding::Number(_) => return None,
        };
        self.bindings[index] = Binding::Type(refined);
        Some(refined)
    }

    fn match_number(&mut self, number: Number, value: u32) -> bool {
        match number {
            Number::Fixed(fixed) => fixed == value,
            Number::Template(index) => match self.bindings.get(index) {
                Some(Binding::Unbound) => {
                    self.bindings[index] = Binding::Number(value);
                    true
                }
                Some(&Binding::Number(bound)) => bound == value,
                _ => false,
            },
        }
    }

    /// Instantiate `pattern` with the current bindings.
    fn build(&mut self, pattern: &Pattern) -> Result<Handle, String> {
        Ok(match *pattern {
            Pattern::Template(index) => match self.bindings.get(index) {
                Some(&Binding::Type(ty)) => ty,
                _ => return Err(format!("template `{}` is not bound", self.template_name(index))),
            },
            Pattern::Scalar(scalar) => self.types.scalar(scalar),
            Pattern::Vector { size, ref element } => {
                let size = self.build_size(size)?;
                let element = self.build(element)?;
                self.types.vector(size, element)
            }
            Pattern::Matrix {
                columns,
                rows,
                ref element,
            } => {
                let columns = self.build_size(columns)?;
                let rows = self.build_size(rows)?;
                let element = self.build(element)?;
                self.types.matrix(columns, rows, element)
            }
            Pattern::Atomic(ref element) => {
                let element = self.build(element)?;
                self.types.insert(Type::Atomic(element))
            }
            Pattern::RuntimeArray(ref element) => {
                let element = self.build(element)?;
                self.types.insert(Type::Array {
                    element,
                    count: None,
                })
            }
            Pattern::Pointer {
                space,
                ref store,
                access,
            } => {
                let space = self.build_enumerant::<AddressSpace>(space)?;
                let store = self.build(store)?;
                let access = self.build_enumerant::<Access>(access)?;
                self.types.pointer(space, store, access)
            }
            Pattern::Sampler { comparison } => self.types.insert(Type::Sampler { comparison }),
            Pattern::SampledTexture {
                dim,
                multisampled,
                ref sampled,
            } => {
                let sampled = self.build(sampled)?;
                self.types.texture(if multisampled {
                    Texture::Multisampled { dim, sampled }
                } else {
                    Texture::Sampled { dim, sampled }
                })
            }
            Pattern::DepthTexture { dim, multisampled } => self.types.texture(if multisampled {
                Texture::DepthMultisampled(dim)
            } else {
                Texture::Depth(dim)
            }),
            Pattern::StorageTexture {
                dim,
                format,
                access,
            } => {
                let format = self.build_enumerant::<TexelFormat>(format)?;
                let access = self.build_enumerant::<Access>(access)?;
                self.types.texture(Texture::Storage {
                    dim,
                    format,
                    access,
                })
            }
            Pattern::ExternalTexture => self.types.texture(Texture::External),
            Pattern::ModfResult(ref fract) => {
                let fract = self.build(fract)?;
                self.types.modf_result(fract)
            }
            Pattern::FrexpResult(ref fract) => {
                let fract = self.build(fract)?;
                self.types.frexp_result(fract)
            }
            Pattern::AtomicCompareExchangeResult(ref value) => {
                let value = self.build(value)?;
                self.types.atomic_compare_exchange_result(value)
            }
        })
    }

    fn build_number(&self, number: Number) -> Result<u32, String> {
        match number {
            Number::Fixed(value) => Ok(value),
            Number::Template(index) => match self.bindings.get(index) {
                Some(&Binding::Number(value)) => Ok(value),
                _ => Err(format!("template `{}` is not bound", self.template_name(index))),
            },
        }
    }

    fn build_size(&self, number: Number) -> Result<VectorSize, String> {
        let value = self.build_number(number)?;
        VectorSize::from_u32(value).ok_or_else(|| format!("{} is not a vector size", value))
    }

    fn build_enumerant<E: Enumerant>(&self, number: Number) -> Result<E, String> {
        let code = self.build_number(number)?;
        E::from_code(code).ok_or_else(|| format!("{} is not a valid enumerant code", code))
    }

    fn template_name(&self, index: usize) -> &str {
        self.info
            .templates
            .get(index)
            .map_or("?", |template| template.name.as_str())
    }
}
