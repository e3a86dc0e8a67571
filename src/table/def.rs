//! Loading the intrinsic definition file.
//!
//! The definition language is described at the top of `intrinsics.def`. The
//! loader shares its tokenizer and parsing [`Context`] with the call script
//! parser, and checks each overload as it is read, so that the matcher can
//! trust every template reference in the table.

use super::{
    BinaryOp, Constraint, Members, Number, NumberKind, OverloadInfo, OverloadKind, ParameterInfo,
    ParameterUsage, Pattern, PipelineStages, Table, TemplateInfo, TemplateKind, UnaryOp,
};
use crate::ast::Span;
use crate::error;
use crate::lex::TokenKind;
use crate::parse::{self, Context, ParseError, ParseErrorKind};
use crate::ty::{Access, AddressSpace, Enumerant, Scalar, TexelFormat, TextureDimension};

use indexmap::IndexMap;

use std::borrow::Cow;
use std::io;

#[derive(Debug)]
pub struct DefError {
    pub kind: DefErrorKind,
    pub span: Span,
}

#[derive(Debug)]
pub enum DefErrorKind {
    Parse(ParseError),
    UnknownConstraint(String),
    UnknownAttribute(String),
    UnknownStage(String),
    UnknownUsage(String),
    UnknownOperator(String),
    UnknownType(String),
    UnknownValue { kind: NumberKind, name: String },
    DuplicateName { name: String, prior: Span },
    MixedConstraint(String),
    TemplateKind { name: String, expected: &'static str },
    UnusedTemplate(String),
    OperatorArity { symbol: String, count: usize },
    MissingReturnType,
}

impl From<ParseError> for DefError {
    fn from(parse_error: ParseError) -> Self {
        let span = parse_error.span.clone();
        DefError {
            kind: DefErrorKind::Parse(parse_error),
            span,
        }
    }
}

impl error::AriadneReport for DefError {
    fn write_with_config<W>(
        &self,
        stream: W,
        cache: &mut error::Cache,
        config: ariadne::Config,
    ) -> io::Result<()>
    where
        W: io::Write,
    {
        use ariadne::{Label, Report, ReportKind};

        if let DefErrorKind::Parse(ref parse_error) = self.kind {
            return error::AriadneReport::write_with_config(parse_error, stream, cache, config);
        }

        let (source_id, range) = self.span.clone();
        let mut builder =
            Report::build(ReportKind::Error, source_id, range.start).with_config(config);

        let label: Cow<'static, str> = match self.kind {
            DefErrorKind::Parse(_) => "".into(),
            DefErrorKind::UnknownConstraint(ref name) => {
                builder.set_message(format!("Unknown constraint `{}`", name));
                builder.set_help(
                    "Constraints are declared with `match`, or are a scalar type name, \
                     or one of `num`, `access`, `address_space` or `texel_format`.",
                );
                "not a constraint".into()
            }
            DefErrorKind::UnknownAttribute(ref name) => {
                builder.set_message(format!("Unknown attribute `@{}`", name));
                "unrecognized attribute".into()
            }
            DefErrorKind::UnknownStage(ref name) => {
                builder.set_message(format!("Unknown pipeline stage `{}`", name));
                "expected `vertex`, `fragment` or `compute`".into()
            }
            DefErrorKind::UnknownUsage(ref name) => {
                builder.set_message(format!("Unknown parameter usage `{}`", name));
                "unrecognized usage".into()
            }
            DefErrorKind::UnknownOperator(ref symbol) => {
                builder.set_message(format!("Unknown operator `{}`", symbol));
                "no such operator with this many operands".into()
            }
            DefErrorKind::UnknownType(ref name) => {
                builder.set_message(format!("`{}` is not a type or a type template", name));
                "unknown type".into()
            }
            DefErrorKind::UnknownValue { kind, ref name } => {
                builder.set_message(format!(
                    "`{}` is not {}, or a template standing for one",
                    name,
                    kind.description()
                ));
                format!("expected {} here", kind.description()).into()
            }
            DefErrorKind::DuplicateName {
                ref name,
                ref prior,
            } => {
                builder.set_message(format!("`{}` is declared twice", name));
                builder.add_label(Label::new(prior.clone()).with_message("first declared here"));
                "declared again here".into()
            }
            DefErrorKind::MixedConstraint(ref name) => {
                builder.set_message(format!(
                    "Constraint `{}` mixes members of different kinds",
                    name
                ));
                "member of a different kind".into()
            }
            DefErrorKind::TemplateKind {
                ref name,
                expected,
            } => {
                builder.set_message(format!("Template `{}` is used where {} was expected", name, expected));
                format!("expected {} here", expected).into()
            }
            DefErrorKind::UnusedTemplate(ref name) => {
                builder.set_message(format!(
                    "Implicit template `{}` is not used by any parameter",
                    name
                ));
                builder.set_help(
                    "Templates that cannot be inferred from the arguments \
                     must be explicit, written in `<...>`.",
                );
                "never inferred".into()
            }
            DefErrorKind::OperatorArity { ref symbol, count } => {
                builder.set_message(format!(
                    "Operator `{}` is declared with {} parameters",
                    symbol, count
                ));
                "operators take one or two parameters".into()
            }
            DefErrorKind::MissingReturnType => {
                builder.set_message("Operators, constructors and conversions must return a value");
                "expected `->` here".into()
            }
        };

        builder.add_label(Label::new(self.span.clone()).with_message(label));
        builder.finish().write(cache, stream)
    }
}

pub(crate) fn parse(source: &str, source_id: usize) -> Result<Table, DefError> {
    let mut loader = Loader {
        context: Context::new(source, source_id)?,
        table: Table::default(),
        constraints: IndexMap::new(),
    };

    while loader.context.peek().kind != TokenKind::End {
        loader.parse_declaration()?;
    }

    Ok(loader.table)
}

struct Loader<'s> {
    context: Context<'s>,
    table: Table,

    /// Constraint names, mapped to their index in `table.constraints` and
    /// the span of their declaration.
    constraints: IndexMap<String, (usize, Span)>,
}

#[derive(Default)]
struct Attributes {
    must_use: bool,
    deprecated: bool,
    is_const: bool,
    const_name: Option<String>,
    stages: Option<PipelineStages>,
}

/// The templates of the overload being read.
#[derive(Default)]
struct Templates {
    infos: Vec<TemplateInfo>,
    spans: Vec<Span>,
    used: Vec<bool>,
}

impl Templates {
    fn find(&self, name: &str) -> Option<usize> {
        self.infos.iter().position(|info| info.name == name)
    }
}

enum Member {
    Type(Scalar),
    Number(NumberKind, u32),
}

/// The scalar named `name`. The definition file writes the abstract types
/// as `ia` and `fa`.
fn scalar_named(name: &str) -> Option<Scalar> {
    match name {
        "ia" => Some(Scalar::AbstractInt),
        "fa" => Some(Scalar::AbstractFloat),
        _ => parse::scalar_from_name(name),
    }
}

fn member_named(name: &str) -> Option<Member> {
    if let Some(scalar) = scalar_named(name) {
        return Some(Member::Type(scalar));
    }
    if let Some(space) = AddressSpace::from_name(name) {
        return Some(Member::Number(NumberKind::AddressSpace, space.code()));
    }
    if let Some(access) = Access::from_name(name) {
        return Some(Member::Number(NumberKind::Access, access.code()));
    }
    TexelFormat::from_name(name).map(|format| Member::Number(NumberKind::TexelFormat, format.code()))
}

fn enumerant_code(kind: NumberKind, name: &str) -> Option<u32> {
    match kind {
        NumberKind::Count => None,
        NumberKind::AddressSpace => AddressSpace::from_name(name).map(Enumerant::code),
        NumberKind::Access => Access::from_name(name).map(Enumerant::code),
        NumberKind::TexelFormat => TexelFormat::from_name(name).map(Enumerant::code),
    }
}

impl<'s> Loader<'s> {
    fn parse_declaration(&mut self) -> Result<(), DefError> {
        if self.context.take_if(&TokenKind::Match)?.is_some() {
            return self.parse_constraint();
        }

        let attributes = self.parse_attributes()?;
        let token = self.context.next()?;
        match token.kind {
            TokenKind::Fn => {
                let (name, _) = self.context.expect_ident("builtin function name")?;
                let overload = self.parse_overload(OverloadKind::Builtin, name, attributes)?;
                self.table
                    .builtins
                    .entry(name.to_string())
                    .or_default()
                    .push(overload);
            }
            TokenKind::Ctor | TokenKind::Conv => {
                let kind = if token.kind == TokenKind::Ctor {
                    OverloadKind::Constructor
                } else {
                    OverloadKind::Converter
                };
                let (name, _) = self.context.expect_ident("type name")?;
                let overload = self.parse_overload(kind, name, attributes)?;
                self.table
                    .ctor_conv
                    .entry(name.to_string())
                    .or_default()
                    .push(overload);
            }
            TokenKind::Op => {
                let found = self.context.peek().kind.description();
                let (symbol, symbol_span) = match self.context.take_symbols(&['[', '('])? {
                    Some(symbols) => symbols,
                    None => {
                        return Err(ParseError {
                            kind: ParseErrorKind::Expected {
                                what: "operator symbol",
                                found,
                            },
                            span: self.context.peek().span.clone(),
                        }
                        .into())
                    }
                };
                let overload = self.parse_overload(OverloadKind::Operator, &symbol, attributes)?;
                let unknown = || DefError {
                    kind: DefErrorKind::UnknownOperator(symbol.clone()),
                    span: symbol_span.clone(),
                };
                match overload.parameters.len() {
                    1 => {
                        let op = UnaryOp::from_symbol(&symbol).ok_or_else(unknown)?;
                        self.table.unary_ops.entry(op).or_default().push(overload);
                    }
                    2 => {
                        let op = BinaryOp::from_symbol(&symbol).ok_or_else(unknown)?;
                        self.table.binary_ops.entry(op).or_default().push(overload);
                    }
                    count => {
                        return Err(DefError {
                            kind: DefErrorKind::OperatorArity {
                                symbol: symbol.clone(),
                                count,
                            },
                            span: symbol_span.clone(),
                        })
                    }
                }
            }
            ref other => {
                return Err(ParseError {
                    kind: ParseErrorKind::Expected {
                        what: "declaration",
                        found: other.description(),
                    },
                    span: token.span,
                }
                .into())
            }
        }

        Ok(())
    }

    /// Parse `match NAME: MEMBER | MEMBER ...`, after the `match` keyword.
    fn parse_constraint(&mut self) -> Result<(), DefError> {
        let (name, name_span) = self.context.expect_ident("constraint name")?;
        if let Some((_, prior)) = self.constraints.get(name) {
            return Err(DefError {
                kind: DefErrorKind::DuplicateName {
                    name: name.to_string(),
                    prior: prior.clone(),
                },
                span: name_span,
            });
        }
        self.context.expect_symbol(':', "after constraint name")?;

        let mut members = match self.parse_member()? {
            Member::Type(scalar) => Members::Types(vec![scalar]),
            Member::Number(kind, code) => Members::Numbers {
                kind,
                codes: vec![code],
            },
        };
        while self.context.take_if(&TokenKind::Symbol('|'))?.is_some() {
            let span = self.context.peek().span.clone();
            match (&mut members, self.parse_member()?) {
                (Members::Types(scalars), Member::Type(scalar)) => scalars.push(scalar),
                (Members::Numbers { kind, codes }, Member::Number(member_kind, code))
                    if *kind == member_kind =>
                {
                    codes.push(code)
                }
                _ => {
                    return Err(DefError {
                        kind: DefErrorKind::MixedConstraint(name.to_string()),
                        span,
                    })
                }
            }
        }

        self.add_constraint(name, members, name_span);
        Ok(())
    }

    fn parse_member(&mut self) -> Result<Member, DefError> {
        let (name, span) = self.context.expect_ident("constraint member")?;
        member_named(name).ok_or(DefError {
            kind: DefErrorKind::UnknownType(name.to_string()),
            span,
        })
    }

    fn add_constraint(&mut self, name: &str, members: Members, span: Span) -> usize {
        let index = self.table.constraints.len();
        self.table.constraints.push(Constraint {
            name: name.to_string(),
            members,
        });
        self.constraints.insert(name.to_string(), (index, span));
        index
    }

    fn parse_attributes(&mut self) -> Result<Attributes, DefError> {
        let mut attributes = Attributes::default();
        while self.context.take_if(&TokenKind::Symbol('@'))?.is_some() {
            // `const` lexes as a keyword for call scripts.
            let (name, span) = match self.context.take_if(&TokenKind::Const)? {
                Some(span) => ("const", span),
                None => self.context.expect_ident("attribute name")?,
            };
            match name {
                "must_use" => attributes.must_use = true,
                "deprecated" => attributes.deprecated = true,
                "const" => {
                    attributes.is_const = true;
                    if self.context.take_if(&TokenKind::Symbol('('))?.is_some() {
                        let (const_name, _) =
                            self.context.expect_ident("constant evaluation function")?;
                        attributes.const_name = Some(const_name.to_string());
                        self.context.expect_symbol(')', "to close `@const` attribute")?;
                    }
                }
                "stage" => {
                    self.context.expect_symbol('(', "to open `@stage` attribute")?;
                    let mut stages = PipelineStages {
                        vertex: false,
                        fragment: false,
                        compute: false,
                    };
                    loop {
                        let (stage, span) = self.context.expect_ident("pipeline stage")?;
                        match stage {
                            "vertex" => stages.vertex = true,
                            "fragment" => stages.fragment = true,
                            "compute" => stages.compute = true,
                            _ => {
                                return Err(DefError {
                                    kind: DefErrorKind::UnknownStage(stage.to_string()),
                                    span,
                                })
                            }
                        }
                        if self.context.take_if(&TokenKind::Symbol(','))?.is_none() {
                            self.context.expect_symbol(')', "to close `@stage` attribute")?;
                            break;
                        }
                    }
                    attributes.stages = Some(stages);
                }
                _ => {
                    return Err(DefError {
                        kind: DefErrorKind::UnknownAttribute(name.to_string()),
                        span,
                    })
                }
            }
        }
        Ok(attributes)
    }

    /// Parse everything following an overload's name: templates, parameters,
    /// and return type.
    fn parse_overload(
        &mut self,
        kind: OverloadKind,
        name: &str,
        attributes: Attributes,
    ) -> Result<OverloadInfo, DefError> {
        let mut templates = Templates::default();
        if kind != OverloadKind::Operator && self.context.take_if(&TokenKind::Symbol('<'))?.is_some()
        {
            self.parse_templates('>', &mut templates)?;
        }
        let num_explicit = templates.infos.len();
        if self.context.take_if(&TokenKind::Symbol('['))?.is_some() {
            self.parse_templates(']', &mut templates)?;
        }

        self.context.expect_symbol('(', "to start parameter list")?;
        let mut parameters = vec![];
        loop {
            if self.context.take_if(&TokenKind::Symbol(')'))?.is_some() {
                break;
            }
            parameters.push(self.parse_parameter(&mut templates)?);
            if self.context.take_if(&TokenKind::Symbol(','))?.is_none() {
                self.context.expect_symbol(')', "to close parameter list")?;
                break;
            }
        }

        // Only parameters can bind templates.
        let inferable = templates.used.clone();
        for index in num_explicit..inferable.len() {
            if !inferable[index] {
                return Err(DefError {
                    kind: DefErrorKind::UnusedTemplate(templates.infos[index].name.clone()),
                    span: templates.spans[index].clone(),
                });
            }
        }
        let infers_explicit = inferable[..num_explicit].iter().all(|&used| used);

        let return_type = if self.context.take_if(&TokenKind::Symbol('-'))?.is_some() {
            self.context.expect_symbol('>', "to complete `->`")?;
            Some(self.parse_pattern(&mut templates)?)
        } else {
            if kind != OverloadKind::Builtin {
                return Err(DefError {
                    kind: DefErrorKind::MissingReturnType,
                    span: self.context.peek().span.clone(),
                });
            }
            None
        };

        let const_eval = if attributes.is_const {
            Some(attributes.const_name.unwrap_or_else(|| name.to_string()))
        } else {
            None
        };

        Ok(OverloadInfo {
            kind,
            templates: templates.infos,
            num_explicit,
            infers_explicit,
            parameters,
            return_type,
            must_use: attributes.must_use,
            deprecated: attributes.deprecated,
            stages: attributes.stages.unwrap_or_default(),
            const_eval,
        })
    }

    /// Parse `NAME [: CONSTRAINT], ...` up to and including `close`.
    fn parse_templates(&mut self, close: char, templates: &mut Templates) -> Result<(), DefError> {
        loop {
            if self.context.take_if(&TokenKind::Symbol(close))?.is_some() {
                return Ok(());
            }

            let (name, span) = self.context.expect_ident("template name")?;
            if let Some(prior) = templates.find(name) {
                return Err(DefError {
                    kind: DefErrorKind::DuplicateName {
                        name: name.to_string(),
                        prior: templates.spans[prior].clone(),
                    },
                    span,
                });
            }

            let (kind, constraint) = if self.context.take_if(&TokenKind::Symbol(':'))?.is_some() {
                let (constraint, constraint_span) = self.context.expect_ident("constraint name")?;
                self.template_constraint(constraint, constraint_span)?
            } else {
                (TemplateKind::Type, None)
            };

            templates.infos.push(TemplateInfo {
                name: name.to_string(),
                kind,
                constraint,
            });
            templates.spans.push(span);
            templates.used.push(false);

            if self.context.take_if(&TokenKind::Symbol(','))?.is_none() {
                self.context.expect_symbol(close, "to close template list")?;
                return Ok(());
            }
        }
    }

    fn template_constraint(
        &mut self,
        name: &str,
        span: Span,
    ) -> Result<(TemplateKind, Option<usize>), DefError> {
        let any_of_kind = match name {
            "num" => Some(NumberKind::Count),
            "access" => Some(NumberKind::Access),
            "address_space" => Some(NumberKind::AddressSpace),
            "texel_format" => Some(NumberKind::TexelFormat),
            _ => None,
        };
        if let Some(kind) = any_of_kind {
            return Ok((TemplateKind::Number(kind), None));
        }

        let index = match self.constraints.get(name) {
            Some(&(index, _)) => index,
            None => match scalar_named(name) {
                // A lone scalar type is a constraint with one member.
                Some(scalar) => self.add_constraint(name, Members::Types(vec![scalar]), span),
                None => {
                    return Err(DefError {
                        kind: DefErrorKind::UnknownConstraint(name.to_string()),
                        span,
                    })
                }
            },
        };

        let kind = match self.table.constraints[index].members {
            Members::Types(_) => TemplateKind::Type,
            Members::Numbers { kind, .. } => TemplateKind::Number(kind),
        };
        Ok((kind, Some(index)))
    }

    /// Parse `[usage:] pattern`.
    fn parse_parameter(&mut self, templates: &mut Templates) -> Result<ParameterInfo, DefError> {
        let (name, span) = self.context.expect_ident("parameter")?;
        if self.context.take_if(&TokenKind::Symbol(':'))?.is_some() {
            let usage = ParameterUsage::from_name(name).ok_or(DefError {
                kind: DefErrorKind::UnknownUsage(name.to_string()),
                span,
            })?;
            let pattern = self.parse_pattern(templates)?;
            Ok(ParameterInfo {
                usage: Some(usage),
                pattern,
            })
        } else {
            let pattern = self.parse_pattern_named(name, span, templates)?;
            Ok(ParameterInfo {
                usage: None,
                pattern,
            })
        }
    }

    fn parse_pattern(&mut self, templates: &mut Templates) -> Result<Pattern, DefError> {
        let (name, span) = self.context.expect_ident("type")?;
        self.parse_pattern_named(name, span, templates)
    }

    /// Parse the rest of a pattern whose leading name has been consumed.
    fn parse_pattern_named(
        &mut self,
        name: &str,
        span: Span,
        templates: &mut Templates,
    ) -> Result<Pattern, DefError> {
        if let Some(index) = templates.find(name) {
            return match templates.infos[index].kind {
                TemplateKind::Type => {
                    templates.used[index] = true;
                    Ok(Pattern::Template(index))
                }
                TemplateKind::Number(_) => Err(DefError {
                    kind: DefErrorKind::TemplateKind {
                        name: name.to_string(),
                        expected: "a type",
                    },
                    span,
                }),
            };
        }
        if let Some(scalar) = scalar_named(name) {
            return Ok(Pattern::Scalar(scalar));
        }

        let pattern = match name {
            "vec2" | "vec3" | "vec4" => {
                let size = match name {
                    "vec2" => 2,
                    "vec3" => 3,
                    _ => 4,
                };
                Pattern::Vector {
                    size: Number::Fixed(size),
                    element: Box::new(self.parse_single_parameter(templates)?),
                }
            }
            "vec" => {
                self.context.expect_symbol('<', "to open `vec` parameters")?;
                let size = self.parse_number(NumberKind::Count, templates)?;
                self.context.expect_symbol(',', "after vector size")?;
                let element = Box::new(self.parse_pattern(templates)?);
                self.context.expect_symbol('>', "to close `vec` parameters")?;
                Pattern::Vector { size, element }
            }
            "mat" => {
                self.context.expect_symbol('<', "to open `mat` parameters")?;
                let columns = self.parse_number(NumberKind::Count, templates)?;
                self.context.expect_symbol(',', "after matrix column count")?;
                let rows = self.parse_number(NumberKind::Count, templates)?;
                self.context.expect_symbol(',', "after matrix row count")?;
                let element = Box::new(self.parse_pattern(templates)?);
                self.context.expect_symbol('>', "to close `mat` parameters")?;
                Pattern::Matrix {
                    columns,
                    rows,
                    element,
                }
            }
            "atomic" => Pattern::Atomic(Box::new(self.parse_single_parameter(templates)?)),
            "array" => Pattern::RuntimeArray(Box::new(self.parse_single_parameter(templates)?)),
            "ptr" => {
                self.context.expect_symbol('<', "to open `ptr` parameters")?;
                let space = self.parse_number(NumberKind::AddressSpace, templates)?;
                self.context.expect_symbol(',', "after pointer address space")?;
                let store = Box::new(self.parse_pattern(templates)?);
                self.context.expect_symbol(',', "after pointer store type")?;
                let access = self.parse_number(NumberKind::Access, templates)?;
                self.context.expect_symbol('>', "to close `ptr` parameters")?;
                Pattern::Pointer {
                    space,
                    store,
                    access,
                }
            }
            "sampler" => Pattern::Sampler { comparison: false },
            "sampler_comparison" => Pattern::Sampler { comparison: true },
            "texture_external" => Pattern::ExternalTexture,
            "__modf_result" => Pattern::ModfResult(Box::new(self.parse_single_parameter(templates)?)),
            "__frexp_result" => {
                Pattern::FrexpResult(Box::new(self.parse_single_parameter(templates)?))
            }
            "__atomic_compare_exchange_result" => Pattern::AtomicCompareExchangeResult(Box::new(
                self.parse_single_parameter(templates)?,
            )),
            _ => {
                if let Some((columns, rows)) = parse::matrix_shape_from_name(name) {
                    return Ok(Pattern::Matrix {
                        columns: Number::Fixed(columns as u32),
                        rows: Number::Fixed(rows as u32),
                        element: Box::new(self.parse_single_parameter(templates)?),
                    });
                }
                if let Some(rest) = name.strip_prefix("texture_") {
                    return self.parse_texture_pattern(name, rest, span, templates);
                }
                return Err(DefError {
                    kind: DefErrorKind::UnknownType(name.to_string()),
                    span,
                });
            }
        };

        Ok(pattern)
    }

    /// Parse `<pattern>`.
    fn parse_single_parameter(&mut self, templates: &mut Templates) -> Result<Pattern, DefError> {
        self.context.expect_symbol('<', "to open type parameter")?;
        let pattern = self.parse_pattern(templates)?;
        self.context.expect_symbol('>', "to close type parameter")?;
        Ok(pattern)
    }

    fn parse_texture_pattern(
        &mut self,
        name: &str,
        rest: &str,
        span: Span,
        templates: &mut Templates,
    ) -> Result<Pattern, DefError> {
        let dimension = |dim: &str| {
            TextureDimension::from_name(dim).ok_or_else(|| DefError {
                kind: DefErrorKind::UnknownType(name.to_string()),
                span: span.clone(),
            })
        };

        if let Some(dim) = rest.strip_prefix("storage_") {
            let dim = dimension(dim)?;
            self.context.expect_symbol('<', "to open storage texture parameters")?;
            let format = self.parse_number(NumberKind::TexelFormat, templates)?;
            self.context.expect_symbol(',', "after texel format")?;
            let access = self.parse_number(NumberKind::Access, templates)?;
            self.context.expect_symbol('>', "to close storage texture parameters")?;
            return Ok(Pattern::StorageTexture {
                dim,
                format,
                access,
            });
        }

        if let Some(depth) = rest.strip_prefix("depth_") {
            let (multisampled, dim) = match depth.strip_prefix("multisampled_") {
                Some(dim) => (true, dim),
                None => (false, depth),
            };
            return Ok(Pattern::DepthTexture {
                dim: dimension(dim)?,
                multisampled,
            });
        }

        let (multisampled, dim) = match rest.strip_prefix("multisampled_") {
            Some(dim) => (true, dim),
            None => (false, rest),
        };
        let dim = dimension(dim)?;
        let sampled = Box::new(self.parse_single_parameter(templates)?);
        Ok(Pattern::SampledTexture {
            dim,
            multisampled,
            sampled,
        })
    }

    /// Parse a number of the given kind: a literal count, an enumerant
    /// name, or a number template of that kind.
    fn parse_number(
        &mut self,
        kind: NumberKind,
        templates: &mut Templates,
    ) -> Result<Number, DefError> {
        let token = self.context.next()?;
        match token.kind {
            TokenKind::Number(n) if kind == NumberKind::Count => Ok(Number::Fixed(n)),
            TokenKind::Ident(name) => {
                if let Some(index) = templates.find(name) {
                    if templates.infos[index].kind != TemplateKind::Number(kind) {
                        return Err(DefError {
                            kind: DefErrorKind::TemplateKind {
                                name: name.to_string(),
                                expected: kind.description(),
                            },
                            span: token.span,
                        });
                    }
                    templates.used[index] = true;
                    return Ok(Number::Template(index));
                }
                enumerant_code(kind, name)
                    .map(Number::Fixed)
                    .ok_or(DefError {
                        kind: DefErrorKind::UnknownValue {
                            kind,
                            name: name.to_string(),
                        },
                        span: token.span,
                    })
            }
            ref other => Err(ParseError {
                kind: ParseErrorKind::Expected {
                    what: kind.description(),
                    found: other.description(),
                },
                span: token.span.clone(),
            }
            .into()),
        }
    }
}
