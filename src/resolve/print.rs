//! Printing calls and overload signatures for diagnostics.

use crate::table::{Members, Number, NumberKind, OverloadInfo, Pattern, Table};
use crate::ty::{Enumerant, Handle, Types};
use crate::wgsl::Wgsl;

use std::fmt;

/// The call as written: `name<template args>(arg types)`.
pub fn call_signature(
    name: &str,
    template_args: &[Handle],
    args: &[Handle],
    types: &Types,
) -> String {
    if template_args.is_empty() {
        format!("{}({})", name, Wgsl((args, types)))
    } else {
        format!(
            "{}<{}>({})",
            name,
            Wgsl((template_args, types)),
            Wgsl((args, types))
        )
    }
}

/// One candidate line, without indentation:
///
/// ```text
/// textureDimensions(texture: texture_1d<T>, level: L) -> u32  where: T is f32, i32 or u32, L is i32 or u32
/// ```
pub fn overload(name: &str, info: &OverloadInfo, table: &Table) -> String {
    let mut text = name.to_string();

    // Explicit templates that the parameters determine are left off, since
    // such overloads are called without them.
    if info.num_explicit > 0 && !info.infers_explicit {
        let names: Vec<&str> = info
            .explicit_templates()
            .iter()
            .map(|template| template.name.as_str())
            .collect();
        text.push('<');
        text.push_str(&names.join(", "));
        text.push('>');
    }

    let params: Vec<String> = info
        .parameters
        .iter()
        .map(|param| match param.usage {
            Some(usage) => format!("{}: {}", usage.as_str(), Shape(&param.pattern, info)),
            None => Shape(&param.pattern, info).to_string(),
        })
        .collect();
    text.push('(');
    text.push_str(&params.join(", "));
    text.push(')');

    if let Some(ref ret) = info.return_type {
        text.push_str(" -> ");
        text.push_str(&Shape(ret, info).to_string());
    }

    let clauses: Vec<String> = info
        .templates
        .iter()
        .filter_map(|template| {
            let constraint = table.constraints.get(template.constraint?)?;
            let members: Vec<String> = match constraint.members {
                Members::Types(ref scalars) => scalars
                    .iter()
                    .map(|&scalar| Wgsl(scalar).to_string())
                    .collect(),
                Members::Numbers { kind, ref codes } => {
                    codes.iter().map(|&code| kind.value_name(code)).collect()
                }
            };
            Some(format!("{} is {}", template.name, alternatives(&members)))
        })
        .collect();
    if !clauses.is_empty() {
        text.push_str("  where: ");
        text.push_str(&clauses.join(", "));
    }

    text
}

/// Join `items` as `a, b or c`.
fn alternatives(items: &[String]) -> String {
    match items.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
    }
}

/// A pattern as it appears in a candidate line, with templates by name:
/// `vecN<T>`, `ptr<S, atomic<T>, read_write>`.
struct Shape<'a>(&'a Pattern, &'a OverloadInfo);

impl Shape<'_> {
    fn inner<'a>(&'a self, pattern: &'a Pattern) -> Shape<'a> {
        Shape(pattern, self.1)
    }

    fn template(&self, index: usize) -> &str {
        self.1
            .templates
            .get(index)
            .map_or("?", |template| template.name.as_str())
    }

    fn number(&self, number: Number, kind: NumberKind) -> String {
        match number {
            Number::Template(index) => self.template(index).to_string(),
            Number::Fixed(value) => kind.value_name(value),
        }
    }
}

impl fmt::Display for Shape<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = |multisampled: bool| if multisampled { "multisampled_" } else { "" };

        match *self.0 {
            Pattern::Template(index) => f.write_str(self.template(index)),
            Pattern::Scalar(scalar) => Wgsl(scalar).fmt(f),
            Pattern::Vector { size, ref element } => write!(
                f,
                "vec{}<{}>",
                self.number(size, NumberKind::Count),
                self.inner(element)
            ),
            Pattern::Matrix {
                columns,
                rows,
                ref element,
            } => write!(
                f,
                "mat{}x{}<{}>",
                self.number(columns, NumberKind::Count),
                self.number(rows, NumberKind::Count),
                self.inner(element)
            ),
            Pattern::Atomic(ref element) => write!(f, "atomic<{}>", self.inner(element)),
            Pattern::RuntimeArray(ref element) => write!(f, "array<{}>", self.inner(element)),
            Pattern::Pointer {
                space,
                ref store,
                access,
            } => write!(
                f,
                "ptr<{}, {}, {}>",
                self.number(space, NumberKind::AddressSpace),
                self.inner(store),
                self.number(access, NumberKind::Access)
            ),
            Pattern::Sampler { comparison } => {
                f.write_str(if comparison { "sampler_comparison" } else { "sampler" })
            }
            Pattern::SampledTexture {
                dim,
                multisampled,
                ref sampled,
            } => write!(
                f,
                "texture_{}{}<{}>",
                ms(multisampled),
                dim.name(),
                self.inner(sampled)
            ),
            Pattern::DepthTexture { dim, multisampled } => {
                write!(f, "texture_depth_{}{}", ms(multisampled), dim.name())
            }
            Pattern::StorageTexture {
                dim,
                format,
                access,
            } => write!(
                f,
                "texture_storage_{}<{}, {}>",
                dim.name(),
                self.number(format, NumberKind::TexelFormat),
                self.number(access, NumberKind::Access)
            ),
            Pattern::ExternalTexture => f.write_str("texture_external"),
            Pattern::ModfResult(ref fract) => write!(f, "__modf_result<{}>", self.inner(fract)),
            Pattern::FrexpResult(ref fract) => {
                write!(f, "__frexp_result<{}>", self.inner(fract))
            }
            Pattern::AtomicCompareExchangeResult(ref value) => write!(
                f,
                "__atomic_compare_exchange_result<{}>",
                self.inner(value)
            ),
        }
    }
}
