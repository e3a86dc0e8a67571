//! Evaluating call scripts.
//!
//! Each call in a script is resolved against the [`Table`], and adds an
//! entry to a [`Transcript`]: one line for a call that resolved, or the full
//! diagnostic for one that didn't.
//!
//! A resolved call's line shows the call, the overload chosen with its
//! parameter and result types filled in, and any flags:
//!
//! ```text
//! select(abstract-float, abstract-float, bool) -> select(f32, f32, bool) -> f32  [const: select]  [defaulted]
//! ```

mod error;


pub use error::{Error, ErrorKind, Result};

use crate::ast;
use crate::resolve::{self, Overload};
use crate::table::{self, BinaryOp, Table, UnaryOp};
use crate::ty::{Handle, Stage, Texture, Type, Types};
use crate::wgsl::Wgsl;

use std::fmt::Write as _;

/// The outcome of a single call.
#[derive(Debug)]
pub enum Entry {
    /// The call resolved. This is its transcript line, without a newline.
    Resolved(String),

    /// No overload matched.
    Failed(resolve::Error),
}

#[derive(Debug, Default)]
pub struct Transcript {
    pub text: String,
    pub resolved: usize,
    pub failed: usize,
}

impl Transcript {
    fn push(&mut self, entry: Entry) {
        match entry {
            Entry::Resolved(line) => {
                self.resolved += 1;
                self.text.push_str(&line);
                self.text.push('\n');
            }
            Entry::Failed(error) => {
                self.failed += 1;
                // Diagnostics end with a newline; separate them with a blank
                // line.
                let _ = writeln!(self.text, "{}", error);
            }
        }
    }
}

/// State for running call scripts.
///
/// Types are interned in `types` for the runner's whole lifetime, so running
/// several scripts with one `Runner` shares them.
pub struct Runner<'t> {
    table: &'t Table,
    pub types: Types,

    /// The stage for calls that don't say `const` or `runtime`.
    default_stage: Stage,
}

impl<'t> Runner<'t> {
    pub fn new(table: &'t Table, default_stage: Stage) -> Self {
        Runner {
            table,
            types: Types::new(),
            default_stage,
        }
    }

    pub fn run(&mut self, program: &ast::Program) -> Result<Transcript> {
        let mut transcript = Transcript::default();
        for call in program {
            transcript.push(self.run_call(call)?);
        }
        Ok(transcript)
    }

    pub fn run_call(&mut self, call: &ast::Call) -> Result<Entry> {
        let stage = match call.stage {
            Some((ast::StageKeyword::Const, _)) => Stage::Constant,
            Some((ast::StageKeyword::Runtime, _)) => Stage::Runtime,
            None => self.default_stage,
        };
        let template_args = call
            .template_args
            .iter()
            .map(|ty| self.intern(ty))
            .collect::<Result<Vec<_>>>()?;
        let args = call
            .args
            .iter()
            .map(|ty| self.intern(ty))
            .collect::<Result<Vec<_>>>()?;

        let table = self.table;
        let span = call.span.clone();
        let mut context = resolve::Context::new(table, &mut self.types);
        let (name, result) = match call.target {
            ast::Target::Named {
                ref name,
                span: ref name_span,
            } => {
                let result = if let Some(builtin) = table.builtin(name) {
                    context.lookup_fn(builtin, &template_args, &args, stage, span)
                } else if let Some(ctor_conv) = table.ctor_conv(name) {
                    context.lookup_ctor_conv(ctor_conv, &template_args, &args, stage, span)
                } else {
                    return Err(Error {
                        kind: ErrorKind::UnknownName(name.clone()),
                        span: name_span.clone(),
                    });
                };
                (name.clone(), result)
            }
            ast::Target::Operator {
                ref symbol,
                span: ref symbol_span,
            } => {
                let unknown = || Error {
                    kind: ErrorKind::UnknownOperator {
                        symbol: symbol.clone(),
                        operands: args.len(),
                    },
                    span: symbol_span.clone(),
                };
                // An operator's symbol runs up to its `(`, so it never has
                // template arguments.
                match *args.as_slice() {
                    [arg] => {
                        let op = UnaryOp::from_symbol(symbol).ok_or_else(unknown)?;
                        let result = context.lookup_unary(op, arg, stage, span);
                        (table::unary_name(op), result)
                    }
                    [lhs, rhs] => {
                        let (op, is_compound) = binary_operator(symbol).ok_or_else(unknown)?;
                        let result = context.lookup_binary(op, lhs, rhs, stage, span, is_compound);
                        (table::binary_name(op, is_compound), result)
                    }
                    _ => return Err(unknown()),
                }
            }
        };

        match result {
            Ok(overload) => {
                let signature =
                    resolve::call_signature(&name, &template_args, &args, &self.types);
                Ok(Entry::Resolved(self.describe(&signature, &name, &overload)))
            }
            Err(error) => match error.kind {
                resolve::ErrorKind::NoMatch { .. } => Ok(Entry::Failed(error)),
                resolve::ErrorKind::Internal { .. } => Err(Error {
                    span: error.span.clone(),
                    kind: ErrorKind::Resolve(error),
                }),
            },
        }
    }

    /// The transcript line for a resolved call.
    fn describe(&self, signature: &str, name: &str, overload: &Overload) -> String {
        let params: Vec<String> = overload
            .parameters
            .iter()
            .map(|param| {
                let ty = Wgsl((param.ty, &self.types));
                match param.usage {
                    Some(usage) => format!("{}: {}", usage.as_str(), ty),
                    None => ty.to_string(),
                }
            })
            .collect();

        let mut line = format!("{} -> {}({})", signature, name, params.join(", "));
        if let Some(ty) = overload.return_type {
            let _ = write!(line, " -> {}", Wgsl((ty, &self.types)));
        }
        if let Some(const_eval) = overload.const_eval {
            let _ = write!(line, "  [const: {}]", const_eval);
        }
        if overload.defaulted {
            line.push_str("  [defaulted]");
        }
        line
    }

    /// Intern the type `ty` was written as.
    pub fn intern(&mut self, ty: &ast::Type) -> Result<Handle> {
        use ast::TypeKind as Tk;

        Ok(match ty.kind {
            Tk::Scalar(scalar) => self.types.scalar(scalar),
            Tk::Vector {
                size,
                ref component,
            } => {
                let element = self.intern_scalar(component, "vec")?;
                self.types.vector(size, element)
            }
            Tk::Matrix {
                columns,
                rows,
                ref component,
            } => {
                let element = self.intern_scalar(component, "mat")?;
                self.types.matrix(columns, rows, element)
            }
            Tk::Atomic(ref element) => {
                let element = self.intern_scalar(element, "atomic")?;
                self.types.insert(Type::Atomic(element))
            }
            Tk::Array {
                ref element_type,
                length,
            } => {
                let element = self.intern(element_type)?;
                self.types.insert(Type::Array {
                    element,
                    count: length,
                })
            }
            Tk::Pointer {
                space,
                ref store,
                access,
            } => {
                let store = self.intern(store)?;
                self.types.pointer(space, store, access)
            }
            Tk::Reference {
                space,
                ref store,
                access,
            } => {
                let store = self.intern(store)?;
                self.types.reference(space, store, access)
            }
            Tk::Sampler { comparison } => self.types.insert(Type::Sampler { comparison }),
            Tk::SampledTexture {
                dim,
                multisampled,
                ref sampled,
            } => {
                let sampled = self.intern_scalar(sampled, "texture")?;
                self.types.texture(if multisampled {
                    Texture::Multisampled { dim, sampled }
                } else {
                    Texture::Sampled { dim, sampled }
                })
            }
            Tk::DepthTexture { dim, multisampled } => self.types.texture(if multisampled {
                Texture::DepthMultisampled(dim)
            } else {
                Texture::Depth(dim)
            }),
            Tk::StorageTexture {
                dim,
                format,
                access,
            } => self.types.texture(Texture::Storage {
                dim,
                format,
                access,
            }),
            Tk::ExternalTexture => self.types.texture(Texture::External),
        })
    }

    fn intern_scalar(&mut self, ty: &ast::Type, constructor: &'static str) -> Result<Handle> {
        match ty.kind {
            ast::TypeKind::Scalar(scalar) => Ok(self.types.scalar(scalar)),
            _ => Err(Error {
                kind: ErrorKind::NotScalar { constructor },
                span: ty.span.clone(),
            }),
        }
    }
}

/// The binary operator spelled `symbol`, and whether it is the compound
/// assignment form.
fn binary_operator(symbol: &str) -> Option<(BinaryOp, bool)> {
    if let Some(op) = BinaryOp::from_symbol(symbol) {
        return Some((op, false));
    }
    let op = BinaryOp::from_symbol(symbol.strip_suffix('=')?)?;
    op.has_compound().then_some((op, true))
}
