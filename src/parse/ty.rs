use super::error::{ParseError, ParseErrorKind};
use super::Context;
use crate::ast::{self, join_spans, Span};
use crate::lex::{BracketPosition, TokenKind};
use crate::ty::{Access, AddressSpace, Enumerant, Scalar, TexelFormat, TextureDimension, VectorSize};

/// Return the scalar type named `name`, if any.
///
/// The abstract types are lexed as their own tokens, so they are not
/// recognized here.
pub(crate) fn scalar_from_name(name: &str) -> Option<Scalar> {
    Some(match name {
        "bool" => Scalar::Bool,
        "i32" => Scalar::I32,
        "u32" => Scalar::U32,
        "f32" => Scalar::F32,
        "f16" => Scalar::F16,
        _ => return None,
    })
}

/// Parse a `matCxR` type name into its column and row counts.
pub(crate) fn matrix_shape_from_name(name: &str) -> Option<(VectorSize, VectorSize)> {
    let shape = name.strip_prefix("mat")?.as_bytes();
    match *shape {
        [columns, b'x', rows] if columns.is_ascii_digit() && rows.is_ascii_digit() => Some((
            VectorSize::from_u32((columns - b'0') as u32)?,
            VectorSize::from_u32((rows - b'0') as u32)?,
        )),
        _ => None,
    }
}

/// The default access mode for a pointer into `space`.
pub(crate) fn default_access(space: AddressSpace) -> Access {
    match space {
        AddressSpace::Storage | AddressSpace::Uniform => Access::Read,
        _ => Access::ReadWrite,
    }
}

impl<'s> Context<'s> {
    pub fn take_if_type(&mut self) -> Result<Option<ast::Type>, ParseError> {
        let scalar = match self.peek().kind {
            TokenKind::AbstractInt => Some(Scalar::AbstractInt),
            TokenKind::AbstractFloat => Some(Scalar::AbstractFloat),
            TokenKind::Ident(name) => scalar_from_name(name),
            _ => return Ok(None),
        };
        if let Some(scalar) = scalar {
            let token = self.next()?;
            return Ok(Some(ast::Type {
                kind: ast::TypeKind::Scalar(scalar),
                span: token.span,
            }));
        }

        let (name, name_span) = self.expect_ident("type")?;
        let kind = match name {
            "vec2" | "vec3" | "vec4" => {
                let size = match name {
                    "vec2" => VectorSize::Vec2,
                    "vec3" => VectorSize::Vec3,
                    _ => VectorSize::Vec4,
                };
                let (component, close) = self.parse_single_parameter(name, &name_span)?;
                return Ok(Some(ast::Type {
                    kind: ast::TypeKind::Vector {
                        size,
                        component: Box::new(component),
                    },
                    span: join_spans(&name_span, &close),
                }));
            }
            "atomic" => {
                let (element, close) = self.parse_single_parameter(name, &name_span)?;
                return Ok(Some(ast::Type {
                    kind: ast::TypeKind::Atomic(Box::new(element)),
                    span: join_spans(&name_span, &close),
                }));
            }
            "array" => return self.parse_array_type(&name_span).map(Some),
            "ptr" | "ref" => return self.parse_pointer_type(name, &name_span).map(Some),
            "sampler" => ast::TypeKind::Sampler { comparison: false },
            "sampler_comparison" => ast::TypeKind::Sampler { comparison: true },
            "texture_external" => ast::TypeKind::ExternalTexture,
            _ => {
                if let Some((columns, rows)) = matrix_shape_from_name(name) {
                    let (component, close) = self.parse_single_parameter(name, &name_span)?;
                    return Ok(Some(ast::Type {
                        kind: ast::TypeKind::Matrix {
                            columns,
                            rows,
                            component: Box::new(component),
                        },
                        span: join_spans(&name_span, &close),
                    }));
                }
                if let Some(rest) = name.strip_prefix("texture_") {
                    return self.parse_texture_type(name, rest, &name_span).map(Some);
                }
                return Err(ParseError {
                    kind: ParseErrorKind::UnknownType(name.to_string()),
                    span: name_span,
                });
            }
        };

        Ok(Some(ast::Type {
            kind,
            span: name_span,
        }))
    }

    pub fn expect_type(&mut self) -> Result<ast::Type, ParseError> {
        let found = self.peek().kind.description();
        let span = self.peek().span.clone();
        self.take_if_type()?.ok_or(ParseError {
            kind: ParseErrorKind::ExpectedType { found },
            span,
        })
    }

    /// Parse `<T>` following a type constructor, returning `T` and the span
    /// of the closing bracket.
    fn parse_single_parameter(
        &mut self,
        constructor: &str,
        constructor_span: &Span,
    ) -> Result<(ast::Type, Span), ParseError> {
        self.expect_type_parameter_bracket(constructor, constructor_span, BracketPosition::Open)?;
        let parameter = self.expect_type()?;
        let close =
            self.expect_type_parameter_bracket(constructor, constructor_span, BracketPosition::Close)?;
        Ok((parameter, close))
    }

    fn parse_array_type(&mut self, constructor_span: &Span) -> Result<ast::Type, ParseError> {
        self.expect_type_parameter_bracket("array", constructor_span, BracketPosition::Open)?;
        let element_type = self.expect_type()?;

        let length = if self.take_if(&TokenKind::Symbol(','))?.is_some() {
            let (length, span) = self.expect_number("array length")?;
            if length == 0 {
                return Err(ParseError {
                    kind: ParseErrorKind::ArrayLengthZero,
                    span,
                });
            }
            Some(length)
        } else {
            None
        };

        let close =
            self.expect_type_parameter_bracket("array", constructor_span, BracketPosition::Close)?;
        Ok(ast::Type {
            kind: ast::TypeKind::Array {
                element_type: Box::new(element_type),
                length,
            },
            span: join_spans(constructor_span, &close),
        })
    }

    fn parse_pointer_type(
        &mut self,
        constructor: &str,
        constructor_span: &Span,
    ) -> Result<ast::Type, ParseError> {
        self.expect_type_parameter_bracket(constructor, constructor_span, BracketPosition::Open)?;
        let space = self.expect_enumerant::<AddressSpace>("address space")?;
        self.expect_symbol(',', "after pointer address space")?;
        let store = Box::new(self.expect_type()?);
        let access = if self.take_if(&TokenKind::Symbol(','))?.is_some() {
            self.expect_enumerant::<Access>("access mode")?
        } else {
            default_access(space)
        };
        let close =
            self.expect_type_parameter_bracket(constructor, constructor_span, BracketPosition::Close)?;

        let kind = if constructor == "ptr" {
            ast::TypeKind::Pointer {
                space,
                store,
                access,
            }
        } else {
            ast::TypeKind::Reference {
                space,
                store,
                access,
            }
        };
        Ok(ast::Type {
            kind,
            span: join_spans(constructor_span, &close),
        })
    }

    /// Parse a texture type, given the part of its name after `texture_`.
    fn parse_texture_type(
        &mut self,
        name: &str,
        rest: &str,
        name_span: &Span,
    ) -> Result<ast::Type, ParseError> {
        let unknown = || ParseError {
            kind: ParseErrorKind::UnknownType(name.to_string()),
            span: name_span.clone(),
        };

        if let Some(dim) = rest.strip_prefix("storage_") {
            let dim = TextureDimension::from_name(dim).ok_or_else(unknown)?;
            self.expect_type_parameter_bracket(name, name_span, BracketPosition::Open)?;
            let format = self.expect_enumerant::<TexelFormat>("texel format")?;
            self.expect_symbol(',', "after texel format")?;
            let access = self.expect_enumerant::<Access>("access mode")?;
            let close =
                self.expect_type_parameter_bracket(name, name_span, BracketPosition::Close)?;
            return Ok(ast::Type {
                kind: ast::TypeKind::StorageTexture {
                    dim,
                    format,
                    access,
                },
                span: join_spans(name_span, &close),
            });
        }

        if let Some(depth) = rest.strip_prefix("depth_") {
            let (multisampled, dim) = match depth.strip_prefix("multisampled_") {
                Some(dim) => (true, dim),
                None => (false, depth),
            };
            let dim = TextureDimension::from_name(dim).ok_or_else(unknown)?;
            return Ok(ast::Type {
                kind: ast::TypeKind::DepthTexture { dim, multisampled },
                span: name_span.clone(),
            });
        }

        let (multisampled, dim) = match rest.strip_prefix("multisampled_") {
            Some(dim) => (true, dim),
            None => (false, rest),
        };
        let dim = TextureDimension::from_name(dim).ok_or_else(unknown)?;
        let (sampled, close) = self.parse_single_parameter(name, name_span)?;
        Ok(ast::Type {
            kind: ast::TypeKind::SampledTexture {
                dim,
                multisampled,
                sampled: Box::new(sampled),
            },
            span: join_spans(name_span, &close),
        })
    }

    /// Consume an identifier naming a value of the enumeration `E`.
    pub fn expect_enumerant<E: Enumerant>(&mut self, what: &'static str) -> Result<E, ParseError> {
        let (name, span) = self.expect_ident(what)?;
        E::from_name(name).ok_or(ParseError {
            kind: ParseErrorKind::UnknownEnumerant {
                kind: what,
                name: name.to_string(),
            },
            span,
        })
    }

    pub fn expect_number(&mut self, what: &'static str) -> Result<(u32, Span), ParseError> {
        match self.peek().kind {
            TokenKind::Number(n) => {
                let token = self.next()?;
                Ok((n, token.span))
            }
            ref other => Err(ParseError {
                kind: ParseErrorKind::Expected {
                    what,
                    found: other.description(),
                },
                span: self.peek().span.clone(),
            }),
        }
    }

    fn expect_type_parameter_bracket(
        &mut self,
        constructor: &str,
        constructor_span: &Span,
        position: BracketPosition,
    ) -> Result<Span, ParseError> {
        self.expect(&position.angle_token(), || {
            ParseErrorKind::ExpectedTypeParameterBracket {
                constructor: constructor.to_string(),
                constructor_span: constructor_span.clone(),
                position,
            }
        })
    }
}
