use std::fmt::{self, Display, Formatter};

use parser::types::{BaseType, Type};
use value::Name;

use super::SchemaError;

/// What a bare type name in a type reference points at.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum NamedKind {
    Scalar,
    Object,
    InputObject,
}

/// A node of the argument and output type graph.
///
/// Input objects and objects are referenced by name and resolved through a
/// [`TypeRegistry`](super::TypeRegistry), which is what allows the graph to
/// contain cycles.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum TypeRef {
    Scalar(Name),
    Object(Name),
    InputObject(Name),
    NonNull(Box<TypeRef>),
    ListOf(Box<TypeRef>),
}

impl TypeRef {
    pub fn scalar(name: impl AsRef<str>) -> Self {
        TypeRef::Scalar(Name::new(name))
    }

    pub fn object(name: impl AsRef<str>) -> Self {
        TypeRef::Object(Name::new(name))
    }

    pub fn input(name: impl AsRef<str>) -> Self {
        TypeRef::InputObject(Name::new(name))
    }

    pub fn non_null(self) -> Self {
        match self {
            TypeRef::NonNull(_) => self,
            ty => TypeRef::NonNull(Box::new(ty)),
        }
    }

    pub fn list(self) -> Self {
        TypeRef::ListOf(Box::new(self))
    }

    /// Parse a GraphQL type reference such as `[PostInput!]!`.
    pub fn parse(
        ty: &str,
        kind_of: impl Fn(&str) -> Option<NamedKind>,
    ) -> Result<Self, SchemaError> {
        let parsed = Type::new(ty).ok_or_else(|| SchemaError::InvalidTypeReference {
            type_ref: ty.to_string(),
        })?;
        Self::from_parsed(&parsed, &kind_of)
    }

    fn from_parsed(
        ty: &Type,
        kind_of: &impl Fn(&str) -> Option<NamedKind>,
    ) -> Result<Self, SchemaError> {
        let base = match &ty.base {
            BaseType::Named(name) => match kind_of(name.as_str()) {
                Some(NamedKind::Scalar) => TypeRef::Scalar(name.clone()),
                Some(NamedKind::Object) => TypeRef::Object(name.clone()),
                Some(NamedKind::InputObject) => TypeRef::InputObject(name.clone()),
                None => {
                    return Err(SchemaError::UnknownType {
                        type_name: name.to_string(),
                    })
                }
            },
            BaseType::List(element) => {
                TypeRef::ListOf(Box::new(Self::from_parsed(element, kind_of)?))
            }
        };
        Ok(if ty.nullable { base } else { base.non_null() })
    }

    #[inline]
    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }

    #[inline]
    pub fn is_list(&self) -> bool {
        matches!(self, TypeRef::ListOf(_))
    }

    /// Strip a single leading `NonNull` wrapper.
    pub fn nullable(&self) -> &TypeRef {
        match self {
            TypeRef::NonNull(inner) => inner,
            ty => ty,
        }
    }

    /// Strip every wrapping layer down to the named type.
    pub fn concrete(&self) -> &TypeRef {
        match self {
            TypeRef::NonNull(inner) | TypeRef::ListOf(inner) => inner.concrete(),
            ty => ty,
        }
    }

    pub fn concrete_typename(&self) -> &str {
        match self {
            TypeRef::Scalar(name) | TypeRef::Object(name) | TypeRef::InputObject(name) => {
                name.as_str()
            }
            TypeRef::NonNull(inner) | TypeRef::ListOf(inner) => inner.concrete_typename(),
        }
    }
}

impl Display for TypeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Scalar(name) | TypeRef::Object(name) | TypeRef::InputObject(name) => {
                write!(f, "{}", name)
            }
            TypeRef::NonNull(inner) => write!(f, "{}!", inner),
            TypeRef::ListOf(inner) => write!(f, "[{}]", inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(name: &str) -> Option<NamedKind> {
        match name {
            "String" | "Int" => Some(NamedKind::Scalar),
            "Post" => Some(NamedKind::Object),
            "PostInput" => Some(NamedKind::InputObject),
            _ => None,
        }
    }

    #[test]
    fn parse_wrapped_input() {
        let ty = TypeRef::parse("[PostInput!]!", kind_of).unwrap();
        assert_eq!(ty, TypeRef::input("PostInput").non_null().list().non_null());
        assert_eq!(ty.to_string(), "[PostInput!]!");
        assert_eq!(ty.concrete(), &TypeRef::input("PostInput"));
        assert!(ty.nullable().is_list());
    }

    #[test]
    fn parse_unknown_type() {
        assert!(matches!(
            TypeRef::parse("Comment", kind_of),
            Err(SchemaError::UnknownType { type_name }) if type_name == "Comment"
        ));
        assert!(matches!(
            TypeRef::parse("[String", kind_of),
            Err(SchemaError::InvalidTypeReference { .. })
        ));
    }

    #[test]
    fn non_null_is_not_doubled() {
        let ty = TypeRef::scalar("Int").non_null().non_null();
        assert_eq!(ty.to_string(), "Int!");
        assert_eq!(ty.concrete_typename(), "Int");
    }
}
