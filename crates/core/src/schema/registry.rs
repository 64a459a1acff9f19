use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use indexmap::IndexMap;
use value::Name;

use super::type_ref::NamedKind;
use super::{SchemaError, TypeRef};
use crate::field::{Arguments, Context};
use crate::validation::Rule;

const BUILTIN_SCALARS: &[&str] = &["Int", "Float", "String", "Boolean", "ID"];

/// A field of an input object type.
#[derive(Debug, Clone)]
pub struct InputField {
    pub name: Name,
    pub description: Option<String>,
    pub ty: TypeRef,
    pub rules: Option<Rule>,
}

impl InputField {
    pub fn new(name: impl AsRef<str>, ty: TypeRef) -> Self {
        Self {
            name: Name::new(name),
            description: None,
            ty,
            rules: None,
        }
    }

    pub fn rules(self, rules: impl Into<Rule>) -> Self {
        Self {
            rules: Some(rules.into()),
            ..self
        }
    }

    pub fn description(self, description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..self
        }
    }
}

#[derive(Debug, Clone)]
pub struct InputObjectType {
    pub name: Name,
    pub description: Option<String>,
    pub fields: IndexMap<Name, InputField>,
}

impl InputObjectType {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: Name::new(name),
            description: None,
            fields: Default::default(),
        }
    }

    pub fn field(mut self, field: InputField) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }
}

/// Decides whether a column may be selected for the current request.
pub type Privacy = Arc<dyn Fn(&Arguments, &Context) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct ObjectField {
    pub name: Name,
    pub ty: TypeRef,
    /// Storage column backing this field, when it differs from the field name.
    pub column: Option<String>,
    pub selectable: bool,
    pub privacy: Option<Privacy>,
}

impl Debug for ObjectField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectField")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("column", &self.column)
            .field("selectable", &self.selectable)
            .field("privacy", &self.privacy.is_some())
            .finish()
    }
}

impl ObjectField {
    pub fn new(name: impl AsRef<str>, ty: TypeRef) -> Self {
        Self {
            name: Name::new(name),
            ty,
            column: None,
            selectable: true,
            privacy: None,
        }
    }

    pub fn column(self, column: impl Into<String>) -> Self {
        Self {
            column: Some(column.into()),
            ..self
        }
    }

    pub fn selectable(self, selectable: bool) -> Self {
        Self { selectable, ..self }
    }

    pub fn privacy(
        self,
        privacy: impl Fn(&Arguments, &Context) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            privacy: Some(Arc::new(privacy)),
            ..self
        }
    }

    #[inline]
    pub fn column_name(&self) -> &str {
        self.column.as_deref().unwrap_or(self.name.as_str())
    }

    #[inline]
    pub fn is_relation(&self) -> bool {
        matches!(self.ty.concrete(), TypeRef::Object(_))
    }
}

#[derive(Debug, Clone)]
pub struct ObjectType {
    pub name: Name,
    pub description: Option<String>,
    pub fields: IndexMap<Name, ObjectField>,
}

impl ObjectType {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: Name::new(name),
            description: None,
            fields: Default::default(),
        }
    }

    pub fn field(mut self, field: ObjectField) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    #[inline]
    pub fn field_by_name(&self, name: &str) -> Option<&ObjectField> {
        self.fields.get(name)
    }
}

/// An argument declared by a query or mutation field.
#[derive(Debug, Clone)]
pub struct Argument {
    pub ty: TypeRef,
    pub description: Option<String>,
    pub rules: Option<Rule>,
}

impl Argument {
    pub fn new(ty: TypeRef) -> Self {
        Self {
            ty,
            description: None,
            rules: None,
        }
    }

    pub fn rules(self, rules: impl Into<Rule>) -> Self {
        Self {
            rules: Some(rules.into()),
            ..self
        }
    }

    pub fn description(self, description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..self
        }
    }
}

/// The named types fields can refer to.
///
/// The registry is built once and then shared read-only between every field
/// definition and every request.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    scalars: Vec<Name>,
    input_objects: IndexMap<Name, InputObjectType>,
    objects: IndexMap<Name, ObjectType>,
}

impl TypeRegistry {
    pub fn register_scalar(&mut self, name: impl AsRef<str>) -> Result<(), SchemaError> {
        let name = Name::new(name);
        self.check_free(&name)?;
        self.scalars.push(name);
        Ok(())
    }

    pub fn register_input(&mut self, ty: InputObjectType) -> Result<(), SchemaError> {
        self.check_free(&ty.name)?;
        self.input_objects.insert(ty.name.clone(), ty);
        Ok(())
    }

    pub fn register_object(&mut self, ty: ObjectType) -> Result<(), SchemaError> {
        self.check_free(&ty.name)?;
        self.objects.insert(ty.name.clone(), ty);
        Ok(())
    }

    fn check_free(&self, name: &Name) -> Result<(), SchemaError> {
        if self.kind_of(name).is_some() {
            return Err(SchemaError::DefinitionConflicted {
                type_name: name.to_string(),
            });
        }
        Ok(())
    }

    #[inline]
    pub fn input_object(&self, name: &str) -> Option<&InputObjectType> {
        self.input_objects.get(name)
    }

    #[inline]
    pub fn object(&self, name: &str) -> Option<&ObjectType> {
        self.objects.get(name)
    }

    pub fn input_objects(&self) -> impl Iterator<Item = &InputObjectType> {
        self.input_objects.values()
    }

    pub fn kind_of(&self, name: &str) -> Option<NamedKind> {
        if BUILTIN_SCALARS.contains(&name) || self.scalars.iter().any(|scalar| scalar == name) {
            Some(NamedKind::Scalar)
        } else if self.input_objects.contains_key(name) {
            Some(NamedKind::InputObject)
        } else if self.objects.contains_key(name) {
            Some(NamedKind::Object)
        } else {
            None
        }
    }

    /// Parse a type reference against the types registered so far.
    pub fn parse_type(&self, ty: &str) -> Result<TypeRef, SchemaError> {
        TypeRef::parse(ty, |name| self.kind_of(name))
    }
}
