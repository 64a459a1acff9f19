use std::any::Any;
use std::collections::HashMap;

use indexmap::IndexMap;
use parser::types::{ExecutableDocument, Field, FragmentDefinition, Selection};
use parser::Positioned;
use value::{ConstValue, Name, Variables};

use super::select_fields::SelectFieldsFactory;

/// Opaque per-request context handed through to rules, authorization and resolvers.
pub type Context = dyn Any + Send + Sync;

/// Submitted argument values of a field.
pub type Arguments = IndexMap<Name, ConstValue>;

/// Execution information for the field being resolved.
#[derive(Debug, Clone, Copy)]
pub struct ResolveInfo<'a> {
    pub field: &'a Positioned<Field>,
    pub fragments: &'a HashMap<Name, Positioned<FragmentDefinition>>,
    pub variables: &'a Variables,
}

impl<'a> ResolveInfo<'a> {
    pub fn new(
        field: &'a Positioned<Field>,
        fragments: &'a HashMap<Name, Positioned<FragmentDefinition>>,
        variables: &'a Variables,
    ) -> Self {
        Self {
            field,
            fragments,
            variables,
        }
    }

    /// Find a root field of an operation by its response key.
    pub fn from_document(
        document: &'a ExecutableDocument,
        operation_name: Option<&str>,
        response_key: &str,
        variables: &'a Variables,
    ) -> Option<Self> {
        let (_, operation) = document.operations.iter().find(|(name, _)| {
            operation_name.map_or(true, |operation_name| {
                name.map(|name| name.as_str()) == Some(operation_name)
            })
        })?;
        operation
            .node
            .selection_set
            .node
            .items
            .iter()
            .find_map(|selection| match &selection.node {
                Selection::Field(field)
                    if field.node.response_key().node.as_str() == response_key =>
                {
                    Some(Self::new(field, &document.fragments, variables))
                }
                _ => None,
            })
    }

    #[inline]
    pub fn field_name(&self) -> &str {
        self.field.node.name.node.as_str()
    }

    #[inline]
    pub fn response_key(&self) -> &str {
        self.field.node.response_key().node.as_str()
    }
}

/// Everything a rule, the authorization check and the resolver receive for
/// one field resolution.
///
/// `select_fields` is only set once validation has passed, and only when
/// execution information was supplied.
#[derive(Clone)]
pub struct ResolveArgs<'a> {
    pub root: &'a ConstValue,
    pub args: &'a Arguments,
    pub ctx: &'a Context,
    pub info: Option<&'a ResolveInfo<'a>>,
    pub select_fields: Option<SelectFieldsFactory<'a>>,
}

impl<'a> ResolveArgs<'a> {
    pub fn new(
        root: &'a ConstValue,
        args: &'a Arguments,
        ctx: &'a Context,
        info: Option<&'a ResolveInfo<'a>>,
    ) -> Self {
        Self {
            root,
            args,
            ctx,
            info,
            select_fields: None,
        }
    }

    #[inline]
    pub fn arg(&self, name: &str) -> Option<&'a ConstValue> {
        self.args.get(name)
    }

    #[inline]
    pub fn ctx<T: Any>(&self) -> Option<&'a T> {
        self.ctx.downcast_ref::<T>()
    }
}
