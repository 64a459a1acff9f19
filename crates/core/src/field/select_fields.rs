use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use parser::types::{Field, FragmentDefinition, Selection, SelectionSet};
use parser::Positioned;
use value::{ConstValue, Name, Variables};

use super::{Arguments, Context, ResolveInfo};
use crate::schema::{ObjectType, TypeRef, TypeRegistry};

pub const DEFAULT_DEPTH: usize = 5;

/// Builds a [`SelectFields`] for the field being resolved, on demand.
#[derive(Clone)]
pub struct SelectFieldsFactory<'a> {
    info: &'a ResolveInfo<'a>,
    registry: &'a TypeRegistry,
    ty: &'a TypeRef,
    args: &'a Arguments,
    ctx: &'a Context,
}

impl<'a> SelectFieldsFactory<'a> {
    pub fn new(
        info: &'a ResolveInfo<'a>,
        registry: &'a TypeRegistry,
        ty: &'a TypeRef,
        args: &'a Arguments,
        ctx: &'a Context,
    ) -> Self {
        Self {
            info,
            registry,
            ty,
            args,
            ctx,
        }
    }

    /// `depth` defaults to [`DEFAULT_DEPTH`].
    pub fn build(&self, depth: Option<usize>) -> SelectFields {
        SelectFields::new(
            self.info,
            self.registry,
            self.ty,
            self.args,
            depth.unwrap_or(DEFAULT_DEPTH),
            self.ctx,
        )
    }
}

/// The columns and relations a request selects from the field's output type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectFields {
    select: Vec<String>,
    relations: IndexMap<String, SelectFields>,
    args: Arguments,
}

impl SelectFields {
    pub fn new(
        info: &ResolveInfo<'_>,
        registry: &TypeRegistry,
        ty: &TypeRef,
        args: &Arguments,
        depth: usize,
        ctx: &Context,
    ) -> Self {
        match ty.concrete() {
            TypeRef::Object(name) => match registry.object(name) {
                Some(object) => Self::from_selection_set(
                    &info.field.node.selection_set.node,
                    info,
                    registry,
                    object,
                    args.clone(),
                    depth,
                    ctx,
                ),
                None => {
                    tracing::warn!(type_name = %name, "Object type is not registered.");
                    Self::default()
                }
            },
            TypeRef::Scalar(_)
            | TypeRef::InputObject(_)
            | TypeRef::NonNull(_)
            | TypeRef::ListOf(_) => Self {
                args: args.clone(),
                ..Self::default()
            },
        }
    }

    fn from_selection_set(
        selection_set: &SelectionSet,
        info: &ResolveInfo<'_>,
        registry: &TypeRegistry,
        object: &ObjectType,
        args: Arguments,
        depth: usize,
        ctx: &Context,
    ) -> Self {
        let mut select_fields = SelectFields {
            args,
            ..Default::default()
        };

        let mut fields = Vec::new();
        flatten_selection_set(selection_set, info.fragments, &mut HashSet::new(), &mut fields);

        for field in fields {
            let name = field.node.name.node.as_str();
            let definition = match object.field_by_name(name) {
                Some(definition) => definition,
                None => continue,
            };
            if !definition.selectable {
                continue;
            }
            if let Some(privacy) = &definition.privacy {
                if !privacy(&select_fields.args, ctx) {
                    continue;
                }
            }

            if definition.is_relation() {
                if depth <= 1 {
                    continue;
                }
                let related = match registry.object(definition.ty.concrete_typename()) {
                    Some(related) => related,
                    None => continue,
                };
                let relation = Self::from_selection_set(
                    &field.node.selection_set.node,
                    info,
                    registry,
                    related,
                    field_arguments(&field.node, info.variables),
                    depth - 1,
                    ctx,
                );
                match select_fields.relations.get_mut(name) {
                    Some(existing) => existing.merge(relation),
                    None => {
                        select_fields.relations.insert(name.to_string(), relation);
                    }
                }
            } else {
                let column = definition.column_name();
                if !select_fields.select.iter().any(|selected| selected == column) {
                    select_fields.select.push(column.to_string());
                }
            }
        }

        select_fields
    }

    /// Fold a repeated selection of the same relation into this one.
    fn merge(&mut self, other: SelectFields) {
        for column in other.select {
            if !self.select.contains(&column) {
                self.select.push(column);
            }
        }
        for (name, relation) in other.relations {
            match self.relations.get_mut(&name) {
                Some(existing) => existing.merge(relation),
                None => {
                    self.relations.insert(name, relation);
                }
            }
        }
    }

    /// Columns to fetch for this level.
    #[inline]
    pub fn select(&self) -> &[String] {
        &self.select
    }

    /// Nested selections keyed by relation field name.
    #[inline]
    pub fn relations(&self) -> &IndexMap<String, SelectFields> {
        &self.relations
    }

    #[inline]
    pub fn relation(&self, name: &str) -> Option<&SelectFields> {
        self.relations.get(name)
    }

    /// Arguments the selection was made with at this level.
    #[inline]
    pub fn args(&self) -> &Arguments {
        &self.args
    }
}

fn flatten_selection_set<'a>(
    selection_set: &'a SelectionSet,
    fragments: &'a HashMap<Name, Positioned<FragmentDefinition>>,
    visited: &mut HashSet<&'a Name>,
    out: &mut Vec<&'a Positioned<Field>>,
) {
    for selection in &selection_set.items {
        match &selection.node {
            Selection::Field(field) => out.push(field),
            Selection::FragmentSpread(spread) => {
                let fragment_name = &spread.node.fragment_name.node;
                if !visited.insert(fragment_name) {
                    continue;
                }
                if let Some(fragment) = fragments.get(fragment_name) {
                    flatten_selection_set(&fragment.node.selection_set.node, fragments, visited, out);
                }
            }
            Selection::InlineFragment(inline_fragment) => flatten_selection_set(
                &inline_fragment.node.selection_set.node,
                fragments,
                visited,
                out,
            ),
        }
    }
}

fn field_arguments(field: &Field, variables: &Variables) -> Arguments {
    field
        .arguments
        .iter()
        .filter_map(|(name, value)| {
            value
                .node
                .clone()
                .into_const_with(|var_name| {
                    Ok::<_, ()>(variables.get(&var_name).cloned().unwrap_or(ConstValue::Null))
                })
                .ok()
                .map(|value| (name.node.clone(), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use parser::types::ExecutableDocument;

    use super::*;
    use crate::schema::ObjectField;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::default();
        registry
            .register_object(
                ObjectType::new("Post")
                    .field(ObjectField::new("id", TypeRef::scalar("ID").non_null()))
                    .field(ObjectField::new("title", TypeRef::scalar("String")).column("post_title"))
                    .field(
                        ObjectField::new("score", TypeRef::scalar("Int")).selectable(false),
                    )
                    .field(
                        ObjectField::new("draft", TypeRef::scalar("Boolean"))
                            .privacy(|_, ctx| ctx.downcast_ref::<&str>() == Some(&"admin")),
                    )
                    .field(ObjectField::new("author", TypeRef::object("User")))
                    .field(ObjectField::new(
                        "comments",
                        TypeRef::object("Comment").non_null().list(),
                    )),
            )
            .unwrap();
        registry
            .register_object(
                ObjectType::new("User")
                    .field(ObjectField::new("id", TypeRef::scalar("ID")))
                    .field(ObjectField::new("name", TypeRef::scalar("String")))
                    .field(ObjectField::new("posts", TypeRef::object("Post").list())),
            )
            .unwrap();
        registry
            .register_object(
                ObjectType::new("Comment")
                    .field(ObjectField::new("id", TypeRef::scalar("ID")))
                    .field(ObjectField::new("body", TypeRef::scalar("String"))),
            )
            .unwrap();
        registry
    }

    fn build(
        document: &ExecutableDocument,
        variables: &Variables,
        depth: Option<usize>,
        ctx: &Context,
    ) -> SelectFields {
        let registry = registry();
        let info = ResolveInfo::from_document(document, None, "post", variables).unwrap();
        let ty = TypeRef::object("Post");
        let args = Arguments::new();
        SelectFieldsFactory::new(&info, &registry, &ty, &args, ctx).build(depth)
    }

    #[test]
    fn columns_and_relations() {
        let document = parser::parse_query(
            r#"{
                post(id: 1) {
                    __typename
                    id
                    title
                    score
                    draft
                    author { name }
                    comments(first: 10) { body }
                }
            }"#,
        )
        .unwrap();
        let select_fields = build(&document, &Variables::default(), None, &());

        assert_eq!(select_fields.select(), &["id", "post_title"]);
        assert_eq!(
            select_fields.relations().keys().collect::<Vec<_>>(),
            vec!["author", "comments"]
        );
        assert_eq!(select_fields.relation("author").unwrap().select(), &["name"]);
        let comments = select_fields.relation("comments").unwrap();
        assert_eq!(comments.select(), &["body"]);
        assert_eq!(comments.args().get("first"), Some(&ConstValue::Number(10.into())));
    }

    #[test]
    fn privacy_uses_context() {
        let document = parser::parse_query("{ post { id draft } }").unwrap();
        let select_fields = build(&document, &Variables::default(), None, &"admin");
        assert_eq!(select_fields.select(), &["id", "draft"]);
    }

    #[test]
    fn fragments_are_flattened() {
        let document = parser::parse_query(
            r#"
            query {
                post { ...PostFields ... on Post { author { id } } }
            }
            fragment PostFields on Post { id title }
            "#,
        )
        .unwrap();
        let select_fields = build(&document, &Variables::default(), None, &());
        assert_eq!(select_fields.select(), &["id", "post_title"]);
        assert!(select_fields.relation("author").is_some());
    }

    #[test]
    fn repeated_relations_are_merged() {
        let document = parser::parse_query(
            r#"
            query {
                post {
                    author { id }
                    ...PostAuthor
                    writer: author { posts { id } }
                    ... on Post { author { posts { title } } }
                }
            }
            fragment PostAuthor on Post { author { name id } }
            "#,
        )
        .unwrap();
        let select_fields = build(&document, &Variables::default(), None, &());

        assert_eq!(select_fields.relations().len(), 1);
        let author = select_fields.relation("author").unwrap();
        assert_eq!(author.select(), &["id", "name"]);
        assert_eq!(
            author.relation("posts").unwrap().select(),
            &["id", "post_title"]
        );
    }

    #[test]
    fn depth_limits_relations() {
        let document =
            parser::parse_query("{ post { id author { name posts { title author { id } } } } }")
                .unwrap();

        let select_fields = build(&document, &Variables::default(), Some(1), &());
        assert!(select_fields.relations().is_empty());

        let select_fields = build(&document, &Variables::default(), Some(2), &());
        let author = select_fields.relation("author").unwrap();
        assert_eq!(author.select(), &["name"]);
        assert!(author.relations().is_empty());

        let select_fields = build(&document, &Variables::default(), None, &());
        let posts = select_fields
            .relation("author")
            .and_then(|author| author.relation("posts"))
            .unwrap();
        assert_eq!(posts.select(), &["post_title"]);
        assert!(posts.relation("author").is_some());
    }

    #[test]
    fn relation_arguments_use_variables() {
        let document =
            parser::parse_query("query($n: Int) { post { comments(first: $n) { id } } }").unwrap();
        let variables = Variables::from_json(serde_json::json!({ "n": 3 }));
        let select_fields = build(&document, &variables, None, &());
        assert_eq!(
            select_fields.relation("comments").unwrap().args().get("first"),
            Some(&ConstValue::Number(3.into()))
        );
    }
}
