use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use indexmap::IndexMap;
use value::{ConstValue, Name};

use super::{
    Arguments, Context, FieldError, ResolveArgs, ResolveInfo, RuleInferer, SelectFieldsFactory,
};
use crate::schema::{Argument, TypeRef, TypeRegistry};
use crate::validation::{Messages, RuleSet, RuleValidator, ValidationErrors, Validator};

/// A query or mutation field.
pub trait Field: Send + Sync + 'static {
    /// The output type of the field.
    fn ty(&self) -> TypeRef;

    /// Attributes that override the ones set on the [`FieldDefinition`].
    fn attributes(&self) -> IndexMap<String, ConstValue> {
        IndexMap::new()
    }

    fn args(&self) -> IndexMap<Name, Argument> {
        IndexMap::new()
    }

    /// Top-level rules. They take precedence over rules declared on
    /// arguments and rules inferred from argument types.
    fn rules(&self, _args: &Arguments) -> RuleSet {
        RuleSet::new()
    }

    fn validation_error_messages(&self, _args: &Arguments) -> Messages {
        Messages::new()
    }

    fn authorize(&self, _args: &ResolveArgs<'_>) -> bool {
        true
    }

    /// Fields that produce their own value return `Some(self)`.
    fn resolvable(&self) -> Option<&dyn Resolvable> {
        None
    }
}

pub trait Resolvable: Send + Sync {
    fn resolve(&self, args: &ResolveArgs<'_>) -> anyhow::Result<ConstValue>;
}

type ResolveFn = dyn for<'a> Fn(
        &'a ConstValue,
        &'a Arguments,
        &'a Context,
        Option<&'a ResolveInfo<'a>>,
    ) -> Result<ConstValue, FieldError>
    + Send
    + Sync;

/// The resolver handed to the execution engine.
#[derive(Clone)]
pub struct Resolver(Arc<ResolveFn>);

impl Resolver {
    fn new<F>(f: F) -> Self
    where
        F: for<'a> Fn(
                &'a ConstValue,
                &'a Arguments,
                &'a Context,
                Option<&'a ResolveInfo<'a>>,
            ) -> Result<ConstValue, FieldError>
            + Send
            + Sync
            + 'static,
    {
        Resolver(Arc::new(f))
    }

    pub fn call(
        &self,
        root: &ConstValue,
        args: &Arguments,
        ctx: &Context,
        info: Option<&ResolveInfo<'_>>,
    ) -> Result<ConstValue, FieldError> {
        (self.0)(root, args, ctx, info)
    }
}

impl Debug for Resolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("Resolver")
    }
}

/// What a field presents to the execution engine.
#[derive(Debug, Clone)]
pub struct FieldDescription {
    pub attributes: IndexMap<String, ConstValue>,
    pub args: IndexMap<Name, Argument>,
    pub ty: TypeRef,
    pub resolve: Option<Resolver>,
}

/// Wraps a [`Field`] with rule inference, validation and authorization.
pub struct FieldDefinition<F> {
    field: Arc<F>,
    registry: Arc<TypeRegistry>,
    validator: Arc<dyn Validator>,
    attributes: IndexMap<String, ConstValue>,
}

impl<F: Field> FieldDefinition<F> {
    pub fn new(field: F, registry: Arc<TypeRegistry>) -> Self {
        Self {
            field: Arc::new(field),
            registry,
            validator: Arc::new(RuleValidator),
            attributes: IndexMap::new(),
        }
    }

    pub fn with_validator(self, validator: impl Validator + 'static) -> Self {
        Self {
            validator: Arc::new(validator),
            ..self
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<ConstValue>) -> Self {
        self.set(key, value);
        self
    }

    #[inline]
    pub fn field(&self) -> &F {
        &self.field
    }

    #[inline]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ConstValue>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Look up an entry of the assembled description.
    ///
    /// `type` renders the output type, e.g. `[Post!]!`, and `args` maps each
    /// argument name to its type. The resolver has no value representation,
    /// use [`FieldDefinition::resolver`] for it.
    pub fn get(&self, key: &str) -> Option<ConstValue> {
        let description = self.describe();
        match key {
            "type" => Some(ConstValue::String(description.ty.to_string())),
            "args" => Some(ConstValue::Object(
                description
                    .args
                    .iter()
                    .map(|(name, argument)| {
                        (name.clone(), ConstValue::String(argument.ty.to_string()))
                    })
                    .collect(),
            )),
            _ => description.attributes.get(key).cloned(),
        }
    }

    pub fn name(&self) -> Option<String> {
        match self.get("name") {
            Some(ConstValue::String(name)) => Some(name),
            _ => None,
        }
    }

    /// The effective rule set for one resolution.
    pub fn rules(&self, args: &ResolveArgs<'_>) -> RuleSet {
        collect_rules(&*self.field, &self.registry, args)
    }

    pub fn validate(&self, args: &ResolveArgs<'_>) -> Result<(), ValidationErrors> {
        validate(&*self.field, &self.registry, &*self.validator, args)
    }

    pub fn resolver(&self) -> Option<Resolver> {
        self.field.resolvable()?;

        let field = self.field.clone();
        let registry = self.registry.clone();
        let validator = self.validator.clone();

        Some(Resolver::new(move |root, args, ctx, info| {
            let ty = field.ty();
            let mut resolve_args = ResolveArgs::new(root, args, ctx, info);

            validate(&*field, &registry, &*validator, &resolve_args)
                .map_err(FieldError::Validation)?;

            if let Some(info) = info {
                resolve_args.select_fields =
                    Some(SelectFieldsFactory::new(info, &registry, &ty, args, ctx));
            }

            if !field.authorize(&resolve_args) {
                tracing::debug!(field = ?info.map(ResolveInfo::field_name), "Unauthorized.");
                return Err(FieldError::Unauthorized);
            }

            match field.resolvable() {
                Some(resolvable) => resolvable
                    .resolve(&resolve_args)
                    .map_err(FieldError::Resolve),
                None => Err(FieldError::Resolve(anyhow::anyhow!(
                    "Field is no longer resolvable."
                ))),
            }
        }))
    }

    pub fn describe(&self) -> FieldDescription {
        let mut attributes = self.attributes.clone();
        attributes.extend(self.field.attributes());

        FieldDescription {
            attributes,
            args: self.field.args(),
            ty: self.field.ty(),
            resolve: self.resolver(),
        }
    }
}

fn collect_rules<F: Field + ?Sized>(
    field: &F,
    registry: &TypeRegistry,
    args: &ResolveArgs<'_>,
) -> RuleSet {
    let inferer = RuleInferer::new(registry);
    let mut rules = RuleSet::new();

    for (name, argument) in field.args() {
        if let Some(rule) = &argument.rules {
            rules.insert(name.to_string(), rule.resolve(args));
        }

        let submitted = !matches!(args.args.get(&name), None | Some(ConstValue::Null));
        if argument.ty.is_non_null() || submitted {
            rules.extend(inferer.infer_rules_from_type(&argument.ty, &name, args));
        }
    }

    rules.extend(field.rules(args.args));
    rules
}

fn validate<F: Field + ?Sized>(
    field: &F,
    registry: &TypeRegistry,
    validator: &dyn Validator,
    args: &ResolveArgs<'_>,
) -> Result<(), ValidationErrors> {
    let rules = collect_rules(field, registry, args);
    if rules.is_empty() {
        return Ok(());
    }

    let messages = field.validation_error_messages(args.args);
    validator
        .validate(args.args, &rules, &messages)
        .map_err(|errors| {
            tracing::debug!(errors = %errors, "Validation failed.");
            errors
        })
}
