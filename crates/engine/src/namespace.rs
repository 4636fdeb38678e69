//! Default-namespace decoration at the store boundary
//!
//! The store always persists an explicit namespace. Callers work with an
//! empty namespace meaning "none". The [`NamespaceDecorator`] bridges the two:
//!
//! - **on write**: clone the object graph, then replace every empty Entity
//!   namespace in it with the configured token
//! - **on read**: replace every namespace equal to the token with `""`
//! - **full names**: a bare name `foo` is looked up as `token.foo`
//!
//! Every type that carries an Entity reference, directly or through nested
//! objects, implements [`Decorate`], so whole graphs are handled at once:
//! `AttributeValue -> Instance -> Entity`, `Relation -> Instance -> Entity`,
//! and so on.
//!
//! Callers' objects are never touched; `on_write` works on a clone.

use metakernel_core::{
    Attribute, AttributeValue, Entity, EntityRef, FullName, Instance, InstanceRef, Relation,
    RelationType,
};

/// An object graph whose Entity namespaces can be qualified and stripped
pub trait Decorate {
    /// Replace empty namespaces with `token`
    fn qualify(&mut self, token: &str);

    /// Replace namespaces equal to `token` with `""`
    fn strip(&mut self, token: &str);
}

fn qualify_namespace(namespace: &mut String, token: &str) {
    if namespace.is_empty() {
        *namespace = token.to_string();
    }
}

fn strip_namespace(namespace: &mut String, token: &str) {
    if namespace == token {
        namespace.clear();
    }
}

impl Decorate for EntityRef {
    fn qualify(&mut self, token: &str) {
        qualify_namespace(&mut self.namespace, token);
    }

    fn strip(&mut self, token: &str) {
        strip_namespace(&mut self.namespace, token);
    }
}

impl Decorate for Entity {
    fn qualify(&mut self, token: &str) {
        qualify_namespace(&mut self.namespace, token);
        self.attributes.qualify(token);
    }

    fn strip(&mut self, token: &str) {
        strip_namespace(&mut self.namespace, token);
        self.attributes.strip(token);
    }
}

impl Decorate for Attribute {
    fn qualify(&mut self, token: &str) {
        self.entity.qualify(token);
    }

    fn strip(&mut self, token: &str) {
        self.entity.strip(token);
    }
}

impl Decorate for InstanceRef {
    fn qualify(&mut self, token: &str) {
        self.entity.qualify(token);
    }

    fn strip(&mut self, token: &str) {
        self.entity.strip(token);
    }
}

impl Decorate for Instance {
    fn qualify(&mut self, token: &str) {
        self.entity.qualify(token);
        self.values.qualify(token);
    }

    fn strip(&mut self, token: &str) {
        self.entity.strip(token);
        self.values.strip(token);
    }
}

impl Decorate for AttributeValue {
    fn qualify(&mut self, token: &str) {
        self.attribute.qualify(token);
        self.instance.qualify(token);
    }

    fn strip(&mut self, token: &str) {
        self.attribute.strip(token);
        self.instance.strip(token);
    }
}

impl Decorate for RelationType {
    fn qualify(&mut self, token: &str) {
        self.source_entity.qualify(token);
        self.target_entity.qualify(token);
    }

    fn strip(&mut self, token: &str) {
        self.source_entity.strip(token);
        self.target_entity.strip(token);
    }
}

impl Decorate for Relation {
    fn qualify(&mut self, token: &str) {
        self.source.qualify(token);
        self.target.qualify(token);
    }

    fn strip(&mut self, token: &str) {
        self.source.strip(token);
        self.target.strip(token);
    }
}

impl<T: Decorate> Decorate for Option<T> {
    fn qualify(&mut self, token: &str) {
        if let Some(inner) = self {
            inner.qualify(token);
        }
    }

    fn strip(&mut self, token: &str) {
        if let Some(inner) = self {
            inner.strip(token);
        }
    }
}

impl<T: Decorate> Decorate for Vec<T> {
    fn qualify(&mut self, token: &str) {
        for item in self.iter_mut() {
            item.qualify(token);
        }
    }

    fn strip(&mut self, token: &str) {
        for item in self.iter_mut() {
            item.strip(token);
        }
    }
}

/// Applies the default-namespace token to objects crossing the store boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecorator {
    token: String,
}

impl NamespaceDecorator {
    /// Create a decorator for a namespace token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// The namespace token
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Qualified copy of an outgoing object
    pub fn on_write<T: Decorate + Clone>(&self, value: &T) -> T {
        let mut copy = value.clone();
        copy.qualify(&self.token);
        copy
    }

    /// Strip the token from an incoming object
    pub fn on_read<T: Decorate>(&self, mut value: T) -> T {
        value.strip(&self.token);
        value
    }

    /// Prefix a bare full name with the token; qualified names pass through
    pub fn qualify_full_name(&self, full_name: &str) -> String {
        if FullName::parse(full_name).qualified {
            full_name.to_string()
        } else {
            format!("{}.{}", self.token, full_name)
        }
    }
}
