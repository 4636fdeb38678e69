//! The store as the managers see it
//!
//! [`DecoratedStore`] wraps the backend with the namespace decoration and a
//! transaction helper. Decoration is an explicit transform applied around
//! each call, not a second implementation of the store traits:
//!
//! ```ignore
//! let created = store.write(&entity, |s, e| s.entities().create(e))?;
//! let found = store.read(|s| s.entities().find_by_id(id))?;
//! ```

use std::sync::Arc;

use tracing::warn;

use metakernel_core::{MetadataStore, Result};

use crate::namespace::{Decorate, NamespaceDecorator};

/// Backend plus default-namespace decoration
#[derive(Clone)]
pub struct DecoratedStore {
    inner: Arc<dyn MetadataStore>,
    decorator: NamespaceDecorator,
}

impl DecoratedStore {
    /// Wrap a backend
    pub fn new(inner: Arc<dyn MetadataStore>, decorator: NamespaceDecorator) -> Self {
        Self { inner, decorator }
    }

    /// The undecorated backend, for calls that carry no namespaces
    pub fn raw(&self) -> &dyn MetadataStore {
        self.inner.as_ref()
    }

    pub(crate) fn raw_arc(&self) -> &Arc<dyn MetadataStore> {
        &self.inner
    }

    /// The decorator in use
    pub fn decorator(&self) -> &NamespaceDecorator {
        &self.decorator
    }

    /// Qualify `value`, hand the copy to `op`, strip the result
    pub fn write<T, R, F>(&self, value: &T, op: F) -> Result<R>
    where
        T: Decorate + Clone,
        R: Decorate,
        F: FnOnce(&dyn MetadataStore, &T) -> Result<R>,
    {
        let qualified = self.decorator.on_write(value);
        op(self.raw(), &qualified).map(|result| self.decorator.on_read(result))
    }

    /// Run `op` and strip the result
    pub fn read<R, F>(&self, op: F) -> Result<R>
    where
        R: Decorate,
        F: FnOnce(&dyn MetadataStore) -> Result<R>,
    {
        op(self.raw()).map(|result| self.decorator.on_read(result))
    }

    /// Full name as the store knows it
    pub fn qualify_full_name(&self, full_name: &str) -> String {
        self.decorator.qualify_full_name(full_name)
    }

    /// Run `op` inside one backend transaction
    ///
    /// Commits on `Ok`. On `Err` rolls back and returns the original error;
    /// a failing rollback is logged, not returned.
    pub fn transaction<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        self.inner.begin()?;
        match op() {
            Ok(value) => {
                self.inner.commit()?;
                Ok(value)
            }
            Err(error) => {
                if let Err(rollback_error) = self.inner.rollback() {
                    warn!(target: "metakernel::store", error = %rollback_error, "Rollback failed");
                }
                warn!(target: "metakernel::store", error = %error, "Transaction rolled back");
                Err(error)
            }
        }
    }
}

impl std::fmt::Debug for DecoratedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoratedStore")
            .field("default_namespace", &self.decorator.token())
            .finish()
    }
}
