//! Discriminator → factory lookup for polymorphic decode.

use crate::{Model, ParseNode, Parsable, RegistryError, Result, ODATA_TYPE};
use serde_json::Value;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// Creates the zero value of one concrete type.
pub type Factory = fn() -> Box<dyn Parsable>;

#[derive(Clone, Copy)]
struct Registration {
    type_id: TypeId,
    type_name: &'static str,
    factory: Factory,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

#[derive(Debug, Default)]
struct Subtypes {
    base_name: &'static str,
    by_discriminator: HashMap<&'static str, Registration>,
}

fn factory_of<T: Model>() -> Box<dyn Parsable> {
    Box::new(T::default())
}

/// Maps discriminator values to concrete types, per declared base type.
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    bases: HashMap<TypeId, Subtypes>,
}

impl TypeRegistry {
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::default()
    }

    /// Picks the factory for an object declared as `B` carrying `discriminator`.
    ///
    /// Falls back to `B` itself when the discriminator is absent or not registered under `B`.
    pub fn resolve<B: Model>(&self, discriminator: Option<&str>) -> Factory {
        let Some(tag) = discriminator else {
            return factory_of::<B>;
        };
        if B::DISCRIMINATOR == Some(tag) {
            return factory_of::<B>;
        }
        let found = self
            .bases
            .get(&TypeId::of::<B>())
            .and_then(|subtypes| subtypes.by_discriminator.get(tag));
        match found {
            Some(registration) => registration.factory,
            None => {
                tracing::debug!(
                    base = B::TYPE_NAME,
                    discriminator = tag,
                    "unrecognized discriminator, decoding as the base type"
                );
                factory_of::<B>
            }
        }
    }

    /// Creates the zero value of the concrete type named by the object's `"@odata.type"`.
    ///
    /// A discriminator that is not a string is treated as unrecognized.
    ///
    /// # Errors
    /// Shape mismatch if `node` is not an object.
    pub fn create<B: Model>(&self, node: &ParseNode<'_>) -> Result<Box<dyn Parsable>> {
        if !node.value().is_object() {
            return Err(node.shape_mismatch("object", node.value()));
        }
        let discriminator = match node.get_child_node(ODATA_TYPE) {
            None => None,
            Some(tag) => match tag.value() {
                Value::String(tag) => Some(tag.as_str()),
                Value::Null => None,
                other => {
                    tracing::debug!(
                        base = B::TYPE_NAME,
                        discriminator = %other,
                        "non-string discriminator, decoding as the base type"
                    );
                    None
                }
            },
        };
        Ok(self.resolve::<B>(discriminator)())
    }

    /// True if `discriminator` resolves to a type other than `B` itself.
    pub fn is_registered<B: Model>(&self, discriminator: &str) -> bool {
        self.bases
            .get(&TypeId::of::<B>())
            .map_or(false, |subtypes| subtypes.by_discriminator.contains_key(discriminator))
    }

    /// Discriminators resolvable from base `B`, in no particular order.
    pub fn discriminators<B: Model>(&self) -> Vec<&'static str> {
        self.bases
            .get(&TypeId::of::<B>())
            .map(|subtypes| subtypes.by_discriminator.keys().copied().collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Default)]
pub struct TypeRegistryBuilder {
    bases: HashMap<TypeId, Subtypes>,
}

impl TypeRegistryBuilder {
    /// Makes `S` resolvable from `S` and from every ancestor of `S`.
    ///
    /// # Errors
    /// [`RegistryError::MissingDiscriminator`] if `S` declares none, and
    /// [`RegistryError::Conflict`] if another type already claimed the discriminator under
    /// one of those bases. Registering the same type twice is allowed.
    pub fn register<S: Model>(mut self) -> std::result::Result<Self, RegistryError> {
        let discriminator = S::DISCRIMINATOR.ok_or(RegistryError::MissingDiscriminator {
            type_name: S::TYPE_NAME,
        })?;
        let registration = Registration {
            type_id: TypeId::of::<S>(),
            type_name: S::TYPE_NAME,
            factory: factory_of::<S>,
        };

        let prototype = S::default();
        let mut current: Option<&dyn Parsable> = Some(&prototype);
        while let Some(ancestor) = current {
            let subtypes = self
                .bases
                .entry(Any::type_id(ancestor.as_any()))
                .or_insert_with(|| Subtypes {
                    base_name: ancestor.type_name(),
                    by_discriminator: HashMap::new(),
                });
            if let Some(existing) = subtypes.by_discriminator.get(discriminator) {
                if existing.type_id != registration.type_id {
                    return Err(RegistryError::Conflict {
                        discriminator,
                        base: subtypes.base_name,
                        existing: existing.type_name,
                        incoming: S::TYPE_NAME,
                    });
                }
            }
            subtypes.by_discriminator.insert(discriminator, registration);
            current = ancestor.parent();
        }
        Ok(self)
    }

    pub fn build(self) -> TypeRegistry {
        TypeRegistry { bases: self.bases }
    }
}
