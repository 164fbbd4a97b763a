use crate::{
    AdditionalData, Decoder, Encoder, FieldTable, ParseNode, Result, SerializationWriter,
    ODATA_TYPE,
};
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

/// A schema type: its name, optional wire discriminator, parent and field table.
///
/// Usually implemented with `#[derive(Model)]`. A derived type embeds its parent as a field
/// and reports it from [`Model::parent_model`]; a root type owns the [`AdditionalData`] store.
pub trait Model: Default + Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    const TYPE_NAME: &'static str;
    /// Value of `"@odata.type"` that selects this type. Types without one can still be
    /// decoded and embedded, but cannot be registered.
    const DISCRIMINATOR: Option<&'static str> = None;

    /// The effective table: every ancestor's fields first, then this type's own.
    fn field_table() -> &'static FieldTable<Self>;

    fn parent_model(&self) -> Option<&(dyn Parsable + 'static)> {
        None
    }

    fn parent_model_mut(&mut self) -> Option<&mut (dyn Parsable + 'static)> {
        None
    }

    fn additional_data_store(&self) -> &AdditionalData;

    fn additional_data_store_mut(&mut self) -> &mut AdditionalData;
}

/// Object-safe view of any model instance.
///
/// Blanket-implemented for every [`Model`]; this is what the reader feeds fields into and
/// what the writer walks.
pub trait Parsable: Any + Send + Sync + fmt::Debug {
    fn type_name(&self) -> &'static str;

    fn discriminator(&self) -> Option<&'static str>;

    /// Wire names of the effective field set, in encode order.
    fn field_names(&self) -> Vec<&'static str>;

    fn has_field(&self, name: &str) -> bool;

    /// Decodes `node` into the field called `name`.
    ///
    /// Returns `Ok(false)` without touching the instance if no such field exists.
    fn deserialize_field(&mut self, name: &str, node: &ParseNode<'_>) -> Result<bool>;

    /// Writes this instance as one JSON object.
    fn serialize(&self, writer: &mut SerializationWriter) -> Result<()>;

    fn additional_data(&self) -> &AdditionalData;

    fn additional_data_mut(&mut self) -> &mut AdditionalData;

    fn parent(&self) -> Option<&(dyn Parsable + 'static)>;

    fn parent_mut(&mut self) -> Option<&mut (dyn Parsable + 'static)>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn clone_boxed(&self) -> Box<dyn Parsable>;

    fn dyn_eq(&self, other: &dyn Parsable) -> bool;
}

impl<T: Model> Parsable for T {
    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn discriminator(&self) -> Option<&'static str> {
        T::DISCRIMINATOR
    }

    fn field_names(&self) -> Vec<&'static str> {
        T::field_table().names().collect()
    }

    fn has_field(&self, name: &str) -> bool {
        T::field_table().contains(name)
    }

    fn deserialize_field(&mut self, name: &str, node: &ParseNode<'_>) -> Result<bool> {
        match T::field_table().get(name) {
            Some(codec) => {
                codec.decode(self, node)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn serialize(&self, writer: &mut SerializationWriter) -> Result<()> {
        let table = T::field_table();
        writer.begin_object()?;
        if writer.options().emit_discriminator {
            let retained = self.additional_data_store().discriminator();
            if let Some(tag) = T::DISCRIMINATOR.map(|own| retained.unwrap_or(own)) {
                writer.write_field(ODATA_TYPE, tag)?;
            }
        }
        table.encode_fields(self, writer)?;
        writer.write_additional_data(self.additional_data_store(), |key| {
            key == ODATA_TYPE || table.contains(key)
        })?;
        writer.end_object()
    }

    fn additional_data(&self) -> &AdditionalData {
        self.additional_data_store()
    }

    fn additional_data_mut(&mut self) -> &mut AdditionalData {
        self.additional_data_store_mut()
    }

    fn parent(&self) -> Option<&(dyn Parsable + 'static)> {
        self.parent_model()
    }

    fn parent_mut(&mut self) -> Option<&mut (dyn Parsable + 'static)> {
        self.parent_model_mut()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn Parsable> {
        Box::new(self.clone())
    }

    fn dyn_eq(&self, other: &dyn Parsable) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .map_or(false, |other| self == other)
    }
}

impl dyn Parsable {
    /// True if the concrete type of this instance is exactly `T`.
    pub fn is<T: Parsable>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// This instance seen as `T`, where `T` is its concrete type or any ancestor.
    pub fn view<T: Parsable>(&self) -> Option<&T> {
        match self.as_any().downcast_ref::<T>() {
            Some(found) => Some(found),
            None => self.parent()?.view::<T>(),
        }
    }

    pub fn view_mut<T: Parsable>(&mut self) -> Option<&mut T> {
        if self.is::<T>() {
            return self.as_any_mut().downcast_mut::<T>();
        }
        self.parent_mut()?.view_mut::<T>()
    }
}

/// A polymorphic instance whose concrete type is `B` or a descendant of `B`.
///
/// Dereferences to the `B` part of the instance.
pub struct Instance<B: Model> {
    inner: Box<dyn Parsable>,
    marker: PhantomData<fn() -> B>,
}

impl<B: Model> Instance<B> {
    pub fn new(value: B) -> Self {
        Self::from_boxed(Box::new(value))
    }

    /// Wraps a value of a descendant type. Gives the value back if `S` does not derive from `B`.
    pub fn from_subtype<S: Model>(value: S) -> std::result::Result<Self, S> {
        if (&value as &dyn Parsable).view::<B>().is_none() {
            return Err(value);
        }
        Ok(Self::from_boxed(Box::new(value)))
    }

    /// `inner` must have `B` in its ancestry.
    pub(crate) fn from_boxed(inner: Box<dyn Parsable>) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }

    pub fn get(&self) -> &B {
        match self.inner.view::<B>() {
            Some(base) => base,
            None => unreachable!("{} does not derive from {}", self.inner.type_name(), B::TYPE_NAME),
        }
    }

    pub fn get_mut(&mut self) -> &mut B {
        let type_name = self.inner.type_name();
        match self.inner.view_mut::<B>() {
            Some(base) => base,
            None => unreachable!("{} does not derive from {}", type_name, B::TYPE_NAME),
        }
    }

    /// The instance seen as `S`, if `S` is its concrete type or an ancestor of it.
    pub fn downcast_ref<S: Model>(&self) -> Option<&S> {
        self.inner.view::<S>()
    }

    pub fn downcast_mut<S: Model>(&mut self) -> Option<&mut S> {
        self.inner.view_mut::<S>()
    }

    /// True if the concrete type is exactly `S`.
    pub fn is<S: Model>(&self) -> bool {
        self.inner.is::<S>()
    }

    pub fn type_name(&self) -> &'static str {
        self.inner.type_name()
    }

    pub fn discriminator(&self) -> Option<&'static str> {
        self.inner.discriminator()
    }

    pub fn as_parsable(&self) -> &dyn Parsable {
        &*self.inner
    }

    pub fn as_parsable_mut(&mut self) -> &mut dyn Parsable {
        &mut *self.inner
    }

    pub fn into_inner(self) -> Box<dyn Parsable> {
        self.inner
    }
}

impl<B: Model> Deref for Instance<B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.get()
    }
}

impl<B: Model> DerefMut for Instance<B> {
    fn deref_mut(&mut self) -> &mut B {
        self.get_mut()
    }
}

impl<B: Model> From<B> for Instance<B> {
    fn from(value: B) -> Self {
        Self::new(value)
    }
}

impl<B: Model> Default for Instance<B> {
    fn default() -> Self {
        Self::new(B::default())
    }
}

impl<B: Model> Clone for Instance<B> {
    fn clone(&self) -> Self {
        Self::from_boxed(self.inner.clone_boxed())
    }
}

impl<B: Model> PartialEq for Instance<B> {
    fn eq(&self, other: &Self) -> bool {
        self.inner.dyn_eq(&*other.inner)
    }
}

impl<B: Model> fmt::Debug for Instance<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner, f)
    }
}

impl<B: Model> Encoder for Instance<B> {
    const OMIT_WHEN_ABSENT: bool = true;

    fn encode(&self, writer: &mut SerializationWriter) -> Result<()> {
        self.inner.serialize(writer)
    }
}

impl<B: Model> Decoder for Instance<B> {
    fn decode(node: &ParseNode<'_>) -> Result<Self> {
        let mut inner = node.registry().create::<B>(node)?;
        node.assign_field_values(&mut *inner)?;
        Ok(Self::from_boxed(inner))
    }
}
