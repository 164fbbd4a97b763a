//! Generic reader over a parsed JSON payload.

use crate::{
    CodecError, Decoder, Instance, Model, Parsable, Result, TypeRegistry, WireEnum, ODATA_TYPE,
};
use bytes::Bytes;
use serde_json::Value;
use std::fmt::Write as _;

/// What a decode does with an enum string that names no declared member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownEnumPolicy {
    /// Map to the enum's `#[wire(unknown)]` member. Enums without one still error.
    #[default]
    FutureValue,
    /// Always error.
    Reject,
}

/// Options applied uniformly to one decode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub unknown_enum_members: UnknownEnumPolicy,
}

impl ParseOptions {
    pub fn with_unknown_enum_members(mut self, policy: UnknownEnumPolicy) -> Self {
        self.unknown_enum_members = policy;
        self
    }
}

#[derive(Debug, Clone, Copy)]
enum Segment<'a> {
    Root,
    Key(&'a str),
    Index(usize),
}

/// A cursor into a parsed payload.
///
/// Carries the registry and options of the decode, and a link to its parent node so errors
/// can name the offending path (`$.value[2].manager.displayName`).
#[derive(Debug, Clone, Copy)]
pub struct ParseNode<'a> {
    value: &'a Value,
    registry: &'a TypeRegistry,
    options: &'a ParseOptions,
    parent: Option<&'a ParseNode<'a>>,
    segment: Segment<'a>,
}

impl<'a> ParseNode<'a> {
    pub fn new(value: &'a Value, registry: &'a TypeRegistry, options: &'a ParseOptions) -> Self {
        Self {
            value,
            registry,
            options,
            parent: None,
            segment: Segment::Root,
        }
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }

    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    pub fn options(&self) -> &'a ParseOptions {
        self.options
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    /// Child node for a member of this object, or `None` if the key is absent.
    pub fn get_child_node<'b>(&'b self, key: &'b str) -> Option<ParseNode<'b>> {
        let value = self.value.as_object()?.get(key)?;
        Some(self.child(key, value))
    }

    /// Child node for a member value that was obtained by iterating this node's object.
    pub fn child<'b>(&'b self, key: &'b str, value: &'b Value) -> ParseNode<'b> {
        ParseNode {
            value,
            registry: self.registry,
            options: self.options,
            parent: Some(self),
            segment: Segment::Key(key),
        }
    }

    pub fn element<'b>(&'b self, index: usize, value: &'b Value) -> ParseNode<'b> {
        ParseNode {
            value,
            registry: self.registry,
            options: self.options,
            parent: Some(self),
            segment: Segment::Index(index),
        }
    }

    /// JSONPath-like location of this node.
    pub fn path(&self) -> String {
        let mut segments = Vec::new();
        let mut current = Some(self);
        while let Some(node) = current {
            segments.push(node.segment);
            current = node.parent;
        }
        let mut out = String::new();
        for segment in segments.into_iter().rev() {
            match segment {
                Segment::Root => out.push('$'),
                Segment::Key(key) if is_plain_key(key) => {
                    out.push('.');
                    out.push_str(key);
                }
                Segment::Key(key) => {
                    let _ = write!(out, "[{:?}]", key);
                }
                Segment::Index(index) => {
                    let _ = write!(out, "[{}]", index);
                }
            }
        }
        out
    }

    pub fn read<T: Decoder>(&self) -> Result<T> {
        T::decode(self)
    }

    /// Decodes this object as exactly `T`, without consulting the discriminator.
    pub fn read_model<T: Model>(&self) -> Result<T> {
        let mut model = T::default();
        self.assign_field_values(&mut model)?;
        Ok(model)
    }

    /// Feeds every member of this object to `target`.
    ///
    /// Members the target's field table does not know are stored in its additional data.
    /// A string discriminator naming a type other than the target's own is retained so the
    /// object re-encodes under the tag it arrived with. Any other discriminator is dropped.
    pub fn assign_field_values(&self, target: &mut dyn Parsable) -> Result<()> {
        let members = match self.value {
            Value::Object(members) => members,
            other => return Err(self.shape_mismatch("object", other)),
        };
        for (key, value) in members {
            if key == ODATA_TYPE {
                if let (Value::String(tag), Some(own)) = (value, target.discriminator()) {
                    if tag.as_str() != own {
                        tracing::debug!(
                            type_name = target.type_name(),
                            discriminator = %tag,
                            "retaining unresolved discriminator"
                        );
                        target.additional_data_mut().set_discriminator(Some(tag.clone()));
                    }
                }
                continue;
            }
            let child = self.child(key, value);
            if !target.deserialize_field(key, &child)? {
                tracing::trace!(
                    type_name = target.type_name(),
                    field = %key,
                    "unknown field kept in additional data"
                );
                target.additional_data_mut().insert(key.clone(), value.clone());
            }
        }
        Ok(())
    }

    pub fn get_bool_value(&self) -> Result<Option<bool>> {
        self.read()
    }

    pub fn get_i32_value(&self) -> Result<Option<i32>> {
        self.read()
    }

    pub fn get_i64_value(&self) -> Result<Option<i64>> {
        self.read()
    }

    pub fn get_f64_value(&self) -> Result<Option<f64>> {
        self.read()
    }

    pub fn get_string_value(&self) -> Result<Option<String>> {
        self.read()
    }

    pub fn get_byte_array_value(&self) -> Result<Option<Bytes>> {
        self.read()
    }

    pub fn get_enum_value<E: WireEnum + Decoder>(&self) -> Result<Option<E>> {
        self.read()
    }

    /// Resolves the concrete type through the registry, then decodes the object.
    pub fn get_object_value<B: Model>(&self) -> Result<Option<Instance<B>>> {
        self.read()
    }

    pub fn get_collection_of_object_values<B: Model>(&self) -> Result<Option<Vec<Instance<B>>>> {
        self.read()
    }

    pub fn get_collection_of_primitive_values<T: Decoder>(&self) -> Result<Option<Vec<T>>> {
        self.read()
    }

    pub fn get_collection_of_enum_values<E: WireEnum + Decoder>(
        &self,
    ) -> Result<Option<Vec<E>>> {
        self.read()
    }

    /// The value as-is, `None` for `null`.
    pub fn get_untyped_value(&self) -> Option<Value> {
        if self.is_null() {
            None
        } else {
            Some(self.value.clone())
        }
    }

    pub fn as_str(&self) -> Result<&'a str> {
        match self.value {
            Value::String(s) => Ok(s),
            other => Err(self.shape_mismatch("string", other)),
        }
    }

    pub fn shape_mismatch(&self, expected: &'static str, found: &Value) -> CodecError {
        CodecError::ShapeMismatch {
            path: self.path(),
            expected,
            found: kind_of(found),
        }
    }

    pub fn invalid_value(&self, kind: &'static str, value: impl Into<String>) -> CodecError {
        CodecError::InvalidValue {
            path: self.path(),
            kind,
            value: value.into(),
        }
    }
}

/// JSON shape name of a value, as used in shape mismatch errors.
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_plain_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '@')
}
