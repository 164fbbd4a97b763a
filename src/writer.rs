//! Streaming JSON writer used by every encode.

use crate::core::{FLOAT_INFINITY, FLOAT_NAN, FLOAT_NEG_INFINITY};
use crate::{AdditionalData, CodecError, Encoder, Result};
use bytes::{BufMut, Bytes, BytesMut};
use serde_json::Value;

/// How a field holding an absent scalar is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NullPolicy {
    /// Write the key with a `null` value.
    #[default]
    Emit,
    /// Leave the key out.
    Omit,
}

/// Options applied uniformly to one encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterOptions {
    pub null_values: NullPolicy,
    /// Write `"@odata.type"` first in every object whose type declares a discriminator.
    pub emit_discriminator: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            null_values: NullPolicy::Emit,
            emit_discriminator: true,
        }
    }
}

impl WriterOptions {
    pub fn with_null_values(mut self, policy: NullPolicy) -> Self {
        self.null_values = policy;
        self
    }

    pub fn with_emit_discriminator(mut self, emit: bool) -> Self {
        self.emit_discriminator = emit;
        self
    }
}

/// Writes compact JSON into a growable buffer.
///
/// Tracks object/array nesting so commas and colons are placed automatically; callers
/// only sequence keys and values.
#[derive(Debug, Default)]
pub struct SerializationWriter {
    buf: BytesMut,
    options: WriterOptions,
    /// One entry per open object or array: whether it already holds a member.
    scopes: Vec<bool>,
    after_key: bool,
}

impl SerializationWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: WriterOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// Writes `"name": value`, honoring the absent-value rules of `V` and the null policy.
    pub fn write_field<V: Encoder + ?Sized>(&mut self, name: &str, value: &V) -> Result<()> {
        if value.is_absent()
            && (V::OMIT_WHEN_ABSENT || self.options.null_values == NullPolicy::Omit)
        {
            return Ok(());
        }
        self.write_key(name)?;
        value.encode(self)
    }

    pub fn write_key(&mut self, key: &str) -> Result<()> {
        if self.after_key {
            return Err(CodecError::Writer {
                reason: format!("key {key:?} written where a value was expected"),
            });
        }
        self.separate();
        serde_json::to_writer((&mut self.buf).writer(), key)?;
        self.buf.put_u8(b':');
        self.after_key = true;
        Ok(())
    }

    pub fn write_null(&mut self) -> Result<()> {
        self.raw(b"null");
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.raw(if value { &b"true"[..] } else { &b"false"[..] });
        Ok(())
    }

    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.begin_value();
        serde_json::to_writer((&mut self.buf).writer(), &value)?;
        Ok(())
    }

    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.begin_value();
        serde_json::to_writer((&mut self.buf).writer(), &value)?;
        Ok(())
    }

    /// Finite values are written as numbers; NaN and the infinities as the strings
    /// `"NaN"`, `"INF"` and `"-INF"`.
    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        if value.is_nan() {
            return self.write_str(FLOAT_NAN);
        }
        if value.is_infinite() {
            return self.write_str(if value > 0.0 {
                FLOAT_INFINITY
            } else {
                FLOAT_NEG_INFINITY
            });
        }
        self.begin_value();
        serde_json::to_writer((&mut self.buf).writer(), &value)?;
        Ok(())
    }

    pub fn write_str(&mut self, value: &str) -> Result<()> {
        self.begin_value();
        serde_json::to_writer((&mut self.buf).writer(), value)?;
        Ok(())
    }

    pub fn write_untyped_value(&mut self, value: &Value) -> Result<()> {
        self.begin_value();
        serde_json::to_writer((&mut self.buf).writer(), value)?;
        Ok(())
    }

    pub fn begin_object(&mut self) -> Result<()> {
        self.begin_value();
        self.buf.put_u8(b'{');
        self.scopes.push(false);
        Ok(())
    }

    pub fn end_object(&mut self) -> Result<()> {
        self.close(b'}')
    }

    pub fn begin_array(&mut self) -> Result<()> {
        self.begin_value();
        self.buf.put_u8(b'[');
        self.scopes.push(false);
        Ok(())
    }

    pub fn end_array(&mut self) -> Result<()> {
        self.close(b']')
    }

    /// Writes every entry of `data` as a member of the current object, in stored order,
    /// except the keys for which `shadowed` returns true.
    pub fn write_additional_data(
        &mut self,
        data: &AdditionalData,
        shadowed: impl Fn(&str) -> bool,
    ) -> Result<()> {
        for (key, value) in data {
            if shadowed(key.as_str()) {
                tracing::warn!(
                    field = %key,
                    "additional data entry shadows a declared field and is not written"
                );
                continue;
            }
            self.write_key(key)?;
            self.write_untyped_value(value)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }

    fn raw(&mut self, bytes: &[u8]) {
        self.begin_value();
        self.buf.put_slice(bytes);
    }

    fn close(&mut self, byte: u8) -> Result<()> {
        if self.after_key || self.scopes.pop().is_none() {
            return Err(CodecError::Writer {
                reason: "unbalanced end of object or array".to_owned(),
            });
        }
        self.buf.put_u8(byte);
        Ok(())
    }

    fn separate(&mut self) {
        if let Some(has_members) = self.scopes.last_mut() {
            if *has_members {
                self.buf.put_u8(b',');
            }
            *has_members = true;
        }
    }

    fn begin_value(&mut self) {
        if self.after_key {
            self.after_key = false;
        } else {
            self.separate();
        }
    }
}
