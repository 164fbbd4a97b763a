use crate::*;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use serde_json::{Number, Value};

/// Wire spellings of the non-finite floating point values.
pub const FLOAT_NAN: &str = "NaN";
pub const FLOAT_INFINITY: &str = "INF";
pub const FLOAT_NEG_INFINITY: &str = "-INF";

// --- bool ---
impl Encoder for bool {
    fn encode(&self, writer: &mut SerializationWriter) -> Result<()> {
        writer.write_bool(*self)
    }
}

/// Decodes a JSON `true`/`false`.
///
/// # Errors
/// Returns a shape mismatch for any other JSON value, including strings like `"true"`.
impl Decoder for bool {
    fn decode(node: &ParseNode<'_>) -> Result<Self> {
        match node.value() {
            Value::Bool(b) => Ok(*b),
            other => Err(node.shape_mismatch("boolean", other)),
        }
    }
}

// --- Integer types ---
fn number<'a>(node: &ParseNode<'a>) -> Result<&'a Number> {
    match node.value() {
        Value::Number(n) => Ok(n),
        other => Err(node.shape_mismatch("integer", other)),
    }
}

/// Signed integers are written as JSON numbers and must fit the declared width on decode.
macro_rules! impl_signed {
    ($($t:ty),*) => {
        $(
            impl Encoder for $t {
                fn encode(&self, writer: &mut SerializationWriter) -> Result<()> {
                    writer.write_i64(i64::from(*self))
                }
            }
            impl Decoder for $t {
                fn decode(node: &ParseNode<'_>) -> Result<Self> {
                    let n = number(node)?;
                    n.as_i64()
                        .and_then(|v| <$t>::try_from(v).ok())
                        .ok_or_else(|| node.invalid_value(stringify!($t), n.to_string()))
                }
            }
        )*
    };
}
impl_signed!(i8, i16, i32, i64);

macro_rules! impl_unsigned {
    ($($t:ty),*) => {
        $(
            impl Encoder for $t {
                fn encode(&self, writer: &mut SerializationWriter) -> Result<()> {
                    writer.write_u64(u64::from(*self))
                }
            }
            impl Decoder for $t {
                fn decode(node: &ParseNode<'_>) -> Result<Self> {
                    let n = number(node)?;
                    n.as_u64()
                        .and_then(|v| <$t>::try_from(v).ok())
                        .ok_or_else(|| node.invalid_value(stringify!($t), n.to_string()))
                }
            }
        )*
    };
}
impl_unsigned!(u8, u16, u32, u64);

// --- f32/f64 ---
/// Accepts any JSON number, and the strings `"NaN"`, `"INF"` and `"-INF"`.
fn decode_float(node: &ParseNode<'_>) -> Result<f64> {
    match node.value() {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| node.invalid_value("float", n.to_string())),
        Value::String(s) => match s.as_str() {
            FLOAT_NAN => Ok(f64::NAN),
            FLOAT_INFINITY => Ok(f64::INFINITY),
            FLOAT_NEG_INFINITY => Ok(f64::NEG_INFINITY),
            _ => Err(node.invalid_value("float", s.clone())),
        },
        other => Err(node.shape_mismatch("number", other)),
    }
}

impl Encoder for f64 {
    fn encode(&self, writer: &mut SerializationWriter) -> Result<()> {
        writer.write_f64(*self)
    }
}

impl Decoder for f64 {
    fn decode(node: &ParseNode<'_>) -> Result<Self> {
        decode_float(node)
    }
}

impl Encoder for f32 {
    fn encode(&self, writer: &mut SerializationWriter) -> Result<()> {
        writer.write_f64(f64::from(*self))
    }
}

impl Decoder for f32 {
    /// Fails if a finite value overflows `f32`.
    fn decode(node: &ParseNode<'_>) -> Result<Self> {
        let value = decode_float(node)?;
        let narrowed = value as f32;
        if value.is_finite() && !narrowed.is_finite() {
            return Err(node.invalid_value("f32", value.to_string()));
        }
        Ok(narrowed)
    }
}

// --- String ---
impl Encoder for str {
    fn encode(&self, writer: &mut SerializationWriter) -> Result<()> {
        writer.write_str(self)
    }
}

impl Encoder for String {
    fn encode(&self, writer: &mut SerializationWriter) -> Result<()> {
        writer.write_str(self)
    }
}

impl Decoder for String {
    fn decode(node: &ParseNode<'_>) -> Result<Self> {
        node.as_str().map(str::to_owned)
    }
}

impl<T: Encoder + ?Sized> Encoder for &T {
    const OMIT_WHEN_ABSENT: bool = T::OMIT_WHEN_ABSENT;

    fn encode(&self, writer: &mut SerializationWriter) -> Result<()> {
        (**self).encode(writer)
    }

    fn is_absent(&self) -> bool {
        (**self).is_absent()
    }
}

// --- Bytes ---
/// Byte arrays travel as standard base64 strings.
impl Encoder for Bytes {
    fn encode(&self, writer: &mut SerializationWriter) -> Result<()> {
        writer.write_str(&STANDARD.encode(self))
    }
}

impl Decoder for Bytes {
    fn decode(node: &ParseNode<'_>) -> Result<Self> {
        let text = node.as_str()?;
        STANDARD
            .decode(text)
            .map(Bytes::from)
            .map_err(|_| node.invalid_value("base64", text))
    }
}

// --- Untyped values ---
/// Any JSON value, kept as-is. Used for open-typed schema properties.
impl Encoder for Value {
    fn encode(&self, writer: &mut SerializationWriter) -> Result<()> {
        writer.write_untyped_value(self)
    }
}

impl Decoder for Value {
    fn decode(node: &ParseNode<'_>) -> Result<Self> {
        Ok(node.value().clone())
    }
}

// --- Option ---
/// `None` is the absent value: a field holding it is written as `null` or left out,
/// depending on `T` and the writer's null policy.
impl<T: Encoder> Encoder for Option<T> {
    const OMIT_WHEN_ABSENT: bool = T::OMIT_WHEN_ABSENT;

    fn encode(&self, writer: &mut SerializationWriter) -> Result<()> {
        match self {
            Some(value) => value.encode(writer),
            None => writer.write_null(),
        }
    }

    fn is_absent(&self) -> bool {
        self.is_none()
    }
}

/// A present-but-null value decodes to `None`.
impl<T: Decoder> Decoder for Option<T> {
    fn decode(node: &ParseNode<'_>) -> Result<Self> {
        if node.is_null() {
            Ok(None)
        } else {
            T::decode(node).map(Some)
        }
    }
}

// --- Vec ---
/// Homogeneous collections keep wire order in both directions.
impl<T: Encoder> Encoder for Vec<T> {
    const OMIT_WHEN_ABSENT: bool = true;

    fn encode(&self, writer: &mut SerializationWriter) -> Result<()> {
        writer.begin_array()?;
        for item in self {
            item.encode(writer)?;
        }
        writer.end_array()
    }
}

impl<T: Decoder> Decoder for Vec<T> {
    fn decode(node: &ParseNode<'_>) -> Result<Self> {
        let items = match node.value() {
            Value::Array(items) => items,
            other => return Err(node.shape_mismatch("array", other)),
        };
        items
            .iter()
            .enumerate()
            .map(|(index, item)| T::decode(&node.element(index, item)))
            .collect()
    }
}
