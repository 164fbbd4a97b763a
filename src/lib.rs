//! # polywire
//!
//! Polymorphic, schema-evolution-friendly JSON object models for generated API clients.
//!
//! - Decodes loosely-typed wire payloads into strongly typed, possibly subclassed object graphs
//! - Resolves concrete types from the reserved `"@odata.type"` discriminator, degrading to the declared base type when the tag is unknown and keeping the tag for re-encode
//! - Field dispatch tables compose through a single-inheritance chain (parent table first, own fields overlaid)
//! - Enum codec with a reserved "unknown future value" member
//! - Fields unknown to the current schema are kept in a per-instance [`AdditionalData`] store and written back verbatim
//! - Paginated collection envelope ([`CollectionResponse`]) built on the same machinery
//!
//! ## Derive Macros
//!
//! Models are plain structs. `#[derive(Model)]` generates the field table, ancestry links and
//! additional-data plumbing; `#[derive(WireEnum)]` generates the enum codec.
//!
//! Struct attributes:
//! - `#[wire(type_name = "name")]` — Schema type name reported by [`Model::TYPE_NAME`]. Defaults to the struct name.
//! - `#[wire(discriminator = "#ns.type")]` — Wire type tag of this concrete type.
//!
//! Field attributes:
//! - `#[wire(parent)]` — The embedded parent model. Its fields are inherited.
//! - `#[wire(additional_data)]` — The [`AdditionalData`] store of a root model.
//! - `#[wire(rename = "name")]` — Wire name of the field. Defaults to the lowerCamelCase field name.
//! - `#[wire(skip)]` — Field is not part of the wire format.
//!
//! Enum variant attributes:
//! - `#[wire(rename = "name")]` — Wire string of the member. Defaults to the lowerCamelCase variant name.
//! - `#[wire(unknown)]` — Marks the last member as the "unknown future value".
//!
//! ## Feature Flags
//!
//! - `chrono` (default) — Enables `chrono::DateTime`, `NaiveDate`, `NaiveTime` and `NaiveDateTime` fields.
//! - `uuid` (default) — Enables `uuid::Uuid` fields.
//!
//! ## Example
//!
//! ```rust
//! use polywire::{AdditionalData, Model, TypeRegistry};
//!
//! #[derive(Model, Debug, Clone, Default, PartialEq)]
//! #[wire(discriminator = "#example.entity")]
//! struct Entity {
//!     id: Option<String>,
//!     #[wire(additional_data)]
//!     additional_data: AdditionalData,
//! }
//!
//! #[derive(Model, Debug, Clone, Default, PartialEq)]
//! #[wire(discriminator = "#example.user")]
//! struct User {
//!     #[wire(parent)]
//!     entity: Entity,
//!     display_name: Option<String>,
//! }
//!
//! let registry = TypeRegistry::builder().register::<User>().unwrap().build();
//! let payload = br##"{"@odata.type":"#example.user","id":"1","displayName":"Ada","extra":true}"##;
//! let entity = polywire::decode::<Entity>(payload, &registry).unwrap();
//!
//! let user = entity.downcast_ref::<User>().unwrap();
//! assert_eq!(user.display_name.as_deref(), Some("Ada"));
//! assert_eq!(entity.id.as_deref(), Some("1"));
//!
//! let bytes = polywire::encode(entity.as_parsable()).unwrap();
//! assert_eq!(
//!     &bytes[..],
//!     &br##"{"@odata.type":"#example.user","id":"1","displayName":"Ada","extra":true}"##[..]
//! );
//! ```

extern crate self as polywire;

mod additional_data;
pub mod collection;
pub mod core;
mod enums;
mod features;
mod model;
mod reader;
mod registry;
mod table;
mod writer;

pub use additional_data::AdditionalData;
pub use collection::{BaseCollectionPaginationCountResponse, CollectionResponse};
pub use enums::{decode_wire_enum, WireEnum};
pub use model::{Instance, Model, Parsable};
pub use polywire_derive::{Model, WireEnum};
pub use reader::{ParseNode, ParseOptions, UnknownEnumPolicy};
pub use registry::{Factory, TypeRegistry, TypeRegistryBuilder};
pub use table::{memoized_table, FieldCodec, FieldTable};
pub use writer::{NullPolicy, SerializationWriter, WriterOptions};

use bytes::Bytes;
use std::io;
use std::sync::Arc;

/// Reserved wire key carrying the concrete schema type of a polymorphic object.
pub const ODATA_TYPE: &str = "@odata.type";

/// Errors that can occur during encoding or decoding operations.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The payload is not well-formed JSON, or the writer could not render a value.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Reading the payload or writing the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The wire value has a different JSON shape than the field declares.
    #[error("{path}: expected {expected}, found {found}")]
    ShapeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
    /// The wire value has the right shape but cannot be converted (bad timestamp, bad base64, out of range).
    #[error("{path}: invalid {kind} value {value:?}")]
    InvalidValue {
        path: String,
        kind: &'static str,
        value: String,
    },
    /// An enum string was rejected by the active [`UnknownEnumPolicy`].
    #[error("{path}: {source}")]
    Enum {
        path: String,
        #[source]
        source: EnumDecodeError,
    },
    /// Type registration error.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// Writer calls out of order, such as a key where a value belongs or an unmatched close.
    #[error("serialization writer misuse: {reason}")]
    Writer { reason: String },
}

/// The result type used throughout this crate for encode/decode operations.
pub type Result<T> = std::result::Result<T, CodecError>;

/// Enum-specific decode error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnumDecodeError {
    #[error("unknown wire value {value:?} for enum {enum_name}")]
    UnknownMember {
        enum_name: &'static str,
        value: String,
    },
}

/// Errors raised while building a [`TypeRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("type {type_name} declares no discriminator and cannot be registered")]
    MissingDiscriminator { type_name: &'static str },
    #[error("discriminator {discriminator:?} under {base} is already registered to {existing}; cannot register {incoming}")]
    Conflict {
        discriminator: &'static str,
        base: &'static str,
        existing: &'static str,
        incoming: &'static str,
    },
}

/// Trait for values that can be written as a single JSON value.
///
/// Implemented for scalars, strings, byte arrays, untyped values, `Option`, `Vec`,
/// [`Instance`] and every `#[derive(WireEnum)]` type.
pub trait Encoder {
    /// Whether a field holding an absent value of this type is left out entirely
    /// instead of being written as `null`. True for nested objects and collections.
    const OMIT_WHEN_ABSENT: bool = false;

    /// Write the value at the writer's current position.
    fn encode(&self, writer: &mut SerializationWriter) -> Result<()>;

    /// Returns true if this value is the "absent" representation (`None`).
    fn is_absent(&self) -> bool {
        false
    }
}

/// Trait for values that can be read from a [`ParseNode`].
///
/// # Errors
/// Returns [`CodecError::ShapeMismatch`] when the wire value has the wrong JSON shape and
/// [`CodecError::InvalidValue`] when it cannot be converted.
pub trait Decoder: Sized {
    fn decode(node: &ParseNode<'_>) -> Result<Self>;
}

/// Convenience function to decode a polymorphic object of base type `B` from a JSON payload.
///
/// The concrete type is resolved through `registry`; unknown fields land in the
/// instance's [`AdditionalData`].
pub fn decode<B: Model>(payload: &[u8], registry: &TypeRegistry) -> Result<Instance<B>> {
    let value: serde_json::Value = serde_json::from_slice(payload)?;
    let options = ParseOptions::default();
    ParseNode::new(&value, registry, &options).read()
}

/// Convenience function to encode any model instance to JSON bytes with default writer options.
pub fn encode<T: Parsable + ?Sized>(value: &T) -> Result<Bytes> {
    let mut writer = SerializationWriter::new();
    value.serialize(&mut writer)?;
    Ok(writer.into_bytes())
}

/// A shared registry bundled with reader and writer options.
///
/// Cheap to clone; the registry is held behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct JsonCodec {
    registry: Arc<TypeRegistry>,
    parse_options: ParseOptions,
    writer_options: WriterOptions,
}

impl JsonCodec {
    pub fn new(registry: impl Into<Arc<TypeRegistry>>) -> Self {
        Self {
            registry: registry.into(),
            parse_options: ParseOptions::default(),
            writer_options: WriterOptions::default(),
        }
    }

    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    pub fn with_writer_options(mut self, options: WriterOptions) -> Self {
        self.writer_options = options;
        self
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn parse_options(&self) -> &ParseOptions {
        &self.parse_options
    }

    pub fn writer_options(&self) -> &WriterOptions {
        &self.writer_options
    }

    /// Decode a polymorphic object whose declared type is `B`.
    pub fn decode<B: Model>(&self, payload: &[u8]) -> Result<Instance<B>> {
        let value: serde_json::Value = serde_json::from_slice(payload)?;
        self.node(&value).read()
    }

    /// Decode a payload into exactly `T`, without resolving the discriminator.
    pub fn decode_model<T: Model>(&self, payload: &[u8]) -> Result<T> {
        let value: serde_json::Value = serde_json::from_slice(payload)?;
        self.node(&value).read_model()
    }

    /// Decode a paginated collection whose elements are declared as `B`.
    pub fn decode_collection<B: Model>(&self, payload: &[u8]) -> Result<CollectionResponse<B>> {
        self.decode_model(payload)
    }

    /// Decode from a reader, buffering the whole payload first.
    pub fn decode_reader<B: Model, R: io::Read>(&self, reader: R) -> Result<Instance<B>> {
        let value: serde_json::Value = serde_json::from_reader(reader)?;
        self.node(&value).read()
    }

    pub fn encode(&self, value: &dyn Parsable) -> Result<Bytes> {
        let mut writer = SerializationWriter::with_options(self.writer_options.clone());
        value.serialize(&mut writer)?;
        Ok(writer.into_bytes())
    }

    pub fn encode_to_writer<W: io::Write>(&self, value: &dyn Parsable, mut out: W) -> Result<()> {
        let bytes = self.encode(value)?;
        out.write_all(&bytes)?;
        Ok(())
    }

    fn node<'a>(&'a self, value: &'a serde_json::Value) -> ParseNode<'a> {
        ParseNode::new(value, &self.registry, &self.parse_options)
    }
}
