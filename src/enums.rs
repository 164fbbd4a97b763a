use crate::{CodecError, EnumDecodeError, ParseNode, Result, UnknownEnumPolicy};
use std::fmt;

/// A closed set of string-valued wire members.
///
/// Implemented by `#[derive(WireEnum)]`. `to_wire` and `from_wire` are mutual inverses
/// over [`WireEnum::MEMBERS`]; matching is case-sensitive.
pub trait WireEnum: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Rust name of the enum, used in error messages.
    const NAME: &'static str;
    /// Every declared member in declaration order.
    const MEMBERS: &'static [Self];
    /// The "unknown future value" member, if declared. Always the last member.
    const UNKNOWN: Option<Self>;

    fn to_wire(self) -> &'static str;

    fn from_wire(value: &str) -> std::result::Result<Self, EnumDecodeError>;

    /// Position of the member in declaration order.
    fn ordinal(self) -> usize;

    fn is_unknown(self) -> bool {
        Self::UNKNOWN == Some(self)
    }
}

/// Decodes one enum member from a string node, applying the node's [`UnknownEnumPolicy`].
///
/// Generated `Decoder` impls delegate here.
pub fn decode_wire_enum<E: WireEnum>(node: &ParseNode<'_>) -> Result<E> {
    let raw = node.as_str()?;
    let err = match E::from_wire(raw) {
        Ok(member) => return Ok(member),
        Err(err) => err,
    };
    match (node.options().unknown_enum_members, E::UNKNOWN) {
        (UnknownEnumPolicy::FutureValue, Some(unknown)) => {
            tracing::debug!(
                enum_name = E::NAME,
                value = raw,
                path = %node.path(),
                "unrecognized enum value mapped to the unknown member"
            );
            Ok(unknown)
        }
        _ => Err(CodecError::Enum {
            path: node.path(),
            source: err,
        }),
    }
}
