//! Per-type field dispatch tables.
//!
//! A table maps wire names to a pair of actions: one that decodes a [`ParseNode`] into the
//! field, one that writes the field. Derived types start from their parent's table, lifted
//! through the parent accessor, and overlay their own fields.

use crate::{ParseNode, Result, SerializationWriter};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

type DecodeFn<T> = dyn Fn(&mut T, &ParseNode<'_>) -> Result<()> + Send + Sync;
type EncodeFn<T> = dyn Fn(&T, &mut SerializationWriter) -> Result<()> + Send + Sync;

/// Decode and encode actions for one named field of `T`.
pub struct FieldCodec<T> {
    name: &'static str,
    decode: Arc<DecodeFn<T>>,
    encode: Arc<EncodeFn<T>>,
}

impl<T> Clone for FieldCodec<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            decode: Arc::clone(&self.decode),
            encode: Arc::clone(&self.encode),
        }
    }
}

impl<T> fmt::Debug for FieldCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldCodec").field("name", &self.name).finish()
    }
}

impl<T: 'static> FieldCodec<T> {
    pub fn new<D, E>(name: &'static str, decode: D, encode: E) -> Self
    where
        D: Fn(&mut T, &ParseNode<'_>) -> Result<()> + Send + Sync + 'static,
        E: Fn(&T, &mut SerializationWriter) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name,
            decode: Arc::new(decode),
            encode: Arc::new(encode),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn decode(&self, target: &mut T, node: &ParseNode<'_>) -> Result<()> {
        (self.decode)(target, node)
    }

    pub fn encode(&self, source: &T, writer: &mut SerializationWriter) -> Result<()> {
        (self.encode)(source, writer)
    }

    /// Re-targets this codec at a type `C` that embeds `T`.
    fn lift<C: 'static>(&self, get: fn(&C) -> &T, get_mut: fn(&mut C) -> &mut T) -> FieldCodec<C> {
        let decode = Arc::clone(&self.decode);
        let encode = Arc::clone(&self.encode);
        FieldCodec::new(
            self.name,
            move |target: &mut C, node| decode(get_mut(target), node),
            move |source: &C, writer| encode(get(source), writer),
        )
    }
}

/// Ordered wire-name → [`FieldCodec`] map. Iteration order is encode order.
pub struct FieldTable<T> {
    fields: IndexMap<&'static str, FieldCodec<T>>,
}

impl<T> Default for FieldTable<T> {
    fn default() -> Self {
        Self {
            fields: IndexMap::new(),
        }
    }
}

impl<T> fmt::Debug for FieldTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.fields.keys()).finish()
    }
}

impl<T: 'static> FieldTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a table holding every field of `parent`, reached through the given accessors.
    pub fn inherit<P: 'static>(
        parent: &FieldTable<P>,
        get: fn(&T) -> &P,
        get_mut: fn(&mut T) -> &mut P,
    ) -> Self {
        Self {
            fields: parent
                .fields
                .iter()
                .map(|(name, codec)| (*name, codec.lift(get, get_mut)))
                .collect(),
        }
    }

    /// Adds a field. A field of the same name already in the table is replaced in place.
    pub fn field(mut self, codec: FieldCodec<T>) -> Self {
        self.fields.insert(codec.name, codec);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldCodec<T>> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldCodec<T>> {
        self.fields.values()
    }

    /// Runs every encode action in table order.
    pub fn encode_fields(&self, source: &T, writer: &mut SerializationWriter) -> Result<()> {
        for codec in self.fields.values() {
            codec.encode(source, writer)?;
        }
        Ok(())
    }
}

type TableCache = RwLock<HashMap<TypeId, &'static (dyn Any + Send + Sync)>>;

/// Returns the table of `T`, building it with `build` on first use.
///
/// For generic models, where a `static` inside the impl would be shared by every
/// instantiation. Tables are built outside the lock and leaked once per type.
pub fn memoized_table<T: 'static>(build: impl FnOnce() -> FieldTable<T>) -> &'static FieldTable<T> {
    static CACHE: OnceLock<TableCache> = OnceLock::new();
    let cache = CACHE.get_or_init(TableCache::default);
    let key = TypeId::of::<T>();

    if let Some(entry) = cache.read().get(&key).copied() {
        return downcast_table(entry);
    }

    let built = build();
    let entry = *cache.write().entry(key).or_insert_with(|| {
        let leaked: &'static (dyn Any + Send + Sync) = Box::leak(Box::new(built));
        leaked
    });
    downcast_table(entry)
}

fn downcast_table<T: 'static>(entry: &'static (dyn Any + Send + Sync)) -> &'static FieldTable<T> {
    match entry.downcast_ref::<FieldTable<T>>() {
        Some(table) => table,
        None => unreachable!("table cache entry keyed by the wrong type"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParseOptions, TypeRegistry};
    use serde_json::json;

    #[derive(Default)]
    struct Inner {
        a: Option<i32>,
    }

    #[derive(Default)]
    struct Outer {
        inner: Inner,
        b: Option<String>,
    }

    fn inner_table() -> FieldTable<Inner> {
        FieldTable::new().field(FieldCodec::new(
            "a",
            |m: &mut Inner, node| {
                m.a = node.read()?;
                Ok(())
            },
            |m: &Inner, w| w.write_field("a", &m.a),
        ))
    }

    fn outer_table(inner: &FieldTable<Inner>) -> FieldTable<Outer> {
        FieldTable::inherit(inner, |o: &Outer| &o.inner, |o: &mut Outer| &mut o.inner).field(
            FieldCodec::new(
                "b",
                |m: &mut Outer, node| {
                    m.b = node.read()?;
                    Ok(())
                },
                |m: &Outer, w| w.write_field("b", &m.b),
            ),
        )
    }

    #[test]
    fn test_inherited_fields_come_first() {
        let inner = inner_table();
        let outer = outer_table(&inner);
        assert_eq!(outer.names().collect::<Vec<_>>(), ["a", "b"]);
        assert!(outer.contains("a"));
        assert!(!inner.contains("b"));
    }

    #[test]
    fn test_lifted_codec_reaches_parent_field() {
        let inner = inner_table();
        let outer = outer_table(&inner);
        let registry = TypeRegistry::default();
        let options = ParseOptions::default();
        let payload = json!(7);
        let node = ParseNode::new(&payload, &registry, &options);

        let mut value = Outer::default();
        outer.get("a").unwrap().decode(&mut value, &node).unwrap();
        assert_eq!(value.inner.a, Some(7));

        let mut w = SerializationWriter::new();
        w.begin_object().unwrap();
        outer.encode_fields(&value, &mut w).unwrap();
        w.end_object().unwrap();
        assert_eq!(&w.into_bytes()[..], br#"{"a":7,"b":null}"#);
    }

    #[test]
    fn test_override_keeps_position() {
        let inner = inner_table();
        let outer = outer_table(&inner).field(FieldCodec::new(
            "a",
            |_: &mut Outer, _| Ok(()),
            |_: &Outer, w| w.write_field("a", "overridden"),
        ));
        assert_eq!(outer.len(), 2);
        assert_eq!(outer.names().collect::<Vec<_>>(), ["a", "b"]);

        let mut w = SerializationWriter::new();
        w.begin_object().unwrap();
        outer.encode_fields(&Outer::default(), &mut w).unwrap();
        w.end_object().unwrap();
        assert_eq!(&w.into_bytes()[..], br#"{"a":"overridden","b":null}"#);
    }

    #[test]
    fn test_memoized_table_is_built_once() {
        let first = memoized_table(inner_table) as *const FieldTable<Inner>;
        let second = memoized_table::<Inner>(|| unreachable!()) as *const FieldTable<Inner>;
        assert_eq!(first, second);
    }
}
