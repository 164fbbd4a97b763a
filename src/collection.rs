//! Paginated collection envelope.
//!
//! List responses wrap their items as `{"@odata.count": n, "@odata.nextLink": url, "value": [...]}`.
//! The envelope is an ordinary model: it decodes and encodes through field tables, keeps
//! unknown members in additional data, and its items are polymorphic instances.

use crate::{
    memoized_table, AdditionalData, FieldCodec, FieldTable, Instance, Model, Parsable,
};

pub const VALUE: &str = "value";

/// Pagination fields shared by every collection response.
#[derive(Model, Debug, Clone, Default, PartialEq)]
pub struct BaseCollectionPaginationCountResponse {
    /// Total number of items on the server, when requested.
    #[wire(rename = "@odata.count")]
    pub odata_count: Option<i64>,
    /// Link to the next page; absent on the last page.
    #[wire(rename = "@odata.nextLink")]
    pub odata_next_link: Option<String>,
    #[wire(additional_data)]
    pub additional_data: AdditionalData,
}

/// One page of items declared as `B`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionResponse<B: Model> {
    pub base: BaseCollectionPaginationCountResponse,
    pub value: Option<Vec<Instance<B>>>,
}

impl<B: Model> Model for CollectionResponse<B> {
    const TYPE_NAME: &'static str = "CollectionResponse";

    fn field_table() -> &'static FieldTable<Self> {
        memoized_table(|| {
            FieldTable::inherit(
                BaseCollectionPaginationCountResponse::field_table(),
                |page: &Self| &page.base,
                |page: &mut Self| &mut page.base,
            )
            .field(FieldCodec::new(
                VALUE,
                |page: &mut Self, node| {
                    page.value = node.read()?;
                    Ok(())
                },
                |page: &Self, writer| writer.write_field(VALUE, &page.value),
            ))
        })
    }

    fn parent_model(&self) -> Option<&(dyn Parsable + 'static)> {
        Some(&self.base)
    }

    fn parent_model_mut(&mut self) -> Option<&mut (dyn Parsable + 'static)> {
        Some(&mut self.base)
    }

    fn additional_data_store(&self) -> &AdditionalData {
        self.base.additional_data_store()
    }

    fn additional_data_store_mut(&mut self) -> &mut AdditionalData {
        self.base.additional_data_store_mut()
    }
}

impl<B: Model> CollectionResponse<B> {
    pub fn new(items: Vec<Instance<B>>) -> Self {
        Self {
            base: BaseCollectionPaginationCountResponse::default(),
            value: Some(items),
        }
    }

    pub fn with_count(mut self, count: i64) -> Self {
        self.base.odata_count = Some(count);
        self
    }

    pub fn with_next_link(mut self, link: impl Into<String>) -> Self {
        self.base.odata_next_link = Some(link.into());
        self
    }

    /// Items in wire order; empty when the page carried no `value`.
    pub fn items(&self) -> &[Instance<B>] {
        self.value.as_deref().unwrap_or_default()
    }

    pub fn count(&self) -> Option<i64> {
        self.base.odata_count
    }

    pub fn next_link(&self) -> Option<&str> {
        self.base.odata_next_link.as_deref()
    }

    pub fn has_next_page(&self) -> bool {
        self.base.odata_next_link.is_some()
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instance<B>> {
        self.items().iter()
    }

    pub fn into_items(self) -> Vec<Instance<B>> {
        self.value.unwrap_or_default()
    }
}

impl<'a, B: Model> IntoIterator for &'a CollectionResponse<B> {
    type Item = &'a Instance<B>;
    type IntoIter = std::slice::Iter<'a, Instance<B>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
