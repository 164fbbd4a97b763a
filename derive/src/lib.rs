extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use std::collections::HashSet;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Ident, LitStr};

/// Convert a Rust identifier to its default wire name
///
/// `snake_case` fields become `lowerCamelCase`; `PascalCase` variants only lose their
/// leading capital. A raw identifier prefix (`r#`) is dropped.
fn to_lower_camel_case(name: &str) -> String {
    let name = name.strip_prefix("r#").unwrap_or(name);
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = !out.is_empty();
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else if out.is_empty() {
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Values parsed from `#[wire(...)]` annotations
///
/// One struct serves every position; `get_wire_attributes` rejects keys that are not
/// allowed where the attribute appears.
#[derive(Debug, Default)]
struct WireAttributes {
    type_name: Option<String>,
    discriminator: Option<String>,
    rename: Option<String>,
    parent: bool,
    additional_data: bool,
    skip: bool,
    unknown: bool,
}

/// Extract and parse `#[wire(...)]` attribute values
///
/// Multiple attributes can be combined: `#[wire(rename = "@odata.count", skip)]`.
fn get_wire_attributes(attrs: &[Attribute], allowed: &[&str]) -> syn::Result<WireAttributes> {
    let mut parsed = WireAttributes::default();

    for attr in attrs {
        if !attr.path().is_ident("wire") {
            continue;
        }
        attr.parse_args_with(|input: syn::parse::ParseStream| {
            while !input.is_empty() {
                let ident = input.parse::<Ident>()?;
                let key = ident.to_string();
                if !allowed.contains(&key.as_str()) {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("Unknown attribute: {}", ident),
                    ));
                }

                match key.as_str() {
                    "type_name" | "discriminator" | "rename" => {
                        input.parse::<syn::Token![=]>()?;
                        let value = input.parse::<LitStr>()?.value();
                        match key.as_str() {
                            "type_name" => parsed.type_name = Some(value),
                            "discriminator" => parsed.discriminator = Some(value),
                            _ => parsed.rename = Some(value),
                        }
                    }
                    "parent" => parsed.parent = true,
                    "additional_data" => parsed.additional_data = true,
                    "skip" => parsed.skip = true,
                    _ => parsed.unknown = true,
                }

                // Consume comma if present, otherwise end
                if input.peek(syn::Token![,]) {
                    input.parse::<syn::Token![,]>()?;
                }
            }
            Ok(())
        })?;
    }

    Ok(parsed)
}

/// Derive macro for implementing `polywire::Model`
///
/// Generates the memoized field table, the ancestry links and the additional-data
/// accessors of a model struct. Every field that is not the parent, the additional-data
/// store or skipped becomes one table entry; its Rust type picks the codec.
///
/// # Supported Attributes
///
/// * `#[wire(type_name = "name")]` - Schema type name (struct level)
/// * `#[wire(discriminator = "#ns.type")]` - Wire type tag (struct level)
/// * `#[wire(parent)]` - Embedded parent model
/// * `#[wire(additional_data)]` - Additional-data store of a root model
/// * `#[wire(rename = "name")]` - Wire name of the field
/// * `#[wire(skip)]` - Not part of the wire format
///
/// # Examples
///
/// ```rust,ignore
/// #[derive(Model, Debug, Clone, Default, PartialEq)]
/// #[wire(discriminator = "#microsoft.graph.group")]
/// struct Group {
///     #[wire(parent)]
///     directory_object: DirectoryObject,
///     display_name: Option<String>,
///     members: Option<Vec<Instance<DirectoryObject>>>,
/// }
/// ```
#[proc_macro_derive(Model, attributes(wire))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_model(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_model(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(Model)] does not support generic models; implement polywire::Model by hand",
        ));
    }
    let type_attrs = get_wire_attributes(&input.attrs, &["type_name", "discriminator"])?;

    let fields = match &input.data {
        Data::Struct(s) => match &s.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "#[derive(Model)] requires a struct with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "#[derive(Model)] can only be used on structs",
            ))
        }
    };

    let mut parent = None;
    let mut additional_data = None;
    let mut used_names = HashSet::new();
    let mut codecs = Vec::new();

    for f in fields {
        let ident = f.ident.as_ref().unwrap();
        let attrs = get_wire_attributes(&f.attrs, &["parent", "additional_data", "rename", "skip"])?;

        if attrs.parent {
            if parent.is_some() {
                panic!("Model '{}' declares more than one #[wire(parent)] field.", name);
            }
            parent = Some((ident, &f.ty));
            continue;
        }
        if attrs.additional_data {
            if additional_data.is_some() {
                panic!("Model '{}' declares more than one #[wire(additional_data)] field.", name);
            }
            additional_data = Some(ident);
            continue;
        }
        if attrs.skip {
            continue;
        }

        let wire_name = attrs
            .rename
            .unwrap_or_else(|| to_lower_camel_case(&ident.to_string()));
        if !used_names.insert(wire_name.clone()) {
            panic!("Wire name '{}' is duplicated for model '{}'. Please specify a different name for field '{}' using #[wire(rename = ...)].", wire_name, name, ident);
        }

        codecs.push(quote! {
            .field(polywire::FieldCodec::new(
                #wire_name,
                |model: &mut #name, node| {
                    model.#ident = node.read()?;
                    ::std::result::Result::Ok(())
                },
                |model: &#name, writer| writer.write_field(#wire_name, &model.#ident),
            ))
        });
    }

    let (table_start, ancestry) = match (parent, additional_data) {
        (Some((parent_ident, parent_ty)), None) => (
            quote! {
                polywire::FieldTable::inherit(
                    <#parent_ty as polywire::Model>::field_table(),
                    |model: &#name| &model.#parent_ident,
                    |model: &mut #name| &mut model.#parent_ident,
                )
            },
            quote! {
                fn parent_model(&self) -> ::std::option::Option<&(dyn polywire::Parsable + 'static)> {
                    ::std::option::Option::Some(&self.#parent_ident)
                }

                fn parent_model_mut(&mut self) -> ::std::option::Option<&mut (dyn polywire::Parsable + 'static)> {
                    ::std::option::Option::Some(&mut self.#parent_ident)
                }

                fn additional_data_store(&self) -> &polywire::AdditionalData {
                    polywire::Model::additional_data_store(&self.#parent_ident)
                }

                fn additional_data_store_mut(&mut self) -> &mut polywire::AdditionalData {
                    polywire::Model::additional_data_store_mut(&mut self.#parent_ident)
                }
            },
        ),
        (None, Some(store)) => (
            quote! { polywire::FieldTable::new() },
            quote! {
                fn additional_data_store(&self) -> &polywire::AdditionalData {
                    &self.#store
                }

                fn additional_data_store_mut(&mut self) -> &mut polywire::AdditionalData {
                    &mut self.#store
                }
            },
        ),
        (Some(_), Some(_)) => panic!(
            "Model '{}' has both a #[wire(parent)] and a #[wire(additional_data)] field. Only root models own the additional data.",
            name
        ),
        (None, None) => panic!(
            "Model '{}' needs either a #[wire(parent)] field or a #[wire(additional_data)] field.",
            name
        ),
    };

    let type_name = type_attrs.type_name.unwrap_or_else(|| name.to_string());
    let discriminator = match &type_attrs.discriminator {
        Some(tag) => quote! { ::std::option::Option::Some(#tag) },
        None => quote! { ::std::option::Option::None },
    };

    Ok(quote! {
        impl polywire::Model for #name {
            const TYPE_NAME: &'static str = #type_name;
            const DISCRIMINATOR: ::std::option::Option<&'static str> = #discriminator;

            fn field_table() -> &'static polywire::FieldTable<Self> {
                static TABLE: ::std::sync::OnceLock<polywire::FieldTable<#name>> =
                    ::std::sync::OnceLock::new();
                TABLE.get_or_init(|| #table_start #(#codecs)*)
            }

            #ancestry
        }
    })
}

/// Derive macro for implementing `polywire::WireEnum`, `Encoder` and `Decoder`
///
/// The enum must be fieldless and `Copy + Eq + Debug`. Wire strings default to the
/// lowerCamelCase variant name.
///
/// # Supported Attributes
///
/// * `#[wire(rename = "name")]` - Wire string of the member
/// * `#[wire(unknown)]` - The "unknown future value" member; must be the last variant
///
/// # Examples
///
/// ```rust,ignore
/// #[derive(WireEnum, Debug, Clone, Copy, PartialEq, Eq)]
/// enum RiskLevel {
///     Low,
///     Medium,
///     High,
///     #[wire(unknown)]
///     UnknownFutureValue,
/// }
/// ```
#[proc_macro_derive(WireEnum, attributes(wire))]
pub fn derive_wire_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_wire_enum(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_wire_enum(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let name_str = name.to_string();
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(WireEnum)] does not support generic enums",
        ));
    }
    let variants = match &input.data {
        Data::Enum(e) => &e.variants,
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "#[derive(WireEnum)] can only be used on enums",
            ))
        }
    };
    if variants.is_empty() {
        return Err(syn::Error::new_spanned(
            name,
            "#[derive(WireEnum)] requires at least one variant",
        ));
    }

    let mut idents = Vec::new();
    let mut wire_names = Vec::new();
    let mut ordinals = Vec::new();
    let mut unknown = None;
    let mut used_names = HashSet::new();

    for (ordinal, v) in variants.iter().enumerate() {
        if !matches!(v.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                v,
                "#[derive(WireEnum)] variants cannot carry data",
            ));
        }
        let attrs = get_wire_attributes(&v.attrs, &["rename", "unknown"])?;
        if attrs.unknown {
            if ordinal + 1 != variants.len() {
                panic!("Variant '{}' of enum '{}' is marked #[wire(unknown)] but is not the last variant.", v.ident, name);
            }
            unknown = Some(&v.ident);
        }

        let wire_name = attrs
            .rename
            .unwrap_or_else(|| to_lower_camel_case(&v.ident.to_string()));
        if !used_names.insert(wire_name.clone()) {
            panic!("Wire name '{}' is duplicated for enum '{}'. Please specify a different name for variant '{}' using #[wire(rename = ...)].", wire_name, name, v.ident);
        }

        idents.push(&v.ident);
        wire_names.push(wire_name);
        ordinals.push(ordinal);
    }

    let unknown = match unknown {
        Some(ident) => quote! { ::std::option::Option::Some(Self::#ident) },
        None => quote! { ::std::option::Option::None },
    };

    Ok(quote! {
        impl polywire::WireEnum for #name {
            const NAME: &'static str = #name_str;
            const MEMBERS: &'static [Self] = &[#(Self::#idents),*];
            const UNKNOWN: ::std::option::Option<Self> = #unknown;

            fn to_wire(self) -> &'static str {
                match self {
                    #(Self::#idents => #wire_names,)*
                }
            }

            fn from_wire(value: &str) -> ::std::result::Result<Self, polywire::EnumDecodeError> {
                match value {
                    #(#wire_names => ::std::result::Result::Ok(Self::#idents),)*
                    _ => ::std::result::Result::Err(polywire::EnumDecodeError::UnknownMember {
                        enum_name: #name_str,
                        value: ::std::string::ToString::to_string(value),
                    }),
                }
            }

            fn ordinal(self) -> usize {
                match self {
                    #(Self::#idents => #ordinals,)*
                }
            }
        }

        impl polywire::Encoder for #name {
            const OMIT_WHEN_ABSENT: bool = true;

            fn encode(&self, writer: &mut polywire::SerializationWriter) -> polywire::Result<()> {
                writer.write_str(polywire::WireEnum::to_wire(*self))
            }
        }

        impl polywire::Decoder for #name {
            fn decode(node: &polywire::ParseNode<'_>) -> polywire::Result<Self> {
                polywire::decode_wire_enum(node)
            }
        }
    })
}
