use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Fields, GenericArgument, LitStr, PathArguments, Type,
    parse_macro_input,
};

/// How a field absorbs repeated keys.
enum FieldKind<'a> {
    /// `Option<Vec<T>>`: every occurrence is pushed, `None` when never seen.
    OptionVec(&'a Type),
    /// `Vec<T>`: every occurrence is pushed.
    Vec(&'a Type),
    /// Anything else: last value wins.
    Single,
}

/// Returns `T` if `ty` is `Outer<T>`.
fn generic_inner<'a>(ty: &'a Type, outer: &str) -> Option<&'a Type> {
    if let Type::Path(type_path) = ty
        && let Some(segment) = type_path.path.segments.last()
        && segment.ident == outer
        && let PathArguments::AngleBracketed(args) = &segment.arguments
        && let Some(GenericArgument::Type(inner)) = args.args.first()
    {
        return Some(inner);
    }
    None
}

fn field_kind(ty: &Type) -> FieldKind<'_> {
    if let Some(inner) = generic_inner(ty, "Option").and_then(|t| generic_inner(t, "Vec")) {
        return FieldKind::OptionVec(inner);
    }
    if let Some(inner) = generic_inner(ty, "Vec") {
        return FieldKind::Vec(inner);
    }
    FieldKind::Single
}

/// Reads `#[tolerant(key = "...")]`, the key a field is read from when it
/// differs from the field name.
fn key_override(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut key = None;
    for attr in attrs {
        if attr.path().is_ident("tolerant") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("key") {
                    let lit: LitStr = meta.value()?.parse()?;
                    key = Some(lit.value());
                    Ok(())
                } else {
                    Err(meta.error("unsupported tolerant attribute"))
                }
            })?;
        }
    }
    Ok(key)
}

/// Derive macro for generating a Deserialize implementation that tolerates duplicate keys.
///
/// Save files repeat keys freely (`core = SWE core = DAN`). The generated visitor:
/// - Collects duplicate keys into `Option<Vec<T>>` or `Vec<T>` fields
/// - Uses last-value-wins for every other field
/// - Skips unknown fields silently
///
/// All fields must implement `Default`. `#[tolerant(key = "eu3_gametype")]` reads a
/// field from a differently-named key.
#[proc_macro_derive(TolerantDeserialize, attributes(tolerant))]
pub fn derive_tolerant_deserialize(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "TolerantDeserialize only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "TolerantDeserialize only supports structs",
            ));
        }
    };

    let mut visitor_field_decls = Vec::new();
    let mut match_arms = Vec::new();
    let mut field_names = Vec::new();
    let mut field_constructions = Vec::new();

    for f in fields {
        let Some(field_name) = f.ident.as_ref() else {
            continue;
        };
        let key = key_override(&f.attrs)?.unwrap_or_else(|| field_name.to_string());
        let ty = &f.ty;
        field_names.push(field_name);

        match field_kind(ty) {
            FieldKind::OptionVec(inner) | FieldKind::Vec(inner) => {
                visitor_field_decls.push(quote! { #field_name: Vec<#inner> });
                match_arms.push(quote! {
                    #key => {
                        self.#field_name.push(map.next_value()?);
                    }
                });
            }
            FieldKind::Single => {
                visitor_field_decls.push(quote! { #field_name: #ty });
                match_arms.push(quote! {
                    #key => {
                        self.#field_name = map.next_value()?;
                    }
                });
            }
        }

        field_constructions.push(match field_kind(ty) {
            FieldKind::OptionVec(_) => quote! {
                #field_name: if self.#field_name.is_empty() { None } else { Some(self.#field_name) }
            },
            FieldKind::Vec(_) | FieldKind::Single => quote! {
                #field_name: self.#field_name
            },
        });
    }

    Ok(quote! {
        impl<'de> serde::Deserialize<'de> for #name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                struct Visitor {
                    #(#visitor_field_decls),*
                }

                impl Default for Visitor {
                    fn default() -> Self {
                        Self {
                            #(#field_names: Default::default()),*
                        }
                    }
                }

                impl<'de> serde::de::Visitor<'de> for Visitor {
                    type Value = #name;

                    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                        formatter.write_str(concat!("struct ", stringify!(#name)))
                    }

                    fn visit_map<A>(mut self, mut map: A) -> Result<Self::Value, A::Error>
                    where
                        A: serde::de::MapAccess<'de>,
                    {
                        while let Some(key) = map.next_key::<String>()? {
                            match key.as_str() {
                                #(#match_arms)*
                                _ => {
                                    let _ = map.next_value::<serde::de::IgnoredAny>()?;
                                }
                            }
                        }

                        Ok(#name {
                            #(#field_constructions),*
                        })
                    }
                }

                deserializer.deserialize_map(Visitor::default())
            }
        }
    })
}
