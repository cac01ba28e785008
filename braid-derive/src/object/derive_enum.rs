// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Fieldless enums, carried as their `repr` integer.

use crate::object::attrs::{parse_repr, TypeAttrs};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DataEnum, DeriveInput, Fields};

pub fn derive_enum(ast: &DeriveInput, data: &DataEnum, attrs: TypeAttrs) -> syn::Result<TokenStream> {
    let name = &ast.ident;
    if !ast.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(&ast.generics, "generic enums are not supported"));
    }
    if attrs.has_object_options() {
        return Err(syn::Error::new_spanned(
            name,
            "enums are carried as their integer and take no type attributes",
        ));
    }
    if let Some(variant) = data.variants.iter().find(|v| !matches!(v.fields, Fields::Unit)) {
        return Err(syn::Error::new_spanned(
            variant,
            "only fieldless enums can derive BraidObject",
        ));
    }
    let Some(first) = data.variants.first().map(|v| &v.ident) else {
        return Err(syn::Error::new_spanned(name, "enums without variants cannot be read"));
    };
    let repr = parse_repr(&ast.attrs)?.unwrap_or_else(|| syn::Ident::new("i32", name.span()));
    let variants: Vec<_> = data.variants.iter().map(|v| &v.ident).collect();

    Ok(quote! {
        impl ::braid_core::serializer::BraidDefault for #name {
            fn braid_default() -> Self {
                Self::#first
            }
        }

        impl ::braid_core::serializer::enum_::BraidEnum for #name {
            type Repr = #repr;

            fn to_repr(&self) -> #repr {
                match self {
                    #(Self::#variants => Self::#variants as #repr,)*
                }
            }

            fn from_repr(repr: #repr) -> ::core::option::Option<Self> {
                #(
                    if repr == Self::#variants as #repr {
                        return ::core::option::Option::Some(Self::#variants);
                    }
                )*
                ::core::option::Option::None
            }
        }

        impl ::braid_core::serializer::Serializer for #name {
            #[inline(always)]
            fn braid_write_body(
                &self,
                context: &mut ::braid_core::resolver::context::WriteContext,
            ) -> ::core::result::Result<(), ::braid_core::error::Error> {
                ::braid_core::serializer::enum_::write_enum(self, context)
            }

            #[inline(always)]
            fn braid_read_body(
                context: &mut ::braid_core::resolver::context::ReadContext,
            ) -> ::core::result::Result<Self, ::braid_core::error::Error> {
                ::braid_core::serializer::enum_::read_enum(context)
            }

            fn braid_type_id_dyn(
                &self,
                registry: &::braid_core::resolver::type_registry::TypeRegistry,
            ) -> ::core::result::Result<::std::sync::Arc<str>, ::braid_core::error::Error> {
                registry.type_id_of::<Self>()
            }

            fn braid_lookup_key() -> ::braid_core::types::LookupKey {
                ::braid_core::types::LookupKey::Type(::std::any::TypeId::of::<#repr>())
            }

            fn braid_fixed_width() -> ::core::option::Option<usize> {
                <#repr as ::braid_core::serializer::Serializer>::braid_fixed_width()
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }
    })
}
