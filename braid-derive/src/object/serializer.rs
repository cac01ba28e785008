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

use crate::object::attrs::{parse_field_role, FieldRole, TypeAttrs};
use crate::util::{qualified_name, type_param_idents, with_serializer_bounds};
use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use syn::{DataStruct, DeriveInput, Member};

struct MarkedField<'a> {
    member: Member,
    ty: &'a syn::Type,
    role: FieldRole,
}

fn member_name(member: &Member) -> String {
    match member {
        Member::Named(ident) => ident.to_string(),
        Member::Unnamed(index) => index.index.to_string(),
    }
}

pub fn derive_struct(ast: &DeriveInput, data: &DataStruct, attrs: TypeAttrs) -> syn::Result<TokenStream> {
    let name = &ast.ident;
    let generics = with_serializer_bounds(&ast.generics);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let type_params = type_param_idents(&ast.generics);
    let is_generic = !type_params.is_empty();

    let fields = data
        .fields
        .members()
        .zip(data.fields.iter())
        .map(|(member, field)| {
            Ok(MarkedField {
                member,
                ty: &field.ty,
                role: parse_field_role(field)?,
            })
        })
        .collect::<syn::Result<Vec<_>>>()?;

    let default_inits = fields.iter().map(|field| {
        let member = &field.member;
        let ty = field.ty;
        match field.role {
            FieldRole::Skipped => quote! { #member: ::core::default::Default::default() },
            FieldRole::Field(_) | FieldRole::Base => quote! {
                #member: <#ty as ::braid_core::serializer::BraidDefault>::braid_default()
            },
        }
    });

    let declarations = fields.iter().filter_map(|field| {
        let member = &field.member;
        let ty = field.ty;
        let member_str = member_name(member);
        match &field.role {
            FieldRole::Skipped => None,
            FieldRole::Field(id) => Some(quote! {
                decls.field::<#ty>(#id, #member_str, |value| &value.#member, |value| &mut value.#member);
            }),
            FieldRole::Base => Some(quote! {
                decls.base::<#ty>(|value| &value.#member, |value| &mut value.#member);
            }),
        }
    });
    let extra_declarations = attrs.declare.as_ref().map(|path| quote! { #path(decls); });

    let qualified = qualified_name(name);
    let type_id = match &attrs.type_id {
        Some(id) => quote! { ::core::option::Option::Some(#id) },
        None => quote! { ::core::option::Option::None },
    };
    let version = attrs.version();
    let min_version = attrs.min_version();
    let reference = !attrs.value;

    let generic_definition = is_generic.then(|| {
        quote! {
            fn braid_generic_definition() -> ::core::option::Option<&'static str> {
                ::core::option::Option::Some(#qualified)
            }
        }
    });
    let on_serializing = attrs.on_serializing.as_ref().map(|path| {
        quote! {
            fn braid_on_serializing(&self) {
                #path(self)
            }
        }
    });
    let on_deserialized = attrs.on_deserialized.as_ref().map(|path| {
        quote! {
            fn braid_on_deserialized(&mut self, version: i32) {
                #path(self, version)
            }
        }
    });

    // generic instantiations are identified by their definition and arguments
    let generic_type_id = is_generic.then(|| {
        quote! {
            fn braid_type_id(
                registry: &::braid_core::resolver::type_registry::TypeRegistry,
            ) -> ::core::result::Result<::std::sync::Arc<str>, ::braid_core::error::Error> {
                registry.generic_type_id(#qualified, &[#(registry.type_id_of::<#type_params>()?),*])
            }

            fn braid_lookup_key() -> ::braid_core::types::LookupKey {
                ::braid_core::types::LookupKey::Generic(#qualified)
            }
        }
    });

    let auto_registration = match (&attrs.type_id, is_generic) {
        (Some(_), false) => quote! {
            ::braid_core::inventory::submit! {
                ::braid_core::resolver::type_registry::AutoRegistration::new(
                    #qualified,
                    ::braid_core::resolver::type_registry::register_declared::<#name>,
                )
            }
        },
        (Some(id), true) => {
            return Err(syn::Error::new(
                id.span(),
                "generic types are registered with `register_generic`, remove `type_id`",
            ))
        }
        _ => quote! {},
    };

    let self_ty = quote! { #name #ty_generics }.into_token_stream();
    Ok(quote! {
        impl #impl_generics ::braid_core::serializer::BraidDefault for #self_ty #where_clause {
            fn braid_default() -> Self {
                Self { #(#default_inits),* }
            }
        }

        impl #impl_generics ::braid_core::serializer::ObjectSerializer for #self_ty #where_clause {
            fn braid_declare_fields(decls: &mut ::braid_core::meta::field::FieldDecls<Self>) {
                #(#declarations)*
                #extra_declarations
            }

            fn braid_declaration() -> ::braid_core::serializer::Declaration {
                ::braid_core::serializer::Declaration {
                    type_id: #type_id,
                    version: #version,
                    min_supported_version: #min_version,
                }
            }

            #generic_definition
            #on_serializing
            #on_deserialized
        }

        impl #impl_generics ::braid_core::serializer::Serializer for #self_ty #where_clause {
            #[inline]
            fn braid_write_body(
                &self,
                context: &mut ::braid_core::resolver::context::WriteContext,
            ) -> ::core::result::Result<(), ::braid_core::error::Error> {
                ::braid_core::serializer::object::write_body(self, context)
            }

            #[inline]
            fn braid_read_body(
                context: &mut ::braid_core::resolver::context::ReadContext,
            ) -> ::core::result::Result<Self, ::braid_core::error::Error> {
                ::braid_core::serializer::object::read_body(context)
            }

            #[inline]
            fn braid_read_body_into(
                &mut self,
                context: &mut ::braid_core::resolver::context::ReadContext,
            ) -> ::core::result::Result<(), ::braid_core::error::Error> {
                ::braid_core::serializer::object::read_body_into(self, context)
            }

            fn braid_type_id_dyn(
                &self,
                registry: &::braid_core::resolver::type_registry::TypeRegistry,
            ) -> ::core::result::Result<::std::sync::Arc<str>, ::braid_core::error::Error> {
                registry.type_id_of::<Self>()
            }

            #generic_type_id

            #[inline(always)]
            fn braid_is_reference() -> bool {
                #reference
            }

            #[inline(always)]
            fn braid_is_reference_dyn(&self) -> bool {
                #reference
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }

        #auto_registration
    })
}
