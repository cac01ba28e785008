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

use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse_quote, Generics, Ident};

/// Adds the bounds every type parameter of a derived object needs.
pub fn with_serializer_bounds(generics: &Generics) -> Generics {
    let mut generics = generics.clone();
    for param in generics.type_params_mut() {
        param
            .bounds
            .push(parse_quote!(::braid_core::serializer::Serializer));
        param
            .bounds
            .push(parse_quote!(::braid_core::serializer::BraidDefault));
    }
    generics
}

pub fn type_param_idents(generics: &Generics) -> Vec<Ident> {
    generics
        .type_params()
        .map(|param| param.ident.clone())
        .collect()
}

/// Fully qualified name of the type, used to key generic definitions and
/// auto-registrations.
pub fn qualified_name(name: &Ident) -> TokenStream {
    quote! { concat!(module_path!(), "::", stringify!(#name)) }
}
