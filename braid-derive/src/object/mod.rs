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

mod attrs;
mod derive_enum;
mod serializer;

use proc_macro2::TokenStream;
use syn::{Data, DeriveInput};

pub fn derive_object(ast: &DeriveInput) -> syn::Result<TokenStream> {
    let attrs = attrs::parse_type_attrs(&ast.attrs)?;
    match &ast.data {
        Data::Struct(data) => serializer::derive_struct(ast, data, attrs),
        Data::Enum(data) => derive_enum::derive_enum(ast, data, attrs),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &ast.ident,
            "unions cannot derive BraidObject",
        )),
    }
}
