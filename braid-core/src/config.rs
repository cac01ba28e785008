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

/// Configuration for braid serialization.
///
/// Shared between the `Braid` instance and the `WriteContext`/`ReadContext`
/// of each call so both directions see the same switches.
#[derive(Clone, Debug)]
pub struct Config {
    /// Encode arrays of fixed-width leaves as a flat run of raw bodies.
    /// Writer and reader must agree on this switch.
    pub value_array_fast_path: bool,
    /// Maximum nesting of object, array and container bodies.
    pub max_depth: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            value_array_fast_path: true,
            max_depth: 128,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn is_value_array_fast_path(&self) -> bool {
        self.value_array_fast_path
    }

    #[inline(always)]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }
}
