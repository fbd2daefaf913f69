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

//! Computes which file-side columns actually need to be read.

use crate::schema::Schema;

/// Returns the file-side names of expected fields that also exist in the
/// file schema, in expected-schema order. This is the only column list a
/// read ever needs to request from the underlying Parquet reader: it is
/// the intersection of "what the query wants" and "what the file has",
/// named the way the file names it.
///
/// Nested projection is not expanded here: a struct/list/map field's
/// top-level file name is returned and the full element is read, matching
/// the contract stated for nested columns in the design.
pub fn columns_to_read(file_schema: &Schema, expected_schema: &Schema) -> Vec<String> {
    expected_schema
        .fields()
        .iter()
        .filter_map(|expected_field| {
            file_schema
                .find_field(expected_field.id)
                .map(|file_field| file_field.name.clone())
        })
        .collect()
}
