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

//! Bidirectional file-name <-> expected-name translations keyed by field id.

use crate::schema::Schema;
use std::collections::HashMap;

/// The two bidirectional, field-id-keyed name translations shared by the
/// pruning evaluator and the schema reconciler.
///
/// Built once at reader construction from `(file_schema, expected_schema)`;
/// immutable afterwards. Fields present in the file but absent from the
/// expected schema are simply not represented here -- that is what makes
/// this a pure projection rather than a full schema union.
#[derive(Debug, Clone)]
pub struct FieldMap {
    file_to_expected: HashMap<String, String>,
    expected_to_file: HashMap<String, String>,
}

impl FieldMap {
    /// For every expected field whose id exists in the file schema, record
    /// both the file-name -> expected-name and expected-name -> file-name
    /// entries.
    pub fn build(file_schema: &Schema, expected_schema: &Schema) -> Self {
        let mut file_to_expected = HashMap::new();
        let mut expected_to_file = HashMap::new();

        for expected_field in expected_schema.fields() {
            if let Some(file_field) = file_schema.find_field(expected_field.id) {
                file_to_expected.insert(file_field.name.clone(), expected_field.name.clone());
                expected_to_file.insert(expected_field.name.clone(), file_field.name.clone());
            }
        }

        FieldMap {
            file_to_expected,
            expected_to_file,
        }
    }

    /// file-side name -> expected-side name, used by the schema reconciler.
    pub fn file_to_expected(&self) -> &HashMap<String, String> {
        &self.file_to_expected
    }

    /// expected-side name -> file-side name, used when applying residual
    /// filters against a table still labelled with file names.
    pub fn expected_to_file(&self) -> &HashMap<String, String> {
        &self.expected_to_file
    }

    /// True iff every mapped entry has `file_name == expected_name`. When
    /// true, schema reconciliation's rename pass may be skipped entirely.
    pub fn is_identity(&self) -> bool {
        self.file_to_expected
            .iter()
            .all(|(file_name, expected_name)| file_name == expected_name)
    }

    /// Expected fields (by position in `expected_schema`) whose id has no
    /// counterpart in the file schema -- these need a null-filled column.
    pub fn missing_fields<'a>(
        &self,
        file_schema: &Schema,
        expected_schema: &'a Schema,
    ) -> Vec<(usize, &'a crate::schema::Field)> {
        expected_schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(_, field)| file_schema.find_field(field.id).is_none())
            .collect()
    }
}
