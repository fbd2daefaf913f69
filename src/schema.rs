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

//! The Iceberg logical schema, modelled as a plain value type.
//!
//! This crate treats the schema the way `arrow_schema::Schema` treats an
//! Arrow schema: a value with lookup helpers, not a full type system with a
//! binder or expression visitor. Field ids, not names, are the identity.

use once_cell::sync::OnceCell;
use std::collections::HashMap;

/// One of the logical types an Iceberg field may carry.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Boolean,
    Integer,
    Long,
    Float,
    Double,
    Date,
    /// Microsecond timestamp; `with_tz` distinguishes the two Iceberg
    /// timestamp kinds that otherwise decode identically.
    Timestamp { with_tz: bool },
    String,
    Binary,
    Fixed(usize),
    Decimal { precision: u32, scale: u32 },
    List(Box<Field>),
    Struct(Vec<Field>),
    Map { key: Box<Field>, value: Box<Field> },
}

impl Type {
    pub fn is_struct(&self) -> bool {
        matches!(self, Type::Struct(_))
    }
}

/// A single field of a [`Schema`] or nested [`Type::Struct`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub id: i32,
    pub name: String,
    pub r#type: Type,
    pub required: bool,
}

impl Field {
    pub fn new(id: i32, name: impl Into<String>, r#type: Type, required: bool) -> Self {
        Field {
            id,
            name: name.into(),
            r#type,
            required,
        }
    }
}

/// An ordered sequence of top-level fields, with a lazily built id/name
/// index. Immutable once constructed, and safe to share across threads
/// (mirrors the teacher's `SchemaRef = Arc<Schema>` convention).
#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<Field>,
    id_index: OnceCell<HashMap<i32, usize>>,
    name_index: OnceCell<HashMap<String, i32>>,
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Schema {
            fields,
            id_index: OnceCell::new(),
            name_index: OnceCell::new(),
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Lazily built id -> position index, analogous to the Python
    /// original's `schema.find_field(id)`.
    fn id_index(&self) -> &HashMap<i32, usize> {
        self.id_index.get_or_init(|| {
            self.fields
                .iter()
                .enumerate()
                .map(|(pos, f)| (f.id, pos))
                .collect()
        })
    }

    /// Lazily built name -> id index, the Rust counterpart of the Python
    /// original's `schema.lazy_name_to_id()`.
    fn name_index(&self) -> &HashMap<String, i32> {
        self.name_index.get_or_init(|| {
            self.fields
                .iter()
                .map(|f| (f.name.clone(), f.id))
                .collect()
        })
    }

    pub fn find_field(&self, id: i32) -> Option<&Field> {
        self.id_index().get(&id).map(|&pos| &self.fields[pos])
    }

    /// True if `id` identifies a field nested inside some top-level
    /// struct/list/map field rather than a top-level field itself. Used by
    /// the row-group evaluator to reject predicates on nested columns,
    /// since ids are stable across the whole schema tree, not just the
    /// top level.
    pub fn is_nested_field(&self, id: i32) -> bool {
        self.fields.iter().any(|f| type_contains_nested(&f.r#type, id))
    }

    pub fn field_position(&self, id: i32) -> Option<usize> {
        self.id_index().get(&id).copied()
    }

    pub fn lazy_name_to_id(&self, name: &str) -> Option<i32> {
        self.name_index().get(name).copied()
    }
}

fn type_contains_nested(r#type: &Type, id: i32) -> bool {
    match r#type {
        Type::Struct(fields) => fields
            .iter()
            .any(|f| f.id == id || type_contains_nested(&f.r#type, id)),
        Type::List(element) => element.id == id || type_contains_nested(&element.r#type, id),
        Type::Map { key, value } => {
            key.id == id
                || value.id == id
                || type_contains_nested(&key.r#type, id)
                || type_contains_nested(&value.r#type, id)
        }
        _ => false,
    }
}
