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

//! Maps the Iceberg logical [`Type`] onto the Arrow `DataType` it is
//! physically materialized as. Kept separate from `schema` because this is
//! the one place the logical schema and Arrow actually need to know about
//! each other.

use arrow_schema::{DataType, Field as ArrowField, Fields, TimeUnit};

use crate::schema::{Field, Type};

pub fn to_data_type(r#type: &Type) -> DataType {
    match r#type {
        Type::Boolean => DataType::Boolean,
        Type::Integer => DataType::Int32,
        Type::Long => DataType::Int64,
        Type::Float => DataType::Float32,
        Type::Double => DataType::Float64,
        Type::Date => DataType::Date32,
        Type::Timestamp { with_tz } => DataType::Timestamp(
            TimeUnit::Microsecond,
            with_tz.then(|| "UTC".into()),
        ),
        Type::String => DataType::Utf8,
        Type::Binary => DataType::Binary,
        Type::Fixed(len) => DataType::FixedSizeBinary(*len as i32),
        Type::Decimal { precision, scale } => DataType::Decimal128(*precision as u8, *scale as i8),
        Type::List(element) => {
            DataType::List(std::sync::Arc::new(to_arrow_field(element)))
        }
        Type::Struct(fields) => {
            DataType::Struct(Fields::from(fields.iter().map(to_arrow_field).collect::<Vec<_>>()))
        }
        Type::Map { key, value } => {
            let entries = ArrowField::new(
                "entries",
                DataType::Struct(Fields::from(vec![to_arrow_field(key), to_arrow_field(value)])),
                false,
            );
            DataType::Map(std::sync::Arc::new(entries), false)
        }
    }
}

pub fn to_arrow_field(field: &Field) -> ArrowField {
    ArrowField::new(&field.name, to_data_type(&field.r#type), !field.required)
}
