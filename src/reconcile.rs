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

//! Renames file-labelled columns to their expected names and null-fills
//! expected columns missing from the file, field-id driven throughout.

use std::sync::Arc;

use arrow::array::{
    new_empty_array, ArrayRef, BooleanArray, Decimal128Array, FixedSizeBinaryArray, Float32Array,
    Float64Array, Int32Array, Int64Array, ListArray, StringArray, StructArray,
};
use arrow::buffer::{NullBuffer, OffsetBuffer, ScalarBuffer};
use arrow::record_batch::RecordBatch;
use arrow_schema::{Field as ArrowField, Schema as ArrowSchema};

use crate::arrow_types::to_arrow_field;
use crate::error::{Error, Result};
use crate::field_map::FieldMap;
use crate::schema::{Field, Type};

/// A read table kept as one `RecordBatch` per row group, mirroring the
/// chunked-array structure the Python original gets from
/// `pyarrow.concat_tables`: concatenation does not flatten chunks, and
/// neither does this. The null-fill pass below relies on exactly this
/// structure to match an inserted column's chunking to the rest of the
/// table.
#[derive(Debug, Clone)]
pub struct ChunkedTable {
    pub schema: Arc<ArrowSchema>,
    pub chunks: Vec<RecordBatch>,
}

impl ChunkedTable {
    pub fn new(schema: Arc<ArrowSchema>, chunks: Vec<RecordBatch>) -> Self {
        ChunkedTable { schema, chunks }
    }

    pub fn num_rows(&self) -> usize {
        self.chunks.iter().map(|c| c.num_rows()).sum()
    }
}

/// Renames file-side columns to expected names, then inserts a null-filled
/// column for every expected field absent from the file.
///
/// The rename pass is skipped entirely when `field_map.is_identity()` --
/// the identity-evolution property this must satisfy either way.
pub fn reconcile(
    table: ChunkedTable,
    field_map: &FieldMap,
    missing_fields: &[(usize, &Field)],
) -> Result<ChunkedTable> {
    let table = if field_map.is_identity() {
        table
    } else {
        rename(table, field_map)?
    };

    missing_fields
        .iter()
        .try_fold(table, |table, (index, field)| {
            null_fill(table, *index, field)
        })
}

fn rename(table: ChunkedTable, field_map: &FieldMap) -> Result<ChunkedTable> {
    let renamed_fields: Vec<Arc<ArrowField>> = table
        .schema
        .fields()
        .iter()
        .map(|field| {
            if let Some(expected_name) = field_map.file_to_expected().get(field.name()) {
                Arc::new(
                    ArrowField::new(expected_name, field.data_type().clone(), field.is_nullable())
                        .with_metadata(field.metadata().clone()),
                )
            } else {
                field.clone()
            }
        })
        .collect();

    let new_schema = Arc::new(ArrowSchema::new(renamed_fields));

    let chunks = table
        .chunks
        .into_iter()
        .map(|batch| RecordBatch::try_new(new_schema.clone(), batch.columns().to_vec()))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(ChunkedTable::new(new_schema, chunks))
}

fn null_fill(table: ChunkedTable, index: usize, field: &Field) -> Result<ChunkedTable> {
    let arrow_field = Arc::new(to_arrow_field(field));

    let mut fields: Vec<Arc<ArrowField>> = table.schema.fields().iter().cloned().collect();
    fields.insert(index.min(fields.len()), arrow_field.clone());
    let new_schema = Arc::new(ArrowSchema::new(fields));

    let chunks = table
        .chunks
        .into_iter()
        .map(|batch| {
            let len = batch.num_rows();
            let null_column = null_filled_array(&field.r#type, len)?;
            let mut columns = batch.columns().to_vec();
            columns.insert(index.min(columns.len()), null_column);
            Ok(RecordBatch::try_new(new_schema.clone(), columns)?)
        })
        .collect::<Result<Vec<_>>>()?;

    let _ = arrow_field;
    Ok(ChunkedTable::new(new_schema, chunks))
}

/// Builds a length-`len` array of `logical_type`, every element null, using
/// the physical sentinel the design names for that type (0 / false / NaN /
/// "" / zero bytes) under a fully-null validity mask. `MAP` has no defined
/// fill and is a hard error.
fn null_filled_array(logical_type: &Type, len: usize) -> Result<ArrayRef> {
    let nulls = || Some(NullBuffer::new_null(len));

    let array: ArrayRef = match logical_type {
        Type::Boolean => Arc::new(BooleanArray::new(
            arrow::buffer::BooleanBuffer::new(
                arrow::buffer::Buffer::from(vec![0u8; len.div_ceil(8)]),
                0,
                len,
            ),
            nulls(),
        )),
        Type::Date | Type::Integer => {
            Arc::new(Int32Array::new(ScalarBuffer::from(vec![0i32; len]), nulls()))
        }
        Type::Long => Arc::new(Int64Array::new(ScalarBuffer::from(vec![0i64; len]), nulls())),
        Type::Timestamp { .. } => {
            Arc::new(arrow::array::TimestampMicrosecondArray::new(
                ScalarBuffer::from(vec![0i64; len]),
                nulls(),
            ))
        }
        Type::Float => Arc::new(Float32Array::new(
            ScalarBuffer::from(vec![f32::NAN; len]),
            nulls(),
        )),
        Type::Double => Arc::new(Float64Array::new(
            ScalarBuffer::from(vec![f64::NAN; len]),
            nulls(),
        )),
        Type::String => Arc::new(StringArray::from(vec![None::<&str>; len])),
        Type::Binary => Arc::new(arrow::array::BinaryArray::from(vec![None::<&[u8]>; len])),
        Type::Fixed(width) => Arc::new(FixedSizeBinaryArray::try_new(
            *width as i32,
            arrow::buffer::Buffer::from(vec![0u8; width * len]),
            nulls(),
        )?),
        Type::Decimal { precision, scale } => Arc::new(
            Decimal128Array::new(ScalarBuffer::from(vec![0i128; len]), nulls())
                .with_precision_and_scale(*precision as u8, *scale as i8)?,
        ),
        Type::List(element) => {
            let element_field = Arc::new(to_arrow_field(element));
            let offsets = OffsetBuffer::new(ScalarBuffer::from(vec![0i32; len + 1]));
            let child = new_empty_array(element_field.data_type());
            Arc::new(ListArray::try_new(element_field, offsets, child, nulls())?)
        }
        Type::Struct(child_fields) => {
            let mut children = Vec::with_capacity(child_fields.len());
            let mut arrow_children = Vec::with_capacity(child_fields.len());
            for child in child_fields {
                children.push(null_filled_array(&child.r#type, len)?);
                arrow_children.push(Arc::new(to_arrow_field(child)));
            }
            Arc::new(StructArray::new(
                arrow_schema::Fields::from(arrow_children),
                children,
                nulls(),
            ))
        }
        Type::Map { .. } => {
            return Err(Error::UnsupportedFillType {
                field_name: "<map>".to_string(),
                type_name: "MAP".to_string(),
            })
        }
    };

    Ok(array)
}
