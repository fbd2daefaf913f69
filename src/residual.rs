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

//! Applies a bound predicate row-by-row against a reconciled table.
//!
//! Row-group pruning ([`crate::pruning`]) only ever discards whole row
//! groups; a row group that `MightMatch` can still contain rows that fail
//! the predicate. This module is the residual filter that removes them,
//! the Rust counterpart of the Python original applying `predicate` again
//! after `pa.concat_tables` with pyarrow's own compute kernels.

use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Date32Array, Int32Array, Int64Array, StringArray,
    TimestampMicrosecondArray,
};
use arrow::compute::kernels::cmp;
use arrow::compute::{and, filter_record_batch, not, or};
use arrow::record_batch::RecordBatch;
use arrow_schema::{DataType, Schema as ArrowSchema};

use crate::error::{Error, Result};
use crate::pruning::{BoundPredicate, Literal};
use crate::schema::Schema;
use crate::stats::Bound;

/// Filters every chunk of `table` down to the rows that satisfy `predicate`,
/// keyed by expected field id. `expected_schema` resolves ids to names;
/// `expected_to_file` is consulted when the table is still labelled with
/// on-disk names (callers that filter before reconciliation's rename pass).
pub fn apply_predicate(
    schema: &ArrowSchema,
    batches: &[RecordBatch],
    predicate: &BoundPredicate,
    expected_schema: &Schema,
    expected_to_file: &HashMap<String, String>,
) -> Result<Vec<RecordBatch>> {
    batches
        .iter()
        .map(|batch| {
            let mask = eval_mask(predicate, schema, batch, expected_schema, expected_to_file)?;
            Ok(filter_record_batch(batch, &mask)?)
        })
        .collect()
}

fn eval_mask(
    predicate: &BoundPredicate,
    schema: &ArrowSchema,
    batch: &RecordBatch,
    expected_schema: &Schema,
    expected_to_file: &HashMap<String, String>,
) -> Result<BooleanArray> {
    use BoundPredicate::*;

    match predicate {
        AlwaysTrue => Ok(BooleanArray::from(vec![true; batch.num_rows()])),
        AlwaysFalse => Ok(BooleanArray::from(vec![false; batch.num_rows()])),
        IsNull { field_id } => {
            let column = column_for(*field_id, schema, batch, expected_schema, expected_to_file)?;
            Ok(arrow::compute::is_null(&column)?)
        }
        NotNull { field_id } => {
            let column = column_for(*field_id, schema, batch, expected_schema, expected_to_file)?;
            Ok(arrow::compute::is_not_null(&column)?)
        }
        Lt { field_id, literal } => compare(
            *field_id, literal, schema, batch, expected_schema, expected_to_file, cmp::lt,
        ),
        LtEq { field_id, literal } => compare(
            *field_id, literal, schema, batch, expected_schema, expected_to_file, cmp::lt_eq,
        ),
        Gt { field_id, literal } => compare(
            *field_id, literal, schema, batch, expected_schema, expected_to_file, cmp::gt,
        ),
        GtEq { field_id, literal } => compare(
            *field_id, literal, schema, batch, expected_schema, expected_to_file, cmp::gt_eq,
        ),
        Eq { field_id, literal } => compare(
            *field_id, literal, schema, batch, expected_schema, expected_to_file, cmp::eq,
        ),
        NotEq { field_id, literal } => compare(
            *field_id, literal, schema, batch, expected_schema, expected_to_file, cmp::neq,
        ),
        In { field_id, literals } => {
            let masks = literals
                .iter()
                .map(|literal| {
                    compare(
                        *field_id,
                        literal,
                        schema,
                        batch,
                        expected_schema,
                        expected_to_file,
                        cmp::eq,
                    )
                })
                .collect::<Result<Vec<_>>>()?;
            masks
                .into_iter()
                .try_fold(BooleanArray::from(vec![false; batch.num_rows()]), |acc, m| {
                    Ok(or(&acc, &m)?)
                })
        }
        NotIn { field_id, literals } => {
            let in_mask = eval_mask(
                &In {
                    field_id: *field_id,
                    literals: literals.clone(),
                },
                schema,
                batch,
                expected_schema,
                expected_to_file,
            )?;
            Ok(not(&in_mask)?)
        }
        And(left, right) => {
            let left_mask = eval_mask(left, schema, batch, expected_schema, expected_to_file)?;
            let right_mask = eval_mask(right, schema, batch, expected_schema, expected_to_file)?;
            Ok(and(&left_mask, &right_mask)?)
        }
        Or(left, right) => {
            let left_mask = eval_mask(left, schema, batch, expected_schema, expected_to_file)?;
            let right_mask = eval_mask(right, schema, batch, expected_schema, expected_to_file)?;
            Ok(or(&left_mask, &right_mask)?)
        }
        Not(_) => unreachable!("BoundPredicate::Not is eliminated by rewrite_not before eval"),
    }
}

fn column_for(
    field_id: i32,
    schema: &ArrowSchema,
    batch: &RecordBatch,
    expected_schema: &Schema,
    expected_to_file: &HashMap<String, String>,
) -> Result<ArrayRef> {
    let expected_field = expected_schema
        .find_field(field_id)
        .ok_or(Error::SchemaIdMismatch(field_id))?;

    let lookup_name = expected_to_file
        .get(&expected_field.name)
        .unwrap_or(&expected_field.name);

    let position = schema
        .index_of(lookup_name)
        .map_err(|_| Error::SchemaIdMismatch(field_id))?;

    Ok(batch.column(position).clone())
}

fn compare(
    field_id: i32,
    literal: &Literal,
    schema: &ArrowSchema,
    batch: &RecordBatch,
    expected_schema: &Schema,
    expected_to_file: &HashMap<String, String>,
    op: impl Fn(
        &dyn arrow::array::Datum,
        &dyn arrow::array::Datum,
    ) -> std::result::Result<BooleanArray, arrow_schema::ArrowError>,
) -> Result<BooleanArray> {
    let column = column_for(field_id, schema, batch, expected_schema, expected_to_file)?;
    let literal_array = literal_array(literal, column.data_type(), batch.num_rows())?;
    Ok(op(&column, &literal_array)?)
}

fn literal_array(literal: &Literal, data_type: &DataType, len: usize) -> Result<ArrayRef> {
    let array: ArrayRef = match literal {
        Bound::Bool(v) => Arc::new(BooleanArray::from(vec![*v; len])),
        Bound::I32(v) => Arc::new(Int32Array::from(vec![*v; len])),
        Bound::I64(v) => Arc::new(Int64Array::from(vec![*v; len])),
        Bound::F32(_) | Bound::F64(_) => {
            unreachable!("FLOAT/DOUBLE bounds are never constructed, see stats::Bound")
        }
        Bound::Date(v) => Arc::new(Date32Array::from(vec![*v; len])),
        Bound::TsMicros(v) => Arc::new(TimestampMicrosecondArray::from(vec![*v; len])),
        Bound::Str(v) => Arc::new(StringArray::from(vec![v.clone(); len])),
        Bound::Bytes(v) => Arc::new(arrow::array::BinaryArray::from(
            vec![v.as_slice(); len],
        )),
        Bound::Decimal128 { unscaled, scale } => {
            let (precision, scale) = match data_type {
                DataType::Decimal128(p, s) => (*p, *s as u32),
                _ => (38u8, *scale),
            };
            Arc::new(
                arrow::array::Decimal128Array::from(vec![*unscaled; len])
                    .with_precision_and_scale(precision, scale as i8)?,
            )
        }
    };
    Ok(array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, Type};
    use arrow_schema::Field as ArrowField;

    fn single_column_schema() -> Arc<ArrowSchema> {
        Arc::new(ArrowSchema::new(vec![ArrowField::new(
            "n",
            DataType::Int64,
            true,
        )]))
    }

    #[test]
    fn eq_predicate_filters_matching_rows_only() {
        let schema = single_column_schema();
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![Arc::new(Int64Array::from(vec![1, 2, 3, 2]))],
        )
        .unwrap();

        let expected_schema = Schema::new(vec![Field::new(1, "n", Type::Long, true)]);
        let expected_to_file = HashMap::new();

        let predicate = BoundPredicate::Eq {
            field_id: 1,
            literal: Bound::I64(2),
        };

        let result = apply_predicate(
            &schema,
            &[batch],
            &predicate,
            &expected_schema,
            &expected_to_file,
        )
        .unwrap();

        assert_eq!(result[0].num_rows(), 2);
    }

    #[test]
    fn and_predicate_combines_masks() {
        let schema = single_column_schema();
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![Arc::new(Int64Array::from(vec![1, 2, 3, 4, 5]))],
        )
        .unwrap();

        let expected_schema = Schema::new(vec![Field::new(1, "n", Type::Long, true)]);
        let expected_to_file = HashMap::new();

        let predicate = BoundPredicate::And(
            Box::new(BoundPredicate::GtEq {
                field_id: 1,
                literal: Bound::I64(2),
            }),
            Box::new(BoundPredicate::LtEq {
                field_id: 1,
                literal: Bound::I64(4),
            }),
        );

        let result = apply_predicate(
            &schema,
            &[batch],
            &predicate,
            &expected_schema,
            &expected_to_file,
        )
        .unwrap();

        assert_eq!(result[0].num_rows(), 3);
    }

    #[test]
    fn is_null_predicate_selects_null_rows() {
        let schema = single_column_schema();
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![Arc::new(Int64Array::from(vec![Some(1), None, Some(3)]))],
        )
        .unwrap();

        let expected_schema = Schema::new(vec![Field::new(1, "n", Type::Long, true)]);
        let expected_to_file = HashMap::new();

        let predicate = BoundPredicate::IsNull { field_id: 1 };

        let result = apply_predicate(
            &schema,
            &[batch],
            &predicate,
            &expected_schema,
            &expected_to_file,
        )
        .unwrap();

        assert_eq!(result[0].num_rows(), 1);
    }
}
