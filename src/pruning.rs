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

//! Row-group-level predicate evaluator.
//!
//! Decides, for one row group, whether rows satisfying a bound predicate
//! could possibly be present. The dispatch is a recursive match over a
//! tagged-union predicate tree -- the Rust counterpart of the visitor
//! double-dispatch the Python original uses -- rather than inheritance.

use std::collections::HashMap;

use parquet::file::metadata::RowGroupMetaData;

use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::stats::{decode_row_group, Bound};

/// A literal value a predicate leaf compares a column against. Deliberately
/// the same variant set as [`crate::stats::Bound`] -- comparing a literal
/// against a bound is only meaningful when both are the same logical type.
pub type Literal = Bound;

/// A predicate tree already bound to field ids, with `NOT` rewritten
/// inward (de Morgan) by [`rewrite_not`] before it reaches the evaluator.
/// This is the minimal predicate algebra this crate owns; a full expression
/// binder/visitor is out of scope here, same as it is for the Python
/// original's `Binder`/`ExpressionVisitors` collaborators.
#[derive(Debug, Clone)]
pub enum BoundPredicate {
    AlwaysTrue,
    AlwaysFalse,
    IsNull { field_id: i32 },
    NotNull { field_id: i32 },
    Lt { field_id: i32, literal: Literal },
    LtEq { field_id: i32, literal: Literal },
    Gt { field_id: i32, literal: Literal },
    GtEq { field_id: i32, literal: Literal },
    Eq { field_id: i32, literal: Literal },
    NotEq { field_id: i32, literal: Literal },
    In { field_id: i32, literals: Vec<Literal> },
    NotIn { field_id: i32, literals: Vec<Literal> },
    And(Box<BoundPredicate>, Box<BoundPredicate>),
    Or(Box<BoundPredicate>, Box<BoundPredicate>),
    /// Only ever produced transiently by [`rewrite_not`]; never reaches
    /// `eval_predicate`.
    Not(Box<BoundPredicate>),
}

/// Pushes `NOT` inward over a predicate tree via de Morgan's laws, the Rust
/// counterpart of `Expressions.rewrite_not`. The result never contains a
/// `Not` node, so `eval_predicate` does not need to handle one.
pub fn rewrite_not(predicate: BoundPredicate) -> BoundPredicate {
    use BoundPredicate::*;
    match predicate {
        Not(inner) => negate(*inner),
        And(left, right) => And(Box::new(rewrite_not(*left)), Box::new(rewrite_not(*right))),
        Or(left, right) => Or(Box::new(rewrite_not(*left)), Box::new(rewrite_not(*right))),
        leaf => leaf,
    }
}

fn negate(predicate: BoundPredicate) -> BoundPredicate {
    use BoundPredicate::*;
    match predicate {
        AlwaysTrue => AlwaysFalse,
        AlwaysFalse => AlwaysTrue,
        IsNull { field_id } => NotNull { field_id },
        NotNull { field_id } => IsNull { field_id },
        Lt { field_id, literal } => GtEq { field_id, literal },
        LtEq { field_id, literal } => Gt { field_id, literal },
        Gt { field_id, literal } => LtEq { field_id, literal },
        GtEq { field_id, literal } => Lt { field_id, literal },
        Eq { field_id, literal } => NotEq { field_id, literal },
        NotEq { field_id, literal } => Eq { field_id, literal },
        In { field_id, literals } => NotIn { field_id, literals },
        NotIn { field_id, literals } => In { field_id, literals },
        And(left, right) => Or(
            Box::new(rewrite_not(negate(*left))),
            Box::new(rewrite_not(negate(*right))),
        ),
        Or(left, right) => And(
            Box::new(rewrite_not(negate(*left))),
            Box::new(rewrite_not(negate(*right))),
        ),
        Not(inner) => rewrite_not(*inner),
    }
}

/// `MIGHT_MATCH` / `CANNOT_MATCH`, the two-valued result of conservative
/// predicate pushdown. `CannotMatch` is a guarantee; `MightMatch` is an
/// under-constrained possibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowGroupMatch {
    MightMatch,
    CannotMatch,
}

impl RowGroupMatch {
    pub fn is_might_match(self) -> bool {
        matches!(self, RowGroupMatch::MightMatch)
    }
}

/// Evaluates one row group at a time against a bound predicate and an
/// optional byte-range gate. Pure and thread-safe: all of a call's working
/// state lives in the `BoundsTable` built fresh inside `eval`.
pub struct RowGroupEvaluator<'a> {
    expected_schema: &'a Schema,
    file_to_expected: &'a HashMap<String, String>,
    predicate: Option<&'a BoundPredicate>,
    range: Option<(i64, i64)>,
}

impl<'a> RowGroupEvaluator<'a> {
    pub fn new(
        expected_schema: &'a Schema,
        file_to_expected: &'a HashMap<String, String>,
        predicate: Option<&'a BoundPredicate>,
        range: Option<(i64, i64)>,
    ) -> Self {
        RowGroupEvaluator {
            expected_schema,
            file_to_expected,
            predicate,
            range,
        }
    }

    /// Returns whether `row_group` might contain rows matching the
    /// predicate and range this evaluator was constructed with.
    pub fn eval(&self, row_group: &RowGroupMetaData) -> Result<RowGroupMatch> {
        if row_group.num_rows() <= 0 {
            return Ok(RowGroupMatch::CannotMatch);
        }

        let bounds = decode_row_group(row_group, self.file_to_expected, self.expected_schema);

        if let Some((start, end)) = self.range {
            if !(start <= bounds.midpoint && bounds.midpoint <= end) {
                return Ok(RowGroupMatch::CannotMatch);
            }
        }

        let Some(predicate) = self.predicate else {
            return Ok(RowGroupMatch::MightMatch);
        };

        eval_predicate(predicate, &bounds, row_group.num_rows(), self.expected_schema)
    }
}

fn eval_predicate(
    predicate: &BoundPredicate,
    bounds: &crate::stats::BoundsTable,
    num_rows: i64,
    expected_schema: &Schema,
) -> Result<RowGroupMatch> {
    use RowGroupMatch::{CannotMatch, MightMatch};

    let present = |id: i32| bounds.parquet_cols.contains(&id);
    let all_null = |id: i32| bounds.nulls.get(&id).is_some_and(|&n| n as i64 == num_rows);

    let result = match predicate {
        BoundPredicate::AlwaysTrue => MightMatch,
        BoundPredicate::AlwaysFalse => CannotMatch,

        BoundPredicate::IsNull { field_id } => {
            require_top_level(*field_id, expected_schema)?;
            if present(*field_id) && bounds.nulls.get(field_id).copied() == Some(0) {
                CannotMatch
            } else {
                MightMatch
            }
        }

        BoundPredicate::NotNull { field_id } => {
            require_top_level(*field_id, expected_schema)?;
            if !present(*field_id) || all_null(*field_id) {
                CannotMatch
            } else {
                MightMatch
            }
        }

        BoundPredicate::Lt { field_id, literal } => {
            require_top_level(*field_id, expected_schema)?;
            if !present(*field_id) || all_null(*field_id) {
                CannotMatch
            } else if bounds
                .lower_bounds
                .get(field_id)
                .is_some_and(|lower| lower >= literal)
            {
                CannotMatch
            } else {
                MightMatch
            }
        }

        BoundPredicate::LtEq { field_id, literal } => {
            require_top_level(*field_id, expected_schema)?;
            if !present(*field_id) || all_null(*field_id) {
                CannotMatch
            } else if bounds
                .lower_bounds
                .get(field_id)
                .is_some_and(|lower| lower > literal)
            {
                CannotMatch
            } else {
                MightMatch
            }
        }

        BoundPredicate::Gt { field_id, literal } => {
            require_top_level(*field_id, expected_schema)?;
            if !present(*field_id) || all_null(*field_id) {
                CannotMatch
            } else if bounds
                .upper_bounds
                .get(field_id)
                .is_some_and(|upper| upper <= literal)
            {
                CannotMatch
            } else {
                MightMatch
            }
        }

        BoundPredicate::GtEq { field_id, literal } => {
            require_top_level(*field_id, expected_schema)?;
            if !present(*field_id) || all_null(*field_id) {
                CannotMatch
            } else if bounds
                .upper_bounds
                .get(field_id)
                .is_some_and(|upper| upper < literal)
            {
                CannotMatch
            } else {
                MightMatch
            }
        }

        BoundPredicate::Eq { field_id, literal } => {
            require_top_level(*field_id, expected_schema)?;
            if !present(*field_id) || all_null(*field_id) {
                CannotMatch
            } else if bounds
                .lower_bounds
                .get(field_id)
                .is_some_and(|lower| lower > literal)
                || bounds
                    .upper_bounds
                    .get(field_id)
                    .is_some_and(|upper| upper < literal)
            {
                CannotMatch
            } else {
                MightMatch
            }
        }

        BoundPredicate::NotEq { field_id, .. } => {
            require_top_level(*field_id, expected_schema)?;
            if !present(*field_id) || all_null(*field_id) {
                CannotMatch
            } else {
                MightMatch
            }
        }

        BoundPredicate::In { field_id, .. } | BoundPredicate::NotIn { field_id, .. } => {
            require_top_level(*field_id, expected_schema)?;
            if !present(*field_id) || all_null(*field_id) {
                CannotMatch
            } else {
                MightMatch
            }
        }

        BoundPredicate::And(left, right) => {
            if eval_predicate(left, bounds, num_rows, expected_schema)? == CannotMatch
                || eval_predicate(right, bounds, num_rows, expected_schema)? == CannotMatch
            {
                CannotMatch
            } else {
                MightMatch
            }
        }

        BoundPredicate::Or(left, right) => {
            if eval_predicate(left, bounds, num_rows, expected_schema)? == MightMatch
                || eval_predicate(right, bounds, num_rows, expected_schema)? == MightMatch
            {
                MightMatch
            } else {
                CannotMatch
            }
        }

        BoundPredicate::Not(_) => {
            unreachable!("rewrite_not eliminates Not before a predicate reaches eval_predicate")
        }
    };

    Ok(result)
}

/// Nested-column references are fatal for this evaluator: the caller must
/// never push such a predicate down to it. A field id that resolves to
/// something nested inside a top-level struct/list/map is rejected;
/// unknown ids (e.g. from schema evolution) are left to the normal
/// absent-column handling in each leaf.
fn require_top_level(field_id: i32, expected_schema: &Schema) -> Result<()> {
    if expected_schema.is_nested_field(field_id) {
        return Err(Error::NestedColumnPredicate(field_id.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, Schema, Type};
    use parquet::basic::Type as PhysicalType;
    use parquet::file::metadata::ColumnChunkMetaData;
    use parquet::file::statistics::Statistics as ParquetStatistics;
    use parquet::schema::types::{SchemaDescPtr, SchemaDescriptor, Type as SchemaType};
    use std::sync::Arc;

    fn expected_schema() -> Schema {
        Schema::new(vec![
            Field::new(1, "string_col", Type::String, true),
            Field::new(2, "long_col", Type::Long, true),
            Field::new(3, "int_col", Type::Integer, true),
            Field::new(4, "float_col", Type::Float, false),
            Field::new(5, "null_col", Type::String, false),
            Field::new(6, "missing_col", Type::String, false),
            Field::new(7, "no_stats_col", Type::String, false),
        ])
    }

    fn identity_map() -> HashMap<String, String> {
        [
            ("string_col", "string_col"),
            ("long_col", "long_col"),
            ("int_col", "int_col"),
            ("float_col_renamed", "float_col"),
            ("null_col", "null_col"),
            ("no_stats_col", "no_stats_col"),
        ]
        .into_iter()
        .map(|(f, e)| (f.to_string(), e.to_string()))
        .collect()
    }

    fn schema_descr() -> SchemaDescPtr {
        let fields = vec![
            ("string_col", PhysicalType::BYTE_ARRAY),
            ("long_col", PhysicalType::INT64),
            ("int_col", PhysicalType::INT32),
            ("float_col_renamed", PhysicalType::FLOAT),
            ("null_col", PhysicalType::BYTE_ARRAY),
            ("no_stats_col", PhysicalType::BYTE_ARRAY),
        ];
        let mut schema_fields = fields
            .iter()
            .map(|(n, t)| Arc::new(SchemaType::primitive_type_builder(n, *t).build().unwrap()))
            .collect::<Vec<_>>();
        let schema = SchemaType::group_type_builder("schema")
            .with_fields(&mut schema_fields)
            .build()
            .unwrap();
        Arc::new(SchemaDescriptor::new(Arc::new(schema)))
    }

    fn sample_row_group() -> RowGroupMetaData {
        let descr = schema_descr();
        let columns = vec![
            ColumnChunkMetaData::builder(descr.column(0))
                .set_file_offset(4)
                .set_total_compressed_size(12345)
                .set_statistics(ParquetStatistics::byte_array(
                    Some("b".into()),
                    Some("e".into()),
                    None,
                    Some(0),
                    false,
                ))
                .build()
                .unwrap(),
            ColumnChunkMetaData::builder(descr.column(1))
                .set_file_offset(12349)
                .set_total_compressed_size(12345)
                .set_statistics(ParquetStatistics::int64(
                    Some(0),
                    Some(1_234_567_890_123),
                    None,
                    Some(0),
                    false,
                ))
                .build()
                .unwrap(),
            ColumnChunkMetaData::builder(descr.column(2))
                .set_file_offset(24698)
                .set_total_compressed_size(12345)
                .set_statistics(ParquetStatistics::int32(
                    Some(0),
                    Some(12345),
                    None,
                    Some(0),
                    false,
                ))
                .build()
                .unwrap(),
            ColumnChunkMetaData::builder(descr.column(3))
                .set_file_offset(37043)
                .set_total_compressed_size(12345)
                .set_statistics(ParquetStatistics::float(
                    Some(0.0),
                    Some(123.45),
                    None,
                    Some(123),
                    false,
                ))
                .build()
                .unwrap(),
            ColumnChunkMetaData::builder(descr.column(4))
                .set_file_offset(49388)
                .set_total_compressed_size(4)
                .set_statistics(ParquetStatistics::byte_array(
                    None,
                    None,
                    None,
                    Some(100),
                    false,
                ))
                .build()
                .unwrap(),
            ColumnChunkMetaData::builder(descr.column(5))
                .set_file_offset(61733)
                .set_total_compressed_size(4)
                .build()
                .unwrap(),
        ];

        RowGroupMetaData::builder(descr)
            .set_num_rows(100)
            .set_total_byte_size(61737)
            .set_column_metadata(columns)
            .build()
            .unwrap()
    }

    fn eval(predicate: BoundPredicate) -> RowGroupMatch {
        let schema = expected_schema();
        let map = identity_map();
        let row_group = sample_row_group();
        let evaluator = RowGroupEvaluator::new(&schema, &map, Some(&predicate), Some((0, 123_456)));
        evaluator.eval(&row_group).unwrap()
    }

    #[test]
    fn s1_string_eq_within_bounds_might_match() {
        let p = BoundPredicate::Eq {
            field_id: 1,
            literal: Bound::Str("b".into()),
        };
        assert_eq!(eval(p), RowGroupMatch::MightMatch);
    }

    #[test]
    fn s2_string_eq_outside_bounds_cannot_match() {
        let p = BoundPredicate::Eq {
            field_id: 1,
            literal: Bound::Str("z".into()),
        };
        assert_eq!(eval(p), RowGroupMatch::CannotMatch);
    }

    #[test]
    fn s3_string_lt_min_cannot_match() {
        let p = BoundPredicate::Lt {
            field_id: 1,
            literal: Bound::Str("b".into()),
        };
        assert_eq!(eval(p), RowGroupMatch::CannotMatch);
    }

    #[test]
    fn s4_string_lteq_min_might_match() {
        let p = BoundPredicate::LtEq {
            field_id: 1,
            literal: Bound::Str("b".into()),
        };
        assert_eq!(eval(p), RowGroupMatch::MightMatch);
    }

    #[test]
    fn s5_int_eq_negative_cannot_match() {
        let p = BoundPredicate::Eq {
            field_id: 3,
            literal: Bound::I32(-1),
        };
        assert_eq!(eval(p), RowGroupMatch::CannotMatch);
    }

    #[test]
    fn s6_int_gteq_above_max_cannot_match() {
        let p = BoundPredicate::GtEq {
            field_id: 3,
            literal: Bound::I32(12346),
        };
        assert_eq!(eval(p), RowGroupMatch::CannotMatch);
    }

    #[test]
    fn s7_float_bounds_unknown_might_match() {
        let p = BoundPredicate::Gt {
            field_id: 4,
            literal: Bound::F32(100.0),
        };
        assert_eq!(eval(p), RowGroupMatch::MightMatch);
    }

    #[test]
    fn s8_missing_column_eq_cannot_match() {
        let p = BoundPredicate::Eq {
            field_id: 6,
            literal: Bound::Str("a".into()),
        };
        assert_eq!(eval(p), RowGroupMatch::CannotMatch);
    }

    #[test]
    fn s9_missing_column_is_null_might_match() {
        let p = BoundPredicate::IsNull { field_id: 6 };
        assert_eq!(eval(p), RowGroupMatch::MightMatch);
    }

    #[test]
    fn s10_all_null_column_is_null_might_match() {
        let p = BoundPredicate::IsNull { field_id: 5 };
        assert_eq!(eval(p), RowGroupMatch::MightMatch);
    }

    #[test]
    fn s11_all_null_column_not_null_cannot_match() {
        let p = BoundPredicate::NotNull { field_id: 5 };
        assert_eq!(eval(p), RowGroupMatch::CannotMatch);
    }

    #[test]
    fn s12_no_stats_column_eq_might_match() {
        let p = BoundPredicate::Eq {
            field_id: 7,
            literal: Bound::Str("a".into()),
        };
        assert_eq!(eval(p), RowGroupMatch::MightMatch);
    }

    #[test]
    fn zero_row_row_group_cannot_match() {
        let descr = schema_descr();
        let row_group = RowGroupMetaData::builder(descr)
            .set_num_rows(0)
            .set_total_byte_size(0)
            .set_column_metadata(vec![])
            .build()
            .unwrap();
        let schema = expected_schema();
        let map = identity_map();
        let evaluator = RowGroupEvaluator::new(&schema, &map, None, None);
        assert_eq!(
            evaluator.eval(&row_group).unwrap(),
            RowGroupMatch::CannotMatch
        );
    }

    #[test]
    fn rewrite_not_pushes_negation_to_leaves() {
        let predicate = BoundPredicate::Not(Box::new(BoundPredicate::And(
            Box::new(BoundPredicate::Lt {
                field_id: 1,
                literal: Bound::I32(5),
            }),
            Box::new(BoundPredicate::IsNull { field_id: 2 }),
        )));

        let rewritten = rewrite_not(predicate);
        match rewritten {
            BoundPredicate::Or(left, right) => {
                assert!(matches!(*left, BoundPredicate::GtEq { field_id: 1, .. }));
                assert!(matches!(*right, BoundPredicate::NotNull { field_id: 2 }));
            }
            other => panic!("expected Or, got {other:?}"),
        }
    }

    #[test]
    fn nested_column_is_null_is_rejected_like_other_leaves() {
        let schema = Schema::new(vec![Field::new(
            1,
            "s",
            Type::Struct(vec![Field::new(2, "inner", Type::Long, true)]),
            true,
        )]);
        let map = HashMap::new();
        let row_group = sample_row_group();
        let predicate = BoundPredicate::IsNull { field_id: 2 };
        let evaluator = RowGroupEvaluator::new(&schema, &map, Some(&predicate), None);
        assert!(matches!(
            evaluator.eval(&row_group),
            Err(Error::NestedColumnPredicate(_))
        ));
    }

    #[test]
    fn range_gate_excludes_row_group_outside_midpoint() {
        let schema = expected_schema();
        let map = identity_map();
        let row_group = sample_row_group();
        let evaluator = RowGroupEvaluator::new(&schema, &map, None, Some((0, 10)));
        assert_eq!(
            evaluator.eval(&row_group).unwrap(),
            RowGroupMatch::CannotMatch
        );
    }
}
