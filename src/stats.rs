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

//! Extracts per-row-group `(min, max, null_count)` statistics and
//! normalizes them into the expected logical types.

use std::collections::{HashMap, HashSet};

use parquet::file::metadata::RowGroupMetaData;
use parquet::file::statistics::Statistics as ParquetStatistics;

use crate::schema::{Schema, Type};

/// A min/max bound, typed the way the expected logical type says it should
/// be. Comparisons route by variant; there is deliberately no
/// cross-variant coercion -- mixing them is a bug in the caller, not
/// something this type silently papers over.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum Bound {
    Bool(bool),
    I32(i32),
    I64(i64),
    /// Never constructed: FLOAT statistics are excluded from pushdown
    /// (epsilon semantics deferred, see design notes). Kept so the type
    /// documents the omission instead of silently lacking a variant for it.
    F32(f32),
    /// Never constructed either -- DOUBLE is not in the supported-type set,
    /// so this path is as dead as `F32`, and is kept for the same reason.
    F64(f64),
    Decimal128 { unscaled: i128, scale: u32 },
    Date(i32),
    TsMicros(i64),
    Str(String),
    Bytes(Vec<u8>),
}

/// Per-row-group bounds, scoped to a single `eval` call and discarded once
/// it returns.
#[derive(Debug, Default)]
pub struct BoundsTable {
    pub lower_bounds: HashMap<i32, Bound>,
    pub upper_bounds: HashMap<i32, Bound>,
    pub nulls: HashMap<i32, u64>,
    pub parquet_cols: HashSet<i32>,
    pub midpoint: i64,
}

/// Decodes a row group's column statistics into a [`BoundsTable`], keyed by
/// expected-schema field id.
///
/// `file_to_expected` maps a column's on-disk dotted path to the
/// expected-schema field name; the name is then resolved to an id via the
/// expected schema's lazy name index, mirroring the Python original's
/// `schema.lazy_name_to_id().get(field_name_map.get(path_in_schema))`.
pub fn decode_row_group(
    row_group: &RowGroupMetaData,
    file_to_expected: &HashMap<String, String>,
    expected_schema: &Schema,
) -> BoundsTable {
    let mut table = BoundsTable::default();

    let mut first_offset: Option<i64> = None;
    let mut sum_size: i64 = 0;

    for column in row_group.columns() {
        let path = column.column_path().string();

        let offset = column.file_offset();
        first_offset = Some(first_offset.map_or(offset, |cur| cur.min(offset)));
        sum_size += column.total_compressed_size();

        let Some(expected_name) = file_to_expected.get(&path) else {
            continue;
        };
        let Some(id) = expected_schema.lazy_name_to_id(expected_name) else {
            continue;
        };
        table.parquet_cols.insert(id);

        let Some(stats) = column.statistics() else {
            continue;
        };

        if let Some(null_count) = stats.null_count_opt() {
            table.nulls.insert(id, null_count);
        }

        let Some(field) = expected_schema.find_field(id) else {
            continue;
        };

        if let Some((lower, upper)) = decode_bounds(&field.r#type, stats) {
            table.lower_bounds.insert(id, lower);
            table.upper_bounds.insert(id, upper);
        }
    }

    discard_overflowing_integers(&mut table, expected_schema);

    table.midpoint = sum_size / 2 + first_offset.unwrap_or(0);
    table
}

/// Decodes `(min, max)` for one column according to the logical-type table:
/// DATE/INTEGER/LONG/STRING pass through as-is, TIMESTAMP is rescaled to
/// microseconds, DECIMAL is reconstructed from its unscaled integer
/// representation, and FLOAT/DOUBLE/BOOLEAN/BINARY/FIXED/LIST/STRUCT/MAP are
/// not supported for bound pushdown.
fn decode_bounds(logical_type: &Type, stats: &ParquetStatistics) -> Option<(Bound, Bound)> {
    if !stats.has_min_max_set() {
        return None;
    }

    match logical_type {
        Type::Date => match stats {
            ParquetStatistics::Int32(s) => {
                Some((Bound::Date(*s.min_opt()?), Bound::Date(*s.max_opt()?)))
            }
            _ => None,
        },
        Type::Integer => match stats {
            ParquetStatistics::Int32(s) => {
                Some((Bound::I32(*s.min_opt()?), Bound::I32(*s.max_opt()?)))
            }
            _ => None,
        },
        Type::Long => match stats {
            ParquetStatistics::Int64(s) => {
                Some((Bound::I64(*s.min_opt()?), Bound::I64(*s.max_opt()?)))
            }
            _ => None,
        },
        Type::String => match stats {
            ParquetStatistics::ByteArray(s) => {
                let min = String::from_utf8(s.min_opt()?.data().to_vec()).ok()?;
                let max = String::from_utf8(s.max_opt()?.data().to_vec()).ok()?;
                Some((Bound::Str(min), Bound::Str(max)))
            }
            _ => None,
        },
        Type::Timestamp { .. } => match stats {
            ParquetStatistics::Int64(s) => Some((
                Bound::TsMicros(timestamp_seconds_to_micros(*s.min_opt()?)),
                Bound::TsMicros(timestamp_seconds_to_micros(*s.max_opt()?)),
            )),
            _ => None,
        },
        Type::Decimal { precision, scale } if *precision < 18 => match stats {
            ParquetStatistics::Int32(s) => Some((
                Bound::Decimal128 {
                    unscaled: *s.min_opt()? as i128,
                    scale: *scale,
                },
                Bound::Decimal128 {
                    unscaled: *s.max_opt()? as i128,
                    scale: *scale,
                },
            )),
            ParquetStatistics::Int64(s) => Some((
                Bound::Decimal128 {
                    unscaled: *s.min_opt()? as i128,
                    scale: *scale,
                },
                Bound::Decimal128 {
                    unscaled: *s.max_opt()? as i128,
                    scale: *scale,
                },
            )),
            _ => None,
        },
        Type::Decimal { scale, .. } => match stats {
            ParquetStatistics::FixedLenByteArray(s) => Some((
                Bound::Decimal128 {
                    unscaled: be_signed_bytes_to_i128(s.min_opt()?.data()),
                    scale: *scale,
                },
                Bound::Decimal128 {
                    unscaled: be_signed_bytes_to_i128(s.max_opt()?.data()),
                    scale: *scale,
                },
            )),
            ParquetStatistics::ByteArray(s) => Some((
                Bound::Decimal128 {
                    unscaled: be_signed_bytes_to_i128(s.min_opt()?.data()),
                    scale: *scale,
                },
                Bound::Decimal128 {
                    unscaled: be_signed_bytes_to_i128(s.max_opt()?.data()),
                    scale: *scale,
                },
            )),
            _ => None,
        },
        // FLOAT is deliberately excluded. DOUBLE/BOOLEAN/BINARY/FIXED/LIST/
        // STRUCT/MAP have no defined bound representation for pushdown.
        Type::Float
        | Type::Double
        | Type::Boolean
        | Type::Binary
        | Type::Fixed(_)
        | Type::List(_)
        | Type::Struct(_)
        | Type::Map { .. } => None,
    }
}

fn timestamp_seconds_to_micros(instant_seconds: i64) -> i64 {
    (instant_seconds as f64 * 1_000_000.0).floor() as i64
}

fn be_signed_bytes_to_i128(bytes: &[u8]) -> i128 {
    let negative = bytes.first().is_some_and(|b| b & 0x80 != 0);
    let mut buf = if negative { [0xffu8; 16] } else { [0u8; 16] };
    let start = 16 - bytes.len();
    buf[start..].copy_from_slice(bytes);
    i128::from_be_bytes(buf)
}

/// Integer overflow sentinel: a supported INTEGER/LONG column whose decoded
/// `max < min` has its bounds discarded entirely, as if statistics were
/// absent.
fn discard_overflowing_integers(table: &mut BoundsTable, expected_schema: &Schema) {
    let overflowing: Vec<i32> = table
        .lower_bounds
        .iter()
        .filter_map(|(id, lower)| {
            let field = expected_schema.find_field(*id)?;
            if !matches!(field.r#type, Type::Integer | Type::Long) {
                return None;
            }
            let upper = table.upper_bounds.get(id)?;
            let overflow = match (lower, upper) {
                (Bound::I32(lo), Bound::I32(hi)) => hi < lo,
                (Bound::I64(lo), Bound::I64(hi)) => hi < lo,
                _ => false,
            };
            overflow.then_some(*id)
        })
        .collect();

    for id in overflowing {
        table.lower_bounds.remove(&id);
        table.upper_bounds.remove(&id);
    }
}
