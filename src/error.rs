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

//! Error type shared by every module in this crate.

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Errors produced while evaluating row groups, reconciling schemas, or
/// driving a read. `StatisticsMalformed` from the design is deliberately
/// absent here: malformed statistics are recovered locally by treating the
/// affected bound as unknown and are never surfaced as an `Error`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A missing expected field has a logical type with no defined null-fill
    /// (currently only `MAP`).
    #[error("no null-fill defined for type {type_name} (field {field_name})")]
    UnsupportedFillType {
        field_name: String,
        type_name: String,
    },

    /// A predicate referenced a column that is not a top-level struct field.
    #[error("cannot push down predicate on nested column: {0}")]
    NestedColumnPredicate(String),

    /// An expected field id could not be resolved while reconciling schemas.
    #[error("expected field id {0} not found in expected schema")]
    SchemaIdMismatch(i32),

    #[error(transparent)]
    Arrow(#[from] ArrowError),

    #[error(transparent)]
    Parquet(#[from] ParquetError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
