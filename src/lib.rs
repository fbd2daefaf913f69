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

//! Reads Parquet files written against one version of an Iceberg table's
//! schema back out as Arrow record batches shaped like a later (or
//! earlier) version of that schema.
//!
//! The crate is organized the way the read path actually flows:
//!
//! - [`schema`] models the Iceberg logical schema this crate reconciles
//!   against, field ids and all.
//! - [`field_map`] and [`projection`] derive, from a `(file_schema,
//!   expected_schema)` pair, the file-name/expected-name translation and
//!   the column projection to read.
//! - [`stats`] and [`pruning`] decode Parquet column statistics and decide
//!   which row groups can be skipped without reading them.
//! - [`residual`] applies whatever the row-group pruning pass could not
//!   rule out, row by row, once the matched row groups are decoded.
//! - [`reconcile`] renames and null-fills the decoded table to match the
//!   expected schema.
//! - [`arrow_types`] bridges the logical schema types to the Arrow types
//!   the rest of the pipeline is expressed in.
//! - [`input`] and [`options`] are the external interface: where the bytes
//!   come from and which knobs control how they're read.
//! - [`reader`] drives the whole pipeline end to end.

pub mod arrow_types;
pub mod error;
pub mod field_map;
pub mod input;
pub mod options;
pub mod projection;
pub mod pruning;
pub mod reader;
pub mod reconcile;
pub mod residual;
pub mod schema;
pub mod stats;

pub use error::{Error, Result};
pub use input::{InputFile, LocalInputFile};
pub use options::{ReaderOptions, Range};
pub use pruning::{BoundPredicate, Literal, RowGroupMatch};
pub use reader::{ParquetIcebergReader, ReadStats, RowIter};
pub use reconcile::ChunkedTable;
pub use schema::{Field, Schema, Type};
