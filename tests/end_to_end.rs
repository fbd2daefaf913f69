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

//! End-to-end reads against small, in-process-written parquet files,
//! exercising schema evolution (rename + null-fill) and the residual
//! filter together rather than each in isolation.

use std::sync::Arc;

use arrow::array::{Array, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;
use arrow_schema::{DataType, Field as ArrowField, Schema as ArrowSchema};
use parquet::arrow::ArrowWriter;
use tempfile::NamedTempFile;

use iceberg_parquet_reader::input::LocalInputFile;
use iceberg_parquet_reader::options::ReaderOptions;
use iceberg_parquet_reader::pruning::BoundPredicate;
use iceberg_parquet_reader::reader::ParquetIcebergReader;
use iceberg_parquet_reader::schema::{Field, Schema, Type};
use iceberg_parquet_reader::stats::Bound;

fn write_sample_parquet() -> NamedTempFile {
    let schema = Arc::new(ArrowSchema::new(vec![
        ArrowField::new("renamed_id", DataType::Int64, false),
        ArrowField::new("name", DataType::Utf8, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(vec![1, 2, 3])),
            Arc::new(StringArray::from(vec!["alice", "bob", "carol"])),
        ],
    )
    .unwrap();

    let file = NamedTempFile::new().unwrap();
    let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
    file
}

fn file_schema() -> Schema {
    Schema::new(vec![
        Field::new(1, "renamed_id", Type::Long, true),
        Field::new(2, "name", Type::String, true),
    ])
}

fn expected_schema_with_new_column() -> Schema {
    Schema::new(vec![
        Field::new(1, "id", Type::Long, true),
        Field::new(2, "name", Type::String, true),
        Field::new(3, "email", Type::String, false),
    ])
}

#[test]
fn read_renames_column_and_null_fills_added_field() {
    let file = write_sample_parquet();
    let input = LocalInputFile::new(file.path());

    let mut reader = ParquetIcebergReader::new(
        input,
        file_schema(),
        expected_schema_with_new_column(),
        ReaderOptions::default(),
        None,
        None,
    );

    let table = reader.read().unwrap();
    assert_eq!(table.num_rows(), 3);

    let schema = &table.schema;
    assert_eq!(schema.field(0).name(), "id");
    assert_eq!(schema.field(1).name(), "name");
    assert_eq!(schema.field(2).name(), "email");

    let email_column = table.chunks[0].column(2);
    assert_eq!(email_column.null_count(), 3);
}

#[test]
fn residual_filter_narrows_rows_after_reconciliation() {
    let file = write_sample_parquet();
    let input = LocalInputFile::new(file.path());

    let predicate = BoundPredicate::Eq {
        field_id: 1,
        literal: Bound::I64(2),
    };

    let mut reader = ParquetIcebergReader::new(
        input,
        file_schema(),
        expected_schema_with_new_column(),
        ReaderOptions::default(),
        Some(predicate),
        None,
    );

    let table = reader.read().unwrap();
    assert_eq!(table.num_rows(), 1);
    let name_column = table.chunks[0]
        .column(1)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(name_column.value(0), "bob");
}

#[test]
fn identity_schema_round_trips_without_reconciliation() {
    let file = write_sample_parquet();
    let input = LocalInputFile::new(file.path());

    let mut reader = ParquetIcebergReader::new(
        input,
        file_schema(),
        file_schema(),
        ReaderOptions::default(),
        None,
        None,
    );

    let table = reader.read().unwrap();
    assert_eq!(table.num_rows(), 3);
    assert_eq!(table.schema.field(0).name(), "renamed_id");
}

#[test]
fn row_group_filtering_disabled_still_reads_all_rows() {
    let file = write_sample_parquet();
    let input = LocalInputFile::new(file.path());

    let options = ReaderOptions::builder()
        .use_row_group_filtering(false)
        .build();

    let mut reader = ParquetIcebergReader::new(
        input,
        file_schema(),
        file_schema(),
        options,
        None,
        None,
    );

    let table = reader.read().unwrap();
    assert_eq!(table.num_rows(), 3);
}
