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

//! The storage abstraction a reader opens its parquet bytes through.
//!
//! Kept deliberately thin: this crate only ever needs random-access reads
//! of an already-located file, not listing or writing. Callers backed by
//! object storage implement [`InputFile`] themselves.

use std::fs::File;
use std::path::{Path, PathBuf};

use parquet::file::reader::ChunkReader;

use crate::error::Result;

/// A handle to one data file, capable of opening a [`ChunkReader`] over it.
/// Mirrors the role `FileIO`/`InputFile` plays in the Python original,
/// minus anything this crate never needs (existence checks, metadata,
/// deletion).
///
/// Generic over the concrete reader type rather than a trait object:
/// `parquet::file::reader::ChunkReader` carries an associated `Read` type
/// and so isn't object-safe, the same reason the teacher's
/// `SerializedFileReader` is itself generic over its chunk reader.
pub trait InputFile: Send + Sync {
    type Reader: ChunkReader + 'static;

    fn open(&self) -> Result<Self::Reader>;

    /// A human-readable identifier for log lines and error messages; not
    /// necessarily a real filesystem path.
    fn location(&self) -> &str;
}

/// An [`InputFile`] backed by a path on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalInputFile {
    path: PathBuf,
}

impl LocalInputFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LocalInputFile { path: path.into() }
    }
}

impl InputFile for LocalInputFile {
    type Reader = File;

    fn open(&self) -> Result<File> {
        Ok(File::open(&self.path)?)
    }

    fn location(&self) -> &str {
        self.path.to_str().unwrap_or("<non-utf8 path>")
    }
}

impl AsRef<Path> for LocalInputFile {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}
