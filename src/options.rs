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

//! Reader configuration, accepted either as a typed builder or as the
//! stringly-typed `HashMap<String, String>` form table engines pass
//! `Scan`-time properties around as.

use std::collections::HashMap;

/// An inclusive byte-offset range `[start, end)` a row group's midpoint
/// must fall within to be considered for this split.
pub type Range = Option<(i64, i64)>;

/// Knobs that change how a read is executed, never what data it returns.
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderOptions {
    /// Whether row groups are pruned via column statistics before being
    /// read. Disabling this still produces a correct (if slower) read --
    /// pruning is a soundness-preserving optimization, never a
    /// prerequisite for correctness.
    pub use_row_group_filtering: bool,
    /// Whether matched row groups are decoded across a bounded `rayon`
    /// thread pool rather than sequentially on the calling thread.
    pub scan_thread_pool_enabled: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            use_row_group_filtering: true,
            scan_thread_pool_enabled: false,
        }
    }
}

impl ReaderOptions {
    pub fn builder() -> ReaderOptionsBuilder {
        ReaderOptionsBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReaderOptionsBuilder {
    options: ReaderOptions,
}

impl ReaderOptionsBuilder {
    pub fn use_row_group_filtering(mut self, enabled: bool) -> Self {
        self.options.use_row_group_filtering = enabled;
        self
    }

    pub fn scan_thread_pool_enabled(mut self, enabled: bool) -> Self {
        self.options.scan_thread_pool_enabled = enabled;
        self
    }

    pub fn build(self) -> ReaderOptions {
        self.options
    }
}

impl From<&HashMap<String, String>> for ReaderOptions {
    /// Parses the wire representation table engines pass scan properties
    /// around as. Unrecognized keys are ignored; a key present but not
    /// parseable as a bool falls back to the default for that key rather
    /// than failing the whole read.
    fn from(properties: &HashMap<String, String>) -> Self {
        let mut options = ReaderOptions::default();

        if let Some(value) = properties.get("use-row-group-filtering") {
            if let Ok(parsed) = value.parse() {
                options.use_row_group_filtering = parsed;
            }
        }
        if let Some(value) = properties.get("scan-thread-pool-enabled") {
            if let Ok(parsed) = value.parse() {
                options.scan_thread_pool_enabled = parsed;
            }
        }

        options
    }
}
