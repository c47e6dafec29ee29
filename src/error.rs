// Copyright 2024 Vladimir Kharchev

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error type shared by every module of the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while building, filling, fitting or rendering objects.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Style configuration could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A text input contained a malformed row
    #[error("{}:{line}: {message}", path.display())]
    Parse {
        /// File being read.
        path: PathBuf,
        /// 1-based line number of the offending row.
        line: usize,
        /// What was wrong with the row.
        message: String,
    },

    /// An expression could not be compiled
    #[error("formula error: {0}")]
    Formula(String),

    /// A constructor or setter received an argument outside its domain
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Arrays that must agree in length do not
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Required length.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },

    /// A fit was requested on a dataset with no usable points
    #[error("no usable data: {0}")]
    EmptyData(String),

    /// The drawing backend failed
    #[error("render error: {0}")]
    Render(String),

    /// The output file extension has no backend
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
