//! Offline decoding of a captured agent response.
//!
//! This is a single pass over a saved stream that concatenates the content of
//! every completion chunk.  Unlike the live decoder it performs no event
//! classification or schema checks; lines other than `data: ` lines are
//! ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};

use utf8path::Path;

use crate::decoder::DONE_SENTINEL;
use crate::types::Completion;
use crate::{Error, Result};

const DATA_PREFIX: &str = "data: ";

/// Concatenate the streamed content found in `reader`.
///
/// Reading stops at the first `[DONE]` data line.
pub fn concat_content(reader: impl BufRead) -> Result<String> {
    let mut content = String::new();
    for line in reader.lines() {
        let line = line.map_err(|e| Error::io(format!("error reading stream: {e}"), e))?;
        let Some(data) = line.strip_prefix(DATA_PREFIX) else {
            continue;
        };
        let data = data.strip_suffix('\r').unwrap_or(data);
        if data == DONE_SENTINEL {
            break;
        }
        if data.is_empty() {
            continue;
        }
        let completion: Completion = serde_json::from_str(data).map_err(|e| {
            Error::serialization(format!("error parsing JSON: {e}"), Some(Box::new(e)))
        })?;
        for choice in &completion.choices {
            content.push_str(&choice.delta.content);
        }
    }
    Ok(content)
}

/// Concatenate the streamed content of the file at `path`.
pub fn concat_file(path: &Path<'_>) -> Result<String> {
    let file = File::open(path.as_str())
        .map_err(|e| Error::io(format!("could not open file {}: {e}", path.as_str()), e))?;
    concat_content(BufReader::new(file))
}
