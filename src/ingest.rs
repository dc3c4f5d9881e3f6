use std::fs;
use std::io::Read;
use std::path::Path;

use crate::error::{LedgerError, LedgerResult};
use crate::model::RunDocument;

/// Read a run document from `path`, or from stdin when `path` is `-`.
pub fn load_document(path: &Path) -> LedgerResult<RunDocument> {
    let raw = if path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(path)?
    };

    parse_document(&raw)
}

pub fn parse_document(raw: &str) -> LedgerResult<RunDocument> {
    let document: RunDocument = serde_json::from_str(raw)?;
    if document.suites.is_empty() {
        return Err(LedgerError::InvalidRequest(
            "run document contains no suites".to_owned(),
        ));
    }
    Ok(document)
}
