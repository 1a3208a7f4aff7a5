use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// SHA-256 of the analyzed lines, joined with newlines
pub fn content_hash<S: AsRef<str>>(lines: &[S]) -> String {
    let mut hasher = Sha256::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            hasher.update(b"\n");
        }
        hasher.update(line.as_ref().as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// SHA-256 of a configuration's JSON form
pub fn config_hash<T: Serialize>(config: &T) -> Result<String> {
    let config_json = serde_json::to_string(config)?;
    let mut hasher = Sha256::new();
    hasher.update(config_json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
