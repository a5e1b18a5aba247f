//! Artifact persistence
//!
//! Fitted objects and arrays are written with `bincode` inside a small
//! envelope carrying magic bytes, a format version and an FNV-1a checksum of
//! the payload. Loading rejects files whose checksum does not match.

use crate::error::{PipelineError, Result};
use ndarray::Array2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Envelope written around every persisted object
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SerializedObject {
    magic: [u8; 4],
    format_version: u32,
    /// Rust type name of the payload, for diagnostics
    type_name: String,
    payload: Vec<u8>,
    checksum: u64,
}

impl SerializedObject {
    const MAGIC: [u8; 4] = [b'X', b'S', b'E', b'L'];
    const VERSION: u32 = 1;

    fn new(type_name: &str, payload: Vec<u8>) -> Self {
        let checksum = Self::compute_checksum(&payload);
        Self {
            magic: Self::MAGIC,
            format_version: Self::VERSION,
            type_name: type_name.to_string(),
            payload,
            checksum,
        }
    }

    /// FNV-1a
    fn compute_checksum(data: &[u8]) -> u64 {
        const FNV_OFFSET: u64 = 14695981039346656037;
        const FNV_PRIME: u64 = 1099511628211;

        let mut hash = FNV_OFFSET;
        for byte in data {
            hash ^= *byte as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        hash
    }

    fn verify(&self) -> Result<()> {
        if self.magic != Self::MAGIC {
            return Err(PipelineError::serialization("not a pipeline artifact (bad magic bytes)"));
        }
        if self.format_version != Self::VERSION {
            return Err(PipelineError::serialization(format!(
                "unsupported artifact format version {}",
                self.format_version
            )));
        }
        if Self::compute_checksum(&self.payload) != self.checksum {
            return Err(PipelineError::serialization(format!(
                "checksum verification failed for {}, file may be corrupted",
                self.type_name
            )));
        }
        Ok(())
    }
}

/// Create the parent directory of `path` if it has one
pub fn create_parent_dir(path: impl AsRef<Path>) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Serialize `object` into enveloped bytes
pub fn encode_object<T: Serialize>(object: &T) -> Result<Vec<u8>> {
    let payload = bincode::serialize(object)?;
    let envelope = SerializedObject::new(std::any::type_name::<T>(), payload);
    Ok(bincode::serialize(&envelope)?)
}

/// Verify and deserialize enveloped bytes
pub fn decode_object<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let envelope: SerializedObject = bincode::deserialize(bytes)?;
    envelope.verify()?;
    Ok(bincode::deserialize(&envelope.payload)?)
}

pub fn save_object<T: Serialize>(path: impl AsRef<Path>, object: &T) -> Result<()> {
    let path = path.as_ref();
    create_parent_dir(path)?;

    let bytes = encode_object(object)?;
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&bytes)?;
    writer.flush()?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "saved object");
    Ok(())
}

pub fn load_object<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let mut bytes = Vec::new();
    BufReader::new(File::open(path)?).read_to_end(&mut bytes)?;
    decode_object(&bytes)
}

/// Persist a numeric matrix
pub fn save_array(path: impl AsRef<Path>, array: &Array2<f64>) -> Result<()> {
    save_object(path, array)
}

pub fn load_array(path: impl AsRef<Path>) -> Result<Array2<f64>> {
    load_object(path)
}

/// Write `value` as pretty JSON
pub fn write_json_report<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    create_parent_dir(path)?;
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use ndarray::array;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Fitted {
        weights: Vec<f64>,
        label: String,
    }

    #[test]
    fn test_object_survives_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("obj.bin");
        let obj = Fitted { weights: vec![0.5, -1.0], label: "x".into() };

        save_object(&path, &obj).unwrap();
        let loaded: Fitted = load_object(&path).unwrap();
        assert_eq!(loaded, obj);
    }

    #[test]
    fn test_corrupted_payload_rejected() {
        let obj = Fitted { weights: vec![1.0; 8], label: "y".into() };
        let bytes = encode_object(&obj).unwrap();

        let mut envelope: SerializedObject = bincode::deserialize(&bytes).unwrap();
        envelope.payload[0] ^= 0xFF;
        let tampered = bincode::serialize(&envelope).unwrap();

        let err = decode_object::<Fitted>(&tampered).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Serialization);
    }

    #[test]
    fn test_array_shape_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.bin");
        let arr = array![[1.0, 2.0, 0.0], [3.0, 4.0, 1.0]];

        save_array(&path, &arr).unwrap();
        assert_eq!(load_array(&path).unwrap(), arr);
    }

    #[test]
    fn test_json_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.yaml");
        write_json_report(&path, &serde_json::json!({"validation_status": true})).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["validation_status"], true);
    }
}
