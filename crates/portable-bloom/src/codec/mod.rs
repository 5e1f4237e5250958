//! # Envelope Codec
//!
//! Versioned, self-describing JSON envelope for a Bloom filter:
//!
//! ```text
//! {
//!   "v":    "1.0",
//!   "n":    <ideal element count>,
//!   "p":    <error rate>,
//!   "zlib": <payload compressed?>,
//!   "data": "<base64 of (optionally zlib-compressed) raw bit-store bytes>",
//!   "hash": "<sha256 hex of the uncompressed raw bytes>",
//!   "gen":  "MURMUR" | "MERSENNE"
//! }
//! ```
//!
//! Raw bytes are the 64-bit storage words, big-endian, concatenated.
//! Decoding either reproduces the filter exactly or fails; there is no
//! partial reconstruction.

pub mod compression;
pub mod integrity;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::{BitStore, BloomFilter, FilterParameters, ProbeGenerator};
use crate::error::FilterError;

/// Envelope format version produced and accepted by this crate
pub const VERSION: &str = "1.0";

/// Serialized form of a Bloom filter
///
/// Deriving `Deserialize` accepts the same fields as [`Envelope::from_json`]
/// but does not check the version first; [`decode`] still rejects foreign
/// versions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "v")]
    pub version: String,
    #[serde(rename = "n")]
    pub ideal_element_count: u64,
    #[serde(rename = "p")]
    pub error_rate: f64,
    #[serde(rename = "zlib", default)]
    pub compressed: bool,
    pub data: String,
    pub hash: String,
    #[serde(rename = "gen")]
    pub generator: String,
}

impl Envelope {
    /// Render as compact JSON text
    pub fn to_json(&self) -> Result<String, FilterError> {
        serde_json::to_string(self).map_err(|e| FilterError::Serialization(e.to_string()))
    }

    /// Parse JSON text, checking the version tag before any other field
    ///
    /// `zlib` is optional and defaults to `false`; all other fields are
    /// required.
    pub fn from_json(json: &str) -> Result<Self, FilterError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| FilterError::MalformedEnvelope(format!("not valid JSON: {e}")))?;
        let object = value.as_object().ok_or_else(|| {
            FilterError::MalformedEnvelope("envelope must be a JSON object".to_string())
        })?;

        let version = string_field(object, "v")?;
        check_version(&version)?;

        let compressed = match object.get("zlib") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(flag)) => *flag,
            Some(_) => return Err(wrong_type("zlib", "a boolean")),
        };

        Ok(Self {
            version,
            ideal_element_count: element_count_field(object)?,
            error_rate: required(object, "p")?
                .as_f64()
                .ok_or_else(|| wrong_type("p", "a number"))?,
            compressed,
            data: string_field(object, "data")?,
            hash: string_field(object, "hash")?,
            generator: string_field(object, "gen")?,
        })
    }
}

fn required<'a>(object: &'a Map<String, Value>, name: &str) -> Result<&'a Value, FilterError> {
    match object.get(name) {
        None | Some(Value::Null) => Err(FilterError::MalformedEnvelope(format!(
            "missing required field \"{name}\""
        ))),
        Some(value) => Ok(value),
    }
}

fn string_field(object: &Map<String, Value>, name: &str) -> Result<String, FilterError> {
    required(object, name)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| wrong_type(name, "a string"))
}

fn element_count_field(object: &Map<String, Value>) -> Result<u64, FilterError> {
    let value = required(object, "n")?;
    if let Some(count) = value.as_u64() {
        Ok(count)
    } else if value.is_i64() {
        Err(FilterError::InvalidParameter(
            "ideal element count must be > 0".to_string(),
        ))
    } else {
        Err(wrong_type("n", "an integer"))
    }
}

fn wrong_type(name: &str, expected: &str) -> FilterError {
    FilterError::MalformedEnvelope(format!("field \"{name}\" must be {expected}"))
}

fn check_version(version: &str) -> Result<(), FilterError> {
    if version == VERSION {
        Ok(())
    } else {
        Err(FilterError::VersionMismatch {
            expected: VERSION.to_string(),
            found: version.to_string(),
        })
    }
}

/// Serialize a filter into an envelope
///
/// The digest always covers the uncompressed bytes, so compressed and
/// uncompressed envelopes of the same filter carry the same `hash`.
pub fn encode(filter: &BloomFilter, compressed: bool) -> Result<Envelope, FilterError> {
    let raw = filter.to_bytes();
    let hash = integrity::sha256_hex(&raw);
    let compressor = compression::for_flag(compressed);
    let payload = compressor.compress(&raw)?;

    debug!(
        generator = %filter.generator(),
        raw_bytes = raw.len(),
        payload_bytes = payload.len(),
        compressed = compressor.is_enabled(),
        checksum = %integrity::crc32_hex(&raw),
        "Encoded bloom filter envelope"
    );

    Ok(Envelope {
        version: VERSION.to_string(),
        ideal_element_count: filter.ideal_element_count(),
        error_rate: filter.error_rate(),
        compressed,
        data: STANDARD.encode(payload),
        hash,
        generator: filter.generator().name().to_string(),
    })
}

/// Reconstruct a filter from an envelope
///
/// Checks, in order: version, parameters, payload decoding, digest,
/// generator name, and bit-store length. A compressed payload is never
/// inflated past the byte length the parameters allow.
///
/// The digest covers the inflated bytes, so an edit to a compressed payload
/// that still inflates to the same bytes (deflate padding bits, for
/// instance) decodes to the identical filter. Any edit that changes the
/// filter is rejected.
pub fn decode(envelope: &Envelope) -> Result<BloomFilter, FilterError> {
    check_version(&envelope.version)?;
    let params = FilterParameters::derive(envelope.ideal_element_count, envelope.error_rate)?;

    let payload = STANDARD
        .decode(&envelope.data)
        .map_err(|e| FilterError::IntegrityViolation {
            reason: format!("data is not valid base64: {e}"),
        })?;
    let compressor = compression::for_flag(envelope.compressed);
    let raw = compressor.decompress(&payload, params.num_bytes())?;

    debug!(
        payload_bytes = payload.len(),
        raw_bytes = raw.len(),
        compressed = compressor.is_enabled(),
        checksum = %integrity::crc32_hex(&raw),
        "Decoding bloom filter envelope"
    );

    integrity::verify_digest(&raw, &envelope.hash)?;

    let generator = ProbeGenerator::from_name(&envelope.generator)?;
    let bits = BitStore::from_bytes(&raw, params.num_bits)?;

    Ok(BloomFilter::from_parts(params, bits, generator))
}

impl BloomFilter {
    /// Serialize into an envelope
    pub fn to_envelope(&self, compressed: bool) -> Result<Envelope, FilterError> {
        encode(self, compressed)
    }

    /// Reconstruct from an envelope
    pub fn from_envelope(envelope: &Envelope) -> Result<Self, FilterError> {
        decode(envelope)
    }

    /// Serialize to envelope JSON text
    pub fn to_json(&self, compressed: bool) -> Result<String, FilterError> {
        encode(self, compressed)?.to_json()
    }

    /// Serialize to envelope JSON text with a zlib-compressed payload
    pub fn to_compressed_json(&self) -> Result<String, FilterError> {
        self.to_json(true)
    }

    /// Reconstruct from envelope JSON text
    pub fn from_json(json: &str) -> Result<Self, FilterError> {
        decode(&Envelope::from_json(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated(generator: ProbeGenerator) -> BloomFilter {
        let mut filter = BloomFilter::with_generator(1000, 0.01, generator).unwrap();
        for key in ["element_1", "element_2", "element_3"] {
            filter.add(key);
        }
        filter
    }

    #[test]
    fn test_encode_fills_envelope() {
        let filter = populated(ProbeGenerator::Mersenne);
        let envelope = encode(&filter, false).unwrap();

        assert_eq!(envelope.version, "1.0");
        assert_eq!(envelope.ideal_element_count, 1000);
        assert_eq!(envelope.error_rate, 0.01);
        assert!(!envelope.compressed);
        assert_eq!(envelope.generator, "MERSENNE");
        assert_eq!(envelope.hash, integrity::sha256_hex(&filter.to_bytes()));
        assert_eq!(STANDARD.decode(&envelope.data).unwrap(), filter.to_bytes());
    }

    #[test]
    fn test_hash_covers_uncompressed_bytes() {
        let filter = populated(ProbeGenerator::Murmur);
        let plain = encode(&filter, false).unwrap();
        let packed = encode(&filter, true).unwrap();

        assert_eq!(plain.hash, packed.hash);
        assert_ne!(plain.data, packed.data);
    }

    #[test]
    fn test_roundtrip_both_modes() {
        for generator in ProbeGenerator::ALL {
            let filter = populated(generator);
            for compressed in [false, true] {
                let restored = decode(&encode(&filter, compressed).unwrap()).unwrap();
                assert_eq!(restored.to_bytes(), filter.to_bytes());
                assert_eq!(restored.generator(), generator);
                assert!(restored.might_contain("element_2"));
            }
        }
    }

    #[test]
    fn test_json_field_names() {
        let json = populated(ProbeGenerator::Murmur).to_json(true).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["v"], "1.0");
        assert_eq!(value["n"], 1000);
        assert_eq!(value["p"], 0.01);
        assert_eq!(value["zlib"], true);
        assert_eq!(value["gen"], "MURMUR");
        assert!(value["data"].is_string());
        assert_eq!(value["hash"].as_str().unwrap().len(), 64);
    }

    #[test]
    fn test_json_roundtrip() {
        let filter = populated(ProbeGenerator::Mersenne);
        let restored = BloomFilter::from_json(&filter.to_compressed_json().unwrap()).unwrap();
        assert_eq!(restored, filter);
    }

    #[test]
    fn test_version_checked_before_other_fields() {
        let result = Envelope::from_json(r#"{"v": "2.0"}"#);
        assert_eq!(
            result,
            Err(FilterError::VersionMismatch {
                expected: "1.0".to_string(),
                found: "2.0".to_string(),
            })
        );
    }

    #[test]
    fn test_missing_fields_are_malformed() {
        let json = populated(ProbeGenerator::Murmur).to_json(false).unwrap();
        for field in ["v", "n", "p", "data", "hash", "gen"] {
            let mut value: Value = serde_json::from_str(&json).unwrap();
            value.as_object_mut().unwrap().remove(field);

            let result = BloomFilter::from_json(&value.to_string());
            assert!(
                matches!(result, Err(FilterError::MalformedEnvelope(_))),
                "missing {field} should be malformed, got {result:?}"
            );
        }
    }

    #[test]
    fn test_zlib_flag_defaults_to_false() {
        let filter = populated(ProbeGenerator::Murmur);
        let mut value: Value = serde_json::from_str(&filter.to_json(false).unwrap()).unwrap();
        value.as_object_mut().unwrap().remove("zlib");

        let restored = BloomFilter::from_json(&value.to_string()).unwrap();
        assert_eq!(restored, filter);
    }

    #[test]
    fn test_wrong_field_types_are_malformed() {
        let json = r#"{"v":"1.0","n":"many","p":0.01,"data":"","hash":"","gen":"MURMUR"}"#;
        assert!(matches!(
            Envelope::from_json(json),
            Err(FilterError::MalformedEnvelope(_))
        ));
        assert!(matches!(
            Envelope::from_json("[1, 2, 3]"),
            Err(FilterError::MalformedEnvelope(_))
        ));
        assert!(matches!(
            Envelope::from_json("{not json"),
            Err(FilterError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn test_negative_element_count_is_invalid_parameter() {
        let json = r#"{"v":"1.0","n":-5,"p":0.01,"data":"","hash":"","gen":"MURMUR"}"#;
        assert!(matches!(
            Envelope::from_json(json),
            Err(FilterError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_unknown_generator_rejected() {
        let mut envelope = encode(&populated(ProbeGenerator::Murmur), false).unwrap();
        envelope.generator = "FNV".to_string();
        assert_eq!(
            decode(&envelope),
            Err(FilterError::UnknownGenerator("FNV".to_string()))
        );
    }

    #[test]
    fn test_size_mismatch_detected() {
        let filter = populated(ProbeGenerator::Murmur);
        let mut envelope = encode(&filter, false).unwrap();
        // Same payload, different sizing
        envelope.ideal_element_count = 2000;

        assert!(matches!(
            decode(&envelope),
            Err(FilterError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_digest_mismatch_detected() {
        let mut envelope = encode(&populated(ProbeGenerator::Murmur), true).unwrap();
        envelope.hash = integrity::sha256_hex(b"something else");
        assert!(matches!(
            decode(&envelope),
            Err(FilterError::IntegrityViolation { .. })
        ));
    }

    #[test]
    fn test_invalid_base64_is_integrity_violation() {
        let mut envelope = encode(&populated(ProbeGenerator::Murmur), false).unwrap();
        envelope.data = "!!!not base64!!!".to_string();
        assert!(matches!(
            decode(&envelope),
            Err(FilterError::IntegrityViolation { .. })
        ));
    }

    #[test]
    fn test_zlib_bomb_is_not_inflated_past_declared_size() {
        use super::compression::PayloadCompressor;

        let filter = BloomFilter::new(100, 0.01).unwrap();
        let mut envelope = encode(&filter, true).unwrap();
        let bomb = compression::ZlibCompressor::default()
            .compress(&vec![0u8; 16 << 20])
            .unwrap();
        envelope.data = STANDARD.encode(&bomb);

        assert_eq!(
            decode(&envelope),
            Err(FilterError::SizeMismatch {
                expected: 120,
                actual: 121,
            })
        );
    }

    #[test]
    fn test_trailing_bytes_after_zlib_stream_rejected() {
        let filter = populated(ProbeGenerator::Murmur);
        let mut envelope = encode(&filter, true).unwrap();
        let mut payload = STANDARD.decode(&envelope.data).unwrap();
        payload.push(0);
        envelope.data = STANDARD.encode(&payload);

        assert!(matches!(
            decode(&envelope),
            Err(FilterError::IntegrityViolation { .. })
        ));
    }

    #[test]
    fn test_derived_deserialize_defaults_zlib_flag() {
        let filter = populated(ProbeGenerator::Mersenne);
        let mut value: Value = serde_json::from_str(&filter.to_json(false).unwrap()).unwrap();
        value.as_object_mut().unwrap().remove("zlib");

        let envelope: Envelope = serde_json::from_value(value).unwrap();
        assert!(!envelope.compressed);
        assert_eq!(decode(&envelope).unwrap(), filter);
    }

    #[test]
    fn test_decode_rejects_foreign_version() {
        let mut envelope = encode(&populated(ProbeGenerator::Murmur), false).unwrap();
        envelope.version = "0.9".to_string();
        assert!(matches!(
            decode(&envelope),
            Err(FilterError::VersionMismatch { .. })
        ));
    }
}
