use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{Error, Result};

/// Serialize a document to its channel byte representation. Struct fields
/// serialize in declaration order, so equal values encode byte-identically
/// across runs.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(value)?)
}

/// Parse channel bytes back into a document. Truncated payloads surface
/// here as `Error::Malformed` rather than as silently shorter data.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| Error::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Article, EnrichedArticle, SimilarTo};

    fn sample() -> EnrichedArticle {
        EnrichedArticle::new(
            Article {
                title: "Grid storage hits a milestone".to_string(),
                summary: "Utility-scale batteries crossed a cost threshold".to_string(),
                category: "energy".to_string(),
                takeaways: vec!["costs fell".to_string(), "deployment doubled".to_string()],
            },
            SimilarTo::no_match("no prior coverage"),
        )
    }

    #[test]
    fn round_trips_a_document() {
        let doc = sample();
        let bytes = encode(&doc).unwrap();
        let back: EnrichedArticle = decode(&bytes).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn repeated_encodes_are_byte_identical() {
        let doc = sample();
        assert_eq!(encode(&doc).unwrap(), encode(&doc).unwrap());
    }

    #[test]
    fn truncated_bytes_fail_to_decode() {
        let bytes = encode(&sample()).unwrap();
        // Every prefix in the 50-90% band the channel can produce must be
        // rejected, not accepted as valid shorter data.
        for percent in [50usize, 60, 70, 80, 90] {
            let keep = bytes.len() * percent / 100;
            let result: Result<EnrichedArticle> = decode(&bytes[..keep]);
            assert!(
                matches!(result, Err(Error::Malformed(_))),
                "prefix of {}% decoded unexpectedly",
                percent
            );
        }
    }

    #[test]
    fn garbage_is_malformed() {
        let result: Result<Article> = decode(b"not json at all");
        assert!(matches!(result, Err(Error::Malformed(_))));
    }
}
