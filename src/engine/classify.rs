//! File-size bucket classification
//!
//! Thresholds are configuration, not engine knowledge. The engine only
//! asks a classifier which label a byte count falls into and in what
//! order the labels are displayed.

use crate::config::SizeBucket;
use crate::{FacetError, Result};

pub trait FileSizeClassifier: Send + Sync {
    /// Bucket label for a size, or `None` when no bucket applies
    fn classify(&self, bytes: u64) -> Option<&str>;

    /// All labels in display order
    fn labels(&self) -> Vec<&str>;
}

/// Classifier with no buckets; every item lacks a size bucket
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSizeBuckets;

impl FileSizeClassifier for NoSizeBuckets {
    fn classify(&self, _bytes: u64) -> Option<&str> {
        None
    }

    fn labels(&self) -> Vec<&str> {
        Vec::new()
    }
}

/// Ascending upper-bound thresholds; the first bucket whose inclusive
/// `max_bytes` covers the size wins, an open bucket catches the rest.
#[derive(Debug, Clone, Default)]
pub struct ThresholdClassifier {
    buckets: Vec<SizeBucket>,
}

impl ThresholdClassifier {
    pub fn new(buckets: Vec<SizeBucket>) -> Result<Self> {
        validate_buckets(&buckets)?;
        Ok(Self { buckets })
    }

    pub fn buckets(&self) -> &[SizeBucket] {
        &self.buckets
    }
}

impl FileSizeClassifier for ThresholdClassifier {
    fn classify(&self, bytes: u64) -> Option<&str> {
        self.buckets
            .iter()
            .find(|bucket| bucket.max_bytes.map_or(true, |max| bytes <= max))
            .map(|bucket| bucket.label.as_str())
    }

    fn labels(&self) -> Vec<&str> {
        self.buckets.iter().map(|b| b.label.as_str()).collect()
    }
}

/// Labels unique and non-empty, thresholds strictly ascending, at most
/// one open bucket and only in last position.
pub fn validate_buckets(buckets: &[SizeBucket]) -> Result<()> {
    let mut previous_max: Option<u64> = None;

    for (index, bucket) in buckets.iter().enumerate() {
        if bucket.label.trim().is_empty() {
            return Err(FacetError::Config(format!(
                "File size bucket #{} has an empty label",
                index + 1
            )));
        }

        if buckets[..index].iter().any(|b| b.label == bucket.label) {
            return Err(FacetError::Config(format!(
                "Duplicate file size bucket label: {}",
                bucket.label
            )));
        }

        match bucket.max_bytes {
            Some(max) => {
                if previous_max.is_some_and(|prev| max <= prev) {
                    return Err(FacetError::Config(format!(
                        "File size bucket '{}' must have a larger max_bytes than the bucket before it",
                        bucket.label
                    )));
                }
                previous_max = Some(max);
            }
            None if index + 1 != buckets.len() => {
                return Err(FacetError::Config(format!(
                    "Open-ended file size bucket '{}' must be the last bucket",
                    bucket.label
                )));
            }
            None => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bucket(label: &str, max_bytes: Option<u64>) -> SizeBucket {
        SizeBucket {
            label: label.to_string(),
            max_bytes,
        }
    }

    #[test]
    fn test_threshold_classification() {
        let classifier = ThresholdClassifier::new(vec![
            bucket("Tiny", Some(1_000)),
            bucket("Small", Some(10_000)),
            bucket("Large", None),
        ])
        .unwrap();

        assert_eq!(classifier.classify(0), Some("Tiny"));
        assert_eq!(classifier.classify(1_000), Some("Tiny"));
        assert_eq!(classifier.classify(1_001), Some("Small"));
        assert_eq!(classifier.classify(50_000), Some("Large"));
        assert_eq!(classifier.labels(), vec!["Tiny", "Small", "Large"]);
    }

    #[test]
    fn test_sizes_past_last_bound_have_no_bucket() {
        let classifier = ThresholdClassifier::new(vec![bucket("Tiny", Some(10))]).unwrap();
        assert_eq!(classifier.classify(11), None);
    }

    #[test]
    fn test_rejects_unordered_thresholds() {
        let err = ThresholdClassifier::new(vec![
            bucket("Small", Some(10_000)),
            bucket("Tiny", Some(1_000)),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("larger max_bytes"));
    }

    #[test]
    fn test_rejects_open_bucket_before_others() {
        let err =
            ThresholdClassifier::new(vec![bucket("Any", None), bucket("Tiny", Some(1))]).unwrap_err();
        assert!(err.to_string().contains("must be the last bucket"));
    }

    #[test]
    fn test_rejects_duplicate_labels() {
        let err = ThresholdClassifier::new(vec![bucket("A", Some(1)), bucket("A", Some(2))])
            .unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn test_no_buckets() {
        assert_eq!(NoSizeBuckets.classify(42), None);
        assert!(NoSizeBuckets.labels().is_empty());
    }
}
