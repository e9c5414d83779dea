//! K-Means segmentation of normalized RFM vectors.

use crate::config::SegmentationConfig;
use crate::error::{ForecastError, Result};
use crate::schema::{RfmVector, Segment, SegmentationReport};
use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_clustering::KMeans;
use linfa_nn::distance::L2Dist;
use log::{debug, info, warn};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeSet;

/// Clusters customers and summarizes each cluster on the normalized features.
pub struct SegmentationEngine {
    config: SegmentationConfig,
}

impl Default for SegmentationEngine {
    fn default() -> Self {
        Self::new(SegmentationConfig::default())
    }
}

impl SegmentationEngine {
    pub fn new(config: SegmentationConfig) -> Self {
        Self { config }
    }

    /// `min(max_segments, customers)`.
    pub fn cluster_count(&self, customers: usize) -> usize {
        self.config.max_segments.min(customers)
    }

    pub fn segment(&self, vectors: &[RfmVector]) -> Result<SegmentationReport> {
        if vectors.is_empty() {
            return Err(ForecastError::InsufficientData(
                "no customers to segment".to_string(),
            ));
        }
        self.config.validate()?;

        let k = self.cluster_count(vectors.len());
        let records = to_records(vectors)?;

        // k-means++ cannot seed more centroids than there are distinct points.
        let distinct = distinct_points(vectors);
        let effective_k = k.min(distinct);
        if effective_k < k {
            warn!(
                "Only {} distinct feature vectors for k={}; clustering with {} centroids",
                distinct, k, effective_k
            );
        }

        let labels = if effective_k == 1 {
            Array1::zeros(vectors.len())
        } else {
            self.fit_labels(&records, effective_k)?
        };

        let segments = summarize_clusters(vectors, &labels, effective_k);
        let inertia = compute_inertia(&records, &labels, &segments);

        info!(
            "Segmented {} customers into {} segments (k={}, inertia={:.4})",
            vectors.len(),
            segments.len(),
            k,
            inertia
        );

        Ok(SegmentationReport {
            segments,
            k,
            customer_count: vectors.len(),
            inertia,
        })
    }

    fn fit_labels(&self, records: &Array2<f64>, n_clusters: usize) -> Result<Array1<usize>> {
        let dataset = DatasetBase::from(records.clone());
        let rng = StdRng::seed_from_u64(self.config.seed);

        let model = KMeans::params_with(n_clusters, rng, L2Dist)
            .max_n_iterations(self.config.max_iterations)
            .tolerance(self.config.tolerance)
            .n_runs(self.config.n_runs)
            .fit(&dataset)
            .map_err(|e| ForecastError::Clustering(e.to_string()))?;

        debug!(
            "K-Means converged with centroids {:?}",
            model.centroids().outer_iter().map(|c| c.to_vec()).collect::<Vec<_>>()
        );

        let labels: Array1<usize> = model.predict(records);
        Ok(labels)
    }
}

fn to_records(vectors: &[RfmVector]) -> Result<Array2<f64>> {
    let flat: Vec<f64> = vectors.iter().flat_map(|v| v.features()).collect();
    Array2::from_shape_vec((vectors.len(), 3), flat)
        .map_err(|e| ForecastError::Clustering(e.to_string()))
}

fn distinct_points(vectors: &[RfmVector]) -> usize {
    vectors
        .iter()
        .map(|v| v.features().map(f64::to_bits))
        .collect::<BTreeSet<_>>()
        .len()
}

/// Empty clusters are dropped and the remaining ones renumbered from 0.
fn summarize_clusters(
    vectors: &[RfmVector],
    labels: &Array1<usize>,
    n_clusters: usize,
) -> Vec<Segment> {
    let mut sums = vec![[0.0f64; 3]; n_clusters];
    let mut sizes = vec![0usize; n_clusters];

    for (vector, &label) in vectors.iter().zip(labels.iter()) {
        if label >= n_clusters {
            continue;
        }
        sizes[label] += 1;
        for (sum, value) in sums[label].iter_mut().zip(vector.features()) {
            *sum += value;
        }
    }

    let empty = sizes.iter().filter(|&&s| s == 0).count();
    if empty > 0 {
        warn!("{} of {} clusters came back empty", empty, n_clusters);
    }

    sizes
        .iter()
        .zip(&sums)
        .filter(|(size, _)| **size > 0)
        .enumerate()
        .map(|(segment_id, (&size, sum))| Segment {
            segment_id,
            size,
            avg_recency: sum[0] / size as f64,
            avg_frequency: sum[1] / size as f64,
            avg_monetary: sum[2] / size as f64,
        })
        .collect()
}

/// Within-cluster sum of squared distances to each segment's mean.
fn compute_inertia(records: &Array2<f64>, labels: &Array1<usize>, segments: &[Segment]) -> f64 {
    // Labels may skip dropped clusters, so map original label order onto segment ids.
    let used: BTreeSet<usize> = labels.iter().copied().collect();
    let centers: Vec<(usize, [f64; 3])> = used
        .into_iter()
        .zip(segments)
        .map(|(label, s)| (label, [s.avg_recency, s.avg_frequency, s.avg_monetary]))
        .collect();

    let mut inertia = 0.0;
    for (row, label) in records.outer_iter().zip(labels.iter()) {
        if let Some((_, center)) = centers.iter().find(|(l, _)| l == label) {
            inertia += row
                .iter()
                .zip(center.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>();
        }
    }
    inertia
}
