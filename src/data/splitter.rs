// ============================================================
// Layer 4 — Stratified Train/Validation/Test Splitter
// ============================================================
// Partitions a cleaned record set into three disjoint subsets
// with a two-stage random split:
//
//   records ──stage 1──▶ train                 (1 - test - val)
//           └─────────▶ holdout ──stage 2──▶ val   (val share)
//                               └─────────▶ test  (test share)
//
// When the target column exists, each stage is stratified: every
// class keeps (up to integer rounding) the share it had in the
// stage's input. Without a target column the stages are plain
// uniform shuffles.
//
// Sizes: the second side of a stage gets ceil(fraction * n) rows
// and the first side the rest. A 1e-9 tolerance is taken off
// before ceil so float noise (0.2 + 0.1 = 0.30000000000000004)
// does not steal an extra row.
//
// One ChaCha8 generator, seeded once, drives both stages, so the
// whole three-way split is reproducible from the seed alone.
//
// A class too small to land on both sides of a stage is an
// error, never a silently empty stratum.
//
// Reference: rand / rand_chacha crate documentation
//            Rust Book §8 (Vectors)

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::domain::error::PipelineError;
use crate::domain::record::{RecordSet, Value};

pub const DEFAULT_TEST_FRACTION: f64 = 0.2;
pub const DEFAULT_VAL_FRACTION:  f64 = 0.1;
pub const DEFAULT_SEED:          u64 = 42;

const ROUNDING_TOLERANCE: f64 = 1e-9;

/// Fractions and seed for a three-way split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitOptions {
    pub test_fraction: f64,
    pub val_fraction:  f64,
    pub seed:          u64,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            test_fraction: DEFAULT_TEST_FRACTION,
            val_fraction:  DEFAULT_VAL_FRACTION,
            seed:          DEFAULT_SEED,
        }
    }
}

impl SplitOptions {
    pub fn validate(&self) -> Result<(), PipelineError> {
        let (t, v) = (self.test_fraction, self.val_fraction);
        if !(t > 0.0) || !(v > 0.0) {
            return Err(PipelineError::InvalidArgument(format!(
                "test_fraction ({t}) and val_fraction ({v}) must both be positive"
            )));
        }
        if !(t + v < 1.0) {
            return Err(PipelineError::InvalidArgument(format!(
                "test_fraction + val_fraction must be below 1.0, got {}",
                t + v
            )));
        }
        Ok(())
    }
}

/// Split `records` into (train, val, test).
///
/// # Errors
/// * `InvalidArgument` — bad fractions, or a stage would leave a side empty
/// * `Stratification`  — a class is too small to reach every split
pub fn split(
    records: &RecordSet,
    target:  &str,
    options: &SplitOptions,
) -> Result<(RecordSet, RecordSet, RecordSet), PipelineError> {
    options.validate()?;

    let mut rng = ChaCha8Rng::seed_from_u64(options.seed);
    let labels  = records.column(target);
    if labels.is_none() {
        tracing::warn!("Target column '{}' not found; splitting without stratification", target);
    }
    let labels = labels.as_deref();

    // ── Stage 1: train vs holdout ─────────────────────────────────────────────
    let holdout = options.test_fraction + options.val_fraction;
    let all: Vec<usize> = (0..records.len()).collect();
    let (train_idx, holdout_idx) = partition(&all, labels, holdout, &mut rng, "train/holdout")?;

    // ── Stage 2: holdout → val vs test ────────────────────────────────────────
    let val_ratio = if holdout > 0.0 { options.val_fraction / holdout } else { 0.5 };
    let (val_idx, test_idx) =
        partition(&holdout_idx, labels, 1.0 - val_ratio, &mut rng, "validation/test")?;

    tracing::debug!(
        "Split {} rows: {} train, {} validation, {} test",
        records.len(),
        train_idx.len(),
        val_idx.len(),
        test_idx.len()
    );

    Ok((
        records.select(&train_idx),
        records.select(&val_idx),
        records.select(&test_idx),
    ))
}

/// One random stage: returns (first, second) where second holds
/// ceil(second_fraction * n) of `indices`.
fn partition(
    indices:         &[usize],
    labels:          Option<&[&Value]>,
    second_fraction: f64,
    rng:             &mut ChaCha8Rng,
    stage:           &str,
) -> Result<(Vec<usize>, Vec<usize>), PipelineError> {
    let n        = indices.len();
    let n_second = ceil_tolerant(second_fraction * n as f64);
    let n_first  = n.saturating_sub(n_second);

    if n_first == 0 || n_second == 0 {
        return Err(PipelineError::InvalidArgument(format!(
            "{stage} stage over {n} rows would leave a side empty ({n_first} / {n_second})"
        )));
    }

    match labels {
        Some(labels) => stratified_partition(indices, labels, n_first, rng, stage),
        None => {
            let mut shuffled = indices.to_vec();
            shuffled.shuffle(rng);
            let first = shuffled.split_off(n_second);
            Ok((first, shuffled))
        }
    }
}

fn stratified_partition(
    indices: &[usize],
    labels:  &[&Value],
    n_first: usize,
    rng:     &mut ChaCha8Rng,
    stage:   &str,
) -> Result<(Vec<usize>, Vec<usize>), PipelineError> {
    // Group row indices by class, classes in first-seen order
    let mut slot_of: HashMap<&Value, usize> = HashMap::new();
    let mut classes: Vec<(&Value, Vec<usize>)> = Vec::new();
    for &i in indices {
        let label = labels[i];
        let slot  = *slot_of.entry(label).or_insert_with(|| {
            classes.push((label, Vec::new()));
            classes.len() - 1
        });
        classes[slot].1.push(i);
    }

    if let Some((label, members)) = classes.iter().find(|(_, m)| m.len() < 2) {
        return Err(PipelineError::Stratification(format!(
            "{stage}: class {} has {} member(s), at least 2 are required",
            describe(label),
            members.len()
        )));
    }

    let counts: Vec<usize> = classes.iter().map(|(_, m)| m.len()).collect();
    let first_share = apportion(&counts, n_first);

    if let Some(((label, _), _)) = classes
        .iter()
        .zip(counts.iter().zip(&first_share))
        .find(|(_, (&count, &share))| share == 0 || share == count)
    {
        return Err(PipelineError::Stratification(format!(
            "{stage}: class {} is too small to appear on both sides",
            describe(label)
        )));
    }

    let n_second = indices.len() - n_first;
    let mut first  = Vec::with_capacity(n_first);
    let mut second = Vec::with_capacity(n_second);
    for ((_, members), &share) in classes.iter_mut().zip(&first_share) {
        members.shuffle(rng);
        first.extend_from_slice(&members[..share]);
        second.extend_from_slice(&members[share..]);
    }

    first.shuffle(rng);
    second.shuffle(rng);
    Ok((first, second))
}

/// Largest-remainder apportionment of `total` slots over `counts`.
/// Ties go to the class seen first; no class gets more than its count.
fn apportion(counts: &[usize], total: usize) -> Vec<usize> {
    let n: usize = counts.iter().sum();
    if n == 0 {
        return vec![0; counts.len()];
    }

    let exact: Vec<f64> = counts
        .iter()
        .map(|&c| total as f64 * c as f64 / n as f64)
        .collect();
    let mut share: Vec<usize> = exact
        .iter()
        .zip(counts)
        .map(|(&e, &c)| (e.floor() as usize).min(c))
        .collect();

    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.total_cmp(&ra)
    });

    let mut left = total.saturating_sub(share.iter().sum());
    while left > 0 {
        let mut progressed = false;
        for &i in &order {
            if left == 0 {
                break;
            }
            if share[i] < counts[i] {
                share[i] += 1;
                left     -= 1;
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }
    share
}

fn ceil_tolerant(x: f64) -> usize {
    (x - ROUNDING_TOLERANCE).ceil().max(0.0) as usize
}

fn describe(label: &Value) -> String {
    match label {
        Value::Missing => "<missing>".to_string(),
        other => format!("'{other}'"),
    }
}
