use std::collections::BTreeMap;

use ndarray::Array2;

use super::Targets;
use crate::{NetErr, Result};

/// Training and validation data.
#[derive(Clone, Debug, PartialEq)]
pub struct Split {
    pub x_train: Array2<f32>,
    pub x_valid: Array2<f32>,
    pub y_train: Targets,
    pub y_valid: Targets,
}

/// The amount of folds the data is split in, `1 / eval_size` rounded half to even.
fn folds(eval_size: f64) -> Result<usize> {
    let k = (1. / eval_size).round_ties_even();

    if k < 2. {
        return Err(NetErr::InvalidConfig(format!(
            "eval_size {eval_size} leaves less than two folds"
        )));
    }

    Ok(k as usize)
}

/// The size of the first of `k` folds over `n` samples, the first folds take the remainder.
fn first_fold(n: usize, k: usize) -> usize {
    n / k + usize::from(n % k > 0)
}

/// Splits sample indices into training and validation, keeping the first fold for validation.
///
/// Without `strata` the first contiguous fold is used. With them every class contributes its
/// own first fold, so classes keep their proportions. Both sets keep the original order.
///
/// # Arguments
/// * `n` - The amount of samples.
/// * `strata` - The class of every sample, if the split should be stratified.
/// * `eval_size` - The fraction held out, `0` keeps everything for training.
///
/// # Returns
/// The training and validation indices.
pub fn split_indices(
    n: usize,
    strata: Option<&[i64]>,
    eval_size: f64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(0.0..1.0).contains(&eval_size) {
        return Err(NetErr::InvalidConfig(format!(
            "eval_size must be in [0, 1), got {eval_size}"
        )));
    }
    if eval_size == 0. {
        return Ok(((0..n).collect(), vec![]));
    }

    let k = folds(eval_size)?;
    if k > n {
        return Err(NetErr::InvalidConfig(format!(
            "can't make {k} folds out of {n} samples"
        )));
    }

    let mut valid = vec![false; n];
    match strata {
        None => valid[..first_fold(n, k)].fill(true),
        Some(labels) => {
            let mut by_class: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
            for (i, &label) in labels.iter().enumerate() {
                by_class.entry(label).or_default().push(i);
            }

            for indices in by_class.values() {
                let take = first_fold(indices.len().max(k), k).min(indices.len());
                for &i in &indices[..take] {
                    valid[i] = true;
                }
            }
        }
    }

    Ok((0..n).partition(|&i| !valid[i]))
}
