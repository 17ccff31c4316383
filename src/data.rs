//! Contiguous dataset helpers.
//!
//! `Network::train` operates on slices, one instance at a time. `Inputs` and `Dataset`
//! provide validated, row-major storage for feature/target matrices so that a whole
//! epoch can be fed through `Network::fit` without per-step allocations.

use crate::{Error, Result};

/// A collection of input samples (X).
///
/// Stored as a contiguous buffer with row-major layout:
/// - `inputs.len() == len * input_dim`
#[derive(Debug, Clone)]
pub struct Inputs {
    inputs: Vec<f64>,
    len: usize,
    input_dim: usize,
}

impl Inputs {
    /// Build inputs from a flat buffer with shape `(len, input_dim)`.
    pub fn from_flat(inputs: Vec<f64>, input_dim: usize) -> Result<Self> {
        if input_dim == 0 {
            return Err(Error::InvalidData("input_dim must be > 0".to_owned()));
        }
        if !inputs.len().is_multiple_of(input_dim) {
            return Err(Error::InvalidData(format!(
                "inputs length {} is not divisible by input_dim {}",
                inputs.len(),
                input_dim
            )));
        }

        check_finite("inputs", &inputs)?;

        let len = inputs.len() / input_dim;
        Ok(Self {
            inputs,
            len,
            input_dim,
        })
    }

    /// Build inputs from per-sample rows.
    ///
    /// This is a convenience constructor (it copies into contiguous storage).
    pub fn from_rows(inputs: &[Vec<f64>]) -> Result<Self> {
        let input_dim = inputs.first().map_or(0, Vec::len);
        Self::from_flat(flatten("input", inputs, input_dim)?, input_dim)
    }

    #[inline]
    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    /// Returns true if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    /// Returns the per-sample input dimension.
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    #[inline]
    /// Returns the `idx`-th input row (shape: `(input_dim,)`).
    ///
    /// Panics if `idx >= len`.
    pub fn input(&self, idx: usize) -> &[f64] {
        let start = idx * self.input_dim;
        &self.inputs[start..start + self.input_dim]
    }
}

/// A supervised dataset: inputs (X) and targets (Y).
///
/// Stored as contiguous buffers with row-major layout:
/// - `inputs.len() == len * input_dim`
/// - `targets.len() == len * target_dim`
#[derive(Debug, Clone)]
pub struct Dataset {
    inputs: Inputs,
    targets: Vec<f64>,
    target_dim: usize,
}

impl Dataset {
    /// Build a dataset from flat buffers.
    ///
    /// `inputs` is `(len, input_dim)` and `targets` is `(len, target_dim)`.
    pub fn from_flat(
        inputs: Vec<f64>,
        targets: Vec<f64>,
        input_dim: usize,
        target_dim: usize,
    ) -> Result<Self> {
        let inputs = Inputs::from_flat(inputs, input_dim)?;
        if target_dim == 0 {
            return Err(Error::InvalidData("target_dim must be > 0".to_owned()));
        }

        if targets.len() != inputs.len() * target_dim {
            return Err(Error::InvalidData(format!(
                "targets length {} does not match len * target_dim ({} * {})",
                targets.len(),
                inputs.len(),
                target_dim
            )));
        }
        check_finite("targets", &targets)?;

        Ok(Self {
            inputs,
            targets,
            target_dim,
        })
    }

    /// Build a dataset from per-sample rows.
    ///
    /// This is a convenience constructor (it copies into contiguous storage).
    pub fn from_rows(inputs: &[Vec<f64>], targets: &[Vec<f64>]) -> Result<Self> {
        if inputs.len() != targets.len() {
            return Err(Error::InvalidData(format!(
                "inputs/targets length mismatch: {} vs {}",
                inputs.len(),
                targets.len()
            )));
        }

        let input_dim = inputs.first().map_or(0, Vec::len);
        let target_dim = targets.first().map_or(0, Vec::len);
        Self::from_flat(
            flatten("input", inputs, input_dim)?,
            flatten("target", targets, target_dim)?,
            input_dim,
            target_dim,
        )
    }

    /// Iterate over `(input, target)` pairs in dataset order.
    pub fn iter(&self) -> impl Iterator<Item = (&[f64], &[f64])> + '_ {
        (0..self.len()).map(move |idx| (self.input(idx), self.target(idx)))
    }

    #[inline]
    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    #[inline]
    /// Returns true if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    #[inline]
    /// Returns the per-sample input dimension.
    pub fn input_dim(&self) -> usize {
        self.inputs.input_dim()
    }

    #[inline]
    /// Returns the per-sample target dimension.
    pub fn target_dim(&self) -> usize {
        self.target_dim
    }

    #[inline]
    /// Returns a view of the inputs (X).
    pub fn inputs(&self) -> &Inputs {
        &self.inputs
    }

    #[inline]
    /// Returns the `idx`-th input row (shape: `(input_dim,)`).
    ///
    /// Panics if `idx >= len`.
    pub fn input(&self, idx: usize) -> &[f64] {
        self.inputs.input(idx)
    }

    #[inline]
    /// Returns the `idx`-th target row (shape: `(target_dim,)`).
    ///
    /// Panics if `idx >= len`.
    pub fn target(&self, idx: usize) -> &[f64] {
        let start = idx * self.target_dim;
        &self.targets[start..start + self.target_dim]
    }
}

/// Copy equally sized rows into one contiguous buffer.
fn flatten(what: &str, rows: &[Vec<f64>], dim: usize) -> Result<Vec<f64>> {
    if rows.is_empty() {
        return Err(Error::InvalidData(format!("{what} rows must not be empty")));
    }

    let mut flat = Vec::with_capacity(rows.len() * dim);
    for (i, row) in rows.iter().enumerate() {
        if row.len() != dim {
            return Err(Error::InvalidData(format!(
                "{what} row {i} has len {}, expected {dim}",
                row.len()
            )));
        }
        flat.extend_from_slice(row);
    }
    Ok(flat)
}

fn check_finite(what: &str, values: &[f64]) -> Result<()> {
    if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
        return Err(Error::InvalidData(format!(
            "{what} must contain only finite values, found {} at {pos}",
            values[pos]
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_from_flat_validates_shapes() {
        let ok = Dataset::from_flat(vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 1.0], 2, 1).unwrap();
        assert_eq!(ok.len(), 2);
        assert_eq!(ok.input(1), &[2.0, 3.0]);
        assert_eq!(ok.target(1), &[1.0]);

        let err = Dataset::from_flat(vec![0.0, 1.0, 2.0], vec![0.0], 2, 1).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));

        let err = Dataset::from_flat(vec![0.0, 1.0], vec![0.0, 1.0], 2, 1).unwrap_err();
        assert!(format!("{err}").contains("targets length"));
    }

    #[test]
    fn dataset_from_rows_rejects_ragged_rows() {
        let xs = vec![vec![0.0, 1.0], vec![2.0]];
        let ys = vec![vec![0.0], vec![1.0]];
        assert!(Dataset::from_rows(&xs, &ys).is_err());

        let xs = vec![vec![0.0, 1.0], vec![2.0, 3.0]];
        let ys = vec![vec![0.0], vec![1.0, 0.0]];
        assert!(Dataset::from_rows(&xs, &ys).is_err());

        let ys = vec![vec![0.0]];
        assert!(Dataset::from_rows(&xs, &ys).is_err());
    }

    #[test]
    fn inputs_from_rows_is_row_major() {
        let inputs = Inputs::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs.input_dim(), 3);
        assert_eq!(inputs.input(0), &[1.0, 2.0, 3.0]);
        assert_eq!(inputs.input(1), &[4.0, 5.0, 6.0]);

        assert!(Inputs::from_flat(vec![1.0; 5], 2).is_err());
        assert!(Inputs::from_rows(&[]).is_err());
    }

    #[test]
    fn rejects_non_finite_values() {
        let err = Inputs::from_flat(vec![1.0, f64::NAN], 1).unwrap_err();
        assert!(format!("{err}").contains("finite"));

        let xs = vec![vec![0.0], vec![1.0]];
        let ys = vec![vec![0.0], vec![f64::INFINITY]];
        assert!(matches!(Dataset::from_rows(&xs, &ys), Err(Error::InvalidData(_))));
    }

    #[test]
    fn iter_pairs_rows() {
        let data = Dataset::from_rows(&[vec![1.0], vec![2.0]], &[vec![10.0], vec![20.0]]).unwrap();
        let pairs: Vec<_> = data.iter().collect();
        assert_eq!(pairs, vec![(&[1.0][..], &[10.0][..]), (&[2.0][..], &[20.0][..])]);
    }
}
