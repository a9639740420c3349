//! Mutable row views.

use crate::matrix::MatrixError;
use std::ops::{Deref, DerefMut};

/// A mutable view over a single matrix row.
///
/// Every operation is applied element-wise, in place. Operations taking another row require it to have the
/// same length as this one.
#[derive(Debug, PartialEq)]
pub struct RowSliceMut<'a>(&'a mut [f64]);

impl<'a> RowSliceMut<'a> {
    /// Wrap a slice.
    pub fn new(values: &'a mut [f64]) -> Self {
        Self(values)
    }

    fn check_len(&self, other: &[f64]) -> Result<(), MatrixError> {
        if self.0.len() != other.len() {
            return Err(MatrixError::DimensionMismatch { expected: self.0.len(), found: other.len() });
        }
        Ok(())
    }

    /// `row += other`.
    pub fn add_assign(&mut self, other: &[f64]) -> Result<(), MatrixError> {
        self.check_len(other)?;
        for (value, other) in self.0.iter_mut().zip(other) {
            *value += other;
        }
        Ok(())
    }

    /// `row -= other`.
    pub fn sub_assign(&mut self, other: &[f64]) -> Result<(), MatrixError> {
        self.check_len(other)?;
        for (value, other) in self.0.iter_mut().zip(other) {
            *value -= other;
        }
        Ok(())
    }

    /// `row -= factor * other`.
    pub fn sub_scaled(&mut self, other: &[f64], factor: f64) -> Result<(), MatrixError> {
        self.check_len(other)?;
        for (value, other) in self.0.iter_mut().zip(other) {
            *value -= other * factor;
        }
        Ok(())
    }

    /// `row *= factor`.
    pub fn scale(&mut self, factor: f64) {
        for value in self.0.iter_mut() {
            *value *= factor;
        }
    }

    /// `row /= divisor`.
    pub fn divide(&mut self, divisor: f64) {
        for value in self.0.iter_mut() {
            *value /= divisor;
        }
    }
}

impl Deref for RowSliceMut<'_> {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl DerefMut for RowSliceMut<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.0
    }
}
