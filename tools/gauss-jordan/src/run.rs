use crate::config::Config;
use anyhow::{Context, Result};
use math_lib::matrix::Matrix;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::time::{Duration, Instant};
use tracing::info;

/// The outcome of inverting a matrix.
pub struct Report {
    /// The seed the matrix was generated from.
    pub seed: u64,

    /// The matrix that was inverted.
    pub matrix: Matrix,

    /// Its inverse.
    pub inverse: Matrix,

    /// The product of the matrix and its inverse.
    pub product: Matrix,

    /// The largest deviation of the product from the identity.
    pub residual: f64,

    /// The time the inversion took.
    pub elapsed: Duration,
}

/// Generate a random matrix and invert it.
pub fn run(config: &Config) -> Result<Report> {
    let seed = config.matrix.seed.unwrap_or_else(|| rand::thread_rng().next_u64());
    let size = config.matrix.size;
    info!("Generating {size}x{size} matrix using seed {seed}");

    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let matrix = Matrix::random(size, size, &mut rng).context("generating matrix")?;

    let start = Instant::now();
    let inverse = inversion::invert(&matrix, &config.inversion).context("inverting matrix")?;
    let elapsed = start.elapsed();
    info!("Inversion took {}ms", elapsed.as_millis());

    let product = (&matrix * &inverse).context("multiplying matrix by its inverse")?;
    let residual = product.max_abs_deviation_from_identity()?;
    Ok(Report { seed, matrix, inverse, product, residual, elapsed })
}
