use inversion::{
    invert, DistributedInverter, EliminationMode, InversionConfig, InversionError, InversionMode, SequentialInverter,
};
use math_lib::matrix::Matrix;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rstest::rstest;
use tracing_fixture::{tracing, Tracing};

fn make_matrix(rows: &[&[f64]]) -> Matrix {
    Matrix::from_rows(rows.iter().map(|row| row.to_vec()).collect()).unwrap()
}

fn random_matrix(size: usize, seed: u64) -> Matrix {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    Matrix::random(size, size, &mut rng).unwrap()
}

fn assert_close(actual: &Matrix, expected: &Matrix, tolerance: f64) {
    assert_eq!((actual.rows(), actual.cols()), (expected.rows(), expected.cols()));
    for (left, right) in actual.data().iter().zip(expected.data()) {
        assert!((left - right).abs() <= tolerance, "\n{actual}!=\n{expected}");
    }
}

fn residual(matrix: &Matrix, inverse: &Matrix) -> f64 {
    (matrix * inverse).unwrap().max_abs_deviation_from_identity().unwrap()
}

#[rstest]
#[case::one_rank(1)]
#[case::two_ranks(2)]
#[case::four_ranks(4)]
fn two_by_two(_tracing: &Tracing, #[case] processes: usize) {
    let matrix = make_matrix(&[&[4.0, 3.0], &[6.0, 3.0]]);
    let inverse = DistributedInverter::new(processes).unwrap().invert(&matrix).unwrap();
    assert_close(&inverse, &make_matrix(&[&[-0.5, 0.5], &[1.0, -2.0 / 3.0]]), 1e-12);
}

#[rstest]
#[case::one_rank(1)]
#[case::two_ranks(2)]
fn permutation_is_self_inverse(_tracing: &Tracing, #[case] processes: usize) {
    let matrix = make_matrix(&[&[0.0, 1.0], &[1.0, 0.0]]);
    let inverse = DistributedInverter::new(processes).unwrap().invert(&matrix).unwrap();
    assert_eq!(inverse, matrix);
}

#[rstest]
#[case::one_rank(1)]
#[case::two_ranks(2)]
#[case::three_ranks(3)]
fn singular(_tracing: &Tracing, #[case] processes: usize) {
    let matrix = make_matrix(&[&[1.0, 2.0], &[2.0, 4.0]]);
    let result = DistributedInverter::new(processes).unwrap().invert(&matrix);
    assert_eq!(result, Err(InversionError::Singular { column: 1 }));

    let sequential = SequentialInverter::new(EliminationMode::Serial).invert(&matrix);
    assert_eq!(sequential, result);
}

#[rstest]
fn identity(_tracing: &Tracing) {
    let identity = Matrix::identity(6).unwrap();
    for processes in [1, 2, 3, 6] {
        let inverse = DistributedInverter::new(processes).unwrap().invert(&identity).unwrap();
        assert_eq!(inverse, identity);
    }
}

#[rstest]
fn more_ranks_than_rows(_tracing: &Tracing) {
    let matrix = make_matrix(&[&[2.0, 1.0], &[1.0, 3.0]]);
    let expected = SequentialInverter::new(EliminationMode::Serial).invert(&matrix).unwrap();
    let inverse = DistributedInverter::new(5).unwrap().invert(&matrix).unwrap();
    assert_eq!(inverse, expected);
}

#[rstest]
fn single_element(_tracing: &Tracing) {
    let matrix = make_matrix(&[&[-8.0]]);
    let inverse = DistributedInverter::new(3).unwrap().invert(&matrix).unwrap();
    assert_eq!(inverse, make_matrix(&[&[-0.125]]));
}

#[rstest]
#[case(2)]
#[case(3)]
#[case(5)]
#[case(8)]
fn distributed_matches_sequential(_tracing: &Tracing, #[case] processes: usize) {
    let matrix = random_matrix(24, 99);
    let sequential = SequentialInverter::new(EliminationMode::Serial).invert(&matrix).unwrap();
    let distributed = DistributedInverter::new(processes).unwrap().invert(&matrix).unwrap();
    assert_eq!(distributed, sequential);
    assert!(residual(&matrix, &distributed) < 1e-9);
}

#[rstest]
fn rank_count_does_not_change_result(_tracing: &Tracing) {
    let matrix = random_matrix(17, 5);
    let reference = DistributedInverter::new(1).unwrap().invert(&matrix).unwrap();
    for processes in [2, 4, 7, 17, 20] {
        let inverse = DistributedInverter::new(processes).unwrap().invert(&matrix).unwrap();
        assert_eq!(inverse, reference, "{processes} ranks");
    }
}

#[rstest]
fn pivot_rows_cross_ranks(_tracing: &Tracing) {
    // Every column's pivot lives on a different rank than the diagonal row.
    let matrix = make_matrix(&[
        &[0.0, 0.0, 1.0, 0.0],
        &[5.0, 0.0, 0.0, 1.0],
        &[0.0, 7.0, 0.0, 0.0],
        &[1.0, 0.0, 3.0, 0.0],
    ]);
    let sequential = SequentialInverter::new(EliminationMode::Serial).invert(&matrix).unwrap();
    for processes in [2, 3] {
        let inverse = DistributedInverter::new(processes).unwrap().invert(&matrix).unwrap();
        assert_eq!(inverse, sequential);
    }
    assert!(residual(&matrix, &sequential) < 1e-12);
}

#[rstest]
fn not_square(_tracing: &Tracing) {
    let matrix = make_matrix(&[&[1.0, 2.0, 3.0]]);
    let result = DistributedInverter::new(2).unwrap().invert(&matrix);
    assert_eq!(result, Err(InversionError::DimensionMismatch { rows: 1, cols: 3 }));
}

#[rstest]
fn configured_inversion(_tracing: &Tracing) {
    let matrix = random_matrix(12, 3);
    let sequential = InversionConfig::default();
    let parallel = InversionConfig { elimination: EliminationMode::Parallel, ..Default::default() };
    let distributed = InversionConfig { mode: InversionMode::Distributed, process_count: 3, ..Default::default() };

    let expected = invert(&matrix, &sequential).unwrap();
    assert_eq!(invert(&matrix, &parallel).unwrap(), expected);
    assert_eq!(invert(&matrix, &distributed).unwrap(), expected);
}

#[rstest]
fn invalid_config(_tracing: &Tracing) {
    let matrix = Matrix::identity(2).unwrap();
    let config = InversionConfig { mode: InversionMode::Distributed, process_count: 0, ..Default::default() };
    assert!(matches!(invert(&matrix, &config), Err(InversionError::Config(_))));
}
