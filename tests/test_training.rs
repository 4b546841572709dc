//! Integration test: k-fold training of the linear regressor

use kolosal_house_prices::training::{
    get_k_fold_data, k_fold, log_rmse, train, train_and_pred, LinearRegressor, TrainingConfig,
};
use kolosal_house_prices::KolosalError;
use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// `n` rows of 3 features in [-1, 1] with a positive linear target plus noise
fn synthetic(n: usize, seed: u64) -> (Array2<f64>, Array1<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let x = Array2::from_shape_fn((n, 3), |_| rng.gen_range(-1.0..1.0));
    let y = Array1::from_iter(x.rows().into_iter().map(|row| {
        10.0 + 2.0 * row[0] - 1.0 * row[1] + 0.5 * row[2] + rng.gen_range(-0.5..0.5)
    }));
    (x, y)
}

#[test]
fn test_fold_two_of_five_on_100_rows() {
    let x = Array2::from_shape_fn((100, 4), |(r, c)| (r * 4 + c) as f64);
    let y = Array1::from_iter((0..100).map(|r| r as f64));

    let fold = get_k_fold_data(5, 2, &x, &y).unwrap();

    assert_eq!(fold.x_valid.nrows(), 20);
    assert_eq!(fold.x_train.nrows(), 80);
    assert_eq!(fold.y_valid.to_vec(), (40..60).map(|r| r as f64).collect::<Vec<_>>());
    let expected_train: Vec<f64> = (0..40).chain(60..100).map(|r| r as f64).collect();
    assert_eq!(fold.y_train.to_vec(), expected_train);
    assert_eq!(fold.x_valid.row(0).to_vec(), vec![160.0, 161.0, 162.0, 163.0]);
}

#[test]
fn test_folds_cover_prefix_disjointly() {
    let x = Array2::from_shape_fn((23, 1), |(r, _)| r as f64);
    let y = Array1::from_iter((0..23).map(|r| r as f64));

    let mut seen = vec![0usize; 23];
    for i in 0..4 {
        let fold = get_k_fold_data(4, i, &x, &y).unwrap();
        assert_eq!(fold.y_valid.len() + fold.y_train.len(), 20);
        for v in fold.y_valid.iter() {
            seen[*v as usize] += 1;
        }
    }
    assert!(seen[..20].iter().all(|c| *c == 1));
    assert!(seen[20..].iter().all(|c| *c == 0));
}

#[test]
fn test_invalid_fold_arguments() {
    let (x, y) = synthetic(10, 0);
    for (k, i) in [(0, 0), (1, 0), (3, 3)] {
        assert!(matches!(
            get_k_fold_data(k, i, &x, &y),
            Err(KolosalError::InvalidArgument(_))
        ));
    }
    let (small_x, small_y) = synthetic(3, 0);
    assert!(get_k_fold_data(5, 0, &small_x, &small_y).is_err());
}

#[test]
fn test_k_fold_on_synthetic_data() {
    let config = TrainingConfig::new()
        .with_num_epochs(300)
        .with_learning_rate(0.1)
        .with_batch_size(10);

    let mut train_sum = 0.0;
    let mut valid_sum = 0.0;
    for seed in 0..5u64 {
        let (x, y) = synthetic(50, 100 + seed);
        let results = k_fold(5, &x, &y, &config.clone().with_random_state(seed)).unwrap();

        assert_eq!(results.folds.len(), 5);
        assert!(results.mean_train_log_rmse.is_finite() && results.mean_train_log_rmse >= 0.0);
        assert!(results.mean_valid_log_rmse.is_finite() && results.mean_valid_log_rmse >= 0.0);
        for fold in &results.folds {
            assert_eq!(fold.history.n_epochs(), 300);
            assert_eq!(fold.history.valid_log_rmse.len(), 300);
        }

        train_sum += results.mean_train_log_rmse;
        valid_sum += results.mean_valid_log_rmse;
    }

    assert!(train_sum <= valid_sum * 1.1, "train {} valid {}", train_sum, valid_sum);
    // noise is at most 0.5 on targets around 10
    assert!(valid_sum / 5.0 < 0.1);
}

#[test]
fn test_training_lowers_train_error() {
    let (x, y) = synthetic(40, 9);
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let mut model = LinearRegressor::new(3, &mut rng).unwrap();
    let before = log_rmse(&model.predict(&x).unwrap(), &y).unwrap();

    let config = TrainingConfig::new()
        .with_num_epochs(100)
        .with_learning_rate(0.1)
        .with_batch_size(8);
    let history = train(&mut model, &x, &y, None, &config, &mut rng).unwrap();

    assert_eq!(history.n_epochs(), 100);
    assert!(history.final_train().unwrap() < before);
}

#[test]
fn test_train_and_pred_predicts_every_test_row() {
    let (x, y) = synthetic(40, 1);
    let (test_x, test_y) = synthetic(12, 2);
    let config = TrainingConfig::new()
        .with_num_epochs(200)
        .with_learning_rate(0.1)
        .with_batch_size(8)
        .with_random_state(4);

    let (history, predictions) = train_and_pred(&x, &y, &test_x, &config).unwrap();
    assert_eq!(predictions.len(), 12);
    assert!(history.final_train().unwrap() < 0.1);
    assert!(log_rmse(&predictions, &test_y).unwrap() < 0.1);
}

#[test]
fn test_width_mismatch_in_prediction() {
    let (x, y) = synthetic(20, 3);
    let test_x = Array2::zeros((4, 5));
    let config = TrainingConfig::new().with_num_epochs(1).with_random_state(0);
    assert!(matches!(
        train_and_pred(&x, &y, &test_x, &config),
        Err(KolosalError::ShapeError { .. })
    ));
}

#[test]
fn test_model_serializes() {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let model = LinearRegressor::new(3, &mut rng).unwrap();
    let json = serde_json::to_string(&model).unwrap();
    let back: LinearRegressor = serde_json::from_str(&json).unwrap();
    assert_eq!(back.weights, model.weights);
    assert_eq!(back.bias, model.bias);
}
