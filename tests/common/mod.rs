#![allow(dead_code)]

use ndarray::Array2;
use neural_estimator::{NetConfig, Targets, layers::LayerSpec, params::ParamValue};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Four separated blobs around `(±2, ±2)`, 25 samples each, classes interleaved.
pub fn blobs() -> (Array2<f32>, Targets) {
    const CENTERS: [(f32, f32); 4] = [(-2., -2.), (-2., 2.), (2., -2.), (2., 2.)];

    let x = Array2::from_shape_fn((100, 2), |(i, j)| {
        let (cx, cy) = CENTERS[i % 4];
        let jitter = ((i * 13 + j * 7) % 11) as f32 / 10. - 0.5;
        if j == 0 { cx + jitter } else { cy - jitter }
    });
    let y = Targets::from((0..100).map(|i| (i % 4) as i64).collect::<Vec<_>>());

    (x, y)
}

pub fn classifier() -> NetConfig {
    let mut config = NetConfig::new(vec![
        LayerSpec::named("input", "input"),
        LayerSpec::named("hidden", "dense"),
        LayerSpec::named("output", "dense"),
    ])
    .with("input_shape", (ParamValue::None, 2))
    .with("hidden_num_units", 16)
    .with("output_num_units", 4)
    .with("output_nonlinearity", "softmax")
    .with("update_learning_rate", 0.05)
    .with("update_momentum", 0.9);

    config.max_epochs = 50;
    config.batch_size = 10;
    config
}

/// `y = 0.5 x0 - 0.3 x1 + 0.1` over a grid of `[-1, 1]²`.
pub fn linear() -> (Array2<f32>, Targets) {
    let x = Array2::from_shape_fn((100, 2), |(i, j)| {
        let k = if j == 0 { i / 10 } else { i % 10 };
        k as f32 / 4.5 - 1.
    });
    let y = Array2::from_shape_fn((100, 1), |(i, _)| 0.5 * x[[i, 0]] - 0.3 * x[[i, 1]] + 0.1);

    (x, Targets::from(y))
}

pub fn regressor() -> NetConfig {
    let mut config = NetConfig::new(vec![
        LayerSpec::named("input", "input"),
        LayerSpec::named("output", "dense"),
    ])
    .with("input_shape", (ParamValue::None, 2))
    .with("output_num_units", 1)
    .with("output_nonlinearity", ParamValue::None)
    .with("update_learning_rate", 0.05);

    config.regression = true;
    config.max_epochs = 100;
    config.batch_size = 10;
    config
}
