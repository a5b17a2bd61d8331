#![cfg(test)]

use std::num::NonZeroUsize;

use ndarray::{Array2, ArrayView2, array};
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    arch::{
        Graph,
        activations::ActFn,
        layers::Layer,
        loss::{CategoricalCrossEntropy, Loss, LossFn, Mse, Objective, Penalty},
    },
    dataset::Dataset,
    optimization::{Adam, GradientDescent, Optimizer},
    training::ModelTrainer,
};

fn sequential(dims: &[usize], hidden: ActFn, output: Option<ActFn>) -> Graph {
    let mut graph = Graph::new();
    let mut prev = graph.add("input", Layer::input(dims[0]), vec![]).unwrap();

    for (i, pair) in dims.windows(2).enumerate() {
        let act_fn = if i + 2 == dims.len() {
            output.clone()
        } else {
            Some(hidden.clone())
        };
        let layer = Layer::dense((pair[0], pair[1]), act_fn, 0.);
        prev = graph.add(format!("dense{i}"), layer, vec![prev]).unwrap();
    }

    graph
}

fn train<O: Optimizer>(
    graph: Graph,
    optimizer: O,
    loss: Loss,
    data: &[f32],
    x_size: usize,
    epochs: usize,
) -> (ModelTrainer<O, StdRng>, Array2<f32>, Array2<f32>) {
    let mut rng = StdRng::seed_from_u64(42);
    let params = graph.init_params(&mut rng).unwrap();
    let objective = Objective::new(loss, Penalty::default());
    let mut trainer = ModelTrainer::new(graph, params, optimizer, objective, rng).unwrap();

    let cols = x_size + 1;
    let view = ArrayView2::from_shape((data.len() / cols, cols), data).unwrap();
    let (x, y) = view.split_at(ndarray::Axis(1), x_size);
    let dataset = Dataset::new(x.to_owned(), y.to_owned()).unwrap();
    let batch_size = NonZeroUsize::new(dataset.len()).unwrap();

    for _ in 0..epochs {
        for (x, y) in dataset.batches(batch_size) {
            trainer.train_batch(x, y).unwrap();
        }
    }

    (trainer, x.to_owned(), y.to_owned())
}

#[test]
fn test_ml_and2_gate_convergence() {
    let and2 = [
        0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, //
        1.0, 0.0, 0.0, //
        1.0, 1.0, 1.0, //
    ];

    let graph = sequential(&[2, 1], ActFn::sigmoid(1.), Some(ActFn::sigmoid(1.)));
    let optimizer = GradientDescent::new(5.);
    let (mut trainer, x, y) = train(graph, optimizer, Loss::Mse(Mse), &and2, 2, 3000);

    let y_pred = trainer.predict_batch(x.view()).unwrap();
    let err = Mse.loss(y_pred.view(), y.view());
    assert!(err < 0.05, "err: {err}, y_pred: {y_pred:?}");
}

#[test]
fn test_ml_xor2_gate_convergence() {
    let xor2 = [
        0.0, 0.0, 0.0, //
        0.0, 1.0, 1.0, //
        1.0, 0.0, 1.0, //
        1.0, 1.0, 0.0, //
    ];

    let graph = sequential(&[2, 8, 1], ActFn::tanh(), Some(ActFn::sigmoid(1.)));
    let optimizer = Adam::new(graph.size(), 0.05, 0.9, 0.999, 1e-8);
    let (mut trainer, x, y) = train(graph, optimizer, Loss::Mse(Mse), &xor2, 2, 2000);

    let y_pred = trainer.predict_batch(x.view()).unwrap();
    for (p, t) in y_pred.iter().zip(y.iter()) {
        assert!((p - t).abs() < 0.2, "y_pred: {y_pred:?}");
    }
}

#[test]
fn test_ml_softmax_classifier_separates_classes() {
    let blobs = [
        -2.0, -1.5, 1.0, 0.0, //
        -1.5, -2.0, 1.0, 0.0, //
        -1.0, -1.2, 1.0, 0.0, //
        1.0, 1.2, 0.0, 1.0, //
        1.5, 2.0, 0.0, 1.0, //
        2.0, 1.5, 0.0, 1.0, //
    ];

    let mut graph = Graph::new();
    let input = graph.add("input", Layer::input(2), vec![]).unwrap();
    let hidden = graph
        .add("hidden", Layer::dense((2, 4), Some(ActFn::tanh()), 0.), vec![input])
        .unwrap();
    graph
        .add("output", Layer::dense((4, 2), Some(ActFn::softmax()), 0.), vec![hidden])
        .unwrap();

    let mut rng = StdRng::seed_from_u64(0);
    let params = graph.init_params(&mut rng).unwrap();
    let loss = Loss::CategoricalCrossEntropy(CategoricalCrossEntropy);
    let objective = Objective::new(loss, Penalty::default());
    let mut trainer =
        ModelTrainer::new(graph, params, GradientDescent::new(0.5), objective, rng).unwrap();

    let data = ArrayView2::from_shape((6, 4), &blobs).unwrap();
    let (x, y) = data.split_at(ndarray::Axis(1), 2);

    let (first_loss, _) = trainer.eval_batch(x, y).unwrap();
    for _ in 0..300 {
        trainer.train_batch(x, y).unwrap();
    }
    let (last_loss, accuracy) = trainer.eval_batch(x, y).unwrap();

    assert!(last_loss < first_loss);
    assert_eq!(accuracy, 1.0);
}

#[test]
fn test_ml_l2_penalty_shrinks_weights() {
    let x = array![[1.0f32], [2.0], [3.0]];
    let y = array![[0.0f32], [0.0], [0.0]];

    let graph = sequential(&[1, 1], ActFn::tanh(), None);
    let params = vec![3.0, 0.0];
    let objective = Objective::new(Loss::Mse(Mse), Penalty::new(0.0, 1.0));
    let rng = StdRng::seed_from_u64(0);
    let mut trainer =
        ModelTrainer::new(graph, params, GradientDescent::new(0.05), objective, rng).unwrap();

    let before = trainer.train_batch(x.view(), y.view()).unwrap();
    // mse of 3x over [1, 2, 3] plus 3^2
    assert!((before - (9. * 14. / 3. + 9.)).abs() < 1e-3);
    assert!(trainer.params()[0].abs() < 3.0);
}

#[test]
fn test_ml_params_size_is_checked() {
    let graph = sequential(&[2, 3, 1], ActFn::tanh(), None);
    let objective = Objective::new(Loss::Mse(Mse), Penalty::default());
    let rng = StdRng::seed_from_u64(0);

    assert!(ModelTrainer::new(graph, vec![0.; 3], GradientDescent::new(1.), objective, rng).is_err());
}
