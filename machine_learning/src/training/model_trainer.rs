use log::debug;
use ndarray::{Array2, ArrayView2, Axis};
use rand::Rng;

use crate::{
    MlErr, Result,
    arch::{
        Graph,
        loss::{LossFn, Objective},
    },
    optimization::Optimizer,
};

/// A model trainer. Owns a graph together with its parameters and exposes the three compiled
/// functions driving the training: one optimization step, one evaluation and one prediction,
/// all of them over a single batch.
pub struct ModelTrainer<O, R>
where
    O: Optimizer,
    R: Rng,
{
    graph: Graph,
    params: Vec<f32>,
    grad: Vec<f32>,
    optimizer: O,
    objective: Objective,
    rng: R,
}

impl<O, R> ModelTrainer<O, R>
where
    O: Optimizer,
    R: Rng,
{
    /// Returns a new `ModelTrainer`.
    ///
    /// # Arguments
    /// * `graph` - The graph that will be trained.
    /// * `params` - The initial parameters of the graph.
    /// * `optimizer` - The update rule applied on every training step.
    /// * `objective` - The loss and weight penalties being minimized.
    /// * `rng` - The random number generator used by stochastic layers.
    ///
    /// # Returns
    /// An error if `params` doesn't have the size of the graph.
    pub fn new(
        graph: Graph,
        params: Vec<f32>,
        optimizer: O,
        objective: Objective,
        rng: R,
    ) -> Result<Self> {
        if params.len() != graph.size() {
            return Err(MlErr::SizeMismatch {
                what: "initial parameters",
                got: params.len(),
                expected: graph.size(),
            });
        }

        Ok(Self {
            grad: vec![0.; graph.size()],
            graph,
            params,
            optimizer,
            objective,
            rng,
        })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn params(&self) -> &[f32] {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut [f32] {
        &mut self.params
    }

    /// Makes one optimization step over a batch.
    ///
    /// # Arguments
    /// * `x` - The batch's input, one sample per row.
    /// * `y` - The batch's expected output.
    ///
    /// # Returns
    /// The loss of the batch before the step.
    pub fn train_batch(&mut self, x: ArrayView2<f32>, y: ArrayView2<f32>) -> Result<f32> {
        let Self {
            graph,
            params,
            grad,
            optimizer,
            objective,
            rng,
        } = self;

        let y_pred = graph.forward(params, x, rng, false)?;
        check_targets(&y_pred, y)?;

        let ranges = graph.regularizable();
        let penalty = objective.penalty();
        let loss = objective.loss_fn().loss(y_pred.view(), y) + penalty.value(params, &ranges);

        let d = objective.loss_fn().loss_prime(y_pred.view(), y);
        graph.backward(params, grad, x, d)?;
        penalty.add_grad(params, grad, &ranges);
        optimizer.update_params(params, grad)?;

        Ok(loss)
    }

    /// Evaluates the graph over a batch without training it.
    ///
    /// # Returns
    /// The loss of the batch and the fraction of samples whose highest output matches the
    /// highest expected output.
    pub fn eval_batch(&mut self, x: ArrayView2<f32>, y: ArrayView2<f32>) -> Result<(f32, f32)> {
        let y_pred = self.predict_batch(x)?;
        check_targets(&y_pred, y)?;

        let ranges = self.graph.regularizable();
        let loss = self.objective.loss_fn().loss(y_pred.view(), y)
            + self.objective.penalty().value(&self.params, &ranges);

        let hits = y_pred
            .axis_iter(Axis(0))
            .zip(y.axis_iter(Axis(0)))
            .filter(|(p, t)| argmax(p.iter()) == argmax(t.iter()))
            .count();
        let accuracy = hits as f32 / y.nrows().max(1) as f32;

        Ok((loss, accuracy))
    }

    /// Computes the graph's output for a batch, stochastic layers are disabled.
    pub fn predict_batch(&mut self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let out = self.graph.forward(&self.params, x, &mut self.rng, true)?;
        debug!("predicted a batch of {} samples", out.nrows());
        Ok(out)
    }
}

fn check_targets(y_pred: &Array2<f32>, y: ArrayView2<f32>) -> Result<()> {
    if y_pred.dim() != y.dim() {
        return Err(MlErr::SizeMismatch {
            what: "targets",
            got: y.len(),
            expected: y_pred.len(),
        });
    }

    Ok(())
}

/// The index of the first highest value.
pub fn argmax<'a>(values: impl Iterator<Item = &'a f32>) -> usize {
    values
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(bi, bv), (i, &v)| {
            if v > bv { (i, v) } else { (bi, bv) }
        })
        .0
}
