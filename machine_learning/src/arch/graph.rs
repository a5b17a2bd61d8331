use std::ops::Range;

use ndarray::{Array2, ArrayView2};
use rand::Rng;

use super::layers::Layer;
use crate::{MlErr, Result};

/// A named layer inside a `Graph`, wired to the nodes feeding it.
#[derive(Clone, Debug)]
pub struct Node {
    name: String,
    layer: Layer,
    inputs: Vec<usize>,
    offset: usize,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layer(&self) -> &Layer {
        &self.layer
    }

    /// The indices of the nodes feeding this one, in order.
    pub fn inputs(&self) -> &[usize] {
        &self.inputs
    }

    /// The range this node's parameters take in the flat parameter vector.
    pub fn param_range(&self) -> Range<usize> {
        self.offset..self.offset + self.layer.size()
    }
}

/// A directed acyclic graph of layers sharing a single flat parameter vector.
///
/// Nodes can only be wired to nodes added before them, so insertion order is a topological
/// order and the last node added is the output of the graph. Every `Input` node is fed the
/// data given to `forward`.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    size: usize,

    // Forward metadata
    outputs: Vec<Array2<f32>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new node to the graph.
    ///
    /// # Arguments
    /// * `name` - A unique name for the node.
    /// * `layer` - The layer computed by the node.
    /// * `inputs` - The indices of the nodes feeding this one.
    ///
    /// # Returns
    /// The index of the new node or an error if the wiring doesn't fit the layer.
    pub fn add(&mut self, name: impl Into<String>, layer: Layer, inputs: Vec<usize>) -> Result<usize> {
        let name = name.into();

        if self.index_of(&name).is_some() {
            return Err(MlErr::DuplicateNode(name));
        }

        let len = self.nodes.len();
        if let Some(&node) = inputs.iter().find(|&&i| i >= len) {
            return Err(MlErr::UnknownNode { node, len });
        }

        let expected = layer.input_dims();
        if expected.len() != inputs.len() {
            return Err(MlErr::InvalidArity {
                layer: name,
                got: inputs.len(),
                expected: expected.len(),
            });
        }

        for (&i, &dim) in inputs.iter().zip(&expected) {
            let got = self.nodes[i].layer.output_dim();
            if got != dim {
                return Err(MlErr::SizeMismatch {
                    what: "incoming features",
                    got,
                    expected: dim,
                });
            }
        }

        let offset = self.size;
        self.size += layer.size();
        self.nodes.push(Node {
            name,
            layer,
            inputs,
            offset,
        });

        Ok(len)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.name == name)
    }

    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the amount of parameters of the whole graph.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The amount of features the graph outputs per sample.
    pub fn output_dim(&self) -> Option<usize> {
        self.nodes.last().map(|n| n.layer.output_dim())
    }

    /// The parameter ranges subject to weight penalties.
    pub fn regularizable(&self) -> Vec<Range<usize>> {
        self.nodes
            .iter()
            .filter_map(|n| {
                n.layer
                    .regularizable()
                    .map(|r| n.offset + r.start..n.offset + r.end)
            })
            .collect()
    }

    /// Samples the initial parameters of every node, in order.
    pub fn init_params<R: Rng>(&self, rng: &mut R) -> Result<Vec<f32>> {
        let mut params = Vec::with_capacity(self.size);

        for node in &self.nodes {
            params.extend(node.layer.init_params(rng)?);
        }

        Ok(params)
    }

    /// Makes a forward pass through the whole graph.
    ///
    /// # Arguments
    /// * `params` - The parameters of the graph.
    /// * `x` - The input data, one sample per row.
    /// * `rng` - The random number generator used by stochastic layers.
    /// * `deterministic` - Whether stochastic layers should behave as when evaluating.
    ///
    /// # Returns
    /// The output of the last node.
    pub fn forward<R: Rng>(
        &mut self,
        params: &[f32],
        x: ArrayView2<f32>,
        rng: &mut R,
        deterministic: bool,
    ) -> Result<Array2<f32>> {
        self.check_params(params)?;

        let Self { nodes, outputs, .. } = self;
        outputs.clear();

        for node in nodes.iter_mut() {
            let range = node.param_range();
            let out = {
                let inputs = node_inputs(node, outputs, x);
                node.layer
                    .forward(&params[range], &inputs, rng, deterministic)?
            };
            outputs.push(out);
        }

        outputs.last().cloned().ok_or(MlErr::EmptyGraph)
    }

    /// Backpropagates a delta from the output of the last forward pass down to every node.
    ///
    /// # Arguments
    /// * `params` - The parameters used on the last forward pass.
    /// * `grad` - The gradient buffer, overwritten.
    /// * `x` - The input data of the last forward pass.
    /// * `d` - The delta with respect to the graph's output.
    pub fn backward(
        &self,
        params: &[f32],
        grad: &mut [f32],
        x: ArrayView2<f32>,
        d: Array2<f32>,
    ) -> Result<()> {
        self.check_params(params)?;
        if grad.len() != self.size {
            return Err(MlErr::SizeMismatch {
                what: "graph gradient",
                got: grad.len(),
                expected: self.size,
            });
        }

        if self.outputs.len() != self.nodes.len() {
            return Err(MlErr::EmptyGraph);
        }

        grad.fill(0.);
        let mut deltas: Vec<Option<Array2<f32>>> = vec![None; self.nodes.len()];
        if let Some(last) = deltas.last_mut() {
            *last = Some(d);
        }

        for (k, node) in self.nodes.iter().enumerate().rev() {
            let Some(d) = deltas[k].take() else {
                continue;
            };

            let range = node.param_range();
            let inputs = node_inputs(node, &self.outputs, x);
            let incoming = node.layer.backward(
                &params[range.clone()],
                &mut grad[range],
                &inputs,
                self.outputs[k].view(),
                d.view(),
            )?;

            for (&i, di) in node.inputs.iter().zip(incoming) {
                match &mut deltas[i] {
                    Some(acc) => *acc += &di,
                    slot => *slot = Some(di),
                }
            }
        }

        Ok(())
    }

    fn check_params(&self, params: &[f32]) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(MlErr::EmptyGraph);
        }

        if params.len() != self.size {
            return Err(MlErr::SizeMismatch {
                what: "graph parameters",
                got: params.len(),
                expected: self.size,
            });
        }

        Ok(())
    }
}

fn node_inputs<'a>(
    node: &Node,
    outputs: &'a [Array2<f32>],
    x: ArrayView2<'a, f32>,
) -> Vec<ArrayView2<'a, f32>> {
    match node.layer {
        Layer::Input(_) => vec![x],
        _ => node.inputs.iter().map(|&i| outputs[i].view()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::activations::ActFn;
    use ndarray::array;
    use rand::{SeedableRng, rngs::StdRng};

    fn diamond() -> Graph {
        let mut graph = Graph::new();
        let input = graph.add("input", Layer::input(2), vec![]).unwrap();
        let left = graph
            .add("left", Layer::dense((2, 3), None, 0.), vec![input])
            .unwrap();
        let right = graph
            .add("right", Layer::dense((2, 1), None, 0.), vec![input])
            .unwrap();
        let merge = graph
            .add("merge", Layer::concat(vec![3, 1]), vec![left, right])
            .unwrap();
        graph
            .add("output", Layer::dense((4, 1), Some(ActFn::sigmoid(1.)), 0.), vec![merge])
            .unwrap();
        graph
    }

    #[test]
    fn wiring_is_validated() {
        let mut graph = diamond();

        assert_eq!(
            graph.add("output", Layer::input(1), vec![]),
            Err(MlErr::DuplicateNode("output".into()))
        );
        assert_eq!(
            graph.add("late", Layer::dense((1, 1), None, 0.), vec![9]),
            Err(MlErr::UnknownNode { node: 9, len: 5 })
        );
        assert!(matches!(
            graph.add("wide", Layer::dense((3, 1), None, 0.), vec![0]),
            Err(MlErr::SizeMismatch { .. })
        ));
        assert!(matches!(
            graph.add("alone", Layer::concat(vec![2, 2]), vec![0]),
            Err(MlErr::InvalidArity { .. })
        ));
    }

    #[test]
    fn diamond_gradient_matches_finite_differences() {
        let mut graph = diamond();
        let mut rng = StdRng::seed_from_u64(7);
        let params = graph.init_params(&mut rng).unwrap();
        let x = array![[0.5f32, -1.0], [1.5, 0.25]];

        let loss = |graph: &mut Graph, rng: &mut StdRng, params: &[f32]| {
            graph.forward(params, x.view(), rng, true).unwrap().sum()
        };

        let out = graph.forward(&params, x.view(), &mut rng, true).unwrap();
        let mut grad = vec![0.; graph.size()];
        graph
            .backward(&params, &mut grad, x.view(), Array2::ones(out.raw_dim()))
            .unwrap();

        let h = 1e-2;
        for i in [0, 4, 9, 12, graph.size() - 1] {
            let mut plus = params.clone();
            plus[i] += h;
            let mut minus = params.clone();
            minus[i] -= h;

            let numeric = (loss(&mut graph, &mut rng, &plus) - loss(&mut graph, &mut rng, &minus))
                / (2. * h);
            assert!(
                (numeric - grad[i]).abs() < 1e-2,
                "param {i}: numeric {numeric} vs analytic {}",
                grad[i]
            );
        }
    }
}
