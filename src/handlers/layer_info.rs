use log::warn;
use machine_learning::arch::Graph;

use super::{
    TrainingHandler,
    table::{self, Align, Column},
};
use crate::{NeuralNet, Result};

/// Prints the amount of learnable parameters and a table of the layers when training starts
/// for the first time.
#[derive(Clone, Debug, Default)]
pub struct PrintLayerInfo {
    printed: bool,
}

impl PrintLayerInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// The text printed for `graph`.
    pub fn info(graph: &Graph) -> String {
        let mut num = Column::new("#", Align::Right);
        let mut name = Column::new("name", Align::Left);
        let mut size = Column::new("size", Align::Right);

        for (i, node) in graph.nodes().iter().enumerate() {
            num.cells.push(i.to_string());
            name.cells.push(node.name().to_string());
            size.cells.push(node.layer().output_dim().to_string());
        }

        format!(
            "# Neural Network with {} learnable parameters\n\n## Layer information\n\n{}\n",
            graph.size(),
            table::render(&[num, name, size])
        )
    }
}

impl TrainingHandler for PrintLayerInfo {
    fn on_training(&mut self, net: &mut NeuralNet) -> Result<()> {
        if self.printed {
            return Ok(());
        }

        match net.graph() {
            Some(graph) => println!("{}", Self::info(graph)),
            None => warn!("there's no layer information before initializing the network"),
        }

        self.printed = true;
        Ok(())
    }
}
