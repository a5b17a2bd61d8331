mod config;
mod split;
mod targets;

pub use config::{NetConfig, UpdateRule};
pub use split::{Split, split_indices};
pub use targets::Targets;

use std::{
    collections::BTreeMap,
    fmt,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use log::{debug, info, warn};
use machine_learning::{
    arch::{
        Graph,
        loss::{Loss, Objective, Penalty},
    },
    dataset::Dataset,
    optimization::{self as opt, Optimizer},
    training::{ModelTrainer, argmax},
};
use ndarray::{Array1, Array2, ArrayView2, Axis, s};
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    NetErr, Result,
    handlers::{
        Checkpoint, EpochHandler, PrintLayerInfo, PrintLog, Signal, TableLayout, TrainingHandler,
    },
    history::{EpochInfo, History},
    layers::{BuiltGraph, LayerRegistry, build_graph, layer_names},
    params::{Options, Params, merge_routed, route, route_lenient},
    persist::{ParamValues, Snapshot, Tensor, read_safetensors, write_safetensors},
};

type Trainer = ModelTrainer<Box<dyn Optimizer>, StdRng>;

/// A score computed over the validation data after every epoch, given the expected and the
/// predicted outputs.
pub type ScoreFn = Arc<dyn Fn(ArrayView2<f32>, ArrayView2<f32>) -> f64 + Send + Sync>;

#[derive(Clone)]
pub struct CustomScore {
    pub name: String,
    pub func: ScoreFn,
}

/// Where parameters can be loaded from.
pub enum ParamSource<'a> {
    /// A safetensors file written by `save_params_to`.
    Path(&'a Path),
    /// Another network, it must be initialized.
    Net(&'a NeuralNet),
    Values(&'a ParamValues),
}

impl<'a> From<&'a Path> for ParamSource<'a> {
    fn from(path: &'a Path) -> Self {
        Self::Path(path)
    }
}

impl<'a> From<&'a PathBuf> for ParamSource<'a> {
    fn from(path: &'a PathBuf) -> Self {
        Self::Path(path)
    }
}

impl<'a> From<&'a NeuralNet> for ParamSource<'a> {
    fn from(net: &'a NeuralNet) -> Self {
        Self::Net(net)
    }
}

impl<'a> From<&'a ParamValues> for ParamSource<'a> {
    fn from(values: &'a ParamValues) -> Self {
        Self::Values(values)
    }
}

/// The state a network gets once initialized.
struct Compiled {
    trainer: Trainer,
    layers: BTreeMap<String, usize>,
    output: String,
}

type EpochHandlers = Vec<Box<dyn EpochHandler>>;
type TrainingHandlers = Vec<Box<dyn TrainingHandler>>;

/// A neural network estimator: a layer list and keyword parameters that turn into a trained
/// graph through `fit`.
///
/// The network is initialized lazily on the first call that needs it. Initializing routes the
/// keyword parameters, builds the graph, samples its parameters and compiles the update rule
/// and the objective.
pub struct NeuralNet {
    config: NetConfig,
    registry: LayerRegistry,
    custom_score: Option<CustomScore>,

    on_epoch_finished: EpochHandlers,
    on_training_started: TrainingHandlers,
    on_training_finished: TrainingHandlers,
    // Installed on initialization when `verbose` is set, they run before the user's.
    verbose_epoch: EpochHandlers,
    verbose_started: TrainingHandlers,

    compiled: Option<Compiled>,
    history: History,
    classes: Option<Vec<i64>>,
    rng: StdRng,
}

impl NeuralNet {
    pub fn new(config: NetConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);

        Self {
            config,
            registry: LayerRegistry::default(),
            custom_score: None,
            on_epoch_finished: vec![],
            on_training_started: vec![],
            on_training_finished: vec![],
            verbose_epoch: vec![],
            verbose_started: vec![],
            compiled: None,
            history: History::new(),
            classes: None,
            rng,
        }
    }

    /// Uses `registry` to look up layer kinds.
    pub fn with_registry(mut self, registry: LayerRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Computes `func` over the validation data after every epoch, recorded under `name`.
    pub fn with_custom_score<F>(mut self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(ArrayView2<f32>, ArrayView2<f32>) -> f64 + Send + Sync + 'static,
    {
        self.custom_score = Some(CustomScore {
            name: name.into(),
            func: Arc::new(func),
        });
        self
    }

    /// Appends a handler called after every epoch.
    pub fn on_epoch_finished(mut self, handler: impl EpochHandler + 'static) -> Self {
        self.on_epoch_finished.push(Box::new(handler));
        self
    }

    /// Appends a handler called when a training call starts.
    pub fn on_training_started(mut self, handler: impl TrainingHandler + 'static) -> Self {
        self.on_training_started.push(Box::new(handler));
        self
    }

    /// Appends a handler called when a training call finishes, also after an early stop.
    pub fn on_training_finished(mut self, handler: impl TrainingHandler + 'static) -> Self {
        self.on_training_finished.push(Box::new(handler));
        self
    }

    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// The class labels learned by the label encoder, sorted.
    pub fn classes(&self) -> Option<&[i64]> {
        self.classes.as_deref()
    }

    pub fn is_initialized(&self) -> bool {
        self.compiled.is_some()
    }

    pub fn graph(&self) -> Option<&Graph> {
        self.compiled.as_ref().map(|c| c.trainer.graph())
    }

    /// Graph node indices by layer name.
    pub fn layers(&self) -> Option<&BTreeMap<String, usize>> {
        self.compiled.as_ref().map(|c| &c.layers)
    }

    /// The name of the layer whose output is the network's output.
    pub fn output_layer(&self) -> Option<&str> {
        self.compiled.as_ref().map(|c| c.output.as_str())
    }

    /// The flat parameter vector of the whole graph.
    pub fn params(&self) -> Option<&[f32]> {
        self.compiled.as_ref().map(|c| c.trainer.params())
    }

    pub fn table_layout(&self) -> TableLayout {
        TableLayout {
            regression: self.config.regression,
            custom_score: self.custom_score.as_ref().map(|s| s.name.clone()),
        }
    }

    /// Builds the graph and compiles its training functions, does nothing if already done.
    pub fn initialize(&mut self) -> Result<()> {
        if self.compiled.is_some() {
            return Ok(());
        }

        self.config.validate()?;
        self.rng = StdRng::seed_from_u64(self.config.seed);

        let names = layer_names(&self.config.layers);
        let mut scopes: Vec<&str> = names.iter().map(String::as_str).collect();
        scopes.extend(["update", "objective"]);

        let routed = merge_routed(
            route(&self.config.kwargs, &scopes)?,
            route_lenient(&self.config.more_params, &scopes),
        );

        let BuiltGraph {
            graph,
            output,
            layers,
        } = build_graph(&self.config.layers, &routed, &self.registry)?;

        let empty = Params::new();
        let optimizer = self.update_rule(graph.size(), routed.get("update").unwrap_or(&empty))?;
        let objective = self.objective(routed.get("objective").unwrap_or(&empty))?;
        let params = graph.init_params(&mut self.rng)?;

        info!(
            "initialized network with {} layers and {} learnable parameters, output layer {output}",
            graph.len(),
            graph.size()
        );

        let trainer_rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(1));
        let trainer = ModelTrainer::new(graph, params, optimizer, objective, trainer_rng)?;

        if self.config.verbose > 0 {
            self.verbose_epoch = vec![Box::new(PrintLog::new())];
            self.verbose_started = vec![Box::new(PrintLayerInfo::new())];
        } else {
            self.verbose_epoch.clear();
            self.verbose_started.clear();
        }

        self.compiled = Some(Compiled {
            trainer,
            layers,
            output,
        });
        Ok(())
    }

    fn update_rule(&self, len: usize, params: &Params) -> Result<Box<dyn Optimizer>> {
        let mut options = Options::new("update", params);

        let optimizer: Box<dyn Optimizer> = match self.config.update {
            UpdateRule::Sgd => Box::new(opt::GradientDescent::new(
                options.f32_or("learning_rate", 0.01)?,
            )),
            UpdateRule::Momentum => Box::new(opt::GradientDescentWithMomentum::new(
                len,
                options.f32_or("learning_rate", 0.01)?,
                options.f32_or("momentum", 0.9)?,
            )),
            UpdateRule::NesterovMomentum => Box::new(opt::NesterovMomentum::new(
                len,
                options.f32_or("learning_rate", 0.01)?,
                options.f32_or("momentum", 0.9)?,
            )),
            UpdateRule::Adam => Box::new(opt::Adam::new(
                len,
                options.f32_or("learning_rate", 0.001)?,
                options.f32_or("beta1", 0.9)?,
                options.f32_or("beta2", 0.999)?,
                options.f32_or("epsilon", 1e-8)?,
            )),
        };

        options.finish()?;
        debug!("compiled update rule {}", self.config.update.name());
        Ok(optimizer)
    }

    fn objective(&self, params: &Params) -> Result<Objective> {
        let mut options = Options::new("objective", params);

        let default = if self.config.regression {
            "mse"
        } else {
            "categorical_crossentropy"
        };
        let name = options.str_or("loss_function", default)?;
        let loss = Loss::from_name(name).ok_or_else(|| {
            options.invalid("loss_function", format!("unknown loss function {name}"))
        })?;
        let penalty = Penalty::new(options.f32_or("l1", 0.)?, options.f32_or("l2", 0.)?);

        options.finish()?;
        Ok(Objective::new(loss, penalty))
    }

    fn output_dim(&self) -> Result<usize> {
        self.graph()
            .and_then(Graph::output_dim)
            .ok_or(NetErr::NotInitialized)
    }

    /// Turns the targets into the matrix the graph is trained against.
    ///
    /// Class labels are one-hot encoded, either by their position among the sorted labels seen
    /// on the first fit or, without the label encoder, as the index of the output unit.
    fn encode_targets(&mut self, y: &Targets) -> Result<Array2<f32>> {
        let out_dim = self.output_dim()?;

        match (self.config.regression, y) {
            (true, Targets::Values(values)) => {
                if values.ncols() != out_dim {
                    return Err(NetErr::TargetMismatch(format!(
                        "targets have {} columns but the output layer has {out_dim} units",
                        values.ncols()
                    )));
                }
                Ok(values.clone())
            }
            (false, Targets::Classes(labels)) => {
                let indices: Vec<usize> = if self.config.use_label_encoder {
                    let classes = self.classes.get_or_insert_with(|| {
                        let mut classes = labels.to_vec();
                        classes.sort_unstable();
                        classes.dedup();
                        classes
                    });

                    labels
                        .iter()
                        .map(|l| {
                            classes.binary_search(l).map_err(|_| {
                                NetErr::TargetMismatch(format!("unknown class label {l}"))
                            })
                        })
                        .collect::<Result<_>>()?
                } else {
                    labels
                        .iter()
                        .map(|&l| {
                            usize::try_from(l).map_err(|_| {
                                NetErr::TargetMismatch(format!("negative class label {l}"))
                            })
                        })
                        .collect::<Result<_>>()?
                };

                let mut one_hot = Array2::zeros((labels.len(), out_dim));
                for (i, &class) in indices.iter().enumerate() {
                    if class >= out_dim {
                        return Err(NetErr::TargetMismatch(format!(
                            "class {class} doesn't fit an output layer of {out_dim} units"
                        )));
                    }
                    one_hot[[i, class]] = 1.;
                }

                Ok(one_hot)
            }
            (true, Targets::Classes(_)) => Err(NetErr::TargetMismatch(
                "regressors are fitted to values".into(),
            )),
            (false, Targets::Values(_)) => Err(NetErr::TargetMismatch(
                "classifiers are fitted to class labels".into(),
            )),
        }
    }

    fn check_samples(x: ArrayView2<f32>, y: &Targets) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(NetErr::TargetMismatch(format!(
                "{} samples but {} targets",
                x.nrows(),
                y.len()
            )));
        }

        Ok(())
    }

    /// Splits the data into training and validation with the first of `1 / eval_size` folds,
    /// stratified by class for classifiers.
    pub fn train_test_split(
        &self,
        x: ArrayView2<f32>,
        y: &Targets,
        eval_size: f64,
    ) -> Result<Split> {
        Self::check_samples(x, y)?;

        let strata = match y {
            Targets::Classes(labels) if !self.config.regression => Some(labels.to_vec()),
            _ => None,
        };
        let (train, valid) = split_indices(x.nrows(), strata.as_deref(), eval_size)?;

        Ok(Split {
            x_train: x.select(Axis(0), &train),
            x_valid: x.select(Axis(0), &valid),
            y_train: y.select(&train),
            y_valid: y.select(&valid),
        })
    }

    /// Trains for `max_epochs` epochs, or until a handler stops it.
    pub fn fit(&mut self, x: ArrayView2<f32>, y: &Targets) -> Result<&mut Self> {
        self.fit_epochs(x, y, self.config.max_epochs)
    }

    /// Trains for a single epoch.
    pub fn partial_fit(&mut self, x: ArrayView2<f32>, y: &Targets) -> Result<&mut Self> {
        self.fit_epochs(x, y, 1)
    }

    /// Trains for `epochs` epochs, or until a handler stops it.
    ///
    /// The data is split into training and validation as `train_test_split` does with the
    /// configured `eval_size`. Epoch numbering continues from previous calls.
    ///
    /// # Arguments
    /// * `x` - The input data, one sample per row.
    /// * `y` - The targets of every sample.
    /// * `epochs` - The amount of epochs to train.
    pub fn fit_epochs(
        &mut self,
        x: ArrayView2<f32>,
        y: &Targets,
        epochs: usize,
    ) -> Result<&mut Self> {
        Self::check_samples(x, y)?;
        self.initialize()?;

        let targets = self.encode_targets(y)?;
        let strata = match y {
            Targets::Classes(labels) => Some(labels.to_vec()),
            Targets::Values(_) => None,
        };
        let (train, valid) = split_indices(x.nrows(), strata.as_deref(), self.config.eval_size)?;

        let train = Dataset::new(x.select(Axis(0), &train), targets.select(Axis(0), &train))?;
        let valid = Dataset::new(x.select(Axis(0), &valid), targets.select(Axis(0), &valid))?;
        info!(
            "training on {} samples, validating on {}",
            train.len(),
            valid.len()
        );

        self.train_loop(train, valid, epochs)?;
        Ok(self)
    }

    fn train_loop(&mut self, mut train: Dataset, valid: Dataset, epochs: usize) -> Result<()> {
        let batch_size = NonZeroUsize::new(self.config.batch_size)
            .ok_or_else(|| NetErr::InvalidConfig("batch_size must be positive".into()))?;

        self.run_training_handlers(|net| &mut net.verbose_started)?;
        self.run_training_handlers(|net| &mut net.on_training_started)?;

        for _ in 0..epochs {
            let start = Instant::now();
            if self.config.shuffle {
                train.shuffle(&mut self.rng);
            }

            let trainer = &mut self
                .compiled
                .as_mut()
                .ok_or(NetErr::NotInitialized)?
                .trainer;

            let mut train_losses = vec![];
            for (x, y) in train.batches(batch_size) {
                train_losses.push(trainer.train_batch(x, y)?);
            }

            let mut valid_losses = vec![];
            let mut accuracies = vec![];
            let mut scores = vec![];
            for (x, y) in valid.batches(batch_size) {
                let (loss, accuracy) = trainer.eval_batch(x, y)?;
                valid_losses.push(loss);
                accuracies.push(accuracy);

                if let Some(score) = &self.custom_score {
                    let y_pred = trainer.predict_batch(x)?;
                    scores.push((score.func)(y, y_pred.view()));
                }
            }

            let train_loss = mean(train_losses.iter().map(|&l| f64::from(l)));
            let valid_loss = mean(valid_losses.iter().map(|&l| f64::from(l)));
            let (best_train, best_valid) = self.history.best_losses();

            let mut info = EpochInfo::new(self.history.next_epoch(), train_loss, valid_loss);
            info.train_loss_best = train_loss < best_train;
            info.valid_loss_best = valid_loss < best_valid;
            if !self.config.regression {
                info.valid_accuracy = Some(mean(accuracies.iter().map(|&a| f64::from(a))));
            }
            if let Some(score) = &self.custom_score {
                if !scores.is_empty() {
                    info.custom
                        .insert(score.name.clone(), mean(scores.iter().copied()));
                }
            }
            info.dur = start.elapsed().as_secs_f64();

            debug!(
                "epoch {} finished: train loss {train_loss:.6}, valid loss {valid_loss:.6}",
                info.epoch
            );
            self.history.push(info);

            if self.run_epoch_handlers(|net| &mut net.verbose_epoch)? == Signal::Stop
                || self.run_epoch_handlers(|net| &mut net.on_epoch_finished)? == Signal::Stop
            {
                info!("training stopped by a handler");
                break;
            }
        }

        self.run_training_handlers(|net| &mut net.on_training_finished)
    }

    /// Runs a list of epoch handlers in order, stopping at the first one that doesn't continue.
    /// The list is taken out while running so handlers can borrow the network mutably.
    fn run_epoch_handlers(&mut self, list: fn(&mut Self) -> &mut EpochHandlers) -> Result<Signal> {
        let mut handlers = std::mem::take(list(self));

        let mut result = Ok(Signal::Continue);
        for handler in handlers.iter_mut() {
            match handler.on_epoch_finished(self) {
                Ok(Signal::Continue) => {}
                other => {
                    result = other;
                    break;
                }
            }
        }

        let added = std::mem::replace(list(self), handlers);
        list(self).extend(added);
        result
    }

    fn run_training_handlers(&mut self, list: fn(&mut Self) -> &mut TrainingHandlers) -> Result<()> {
        let mut handlers = std::mem::take(list(self));

        let result = handlers
            .iter_mut()
            .try_for_each(|handler| handler.on_training(self));

        let added = std::mem::replace(list(self), handlers);
        list(self).extend(added);
        result
    }

    /// Computes the network's output for every sample, in batches.
    pub fn predict_proba(&mut self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let out_dim = self.output_dim()?;
        let batch_size = self.config.batch_size.max(1);
        let trainer = &mut self
            .compiled
            .as_mut()
            .ok_or(NetErr::NotInitialized)?
            .trainer;

        let mut out = Array2::zeros((x.nrows(), out_dim));
        for (i, batch) in x.axis_chunks_iter(Axis(0), batch_size).enumerate() {
            let start = i * batch_size;
            let pred = trainer.predict_batch(batch)?;
            out.slice_mut(s![start..start + batch.nrows(), ..])
                .assign(&pred);
        }

        Ok(out)
    }

    /// Predicts the class label of every sample, or its values for regressors.
    pub fn predict(&mut self, x: ArrayView2<f32>) -> Result<Targets> {
        let proba = self.predict_proba(x)?;

        if self.config.regression {
            return Ok(Targets::Values(proba));
        }

        let labels: Array1<i64> = proba
            .axis_iter(Axis(0))
            .map(|row| {
                let i = argmax(row.iter());
                match &self.classes {
                    Some(classes) => classes.get(i).copied().unwrap_or(i as i64),
                    None => i as i64,
                }
            })
            .collect();

        Ok(Targets::Classes(labels))
    }

    /// The accuracy of the predictions for classifiers, their mean squared error for regressors.
    pub fn score(&mut self, x: ArrayView2<f32>, y: &Targets) -> Result<f64> {
        Self::check_samples(x, y)?;

        match (self.predict(x)?, y) {
            (Targets::Classes(predicted), Targets::Classes(expected)) => {
                let hits = predicted
                    .iter()
                    .zip(expected)
                    .filter(|(p, e)| p == e)
                    .count();
                Ok(hits as f64 / expected.len().max(1) as f64)
            }
            (Targets::Values(predicted), Targets::Values(expected)) => {
                if predicted.dim() != expected.dim() {
                    return Err(NetErr::TargetMismatch(format!(
                        "targets have shape {:?} but predictions {:?}",
                        expected.dim(),
                        predicted.dim()
                    )));
                }
                Ok(mean(
                    predicted
                        .iter()
                        .zip(expected)
                        .map(|(p, e)| f64::from(p - e).powi(2)),
                ))
            }
            _ => Err(NetErr::TargetMismatch(
                "targets don't match the kind of estimator".into(),
            )),
        }
    }

    /// The flat configuration, as accepted by `set_params`.
    pub fn get_params(&self) -> Params {
        self.config.to_params()
    }

    /// Updates the configuration. The network has to be initialized again afterwards, its
    /// learned parameters are dropped.
    pub fn set_params(&mut self, params: Params) -> Result<()> {
        self.config.set_params(params)?;
        self.compiled = None;
        self.rng = StdRng::seed_from_u64(self.config.seed);
        Ok(())
    }

    /// A network with the same configuration and handlers that was never trained.
    pub fn clone_unfitted(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            custom_score: self.custom_score.clone(),
            on_epoch_finished: self.on_epoch_finished.clone(),
            on_training_started: self.on_training_started.clone(),
            on_training_finished: self.on_training_finished.clone(),
            ..Self::new(self.config.clone())
        }
    }

    /// The parameter tensors of every layer that has any, by layer name.
    pub fn get_all_params_values(&self) -> Result<ParamValues> {
        let compiled = self.compiled.as_ref().ok_or(NetErr::NotInitialized)?;
        let params = compiled.trainer.params();
        let mut values = ParamValues::new();

        for node in compiled.trainer.graph().nodes() {
            let shapes = node.layer().param_shapes();
            if shapes.is_empty() {
                continue;
            }

            let mut offset = node.param_range().start;
            let tensors = shapes
                .into_iter()
                .map(|(name, shape)| {
                    let len: usize = shape.iter().product();
                    let data = params[offset..offset + len].to_vec();
                    offset += len;
                    Tensor {
                        name: name.to_string(),
                        shape,
                        data,
                    }
                })
                .collect();

            values.insert(node.name().to_string(), tensors);
        }

        Ok(values)
    }

    /// Loads parameters into the layers with the same name, initializing the network first.
    ///
    /// Tensors are matched by name inside each layer. Layers missing from the source and
    /// tensors whose shape doesn't match are left untouched, the latter with a warning.
    pub fn load_params_from<'a>(&mut self, source: impl Into<ParamSource<'a>>) -> Result<()> {
        let values = match source.into() {
            ParamSource::Path(path) => read_safetensors(path)?,
            ParamSource::Net(net) => net.get_all_params_values()?,
            ParamSource::Values(values) => values.clone(),
        };

        self.initialize()?;
        let trainer = &mut self
            .compiled
            .as_mut()
            .ok_or(NetErr::NotInitialized)?
            .trainer;

        let mut slots = vec![];
        for node in trainer.graph().nodes() {
            let Some(tensors) = values.get(node.name()) else {
                continue;
            };

            let mut offset = node.param_range().start;
            for (name, shape) in node.layer().param_shapes() {
                let len: usize = shape.iter().product();

                match tensors.iter().find(|t| t.name == name) {
                    Some(tensor) if tensor.shape == shape && tensor.data.len() == len => {
                        info!(
                            "Loaded parameters to layer '{}' ({name} shape {shape:?})",
                            node.name()
                        );
                        slots.push((offset..offset + len, &tensor.data));
                    }
                    Some(tensor) => warn!(
                        "Couldn't load parameters for layer '{}' ({name} shape {:?} vs {shape:?})",
                        node.name(),
                        tensor.shape
                    ),
                    None => warn!("No parameter {name} for layer '{}'", node.name()),
                }

                offset += len;
            }
        }

        let params = trainer.params_mut();
        for (range, data) in slots {
            params[range].copy_from_slice(data);
        }

        Ok(())
    }

    /// Writes the learnable parameters to a safetensors file.
    pub fn save_params_to(&self, path: impl AsRef<Path>) -> Result<()> {
        write_safetensors(&self.get_all_params_values()?, path.as_ref())
    }

    /// Writes the configuration, the parameters, the history and the classes to a JSON file.
    /// Handlers and custom scores aren't written.
    pub fn dump(&self, path: impl AsRef<Path>) -> Result<()> {
        let params = match &self.compiled {
            Some(_) => Some(self.get_all_params_values()?),
            None => None,
        };

        Snapshot {
            config: self.config.clone(),
            params,
            history: self.history.clone(),
            classes: self.classes.clone(),
        }
        .write(path.as_ref())
    }

    /// Reads a network written by `dump`, with the default layer kinds.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_registry(path, LayerRegistry::default())
    }

    /// Reads a network written by `dump`, looking layer kinds up in `registry`.
    pub fn load_with_registry(path: impl AsRef<Path>, registry: LayerRegistry) -> Result<Self> {
        let snapshot = Snapshot::read(path.as_ref())?;

        let mut net = Self::new(snapshot.config).with_registry(registry);
        net.history = snapshot.history;
        net.classes = snapshot.classes;
        if let Some(values) = &snapshot.params {
            net.load_params_from(values)?;
        }

        Ok(net)
    }
}

impl Checkpoint for NeuralNet {
    fn save_params_to(&self, path: &Path) -> Result<()> {
        NeuralNet::save_params_to(self, path)
    }

    fn dump(&self, path: &Path) -> Result<()> {
        NeuralNet::dump(self, path)
    }
}

impl fmt::Debug for NeuralNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NeuralNet")
            .field("config", &self.config)
            .field("initialized", &self.is_initialized())
            .field("epochs", &self.history.len())
            .field("classes", &self.classes)
            .finish_non_exhaustive()
    }
}

/// `NaN` when there's nothing to average.
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0., 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 { f64::NAN } else { sum / n as f64 }
}
