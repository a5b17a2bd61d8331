mod common;

use neural_estimator::{NeuralNet, Result, handlers::SaveWeights, persist::read_safetensors};

use common::{blobs, classifier, init_logger};

fn trained(max_epochs: usize) -> Result<NeuralNet> {
    let (x, y) = blobs();
    let mut config = classifier();
    config.max_epochs = max_epochs;

    let mut net = NeuralNet::new(config);
    net.fit(x.view(), &y)?;
    Ok(net)
}

#[test]
fn saved_params_give_the_same_predictions() -> Result<()> {
    init_logger();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("net.safetensors");
    let (x, _) = blobs();

    let mut net = trained(5)?;
    net.save_params_to(&path)?;

    let stored = read_safetensors(&path)?;
    assert_eq!(stored.keys().collect::<Vec<_>>(), vec!["hidden", "output"]);
    assert_eq!(stored["hidden"][0].shape, vec![2, 16]);

    let mut fresh = NeuralNet::new(classifier());
    fresh.load_params_from(&path)?;

    assert_eq!(fresh.predict_proba(x.view())?, net.predict_proba(x.view())?);
    Ok(())
}

#[test]
fn params_load_from_other_nets_and_values() -> Result<()> {
    let (x, _) = blobs();
    let mut net = trained(3)?;

    let mut from_net = NeuralNet::new(classifier());
    from_net.load_params_from(&net)?;

    let values = net.get_all_params_values()?;
    let mut from_values = NeuralNet::new(classifier());
    from_values.load_params_from(&values)?;

    let expected = net.predict_proba(x.view())?;
    assert_eq!(from_net.predict_proba(x.view())?, expected);
    assert_eq!(from_values.predict_proba(x.view())?, expected);
    Ok(())
}

#[test]
fn mismatched_shapes_are_skipped() -> Result<()> {
    let net = trained(2)?;

    let narrow = classifier().with("hidden_num_units", 8);
    let mut other = NeuralNet::new(narrow);
    other.initialize()?;
    let before = other.get_all_params_values()?;

    other.load_params_from(&net)?;
    let after = other.get_all_params_values()?;
    let source = net.get_all_params_values()?;

    // Every weight matrix differs in shape, only the output biases fit.
    assert_eq!(after["hidden"], before["hidden"]);
    assert_eq!(after["output"][0], before["output"][0]);
    assert_eq!(after["output"][1], source["output"][1]);
    Ok(())
}

#[test]
fn dumped_nets_load_back_whole() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("net.json");
    let (x, y) = blobs();

    let mut net = trained(4)?;
    net.dump(&path)?;

    let mut loaded = NeuralNet::load(&path)?;

    assert_eq!(loaded.config(), net.config());
    assert_eq!(loaded.history().len(), 4);
    assert_eq!(loaded.predict(x.view())?, net.predict(x.view())?);

    loaded.partial_fit(x.view(), &y)?;
    assert_eq!(loaded.history().last().map(|info| info.epoch), Some(5));
    Ok(())
}

#[test]
fn save_weights_writes_every_n_epochs() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let template = dir.path().join("weights-{epoch}.safetensors");
    let (x, y) = blobs();

    let mut config = classifier();
    config.max_epochs = 4;
    let handler = SaveWeights::new(template.to_string_lossy()).every_n_epochs(2);
    let mut net = NeuralNet::new(config).on_epoch_finished(handler);

    net.fit(x.view(), &y)?;

    assert!(dir.path().join("weights-0002.safetensors").exists());
    assert!(dir.path().join("weights-0004.safetensors").exists());
    assert!(!dir.path().join("weights-0001.safetensors").exists());
    assert!(!dir.path().join("weights-0003.safetensors").exists());
    Ok(())
}

#[test]
fn pickled_checkpoints_are_loadable() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("net.json");
    let (x, y) = blobs();

    let mut config = classifier();
    config.max_epochs = 2;
    let handler = SaveWeights::new(path.to_string_lossy()).pickle(true);
    let mut net = NeuralNet::new(config).on_epoch_finished(handler);

    net.fit(x.view(), &y)?;

    let mut loaded = NeuralNet::load(&path)?;
    assert_eq!(loaded.history().len(), 2);
    assert_eq!(loaded.predict(x.view())?, net.predict(x.view())?);
    Ok(())
}

#[test]
fn diverged_nets_load_back() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("net.json");
    let (x, y) = blobs();

    let mut config = classifier().with("update_learning_rate", 1e30);
    config.max_epochs = 3;
    let handler = SaveWeights::new(path.to_string_lossy()).pickle(true);
    let mut net = NeuralNet::new(config).on_epoch_finished(handler);

    net.fit(x.view(), &y)?;
    assert!(net.history().iter().any(|info| !info.train_loss.is_finite()));

    let loaded = NeuralNet::load(&path)?;
    assert_eq!(loaded.history().len(), 3);
    for (a, b) in loaded.history().iter().zip(net.history().iter()) {
        assert_eq!(a.train_loss.is_nan(), b.train_loss.is_nan());
    }

    let (ours, theirs) = (loaded.get_all_params_values()?, net.get_all_params_values()?);
    for (layer, tensors) in &theirs {
        for (a, b) in ours[layer].iter().zip(tensors) {
            assert_eq!(a.shape, b.shape);
            assert!(a.data.iter().zip(&b.data).all(|(p, q)| p == q || (p.is_nan() && q.is_nan())));
        }
    }
    Ok(())
}
