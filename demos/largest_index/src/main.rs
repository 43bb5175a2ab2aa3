#![deny(warnings)]

use std::path::Path;

use anyhow::{Context, Result};
use argmax_grad::{
    config::{TrainingConfig, INPUT_SIZE, NUM_CLASSES},
    data::build_dataset,
    fit::fit,
    nn::LinearClassifier,
    optim::AdamConfig,
    plot::plot_history,
    predict::predict_all,
    record::{load, save_model},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const MODEL_PATH: &str = "largest_index.json";
const PLOT_PATH: &str = "training.png";

const TEST_VECTORS: [[f32; INPUT_SIZE]; 4] = [
    [0.47889086, 0.15229675, 0.31082123],
    [0.94963533, 0.5524256, 0.95758807],
    [0.78797868, 0.67482528, 0.13625847],
    [0.89349776, 0.59416669, 0.92579291],
];

fn train(config: &TrainingConfig, model_path: &Path) -> Result<()> {
    let mut rng = rand::thread_rng();
    let mut model = LinearClassifier::new(&mut rng, INPUT_SIZE, NUM_CLASSES);
    let mut optimizer = AdamConfig::new(config.learning_rate).init();
    let train_set = build_dataset(&mut rng, config.train_samples);

    let history = fit(&mut model, &mut optimizer, &train_set, config, &mut rng)?;

    save_model(model_path, &model)
        .with_context(|| format!("failed to save model to '{}'", model_path.display()))?;
    info!("saved model to '{}'", model_path.display());

    println!("{}", history);
    // The plot is a nicety, a missing font must not stop the run
    if let Err(err) = plot_history(&history, Path::new(PLOT_PATH)) {
        warn!("could not plot training history: {}", err);
    }
    Ok(())
}

fn predict(model_path: &Path) -> Result<()> {
    let record = load(model_path)
        .with_context(|| format!("failed to load model from '{}'", model_path.display()))?;
    println!("weights: {:?}", record.weights);
    println!("bias: {:?}", record.bias);

    let model = LinearClassifier::from_record(&record)?;
    for prediction in predict_all(&model, &TEST_VECTORS)? {
        println!("{}", prediction);
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = TrainingConfig::default();
    info!(?config, "training largest index classifier");

    let model_path = Path::new(MODEL_PATH);
    train(&config, model_path)?;
    predict(model_path)
}
