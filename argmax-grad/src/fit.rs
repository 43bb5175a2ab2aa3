use std::fmt::{self, Display};

use rand::Rng;
use tracing::{debug, info};

use crate::{
    config::TrainingConfig,
    data::{build_dataset, Dataset},
    error::{Error, Result},
    metrics::evaluate,
    nn::{LinearClassifier, Module},
    optim::Optimizer,
};

/// What one epoch left behind: evaluation accuracy and the mean batch loss.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochLog {
    pub epoch: usize,
    pub accuracy: f32,
    pub loss: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingHistory {
    pub epochs: Vec<EpochLog>,
}

impl TrainingHistory {
    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn last(&self) -> Option<&EpochLog> {
        self.epochs.last()
    }

    pub fn accuracy_series(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.epochs.iter().map(|e| (e.epoch, e.accuracy))
    }

    pub fn loss_series(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.epochs.iter().map(|e| (e.epoch, e.loss))
    }
}

impl Display for TrainingHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, e) in self.epochs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "[{}, {}]", e.accuracy, e.loss)?;
        }
        write!(f, "]")
    }
}

fn mean(values: &[f32]) -> f32 {
    values.iter().sum::<f32>() / values.len() as f32
}

/// Trains `model` for `config.epochs` passes over `train`, in order and in
/// batches of `config.batch_size`. After every epoch the model is scored
/// against a freshly generated dataset of `config.eval_samples` samples.
pub fn fit<O: Optimizer, R: Rng + ?Sized>(
    model: &mut LinearClassifier,
    optimizer: &mut O,
    train: &Dataset,
    config: &TrainingConfig,
    rng: &mut R,
) -> Result<TrainingHistory> {
    config.validate()?;
    if train.len() != config.train_samples {
        return Err(Error::InvalidConfig(format!(
            "expected {} training samples, got {}",
            config.train_samples,
            train.len()
        )));
    }
    let num_batches = config.batches_per_epoch();
    debug!(num_batches, ?config, "starting training");

    let mut history = TrainingHistory::default();
    for epoch in 0..config.epochs {
        let mut watch_loss = Vec::with_capacity(num_batches);

        for batch in train.batches(config.batch_size) {
            // Forward pass
            let loss = model.loss(batch.vectors, batch.labels)?;

            // Backward pass
            model.zero_grad();
            loss.backward();

            // Update params
            optimizer.step(&model.parameters());

            watch_loss.push(loss.data());
        }

        let loss = mean(&watch_loss);
        let evaluation = evaluate(model, &build_dataset(rng, config.eval_samples))?;
        info!(
            epoch = epoch + 1,
            loss,
            correct = evaluation.correct,
            accuracy = evaluation.accuracy(),
            "epoch finished"
        );

        history.epochs.push(EpochLog {
            epoch,
            accuracy: evaluation.accuracy(),
            loss,
        });
    }
    Ok(history)
}
