use crate::error::{Error, Result};

/// Number of components in every input vector.
pub const INPUT_SIZE: usize = 3;
/// One class per input component.
pub const NUM_CLASSES: usize = INPUT_SIZE;

/// Hyperparameters of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub batch_size: usize,
    /// Samples in the training set, reused every epoch.
    pub train_samples: usize,
    /// Samples in the fresh dataset drawn after every epoch.
    pub eval_samples: usize,
    pub learning_rate: f32,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 20,
            batch_size: 20,
            train_samples: 5000,
            eval_samples: 100,
            learning_rate: 0.001,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be positive".into()));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch size must be positive".into()));
        }
        if self.batch_size > self.train_samples {
            return Err(Error::InvalidConfig(format!(
                "batch size {} exceeds the {} training samples",
                self.batch_size, self.train_samples
            )));
        }
        if self.eval_samples == 0 {
            return Err(Error::InvalidConfig(
                "evaluation needs at least one sample".into(),
            ));
        }
        if !(self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }

    /// Number of optimizer steps per epoch; a trailing partial batch is skipped.
    pub fn batches_per_epoch(&self) -> usize {
        self.train_samples / self.batch_size
    }
}
