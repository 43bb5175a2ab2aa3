use crate::{data::Dataset, error::Result, nn::LinearClassifier};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub correct: usize,
    pub wrong: usize,
}

impl Evaluation {
    pub fn total(&self) -> usize {
        self.correct + self.wrong
    }

    /// Fraction of correct predictions, 0 for an empty evaluation.
    pub fn accuracy(&self) -> f32 {
        match self.total() {
            0 => 0.0,
            total => self.correct as f32 / total as f32,
        }
    }
}

/// Counts how many samples the model assigns to their labelled class.
/// Runs on plain values so no autograd graph is built.
pub fn evaluate(model: &LinearClassifier, dataset: &Dataset) -> Result<Evaluation> {
    let mut evaluation = Evaluation::default();
    for (x, y) in dataset.vectors.iter().zip(dataset.labels.iter()) {
        if model.predict(x)? == *y {
            evaluation.correct += 1;
        } else {
            evaluation.wrong += 1;
        }
    }
    Ok(evaluation)
}
