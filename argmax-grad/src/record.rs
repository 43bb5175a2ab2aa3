use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{Error, Result},
    nn::{LinearClassifier, LinearLayer, LinearNeuron},
};

/// Plain snapshot of a [`LinearClassifier`]'s parameters. Row `i` of
/// `weights` and `bias[i]` produce the score of class `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearClassifierRecord {
    pub input_size: usize,
    pub num_classes: usize,
    pub weights: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
}

impl LinearClassifierRecord {
    fn validate(&self) -> Result<()> {
        if self.num_classes == 0 || self.input_size == 0 {
            return Err(Error::InvalidRecord(format!(
                "degenerate shape {}x{}",
                self.num_classes, self.input_size
            )));
        }
        if self.weights.len() != self.num_classes || self.bias.len() != self.num_classes {
            return Err(Error::InvalidRecord(format!(
                "expected {} weight rows and biases, got {} and {}",
                self.num_classes,
                self.weights.len(),
                self.bias.len()
            )));
        }
        if let Some(row) = self.weights.iter().find(|r| r.len() != self.input_size) {
            return Err(Error::InvalidRecord(format!(
                "weight row has {} values, expected {}",
                row.len(),
                self.input_size
            )));
        }
        Ok(())
    }
}

impl LinearClassifier {
    pub fn to_record(&self) -> LinearClassifierRecord {
        let neurons = self.layer().neurons();
        LinearClassifierRecord {
            input_size: self.input_size(),
            num_classes: self.num_classes(),
            weights: neurons.iter().map(|n| n.weight_values()).collect(),
            bias: neurons.iter().map(|n| n.bias_value()).collect(),
        }
    }

    pub fn from_record(record: &LinearClassifierRecord) -> Result<Self> {
        record.validate()?;
        let neurons = record
            .weights
            .iter()
            .zip(record.bias.iter())
            .map(|(w, b)| LinearNeuron::from_values(w, *b))
            .collect();
        Ok(Self::from_layer(LinearLayer::from_neurons(neurons)))
    }
}

pub fn save(path: &Path, record: &LinearClassifierRecord) -> Result<()> {
    let json = serde_json::to_string_pretty(record)?;
    fs::write(path, json).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("saved model to '{}'", path.display());
    Ok(())
}

pub fn load(path: &Path) -> Result<LinearClassifierRecord> {
    let content = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let record: LinearClassifierRecord = serde_json::from_str(&content)?;
    record.validate()?;
    debug!("loaded model from '{}'", path.display());
    Ok(record)
}

pub fn save_model(path: &Path, model: &LinearClassifier) -> Result<()> {
    save(path, &model.to_record())
}

pub fn load_model(path: &Path) -> Result<LinearClassifier> {
    LinearClassifier::from_record(&load(path)?)
}
