use std::{fmt, path::Path};

use crate::{data::argmax, error::Result, nn::LinearClassifier, record::load_model};

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub input: Vec<f32>,
    pub class: usize,
    /// Raw scores, one per class, before softmax.
    pub scores: Vec<f32>,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "input: {:?}, predicted class: {}, scores: {:?}",
            self.input, self.class, self.scores
        )
    }
}

pub fn predict_all<V: AsRef<[f32]>>(
    model: &LinearClassifier,
    inputs: &[V],
) -> Result<Vec<Prediction>> {
    inputs
        .iter()
        .map(|x| {
            let input = x.as_ref();
            let scores = model.scores(input)?;
            Ok(Prediction {
                input: input.to_vec(),
                class: argmax(&scores),
                scores,
            })
        })
        .collect()
}

/// Loads the model saved at `model_path` and classifies every input.
pub fn predict_file<V: AsRef<[f32]>>(
    model_path: &Path,
    inputs: &[V],
) -> Result<Vec<Prediction>> {
    let model = load_model(model_path)?;
    predict_all(&model, inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::Error, record::save_model};
    use rand::{rngs::StdRng, SeedableRng};

    const TEST_VECTORS: [[f32; 3]; 4] = [
        [0.47889086, 0.15229675, 0.31082123],
        [0.94963533, 0.5524256, 0.95758807],
        [0.78797868, 0.67482528, 0.13625847],
        [0.89349776, 0.59416669, 0.92579291],
    ];

    #[test]
    fn test_predict_file_matches_in_memory_model() {
        let model = LinearClassifier::new(&mut StdRng::seed_from_u64(21), 3, 3);
        let file_name = format!("argmax-grad-predict-{}.json", std::process::id());
        let path = std::env::temp_dir().join(file_name);
        save_model(&path, &model).unwrap();
        let from_file = predict_file(&path, &TEST_VECTORS).unwrap();
        std::fs::remove_file(&path).unwrap();

        let in_memory = predict_all(&model, &TEST_VECTORS).unwrap();
        assert_eq!(4, from_file.len());
        for (a, b) in from_file.iter().zip(in_memory.iter()) {
            assert_eq!(a.class, b.class);
            assert_eq!(a.input, b.input);
            assert_eq!(3, a.scores.len());
        }
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let model = LinearClassifier::new(&mut StdRng::seed_from_u64(21), 3, 3);
        let inputs = [vec![0.1f32, 0.2]];
        assert!(matches!(
            predict_all(&model, &inputs),
            Err(Error::ShapeMismatch { .. })
        ));
    }
}
