use crate::{
    engine::{MutableScalarTensor, ScalarTensor},
    error::{Error, Result},
};

fn max_data(input: &[MutableScalarTensor]) -> f32 {
    input
        .iter()
        .map(|x| x.data())
        .fold(f32::NEG_INFINITY, f32::max)
}

/// Softmax with the maximum subtracted first so large scores don't overflow `exp`.
pub fn softmax(input: &[MutableScalarTensor]) -> Vec<MutableScalarTensor> {
    let max = max_data(input);
    let exps: Vec<MutableScalarTensor> = input.iter().map(|x_i| (x_i - max).exp()).collect();
    let sum: MutableScalarTensor = exps.iter().sum();
    exps.iter().map(|e| e / &sum).collect()
}

/// ln(sum(exp(x))), shifted by the maximum like [`softmax`].
fn log_sum_exp(input: &[MutableScalarTensor]) -> MutableScalarTensor {
    let max = max_data(input);
    let sum: MutableScalarTensor = input.iter().map(|x_i| (x_i - max).exp()).sum();
    sum.ln() + max
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LossReduction {
    MEAN,
    SUM,
}

/// Apply cross entropy, which includes softmax, against class index targets.
pub fn cross_entropy_loss(
    input: &[Vec<MutableScalarTensor>],
    target: &[usize],
    reduce: LossReduction,
) -> Result<MutableScalarTensor> {
    if input.len() != target.len() {
        return Err(Error::ShapeMismatch {
            what: "labels per batch",
            expected: input.len(),
            actual: target.len(),
        });
    }
    if input.is_empty() {
        return Ok(ScalarTensor::new(0.0));
    }

    let mut terms = Vec::with_capacity(input.len());
    for (x_i, y_i) in input.iter().zip(target) {
        let class = x_i.get(*y_i).ok_or(Error::LabelOutOfRange {
            label: *y_i,
            num_classes: x_i.len(),
        })?;
        // -ln(softmax(x)[y]) = ln(sum(exp(x))) - x[y]
        terms.push(log_sum_exp(x_i) - class);
    }

    let mut sum: MutableScalarTensor = terms.into_iter().sum();
    if reduce == LossReduction::MEAN {
        sum = &sum / input.len() as f32;
    }
    Ok(sum)
}
