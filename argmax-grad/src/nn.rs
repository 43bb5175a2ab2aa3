use rand::{distributions::Uniform, Rng};

use crate::{
    data::argmax,
    engine::{MutableScalarTensor, ScalarTensor},
    error::{Error, Result},
    loss_functions::{cross_entropy_loss, LossReduction},
};

pub trait Module {
    fn zero_grad(&mut self);
    fn parameters(&self) -> Vec<MutableScalarTensor>;
    fn forward(&self, x: &[MutableScalarTensor]) -> Result<Vec<MutableScalarTensor>>;
}

pub struct LinearNeuron {
    weights: Vec<MutableScalarTensor>,
    bias: MutableScalarTensor,
}

impl LinearNeuron {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, num_weights: usize) -> Self {
        let uniform = Uniform::new(-1.0, 1.0);
        let weights = (0..num_weights)
            .map(|_| ScalarTensor::new(rng.sample(uniform)))
            .collect();
        let bias = ScalarTensor::new(rng.sample(uniform));
        Self { weights, bias }
    }

    pub fn from_values(weights: &[f32], bias: f32) -> Self {
        Self {
            weights: weights.iter().map(|w| ScalarTensor::new(*w)).collect(),
            bias: ScalarTensor::new(bias),
        }
    }

    pub fn weight_values(&self) -> Vec<f32> {
        self.weights.iter().map(|w| w.data()).collect()
    }

    pub fn bias_value(&self) -> f32 {
        self.bias.data()
    }

    /// w * x + b on plain values, without recording a graph.
    pub fn value(&self, x: &[f32]) -> Result<f32> {
        check_width(self.weights.len(), x.len())?;
        Ok(self
            .weights
            .iter()
            .zip(x)
            .fold(self.bias.data(), |acc, (w_i, x_i)| acc + w_i.data() * x_i))
    }
}

fn check_width(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::ShapeMismatch {
            what: "input width",
            expected,
            actual,
        });
    }
    Ok(())
}

impl Module for LinearNeuron {
    fn zero_grad(&mut self) {
        for w in self.weights.iter() {
            w.borrow_mut().zero_grad();
        }
        self.bias.borrow_mut().zero_grad();
    }

    fn parameters(&self) -> Vec<MutableScalarTensor> {
        let mut params = self.weights.clone();
        params.push(self.bias.clone());
        params
    }

    fn forward(&self, x: &[MutableScalarTensor]) -> Result<Vec<MutableScalarTensor>> {
        check_width(self.weights.len(), x.len())?;

        // w * x + b, starting from the bias to avoid an extra zero node
        let mut result = self.bias.clone();
        for (w_i, x_i) in self.weights.iter().zip(x.iter()) {
            result = result + w_i * x_i;
        }
        Ok(vec![result])
    }
}

pub struct LinearLayer {
    neurons: Vec<LinearNeuron>,
}

impl LinearLayer {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, num_inputs: usize, num_outputs: usize) -> Self {
        let neurons = (0..num_outputs)
            .map(|_| LinearNeuron::new(rng, num_inputs))
            .collect();
        Self { neurons }
    }

    pub fn from_neurons(neurons: Vec<LinearNeuron>) -> Self {
        Self { neurons }
    }

    pub fn neurons(&self) -> &[LinearNeuron] {
        &self.neurons
    }

    pub fn num_inputs(&self) -> usize {
        self.neurons.first().map_or(0, |n| n.weights.len())
    }

    pub fn num_outputs(&self) -> usize {
        self.neurons.len()
    }

    pub fn values(&self, x: &[f32]) -> Result<Vec<f32>> {
        self.neurons.iter().map(|n| n.value(x)).collect()
    }
}

impl Module for LinearLayer {
    fn zero_grad(&mut self) {
        for n in self.neurons.iter_mut() {
            n.zero_grad();
        }
    }

    fn parameters(&self) -> Vec<MutableScalarTensor> {
        let mut result = Vec::new();
        for n in self.neurons.iter() {
            result.extend(n.parameters());
        }
        result
    }

    fn forward(&self, x: &[MutableScalarTensor]) -> Result<Vec<MutableScalarTensor>> {
        let mut result = Vec::new();
        for n in self.neurons.iter() {
            result.extend(n.forward(x)?);
        }
        Ok(result)
    }
}

/// A single linear layer mapping an input vector to one raw score per class.
/// There is no activation: softmax lives inside the cross entropy loss.
pub struct LinearClassifier {
    linear: LinearLayer,
}

impl LinearClassifier {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, input_size: usize, num_classes: usize) -> Self {
        Self {
            linear: LinearLayer::new(rng, input_size, num_classes),
        }
    }

    pub fn from_layer(linear: LinearLayer) -> Self {
        Self { linear }
    }

    pub fn layer(&self) -> &LinearLayer {
        &self.linear
    }

    pub fn input_size(&self) -> usize {
        self.linear.num_inputs()
    }

    pub fn num_classes(&self) -> usize {
        self.linear.num_outputs()
    }

    pub fn scalar_forward(&self, x: &[f32]) -> Result<Vec<MutableScalarTensor>> {
        let scalar_tensor_x: Vec<MutableScalarTensor> =
            x.iter().map(|value| ScalarTensor::new(*value)).collect();
        self.forward(&scalar_tensor_x)
    }

    /// Mean cross entropy of the batch, ready for `backward`.
    pub fn loss<V: AsRef<[f32]>>(&self, xs: &[V], labels: &[usize]) -> Result<MutableScalarTensor> {
        let scores = xs
            .iter()
            .map(|x| self.scalar_forward(x.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        cross_entropy_loss(&scores, labels, LossReduction::MEAN)
    }

    /// Raw class scores computed on plain values, no gradients are tracked.
    pub fn scores(&self, x: &[f32]) -> Result<Vec<f32>> {
        self.linear.values(x)
    }

    pub fn predict(&self, x: &[f32]) -> Result<usize> {
        Ok(argmax(&self.scores(x)?))
    }
}

impl Module for LinearClassifier {
    fn zero_grad(&mut self) {
        self.linear.zero_grad();
    }

    fn parameters(&self) -> Vec<MutableScalarTensor> {
        self.linear.parameters()
    }

    fn forward(&self, x: &[MutableScalarTensor]) -> Result<Vec<MutableScalarTensor>> {
        self.linear.forward(x)
    }
}
