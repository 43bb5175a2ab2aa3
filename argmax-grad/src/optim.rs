use crate::engine::MutableScalarTensor;

pub trait Optimizer {
    /// Updates every parameter in place from its accumulated gradient.
    /// Parameters must be passed in the same order on every call.
    fn step(&mut self, parameters: &[MutableScalarTensor]);
}

/// Plain gradient descent.
pub struct Sgd {
    learning_rate: f32,
}

impl Sgd {
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate }
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, parameters: &[MutableScalarTensor]) {
        for p in parameters {
            let mut p = p.borrow_mut();
            // We want the loss to go down so we add by negative grad
            p.data += -self.learning_rate * p.grad;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdamConfig {
    pub learning_rate: f32,
    pub beta_1: f32,
    pub beta_2: f32,
    pub epsilon: f32,
}

impl AdamConfig {
    pub fn new(learning_rate: f32) -> Self {
        Self {
            learning_rate,
            beta_1: 0.9,
            beta_2: 0.999,
            epsilon: 1e-8,
        }
    }

    pub fn with_betas(mut self, beta_1: f32, beta_2: f32) -> Self {
        self.beta_1 = beta_1;
        self.beta_2 = beta_2;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn init(&self) -> Adam {
        Adam {
            config: self.clone(),
            time: 0,
            moment_1: Vec::new(),
            moment_2: Vec::new(),
        }
    }
}

/// Adam: gradient descent scaled by bias-corrected running estimates of the
/// first and second moments of each parameter's gradient.
pub struct Adam {
    config: AdamConfig,
    time: i32,
    moment_1: Vec<f32>,
    moment_2: Vec<f32>,
}

impl Adam {
    pub fn config(&self) -> &AdamConfig {
        &self.config
    }

    /// Steps taken so far.
    pub fn time(&self) -> i32 {
        self.time
    }
}

impl Optimizer for Adam {
    fn step(&mut self, parameters: &[MutableScalarTensor]) {
        if self.moment_1.len() != parameters.len() {
            // A different parameter set invalidates the running estimates
            self.time = 0;
            self.moment_1 = vec![0.0; parameters.len()];
            self.moment_2 = vec![0.0; parameters.len()];
        }
        self.time += 1;

        let AdamConfig {
            learning_rate,
            beta_1,
            beta_2,
            epsilon,
        } = self.config;
        let correction_1 = 1.0 - beta_1.powi(self.time);
        let correction_2 = 1.0 - beta_2.powi(self.time);

        for ((p, m_1), m_2) in parameters
            .iter()
            .zip(self.moment_1.iter_mut())
            .zip(self.moment_2.iter_mut())
        {
            let mut p = p.borrow_mut();
            let grad = p.grad;
            *m_1 = beta_1 * *m_1 + (1.0 - beta_1) * grad;
            *m_2 = beta_2 * *m_2 + (1.0 - beta_2) * grad * grad;

            let m_1_corrected = *m_1 / correction_1;
            let m_2_corrected = *m_2 / correction_2;
            p.data -= learning_rate * m_1_corrected / (m_2_corrected.sqrt() + epsilon);
        }
    }
}
