//! Adam optimizer for the linear model parameters

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Adam with L2 weight decay applied to the gradient of every parameter
/// (weights and bias alike).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adam {
    learning_rate: f64,
    weight_decay: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    t: usize,
    m_weights: Array1<f64>,
    v_weights: Array1<f64>,
    m_bias: f64,
    v_bias: f64,
}

impl Adam {
    /// Create an optimizer with β1 = 0.9, β2 = 0.999 and ε = 1e-8
    pub fn new(learning_rate: f64, weight_decay: f64) -> Self {
        Self::with_betas(learning_rate, weight_decay, 0.9, 0.999, 1e-8)
    }

    pub fn with_betas(
        learning_rate: f64,
        weight_decay: f64,
        beta1: f64,
        beta2: f64,
        epsilon: f64,
    ) -> Self {
        Self {
            learning_rate,
            weight_decay,
            beta1,
            beta2,
            epsilon,
            t: 0,
            m_weights: Array1::zeros(0),
            v_weights: Array1::zeros(0),
            m_bias: 0.0,
            v_bias: 0.0,
        }
    }

    /// Number of steps taken
    pub fn steps(&self) -> usize {
        self.t
    }

    /// Apply one update in place
    pub fn step(
        &mut self,
        weights: &mut Array1<f64>,
        bias: &mut f64,
        grad_weights: &Array1<f64>,
        grad_bias: f64,
    ) {
        if self.m_weights.len() != weights.len() {
            self.m_weights = Array1::zeros(weights.len());
            self.v_weights = Array1::zeros(weights.len());
        }
        self.t += 1;

        let correction1 = 1.0 - self.beta1.powi(self.t as i32);
        let correction2 = 1.0 - self.beta2.powi(self.t as i32);

        for j in 0..weights.len() {
            let g = grad_weights[j] + self.weight_decay * weights[j];
            self.m_weights[j] = self.beta1 * self.m_weights[j] + (1.0 - self.beta1) * g;
            self.v_weights[j] = self.beta2 * self.v_weights[j] + (1.0 - self.beta2) * g * g;
            weights[j] -= self.update(self.m_weights[j], self.v_weights[j], correction1, correction2);
        }

        let g = grad_bias + self.weight_decay * *bias;
        self.m_bias = self.beta1 * self.m_bias + (1.0 - self.beta1) * g;
        self.v_bias = self.beta2 * self.v_bias + (1.0 - self.beta2) * g * g;
        *bias -= self.update(self.m_bias, self.v_bias, correction1, correction2);
    }

    fn update(&self, m: f64, v: f64, correction1: f64, correction2: f64) -> f64 {
        let m_hat = m / correction1;
        let v_hat = v / correction2;
        self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon)
    }
}
