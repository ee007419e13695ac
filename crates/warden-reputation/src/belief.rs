// crates/warden-reputation/src/belief.rs
//
// Exponentially decayed Beta-style belief update.
//
// Each audit decays the prior (alpha, beta) by λ and adds the audit weight
// to alpha on success or to beta otherwise. Recent audits therefore weigh
// more than old ones and neither parameter grows without bound:
// alpha + beta converges to w / (1 - λ) for λ < 1.

/// Belief parameters of one success/failure pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Belief {
    pub alpha: f64,
    pub beta: f64,
}

impl Belief {
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }

    /// `alpha / (alpha + beta)`, in (0, 1] while alpha is positive.
    pub fn reputation(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    /// Advance the belief by one audit outcome.
    ///
    /// # Arguments
    /// * `success` - Whether the outcome counts for alpha (true) or beta (false).
    /// * `lambda` - Decay factor applied to both prior parameters, 0 < λ <= 1.
    /// * `weight` - Amount added to the parameter the outcome counts for, w > 0.
    pub fn update(self, success: bool, lambda: f64, weight: f64) -> Self {
        let (alpha, beta) = update_belief(self.alpha, self.beta, success, lambda, weight);
        Self { alpha, beta }
    }
}

/// Compute `(new_alpha, new_beta)` from a prior and a single audit outcome.
pub fn update_belief(alpha: f64, beta: f64, success: bool, lambda: f64, weight: f64) -> (f64, f64) {
    if success {
        (lambda * alpha + weight, lambda * beta)
    } else {
        (lambda * alpha, lambda * beta + weight)
    }
}
