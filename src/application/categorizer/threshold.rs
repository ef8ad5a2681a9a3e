//! Adaptive acceptance threshold.
//!
//! A single fixed cutoff either rejects good predictions on long, specific
//! descriptions or accepts noise on two-letter ones. The threshold starts at
//! [`BASE_THRESHOLD`] and is raised by evidence of uncertainty: short input,
//! a narrow margin between the top candidates, or a flat probability
//! distribution.

const BASE_THRESHOLD: f64 = 0.50;
const MAX_THRESHOLD: f64 = 0.90;

/// Threshold for one prediction.
///
/// `normalized` is the description after [`super::normalizer::normalize`];
/// `probabilities` is the full calibrated class distribution (any order).
pub fn dynamic_threshold(normalized: &str, probabilities: &[f64]) -> f64 {
    let mut threshold = BASE_THRESHOLD;

    let len = normalized.trim().chars().count();
    if len < 4 {
        threshold += 0.25;
    } else if len < 8 {
        threshold += 0.10;
    }

    let mut sorted = probabilities.to_vec();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    if sorted.len() >= 2 && sorted[0] - sorted[1] < 0.15 {
        threshold += 0.10;
    }

    if normalized_entropy(probabilities) > 0.8 {
        threshold += 0.10;
    }

    threshold.min(MAX_THRESHOLD)
}

/// Shannon entropy of the distribution divided by its maximum (`ln n`),
/// so the result is in [0, 1] regardless of class count.
fn normalized_entropy(probabilities: &[f64]) -> f64 {
    if probabilities.len() < 2 {
        return 0.0;
    }
    let entropy: f64 = probabilities
        .iter()
        .map(|&p| -p * (p + 1e-10).ln())
        .sum();
    entropy / (probabilities.len() as f64).ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_threshold_for_confident_long_input() {
        // Long description, dominant class, peaked distribution.
        let probs = vec![0.9, 0.05, 0.03, 0.02];
        let t = dynamic_threshold("pagamento netflix assinatura", &probs);
        assert!((t - 0.50).abs() < 1e-12);
    }

    #[test]
    fn test_short_input_raises_threshold() {
        let probs = vec![0.9, 0.05, 0.03, 0.02];
        assert!((dynamic_threshold("bar", &probs) - 0.75).abs() < 1e-12);
        assert!((dynamic_threshold("mercado", &probs) - 0.60).abs() < 1e-12);
    }

    #[test]
    fn test_narrow_margin_raises_threshold() {
        let probs = vec![0.45, 0.40, 0.10, 0.05];
        let t = dynamic_threshold("supermercado carrefour", &probs);
        // Margin 0.05 adds 0.10; entropy of this spread stays under 0.8.
        assert!((t - 0.60).abs() < 1e-12);
    }

    #[test]
    fn test_flat_distribution_raises_threshold() {
        let probs = vec![0.25, 0.25, 0.25, 0.25];
        let t = dynamic_threshold("pagamento boleto diversos", &probs);
        // Flat: margin bump + entropy bump.
        assert!((t - 0.70).abs() < 1e-12);
    }

    #[test]
    fn test_threshold_capped() {
        let probs = vec![0.26, 0.25, 0.25, 0.24];
        // Short + margin + entropy would exceed the cap.
        let t = dynamic_threshold("x", &probs);
        assert!((t - MAX_THRESHOLD).abs() < 1e-12);
    }

    #[test]
    fn test_normalized_entropy_bounds() {
        assert!(normalized_entropy(&[1.0, 0.0, 0.0]) < 0.01);
        assert!(normalized_entropy(&[0.25, 0.25, 0.25, 0.25]) > 0.99);
    }
}
