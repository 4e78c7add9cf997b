use serde::Serialize;

/// Binary gender label reported for a verified face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Gender {
    #[serde(rename = "M")]
    M,
    #[serde(rename = "F")]
    F,
}

/// Order of the classifier's score outputs. Index 0 wins ties.
pub const GENDER_CLASS_ORDER: [Gender; 2] = [Gender::F, Gender::M];

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::M => "M",
            Gender::F => "F",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Winning label and its softmax probability.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenderPrediction {
    pub gender: Gender,
    pub confidence: f32,
}

impl GenderPrediction {
    /// Pick the label with the highest score, ordered per [`GENDER_CLASS_ORDER`].
    pub fn from_scores(scores: [f32; 2]) -> Self {
        let winner = if scores[1] > scores[0] { 1 } else { 0 };
        let probabilities = softmax(scores);
        Self {
            gender: GENDER_CLASS_ORDER[winner],
            confidence: probabilities[winner],
        }
    }
}

fn softmax(scores: [f32; 2]) -> [f32; 2] {
    let max = scores[0].max(scores[1]);
    let exp = scores.map(|s| (s - max).exp());
    let sum = exp[0] + exp[1];
    exp.map(|e| e / sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case([2.0, -1.0], Gender::F)]
    #[case([-0.5, 3.0], Gender::M)]
    #[case([0.1, 0.1000001], Gender::M)]
    fn test_highest_score_wins(#[case] scores: [f32; 2], #[case] expected: Gender) {
        assert_eq!(GenderPrediction::from_scores(scores).gender, expected);
    }

    #[test]
    fn test_tie_resolves_to_first_class() {
        let prediction = GenderPrediction::from_scores([0.7, 0.7]);
        assert_eq!(prediction.gender, Gender::F);
        assert_relative_eq!(prediction.confidence, 0.5);
    }

    #[test]
    fn test_confidence_is_softmax_probability() {
        let prediction = GenderPrediction::from_scores([0.0, 2.0_f32.ln()]);
        assert_eq!(prediction.gender, Gender::M);
        assert_relative_eq!(prediction.confidence, 2.0 / 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_softmax_is_stable_for_large_logits() {
        let prediction = GenderPrediction::from_scores([1000.0, 999.0]);
        assert!(prediction.confidence.is_finite());
        assert!(prediction.confidence > 0.5);
    }

    #[test]
    fn test_serializes_as_single_letter() {
        assert_eq!(serde_json::to_string(&Gender::M).unwrap(), "\"M\"");
        assert_eq!(serde_json::to_string(&Gender::F).unwrap(), "\"F\"");
        assert_eq!(Gender::F.to_string(), "F");
    }
}
