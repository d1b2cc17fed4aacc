use serde::{Deserialize, Serialize};

/// Rubric weights applied to the four interview subscores. The total is
/// always recomputed from these on the server; a client-supplied total is
/// never trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub technical: u8,
    pub communication: u8,
    pub problem_solving: u8,
    pub culture_add: u8,
}

impl ScoreWeights {
    /// Highest total the weights can produce, used to sanity-check
    /// recomputed scores in audits and tests.
    pub fn max_total(&self) -> i16 {
        let sum = u32::from(self.technical)
            + u32::from(self.communication)
            + u32::from(self.problem_solving)
            + u32::from(self.culture_add);
        (sum * u32::from(super::rules::MAX_SUBSCORE)) as i16
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            technical: 4,
            communication: 2,
            problem_solving: 3,
            culture_add: 1,
        }
    }
}
