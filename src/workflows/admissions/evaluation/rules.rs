use super::config::ScoreWeights;
use super::super::domain::{InterviewScores, ScoreComponent, ScoreFactor};

pub(crate) const MAX_SUBSCORE: u8 = 10;

/// Recompute the weighted total from the submitted subscores, emitting one
/// auditable component per factor. Subscores are expected to be validated
/// (0 through [`MAX_SUBSCORE`]) before this is called.
pub(crate) fn score_interview(
    scores: &InterviewScores,
    weights: &ScoreWeights,
) -> (Vec<ScoreComponent>, i16) {
    let factors = [
        (ScoreFactor::Technical, scores.technical, weights.technical),
        (
            ScoreFactor::Communication,
            scores.communication,
            weights.communication,
        ),
        (
            ScoreFactor::ProblemSolving,
            scores.problem_solving,
            weights.problem_solving,
        ),
        (
            ScoreFactor::CultureAdd,
            scores.culture_add,
            weights.culture_add,
        ),
    ];

    let mut components = Vec::with_capacity(factors.len());
    let mut total_score: i16 = 0;
    for (factor, subscore, weight) in factors {
        let contribution = i16::from(subscore) * i16::from(weight);
        components.push(ScoreComponent {
            factor,
            score: contribution,
            notes: format!("subscore {subscore}/{MAX_SUBSCORE} at weight {weight}"),
        });
        total_score += contribution;
    }

    (components, total_score)
}

/// Reject out-of-range subscores before any scoring happens.
pub(crate) fn out_of_range(scores: &InterviewScores) -> Option<&'static str> {
    if scores.technical > MAX_SUBSCORE {
        Some("technical")
    } else if scores.communication > MAX_SUBSCORE {
        Some("communication")
    } else if scores.problem_solving > MAX_SUBSCORE {
        Some("problem_solving")
    } else if scores.culture_add > MAX_SUBSCORE {
        Some("culture_add")
    } else {
        None
    }
}
