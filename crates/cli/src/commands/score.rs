use std::path::Path;

use staffquote_core::compute_sustain_score;
use staffquote_core::documents::read_specification;

use crate::commands::CommandResult;

/// Scores the sustain sub-tree of a specification whatever its active service type.
pub fn run(spec_path: &Path) -> CommandResult {
    let spec = match read_specification(spec_path) {
        Ok(spec) => spec,
        Err(error) => return CommandResult::from_error("score", &error),
    };

    let score = compute_sustain_score(&spec);
    CommandResult::success_with_data(
        "score",
        format!("sustain score {} maps to {}", score.total, score.tier_label),
        &score,
    )
}
