//! Exact-match prompt lookup.

use tracing::{info, warn};

use crate::criteria::CriteriaTable;
use crate::error::MatchError;
use crate::validate::MatchRequest;

/// Return the id of the first prompt whose criteria equal the request's
/// situation, level and file type.
///
/// Comparison is exact and case-sensitive. A request with no matching entry
/// yields [`MatchError::InvalidPrompt`].
pub fn match_prompt<'a>(table: &'a CriteriaTable, req: &MatchRequest) -> Result<&'a str, MatchError> {
    match table.lookup(&req.situation, &req.level, &req.file_type) {
        Some(c) => {
            info!(
                prompt = %c.id,
                situation = %req.situation,
                level = %req.level,
                file_type = %req.file_type,
                "matched prompt"
            );
            Ok(&c.id)
        }
        None => {
            warn!(
                situation = %req.situation,
                level = %req.level,
                file_type = %req.file_type,
                "no matching prompt"
            );
            Err(MatchError::InvalidPrompt)
        }
    }
}
