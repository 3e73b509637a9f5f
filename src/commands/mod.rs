pub mod athlete;
pub mod coach;
pub mod stats;

use crate::error::{PlannerError, PlannerResult};

/// Reads degrade to empty data when storage fails. Access errors still
/// reach the caller.
pub(crate) fn or_empty<T: Default>(result: PlannerResult<T>, what: &str) -> PlannerResult<T> {
  match result {
    Err(PlannerError::Database(e)) => {
      tracing::warn!(error = %e, "Failed to load {}", what);
      Ok(T::default())
    }
    other => other,
  }
}
