use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Modal editor state for sessions and absences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "target", rename_all = "snake_case")]
pub enum EditorState {
  #[default]
  Closed,
  /// New record on this date
  Creating(NaiveDate),
  /// Existing record id
  Editing(i64),
}

impl EditorState {
  pub fn open_create(date: NaiveDate) -> Self {
    EditorState::Creating(date)
  }

  pub fn open_edit(id: i64) -> Self {
    EditorState::Editing(id)
  }

  pub fn close(&mut self) {
    *self = EditorState::Closed;
  }

  pub fn is_open(&self) -> bool {
    !matches!(self, EditorState::Closed)
  }

  pub fn is_edit(&self) -> bool {
    matches!(self, EditorState::Editing(_))
  }

  pub fn target_date(&self) -> Option<NaiveDate> {
    match self {
      EditorState::Creating(date) => Some(*date),
      _ => None,
    }
  }

  pub fn editing_id(&self) -> Option<i64> {
    match self {
      EditorState::Editing(id) => Some(*id),
      _ => None,
    }
  }
}
