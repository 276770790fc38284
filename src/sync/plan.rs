//! Actions and the ordered plan that converges the target onto the master

use crate::tree::path;
use serde::Serialize;
use std::fmt;

/// One remote operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "action", content = "path", rename_all = "snake_case")]
pub enum Action {
    CreateDirectory(String),
    /// New or changed file; always a whole-file replacement
    UploadFile(String),
    DeleteFile(String),
    RemoveDirectory(String),
}

impl Action {
    /// Relative path the action applies to
    pub fn path(&self) -> &str {
        match self {
            Action::CreateDirectory(p)
            | Action::UploadFile(p)
            | Action::DeleteFile(p)
            | Action::RemoveDirectory(p) => p,
        }
    }

    /// Short verb used in log fields and outcome lines
    pub fn verb(&self) -> &'static str {
        match self {
            Action::CreateDirectory(_) => "mkdir",
            Action::UploadFile(_) => "upload",
            Action::DeleteFile(_) => "delete",
            Action::RemoveDirectory(_) => "rmdir",
        }
    }

    pub fn is_deletion(&self) -> bool {
        matches!(self, Action::DeleteFile(_) | Action::RemoveDirectory(_))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb(), self.path())
    }
}

/// Per-kind action counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub create_directories: usize,
    pub uploads: usize,
    pub deletes: usize,
    pub remove_directories: usize,
}

/// Ordered sequence of actions.
///
/// Directories are created before anything is uploaded into them, and
/// directories are removed only after everything below them is gone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Plan {
    actions: Vec<Action>,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn has_deletions(&self) -> bool {
        self.actions.iter().any(Action::is_deletion)
    }

    pub fn summary(&self) -> PlanSummary {
        let mut summary = PlanSummary::default();
        for action in &self.actions {
            match action {
                Action::CreateDirectory(_) => summary.create_directories += 1,
                Action::UploadFile(_) => summary.uploads += 1,
                Action::DeleteFile(_) => summary.deletes += 1,
                Action::RemoveDirectory(_) => summary.remove_directories += 1,
            }
        }
        summary
    }

    /// Check the ordering invariants, returning the first violation found.
    pub fn check_order(&self) -> Result<(), String> {
        for (i, action) in self.actions.iter().enumerate() {
            match action {
                Action::CreateDirectory(dir) => {
                    if let Some(early) = self.actions[..i].iter().find(|a| {
                        matches!(a, Action::UploadFile(_) | Action::CreateDirectory(_))
                            && path::is_within(a.path(), dir)
                    }) {
                        return Err(format!("'{}' precedes creation of '{}'", early, dir));
                    }
                }
                Action::RemoveDirectory(dir) => {
                    if let Some(late) = self.actions[i + 1..].iter().find(|a| {
                        a.is_deletion() && path::is_within(a.path(), dir)
                    }) {
                        return Err(format!("'{}' follows removal of '{}'", late, dir));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}
