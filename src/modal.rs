//! Preview overlay: which blob is open and how to move between neighbours.
//!
//! The modal stores only the open blob's `name`. Adjacency is always computed
//! against the list the caller is currently showing, so a poll that reorders
//! or shrinks the list never leaves the modal pointing at a stale index.

use crate::types::BlobRecord;

/// Toast text for the not-yet-supported delete action.
pub const DELETE_COMING_SOON: &str = "Delete feature coming soon!";
pub const DELETE_COMING_SOON_DETAIL: &str =
    "We are working on adding file deletion capabilities.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    Closed,
    Open { name: String },
}

/// Inputs the modal reacts to, independent of the front end's key type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalInput {
    Escape,
    ArrowLeft,
    ArrowRight,
    /// Click outside the dialog.
    Backdrop,
}

impl ModalInput {
    /// DOM `KeyboardEvent.key` names.
    pub fn from_key_name(key: &str) -> Option<Self> {
        match key {
            "Escape" | "Esc" => Some(ModalInput::Escape),
            "ArrowLeft" => Some(ModalInput::ArrowLeft),
            "ArrowRight" => Some(ModalInput::ArrowRight),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalController {
    state: ModalState,
}

impl ModalController {
    pub fn state(&self) -> &ModalState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, ModalState::Open { .. })
    }

    pub fn open_name(&self) -> Option<&str> {
        match &self.state {
            ModalState::Open { name } => Some(name),
            ModalState::Closed => None,
        }
    }

    pub fn open(&mut self, name: impl Into<String>) {
        self.state = ModalState::Open { name: name.into() };
    }

    pub fn close(&mut self) {
        self.state = ModalState::Closed;
    }

    /// The open blob as found in `visible`.
    pub fn current<'a>(&self, visible: &'a [BlobRecord]) -> Option<&'a BlobRecord> {
        let name = self.open_name()?;
        visible.iter().find(|b| b.name == name)
    }

    /// `(index, total)` of the open blob inside `visible`.
    pub fn position(&self, visible: &[BlobRecord]) -> Option<(usize, usize)> {
        let name = self.open_name()?;
        visible
            .iter()
            .position(|b| b.name == name)
            .map(|i| (i, visible.len()))
    }

    pub fn has_next(&self, visible: &[BlobRecord]) -> bool {
        matches!(self.position(visible), Some((i, n)) if i + 1 < n)
    }

    pub fn has_prev(&self, visible: &[BlobRecord]) -> bool {
        matches!(self.position(visible), Some((i, _)) if i > 0)
    }

    /// Move to the following item; no-op on the last one.
    pub fn next(&mut self, visible: &[BlobRecord]) -> bool {
        match self.position(visible) {
            Some((i, n)) if i + 1 < n => {
                self.open(visible[i + 1].name.clone());
                true
            }
            _ => false,
        }
    }

    /// Move to the preceding item; no-op on the first one.
    pub fn prev(&mut self, visible: &[BlobRecord]) -> bool {
        match self.position(visible) {
            Some((i, _)) if i > 0 => {
                self.open(visible[i - 1].name.clone());
                true
            }
            _ => false,
        }
    }

    /// Returns whether the input changed anything. Ignored while closed.
    pub fn handle(&mut self, input: ModalInput, visible: &[BlobRecord]) -> bool {
        if !self.is_open() {
            return false;
        }
        match input {
            ModalInput::Escape | ModalInput::Backdrop => {
                self.close();
                true
            }
            ModalInput::ArrowLeft => self.prev(visible),
            ModalInput::ArrowRight => self.next(visible),
        }
    }
}
