use {crate::error::ListError, serde::{Deserialize, Serialize}, std::ops::Range};

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
               Change Event
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/

/// One mutation of an observable list, expressed in the emitting list's
/// own index space as a half-open range `[start, end)`.
///
/// `Other` carries no range and means "something changed, recompute if you
/// care". `BatchStart` / `BatchEnd` are refinements of `Other` bracketing a
/// multi-event recomputation; listeners that do not coalesce updates may
/// treat them exactly like `Other`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeEvent {
    Added { start: usize, end: usize },
    Removed { start: usize, end: usize },
    Changed { start: usize, end: usize },
    Other,
    BatchStart,
    BatchEnd,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Removed,
    Changed,
    Other,
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl ChangeEvent {
    /// Panics on an empty range; constructing a ranged event with
    /// `start >= end` is a programming error.
    pub fn added(start: usize, end: usize) -> Self {
        assert!(start < end, "empty Added range [{}, {})", start, end);
        ChangeEvent::Added { start, end }
    }

    pub fn removed(start: usize, end: usize) -> Self {
        assert!(start < end, "empty Removed range [{}, {})", start, end);
        ChangeEvent::Removed { start, end }
    }

    pub fn changed(start: usize, end: usize) -> Self {
        assert!(start < end, "empty Changed range [{}, {})", start, end);
        ChangeEvent::Changed { start, end }
    }

    pub fn added_at(idx: usize) -> Self {
        ChangeEvent::added(idx, idx + 1)
    }

    pub fn removed_at(idx: usize) -> Self {
        ChangeEvent::removed(idx, idx + 1)
    }

    pub fn changed_at(idx: usize) -> Self {
        ChangeEvent::changed(idx, idx + 1)
    }

    /// Fallible form of the ranged constructors.
    pub fn try_range(kind: ChangeKind, start: usize, end: usize) -> Result<Self, ListError> {
        if kind != ChangeKind::Other && start >= end {
            return Err(ListError::InvalidArgument("empty change range"));
        }
        Ok(match kind {
            ChangeKind::Added => ChangeEvent::Added { start, end },
            ChangeKind::Removed => ChangeEvent::Removed { start, end },
            ChangeKind::Changed => ChangeEvent::Changed { start, end },
            ChangeKind::Other => ChangeEvent::Other,
        })
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            ChangeEvent::Added { .. } => ChangeKind::Added,
            ChangeEvent::Removed { .. } => ChangeKind::Removed,
            ChangeEvent::Changed { .. } => ChangeKind::Changed,
            ChangeEvent::Other | ChangeEvent::BatchStart | ChangeEvent::BatchEnd => {
                ChangeKind::Other
            }
        }
    }

    pub fn range(&self) -> Option<Range<usize>> {
        match *self {
            ChangeEvent::Added { start, end }
            | ChangeEvent::Removed { start, end }
            | ChangeEvent::Changed { start, end } => Some(start..end),
            _ => None,
        }
    }

    /// True for `Other` and both batch markers.
    pub fn is_other(&self) -> bool {
        self.range().is_none()
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
