//! Registry of detail-plot sessions.
//!
//! Every operation returns a new registry snapshot; records are shared
//! through `Arc`, so snapshots are cheap and never alias mutable state.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::data_types::{DetailRequest, RenderedImage};
use crate::error::VizError;
use crate::view_controller::PercentileWindow;

pub type SessionKey = u64;

/// Dataset context a detail image is fetched for.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DetailContext {
    pub dataset: String,
    pub stage: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DetailState {
    Loading,
    Ready(RenderedImage),
    Failed(VizError),
}

#[derive(Clone, Debug, PartialEq)]
pub struct DetailSession {
    pub key: SessionKey,
    /// Dataset indices of the selected samples.
    pub indices: Vec<usize>,
    pub window: PercentileWindow,
    pub context: DetailContext,
    pub open: bool,
    pub state: DetailState,
}

impl DetailSession {
    pub fn request(&self) -> DetailRequest {
        DetailRequest {
            indices: self.indices.clone(),
            start: self.window.start,
            end: self.window.end,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, DetailState::Loading)
    }

    /// Header text of a detail plot, e.g. `3: [4, 9, 12]`.
    pub fn title(&self) -> String {
        let list = self
            .indices
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}: [{}]", self.indices.len(), list)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionRegistry {
    next_key: SessionKey,
    sessions: BTreeMap<SessionKey, Arc<DetailSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a loading session under a fresh key. Keys are never reused.
    #[must_use]
    pub fn open(
        &self,
        indices: Vec<usize>,
        window: PercentileWindow,
        context: DetailContext,
    ) -> (Self, SessionKey) {
        let key = self.next_key;
        let mut next = self.clone();
        next.next_key += 1;
        next.sessions.insert(
            key,
            Arc::new(DetailSession {
                key,
                indices,
                window,
                context,
                open: true,
                state: DetailState::Loading,
            }),
        );
        (next, key)
    }

    /// Removes a session. Unknown keys are ignored.
    #[must_use]
    pub fn close(&self, key: SessionKey) -> Self {
        let mut next = self.clone();
        next.sessions.remove(&key);
        next
    }

    #[must_use]
    pub fn clear_all(&self) -> Self {
        Self {
            next_key: self.next_key,
            sessions: BTreeMap::new(),
        }
    }

    /// Flips visibility, keeping any fetched image.
    #[must_use]
    pub fn toggle_open(&self, key: SessionKey) -> Self {
        self.with_session(key, |s| s.open = !s.open)
    }

    /// Records the outcome of a session's own fetch. Late results for removed sessions are dropped.
    #[must_use]
    pub fn complete(&self, key: SessionKey, outcome: Result<RenderedImage, VizError>) -> Self {
        self.with_session(key, move |s| {
            s.state = match outcome {
                Ok(image) => DetailState::Ready(image),
                Err(e) => DetailState::Failed(e),
            };
        })
    }

    fn with_session(&self, key: SessionKey, f: impl FnOnce(&mut DetailSession)) -> Self {
        let mut next = self.clone();
        if let Some(session) = next.sessions.get_mut(&key) {
            f(Arc::make_mut(session));
        }
        next
    }

    pub fn get(&self, key: SessionKey) -> Option<&DetailSession> {
        self.sessions.get(&key).map(Arc::as_ref)
    }

    pub fn contains(&self, key: SessionKey) -> bool {
        self.sessions.contains_key(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DetailSession> + '_ {
        self.sessions.values().map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn open_count(&self) -> usize {
        self.iter().filter(|s| s.open).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> PercentileWindow {
        PercentileWindow::new(0.25, 0.5)
    }

    #[test]
    fn snapshots_are_independent() {
        let empty = SessionRegistry::new();
        let (one, key) = empty.open(vec![4], window(), DetailContext::default());
        assert!(empty.is_empty());
        assert_eq!(one.len(), 1);
        let hidden = one.toggle_open(key);
        assert!(one.get(key).unwrap().open);
        assert!(!hidden.get(key).unwrap().open);
    }

    #[test]
    fn keys_stay_monotonic_after_clear() {
        let (reg, a) = SessionRegistry::new().open(vec![1], window(), DetailContext::default());
        let (reg, b) = reg.clear_all().open(vec![2], window(), DetailContext::default());
        assert!(b > a);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn title_lists_indices() {
        let (reg, key) =
            SessionRegistry::new().open(vec![4, 9], window(), DetailContext::default());
        assert_eq!(reg.get(key).unwrap().title(), "2: [4, 9]");
    }
}
