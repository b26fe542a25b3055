//! Test doubles

use parking_lot::Mutex;
use std::collections::HashMap;

use crate::renderer::{Renderer, ViewId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RendererCall {
    CreateView(ViewId),
    Navigate(ViewId, String),
    Back(ViewId),
    Forward(ViewId),
    Reload(ViewId),
    Release(ViewId),
}

/// Renderer that loads nothing and records what it was asked to do
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    next_view: Mutex<u64>,
    calls: Mutex<Vec<RendererCall>>,
    urls: Mutex<HashMap<ViewId, String>>,
}

impl RecordingRenderer {
    pub fn calls(&self) -> Vec<RendererCall> {
        self.calls.lock().clone()
    }

    pub fn navigations(&self) -> Vec<(ViewId, String)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                RendererCall::Navigate(view, url) => Some((*view, url.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn released(&self) -> Vec<ViewId> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                RendererCall::Release(view) => Some(*view),
                _ => None,
            })
            .collect()
    }

    /// Pretend the view ended up somewhere else (e.g. after going back)
    pub fn set_current_url(&self, view: ViewId, url: &str) {
        self.urls.lock().insert(view, url.to_string());
    }
}

impl Renderer for RecordingRenderer {
    fn create_view(&self) -> ViewId {
        let mut next = self.next_view.lock();
        *next += 1;
        let view = ViewId(*next);
        self.calls.lock().push(RendererCall::CreateView(view));
        view
    }

    fn navigate(&self, view: ViewId, url: &str) {
        self.urls.lock().insert(view, url.to_string());
        self.calls
            .lock()
            .push(RendererCall::Navigate(view, url.to_string()));
    }

    fn back(&self, view: ViewId) {
        self.calls.lock().push(RendererCall::Back(view));
    }

    fn forward(&self, view: ViewId) {
        self.calls.lock().push(RendererCall::Forward(view));
    }

    fn reload(&self, view: ViewId) {
        self.calls.lock().push(RendererCall::Reload(view));
    }

    fn current_url(&self, view: ViewId) -> Option<String> {
        self.urls.lock().get(&view).cloned()
    }

    fn release(&self, view: ViewId) {
        self.urls.lock().remove(&view);
        self.calls.lock().push(RendererCall::Release(view));
    }
}
