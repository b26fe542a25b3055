//! Session data structure

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use veil_tabs::{TabContext, ViewId};

use crate::error::SessionError;
use crate::Result;

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    /// Unique identifier
    pub id: String,
    /// Loads in an incognito session are not recorded in history
    pub incognito: bool,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// Open tabs, in display order
    tabs: Vec<TabContext>,
    /// Index into `tabs`; `None` only while the session is empty
    active: Option<usize>,
}

impl Session {
    pub fn new(incognito: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            incognito,
            created_at: Utc::now(),
            tabs: Vec::new(),
            active: None,
        }
    }

    /// Append a tab and make it active
    pub fn push_tab(&mut self, tab: TabContext) -> usize {
        self.tabs.push(tab);
        let index = self.tabs.len() - 1;
        self.active = Some(index);
        index
    }

    /// Remove the tab at `index`, keeping at least one tab open.
    ///
    /// If the active tab is removed the preceding tab becomes active (the
    /// new first tab if it was first). Removing a tab before the active one
    /// keeps the same tab active.
    pub fn remove_tab(&mut self, index: usize) -> Result<TabContext> {
        let active = self.active.ok_or(SessionError::NoActiveTab)?;
        self.check_index(index)?;
        if self.tabs.len() == 1 {
            return Err(SessionError::LastTab);
        }

        let tab = self.tabs.remove(index);

        self.active = Some(if index == active {
            index.saturating_sub(1)
        } else if index < active {
            active - 1
        } else {
            active
        });

        Ok(tab)
    }

    /// Remove every tab, leaving the session empty
    pub fn drain_tabs(&mut self) -> Vec<TabContext> {
        self.active = None;
        std::mem::take(&mut self.tabs)
    }

    pub fn set_active(&mut self, index: usize) -> Result<()> {
        if self.active.is_none() {
            return Err(SessionError::NoActiveTab);
        }
        self.check_index(index)?;
        self.active = Some(index);
        Ok(())
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_tab(&self) -> Option<&TabContext> {
        self.active.and_then(|index| self.tabs.get(index))
    }

    pub fn tab(&self, index: usize) -> Option<&TabContext> {
        self.tabs.get(index)
    }

    pub fn tab_mut(&mut self, index: usize) -> Result<&mut TabContext> {
        self.check_index(index)?;
        Ok(&mut self.tabs[index])
    }

    /// Position of the tab shown in `view`
    pub fn position_of_view(&self, view: ViewId) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.view == view)
    }

    pub fn tabs(&self) -> &[TabContext] {
        &self.tabs
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.tabs.len() {
            return Err(SessionError::InvalidTabIndex {
                index,
                count: self.tabs.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(count: u64) -> Session {
        let mut session = Session::new(false);
        for n in 0..count {
            session.push_tab(TabContext::new(ViewId(n), format!("tab-{}", n)));
        }
        session
    }

    fn labels(session: &Session) -> Vec<&str> {
        session.tabs().iter().map(|t| t.label.as_str()).collect()
    }

    #[test]
    fn test_new_session() {
        let session = Session::new(true);
        assert!(session.incognito);
        assert!(session.is_empty());
        assert!(session.active_tab().is_none());
    }

    #[test]
    fn test_push_activates_new_tab() {
        let session = session_with(3);
        assert_eq!(session.active_index(), Some(2));
        assert_eq!(session.active_tab().unwrap().label, "tab-2");
    }

    #[test]
    fn test_remove_active_tab_activates_preceding() {
        let mut session = session_with(3);
        session.set_active(1).unwrap();

        let removed = session.remove_tab(1).unwrap();
        assert_eq!(removed.label, "tab-1");
        assert_eq!(session.active_tab().unwrap().label, "tab-0");
    }

    #[test]
    fn test_remove_first_active_tab() {
        let mut session = session_with(3);
        session.set_active(0).unwrap();

        session.remove_tab(0).unwrap();
        assert_eq!(session.active_index(), Some(0));
        assert_eq!(session.active_tab().unwrap().label, "tab-1");
    }

    #[test]
    fn test_remove_tab_before_active_keeps_focus() {
        let mut session = session_with(3);
        assert_eq!(session.active_tab().unwrap().label, "tab-2");

        session.remove_tab(0).unwrap();
        assert_eq!(labels(&session), vec!["tab-1", "tab-2"]);
        assert_eq!(session.active_tab().unwrap().label, "tab-2");
    }

    #[test]
    fn test_remove_tab_after_active() {
        let mut session = session_with(3);
        session.set_active(0).unwrap();

        session.remove_tab(2).unwrap();
        assert_eq!(session.active_tab().unwrap().label, "tab-0");
    }

    #[test]
    fn test_last_tab_cannot_be_removed() {
        let mut session = session_with(1);
        assert!(matches!(session.remove_tab(0), Err(SessionError::LastTab)));
        assert_eq!(session.tab_count(), 1);
    }

    #[test]
    fn test_invalid_index() {
        let mut session = session_with(2);
        assert!(matches!(
            session.remove_tab(5),
            Err(SessionError::InvalidTabIndex { index: 5, count: 2 })
        ));
        assert!(session.set_active(2).is_err());

        let mut empty = Session::new(false);
        assert!(matches!(empty.remove_tab(0), Err(SessionError::NoActiveTab)));
    }

    #[test]
    fn test_position_of_view() {
        let session = session_with(3);
        assert_eq!(session.position_of_view(ViewId(1)), Some(1));
        assert_eq!(session.position_of_view(ViewId(9)), None);
    }
}
