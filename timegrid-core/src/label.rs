//! Labels and their note tabs.

use crate::{LabelError, LabelId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Built-in tab holding the label's global notes.
pub const GLOBAL_TAB: &str = "global";
/// Built-in tab showing the note of the selected grid instance.
pub const INSTANCE_TAB: &str = "instance";
/// Prefix of user-created tab ids.
pub const CUSTOM_TAB_PREFIX: &str = "tab-";

/// User-created rich-text tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomTab {
    pub id: String,
    pub title: String,
    pub content: String,
}

/// Named, colored category painted onto the grid.
///
/// Labels are owned outside the schedule; blocks only hold a weak reference
/// through [`LabelId`]. Note content is opaque markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: LabelId,
    pub name: String,
    pub color: String,
    pub notes: String,
    /// Visible tab ids, in display order.
    pub open_tabs: Vec<String>,
    /// Closed tabs that can still be restored.
    pub trashed_tabs: Vec<String>,
    pub custom_tabs: BTreeMap<String, CustomTab>,
}

impl Label {
    /// Create a label with a generated id and the default tab set.
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self::with_id(LabelId::generate(), name, color)
    }

    pub fn with_id(id: LabelId, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: color.into(),
            notes: String::new(),
            open_tabs: vec![GLOBAL_TAB.to_string(), INSTANCE_TAB.to_string()],
            trashed_tabs: Vec::new(),
            custom_tabs: BTreeMap::new(),
        }
    }

    /// Open plus trashed tabs; the quantity bounded by the tab limit.
    pub fn tab_count(&self) -> usize {
        self.open_tabs.len() + self.trashed_tabs.len()
    }

    /// Open a new custom tab. Returns its id.
    pub fn add_tab(&mut self, max_tabs: usize) -> Result<String, LabelError> {
        if self.tab_count() >= max_tabs {
            return Err(LabelError::TabLimitReached {
                label_id: self.id.to_string(),
                max: max_tabs,
            });
        }
        let tab_id = format!("{}{}", CUSTOM_TAB_PREFIX, Uuid::now_v7());
        let tab = CustomTab {
            id: tab_id.clone(),
            title: format!("Note {}", self.custom_tabs.len() + 1),
            content: String::new(),
        };
        self.open_tabs.push(tab_id.clone());
        self.custom_tabs.insert(tab_id.clone(), tab);
        Ok(tab_id)
    }

    /// Move an open tab to the trash.
    pub fn close_tab(&mut self, tab_id: &str) -> Result<(), LabelError> {
        let pos = self.position_in(&self.open_tabs, tab_id)?;
        let tab = self.open_tabs.remove(pos);
        self.trashed_tabs.push(tab);
        Ok(())
    }

    /// Move a trashed tab back to the end of the open tabs.
    pub fn restore_tab(&mut self, tab_id: &str) -> Result<(), LabelError> {
        let pos = self.position_in(&self.trashed_tabs, tab_id)?;
        let tab = self.trashed_tabs.remove(pos);
        self.open_tabs.push(tab);
        Ok(())
    }

    /// Drop a trashed tab for good. Custom content is discarded with it.
    pub fn delete_tab_forever(&mut self, tab_id: &str) -> Result<(), LabelError> {
        let pos = self.position_in(&self.trashed_tabs, tab_id)?;
        self.trashed_tabs.remove(pos);
        if tab_id.starts_with(CUSTOM_TAB_PREFIX) {
            self.custom_tabs.remove(tab_id);
        }
        Ok(())
    }

    pub fn update_custom_tab(&mut self, tab_id: &str, content: impl Into<String>) -> Result<(), LabelError> {
        let tab = self
            .custom_tabs
            .get_mut(tab_id)
            .ok_or_else(|| tab_not_found(&self.id, tab_id))?;
        tab.content = content.into();
        Ok(())
    }

    /// Replace the open tab order. The new order must hold exactly the
    /// currently open tabs.
    pub fn reorder_tabs(&mut self, new_order: Vec<String>) -> Result<(), LabelError> {
        let mut current = self.open_tabs.clone();
        let mut proposed = new_order.clone();
        current.sort();
        proposed.sort();
        if current != proposed {
            return Err(LabelError::InvalidTabOrder {
                label_id: self.id.to_string(),
            });
        }
        self.open_tabs = new_order;
        Ok(())
    }

    fn position_in(&self, tabs: &[String], tab_id: &str) -> Result<usize, LabelError> {
        tabs.iter()
            .position(|t| t == tab_id)
            .ok_or_else(|| tab_not_found(&self.id, tab_id))
    }
}

fn tab_not_found(label_id: &LabelId, tab_id: &str) -> LabelError {
    LabelError::TabNotFound {
        label_id: label_id.to_string(),
        tab_id: tab_id.to_string(),
    }
}
