//! Tab manager: create, rename, remove and switch dashboard tabs.

use crate::common::slug::unique_slug;
use crate::dashboard::layout::{DashboardState, DashboardTab, PlacedWidget};

/// Name given to a tab created without one. The number is the tab's position
/// at creation time and may repeat after deletions.
pub fn default_tab_name(state: &DashboardState) -> String {
    format!("Dashboard {}", state.tabs().len() + 1)
}

/// Id derived from `name` that no existing tab uses.
pub fn unique_tab_id(state: &DashboardState, name: &str) -> String {
    unique_slug(name, "tab", |candidate| state.tab(candidate).is_some())
}

/// Create a tab and make it active. Blank names fall back to
/// [`default_tab_name`].
pub fn create_tab(state: &DashboardState, name: Option<&str>) -> DashboardState {
    create_tab_with_layout(state, name, Vec::new())
}

pub(crate) fn create_tab_with_layout(
    state: &DashboardState,
    name: Option<&str>,
    layout: Vec<PlacedWidget>,
) -> DashboardState {
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| default_tab_name(state));
    let id = unique_tab_id(state, &name);
    let mut next = state.clone();
    next.push_tab(DashboardTab::new(&id, &name).with_layout(layout));
    next
}

pub fn rename_tab(state: &DashboardState, tab_id: &str, name: &str) -> Option<DashboardState> {
    let name = name.trim();
    if name.is_empty() {
        tracing::debug!(tab = %tab_id, "refusing to rename tab to an empty name");
        return None;
    }
    let mut next = state.clone();
    let tab = next.tab_mut(tab_id)?;
    if tab.name == name {
        return None;
    }
    tab.name = name.to_string();
    Some(next)
}

/// Remove a tab. The last remaining tab cannot be removed.
pub fn remove_tab(state: &DashboardState, tab_id: &str) -> Option<DashboardState> {
    let mut next = state.clone();
    if !next.remove_tab(tab_id) {
        tracing::debug!(tab = %tab_id, tabs = state.tabs().len(), "tab removal rejected");
        return None;
    }
    Some(next)
}

pub fn set_active_tab(state: &DashboardState, tab_id: &str) -> Option<DashboardState> {
    if state.active_tab_id() == tab_id {
        return None;
    }
    let mut next = state.clone();
    if !next.set_active(tab_id) {
        tracing::debug!(tab = %tab_id, "cannot activate unknown tab");
        return None;
    }
    Some(next)
}

pub fn set_tab_pinned(state: &DashboardState, tab_id: &str, pinned: bool) -> Option<DashboardState> {
    let mut next = state.clone();
    let tab = next.tab_mut(tab_id)?;
    if tab.pinned == pinned {
        return None;
    }
    tab.pinned = pinned;
    Some(next)
}
