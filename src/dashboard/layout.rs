use crate::dashboard::grid::{fits, rows_fit};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Id of the tab present in a fresh dashboard.
pub const DEFAULT_TAB_ID: &str = "main";
/// Name of the tab present in a fresh dashboard.
pub const DEFAULT_TAB_NAME: &str = "Agency Dashboard";

fn default_span() -> u32 {
    1
}

/// One widget instance placed on a tab's grid.
///
/// `id` is the instance identity used for drag tracking and removal. It equals
/// the widget type id, so a tab holds at most one instance of each widget type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlacedWidget {
    pub id: String,
    pub widget_id: String,
    #[serde(default)]
    pub x: u32,
    #[serde(default)]
    pub y: u32,
    #[serde(default = "default_span")]
    pub w: u32,
    #[serde(default = "default_span")]
    pub h: u32,
}

impl PlacedWidget {
    pub fn new(widget_id: &str, x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            id: widget_id.to_string(),
            widget_id: widget_id.to_string(),
            x,
            y,
            w,
            h,
        }
    }

    /// Inside the 12 columns, on an addressable row.
    pub fn in_bounds(&self) -> bool {
        fits(self.x, self.w, self.h) && rows_fit(self.y, self.h)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTab {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub layout: Vec<PlacedWidget>,
    #[serde(default)]
    pub pinned: bool,
}

impl DashboardTab {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            layout: Vec::new(),
            pinned: false,
        }
    }

    pub fn with_layout(mut self, layout: Vec<PlacedWidget>) -> Self {
        self.layout = layout;
        self
    }

    pub fn widget(&self, id: &str) -> Option<&PlacedWidget> {
        self.layout.iter().find(|w| w.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.widget(id).is_some()
    }
}

/// All dashboard tabs plus the active selection.
///
/// The tab list is never empty and `active_tab_id` always names one of its
/// tabs. Values only leave this module through [`DashboardState::sanitize`] or
/// the commands in the sibling modules, which keep both invariants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", from = "RawDashboardState")]
pub struct DashboardState {
    tabs: Vec<DashboardTab>,
    active_tab_id: String,
}

/// Wire form of [`DashboardState`]; decoded values are sanitized on the way in.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDashboardState {
    tabs: Vec<DashboardTab>,
    #[serde(default)]
    active_tab_id: String,
}

impl From<RawDashboardState> for DashboardState {
    fn from(raw: RawDashboardState) -> Self {
        Self::from_tabs(raw.tabs, &raw.active_tab_id)
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::with_default_tab(DEFAULT_TAB_NAME)
    }
}

impl DashboardState {
    /// A single empty tab called `name`.
    pub fn with_default_tab(name: &str) -> Self {
        let name = if name.trim().is_empty() {
            DEFAULT_TAB_NAME
        } else {
            name.trim()
        };
        Self {
            tabs: vec![DashboardTab::new(DEFAULT_TAB_ID, name)],
            active_tab_id: DEFAULT_TAB_ID.to_string(),
        }
    }

    /// Build a state from raw parts, repairing anything that breaks the
    /// invariants. Repairs are logged.
    pub fn from_tabs(tabs: Vec<DashboardTab>, active_tab_id: &str) -> Self {
        let (state, warnings) = Self {
            tabs,
            active_tab_id: active_tab_id.to_string(),
        }
        .sanitize();
        for w in warnings {
            tracing::warn!("{w}");
        }
        state
    }

    pub fn tabs(&self) -> &[DashboardTab] {
        &self.tabs
    }

    pub fn active_tab_id(&self) -> &str {
        &self.active_tab_id
    }

    pub fn tab(&self, id: &str) -> Option<&DashboardTab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    pub fn active_tab(&self) -> &DashboardTab {
        // Invariant: active_tab_id always names an existing tab.
        self.tab(&self.active_tab_id).unwrap_or(&self.tabs[0])
    }

    pub(crate) fn tab_mut(&mut self, id: &str) -> Option<&mut DashboardTab> {
        self.tabs.iter_mut().find(|t| t.id == id)
    }

    pub(crate) fn active_tab_mut(&mut self) -> &mut DashboardTab {
        let idx = self
            .tabs
            .iter()
            .position(|t| t.id == self.active_tab_id)
            .unwrap_or(0);
        &mut self.tabs[idx]
    }

    pub(crate) fn push_tab(&mut self, tab: DashboardTab) {
        self.active_tab_id = tab.id.clone();
        self.tabs.push(tab);
    }

    /// Remove a tab unless it is the last one, moving activation to the first
    /// remaining tab when the active tab goes away.
    pub(crate) fn remove_tab(&mut self, id: &str) -> bool {
        if self.tabs.len() <= 1 {
            return false;
        }
        let Some(idx) = self.tabs.iter().position(|t| t.id == id) else {
            return false;
        };
        self.tabs.remove(idx);
        if self.active_tab_id == id {
            self.active_tab_id = self.tabs[0].id.clone();
        }
        true
    }

    pub(crate) fn set_active(&mut self, id: &str) -> bool {
        if self.tab(id).is_none() {
            return false;
        }
        self.active_tab_id = id.to_string();
        true
    }

    /// Drop invalid tabs and widgets and repair the active selection.
    /// Returns the repaired state along with a description of every repair.
    pub fn sanitize(mut self) -> (Self, Vec<String>) {
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();
        self.tabs.retain(|tab| {
            if tab.id.trim().is_empty() {
                warnings.push(format!("tab '{}' without an id dropped", tab.name));
                return false;
            }
            if !seen.insert(tab.id.clone()) {
                warnings.push(format!("duplicate tab '{}' dropped", tab.id));
                return false;
            }
            true
        });
        for tab in &mut self.tabs {
            if tab.name.trim().is_empty() {
                warnings.push(format!("tab '{}' had an empty name", tab.id));
                tab.name = tab.id.clone();
            }
            warnings.extend(sanitize_layout(&mut tab.layout, &tab.id));
        }
        if self.tabs.is_empty() {
            warnings.push("dashboard has no tabs; default tab created".into());
            self.tabs.push(DashboardTab::new(DEFAULT_TAB_ID, DEFAULT_TAB_NAME));
        }
        if self.tab(&self.active_tab_id).is_none() {
            warnings.push(format!(
                "active tab '{}' does not exist; '{}' activated",
                self.active_tab_id, self.tabs[0].id
            ));
            self.active_tab_id = self.tabs[0].id.clone();
        }
        (self, warnings)
    }
}

/// Remove widgets that cannot be placed: empty ids, spans that leave the grid,
/// and repeated instance ids (the first occurrence wins).
pub fn sanitize_layout(layout: &mut Vec<PlacedWidget>, owner: &str) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut seen = HashSet::new();
    layout.retain(|widget| {
        if widget.id.is_empty() || widget.widget_id.is_empty() {
            warnings.push(format!("'{owner}': widget without an id dropped"));
            return false;
        }
        if !widget.in_bounds() {
            warnings.push(format!(
                "'{owner}': widget '{}' at ({}, {}) with span {}x{} is outside the grid and was dropped",
                widget.id, widget.x, widget.y, widget.w, widget.h
            ));
            return false;
        }
        if !seen.insert(widget.id.clone()) {
            warnings.push(format!("'{owner}': duplicate widget '{}' dropped", widget.id));
            return false;
        }
        true
    });
    warnings
}
