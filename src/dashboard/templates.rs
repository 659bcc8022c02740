use crate::common::slug::unique_slug;
use crate::dashboard::layout::{sanitize_layout, DashboardState, DashboardTab, PlacedWidget};
use crate::dashboard::tabs::create_tab_with_layout;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Template that clears the active tab when applied to it.
pub const BLANK_TEMPLATE_ID: &str = "blank";

/// A reusable layout blueprint. Widget ids in `layout` are widget type ids so
/// merging can skip widgets a tab already has.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub layout: Vec<PlacedWidget>,
}

impl Template {
    pub fn new(id: &str, name: &str, description: &str, layout: Vec<PlacedWidget>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            layout,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplyMode {
    /// Open the template as a new, active tab.
    NewTab,
    /// Merge the template into the active tab.
    CurrentTab,
}

fn w(id: &str, x: u32, y: u32, w: u32, h: u32) -> PlacedWidget {
    PlacedWidget::new(id, x, y, w, h)
}

/// Ordered set of templates keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateLibrary {
    templates: Vec<Template>,
}

impl TemplateLibrary {
    pub fn with_defaults() -> Self {
        Self::from_templates(vec![
            Template::new(
                BLANK_TEMPLATE_ID,
                "Blank",
                "Start from an empty grid.",
                Vec::new(),
            ),
            Template::new(
                "agency-overview",
                "Agency Overview",
                "Headline numbers, live campaigns and what needs attention today.",
                vec![
                    w("quick-stats", 0, 0, 3, 1),
                    w("recent-activity", 3, 0, 4, 1),
                    w("upcoming-deadlines", 7, 0, 4, 1),
                    w("active-campaigns", 0, 1, 6, 2),
                    w("pending-approvals", 6, 1, 4, 2),
                ],
            ),
            Template::new(
                "campaign-manager",
                "Campaign Manager",
                "Campaign pipeline, performance and content schedule.",
                vec![
                    w("active-campaigns", 0, 0, 6, 2),
                    w("campaign-performance", 6, 0, 6, 2),
                    w("campaign-timeline", 0, 2, 12, 1),
                    w("content-calendar", 0, 3, 8, 2),
                    w("pending-approvals", 8, 3, 4, 2),
                ],
            ),
            Template::new(
                "influencer-focus",
                "Influencer Focus",
                "Roster health, top performers and audience reach.",
                vec![
                    w("top-influencers", 0, 0, 4, 2),
                    w("influencer-roster", 4, 0, 8, 2),
                    w("audience-demographics", 0, 2, 6, 2),
                    w("contract-status", 6, 2, 4, 1),
                ],
            ),
            Template::new(
                "finance",
                "Finance",
                "Revenue, invoices and contract value.",
                vec![
                    w("revenue-chart", 0, 0, 6, 2),
                    w("outstanding-invoices", 6, 0, 6, 2),
                    w("contract-status", 0, 2, 4, 1),
                    w("client-list", 4, 2, 4, 1),
                ],
            ),
        ])
    }

    /// Build a library, dropping templates with repeated or empty ids and
    /// unplaceable widgets.
    pub fn from_templates(templates: Vec<Template>) -> Self {
        let mut library = Self::default();
        let mut seen = HashSet::new();
        for mut template in templates {
            if template.id.trim().is_empty() {
                tracing::warn!(name = %template.name, "template without an id dropped");
                continue;
            }
            if !seen.insert(template.id.clone()) {
                tracing::warn!(template = %template.id, "duplicate template dropped");
                continue;
            }
            for warning in sanitize_layout(&mut template.layout, &template.id) {
                tracing::warn!("{warning}");
            }
            library.templates.push(template);
        }
        library
    }

    /// Parse a JSON array of templates.
    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let templates: Vec<Template> =
            serde_json::from_str(content).context("parse dashboard templates")?;
        Ok(Self::from_templates(templates))
    }

    /// Built-in templates overlaid with the ones stored at `path`. A file
    /// template with a built-in id replaces the built-in one.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let mut library = Self::with_defaults();
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(library);
        }
        let user = Self::from_json(&content)
            .with_context(|| format!("load templates from {}", path.display()))?;
        for template in user.templates {
            library.upsert(template);
        }
        Ok(library)
    }

    /// Write the templates that are not built in, or differ from the built-in
    /// version, to `path`.
    pub fn save_user(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let builtin = Self::with_defaults();
        let user: Vec<&Template> = self
            .templates
            .iter()
            .filter(|t| builtin.get(&t.id) != Some(*t))
            .collect();
        let json = serde_json::to_string_pretty(&user)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("write templates file {}", path.display()))
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn list(&self) -> &[Template] {
        &self.templates
    }

    pub fn upsert(&mut self, mut template: Template) {
        for warning in sanitize_layout(&mut template.layout, &template.id) {
            tracing::warn!("{warning}");
        }
        if let Some(existing) = self.templates.iter_mut().find(|t| t.id == template.id) {
            *existing = template;
        } else {
            self.templates.push(template);
        }
    }

    /// Remove a template. The blank template always stays.
    pub fn remove(&mut self, id: &str) -> bool {
        if id == BLANK_TEMPLATE_ID {
            return false;
        }
        let before = self.templates.len();
        self.templates.retain(|t| t.id != id);
        before != self.templates.len()
    }

    /// Snapshot `tab` as a template named `name`, with an id unique in this
    /// library.
    pub fn template_from_tab(&self, tab: &DashboardTab, name: &str) -> Option<Template> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let id = unique_slug(name, "template", |candidate| self.get(candidate).is_some());
        let description = format!("Saved from tab '{}'", tab.name);
        Some(Template::new(&id, name, &description, tab.layout.clone()))
    }
}

/// Append the widgets of `blueprint` whose ids `current` does not already
/// contain.
pub fn merge_layout(current: &[PlacedWidget], blueprint: &[PlacedWidget]) -> Vec<PlacedWidget> {
    let mut ids: HashSet<&str> = current.iter().map(|w| w.id.as_str()).collect();
    let mut merged = current.to_vec();
    for widget in blueprint {
        if ids.insert(widget.id.as_str()) {
            merged.push(widget.clone());
        }
    }
    merged
}

/// Apply template `template_id` to `state`.
///
/// Returns `None` when the template is unknown or applying it would not change
/// anything.
pub fn apply_template(
    state: &DashboardState,
    library: &TemplateLibrary,
    template_id: &str,
    mode: ApplyMode,
) -> Option<DashboardState> {
    let Some(template) = library.get(template_id) else {
        tracing::debug!(template = %template_id, "unknown template");
        return None;
    };
    match mode {
        ApplyMode::NewTab => Some(create_tab_with_layout(
            state,
            Some(&template.name),
            template.layout.clone(),
        )),
        ApplyMode::CurrentTab => {
            let current = &state.active_tab().layout;
            let layout = if template.id == BLANK_TEMPLATE_ID {
                Vec::new()
            } else {
                merge_layout(current, &template.layout)
            };
            if &layout == current {
                return None;
            }
            let mut next = state.clone();
            next.active_tab_mut().layout = layout;
            Some(next)
        }
    }
}
