use crate::dashboard::grid::GRID_COLUMNS;
use crate::dashboard::layout::PlacedWidget;
use hashlink::LinkedHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_span() -> u32 {
    4
}

/// Catalog metadata for one widget type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WidgetDescriptor {
    pub id: String,
    pub title: String,
    pub category: String,
    /// Column width a freshly added widget takes (1–12).
    pub default_span: u32,
}

impl WidgetDescriptor {
    pub fn new(id: &str, title: &str, category: &str, default_span: u32) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            category: category.to_string(),
            default_span,
        }
    }
}

/// Catalog file entry; the widget id is the object key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogEntry {
    title: String,
    #[serde(default)]
    category: String,
    #[serde(default = "default_span")]
    default_span: u32,
}

/// Outcome of resolving a placed widget against the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind<'a> {
    Known(&'a WidgetDescriptor),
    /// The widget type is not (or no longer) in the catalog. Renderers skip it.
    Unknown(&'a str),
}

impl<'a> WidgetKind<'a> {
    pub fn descriptor(&self) -> Option<&'a WidgetDescriptor> {
        match self {
            WidgetKind::Known(descriptor) => Some(descriptor),
            WidgetKind::Unknown(_) => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, WidgetKind::Known(_))
    }
}

/// Read-only registry of widget types, kept in registration order.
#[derive(Debug, Clone, Default)]
pub struct WidgetCatalog {
    map: LinkedHashMap<String, WidgetDescriptor>,
}

impl WidgetCatalog {
    pub fn with_defaults() -> Self {
        let mut catalog = Self::default();
        for (id, title, category, span) in [
            ("quick-stats", "Quick Stats", "Overview", 3),
            ("recent-activity", "Recent Activity", "Overview", 4),
            ("upcoming-deadlines", "Upcoming Deadlines", "Overview", 4),
            ("active-campaigns", "Active Campaigns", "Campaigns", 6),
            ("campaign-performance", "Campaign Performance", "Campaigns", 6),
            ("campaign-timeline", "Campaign Timeline", "Campaigns", 12),
            ("top-influencers", "Top Influencers", "Influencers", 4),
            ("influencer-roster", "Influencer Roster", "Influencers", 8),
            ("audience-demographics", "Audience Demographics", "Influencers", 6),
            ("client-list", "Clients", "Clients", 4),
            ("brand-health", "Brand Health", "Clients", 4),
            ("pending-approvals", "Pending Approvals", "Content", 4),
            ("content-calendar", "Content Calendar", "Content", 8),
            ("contract-status", "Contract Status", "Contracts", 4),
            ("revenue-chart", "Revenue", "Finance", 6),
            ("outstanding-invoices", "Outstanding Invoices", "Finance", 6),
        ] {
            catalog.register(WidgetDescriptor::new(id, title, category, span));
        }
        catalog
    }

    /// Add or replace a widget type. Spans outside 1–12 are clamped.
    pub fn register(&mut self, mut descriptor: WidgetDescriptor) {
        let clamped = descriptor.default_span.clamp(1, GRID_COLUMNS);
        if clamped != descriptor.default_span {
            tracing::warn!(
                widget = %descriptor.id,
                span = descriptor.default_span,
                "widget default span clamped to the grid"
            );
            descriptor.default_span = clamped;
        }
        self.map.insert(descriptor.id.clone(), descriptor);
    }

    pub fn lookup(&self, widget_id: &str) -> Option<&WidgetDescriptor> {
        self.map.get(widget_id)
    }

    pub fn contains(&self, widget_id: &str) -> bool {
        self.map.contains_key(widget_id)
    }

    pub fn resolve<'a>(&'a self, widget: &'a PlacedWidget) -> WidgetKind<'a> {
        match self.lookup(&widget.widget_id) {
            Some(descriptor) => WidgetKind::Known(descriptor),
            None => WidgetKind::Unknown(&widget.widget_id),
        }
    }

    /// Pair each placed widget with its descriptor, skipping widget types the
    /// catalog does not know.
    pub fn renderable<'a>(
        &'a self,
        layout: &'a [PlacedWidget],
    ) -> Vec<(&'a PlacedWidget, &'a WidgetDescriptor)> {
        layout
            .iter()
            .filter_map(|widget| match self.resolve(widget) {
                WidgetKind::Known(descriptor) => Some((widget, descriptor)),
                WidgetKind::Unknown(id) => {
                    tracing::debug!(widget = %id, "skipping widget missing from catalog");
                    None
                }
            })
            .collect()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &WidgetDescriptor> {
        self.map.values()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Categories in order of first appearance.
    pub fn categories(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for descriptor in self.map.values() {
            if !out.contains(&descriptor.category.as_str()) {
                out.push(&descriptor.category);
            }
        }
        out
    }

    pub fn by_category(&self, category: &str) -> Vec<&WidgetDescriptor> {
        self.map
            .values()
            .filter(|d| d.category == category)
            .collect()
    }

    /// Parse a catalog object keyed by widget id.
    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let entries: LinkedHashMap<String, CatalogEntry> = serde_json::from_str(content)?;
        let mut catalog = Self::default();
        for (id, entry) in entries {
            if id.trim().is_empty() {
                tracing::warn!("catalog entry without an id dropped");
                continue;
            }
            catalog.register(WidgetDescriptor {
                id,
                title: entry.title,
                category: entry.category,
                default_span: entry.default_span,
            });
        }
        Ok(catalog)
    }

    /// Load a catalog from disk. A missing or empty file yields the built-in
    /// catalog.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::with_defaults());
        }
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        let entries: LinkedHashMap<&str, CatalogEntry> = self
            .map
            .iter()
            .map(|(id, d)| {
                (
                    id.as_str(),
                    CatalogEntry {
                        title: d.title.clone(),
                        category: d.category.clone(),
                        default_span: d.default_span,
                    },
                )
            })
            .collect();
        Ok(serde_json::to_string_pretty(&entries)?)
    }
}
