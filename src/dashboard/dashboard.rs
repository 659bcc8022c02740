use crate::common::config_files::{ensure_config_file, resolve_config_path, ConfigFileSpec};
use crate::dashboard::catalog::{WidgetCatalog, WidgetDescriptor};
use crate::dashboard::drag::DragSession;
use crate::dashboard::grid::{free_cells, rows_used, Cell};
use crate::dashboard::layout::{DashboardState, DashboardTab, PlacedWidget, DEFAULT_TAB_NAME};
use crate::dashboard::store::{load_or_default, DashboardStore, JsonFileStore};
use crate::dashboard::templates::{apply_template, ApplyMode, Template, TemplateLibrary};
use crate::dashboard::{tabs, widgets};
use crate::settings::Settings;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DashboardEvent {
    /// A command changed the state.
    Changed,
    /// The state was re-read from the store.
    Reloaded,
}

pub type EventCallback = Arc<dyn Fn(DashboardEvent) + Send + Sync>;

const USER_TEMPLATES_DEFAULT: &str = "[]\n";

/// Owns the dashboard state and runs every command against it.
///
/// Command methods return `true` when the state changed. A changed state is
/// saved to the store and reported through the event callback; callers then
/// read [`Dashboard::state`] again. Rejected commands change nothing.
pub struct Dashboard {
    catalog: WidgetCatalog,
    templates: TemplateLibrary,
    state: DashboardState,
    store: Box<dyn DashboardStore>,
    drag: Option<DragSession>,
    default_tab_name: String,
    templates_path: Option<PathBuf>,
    event_cb: Option<EventCallback>,
}

impl Dashboard {
    pub fn new(
        catalog: WidgetCatalog,
        templates: TemplateLibrary,
        store: Box<dyn DashboardStore>,
        event_cb: Option<EventCallback>,
    ) -> Self {
        Self::new_with_tab_name(catalog, templates, store, DEFAULT_TAB_NAME, event_cb)
    }

    pub fn new_with_tab_name(
        catalog: WidgetCatalog,
        templates: TemplateLibrary,
        store: Box<dyn DashboardStore>,
        default_tab_name: &str,
        event_cb: Option<EventCallback>,
    ) -> Self {
        let state = load_or_default(store.as_ref(), default_tab_name);
        tracing::debug!(
            tabs = state.tabs().len(),
            active = %state.active_tab_id(),
            "dashboard loaded"
        );
        Self {
            catalog,
            templates,
            state,
            store,
            drag: None,
            default_tab_name: default_tab_name.to_string(),
            templates_path: None,
            event_cb,
        }
    }

    /// Build a dashboard from settings. Companion files are resolved relative
    /// to `settings_path`; the templates file is created on first use and
    /// rewritten whenever a user template is saved or removed.
    pub fn from_settings(
        settings: &Settings,
        settings_path: &Path,
        event_cb: Option<EventCallback>,
    ) -> anyhow::Result<Self> {
        let catalog = match &settings.catalog_file {
            Some(file) => WidgetCatalog::load(resolve_config_path(
                settings_path,
                &ConfigFileSpec::new("catalog", file, ""),
            ))?,
            None => WidgetCatalog::with_defaults(),
        };
        let (templates, templates_path) = match &settings.templates_file {
            Some(file) => {
                let spec = ConfigFileSpec::new("templates", file, USER_TEMPLATES_DEFAULT);
                let file = ensure_config_file(settings_path, &spec)?;
                let path = file.path().to_path_buf();
                (TemplateLibrary::load(&path)?, Some(path))
            }
            None => (TemplateLibrary::with_defaults(), None),
        };
        let store_path = resolve_config_path(
            settings_path,
            &ConfigFileSpec::new("dashboard", &settings.dashboard_file, ""),
        );
        let mut dashboard = Self::new_with_tab_name(
            catalog,
            templates,
            Box::new(JsonFileStore::new(store_path)),
            &settings.default_tab_name,
            event_cb,
        );
        dashboard.templates_path = templates_path;
        Ok(dashboard)
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn active_tab(&self) -> &DashboardTab {
        self.state.active_tab()
    }

    pub fn catalog(&self) -> &WidgetCatalog {
        &self.catalog
    }

    pub fn templates(&self) -> &TemplateLibrary {
        &self.templates
    }

    /// Widgets of the active tab that the catalog can render, in layout
    /// order. While dragging, the dragged widget is at its transient position.
    pub fn renderable_widgets(&self) -> Vec<(PlacedWidget, &WidgetDescriptor)> {
        let layout = match &self.drag {
            Some(drag) => drag.preview(&self.state),
            None => self.state.active_tab().layout.clone(),
        };
        layout
            .into_iter()
            .filter_map(|widget| {
                let descriptor = self.catalog.lookup(&widget.widget_id)?;
                Some((widget, descriptor))
            })
            .collect()
    }

    /// Free cells of the active tab within `rows`, for drawing drop targets
    /// over the visible part of the grid.
    pub fn drop_targets(&self, rows: Range<u32>) -> Vec<Cell> {
        free_cells(&self.state.active_tab().layout, rows)
    }

    /// Rows the active tab covers.
    pub fn rows_used(&self) -> u32 {
        rows_used(&self.state.active_tab().layout)
    }

    pub fn add_widget(&mut self, widget_id: &str) -> bool {
        if self.layout_locked("add_widget") {
            return false;
        }
        let next = widgets::add_widget(&self.state, &self.catalog, widget_id);
        self.commit(next, "add_widget")
    }

    pub fn add_widget_at(&mut self, widget_id: &str, x: i32, y: i32) -> bool {
        if self.layout_locked("add_widget_at") {
            return false;
        }
        let next = widgets::add_widget_at(&self.state, &self.catalog, widget_id, x, y);
        self.commit(next, "add_widget_at")
    }

    pub fn remove_widget(&mut self, id: &str) -> bool {
        if self.layout_locked("remove_widget") {
            return false;
        }
        let next = widgets::remove_widget(&self.state, id);
        self.commit(next, "remove_widget")
    }

    pub fn move_widget(&mut self, id: &str, x: i32, y: i32) -> bool {
        if self.layout_locked("move_widget") {
            return false;
        }
        let next = widgets::move_widget(&self.state, id, x, y);
        self.commit(next, "move_widget")
    }

    pub fn resize_widget(&mut self, id: &str, w: u32, h: u32) -> bool {
        if self.layout_locked("resize_widget") {
            return false;
        }
        let next = widgets::resize_widget(&self.state, id, w, h);
        self.commit(next, "resize_widget")
    }

    pub fn create_tab(&mut self, name: Option<&str>) -> bool {
        self.cancel_drag();
        let next = tabs::create_tab(&self.state, name);
        self.commit(Some(next), "create_tab")
    }

    pub fn rename_tab(&mut self, tab_id: &str, name: &str) -> bool {
        let next = tabs::rename_tab(&self.state, tab_id, name);
        self.commit(next, "rename_tab")
    }

    pub fn remove_tab(&mut self, tab_id: &str) -> bool {
        let next = tabs::remove_tab(&self.state, tab_id);
        if next.is_some() && self.drag.as_ref().map(|d| d.tab_id()) == Some(tab_id) {
            self.cancel_drag();
        }
        self.commit(next, "remove_tab")
    }

    pub fn set_active_tab(&mut self, tab_id: &str) -> bool {
        let next = tabs::set_active_tab(&self.state, tab_id);
        if next.is_some() {
            self.cancel_drag();
        }
        self.commit(next, "set_active_tab")
    }

    pub fn set_tab_pinned(&mut self, tab_id: &str, pinned: bool) -> bool {
        let next = tabs::set_tab_pinned(&self.state, tab_id, pinned);
        self.commit(next, "set_tab_pinned")
    }

    /// Apply a template. Opening it as a new tab cancels a drag like
    /// [`Dashboard::create_tab`]; merging into the active tab is refused
    /// while one is active.
    pub fn apply_template(&mut self, template_id: &str, mode: ApplyMode) -> bool {
        if mode == ApplyMode::CurrentTab && self.layout_locked("apply_template") {
            return false;
        }
        let next = apply_template(&self.state, &self.templates, template_id, mode);
        if next.is_some() {
            self.cancel_drag();
        }
        self.commit(next, "apply_template")
    }

    /// Add the active tab's layout to the template library under `name`.
    /// Returns the new template.
    pub fn save_active_tab_as_template(&mut self, name: &str) -> Option<&Template> {
        let template = self
            .templates
            .template_from_tab(self.state.active_tab(), name)?;
        let id = template.id.clone();
        tracing::info!(template = %id, "saved tab as template");
        self.templates.upsert(template);
        self.persist_templates();
        self.templates.get(&id)
    }

    pub fn remove_template(&mut self, template_id: &str) -> bool {
        if !self.templates.remove(template_id) {
            return false;
        }
        self.persist_templates();
        true
    }

    pub fn begin_drag(&mut self, widget_id: &str) -> bool {
        if self.drag.is_some() {
            tracing::debug!(widget = %widget_id, "drag already in progress");
            return false;
        }
        self.drag = DragSession::start(&self.state, widget_id);
        self.drag.is_some()
    }

    pub fn update_drag(&mut self, x: i32, y: i32) -> bool {
        match &mut self.drag {
            Some(drag) => {
                drag.update(x, y);
                true
            }
            None => false,
        }
    }

    /// End the drag, committing the drop through the move command exactly
    /// once. Returns whether the layout changed.
    pub fn end_drag(&mut self, drop: Option<(i32, i32)>) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        let next = drag.end(&self.state, drop);
        self.commit(next, "end_drag")
    }

    /// Abandon the drag without touching the layout.
    pub fn cancel_drag(&mut self) -> bool {
        self.drag.take().is_some()
    }

    pub fn dragging(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    /// Re-read the state from the store, dropping any drag in progress.
    pub fn reload(&mut self) {
        self.drag = None;
        self.state = load_or_default(self.store.as_ref(), &self.default_tab_name);
        tracing::info!("dashboard reloaded");
        self.notify(DashboardEvent::Reloaded);
    }

    fn layout_locked(&self, command: &str) -> bool {
        if self.drag.is_some() {
            tracing::debug!(command, "layout is locked by an active drag");
            return true;
        }
        false
    }

    fn commit(&mut self, next: Option<DashboardState>, command: &str) -> bool {
        let Some(next) = next else {
            tracing::debug!(command, "dashboard command had no effect");
            return false;
        };
        self.state = next;
        self.persist();
        self.notify(DashboardEvent::Changed);
        true
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.state) {
            tracing::warn!(error = %e, "failed to save dashboard state");
        }
    }

    fn persist_templates(&self) {
        let Some(path) = &self.templates_path else {
            return;
        };
        if let Err(e) = self.templates.save_user(path) {
            tracing::warn!(error = %e, "failed to save dashboard templates");
        }
    }

    fn notify(&self, event: DashboardEvent) {
        if let Some(cb) = &self.event_cb {
            (cb)(event);
        }
    }
}
