//! Widget commands on the active tab.
//!
//! Every function takes the current state and returns the next one, or `None`
//! when the command is rejected and the caller should keep what it has.

use crate::dashboard::catalog::{WidgetCatalog, WidgetDescriptor};
use crate::dashboard::grid::{bounds_check, first_free_origin, resolve_move, resolve_resize};
use crate::dashboard::layout::{DashboardState, PlacedWidget};

/// Append `widget_id` to the active tab at the first free origin, sized from
/// the catalog's default span.
pub fn add_widget(
    state: &DashboardState,
    catalog: &WidgetCatalog,
    widget_id: &str,
) -> Option<DashboardState> {
    let descriptor = addable(state, catalog, widget_id)?;
    let Some((x, y)) = first_free_origin(&state.active_tab().layout, descriptor.default_span, 1)
    else {
        tracing::debug!(widget = %widget_id, "no origin fits widget span");
        return None;
    };
    let mut next = state.clone();
    next.active_tab_mut()
        .layout
        .push(PlacedWidget::new(widget_id, x, y, descriptor.default_span, 1));
    Some(next)
}

/// Like [`add_widget`] but at an explicit origin, e.g. a free cell the widget
/// was dropped on.
pub fn add_widget_at(
    state: &DashboardState,
    catalog: &WidgetCatalog,
    widget_id: &str,
    x: i32,
    y: i32,
) -> Option<DashboardState> {
    let descriptor = addable(state, catalog, widget_id)?;
    if !bounds_check(x, y, descriptor.default_span, 1) {
        tracing::debug!(widget = %widget_id, x, y, "widget origin out of bounds");
        return None;
    }
    let mut next = state.clone();
    next.active_tab_mut().layout.push(PlacedWidget::new(
        widget_id,
        x as u32,
        y as u32,
        descriptor.default_span,
        1,
    ));
    Some(next)
}

fn addable<'a>(
    state: &DashboardState,
    catalog: &'a WidgetCatalog,
    widget_id: &str,
) -> Option<&'a WidgetDescriptor> {
    let Some(descriptor) = catalog.lookup(widget_id) else {
        tracing::debug!(widget = %widget_id, "unknown widget type");
        return None;
    };
    if state.active_tab().contains(widget_id) {
        tracing::debug!(widget = %widget_id, "widget already on tab");
        return None;
    }
    Some(descriptor)
}

pub fn remove_widget(state: &DashboardState, id: &str) -> Option<DashboardState> {
    if !state.active_tab().contains(id) {
        return None;
    }
    let mut next = state.clone();
    next.active_tab_mut().layout.retain(|w| w.id != id);
    Some(next)
}

pub fn move_widget(state: &DashboardState, id: &str, x: i32, y: i32) -> Option<DashboardState> {
    let Some(layout) = resolve_move(&state.active_tab().layout, id, x, y) else {
        tracing::debug!(widget = %id, x, y, "move rejected");
        return None;
    };
    if layout == state.active_tab().layout {
        return None;
    }
    let mut next = state.clone();
    next.active_tab_mut().layout = layout;
    Some(next)
}

pub fn resize_widget(state: &DashboardState, id: &str, w: u32, h: u32) -> Option<DashboardState> {
    let Some(layout) = resolve_resize(&state.active_tab().layout, id, w, h) else {
        tracing::debug!(widget = %id, w, h, "resize rejected");
        return None;
    };
    if layout == state.active_tab().layout {
        return None;
    }
    let mut next = state.clone();
    next.active_tab_mut().layout = layout;
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::layout::DashboardTab;

    fn state_with(layout: Vec<PlacedWidget>) -> DashboardState {
        DashboardState::from_tabs(vec![DashboardTab::new("main", "Main").with_layout(layout)], "main")
    }

    #[test]
    fn add_uses_default_span_at_first_free_origin() {
        let catalog = WidgetCatalog::with_defaults();
        let state = state_with(Vec::new());
        let next = add_widget(&state, &catalog, "quick-stats").expect("added");
        assert_eq!(
            next.active_tab().layout,
            vec![PlacedWidget::new("quick-stats", 0, 0, 3, 1)]
        );
        // Input state untouched.
        assert!(state.active_tab().layout.is_empty());
    }

    #[test]
    fn add_rejects_unknown_and_duplicate() {
        let catalog = WidgetCatalog::with_defaults();
        let state = state_with(vec![PlacedWidget::new("quick-stats", 0, 0, 3, 1)]);
        assert!(add_widget(&state, &catalog, "quick-stats").is_none());
        assert!(add_widget(&state, &catalog, "stock-ticker").is_none());
    }

    #[test]
    fn add_at_checks_bounds() {
        let catalog = WidgetCatalog::with_defaults();
        let state = state_with(Vec::new());
        assert!(add_widget_at(&state, &catalog, "revenue-chart", 7, 0).is_none());
        let next = add_widget_at(&state, &catalog, "revenue-chart", 6, 4).expect("added");
        assert_eq!(next.active_tab().layout[0], PlacedWidget::new("revenue-chart", 6, 4, 6, 1));
    }

    #[test]
    fn remove_only_existing_widgets() {
        let state = state_with(vec![PlacedWidget::new("client-list", 0, 0, 4, 1)]);
        assert!(remove_widget(&state, "quick-stats").is_none());
        let next = remove_widget(&state, "client-list").expect("removed");
        assert!(next.active_tab().layout.is_empty());
    }

    #[test]
    fn rejected_move_leaves_no_new_state() {
        let state = state_with(vec![PlacedWidget::new("client-list", 0, 0, 4, 1)]);
        assert!(move_widget(&state, "client-list", 10, 0).is_none());
        let next = move_widget(&state, "client-list", 8, 3).expect("moved");
        assert_eq!((next.active_tab().layout[0].x, next.active_tab().layout[0].y), (8, 3));
    }

    #[test]
    fn move_or_resize_in_place_is_a_no_op() {
        let state = state_with(vec![PlacedWidget::new("client-list", 2, 1, 4, 1)]);
        assert!(move_widget(&state, "client-list", 2, 1).is_none());
        assert!(resize_widget(&state, "client-list", 4, 1).is_none());
    }

    #[test]
    fn resize_within_grid() {
        let state = state_with(vec![PlacedWidget::new("client-list", 4, 0, 4, 1)]);
        assert!(resize_widget(&state, "client-list", 9, 1).is_none());
        let next = resize_widget(&state, "client-list", 8, 2).expect("resized");
        assert_eq!(next.active_tab().layout[0].w, 8);
        assert_eq!(next.active_tab().layout[0].h, 2);
    }
}
