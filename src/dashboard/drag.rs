use crate::dashboard::grid::bounds_check;
use crate::dashboard::layout::{DashboardState, PlacedWidget};
use crate::dashboard::widgets::move_widget;

/// An in-flight relocation of a single widget on the active tab.
///
/// Only the transient position changes while the session is open; the layout
/// is touched once, when [`DragSession::end`] commits the drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    widget_id: String,
    tab_id: String,
    origin: (u32, u32),
    current: Option<(i32, i32)>,
}

impl DragSession {
    /// Start dragging `widget_id`. Returns `None` when the active tab does not
    /// contain it.
    pub fn start(state: &DashboardState, widget_id: &str) -> Option<Self> {
        let tab = state.active_tab();
        let widget = tab.widget(widget_id)?;
        Some(Self {
            widget_id: widget_id.to_string(),
            tab_id: tab.id.clone(),
            origin: (widget.x, widget.y),
            current: None,
        })
    }

    pub fn widget_id(&self) -> &str {
        &self.widget_id
    }

    pub fn tab_id(&self) -> &str {
        &self.tab_id
    }

    /// Last committed origin of the dragged widget.
    pub fn origin(&self) -> (u32, u32) {
        self.origin
    }

    /// Transient position, falling back to the origin before the first update.
    /// `None` only when the origin cannot be expressed in move coordinates.
    pub fn position(&self) -> Option<(i32, i32)> {
        self.current.or_else(|| self.origin_point())
    }

    fn origin_point(&self) -> Option<(i32, i32)> {
        let x = i32::try_from(self.origin.0).ok()?;
        let y = i32::try_from(self.origin.1).ok()?;
        Some((x, y))
    }

    pub fn update(&mut self, x: i32, y: i32) {
        self.current = Some((x, y));
    }

    /// The active layout with the dragged widget drawn at its transient
    /// position when that position is on the grid.
    pub fn preview(&self, state: &DashboardState) -> Vec<PlacedWidget> {
        let position = self.position();
        state
            .active_tab()
            .layout
            .iter()
            .map(|widget| match position {
                Some((x, y))
                    if widget.id == self.widget_id && bounds_check(x, y, widget.w, widget.h) =>
                {
                    PlacedWidget {
                        x: x as u32,
                        y: y as u32,
                        ..widget.clone()
                    }
                }
                _ => widget.clone(),
            })
            .collect()
    }

    /// Finish the drag. A missing or invalid drop target, or a drop back on
    /// the origin, commits nothing.
    pub fn end(self, state: &DashboardState, drop: Option<(i32, i32)>) -> Option<DashboardState> {
        let Some((x, y)) = drop else {
            tracing::debug!(widget = %self.widget_id, "drag ended without a drop target");
            return None;
        };
        if state.active_tab_id() != self.tab_id {
            tracing::debug!(widget = %self.widget_id, "drag ended on a different tab");
            return None;
        }
        if self.origin_point() == Some((x, y)) {
            return None;
        }
        move_widget(state, &self.widget_id, x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::layout::DashboardTab;

    fn state() -> DashboardState {
        DashboardState::from_tabs(
            vec![DashboardTab::new("main", "Main").with_layout(vec![
                PlacedWidget::new("quick-stats", 0, 0, 3, 1),
                PlacedWidget::new("client-list", 3, 0, 4, 1),
            ])],
            "main",
        )
    }

    #[test]
    fn start_requires_widget_on_active_tab() {
        assert!(DragSession::start(&state(), "revenue-chart").is_none());
        let session = DragSession::start(&state(), "client-list").expect("session");
        assert_eq!(session.origin(), (3, 0));
        assert_eq!(session.position(), Some((3, 0)));
    }

    #[test]
    fn updates_only_move_the_preview() {
        let state = state();
        let mut session = DragSession::start(&state, "client-list").expect("session");
        session.update(8, 2);
        let preview = session.preview(&state);
        assert_eq!((preview[1].x, preview[1].y), (8, 2));
        assert_eq!(preview[0], state.active_tab().layout[0]);
        assert_eq!(state.active_tab().layout[1].x, 3);
    }

    #[test]
    fn out_of_bounds_preview_stays_at_origin() {
        let state = state();
        let mut session = DragSession::start(&state, "client-list").expect("session");
        session.update(11, 0);
        assert_eq!(session.preview(&state), state.active_tab().layout);
    }

    #[test]
    fn end_commits_valid_drop() {
        let state = state();
        let mut session = DragSession::start(&state, "quick-stats").expect("session");
        session.update(9, 1);
        let next = session.end(&state, Some((9, 1))).expect("committed");
        assert_eq!((next.active_tab().layout[0].x, next.active_tab().layout[0].y), (9, 1));
    }

    #[test]
    fn origin_outside_move_coordinates_is_never_matched() {
        let session = DragSession {
            widget_id: "quick-stats".into(),
            tab_id: "main".into(),
            origin: (0, u32::MAX),
            current: None,
        };
        assert_eq!(session.position(), None);
        let state = state();
        assert_eq!(session.preview(&state), state.active_tab().layout);
        let next = session.end(&state, Some((0, 4))).expect("committed");
        assert_eq!(next.active_tab().layout[0].y, 4);
    }

    #[test]
    fn end_without_valid_target_rolls_back() {
        let state = state();
        let session = DragSession::start(&state, "quick-stats").expect("session");
        assert!(session.clone().end(&state, None).is_none());
        assert!(session.clone().end(&state, Some((10, 0))).is_none());
        assert!(session.end(&state, Some((0, 0))).is_none());
    }
}
