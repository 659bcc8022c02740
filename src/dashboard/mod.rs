pub mod catalog;
pub mod dashboard;
pub mod drag;
pub mod grid;
pub mod layout;
pub mod store;
pub mod tabs;
pub mod templates;
pub mod widgets;

pub use catalog::{WidgetCatalog, WidgetDescriptor, WidgetKind};
pub use dashboard::{Dashboard, DashboardEvent, EventCallback};
pub use drag::DragSession;
pub use grid::{Cell, GRID_COLUMNS};
pub use layout::{DashboardState, DashboardTab, PlacedWidget};
pub use store::{DashboardStore, JsonFileStore, MemoryStore};
pub use templates::{ApplyMode, Template, TemplateLibrary, BLANK_TEMPLATE_ID};
