// TUI widget modules, one per screen zone.

pub mod controls;
pub mod grid;
pub mod picker;
pub mod status_bar;
