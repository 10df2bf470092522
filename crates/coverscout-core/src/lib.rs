// Library root: data model, windowed multi-select pickers, and the
// comparison grid model. No I/O lives in this crate.

pub mod error;
pub mod grid;
pub mod model;
pub mod picker;
pub mod query;
