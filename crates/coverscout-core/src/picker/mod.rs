// Windowed, groupable, filterable multi-select pickers.
//
// Leaf-first: `prefix` (height prefix sums) -> `window` (visible range) ->
// `grouped` (header/item sequence) -> `filter` (candidates) ->
// `controller` (per-picker state machine composing the rest).

pub mod controller;
pub mod filter;
pub mod grouped;
pub mod prefix;
pub mod window;

pub use controller::{MultiSelectController, PickerConfig, PickerState, SelectionNotice, VisibleRow};
pub use filter::{ChosenSet, FilterEngine, MatchPolicy, Stringify};
pub use grouped::{Entry, GroupedSequence, RowHeights};
pub use window::WindowModel;
