// Library root: configuration, HTTP collaborators, the comparison form and
// the event loop that ties them to the UI.

pub mod app;
pub mod client;
pub mod config;
pub mod form;
pub mod protocol;
