// Terminal front end for coverscout.

pub mod tui;
