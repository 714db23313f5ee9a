//! fortune-kiosk: interactive fortune-teller kiosk for a terminal, a
//! serial-attached microcontroller and a receipt printer.

pub mod corpus;
pub mod logging;
pub mod peripheral;
pub mod placeholder;
pub mod platform;
pub mod report;
pub mod script;
pub mod tui;
pub mod types;
