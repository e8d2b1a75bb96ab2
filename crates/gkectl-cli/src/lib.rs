// gkectl-cli: Clap commands, UI helpers, rendering
// Depends on gkectl-core, gkectl-gcp, gkectl-lifecycle

pub mod commands;
pub mod display;
pub mod logging;
pub mod output;
pub mod ui;

pub use commands::run;
