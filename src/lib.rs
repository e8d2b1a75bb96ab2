//! # gkectl — cost-optimized GKE cluster lifecycle manager
//!
//! Facade crate that re-exports the gkectl workspace crates so consumers
//! can depend on a single `gkectl` library.
//!
//! ## Crate breakdown
//!
//! | Module | Crate | Purpose |
//! |--------|-------|---------|
//! | [`core`] | gkectl-core | Types, status model, poll policies, settings |
//! | [`gcp`] | gkectl-gcp | Google Cloud REST planes (container + compute) |
//! | [`lifecycle`] | gkectl-lifecycle | Create/scale/list/delete orchestration |
//! | [`cli`] | gkectl-cli | Clap commands, UI, rendering |

pub use gkectl_cli as cli;
pub use gkectl_core as core;
pub use gkectl_gcp as gcp;
pub use gkectl_lifecycle as lifecycle;
