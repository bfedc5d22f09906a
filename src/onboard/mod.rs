//! Console front-end for the setup wizard.

pub mod flow;
pub mod prompts;
pub mod view;

pub use flow::{QuickSetup, run_quick_setup, run_wizard, setup_api};
