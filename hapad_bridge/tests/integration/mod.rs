//! Integration test modules.

mod control_loop;
mod diagnostics;
mod startup;
