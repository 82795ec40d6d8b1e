//! Houdini
//!
//! Expand-and-collapse behavior for content panels: simple disclosures,
//! accordions with mutually exclusive groups, and fragment-routed panels.
//!
//! The controller is pure logic over the [`dom::DocumentAccess`] capability.
//! [`dom::MemoryDocument`] and [`page::Page`] stand in for the browser, and
//! [`scenario`] replays scripted interactions for the `houdini` binary.

pub mod config;
pub mod controller;
pub mod dom;
pub mod logging;
pub mod model;
pub mod page;
pub mod scenario;

#[cfg(test)]
mod test_harness;

#[cfg(test)]
mod tests;
