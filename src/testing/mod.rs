//! Headless testing helpers: in-memory collaborators for the stylesheet
//! repository.
//!
//! [`MemorySource`] serves stylesheet text from memory, [`ManualMonitor`]
//! lets a test report file changes, [`CountingParser`] counts parses and
//! [`EventRecorder`] records notifications.

pub mod memory;
pub mod recorder;

pub use memory::{ManualMonitor, MemorySource};
pub use recorder::{CountingParser, EventRecorder};
