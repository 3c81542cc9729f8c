//! Core services shared by every layer.
//!
//! This module contains the ambient pieces the workflow engine is built on:
//! configuration, localization, cooperative timers, and project storage.

mod config;
mod i18n;
mod store;
mod timer;

pub use config::{Config, ConversationConfig, GeneralConfig, HighlightConfig, UiConfig};
pub use i18n::{Dictionary, Locale, Translator};
pub use store::{export, ExportFormat, ProjectStore, ProjectSummary, StoreError, StoreResult};
pub use timer::{Clock, ManualClock, Millis, SystemClock, TimerSet};
