//! Core systems for Horizon RichText.
//!
//! This crate provides the foundational pieces shared by the rich-text
//! engine:
//!
//! - **Signal/Slot System**: Type-safe change notification
//! - **Logging**: Tracing targets, span names and performance spans
//! - **Errors**: Error types for the systems above
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_richtext_core::Signal;
//!
//! let content_changed = Signal::<()>::new();
//! content_changed.connect(|_| println!("document edited"));
//! content_changed.emit(());
//! ```

mod error;
pub mod logging;
pub mod signal;

pub use error::{SignalError, SignalResult};
pub use logging::PerfSpan;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
