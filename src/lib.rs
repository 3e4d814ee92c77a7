//! Core of the WebGenie AI website builder.
//!
//! Turns a natural-language description into a single self-contained HTML
//! document via the Google Gemini API and tracks the per-session state the
//! UI renders (current artifact, busy flag, last error, in-memory history).
//!
//! Two halves:
//! - [`GeminiClient`] formats and sends the generation request and cleans up
//!   the returned document.
//! - [`SessionController`] drives the client and is the sole writer of the
//!   shared [`SessionState`].
//!
//! ```no_run
//! use webgenie::{GeminiClient, SessionController};
//!
//! # async fn example() {
//! let controller = SessionController::new(GeminiClient::new());
//! controller.generate("A landing page for a coffee shop").await;
//!
//! let snap = controller.snapshot().await;
//! if let Some(message) = snap.last_error {
//!     eprintln!("{message}");
//! } else {
//!     println!("{}", snap.current_artifact);
//! }
//! # }
//! ```

pub mod controller;
mod error;
pub mod gemini_api;
pub mod session;

pub use controller::{SessionController, GENERATION_FAILED_MESSAGE};
pub use error::GenerationError;
pub use gemini_api::GeminiClient;
pub use session::{GenerationRecord, SessionSnapshot, SessionState};
