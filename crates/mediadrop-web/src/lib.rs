//! HTTP front-end for mediadrop
//!
//! One form, one POST: the submitted URL is handed to the extractor, the
//! largest file it leaves in a fresh work directory is streamed back, and the
//! directory is deleted on a timer.

pub mod flash;
mod page;
pub mod routes;
mod server;
pub mod stream;

pub use flash::FlashStore;
pub use server::{router, serve, AppState};
