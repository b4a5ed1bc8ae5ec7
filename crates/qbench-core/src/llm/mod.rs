//! Model backends and answer generation
//!
//! A question needs one of two capabilities: plain text, or multimodal when it
//! carries images. Backends are built lazily per capability by the
//! [`BackendRegistry`] and driven by the [`AnswerInvoker`], which owns retries.

mod backend;
mod factory;
mod invoker;
pub mod prompt;
pub mod providers;
mod question;
mod registry;

pub use backend::{Backend, BackendFactory};
pub use factory::HttpBackendFactory;
pub use invoker::AnswerInvoker;
pub use prompt::{MAX_CHOICES, PromptBuilder, extract_answer};
pub use question::{BackendKind, ImageRef, Question};
pub use registry::BackendRegistry;
