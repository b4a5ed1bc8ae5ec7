//! Item selection and identity

mod question_id;
mod sampler;

pub use question_id::{QuestionId, QuestionIdGenerator};
pub use sampler::{SampleIndexSet, Sampler};
