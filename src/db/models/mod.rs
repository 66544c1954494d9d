pub mod thought;

pub use thought::{CapturedThought, ResearchReport, ThoughtCategory};
