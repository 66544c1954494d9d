pub mod classifier;
pub mod pipeline;

pub use classifier::ThoughtClassifier;
pub use pipeline::ThoughtPipeline;
