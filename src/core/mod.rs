pub mod engine;
pub mod normalize;
pub mod reconciler;
pub mod submitter;
pub mod sync;
