pub mod api;
pub mod error;
pub mod jobs;
pub mod store;
pub mod synth;
