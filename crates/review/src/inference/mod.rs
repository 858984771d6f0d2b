//! Remote text-generation backends for the ML review adapter.

pub mod mock;
pub mod provider;

pub use mock::MockInferenceProvider;
pub use provider::{
    HttpInferenceProvider, InferenceError, InferenceProvider, InferenceRequest, InferenceResponse,
};
