// ABOUTME: Sitequote AI library - completion backend integration
// ABOUTME: Exposes a provider-agnostic completion trait and the Mistral-backed implementation

pub mod service;

pub use service::{
    AIService, AIServiceError, AIServiceResult, CompletionClient, CompletionRequest,
};
