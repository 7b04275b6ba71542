// ABOUTME: Wizard package: AI-backed project estimation wizard
// ABOUTME: Prompts, response normalization, rate limiting, drafts, and orchestration

pub mod error;
pub mod limiter;
pub mod normalizer;
pub mod prompts;
pub mod session;
pub mod state;

pub use error::{Result, WizardError};
pub use limiter::RateLimiter;
pub use normalizer::{
    merge_refinement, missing_explanation_ids, parse_filled_explanations, parse_recommendations,
    parse_refinement, parse_string_list, parse_structure, parse_suggested_block_label,
    parse_suggested_module, parse_suggested_page, Recommendations, Refinement, ValidationIssue,
};
pub use session::{WizardSession, CLARIFY_THRESHOLD, MIN_DESCRIPTION_LEN, MIN_SUGGEST_LEN};
pub use state::{DraftStore, FileDraftStore, WizardState, DRAFT_VERSION};
