// ABOUTME: Wizard session orchestration: validates input, rate-limits, calls the
// ABOUTME: completion backend with the right prompt, and normalizes every response

use std::sync::{Arc, Mutex};

use chrono::Utc;
use sitequote_ai::{CompletionClient, CompletionRequest};
use sitequote_core::{
    AIProjectStructure, BriefState, CatalogItem, ExtraItem, MainBlock, PriceRange, ProjectConfig,
};
use tracing::{info, warn};

use crate::error::{Result, WizardError};
use crate::limiter::RateLimiter;
use crate::normalizer::{
    merge_refinement, missing_explanation_ids, parse_filled_explanations, parse_recommendations,
    parse_refinement, parse_string_list, parse_structure, parse_suggested_block_label,
    parse_suggested_module, parse_suggested_page, Recommendations,
};
use crate::prompts;

/// Shortest project description worth analyzing
pub const MIN_DESCRIPTION_LEN: usize = 10;
/// Shortest text accepted for a page/module/block suggestion
pub const MIN_SUGGEST_LEN: usize = 2;
/// Descriptions shorter than this get clarifying questions offered
pub const CLARIFY_THRESHOLD: usize = 80;

/// Orchestrates every AI-backed wizard action over a [`CompletionClient`].
///
/// The analyze call and the single-item suggestions go through the rate
/// limiter; everything else (clarifying questions, gap fills, explanations,
/// briefs) is unmetered.
pub struct WizardSession {
    client: Arc<dyn CompletionClient>,
    limiter: Mutex<RateLimiter>,
}

impl WizardSession {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            limiter: Mutex::new(RateLimiter::default()),
        }
    }

    pub fn with_limiter(client: Arc<dyn CompletionClient>, limiter: RateLimiter) -> Self {
        Self {
            client,
            limiter: Mutex::new(limiter),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.client.is_configured() {
            Ok(())
        } else {
            Err(WizardError::NotConfigured)
        }
    }

    fn acquire(&self) -> Result<()> {
        let mut limiter = self.limiter.lock().unwrap_or_else(|e| e.into_inner());
        if limiter.try_acquire() {
            Ok(())
        } else {
            Err(WizardError::RateLimited)
        }
    }

    /// Analyze a free-text description into a validated project structure.
    ///
    /// After the primary call, ids still lacking a rationale get one
    /// best-effort gap-filling call; its failure never fails the analysis.
    pub async fn analyze(&self, description: &str) -> Result<AIProjectStructure> {
        self.ensure_configured()?;
        let description = description.trim();
        if description.chars().count() < MIN_DESCRIPTION_LEN {
            return Err(WizardError::InvalidInput(format!(
                "Description too short, need at least {} characters",
                MIN_DESCRIPTION_LEN
            )));
        }
        self.acquire()?;

        let raw = self
            .client
            .complete(
                CompletionRequest::new(description)
                    .with_system(prompts::analyze_system_prompt())
                    .json()
                    .max_tokens(1500),
            )
            .await?;
        let mut structure = parse_structure(&raw)?;
        info!(
            project_type = structure.project_type.as_str(),
            modules = structure.modules.len(),
            pages = structure.recommended_pages.len(),
            "project description analyzed"
        );

        let missing = missing_explanation_ids(&structure);
        if !missing.is_empty() {
            self.fill_explanation_gaps(description, &mut structure, &missing)
                .await;
        }
        Ok(structure)
    }

    /// Best-effort second pass; does not consume rate-limit quota
    async fn fill_explanation_gaps(
        &self,
        description: &str,
        structure: &mut AIProjectStructure,
        missing: &[String],
    ) {
        let prompt =
            prompts::fill_explanations_prompt(description, structure.project_type, missing);
        let result = self
            .client
            .complete(CompletionRequest::new(prompt).json().max_tokens(800))
            .await;
        match result {
            Ok(raw) => match parse_filled_explanations(&raw, missing) {
                Ok(filled) => {
                    structure.explanation.extend(filled);
                }
                Err(e) => warn!(error = %e, "gap-fill response unreadable, keeping gaps"),
            },
            Err(e) => warn!(error = %e, "gap-fill call failed, keeping gaps"),
        }
    }

    /// Fold yes/no clarification answers back into the structure. Skips the
    /// backend entirely when nothing was answered "yes"; a refinement that
    /// cannot be parsed degrades to no change.
    pub async fn refine_with_answers(
        &self,
        description: &str,
        structure: &mut AIProjectStructure,
        questions: &[String],
        answers: &[bool],
    ) -> Result<()> {
        self.ensure_configured()?;
        let confirmed: Vec<&str> = questions
            .iter()
            .zip(answers)
            .filter(|(_, yes)| **yes)
            .map(|(q, _)| q.as_str())
            .collect();
        if confirmed.is_empty() {
            return Ok(());
        }

        let summary = confirmed
            .iter()
            .map(|q| format!("\"{}\" - yes", q))
            .collect::<Vec<_>>()
            .join("; ");
        let raw = self
            .client
            .complete(
                CompletionRequest::new(prompts::refine_prompt(description, &summary))
                    .json()
                    .max_tokens(800),
            )
            .await?;
        match parse_refinement(&raw) {
            Ok(refinement) => merge_refinement(structure, &refinement),
            Err(e) => warn!(error = %e, "refinement unreadable, structure unchanged"),
        }
        Ok(())
    }

    /// Suggest one page for the user's text. Unrecognized ids stay freeform.
    pub async fn suggest_page(&self, text: &str) -> Result<CatalogItem> {
        self.ensure_configured()?;
        let text = Self::validated_suggest_text(text)?;
        self.acquire()?;
        let raw = self
            .client
            .complete(
                CompletionRequest::new(prompts::suggest_page_prompt(text))
                    .json()
                    .max_tokens(300),
            )
            .await?;
        parse_suggested_page(&raw)
    }

    /// Suggest one module; ids outside the catalog are coerced to the fallback
    pub async fn suggest_module(&self, text: &str) -> Result<ExtraItem> {
        self.ensure_configured()?;
        let text = Self::validated_suggest_text(text)?;
        self.acquire()?;
        let raw = self
            .client
            .complete(
                CompletionRequest::new(prompts::suggest_module_prompt(text))
                    .json()
                    .max_tokens(300),
            )
            .await?;
        parse_suggested_module(&raw)
    }

    /// Turn the user's text into a named main-page block
    pub async fn suggest_main_block(&self, text: &str) -> Result<MainBlock> {
        self.ensure_configured()?;
        let text = Self::validated_suggest_text(text)?;
        self.acquire()?;
        let raw = self
            .client
            .complete(
                CompletionRequest::new(prompts::suggest_main_block_prompt(text))
                    .json()
                    .max_tokens(150),
            )
            .await?;
        let label = parse_suggested_block_label(&raw, text)?;
        Ok(MainBlock {
            id: format!("custom_{}", Utc::now().timestamp_millis()),
            label,
        })
    }

    /// Clarifying questions for a short first-step description. Returns an
    /// empty list for long descriptions and on any backend hiccup.
    pub async fn clarifying_questions(&self, description: &str) -> Result<Vec<String>> {
        self.ensure_configured()?;
        let description = description.trim();
        if description.chars().count() >= CLARIFY_THRESHOLD {
            return Ok(Vec::new());
        }
        let raw = self
            .client
            .complete(
                CompletionRequest::new(prompts::clarifying_questions_prompt(description))
                    .json()
                    .max_tokens(300),
            )
            .await;
        Ok(Self::best_effort_list(raw, "questions", 3))
    }

    /// Clarifying questions scoped to one wizard step; steps without a name
    /// (outside 2 through 7) are a quiet no-op.
    pub async fn step_clarifying_questions(
        &self,
        step: u32,
        description: &str,
        config: &ProjectConfig,
    ) -> Result<Vec<String>> {
        self.ensure_configured()?;
        let Some(step_label) = prompts::step_name(step) else {
            return Ok(Vec::new());
        };
        let raw = self
            .client
            .complete(
                CompletionRequest::new(prompts::step_clarifying_questions_prompt(
                    step_label,
                    description,
                    config,
                ))
                .json()
                .max_tokens(300),
            )
            .await;
        Ok(Self::best_effort_list(raw, "questions", 3))
    }

    /// Plain-language explanation of the calculated price
    pub async fn explain_price(&self, config: &ProjectConfig, price: &PriceRange) -> Result<String> {
        self.ensure_configured()?;
        let raw = self
            .client
            .complete(
                CompletionRequest::new(prompts::explain_price_prompt(config, price))
                    .max_tokens(300),
            )
            .await?;
        Ok(raw.trim().to_string())
    }

    /// Short technical brief from the description and current configuration
    pub async fn generate_brief(&self, description: &str, config: &ProjectConfig) -> Result<String> {
        self.ensure_configured()?;
        let raw = self
            .client
            .complete(
                CompletionRequest::new(prompts::brief_prompt(description, config)).max_tokens(500),
            )
            .await?;
        Ok(raw.trim().to_string())
    }

    /// Suggestions of what the assembled project still lacks; degrades to an
    /// empty recommendation set on failure.
    pub async fn recommendations(
        &self,
        config: &ProjectConfig,
        description: &str,
        brief: Option<&BriefState>,
    ) -> Result<Recommendations> {
        self.ensure_configured()?;
        let raw = self
            .client
            .complete(
                CompletionRequest::new(prompts::recommendations_prompt(config, description, brief))
                    .json()
                    .max_tokens(450),
            )
            .await;
        match raw {
            Ok(raw) => match parse_recommendations(&raw, config) {
                Ok(recs) => Ok(recs),
                Err(e) => {
                    warn!(error = %e, "recommendations unreadable, returning none");
                    Ok(Recommendations::default())
                }
            },
            Err(e) => {
                warn!(error = %e, "recommendations call failed, returning none");
                Ok(Recommendations::default())
            }
        }
    }

    /// Pre-kickoff checklist for the client; empty on failure
    pub async fn launch_checklist(&self, config: &ProjectConfig) -> Result<Vec<String>> {
        self.ensure_configured()?;
        let raw = self
            .client
            .complete(
                CompletionRequest::new(prompts::launch_checklist_prompt(config))
                    .json()
                    .max_tokens(300),
            )
            .await;
        Ok(Self::best_effort_list(raw, "items", 8))
    }

    /// Example one-line descriptions for the first step; empty on failure
    pub async fn example_descriptions(&self) -> Result<Vec<String>> {
        self.ensure_configured()?;
        let raw = self
            .client
            .complete(
                CompletionRequest::new(prompts::example_descriptions_prompt())
                    .json()
                    .max_tokens(250),
            )
            .await;
        Ok(Self::best_effort_list(raw, "examples", 3))
    }

    fn validated_suggest_text(text: &str) -> Result<&str> {
        let text = text.trim();
        if text.chars().count() < MIN_SUGGEST_LEN {
            return Err(WizardError::InvalidInput(
                "Describe what to add in a couple of words".to_string(),
            ));
        }
        Ok(text)
    }

    fn best_effort_list(
        raw: sitequote_ai::AIServiceResult<String>,
        key: &str,
        limit: usize,
    ) -> Vec<String> {
        match raw {
            Ok(raw) => parse_string_list(&raw, key, limit).unwrap_or_else(|e| {
                warn!(error = %e, key, "list response unreadable, returning none");
                Vec::new()
            }),
            Err(e) => {
                warn!(error = %e, key, "list call failed, returning none");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use pretty_assertions::assert_eq;
    use sitequote_ai::AIServiceResult;
    use sitequote_core::ProjectType;

    mock! {
        pub Client {}

        #[async_trait::async_trait]
        impl CompletionClient for Client {
            fn is_configured(&self) -> bool;
            async fn complete(&self, request: CompletionRequest) -> AIServiceResult<String>;
        }
    }

    fn configured(mock: &mut MockClient) {
        mock.expect_is_configured().return_const(true);
    }

    const ANALYZE_RESPONSE: &str = r#"{
        "projectType": "ecommerce",
        "modules": ["auth", "payments"],
        "recommendedPages": ["home", "catalog", "cart"],
        "pageLabels": {"home": "Home"},
        "moduleLabels": {"auth": "Sign-in"},
        "complexity": "high",
        "explanation": {
            "auth": "Customer accounts.",
            "payments": "Online checkout.",
            "home": "Entry point.",
            "catalog": "Product browsing.",
            "cart": "Order assembly."
        }
    }"#;

    #[tokio::test]
    async fn test_analyze_happy_path() {
        let mut mock = MockClient::new();
        configured(&mut mock);
        mock.expect_complete()
            .times(1)
            .withf(|req| req.json_mode && req.system.is_some())
            .returning(|_| Ok(ANALYZE_RESPONSE.to_string()));

        let session = WizardSession::new(Arc::new(mock));
        let structure = session
            .analyze("An online store selling sneakers with delivery")
            .await
            .unwrap();
        assert_eq!(structure.project_type, ProjectType::Ecommerce);
        assert_eq!(structure.modules, vec!["auth", "payments"]);
    }

    #[tokio::test]
    async fn test_analyze_gap_fills_only_missing_ids() {
        let mut mock = MockClient::new();
        configured(&mut mock);
        // Primary response leaves cart and payments without a rationale
        mock.expect_complete()
            .times(1)
            .withf(|req| req.system.is_some())
            .returning(|_| {
                Ok(r#"{
                    "projectType": "ecommerce",
                    "modules": ["payments"],
                    "recommendedPages": ["home", "cart"],
                    "complexity": "medium",
                    "explanation": {"home": "Entry point."}
                }"#
                .to_string())
            });
        mock.expect_complete()
            .times(1)
            .withf(|req| {
                req.system.is_none()
                    && req.prompt.contains("payments, cart")
                    && !req.prompt.contains("home,")
            })
            .returning(|_| Ok(r#"{"payments": "Checkout.", "cart": "Order assembly."}"#.to_string()));

        let session = WizardSession::new(Arc::new(mock));
        let structure = session
            .analyze("An online store selling sneakers")
            .await
            .unwrap();
        assert_eq!(structure.explanation.get("cart").unwrap(), "Order assembly.");
        assert_eq!(structure.explanation.get("payments").unwrap(), "Checkout.");
    }

    #[tokio::test]
    async fn test_analyze_survives_gap_fill_failure() {
        let mut mock = MockClient::new();
        configured(&mut mock);
        mock.expect_complete()
            .times(1)
            .withf(|req| req.system.is_some())
            .returning(|_| {
                Ok(r#"{"projectType":"landing","modules":["forms"],"recommendedPages":["home"],"complexity":"low"}"#.to_string())
            });
        mock.expect_complete()
            .times(1)
            .withf(|req| req.system.is_none())
            .returning(|_| Ok("not json at all".to_string()));

        let session = WizardSession::new(Arc::new(mock));
        let structure = session.analyze("A simple one-page site").await.unwrap();
        assert!(structure.explanation.is_empty(), "gaps stay, analysis succeeds");
    }

    #[tokio::test]
    async fn test_analyze_rejects_short_description_without_calling() {
        let mut mock = MockClient::new();
        configured(&mut mock);
        mock.expect_complete().times(0);

        let session = WizardSession::new(Arc::new(mock));
        let err = session.analyze("shop").await.unwrap_err();
        assert!(matches!(err, WizardError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_unconfigured_backend_short_circuits() {
        let mut mock = MockClient::new();
        mock.expect_is_configured().return_const(false);
        mock.expect_complete().times(0);

        let session = WizardSession::new(Arc::new(mock));
        let err = session.analyze("An online store for sneakers").await.unwrap_err();
        assert!(matches!(err, WizardError::NotConfigured));
    }

    #[tokio::test]
    async fn test_refine_skips_backend_when_nothing_confirmed() {
        let mut mock = MockClient::new();
        configured(&mut mock);
        mock.expect_complete().times(0);

        let session = WizardSession::new(Arc::new(mock));
        let mut structure = AIProjectStructure {
            project_type: ProjectType::Landing,
            modules: vec!["forms".to_string()],
            recommended_pages: vec!["home".to_string()],
            page_labels: Default::default(),
            module_labels: Default::default(),
            complexity: Default::default(),
            explanation: Default::default(),
        };
        let before = structure.clone();
        session
            .refine_with_answers(
                "a landing page",
                &mut structure,
                &["Need payments?".to_string()],
                &[false],
            )
            .await
            .unwrap();
        assert_eq!(structure, before);
    }

    #[tokio::test]
    async fn test_refine_merges_confirmed_additions() {
        let mut mock = MockClient::new();
        configured(&mut mock);
        mock.expect_complete()
            .times(1)
            .withf(|req| req.prompt.contains("\"Need payments?\" - yes"))
            .returning(|_| {
                Ok(r#"{"addPages":[],"addModules":["payments"],"explanation":{"payments":"Confirmed online checkout."}}"#.to_string())
            });

        let session = WizardSession::new(Arc::new(mock));
        let mut structure = AIProjectStructure {
            project_type: ProjectType::Landing,
            modules: vec!["forms".to_string()],
            recommended_pages: vec!["home".to_string()],
            page_labels: Default::default(),
            module_labels: Default::default(),
            complexity: Default::default(),
            explanation: Default::default(),
        };
        session
            .refine_with_answers(
                "a landing page",
                &mut structure,
                &["Need payments?".to_string()],
                &[true],
            )
            .await
            .unwrap();
        assert_eq!(structure.modules, vec!["forms", "payments"]);
    }

    #[tokio::test]
    async fn test_suggest_module_coerces_unknown_ids() {
        let mut mock = MockClient::new();
        configured(&mut mock);
        mock.expect_complete()
            .times(1)
            .returning(|_| Ok(r#"{"id":"blockchain","label":"Blockchain"}"#.to_string()));

        let session = WizardSession::new(Arc::new(mock));
        let item = session.suggest_module("a blockchain thing").await.unwrap();
        assert_eq!(item.id, "forms");
    }

    #[tokio::test]
    async fn test_suggest_page_keeps_freeform() {
        let mut mock = MockClient::new();
        configured(&mut mock);
        mock.expect_complete().times(1).returning(|_| {
            Ok(r#"{"id":"delivery","label":"Delivery","explanation":"Shipping terms."}"#.to_string())
        });

        let session = WizardSession::new(Arc::new(mock));
        let item = session.suggest_page("delivery terms").await.unwrap();
        assert!(matches!(item, CatalogItem::Freeform { ref id, .. } if id == "delivery"));
    }

    #[tokio::test]
    async fn test_suggest_main_block_labels_from_response() {
        let mut mock = MockClient::new();
        configured(&mut mock);
        mock.expect_complete()
            .times(1)
            .returning(|_| Ok(r#"{"label":"Partners"}"#.to_string()));

        let session = WizardSession::new(Arc::new(mock));
        let block = session.suggest_main_block("our partner logos").await.unwrap();
        assert_eq!(block.label, "Partners");
        assert!(block.id.starts_with("custom_"));
    }

    #[tokio::test]
    async fn test_clarifying_questions_skipped_for_long_descriptions() {
        let mut mock = MockClient::new();
        configured(&mut mock);
        mock.expect_complete().times(0);

        let session = WizardSession::new(Arc::new(mock));
        let long = "An online store for sneakers with delivery across the country and a loyalty program for returning customers".to_string();
        assert!(long.chars().count() >= CLARIFY_THRESHOLD);
        let questions = session.clarifying_questions(&long).await.unwrap();
        assert!(questions.is_empty());
    }

    #[tokio::test]
    async fn test_rate_limit_blocks_sixth_action() {
        let mut mock = MockClient::new();
        configured(&mut mock);
        mock.expect_complete()
            .times(5)
            .returning(|_| Ok(ANALYZE_RESPONSE.to_string()));

        let session = WizardSession::new(Arc::new(mock));
        for _ in 0..5 {
            session
                .analyze("An online store selling sneakers with delivery")
                .await
                .unwrap();
        }
        let err = session
            .analyze("An online store selling sneakers with delivery")
            .await
            .unwrap_err();
        assert!(matches!(err, WizardError::RateLimited));
    }

    #[tokio::test]
    async fn test_step_questions_outside_range_are_a_no_op() {
        let mut mock = MockClient::new();
        configured(&mut mock);
        mock.expect_complete().times(0);

        let session = WizardSession::new(Arc::new(mock));
        for step in [0, 1, 8, 42] {
            let questions = session
                .step_clarifying_questions(step, "a bakery site", &ProjectConfig::default())
                .await
                .unwrap();
            assert!(questions.is_empty(), "step {} must be a quiet no-op", step);
        }
    }

    #[tokio::test]
    async fn test_explanatory_calls_are_not_metered() {
        let mut mock = MockClient::new();
        configured(&mut mock);
        mock.expect_complete()
            .times(1)
            .withf(|req| req.json_mode)
            .returning(|_| Ok(ANALYZE_RESPONSE.to_string()));
        mock.expect_complete()
            .times(2)
            .withf(|req| !req.json_mode)
            .returning(|_| Ok("Plain prose.".to_string()));

        let session = WizardSession::with_limiter(
            Arc::new(mock),
            RateLimiter::new(1, crate::limiter::WINDOW),
        );
        // A single analyze exhausts this one-action quota
        session
            .analyze("An online store selling sneakers with delivery")
            .await
            .unwrap();
        let err = session
            .analyze("An online store selling sneakers with delivery")
            .await
            .unwrap_err();
        assert!(matches!(err, WizardError::RateLimited));

        let config = ProjectConfig::default();
        let price = PriceRange {
            min: 5_200,
            max: 6_200,
        };
        let text = session.explain_price(&config, &price).await.unwrap();
        assert_eq!(text, "Plain prose.");
        let brief = session.generate_brief("a bakery site", &config).await.unwrap();
        assert_eq!(brief, "Plain prose.");
    }

    #[tokio::test]
    async fn test_launch_checklist_degrades_to_empty() {
        let mut mock = MockClient::new();
        configured(&mut mock);
        mock.expect_complete()
            .times(1)
            .returning(|_| Ok("no json here".to_string()));

        let session = WizardSession::new(Arc::new(mock));
        let items = session
            .launch_checklist(&ProjectConfig::default())
            .await
            .unwrap();
        assert!(items.is_empty());
    }
}
