// ABOUTME: Prompt builders for every AI-backed wizard operation
// ABOUTME: All prompts request strict JSON and embed the closed id catalogs

use sitequote_core::{BriefState, PriceRange, ProjectConfig, ProjectType, MODULE_IDS, PAGE_IDS};

/// Cap on how much of the user description is quoted into follow-up prompts
const DESCRIPTION_QUOTE_LIMIT: usize = 500;

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

fn join_or_none(ids: &[String]) -> String {
    if ids.is_empty() {
        "none".to_string()
    } else {
        ids.join(", ")
    }
}

/// One-line summary of the current configuration, shared by several prompts
pub fn config_summary(config: &ProjectConfig) -> String {
    format!(
        "Project type: {}. Pages: {}. Modules: {}. Design: {}. Timeline: {}.",
        config.project_type.as_str(),
        join_or_none(&config.pages),
        join_or_none(&config.modules),
        config.design_level.as_str(),
        config.timeline.as_str()
    )
}

/// System prompt for the primary analyze call: classify the project and
/// propose a full structure, with a sensible minimum per project type.
pub fn analyze_system_prompt() -> String {
    format!(
        r#"You are an AI architect for web projects. From the user's text, determine the project type and propose the full structure: the pages and modules such a project actually needs.

CRITICAL - always include a sensible minimum per project type:

- ecommerce (online store): MUST have recommendedPages: home, catalog, product, cart, checkout, account, contacts (or faq). MUST have modules: auth, user_dashboard, payments, search, forms. Add when relevant: reviews, admin_panel, integrations.
- catalog (product/service catalog without a cart): home, catalog, product, contacts; modules: search, forms. If a user account is mentioned - auth, user_dashboard.
- saas / web_app (subscription service or web application): MUST have home, pricing (or services), account; MUST have modules: auth, user_dashboard, payments or subscriptions. When relevant: admin_panel, analytics, notifications, integrations.
- booking: MUST have home, booking_form, account, contacts; MUST have modules: auth, booking_calendar, forms. When relevant: payments, user_dashboard, notifications.
- corporate (company site): home, about, services, contacts; when relevant: team, portfolio, cases, faq; modules: forms, multilang if needed.
- landing (single-goal landing page): home, contacts; modules: forms. Keep pages to a minimum.
- blog / media: home, blog, contacts; when relevant: multilang; modules: search, forms.
- crm (internal system): home, account; modules: auth, user_dashboard, admin_panel, analytics, export; when relevant: integrations, notifications.

Additionally: if the text mentions online payments - include payments; a calculator - calculator; multiple languages - multilang; support chat - chat; mailings or notifications - notifications; data export - export.

Page ids (only from this list): {pages}.
Module ids (only from this list): {modules}.

For EVERY page in recommendedPages and EVERY module in modules, fill in:
- explanation[id] - exactly one short sentence on why this project needs it. Do not skip a single id.
- pageLabels[id] / moduleLabels[id] - a short display name (2-3 words).

The explanation object must contain ALL ids from modules and ALL ids from recommendedPages. No exceptions.

projectType - strictly one of: landing, corporate, web_app, crm, ecommerce, blog, catalog, saas, booking.

Return STRICTLY valid JSON, no markdown or extra text:
{{
  "projectType": "a type from the list above",
  "modules": ["array of module ids"],
  "recommendedPages": ["array of page ids"],
  "pageLabels": {{ "id": "Display name" }},
  "moduleLabels": {{ "id": "Display name" }},
  "complexity": "low" | "medium" | "high",
  "explanation": {{ "every id from modules and recommendedPages": "one short sentence" }}
}}"#,
        pages = PAGE_IDS.join(", "),
        modules = MODULE_IDS.join(", ")
    )
}

/// Gap-filling follow-up: one sentence for every id still lacking a rationale
pub fn fill_explanations_prompt(
    description: &str,
    project_type: ProjectType,
    missing_ids: &[String],
) -> String {
    format!(
        r#"Project description: "{description}". Project type: {project_type}.

For EACH of the following ids (modules or pages) write one short sentence on why this project needs it. Do not skip any.
IDs: {ids}

Return STRICTLY JSON without markdown: an object where each key is an id from the list and each value is one sentence. Example: {{ "auth": "Sign-in for the customer account and orders.", "forms": "Request and feedback forms." }}"#,
        description = truncate_chars(description, DESCRIPTION_QUOTE_LIMIT),
        project_type = project_type.as_str(),
        ids = missing_ids.join(", ")
    )
}

pub fn suggest_page_prompt(description: &str) -> String {
    format!(
        r#"The user wants to add one more page to the site. Description: "{description}".

Return ONE page as JSON:
- id - latin snake_case (if an existing type fits, use one from the list: {pages}; otherwise invent an id, e.g. delivery, privacy_policy, guarantees).
- label - a short display name (2-3 words).
- explanation - one sentence on why this page is needed.

JSON only, no markdown: {{ "id": "...", "label": "...", "explanation": "..." }}"#,
        pages = PAGE_IDS.join(", ")
    )
}

pub fn suggest_module_prompt(description: &str) -> String {
    format!(
        r#"The user wants to add one more functional module to the site. Description: "{description}".

Return ONE module as JSON:
- id - strictly one of the list (snake_case): {modules}. Pick the closest match; if the description fits none, choose the nearest one (e.g. "online payment" -> payments, "calculator" -> calculator).
- label - a short display name (2-3 words).
- explanation - one sentence on why this module belongs in the project.

JSON only, no markdown: {{ "id": "...", "label": "...", "explanation": "..." }}"#,
        modules = MODULE_IDS.join(", ")
    )
}

pub fn suggest_main_block_prompt(user_text: &str) -> String {
    format!(
        r#"The user wants to add a block to the site's main page. Their description: "{user_text}". Come up with a short block name (2-4 words), for example: "Calculator", "Work gallery", "Partners", "Company video". Return STRICTLY JSON: {{ "label": "Block name" }}. No markdown."#
    )
}

/// Clarifying yes/no questions for a short project description
pub fn clarifying_questions_prompt(description: &str) -> String {
    format!(
        r#"The user briefly described a project: "{description}". Generate 2-3 short clarifying yes/no questions to find out whether they need a user account, online payments, multiple languages, a chat, and so on. Return STRICTLY JSON: {{ "questions": ["question 1", "question 2"] }}. Questions only."#
    )
}

/// Display names for the wizard steps that support clarifying questions
pub fn step_name(step: u32) -> Option<&'static str> {
    match step {
        2 => Some("Extras"),
        3 => Some("Project type"),
        4 => Some("Page structure"),
        5 => Some("Functionality (modules)"),
        6 => Some("Design & UX"),
        7 => Some("Timeline"),
        _ => None,
    }
}

pub fn step_clarifying_questions_prompt(
    step_label: &str,
    description: &str,
    config: &ProjectConfig,
) -> String {
    let context = format!(
        "Description: \"{}\". {}",
        if description.trim().is_empty() {
            "not provided"
        } else {
            description.trim()
        },
        config_summary(config)
    );
    format!(
        r#"The user is on the "{step_label}" step of a website configurator. Context: {context}. Generate 2-3 short clarifying questions (yes/no or a choice) that help pin down the selection on THIS step. Return STRICTLY JSON: {{ "questions": ["question 1", "question 2"] }}. Questions only."#
    )
}

/// Refine-by-answers: request only the missing pages/modules
pub fn refine_prompt(description: &str, answers_summary: &str) -> String {
    format!(
        r#"Project description: "{description}". User clarifications: {answers_summary}. Add ONLY the missing pages and modules (ids from the same lists as the main prompt; pages: {pages}; modules: {modules}). Return JSON: {{ "addPages": ["id"], "addModules": ["id"], "pageLabels": {{}}, "moduleLabels": {{}}, "explanation": {{}} }}."#,
        pages = PAGE_IDS.join(", "),
        modules = MODULE_IDS.join(", ")
    )
}

pub fn explain_price_prompt(config: &ProjectConfig, price: &PriceRange) -> String {
    format!(
        "{summary}\nPrice range: {min} - {max}.\nExplain to the user in plain language what makes up this price (2-3 sentences). No lists, text only.",
        summary = config_summary(config),
        min = price.min,
        max = price.max
    )
}

pub fn brief_prompt(description: &str, config: &ProjectConfig) -> String {
    format!(
        "Write a short technical brief (1-2 paragraphs) for building a website/service. Client description: \"{description}\". {summary} Plain text, no markdown.",
        summary = config_summary(config)
    )
}

/// Recommendations over the full assembled project, including brief context
pub fn recommendations_prompt(
    config: &ProjectConfig,
    description: &str,
    brief: Option<&BriefState>,
) -> String {
    let mut context_parts = vec![
        format!("Project type: {}.", config.project_type.as_str()),
        format!("Timeline: {}.", config.timeline.as_str()),
        format!("Pages (already selected): {}.", join_or_none(&config.pages)),
        format!(
            "Modules (already selected): {}.",
            join_or_none(&config.modules)
        ),
    ];
    let description = description.trim();
    if !description.is_empty() {
        context_parts.push(format!(
            "Original client description: \"{}\".",
            truncate_chars(description, 600)
        ));
    }
    if let Some(brief) = brief {
        context_parts.push(format!("Design style: {:?}.", brief.design_style));
        if !brief.ux_options.is_empty() {
            context_parts.push(format!("UX/interactivity: {}.", brief.ux_options.join(", ")));
        }
        if !brief.main_page_blocks.is_empty() {
            context_parts.push(format!(
                "Main page blocks: {}.",
                brief.main_page_blocks.join(", ")
            ));
        }
        if !brief.reference_urls.is_empty() {
            let refs: Vec<&str> = brief.reference_urls.iter().take(3).map(String::as_str).collect();
            context_parts.push(format!("Client references: {}.", refs.join("; ")));
        }
        if !brief.payment_methods.is_empty() {
            context_parts.push(format!(
                "Payment methods: {}.",
                brief.payment_methods.join(", ")
            ));
        }
        if !brief.integrations.is_empty() {
            context_parts.push(format!("Integrations: {}.", brief.integrations.join(", ")));
        }
        if !brief.notification_channels.is_empty() {
            context_parts.push(format!(
                "Notification channels: {}.",
                brief.notification_channels.join(", ")
            ));
        }
        let comment = brief.comment.trim();
        if !comment.is_empty() {
            context_parts.push(format!(
                "Client comment: \"{}\".",
                truncate_chars(comment, 300)
            ));
        }
    }
    let context = context_parts.join("\n");

    format!(
        r#"Below is the full picture of the assembled project. Analyze it and suggest what is genuinely missing for a successful launch: conversion, usability, completeness, legal protection, SEO, integrations.

{context}

Allowed page ids (only from this list): {pages}.
Allowed module ids (only from this list): {modules}.

Rules:
- Suggest only what is NOT already among the current pages and modules.
- At most 0-3 pages and 0-3 modules; only if they genuinely fit this project.
- reason - one or two specific sentences on why this project needs them.
- If the structure is already complete, return empty arrays and reason: "The project structure is complete, no further recommendations."

Return STRICTLY JSON without markdown: {{ "pages": ["id1", ...], "modules": ["id1", ...], "reason": "rationale text" }}."#,
        pages = PAGE_IDS.join(", "),
        modules = MODULE_IDS.join(", ")
    )
}

pub fn launch_checklist_prompt(config: &ProjectConfig) -> String {
    format!(
        r#"Project type: {}. Pages: {}. Modules: {}. Put together a short "What to prepare before the project starts" checklist: 4-6 items (domain, access credentials, copy, photos, logo, and so on). Return STRICTLY JSON: {{ "items": ["item 1", "item 2", ...] }}. No markdown."#,
        config.project_type.as_str(),
        join_or_none(&config.pages),
        join_or_none(&config.modules)
    )
}

/// Three one-line example descriptions shown as hints on the first step
pub fn example_descriptions_prompt() -> String {
    r#"Come up with 3 different short example descriptions of a website/service for a configurator (as a client would write in one line). Vary the types: e.g. an online store, a booking site, a service landing page, a company site, a SaaS. Each example is one sentence, up to 80 characters. Return STRICTLY JSON: { "examples": ["example 1", "example 2", "example 3"] }. No markdown."#
        .to_string()
}
