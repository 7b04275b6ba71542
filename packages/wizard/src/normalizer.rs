// ABOUTME: AI response normalizer: untrusted JSON text to whitelisted structures
// ABOUTME: Only malformed JSON errors; every other invalid field is logged and defaulted

use serde_json::Value;
use sitequote_core::{
    canonical_id, is_module_id, is_page_id, AIProjectStructure, CatalogItem, Complexity,
    ExtraItem, ProjectConfig, ProjectType, DEFAULT_MODULE, DEFAULT_PAGES,
};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::error::{Result, WizardError};

/// A field that failed whitelist/type validation. Issues are logged and the
/// field falls back to its documented default; they never surface to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub detail: String,
}

fn issue(field: &'static str, detail: impl Into<String>) -> ValidationIssue {
    ValidationIssue {
        field,
        detail: detail.into(),
    }
}

fn log_issue(issue: &ValidationIssue) {
    debug!(field = issue.field, detail = %issue.detail, "AI field failed validation, using default");
}

/// Strip markdown code-fence markers some backends wrap JSON in
fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Fence-strip and parse; the only failure mode the normalizer surfaces
fn parse_json(raw_text: &str) -> Result<Value> {
    let cleaned = strip_code_fences(raw_text);
    serde_json::from_str(&cleaned).map_err(|e| WizardError::MalformedResponse(e.to_string()))
}

/// Canonical token for an arbitrary JSON array element
fn value_token(value: &Value) -> String {
    match value {
        Value::String(s) => canonical_id(s),
        other => canonical_id(&other.to_string()),
    }
}

fn validate_project_type(raw: &Value) -> std::result::Result<ProjectType, ValidationIssue> {
    match raw.get("projectType").and_then(Value::as_str) {
        Some(s) => ProjectType::parse(s)
            .ok_or_else(|| issue("projectType", format!("unrecognized value {:?}", s))),
        None => Err(issue("projectType", "missing or not a string")),
    }
}

fn validate_complexity(raw: &Value) -> std::result::Result<Complexity, ValidationIssue> {
    match raw.get("complexity").and_then(Value::as_str) {
        Some(s) => Complexity::parse(s)
            .ok_or_else(|| issue("complexity", format!("unrecognized value {:?}", s))),
        None => Err(issue("complexity", "missing or not a string")),
    }
}

/// Canonicalize, dedup (first occurrence), and whitelist an id array.
/// Dropped elements become logged issues, never errors.
fn validate_id_list(raw: &Value, field: &'static str, is_valid: fn(&str) -> bool) -> Vec<String> {
    let Some(items) = raw.get(field).and_then(Value::as_array) else {
        log_issue(&issue(field, "missing or not an array"));
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut kept = Vec::new();
    for item in items {
        let token = value_token(item);
        if token.is_empty() || !seen.insert(token.clone()) {
            continue;
        }
        if is_valid(&token) {
            kept.push(token);
        } else {
            log_issue(&issue(field, format!("id {:?} is not in the catalog", token)));
        }
    }
    kept
}

/// Copy string-typed map entries whose key is a catalogued id, regardless of
/// whether it was selected in this response. Refinements refresh rationales
/// for existing ids this way.
fn copy_catalog_map(
    raw: &Value,
    field: &'static str,
    is_valid: fn(&str) -> bool,
) -> HashMap<String, String> {
    let mut out = HashMap::new();
    let Some(map) = raw.get(field).and_then(Value::as_object) else {
        return out;
    };
    for (key, value) in map {
        if let (true, Value::String(s)) = (is_valid(key), value) {
            out.insert(key.clone(), s.clone());
        }
    }
    out
}

fn is_catalog_id(id: &str) -> bool {
    is_page_id(id) || is_module_id(id)
}

/// Copy string-typed map entries for already-validated ids only
fn copy_string_map<'a>(
    raw: &Value,
    field: &'static str,
    ids: impl Iterator<Item = &'a String>,
) -> HashMap<String, String> {
    let mut out = HashMap::new();
    let Some(map) = raw.get(field).and_then(Value::as_object) else {
        return out;
    };
    for id in ids {
        if let Some(Value::String(s)) = map.get(id) {
            out.insert(id.clone(), s.clone());
        }
    }
    out
}

/// Parse the primary analyze response into a validated structure.
///
/// Fails only when the text is not JSON after fence stripping; every other
/// missing or invalid field degrades to its documented default.
pub fn parse_structure(raw_text: &str) -> Result<AIProjectStructure> {
    let raw = parse_json(raw_text)?;

    let project_type = validate_project_type(&raw).unwrap_or_else(|i| {
        log_issue(&i);
        ProjectType::default()
    });

    let mut modules = validate_id_list(&raw, "modules", is_module_id);
    // The simplest project type never ships with zero functionality
    if modules.is_empty() && project_type == ProjectType::Landing {
        modules.push(DEFAULT_MODULE.to_string());
    }

    let mut recommended_pages = validate_id_list(&raw, "recommendedPages", is_page_id);
    // Every structure has at least a landing page and a contact point
    if recommended_pages.is_empty() {
        recommended_pages = DEFAULT_PAGES.iter().map(|s| s.to_string()).collect();
    }

    let page_labels = copy_string_map(&raw, "pageLabels", recommended_pages.iter());
    let module_labels = copy_string_map(&raw, "moduleLabels", modules.iter());
    let explanation = copy_string_map(
        &raw,
        "explanation",
        modules.iter().chain(recommended_pages.iter()),
    );

    let complexity = validate_complexity(&raw).unwrap_or_else(|i| {
        log_issue(&i);
        Complexity::default()
    });

    Ok(AIProjectStructure {
        project_type,
        modules,
        recommended_pages,
        page_labels,
        module_labels,
        complexity,
        explanation,
    })
}

/// Ids from the structure's selection that still lack a usable rationale
pub fn missing_explanation_ids(structure: &AIProjectStructure) -> Vec<String> {
    structure
        .modules
        .iter()
        .chain(structure.recommended_pages.iter())
        .filter(|id| {
            structure
                .explanation
                .get(*id)
                .map(|text| text.trim().is_empty())
                .unwrap_or(true)
        })
        .cloned()
        .collect()
}

/// Parse a gap-filling response, keeping only non-empty string values keyed
/// by an id the caller actually requested. Extra keys are discarded.
pub fn parse_filled_explanations(
    raw_text: &str,
    requested_ids: &[String],
) -> Result<HashMap<String, String>> {
    let raw = parse_json(raw_text)?;
    let mut out = HashMap::new();
    for id in requested_ids {
        if let Some(Value::String(s)) = raw.get(id) {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                out.insert(id.clone(), trimmed.to_string());
            }
        }
    }
    Ok(out)
}

/// Additional pages/modules from a refine-by-answers call, unioned into an
/// existing structure rather than replacing it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Refinement {
    pub add_pages: Vec<String>,
    pub add_modules: Vec<String>,
    pub page_labels: HashMap<String, String>,
    pub module_labels: HashMap<String, String>,
    pub explanation: HashMap<String, String>,
}

impl Refinement {
    pub fn is_empty(&self) -> bool {
        self.add_pages.is_empty() && self.add_modules.is_empty()
    }
}

/// Parse a refine-by-answers response. The label/explanation maps keep
/// entries for any catalogued id, not only the newly added ones, so a
/// refreshed rationale for an already-selected id overwrites on merge.
pub fn parse_refinement(raw_text: &str) -> Result<Refinement> {
    let raw = parse_json(raw_text)?;
    let add_pages = validate_id_list(&raw, "addPages", is_page_id);
    let add_modules = validate_id_list(&raw, "addModules", is_module_id);
    let page_labels = copy_catalog_map(&raw, "pageLabels", is_page_id);
    let module_labels = copy_catalog_map(&raw, "moduleLabels", is_module_id);
    let explanation = copy_catalog_map(&raw, "explanation", is_catalog_id);
    Ok(Refinement {
        add_pages,
        add_modules,
        page_labels,
        module_labels,
        explanation,
    })
}

/// Union a refinement into an existing structure: ids are added if absent,
/// label/explanation maps are merged with new keys winning.
pub fn merge_refinement(structure: &mut AIProjectStructure, refinement: &Refinement) {
    for id in &refinement.add_pages {
        if !structure.recommended_pages.contains(id) {
            structure.recommended_pages.push(id.clone());
        }
    }
    for id in &refinement.add_modules {
        if !structure.modules.contains(id) {
            structure.modules.push(id.clone());
        }
    }
    structure
        .page_labels
        .extend(refinement.page_labels.clone());
    structure
        .module_labels
        .extend(refinement.module_labels.clone());
    structure
        .explanation
        .extend(refinement.explanation.clone());
}

/// Parse a single-module suggestion. Modules are closed-world: an
/// unrecognized id is coerced to the fixed fallback module.
pub fn parse_suggested_module(raw_text: &str) -> Result<ExtraItem> {
    let raw = parse_json(raw_text)?;
    let token = raw
        .get("id")
        .and_then(Value::as_str)
        .map(canonical_id)
        .unwrap_or_else(|| DEFAULT_MODULE.to_string());
    let id = if is_module_id(&token) {
        token
    } else {
        debug!(suggested = %token, "suggested module outside catalog, coerced to fallback");
        DEFAULT_MODULE.to_string()
    };
    Ok(ExtraItem {
        id,
        label: raw
            .get("label")
            .and_then(Value::as_str)
            .unwrap_or("New module")
            .to_string(),
        explanation: raw
            .get("explanation")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

/// Parse a single-page suggestion. Pages are open-world: an unrecognized id
/// is kept as a freeform item with its own label and rationale.
pub fn parse_suggested_page(raw_text: &str) -> Result<CatalogItem> {
    let raw = parse_json(raw_text)?;
    let id = raw
        .get("id")
        .and_then(Value::as_str)
        .map(canonical_id)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "custom_page".to_string());
    if is_page_id(&id) {
        return Ok(CatalogItem::Catalogued { id });
    }
    Ok(CatalogItem::Freeform {
        id,
        label: raw
            .get("label")
            .and_then(Value::as_str)
            .unwrap_or("New page")
            .to_string(),
        explanation: raw
            .get("explanation")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

/// Parse a main-block label suggestion; falls back to the user's own text
pub fn parse_suggested_block_label(raw_text: &str, fallback: &str) -> Result<String> {
    let raw = parse_json(raw_text)?;
    Ok(raw
        .get("label")
        .and_then(Value::as_str)
        .unwrap_or_else(|| fallback.trim())
        .to_string())
}

/// Parse a `{ key: [strings] }` response (examples, questions, checklist)
pub fn parse_string_list(raw_text: &str, key: &str, limit: usize) -> Result<Vec<String>> {
    let raw = parse_json(raw_text)?;
    let items = raw
        .get(key)
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .take(limit)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    Ok(items)
}

/// Whitelisted suggestions of what the assembled project still lacks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recommendations {
    pub pages: Vec<String>,
    pub modules: Vec<String>,
    pub reason: String,
}

/// Parse a recommendations response; ids outside the catalogs or already
/// selected in the config are dropped.
pub fn parse_recommendations(raw_text: &str, config: &ProjectConfig) -> Result<Recommendations> {
    let raw = parse_json(raw_text)?;
    let pages = validate_id_list(&raw, "pages", is_page_id)
        .into_iter()
        .filter(|id| !config.pages.contains(id))
        .collect();
    let modules = validate_id_list(&raw, "modules", is_module_id)
        .into_iter()
        .filter(|id| !config.modules.contains(id))
        .collect();
    let reason = raw
        .get("reason")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    Ok(Recommendations {
        pages,
        modules,
        reason,
    })
}
