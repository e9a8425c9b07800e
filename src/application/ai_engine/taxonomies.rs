//! Taxonomies used with the constrained classifier.

use serde_json::{json, Value};

use super::classifier::Taxonomy;
use crate::domain::intent::Intent;
use crate::domain::tasks::{DocumentKind, DocumentRole, TaskTag, UNSUPPORTED_TASK};

const NONE: &str = "none";

/// Intent of a user turn, with role, document type and data sufficiency.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentTaxonomy;

impl Taxonomy for IntentTaxonomy {
    type Label = Intent;

    fn name(&self) -> &str {
        "intent"
    }

    fn schema(&self) -> Value {
        let roles: Vec<&str> = DocumentRole::ALL
            .iter()
            .map(|r| r.tag())
            .chain([NONE])
            .collect();
        let kinds: Vec<&str> = DocumentKind::all()
            .iter()
            .map(|k| k.tag())
            .chain([NONE])
            .collect();
        json!({
            "type": "object",
            "properties": {
                "intent": {"type": "string", "enum": Intent::TAGS},
                "role": {"type": "string", "enum": roles},
                "documentType": {"type": "string", "enum": kinds},
                "sufficientData": {"type": "boolean"}
            },
            "required": ["intent", "role", "documentType", "sufficientData"]
        })
    }

    fn resolve(&self, answer: &Value) -> Option<Intent> {
        let intent = answer.get("intent")?.as_str()?;
        let optional = |field: &str| {
            answer
                .get(field)
                .and_then(Value::as_str)
                .filter(|v| *v != NONE)
        };
        Intent::resolve(
            intent,
            optional("role"),
            optional("documentType"),
            answer.get("sufficientData").and_then(Value::as_bool),
        )
    }
}

/// Result of sub-task detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSelection<K> {
    Task(K),
    Unsupported,
}

/// Choice among a set of leaf tasks plus `unsupported_task`.
#[derive(Debug, Clone)]
pub struct TaskChoice<K: TaskTag> {
    name: String,
    candidates: Vec<K>,
}

impl<K: TaskTag> TaskChoice<K> {
    pub fn new(name: impl Into<String>, candidates: Vec<K>) -> Self {
        Self {
            name: name.into(),
            candidates,
        }
    }

    /// Choice over every task of `K`.
    pub fn all(name: impl Into<String>) -> Self {
        Self::new(name, K::all().to_vec())
    }

    pub fn candidates(&self) -> &[K] {
        &self.candidates
    }
}

impl<K: TaskTag> Taxonomy for TaskChoice<K> {
    type Label = TaskSelection<K>;

    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> Value {
        let tags: Vec<&str> = self
            .candidates
            .iter()
            .map(|k| k.tag())
            .chain([UNSUPPORTED_TASK])
            .collect();
        json!({
            "type": "object",
            "properties": {"task": {"type": "string", "enum": tags}},
            "required": ["task"]
        })
    }

    fn resolve(&self, answer: &Value) -> Option<TaskSelection<K>> {
        let tag = answer.get("task")?.as_str()?.trim();
        if tag == UNSUPPORTED_TASK {
            return Some(TaskSelection::Unsupported);
        }
        self.candidates
            .iter()
            .copied()
            .find(|k| k.tag() == tag)
            .map(TaskSelection::Task)
    }
}

/// Answer of a pre-flight sufficiency check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sufficiency {
    Sufficient,
    Missing(Vec<String>),
}

/// Boolean check of whether a prompt carries a specialist's inputs.
#[derive(Debug, Clone)]
pub struct SufficiencyCheck {
    name: String,
    required_inputs: Vec<String>,
}

impl SufficiencyCheck {
    pub fn new(name: impl Into<String>, required_inputs: Vec<String>) -> Self {
        Self {
            name: name.into(),
            required_inputs,
        }
    }

    /// Fallback used when the check itself fails: every input is missing.
    pub fn fallback(&self) -> Sufficiency {
        Sufficiency::Missing(self.required_inputs.clone())
    }
}

impl Taxonomy for SufficiencyCheck {
    type Label = Sufficiency;

    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "sufficient": {"type": "boolean"},
                "missing": {
                    "type": "array",
                    "items": {"type": "string", "enum": self.required_inputs}
                }
            },
            "required": ["sufficient", "missing"]
        })
    }

    fn resolve(&self, answer: &Value) -> Option<Sufficiency> {
        if answer.get("sufficient")?.as_bool()? {
            return Some(Sufficiency::Sufficient);
        }
        let listed: Vec<&str> = answer
            .get("missing")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        // Keep declared order and drop anything undeclared
        let missing: Vec<String> = self
            .required_inputs
            .iter()
            .filter(|input| listed.contains(&input.as_str()))
            .cloned()
            .collect();
        if missing.is_empty() {
            Some(self.fallback())
        } else {
            Some(Sufficiency::Missing(missing))
        }
    }
}

/// Choice of at most one corpus entry, or `N/A`.
#[derive(Debug, Clone)]
pub struct CorpusSelection {
    names: Vec<String>,
}

impl CorpusSelection {
    pub const NOT_APPLICABLE: &'static str = "N/A";

    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }
}

impl Taxonomy for CorpusSelection {
    /// Corpus entry's own name, or `None` for `N/A`.
    type Label = Option<String>;

    fn name(&self) -> &str {
        "corpus_selection"
    }

    fn schema(&self) -> Value {
        let options: Vec<&str> = self
            .names
            .iter()
            .map(String::as_str)
            .chain([Self::NOT_APPLICABLE])
            .collect();
        json!({
            "type": "object",
            "properties": {"document": {"type": "string", "enum": options}},
            "required": ["document"]
        })
    }

    fn resolve(&self, answer: &Value) -> Option<Option<String>> {
        let chosen = answer.get("document")?.as_str()?.trim();
        if chosen.eq_ignore_ascii_case(Self::NOT_APPLICABLE) {
            return Some(None);
        }
        self.names
            .iter()
            .find(|name| name.as_str() == chosen)
            .or_else(|| self.names.iter().find(|name| name.eq_ignore_ascii_case(chosen)))
            .map(|name| Some(name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tasks::StructuralTask;

    #[test]
    fn intent_schema_lists_every_option() {
        let schema = IntentTaxonomy.schema();
        let kinds = schema["properties"]["documentType"]["enum"].as_array().unwrap();
        assert_eq!(kinds.len(), DocumentKind::all().len() + 1);
        assert_eq!(schema["properties"]["intent"]["enum"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn intent_resolves_none_placeholders() {
        let answer = json!({"intent": "document_generation", "role": "hse",
                            "documentType": "none", "sufficientData": true});
        assert_eq!(
            IntentTaxonomy.resolve(&answer),
            Some(Intent::DocumentGeneration {
                role: DocumentRole::Hse,
                document_type: None
            })
        );
        let answer = json!({"intent": "document_generation", "role": "none",
                            "documentType": "toolbox_talk", "sufficientData": true});
        assert_eq!(IntentTaxonomy.resolve(&answer), Some(Intent::Conversation));
    }

    #[test]
    fn task_choice_resolves_tags_and_sentinel() {
        let choice = TaskChoice::<StructuralTask>::all("structural_subtask");
        assert_eq!(
            choice.resolve(&json!({"task": "beam_design"})),
            Some(TaskSelection::Task(StructuralTask::BeamDesign))
        );
        assert_eq!(
            choice.resolve(&json!({"task": "unsupported_task"})),
            Some(TaskSelection::Unsupported)
        );
        assert_eq!(choice.resolve(&json!({"task": "bridge"})), None);
        assert_eq!(choice.schema()["properties"]["task"]["enum"].as_array().unwrap().len(), 12);
    }

    #[test]
    fn restricted_choice_rejects_other_tasks() {
        let choice = TaskChoice::new("hse_subtask", DocumentKind::for_role(DocumentRole::Hse));
        assert_eq!(choice.resolve(&json!({"task": "daily_site_report"})), None);
    }

    #[test]
    fn sufficiency_keeps_declared_inputs_only() {
        let check = SufficiencyCheck::new(
            "beam_design_preflight",
            vec!["span".into(), "loads".into(), "material".into()],
        );
        assert_eq!(
            check.resolve(&json!({"sufficient": false, "missing": ["material", "color", "span"]})),
            Some(Sufficiency::Missing(vec!["span".into(), "material".into()]))
        );
        assert_eq!(
            check.resolve(&json!({"sufficient": false, "missing": []})),
            Some(check.fallback())
        );
        assert_eq!(
            check.resolve(&json!({"sufficient": true, "missing": []})),
            Some(Sufficiency::Sufficient)
        );
    }

    #[test]
    fn corpus_selection_returns_entry_name_verbatim() {
        let selection = CorpusSelection::new(vec!["Structural_Drawings_Rev4.pdf".into()]);
        assert_eq!(
            selection.resolve(&json!({"document": "structural_drawings_rev4.PDF"})),
            Some(Some("Structural_Drawings_Rev4.pdf".into()))
        );
        assert_eq!(selection.resolve(&json!({"document": "N/A"})), Some(None));
        assert_eq!(selection.resolve(&json!({"document": "Other.pdf"})), None);
    }
}
