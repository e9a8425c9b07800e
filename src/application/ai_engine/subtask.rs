//! Sub-task detection for a domain agent.

use tracing::info;

use super::classifier::ConstrainedClassifier;
use super::taxonomies::{TaskChoice, TaskSelection};
use crate::domain::tasks::{TaskTag, UNSUPPORTED_TASK};

/// Picks one leaf task of a domain agent, or `unsupported_task`.
///
/// Never errors: every classification failure resolves to `Unsupported`.
#[derive(Clone)]
pub struct SubtaskDetector {
    classifier: ConstrainedClassifier,
}

impl SubtaskDetector {
    pub fn new(classifier: ConstrainedClassifier) -> Self {
        Self { classifier }
    }

    /// Detects the task among `candidates` for `prompt`.
    ///
    /// `hint` is an upstream guess (the intent's document type) passed to the
    /// model inside the prompt; the model still makes the final choice.
    pub async fn detect<K: TaskTag>(
        &self,
        agent: &str,
        candidates: Vec<K>,
        prompt: &str,
        hint: Option<K>,
        trace_id: &str,
    ) -> TaskSelection<K> {
        let choice = TaskChoice::new(format!("{}_subtask", agent), candidates);
        let instruction = Self::instruction(agent, choice.candidates());
        let prompt = match hint {
            Some(hint) => format!(
                "{}\n\n(Upstream classifier suggested: {})",
                prompt,
                hint.tag()
            ),
            None => prompt.to_string(),
        };

        let selection = self
            .classifier
            .classify(&choice, &instruction, &prompt, trace_id, TaskSelection::Unsupported)
            .await;
        info!(
            agent,
            trace_id,
            task = match selection {
                TaskSelection::Task(k) => k.tag(),
                TaskSelection::Unsupported => UNSUPPORTED_TASK,
            },
            "sub-task detected"
        );
        selection
    }

    fn instruction<K: TaskTag>(agent: &str, candidates: &[K]) -> String {
        let options: Vec<String> = candidates
            .iter()
            .map(|k| format!("- {}: {}", k.tag(), k.label()))
            .collect();
        format!(
            "You route requests for the {agent} agent of a construction site assistant.\n\
             Choose exactly one task tag for the user's request from:\n{}\n\
             - {UNSUPPORTED_TASK}: the request fits none of the tasks above\n\
             Answer with JSON only.",
            options.join("\n")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::domain::tasks::{DocumentKind, DocumentRole, StructuralTask};
    use std::sync::Arc;
    use std::time::Duration;

    fn detector(provider: &MockAIProvider) -> SubtaskDetector {
        SubtaskDetector::new(ConstrainedClassifier::new(
            Arc::new(provider.clone()),
            Duration::from_secs(1),
        ))
    }

    #[tokio::test]
    async fn detects_structural_task() {
        let provider = MockAIProvider::new().with_response(r#"{"task":"column_design"}"#);
        let selection = detector(&provider)
            .detect(
                "structural",
                StructuralTask::all().to_vec(),
                "Size a column for 1200 kN",
                None,
                "t",
            )
            .await;

        assert_eq!(selection, TaskSelection::Task(StructuralTask::ColumnDesign));
        assert_eq!(provider.operations(), vec!["structural_subtask"]);
        let system = provider.get_calls()[0].system_prompt.clone().unwrap();
        assert!(system.contains("column_design: Column Design"));
        assert!(system.contains(UNSUPPORTED_TASK));
    }

    #[tokio::test]
    async fn hint_is_passed_inside_prompt() {
        let provider = MockAIProvider::new().with_response(r#"{"task":"toolbox_talk"}"#);
        let selection = detector(&provider)
            .detect(
                "hse",
                DocumentKind::for_role(DocumentRole::Hse),
                "prepare a talk on ladders",
                Some(DocumentKind::ToolboxTalk),
                "t",
            )
            .await;

        assert_eq!(selection, TaskSelection::Task(DocumentKind::ToolboxTalk));
        let user = &provider.get_calls()[0].messages[0].content;
        assert!(user.contains("suggested: toolbox_talk"));
    }

    #[tokio::test]
    async fn failure_resolves_to_unsupported() {
        let provider = MockAIProvider::new().with_response("garbage");
        let selection = detector(&provider)
            .detect("structural", StructuralTask::all().to_vec(), "x", None, "t")
            .await;
        assert_eq!(selection, TaskSelection::Unsupported);
    }
}
