//! Prompt templates for Roost.
//!
//! Every template can be overridden from the `[prompts]` section of the
//! configuration file. Placeholders use `{{name}}` syntax.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub gate: GatePrompts,
    pub rag: RagPrompts,
    pub lab: LabPrompts,
    pub diagnosis: DiagnosisPrompts,
}


/// Prompts for the model-classifier relevance gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatePrompts {
    pub system: String,
    pub user: String,
}

impl Default for GatePrompts {
    fn default() -> Self {
        Self {
            system: "You are a strict topic classifier for a poultry-farming assistant. \
                     Decide whether a question is about poultry farming, poultry health, \
                     egg or meat production, or closely related husbandry topics. \
                     Respond with exactly one word: YES or NO. No punctuation, no explanation."
                .to_string(),

            user: "Question: {{question}}\n\nIs this question about poultry farming? Answer YES or NO."
                .to_string(),
        }
    }
}

/// Prompts for RAG answer generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    pub system: String,
    pub user: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            system: "You are a poultry-farming assistant that answers questions from the \
                     user's reference library.\n\n\
                     Guidelines:\n\
                     - Answer using only the provided context excerpts\n\
                     - Cite the source document name for claims you make\n\
                     - If the context does not contain the answer, say so clearly\n\
                     - Be concise but thorough\n\
                     - When multiple excerpts are relevant, synthesize across them"
                .to_string(),

            user: "Question: {{question}}\n\nRelevant excerpts from the reference library:\n\n{{context}}"
                .to_string(),
        }
    }
}

/// Prompt for laboratory report analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabPrompts {
    pub instruction: String,
}

impl Default for LabPrompts {
    fn default() -> Self {
        Self {
            instruction: "You are an expert veterinary specialist with deep knowledge of \
                          poultry farming, especially layer birds. Analyze the following \
                          veterinary lab report of a layer bird and provide a comprehensive \
                          assessment. Focus on identifying health issues, possible diseases, \
                          recommended treatment and medication, nutritional deficiencies, \
                          and environmental stress factors."
                .to_string(),
        }
    }
}

/// Prompt for disease image diagnosis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosisPrompts {
    pub instruction: String,
}

impl Default for DiagnosisPrompts {
    fn default() -> Self {
        Self {
            instruction: "Analyze this image and diagnose any poultry disease. \
                          Provide possible symptoms and treatments."
                .to_string(),
        }
    }
}

/// Substitute `{{name}}` placeholders in a template.
pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{{{}}}}}", key), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_placeholders() {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "How warm should a brooder be?".to_string());

        let rendered = render("Q: {{question}}", &vars);
        assert_eq!(rendered, "Q: How warm should a brooder be?");
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        let vars = HashMap::new();
        let rendered = render("Q: {{question}}", &vars);
        assert_eq!(rendered, "Q: {{question}}");
    }

    #[test]
    fn test_defaults_mention_expected_tokens() {
        let prompts = Prompts::default();
        assert!(prompts.gate.system.contains("YES or NO"));
        assert!(prompts.rag.user.contains("{{context}}"));
        assert!(prompts.lab.instruction.contains("veterinary"));
    }
}
