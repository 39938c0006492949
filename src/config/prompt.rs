use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::sync::Arc;
use log::info;

const DEFAULT_SYSTEM_PREAMBLE: &str = "You are MyCity AI Assistant, a helpful AI assistant for Malaysian citizens.
You help with:
1. Malaysian government services and processes
2. Journey planning within Malaysia
3. General citizen inquiries

Always respond in both Bahasa Malaysia and English when appropriate.
Be helpful, accurate, and provide step-by-step guidance.
Include relevant contact information and official links when available.";

const DEFAULT_ANSWER_TEMPLATE: &str = "Background information from a web search:
{context}

Citizen question: {query}";

const EMPTY_CONTEXT: &str = "(no search results)";

#[derive(Debug)]
pub enum PromptError {
    TemplateNotFound(String),
    PlaceholderMissing(String),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::TemplateNotFound(key) => write!(f, "Prompt template '{}' is empty", key),
            PromptError::PlaceholderMissing(key) =>
                write!(f, "Answer template is missing the '{}' placeholder", key),
            PromptError::IoError(e) => write!(f, "Prompt file IO error: {}", e),
            PromptError::JsonError(e) => write!(f, "Prompt JSON parsing error: {}", e),
        }
    }
}

impl Error for PromptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PromptError::IoError(e) => Some(e),
            PromptError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PromptError {
    fn from(err: std::io::Error) -> Self {
        PromptError::IoError(err)
    }
}

impl From<serde_json::Error> for PromptError {
    fn from(err: serde_json::Error) -> Self {
        PromptError::JsonError(err)
    }
}

/// Fixed persona sent ahead of every completion, plus the template for the user turn.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PromptConfig {
    pub system_preamble: String,
    pub answer_template: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system_preamble: DEFAULT_SYSTEM_PREAMBLE.to_string(),
            answer_template: DEFAULT_ANSWER_TEMPLATE.to_string(),
        }
    }
}

impl PromptConfig {
    fn validate(&self) -> Result<(), PromptError> {
        if self.system_preamble.trim().is_empty() {
            return Err(PromptError::TemplateNotFound("system_preamble".to_string()));
        }
        if self.answer_template.trim().is_empty() {
            return Err(PromptError::TemplateNotFound("answer_template".to_string()));
        }
        if !self.answer_template.contains("{query}") {
            return Err(PromptError::PlaceholderMissing("{query}".to_string()));
        }
        Ok(())
    }
}

pub fn load_prompts_from_str(json: &str) -> Result<Arc<PromptConfig>, PromptError> {
    let config: PromptConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(Arc::new(config))
}

/// Built-in prompts, or the JSON file at `path` when one is configured.
/// Keys missing from the file keep their built-in value.
pub fn load_prompts(path: Option<&str>) -> Result<Arc<PromptConfig>, PromptError> {
    match path {
        Some(path) => {
            info!("Loading prompts from: {}", path);
            let file_content = fs::read_to_string(path)?;
            load_prompts_from_str(&file_content)
        }
        None => Ok(Arc::new(PromptConfig::default())),
    }
}

pub fn get_answer_prompt(config: &PromptConfig, query: &str, context: &str) -> String {
    let context = if context.trim().is_empty() { EMPTY_CONTEXT } else { context };
    config.answer_template.replace("{context}", context).replace("{query}", query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_and_bilingual() {
        let config = load_prompts(None).unwrap();
        assert!(config.validate().is_ok());
        assert!(config.system_preamble.contains("Bahasa Malaysia and English"));
    }

    #[test]
    fn answer_prompt_substitutes_query_and_context() {
        let config = PromptConfig::default();
        let prompt = get_answer_prompt(&config, "Where to eat?", "Cyberjaya is a city.");
        assert!(prompt.contains("Cyberjaya is a city."));
        assert!(prompt.ends_with("Citizen question: Where to eat?"));

        let prompt = get_answer_prompt(&config, "Where to eat?", "");
        assert!(prompt.contains(EMPTY_CONTEXT));
    }

    #[test]
    fn partial_override_keeps_default_preamble() {
        let config = load_prompts_from_str(r#"{"answer_template": "Q: {query}\nC: {context}"}"#).unwrap();
        assert_eq!(config.system_preamble, DEFAULT_SYSTEM_PREAMBLE);
        assert_eq!(get_answer_prompt(&config, "hi", "ctx"), "Q: hi\nC: ctx");
    }

    #[test]
    fn template_without_query_is_rejected() {
        let err = load_prompts_from_str(r#"{"answer_template": "no placeholder"}"#).unwrap_err();
        assert!(matches!(err, PromptError::PlaceholderMissing(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_prompts(Some("/nonexistent/prompts.json")).unwrap_err();
        assert!(matches!(err, PromptError::IoError(_)));
    }
}
