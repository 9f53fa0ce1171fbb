use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::RequestDescriptor;

pub const TASK_PLACEHOLDER: &str = "{task}";

const QUESTION_TASK: &str = "what is time in India now";

const TESTCASE_TEMPLATE: &str = "You are a Software QA engineer , given the following user story , generate 3 testcases in Gherkin format (Given /when /then).
Provide each test case with :
- Title
-Preconditions
- Steps in Gherkin format
- Expected Results
User Story : {task}

 Respond only with JSON array of objects with fields , preconditions , Gherkin , expected.
";

const TESTCASE_STORY: &str = "As a register user, I want to create an account so that I can access member-only features.Also I should be able to reset my password so that i can regain access if i forgot the password.Also create test cases for seccurity checks for this login page";

/// Built-in prompt shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PromptPreset {
    /// Ask a plain question.
    Question,
    /// Generate Gherkin test cases for a user story.
    #[default]
    Testcases,
}

impl PromptPreset {
    pub fn template(self) -> &'static str {
        match self {
            PromptPreset::Question => TASK_PLACEHOLDER,
            PromptPreset::Testcases => TESTCASE_TEMPLATE,
        }
    }

    pub fn task(self) -> &'static str {
        match self {
            PromptPreset::Question => QUESTION_TASK,
            PromptPreset::Testcases => TESTCASE_STORY,
        }
    }
}

pub fn check_template(template: &str) -> Result<(), ConfigError> {
    if template.contains(TASK_PLACEHOLDER) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "prompt template has no {TASK_PLACEHOLDER} placeholder"
        )))
    }
}

/// Substitute every `{task}` in the template.
pub fn render(template: &str, task: &str) -> String {
    template.replace(TASK_PLACEHOLDER, task)
}

pub fn build_request(template: &str, task: &str, model: &str) -> Result<RequestDescriptor, ConfigError> {
    check_template(template)?;
    RequestDescriptor::new(render(template, task), model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_MODEL;

    #[test]
    fn question_preset_is_the_bare_task() {
        let p = PromptPreset::Question;
        assert_eq!(render(p.template(), p.task()), "what is time in India now");
    }

    #[test]
    fn testcase_prompt_embeds_story() {
        let p = PromptPreset::Testcases;
        let prompt = render(p.template(), p.task());
        assert!(prompt.starts_with("You are a Software QA engineer"));
        assert!(prompt.contains("User Story : As a register user"));
        assert!(prompt.contains("seccurity checks for this login page\n\n Respond only with JSON array"));
        assert!(!prompt.contains(TASK_PLACEHOLDER));
    }

    #[test]
    fn every_placeholder_is_replaced() {
        assert_eq!(render("{task} and {task}", "x"), "x and x");
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        let err = build_request("no slot here", "task", DEFAULT_MODEL).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn builds_descriptor_with_model() {
        let d = build_request("Q: {task}", "why?", "gpt-4.1-mini").unwrap();
        assert_eq!(d.input(), "Q: why?");
        assert_eq!(d.model(), "gpt-4.1-mini");
    }
}
