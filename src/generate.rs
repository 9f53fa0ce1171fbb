use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::brain::TextGenerator;
use crate::output::{self, OutputMode};
use crate::prompt;
use crate::settings::GenerationSettings;
use crate::types::RequestDescriptor;

pub fn descriptor_for(settings: &GenerationSettings) -> Result<RequestDescriptor> {
    prompt::build_request(settings.template(), settings.task(), &settings.model)
        .context("failed to build request")
}

/// Send one request and print the result to `out`; optionally keep a copy.
pub async fn run_generation<W: Write>(
    generator: &dyn TextGenerator,
    descriptor: &RequestDescriptor,
    mode: OutputMode,
    save_to: Option<&Path>,
    out: &mut W,
) -> Result<()> {
    let response = generator
        .send_request(descriptor)
        .await
        .context("error calling OpenAI")?;

    let rendered = output::emit(&response, mode, out)?;

    if let Some(path) = save_to {
        output::save(path, &rendered)?;
        info!("[Agent] Saved response to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::prompt::PromptPreset;
    use crate::types::ResponseValue;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct Canned {
        seen: Mutex<Vec<RequestDescriptor>>,
        fail: bool,
    }

    impl Canned {
        fn new(fail: bool) -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    #[async_trait]
    impl TextGenerator for Canned {
        async fn send_request(&self, descriptor: &RequestDescriptor) -> Result<ResponseValue, ServiceError> {
            self.seen.lock().unwrap().push(descriptor.clone());
            if self.fail {
                return Err(ServiceError::Api {
                    status: 429,
                    message: "quota exceeded".into(),
                });
            }
            Ok(ResponseValue(json!({
                "output": [{"type": "message", "content": [{"type": "output_text", "text": "[]"}]}]
            })))
        }
    }

    #[test]
    fn default_descriptor_is_the_testcase_prompt() {
        let d = descriptor_for(&GenerationSettings::default()).unwrap();
        assert_eq!(d.model(), "gpt-4.1-mini");
        assert!(d.input().contains("Gherkin"));
    }

    #[test]
    fn task_override_replaces_story() {
        let settings = GenerationSettings {
            preset: PromptPreset::Question,
            task: Some("what day is it".into()),
            ..Default::default()
        };
        assert_eq!(descriptor_for(&settings).unwrap().input(), "what day is it");
    }

    #[tokio::test]
    async fn prints_output_and_sends_once() {
        let generator = Canned::new(false);
        let descriptor = descriptor_for(&GenerationSettings::default()).unwrap();
        let mut out = Vec::new();

        run_generation(&generator, &descriptor, OutputMode::Raw, None, &mut out)
            .await
            .unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("output_text"));
        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], descriptor);
    }

    #[tokio::test]
    async fn service_failure_propagates_without_output() {
        let generator = Canned::new(true);
        let descriptor = descriptor_for(&GenerationSettings::default()).unwrap();
        let mut out = Vec::new();

        let err = run_generation(&generator, &descriptor, OutputMode::Raw, None, &mut out)
            .await
            .unwrap_err();

        assert!(out.is_empty());
        assert!(format!("{err:#}").contains("quota exceeded"));
        assert_eq!(generator.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn saves_copy_when_asked() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("generated-tests/out.txt");
        let generator = Canned::new(false);
        let descriptor = descriptor_for(&GenerationSettings::default()).unwrap();
        let mut out = Vec::new();

        run_generation(&generator, &descriptor, OutputMode::Text, Some(&path), &mut out)
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap(), "[]");
        assert_eq!(String::from_utf8(out).unwrap(), "[]\n");
    }
}
