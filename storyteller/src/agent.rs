use anyhow::Result;
use taleweaver::{Arc, Category, ClassificationService};

use crate::llm::{ChatMessage, ChatRequest, TextGenerator};

const STORY_MAX_TOKENS: u32 = 450;
const STORY_TEMPERATURE: f32 = 0.7;
const JUDGE_MAX_TOKENS: u32 = 50;
const JUDGE_TEMPERATURE: f32 = 0.1;

/// A generated story and how it was produced.
#[derive(Clone, Debug, PartialEq)]
pub struct Story {
    pub category: Category,
    pub arc: Arc,
    pub text: String,
    /// `false` if the first draft failed the judge and was replaced.
    pub passed_first_judgement: bool,
}

/// Returns `true` if the judge's reply is a passing verdict.
pub fn is_pass(verdict: &str) -> bool {
    verdict.trim().to_uppercase().starts_with("PASS")
}

pub struct StoryAgent<'a, G> {
    generator: G,
    classifier: &'a ClassificationService,
}

impl<'a, G> StoryAgent<'a, G>
where
    G: TextGenerator,
{
    pub fn new(generator: G, classifier: &'a ClassificationService) -> Self {
        Self {
            generator,
            classifier,
        }
    }

    pub fn generate_story(&self, topic: &str, arc: Arc, category: Category) -> Result<String> {
        let prompt = format!(
            "You are a storyteller for children aged 5-10. \
             Please write a story of **about 225 words** and no more than 250 words total. \
             Use simple vocabulary, gentle themes, and a '{arc}' story structure. \
             Category: {}. Topic: {topic}.",
            category.display_name(),
        );
        self.generator.complete(&ChatRequest {
            messages: vec![ChatMessage::system(prompt), ChatMessage::user(topic)],
            max_tokens: STORY_MAX_TOKENS,
            temperature: STORY_TEMPERATURE,
        })
    }

    pub fn judge_story(&self, topic: &str, story: &str) -> Result<bool> {
        let prompt = format!(
            "Please evaluate this story for: \
             (1) Age-appropriateness (5-10), \
             (2) Coherence & engagement, \
             (3) Simple vocabulary. \
             (4) Adherence to original prompt: {topic}\n\
             Respond with 'PASS' or 'FAIL'.\n\nStory:\n{story}"
        );
        let verdict = self.generator.complete(&ChatRequest {
            messages: vec![
                ChatMessage::system("You are a helpful judge."),
                ChatMessage::user(prompt),
            ],
            max_tokens: JUDGE_MAX_TOKENS,
            temperature: JUDGE_TEMPERATURE,
        })?;
        log::debug!("judge verdict: {verdict:?}");
        Ok(is_pass(&verdict))
    }

    pub fn apply_feedback(&self, story: &str, feedback: &str) -> Result<String> {
        let prompt = format!(
            "Original story:\n{story}\n\nUser feedback: '{feedback}'. Please revise accordingly."
        );
        self.generator.complete(&ChatRequest {
            messages: vec![
                ChatMessage::system("You are a story editor."),
                ChatMessage::user(prompt),
            ],
            max_tokens: STORY_MAX_TOKENS,
            temperature: STORY_TEMPERATURE,
        })
    }

    /// Classifies the request, writes a story and regenerates it once if the judge rejects it.
    ///
    /// The regenerated story is returned without a second judgement.
    pub fn tell(&self, topic: &str) -> Result<Story> {
        let (category, arc) = self.classifier.classify_with_arc(topic)?;
        log::info!("category: {category}, arc: {arc}");

        let mut text = self.generate_story(topic, arc, category)?;
        let passed = self.judge_story(topic, &text)?;
        if !passed {
            log::info!("initial story did not pass the judge");
            text = self.generate_story(topic, arc, category)?;
        }
        Ok(Story {
            category,
            arc,
            text,
            passed_first_judgement: passed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;
    use std::collections::VecDeque;

    use taleweaver::errors::TaleweaverError;
    use taleweaver::{Classifier, Example, ModelStore};

    struct ScriptedGenerator {
        replies: RefCell<VecDeque<String>>,
        requests: RefCell<Vec<ChatRequest>>,
    }

    impl ScriptedGenerator {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: RefCell::new(replies.iter().map(|r| r.to_string()).collect()),
                requests: RefCell::new(vec![]),
            }
        }
    }

    impl TextGenerator for ScriptedGenerator {
        fn complete(&self, request: &ChatRequest) -> Result<String> {
            self.requests.borrow_mut().push(request.clone());
            self.replies
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("no scripted reply left"))
        }
    }

    fn service() -> ClassificationService {
        let corpus = [
            Example::new("Count the stars before sleep", Category::NumberJourney),
            Example::new("Sing me a gentle rhyme about moonlight", Category::LullabyRhyme),
        ];
        let classifier = Classifier::train(&corpus).unwrap();
        ClassificationService::with_classifier(ModelStore::default(), classifier)
    }

    #[test]
    fn test_is_pass() {
        assert!(is_pass("PASS"));
        assert!(is_pass("  pass - lovely story"));
        assert!(!is_pass("FAIL"));
        assert!(!is_pass("I think it should PASS"));
        assert!(!is_pass(""));
    }

    #[test]
    fn test_tell_pass() {
        let service = service();
        let generator = ScriptedGenerator::new(&["Once upon a time...", "PASS"]);
        let agent = StoryAgent::new(&generator, &service);

        let story = agent.tell("Count the sheep before sleep").unwrap();
        assert_eq!(Category::NumberJourney, story.category);
        assert_eq!(Arc::Cumulative, story.arc);
        assert_eq!("Once upon a time...", story.text);
        assert!(story.passed_first_judgement);

        let requests = generator.requests.borrow();
        assert_eq!(2, requests.len());
        let system = &requests[0].messages[0].content;
        assert!(system.contains("'Cumulative' story structure"));
        assert!(system.contains("Category: Number Journey."));
        assert!(system.contains("Topic: Count the sheep before sleep."));
        assert_eq!(450, requests[0].max_tokens);
        assert_eq!(50, requests[1].max_tokens);
        assert!(requests[1].messages[1].content.ends_with("Story:\nOnce upon a time..."));
    }

    #[test]
    fn test_tell_regenerates_once() {
        let service = service();
        let generator = ScriptedGenerator::new(&["first draft", "FAIL", "second draft"]);
        let agent = StoryAgent::new(&generator, &service);

        let story = agent.tell("a gentle rhyme").unwrap();
        assert_eq!(Category::LullabyRhyme, story.category);
        assert_eq!("second draft", story.text);
        assert!(!story.passed_first_judgement);
        assert_eq!(3, generator.requests.borrow().len());
    }

    #[test]
    fn test_apply_feedback() {
        let service = service();
        let generator = ScriptedGenerator::new(&["a shorter story"]);
        let agent = StoryAgent::new(&generator, &service);

        let revised = agent.apply_feedback("a long story", "make it shorter").unwrap();
        assert_eq!("a shorter story", revised);
        let requests = generator.requests.borrow();
        assert_eq!(
            "Original story:\na long story\n\nUser feedback: 'make it shorter'. Please revise accordingly.",
            requests[0].messages[1].content
        );
    }

    #[test]
    fn test_tell_without_model() {
        let dir = tempfile::tempdir().unwrap();
        let service =
            ClassificationService::new(ModelStore::new(dir.path().join("classifier.model")));
        let generator = ScriptedGenerator::new(&[]);
        let agent = StoryAgent::new(&generator, &service);

        let e = agent.tell("a dragon").unwrap_err();
        assert!(matches!(
            e.downcast_ref::<TaleweaverError>(),
            Some(TaleweaverError::ModelNotFound(_))
        ));
        assert!(generator.requests.borrow().is_empty());
    }
}
