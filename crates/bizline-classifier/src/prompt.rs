//! LLM prompt engineering for business-line classification

use bizline_domain::Label;

/// A fixed few-shot example
struct Example {
    text: &'static str,
    label: &'static str,
}

/// The two examples shown with every request; fixed so runs are reproducible
const FEW_SHOT_EXAMPLES: [Example; 2] = [
    Example {
        text: "Responsible for managing a team of analysts covering the technology sector. Produces detailed research reports on public companies, including financial analysis, industry trends, and stock recommendations.",
        label: "Research - Equity research",
    },
    Example {
        text: "Led the execution of multiple IPOs and follow-on offerings for technology companies. Worked closely with clients to structure offerings and coordinate with legal teams and regulators.",
        label: "Investment Banking - Capital Markets (ECM&DCM)",
    },
];

/// Builds the system and user messages for one classification call
pub struct PromptBuilder<'a> {
    text: &'a str,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder for already-normalized text
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// Build the system message: guidelines, labels, descriptions, output rules
    pub fn system_message(&self) -> String {
        let mut prompt = String::new();

        // 1. Task guidelines
        prompt.push_str(TASK_GUIDELINES);
        prompt.push_str("\n\n");

        // 2. Label list
        prompt.push_str("Choose the most appropriate label from:\n");
        for label in Label::all() {
            prompt.push_str(&format!("- {}\n", label.name()));
        }
        prompt.push('\n');

        // 3. Label descriptions
        prompt.push_str("Label descriptions:\n");
        for label in Label::all() {
            prompt.push_str(&format!("- {}: {}\n", label.name(), label.description()));
        }
        prompt.push('\n');

        // 4. Output rules
        prompt.push_str(OUTPUT_GUIDELINES);

        prompt
    }

    /// Build the user message: few-shot examples followed by the input text
    pub fn user_message(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str("Some examples with their output answers are provided below:\n\n");
        for example in &FEW_SHOT_EXAMPLES {
            prompt.push_str(&format!("Text: {}\nLabel: {}\n\n", example.text, example.label));
        }

        prompt.push_str("Now I want you to label the following example:\n");
        prompt.push_str(&format!("Text: {}\nLabel:", self.text));

        prompt
    }
}

const TASK_GUIDELINES: &str = r#"You are an expert in categorizing the business line or product in financial services roles based on their respective industries and job functions.
Your task is to categorize each experience from the input text into the appropriate label.

Important rules:
- Always focus on the business line or product the employee worked on and financial services-related terminology in the text.
- Don't be distracted by position or company name; focus entirely on the responsibilities and tasks in the experience description."#;

const OUTPUT_GUIDELINES: &str = "Important: Return ONLY the exact label from the list above. Do not add any additional text, explanation, or punctuation.";

#[cfg(test)]
mod tests {
    use super::*;
    use bizline_domain::TAXONOMY;

    #[test]
    fn test_system_message_lists_every_label_and_description() {
        let system = PromptBuilder::new("text").system_message();
        for label in TAXONOMY.iter() {
            assert!(system.contains(label.name()), "missing {}", label.name());
            assert!(system.contains(label.description()));
        }
    }

    #[test]
    fn test_system_message_includes_instructions() {
        let system = PromptBuilder::new("text").system_message();
        assert!(system.contains("categorizing the business line"));
        assert!(system.contains("Return ONLY the exact label"));
    }

    #[test]
    fn test_user_message_includes_fixed_examples() {
        let first = PromptBuilder::new("one").user_message();
        let second = PromptBuilder::new("one").user_message();
        assert_eq!(first, second);

        for example in &FEW_SHOT_EXAMPLES {
            assert!(first.contains(example.text));
            assert!(first.contains(&format!("Label: {}", example.label)));
        }
    }

    #[test]
    fn test_user_message_ends_with_input() {
        let user = PromptBuilder::new("Managed FX hedging for importers").user_message();
        assert!(user.ends_with("Text: Managed FX hedging for importers\nLabel:"));
    }

    #[test]
    fn test_few_shot_labels_are_in_taxonomy() {
        for example in &FEW_SHOT_EXAMPLES {
            assert!(Label::is_known(example.label));
        }
    }
}
