//! Request text construction

/// Label placed between the instruction and the document text
pub const DEFAULT_TEXT_LABEL: &str = "\n\nDocument text:\n";

/// Builds the full request text for one document
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    instruction: String,
    label: String,
}

impl PromptBuilder {
    /// Create a builder around the run's fixed instruction
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            label: DEFAULT_TEXT_LABEL.to_string(),
        }
    }

    /// Replace the label between instruction and document text
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Instruction followed by the label and the document text
    pub fn build(&self, document_text: &str) -> String {
        let mut prompt =
            String::with_capacity(self.instruction.len() + self.label.len() + document_text.len());
        prompt.push_str(&self.instruction);
        prompt.push_str(&self.label);
        prompt.push_str(document_text);
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_concatenates() {
        let prompt = PromptBuilder::new("Classify.").build("body");
        assert_eq!(prompt, "Classify.\n\nDocument text:\nbody");
    }

    #[test]
    fn test_custom_label() {
        let prompt = PromptBuilder::new("P").with_label(" | ").build("T");
        assert_eq!(prompt, "P | T");
    }
}
