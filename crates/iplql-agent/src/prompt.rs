//! System prompt composition

/// Titled block of grounding material appended to the system prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextBlock {
    pub title: String,
    pub info: String,
}

impl ContextBlock {
    pub fn new(title: impl Into<String>, info: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            info: info.into(),
        }
    }
}

/// Fixed prompt parts: who the model is, how it works, what it returns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemPromptGenerator {
    pub background: Vec<String>,
    pub steps: Vec<String>,
    pub output_instructions: Vec<String>,
}

impl SystemPromptGenerator {
    pub fn new(background: Vec<String>, steps: Vec<String>, output_instructions: Vec<String>) -> Self {
        Self {
            background,
            steps,
            output_instructions,
        }
    }

    /// Render the prompt with `context` appended under its own heading
    pub fn generate(&self, context: &[ContextBlock]) -> String {
        let sections = [
            ("IDENTITY and PURPOSE", &self.background),
            ("INTERNAL ASSISTANT STEPS", &self.steps),
            ("OUTPUT INSTRUCTIONS", &self.output_instructions),
        ];

        let mut lines = Vec::new();
        for (title, items) in sections {
            if items.is_empty() {
                continue;
            }
            lines.push(format!("# {}", title));
            lines.extend(items.iter().map(|item| format!("- {}", item)));
            lines.push(String::new());
        }

        if !context.is_empty() {
            lines.push("# EXTRA INFORMATION AND CONTEXT".to_string());
            for block in context {
                lines.push(format!("## {}", block.title));
                lines.push(block.info.clone());
                lines.push(String::new());
            }
        }

        lines.join("\n").trim_end().to_string()
    }
}
