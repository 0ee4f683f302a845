//! Question-answering prompt template

/// Instruction placed before the context unless overridden
pub const DEFAULT_BASE_PROMPT: &str = "As an expert, use the following context to answer the question. \
Given the following context and question, provide an answer. \
Be concise and brief. If the CONTEXT does not provide information, \
answer: 'I don't have enough information'.";

/// `{base}\n\nContext: {context}\n\nQuestion: {question}\n\nAnswer:`
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    base: String,
}

impl PromptTemplate {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Fill in both placeholders in one pass, so text inside the context
    /// is never re-interpreted as a placeholder.
    pub fn render(&self, context: &str, question: &str) -> String {
        format!(
            "{}\n\nContext: {}\n\nQuestion: {}\n\nAnswer:",
            self.base.trim_end(),
            context.trim_end(),
            question
        )
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_PROMPT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_layout() {
        let template = PromptTemplate::new("Answer briefly.");
        let prompt = template.render("Test content ", "test query");
        assert_eq!(
            prompt,
            "Answer briefly.\n\nContext: Test content\n\nQuestion: test query\n\nAnswer:"
        );
    }

    #[test]
    fn test_default_instruction() {
        let template = PromptTemplate::default();
        assert!(template.base().contains("concise"));
        assert!(template.base().contains("I don't have enough information"));
    }

    #[test]
    fn test_placeholders_in_context_are_literal() {
        let template = PromptTemplate::default();
        let prompt = template.render("see {question}", "real question");
        assert!(prompt.contains("Context: see {question}"));
        assert!(prompt.contains("Question: real question"));
    }
}
