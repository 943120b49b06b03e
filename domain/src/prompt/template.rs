//! Prompt templates for the continuation flow

use crate::session::entities::Message;

/// Templates for the auxiliary prompts the relay sends on its own behalf
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for the completeness judge
    pub fn judge_system() -> &'static str {
        r#"You are an AI completeness detector. Your task is to determine if the provided text appears to be a complete response or if it seems to be cut off mid-response.
Respond with ONLY 'COMPLETE' or 'INCOMPLETE'."#
    }

    /// User prompt asking the judge about `text`
    pub fn judge_prompt(original_prompt: Option<&str>, text: &str) -> String {
        match original_prompt {
            Some(prompt) => format!(
                r#"The following text was written in answer to this request:

<request>
{}
</request>

Analyze the answer and determine if it's a complete response or if it appears to be cut off:

<answer>
{}
</answer>"#,
                prompt, text
            ),
            None => format!(
                r#"Analyze the following text and determine if it's a complete response or if it appears to be cut off:

<answer>
{}
</answer>"#,
                text
            ),
        }
    }

    /// Full message list for a judge call
    pub fn judge_messages(original_prompt: Option<&str>, text: &str) -> Vec<Message> {
        vec![
            Message::system(Self::judge_system()),
            Message::user(Self::judge_prompt(original_prompt, text)),
        ]
    }

    /// Instruction appended after the partial answer on continuation calls
    pub fn continuation_instruction() -> &'static str {
        "Continue exactly where you left off. Do not repeat anything you already wrote and do not add any preamble; resume mid-sentence if needed."
    }

    /// Conversation for a continuation call: the original history, the
    /// partial answer as an assistant turn, then the resume instruction.
    pub fn continuation_messages(history: &[Message], merged_text: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.extend_from_slice(history);
        messages.push(Message::assistant(merged_text));
        messages.push(Message::user(Self::continuation_instruction()));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::entities::Role;

    #[test]
    fn continuation_messages_append_partial_answer_and_instruction() {
        let history = vec![Message::system("be thorough"), Message::user("Explain qubits")];
        let messages = PromptTemplate::continuation_messages(&history, "Qubits are");
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[..2], history[..]);
        assert_eq!(messages[2], Message::assistant("Qubits are"));
        assert_eq!(messages[3].role, Role::User);
        assert!(messages[3].content.contains("where you left off"));
    }

    #[test]
    fn judge_prompt_includes_request_when_known() {
        let prompt = PromptTemplate::judge_prompt(Some("Explain qubits"), "Qubits are");
        assert!(prompt.contains("Explain qubits"));
        assert!(prompt.contains("Qubits are"));

        let bare = PromptTemplate::judge_prompt(None, "Qubits are");
        assert!(!bare.contains("<request>"));
    }

    #[test]
    fn judge_system_demands_one_word_answer() {
        let messages = PromptTemplate::judge_messages(None, "text");
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.contains("'COMPLETE' or 'INCOMPLETE'"));
    }
}
