use serde::Serialize;

/// One completed exchange
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Turn {
    pub user_input: String,
    pub assistant_response: String,
}

/// Display cache of the turns completed during this session. The
/// conversation on the hosted service remains the source of truth.
#[derive(Clone, Debug, Default)]
pub struct LocalHistory {
    turns: Vec<Turn>,
}

impl LocalHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, user_input: &str, assistant_response: &str) {
        self.turns.push(Turn {
            user_input: user_input.to_string(),
            assistant_response: assistant_response.to_string(),
        });
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Alternating `You: ...` / `Assistant: ...` lines, skipping empty
    /// sides of a turn.
    pub fn transcript_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.turns.len() * 2);
        for turn in &self.turns {
            if !turn.user_input.is_empty() {
                lines.push(format!("You: {}", turn.user_input));
            }
            if !turn.assistant_response.is_empty() {
                lines.push(format!("Assistant: {}", turn.assistant_response));
            }
        }
        lines
    }
}
