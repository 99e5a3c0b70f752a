use crate::config::PageConfig;

const NEXT_PHRASE_PAUSE_MS: u32 = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Typing,
    Deleting,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypingFrame {
    pub text: String,
    pub delay_ms: u32,
}

/// Types each phrase out, holds it, deletes it, then moves on to the next.
pub struct TypingEffect {
    phrases: Vec<String>,
    phrase: usize,
    visible: usize,
    phase: Phase,
    typing_delay_ms: u32,
    deleting_delay_ms: u32,
    hold_ms: u32,
}

impl TypingEffect {
    pub fn new(phrases: Vec<String>, typing_delay_ms: u32, deleting_delay_ms: u32, hold_ms: u32) -> Self {
        Self {
            phrases,
            phrase: 0,
            visible: 0,
            phase: Phase::Typing,
            typing_delay_ms,
            deleting_delay_ms,
            hold_ms,
        }
    }

    pub fn from_config(config: &PageConfig) -> Self {
        Self::new(
            config.typing_phrases.clone(),
            config.typing_delay_ms,
            config.deleting_delay_ms,
            config.typing_hold_ms,
        )
    }

    /// Advances one character and returns the text to show plus how long to
    /// wait before the next step. `None` when there is nothing to type.
    pub fn step(&mut self) -> Option<TypingFrame> {
        let length = self.phrases.get(self.phrase)?.chars().count();

        let delay_ms = match self.phase {
            Phase::Typing => {
                self.visible = (self.visible + 1).min(length);
                if self.visible == length {
                    self.phase = Phase::Deleting;
                    self.hold_ms
                } else {
                    self.typing_delay_ms
                }
            }
            Phase::Deleting => {
                self.visible = self.visible.saturating_sub(1);
                if self.visible == 0 {
                    self.phase = Phase::Typing;
                    NEXT_PHRASE_PAUSE_MS
                } else {
                    self.deleting_delay_ms
                }
            }
        };

        let text = self.phrases[self.phrase].chars().take(self.visible).collect();

        if self.phase == Phase::Typing && self.visible == 0 {
            self.phrase = (self.phrase + 1) % self.phrases.len();
        }

        Some(TypingFrame { text, delay_ms })
    }
}
