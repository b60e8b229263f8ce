//! Verdicts: the result type every check returns.
//!
//! A [`Verdict`] carries a pass/fail flag and an ordered list of
//! [`Message`]s. Verdicts compose with `+` (see [`Verdict::combine`]):
//! messages are appended in order, the flags are AND-ed, and messages
//! without a position inherit the position of the left operand.
//!
//! `ok` is independent of `messages`: a verdict can be failed without any
//! message (e.g. "identifier incorrect" is consumed as a flag by the
//! header walk), but [`Verdict::add_message`] always fails it.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// One finding: what is wrong, where, and which standard says so.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub text: String,
    pub position: String,
    pub standard: String,
}

impl Message {
    pub fn new(
        text: impl Into<String>,
        position: impl Into<String>,
        standard: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            position: position.into(),
            standard: standard.into(),
        }
    }
}

/// Accumulated result of a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub ok: bool,
    pub messages: Vec<Message>,
    pub position: String,
    pub standard: String,
}

impl Default for Verdict {
    fn default() -> Self {
        Self::new()
    }
}

impl Verdict {
    /// The empty, passing verdict with no position and no standard.
    pub fn new() -> Self {
        Self {
            ok: true,
            messages: Vec::new(),
            position: String::new(),
            standard: String::new(),
        }
    }

    /// A passing verdict whose messages will be attributed to `position`
    /// under `standard`.
    pub fn scoped(position: impl Into<String>, standard: impl Into<String>) -> Self {
        Self {
            position: position.into(),
            standard: standard.into(),
            ..Self::new()
        }
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = position.into();
        self
    }

    pub fn with_standard(mut self, standard: impl Into<String>) -> Self {
        self.standard = standard.into();
        self
    }

    /// A failed verdict that carries no message.
    pub fn failed() -> Self {
        Self {
            ok: false,
            ..Self::new()
        }
    }

    /// Record a finding at this verdict's position and standard.
    pub fn add_message(&mut self, text: impl Into<String>) {
        self.messages.push(Message::new(
            text,
            self.position.clone(),
            self.standard.clone(),
        ));
        self.ok = false;
    }

    /// Record a finding with an explicit position.
    pub fn add_message_at(&mut self, text: impl Into<String>, position: impl Into<String>) {
        self.messages
            .push(Message::new(text, position, self.standard.clone()));
        self.ok = false;
    }

    /// Concatenate `other` onto `self`.
    ///
    /// Messages of `other` that have no position take `self.position`
    /// when it is non-empty. `ok` becomes `self.ok && other.ok`.
    pub fn combine(mut self, other: Verdict) -> Verdict {
        self.absorb(other);
        self
    }

    fn absorb(&mut self, other: Verdict) {
        let position = self.position.as_str();
        for mut message in other.messages {
            if !position.is_empty() && message.position.is_empty() {
                message.position = position.to_string();
            }
            self.messages.push(message);
        }
        self.ok = self.ok && other.ok;
    }

    /// Fold a sequence of verdicts onto `base` with [`Verdict::combine`].
    pub fn fold(base: Verdict, verdicts: impl IntoIterator<Item = Verdict>) -> Verdict {
        verdicts.into_iter().fold(base, Verdict::combine)
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }

    pub fn message_texts(&self) -> Vec<&str> {
        self.messages.iter().map(|m| m.text.as_str()).collect()
    }

    pub fn has_message(&self, text: &str) -> bool {
        self.messages.iter().any(|m| m.text == text)
    }
}

impl Add for Verdict {
    type Output = Verdict;

    fn add(self, rhs: Verdict) -> Verdict {
        self.combine(rhs)
    }
}

impl AddAssign for Verdict {
    fn add_assign(&mut self, rhs: Verdict) {
        self.absorb(rhs);
    }
}
