//! Personality catalog
//!
//! Every personality owns exactly one conversation, created together with the
//! profile. Personalities are appended, never removed.

use serde::{Deserialize, Serialize};

use crate::config::prompts_builtin;
use crate::conversation::Conversation;

/// A named persona and the instruction preamble that steers the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalityProfile {
    pub key: String,
    pub instruction: String,
}

impl PersonalityProfile {
    pub fn new(key: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            instruction: instruction.into(),
        }
    }

    /// Display title, e.g. `Flirty`
    pub fn title(&self) -> String {
        let mut chars = self.key.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Whether a reply is outstanding for a personality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatState {
    #[default]
    Idle,
    AwaitingReply,
}

/// A profile together with the conversation it owns
#[derive(Debug, Clone)]
pub struct Personality {
    pub profile: PersonalityProfile,
    pub conversation: Conversation,
    pub state: ChatState,
}

impl Personality {
    fn new(profile: PersonalityProfile) -> Self {
        Self {
            profile,
            conversation: Conversation::new(),
            state: ChatState::Idle,
        }
    }

    pub fn key(&self) -> &str {
        &self.profile.key
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Personality name must not be empty")]
    EmptyKey,

    #[error("Personality description must not be empty")]
    EmptyInstruction,

    #[error("Personality already exists: {0}")]
    Duplicate(String),
}

/// Ordered collection of personalities
#[derive(Debug, Clone)]
pub struct PersonalityCatalog {
    personalities: Vec<Personality>,
}

impl PersonalityCatalog {
    pub fn empty() -> Self {
        Self {
            personalities: Vec::new(),
        }
    }

    /// Catalog seeded with the built-in personalities
    pub fn with_builtins() -> Self {
        let mut catalog = Self::empty();
        for (key, instruction) in prompts_builtin::ALL {
            catalog
                .personalities
                .push(Personality::new(PersonalityProfile::new(*key, *instruction)));
        }
        catalog
    }

    /// Append a personality; returns its index
    pub fn add(&mut self, key: &str, instruction: &str) -> Result<usize, CatalogError> {
        let key = key.trim();
        let instruction = instruction.trim();

        if key.is_empty() {
            return Err(CatalogError::EmptyKey);
        }
        if instruction.is_empty() {
            return Err(CatalogError::EmptyInstruction);
        }
        if self.position(key).is_some() {
            return Err(CatalogError::Duplicate(key.to_string()));
        }

        self.personalities
            .push(Personality::new(PersonalityProfile::new(key, instruction)));
        Ok(self.personalities.len() - 1)
    }

    /// Append profiles loaded from files, skipping invalid or colliding ones
    pub fn extend(&mut self, profiles: impl IntoIterator<Item = PersonalityProfile>) -> usize {
        let mut added = 0;
        for profile in profiles {
            match self.add(&profile.key, &profile.instruction) {
                Ok(_) => added += 1,
                Err(e) => tracing::warn!("Ignoring personality '{}': {}", profile.key, e),
            }
        }
        added
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.personalities
            .iter()
            .position(|p| p.profile.key.eq_ignore_ascii_case(key))
    }

    pub fn get(&self, index: usize) -> Option<&Personality> {
        self.personalities.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Personality> {
        self.personalities.get_mut(index)
    }

    pub fn by_key(&self, key: &str) -> Option<&Personality> {
        self.position(key).and_then(|i| self.get(i))
    }

    pub fn by_key_mut(&mut self, key: &str) -> Option<&mut Personality> {
        let index = self.position(key)?;
        self.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Personality> {
        self.personalities.iter()
    }

    pub fn len(&self) -> usize {
        self.personalities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personalities.is_empty()
    }

    /// Resolve a requested personality to an instruction.
    ///
    /// Known keys map to their instruction; anything else is taken as the
    /// instruction text itself.
    pub fn resolve_instruction(&self, requested: &str) -> String {
        match self.by_key(requested.trim()) {
            Some(p) => p.profile.instruction.clone(),
            None => requested.to_string(),
        }
    }
}

impl Default for PersonalityCatalog {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;

    #[test]
    fn test_builtins_in_order() {
        let catalog = PersonalityCatalog::with_builtins();
        assert_eq!(catalog.len(), 10);
        assert_eq!(catalog.get(0).unwrap().key(), "flirty");
        assert_eq!(catalog.get(9).unwrap().key(), "tech_geek");
        assert!(catalog.iter().all(|p| p.conversation.history().is_empty()));
    }

    #[test]
    fn test_add_creates_empty_conversation() {
        let mut catalog = PersonalityCatalog::with_builtins();
        let index = catalog.add("  stoic ", " Be calm. ").unwrap();

        let added = catalog.get(index).unwrap();
        assert_eq!(added.profile, PersonalityProfile::new("stoic", "Be calm."));
        assert!(added.conversation.history().is_empty());
        assert_eq!(added.state, ChatState::Idle);
    }

    #[test]
    fn test_add_rejects_invalid() {
        let mut catalog = PersonalityCatalog::with_builtins();
        assert_eq!(catalog.add("", "x"), Err(CatalogError::EmptyKey));
        assert_eq!(catalog.add("x", "   "), Err(CatalogError::EmptyInstruction));
        assert_eq!(
            catalog.add("Flirty", "again"),
            Err(CatalogError::Duplicate("Flirty".to_string()))
        );
        assert_eq!(catalog.len(), 10);
    }

    #[test]
    fn test_conversations_are_independent() {
        let mut catalog = PersonalityCatalog::with_builtins();
        catalog.by_key_mut("sassy").unwrap().conversation.add(Role::User, "hey");

        assert_eq!(catalog.by_key("sassy").unwrap().conversation.len(), 1);
        assert!(catalog.by_key("flirty").unwrap().conversation.history().is_empty());
    }

    #[test]
    fn test_resolve_instruction() {
        let catalog = PersonalityCatalog::with_builtins();
        assert_eq!(catalog.resolve_instruction("romantic"), prompts_builtin::ROMANTIC);
        assert_eq!(
            catalog.resolve_instruction("You are a pirate."),
            "You are a pirate."
        );
    }

    #[test]
    fn test_extend_skips_duplicates() {
        let mut catalog = PersonalityCatalog::with_builtins();
        let added = catalog.extend(vec![
            PersonalityProfile::new("poet", "Speak in verse."),
            PersonalityProfile::new("sassy", "Duplicate."),
        ]);
        assert_eq!(added, 1);
        assert_eq!(catalog.len(), 11);
    }

    #[test]
    fn test_title() {
        assert_eq!(PersonalityProfile::new("tech_geek", "x").title(), "Tech_geek");
        assert_eq!(PersonalityProfile::new("", "x").title(), "");
    }
}
