//! Personality instructions and personality files
//!
//! Extra personalities can be loaded from TOML files in a directory.
//!
//! # Example Personality File
//!
//! ```toml
//! [personality]
//! key = "stoic"
//! instruction = """
//! You are a stoic person on a dating app...
//! """
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::personality::PersonalityProfile;

/// A personality file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalityFile {
    pub personality: PersonalityEntry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalityEntry {
    /// Short identifier shown in the personality list
    pub key: String,

    /// Instruction preamble sent to the model
    pub instruction: String,
}

impl From<PersonalityFile> for PersonalityProfile {
    fn from(file: PersonalityFile) -> Self {
        PersonalityProfile::new(
            file.personality.key.trim(),
            file.personality.instruction.trim(),
        )
    }
}

/// Loads personality files from a directory
#[derive(Debug)]
pub struct PersonalityLoader {
    dir: PathBuf,
}

impl PersonalityLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load a single personality file
    pub async fn load_from_file(path: &Path) -> Result<PersonalityProfile, PersonalityFileError> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| PersonalityFileError::Io(format!("{}: {}", path.display(), e)))?;

        let file: PersonalityFile = toml::from_str(&content)
            .map_err(|e| PersonalityFileError::Parse(format!("{}: {}", path.display(), e)))?;

        Ok(file.into())
    }

    /// Load every `*.toml` file in the directory, sorted by file name.
    ///
    /// Files that fail to parse are logged and skipped.
    pub async fn load_all(&self) -> Result<Vec<PersonalityProfile>, PersonalityFileError> {
        let mut paths = Vec::new();

        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| PersonalityFileError::Io(e.to_string()))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PersonalityFileError::Io(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "toml") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut profiles = Vec::with_capacity(paths.len());
        for path in paths {
            match Self::load_from_file(&path).await {
                Ok(profile) => profiles.push(profile),
                Err(e) => tracing::warn!("Skipping personality file: {}", e),
            }
        }

        Ok(profiles)
    }
}

/// Errors from personality file loading
#[derive(Debug, thiserror::Error)]
pub enum PersonalityFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Built-in personalities, in display order
pub mod builtin {
    pub const FLIRTY: &str = "You are a flirty person on a dating app. Be charming, playful, and subtly suggestive in your responses. Use light innuendos and compliments, but keep it tasteful. Show interest in the other person's life and hobbies.";

    pub const INTELLECTUAL: &str = "You are an intellectual person on a dating app. Engage in deep, thought-provoking conversations. Show your knowledge about arts, literature, philosophy, or sciences. Ask insightful questions and share interesting facts.";

    pub const ADVENTUROUS: &str = "You are an adventurous person on a dating app. Be enthusiastic about outdoor activities, travel, and new experiences. Share exciting stories and ask about the other person's adventures. Suggest fun and unique date ideas.";

    pub const ROMANTIC: &str = "You are a romantic person on a dating app. Be sweet, sincere, and emotionally open. Express your desire for a meaningful connection. Use poetic language and talk about your dreams for a relationship.";

    pub const SASSY: &str = "You are a sassy person on a dating app. Be witty, confident, and a bit sarcastic. Use clever wordplay and pop culture references. Don't be afraid to playfully tease, but always with kindness.";

    pub const PROFESSIONAL: &str = "You are a career-oriented person on a dating app. Be ambitious, organized, and goal-driven. Discuss your professional achievements and aspirations. Show interest in the other person's career and life goals.";

    pub const ARTISTIC: &str = "You are an artistic person on a dating app. Be creative, expressive, and passionate about the arts. Discuss your favorite art forms, whether it's music, painting, theater, or film. Ask about the other person's artistic interests.";

    pub const FITNESS_ENTHUSIAST: &str = "You are a fitness-loving person on a dating app. Be energetic and health-conscious. Talk about your workout routines, healthy eating habits, and athletic achievements. Encourage and motivate the other person.";

    pub const NURTURING: &str = "You are a nurturing person on a dating app. Be caring, supportive, and empathetic. Show genuine interest in the other person's well-being. Offer kind words and understanding. Discuss your love for family or pets.";

    pub const TECH_GEEK: &str = "You are a tech-savvy person on a dating app. Be enthusiastic about the latest gadgets, apps, and tech trends. Share your knowledge about technology and gaming. Ask about the other person's favorite tech or games.";

    /// Personality used when a request names none
    pub const DEFAULT_KEY: &str = "flirty";

    pub const ALL: &[(&str, &str)] = &[
        ("flirty", FLIRTY),
        ("intellectual", INTELLECTUAL),
        ("adventurous", ADVENTUROUS),
        ("romantic", ROMANTIC),
        ("sassy", SASSY),
        ("professional", PROFESSIONAL),
        ("artistic", ARTISTIC),
        ("fitness_enthusiast", FITNESS_ENTHUSIAST),
        ("nurturing", NURTURING),
        ("tech_geek", TECH_GEEK),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_personality_file() {
        let toml_content = r#"
[personality]
key = "stoic"
instruction = """
You are a stoic person on a dating app.
"""
"#;

        let file: PersonalityFile = toml::from_str(toml_content).unwrap();
        let profile: PersonalityProfile = file.into();
        assert_eq!(profile.key, "stoic");
        assert_eq!(profile.instruction, "You are a stoic person on a dating app.");
    }

    #[test]
    fn test_builtin_keys_are_unique() {
        let mut keys: Vec<&str> = builtin::ALL.iter().map(|(k, _)| *k).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 10);
        assert!(keys.contains(&builtin::DEFAULT_KEY));
    }

    #[tokio::test]
    async fn test_load_all_skips_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("b_stoic.toml"),
            "[personality]\nkey = \"stoic\"\ninstruction = \"Be calm.\"\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("a_poet.toml"),
            "[personality]\nkey = \"poet\"\ninstruction = \"Speak in verse.\"\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not = [valid").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let profiles = PersonalityLoader::new(dir.path()).load_all().await.unwrap();
        let keys: Vec<&str> = profiles.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["poet", "stoic"]);
    }

    #[tokio::test]
    async fn test_load_all_missing_dir() {
        let result = PersonalityLoader::new("/definitely/not/here").load_all().await;
        assert!(matches!(result, Err(PersonalityFileError::Io(_))));
    }
}
