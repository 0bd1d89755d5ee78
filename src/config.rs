use crate::chess::PieceType;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How two lone bishops are judged by the insufficient-material rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BishopRule {
    /// Any single bishop against any single bishop is a draw
    #[default]
    AnyBishops,
    /// Only bishops standing on squares of the same color are a draw
    SameSquareColor,
}

/// Tunable rules of the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Own non-capturing moves per color before the fifty-move draw applies
    pub fifty_move_limit: usize,
    /// Occurrences of the same movement before the repetition draw applies
    pub repetition_limit: usize,
    pub bishop_rule: BishopRule,
    /// Kind chosen for pawns promoting during legality simulation
    pub simulation_promotion: PieceType,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            fifty_move_limit: 50,
            repetition_limit: 3,
            bishop_rule: BishopRule::AnyBishops,
            simulation_promotion: PieceType::Queen,
        }
    }
}

impl RulesConfig {
    /// Parse a configuration from TOML text, falling back to defaults for missing keys
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RulesConfig =
            toml::from_str(content).context("Failed to parse rules configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize rules configuration")
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_context(|| {
            format!("Failed to read rules configuration {}", path.display())
        })?;
        Self::from_toml_str(&content)
    }

    /// Save configuration to a TOML file, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = self.to_toml_string()?;
        std::fs::write(path, content).context("Failed to write rules configuration")?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.fifty_move_limit > 0,
            "fifty_move_limit must be positive"
        );
        anyhow::ensure!(
            self.repetition_limit > 1,
            "repetition_limit must be at least 2, got {}",
            self.repetition_limit
        );
        anyhow::ensure!(
            self.simulation_promotion.is_promotable(),
            "simulation_promotion must be a promotable piece, got {}",
            self.simulation_promotion
        );
        Ok(())
    }
}
