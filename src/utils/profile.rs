use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::codec::Chain;
use crate::error::Result;

/// A chain configuration as stored next to a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecProfile {
    pub name: String,
    /// Stage tokens after the name
    #[serde(default)]
    pub chain: Vec<String>,
}

impl CodecProfile {
    pub fn from_chain(chain: &Chain) -> Self {
        let mut tokens = chain.to_tokens();
        let name = tokens.remove(0);
        Self {
            name,
            chain: tokens,
        }
    }

    /// Name followed by the stage tokens
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens = Vec::with_capacity(self.chain.len() + 1);
        tokens.push(self.name.clone());
        tokens.extend(self.chain.iter().cloned());
        tokens
    }

    pub fn to_chain(&self) -> Result<Chain> {
        Ok(Chain::from_tokens(&self.tokens())?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let profile: Self = serde_json::from_str(&text)?;
        info!("Loaded codec profile {:?} from {}", profile.name, path.display());
        Ok(profile)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Codec profile saved to: {}", path.display());
        Ok(())
    }
}
