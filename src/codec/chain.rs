//! Chain configuration: token list <-> typed stages.
//!
//! Token 0 is the display name. Every following token is matched against the
//! stage keywords (a token only has to contain the keyword); parameterized
//! stages take the next token as their parameter and fall back to a default
//! when they are the last token. Unknown tokens are skipped.

use tracing::debug;

use super::external::ExternalPrograms;
use super::transforms::SubstitutionTable;
use crate::error::ChainError;
use crate::phy::bits::{bits_to_string, parse_bits};
use crate::utils::consts::*;

/// One step of the chain with its bound parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Invert,
    Differential,
    Redundancy(usize),
    /// Raw `sync_hex;poly_hex;flags_hex` text, interpreted when the stage runs
    DataWhitening(String),
    Carrier(Vec<bool>),
    BitOrder,
    Edge,
    Substitution(SubstitutionTable),
    External(ExternalPrograms),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StageKind {
    Invert,
    Differential,
    Redundancy,
    DataWhitening,
    Carrier,
    BitOrder,
    Edge,
    Substitution,
    External,
}

// Checked in this order
const KEYWORDS: [(&str, StageKind); 9] = [
    (DECODING_INVERT, StageKind::Invert),
    (DECODING_DIFFERENTIAL, StageKind::Differential),
    (DECODING_REDUNDANCY, StageKind::Redundancy),
    (DECODING_DATAWHITENING, StageKind::DataWhitening),
    (DECODING_CARRIER, StageKind::Carrier),
    (DECODING_BITORDER, StageKind::BitOrder),
    (DECODING_EDGE, StageKind::Edge),
    (DECODING_SUBSTITUTION, StageKind::Substitution),
    (DECODING_EXTERNAL, StageKind::External),
];

impl StageKind {
    fn from_token(token: &str) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|(keyword, _)| token.contains(keyword))
            .map(|&(_, kind)| kind)
    }

    fn default_param(self) -> Option<&'static str> {
        match self {
            StageKind::Redundancy => Some(DEFAULT_REDUNDANCY),
            StageKind::DataWhitening => Some(DEFAULT_WHITENING),
            StageKind::Carrier => Some(DEFAULT_CARRIER),
            StageKind::Substitution => Some(DEFAULT_SUBSTITUTION),
            StageKind::External => Some(DEFAULT_EXTERNAL),
            _ => None,
        }
    }

    fn build(self, param: &str) -> Result<Stage, ChainError> {
        Ok(match self {
            StageKind::Invert => Stage::Invert,
            StageKind::Differential => Stage::Differential,
            StageKind::BitOrder => Stage::BitOrder,
            StageKind::Edge => Stage::Edge,
            StageKind::Redundancy => Stage::Redundancy(
                param
                    .trim()
                    .parse()
                    .map_err(|_| ChainError::InvalidMultiplier(param.to_string()))?,
            ),
            StageKind::DataWhitening => Stage::DataWhitening(param.to_string()),
            StageKind::Carrier => Stage::Carrier(
                parse_bits(param).ok_or_else(|| ChainError::InvalidCarrier(param.to_string()))?,
            ),
            StageKind::Substitution => Stage::Substitution(SubstitutionTable::parse(param)?),
            StageKind::External => Stage::External(ExternalPrograms::parse(param)?),
        })
    }
}

impl Stage {
    /// Canonical keyword token for this stage
    pub fn keyword(&self) -> &'static str {
        match self {
            Stage::Invert => DECODING_INVERT,
            Stage::Differential => DECODING_DIFFERENTIAL,
            Stage::Redundancy(_) => DECODING_REDUNDANCY,
            Stage::DataWhitening(_) => DECODING_DATAWHITENING,
            Stage::Carrier(_) => DECODING_CARRIER,
            Stage::BitOrder => DECODING_BITORDER,
            Stage::Edge => DECODING_EDGE,
            Stage::Substitution(_) => DECODING_SUBSTITUTION,
            Stage::External(_) => DECODING_EXTERNAL,
        }
    }

    /// Parameter token, if the stage takes one
    pub fn param(&self) -> Option<String> {
        match self {
            Stage::Redundancy(multiple) => Some(multiple.to_string()),
            Stage::DataWhitening(text) => Some(text.clone()),
            Stage::Carrier(pattern) => Some(bits_to_string(pattern)),
            Stage::Substitution(table) => Some(table.to_string()),
            Stage::External(programs) => Some(programs.to_string()),
            Stage::Invert | Stage::Differential | Stage::BitOrder | Stage::Edge => None,
        }
    }
}

/// A named, ordered list of stages. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    name: String,
    stages: Vec<Stage>,
}

impl Chain {
    pub fn new(name: impl Into<String>, stages: Vec<Stage>) -> Self {
        Self {
            name: name.into(),
            stages,
        }
    }

    /// Build a chain from configuration tokens
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self, ChainError> {
        let (name, rest) = tokens.split_first().ok_or(ChainError::Empty)?;
        let mut stages = Vec::new();

        let mut i = 0;
        while i < rest.len() {
            let token = rest[i].as_ref();
            i += 1;

            let Some(kind) = StageKind::from_token(token) else {
                debug!("Skipping unknown chain token {:?}", token);
                continue;
            };

            let stage = match kind.default_param() {
                None => kind.build("")?,
                Some(default) => {
                    let param = match rest.get(i) {
                        Some(param) => {
                            i += 1;
                            param.as_ref()
                        }
                        None => default,
                    };
                    kind.build(param)?
                }
            };
            stages.push(stage);
        }

        Ok(Self::new(name.as_ref(), stages))
    }

    /// Token list that rebuilds an equivalent chain
    pub fn to_tokens(&self) -> Vec<String> {
        let mut tokens = Vec::with_capacity(1 + self.stages.len() * 2);
        tokens.push(self.name.clone());
        for stage in &self.stages {
            tokens.push(stage.keyword().to_string());
            if let Some(param) = stage.param() {
                tokens.push(param);
            }
        }
        tokens
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Nothing but the name: bits pass through untouched
    pub fn is_nrz(&self) -> bool {
        self.stages.is_empty()
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new("Non Return To Zero (NRZ)", Vec::new())
    }
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
