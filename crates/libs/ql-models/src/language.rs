//! Algorithm source language.

use serde::{Deserialize, Serialize};

/// Language the job's algorithm is authored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    /// Compiled .NET algorithm, loaded directly by the engine.
    #[default]
    CSharp,
    /// Python algorithm, needs interpreter environment variables at launch.
    Python,
}

impl Language {
    /// Name the engine expects in its `algorithm-language` key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::CSharp => "CSharp",
            Language::Python => "Python",
        }
    }
}
