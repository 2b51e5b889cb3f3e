use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The four learning-style buckets used for both self-assessment scoring and
/// transformation prompt selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningStyle {
    Visual,
    Auditory,
    Reading,
    Kinesthetic,
}

impl LearningStyle {
    /// All styles in their fixed canonical order. This order also decides
    /// ties when two styles score equally.
    pub const ALL: [LearningStyle; 4] = [
        LearningStyle::Visual,
        LearningStyle::Auditory,
        LearningStyle::Reading,
        LearningStyle::Kinesthetic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LearningStyle::Visual => "visual",
            LearningStyle::Auditory => "auditory",
            LearningStyle::Reading => "reading",
            LearningStyle::Kinesthetic => "kinesthetic",
        }
    }
}

impl fmt::Display for LearningStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LearningStyle {
    type Err = crate::MorphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "visual" => Ok(LearningStyle::Visual),
            "auditory" => Ok(LearningStyle::Auditory),
            "reading" => Ok(LearningStyle::Reading),
            "kinesthetic" => Ok(LearningStyle::Kinesthetic),
            other => Err(crate::MorphError::InvalidInput(format!(
                "unknown learning style: '{}'",
                other
            ))),
        }
    }
}
