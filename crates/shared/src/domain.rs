use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(HistoryId);

/// Backend processing endpoint for a style, the `{endpoint}` in `/api/style/{endpoint}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleEndpoint {
    Pixar,
    Comic,
    Ghibli,
    Oil,
    Sketch,
    Cartoon,
}

impl StyleEndpoint {
    pub const DEFAULT: StyleEndpoint = StyleEndpoint::Pixar;

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pixar => "pixar",
            Self::Comic => "comic",
            Self::Ghibli => "ghibli",
            Self::Oil => "oil",
            Self::Sketch => "sketch",
            Self::Cartoon => "cartoon",
        }
    }

    /// Resolves a style title case-insensitively. Unknown titles fall back to
    /// [`StyleEndpoint::DEFAULT`].
    pub fn from_title(title: &str) -> Self {
        match title.to_lowercase().as_str() {
            "pixar" => Self::Pixar,
            "comics" => Self::Comic,
            "studio ghibli" => Self::Ghibli,
            "oil painting" => Self::Oil,
            "pencil sketch" => Self::Sketch,
            "cartoon" => Self::Cartoon,
            _ => Self::DEFAULT,
        }
    }
}

impl fmt::Display for StyleEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
