use serde::{Deserialize, Serialize};

use crate::pipeline::lab_report::LabParseError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = LabParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(LabParseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(ResultFlag {
    High => "high",
    Low => "low",
});

str_enum!(SectionKind {
    Text => "text",
    Table => "table",
});

impl ResultFlag {
    /// Interpret a flag column token (`H`, `HIGH`, `L`, `LOW`, any case).
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "H" | "HIGH" => Some(Self::High),
            "L" | "LOW" => Some(Self::Low),
            _ => None,
        }
    }

    /// Short form used when rendering a row back to text.
    pub fn as_token(&self) -> &'static str {
        match self {
            Self::High => "H",
            Self::Low => "L",
        }
    }
}
