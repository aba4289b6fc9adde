use serde::{Deserialize, Serialize};

use super::ModelError;

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
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
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

str_enum!(Speaker {
    User => "user",
    Assistant => "assistant",
});

str_enum!(ApiMode {
    Mock => "mock",
    Deepseek => "deepseek",
});

str_enum!(ToastKind {
    Info => "info",
    Success => "success",
    Warning => "warning",
    Error => "error",
});

str_enum!(Severity {
    Critical => "critical",
    Elevated => "elevated",
    Routine => "routine",
});

impl Default for ApiMode {
    fn default() -> Self {
        Self::Mock
    }
}

impl Severity {
    /// CSS class used by the results panel for this severity.
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Critical => "triage-emergency",
            Self::Elevated => "triage-urgent",
            Self::Routine => "triage-routine",
        }
    }
}
