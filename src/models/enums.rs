use serde::{Deserialize, Serialize};

/// Parsing a string into one of the model enums failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {field} value: {value}")]
pub struct UnknownVariant {
    pub field: String,
    pub value: String,
}

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
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(UnknownVariant {
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

// Canonical label set of a diagnosis result.
str_enum!(Label {
    Healthy => "healthy",
    Sick => "sick",
    Cataract => "cataract",
    Glaucoma => "glaucoma",
});

// Outcome of a three-way dominance decision.
str_enum!(Condition {
    Healthy => "healthy",
    Cataract => "cataract",
    Glaucoma => "glaucoma",
});

// Presentation tag attached to a history entry.
str_enum!(Severity {
    Success => "success",
    Warning => "warning",
    Error => "error",
});

// Lifecycle of an upload attempt.
str_enum!(UploadStatus {
    Idle => "idle",
    Validated => "validated",
    InFlight => "in_flight",
    Succeeded => "succeeded",
    Failed => "failed",
});

impl Label {
    /// User-facing (pt-BR) name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Healthy => "Saudável",
            Self::Sick => "Doente",
            Self::Cataract => "Catarata",
            Self::Glaucoma => "Glaucoma",
        }
    }
}

impl Condition {
    pub fn label(&self) -> Label {
        match self {
            Self::Healthy => Label::Healthy,
            Self::Cataract => Label::Cataract,
            Self::Glaucoma => Label::Glaucoma,
        }
    }

    pub fn display_name(&self) -> &'static str {
        self.label().display_name()
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::Healthy => Severity::Success,
            Self::Cataract => Severity::Warning,
            Self::Glaucoma => Severity::Error,
        }
    }
}
