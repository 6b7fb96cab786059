use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::num::{NonZeroU64, NonZeroUsize};

use crate::error::ValidationError;

/// Report format written to stdout.
#[derive(Debug, Clone, Copy, ValueEnum, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Unit used for latencies in the text report.
#[derive(Debug, Clone, Copy, ValueEnum, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    S,
    #[default]
    Ms,
}

/// Declares a non-zero count newtype that parses from CLI text.
macro_rules! positive_count {
    ($name:ident, $inner:ty, $prim:ty) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name($inner);

        impl $name {
            #[must_use]
            pub const fn get(self) -> $prim {
                self.0.get()
            }
        }

        impl TryFrom<$prim> for $name {
            type Error = ValidationError;

            fn try_from(value: $prim) -> Result<Self, Self::Error> {
                <$inner>::new(value)
                    .map(Self)
                    .ok_or(ValidationError::ValueTooSmall { min: 1 })
            }
        }

        impl std::str::FromStr for $name {
            type Err = ValidationError;

            fn from_str(text: &str) -> Result<Self, Self::Err> {
                let value: $prim = text
                    .trim()
                    .parse()
                    .map_err(|err| ValidationError::InvalidNumber { source: err })?;
                Self::try_from(value)
            }
        }

        impl From<$name> for $prim {
            fn from(value: $name) -> Self {
                value.get()
            }
        }
    };
}

positive_count!(PositiveU64, NonZeroU64, u64);
positive_count!(PositiveUsize, NonZeroUsize, usize);
