use thiserror::Error;

/// A Region or theme definition that cannot be accepted as written.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("attribute '{key}': expected {expected}, found {found}")]
    InvalidType {
        key: String,
        expected: &'static str,
        found: String,
    },

    #[error("attribute '{key}': value {value} outside {min}..={max}")]
    OutOfRange {
        key: String,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("attribute '{key}': '{value}' is not one of [{allowed}]")]
    UnknownOption {
        key: String,
        value: String,
        allowed: String,
    },

    #[error("attribute '{key}': cannot find '{name}'")]
    MissingFile { key: String, name: String },

    #[error("no '{key}' definition")]
    Missing { key: String },

    #[error("a region cannot have both 'text' and 'list'")]
    TextAndList,

    #[error("bar has {count} split markers, at most one is allowed")]
    MultipleSplits { count: usize },

    #[error("list has no selectable entries")]
    NoSelectable,

    #[error("atlas '{file}': duplicate image name '{name}'")]
    DuplicateAtlasName { file: String, name: String },
}

impl ConfigError {
    pub fn invalid(key: &str, expected: &'static str, found: impl ToString) -> Self {
        ConfigError::InvalidType {
            key: key.to_string(),
            expected,
            found: found.to_string(),
        }
    }
}

/// Text that cannot be laid out in the space it was given.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FitError {
    #[error("word '{word}' is {width}px wide but only {available}px are available")]
    Unfittable {
        word: String,
        width: i32,
        available: i32,
    },
}

/// Anything that can stop a Region from being built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Fit(#[from] FitError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_attribute() {
        let e = ConfigError::invalid("fontsize", "integer", "\"big\"");
        assert_eq!(
            e.to_string(),
            "attribute 'fontsize': expected integer, found \"big\""
        );
        let e: Error = FitError::Unfittable {
            word: "antidisestablishment".into(),
            width: 200,
            available: 90,
        }
        .into();
        assert!(matches!(e, Error::Fit(_)));
    }
}
