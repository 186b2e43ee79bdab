use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage provider types
///
/// Self-identifying tag of a concrete storage provider. It lives in core
/// because configuration selects a provider by this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Aws,
    Local,
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aws" | "s3" => Ok(ProviderKind::Aws),
            "local" => Ok(ProviderKind::Local),
            _ => Err(anyhow::anyhow!("Invalid storage provider: {}", s)),
        }
    }
}

impl Display for ProviderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ProviderKind::Aws => write!(f, "aws"),
            ProviderKind::Local => write!(f, "local"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases_case_insensitively() {
        assert_eq!("AWS".parse::<ProviderKind>().unwrap(), ProviderKind::Aws);
        assert_eq!("s3".parse::<ProviderKind>().unwrap(), ProviderKind::Aws);
        assert_eq!(" local ".parse::<ProviderKind>().unwrap(), ProviderKind::Local);
        assert!("gcs".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for kind in [ProviderKind::Aws, ProviderKind::Local] {
            assert_eq!(kind.to_string().parse::<ProviderKind>().unwrap(), kind);
        }
    }
}
