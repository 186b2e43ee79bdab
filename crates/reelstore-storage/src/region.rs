//! Provider region types

use crate::error::StorageError;
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// AWS regions the S3 provider can operate in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AwsRegion {
    AfSouth1,
    ApEast1,
    ApNortheast1,
    ApNortheast2,
    ApNortheast3,
    ApSouth1,
    ApSoutheast1,
    ApSoutheast2,
    ApSoutheast4,
    CaCentral1,
    EuCentral1,
    EuCentral2,
    EuNorth1,
    EuSouth1,
    EuWest1,
    EuWest2,
    EuWest3,
    MeSouth1,
    SaEast1,
    UsEast1,
    UsEast2,
    UsWest1,
    UsWest2,
}

impl AwsRegion {
    pub const ALL: [AwsRegion; 23] = [
        AwsRegion::AfSouth1,
        AwsRegion::ApEast1,
        AwsRegion::ApNortheast1,
        AwsRegion::ApNortheast2,
        AwsRegion::ApNortheast3,
        AwsRegion::ApSouth1,
        AwsRegion::ApSoutheast1,
        AwsRegion::ApSoutheast2,
        AwsRegion::ApSoutheast4,
        AwsRegion::CaCentral1,
        AwsRegion::EuCentral1,
        AwsRegion::EuCentral2,
        AwsRegion::EuNorth1,
        AwsRegion::EuSouth1,
        AwsRegion::EuWest1,
        AwsRegion::EuWest2,
        AwsRegion::EuWest3,
        AwsRegion::MeSouth1,
        AwsRegion::SaEast1,
        AwsRegion::UsEast1,
        AwsRegion::UsEast2,
        AwsRegion::UsWest1,
        AwsRegion::UsWest2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AwsRegion::AfSouth1 => "af-south-1",
            AwsRegion::ApEast1 => "ap-east-1",
            AwsRegion::ApNortheast1 => "ap-northeast-1",
            AwsRegion::ApNortheast2 => "ap-northeast-2",
            AwsRegion::ApNortheast3 => "ap-northeast-3",
            AwsRegion::ApSouth1 => "ap-south-1",
            AwsRegion::ApSoutheast1 => "ap-southeast-1",
            AwsRegion::ApSoutheast2 => "ap-southeast-2",
            AwsRegion::ApSoutheast4 => "ap-southeast-4",
            AwsRegion::CaCentral1 => "ca-central-1",
            AwsRegion::EuCentral1 => "eu-central-1",
            AwsRegion::EuCentral2 => "eu-central-2",
            AwsRegion::EuNorth1 => "eu-north-1",
            AwsRegion::EuSouth1 => "eu-south-1",
            AwsRegion::EuWest1 => "eu-west-1",
            AwsRegion::EuWest2 => "eu-west-2",
            AwsRegion::EuWest3 => "eu-west-3",
            AwsRegion::MeSouth1 => "me-south-1",
            AwsRegion::SaEast1 => "sa-east-1",
            AwsRegion::UsEast1 => "us-east-1",
            AwsRegion::UsEast2 => "us-east-2",
            AwsRegion::UsWest1 => "us-west-1",
            AwsRegion::UsWest2 => "us-west-2",
        }
    }

    /// Resolve the value returned by `GetBucketLocation`.
    ///
    /// An empty constraint means us-east-1 and the legacy `EU` constraint
    /// means eu-west-1.
    pub fn from_location_constraint(constraint: Option<&str>) -> Result<Self, StorageError> {
        match constraint {
            None | Some("") => Ok(AwsRegion::UsEast1),
            Some("EU") => Ok(AwsRegion::EuWest1),
            Some(other) => other.parse(),
        }
    }
}

impl FromStr for AwsRegion {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AwsRegion::ALL
            .iter()
            .copied()
            .find(|region| region.as_str() == s)
            .ok_or_else(|| StorageError::InvalidRegion(format!("\"{}\" is not a supported AWS region", s)))
    }
}

impl Display for AwsRegion {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl Serialize for AwsRegion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Region of the local filesystem provider: a directory below the storage root
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalRegion(String);

impl LocalRegion {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for LocalRegion {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = !s.is_empty()
            && s.len() <= 63
            && s
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            && !s.starts_with('-');
        if !valid {
            return Err(StorageError::InvalidRegion(format!(
                "\"{}\" is not a valid local region (lowercase letters, digits and hyphens)",
                s
            )));
        }
        Ok(LocalRegion(s.to_string()))
    }
}

impl Display for LocalRegion {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl Serialize for LocalRegion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aws_region_round_trips() {
        for region in AwsRegion::ALL {
            assert_eq!(region.as_str().parse::<AwsRegion>().unwrap(), region);
        }
        assert!("mars-north-1".parse::<AwsRegion>().is_err());
    }

    #[test]
    fn location_constraint_special_cases() {
        assert_eq!(
            AwsRegion::from_location_constraint(None).unwrap(),
            AwsRegion::UsEast1
        );
        assert_eq!(
            AwsRegion::from_location_constraint(Some("")).unwrap(),
            AwsRegion::UsEast1
        );
        assert_eq!(
            AwsRegion::from_location_constraint(Some("EU")).unwrap(),
            AwsRegion::EuWest1
        );
        assert_eq!(
            AwsRegion::from_location_constraint(Some("ap-south-1")).unwrap(),
            AwsRegion::ApSouth1
        );
    }

    #[test]
    fn local_region_rejects_path_tricks() {
        assert!("dev-1".parse::<LocalRegion>().is_ok());
        assert!("".parse::<LocalRegion>().is_err());
        assert!("../etc".parse::<LocalRegion>().is_err());
        assert!("a/b".parse::<LocalRegion>().is_err());
        assert!("-x".parse::<LocalRegion>().is_err());
    }
}
