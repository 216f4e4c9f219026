//! Update requests and their resolution to a concrete catalog entry

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DexError;
use crate::region::{Region, RegionRegistry};

/// What happened to the creature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DexAction {
    Catch,
    See,
}

impl DexAction {
    pub fn as_str(self) -> &'static str {
        match self {
            DexAction::Catch => "catch",
            DexAction::See => "see",
        }
    }
}

impl Display for DexAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DexAction {
    type Err = DexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "catch" => Ok(DexAction::Catch),
            "see" => Ok(DexAction::See),
            _ => Err(DexError::InvalidAction(s.to_string())),
        }
    }
}

/// A validated catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryTarget {
    pub region: Region,
    /// 1-based position within the region
    pub regional_id: u32,
}

impl EntryTarget {
    /// Bit position inside the regional flags
    ///
    /// Only meaningful for targets that passed
    /// [`RegionRegistry::check_regional_id`].
    pub fn bit_position(self) -> usize {
        self.regional_id.saturating_sub(1) as usize
    }

    pub fn global_id(self) -> u32 {
        self.region.first_id() + self.regional_id.saturating_sub(1)
    }
}

impl Display for EntryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.region, self.regional_id)
    }
}

/// Wire form of a mutation request
///
/// A positive `global_id` takes precedence over `region` + `regional_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub regional_id: Option<u32>,
    #[serde(default)]
    pub global_id: Option<u32>,
    pub action: String,
}

impl UpdateRequest {
    /// Request addressed by global catalog id
    pub fn by_global_id(global_id: u32, action: DexAction) -> Self {
        Self {
            global_id: Some(global_id),
            action: action.as_str().to_string(),
            ..Default::default()
        }
    }

    /// Request addressed by region name and regional id
    pub fn by_region(region: impl Into<String>, regional_id: u32, action: DexAction) -> Self {
        Self {
            region: Some(region.into()),
            regional_id: Some(regional_id),
            action: action.as_str().to_string(),
            ..Default::default()
        }
    }

    /// Validate the request against the registry
    pub fn resolve(&self, registry: &RegionRegistry) -> Result<(EntryTarget, DexAction), DexError> {
        let action: DexAction = self.action.parse()?;

        let target = match (self.global_id, self.region.as_deref(), self.regional_id) {
            (Some(global_id), _, _) if global_id > 0 => {
                let (region, regional_id) = registry.locate(global_id)?;
                EntryTarget {
                    region,
                    regional_id,
                }
            }
            (_, Some(name), Some(regional_id)) => {
                let region = registry.region(name)?.region;
                registry.check_regional_id(region, regional_id)?;
                EntryTarget {
                    region,
                    regional_id,
                }
            }
            _ => return Err(DexError::MissingTarget),
        };

        Ok((target, action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parsing() {
        assert_eq!("catch".parse::<DexAction>().unwrap(), DexAction::Catch);
        assert_eq!(" SEE ".parse::<DexAction>().unwrap(), DexAction::See);
        assert!(matches!(
            "release".parse::<DexAction>(),
            Err(DexError::InvalidAction(_))
        ));
    }

    #[test]
    fn test_global_id_takes_precedence() {
        let registry = RegionRegistry::standard();
        let request = UpdateRequest {
            region: Some("kanto".into()),
            regional_id: Some(3),
            global_id: Some(252),
            action: "catch".into(),
        };
        let (target, action) = request.resolve(&registry).unwrap();
        assert_eq!(target.region, Region::Hoenn);
        assert_eq!(target.regional_id, 1);
        assert_eq!(action, DexAction::Catch);
    }

    #[test]
    fn test_region_path() {
        let registry = RegionRegistry::standard();
        let (target, _) = UpdateRequest::by_region("Galar", 89, DexAction::See)
            .resolve(&registry)
            .unwrap();
        assert_eq!(target.region, Region::Galar);
        assert_eq!(target.bit_position(), 88);
        assert_eq!(target.global_id(), 898);
    }

    #[test]
    fn test_unknown_region_rejected() {
        let registry = RegionRegistry::standard();
        let err = UpdateRequest::by_region("orre", 1, DexAction::Catch)
            .resolve(&registry)
            .unwrap_err();
        assert!(matches!(err, DexError::InvalidRegion(_)));
    }

    #[test]
    fn test_regional_id_zero_rejected() {
        let registry = RegionRegistry::standard();
        let err = UpdateRequest::by_region("kanto", 0, DexAction::Catch)
            .resolve(&registry)
            .unwrap_err();
        assert!(matches!(err, DexError::InvalidRegionalId { .. }));
    }

    #[test]
    fn test_missing_target() {
        let registry = RegionRegistry::standard();
        let request = UpdateRequest {
            global_id: Some(0),
            action: "see".into(),
            ..Default::default()
        };
        assert!(matches!(
            request.resolve(&registry),
            Err(DexError::MissingTarget)
        ));
    }

    #[test]
    fn test_out_of_range_global_id() {
        let registry = RegionRegistry::standard();
        let err = UpdateRequest::by_global_id(9_999, DexAction::Catch)
            .resolve(&registry)
            .unwrap_err();
        assert!(matches!(err, DexError::IdOutOfRange { id: 9_999 }));
    }
}
