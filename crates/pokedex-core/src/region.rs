//! Region registry and catalog id mapping
//!
//! Every region owns a contiguous block of global catalog ids. The block is
//! declared as a first id plus a catalog size, so the upper bound can never
//! drift away from the size. [`RegionRegistry`] is built once and shared
//! (`Arc`) by every component that resolves ids.

use std::collections::HashMap;
use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DexError;

/// A regional catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Kanto,
    Johto,
    Hoenn,
    Sinnoh,
    Unova,
    Kalos,
    Alola,
    Galar,
    Hisui,
    Paldea,
}

/// Sum of every region's catalog size; the national percentage divisor.
pub const TOTAL_CATALOG_SIZE: u32 = {
    let mut total = 0;
    let mut i = 0;
    while i < Region::ALL.len() {
        total += Region::ALL[i].catalog_size();
        i += 1;
    }
    total
};

impl Region {
    /// All regions in global id order
    pub const ALL: [Region; 10] = [
        Region::Kanto,
        Region::Johto,
        Region::Hoenn,
        Region::Sinnoh,
        Region::Unova,
        Region::Kalos,
        Region::Alola,
        Region::Galar,
        Region::Hisui,
        Region::Paldea,
    ];

    /// Lowercase region key
    pub const fn name(self) -> &'static str {
        match self {
            Region::Kanto => "kanto",
            Region::Johto => "johto",
            Region::Hoenn => "hoenn",
            Region::Sinnoh => "sinnoh",
            Region::Unova => "unova",
            Region::Kalos => "kalos",
            Region::Alola => "alola",
            Region::Galar => "galar",
            Region::Hisui => "hisui",
            Region::Paldea => "paldea",
        }
    }

    /// Number of entries in this region's catalog
    pub const fn catalog_size(self) -> u32 {
        match self {
            Region::Kanto => 151,
            Region::Johto => 100,
            Region::Hoenn => 135,
            Region::Sinnoh => 107,
            Region::Unova => 156,
            Region::Kalos => 72,
            Region::Alola => 88,
            Region::Galar => 89,
            Region::Hisui => 7,
            Region::Paldea => 120,
        }
    }

    /// First global id owned by this region
    pub const fn first_id(self) -> u32 {
        match self {
            Region::Kanto => 1,
            Region::Johto => 152,
            Region::Hoenn => 252,
            Region::Sinnoh => 387,
            Region::Unova => 494,
            Region::Kalos => 650,
            Region::Alola => 722,
            Region::Galar => 810,
            Region::Hisui => 899,
            Region::Paldea => 906,
        }
    }

    /// Last global id owned by this region (inclusive)
    pub const fn last_id(self) -> u32 {
        self.first_id() + self.catalog_size() - 1
    }

    /// Whether `global_id` falls inside this region's range
    pub const fn contains(self, global_id: u32) -> bool {
        global_id >= self.first_id() && global_id <= self.last_id()
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Region {
    type Err = DexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Region::ALL
            .into_iter()
            .find(|region| region.name() == key)
            .ok_or_else(|| DexError::InvalidRegion(s.to_string()))
    }
}

/// Static description of one region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionInfo {
    pub region: Region,
    pub catalog_size: u32,
    /// Inclusive global id range `[lo, hi]`
    pub first_id: u32,
    pub last_id: u32,
}

impl RegionInfo {
    fn of(region: Region) -> Self {
        Self {
            region,
            catalog_size: region.catalog_size(),
            first_id: region.first_id(),
            last_id: region.last_id(),
        }
    }
}

/// Immutable lookup table over all regions
#[derive(Debug, Clone)]
pub struct RegionRegistry {
    /// Sorted by `first_id`
    entries: Vec<RegionInfo>,
    by_name: HashMap<&'static str, Region>,
    total_catalog_size: u32,
}

impl Default for RegionRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl RegionRegistry {
    /// Build the registry for the ten standard regions
    pub fn standard() -> Self {
        let mut entries: Vec<RegionInfo> = Region::ALL.into_iter().map(RegionInfo::of).collect();
        entries.sort_by_key(|info| info.first_id);

        let by_name = Region::ALL
            .into_iter()
            .map(|region| (region.name(), region))
            .collect();

        Self {
            entries,
            by_name,
            total_catalog_size: TOTAL_CATALOG_SIZE,
        }
    }

    /// All regions, ordered by global id
    pub fn regions(&self) -> &[RegionInfo] {
        &self.entries
    }

    /// Sum of all catalog sizes
    pub fn total_catalog_size(&self) -> u32 {
        self.total_catalog_size
    }

    /// Look up a region by name (case-insensitive)
    pub fn region(&self, name: &str) -> Result<RegionInfo, DexError> {
        let key = name.trim().to_ascii_lowercase();
        self.by_name
            .get(key.as_str())
            .map(|region| self.info(*region))
            .ok_or_else(|| DexError::InvalidRegion(name.to_string()))
    }

    /// Static data for a region
    pub fn info(&self, region: Region) -> RegionInfo {
        RegionInfo::of(region)
    }

    /// Resolve a global id to its region and 1-based regional id
    pub fn locate(&self, global_id: u32) -> Result<(Region, u32), DexError> {
        let mut matches = self
            .entries
            .iter()
            .filter(|info| global_id >= info.first_id && global_id <= info.last_id);

        let info = matches.next().ok_or(DexError::IdOutOfRange { id: global_id })?;
        debug_assert!(matches.next().is_none(), "region ranges overlap");

        Ok((info.region, global_id - info.first_id + 1))
    }

    /// Inverse of [`locate`](Self::locate)
    pub fn global_id(&self, region: Region, regional_id: u32) -> Result<u32, DexError> {
        self.check_regional_id(region, regional_id)?;
        Ok(region.first_id() + regional_id - 1)
    }

    /// Reject regional ids outside `1..=catalog_size`
    pub fn check_regional_id(&self, region: Region, regional_id: u32) -> Result<(), DexError> {
        if regional_id == 0 || regional_id > region.catalog_size() {
            return Err(DexError::InvalidRegionalId {
                region: region.name().to_string(),
                regional_id,
                catalog_size: region.catalog_size(),
            });
        }
        Ok(())
    }
}
