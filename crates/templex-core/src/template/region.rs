//! Decoding regions and the per-class region catalog.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::geometry::Rect;

/// Class whose regions are used when no classifier is configured.
pub const DEFAULT_CLASS: &str = "default";

/// Named sub-area of the document and the height it is dewarped to.
///
/// The name doubles as the name of the parser group run over the region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RegionRepr")]
pub struct DecodingRegion {
    pub name: String,
    /// Position relative to the document frame, within the unit square.
    pub position: Rect,
    /// Height in pixels of the dewarped region image.
    pub dewarp_height: u32,
}

#[derive(Deserialize)]
struct RegionRepr {
    name: String,
    position: Rect,
    dewarp_height: u32,
}

impl TryFrom<RegionRepr> for DecodingRegion {
    type Error = ConfigError;

    fn try_from(repr: RegionRepr) -> Result<Self, Self::Error> {
        DecodingRegion::new(repr.name, repr.position, repr.dewarp_height)
    }
}

impl DecodingRegion {
    pub fn new(
        name: impl Into<String>,
        position: Rect,
        dewarp_height: u32,
    ) -> Result<Self, ConfigError> {
        let name = name.into();

        if name.is_empty() {
            return Err(ConfigError::InvalidArgument(
                "region name must not be empty".to_string(),
            ));
        }
        if !position.is_relative() {
            return Err(ConfigError::InvalidRegion {
                name,
                reason: format!(
                    "rectangle ({}, {}, {}, {}) is not inside the unit square",
                    position.x, position.y, position.width, position.height
                ),
            });
        }
        if dewarp_height == 0 {
            return Err(ConfigError::InvalidRegion {
                name,
                reason: "dewarp height must be positive".to_string(),
            });
        }

        Ok(Self {
            name,
            position,
            dewarp_height,
        })
    }
}

/// Region lists keyed by document class name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionCatalog {
    classes: BTreeMap<String, Vec<DecodingRegion>>,
}

impl RegionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace or create the region list of a class.
    ///
    /// The list must not be empty. A region name repeated within the list
    /// keeps the position of its first occurrence and the value of its last.
    pub fn set_regions(
        &mut self,
        class: &str,
        regions: &[DecodingRegion],
    ) -> Result<(), ConfigError> {
        if class.is_empty() {
            return Err(ConfigError::InvalidArgument(
                "class name must not be empty".to_string(),
            ));
        }
        if regions.is_empty() {
            return Err(ConfigError::InvalidArgument(format!(
                "class {class} needs at least one region"
            )));
        }

        let mut list: Vec<DecodingRegion> = Vec::with_capacity(regions.len());
        for region in regions {
            match list.iter_mut().find(|r| r.name == region.name) {
                Some(existing) => {
                    warn!(
                        "Region {} appears twice in class {}, keeping the last one",
                        region.name, class
                    );
                    *existing = region.clone();
                }
                None => list.push(region.clone()),
            }
        }

        debug!("Class {} has {} regions", class, list.len());
        self.classes.insert(class.to_string(), list);
        Ok(())
    }

    pub fn remove_regions(&mut self, class: &str) -> Result<(), ConfigError> {
        self.classes
            .remove(class)
            .map(|_| ())
            .ok_or_else(|| ConfigError::UnknownClass(class.to_string()))
    }

    pub fn remove_all_regions(&mut self) {
        self.classes.clear();
    }

    /// Regions of a class in the order they were set; empty for unknown classes.
    pub fn regions(&self, class: &str) -> &[DecodingRegion] {
        self.classes.get(class).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_class(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[DecodingRegion])> {
        self.classes
            .iter()
            .map(|(name, regions)| (name.as_str(), regions.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
