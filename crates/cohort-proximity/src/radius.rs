//! The proximity radius and the device classes that pick it.

use crate::{Error, Result, PHONE_RADIUS, TABLET_RADIUS};

/// Distance threshold below which two entities are connected.
///
/// Always positive and finite. A zero radius would only connect entities
/// sharing an exact position, so it is rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ProximityRadius(f64);

impl ProximityRadius {
    /// Validate and wrap a radius.
    pub fn new(radius: f64) -> Result<Self> {
        if radius.is_finite() && radius > 0.0 {
            Ok(Self(radius))
        } else {
            Err(Error::InvalidRadius(radius))
        }
    }

    /// The radius used for a class of device.
    pub const fn for_device(device: DeviceClass) -> Self {
        match device {
            DeviceClass::Phone => Self(PHONE_RADIUS),
            DeviceClass::Tablet => Self(TABLET_RADIUS),
        }
    }

    /// Get the raw distance.
    #[inline]
    pub const fn value(&self) -> f64 {
        self.0
    }

    /// Whether a distance falls strictly inside the radius.
    #[inline]
    pub fn admits(&self, distance: f64) -> bool {
        distance < self.0
    }
}

impl TryFrom<f64> for ProximityRadius {
    type Error = Error;

    fn try_from(radius: f64) -> Result<Self> {
        Self::new(radius)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ProximityRadius {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = f64::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Screen class of the device hosting a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DeviceClass {
    /// Phone-sized canvas
    #[default]
    Phone,
    /// Tablet-sized canvas
    Tablet,
}
