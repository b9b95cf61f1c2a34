//! Bone regions: the discrete, non-overlapping parts of a skeleton that can be driven by
//! different playback states at the same time.

use bitflags::bitflags;

/// Number of discrete regions.
pub const NUM_REGIONS: usize = 4;

bitflags! {
    /// A set of bone regions targeted by a playback state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Regions: u8 {
        const LOWER_BODY = 1 << 0;
        const TORSO = 1 << 1;
        const LEFT_ARM = 1 << 2;
        const RIGHT_ARM = 1 << 3;

        const UPPER_BODY = Self::TORSO.bits() | Self::LEFT_ARM.bits() | Self::RIGHT_ARM.bits();
        const ALL = Self::LOWER_BODY.bits() | Self::UPPER_BODY.bits();
    }
}

/// A single discrete region.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Region {
    LowerBody,
    Torso,
    LeftArm,
    RightArm,
}

impl Region {
    /// All discrete regions, in resolution order.
    pub const ALL: [Region; NUM_REGIONS] = [
        Region::LowerBody,
        Region::Torso,
        Region::LeftArm,
        Region::RightArm,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::LowerBody => 0,
            Self::Torso => 1,
            Self::LeftArm => 2,
            Self::RightArm => 3,
        }
    }

    pub fn mask(self) -> Regions {
        match self {
            Self::LowerBody => Regions::LOWER_BODY,
            Self::Torso => Regions::TORSO,
            Self::LeftArm => Regions::LEFT_ARM,
            Self::RightArm => Regions::RIGHT_ARM,
        }
    }

    /// The region a bone with this name starts, if it is one of the biped region roots.
    ///
    /// Bones that are not a region root inherit the region of their nearest ancestor that is,
    /// and fall back to [`Region::LowerBody`].
    pub(crate) fn from_root_bone_name(name: &str) -> Option<Self> {
        match name {
            "Bip01 L Clavicle" => Some(Self::LeftArm),
            "Bip01 R Clavicle" => Some(Self::RightArm),
            "Bip01 Spine1" => Some(Self::Torso),
            _ => None,
        }
    }
}

impl Regions {
    /// Iterates over the discrete regions contained in this set.
    pub fn iter_regions(self) -> impl Iterator<Item = Region> {
        Region::ALL
            .into_iter()
            .filter(move |region| self.contains(region.mask()))
    }
}

impl From<Region> for Regions {
    fn from(region: Region) -> Self {
        region.mask()
    }
}
