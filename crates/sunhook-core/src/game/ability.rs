use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use strum::{EnumCount, EnumIter, FromRepr, IntoEnumIterator, IntoStaticStr};

use crate::error::Result;
use crate::memory::ReadMemory;
use crate::memory::layout::progress;

/// Abilities tracked by the randomizer, in memory order
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    EnumCount,
    FromRepr,
    IntoStaticStr,
    strum::Display,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Ability {
    DoubleJump = 0,
    TripleJump = 1,
    Sideflip = 2,
    Grab = 3,
    GroundSpin = 4,
    SpinJump = 5,
    Dive = 6,
    WallKicks = 7,
    GroundPound = 8,
    YCamera = 9,
    Talking = 10,
    ShineShirt = 11,
    Sunglasses = 12,
    Helmet = 13,
    Yoshi = 14,
    Blooper = 15,
    Torocco = 16,
    Spray = 17,
    SpamSpray = 18,
    Hover = 19,
    Rocket = 20,
    Turbo = 21,
    Climbing = 22,
}

impl Ability {
    pub fn from_index(index: usize) -> Option<Self> {
        u8::try_from(index).ok().and_then(Self::from_repr)
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Tracker key, e.g. `DOUBLE_JUMP`
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// Unlock flags for every [`Ability`], indexed by position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AbilityVector([bool; Ability::COUNT]);

impl AbilityVector {
    /// Byte `i` nonzero means ability `i` is unlocked. Missing bytes read as locked.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut flags = [false; Ability::COUNT];
        for (flag, byte) in flags.iter_mut().zip(bytes) {
            *flag = *byte != 0;
        }
        Self(flags)
    }

    pub fn is_unlocked(&self, ability: Ability) -> bool {
        self.0[ability.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Ability, bool)> + '_ {
        Ability::iter().map(|ability| (ability, self.is_unlocked(ability)))
    }

    pub fn unlocked(&self) -> impl Iterator<Item = Ability> + '_ {
        self.iter()
            .filter_map(|(ability, unlocked)| unlocked.then_some(ability))
    }

    pub fn unlocked_count(&self) -> usize {
        self.0.iter().filter(|&&flag| flag).count()
    }

    /// Abilities whose flag differs from `previous`
    pub fn changed_since(&self, previous: &AbilityVector) -> Vec<Ability> {
        Ability::iter()
            .filter(|&ability| self.is_unlocked(ability) != previous.is_unlocked(ability))
            .collect()
    }
}

impl Serialize for AbilityVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Ability::COUNT))?;
        for (ability, unlocked) in self.iter() {
            map.serialize_entry(ability.name(), &unlocked)?;
        }
        map.end()
    }
}

pub fn read_abilities<R: ReadMemory + ?Sized>(reader: &R) -> Result<AbilityVector> {
    let bytes = reader.read_bytes(progress::ABILITIES, progress::ABILITY_COUNT)?;
    Ok(AbilityVector::from_bytes(&bytes))
}
