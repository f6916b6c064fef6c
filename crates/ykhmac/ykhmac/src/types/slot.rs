use std::fmt;

use derive_more::Display;

use crate::constants::cmd;
use crate::{Error, Result};

/// One of the token's two configuration slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Slot {
    /// First slot
    #[display("1")]
    Slot1,
    /// Second slot
    #[display("2")]
    Slot2,
}

impl Slot {
    /// Both slots, in probing order
    pub const ALL: [Self; 2] = [Self::Slot1, Self::Slot2];

    /// API command code for a challenge-response on this slot
    pub const fn hmac_command(&self) -> u8 {
        match self {
            Self::Slot1 => cmd::HMAC_SLOT_1,
            Self::Slot2 => cmd::HMAC_SLOT_2,
        }
    }

    const fn flag(&self) -> u8 {
        match self {
            Self::Slot1 => 0x01,
            Self::Slot2 => 0x02,
        }
    }
}

impl TryFrom<u8> for Slot {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::Slot1),
            2 => Ok(Self::Slot2),
            _ => Err(Error::InvalidArgument("slot must be 1 or 2")),
        }
    }
}

/// Set of slots found configured on a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotSet(u8);

impl SlotSet {
    /// The empty set
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Add a slot to the set
    pub const fn insert(&mut self, slot: Slot) {
        self.0 |= slot.flag();
    }

    /// Whether the slot is in the set
    pub const fn contains(&self, slot: Slot) -> bool {
        self.0 & slot.flag() != 0
    }

    /// Whether no slot is in the set
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Raw flags, slot 1 in bit 0 and slot 2 in bit 1
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Slots in the set, in probing order
    pub fn iter(&self) -> impl Iterator<Item = Slot> + '_ {
        Slot::ALL.into_iter().filter(|slot| self.contains(*slot))
    }
}

impl FromIterator<Slot> for SlotSet {
    fn from_iter<I: IntoIterator<Item = Slot>>(iter: I) -> Self {
        let mut set = Self::empty();
        for slot in iter {
            set.insert(slot);
        }
        set
    }
}

impl fmt::Display for SlotSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let slots: Vec<String> = self.iter().map(|slot| slot.to_string()).collect();
        write!(f, "{}", slots.join(", "))
    }
}
