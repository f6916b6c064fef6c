mod secret;
mod slot;
mod version;

pub use secret::{DeviceResponse, SecretKey};
pub use slot::{Slot, SlotSet};
pub use version::Version;
