//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Runtime entities (NPCs, offspring) get strongly-typed IDs so they cannot
//! be mixed up at compile time. IDs are drawn from the session's
//! [`GameRng`] rather than the system clock, so a replayed session produces
//! the same identifiers.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::rng::GameRng;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Draw a new random (v4-formatted) identifier from the session stream.
            pub fn generate(rng: &mut GameRng) -> Self {
                let hi = rng.next_u64().to_be_bytes();
                let lo = rng.next_u64().to_be_bytes();
                let mut bytes = [0u8; 16];
                for (slot, b) in bytes.iter_mut().zip(hi.iter().chain(lo.iter())) {
                    *slot = *b;
                }
                Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a non-player character.
    NpcId
}

define_id! {
    /// Unique identifier for one of the animal's offspring.
    OffspringId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_reproducible() {
        let mut a = GameRng::new(42);
        let mut b = GameRng::new(42);
        assert_eq!(NpcId::generate(&mut a), NpcId::generate(&mut b));
    }

    #[test]
    fn consecutive_ids_differ() {
        let mut rng = GameRng::new(42);
        let first = OffspringId::generate(&mut rng);
        let second = OffspringId::generate(&mut rng);
        assert_ne!(first, second);
        assert_eq!(first.into_inner().get_version_num(), 4);
    }

    #[test]
    fn id_roundtrip_serde() {
        let mut rng = GameRng::new(1);
        let id = NpcId::generate(&mut rng);
        let json = serde_json::to_string(&id).unwrap_or_default();
        let back: Option<NpcId> = serde_json::from_str(&json).ok();
        assert_eq!(back, Some(id));
    }
}
