/// Slot of a node inside the [`crate::GroupTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

/// Slot of a registered scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneId(pub(crate) u32);

/// Slot of a registered entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub(crate) u32);

/// Backend recording channel handle, allocated by [`crate::Backend::open_channel`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct ChannelId(pub u64);

/// Conversion between arena slots and typed ids.
pub(crate) trait SlotKey: Copy {
    fn from_slot(slot: usize) -> Self;
    fn slot(self) -> usize;
}

macro_rules! slot_key {
    ($($ty:ident),*) => {
        $(
            impl SlotKey for $ty {
                fn from_slot(slot: usize) -> Self {
                    Self(slot as u32)
                }

                fn slot(self) -> usize {
                    self.0 as usize
                }
            }
        )*
    };
}

slot_key!(NodeId, SceneId, EntityId);
