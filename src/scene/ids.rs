use std::fmt;
use std::hash::Hash;

/// Common surface of the typed ids, used by the scene registries.
pub trait EntityId: Copy + Eq + Hash + fmt::Debug + From<u32> {
    /// Entity kind, for diagnostics.
    const KIND: &'static str;

    fn get(self) -> u32;
}

macro_rules! define_id {
    ($($name:ident => $kind:literal),* $(,)?) => {
        $(
            #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(u32);

            impl $name {
                pub fn get(self) -> u32 {
                    self.0
                }
            }

            impl EntityId for $name {
                const KIND: &'static str = $kind;

                fn get(self) -> u32 {
                    self.0
                }
            }

            impl From<u32> for $name {
                fn from(id: u32) -> Self {
                    Self(id)
                }
            }

            impl fmt::Debug for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}({})", stringify!($name), self.0)
                }
            }
        )*
    };
}

define_id!(
    MeshId => "mesh",
    MaterialId => "material",
    TransformId => "transform",
    SphereId => "sphere",
    RenderableId => "renderable",
);

/// Hands out unique, monotonically increasing ids. One allocator is
/// shared by every entity kind of a scene, so ids never collide across
/// kinds either.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next<I: From<u32>>(&mut self) -> I {
        let id = self.next;
        self.next += 1;
        I::from(id)
    }
}
