//! Kinematic attributes and the compile-time attribute packs built from
//! them.

/// One scalar dimension a kinematic state vector can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KinematicAttribute {
    PosX,
    PosY,
    Vel,
    VelX,
    VelY,
    Acc,
    AccX,
    AccY,
    Roll,
    Pitch,
    Yaw,
    RollRate,
    PitchRate,
    YawRate,
}

impl KinematicAttribute {
    /// True for attributes whose values wrap at `(-pi, pi]` and must be
    /// normalised before being used as an innovation.
    pub fn is_angle(self) -> bool {
        matches!(self, Self::Roll | Self::Pitch | Self::Yaw)
    }
}

/// A compile-time-ordered, duplicate-free list of `N` attributes. `N` is
/// the dimension of every state vector, covariance matrix and
/// observation matrix built over this pack.
///
/// Validated once at construction: every pack used in this workspace is
/// built as a `const` at its call site, so a violation here is a
/// programming error, not a runtime condition — hence the panic.
#[derive(Debug, Clone, Copy)]
pub struct AttributePack<const N: usize> {
    attributes: [KinematicAttribute; N],
}

impl<const N: usize> AttributePack<N> {
    pub const fn new(attributes: [KinematicAttribute; N]) -> Self {
        let pack = Self { attributes };
        pack.assert_valid();
        pack
    }

    const fn assert_valid(&self) {
        let mut i = 0;
        while i < N {
            let mut j = i + 1;
            while j < N {
                if Self::same_attribute(self.attributes[i], self.attributes[j]) {
                    panic!("attribute pack contains a duplicate attribute");
                }
                j += 1;
            }
            i += 1;
        }
    }

    const fn same_attribute(a: KinematicAttribute, b: KinematicAttribute) -> bool {
        a as u8 == b as u8
    }

    pub fn attributes(&self) -> &[KinematicAttribute; N] {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        N
    }

    pub fn is_empty(&self) -> bool {
        N == 0
    }

    /// The index of `attribute` within this pack, or `None` if it isn't a
    /// member. Injective by the no-duplicates invariant enforced in `new`.
    pub fn index_of(&self, attribute: KinematicAttribute) -> Option<usize> {
        self.attributes.iter().position(|a| Self::same_attribute(*a, attribute))
    }

    pub fn contains(&self, attribute: KinematicAttribute) -> bool {
        self.index_of(attribute).is_some()
    }
}
