/// A small integer area classifier (e.g. ground vs. water).
///
/// Orthogonal to [`RegionId`](crate::RegionId): boundaries between different
/// areas within a single region are preserved as portal edges during contour
/// simplification (the `AREA_BORDER` flag), the same way region boundaries
/// are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
pub struct AreaType(pub u8);

impl AreaType {
    /// The area code used for non-walkable spans.
    pub const NOT_WALKABLE: AreaType = AreaType(0);

    /// `true` unless this is [`Self::NOT_WALKABLE`].
    #[inline]
    pub fn is_walkable(self) -> bool {
        self != Self::NOT_WALKABLE
    }
}

impl From<u8> for AreaType {
    fn from(value: u8) -> Self {
        AreaType(value)
    }
}
