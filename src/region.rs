bitflags::bitflags! {
    /// The region id assigned to a span or contour.
    ///
    /// Region ids and the [`Self::BORDER`] flag share the same 16-bit word: a
    /// region id of `0` means "not in any region", and any other region may
    /// additionally be marked as a border region.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
    pub struct RegionId: u16 {
        /// No region. Spans with this id are not walkable or not yet labeled.
        const NONE = 0;
        /// Border region flag.
        ///
        /// If a region id has this bit set, the region is a border region
        /// and its spans are considered un-walkable for the purposes of
        /// contour tracing; border regions never originate a contour, but
        /// they do bound them.
        const BORDER = 0x8000;
    }
}

impl RegionId {
    /// `true` for spans that never originate a contour: unlabeled spans and border regions.
    #[inline]
    pub fn is_border_or_null(self) -> bool {
        self == RegionId::NONE || self.contains(RegionId::BORDER)
    }

    /// `true` for border regions specifically (distinct from the unlabeled `NONE` region).
    #[inline]
    pub fn is_border(self) -> bool {
        self.contains(RegionId::BORDER)
    }
}

impl From<u16> for RegionId {
    fn from(value: u16) -> Self {
        RegionId::from_bits_retain(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_border_or_null() {
        assert!(RegionId::NONE.is_border_or_null());
    }

    #[test]
    fn plain_region_is_not_border_or_null() {
        let region = RegionId::from(3);
        assert!(!region.is_border_or_null());
        assert!(!region.is_border());
    }

    #[test]
    fn border_flag_is_detected_alongside_an_id() {
        let region = RegionId::from(3) | RegionId::BORDER;
        assert!(region.is_border_or_null());
        assert!(region.is_border());
    }
}
