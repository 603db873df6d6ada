//! Focus-driven status effects.
//!
//! A status never exists on its own: it is the set of source units currently
//! focusing the carrier. The carrier keeps one source list per status and the
//! source keeps the mirrored `focusing` list, so both sides can be updated by
//! the same result set.

/// Status a focusing unit grants to the units it focuses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusKind {
    /// Cannot act and cannot block.
    Paralysis,
    /// Power reduced per poison source.
    Poison,
    /// Immune to magic damage and magic statuses.
    Barrier,
    /// Armor increased per armor source.
    Armor,
}

impl StatusKind {
    /// Harmful statuses are applied to enemies and removed by cleansing.
    pub const fn is_harmful(self) -> bool {
        matches!(self, StatusKind::Paralysis | StatusKind::Poison)
    }
}
