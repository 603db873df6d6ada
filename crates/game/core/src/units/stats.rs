//! Static per-kind statistics.

use super::UnitKind;

/// Base statistics shared by every unit of a kind.
///
/// Percentages (`armor`, `blocking`) are expressed in `[0, 100]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitStats {
    pub name: &'static str,
    pub health: i32,
    pub power: i32,
    pub armor: i32,
    pub blocking: i32,
    pub mobility: u32,
    pub recovery: u8,
    /// Inclusive `(min, max)` attack distance.
    pub range: (u32, u32),
    /// Line-of-sight cap for ranged kinds; zero when unused.
    pub los: u32,
}

const KNIGHT: UnitStats = UnitStats {
    name: "Knight",
    health: 50,
    power: 22,
    armor: 40,
    blocking: 80,
    mobility: 3,
    recovery: 1,
    range: (1, 1),
    los: 0,
};

const SCOUT: UnitStats = UnitStats {
    name: "Scout",
    health: 40,
    power: 18,
    armor: 8,
    blocking: 60,
    mobility: 4,
    recovery: 2,
    range: (1, 6),
    los: 6,
};

const PYROMANCER: UnitStats = UnitStats {
    name: "Pyromancer",
    health: 30,
    power: 15,
    armor: 0,
    blocking: 33,
    mobility: 3,
    recovery: 3,
    range: (1, 3),
    los: 0,
};

const CLERIC: UnitStats = UnitStats {
    name: "Cleric",
    health: 24,
    power: 12,
    armor: 0,
    blocking: 0,
    mobility: 3,
    recovery: 5,
    range: (0, 0),
    los: 0,
};

const BARRIER_WARD: UnitStats = UnitStats {
    name: "Barrier Ward",
    health: 28,
    power: 0,
    armor: 0,
    blocking: 0,
    mobility: 0,
    recovery: 2,
    range: (1, 3),
    los: 0,
};

const LIGHTNING_WARD: UnitStats = UnitStats {
    name: "Lightning Ward",
    health: 56,
    power: 30,
    armor: 18,
    blocking: 0,
    mobility: 0,
    recovery: 4,
    range: (2, 3),
    los: 0,
};

const POISON_WISP: UnitStats = UnitStats {
    name: "Poison Wisp",
    health: 35,
    power: 0,
    armor: 8,
    blocking: 0,
    mobility: 4,
    recovery: 1,
    range: (1, 2),
    los: 0,
};

const ENCHANTRESS: UnitStats = UnitStats {
    name: "Enchantress",
    health: 35,
    power: 0,
    armor: 0,
    blocking: 0,
    mobility: 3,
    recovery: 3,
    range: (1, 2),
    los: 0,
};

const DARK_MAGIC_WITCH: UnitStats = UnitStats {
    name: "Dark Magic Witch",
    health: 28,
    power: 24,
    armor: 0,
    blocking: 20,
    mobility: 3,
    recovery: 3,
    range: (1, 4),
    los: 0,
};

const STONE_GOLEM: UnitStats = UnitStats {
    name: "Stone Golem",
    health: 60,
    power: 20,
    armor: 30,
    blocking: 20,
    mobility: 2,
    recovery: 2,
    range: (1, 1),
    los: 0,
};

impl UnitKind {
    /// Base statistics for this kind.
    pub const fn stats(self) -> &'static UnitStats {
        match self {
            UnitKind::Knight => &KNIGHT,
            UnitKind::Scout => &SCOUT,
            UnitKind::Pyromancer => &PYROMANCER,
            UnitKind::Cleric => &CLERIC,
            UnitKind::BarrierWard => &BARRIER_WARD,
            UnitKind::LightningWard => &LIGHTNING_WARD,
            UnitKind::PoisonWisp => &POISON_WISP,
            UnitKind::Enchantress => &ENCHANTRESS,
            UnitKind::DarkMagicWitch => &DARK_MAGIC_WITCH,
            UnitKind::StoneGolem => &STONE_GOLEM,
        }
    }
}
