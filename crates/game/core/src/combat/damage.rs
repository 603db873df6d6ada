//! Damage and healing arithmetic.

/// Damage type for armor and barrier interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageType {
    /// Reduced by armor; may be blocked.
    Physical,
    /// Ignores armor; nullified by barrier.
    Magic,
}

/// Calculate damage from an attack.
///
/// # Formula
///
/// ```text
/// physical = round(power * (100 - armor) / 100)
/// magic    = power
/// ```
pub fn calculate_damage(power: i32, armor: i32, damage_type: DamageType) -> i32 {
    let power = power.max(0);
    match damage_type {
        DamageType::Physical => {
            let armor = armor.clamp(0, 100);
            (power * (100 - armor) + 50) / 100
        }
        DamageType::Magic => power,
    }
}

/// Apply damage to a health modifier.
///
/// The result is clamped to `[-health, 0]`: overkill lands exactly on lethal.
pub fn apply_damage(health: i32, m_health: i32, damage: i32) -> i32 {
    (m_health - damage).min(0).max(-health)
}

/// Apply healing to a health modifier, never above full health.
pub fn apply_heal(m_health: i32, amount: i32) -> i32 {
    (m_health + amount.max(0)).min(0)
}
