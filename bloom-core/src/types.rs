/// Identifier for a [`crate::seed::Seed`].
///
/// Handed out by [`crate::garden::Garden`] from a monotonically increasing
/// counter, so two seeds planted at the same spot still differ. It carries
/// no ordering or visual meaning.
pub type SeedId = u64;
