/// Lifecycle of one zoom level's atlas inside the cache.
///
/// Absent → Building → Resident. A failed build falls back to Absent so the
/// next request retries; a resident atlas is never evicted.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum AtlasState {
    #[default]
    Absent,
    Building,
    Resident,
}
