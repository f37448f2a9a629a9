//! Badge visual pool contract and prototype-backed implementation.

/// Pool of reusable badge visuals.
///
/// Ownership of a handle moves to the caller on `acquire`/`instantiate` and
/// back to the pool on `release`.
pub trait BadgePool {
    type Badge;

    /// Takes one idle badge, if any.
    fn acquire(&mut self) -> Option<Self::Badge>;
    /// Returns a badge to the idle set.
    fn release(&mut self, badge: Self::Badge);
    /// Creates a fresh badge when the idle set is empty.
    fn instantiate(&mut self) -> Self::Badge;
}

/// Handout counters for one pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Badges handed out from the idle set.
    pub reused: u64,
    /// Badges created from the prototype.
    pub instantiated: u64,
    /// Badges returned to the idle set.
    pub released: u64,
}

impl PoolStats {
    /// Badges currently held outside the pool.
    pub fn checked_out(&self) -> u64 {
        (self.reused + self.instantiated).saturating_sub(self.released)
    }
}

/// Pool that clones a visual prototype on demand.
#[derive(Debug)]
pub struct PrototypePool<B> {
    prototype: B,
    idle: Vec<B>,
    stats: PoolStats,
}

impl<B: Clone> PrototypePool<B> {
    pub fn new(prototype: B) -> Self {
        Self {
            prototype,
            idle: Vec::new(),
            stats: PoolStats::default(),
        }
    }

    /// Pre-creates `count` idle badges.
    pub fn prewarm(&mut self, count: usize) {
        self.idle
            .extend(std::iter::repeat_with(|| self.prototype.clone()).take(count));
    }

    pub fn idle_len(&self) -> usize {
        self.idle.len()
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    pub fn prototype(&self) -> &B {
        &self.prototype
    }
}

impl<B: Clone> BadgePool for PrototypePool<B> {
    type Badge = B;

    fn acquire(&mut self) -> Option<B> {
        let badge = self.idle.pop()?;
        self.stats.reused += 1;
        Some(badge)
    }

    fn release(&mut self, badge: B) {
        self.stats.released += 1;
        self.idle.push(badge);
    }

    fn instantiate(&mut self) -> B {
        self.stats.instantiated += 1;
        self.prototype.clone()
    }
}
