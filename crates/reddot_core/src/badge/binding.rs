//! UI target bindings.
//!
//! # Responsibility
//! - Pair one host UI target with at most one acquired badge.
//! - Mount badges at the centre of the target's content bounds.
//!
//! # Invariants
//! - `badge.is_some()` only while the owning node is on.
//! - A display count is pushed only when it differs from the last pushed one.

use crate::badge::pool::BadgePool;

/// Host-side badge visual.
pub trait BadgeVisual {
    /// Updates the number rendered on the badge.
    fn set_display_count(&mut self, count: u64);
}

/// Content bounds of a UI target.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Centre of the bounds, relative to the target origin.
    pub fn center(&self) -> Anchor {
        Anchor {
            x: self.width / 2.0,
            y: self.height / 2.0,
        }
    }
}

/// Badge position relative to its target.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Anchor {
    pub x: f32,
    pub y: f32,
}

/// Opaque host UI element that can carry a badge as a child.
///
/// Targets are handles: binding equality (`PartialEq`) decides whether two
/// handles refer to the same element.
pub trait UiTarget<B> {
    fn content_size(&self) -> Size;
    fn attach_badge(&self, badge: &mut B, anchor: Anchor);
    fn detach_badge(&self, badge: &mut B);
}

/// One node-to-target association.
pub struct UiBinding<T, B> {
    target: T,
    badge: Option<B>,
    displayed: Option<u64>,
}

impl<T, B> UiBinding<T, B> {
    pub(crate) fn new(target: T) -> Self {
        Self {
            target,
            badge: None,
            displayed: None,
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn has_badge(&self) -> bool {
        self.badge.is_some()
    }

    /// Last count pushed to the badge, while one is mounted.
    pub fn displayed_count(&self) -> Option<u64> {
        self.displayed
    }
}

impl<T, B> UiBinding<T, B>
where
    T: UiTarget<B>,
    B: BadgeVisual,
{
    /// Mounts a badge if needed and pushes `count`.
    ///
    /// Returns `true` when a badge was taken from the pool.
    pub(crate) fn show<P>(&mut self, pool: &mut P, count: u64) -> bool
    where
        P: BadgePool<Badge = B>,
    {
        let mut acquired = false;
        if self.badge.is_none() {
            let mut badge = pool.acquire().unwrap_or_else(|| pool.instantiate());
            self.target
                .attach_badge(&mut badge, self.target.content_size().center());
            self.badge = Some(badge);
            self.displayed = None;
            acquired = true;
        }

        if self.displayed != Some(count) {
            if let Some(badge) = self.badge.as_mut() {
                badge.set_display_count(count);
                self.displayed = Some(count);
            }
        }
        acquired
    }

    /// Unmounts the badge and returns it to the pool.
    ///
    /// Returns `true` when a badge was released.
    pub(crate) fn hide<P>(&mut self, pool: &mut P) -> bool
    where
        P: BadgePool<Badge = B>,
    {
        let Some(mut badge) = self.badge.take() else {
            return false;
        };
        self.target.detach_badge(&mut badge);
        pool.release(badge);
        self.displayed = None;
        true
    }
}
