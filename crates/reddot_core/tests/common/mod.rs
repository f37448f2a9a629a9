#![allow(dead_code)]

use reddot_core::{
    Anchor, BadgePool, BadgeVisual, CheckFn, RedDotSystem, Size, SystemConfig, TopologyConfig,
    TopologyEntry, UiTarget,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Badge double that remembers the last pushed count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestBadge {
    pub count: u64,
}

impl BadgeVisual for TestBadge {
    fn set_display_count(&mut self, count: u64) {
        self.count = count;
    }
}

/// UI target double; equality is by name.
#[derive(Debug, Clone)]
pub struct RecordingTarget {
    pub name: &'static str,
    pub log: Rc<RefCell<Vec<String>>>,
}

impl RecordingTarget {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

impl PartialEq for RecordingTarget {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl UiTarget<TestBadge> for RecordingTarget {
    fn content_size(&self) -> Size {
        Size::new(100.0, 50.0)
    }

    fn attach_badge(&self, _badge: &mut TestBadge, anchor: Anchor) {
        self.log
            .borrow_mut()
            .push(format!("attach {} at {},{}", self.name, anchor.x, anchor.y));
    }

    fn detach_badge(&self, _badge: &mut TestBadge) {
        self.log.borrow_mut().push(format!("detach {}", self.name));
    }
}

/// Pool double counting every call.
#[derive(Debug, Default)]
pub struct CountingPool {
    pub idle: Vec<TestBadge>,
    pub acquire_calls: u32,
    pub acquire_hits: u32,
    pub release_calls: u32,
    pub instantiate_calls: u32,
}

impl CountingPool {
    /// Badges currently held outside the pool.
    pub fn outstanding(&self) -> u32 {
        self.instantiate_calls + self.acquire_hits - self.release_calls
    }
}

impl BadgePool for CountingPool {
    type Badge = TestBadge;

    fn acquire(&mut self) -> Option<TestBadge> {
        self.acquire_calls += 1;
        let badge = self.idle.pop();
        if badge.is_some() {
            self.acquire_hits += 1;
        }
        badge
    }

    fn release(&mut self, badge: TestBadge) {
        self.release_calls += 1;
        self.idle.push(badge);
    }

    fn instantiate(&mut self) -> TestBadge {
        self.instantiate_calls += 1;
        TestBadge::default()
    }
}

pub type TestSystem = RedDotSystem<RecordingTarget, CountingPool>;

pub fn counting_system() -> TestSystem {
    RedDotSystem::with_pool(CountingPool::default(), SystemConfig::default())
}

pub fn config(entries: &[(&str, &str)]) -> TopologyConfig {
    entries
        .iter()
        .map(|(key, path)| (key.to_string(), TopologyEntry::new(*path)))
        .collect()
}

/// `A` at `0` with children `B` (`0.0`) and `C` (`0.1`).
pub fn abc_config() -> TopologyConfig {
    config(&[("A", "0"), ("B", "0.0"), ("C", "0.1")])
}

pub fn constant(value: i64) -> CheckFn {
    Rc::new(move |_, _| value)
}

/// Check whose result can be changed after registration.
pub fn adjustable(initial: i64) -> (CheckFn, Rc<Cell<i64>>) {
    let value = Rc::new(Cell::new(initial));
    let source = Rc::clone(&value);
    let check: CheckFn = Rc::new(move |_, _| source.get());
    (check, value)
}
