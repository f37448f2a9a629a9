//! Console demo for the badge engine.
//!
//! # Responsibility
//! - Build a small badge tree from an embedded JSON table.
//! - Drive it with a simulated clock and print state after every tick.
//!
//! Set `REDDOT_LOG_DIR` (absolute path) to write engine logs, and
//! `REDDOT_LOG_LEVEL` to override the default level.

use log::info;
use reddot_core::{
    default_log_level, init_logging, Anchor, BadgeVisual, CheckArg, CheckFn, OwnerId,
    PrototypePool, RedDotSystem, Size, SystemConfig, TopologyConfig, UiTarget,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error;
use std::rc::Rc;
use std::time::{Duration, Instant};

const TOPOLOGY_JSON: &str = r#"{
    "Home":   { "priority": "0",   "name": "Home" },
    "Quests": { "priority": "0.0", "name": "Quests" },
    "Mail":   { "priority": "0.1", "name": "Mail" },
    "Shop":   { "priority": "1",   "name": "Shop" },
    "Deals":  { "priority": "1.0", "name": "Daily deals" }
}"#;

const QUEST_COUNT: usize = 3;

#[derive(Debug, Clone, Default)]
struct DotBadge {
    count: u64,
}

impl BadgeVisual for DotBadge {
    fn set_display_count(&mut self, count: u64) {
        self.count = count;
        println!("    badge shows {count}");
    }
}

/// Console stand-in for an on-screen button. Identity is the shared handle.
#[derive(Debug, Clone)]
struct ConsoleButton(Rc<ButtonInfo>);

#[derive(Debug)]
struct ButtonInfo {
    label: String,
    size: Size,
}

impl ConsoleButton {
    fn new(label: &str) -> Self {
        Self(Rc::new(ButtonInfo {
            label: label.to_string(),
            size: Size::new(120.0, 40.0),
        }))
    }
}

impl PartialEq for ConsoleButton {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl UiTarget<DotBadge> for ConsoleButton {
    fn content_size(&self) -> Size {
        self.0.size
    }

    fn attach_badge(&self, _badge: &mut DotBadge, anchor: Anchor) {
        println!("    [{}] badge mounted at ({}, {})", self.0.label, anchor.x, anchor.y);
    }

    fn detach_badge(&self, badge: &mut DotBadge) {
        println!("    [{}] badge removed (last count {})", self.0.label, badge.count);
    }
}

type DemoSystem = RedDotSystem<ConsoleButton, PrototypePool<DotBadge>>;

fn main() -> Result<(), Box<dyn Error>> {
    if let Ok(log_dir) = std::env::var("REDDOT_LOG_DIR") {
        let level = std::env::var("REDDOT_LOG_LEVEL")
            .unwrap_or_else(|_| default_log_level().to_string());
        init_logging(&level, &log_dir)?;
    }
    println!("reddot_core version={}", reddot_core::core_version());

    let topology: TopologyConfig = serde_json::from_str(TOPOLOGY_JSON)?;
    let mut system: DemoSystem = RedDotSystem::with_pool(
        PrototypePool::new(DotBadge::default()),
        SystemConfig::default(),
    );
    system.build_tree(&topology)?;

    for key in ["Home", "Quests", "Shop"] {
        system.register_ui_node(key, ConsoleButton::new(key))?;
    }

    // Quest slots are created at runtime; each one is busy while its button
    // has unclaimed clicks.
    let clicks: Rc<RefCell<HashMap<String, i64>>> = Rc::default();
    let source = Rc::clone(&clicks);
    let is_busy: CheckFn = Rc::new(move |_: &OwnerId, args: &[CheckArg]| {
        let name = args.first().and_then(CheckArg::as_text).unwrap_or_default();
        i64::from(source.borrow().get(name).copied().unwrap_or(0) > 0)
    });
    add_quests(&mut system, &is_busy)?;

    set_count(&mut system, "Mail", 2)?;

    let t0 = Instant::now();
    system.start(t0);
    let second = Duration::from_secs(1);
    for step in 1..=5u32 {
        match step {
            2 => {
                clicks.borrow_mut().insert("quest-btn-0".to_string(), 1);
                clicks.borrow_mut().insert("quest-btn-2".to_string(), 3);
            }
            3 => {
                set_count(&mut system, "Mail", 0)?;
            }
            4 => {
                clicks.borrow_mut().clear();
                set_count(&mut system, "Deals", 5)?;
            }
            _ => {}
        }

        println!("t={step}s");
        if let Some(report) = system.pump(t0 + second * step) {
            info!(
                "event=demo_tick module=cli step={} on_nodes={} acquired={} released={}",
                step, report.on_nodes, report.acquired, report.released
            );
        }
        print_state(&system);
    }

    let released = system.teardown();
    let stats = system.pool().stats();
    println!(
        "teardown released={} instantiated={} reused={} idle={}",
        released,
        stats.instantiated,
        stats.reused,
        system.pool().idle_len()
    );
    Ok(())
}

/// Adds the runtime quest nodes under `Quests`, each watched by `is_busy`.
fn add_quests(system: &mut DemoSystem, is_busy: &CheckFn) -> Result<(), Box<dyn Error>> {
    let owner = OwnerId::new("quest_panel");
    for index in 0..QUEST_COUNT {
        let key = format!("quest_{index}");
        if !system.add_node(&key, Some("Quests")) {
            return Err(format!("failed to add quest node `{key}`").into());
        }
        system
            .register_event(
                &key,
                Rc::clone(is_busy),
                owner.clone(),
                vec![CheckArg::from(format!("quest-btn-{index}"))],
            )
            .ok_or_else(|| format!("failed to register busy check on `{key}`"))?;
    }
    Ok(())
}

fn set_count(system: &mut DemoSystem, key: &str, count: i64) -> Result<(), Box<dyn Error>> {
    if system.set_manual_count(key, count) {
        Ok(())
    } else {
        Err(format!("failed to set count on `{key}`").into())
    }
}

fn print_state(system: &DemoSystem) {
    let mut stack: Vec<(String, usize)> = system
        .roots()
        .map(|root| (root.to_string(), 0))
        .collect();
    stack.reverse();
    while let Some((key, depth)) = stack.pop() {
        let Some(node) = system.node(&key) else {
            continue;
        };
        println!(
            "  {}{} {} count={}",
            "  ".repeat(depth),
            if node.is_on { "*" } else { "-" },
            node.name.as_deref().unwrap_or(&node.key),
            node.aggregate_count
        );
        stack.extend(
            node.children
                .into_iter()
                .rev()
                .map(|child| (child, depth + 1)),
        );
    }
}
