//! Typing role ticker for the hero.
//!
//! Types the current role one character at a time, holds the full word,
//! deletes it, then moves on to the next role. Purely timer-driven; the
//! visible text is a signal.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use spark_signals::{signal, Signal};

use crate::config::TypingConfig;
use crate::engine::{clear_timeout, set_timeout, TimerId};

struct TickerInner {
    roles: Vec<String>,
    type_ms: u64,
    delete_ms: u64,
    pause_ms: u64,
    text: Signal<String>,
    role_index: Cell<usize>,
    deleting: Cell<bool>,
    timer: Cell<Option<TimerId>>,
}

pub struct TypingTicker {
    inner: Rc<TickerInner>,
}

impl TypingTicker {
    /// Start typing the first role. An empty role list never ticks.
    pub fn start(config: &TypingConfig) -> Self {
        let ticker = Self {
            inner: Rc::new(TickerInner {
                roles: config.roles.clone(),
                type_ms: config.type_ms,
                delete_ms: config.delete_ms,
                pause_ms: config.pause_ms,
                text: signal(String::new()),
                role_index: Cell::new(0),
                deleting: Cell::new(false),
                timer: Cell::new(None),
            }),
        };
        if !ticker.inner.roles.is_empty() {
            schedule(&ticker.inner, ticker.inner.type_ms);
        }
        ticker
    }

    /// Currently displayed text.
    pub fn text(&self) -> String {
        self.inner.text.get()
    }

    pub fn text_signal(&self) -> Signal<String> {
        self.inner.text.clone()
    }

    pub fn role_index(&self) -> usize {
        self.inner.role_index.get()
    }

    pub fn is_running(&self) -> bool {
        self.inner.timer.get().is_some()
    }

    pub fn stop(&self) {
        if let Some(id) = self.inner.timer.take() {
            clear_timeout(id);
        }
    }
}

impl Drop for TypingTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn schedule(inner: &Rc<TickerInner>, delay_ms: u64) {
    let weak: Weak<TickerInner> = Rc::downgrade(inner);
    let id = set_timeout(delay_ms, move || {
        if let Some(inner) = weak.upgrade() {
            inner.timer.set(None);
            let next = step(&inner);
            schedule(&inner, next);
        }
    });
    inner.timer.set(Some(id));
}

/// Advance one character. Returns the delay until the next step.
fn step(inner: &TickerInner) -> u64 {
    let target = &inner.roles[inner.role_index.get() % inner.roles.len()];
    let shown = inner.text.get().chars().count();

    if inner.deleting.get() {
        let next: String = target.chars().take(shown.saturating_sub(1)).collect();
        let empty = next.is_empty();
        inner.text.set(next);
        if empty {
            inner.deleting.set(false);
            inner.role_index.set((inner.role_index.get() + 1) % inner.roles.len());
            inner.type_ms
        } else {
            inner.delete_ms
        }
    } else {
        let next: String = target.chars().take(shown + 1).collect();
        let complete = next.chars().count() >= target.chars().count();
        inner.text.set(next);
        if complete {
            inner.deleting.set(true);
            inner.pause_ms
        } else {
            inner.type_ms
        }
    }
}
