//! Thread-safe timer handle
//!
//! `Timer` itself is single-threaded. Hosts that take commands from several
//! threads (hotkeys, an autosplitter loop, a UI) share a `SharedTimer`, which
//! runs one command at a time. Each command's events are queued while the
//! timer is still locked, so subscribers see them in the order the commands
//! ran. Delivery happens outside the timer lock, on whichever thread is
//! draining the queue, so a command issued from inside a notification is
//! delivered after the current one finishes. Subscribers must not call
//! `subscribe` from inside a notification.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::core::{EventHandler, Timer, TimerCallback, TimerEvent};
use crate::time::{Clock, SystemClock};

/// Cloneable handle to a timer shared between threads
pub struct SharedTimer<C: Clock = SystemClock> {
    timer: Arc<Mutex<Timer<C>>>,
    pending: Arc<Mutex<VecDeque<Vec<TimerEvent>>>>,
    events: Arc<Mutex<EventHandler>>,
}

impl<C: Clock> SharedTimer<C> {
    pub fn new(timer: Timer<C>) -> Self {
        Self {
            timer: Arc::new(Mutex::new(timer)),
            pending: Arc::new(Mutex::new(VecDeque::new())),
            events: Arc::new(Mutex::new(EventHandler::new())),
        }
    }

    /// Register a callback for timer events
    pub fn subscribe(&self, callback: TimerCallback) {
        self.events.lock().subscribe(callback);
    }

    /// Run a command and deliver its events to subscribers
    ///
    /// ```ignore
    /// shared.execute(Timer::split);
    /// shared.execute(|timer| timer.reset(true));
    /// ```
    pub fn execute<F>(&self, command: F) -> Vec<TimerEvent>
    where
        F: FnOnce(&mut Timer<C>) -> Vec<TimerEvent>,
    {
        let events = {
            let mut timer = self.timer.lock();
            let events = command(&mut timer);
            if !events.is_empty() {
                self.pending.lock().push_back(events.clone());
            }
            events
        };
        if !events.is_empty() {
            self.deliver_pending();
        }
        events
    }

    /// Drain queued events to subscribers unless another thread already is
    fn deliver_pending(&self) {
        loop {
            let Some(handler) = self.events.try_lock() else {
                return;
            };
            loop {
                let next = self.pending.lock().pop_front();
                let Some(events) = next else {
                    break;
                };
                if handler.has_listeners() {
                    handler.emit(&events);
                }
            }
            drop(handler);

            // Events queued after the last pop but before the handler was released
            if self.pending.lock().is_empty() {
                return;
            }
        }
    }

    /// Read timer state under the lock
    pub fn read<R>(&self, f: impl FnOnce(&Timer<C>) -> R) -> R {
        f(&self.timer.lock())
    }

    /// Mutate timer state that produces no events (deaths, game time)
    pub fn update<R>(&self, f: impl FnOnce(&mut Timer<C>) -> R) -> R {
        f(&mut self.timer.lock())
    }
}

impl<C: Clock> Clone for SharedTimer<C> {
    fn clone(&self) -> Self {
        Self {
            timer: Arc::clone(&self.timer),
            pending: Arc::clone(&self.pending),
            events: Arc::clone(&self.events),
        }
    }
}
