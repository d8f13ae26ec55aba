#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Generate-button trigger system and its process-wide instance.
//!
//! The trigger owns the "first generation" flag and fans a single button
//! press out to every subscribed grid as a [`Dispatch`]. Grids subscribe and
//! unsubscribe explicitly when they are enabled or disabled.

use std::{
    collections::BTreeSet,
    sync::{Mutex, OnceLock},
};

use isogrid_core::{Command, Dispatch, SubscriberId};
use log::debug;
use thiserror::Error;

static INSTANCE: OnceLock<Mutex<GenerateTrigger>> = OnceLock::new();

/// Errors raised while bootstrapping the process-wide trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum BootstrapError {
    /// A trigger instance was already installed for this process.
    #[error("the generate trigger is already installed")]
    AlreadyInstalled,
}

/// Button-driven source of regeneration commands.
#[derive(Debug)]
pub struct GenerateTrigger {
    first_generation: bool,
    subscribers: BTreeSet<SubscriberId>,
    next_subscriber: u32,
}

impl Default for GenerateTrigger {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerateTrigger {
    /// Creates a trigger that has never been pressed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            first_generation: true,
            subscribers: BTreeSet::new(),
            next_subscriber: 0,
        }
    }

    /// Registers a new subscriber and returns its identifier.
    pub fn subscribe(&mut self) -> SubscriberId {
        let subscriber = SubscriberId::new(self.next_subscriber);
        self.next_subscriber = self.next_subscriber.wrapping_add(1);
        let _ = self.subscribers.insert(subscriber);
        debug!("trigger subscriber {} registered", subscriber.get());
        subscriber
    }

    /// Re-registers a subscriber that unsubscribed earlier.
    ///
    /// Returns `false` when the subscriber was already registered.
    pub fn resubscribe(&mut self, subscriber: SubscriberId) -> bool {
        self.subscribers.insert(subscriber)
    }

    /// Removes a subscriber. Returns whether it was registered.
    pub fn unsubscribe(&mut self, subscriber: SubscriberId) -> bool {
        let removed = self.subscribers.remove(&subscriber);
        if removed {
            debug!("trigger subscriber {} removed", subscriber.get());
        }
        removed
    }

    /// Reports whether the subscriber currently receives presses.
    #[must_use]
    pub fn is_subscribed(&self, subscriber: SubscriberId) -> bool {
        self.subscribers.contains(&subscriber)
    }

    /// Number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Whether the next press will be reported as the first generation.
    #[must_use]
    pub const fn is_first_generation(&self) -> bool {
        self.first_generation
    }

    /// Handles a button press, emitting one regenerate command per subscriber.
    ///
    /// The first-generation flag drops to `false` after every press, even when
    /// nobody is listening.
    pub fn press(&mut self, out: &mut Vec<Dispatch>) {
        let command = Command::Regenerate {
            first_generation: self.first_generation,
        };
        out.extend(
            self.subscribers
                .iter()
                .map(|&subscriber| Dispatch { subscriber, command }),
        );
        self.first_generation = false;
    }
}

/// Installs the process-wide trigger. Only the first call succeeds.
pub fn install(
    trigger: GenerateTrigger,
) -> Result<&'static Mutex<GenerateTrigger>, BootstrapError> {
    INSTANCE
        .set(Mutex::new(trigger))
        .map_err(|_| BootstrapError::AlreadyInstalled)?;
    INSTANCE.get().ok_or(BootstrapError::AlreadyInstalled)
}

/// Returns the process-wide trigger, if one was installed.
#[must_use]
pub fn instance() -> Option<&'static Mutex<GenerateTrigger>> {
    INSTANCE.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_press_reports_first_generation_once() {
        let mut trigger = GenerateTrigger::new();
        let subscriber = trigger.subscribe();
        let mut out = Vec::new();

        trigger.press(&mut out);
        trigger.press(&mut out);

        assert_eq!(
            out,
            vec![
                Dispatch {
                    subscriber,
                    command: Command::Regenerate {
                        first_generation: true,
                    },
                },
                Dispatch {
                    subscriber,
                    command: Command::Regenerate {
                        first_generation: false,
                    },
                },
            ]
        );
    }

    #[test]
    fn press_without_subscribers_still_consumes_first_generation() {
        let mut trigger = GenerateTrigger::new();
        let mut out = Vec::new();

        trigger.press(&mut out);

        assert!(out.is_empty());
        assert!(!trigger.is_first_generation());
    }
}
