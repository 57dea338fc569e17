//! Cross-thread requests
//!
//! Other threads never touch the registry. They send [`SceneCommand`]s or raise
//! the [`ReloadFlag`], and the update thread picks both up at fixed points of
//! the frame.

use crate::ecs::Entity;
use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Request applied by the update thread just before the destruction barrier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    /// Queue an entity for destruction
    DestroyEntity(Entity),
    /// Resize the viewport
    ResizeViewport {
        /// New width
        width: u32,
        /// New height
        height: u32,
    },
}

/// Cloneable handle for sending commands from any thread
#[derive(Debug, Clone)]
pub struct CommandSender(Sender<SceneCommand>);

impl CommandSender {
    /// Queue a command; `false` once the scene is gone
    pub fn send(&self, command: SceneCommand) -> bool {
        self.0.send(command).is_ok()
    }
}

pub(crate) struct CommandQueue {
    sender: Sender<SceneCommand>,
    receiver: Receiver<SceneCommand>,
}

impl CommandQueue {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self { sender, receiver }
    }

    pub(crate) fn sender(&self) -> CommandSender {
        CommandSender(self.sender.clone())
    }

    pub(crate) fn drain_into(&self, out: &mut Vec<SceneCommand>) {
        out.extend(self.receiver.try_iter());
    }
}

/// Flag a watcher thread raises to request a script reload
#[derive(Debug, Clone, Default)]
pub struct ReloadFlag(Arc<AtomicBool>);

impl ReloadFlag {
    /// Request a reload
    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether a reload is pending
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Clear the flag, returning whether it was set
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_cross_threads() {
        let queue = CommandQueue::new();
        let sender = queue.sender();
        std::thread::spawn(move || {
            sender.send(SceneCommand::ResizeViewport { width: 640, height: 480 });
        })
        .join()
        .unwrap();

        let mut drained = Vec::new();
        queue.drain_into(&mut drained);
        assert_eq!(drained, vec![SceneCommand::ResizeViewport { width: 640, height: 480 }]);
    }

    #[test]
    fn test_reload_flag_take_clears() {
        let flag = ReloadFlag::default();
        let watcher = flag.clone();
        watcher.request();
        assert!(flag.is_requested());
        assert!(flag.take());
        assert!(!flag.take());
    }
}
