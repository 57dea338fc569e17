//! Frame statistics

/// Counters updated by every `frame_update`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneStats {
    /// Frames processed
    pub frames: u64,

    /// Physics steps taken in the last frame
    pub physics_steps_last_frame: u32,

    /// Physics steps taken since the scene was created
    pub physics_steps_total: u64,

    /// Frames whose accumulator was clamped
    pub clamped_frames: u64,

    /// Live entities after the last barrier
    pub entity_count: usize,

    /// Entities purged by the last barrier
    pub destroyed_last_frame: usize,

    /// Items handed to renderers in the last frame
    pub rendered_items: usize,

    /// Contacts delivered to scripts
    pub contacts_delivered: u64,
}

impl SceneStats {
    /// Mean physics steps per frame
    pub fn average_steps_per_frame(&self) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let average = self.physics_steps_total as f64 / self.frames as f64;
        average
    }
}
