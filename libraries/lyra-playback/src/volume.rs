//! Volume control with mute
//!
//! Volume is a linear level in [0, 1] handed straight to the audio output.
//! Muting keeps the level so unmuting restores it.

/// Clamp a requested volume into [0, 1]
///
/// NaN is treated as silence.
pub fn clamp_volume(level: f32) -> f32 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}

/// Volume controller
#[derive(Debug, Clone)]
pub struct Volume {
    /// Volume level (0.0-1.0)
    level: f32,

    /// Mute state (preserves volume level)
    muted: bool,
}

impl Volume {
    /// Create new volume controller
    ///
    /// # Arguments
    /// * `level` - Initial volume, clamped to [0, 1]
    pub fn new(level: f32) -> Self {
        Self {
            level: clamp_volume(level),
            muted: false,
        }
    }

    /// Set volume level, returns the clamped value
    ///
    /// A non-zero level while muted unmutes.
    pub fn set_level(&mut self, level: f32) -> f32 {
        self.level = clamp_volume(level);
        if self.level > 0.0 {
            self.muted = false;
        }
        self.level
    }

    /// Get current volume level
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Mute audio (preserves volume level)
    pub fn mute(&mut self) {
        self.muted = true;
    }

    /// Unmute audio (restores previous volume)
    pub fn unmute(&mut self) {
        self.muted = false;
    }

    /// Toggle mute state, returns whether muted
    ///
    /// Unmuting a zero level restores `fallback_level` instead.
    pub fn toggle_mute(&mut self, fallback_level: f32) -> bool {
        if self.is_muted() {
            self.unmute();
            if self.level == 0.0 {
                self.set_level(fallback_level);
            }
        } else {
            self.mute();
        }
        self.is_muted()
    }

    /// Check if muted
    ///
    /// A level of zero counts as muted.
    pub fn is_muted(&self) -> bool {
        self.muted || self.level == 0.0
    }

    /// Level the output should actually use
    pub fn gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.level
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(0.7)
    }
}
