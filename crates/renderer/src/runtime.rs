use std::time::Instant;

/// Monotonic clock started when the render session is created.
///
/// The reading is never reset or wrapped for the lifetime of the session.
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    origin: Instant,
}

impl SessionClock {
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Seconds elapsed since [`SessionClock::start`].
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds_at(Instant::now())
    }

    pub fn elapsed_seconds_at(&self, now: Instant) -> f64 {
        now.saturating_duration_since(self.origin).as_secs_f64()
    }
}

/// Values fed to the optional shader uniforms for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    /// `u_window_size`: drawable width and height in pixels.
    pub window_size: [f32; 2],
    /// `u_time`: seconds since the session started.
    pub time: f32,
}

impl FrameUniforms {
    pub fn new(drawable: (u32, u32), seconds: f64) -> Self {
        Self {
            window_size: [drawable.0 as f32, drawable.1 as f32],
            time: seconds as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn clock_tracks_elapsed_time() {
        let clock = SessionClock::start();
        let first = clock.elapsed_seconds();
        std::thread::sleep(Duration::from_millis(20));
        let second = clock.elapsed_seconds();
        assert!(second >= first);
        assert!(second - first >= 0.019);
    }

    #[test]
    fn clock_never_goes_backwards() {
        let clock = SessionClock::start();
        let before = clock.origin - Duration::from_secs(1);
        assert_eq!(clock.elapsed_seconds_at(before), 0.0);
        let later = clock.origin + Duration::from_millis(1500);
        assert!((clock.elapsed_seconds_at(later) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn uniforms_carry_drawable_size_as_floats() {
        let uniforms = FrameUniforms::new((1280, 720), 2.25);
        assert_eq!(uniforms.window_size, [1280.0, 720.0]);
        assert_eq!(uniforms.time, 2.25);
    }
}
