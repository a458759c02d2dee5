//! Tests for deterministic animation frame selection

#[cfg(test)]
mod tests {
    use quadmap::map::animation::AnimationClock;
    use quadmap::map::cell::Animation;

    // Tests frame advances once per period and wraps at the frame count
    // Verified by dropping the modulo
    #[test]
    fn test_frame_wraps() {
        let anim = Animation::new(0, 4);

        assert_eq!(AnimationClock::at(0).frame(anim), 0);
        assert_eq!(AnimationClock::at(99).frame(anim), 0);
        assert_eq!(AnimationClock::at(250).frame(anim), 2);
        assert_eq!(AnimationClock::at(450).frame(anim), 0);
    }

    // Tests slower speed classes use longer periods
    // Verified by ignoring the speed class
    #[test]
    fn test_frame_speed_class() {
        let slow = Animation::new(2, 4);

        assert_eq!(slow.period_ms(), 200);
        assert_eq!(AnimationClock::at(450).frame(slow), 2);
    }

    // Tests static tiles always show frame 0
    // Verified by animating static tiles
    #[test]
    fn test_static_tile_frame() {
        assert_eq!(AnimationClock::at(12_345).frame(Animation::default()), 0);
    }

    // Tests clocks with the same elapsed time agree
    // Verified by adding per-clock jitter
    #[test]
    fn test_shared_clock_value() {
        let anim = Animation::new(5, 7);
        let mut first = AnimationClock::default();
        let mut second = AnimationClock::at(0);

        for _ in 0..37 {
            first.advance(33);
        }
        second.advance(37 * 33);

        assert_eq!(first, second);
        assert_eq!(first.frame(anim), second.frame(anim));
    }

    // Tests advancing saturates instead of wrapping
    // Verified by using wrapping addition
    #[test]
    fn test_advance_saturates() {
        let mut clock = AnimationClock::at(u64::MAX - 1);
        clock.advance(10);

        assert_eq!(clock.elapsed_ms(), u64::MAX);
    }
}
