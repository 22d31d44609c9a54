mod common;

mod tests {
    use super::common::RecordingLed;
    use lightpaint_core::color::{HSV_MAX, HUE_RANGE, Hsv, hsv2rgb};
    use lightpaint_core::input::default_presets;
    use lightpaint_core::transition::{DEFAULT_VELOCITY, TRANSITION_MAX, TransitionEngine};

    #[test]
    fn test_tick_is_noop_below_two_members() {
        let presets = default_presets::<4>();
        let mut led = RecordingLed::new();
        let mut engine = TransitionEngine::<4>::new(DEFAULT_VELOCITY);

        assert_eq!(engine.tick(&presets, &mut led), None);
        engine.add(2);
        assert_eq!(engine.tick(&presets, &mut led), None);
        assert_eq!(engine.offset(), 0);
        assert_eq!(led.writes(), 0);
    }

    #[test]
    fn test_first_tick_shows_first_member() {
        let presets = default_presets::<4>();
        let mut led = RecordingLed::new();
        let mut engine = TransitionEngine::<4>::new(DEFAULT_VELOCITY);
        engine.add(0);
        engine.add(1);

        assert_eq!(engine.tick(&presets, &mut led), Some(presets[0]));
        assert_eq!(led.last(), Some(hsv2rgb(presets[0])));
        assert_eq!(engine.offset(), DEFAULT_VELOCITY);
    }

    #[test]
    fn test_offset_advances_then_wraps_once_per_cycle() {
        let presets = default_presets::<4>();
        let mut led = RecordingLed::new();
        let mut engine = TransitionEngine::<4>::new(1000);
        engine.add(0);
        engine.add(1);

        let mut previous = engine.offset();
        for _ in 0..16 {
            engine.tick(&presets, &mut led);
            assert!(engine.offset() > previous);
            assert_eq!(engine.segment(), 0);
            previous = engine.offset();
        }

        engine.tick(&presets, &mut led);
        assert_eq!(engine.segment(), 1);
        assert_eq!(engine.offset(), 17_000 - TRANSITION_MAX);

        for _ in 0..15 {
            engine.tick(&presets, &mut led);
            assert_eq!(engine.segment(), 1);
        }
        engine.tick(&presets, &mut led);
        assert_eq!(engine.segment(), 0);
        assert_eq!(engine.offset(), 17_000 - TRANSITION_MAX + 16_000 - TRANSITION_MAX);
    }

    #[test]
    fn test_fades_toward_second_member() {
        let presets = default_presets::<4>();
        let mut led = RecordingLed::new();
        let mut engine = TransitionEngine::<4>::new(TRANSITION_MAX / 4);
        engine.add(0);
        engine.add(1);

        let hues: Vec<u16> = (0..5)
            .filter_map(|_| engine.tick(&presets, &mut led))
            .map(|color| color.hue)
            .collect();
        assert_eq!(hues, [0, 1024, 2048, 3072, 4096]);
    }

    #[test]
    fn test_hue_fade_takes_short_arc() {
        let mut presets = default_presets::<2>();
        presets[0] = Hsv::new(100, HSV_MAX as u16, HSV_MAX as u16);
        presets[1] = Hsv::new(16_300, HSV_MAX as u16, HSV_MAX as u16);
        let mut led = RecordingLed::new();
        let mut engine = TransitionEngine::<2>::new(TRANSITION_MAX / 16);
        engine.add(0);
        engine.add(1);

        for _ in 0..40 {
            let color = engine.tick(&presets, &mut led).unwrap();
            let d = i32::from(color.hue).rem_euclid(HUE_RANGE);
            let distance_from_red = d.min(HUE_RANGE - d);
            assert!(distance_from_red <= 100, "hue {}", color.hue);
        }
    }

    #[test]
    fn test_membership() {
        let mut engine = TransitionEngine::<4>::new(DEFAULT_VELOCITY);
        assert!(engine.add(3));
        assert!(engine.add(1));
        assert!(!engine.add(1));
        assert!(!engine.add(4));
        assert!(engine.add(0));
        assert_eq!(engine.members(), &[3, 1, 0]);
        assert_eq!(engine.current_pair(), Some((3, 1)));

        assert!(!engine.remove(2));
        assert!(engine.remove(1));
        assert_eq!(engine.members(), &[3, 0]);

        engine.reset();
        assert!(engine.is_empty());
        assert!(!engine.is_fading());
    }

    #[test]
    fn test_remove_resets_progress() {
        let presets = default_presets::<4>();
        let mut led = RecordingLed::new();
        let mut engine = TransitionEngine::<4>::new(10_000);
        engine.add(0);
        engine.add(1);
        engine.add(2);
        engine.tick(&presets, &mut led);
        engine.tick(&presets, &mut led);
        assert_eq!(engine.segment(), 1);

        engine.remove(1);
        assert_eq!(engine.members(), &[0, 2]);
        assert_eq!(engine.segment(), 0);
        assert_eq!(engine.offset(), 0);
    }

    #[test]
    fn test_add_resets_offset() {
        let presets = default_presets::<4>();
        let mut led = RecordingLed::new();
        let mut engine = TransitionEngine::<4>::new(500);
        engine.add(0);
        engine.add(1);
        engine.tick(&presets, &mut led);
        assert_eq!(engine.offset(), 500);

        engine.add(2);
        assert_eq!(engine.offset(), 0);
    }

    #[test]
    fn test_velocity_is_symmetric_and_clamped() {
        let mut engine = TransitionEngine::<4>::new(DEFAULT_VELOCITY);
        assert_eq!(engine.velocity(0, 1), DEFAULT_VELOCITY);

        assert_eq!(engine.set_velocity(1, 0, 50), DEFAULT_VELOCITY + 50);
        assert_eq!(engine.velocity(0, 1), DEFAULT_VELOCITY + 50);
        assert_eq!(engine.velocity(0, 2), DEFAULT_VELOCITY);

        assert_eq!(engine.set_velocity(0, 1, -100_000), 0);
        assert_eq!(engine.set_velocity(0, 1, 100_000), TRANSITION_MAX);
        assert_eq!(engine.velocity(2, 2), 0);
    }
}
