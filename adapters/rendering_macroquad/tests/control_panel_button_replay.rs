use isogrid_rendering::FrameInput;
use isogrid_rendering_macroquad::{ControlPanelInputState, ParameterStep};

fn run_sequence(sequence: &[bool]) -> Vec<bool> {
    let mut state = ControlPanelInputState::default();
    let mut presses = Vec::new();
    for &pressed in sequence {
        presses.push(state.take_generate());
        if pressed {
            state.register_generate();
        }
    }

    // Flush any trailing latched press so the harness observes the final one.
    presses.push(state.take_generate());
    presses
}

#[test]
fn generate_button_sequence_is_deterministic() {
    let button_sequence = [false, true, false, true, true, false];
    let expected = vec![false, false, true, false, true, true, false];

    let first_run = run_sequence(&button_sequence);
    let second_run = run_sequence(&button_sequence);

    assert_eq!(first_run, expected);
    assert_eq!(first_run, second_run);
}

#[test]
fn stepper_presses_accumulate_until_the_next_frame() {
    let mut state = ControlPanelInputState::default();
    state.register_step(ParameterStep::Width, 1);
    state.register_step(ParameterStep::Width, 1);
    state.register_step(ParameterStep::Obstacles, -1);

    assert_eq!(
        state.take_frame_input(false),
        FrameInput {
            generate_pressed: false,
            width_delta: 2,
            height_delta: 0,
            obstacle_delta: -1,
        }
    );
    assert_eq!(
        state.take_frame_input(false),
        FrameInput::default(),
        "deltas are consumed once"
    );
}

#[test]
fn keyboard_shortcut_and_button_merge_into_one_press() {
    let mut state = ControlPanelInputState::default();
    state.register_generate();

    assert!(state.take_frame_input(true).generate_pressed);
    assert!(state.take_frame_input(true).generate_pressed);
    assert!(!state.take_frame_input(false).generate_pressed);
}
