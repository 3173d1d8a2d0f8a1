use super::*;
use crate::audio::AudioPort;
use crate::input::{HookState, InputEvent};
use crate::menu::{ActionOutcome, ExtensionSpec, Key, MenuNode, MenuTree, NodeId};
use crate::test_support::{AudioCall, RecordingAudio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const NODE_TIMEOUT: Duration = Duration::from_secs(30);
const EXT_TIMEOUT: Duration = Duration::from_secs(3);

fn booth() -> Arc<MenuTree> {
    let root = MenuNode::new("menu/main_menu")
        .option(
            "1",
            MenuNode::new("menu/info_menu")
                .option("1", MenuNode::new("menu/weather_info"))
                .option("2", MenuNode::new("menu/time_info"))
                .back(Key::Star)
                .home(Key::Digit(0)),
        )
        .option("2", MenuNode::new("menu/jokes"))
        .option(
            "5",
            MenuNode::new("directory/enter_extension")
                .extension(ExtensionSpec::fixed(3))
                .option("101", MenuNode::new("directory/alice"))
                .option("102", MenuNode::new("directory/bob"))
                .back(Key::Star),
        )
        .option(
            "6",
            MenuNode::new("directory/departments")
                .extension(ExtensionSpec::terminated(Key::Pound))
                .option("10", MenuNode::new("directory/sales"))
                .option("20", MenuNode::new("directory/support")),
        );
    Arc::new(MenuTree::build(root).expect("valid tree"))
}

fn start(tree: &Arc<MenuTree>, policy: EnginePolicy, now: Instant) -> (NavigationEngine, Arc<RecordingAudio>) {
    let audio = Arc::new(RecordingAudio::new());
    let port: Arc<dyn AudioPort> = audio.clone();
    let engine = NavigationEngine::start(Arc::clone(tree), port, policy, now);
    (engine, audio)
}

fn press_all(engine: &mut NavigationEngine, keys: &str, now: Instant) -> Step {
    let mut step = Step::Continue;
    for ch in keys.chars() {
        step = engine.handle_key(Key::from_char(ch).expect("keypad symbol"), now);
    }
    step
}

fn child(tree: &MenuTree, from: NodeId, key: &str) -> NodeId {
    tree.resolve(from, key).expect("known key")
}

#[test]
fn start_plays_root_prompt_and_arms_timer() {
    let tree = booth();
    let t0 = Instant::now();
    let (engine, audio) = start(&tree, EnginePolicy::default(), t0);

    assert_eq!(engine.state(), &SessionState::AwaitingInput(tree.root()));
    assert_eq!(audio.calls(), vec![AudioCall::Play("menu/main_menu".into())]);
    assert_eq!(engine.next_deadline(), Some(t0 + NODE_TIMEOUT));
}

#[test]
fn key_sequence_matches_repeated_tree_lookup() {
    let tree = booth();
    let t0 = Instant::now();
    let (mut engine, audio) = start(&tree, EnginePolicy::default(), t0);

    let step = press_all(&mut engine, "12", t0);
    let expected = child(&tree, child(&tree, tree.root(), "1"), "2");
    assert_eq!(step, Step::Ended(EndReason::LeafReached(expected)));
    assert_eq!(
        audio.clips(),
        vec!["menu/main_menu", "menu/info_menu", "menu/time_info"]
    );
    assert_eq!(engine.next_deadline(), None);
}

#[test]
fn every_key_press_stops_current_prompt_first() {
    let tree = booth();
    let t0 = Instant::now();
    let (mut engine, audio) = start(&tree, EnginePolicy::default(), t0);
    audio.clear();

    engine.handle_key(Key::Digit(1), t0);
    assert_eq!(
        audio.calls(),
        vec![AudioCall::Stop, AudioCall::Play("menu/info_menu".into())]
    );
}

#[test]
fn unknown_key_plays_invalid_then_reprompts() {
    let tree = booth();
    let t0 = Instant::now();
    let (mut engine, audio) = start(&tree, EnginePolicy::default(), t0);
    audio.clear();

    let later = t0 + Duration::from_secs(10);
    assert_eq!(engine.handle_key(Key::Digit(9), later), Step::Continue);
    assert_eq!(engine.state(), &SessionState::AwaitingInput(tree.root()));
    assert_eq!(engine.invalid_inputs(), 1);
    assert_eq!(
        audio.calls(),
        vec![
            AudioCall::Stop,
            AudioCall::Play("prompts/invalid_option".into()),
            AudioCall::Enqueue("menu/main_menu".into()),
        ]
    );
    assert_eq!(engine.next_deadline(), Some(later + NODE_TIMEOUT));
}

#[test]
fn timeouts_below_ceiling_replay_without_moving() {
    let tree = booth();
    let t0 = Instant::now();
    let (mut engine, audio) = start(&tree, EnginePolicy::default(), t0);
    engine.handle_key(Key::Digit(1), t0);
    let info = child(&tree, tree.root(), "1");
    audio.clear();

    let mut now = t0;
    for retry in 1..=DEFAULT_MAX_TIMEOUT_RETRIES {
        now += NODE_TIMEOUT;
        assert_eq!(engine.poll(now), Step::Continue);
        assert_eq!(engine.state(), &SessionState::AwaitingInput(info));
        assert_eq!(engine.retries(), retry);
        assert_eq!(audio.last_clip().as_deref(), Some("menu/info_menu"));
        assert_eq!(engine.next_deadline(), Some(now + NODE_TIMEOUT));
    }

    now += NODE_TIMEOUT;
    engine.poll(now);
    assert_eq!(engine.state(), &SessionState::AwaitingInput(tree.root()));
    assert_eq!(engine.retries(), 0);
    assert_eq!(audio.last_clip().as_deref(), Some("menu/main_menu"));
}

#[test]
fn poll_before_deadline_is_a_no_op() {
    let tree = booth();
    let t0 = Instant::now();
    let (mut engine, audio) = start(&tree, EnginePolicy::default(), t0);
    audio.clear();

    assert_eq!(engine.poll(t0 + Duration::from_secs(29)), Step::Continue);
    assert!(audio.calls().is_empty());
    assert_eq!(engine.retries(), 0);
}

#[test]
fn root_timeout_after_retries_ends_session() {
    let tree = booth();
    let t0 = Instant::now();
    let policy = EnginePolicy {
        max_timeout_retries: 1,
        ..EnginePolicy::default()
    };
    let (mut engine, audio) = start(&tree, policy, t0);

    let first = t0 + NODE_TIMEOUT;
    assert_eq!(engine.poll(first), Step::Continue);
    let step = engine.poll(first + NODE_TIMEOUT);
    assert_eq!(step, Step::Ended(EndReason::TimedOut));
    assert_eq!(audio.last_clip().as_deref(), Some("prompts/timeout"));
    assert_eq!(engine.next_deadline(), None);
}

#[test]
fn back_and_home_links_revisit_without_counting_as_invalid() {
    let tree = booth();
    let t0 = Instant::now();
    let (mut engine, audio) = start(&tree, EnginePolicy::default(), t0);

    press_all(&mut engine, "1*", t0);
    assert_eq!(engine.state(), &SessionState::AwaitingInput(tree.root()));
    assert_eq!(engine.invalid_inputs(), 0);

    press_all(&mut engine, "10", t0);
    assert_eq!(engine.state(), &SessionState::AwaitingInput(tree.root()));
    assert_eq!(audio.last_clip().as_deref(), Some("menu/main_menu"));
}

#[test]
fn fixed_length_extension_submits_on_last_digit() {
    let tree = booth();
    let t0 = Instant::now();
    let (mut engine, _audio) = start(&tree, EnginePolicy::default(), t0);
    let directory = child(&tree, tree.root(), "5");

    engine.handle_key(Key::Digit(5), t0);
    assert_eq!(
        engine.state(),
        &SessionState::CollectingExtension {
            node: directory,
            buffer: String::new()
        }
    );

    let step = press_all(&mut engine, "101", t0);
    assert_eq!(
        step,
        Step::Ended(EndReason::LeafReached(child(&tree, directory, "101")))
    );
}

#[test]
fn fixed_length_extension_rejects_unknown_number() {
    let tree = booth();
    let t0 = Instant::now();
    let (mut engine, audio) = start(&tree, EnginePolicy::default(), t0);
    engine.handle_key(Key::Digit(5), t0);
    audio.clear();

    press_all(&mut engine, "109", t0);
    assert_eq!(engine.buffer(), "");
    assert!(matches!(
        engine.state(),
        SessionState::CollectingExtension { .. }
    ));
    assert_eq!(
        audio.clips(),
        vec!["prompts/invalid_extension", "directory/enter_extension"]
    );
}

#[test]
fn partial_extension_is_submitted_on_digit_timeout() {
    let tree = booth();
    let t0 = Instant::now();
    let (mut engine, audio) = start(&tree, EnginePolicy::default(), t0);
    engine.handle_key(Key::Digit(5), t0);
    press_all(&mut engine, "10", t0);
    assert_eq!(engine.buffer(), "10");
    assert_eq!(engine.next_deadline(), Some(t0 + EXT_TIMEOUT));
    audio.clear();

    engine.poll(t0 + EXT_TIMEOUT);
    assert_eq!(engine.buffer(), "");
    assert_eq!(audio.clips()[0], "prompts/invalid_extension");
    assert_eq!(engine.retries(), 0);
    assert_eq!(engine.next_deadline(), Some(t0 + EXT_TIMEOUT + NODE_TIMEOUT));
}

#[test]
fn terminated_extension_submits_on_terminator() {
    let tree = booth();
    let t0 = Instant::now();
    let (mut engine, _audio) = start(&tree, EnginePolicy::default(), t0);
    let departments = child(&tree, tree.root(), "6");

    engine.handle_key(Key::Digit(6), t0);
    let step = press_all(&mut engine, "10#", t0);
    assert_eq!(
        step,
        Step::Ended(EndReason::LeafReached(child(&tree, departments, "10")))
    );
}

#[test]
fn terminated_extension_rejects_prefix_and_empty_buffer() {
    let tree = booth();
    let t0 = Instant::now();
    let (mut engine, audio) = start(&tree, EnginePolicy::default(), t0);
    engine.handle_key(Key::Digit(6), t0);
    audio.clear();

    press_all(&mut engine, "1#", t0);
    assert_eq!(engine.buffer(), "");
    assert_eq!(engine.invalid_inputs(), 1);
    assert_eq!(audio.clips()[0], "prompts/invalid_extension");

    engine.handle_key(Key::Pound, t0);
    assert_eq!(engine.invalid_inputs(), 2);
    assert!(!engine.is_ended());
}

#[test]
fn back_link_works_on_empty_extension_buffer() {
    let tree = booth();
    let t0 = Instant::now();
    let (mut engine, _audio) = start(&tree, EnginePolicy::default(), t0);

    press_all(&mut engine, "5*", t0);
    assert_eq!(engine.state(), &SessionState::AwaitingInput(tree.root()));
}

#[test]
fn hang_up_ends_session_from_any_state() {
    let tree = booth();
    let t0 = Instant::now();
    let hang_up = InputEvent::Hook(HookState::OnHook);

    for keys in ["", "1", "5", "51", "610"] {
        let (mut engine, audio) = start(&tree, EnginePolicy::default(), t0);
        press_all(&mut engine, keys, t0);
        audio.clear();

        assert_eq!(engine.handle(hang_up, t0), Step::Ended(EndReason::HungUp));
        assert_eq!(audio.calls(), vec![AudioCall::Stop]);
        assert_eq!(engine.next_deadline(), None);
        assert_eq!(
            engine.handle_key(Key::Digit(1), t0),
            Step::Ended(EndReason::HungUp)
        );
    }
}

#[test]
fn missing_prompt_does_not_block_navigation() {
    let tree = booth();
    let t0 = Instant::now();
    let audio = Arc::new(RecordingAudio::with_missing(&[
        "menu/main_menu",
        "menu/info_menu",
    ]));
    let port: Arc<dyn AudioPort> = audio.clone();
    let mut engine = NavigationEngine::start(Arc::clone(&tree), port, EnginePolicy::default(), t0);

    let step = press_all(&mut engine, "11", t0);
    assert!(matches!(step, Step::Ended(EndReason::LeafReached(_))));
}

#[test]
fn invalid_input_ceiling_falls_back_to_parent() {
    let tree = booth();
    let t0 = Instant::now();
    let policy = EnginePolicy {
        max_invalid_inputs: Some(2),
        ..EnginePolicy::default()
    };
    let (mut engine, _audio) = start(&tree, policy, t0);

    press_all(&mut engine, "19", t0);
    assert_eq!(engine.invalid_inputs(), 1);
    engine.handle_key(Key::Digit(9), t0);
    assert_eq!(engine.state(), &SessionState::AwaitingInput(tree.root()));
    assert_eq!(engine.invalid_inputs(), 0);
}

#[test]
fn actions_run_on_entry_only() {
    let counter = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&counter);
    let root = MenuNode::new("menu/main_menu").option(
        "1",
        MenuNode::new("menu/info_menu")
            .action(move || {
                seen.fetch_add(1, Ordering::SeqCst);
                ActionOutcome::Continue
            })
            .option("1", MenuNode::new("menu/weather_info").back(Key::Star))
            .option("2", MenuNode::new("menu/time_info"))
            .back(Key::Star),
    );
    let tree = Arc::new(MenuTree::build(root).expect("valid tree"));
    let t0 = Instant::now();
    let (mut engine, _audio) = start(&tree, EnginePolicy::default(), t0);

    press_all(&mut engine, "11*", t0);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(engine.current_node(), tree.resolve(tree.root(), "1"));
}

#[test]
fn leaf_action_can_return_to_root() {
    let root = MenuNode::new("menu/main_menu").option(
        "3",
        MenuNode::new("menu/music").action(|| ActionOutcome::ReturnToRoot),
    );
    let tree = Arc::new(MenuTree::build(root).expect("valid tree"));
    let t0 = Instant::now();
    let (mut engine, audio) = start(&tree, EnginePolicy::default(), t0);

    assert_eq!(engine.handle_key(Key::Digit(3), t0), Step::Continue);
    assert_eq!(engine.state(), &SessionState::AwaitingInput(tree.root()));
    assert_eq!(
        audio.calls(),
        vec![
            AudioCall::Play("menu/main_menu".into()),
            AudioCall::Stop,
            AudioCall::Play("menu/music".into()),
            AudioCall::Enqueue("menu/main_menu".into()),
        ]
    );
}

#[test]
fn preempt_stops_audio_and_ends() {
    let tree = booth();
    let t0 = Instant::now();
    let (mut engine, audio) = start(&tree, EnginePolicy::default(), t0);
    audio.clear();

    assert_eq!(engine.preempt(), Step::Ended(EndReason::Preempted));
    assert_eq!(audio.stop_count(), 1);
    assert_eq!(engine.end_reason(), Some(EndReason::Preempted));
}

#[test]
fn collector_prefers_terminator_over_length() {
    let tree = booth();
    let directory = child(&tree, tree.root(), "5");
    let extension = *tree.node(directory).extension().expect("extension node");
    let mut buffer = String::new();

    assert_eq!(push_key(&extension, &mut buffer, Key::Digit(1)), Collect::Pending);
    assert_eq!(push_key(&extension, &mut buffer, Key::Digit(0)), Collect::Pending);
    assert_eq!(push_key(&extension, &mut buffer, Key::Digit(2)), Collect::LengthReached);
    assert_eq!(resolve_buffer(&tree, directory, &buffer), tree.resolve(directory, "102"));
    assert_eq!(resolve_buffer(&tree, directory, ""), None);
    assert_eq!(resolve_buffer(&tree, directory, "*"), None);

    let terminated = crate::menu::Extension {
        length: Some(2),
        terminator: Some(Key::Pound),
        timeout: EXT_TIMEOUT,
    };
    let mut buffer = "1".to_string();
    assert_eq!(push_key(&terminated, &mut buffer, Key::Pound), Collect::Terminated);
    assert_eq!(buffer, "1");
}

#[test]
fn start_after_current_queues_only_the_first_prompt() {
    let tree = booth();
    let t0 = Instant::now();
    let audio = Arc::new(RecordingAudio::new());
    let port: Arc<dyn AudioPort> = audio.clone();
    let mut engine =
        NavigationEngine::start_after_current(Arc::clone(&tree), port, EnginePolicy::default(), t0);

    engine.handle_key(Key::Digit(1), t0);
    assert_eq!(
        audio.calls(),
        vec![
            AudioCall::Enqueue("menu/main_menu".into()),
            AudioCall::Stop,
            AudioCall::Play("menu/info_menu".into()),
        ]
    );
}
