use async_trait::async_trait;
use effseq_chain::AsyncEffectSequencer;
use effseq_core::test_utils::RecordingSink;
use effseq_core::{
    ChainState, Cleanup, EffectError, EffectFn, EffectScheduler, FailureKind, FailureReport,
    FailureSink, SequencerConfig,
};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Journal — records step bodies and how many overlap
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Clone, Default)]
struct Journal {
    events: Arc<Mutex<Vec<String>>>,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
}

impl Journal {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    async fn work(&self, name: String, ms: u64) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        self.events.lock().unwrap().push(format!("{name} start"));
        tokio::time::sleep(Duration::from_millis(ms)).await;
        self.events.lock().unwrap().push(format!("{name} done"));
        self.active.fetch_sub(1, Ordering::SeqCst);
    }

    fn cleanup(&self, n: u32, ms: u64) -> Cleanup {
        let j = self.clone();
        Cleanup::new(move || async move {
            j.work(format!("c{n}"), ms).await;
            Ok(())
        })
    }

    fn effect(&self, n: u32, ms: u64) -> EffectFn {
        let j = self.clone();
        EffectFn::new(move || async move {
            j.work(format!("e{n}"), ms).await;
            Ok(j.cleanup(n, ms))
        })
    }

    fn failing_effect(&self, n: u32, ms: u64) -> EffectFn {
        let j = self.clone();
        EffectFn::new(move || async move {
            j.work(format!("e{n}"), ms).await;
            Err(EffectError::failed(format!("Failing on render {n} on purpose")))
        })
    }

    fn effect_with_failing_cleanup(&self, n: u32, ms: u64) -> EffectFn {
        let j = self.clone();
        EffectFn::new(move || async move {
            j.work(format!("e{n}"), ms).await;
            let j = j.clone();
            Ok(Cleanup::new(move || async move {
                j.work(format!("c{n}"), ms).await;
                Err(EffectError::failed(format!("c{n} broke")))
            }))
        })
    }
}

fn cycle(n: u32, with_cleanup: bool) -> Vec<String> {
    let mut v = vec![format!("e{n} start"), format!("e{n} done")];
    if with_cleanup {
        v.push(format!("c{n} start"));
        v.push(format!("c{n} done"));
    }
    v
}

fn recording_sequencer() -> (AsyncEffectSequencer, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let seq = AsyncEffectSequencer::new().with_sink(sink.clone());
    (seq, sink)
}

// --- Scenarios ---

#[tokio::test(start_paused = true)]
async fn effect_then_cleanup_run_in_order() {
    let journal = Journal::default();
    let (mut seq, sink) = recording_sequencer();

    seq.register_effect(journal.effect(1, 100));
    seq.cleanup();
    seq.settle().await;

    assert_eq!(journal.events(), cycle(1, true));
    assert!(sink.failures().is_empty());
}

#[tokio::test(start_paused = true)]
async fn next_effect_waits_for_previous_cleanup() {
    let journal = Journal::default();
    let (mut seq, sink) = recording_sequencer();

    seq.register_effect(journal.effect(1, 200));
    seq.cleanup();
    seq.register_effect(journal.effect(2, 10));
    seq.settle().await;

    let mut expected = cycle(1, true);
    expected.extend(cycle(2, false));
    assert_eq!(journal.events(), expected);
    assert_eq!(journal.max_active(), 1);
    assert!(sink.failures().is_empty());
}

#[tokio::test(start_paused = true)]
async fn failed_effect_gets_noop_cleanup() {
    let journal = Journal::default();
    let (mut seq, sink) = recording_sequencer();

    seq.register_effect(journal.failing_effect(1, 50));
    seq.cleanup();
    seq.settle().await;

    assert_eq!(journal.events(), cycle(1, false));
    let failures = sink.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].kind, FailureKind::EffectFailed);
    assert_eq!(failures[0].cycle, 1);
    assert!(failures[0].message.contains("Failing on render 1 on purpose"));
}

#[tokio::test(start_paused = true)]
async fn failed_cleanup_does_not_block_next_effect() {
    let journal = Journal::default();
    let (mut seq, sink) = recording_sequencer();

    seq.register_effect(journal.effect_with_failing_cleanup(1, 50));
    seq.cleanup();
    seq.register_effect(journal.effect(2, 50));
    seq.settle().await;

    let mut expected = cycle(1, true);
    expected.extend(cycle(2, false));
    assert_eq!(journal.events(), expected);
    assert_eq!(sink.kinds(), vec![FailureKind::CleanupFailed]);
    assert_eq!(sink.failures()[0].cycle, 1);
}

// --- Properties ---

#[tokio::test(start_paused = true)]
async fn burst_of_cycles_completes_in_call_order() {
    let journal = Journal::default();
    let (mut seq, sink) = recording_sequencer();

    for n in 1..=4 {
        seq.register_effect(journal.effect(n, 100 * u64::from(5 - n)));
        seq.cleanup();
    }
    seq.settle().await;

    let expected: Vec<String> = (1..=4).flat_map(|n| cycle(n, true)).collect();
    assert_eq!(journal.events(), expected);
    assert_eq!(journal.max_active(), 1);
    assert!(sink.failures().is_empty());
}

#[tokio::test(start_paused = true)]
async fn register_and_cleanup_return_without_running_anything() {
    let journal = Journal::default();
    let (mut seq, _sink) = recording_sequencer();

    seq.register_effect(journal.effect(1, 10));
    seq.cleanup();
    seq.register_effect(journal.effect(2, 10));
    assert!(journal.events().is_empty());

    seq.settle().await;
    assert_eq!(journal.events().len(), 6);
}

#[tokio::test(start_paused = true)]
async fn sequencer_survives_repeated_failures() {
    let journal = Journal::default();
    let (mut seq, sink) = recording_sequencer();

    for n in 1..=6 {
        let effect = match n % 3 {
            0 => journal.failing_effect(n, 10),
            1 => journal.effect_with_failing_cleanup(n, 10),
            _ => journal.effect(n, 10),
        };
        seq.register_effect(effect);
        seq.cleanup();
    }
    seq.register_effect(journal.effect(7, 10));
    seq.settle().await;

    let events = journal.events();
    assert_eq!(events.last().map(String::as_str), Some("e7 done"));
    assert_eq!(journal.max_active(), 1);
    assert_eq!(
        sink.kinds(),
        vec![
            FailureKind::CleanupFailed,
            FailureKind::EffectFailed,
            FailureKind::CleanupFailed,
            FailureKind::EffectFailed,
        ]
    );
    let cycles: Vec<u64> = sink.failures().iter().map(|f| f.cycle).collect();
    assert_eq!(cycles, vec![1, 3, 4, 6]);
}

#[tokio::test(start_paused = true)]
async fn panicking_effect_is_treated_as_failure() {
    let journal = Journal::default();
    let (mut seq, sink) = recording_sequencer();

    seq.register(|| -> std::future::Ready<Result<Cleanup, EffectError>> {
        panic!("effect blew up before starting")
    });
    seq.cleanup();
    seq.register_effect(journal.effect(2, 10));
    seq.settle().await;

    assert_eq!(journal.events(), cycle(2, false));
    let failures = sink.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].kind, FailureKind::EffectFailed);
    assert!(failures[0].message.contains("effect blew up before starting"));
}

// --- Edge cases ---

#[tokio::test(start_paused = true)]
async fn orphaned_cleanup_runs_before_next_effect() {
    let journal = Journal::default();
    let (mut seq, sink) = recording_sequencer();

    seq.register_effect(journal.effect(1, 100));
    seq.register_effect(journal.effect(2, 10));
    seq.settle().await;

    let mut expected = cycle(1, true);
    expected.extend(cycle(2, false));
    assert_eq!(journal.events(), expected);
    assert!(sink.failures().is_empty());
}

#[tokio::test(start_paused = true)]
async fn cleanup_on_idle_chain_does_nothing() {
    let (mut seq, sink) = recording_sequencer();

    seq.cleanup();
    assert!(seq.is_idle());
    assert_eq!(seq.state(), ChainState::Idle);
    seq.settle().await;
    assert!(sink.failures().is_empty());
}

#[tokio::test(start_paused = true)]
async fn second_cleanup_runs_nothing() {
    let journal = Journal::default();
    let (mut seq, _sink) = recording_sequencer();

    seq.register_effect(journal.effect(1, 10));
    seq.cleanup();
    seq.cleanup();
    seq.settle().await;

    assert_eq!(journal.events(), cycle(1, true));
}

#[tokio::test(start_paused = true)]
async fn settled_tail_still_owes_its_cleanup() {
    let journal = Journal::default();
    let (mut seq, _sink) = recording_sequencer();

    seq.register_effect(journal.effect(1, 10));
    seq.settle().await;
    assert_eq!(journal.events(), cycle(1, false));

    seq.cleanup();
    seq.settle().await;
    assert_eq!(journal.events(), cycle(1, true));
}

#[tokio::test(start_paused = true)]
async fn state_follows_register_cleanup_alternation() {
    let journal = Journal::default();
    let (mut seq, _sink) = recording_sequencer();
    assert_eq!(seq.state(), ChainState::Idle);

    seq.register_effect(journal.effect(1, 10));
    assert_eq!(seq.state(), ChainState::EffectPending);

    seq.cleanup();
    assert_eq!(seq.state(), ChainState::CleanupPending);

    seq.register_effect(journal.effect(2, 10));
    assert_eq!(seq.state(), ChainState::EffectPending);
    assert_eq!(seq.cycles(), 2);

    seq.settle().await;
    assert_eq!(seq.state(), ChainState::EffectPending);
}

#[tokio::test(start_paused = true)]
async fn dropping_sequencer_keeps_scheduled_steps() {
    let journal = Journal::default();
    let (mut seq, _sink) = recording_sequencer();

    seq.register_effect(journal.effect(1, 100));
    seq.cleanup();
    drop(seq);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(journal.events(), cycle(1, true));
}

#[tokio::test(start_paused = true)]
async fn independent_sequencers_keep_their_own_order() {
    let left = Journal::default();
    let right = Journal::default();
    let (mut a, _) = recording_sequencer();
    let (mut b, _) = recording_sequencer();

    for n in 1..=3 {
        a.register_effect(left.effect(n, 30));
        a.cleanup();
        b.register_effect(right.effect(n, 70));
        b.cleanup();
    }
    a.settle().await;
    b.settle().await;

    let expected: Vec<String> = (1..=3).flat_map(|n| cycle(n, true)).collect();
    assert_eq!(left.events(), expected);
    assert_eq!(right.events(), expected);
    assert_eq!(left.max_active(), 1);
    assert_eq!(right.max_active(), 1);
}

#[tokio::test(start_paused = true)]
async fn reports_carry_configured_label() {
    let journal = Journal::default();
    let sink = Arc::new(RecordingSink::new());
    let mut seq = AsyncEffectSequencer::new()
        .with_config(SequencerConfig::labeled("home"))
        .with_sink(sink.clone());
    assert_eq!(seq.label(), "home");

    seq.register_effect(journal.failing_effect(1, 10));
    seq.cleanup();
    seq.settle().await;

    assert_eq!(sink.failures()[0].sequencer, "home");
}

#[tokio::test(start_paused = true)]
async fn drives_through_scheduler_trait() {
    fn drive(scheduler: &mut dyn EffectScheduler, journal: &Journal) {
        for n in 1..=2 {
            scheduler.register(journal.effect(n, 20));
            scheduler.cleanup();
        }
    }

    let journal = Journal::default();
    let (mut seq, _sink) = recording_sequencer();
    drive(&mut seq, &journal);
    assert_eq!(EffectScheduler::state(&seq), ChainState::CleanupPending);
    seq.settle().await;

    let expected: Vec<String> = (1..=2).flat_map(|n| cycle(n, true)).collect();
    assert_eq!(journal.events(), expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn no_overlap_on_multi_thread_runtime() {
    let journal = Journal::default();
    let (mut seq, sink) = recording_sequencer();

    for n in 1..=8 {
        seq.register_effect(journal.effect(n, 2));
        seq.cleanup();
    }
    seq.settle().await;

    let expected: Vec<String> = (1..=8).flat_map(|n| cycle(n, true)).collect();
    assert_eq!(journal.events(), expected);
    assert_eq!(journal.max_active(), 1);
    assert!(sink.failures().is_empty());
}

#[test]
fn steps_run_on_attached_handle() {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_time()
        .build()
        .unwrap();
    let journal = Journal::default();
    let mut seq = AsyncEffectSequencer::new().with_handle(rt.handle().clone());

    seq.register_effect(journal.effect(1, 5));
    seq.cleanup();
    rt.block_on(seq.settle());

    assert_eq!(journal.events(), cycle(1, true));
}

// --- Broken sinks ---

/// Records reports, but panics on the kinds it was told to.
struct PanickingSink {
    panics_on: Vec<FailureKind>,
    inner: Arc<RecordingSink>,
}

#[async_trait]
impl FailureSink for PanickingSink {
    async fn report(&self, report: &FailureReport) {
        if self.panics_on.contains(&report.kind()) {
            panic!("sink refused {}", report.kind());
        }
        self.inner.report(report).await;
    }
}

fn sequencer_with_panicking_sink(
    panics_on: Vec<FailureKind>,
) -> (AsyncEffectSequencer, Arc<RecordingSink>) {
    let inner = Arc::new(RecordingSink::new());
    let sink = Arc::new(PanickingSink {
        panics_on,
        inner: Arc::clone(&inner),
    });
    (AsyncEffectSequencer::new().with_sink(sink), inner)
}

#[tokio::test(start_paused = true)]
async fn dead_predecessor_is_reported_and_next_effect_runs() {
    let journal = Journal::default();
    let (mut seq, sink) = sequencer_with_panicking_sink(vec![FailureKind::EffectFailed]);

    seq.register_effect(journal.failing_effect(1, 10));
    seq.cleanup();
    seq.register_effect(journal.effect(2, 10));
    seq.cleanup();
    seq.settle().await;

    let mut expected = cycle(1, false);
    expected.extend(cycle(2, true));
    assert_eq!(journal.events(), expected);
    assert_eq!(journal.max_active(), 1);
    assert_eq!(sink.kinds(), vec![FailureKind::ChainFailed]);
    let failures = sink.failures();
    assert_eq!(failures[0].cycle, 1);
    assert!(failures[0].message.starts_with("effect chain failed"));
}

#[tokio::test(start_paused = true)]
async fn settle_reports_a_dead_tail() {
    let journal = Journal::default();
    let (mut seq, sink) = sequencer_with_panicking_sink(vec![FailureKind::EffectFailed]);

    seq.register_effect(journal.failing_effect(1, 10));
    seq.settle().await;
    assert_eq!(sink.kinds(), vec![FailureKind::ChainFailed]);
    assert_eq!(sink.failures()[0].cycle, 1);
    assert_eq!(seq.state(), ChainState::EffectPending);

    seq.register_effect(journal.effect(2, 10));
    seq.cleanup();
    seq.settle().await;

    let mut expected = cycle(1, false);
    expected.extend(cycle(2, true));
    assert_eq!(journal.events(), expected);
    assert_eq!(sink.kinds(), vec![FailureKind::ChainFailed]);
}

#[tokio::test(start_paused = true)]
async fn settle_survives_a_sink_that_panics() {
    let journal = Journal::default();
    let (mut seq, sink) = sequencer_with_panicking_sink(vec![
        FailureKind::EffectFailed,
        FailureKind::ChainFailed,
    ]);

    seq.register_effect(journal.failing_effect(1, 10));
    seq.settle().await;
    assert!(sink.failures().is_empty());

    seq.register_effect(journal.effect(2, 10));
    seq.cleanup();
    seq.settle().await;

    let mut expected = cycle(1, false);
    expected.extend(cycle(2, true));
    assert_eq!(journal.events(), expected);
}

// --- No runtime ---

#[test]
fn calls_without_a_runtime_are_dropped() {
    let journal = Journal::default();
    let mut seq = AsyncEffectSequencer::new();

    seq.register_effect(journal.effect(1, 10));
    seq.cleanup();

    assert!(seq.is_idle());
    assert_eq!(seq.cycles(), 0);
    assert!(journal.events().is_empty());
}

#[test]
fn cleanup_after_runtime_is_gone_keeps_the_chain() {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    let journal = Journal::default();
    let mut seq = AsyncEffectSequencer::new();

    rt.block_on(async {
        seq.register_effect(journal.effect(1, 5));
        seq.settle().await;
    });
    drop(rt);

    seq.cleanup();
    assert_eq!(seq.state(), ChainState::EffectPending);
    assert_eq!(journal.events(), cycle(1, false));
}

// --- Orphan warning ---

#[derive(Clone)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

async fn orphaned_run(config: SequencerConfig) -> (Vec<String>, String) {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let writer = Captured(Arc::clone(&buf));
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let journal = Journal::default();
    let mut seq = AsyncEffectSequencer::new()
        .with_config(config)
        .with_sink(Arc::new(RecordingSink::new()));
    seq.register_effect(journal.effect(1, 10));
    seq.register_effect(journal.effect(2, 10));
    seq.settle().await;

    let out = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
    (journal.events(), out)
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn orphaned_cleanup_warns_by_default() {
    let (events, out) = orphaned_run(SequencerConfig::default()).await;

    let mut expected = cycle(1, true);
    expected.extend(cycle(2, false));
    assert_eq!(events, expected);
    assert!(out.contains("WARN"));
    assert!(out.contains("effseq.cleanup.orphaned"));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn orphan_warning_can_be_turned_off() {
    let mut config = SequencerConfig::default();
    config.warn_on_orphaned_cleanup = false;
    let (events, out) = orphaned_run(config).await;

    let mut expected = cycle(1, true);
    expected.extend(cycle(2, false));
    assert_eq!(events, expected);
    assert!(!out.contains("effseq.cleanup.orphaned"));
}
