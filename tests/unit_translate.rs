use dualtrans::{
    backend::UnitBackend,
    error::BackendError,
    retry::RetryPolicy,
    unit::{UNIT_FAILURE_SENTINEL, UnitTranslator},
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Prefixes the input; fails every time for texts in `broken`.
struct FakeGoogle {
    broken: Vec<&'static str>,
    calls: AtomicUsize,
}

impl FakeGoogle {
    fn failing_on(broken: Vec<&'static str>) -> Self {
        Self {
            broken,
            calls: AtomicUsize::new(0),
        }
    }
}

impl UnitBackend for FakeGoogle {
    fn name(&self) -> &str {
        "google"
    }

    fn translate(&self, text: &str) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.broken.contains(&text) {
            return Err(BackendError::Transport {
                backend: "google".into(),
                reason: "connection reset".into(),
            });
        }
        Ok(format!("uk:{text}"))
    }
}

/// Fails the first `fail_first` calls, then succeeds.
struct Flaky {
    fail_first: usize,
    calls: AtomicUsize,
}

impl UnitBackend for Flaky {
    fn name(&self) -> &str {
        "flaky"
    }

    fn translate(&self, text: &str) -> Result<String, BackendError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.fail_first {
            return Err(BackendError::Status {
                backend: "flaky".into(),
                status: 503,
                body: String::new(),
            });
        }
        Ok(text.to_uppercase())
    }
}

fn no_wait(attempts: u32) -> RetryPolicy {
    RetryPolicy::new(attempts, Duration::ZERO)
}

#[test]
fn failing_paragraph_gets_sentinel_and_neighbours_survive() {
    let backend = FakeGoogle::failing_on(vec!["two"]);
    let translator = UnitTranslator::new(&backend, no_wait(3), 5);
    let paragraphs = vec!["one".to_string(), "two".to_string(), "three".to_string()];

    let out = translator.translate_all(&paragraphs, |_, _| {});

    assert_eq!(
        out,
        vec![
            "uk:one".to_string(),
            UNIT_FAILURE_SENTINEL.to_string(),
            "uk:three".to_string()
        ]
    );
    // 1 + 3 attempts + 1
    assert_eq!(backend.calls.load(Ordering::SeqCst), 5);
}

#[test]
fn transient_failure_is_retried() {
    let backend = Flaky {
        fail_first: 2,
        calls: AtomicUsize::new(0),
    };
    let translator = UnitTranslator::new(&backend, no_wait(3), 1);
    assert_eq!(translator.translate_one("hi"), "HI");
    assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
}

#[test]
fn results_follow_input_order_with_many_workers() {
    let backend = FakeGoogle::failing_on(vec![]);
    let translator = UnitTranslator::new(&backend, no_wait(1), 8);
    let paragraphs: Vec<String> = (0..50).map(|i| format!("p{i}")).collect();

    let mut last = (0, 0);
    let out = translator.translate_all(&paragraphs, |done, total| last = (done, total));

    assert_eq!(last, (50, 50));
    for (i, t) in out.iter().enumerate() {
        assert_eq!(t, &format!("uk:p{i}"));
    }
}
