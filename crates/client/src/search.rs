//! Debounced search input.
//!
//! Keystrokes go into a [`SearchInput`]; the paired [`Debouncer`] yields a
//! term only after the input has been quiet for the configured period, and
//! never yields the same term twice in a row.

use std::time::Duration;

use tokio::sync::watch;

/// Default quiet period before a term settles.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Writer half: feed raw input here.
#[derive(Debug, Clone)]
pub struct SearchInput {
    tx: watch::Sender<String>,
}

impl SearchInput {
    /// Replace the current input.
    pub fn set(&self, term: impl Into<String>) {
        self.tx.send_replace(term.into());
    }
}

/// Reader half: yields settled terms.
#[derive(Debug)]
pub struct Debouncer {
    rx: watch::Receiver<String>,
    quiet: Duration,
    last: Option<String>,
}

/// Create a linked input and debouncer.
#[must_use]
pub fn debounce(quiet: Duration) -> (SearchInput, Debouncer) {
    let (tx, rx) = watch::channel(String::new());
    (
        SearchInput { tx },
        Debouncer {
            rx,
            quiet,
            last: None,
        },
    )
}

impl Debouncer {
    /// Wait for the next settled term.
    ///
    /// Returns `None` once every [`SearchInput`] is dropped and no unsettled
    /// input remains.
    pub async fn next(&mut self) -> Option<String> {
        loop {
            self.rx.changed().await.ok()?;
            loop {
                tokio::select! {
                    changed = self.rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    () = tokio::time::sleep(self.quiet) => break,
                }
            }

            let term = self.rx.borrow_and_update().trim().to_string();
            if self.last.as_deref() != Some(term.as_str()) {
                self.last = Some(term.clone());
                return Some(term);
            }
        }
    }
}
