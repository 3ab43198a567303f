//! Transient user-facing notices with auto-dismissal.
//!
//! Dismissal happens in two steps: the notice first turns invisible, and
//! its text is dropped only after a short fade delay, so a closing
//! animation still has something to show. Showing a new notice supersedes
//! any pending dismissal of the previous one.

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    pub visible: bool,
}

#[derive(Default)]
struct NoticeState {
    notice: Option<Notice>,
    /// Bumped by every show; dismissal tasks of older notices become no-ops.
    generation: u64,
}

pub struct NoticeBoard {
    state: Arc<Mutex<NoticeState>>,
    timer: Mutex<Option<JoinHandle<()>>>,
    fade: Duration,
}

impl NoticeBoard {
    pub fn new(fade: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(NoticeState::default())),
            timer: Mutex::new(None),
            fade,
        }
    }

    /// Show `message` and schedule its dismissal after `duration`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn show(&self, message: impl Into<String>, duration: Duration) {
        let message = message.into();
        let generation = match self.state.lock() {
            Ok(mut state) => {
                state.generation += 1;
                state.notice = Some(Notice {
                    message,
                    visible: true,
                });
                state.generation
            }
            Err(_) => return,
        };

        let weak = Arc::downgrade(&self.state);
        let fade = self.fade;
        self.replace_timer(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if hide(&weak, generation) {
                tokio::time::sleep(fade).await;
                clear(&weak, generation);
            }
        }));
    }

    /// Hide the current notice now; its text goes after the fade delay.
    pub fn dismiss(&self) {
        let generation = match self.state.lock() {
            Ok(state) => state.generation,
            Err(_) => return,
        };
        let weak = Arc::downgrade(&self.state);
        if !hide(&weak, generation) {
            return;
        }
        let fade = self.fade;
        self.replace_timer(tokio::spawn(async move {
            tokio::time::sleep(fade).await;
            clear(&weak, generation);
        }));
    }

    pub fn current(&self) -> Option<Notice> {
        self.state.lock().ok()?.notice.clone()
    }

    /// Abort any pending dismissal. The notice keeps its current state.
    pub fn shutdown(&self) {
        if let Ok(mut timer) = self.timer.lock() {
            if let Some(handle) = timer.take() {
                handle.abort();
            }
        }
    }

    fn replace_timer(&self, handle: JoinHandle<()>) {
        if let Ok(mut timer) = self.timer.lock() {
            if let Some(previous) = timer.replace(handle) {
                previous.abort();
            }
        }
    }
}

impl Drop for NoticeBoard {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Flip the notice invisible if it is still the one from `generation`.
fn hide(state: &Weak<Mutex<NoticeState>>, generation: u64) -> bool {
    let Some(state) = state.upgrade() else {
        return false;
    };
    let Ok(mut state) = state.lock() else {
        return false;
    };
    if state.generation != generation {
        return false;
    }
    match state.notice.as_mut() {
        Some(notice) => {
            notice.visible = false;
            true
        }
        None => false,
    }
}

fn clear(state: &Weak<Mutex<NoticeState>>, generation: u64) {
    if let Some(state) = state.upgrade() {
        if let Ok(mut state) = state.lock() {
            if state.generation == generation {
                state.notice = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> NoticeBoard {
        NoticeBoard::new(Duration::from_millis(300))
    }

    async fn sleep_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn hides_then_clears() {
        let board = board();
        board.show("Erro", Duration::from_millis(5000));
        assert_eq!(
            board.current(),
            Some(Notice {
                message: "Erro".into(),
                visible: true
            })
        );

        sleep_ms(5010).await;
        let notice = board.current().expect("text kept during fade");
        assert!(!notice.visible);
        assert_eq!(notice.message, "Erro");

        sleep_ms(300).await;
        assert_eq!(board.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn newer_notice_supersedes_pending_dismissal() {
        let board = board();
        board.show("primeiro", Duration::from_millis(1000));
        sleep_ms(900).await;
        board.show("segundo", Duration::from_millis(5000));

        sleep_ms(1000).await;
        let notice = board.current().unwrap();
        assert_eq!(notice.message, "segundo");
        assert!(notice.visible);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_dismiss_uses_fade() {
        let board = board();
        board.show("aviso", Duration::from_millis(8000));
        board.dismiss();
        assert!(!board.current().unwrap().visible);

        sleep_ms(310).await;
        assert_eq!(board.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_freezes_notice() {
        let board = board();
        board.show("aviso", Duration::from_millis(100));
        board.shutdown();
        sleep_ms(1000).await;
        assert!(board.current().unwrap().visible);
    }

    #[tokio::test(start_paused = true)]
    async fn dismiss_without_notice_is_noop() {
        let board = board();
        board.dismiss();
        assert_eq!(board.current(), None);
    }
}
