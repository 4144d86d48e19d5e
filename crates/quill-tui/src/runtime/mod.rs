//! TUI runtime - owns terminal, runs event loop, executes effects.
//!
//! This is the "Elm runtime" boundary: all side effects happen here.
//! The reducer stays pure and produces effects; this module executes them.
//!
//! ## Inbox Pattern
//!
//! The runtime uses an "inbox" pattern for async event collection:
//! - Handlers send `UiEvent`s directly to `inbox_tx`
//! - Runtime drains `inbox_rx` each frame to collect results
//! - This eliminates per-operation receivers and simplifies event collection

mod handlers;

use std::future::Future;
use std::io::Stdout;

use anyhow::{Context, Result};
use crossterm::event;
use quill_core::SessionManager;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;

use crate::common::{TaskCompleted, TaskId, TaskKind, TaskStarted};
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::{render, terminal, update};

type UiEventSender = mpsc::UnboundedSender<UiEvent>;
type UiEventReceiver = mpsc::UnboundedReceiver<UiEvent>;

/// Target frame rate while work is in flight (60fps = ~16ms per frame).
pub const FRAME_DURATION: std::time::Duration = std::time::Duration::from_millis(16);

/// Poll duration when idle (no loads running, no recent input).
/// Longer timeout reduces CPU usage when nothing is happening.
pub const IDLE_POLL_DURATION: std::time::Duration = std::time::Duration::from_millis(100);

/// Full-screen TUI runtime.
///
/// Owns the terminal, the app state, and the session. Runs the event loop
/// and executes effects. Terminal state is restored on drop and on panic.
pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: AppState,
    /// Shared session; handlers clone it for authenticated calls.
    session: SessionManager,
    /// Inbox sender - handlers send events here.
    inbox_tx: UiEventSender,
    /// Inbox receiver - runtime drains this each frame.
    inbox_rx: UiEventReceiver,
    /// Last time a Tick event was emitted.
    last_tick: std::time::Instant,
    /// Last time a terminal event was received (for fast tick during interaction).
    last_terminal_event: std::time::Instant,
}

impl TuiRuntime {
    /// Creates a new TUI runtime over an already-built session.
    pub fn new(session: SessionManager) -> Result<Self> {
        // Set up panic hook BEFORE entering alternate screen
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let now = std::time::Instant::now();
        Ok(Self {
            terminal,
            state: AppState::new(),
            session,
            inbox_tx,
            inbox_rx,
            last_tick: now,
            last_terminal_event: now,
        })
    }

    /// Runs the main event loop.
    ///
    /// Must be called inside a tokio runtime: effect handlers are spawned
    /// onto it while this loop blocks on terminal polling.
    pub fn run(&mut self) -> Result<()> {
        // Adopt a persisted credential on startup by resolving its identity.
        self.execute_effect(UiEffect::RefreshIdentity);

        self.event_loop()
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true; // Start dirty to ensure initial render

        while !self.state.tui.should_quit {
            let events = self.collect_events()?;

            // Process each event through the reducer
            for event in events {
                if matches!(&event, UiEvent::Terminal(_)) {
                    self.last_terminal_event = std::time::Instant::now();
                }

                // Only Tick triggers render - this caps frame rate at tick
                // cadence. Other events update state but batch renders.
                let marks_dirty = matches!(&event, UiEvent::Tick);

                let effects = update::update(&mut self.state, event);
                if marks_dirty {
                    dirty = true;
                }
                self.execute_effects(effects);
            }

            if dirty {
                self.terminal.draw(|frame| {
                    render::render(&self.state, frame);
                })?;
                dirty = false;
            }
        }

        Ok(())
    }

    // ========================================================================
    // Event Collection
    // ========================================================================

    /// Collects events from the inbox and the terminal, and emits Tick at
    /// the current cadence.
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        // Fast polling while loads are running (spinner) or the user is
        // actively typing; slow polling otherwise to save CPU.
        let recent_terminal_activity = self.last_terminal_event.elapsed() < IDLE_POLL_DURATION;
        let needs_fast_poll = self.state.tui.tasks.is_any_running() || recent_terminal_activity;

        let tick_interval = if needs_fast_poll {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        // Drain inbox - all async results arrive here
        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        // Poll terminal events:
        // - If we already have events to process, do non-blocking poll
        // - Otherwise, block until the next tick is due
        let time_until_tick = tick_interval.saturating_sub(self.last_tick.elapsed());
        let poll_duration = if events.is_empty() {
            time_until_tick
        } else {
            std::time::Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            // Drain any remaining buffered events (non-blocking)
            while event::poll(std::time::Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = std::time::Instant::now();
        }

        Ok(events)
    }

    // ========================================================================
    // Effect Dispatch
    // ========================================================================

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns an async effect, sending the result event to the inbox.
    ///
    /// This centralizes the spawn-and-send pattern: handlers become pure
    /// async functions that return `UiEvent`, while the runtime handles
    /// spawning.
    fn spawn_effect<F, Fut>(&self, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(f().await);
        });
    }

    /// Spawns an async task with a uniform TaskStarted/TaskCompleted lifecycle.
    fn spawn_task<F, Fut>(&self, kind: TaskKind, id: TaskId, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        let started = TaskStarted { id };
        let _ = tx.send(UiEvent::TaskStarted { kind, started });
        tokio::spawn(async move {
            let inner = f().await;
            let completed = TaskCompleted {
                id,
                result: Box::new(inner),
            };
            let _ = tx.send(UiEvent::TaskCompleted { kind, completed });
        });
    }

    /// Executes a single effect by dispatching to the appropriate handler.
    fn execute_effect(&mut self, effect: UiEffect) {
        let session = self.session.clone();
        match effect {
            UiEffect::Quit => {
                self.state.tui.should_quit = true;
            }

            // Session effects
            UiEffect::Login { username, password } => {
                self.spawn_effect(move || handlers::login(session, username, password));
            }
            UiEffect::Register { request } => {
                self.spawn_effect(move || handlers::register(session, request));
            }
            UiEffect::Logout => {
                self.spawn_effect(move || handlers::logout(session));
            }
            UiEffect::InvalidateSession => {
                self.spawn_effect(move || handlers::invalidate_session(session));
            }
            UiEffect::RefreshIdentity => {
                self.spawn_effect(move || handlers::refresh_identity(session));
            }
            UiEffect::SaveProfile { update } => {
                self.spawn_effect(move || handlers::save_profile(session, update));
            }

            // View data loads (task lifecycle for stale-result dropping)
            UiEffect::LoadFeed { task, epoch } => {
                let Some(task) = task else {
                    return;
                };
                self.spawn_task(TaskKind::FeedLoad, task, move || {
                    handlers::load_feed(session, epoch)
                });
            }
            UiEffect::LoadMyPosts { task } => {
                let Some(task) = task else {
                    return;
                };
                self.spawn_task(TaskKind::MyPostsLoad, task, move || {
                    handlers::load_my_posts(session)
                });
            }
            UiEffect::LoadProfile { task, username } => {
                let Some(task) = task else {
                    return;
                };
                self.spawn_task(TaskKind::ProfileLoad, task, move || {
                    handlers::load_profile(session, username)
                });
            }
            UiEffect::LoadCategories { task } => {
                let Some(task) = task else {
                    return;
                };
                self.spawn_task(TaskKind::CategoriesLoad, task, move || {
                    handlers::load_categories(session)
                });
            }

            // Authoring
            UiEffect::SavePost { editing, draft } => {
                self.spawn_effect(move || handlers::save_post(session, editing, draft));
            }
            UiEffect::DeletePost { post_id } => {
                self.spawn_effect(move || handlers::delete_post(session, post_id));
            }

            // Interactions (generation-tagged, settled by the reducer)
            UiEffect::ToggleLike {
                post_id,
                generation,
            } => {
                self.spawn_effect(move || handlers::toggle_like(session, post_id, generation));
            }
            UiEffect::AddComment { post_id, content } => {
                self.spawn_effect(move || handlers::add_comment(session, post_id, content));
            }
            UiEffect::ToggleFollow {
                username,
                generation,
            } => {
                self.spawn_effect(move || handlers::toggle_follow(session, username, generation));
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}
