//! Main Application
//!
//! The App is a thin host for a pet session:
//! 1. Converts terminal mouse events over the sprite into pointer events
//! 2. Reports tap / long-press signals in the status bar
//! 3. Draws the sprite wherever the session last moved the window

use std::io;
use std::time::Duration;

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal};
use tokio::time::{Instant, MissedTickBehavior};

use pet_core::config::DEFAULT_SPRITE_SIZE_DP;
use pet_core::{ConfigOverrides, PetConfig, PetSession, PetSignal, PointerEvent, SessionHandle};

use crate::sprites::{SpriteSheet, SPRITE_COLS, SPRITE_ROWS};
use crate::surface::{Scene, SharedScene, TerminalGeometry, TerminalHost, TerminalRenderer};
use crate::theme::{GROUND, SIGNAL_FLASH, STATUS_TEXT};

/// Redraw rate (~30 FPS)
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Walk-cycle frame advance, in redraws
const STRIDE_EVERY: u64 = 6;

/// How long a tap / long-press message stays in the status bar
const FLASH_DURATION: Duration = Duration::from_millis(1_500);

/// Main application state
pub struct App {
    /// Is the app still running?
    running: bool,
    /// Configuration the session is (re)started with
    config: PetConfig,
    /// The running pet session
    session: SessionHandle,
    /// What the overlay window shows
    scene: SharedScene,
    /// Cell/pixel mapping for the current terminal size
    geometry: TerminalGeometry,
    /// Pet artwork
    sprites: SpriteSheet,
    /// A press started on the sprite and has not been released
    pressing: bool,
    /// Latest tap / long press, for the status bar
    flash: Option<(PetSignal, Instant)>,
    /// Redraw counter
    frame: u64,
}

impl App {
    /// Start a session sized to the current terminal
    pub fn new(config: PetConfig) -> anyhow::Result<Self> {
        let (cols, rows) = crossterm::terminal::size()?;
        let geometry = TerminalGeometry::new(cols, rows, SPRITE_COLS, SPRITE_ROWS);
        let config = fit_sprite(config, &geometry);
        let scene = SharedScene::default();
        let session = spawn_session(&config, &scene, &geometry);

        Ok(Self {
            running: true,
            config,
            session,
            scene,
            geometry,
            sprites: SpriteSheet::new(),
            pressing: false,
            flash: None,
            frame: 0,
        })
    }

    /// Main event loop
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();
        let mut frames = tokio::time::interval(FRAME_INTERVAL);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while self.running {
            tokio::select! {
                biased;

                maybe_event = event_stream.next() => match maybe_event {
                    Some(Ok(event)) => self.handle_event(event).await?,
                    Some(Err(e)) => return Err(e.into()),
                    None => self.running = false,
                },

                signal = self.session.next_signal() => match signal {
                    Some(signal) => self.on_signal(signal),
                    None => {
                        tracing::warn!("pet session ended unexpectedly");
                        self.running = false;
                    }
                },

                _ = frames.tick() => {
                    self.frame = self.frame.wrapping_add(1);
                    terminal.draw(|frame| self.render(frame))?;
                }
            }
        }

        Ok(())
    }

    /// Stop the session and detach the pet
    pub async fn shutdown(self) -> anyhow::Result<()> {
        self.session.shutdown().await?;
        Ok(())
    }

    async fn handle_event(&mut self, event: Event) -> anyhow::Result<()> {
        match event {
            // Only handle Press events (not Release or Repeat)
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse).await?,
            Event::Resize(cols, rows) => self.handle_resize(cols, rows).await?,
            _ => {}
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false;
            }
            _ => {}
        }
    }

    async fn handle_mouse(&mut self, mouse: MouseEvent) -> anyhow::Result<()> {
        let (raw_x, raw_y) = self.geometry.cell_to_raw(mouse.column, mouse.row);
        let at = Instant::now();

        let event = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if self.hits_pet(mouse.column, mouse.row) => {
                self.pressing = true;
                PointerEvent::Down { raw_x, raw_y, at }
            }
            MouseEventKind::Drag(MouseButton::Left) if self.pressing => {
                PointerEvent::Move { raw_x, raw_y, at }
            }
            MouseEventKind::Up(MouseButton::Left) if self.pressing => {
                self.pressing = false;
                PointerEvent::Up { raw_x, raw_y, at }
            }
            _ => return Ok(()),
        };

        self.session.send(event).await?;
        Ok(())
    }

    /// Bounds are fixed per session, so a resize starts a fresh one.
    async fn handle_resize(&mut self, cols: u16, rows: u16) -> anyhow::Result<()> {
        tracing::info!(cols, rows, "terminal resized; restarting pet");
        if self.pressing {
            self.pressing = false;
            self.session
                .send(PointerEvent::Cancel { at: Instant::now() })
                .await?;
        }

        self.geometry = TerminalGeometry::new(cols, rows, SPRITE_COLS, SPRITE_ROWS);
        self.config = fit_sprite(self.config.clone(), &self.geometry);
        self.scene = SharedScene::default();
        let fresh = spawn_session(&self.config, &self.scene, &self.geometry);
        let stale = std::mem::replace(&mut self.session, fresh);
        stale.shutdown().await?;
        Ok(())
    }

    fn hits_pet(&self, col: u16, row: u16) -> bool {
        let scene = *self.scene.lock();
        if !scene.attached {
            return false;
        }
        let rect = self.geometry.sprite_rect(scene.position);
        col >= rect.x && col < rect.right() && row >= rect.y && row < rect.bottom()
    }

    fn on_signal(&mut self, signal: PetSignal) {
        tracing::debug!(?signal, "pet signal");
        if matches!(signal, PetSignal::Tap | PetSignal::LongPress) {
            self.flash = Some((signal, Instant::now()));
        }
    }

    fn render(&self, frame: &mut Frame<'_>) {
        let area = frame.area();
        let scene: Scene = *self.scene.lock();

        // Ground line on the last row
        if area.height > 0 {
            let ground = Rect::new(0, area.height - 1, area.width, 1);
            let line = "▁".repeat(area.width as usize);
            frame.render_widget(
                Paragraph::new(line).style(Style::default().fg(GROUND)),
                ground,
            );
        }

        if scene.attached {
            let rect = self.geometry.sprite_rect(scene.position);
            let sideways = self.session.snapshot().activity.direction().is_some();
            let step = if sideways { self.frame / STRIDE_EVERY } else { 0 };
            let sprite = self.sprites.frame(scene.facing, step);
            let buf = frame.buffer_mut();

            for dy in 0..rect.height {
                for dx in 0..rect.width {
                    let (x, y) = (rect.x + dx, rect.y + dy);
                    let cell = sprite.get(dx, dy);
                    if cell.is_empty() || x >= area.width || y >= area.height {
                        continue;
                    }
                    buf[(x, y)].set_char(cell.ch).set_fg(cell.fg);
                }
            }
        }

        if area.height > 1 {
            let status = Rect::new(0, 0, area.width, 1);
            frame.render_widget(Paragraph::new(self.status_line(scene)), status);
        }
    }

    fn status_line(&self, scene: Scene) -> Line<'static> {
        let snapshot = self.session.snapshot();
        let mut spans = vec![Span::styled(
            format!(
                " {:?} {:?} at {}  |  drag the pet with the mouse, q to quit",
                snapshot.activity, snapshot.mode, scene.position
            ),
            Style::default().fg(STATUS_TEXT),
        )];

        if let Some((signal, at)) = self.flash {
            if at.elapsed() < FLASH_DURATION {
                let text = match signal {
                    PetSignal::LongPress => "  purr~",
                    _ => "  meow!",
                };
                spans.push(Span::styled(
                    text,
                    Style::default()
                        .fg(SIGNAL_FLASH)
                        .add_modifier(Modifier::BOLD),
                ));
            }
        }

        Line::from(spans)
    }
}

/// Pin the sprite size to the terminal sprite box
fn fit_sprite(config: PetConfig, geometry: &TerminalGeometry) -> PetConfig {
    let mut config = config;
    let sprite_dp = u32::try_from(geometry.sprite_px()).unwrap_or(DEFAULT_SPRITE_SIZE_DP);
    ConfigOverrides::new()
        .with_sprite_size_dp(sprite_dp)
        .with_density(1.0)
        .apply(&mut config);
    config
}

fn spawn_session(
    config: &PetConfig,
    scene: &SharedScene,
    geometry: &TerminalGeometry,
) -> SessionHandle {
    let host = TerminalHost::new(SharedScene::clone(scene), geometry.display_metrics());
    let renderer = TerminalRenderer::new(SharedScene::clone(scene));
    PetSession::spawn(config.clone(), host, renderer)
}
