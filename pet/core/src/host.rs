//! Platform Collaborators
//!
//! The core never talks to a window manager or a renderer directly. Hosts
//! implement [`OverlayHost`] (where the sprite window lives) and
//! [`Renderer`] (which artwork to show), and the session drives them.
//!
//! Surface calls can fail at any time (permission revoked, window torn
//! down). [`OverlayWindow`] catches those failures, logs them and carries
//! on; the pet is decoration and must never take the host down.

use thiserror::Error;

use crate::geometry::{DisplayMetrics, Position};
use crate::motion::Facing;

/// Failure reported by an overlay surface
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The overlay permission was revoked or never granted
    #[error("overlay permission denied")]
    PermissionDenied,

    /// The window is not (or no longer) attached
    #[error("overlay window is not attached")]
    NotAttached,

    /// Any other platform failure
    #[error("overlay surface error: {0}")]
    Platform(String),
}

/// The system-wide overlay window hosting the sprite
pub trait OverlayHost: Send {
    /// Display size at session start
    fn display_metrics(&self) -> DisplayMetrics;

    /// Add the sprite window to the screen
    fn attach(&mut self) -> Result<(), SurfaceError>;

    /// Move the sprite window to a logical position
    fn move_to(&mut self, position: Position) -> Result<(), SurfaceError>;

    /// Remove the sprite window from the screen
    fn detach(&mut self) -> Result<(), SurfaceError>;
}

/// Picks sprite artwork for the pet's facing
pub trait Renderer: Send {
    /// Show the artwork for `facing`
    fn show_facing(&mut self, facing: Facing);
}

/// Lifecycle of an [`OverlayWindow`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowState {
    /// Not attached yet
    Pending,
    /// `attach` has been called
    Attached,
    /// `detach` has been called; the window is gone for good
    Closed,
}

/// Fault-tolerant, lifecycle-checked wrapper around an [`OverlayHost`].
///
/// `attach` and `detach` reach the host at most once each, in that order.
/// Repeated calls are no-ops; errors are logged and swallowed.
#[derive(Debug)]
pub struct OverlayWindow<H> {
    host: H,
    state: WindowState,
    failed_moves: u64,
}

impl<H: OverlayHost> OverlayWindow<H> {
    /// Wrap a host; nothing is attached yet
    pub fn new(host: H) -> Self {
        Self {
            host,
            state: WindowState::Pending,
            failed_moves: 0,
        }
    }

    /// Lifecycle state
    #[must_use]
    pub fn state(&self) -> WindowState {
        self.state
    }

    /// Number of position updates the host rejected
    #[must_use]
    pub fn failed_moves(&self) -> u64 {
        self.failed_moves
    }

    /// Borrow the wrapped host
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Display size from the host
    pub fn display_metrics(&self) -> DisplayMetrics {
        self.host.display_metrics()
    }

    /// Attach the window (first call only)
    pub fn attach(&mut self) {
        if self.state != WindowState::Pending {
            return;
        }
        self.state = WindowState::Attached;
        match self.host.attach() {
            Ok(()) => tracing::info!("overlay window attached"),
            Err(e) => tracing::error!(error = %e, "failed to attach overlay window"),
        }
    }

    /// Push a position to the host. Ignored unless attached.
    pub fn move_to(&mut self, position: Position) {
        if self.state != WindowState::Attached {
            return;
        }
        if let Err(e) = self.host.move_to(position) {
            self.failed_moves += 1;
            tracing::warn!(error = %e, %position, "failed to update overlay window");
        }
    }

    /// Detach the window. Calling this more than once is a no-op.
    pub fn detach(&mut self) {
        match self.state {
            WindowState::Closed => {}
            WindowState::Pending => self.state = WindowState::Closed,
            WindowState::Attached => {
                self.state = WindowState::Closed;
                match self.host.detach() {
                    Ok(()) => tracing::info!("overlay window detached"),
                    Err(e) => tracing::error!(error = %e, "failed to detach overlay window"),
                }
            }
        }
    }

    /// Unwrap the host
    pub fn into_host(self) -> H {
        self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FlakyHost {
        attaches: u32,
        detaches: u32,
        moves: Vec<Position>,
        fail_moves: bool,
        fail_detach: bool,
    }

    impl OverlayHost for FlakyHost {
        fn display_metrics(&self) -> DisplayMetrics {
            DisplayMetrics::new(400, 800)
        }

        fn attach(&mut self) -> Result<(), SurfaceError> {
            self.attaches += 1;
            Ok(())
        }

        fn move_to(&mut self, position: Position) -> Result<(), SurfaceError> {
            if self.fail_moves {
                return Err(SurfaceError::PermissionDenied);
            }
            self.moves.push(position);
            Ok(())
        }

        fn detach(&mut self) -> Result<(), SurfaceError> {
            self.detaches += 1;
            if self.fail_detach {
                return Err(SurfaceError::NotAttached);
            }
            Ok(())
        }
    }

    #[test]
    fn test_detach_twice_is_noop() {
        let mut window = OverlayWindow::new(FlakyHost::default());
        window.attach();
        window.attach();
        window.detach();
        window.detach();

        assert_eq!(window.state(), WindowState::Closed);
        assert_eq!(window.host().attaches, 1);
        assert_eq!(window.host().detaches, 1);
    }

    #[test]
    fn test_detach_error_is_swallowed() {
        let mut window = OverlayWindow::new(FlakyHost {
            fail_detach: true,
            ..FlakyHost::default()
        });
        window.attach();
        window.detach();
        window.detach();
        assert_eq!(window.host().detaches, 1);
    }

    #[test]
    fn test_move_failures_are_counted_not_raised() {
        let mut window = OverlayWindow::new(FlakyHost {
            fail_moves: true,
            ..FlakyHost::default()
        });
        window.attach();
        window.move_to(Position::new(1, 2));
        window.move_to(Position::new(3, 4));
        assert_eq!(window.failed_moves(), 2);

        let mut host = window.into_host();
        host.fail_moves = false;
        let mut window = OverlayWindow::new(host);
        window.attach();
        window.move_to(Position::new(5, 6));
        assert_eq!(window.host().moves, vec![Position::new(5, 6)]);
    }

    #[test]
    fn test_moves_ignored_outside_attached() {
        let mut window = OverlayWindow::new(FlakyHost::default());
        window.move_to(Position::new(1, 1));
        window.detach();
        window.attach();
        window.move_to(Position::new(2, 2));

        assert!(window.host().moves.is_empty());
        assert_eq!(window.host().attaches, 0);
        assert_eq!(window.host().detaches, 0);
    }
}
