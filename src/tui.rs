use crossterm::{
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal, TerminalOptions, Viewport};
use std::io::{self, Stdout};

/// Rows drawn in inline mode: three body lines plus the bar.
pub const INLINE_HEIGHT: u16 = 4;

/// How the bar occupies the terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScreenMode {
    /// Alternate screen, bar pinned to the bottom row.
    Fullscreen,
    /// A few rows under the current prompt; scrollback is left alone.
    Inline,
}

impl ScreenMode {
    pub fn from_inline(inline: bool) -> Self {
        if inline {
            Self::Inline
        } else {
            Self::Fullscreen
        }
    }

    fn viewport(self) -> Viewport {
        match self {
            Self::Fullscreen => Viewport::Fullscreen,
            Self::Inline => Viewport::Inline(INLINE_HEIGHT),
        }
    }
}

pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    mode: ScreenMode,
    entered: bool,
}

impl Tui {
    pub fn new(mode: ScreenMode) -> anyhow::Result<Self> {
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::with_options(
            backend,
            TerminalOptions {
                viewport: mode.viewport(),
            },
        )?;
        Ok(Self {
            terminal,
            mode,
            entered: false,
        })
    }

    pub fn enter(&mut self) -> anyhow::Result<()> {
        terminal::enable_raw_mode()?;
        if self.mode == ScreenMode::Fullscreen {
            execute!(io::stdout(), EnterAlternateScreen)?;
            self.terminal.clear()?;
        }
        self.terminal.hide_cursor()?;
        self.entered = true;
        Ok(())
    }

    pub fn exit(&mut self) {
        if !self.entered {
            return;
        }
        self.entered = false;
        let _ = self.terminal.show_cursor();
        if self.mode == ScreenMode::Fullscreen {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
        let _ = terminal::disable_raw_mode();
        if self.mode == ScreenMode::Inline {
            // Last bar stays in scrollback; the prompt resumes below it
            println!();
        }
    }

    pub fn draw(&mut self, f: impl FnOnce(&mut Frame)) -> anyhow::Result<()> {
        self.terminal.draw(f)?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        self.exit();
    }
}

/// Restore the terminal before the panic message is printed.
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_mode_from_flag() {
        assert_eq!(ScreenMode::from_inline(false), ScreenMode::Fullscreen);
        assert_eq!(ScreenMode::from_inline(true), ScreenMode::Inline);
    }

    #[test]
    fn test_inline_viewport_fits_body_and_bar() {
        assert!(matches!(
            ScreenMode::Inline.viewport(),
            Viewport::Inline(INLINE_HEIGHT)
        ));
        assert!(matches!(
            ScreenMode::Fullscreen.viewport(),
            Viewport::Fullscreen
        ));
    }
}
