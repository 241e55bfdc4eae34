//! Terminal setup and restoration

use anyhow::{Context, Result};
use crossterm::event::{
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use std::io;

/// Install a panic hook that restores the terminal
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
        ratatui::restore();
        original_hook(panic_info);
    }));
}

/// Raw mode, alternate screen and (where supported) disambiguated key
/// reporting, released on drop.
pub struct TerminalGuard {
    terminal: DefaultTerminal,
    enhanced_keys: bool,
}

impl TerminalGuard {
    pub fn acquire() -> Result<Self> {
        install_panic_hook();
        let terminal = ratatui::try_init().context("initialize terminal")?;

        // Lets Ctrl+Enter arrive as itself instead of Ctrl+J.
        let enhanced_keys = matches!(crossterm::terminal::supports_keyboard_enhancement(), Ok(true))
            && execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
            )
            .is_ok();
        tracing::debug!("terminal acquired (keyboard enhancement: {enhanced_keys})");

        Ok(Self {
            terminal,
            enhanced_keys,
        })
    }

    pub fn terminal(&mut self) -> &mut DefaultTerminal {
        &mut self.terminal
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.enhanced_keys {
            let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
        }
        ratatui::restore();
        tracing::debug!("terminal restored");
    }
}
