//! Terminal implementation of the auth manager's navigation

use oktaplus_shared::local_auth::Navigator;
use tracing::debug;

/// Opens external URLs in the system browser and prints them as a fallback
///
/// The CLI has no routes of its own, so redirects to host paths are only logged.
pub struct TerminalNavigator {
    open_browser: bool,
}

impl TerminalNavigator {
    pub fn new(open_browser: bool) -> Self {
        Self { open_browser }
    }
}

impl Navigator for TerminalNavigator {
    fn redirect(&self, path: &str, replace: bool) {
        debug!(path, replace, "redirect requested");
    }

    fn navigate(&self, url: &str) {
        println!();
        if self.open_browser {
            println!("Opening browser...");
            println!();
            println!("If browser doesn't open, visit:");
        } else {
            println!("Visit:");
        }
        // Use OSC 8 escape sequence to make the URL clickable in supported terminals
        println!("\x1b]8;;{}\x1b\\{}\x1b]8;;\x1b\\", url, url);
        println!();

        if self.open_browser
            && let Err(e) = open::that(url)
        {
            debug!("Failed to open browser: {}", e);
        }
    }
}
