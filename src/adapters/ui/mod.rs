pub mod banner;
pub mod progress;
pub mod tui;

/// Prints the welcome banner and installs the lavender/mint prompt theme used by every
/// later inquire prompt. Call once at startup, after tracing is initialised.
pub fn init_ui() {
    banner::print_welcome();
    tui::apply_theme();
}
