use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::TestBackend;

/// Draw into a `w`×`h` test terminal and return its rows as plain text,
/// trailing spaces removed.
pub fn draw_text(w: u16, h: u16, draw: impl FnOnce(&mut Frame)) -> String {
    let mut terminal = Terminal::new(TestBackend::new(w, h)).unwrap();
    terminal.draw(draw).unwrap();
    let buffer = terminal.backend().buffer();
    (0..h)
        .map(|y| {
            let row: String = (0..w).map(|x| buffer[(x, y)].symbol()).collect();
            row.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
