use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use ratatui::Frame;

use crate::scan::{PackageStatus, ScanState, View};
use crate::utils::invisible::highlight_invisible;
use crate::utils::{display_path, human_bytes, truncate_chars};

const BACKGROUND: Color = Color::Rgb(46, 52, 54);
const ZEBRA: Color = Color::Rgb(0x14, 0x14, 0x14);
const NAME_FG: Color = Color::Rgb(200, 200, 200);
const ELLIPSIS_FG: Color = Color::Rgb(0x60, 0x60, 0x60);
const INVISIBLE_BG: Color = Color::Rgb(139, 0, 0);
const SEARCHING_BG: Color = Color::Yellow;
const FINISHED_BG: Color = Color::Rgb(0, 255, 0);

const TAB_HINT: &str = "<- Press Tab or Shift+Tab to switch ";
const SIZE_DECIMALS: Option<usize> = Some(3);

pub fn render(frame: &mut Frame, view: View, state: &ScanState) {
    let area = frame.size();
    frame.render_widget(Block::default().style(Style::default().bg(BACKGROUND)), area);
    if area.height == 0 {
        return;
    }

    render_tabs(frame, view, row(area, 0));
    if area.height >= 2 {
        let body = Rect {
            y: area.y + 1,
            height: area.height - 2,
            ..area
        };
        render_body(frame, view, state, body);
        render_status(frame, state, row(area, area.height - 1));
    }
}

fn row(area: Rect, offset: u16) -> Rect {
    Rect {
        y: area.y + offset,
        height: 1,
        ..area
    }
}

fn render_tabs(frame: &mut Frame, view: View, area: Rect) {
    frame.render_widget(Paragraph::new(TAB_HINT).alignment(Alignment::Right), area);

    let tabs: Vec<Span> = View::ALL
        .iter()
        .map(|tab| {
            let style = if *tab == view {
                Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default()
            };
            Span::styled(format!(" {} ", tab.title()), style)
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(tabs)), area);
}

fn render_body(frame: &mut Frame, view: View, state: &ScanState, area: Rect) {
    if view == View::Packages {
        let message = match state.package_status() {
            PackageStatus::Pending => Some(vec![Line::from("Querying dpkg-query...")]),
            PackageStatus::Unavailable(reason) => Some(vec![
                Line::from(Span::styled(
                    "Failed to run dpkg-query",
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(reason),
            ]),
            PackageStatus::Ready => None,
        };
        if let Some(lines) = message {
            render_centered(frame, lines, area);
            return;
        }
    }

    let entries = state.snapshot(view);
    if entries.is_empty() && view == View::Packages {
        render_centered(frame, vec![Line::from("No packages found")], area);
        return;
    }

    for (i, entry) in entries.iter().take(area.height as usize).enumerate() {
        let line_area = row(area, i as u16);
        let row_style = if i % 2 == 0 {
            Style::default().bg(ZEBRA)
        } else {
            Style::default()
        };

        let prefix = if view == View::Packages { "~" } else { "" };
        let size_text = format!("{}{}", prefix, human_bytes(entry.size_bytes, SIZE_DECIMALS));
        let size_width = size_text.chars().count();

        let name = match view {
            View::Packages => entry.identifier.to_string_lossy().into_owned(),
            View::Files | View::Folders => display_path(&entry.identifier, state.root()),
        };
        let room = (line_area.width as usize).saturating_sub(size_width + 1);
        let (kept, ellipsis) = truncate_chars(&name, room);

        let mut spans = name_spans(kept);
        if !ellipsis.is_empty() {
            spans.push(Span::styled(ellipsis, Style::default().fg(ELLIPSIS_FG)));
        }

        frame.render_widget(
            Paragraph::new(Line::from(spans)).style(row_style.fg(NAME_FG)),
            line_area,
        );
        frame.render_widget(
            Paragraph::new(Span::styled(
                size_text,
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Right)
            .style(row_style),
            line_area,
        );
    }
}

fn name_spans(name: &str) -> Vec<Span<'static>> {
    highlight_invisible(name)
        .into_iter()
        .map(|segment| {
            if segment.highlighted {
                Span::styled(segment.text, Style::default().bg(INVISIBLE_BG))
            } else {
                Span::raw(segment.text)
            }
        })
        .collect()
}

fn render_centered(frame: &mut Frame, lines: Vec<Line>, area: Rect) {
    let height = (lines.len() as u16).min(area.height);
    let centered = Rect {
        y: area.y + area.height.saturating_sub(height) / 2,
        height,
        ..area
    };
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), centered);
}

fn render_status(frame: &mut Frame, state: &ScanState, area: Rect) {
    let (label, bg) = if state.is_accumulating() {
        (" Searching... ", SEARCHING_BG)
    } else {
        (" Finished ", FINISHED_BG)
    };
    let style = Style::default().bg(bg).fg(Color::Black);

    frame.render_widget(Block::default().style(style), area);
    frame.render_widget(Paragraph::new(label).style(style), area);
    frame.render_widget(
        Paragraph::new(format!("fssize v{}", env!("CARGO_PKG_VERSION")))
            .alignment(Alignment::Center)
            .style(style),
        area,
    );
    frame.render_widget(
        Paragraph::new("Press 'q' to quit ")
            .alignment(Alignment::Right)
            .style(style),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SizedEntry;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use ratatui::Terminal;

    fn line_text(buffer: &Buffer, y: u16) -> String {
        (0..buffer.area.width)
            .map(|x| buffer.get(x, y).symbol())
            .collect()
    }

    fn draw(view: View, state: &ScanState, width: u16, height: u16) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, view, state)).unwrap();
        terminal.backend().buffer().clone()
    }

    #[test]
    fn test_renders_ranked_files_relative_to_root() {
        let state = ScanState::new("/data", 10, false);
        state.try_insert(View::Files, SizedEntry::new("/data/b.txt", 300));
        state.try_insert(View::Files, SizedEntry::new("/data/a.txt", 100));

        let buffer = draw(View::Files, &state, 100, 6);
        assert!(line_text(&buffer, 0).contains(" Files "));
        assert!(line_text(&buffer, 0).contains("Press Tab"));

        let first = line_text(&buffer, 1);
        assert!(first.starts_with("b.txt"));
        assert!(first.trim_end().ends_with("300 B"));
        assert!(line_text(&buffer, 2).starts_with("a.txt"));

        let status = line_text(&buffer, 5);
        assert!(status.contains("Finished"));
        assert!(status.contains("Press 'q' to quit"));
    }

    #[test]
    fn test_long_paths_are_truncated() {
        let state = ScanState::new("/", 10, false);
        state.try_insert(
            View::Folders,
            SizedEntry::new("/a/very/long/directory/name/that/goes/on", 1_500_000),
        );

        let buffer = draw(View::Folders, &state, 30, 4);
        let first = line_text(&buffer, 1);
        assert!(first.contains("..."));
        assert!(first.trim_end().ends_with("1.5 MB"));
    }

    #[test]
    fn test_ellipsis_shrinks_to_fit_narrow_rows() {
        let state = ScanState::new("/", 10, false);
        state.try_insert(View::Files, SizedEntry::new("/some/file", 1_500_000));

        // 9 columns leave 2 for the name once " 1.5 MB" is placed
        let buffer = draw(View::Files, &state, 9, 4);
        assert_eq!(line_text(&buffer, 1), ".. 1.5 MB");
    }

    #[test]
    fn test_failed_package_query_is_explicit() {
        let state = ScanState::new("/", 10, false);
        state.set_package_status(PackageStatus::Unavailable("no dpkg".into()));

        let buffer = draw(View::Packages, &state, 50, 8);
        let text: String = (0..8).map(|y| line_text(&buffer, y)).collect();
        assert!(text.contains("Failed to run dpkg-query"));
    }

    #[test]
    fn test_packages_are_marked_as_estimates() {
        let state = ScanState::new("/", 10, false);
        state.try_insert(View::Packages, SizedEntry::new("libfoo", 104_857_600));
        state.set_package_status(PackageStatus::Ready);

        let buffer = draw(View::Packages, &state, 50, 4);
        let first = line_text(&buffer, 1);
        assert!(first.starts_with("libfoo"));
        assert!(first.trim_end().ends_with("~104.857 MB"));
    }

    #[test]
    fn test_status_while_searching() {
        let state = ScanState::new("/", 10, false);
        state.set_accumulating(true);
        let buffer = draw(View::Files, &state, 50, 4);
        assert!(line_text(&buffer, 3).contains("Searching..."));
    }
}
