use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::system::snapshot::{DiskInfo, PerformanceSnapshot};

pub fn render(frame: &mut Frame, area: Rect, performance: &PerformanceSnapshot, disks: &[DiskInfo]) {
    frame.render_widget(Paragraph::new(status_line(performance, disks)), area);
}

pub fn status_line(performance: &PerformanceSnapshot, disks: &[DiskInfo]) -> Line<'static> {
    let mut spans = vec![
        Span::styled(
            format!("CPU: {:>2}%", performance.cpu_percent),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled(
            format!(
                "RAM: {:>5}MB ({:>2}%)",
                performance.ram.used_mb, performance.ram.utilization_percent
            ),
            Style::default().fg(Color::Blue),
        ),
        Span::raw("  "),
        Span::styled(
            "HDD:",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
    ];

    for disk in disks {
        spans.push(Span::styled(
            format!(
                " {} {}GB ({}%)",
                disk.name, disk.used_gb, disk.utilization_percent
            ),
            Style::default().fg(Color::Yellow),
        ));
    }

    Line::from(spans)
}
