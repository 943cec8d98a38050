use super::utils::controls_bar;
use super::*;
use ratatui::widgets::Tabs;
use timekeep::domain::{PaidStatus, Period, Statistics};
use timekeep::elapsed::{format_summary, format_timestamp};

/// Pie slices and legend entries share this order.
pub const PALETTE: [Color; 12] = [
    Color::Blue,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::Cyan,
    Color::Red,
    Color::LightBlue,
    Color::LightGreen,
    Color::LightYellow,
    Color::LightMagenta,
    Color::LightCyan,
    Color::LightRed,
];

pub fn render_statistics_view(frame: &mut Frame, app: &App, body: Rect) {
    let screen = &app.statistics;
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Period + filter
            Constraint::Length(3), // Totals
            Constraint::Min(8),
            Constraint::Length(3), // Controls
        ])
        .split(body);

    let titles: Vec<&str> = Period::ALL.iter().map(|p| p.label()).collect();
    let selected = Period::ALL
        .iter()
        .position(|p| *p == screen.period)
        .unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Период ")
                .title(
                    Line::from(Span::styled(
                        format!(" Таймеры: {} ", screen.paid_filter.label()),
                        Style::default().fg(Color::Cyan),
                    ))
                    .right_aligned(),
                ),
        );
    frame.render_widget(tabs, outer[0]);

    let stats_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(Span::styled(
            " Статистика ",
            Style::default().fg(Color::White),
        ));

    match &screen.data {
        None => {
            let text = if app.is_loading {
                "Загрузка..."
            } else {
                "Нет данных за выбранный период"
            };
            render_placeholder(frame, text, outer[2], stats_block);
        }
        Some(stats) => {
            render_totals(frame, stats, outer[1]);
            if stats.is_empty() {
                render_placeholder(frame, "Нет данных за выбранный период", outer[2], stats_block);
            } else {
                let inner = stats_block.inner(outer[2]);
                frame.render_widget(stats_block, outer[2]);
                let panels = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
                    .split(inner);
                render_pie_panel(frame, stats, panels[0]);
                render_breakdown(frame, stats, screen.scroll, panels[1]);
            }
        }
    }

    frame.render_widget(
        controls_bar(&[
            ("h/l", "Период"),
            ("f", "Фильтр"),
            ("j/k", "Прокрутка"),
            ("r", "Обновить"),
            ("s/Esc", "Назад"),
            ("q", "Закрыть"),
        ]),
        outer[3],
    );
}

fn render_placeholder(frame: &mut Frame, text: &str, area: Rect, block: Block) {
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray))
        .block(block);
    frame.render_widget(paragraph, area);
}

fn render_totals(frame: &mut Frame, stats: &Statistics, area: Rect) {
    let total = |label: &'static str, seconds: i64, color: Color| {
        vec![
            Span::styled(format!("{}: ", label), Style::default().fg(Color::DarkGray)),
            Span::styled(
                format_summary(seconds),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::raw("     "),
        ]
    };
    let line = Line::from(
        [
            total("Всего", stats.total_time, Color::White),
            total("Оплачено", stats.total_paid_time, Color::Green),
            total("Не оплачено", stats.total_unpaid_time, Color::Red),
        ]
        .concat(),
    );
    let paragraph = Paragraph::new(line).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(paragraph, area);
}

fn render_pie_panel(frame: &mut Frame, stats: &Statistics, area: Rect) {
    use tui_piechart::{PieChart, PieSlice};

    let shares = stats.project_shares();
    let area = Rect {
        x: area.x + 2,
        y: area.y,
        width: area.width.saturating_sub(4),
        height: area.height,
    };

    let legend_rows = legend_rows(shares.len());
    let pie_height = (area.width / 2)
        .min(area.height / 2)
        .min(area.height.saturating_sub(legend_rows));

    let split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(pie_height), Constraint::Min(0)])
        .split(area);

    let slices: Vec<PieSlice> = shares
        .iter()
        .enumerate()
        .map(|(i, (project, pct))| {
            PieSlice::new(project.name.as_str(), *pct, PALETTE[i % PALETTE.len()])
        })
        .collect();
    let pie = PieChart::new(slices)
        .show_legend(false)
        .show_percentages(false);
    frame.render_widget(pie, split[0]);

    let legend_lines: Vec<Line> = shares
        .iter()
        .enumerate()
        .map(|(i, (project, pct))| {
            Line::from(vec![
                Span::styled("■ ", Style::default().fg(PALETTE[i % PALETTE.len()])),
                Span::styled(
                    format!(
                        "{}: {} ({:.0}%)",
                        project.name,
                        format_summary(project.total_time),
                        pct
                    ),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();
    let legend = Paragraph::new(legend_lines)
        .alignment(Alignment::Center)
        .block(Block::default().padding(Padding::new(0, 0, 1, 0)));
    frame.render_widget(legend, split[1]);
}

/// Rows taken by the legend: one per slice plus the heading.
fn legend_rows(slices: usize) -> u16 {
    u16::try_from(slices).unwrap_or(u16::MAX).saturating_add(1)
}

fn paid_span(is_paid: bool) -> Span<'static> {
    let status = PaidStatus::from_flag(is_paid);
    let color = match status {
        PaidStatus::Paid => Color::Green,
        PaidStatus::Unpaid => Color::Red,
    };
    Span::styled(format!("[{}]", status.label()), Style::default().fg(color))
}

fn breakdown_lines(stats: &Statistics) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for project in &stats.project_stats {
        lines.push(Line::from(vec![
            Span::styled(
                project.name.clone(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            paid_span(project.is_paid),
        ]));
        lines.push(Line::from(Span::styled(
            format!("Общее время: {}", format_summary(project.total_time)),
            Style::default().fg(Color::Cyan),
        )));
        for timer in &project.timers {
            let name = if timer.name.trim().is_empty() {
                "Без названия".to_string()
            } else {
                timer.name.clone()
            };
            let end = timer
                .end_time
                .map(format_timestamp)
                .unwrap_or_else(|| "Активен".to_string());
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(name, Style::default().fg(Color::White)),
                Span::styled(
                    format!("  {} → {}  ", format_timestamp(timer.start_time), end),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(format_summary(timer.time), Style::default().fg(Color::Cyan)),
                Span::raw("  "),
                paid_span(timer.is_paid),
            ]));
        }
        lines.push(Line::from(""));
    }
    lines
}

fn render_breakdown(frame: &mut Frame, stats: &Statistics, scroll: u16, area: Rect) {
    let lines = breakdown_lines(stats);
    let max_scroll = (lines.len() as u16).saturating_sub(area.height);
    let paragraph = Paragraph::new(lines)
        .scroll((scroll.min(max_scroll), 0))
        .block(
            Block::default()
                .borders(Borders::LEFT)
                .border_style(Style::default().fg(Color::DarkGray))
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use timekeep::domain::{ProjectStat, TimerStat};

    fn stats() -> Statistics {
        Statistics {
            total_time: 5400,
            total_paid_time: 3600,
            total_unpaid_time: 1800,
            project_stats: vec![ProjectStat {
                id: "p1".into(),
                name: "Блог".to_string(),
                total_time: 5400,
                is_paid: false,
                timers: vec![
                    TimerStat {
                        id: "t1".into(),
                        name: String::new(),
                        time: 3600,
                        is_paid: true,
                        start_time: datetime!(2024-05-10 08:00 UTC),
                        end_time: Some(datetime!(2024-05-10 09:00 UTC)),
                    },
                    TimerStat {
                        id: "t2".into(),
                        name: "Вёрстка".to_string(),
                        time: 1800,
                        is_paid: false,
                        start_time: datetime!(2024-05-10 10:00 UTC),
                        end_time: None,
                    },
                ],
            }],
        }
    }

    #[test]
    fn breakdown_lists_every_timer_under_its_project() {
        let text: Vec<String> = breakdown_lines(&stats())
            .iter()
            .map(|line| line.to_string())
            .collect();
        assert_eq!(text[0], "Блог  [Не оплачен]");
        assert_eq!(text[1], "Общее время: 1ч 30м");
        assert!(text[2].contains("Без названия"));
        assert!(text[2].contains("[Оплачен]"));
        assert!(text[3].contains("Вёрстка"));
        assert!(text[3].contains("Активен"));
    }

    #[test]
    fn legend_rows_saturate_instead_of_wrapping() {
        assert_eq!(legend_rows(0), 1);
        assert_eq!(legend_rows(3), 4);
        assert_eq!(legend_rows(70_000), u16::MAX);
        assert_eq!(legend_rows(usize::MAX), u16::MAX);
    }
}
