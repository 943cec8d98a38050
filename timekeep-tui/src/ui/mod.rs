use crate::app::{App, NotificationKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Paragraph},
    Frame,
};
use timekeep::Route;

mod auth_view;
mod modal_view;
mod projects_view;
mod statistics_view;
mod timers_view;
pub(super) mod utils;

pub fn render(frame: &mut Frame, app: &mut App) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, root[0], app);

    let body = root[1];
    match &app.route {
        Route::Login | Route::Register => auth_view::render_auth_view(frame, app, body),
        Route::Home | Route::Projects => projects_view::render_projects_view(frame, app, body),
        Route::ProjectTimers(_) => timers_view::render_timers_view(frame, app, body),
        Route::Statistics => statistics_view::render_statistics_view(frame, app, body),
    }

    render_notification(frame, root[2], app);

    if app.modal.is_some() {
        modal_view::render_modal(frame, app);
    }
}

fn route_title(app: &App) -> String {
    match &app.route {
        Route::Login | Route::Register => app.auth.mode.title().to_string(),
        Route::Home | Route::Projects => "Проекты".to_string(),
        Route::ProjectTimers(_) => match app.timers.as_ref().map(|t| t.title()) {
            Some(title) if !title.is_empty() => format!("Проекты / {}", title),
            _ => "Проекты".to_string(),
        },
        Route::Statistics => "Статистика".to_string(),
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &mut App) {
    const LABEL: &str = " Timekeep";
    let title_width = 1 + LABEL.chars().count() as u16 + 1;

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(title_width), Constraint::Min(0)])
        .split(area);

    // Throbber spins while a request is in flight.
    let throbber_area = Rect {
        x: cols[0].x + 1,
        y: cols[0].y,
        width: 1,
        height: 1,
    };
    let label_area = Rect {
        x: throbber_area.x + 1,
        y: cols[0].y,
        width: cols[0].width.saturating_sub(2),
        height: 1,
    };
    let throbber = throbber_widgets_tui::Throbber::default()
        .style(Style::default().fg(Color::Yellow))
        .throbber_style(Style::default().fg(Color::Yellow))
        .throbber_set(throbber_widgets_tui::BRAILLE_SIX)
        .use_type(if app.is_loading {
            throbber_widgets_tui::WhichUse::Spin
        } else {
            throbber_widgets_tui::WhichUse::Full
        });
    frame.render_stateful_widget(throbber, throbber_area, &mut app.throbber_state);
    frame.render_widget(
        Paragraph::new(Span::styled(LABEL, Style::default().fg(Color::Yellow))),
        label_area,
    );

    let title = Line::from(vec![
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            route_title(app),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
    ]);
    frame.render_widget(Paragraph::new(title), cols[1]);
}

fn render_notification(frame: &mut Frame, area: Rect, app: &App) {
    let Some(notification) = &app.notification else {
        return;
    };
    let color = match notification.kind {
        NotificationKind::Success => Color::Green,
        NotificationKind::Error => Color::Red,
    };
    let line = Line::from(vec![
        Span::styled(
            format!(" {}: ", notification.kind.title()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(notification.message.as_str(), Style::default().fg(color)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
