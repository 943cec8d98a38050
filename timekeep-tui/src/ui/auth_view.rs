use super::utils::{centered_rect, controls_bar, field_style};
use super::*;
use crate::app::{AuthField, AuthMode};

pub fn render_auth_view(frame: &mut Frame, app: &App, body: Rect) {
    let form = &app.auth;
    let area = centered_rect(60, 16, body);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(3)])
        .split(area);

    let email_focused = form.focused == AuthField::Email;
    let password_focused = form.focused == AuthField::Password;

    let email_display = super::utils::field_text(&form.email, email_focused);
    let mut password_display = form.password.masked();
    if password_focused {
        password_display.push('█');
    }

    let required = Span::styled("*", Style::default().fg(Color::Red));
    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("Email", field_style(email_focused)),
            required.clone(),
            Span::styled(": ", field_style(email_focused)),
            Span::styled(email_display, Style::default().fg(Color::White)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Пароль", field_style(password_focused)),
            required,
            Span::styled(": ", field_style(password_focused)),
            Span::styled(password_display, Style::default().fg(Color::White)),
        ]),
        Line::from(""),
    ];

    if let Some(err) = &form.error {
        lines.push(Line::from(Span::styled(
            err.as_str(),
            Style::default().fg(Color::Red),
        )));
        lines.push(Line::from(""));
    }

    let switch_hint = match form.mode {
        AuthMode::Login => "Нет аккаунта? Ctrl+R: регистрация",
        AuthMode::Register => "Уже есть аккаунт? Ctrl+R: вход",
    };
    lines.push(Line::from(Span::styled(
        switch_hint,
        Style::default().fg(Color::DarkGray),
    )));

    let title = if form.submitting {
        format!(" {}... ", form.mode.title())
    } else {
        format!(" {} ", form.mode.title())
    };
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(Span::styled(title, Style::default().fg(Color::Yellow)))
            .padding(Padding::horizontal(2)),
    );
    frame.render_widget(paragraph, chunks[0]);

    frame.render_widget(
        controls_bar(&[
            ("Tab", "Поле"),
            ("Enter", "Отправить"),
            ("Ctrl+R", "Вход/регистрация"),
            ("Esc", "Выход"),
        ]),
        chunks[1],
    );
}
