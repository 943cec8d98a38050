use super::utils::{centered_rect, field_style, field_text};
use super::*;
use crate::app::{Confirm, ConfirmKind, Modal, NameForm, ProjectField, ProjectForm};

pub fn render_modal(frame: &mut Frame, app: &App) {
    let Some(modal) = &app.modal else {
        return;
    };
    match modal {
        Modal::Project(form) => render_project_form(frame, app, form),
        Modal::Category(form) => render_name_form(frame, " Создать категорию ", form),
        Modal::Timer { form, .. } => render_name_form(frame, " Создать таймер ", form),
        Modal::Confirm(confirm) => render_confirm(frame, confirm),
    }
}

fn dialog_block(title: impl Into<String>) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(Span::styled(title.into(), Style::default().fg(Color::Yellow)))
        .padding(Padding::horizontal(1))
}

fn error_lines(error: Option<&str>) -> Vec<Line<'static>> {
    match error {
        Some(err) => vec![
            Line::from(""),
            Line::from(Span::styled(err.to_string(), Style::default().fg(Color::Red))),
        ],
        None => Vec::new(),
    }
}

fn hint_line(submit: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::raw(format!(": {}  ", submit)),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::raw(": Отмена"),
    ])
}

fn render_project_form(frame: &mut Frame, app: &App, form: &ProjectForm) {
    let area = centered_rect(64, 14, frame.area());
    frame.render_widget(Clear, area);

    let name_focused = form.focused == ProjectField::Name;
    let description_focused = form.focused == ProjectField::Description;
    let category_focused = form.focused == ProjectField::Category;

    let category_label = form.category_label(&app.projects.categories).to_string();
    let category_text = if category_focused {
        format!("◀ {} ▶", category_label)
    } else {
        category_label
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("Название", field_style(name_focused)),
            Span::styled("*", Style::default().fg(Color::Red)),
            Span::styled(": ", field_style(name_focused)),
            Span::styled(
                field_text(&form.name, name_focused),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Описание: ", field_style(description_focused)),
            Span::styled(
                field_text(&form.description, description_focused),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Категория: ", field_style(category_focused)),
            Span::styled(category_text, Style::default().fg(Color::Magenta)),
        ]),
    ];
    lines.extend(error_lines(form.error.as_deref()));
    lines.push(Line::from(""));
    lines.push(hint_line("Сохранить"));

    let paragraph = Paragraph::new(lines).block(dialog_block(format!(" {} ", form.title())));
    frame.render_widget(paragraph, area);
}

fn render_name_form(frame: &mut Frame, title: &'static str, form: &NameForm) {
    let area = centered_rect(56, 9, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("Название", field_style(true)),
            Span::styled("*", Style::default().fg(Color::Red)),
            Span::styled(": ", field_style(true)),
            Span::styled(field_text(&form.name, true), Style::default().fg(Color::White)),
        ]),
    ];
    lines.extend(error_lines(form.error.as_deref()));
    lines.push(Line::from(""));
    lines.push(hint_line("Создать"));

    frame.render_widget(Paragraph::new(lines).block(dialog_block(title)), area);
}

fn render_confirm(frame: &mut Frame, confirm: &Confirm) {
    let area = centered_rect(60, 9, frame.area());
    frame.render_widget(Clear, area);

    let yes_color = match confirm.kind {
        ConfirmKind::MarkAllPaid(_) => Color::Green,
        _ => Color::Red,
    };
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            confirm.question(),
            Style::default().fg(Color::White),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y] Подтвердить", Style::default().fg(yes_color)),
            Span::raw("    "),
            Span::styled("[n] Отмена", Style::default().fg(Color::White)),
        ]),
    ];

    let paragraph = Paragraph::new(text)
        .wrap(ratatui::widgets::Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", confirm.title()))
                .padding(Padding::horizontal(1)),
        )
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
