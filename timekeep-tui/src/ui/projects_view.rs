use super::utils::controls_bar;
use super::*;
use ratatui::widgets::{List, ListItem, ListState, Tabs};
use timekeep::domain::{PaidStatus, Project};
use timekeep::elapsed::format_summary;

pub fn render_projects_view(frame: &mut Frame, app: &App, body: Rect) {
    let screen = &app.projects;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Category filter
            Constraint::Length(3), // Search
            Constraint::Min(0),    // Project cards
            Constraint::Length(3), // Controls
        ])
        .split(body);

    // Category filter bar
    let tabs = screen.filter_tabs();
    let selected_tab = tabs
        .iter()
        .position(|(id, _)| *id == screen.category_filter.as_ref())
        .unwrap_or(0);
    let titles: Vec<String> = tabs.iter().map(|(_, name)| name.to_string()).collect();
    let tabs = Tabs::new(titles)
        .select(selected_tab)
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
                .title(" Категории "),
        );
    frame.render_widget(tabs, chunks[0]);

    // Search input
    let search_text = if screen.search.value.is_empty() && !screen.searching {
        "/ для поиска".to_string()
    } else {
        super::utils::field_text(&screen.search, screen.searching)
    };
    let search_border = if screen.searching {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let search_box = Paragraph::new(search_text)
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(search_border)
                .title(" Поиск ")
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(search_box, chunks[1]);

    render_project_list(frame, app, chunks[2]);

    let controls = if screen.searching {
        controls_bar(&[
            ("Enter", "К списку"),
            ("Esc", "Сбросить поиск"),
            ("Ctrl+X", "Очистить"),
        ])
    } else {
        controls_bar(&[
            ("j/k", "Выбор"),
            ("h/l", "Категория"),
            ("Enter", "Открыть"),
            ("n", "Новый"),
            ("e", "Изменить"),
            ("d", "Удалить"),
            ("c/D", "Категория +/-"),
            ("s", "Статистика"),
            ("X", "Выйти"),
            ("q", "Закрыть"),
        ])
    };
    frame.render_widget(controls, chunks[3]);
}

fn render_project_list(frame: &mut Frame, app: &App, area: Rect) {
    let screen = &app.projects;
    let title = if screen.search.is_blank() {
        format!(" Проекты ({}) ", screen.projects.len())
    } else {
        format!(
            " Проекты ({}/{}) ",
            screen.filtered.len(),
            screen.projects.len()
        )
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(title);

    if !screen.loaded {
        let loading = Paragraph::new("Загрузка...")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(loading, area);
        return;
    }
    if screen.filtered.is_empty() {
        let empty = Paragraph::new("Проектов пока нет. Нажмите n, чтобы создать.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = screen
        .visible_projects()
        .enumerate()
        .map(|(i, project)| project_card(project, i == screen.selected))
        .collect();

    let list = List::new(items).block(block);
    let mut state = ListState::default().with_selected(Some(screen.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn project_card(project: &Project, selected: bool) -> ListItem<'static> {
    let name_style = if selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let marker = if selected { "▶ " } else { "  " };

    let mut header = vec![
        Span::styled(marker, name_style),
        Span::styled(project.name.clone(), name_style),
        Span::styled(
            format!("  Общее время: {}", format_summary(project.total_time)),
            Style::default().fg(Color::Cyan),
        ),
    ];
    if project.total_time > 0 {
        let status = PaidStatus::from_flag(project.is_paid);
        let color = match status {
            PaidStatus::Paid => Color::Green,
            PaidStatus::Unpaid => Color::Red,
        };
        header.push(Span::styled(
            format!("  [{}]", status.label()),
            Style::default().fg(color),
        ));
    }
    if let Some(category) = project.category_name() {
        header.push(Span::styled(
            format!("  #{}", category),
            Style::default().fg(Color::Magenta),
        ));
    }

    let mut lines = vec![Line::from(header)];
    if let Some(description) = project.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(Line::from(Span::styled(
            format!("    {}", description),
            Style::default().fg(Color::DarkGray),
        )));
    }
    ListItem::new(lines)
}
