use super::utils::{controls_bar, field_style, field_text};
use super::*;
use crate::app::{CardMode, DraftField, TimerCard, TimerDraft, TimersScreen};
use ratatui::widgets::{List, ListItem, ListState};
use timekeep::domain::{PaidStatus, TimerStatus};
use timekeep::elapsed::format_clock;

pub fn render_timers_view(frame: &mut Frame, app: &App, body: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(body);

    let Some(screen) = app.timers.as_ref() else {
        return;
    };

    render_cards(frame, screen, chunks[0]);

    let controls = if screen.is_editing() {
        controls_bar(&[
            ("Tab", "Поле"),
            ("Enter", "Сохранить"),
            ("Esc", "Отмена"),
        ])
    } else {
        controls_bar(&[
            ("j/k", "Выбор"),
            ("n", "Новый"),
            ("Space", "Пауза/продолжить"),
            ("t", "Остановить"),
            ("e", "Изменить"),
            ("p", "Оплачен"),
            ("l", "Залогирован"),
            ("d", "Удалить"),
            ("M", "Оплатить все"),
            ("Esc", "Назад"),
        ])
    };
    frame.render_widget(controls, chunks[1]);
}

fn render_cards(frame: &mut Frame, screen: &TimersScreen, area: Rect) {
    let mut title = vec![Span::styled(
        format!(" {} ", screen.title()),
        Style::default().fg(Color::White),
    )];
    if let Some(status) = screen.paid_status() {
        title.push(paid_badge(status));
        title.push(Span::raw(" "));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(Line::from(title));

    if screen.detail.is_none() {
        let loading = Paragraph::new("Загрузка...")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(loading, area);
        return;
    }
    if screen.cards.is_empty() {
        let empty = Paragraph::new("Таймеров пока нет. Нажмите n, чтобы создать.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = screen
        .cards
        .iter()
        .enumerate()
        .map(|(i, card)| match &card.mode {
            CardMode::Viewing => timer_card(card, i == screen.selected),
            CardMode::Editing(draft) => draft_card(card, draft),
        })
        .collect();

    let list = List::new(items).block(block);
    let mut state = ListState::default().with_selected(Some(screen.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn paid_badge(status: PaidStatus) -> Span<'static> {
    let color = match status {
        PaidStatus::Paid => Color::Green,
        PaidStatus::Unpaid => Color::Red,
    };
    Span::styled(format!("[{}]", status.label()), Style::default().fg(color))
}

fn flag(label: &'static str, on: bool) -> Vec<Span<'static>> {
    let (mark, color) = if on {
        ("[x] ", Color::Green)
    } else {
        ("[ ] ", Color::DarkGray)
    };
    vec![
        Span::styled(mark, Style::default().fg(color)),
        Span::styled(label, Style::default().fg(Color::Gray)),
        Span::raw("   "),
    ]
}

fn timer_card(card: &TimerCard, selected: bool) -> ListItem<'static> {
    let timer = card.timer();
    let name_style = if selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let marker = if selected { "▶ " } else { "  " };

    let (state_label, state_color) = match timer.status() {
        TimerStatus::Running => ("⏵ Идёт", Color::Green),
        TimerStatus::Paused => ("⏸ Пауза", Color::Yellow),
        TimerStatus::Stopped => ("Таймер остановлен", Color::DarkGray),
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(marker, name_style),
            Span::styled(timer.display_name().to_string(), name_style),
        ]),
        Line::from(vec![
            Span::raw("    "),
            Span::styled(
                format_clock(card.ticker.displayed()),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(state_label, Style::default().fg(state_color)),
        ]),
    ];
    if let Some(description) = timer.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(Line::from(Span::styled(
            format!("    {}", description),
            Style::default().fg(Color::DarkGray),
        )));
    }
    let mut flags = vec![Span::raw("    ")];
    flags.extend(flag("Оплачен", timer.is_paid));
    flags.extend(flag("Залогирован", timer.is_logged));
    lines.push(Line::from(flags));
    lines.push(Line::from(""));
    ListItem::new(lines)
}

fn draft_card(card: &TimerCard, draft: &TimerDraft) -> ListItem<'static> {
    let row = |label: &'static str, field: DraftField| {
        let focused = draft.focused == field;
        let input = match field {
            DraftField::Name => &draft.name,
            DraftField::Description => &draft.description,
            DraftField::Hours => &draft.hours,
            DraftField::Minutes => &draft.minutes,
            DraftField::Seconds => &draft.seconds,
        };
        vec![
            Span::styled(format!("{}: ", label), field_style(focused)),
            Span::styled(field_text(input, focused), Style::default().fg(Color::White)),
            Span::raw("  "),
        ]
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("✎ ", Style::default().fg(Color::Magenta)),
            Span::styled(
                card.timer().display_name().to_string(),
                Style::default().fg(Color::Magenta),
            ),
        ]),
        Line::from([vec![Span::raw("    ")], row("Название", DraftField::Name)].concat()),
        Line::from([vec![Span::raw("    ")], row("Описание", DraftField::Description)].concat()),
        Line::from(
            [
                vec![Span::raw("    ")],
                row("Часы", DraftField::Hours),
                row("Минуты", DraftField::Minutes),
                row("Секунды", DraftField::Seconds),
            ]
            .concat(),
        ),
    ];
    if let Some(err) = &draft.error {
        lines.push(Line::from(Span::styled(
            format!("    {}", err),
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(""));
    ListItem::new(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use time::macros::datetime;
    use time::{Duration, OffsetDateTime};
    use timekeep::domain::Timer;
    use timekeep::ElapsedTicker;

    const T: OffsetDateTime = datetime!(2024-05-10 08:00 UTC);

    fn card(timer: Timer) -> TimerCard {
        TimerCard {
            ticker: ElapsedTicker::new(timer, T + Duration::seconds(3725), Instant::now()),
            mode: CardMode::Viewing,
        }
    }

    fn rendered(item: ListItem<'static>, width: u16) -> String {
        use ratatui::{backend::TestBackend, Terminal};
        let mut terminal = Terminal::new(TestBackend::new(width, 8)).unwrap();
        terminal
            .draw(|f| f.render_widget(List::new(vec![item]), f.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn card_shows_clock_and_placeholder_name() {
        let text = rendered(timer_card(&card(Timer::new("t1", "", T)), false), 60);
        assert!(text.contains("Без названия"));
        assert!(text.contains("01:02:05"));
    }

    #[test]
    fn stopped_card_says_so() {
        let timer = Timer::new("t1", "Ревью", T).ended_at(T + Duration::seconds(60));
        let text = rendered(timer_card(&card(timer), true), 60);
        assert!(text.contains("Таймер остановлен"));
        assert!(text.contains("00:01:00"));
    }
}
