use time::OffsetDateTime;
use timekeep::domain::Timer;
use timekeep::dto::TimerEdit;
use timekeep::elapsed::{elapsed_seconds, parse_hms, split_hms};

use super::state::{FormError, TextInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Name,
    Description,
    Hours,
    Minutes,
    Seconds,
}

impl DraftField {
    const ORDER: [DraftField; 5] = [
        DraftField::Name,
        DraftField::Description,
        DraftField::Hours,
        DraftField::Minutes,
        DraftField::Seconds,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn previous(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            DraftField::Hours | DraftField::Minutes | DraftField::Seconds
        )
    }
}

/// Edit buffer for one timer card.
///
/// Built from a copy of the snapshot when editing starts; refetches replace
/// the canonical timer but never touch the draft.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerDraft {
    pub name: TextInput,
    pub description: TextInput,
    pub hours: TextInput,
    pub minutes: TextInput,
    pub seconds: TextInput,
    pub focused: DraftField,
    pub error: Option<String>,
    original_name: String,
    original_description: String,
    original_elapsed: u64,
    duration_edited: bool,
}

impl TimerDraft {
    pub fn from_timer(timer: &Timer, now: OffsetDateTime) -> Self {
        let elapsed = elapsed_seconds(timer, now);
        let (h, m, s) = split_hms(elapsed);
        let description = timer.description.clone().unwrap_or_default();
        Self {
            name: TextInput::with_value(&timer.name),
            description: TextInput::with_value(&description),
            hours: TextInput::with_value(&h.to_string()),
            minutes: TextInput::with_value(&m.to_string()),
            seconds: TextInput::with_value(&s.to_string()),
            focused: DraftField::Name,
            error: None,
            original_name: timer.name.clone(),
            original_description: description,
            original_elapsed: elapsed,
            duration_edited: false,
        }
    }

    pub fn focused_input(&mut self) -> &mut TextInput {
        match self.focused {
            DraftField::Name => &mut self.name,
            DraftField::Description => &mut self.description,
            DraftField::Hours => &mut self.hours,
            DraftField::Minutes => &mut self.minutes,
            DraftField::Seconds => &mut self.seconds,
        }
    }

    pub fn input_char(&mut self, c: char) {
        if self.focused.is_numeric() {
            let before = self.focused_input().value.len();
            self.focused_input().insert_digit(c);
            self.duration_edited |= self.focused_input().value.len() != before;
        } else {
            self.focused_input().insert(c);
        }
        self.error = None;
    }

    pub fn backspace(&mut self) {
        let input = self.focused_input();
        let before = input.value.len();
        input.backspace();
        let changed = input.value.len() != before;
        self.duration_edited |= changed && self.focused.is_numeric();
    }

    pub fn elapsed(&self) -> Result<u64, FormError> {
        Ok(parse_hms(
            &self.hours.value,
            &self.minutes.value,
            &self.seconds.value,
        )?)
    }

    /// Only the fields that differ from the snapshot the draft was built from.
    /// A duration typed into the form is always sent, even when it matches
    /// the value shown when editing started.
    pub fn to_edit(&self) -> Result<TimerEdit, FormError> {
        let elapsed = self.elapsed()?;
        let mut edit = TimerEdit::default();
        if self.name.value != self.original_name {
            edit.name = Some(self.name.value.clone());
        }
        if self.description.value != self.original_description {
            edit.description = Some(self.description.value.clone());
        }
        if self.duration_edited || elapsed != self.original_elapsed {
            edit.elapsed = Some(elapsed);
        }
        Ok(edit)
    }
}

/// Display mode of a timer card.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CardMode {
    #[default]
    Viewing,
    Editing(TimerDraft),
}

impl CardMode {
    pub fn is_editing(&self) -> bool {
        matches!(self, CardMode::Editing(_))
    }

    pub fn draft_mut(&mut self) -> Option<&mut TimerDraft> {
        match self {
            CardMode::Editing(draft) => Some(draft),
            CardMode::Viewing => None,
        }
    }
}
