use timekeep::domain::{Category, CategoryId, Project, ProjectId, TimerId};
use timekeep::dto::ProjectInput;

use super::state::{FormError, TextInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectField {
    Name,
    Description,
    Category,
}

/// Create/edit project form.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectForm {
    /// `Some` when editing an existing project.
    pub editing: Option<ProjectId>,
    pub name: TextInput,
    pub description: TextInput,
    pub category: Option<CategoryId>,
    pub focused: ProjectField,
    pub error: Option<String>,
}

impl ProjectForm {
    pub fn create(category: Option<CategoryId>) -> Self {
        Self {
            editing: None,
            name: TextInput::new(),
            description: TextInput::new(),
            category,
            focused: ProjectField::Name,
            error: None,
        }
    }

    pub fn edit(project: &Project) -> Self {
        Self {
            editing: Some(project.id.clone()),
            name: TextInput::with_value(&project.name),
            description: TextInput::with_value(project.description.as_deref().unwrap_or("")),
            category: project.category_id().cloned(),
            focused: ProjectField::Name,
            error: None,
        }
    }

    pub fn title(&self) -> &'static str {
        if self.editing.is_some() {
            "Редактировать проект"
        } else {
            "Создать проект"
        }
    }

    pub fn next_field(&mut self) {
        self.focused = match self.focused {
            ProjectField::Name => ProjectField::Description,
            ProjectField::Description => ProjectField::Category,
            ProjectField::Category => ProjectField::Name,
        };
    }

    pub fn previous_field(&mut self) {
        self.focused = match self.focused {
            ProjectField::Name => ProjectField::Category,
            ProjectField::Description => ProjectField::Name,
            ProjectField::Category => ProjectField::Description,
        };
    }

    pub fn focused_input(&mut self) -> Option<&mut TextInput> {
        match self.focused {
            ProjectField::Name => Some(&mut self.name),
            ProjectField::Description => Some(&mut self.description),
            ProjectField::Category => None,
        }
    }

    /// Cycle through "no category" and each category.
    pub fn cycle_category(&mut self, categories: &[Category], forward: bool) {
        let count = categories.len() + 1;
        let current = match &self.category {
            None => 0,
            Some(id) => categories
                .iter()
                .position(|c| &c.id == id)
                .map_or(0, |i| i + 1),
        };
        let next = if forward {
            (current + 1) % count
        } else {
            (current + count - 1) % count
        };
        self.category = if next == 0 {
            None
        } else {
            Some(categories[next - 1].id.clone())
        };
    }

    pub fn category_label<'a>(&self, categories: &'a [Category]) -> &'a str {
        self.category
            .as_ref()
            .and_then(|id| categories.iter().find(|c| &c.id == id))
            .map_or("Без категории", |c| c.name.as_str())
    }

    pub fn to_input(&self) -> Result<ProjectInput, FormError> {
        if self.name.is_blank() {
            return Err(FormError::Required("Название"));
        }
        Ok(ProjectInput::new(self.name.trimmed())
            .with_description(self.description.value.clone())
            .with_category(self.category.clone()))
    }
}

/// Single-field name form, used for new categories and new timers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NameForm {
    pub name: TextInput,
    pub error: Option<String>,
}

impl NameForm {
    pub fn value(&self) -> Result<String, FormError> {
        if self.name.is_blank() {
            return Err(FormError::Required("Название"));
        }
        Ok(self.name.trimmed().to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmKind {
    DeleteProject(ProjectId),
    DeleteCategory(CategoryId),
    DeleteTimer {
        project_id: ProjectId,
        timer_id: TimerId,
    },
    MarkAllPaid(ProjectId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Confirm {
    pub kind: ConfirmKind,
    /// Name of the thing being acted on.
    pub subject: String,
}

impl Confirm {
    pub fn title(&self) -> &'static str {
        match self.kind {
            ConfirmKind::DeleteProject(_) => "Удалить проект?",
            ConfirmKind::DeleteCategory(_) => "Удалить категорию?",
            ConfirmKind::DeleteTimer { .. } => "Удалить таймер?",
            ConfirmKind::MarkAllPaid(_) => "Подтверждение",
        }
    }

    pub fn question(&self) -> String {
        match self.kind {
            ConfirmKind::MarkAllPaid(_) => {
                "Вы уверены, что хотите отметить все таймеры этого проекта как оплаченные?"
                    .to_string()
            }
            _ => self.subject.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    Project(ProjectForm),
    Category(NameForm),
    Timer { project_id: ProjectId, form: NameForm },
    Confirm(Confirm),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Vec<Category> {
        vec![Category::new("c1", "Клиенты"), Category::new("c2", "Личное")]
    }

    #[test]
    fn project_name_is_required() {
        let mut form = ProjectForm::create(None);
        form.name = TextInput::with_value("   ");
        assert_eq!(form.to_input(), Err(FormError::Required("Название")));

        form.name = TextInput::with_value(" Сайт ");
        form.description = TextInput::with_value("");
        let input = form.to_input().unwrap();
        assert_eq!(input.name, "Сайт");
        assert_eq!(input.description, None);
    }

    #[test]
    fn category_choice_cycles_through_none() {
        let cats = categories();
        let mut form = ProjectForm::create(None);
        assert_eq!(form.category_label(&cats), "Без категории");

        form.cycle_category(&cats, true);
        assert_eq!(form.category_label(&cats), "Клиенты");
        form.cycle_category(&cats, true);
        form.cycle_category(&cats, true);
        assert_eq!(form.category, None);
        form.cycle_category(&cats, false);
        assert_eq!(form.category, Some(CategoryId::new("c2")));
    }

    #[test]
    fn edit_form_is_prefilled() {
        let project = Project::new("p1", "Сайт")
            .with_description("Лендинг")
            .with_category(Category::new("c1", "Клиенты"));
        let form = ProjectForm::edit(&project);
        assert_eq!(form.title(), "Редактировать проект");
        assert_eq!(form.description.value, "Лендинг");
        assert_eq!(form.category, Some(CategoryId::new("c1")));
    }
}
