use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use timekeep::domain::{Category, CategoryId, Project};

use super::state::TextInput;

/// Project list screen: category filter bar, fuzzy search and selection.
#[derive(Debug, Clone, Default)]
pub struct ProjectsScreen {
    pub categories: Vec<Category>,
    pub projects: Vec<Project>,
    /// `None` shows every project.
    pub category_filter: Option<CategoryId>,
    pub search: TextInput,
    pub searching: bool,
    /// Indices into `projects`, best match first.
    pub filtered: Vec<usize>,
    pub selected: usize,
    pub loaded: bool,
}

impl ProjectsScreen {
    pub fn set_categories(&mut self, categories: Vec<Category>) {
        let vanished = self
            .category_filter
            .as_ref()
            .is_some_and(|filter| !categories.iter().any(|c| &c.id == filter));
        self.categories = categories;
        if vanished {
            self.set_filter_position(0);
        }
    }

    pub fn set_projects(&mut self, projects: Vec<Project>) {
        let selected_id = self.selected_project().map(|p| p.id.clone());
        self.projects = projects;
        self.loaded = true;
        self.refilter();
        if let Some(id) = selected_id {
            if let Some(pos) = self.filtered.iter().position(|&i| self.projects[i].id == id) {
                self.selected = pos;
            }
        }
    }

    /// Filter tabs: "Все" first, then every category.
    pub fn filter_tabs(&self) -> Vec<(Option<&CategoryId>, &str)> {
        std::iter::once((None, "Все"))
            .chain(
                self.categories
                    .iter()
                    .map(|c| (Some(&c.id), c.name.as_str())),
            )
            .collect()
    }

    fn filter_position(&self) -> usize {
        match &self.category_filter {
            None => 0,
            Some(id) => self
                .categories
                .iter()
                .position(|c| &c.id == id)
                .map_or(0, |i| i + 1),
        }
    }

    fn set_filter_position(&mut self, pos: usize) -> bool {
        let filter = if pos == 0 {
            None
        } else {
            self.categories.get(pos - 1).map(|c| c.id.clone())
        };
        if filter == self.category_filter {
            return false;
        }
        self.category_filter = filter;
        self.projects.clear();
        self.filtered.clear();
        self.selected = 0;
        self.loaded = false;
        true
    }

    /// Returns whether the filter changed and projects must be reloaded.
    pub fn next_category(&mut self) -> bool {
        let count = self.categories.len() + 1;
        self.set_filter_position((self.filter_position() + 1) % count)
    }

    pub fn previous_category(&mut self) -> bool {
        let count = self.categories.len() + 1;
        self.set_filter_position((self.filter_position() + count - 1) % count)
    }

    pub fn selected_category(&self) -> Option<&Category> {
        let id = self.category_filter.as_ref()?;
        self.categories.iter().find(|c| &c.id == id)
    }

    pub fn refilter(&mut self) {
        if self.search.is_blank() {
            self.filtered = (0..self.projects.len()).collect();
        } else {
            let matcher = SkimMatcherV2::default();
            let query = self.search.trimmed();
            let mut scored: Vec<(usize, i64)> = self
                .projects
                .iter()
                .enumerate()
                .filter_map(|(i, project)| {
                    matcher
                        .fuzzy_match(&project.name, query)
                        .map(|score| (i, score))
                })
                .collect();
            scored.sort_by(|a, b| b.1.cmp(&a.1));
            self.filtered = scored.into_iter().map(|(i, _)| i).collect();
        }
        if self.selected >= self.filtered.len() {
            self.selected = self.filtered.len().saturating_sub(1);
        }
    }

    pub fn visible_projects(&self) -> impl Iterator<Item = &Project> {
        self.filtered.iter().map(|&i| &self.projects[i])
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.filtered
            .get(self.selected)
            .and_then(|&i| self.projects.get(i))
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.filtered.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn search_input_char(&mut self, c: char) {
        self.search.insert(c);
        self.selected = 0;
        self.refilter();
    }

    pub fn search_input_backspace(&mut self) {
        self.search.backspace();
        self.refilter();
    }

    pub fn search_input_clear(&mut self) {
        self.search.clear();
        self.refilter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> ProjectsScreen {
        let mut screen = ProjectsScreen::default();
        screen.set_categories(vec![
            Category::new("c1", "Клиенты"),
            Category::new("c2", "Личное"),
        ]);
        screen.set_projects(vec![
            Project::new("p1", "Интернет-магазин"),
            Project::new("p2", "Блог"),
            Project::new("p3", "Мобильное приложение"),
        ]);
        screen
    }

    #[test]
    fn fuzzy_search_narrows_the_list() {
        let mut screen = screen();
        for c in "лог".chars() {
            screen.search_input_char(c);
        }
        let names: Vec<&str> = screen.visible_projects().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Блог"]);

        screen.search_input_clear();
        assert_eq!(screen.visible_projects().count(), 3);
    }

    #[test]
    fn category_tabs_wrap_around() {
        let mut screen = screen();
        assert_eq!(screen.filter_tabs().len(), 3);

        assert!(screen.next_category());
        assert_eq!(screen.category_filter, Some(CategoryId::new("c1")));
        assert!(!screen.loaded);

        assert!(screen.previous_category());
        assert_eq!(screen.category_filter, None);
        assert!(screen.previous_category());
        assert_eq!(screen.category_filter, Some(CategoryId::new("c2")));
    }

    #[test]
    fn deleted_category_resets_the_filter() {
        let mut screen = screen();
        screen.next_category();
        screen.set_categories(vec![Category::new("c2", "Личное")]);
        assert_eq!(screen.category_filter, None);
        assert!(!screen.loaded);
    }

    #[test]
    fn selection_survives_a_reload() {
        let mut screen = screen();
        screen.select_next();
        screen.select_next();
        assert_eq!(screen.selected_project().unwrap().id.as_str(), "p3");

        screen.set_projects(vec![
            Project::new("p3", "Мобильное приложение"),
            Project::new("p1", "Интернет-магазин"),
        ]);
        assert_eq!(screen.selected_project().unwrap().id.as_str(), "p3");
    }
}
