//! In-memory stand-in for the backend, used by `dev` mode and tests.
//!
//! It mirrors the backend's observable rules closely enough to exercise the
//! client: pause segments are folded into `totalPause` on resume or stop,
//! project totals and statistics are derived from the stored timers.

use std::sync::{Arc, Mutex, MutexGuard};

use time::{Duration, OffsetDateTime};

use crate::domain::{
    paid_status, Category, CategoryId, PaidFilter, PaidStatus, Period, Project, ProjectDetail,
    ProjectId, ProjectStat, Statistics, Timer, TimerId, TimerStat,
};
use crate::dto::{ProjectInput, UpdateTimerRequest};
use crate::elapsed::{elapsed_seconds, floor_seconds};
use crate::error::{Error, Result};

pub const DEV_EMAIL: &str = "dev@localhost";
pub const DEV_PASSWORD: &str = "dev";

#[derive(Debug, Clone)]
pub struct DevBackend {
    state: Arc<Mutex<DevState>>,
}

#[derive(Debug, Default)]
struct DevState {
    users: Vec<(String, String)>,
    categories: Vec<Category>,
    projects: Vec<DevProject>,
    timers: Vec<Timer>,
    next_id: u64,
    frozen_now: Option<OffsetDateTime>,
}

#[derive(Debug, Clone)]
struct DevProject {
    id: ProjectId,
    name: String,
    description: Option<String>,
    category_id: Option<CategoryId>,
}

impl DevState {
    fn now(&self) -> OffsetDateTime {
        self.frozen_now.unwrap_or_else(OffsetDateTime::now_utc)
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }

    fn project(&self, id: &ProjectId) -> Result<&DevProject> {
        self.projects
            .iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| Error::NotFound("Проект не найден".to_string()))
    }

    fn timer_mut(&mut self, id: &TimerId) -> Result<&mut Timer> {
        self.timers
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| Error::NotFound("Таймер не найден".to_string()))
    }

    fn project_timers(&self, id: &ProjectId) -> Vec<Timer> {
        self.timers
            .iter()
            .filter(|t| t.project_id.as_ref() == Some(id))
            .cloned()
            .collect()
    }

    fn to_project(&self, project: &DevProject) -> Project {
        let now = self.now();
        let timers = self.project_timers(&project.id);
        Project {
            id: project.id.clone(),
            name: project.name.clone(),
            description: project.description.clone(),
            category_id: project.category_id.clone(),
            category: project
                .category_id
                .as_ref()
                .and_then(|id| self.category(id))
                .cloned(),
            total_time: timers.iter().map(|t| elapsed_seconds(t, now) as i64).sum(),
            is_paid: paid_status(&timers) == Some(PaidStatus::Paid),
        }
    }
}

fn fold_pause(timer: &mut Timer, now: OffsetDateTime) {
    if let Some(paused_at) = timer.current_pause_start() {
        timer.total_pause += floor_seconds(now - paused_at).max(0);
    }
    timer.is_paused = false;
    timer.paused_at = None;
}

impl Default for DevBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DevBackend {
    /// Backend seeded with a dev user and a few projects and timers.
    pub fn new() -> Self {
        let backend = Self::empty();
        backend.seed();
        backend
    }

    /// Backend with only the dev user.
    pub fn empty() -> Self {
        Self {
            state: Arc::new(Mutex::new(DevState {
                users: vec![(DEV_EMAIL.to_string(), DEV_PASSWORD.to_string())],
                ..Default::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DevState> {
        self.state.lock().expect("dev store lock poisoned")
    }

    /// Freeze the clock used for timer bookkeeping.
    pub fn freeze_clock(&self, now: OffsetDateTime) {
        self.lock().frozen_now = Some(now);
    }

    pub fn advance_clock(&self, by: Duration) {
        let mut state = self.lock();
        let now = state.now();
        state.frozen_now = Some(now + by);
    }

    pub fn now(&self) -> OffsetDateTime {
        self.lock().now()
    }

    pub fn login(&self, email: &str, password: &str) -> Result<String> {
        let state = self.lock();
        if state
            .users
            .iter()
            .any(|(e, p)| e == email && p == password)
        {
            Ok(format!("dev-token:{}", email))
        } else {
            Err(Error::Unauthorized("Неверный email или пароль".to_string()))
        }
    }

    pub fn register(&self, email: &str, password: &str) -> Result<String> {
        let mut state = self.lock();
        if state.users.iter().any(|(e, _)| e == email) {
            return Err(Error::Conflict(
                "Пользователь с таким email уже существует".to_string(),
            ));
        }
        state.users.push((email.to_string(), password.to_string()));
        Ok(format!("dev-token:{}", email))
    }

    pub fn categories(&self) -> Vec<Category> {
        self.lock().categories.clone()
    }

    pub fn create_category(&self, name: &str) -> Category {
        let mut state = self.lock();
        let id = state.next_id("cat");
        let category = Category::new(id, name);
        state.categories.push(category.clone());
        category
    }

    pub fn delete_category(&self, id: &CategoryId) -> Result<()> {
        let mut state = self.lock();
        let before = state.categories.len();
        state.categories.retain(|c| &c.id != id);
        if state.categories.len() == before {
            return Err(Error::NotFound("Категория не найдена".to_string()));
        }
        for project in state.projects.iter_mut() {
            if project.category_id.as_ref() == Some(id) {
                project.category_id = None;
            }
        }
        Ok(())
    }

    pub fn projects(&self, category: Option<&CategoryId>) -> Vec<Project> {
        let state = self.lock();
        state
            .projects
            .iter()
            .filter(|p| category.is_none() || p.category_id.as_ref() == category)
            .map(|p| state.to_project(p))
            .collect()
    }

    pub fn project(&self, id: &ProjectId) -> Result<Project> {
        let state = self.lock();
        let project = state.project(id)?;
        Ok(state.to_project(project))
    }

    pub fn project_detail(&self, id: &ProjectId) -> Result<ProjectDetail> {
        let state = self.lock();
        let project = state.project(id)?;
        Ok(ProjectDetail {
            id: project.id.clone(),
            name: project.name.clone(),
            description: project.description.clone(),
            category_id: project.category_id.clone(),
            timers: state.project_timers(id),
        })
    }

    pub fn create_project(&self, input: &ProjectInput) -> Result<Project> {
        if input.name.trim().is_empty() {
            return Err(Error::Validation("name should not be empty".to_string()));
        }
        let mut state = self.lock();
        let id = ProjectId::new(state.next_id("proj"));
        let project = DevProject {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            category_id: input.category_id.clone(),
        };
        let created = state.to_project(&project);
        state.projects.push(project);
        Ok(created)
    }

    pub fn update_project(&self, id: &ProjectId, input: &ProjectInput) -> Result<Project> {
        let mut state = self.lock();
        let project = state
            .projects
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| Error::NotFound("Проект не найден".to_string()))?;
        project.name = input.name.clone();
        project.description = input.description.clone();
        project.category_id = input.category_id.clone();
        let project = project.clone();
        Ok(state.to_project(&project))
    }

    pub fn delete_project(&self, id: &ProjectId) -> Result<()> {
        let mut state = self.lock();
        state.project(id)?;
        state.projects.retain(|p| &p.id != id);
        state.timers.retain(|t| t.project_id.as_ref() != Some(id));
        Ok(())
    }

    pub fn timers(&self) -> Vec<Timer> {
        self.lock().timers.clone()
    }

    pub fn create_timer(&self, name: &str, project_id: &ProjectId) -> Result<Timer> {
        let mut state = self.lock();
        state.project(project_id)?;
        let id = state.next_id("timer");
        let timer = Timer::new(id, name, state.now()).with_project(project_id.clone());
        state.timers.push(timer.clone());
        Ok(timer)
    }

    pub fn pause_timer(&self, id: &TimerId) -> Result<Timer> {
        let mut state = self.lock();
        let now = state.now();
        let timer = state.timer_mut(id)?;
        if !timer.is_running() {
            return Err(Error::Conflict("Таймер не запущен".to_string()));
        }
        timer.is_paused = true;
        timer.paused_at = Some(now);
        Ok(timer.clone())
    }

    pub fn resume_timer(&self, id: &TimerId) -> Result<Timer> {
        let mut state = self.lock();
        let now = state.now();
        let timer = state.timer_mut(id)?;
        if !timer.is_open() || !timer.is_paused {
            return Err(Error::Conflict("Таймер не на паузе".to_string()));
        }
        fold_pause(timer, now);
        Ok(timer.clone())
    }

    pub fn stop_timer(&self, id: &TimerId) -> Result<Timer> {
        let mut state = self.lock();
        let now = state.now();
        let timer = state.timer_mut(id)?;
        if !timer.is_open() {
            return Err(Error::Conflict("Таймер уже остановлен".to_string()));
        }
        fold_pause(timer, now);
        timer.end_time = Some(now);
        Ok(timer.clone())
    }

    pub fn update_timer(&self, id: &TimerId, update: &UpdateTimerRequest) -> Result<Timer> {
        let mut state = self.lock();
        let timer = state.timer_mut(id)?;
        if let Some(name) = &update.name {
            timer.name = name.clone();
        }
        if let Some(description) = &update.description {
            timer.description = Some(description.clone());
        }
        if let Some(start_time) = update.start_time {
            timer.start_time = start_time;
        }
        if let Some(is_paid) = update.is_paid {
            timer.is_paid = is_paid;
        }
        if let Some(is_logged) = update.is_logged {
            timer.is_logged = is_logged;
        }
        Ok(timer.clone())
    }

    pub fn delete_timer(&self, id: &TimerId) -> Result<()> {
        let mut state = self.lock();
        state.timer_mut(id)?;
        state.timers.retain(|t| &t.id != id);
        Ok(())
    }

    pub fn mark_all_paid(&self, project_id: &ProjectId) -> Result<()> {
        let mut state = self.lock();
        state.project(project_id)?;
        for timer in state
            .timers
            .iter_mut()
            .filter(|t| t.project_id.as_ref() == Some(project_id))
        {
            timer.is_paid = true;
        }
        Ok(())
    }

    pub fn statistics(&self, period: Period, filter: PaidFilter) -> Statistics {
        let state = self.lock();
        let now = state.now();
        let since = match period {
            Period::Week => Some(now - Duration::days(7)),
            Period::Month => Some(now - Duration::days(30)),
            Period::Year => Some(now - Duration::days(365)),
            Period::All => None,
        };

        let in_period = |t: &&Timer| since.map_or(true, |since| t.start_time >= since);

        let mut stats = Statistics::default();
        for timer in state.timers.iter().filter(in_period) {
            let secs = elapsed_seconds(timer, now) as i64;
            stats.total_time += secs;
            if timer.is_paid {
                stats.total_paid_time += secs;
            } else {
                stats.total_unpaid_time += secs;
            }
        }

        for project in &state.projects {
            let timers: Vec<TimerStat> = state
                .timers
                .iter()
                .filter(in_period)
                .filter(|t| t.project_id.as_ref() == Some(&project.id))
                .filter(|t| filter.accepts(t.is_paid))
                .map(|t| TimerStat {
                    id: t.id.clone(),
                    name: t.name.clone(),
                    time: elapsed_seconds(t, now) as i64,
                    is_paid: t.is_paid,
                    start_time: t.start_time,
                    end_time: t.end_time,
                })
                .collect();
            if timers.is_empty() {
                continue;
            }
            stats.project_stats.push(ProjectStat {
                id: project.id.clone(),
                name: project.name.clone(),
                total_time: timers.iter().map(|t| t.time).sum(),
                is_paid: timers.iter().all(|t| t.is_paid),
                timers,
            });
        }
        stats
    }

    fn seed(&self) {
        let clients = self.create_category("Клиенты");
        let own = self.create_category("Личное");

        let mut guard = self.lock();
        let state = &mut *guard;
        let now = state.now();
        let project = |state: &mut DevState, name: &str, desc: &str, cat: &Category| {
            let id = ProjectId::new(state.next_id("proj"));
            state.projects.push(DevProject {
                id: id.clone(),
                name: name.to_string(),
                description: Some(desc.to_string()),
                category_id: Some(cat.id.clone()),
            });
            id
        };
        let shop = project(state, "Интернет-магазин", "Вёрстка и интеграция оплаты", &clients);
        let blog = project(state, "Блог", "Личный сайт", &own);

        let timer = |state: &mut DevState,
                     project: &ProjectId,
                     name: &str,
                     build: &dyn Fn(Timer) -> Timer| {
            let id = state.next_id("timer");
            let base = Timer::new(id, name, now).with_project(project.clone());
            state.timers.push(build(base));
        };
        timer(state, &shop, "Каталог товаров", &|t| {
            Timer {
                start_time: now - Duration::days(2) - Duration::hours(3),
                ..t
            }
            .with_total_pause(900)
            .ended_at(now - Duration::days(2))
            .with_paid(true)
        });
        timer(state, &shop, "Оплата", &|t| {
            Timer {
                start_time: now - Duration::hours(2),
                ..t
            }
            .with_total_pause(300)
        });
        timer(state, &blog, "Статья", &|t| {
            Timer {
                start_time: now - Duration::minutes(50),
                ..t
            }
            .paused_since(now - Duration::minutes(5))
        });
    }
}
