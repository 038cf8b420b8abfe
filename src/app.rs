use crate::config::Settings;
use crate::input::Action;
use crate::model::{CommandTemplate, ListingResult, MainAction, ResourceKind};
use chrono::{DateTime, Local};
use tracing::debug;

/// The navigation screen currently shown. Execution of a filled template is
/// awaited inline by the event loop, so there is no stored Executing state;
/// the machine has already returned to the main menu when the command runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuState {
    MainMenu,
    ResourceList {
        action: MainAction,
        kind: ResourceKind,
        template: CommandTemplate,
        items: Vec<String>,
    },
    Notice {
        message: String,
    },
}

/// Work the event loop performs on behalf of a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    None,
    StartListing {
        action: MainAction,
        kind: ResourceKind,
        template: CommandTemplate,
    },
    Execute {
        command: String,
    },
}

pub struct App {
    running: bool,
    state: MenuState,
    selected: usize,
    status: String,
    status_at: Option<DateTime<Local>>,
    settings: Settings,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        Self {
            running: true,
            state: MenuState::MainMenu,
            selected: 0,
            status: "Ready".to_string(),
            status_at: None,
            settings,
        }
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn state(&self) -> &MenuState {
        &self.state
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn status_at(&self) -> Option<DateTime<Local>> {
        self.status_at
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn notice_active(&self) -> bool {
        matches!(self.state, MenuState::Notice { .. })
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.status_at = Some(Local::now());
    }

    pub fn apply_action(&mut self, action: Action) -> AppCommand {
        if self.notice_active() {
            // The empty-list notice accepts no input; it auto-dismisses.
            return AppCommand::None;
        }

        match action {
            Action::Quit => {
                self.running = false;
                AppCommand::None
            }
            Action::Up => {
                self.selected = self.selected.saturating_sub(1);
                AppCommand::None
            }
            Action::Down => {
                let floor = self.item_count().saturating_sub(1);
                self.selected = (self.selected + 1).min(floor);
                AppCommand::None
            }
            Action::Cancel => {
                // The main menu itself has no cancel.
                if matches!(self.state, MenuState::ResourceList { .. }) {
                    self.return_to_main();
                }
                AppCommand::None
            }
            Action::Select => self.select_current(),
        }
    }

    /// Routes a finished listing: fewer than 2 usable records means "no
    /// resources" (the floor the raw output's header and trailing artifact
    /// impose even when nothing exists), otherwise a selectable list.
    pub fn finish_listing(
        &mut self,
        action: MainAction,
        kind: ResourceKind,
        template: CommandTemplate,
        result: ListingResult,
    ) {
        let usable = result.usable_records(kind);
        debug!(
            "{} listing: {} raw lines, {} usable",
            kind.title(),
            result.raw_line_count,
            usable.len()
        );

        if usable.len() < 2 {
            self.state = MenuState::Notice {
                message: format!("No {} found", kind.title().to_ascii_lowercase()),
            };
            self.selected = 0;
            return;
        }

        let items = usable
            .iter()
            .map(|record| kind.menu_line(record))
            .collect::<Vec<_>>();
        self.state = MenuState::ResourceList {
            action,
            kind,
            template,
            items,
        };
        self.selected = 0;
    }

    pub fn dismiss_notice(&mut self) {
        if self.notice_active() {
            self.return_to_main();
        }
    }

    fn select_current(&mut self) -> AppCommand {
        match &self.state {
            MenuState::MainMenu => {
                let action = MainAction::ALL[self.selected.min(MainAction::ALL.len() - 1)];
                let (Some(kind), Some(template)) =
                    (action.kind(), action.template(&self.settings))
                else {
                    self.running = false;
                    return AppCommand::None;
                };
                self.set_status(format!("Listing {}…", kind.title().to_ascii_lowercase()));
                AppCommand::StartListing {
                    action,
                    kind,
                    template,
                }
            }
            MenuState::ResourceList {
                template, items, ..
            } => {
                let picked = items
                    .get(self.selected)
                    .and_then(|line| line.split_whitespace().next())
                    .map(|identifier| template.fill(identifier));
                let Some(command) = picked else {
                    return AppCommand::None;
                };
                self.return_to_main();
                self.set_status(format!("Running: {command}"));
                AppCommand::Execute { command }
            }
            MenuState::Notice { .. } => AppCommand::None,
        }
    }

    fn return_to_main(&mut self) {
        self.state = MenuState::MainMenu;
        self.selected = 0;
    }

    fn item_count(&self) -> usize {
        match &self.state {
            MenuState::MainMenu => MainAction::ALL.len(),
            MenuState::ResourceList { items, .. } => items.len(),
            MenuState::Notice { .. } => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{App, AppCommand, MenuState};
    use crate::config::Settings;
    use crate::input::Action;
    use crate::model::{CommandTemplate, ListingResult, MainAction, ResourceKind};

    fn app() -> App {
        App::new(Settings::default())
    }

    fn listing(lines: &[&str]) -> ListingResult {
        let records = lines.iter().map(|line| line.to_string()).collect::<Vec<_>>();
        ListingResult {
            raw_line_count: records.len(),
            records,
        }
    }

    fn select_main_action(app: &mut App, target: MainAction) -> AppCommand {
        let position = MainAction::ALL
            .iter()
            .position(|action| *action == target)
            .expect("known action");
        for _ in 0..position {
            app.apply_action(Action::Down);
        }
        app.apply_action(Action::Select)
    }

    #[test]
    fn remove_container_starts_a_container_listing() {
        let mut app = app();
        let command = select_main_action(&mut app, MainAction::RemoveContainer);
        assert_eq!(
            command,
            AppCommand::StartListing {
                action: MainAction::RemoveContainer,
                kind: ResourceKind::Containers,
                template: CommandTemplate::new("docker rm #"),
            }
        );
    }

    #[test]
    fn exit_stops_the_machine_without_side_effects() {
        let mut app = app();
        let command = select_main_action(&mut app, MainAction::Exit);
        assert_eq!(command, AppCommand::None);
        assert!(!app.running());
    }

    #[test]
    fn three_data_rows_present_three_selectable_items() {
        let mut app = app();
        app.finish_listing(
            MainAction::RemoveContainer,
            ResourceKind::Containers,
            CommandTemplate::new("docker rm #"),
            listing(&[
                "CONTAINER ID,IMAGE,COMMAND,CREATED,STATUS,NAMES,SIZE",
                "aaa111,nginx,\"/run\",1 day ago,Up 1 hour,web,10MB",
                "bbb222,redis,\"/run\",2 days ago,Exited (0),cache,20MB",
                "ccc333,postgres,\"/run\",3 days ago,Up 2 days,db,30MB",
                "",
            ]),
        );
        let MenuState::ResourceList { items, .. } = app.state() else {
            panic!("expected a selectable list, got {:?}", app.state());
        };
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn selecting_item_two_fills_the_template_with_its_identifier() {
        let mut app = app();
        app.finish_listing(
            MainAction::RemoveContainer,
            ResourceKind::Containers,
            CommandTemplate::new("docker rm #"),
            listing(&[
                "CONTAINER ID,IMAGE,COMMAND,CREATED,STATUS,NAMES,SIZE",
                "aaa111,nginx,\"/run\",1 day ago,Up 1 hour,web,10MB",
                "bbb222,redis,\"/run\",2 days ago,Exited (0),cache,20MB",
                "ccc333,postgres,\"/run\",3 days ago,Up 2 days,db,30MB",
                "",
            ]),
        );
        app.apply_action(Action::Down);
        let command = app.apply_action(Action::Select);
        assert_eq!(
            command,
            AppCommand::Execute {
                command: "docker rm bbb222".to_string()
            }
        );
        assert_eq!(app.state(), &MenuState::MainMenu);
    }

    #[test]
    fn cancel_returns_to_main_without_executing() {
        let mut app = app();
        app.finish_listing(
            MainAction::RemoveVolume,
            ResourceKind::Volumes,
            CommandTemplate::new("docker volume rm #"),
            listing(&["vol-a", "vol-b", ""]),
        );
        let command = app.apply_action(Action::Cancel);
        assert_eq!(command, AppCommand::None);
        assert_eq!(app.state(), &MenuState::MainMenu);
    }

    #[test]
    fn one_usable_record_routes_to_the_notice() {
        let mut app = app();
        app.finish_listing(
            MainAction::RemoveVolume,
            ResourceKind::Volumes,
            CommandTemplate::new("docker volume rm #"),
            listing(&["vol-only", ""]),
        );
        assert!(app.notice_active());
    }

    #[test]
    fn two_usable_records_route_to_the_list() {
        let mut app = app();
        app.finish_listing(
            MainAction::RemoveVolume,
            ResourceKind::Volumes,
            CommandTemplate::new("docker volume rm #"),
            listing(&["vol-a", "vol-b", ""]),
        );
        assert!(matches!(app.state(), MenuState::ResourceList { .. }));
    }

    #[test]
    fn spawn_failure_looks_like_no_resources() {
        // A failed listing yields only the trailing split artifact.
        let mut app = app();
        app.finish_listing(
            MainAction::RemoveImage,
            ResourceKind::Images,
            CommandTemplate::new("docker rmi #"),
            listing(&[""]),
        );
        assert!(app.notice_active());
    }

    #[test]
    fn notice_ignores_input_until_dismissed() {
        let mut app = app();
        app.finish_listing(
            MainAction::RemoveImage,
            ResourceKind::Images,
            CommandTemplate::new("docker rmi #"),
            listing(&[""]),
        );
        assert_eq!(app.apply_action(Action::Select), AppCommand::None);
        assert_eq!(app.apply_action(Action::Cancel), AppCommand::None);
        assert!(app.notice_active());
        app.dismiss_notice();
        assert_eq!(app.state(), &MenuState::MainMenu);
    }

    #[test]
    fn selection_clamps_to_menu_bounds() {
        let mut app = app();
        for _ in 0..20 {
            app.apply_action(Action::Down);
        }
        assert_eq!(app.selected(), MainAction::ALL.len() - 1);
        for _ in 0..20 {
            app.apply_action(Action::Up);
        }
        assert_eq!(app.selected(), 0);
    }

    #[test]
    fn export_selection_substitutes_both_placeholders() {
        let mut app = app();
        app.finish_listing(
            MainAction::ExportVolume,
            ResourceKind::Volumes,
            MainAction::ExportVolume
                .template(&Settings::default())
                .expect("export template"),
            listing(&["vol1", "vol2", ""]),
        );
        let command = app.apply_action(Action::Select);
        assert_eq!(
            command,
            AppCommand::Execute {
                command: "docker run --rm -v vol1:/workspaces busybox \
                          tar -C /workspaces -zcf - . > vol1.tgz"
                    .to_string()
            }
        );
    }
}
