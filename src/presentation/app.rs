// Interactive terminal router over the login, dashboard and device pages
use crate::application::dashboard_service::DashboardService;
use crate::application::device_statistics_service::DeviceStatisticsService;
use crate::application::login_service::LoginService;
use crate::application::navigation::{Navigator, Route};
use crate::application::session::Session;
use crate::presentation::commands::{parse_command, DashboardCommand, HELP};
use crate::presentation::render::{DashboardView, DeviceStatisticsPage};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::mpsc;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Hands route changes requested by services to the router loop.
pub struct ChannelNavigator {
    routes: mpsc::UnboundedSender<Route>,
}

impl ChannelNavigator {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Route>) {
        let (routes, receiver) = mpsc::unbounded_channel();
        (Self { routes }, receiver)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, route: Route) {
        tracing::debug!("Navigating to {}", route.path());
        if self.routes.send(route).is_err() {
            tracing::debug!("Router closed, dropping navigation");
        }
    }
}

pub struct App {
    pub session: Arc<Session>,
    pub login: LoginService,
    pub dashboard: DashboardService,
    pub device_statistics: DeviceStatisticsService,
    pub routes: mpsc::UnboundedReceiver<Route>,
}

impl App {
    /// Run pages until the user quits or input ends.
    pub async fn run<R>(mut self, reader: R) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut input = reader.lines();
        let mut route = if self.session.is_authenticated() {
            Route::Dashboard
        } else {
            Route::Login
        };

        loop {
            tracing::info!("Page {}", route.path());
            let next = match route {
                Route::Login => self.login_page(&mut input).await?,
                Route::Dashboard => self.dashboard_page(&mut input).await?,
                Route::DeviceStatistics { query } => self.device_page(&query, &mut input).await?,
            };
            match next {
                Some(next) => route = next,
                None => return Ok(()),
            }
        }
    }

    async fn login_page<R>(&mut self, input: &mut Lines<R>) -> anyhow::Result<Option<Route>>
    where
        R: AsyncBufRead + Unpin,
    {
        println!("Admin Login");
        loop {
            println!("Username:");
            let Some(username) = input.next_line().await? else {
                return Ok(None);
            };
            println!("Password:");
            let Some(password) = input.next_line().await? else {
                return Ok(None);
            };

            // Redirects queued before this page opened are already satisfied.
            while self.routes.try_recv().is_ok() {}

            match self.login.submit(username.trim(), password.trim()).await {
                Ok(()) => {
                    let next = self.routes.try_recv().unwrap_or(Route::Dashboard);
                    return Ok(Some(next));
                }
                Err(e) => println!("{}", e),
            }
        }
    }

    async fn dashboard_page<R>(&mut self, input: &mut Lines<R>) -> anyhow::Result<Option<Route>>
    where
        R: AsyncBufRead + Unpin,
    {
        // Polling lives as long as this page.
        let _polling = self.dashboard.start();
        let mut snapshots = self.dashboard.subscribe();

        loop {
            tokio::select! {
                Some(route) = self.routes.recv() => {
                    if route != Route::Dashboard {
                        return Ok(Some(route));
                    }
                }
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        return Ok(None);
                    }
                    let snapshot = snapshots.borrow_and_update().clone();
                    if !snapshot.loading {
                        let filters = self.dashboard.filters();
                        let view = DashboardView {
                            snapshot: &snapshot,
                            filters: &filters,
                            tz: &chrono::Local,
                        };
                        print!("{}{}", CLEAR_SCREEN, view);
                        println!("Type 'help' for commands.");
                    }
                }
                line = input.next_line() => {
                    let Some(line) = line? else {
                        return Ok(None);
                    };
                    match parse_command(&line) {
                        Ok(Some(command)) => {
                            if let Some(next) = self.dispatch(command).await {
                                return Ok(next);
                            }
                        }
                        Ok(None) => {}
                        Err(e) => println!("{}", e),
                    }
                }
            }
        }
    }

    /// `Some(next)` leaves the dashboard, with `None` inside meaning quit.
    async fn dispatch(&self, command: DashboardCommand) -> Option<Option<Route>> {
        match command {
            DashboardCommand::Refresh => self.dashboard.refresh().await,
            DashboardCommand::Granularity(granularity) => {
                self.dashboard.set_granularity(granularity).await
            }
            DashboardCommand::Range {
                start_date,
                start_time,
                end_date,
                end_time,
            } => {
                self.dashboard
                    .apply_date_range(start_date, start_time, end_date, end_time)
                    .await
            }
            DashboardCommand::OpenDevice(key) => {
                return Some(Some(Route::device_statistics(&key)));
            }
            // The session navigates to login through the channel.
            DashboardCommand::Logout => self.session.logout(),
            DashboardCommand::Quit => return Some(None),
            DashboardCommand::Help => println!("{}", HELP),
        }
        None
    }

    async fn device_page<R>(
        &mut self,
        query: &str,
        input: &mut Lines<R>,
    ) -> anyhow::Result<Option<Route>>
    where
        R: AsyncBufRead + Unpin,
    {
        let view = self.device_statistics.load(query).await;
        print!("{}{}", CLEAR_SCREEN, DeviceStatisticsPage(&view));
        println!("Press Enter to return to the dashboard.");

        if let Ok(route) = self.routes.try_recv() {
            return Ok(Some(route));
        }
        Ok(input.next_line().await?.map(|_| Route::Dashboard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::clock::SystemClock;
    use crate::application::dashboard_service::PollSettings;
    use crate::application::testing::{statistics, Call, FakeApi, MemoryTokenStore};
    use crate::domain::device::DeviceKey;
    use crate::domain::filters::DashboardFilters;

    struct Fixture {
        api: Arc<FakeApi>,
        session: Arc<Session>,
        app: App,
    }

    fn fixture(token: Option<&str>) -> Fixture {
        let (navigator, routes) = ChannelNavigator::channel();
        let session = Arc::new(Session::new(
            Arc::new(MemoryTokenStore::new(token)),
            Arc::new(navigator),
        ));
        let api = Arc::new(FakeApi::new().with_session(session.clone()));
        let today = chrono::Local::now().date_naive();
        let app = App {
            session: session.clone(),
            login: LoginService::new(api.clone(), session.clone()),
            dashboard: DashboardService::new(
                api.clone(),
                session.clone(),
                Arc::new(SystemClock),
                PollSettings::default(),
                DashboardFilters::default_for(today),
            ),
            device_statistics: DeviceStatisticsService::new(api.clone()),
            routes,
        };
        Fixture { api, session, app }
    }

    #[tokio::test]
    async fn test_login_then_quit() {
        let f = fixture(None);

        f.app.run(&b"admin\nsecret\nq\n"[..]).await.unwrap();

        assert!(f.api.calls().contains(&Call::Login("admin".to_string())));
        assert_eq!(f.session.token().as_deref(), Some("fresh-token"));
    }

    #[tokio::test]
    async fn test_queued_login_redirect_does_not_bounce_after_login() {
        let f = fixture(None);
        // a poll tick after logout asks for the login page a second time
        f.session.require_login();

        f.app.run(&b"admin\nsecret\nr\nq\n"[..]).await.unwrap();

        let calls = f.api.calls();
        assert_eq!(
            calls.iter().filter(|c| matches!(c, Call::Login(_))).count(),
            1
        );
        assert!(calls.contains(&Call::PreviouslyConnected));
    }

    #[tokio::test]
    async fn test_open_device_page_and_return() {
        let f = fixture(Some("tok"));
        f.api.set_statistics(statistics("bob", "d1", None));

        f.app.run(&b"d bob d1\n\nq\n"[..]).await.unwrap();

        assert!(f
            .api
            .calls()
            .contains(&Call::DeviceStatistics(DeviceKey::new("bob", "d1"))));
    }

    #[tokio::test]
    async fn test_logout_returns_to_login() {
        let f = fixture(Some("tok"));

        // logout, then end of input on the login page
        f.app.run(&b"logout\n"[..]).await.unwrap();

        assert_eq!(f.session.token(), None);
        assert!(!f.api.calls().iter().any(|c| matches!(c, Call::Login(_))));
    }

    #[test]
    fn test_channel_navigator_forwards_routes() {
        let (navigator, mut routes) = ChannelNavigator::channel();
        navigator.navigate(Route::Login);
        assert_eq!(routes.try_recv().unwrap(), Route::Login);

        drop(routes);
        navigator.navigate(Route::Dashboard);
    }
}
