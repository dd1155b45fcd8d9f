use anyhow::Result;
use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tui::{backend::Backend, Terminal};

use crate::auth::{self, Session};
use crate::booking::{book_appointment, BookingConfirmation};
use crate::config::Config;
use crate::dashboard::month_range;
use crate::db::Database;
use crate::error::ClinicError;
use crate::models::Service;
use crate::notify::{booking_confirmation, Mailer};
use crate::scheduling::available_slots;
use crate::ui::components::popup::{render_notification, Notification};
use crate::ui::components::read_key;
use crate::ui::{
    appointment_wizard::{
        handle_input as handle_appointment_wizard_input, render_appointment_wizard, AppointmentWizardAction,
        AppointmentWizardState,
    },
    booking_wizard::{handle_input as handle_booking_input, render_booking_wizard, BookingAction, BookingWizardState},
    calendar::{handle_input as handle_calendar_input, render_calendar, CalendarAction, CalendarState},
    catalog::{handle_input as handle_catalog_input, render_catalog, CatalogAction, CatalogState},
    categories::{handle_input as handle_categories_input, render_categories, CategoriesState, CategoryAction},
    category_wizard::{
        handle_input as handle_category_wizard_input, render_category_wizard, CategoryWizardAction,
        CategoryWizardState,
    },
    client_wizard::{handle_input as handle_client_wizard_input, render_client_wizard, ClientWizardAction, ClientWizardState},
    clients::{handle_input as handle_clients_input, render_clients, ClientAction, ClientsState},
    dashboard::{handle_input as handle_dashboard_input, render_dashboard, AdminSection, DashboardAction, DashboardState},
    home::{handle_input as handle_home_input, render_home, HomeAction, HomeState},
    login::{handle_input as handle_login_input, render_login, LoginAction, LoginState},
    service_wizard::{handle_input as handle_service_wizard_input, render_service_wizard, ServiceWizardAction, ServiceWizardState},
    services::{handle_input as handle_services_input, render_services, ServiceAction, ServicesState},
    settings::{handle_input as handle_settings_input, render_settings, SettingsAction, SettingsState},
};

const UPCOMING_LIMIT: i64 = 10;

// Represents the current screen in the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppScreen {
    Home,
    Catalog,
    Booking,
    Login,
    Dashboard,
    Calendar,
    AppointmentWizard,
    Clients,
    ClientWizard,
    Services,
    ServiceWizard,
    Categories,
    CategoryWizard,
    Settings,
}

impl AppScreen {
    /// Screens behind the staff login.
    pub fn is_admin(&self) -> bool {
        !matches!(
            self,
            AppScreen::Home | AppScreen::Catalog | AppScreen::Booking | AppScreen::Login
        )
    }
}

// Main application state
pub struct AppState {
    db: Database,
    mailer: Option<Mailer>,
    session_idle: Duration,
    session: Option<Session>,
    pub screen: AppScreen,
    notification: Option<Notification>,
    home_state: Option<HomeState>,
    catalog_state: Option<CatalogState>,
    booking_state: Option<BookingWizardState>,
    login_state: Option<LoginState>,
    dashboard_state: Option<DashboardState>,
    calendar_state: Option<CalendarState>,
    appointment_wizard_state: Option<AppointmentWizardState>,
    clients_state: Option<ClientsState>,
    client_wizard_state: Option<ClientWizardState>,
    services_state: Option<ServicesState>,
    service_wizard_state: Option<ServiceWizardState>,
    categories_state: Option<CategoriesState>,
    category_wizard_state: Option<CategoryWizardState>,
    settings_state: Option<SettingsState>,
}

impl AppState {
    pub fn new(db: Database, mailer: Option<Mailer>, config: &Config) -> Self {
        Self {
            db,
            mailer,
            session_idle: Duration::minutes(config.session_idle_minutes),
            session: None,
            screen: AppScreen::Home,
            notification: None,
            home_state: None,
            catalog_state: None,
            booking_state: None,
            login_state: None,
            dashboard_state: None,
            calendar_state: None,
            appointment_wizard_state: None,
            clients_state: None,
            client_wizard_state: None,
            services_state: None,
            service_wizard_state: None,
            categories_state: None,
            category_wizard_state: None,
            settings_state: None,
        }
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notification = Some(notification);
    }

    /// Turns a failed handler into a notification; the app keeps running.
    fn report(&mut self, err: anyhow::Error) {
        if let Some(ClinicError::SessionExpired) = err.downcast_ref::<ClinicError>() {
            tracing::info!("admin session expired");
            self.session = None;
            self.login_state = Some(LoginState::new());
            self.screen = AppScreen::Login;
            self.notify(Notification::info(err.to_string()));
            return;
        }

        tracing::error!(screen = ?self.screen, "{:#}", err);
        let message = match err.downcast_ref::<ClinicError>() {
            Some(domain) => domain.to_string(),
            None => format!("{:#}", err),
        };
        self.notify(Notification::error(message));
    }
}

/// Refreshes the idle timer, or fails when the admin session is gone.
fn ensure_session(session: &mut Option<Session>, idle: Duration) -> Result<()> {
    let now = Utc::now();
    match session.as_mut() {
        Some(active) if !active.is_expired(now, idle) => {
            active.touch(now);
            Ok(())
        }
        _ => Err(ClinicError::SessionExpired.into()),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn day_bounds(from: NaiveDate, to: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let end = to.succ_opt().unwrap_or(to);
    (from.and_time(NaiveTime::MIN), end.and_time(NaiveTime::MIN))
}

pub async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    load_home_screen(app_state).await?;

    loop {
        // Render current screen
        terminal.draw(|f| {
            match app_state.screen {
                AppScreen::Home => {
                    if let Some(state) = &mut app_state.home_state {
                        render_home(f, state);
                    }
                }
                AppScreen::Catalog => {
                    if let Some(state) = &mut app_state.catalog_state {
                        render_catalog(f, state);
                    }
                }
                AppScreen::Booking => {
                    if let Some(state) = &mut app_state.booking_state {
                        render_booking_wizard(f, state);
                    }
                }
                AppScreen::Login => {
                    if let Some(state) = &mut app_state.login_state {
                        render_login(f, state);
                    }
                }
                AppScreen::Dashboard => {
                    if let Some(state) = &mut app_state.dashboard_state {
                        render_dashboard(f, state);
                    }
                }
                AppScreen::Calendar => {
                    if let Some(state) = &mut app_state.calendar_state {
                        render_calendar(f, state);
                    }
                }
                AppScreen::AppointmentWizard => {
                    if let Some(state) = &mut app_state.appointment_wizard_state {
                        render_appointment_wizard(f, state);
                    }
                }
                AppScreen::Clients => {
                    if let Some(state) = &mut app_state.clients_state {
                        render_clients(f, state);
                    }
                }
                AppScreen::ClientWizard => {
                    if let Some(state) = &mut app_state.client_wizard_state {
                        render_client_wizard(f, state);
                    }
                }
                AppScreen::Services => {
                    if let Some(state) = &mut app_state.services_state {
                        render_services(f, state);
                    }
                }
                AppScreen::ServiceWizard => {
                    if let Some(state) = &mut app_state.service_wizard_state {
                        render_service_wizard(f, state);
                    }
                }
                AppScreen::Categories => {
                    if let Some(state) = &mut app_state.categories_state {
                        render_categories(f, state);
                    }
                }
                AppScreen::CategoryWizard => {
                    if let Some(state) = &mut app_state.category_wizard_state {
                        render_category_wizard(f, state);
                    }
                }
                AppScreen::Settings => {
                    if let Some(state) = &mut app_state.settings_state {
                        render_settings(f, state);
                    }
                }
            }

            if let Some(notification) = &app_state.notification {
                render_notification(f, notification);
            }
        })?;

        if app_state.notification.is_some() {
            if read_key()?.is_some() {
                app_state.notification = None;
            }
            continue;
        }

        // Handle input for current screen
        let result = match app_state.screen {
            AppScreen::Home => handle_home_screen(app_state).await,
            AppScreen::Catalog => handle_catalog_screen(app_state).await,
            AppScreen::Booking => handle_booking_screen(app_state).await,
            AppScreen::Login => handle_login_screen(app_state).await,
            AppScreen::Dashboard => handle_dashboard_screen(app_state).await,
            AppScreen::Calendar => handle_calendar_screen(app_state).await,
            AppScreen::AppointmentWizard => handle_appointment_wizard_screen(app_state).await,
            AppScreen::Clients => handle_clients_screen(app_state).await,
            AppScreen::ClientWizard => handle_client_wizard_screen(app_state).await,
            AppScreen::Services => handle_services_screen(app_state).await,
            AppScreen::ServiceWizard => handle_service_wizard_screen(app_state).await,
            AppScreen::Categories => handle_categories_screen(app_state).await,
            AppScreen::CategoryWizard => handle_category_wizard_screen(app_state).await,
            AppScreen::Settings => handle_settings_screen(app_state).await,
        };

        match result {
            Ok(true) => break,
            Ok(false) => {}
            Err(err) => app_state.report(err),
        }
    }

    Ok(())
}

// Public area

async fn load_home_screen(app_state: &mut AppState) -> Result<()> {
    let settings = app_state.db.get_settings().await?;
    let services = app_state.db.load_active_services().await?;

    app_state.home_state = Some(HomeState::new(settings, services));
    app_state.screen = AppScreen::Home;

    Ok(())
}

async fn load_booking_screen(app_state: &mut AppState, service_id: Option<i32>) -> Result<()> {
    let settings = app_state.db.get_settings().await?;
    let categories = app_state.db.load_active_categories().await?;
    let services = app_state.db.load_active_services().await?;

    let mut state = BookingWizardState::new(settings, categories, services, today());
    if let Some(id) = service_id {
        state = state.with_service(id);
    }
    app_state.booking_state = Some(state);
    app_state.screen = AppScreen::Booking;

    Ok(())
}

async fn handle_home_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.home_state {
        match handle_home_input(state)? {
            Some(HomeAction::Quit) => return Ok(true),
            Some(HomeAction::Catalog) => {
                let categories = app_state.db.load_active_categories().await?;
                let services = app_state.db.load_active_services().await?;
                app_state.catalog_state = Some(CatalogState::new(categories, services));
                app_state.screen = AppScreen::Catalog;
            }
            Some(HomeAction::Book) => load_booking_screen(app_state, None).await?,
            Some(HomeAction::Login) => {
                // a live session goes straight back to the admin area
                if ensure_session(&mut app_state.session, app_state.session_idle).is_ok() {
                    load_dashboard_screen(app_state).await?;
                } else {
                    app_state.session = None;
                    app_state.login_state = Some(LoginState::new());
                    app_state.screen = AppScreen::Login;
                }
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_catalog_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.catalog_state {
        match handle_catalog_input(state)? {
            Some(CatalogAction::Back) => load_home_screen(app_state).await?,
            Some(CatalogAction::Book(service_id)) => load_booking_screen(app_state, Some(service_id)).await?,
            None => {}
        }
    }

    Ok(false)
}

async fn load_booking_slots(
    db: &Database,
    state: &mut BookingWizardState,
    date: NaiveDate,
    service_id: i32,
) -> Result<()> {
    let settings = db.get_settings().await?;
    let slots = available_slots(db, &settings, date, service_id).await?;
    state.set_slots(slots);
    Ok(())
}

async fn send_booking_mail(
    db: &Database,
    mailer: &Mailer,
    service: &Service,
    confirmation: &BookingConfirmation,
) -> Result<()> {
    let settings = db.get_settings().await?;
    let message = booking_confirmation(
        mailer.sender(),
        &settings,
        &confirmation.client,
        service,
        &confirmation.appointment,
    )?;
    mailer.send(message).await
}

async fn handle_booking_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.booking_state {
        match handle_booking_input(state)? {
            Some(BookingAction::Cancel) | Some(BookingAction::Done) => load_home_screen(app_state).await?,
            Some(BookingAction::LoadSlots { date, service_id }) => {
                load_booking_slots(&app_state.db, state, date, service_id).await?;
            }
            Some(BookingAction::Submit(request)) => match book_appointment(&app_state.db, &request).await {
                Ok(confirmation) => {
                    state.confirm(format!(
                        "See you on {} at {}, {}! Your appointment is confirmed.",
                        confirmation.appointment.date.format("%d/%m/%Y"),
                        confirmation.appointment.start_time.format("%H:%M"),
                        confirmation.client.name,
                    ));

                    let service = state.selected_service().cloned();
                    if let (Some(mailer), Some(service)) = (&app_state.mailer, service) {
                        if let Err(err) = send_booking_mail(&app_state.db, mailer, &service, &confirmation).await {
                            tracing::warn!(
                                appointment_id = confirmation.appointment.id,
                                "confirmation e-mail failed: {:#}",
                                err
                            );
                            app_state.notification = Some(Notification::info(
                                "Your booking is confirmed, but the confirmation e-mail could not be sent.",
                            ));
                        }
                    }
                }
                Err(err) => match err.downcast_ref::<ClinicError>() {
                    Some(taken @ ClinicError::SlotUnavailable { .. }) => {
                        let message = format!("{}. Please choose another time.", taken);
                        if let Some(BookingAction::LoadSlots { date, service_id }) = state.slot_taken(message) {
                            load_booking_slots(&app_state.db, state, date, service_id).await?;
                        }
                    }
                    Some(ClinicError::Validation(message)) => state.set_error(message.clone()),
                    _ => return Err(err),
                },
            },
            None => {}
        }
    }

    Ok(false)
}

async fn handle_login_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.login_state {
        match handle_login_input(state)? {
            Some(LoginAction::Back) => load_home_screen(app_state).await?,
            Some(LoginAction::Submit { email, password }) => {
                match auth::login(&app_state.db, &email, &password, Utc::now()).await {
                    Ok(session) => {
                        app_state.session = Some(session);
                        app_state.login_state = None;
                        load_dashboard_screen(app_state).await?;
                    }
                    Err(err) => match err.downcast_ref::<ClinicError>() {
                        Some(domain) => state.set_error(domain.to_string()),
                        None => return Err(err),
                    },
                }
            }
            None => {}
        }
    }

    Ok(false)
}

// Admin area

async fn load_dashboard_screen(app_state: &mut AppState) -> Result<()> {
    let today = today();
    let stats = app_state.db.dashboard_stats(today).await?;
    let upcoming = app_state.db.upcoming_appointments(today, UPCOMING_LIMIT).await?;
    let (from, to) = month_range(today);
    let month = app_state.db.load_appointments_between(from, to).await?;
    let user_name = app_state
        .session
        .as_ref()
        .map(|s| s.name.clone())
        .unwrap_or_default();

    app_state.dashboard_state = Some(DashboardState::new(user_name, today, stats, upcoming, &month));
    app_state.screen = AppScreen::Dashboard;

    Ok(())
}

async fn handle_dashboard_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.dashboard_state {
        let action = handle_dashboard_input(state)?;
        if action == Some(DashboardAction::Logout) {
            if let Some(session) = app_state.session.take() {
                tracing::info!(user_id = session.user_id, "logged out");
            }
            load_home_screen(app_state).await?;
            app_state.notify(Notification::info("You have been logged out."));
            return Ok(false);
        }
        ensure_session(&mut app_state.session, app_state.session_idle)?;

        match action {
            Some(DashboardAction::Open(AdminSection::Calendar)) => load_calendar_screen(app_state).await?,
            Some(DashboardAction::Open(AdminSection::Clients)) => load_clients_screen(app_state).await?,
            Some(DashboardAction::Open(AdminSection::Services)) => load_services_screen(app_state).await?,
            Some(DashboardAction::Open(AdminSection::Categories)) => load_categories_screen(app_state).await?,
            Some(DashboardAction::Open(AdminSection::Settings)) => {
                let settings = app_state.db.get_settings().await?;
                app_state.settings_state = Some(SettingsState::new(settings));
                app_state.screen = AppScreen::Settings;
            }
            Some(DashboardAction::Refresh) => load_dashboard_screen(app_state).await?,
            Some(DashboardAction::Logout) | None => {}
        }
    }

    Ok(false)
}

// Calendar

async fn load_calendar_screen(app_state: &mut AppState) -> Result<()> {
    let settings = app_state.db.get_settings().await?;
    app_state.calendar_state = Some(CalendarState::new(settings, today()));
    reload_calendar(app_state).await?;
    app_state.screen = AppScreen::Calendar;

    Ok(())
}

/// Fetches the visible week again, keeping the date and view.
async fn reload_calendar(app_state: &mut AppState) -> Result<()> {
    if let Some(state) = &mut app_state.calendar_state {
        let (from, to) = state.range();
        let appointments = app_state.db.load_appointments_between(from, to).await?;
        let (start, end) = day_bounds(from, to);
        let blocks = app_state.db.load_blocks_between(start, end).await?;
        state.set_data(appointments, blocks);
    }

    Ok(())
}

async fn handle_calendar_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.calendar_state {
        let action = handle_calendar_input(state)?;
        ensure_session(&mut app_state.session, app_state.session_idle)?;

        match action {
            Some(CalendarAction::Back) => load_dashboard_screen(app_state).await?,
            Some(CalendarAction::Reload { .. }) => reload_calendar(app_state).await?,
            Some(CalendarAction::CreateBlock(mut block)) => {
                block.created_by = app_state.session.as_ref().map(|s| s.user_id);
                app_state.db.create_block(&block).await?;
                reload_calendar(app_state).await?;
                app_state.notify(Notification::success("Time blocked."));
            }
            Some(CalendarAction::DeleteBlock(id)) => {
                app_state.db.delete_block(id).await?;
                reload_calendar(app_state).await?;
            }
            Some(CalendarAction::Complete(id)) => {
                app_state.db.complete_appointment(id).await?;
                reload_calendar(app_state).await?;
            }
            Some(CalendarAction::Cancel { id, reason }) => {
                app_state.db.cancel_appointment(id, reason.as_deref()).await?;
                reload_calendar(app_state).await?;
            }
            Some(CalendarAction::NoShow(id)) => {
                app_state.db.mark_no_show(id).await?;
                reload_calendar(app_state).await?;
            }
            Some(CalendarAction::Edit(id)) => {
                let appointment = app_state.db.get_appointment(id).await?.appointment();
                let clients = app_state.db.load_clients().await?;
                let services = app_state.db.load_services().await?;
                app_state.appointment_wizard_state =
                    Some(AppointmentWizardState::from_existing(appointment, clients, services));
                app_state.screen = AppScreen::AppointmentWizard;
            }
            Some(CalendarAction::NewAppointment { date, time }) => {
                let clients = app_state.db.load_clients().await?;
                let services = app_state.db.load_services().await?;
                app_state.appointment_wizard_state =
                    Some(AppointmentWizardState::new(clients, services, date, time));
                app_state.screen = AppScreen::AppointmentWizard;
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_appointment_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.appointment_wizard_state {
        let action = handle_appointment_wizard_input(state)?;
        ensure_session(&mut app_state.session, app_state.session_idle)?;

        match action {
            Some(AppointmentWizardAction::Cancel) => {
                reload_calendar(app_state).await?;
                app_state.screen = AppScreen::Calendar;
            }
            Some(AppointmentWizardAction::Save(appointment)) => {
                // a refused slot stays on the form with the error shown
                if appointment.id == 0 {
                    app_state.db.create_appointment(&appointment).await?;
                } else {
                    app_state.db.update_appointment(&appointment).await?;
                }
                reload_calendar(app_state).await?;
                app_state.screen = AppScreen::Calendar;
            }
            None => {}
        }
    }

    Ok(false)
}

// Clients

async fn load_clients_screen(app_state: &mut AppState) -> Result<()> {
    let clients = app_state.db.load_clients().await?;
    app_state.clients_state = Some(ClientsState::new(clients));
    app_state.screen = AppScreen::Clients;

    Ok(())
}

async fn handle_clients_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.clients_state {
        let action = handle_clients_input(state)?;
        ensure_session(&mut app_state.session, app_state.session_idle)?;

        match action {
            Some(ClientAction::Back) => load_dashboard_screen(app_state).await?,
            Some(ClientAction::NewClient) => {
                app_state.client_wizard_state = Some(ClientWizardState::new());
                app_state.screen = AppScreen::ClientWizard;
            }
            Some(ClientAction::EditClient(client_id)) => {
                let client = app_state.db.get_client(client_id).await?;
                app_state.client_wizard_state = Some(ClientWizardState::from_existing(client));
                app_state.screen = AppScreen::ClientWizard;
            }
            Some(ClientAction::DeleteClient(client_id)) => {
                app_state.db.delete_client(client_id).await?;
                load_clients_screen(app_state).await?;
            }
            Some(ClientAction::ShowHistory(client_id)) => {
                let client = app_state.db.get_client(client_id).await?;
                let history = app_state.db.client_history(client_id).await?;
                state.show_history(client, history);
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_client_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.client_wizard_state {
        let action = handle_client_wizard_input(state)?;
        ensure_session(&mut app_state.session, app_state.session_idle)?;

        match action {
            Some(ClientWizardAction::Cancel) => load_clients_screen(app_state).await?,
            Some(ClientWizardAction::Save(client)) => {
                if client.id == 0 {
                    app_state.db.create_client(&client).await?;
                } else {
                    app_state.db.update_client(&client).await?;
                }
                load_clients_screen(app_state).await?;
            }
            None => {}
        }
    }

    Ok(false)
}

// Services and categories

async fn load_services_screen(app_state: &mut AppState) -> Result<()> {
    let services = app_state.db.load_services().await?;
    let categories = app_state.db.load_categories().await?;
    app_state.services_state = Some(ServicesState::new(services, categories));
    app_state.screen = AppScreen::Services;

    Ok(())
}

async fn reload_services(app_state: &mut AppState) -> Result<()> {
    let services = app_state.db.load_services().await?;
    let categories = app_state.db.load_categories().await?;
    match &mut app_state.services_state {
        Some(state) => state.reload(services, categories),
        None => app_state.services_state = Some(ServicesState::new(services, categories)),
    }
    app_state.screen = AppScreen::Services;

    Ok(())
}

async fn handle_services_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.services_state {
        let action = handle_services_input(state)?;
        ensure_session(&mut app_state.session, app_state.session_idle)?;

        match action {
            Some(ServiceAction::Back) => load_dashboard_screen(app_state).await?,
            Some(ServiceAction::NewService) => {
                let categories = app_state.db.load_categories().await?;
                app_state.service_wizard_state = Some(ServiceWizardState::new(categories));
                app_state.screen = AppScreen::ServiceWizard;
            }
            Some(ServiceAction::EditService(service_id)) => {
                let service = app_state.db.get_service(service_id).await?;
                let categories = app_state.db.load_categories().await?;
                app_state.service_wizard_state = Some(ServiceWizardState::from_existing(service, categories));
                app_state.screen = AppScreen::ServiceWizard;
            }
            Some(ServiceAction::DeleteService(service_id)) => {
                app_state.db.delete_service(service_id).await?;
                reload_services(app_state).await?;
            }
            Some(ServiceAction::SetActive(service_id, active)) => {
                app_state.db.set_service_active(service_id, active).await?;
                reload_services(app_state).await?;
            }
            Some(ServiceAction::SetFeatured(service_id, featured)) => {
                app_state.db.set_service_featured(service_id, featured).await?;
                reload_services(app_state).await?;
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_service_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.service_wizard_state {
        let action = handle_service_wizard_input(state)?;
        ensure_session(&mut app_state.session, app_state.session_idle)?;

        match action {
            Some(ServiceWizardAction::Cancel) => reload_services(app_state).await?,
            Some(ServiceWizardAction::Save(service)) => {
                if service.id == 0 {
                    app_state.db.create_service(&service).await?;
                } else {
                    app_state.db.update_service(&service).await?;
                }
                reload_services(app_state).await?;
            }
            None => {}
        }
    }

    Ok(false)
}

async fn load_categories_screen(app_state: &mut AppState) -> Result<()> {
    let categories = app_state.db.load_categories().await?;
    app_state.categories_state = Some(CategoriesState::new(categories));
    app_state.screen = AppScreen::Categories;

    Ok(())
}

async fn handle_categories_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.categories_state {
        let action = handle_categories_input(state)?;
        ensure_session(&mut app_state.session, app_state.session_idle)?;

        match action {
            Some(CategoryAction::Back) => load_dashboard_screen(app_state).await?,
            Some(CategoryAction::NewCategory) => {
                let categories = app_state.db.load_categories().await?;
                let next_order = categories.iter().map(|c| c.display_order + 1).max().unwrap_or(0);
                app_state.category_wizard_state = Some(CategoryWizardState::new(next_order));
                app_state.screen = AppScreen::CategoryWizard;
            }
            Some(CategoryAction::EditCategory(category_id)) => {
                let category = app_state.db.get_category(category_id).await?;
                app_state.category_wizard_state = Some(CategoryWizardState::from_existing(category));
                app_state.screen = AppScreen::CategoryWizard;
            }
            Some(CategoryAction::DeleteCategory(category_id)) => {
                app_state.db.delete_category(category_id).await?;
                load_categories_screen(app_state).await?;
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_category_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.category_wizard_state {
        let action = handle_category_wizard_input(state)?;
        ensure_session(&mut app_state.session, app_state.session_idle)?;

        match action {
            Some(CategoryWizardAction::Cancel) => load_categories_screen(app_state).await?,
            Some(CategoryWizardAction::Save(category)) => {
                if category.id == 0 {
                    app_state.db.create_category(&category).await?;
                } else {
                    app_state.db.update_category(&category).await?;
                }
                load_categories_screen(app_state).await?;
            }
            None => {}
        }
    }

    Ok(false)
}

// Settings

async fn handle_settings_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.settings_state {
        let action = handle_settings_input(state)?;
        ensure_session(&mut app_state.session, app_state.session_idle)?;

        match action {
            Some(SettingsAction::Back) => load_dashboard_screen(app_state).await?,
            Some(SettingsAction::Save(settings)) => {
                app_state.db.update_settings(&settings).await?;
                if let Some(calendar) = &mut app_state.calendar_state {
                    calendar.set_settings(settings);
                }
                load_dashboard_screen(app_state).await?;
                app_state.notify(Notification::success("Settings saved."));
            }
            None => {}
        }
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, User};

    fn session(now: chrono::DateTime<Utc>) -> Session {
        let user = User {
            id: 4,
            name: "Marta".into(),
            email: "marta@clinic.com".into(),
            role: Role::Admin.as_str().into(),
            password_hash: String::new(),
            active: true,
        };
        Session::new(&user, now)
    }

    #[test]
    fn only_public_screens_skip_the_login() {
        assert!(!AppScreen::Home.is_admin());
        assert!(!AppScreen::Booking.is_admin());
        assert!(!AppScreen::Login.is_admin());
        assert!(AppScreen::Calendar.is_admin());
        assert!(AppScreen::Settings.is_admin());
    }

    #[test]
    fn active_session_is_touched() {
        let started = Utc::now() - Duration::minutes(10);
        let mut current = Some(session(started));
        ensure_session(&mut current, Duration::minutes(30)).unwrap();
        assert!(current.unwrap().last_activity > started);
    }

    #[test]
    fn idle_or_missing_session_is_expired() {
        let mut idle = Some(session(Utc::now() - Duration::minutes(45)));
        let err = ensure_session(&mut idle, Duration::minutes(30)).unwrap_err();
        assert_eq!(err.downcast_ref::<ClinicError>(), Some(&ClinicError::SessionExpired));

        let mut none = None;
        assert!(ensure_session(&mut none, Duration::minutes(30)).is_err());
    }

    #[test]
    fn week_bounds_cover_the_whole_last_day() {
        let monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2024, 6, 9).unwrap();
        let (start, end) = day_bounds(monday, sunday);
        assert_eq!(start, monday.and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 6, 10).unwrap().and_hms_opt(0, 0, 0).unwrap());
    }
}
