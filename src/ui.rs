use anyhow::Result;
use chrono::{Local, Utc};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use vivienda_inventory::{
    edit, exporter, filter, importer, stats, Action, Config, EditField, EditForm, FilterState,
    GroupStats, ImportPreview, Inventory, Status, Unit, SECTIONS, TYPOLOGIES,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Units,
    Import,
    History,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Dashboard, Tab::Units, Tab::Import, Tab::History];

    pub fn next(&self) -> Self {
        match self {
            Tab::Dashboard => Tab::Units,
            Tab::Units => Tab::Import,
            Tab::Import => Tab::History,
            Tab::History => Tab::Dashboard,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Tab::Dashboard => Tab::History,
            Tab::Units => Tab::Dashboard,
            Tab::Import => Tab::Units,
            Tab::History => Tab::Import,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Units => "Viviendas",
            Tab::Import => "Importar",
            Tab::History => "Historial",
        }
    }
}

/// Slow operations the event loop runs with the busy overlay shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingOp {
    Save,
    Import,
}

impl PendingOp {
    pub fn label(&self) -> &'static str {
        match self {
            PendingOp::Save => "Guardando...",
            PendingOp::Import => "Importando...",
        }
    }
}

pub struct EditDialog {
    pub form: EditForm,
    pub field: EditField,
}

pub struct App {
    pub inventory: Inventory,
    pub config: Config,
    pub current_tab: Tab,
    pub filter: FilterState,
    pub state: TableState,
    pub history_state: TableState,
    pub import_path: String,
    pub preview: Option<ImportPreview>,
    pub import_source: Option<PathBuf>,
    pub edit: Option<EditDialog>,
    pub alert: Option<String>,
    pub busy: Option<&'static str>,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Self {
        let inventory = Inventory::new(config.roster());

        Self {
            inventory,
            config,
            current_tab: Tab::Dashboard,
            filter: FilterState::default(),
            state: TableState::default(),
            history_state: TableState::default(),
            import_path: String::new(),
            preview: None,
            import_source: None,
            edit: None,
            alert: None,
            busy: None,
            should_quit: false,
        }
    }

    pub fn filtered_units(&self) -> Vec<&Unit> {
        filter::apply(self.inventory.units(), &self.filter)
    }

    pub fn selected_unit(&self) -> Option<&Unit> {
        let units = self.filtered_units();
        self.state.selected().and_then(|i| units.get(i).copied())
    }

    /// Keep the selection inside the filtered list
    pub fn refresh_selection(&mut self) {
        let len = self.filtered_units().len();
        if len == 0 {
            self.state.select(None);
        } else {
            let i = self.state.selected().unwrap_or(0).min(len - 1);
            self.state.select(Some(i));
        }

        if self.inventory.history_len() == 0 {
            self.history_state.select(None);
        } else if self.history_state.selected().is_none() {
            self.history_state.select(Some(0));
        }
    }

    pub fn next_tab(&mut self) {
        self.current_tab = self.current_tab.next();
    }

    pub fn previous_tab(&mut self) {
        self.current_tab = self.current_tab.previous();
    }

    fn list_len(&self) -> usize {
        match self.current_tab {
            Tab::History => self.inventory.history_len(),
            _ => self.filtered_units().len(),
        }
    }

    fn list_state(&mut self) -> &mut TableState {
        match self.current_tab {
            Tab::History => &mut self.history_state,
            _ => &mut self.state,
        }
    }

    pub fn next(&mut self) {
        let len = self.list_len();
        if len == 0 {
            return;
        }
        let state = self.list_state();
        let i = match state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.list_len();
        if len == 0 {
            return;
        }
        let state = self.list_state();
        let i = match state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.list_len();
        if len == 0 {
            return;
        }
        let state = self.list_state();
        let i = match state.selected() {
            Some(i) => (i + 20).min(len - 1),
            None => 0,
        };
        state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        let state = self.list_state();
        let i = state.selected().map(|i| i.saturating_sub(20)).unwrap_or(0);
        state.select(Some(i));
    }

    // ========================================================================
    // Filters
    // ========================================================================

    pub fn cycle_section_filter(&mut self) {
        self.filter.section = filter::cycle_option(&self.filter.section, &SECTIONS);
        self.refresh_selection();
    }

    pub fn cycle_status_filter(&mut self) {
        self.filter.status = filter::cycle_status(self.filter.status);
        self.refresh_selection();
    }

    pub fn cycle_typology_filter(&mut self) {
        self.filter.typology = filter::cycle_option(&self.filter.typology, &TYPOLOGIES);
        self.refresh_selection();
    }

    pub fn cycle_company_filter(&mut self) {
        let names = self.inventory.roster().names();
        self.filter.company = filter::cycle_option(&self.filter.company, &names);
        self.refresh_selection();
    }

    pub fn clear_filter(&mut self) {
        self.filter.clear();
        self.refresh_selection();
    }

    // ========================================================================
    // Edit dialog
    // ========================================================================

    pub fn open_edit(&mut self) {
        if let Some(unit) = self.selected_unit() {
            let form = EditForm::open(unit);
            self.edit = Some(EditDialog {
                form,
                field: EditField::Status,
            });
        }
    }

    pub async fn save_edit(&mut self, cancel: &CancellationToken) {
        let Some(dialog) = self.edit.take() else {
            return;
        };

        let delay = self.config.save_delay();
        match edit::save(&mut self.inventory, &dialog.form, delay, cancel).await {
            Ok(_) => self.refresh_selection(),
            Err(err) => {
                self.alert = Some(err.user_message());
                self.edit = Some(dialog);
            }
        }
    }

    // ========================================================================
    // Import / export
    // ========================================================================

    pub fn load_preview(&mut self) {
        let path = PathBuf::from(self.import_path.trim());

        match importer::preview(&path) {
            Ok(preview) => {
                self.preview = Some(preview);
                self.import_source = Some(path);
            }
            Err(err) => {
                tracing::warn!(error = %err, "Import preview failed");
                self.preview = None;
                self.import_source = None;
                self.alert = Some(err.user_message());
            }
        }
    }

    pub async fn confirm_import(&mut self, cancel: &CancellationToken) {
        let Some(path) = self.import_source.clone() else {
            return;
        };

        let batch = match importer::confirm_import(&path, self.config.import_delay(), cancel).await {
            Ok(batch) => batch,
            Err(err) => {
                tracing::warn!(error = %err, "Import failed");
                self.alert = Some(err.user_message());
                return;
            }
        };

        let count = batch.units.len();
        let result = self.inventory.apply(Action::Imported {
            source_file: batch.source_file,
            units: batch.units,
        });

        match result {
            Ok(_) => {
                self.preview = None;
                self.import_source = None;
                self.import_path.clear();
                self.alert = Some(format!("Se importaron {} viviendas correctamente.", count));
                self.refresh_selection();
            }
            Err(err) => self.alert = Some(err.user_message()),
        }
    }

    pub fn export(&mut self) {
        let result = exporter::export_units(
            self.inventory.units(),
            &self.config.output_dir,
            &self.config.project_name,
            Utc::now().date_naive(),
        );

        self.alert = Some(match result {
            Ok(path) => format!("Exportado: {}", path.display()),
            Err(err) => err.user_message(),
        });
    }

    pub fn download_template(&mut self) {
        let result = exporter::write_template(&self.config.output_dir, &self.config.project_name);

        self.alert = Some(match result {
            Ok(path) => format!("Plantilla guardada: {}", path.display()),
            Err(err) => err.user_message(),
        });
    }

    // ========================================================================
    // Keys
    // ========================================================================

    /// Handle one key press. Returns the slow operation to run, if any.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<PendingOp> {
        if self.busy.is_some() {
            return None;
        }

        // Alert is blocking: any key dismisses it
        if self.alert.is_some() {
            self.alert = None;
            return None;
        }

        if self.edit.is_some() {
            return self.handle_edit_key(key);
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => self.should_quit = true,
                KeyCode::Char('t') if self.current_tab == Tab::Import => self.download_template(),
                _ => {}
            }
            return None;
        }

        match key.code {
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.previous_tab();
                } else {
                    self.next_tab();
                }
                return None;
            }
            KeyCode::BackTab => {
                self.previous_tab();
                return None;
            }
            _ => {}
        }

        if self.current_tab == Tab::Import {
            return self.handle_import_key(key);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(c @ '1'..='4') => {
                let i = c as usize - '1' as usize;
                self.current_tab = Tab::ALL[i];
            }
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::PageDown => self.page_down(),
            KeyCode::PageUp => self.page_up(),
            KeyCode::Home => self.list_state().select(Some(0)),
            KeyCode::End => {
                let len = self.list_len();
                if len > 0 {
                    self.list_state().select(Some(len - 1));
                }
            }
            KeyCode::Char('p') if self.current_tab == Tab::Units => self.cycle_section_filter(),
            KeyCode::Char('s') if self.current_tab == Tab::Units => self.cycle_status_filter(),
            KeyCode::Char('t') if self.current_tab == Tab::Units => self.cycle_typology_filter(),
            KeyCode::Char('g') if self.current_tab == Tab::Units => self.cycle_company_filter(),
            KeyCode::Char('c') if self.current_tab == Tab::Units => self.clear_filter(),
            KeyCode::Char('x') if self.current_tab == Tab::Units => self.export(),
            KeyCode::Enter if self.current_tab == Tab::Units => self.open_edit(),
            _ => {}
        }

        None
    }

    fn handle_import_key(&mut self, key: KeyEvent) -> Option<PendingOp> {
        match key.code {
            KeyCode::Esc => {
                if self.preview.is_some() {
                    self.preview = None;
                    self.import_source = None;
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Enter => {
                let same_file = self
                    .import_source
                    .as_ref()
                    .map(|p| p.as_path() == std::path::Path::new(self.import_path.trim()))
                    .unwrap_or(false);

                if self.preview.is_some() && same_file {
                    return Some(PendingOp::Import);
                }
                if !self.import_path.trim().is_empty() {
                    self.load_preview();
                }
            }
            KeyCode::Backspace => {
                self.import_path.pop();
            }
            KeyCode::Char(c) => self.import_path.push(c),
            _ => {}
        }

        None
    }

    fn handle_edit_key(&mut self, key: KeyEvent) -> Option<PendingOp> {
        let roster = self.inventory.roster().clone();
        let dialog = self.edit.as_mut()?;

        match key.code {
            KeyCode::Esc => {
                self.edit = None;
            }
            KeyCode::Enter => {
                if dialog.form.can_save() {
                    return Some(PendingOp::Save);
                }
            }
            KeyCode::Up => dialog.field = step_field(dialog.field, false),
            KeyCode::Down => dialog.field = step_field(dialog.field, true),
            KeyCode::Left | KeyCode::Right => {
                let forward = key.code == KeyCode::Right;
                match dialog.field {
                    EditField::Status => dialog.form.cycle_status(forward),
                    EditField::Company => dialog.form.cycle_company(&roster, forward),
                    EditField::Agent => dialog.form.cycle_agent(&roster, forward),
                    EditField::Notes => {}
                }
            }
            KeyCode::Backspace if dialog.field == EditField::Notes => {
                let mut notes = dialog.form.notes.clone();
                notes.pop();
                dialog.form.set_notes(&notes);
            }
            KeyCode::Char(c) if dialog.field == EditField::Notes => {
                let mut notes = dialog.form.notes.clone();
                notes.push(c);
                dialog.form.set_notes(&notes);
            }
            _ => {}
        }

        None
    }
}

fn step_field(field: EditField, forward: bool) -> EditField {
    let len = EditField::ALL.len();
    let i = EditField::ALL.iter().position(|f| *f == field).unwrap_or(0);
    let next = if forward { (i + 1) % len } else { (i + len - 1) % len };
    EditField::ALL[next]
}

pub fn run_ui(app: &mut App, runtime: &Runtime) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app, runtime);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "UI loop failed");
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runtime: &Runtime,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if let Some(op) = app.handle_key(key) {
                // Draw the busy overlay, then block on the delay
                app.busy = Some(op.label());
                terminal.draw(|f| ui(f, app))?;

                let cancel = CancellationToken::new();
                match op {
                    PendingOp::Save => runtime.block_on(app.save_edit(&cancel)),
                    PendingOp::Import => runtime.block_on(app.confirm_import(&cancel)),
                }
                app.busy = None;
            }

            if app.should_quit {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_tab {
        Tab::Dashboard => render_dashboard(f, chunks[1], app),
        Tab::Units => render_units(f, chunks[1], app),
        Tab::Import => render_import(f, chunks[1], app),
        Tab::History => render_history(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);

    // Modals, innermost last
    if app.edit.is_some() {
        render_edit_dialog(f, app);
    }
    if let Some(message) = &app.alert {
        render_message(f, " Aviso ", message, Color::Yellow);
    }
    if let Some(label) = app.busy {
        render_message(f, "", label, Color::Cyan);
    }
}

fn status_color(status: Status) -> Color {
    match status {
        Status::Free => Color::Green,
        Status::Blocked => Color::Yellow,
        Status::Reserved => Color::Red,
    }
}

fn header_cell(text: &str) -> Cell<'_> {
    Cell::from(text).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let overall = stats::group_stats(app.inventory.units());

    let mut tab_spans = vec![Span::styled(
        format!(" {} ", app.config.display_title()),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];
    tab_spans.push(Span::raw(" "));

    for (i, tab) in Tab::ALL.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *tab == app.current_tab {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(tab.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Total: {}", overall.total),
        Style::default().fg(Color::White),
    ));
    for status in Status::ALL {
        tab_spans.push(Span::raw("  "));
        tab_spans.push(Span::styled(
            format!("● {}", overall.count(status)),
            Style::default().fg(status_color(status)),
        ));
    }

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_dashboard(f: &mut Frame, area: Rect, app: &App) {
    if app.inventory.is_empty() {
        let content = vec![
            Line::from(""),
            Line::from(Span::styled(
                "No hay viviendas",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Comienza importando viviendas desde la pestaña \"Importar\"",
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Los datos se mantienen durante la sesión actual",
                Style::default().fg(Color::Blue),
            )),
        ];
        let empty = Paragraph::new(content)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Dashboard "));
        f.render_widget(empty, area);
        return;
    }

    let dashboard = stats::dashboard(app.inventory.units());

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(0)])
        .split(area);

    // Stat cards
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(rows[0]);

    let total = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("{}", dashboard.overall.total),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).title(" Total Viviendas "));
    f.render_widget(total, cards[0]);

    for (i, status) in Status::ALL.iter().enumerate() {
        let color = status_color(*status);
        let card = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("{}", dashboard.overall.count(*status)),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("{}%", dashboard.overall.percentage(*status)),
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(format!(" {} ", status.plural())),
        );
        f.render_widget(card, cards[i + 1]);
    }

    // Per-section cards
    let outer = Block::default()
        .borders(Borders::ALL)
        .title(" Distribución por Portal ");
    let inner = outer.inner(rows[1]);
    f.render_widget(outer, rows[1]);

    let section_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(inner);

    for (i, section) in dashboard.sections.iter().enumerate() {
        let card = Paragraph::new(section_lines(&section.stats)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Portal {} ", section.section)),
        );
        f.render_widget(card, section_areas[i]);
    }
}

fn section_lines(stats: &GroupStats) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::raw("  Total: "),
        Span::styled(
            format!("{}", stats.total),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ])];

    for status in Status::ALL {
        let color = status_color(status);
        lines.push(Line::from(vec![
            Span::styled(format!("  {}: ", status.plural()), Style::default().fg(color)),
            Span::styled(
                format!("{}", stats.count(status)),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
        ]));
    }

    lines
}

fn render_units(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    render_filter_bar(f, chunks[0], app);

    if app.inventory.is_empty() {
        let empty = Paragraph::new("No hay viviendas. Importa un archivo Excel para comenzar.")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Viviendas "));
        f.render_widget(empty, chunks[1]);
        return;
    }

    let header = Row::new(
        ["Vivienda", "Tipología", "Superficie", "Precio", "Estado", "Responsable"]
            .into_iter()
            .map(header_cell),
    )
    .style(Style::default().bg(Color::DarkGray))
    .height(1);

    let units = app.filtered_units();
    let rows: Vec<Row> = units
        .iter()
        .map(|unit| {
            let color = status_color(unit.status);
            let bedrooms = if unit.bedrooms == 1 { "dormitorio" } else { "dormitorios" };

            let cells = vec![
                Cell::from(vec![
                    Line::from(Span::styled(unit.label(), Style::default().add_modifier(Modifier::BOLD))),
                    Line::from(Span::styled(
                        format!("Portal {} - Planta {}", unit.section, unit.floor),
                        Style::default().fg(Color::DarkGray),
                    )),
                ]),
                Cell::from(vec![
                    Line::from(unit.typology.clone()),
                    Line::from(Span::styled(
                        format!("{} {}", unit.bedrooms, bedrooms),
                        Style::default().fg(Color::DarkGray),
                    )),
                ]),
                Cell::from(vec![
                    Line::from(format!("{:.2} m²", unit.surface_total)),
                    Line::from(Span::styled(
                        format!(
                            "Viv: {:.2} m² + Ter: {:.2} m²",
                            unit.surface_living, unit.surface_terraces
                        ),
                        Style::default().fg(Color::DarkGray),
                    )),
                ]),
                Cell::from(format_eur(unit.price)),
                Cell::from(unit.status.as_str()).style(Style::default().fg(color)),
                Cell::from(vec![
                    Line::from(dash_if_empty(&unit.agent)),
                    Line::from(Span::styled(
                        dash_if_empty(&unit.company),
                        Style::default().fg(Color::DarkGray),
                    )),
                ]),
            ];

            Row::new(cells).height(2)
        })
        .collect();

    let title = format!(" Viviendas ({}/{}) ", units.len(), app.inventory.len());

    let table = Table::new(
        rows,
        [
            Constraint::Length(22),
            Constraint::Length(16),
            Constraint::Length(34),
            Constraint::Length(16),
            Constraint::Length(11),
            Constraint::Min(20),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, chunks[1], &mut app.state);
}

fn render_filter_bar(f: &mut Frame, area: Rect, app: &App) {
    let value = |v: &str, all: &'static str| -> String {
        if v.is_empty() {
            all.to_string()
        } else {
            v.to_string()
        }
    };
    let status = app
        .filter
        .status
        .map(|s| s.as_str().to_string())
        .unwrap_or_else(|| "Todos".to_string());

    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
    let val = |v: String| Span::styled(v, Style::default().fg(Color::Green));

    let line = Line::from(vec![
        key(" p"),
        Span::raw(" Portal: "),
        val(value(&app.filter.section, "Todos")),
        Span::raw("  │ "),
        key("s"),
        Span::raw(" Estado: "),
        val(status),
        Span::raw("  │ "),
        key("t"),
        Span::raw(" Tipología: "),
        val(value(&app.filter.typology, "Todas")),
        Span::raw("  │ "),
        key("g"),
        Span::raw(" Gestor: "),
        val(value(&app.filter.company, "Todos")),
        Span::raw("  │ "),
        key("c"),
        Span::raw(" limpiar  "),
        key("x"),
        Span::raw(" Exportar Excel"),
    ]);

    let bar = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(" Filtros "));
    f.render_widget(bar, area);
}

fn render_import(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Notes
            Constraint::Length(3), // Path input
            Constraint::Min(0),    // Preview
        ])
        .split(area);

    let notes = Paragraph::new(vec![
        Line::from(Span::styled(
            " Los datos se mantienen solo durante la sesión actual.",
            Style::default().fg(Color::Blue),
        )),
        Line::from(vec![
            Span::raw(" Descargar plantilla: "),
            Span::styled("Ctrl+T", Style::default().fg(Color::Yellow)),
            Span::raw(format!(
                " (se guarda en {})",
                app.config.output_dir.display()
            )),
        ]),
        Line::from(" Formatos: .xlsx, .xls, .ods, .csv (solo la primera hoja)"),
    ])
    .wrap(Wrap { trim: false })
    .block(Block::default().borders(Borders::ALL).title(" Importar Viviendas "));
    f.render_widget(notes, chunks[0]);

    let input = Paragraph::new(Line::from(vec![
        Span::raw(app.import_path.clone()),
        Span::styled("█", Style::default().fg(Color::Yellow)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Archivo (Enter para previsualizar) "),
    );
    f.render_widget(input, chunks[1]);

    let Some(preview) = &app.preview else {
        return;
    };

    let header = Row::new(preview.headers.iter().map(|h| header_cell(h.as_str())))
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows: Vec<Row> = preview
        .rows
        .iter()
        .map(|row| {
            Row::new(
                preview
                    .headers
                    .iter()
                    .map(|h| Cell::from(row.get(h).map(|v| v.as_text()).unwrap_or_default())),
            )
        })
        .collect();

    let widths = vec![Constraint::Min(8); preview.headers.len().max(1)];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(
                " Vista previa: {} ({} filas) - Enter para confirmar, Esc para descartar ",
                preview.file_name, preview.total_rows
            )),
    );
    f.render_widget(table, chunks[2]);
}

fn render_history(f: &mut Frame, area: Rect, app: &mut App) {
    if app.inventory.history_len() == 0 {
        let empty = Paragraph::new("No hay cambios registrados")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Historial de Cambios "));
        f.render_widget(empty, area);
        return;
    }

    let rows: Vec<Row> = app
        .inventory
        .history()
        .map(|entry| {
            Row::new(vec![
                Cell::from(vec![
                    Line::from(Span::styled(
                        entry.headline(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        entry.detail.clone(),
                        Style::default().fg(Color::DarkGray),
                    )),
                ]),
                Cell::from(
                    entry
                        .timestamp
                        .with_timezone(&Local)
                        .format("%d/%m/%Y, %H:%M:%S")
                        .to_string(),
                ),
            ])
            .height(2)
        })
        .collect();

    let table = Table::new(rows, [Constraint::Min(40), Constraint::Length(22)])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Historial de Cambios "),
        )
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.history_state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));

    let mut spans = Vec::new();
    match app.current_tab {
        Tab::Units => {
            let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);
            spans.push(Span::styled(
                format!(" Fila: {}/{} ", selected, app.filtered_units().len()),
                Style::default().fg(Color::Cyan),
            ));
            spans.push(Span::raw(" | "));
            spans.push(key("Enter"));
            spans.push(Span::raw(" Editar | "));
            spans.push(key("↑/↓"));
            spans.push(Span::raw(" Nav | "));
        }
        Tab::Import => {
            spans.push(key(" Enter"));
            spans.push(Span::raw(" Previsualizar/Confirmar | "));
            spans.push(key("Esc"));
            spans.push(Span::raw(" Descartar | "));
        }
        Tab::History => {
            spans.push(Span::styled(
                format!(" {} cambios ", app.inventory.history_len()),
                Style::default().fg(Color::Cyan),
            ));
            spans.push(Span::raw(" | "));
            spans.push(key("↑/↓"));
            spans.push(Span::raw(" Nav | "));
        }
        Tab::Dashboard => spans.push(Span::raw(" ")),
    }

    spans.push(key("Tab"));
    spans.push(Span::raw(" Pestaña | "));
    if app.current_tab == Tab::Import {
        spans.push(Span::styled("Ctrl+C", Style::default().fg(Color::Red)));
    } else {
        spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    }
    spans.push(Span::raw(" Salir"));

    let status_bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_edit_dialog(f: &mut Frame, app: &App) {
    let Some(dialog) = &app.edit else {
        return;
    };
    let form = &dialog.form;
    let roster = app.inventory.roster();

    let area = centered_rect(60, 60, f.size());
    f.render_widget(Clear, area);

    let mut lines = vec![Line::from("")];

    if form.is_free() {
        lines.push(Line::from(Span::styled(
            "  Nota: al cambiar a estado \"Libre\" se eliminarán la empresa y el responsable.",
            Style::default().fg(Color::Blue),
        )));
        lines.push(Line::from(""));
    }

    for field in EditField::ALL {
        let value = match field {
            EditField::Status => form
                .status
                .map(|s| s.as_str().to_string())
                .unwrap_or_else(|| "Seleccionar estado".to_string()),
            EditField::Company if !form.company_enabled() => {
                "No aplicable para viviendas libres".to_string()
            }
            EditField::Company => dash_or(&form.company, "Seleccionar empresa"),
            EditField::Agent if form.agent_options(roster).is_empty() => "-".to_string(),
            EditField::Agent => dash_or(&form.agent, "Seleccionar responsable"),
            EditField::Notes => form.notes.clone(),
        };

        let focused = field == dialog.field;
        let marker = if focused { "→ " } else { "  " };
        let value_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let arrows = match field {
            EditField::Notes if focused => "█",
            EditField::Notes => "",
            _ if focused => "  ◀ ▶",
            _ => "",
        };

        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(
                format!("{:<14}", field.label()),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(value, value_style),
            Span::styled(arrows, Style::default().fg(Color::DarkGray)),
        ]));
        lines.push(Line::from(""));
    }

    let save_style = if form.can_save() {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled("Enter Guardar", save_style),
        Span::raw("   "),
        Span::styled("Esc Cancelar", Style::default().fg(Color::Red)),
    ]));

    let popup = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(format!(" Editar Vivienda {} ", form.unit_label)),
    );

    f.render_widget(popup, area);
}

fn render_message(f: &mut Frame, title: &str, message: &str, color: Color) {
    let area = centered_rect(50, 20, f.size());
    f.render_widget(Clear, area);

    let popup = Paragraph::new(vec![
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Pulsa cualquier tecla",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(title.to_string()),
    );

    f.render_widget(popup, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn dash_if_empty(s: &str) -> String {
    dash_or(s, "-")
}

fn dash_or(s: &str, placeholder: &str) -> String {
    if s.is_empty() {
        placeholder.to_string()
    } else {
        s.to_string()
    }
}

/// Spanish euro format: 200000.5 → "200.000,50 €"
pub fn format_eur(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}{},{:02} €", sign, grouped, frac)
}
