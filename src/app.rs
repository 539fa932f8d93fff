use std::path::PathBuf;

use chrono::Utc;
use eframe::egui;
use egui_commonmark::{CommonMarkCache, CommonMarkViewer};

use crate::document::{document_count_label, relative_date_label, DocumentStore};
use crate::headings::{extract_headings, Heading};
use crate::ingest::{self, ImportedFile, IngestError};
use crate::navigator::{OutlineNavigator, ScrollBehavior, Viewport};
use crate::outline::{build_outline, OutlineNode};
use crate::persistence;
use crate::scroll::{self, ScrollControls};
use crate::viewport::{heading_origin, ContentViewport, ScrollRequest, ScrollTarget, ViewportMetrics};

const APP_TITLE: &str = "Markdown Reader";
const MAX_TITLE_CHARS: usize = 40;

/// User actions collected while drawing and applied after the frame's UI pass
enum Action {
    ImportBatch(Vec<ingest::Result<ImportedFile>>),
    OpenDialog,
    Select(String),
    Delete(String),
    ToggleDarkMode,
    ToggleSidebar,
    ToggleOutline,
    CloseOutline,
    ToggleExpand(String),
    Navigate(String),
    ScrollToTop,
    ScrollToBottom,
    Quit,
}

pub struct ReaderApp {
    cache: CommonMarkCache,
    store: DocumentStore,
    dark_mode: bool,
    error_message: Option<String>,
    is_dragging: bool,
    sidebar_collapsed: bool,
    // Outline for the selected document, rebuilt when the selection changes
    outline_source: Option<String>,
    headings: Vec<Heading>,
    outline: Vec<OutlineNode>,
    navigator: OutlineNavigator,
    // Content scroll area state
    metrics: Option<ViewportMetrics>,
    pending_scroll: Option<ScrollRequest>,
    // Unsaved changes, written through eframe storage at the end of the frame
    documents_dirty: bool,
    dark_mode_dirty: bool,
}

impl ReaderApp {
    pub fn new(cc: &eframe::CreationContext<'_>, files: Vec<PathBuf>) -> Self {
        Self::from_storage(cc.storage, &files)
    }

    /// Restore persisted state, then import the files named on the command line
    fn from_storage(storage: Option<&dyn eframe::Storage>, files: &[PathBuf]) -> Self {
        let documents = persistence::load_documents(storage);
        let dark_mode = persistence::load_dark_mode(storage);
        log::info!("Loaded {} persisted documents", documents.len());

        let mut app = Self {
            cache: CommonMarkCache::default(),
            store: DocumentStore::from_documents(documents),
            dark_mode,
            error_message: None,
            is_dragging: false,
            sidebar_collapsed: false,
            outline_source: None,
            headings: Vec::new(),
            outline: Vec::new(),
            navigator: OutlineNavigator::new(),
            metrics: None,
            pending_scroll: None,
            documents_dirty: false,
            dark_mode_dirty: false,
        };

        app.import_cli_files(files);
        app
    }

    /// Command-line files are imported on every launch. A file that is already
    /// in the library with the same name and content is selected instead of
    /// being added again.
    fn import_cli_files(&mut self, files: &[PathBuf]) {
        let mut fresh = Vec::new();
        for result in files.iter().map(|path| ingest::import_path(path)) {
            let existing = match &result {
                Ok(file) => self
                    .store
                    .find_copy(&file.filename, &file.content)
                    .map(|doc| doc.id.clone()),
                Err(_) => None,
            };
            match existing {
                Some(id) => {
                    log::info!("Already imported, selecting {}", id);
                    self.store.select_document(&id);
                }
                None => fresh.push(result),
            }
        }
        if !fresh.is_empty() {
            self.import_batch(fresh);
        }
    }

    fn window_title(&self) -> String {
        match self.store.selected() {
            Some(doc) => format!("{} - {}", doc.name, APP_TITLE),
            None => APP_TITLE.to_string(),
        }
    }

    /// Import one batch of files. The batch replaces any earlier notice, and a
    /// rejection inside the batch stays visible after later files succeed.
    fn import_batch(&mut self, results: Vec<ingest::Result<ImportedFile>>) {
        self.error_message = None;
        for result in results {
            match result {
                Ok(file) => {
                    self.store.add_document(&file.filename, file.content);
                    self.documents_dirty = true;
                }
                Err(e) => self.report_ingest_error(e),
            }
        }
    }

    fn report_ingest_error(&mut self, error: IngestError) {
        if error.is_user_facing() {
            log::warn!("Rejected import: {:?}", error);
            self.error_message = Some(error.to_string());
        } else {
            log::error!("Import abandoned: {}", error);
        }
    }

    fn open_file_dialog(&mut self) {
        let Some(paths) = rfd::FileDialog::new()
            .add_filter("Markdown", &["md", "markdown"])
            .pick_files()
        else {
            return;
        };
        let results = paths.iter().map(|path| ingest::import_path(path)).collect();
        self.import_batch(results);
    }

    /// Rebuild the outline when the selected document changed since the last frame
    fn sync_outline(&mut self) {
        let selected = self.store.selected_id().map(str::to_string);
        if selected == self.outline_source {
            return;
        }

        match self.store.selected() {
            Some(doc) => {
                self.headings = extract_headings(&doc.content);
                self.outline = build_outline(&self.headings);
                log::debug!(
                    "Built outline for '{}' with {} headings",
                    doc.name,
                    self.headings.len()
                );
                // Start the newly selected document from the top
                self.pending_scroll = Some(ScrollRequest {
                    target: ScrollTarget::To(0.0),
                    behavior: ScrollBehavior::Instant,
                });
            }
            None => {
                self.headings.clear();
                self.outline.clear();
                self.metrics = None;
                self.pending_scroll = None;
            }
        }

        self.outline_source = selected;
        self.navigator.reset();
        self.cache.clear_header_positions();
    }

    /// Run `f` against the content viewport, which only exists once a document
    /// has been rendered
    fn with_viewport<R>(
        &mut self,
        f: impl FnOnce(&mut OutlineNavigator, Option<&mut dyn Viewport>) -> R,
    ) -> R {
        match self.metrics {
            Some(metrics) => {
                let mut viewport = ContentViewport {
                    metrics,
                    positions: &self.cache,
                    headings: &self.headings,
                    pending: &mut self.pending_scroll,
                };
                f(&mut self.navigator, Some(&mut viewport as &mut dyn Viewport))
            }
            None => f(&mut self.navigator, None),
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::ImportBatch(results) => self.import_batch(results),
            Action::OpenDialog => self.open_file_dialog(),
            Action::Select(id) => {
                self.store.select_document(&id);
            }
            Action::Delete(id) => {
                if self.store.delete_document(&id).is_some() {
                    self.documents_dirty = true;
                }
            }
            Action::ToggleDarkMode => {
                self.dark_mode = !self.dark_mode;
                self.dark_mode_dirty = true;
            }
            Action::ToggleSidebar => self.sidebar_collapsed = !self.sidebar_collapsed,
            Action::ToggleOutline => self.navigator.toggle_panel(),
            Action::CloseOutline => self.navigator.close_panel(),
            Action::ToggleExpand(id) => self.navigator.toggle_expand(&id),
            Action::Navigate(id) => {
                let scrolled = self.with_viewport(|nav, viewport| nav.navigate_to(&id, viewport));
                log::debug!("Navigate to '{}': scrolled={}", id, scrolled);
            }
            Action::ScrollToTop => {
                self.with_viewport(|_, viewport| {
                    if let Some(viewport) = viewport {
                        scroll::scroll_to_top(viewport);
                    }
                });
            }
            Action::ScrollToBottom => {
                self.with_viewport(|_, viewport| {
                    if let Some(viewport) = viewport {
                        scroll::scroll_to_bottom(viewport);
                    }
                });
            }
            // Handled in update, which owns the egui context
            Action::Quit => {}
        }
    }

    /// Write changed state through to storage
    fn persist(&mut self, storage: &mut dyn eframe::Storage) {
        if !self.documents_dirty && !self.dark_mode_dirty {
            return;
        }
        if self.documents_dirty {
            persistence::save_documents(storage, self.store.documents());
        }
        if self.dark_mode_dirty {
            persistence::save_dark_mode(storage, self.dark_mode);
        }
        storage.flush();
        self.documents_dirty = false;
        self.dark_mode_dirty = false;
    }

    fn handle_shortcuts(&self, ctx: &egui::Context, actions: &mut Vec<Action>) {
        ctx.input(|i| {
            // Ctrl+O: Import file
            if i.modifiers.ctrl && !i.modifiers.shift && i.key_pressed(egui::Key::O) {
                actions.push(Action::OpenDialog);
            }
            // Ctrl+Shift+O: Toggle outline
            if i.modifiers.ctrl && i.modifiers.shift && i.key_pressed(egui::Key::O) {
                actions.push(Action::ToggleOutline);
            }
            // Ctrl+B: Toggle document sidebar
            if i.modifiers.ctrl && i.key_pressed(egui::Key::B) {
                actions.push(Action::ToggleSidebar);
            }
            // Ctrl+D: Toggle dark mode
            if i.modifiers.ctrl && i.key_pressed(egui::Key::D) {
                actions.push(Action::ToggleDarkMode);
            }
            // Ctrl+Q: Quit
            if i.modifiers.ctrl && i.key_pressed(egui::Key::Q) {
                actions.push(Action::Quit);
            }
            if i.key_pressed(egui::Key::Escape) && self.navigator.is_open() {
                actions.push(Action::CloseOutline);
            }
        });
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context, actions: &mut Vec<Action>) {
        let (hovering, dropped) =
            ctx.input(|i| (!i.raw.hovered_files.is_empty(), i.raw.dropped_files.clone()));
        self.is_dragging = hovering;

        if !dropped.is_empty() {
            actions.push(Action::ImportBatch(
                dropped.iter().map(ingest::import_dropped).collect(),
            ));
        }
    }

    fn menu_bar(&self, ctx: &egui::Context, actions: &mut Vec<Action>) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.add(egui::Button::new("Import...").shortcut_text("Ctrl+O")).clicked() {
                        actions.push(Action::OpenDialog);
                        ui.close();
                    }

                    ui.separator();

                    if ui.add(egui::Button::new("Quit").shortcut_text("Ctrl+Q")).clicked() {
                        actions.push(Action::Quit);
                        ui.close();
                    }
                });

                ui.menu_button("View", |ui| {
                    let theme_text = if self.dark_mode { "☀ Light Mode" } else { "🌙 Dark Mode" };
                    if ui.add(egui::Button::new(theme_text).shortcut_text("Ctrl+D")).clicked() {
                        actions.push(Action::ToggleDarkMode);
                        ui.close();
                    }

                    let sidebar_text = if self.sidebar_collapsed { "Show Documents" } else { "✓ Show Documents" };
                    if ui.add(egui::Button::new(sidebar_text).shortcut_text("Ctrl+B")).clicked() {
                        actions.push(Action::ToggleSidebar);
                        ui.close();
                    }

                    let outline_text = if self.navigator.is_open() { "✓ Table of Contents" } else { "Table of Contents" };
                    let has_outline = !self.outline.is_empty();
                    if ui
                        .add_enabled(has_outline, egui::Button::new(outline_text).shortcut_text("Ctrl+Shift+O"))
                        .clicked()
                    {
                        actions.push(Action::ToggleOutline);
                        ui.close();
                    }
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if !self.outline.is_empty() && ui.button("☰ Contents").on_hover_text("Toggle table of contents").clicked() {
                        actions.push(Action::ToggleOutline);
                    }
                    if let Some(doc) = self.store.selected() {
                        ui.separator();
                        ui.label(
                            egui::RichText::new(&doc.name)
                                .small()
                                .color(ui.visuals().weak_text_color()),
                        );
                    }
                });
            });
        });
    }

    fn document_sidebar(&self, ctx: &egui::Context, actions: &mut Vec<Action>) {
        if self.sidebar_collapsed {
            egui::SidePanel::left("documents_collapsed")
                .resizable(false)
                .exact_width(28.0)
                .show(ctx, |ui| {
                    ui.add_space(4.0);
                    if ui.small_button("▶").on_hover_text("Expand sidebar").clicked() {
                        actions.push(Action::ToggleSidebar);
                    }
                });
            return;
        }

        egui::SidePanel::left("documents")
            .resizable(true)
            .default_width(260.0)
            .min_width(180.0)
            .max_width(400.0)
            .show(ctx, |ui| {
                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    ui.heading("Documents");
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("◀").on_hover_text("Collapse sidebar").clicked() {
                            actions.push(Action::ToggleSidebar);
                        }
                        let theme_icon = if self.dark_mode { "☀" } else { "🌙" };
                        if ui.small_button(theme_icon).on_hover_text("Toggle dark mode").clicked() {
                            actions.push(Action::ToggleDarkMode);
                        }
                    });
                });
                ui.label(
                    egui::RichText::new(document_count_label(self.store.len()))
                        .small()
                        .color(ui.visuals().weak_text_color()),
                );
                ui.separator();

                if ui.button("⬆ Import Markdown...").clicked() {
                    actions.push(Action::OpenDialog);
                }
                ui.label(
                    egui::RichText::new("or drop a .md / .markdown file")
                        .small()
                        .color(ui.visuals().weak_text_color()),
                );
                ui.separator();

                if self.store.is_empty() {
                    ui.add_space(24.0);
                    ui.vertical_centered(|ui| {
                        ui.label(
                            egui::RichText::new("No documents yet. Import a markdown file to get started.")
                                .color(ui.visuals().weak_text_color()),
                        );
                    });
                    return;
                }

                let now = Utc::now();
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        for doc in self.store.documents() {
                            let selected = self.store.selected_id() == Some(doc.id.as_str());
                            ui.horizontal(|ui| {
                                let response = ui.vertical(|ui| {
                                    let name = ui.selectable_label(selected, truncate_title(&doc.name));
                                    ui.label(
                                        egui::RichText::new(relative_date_label(doc.updated_at, now))
                                            .small()
                                            .color(ui.visuals().weak_text_color()),
                                    );
                                    name
                                });
                                if response.inner.clicked() {
                                    actions.push(Action::Select(doc.id.clone()));
                                }
                                ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                                    if ui.small_button("✕").on_hover_text("Delete document").clicked() {
                                        actions.push(Action::Delete(doc.id.clone()));
                                    }
                                });
                            });
                            ui.add_space(4.0);
                        }
                    });
            });
    }

    fn outline_panel(&self, ctx: &egui::Context, actions: &mut Vec<Action>) {
        if !self.navigator.is_open() || self.outline.is_empty() {
            return;
        }

        egui::SidePanel::right("outline")
            .resizable(true)
            .default_width(260.0)
            .min_width(160.0)
            .max_width(420.0)
            .show(ctx, |ui| {
                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    ui.heading("Table of Contents");
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("✕").on_hover_text("Close table of contents").clicked() {
                            actions.push(Action::CloseOutline);
                        }
                    });
                });
                ui.separator();
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        outline_ui(ui, &self.outline, &self.navigator, 0, actions);
                    });
            });
    }

    fn welcome(ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() / 3.0);
            ui.heading("Welcome to Markdown Reader");
            ui.add_space(8.0);
            ui.label(
                egui::RichText::new(
                    "Import a markdown file to see it rendered. Your documents are saved locally.",
                )
                .color(ui.visuals().weak_text_color()),
            );
        });
    }

    fn content(&mut self, ctx: &egui::Context, actions: &mut Vec<Action>) {
        let mut clear_error = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(error) = &self.error_message {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("⚠").color(egui::Color32::from_rgb(255, 200, 100)));
                    ui.label(egui::RichText::new(error).color(egui::Color32::from_rgb(255, 200, 100)));
                    if ui.small_button("✕").clicked() {
                        clear_error = true;
                    }
                });
                ui.separator();
            }

            let Some(doc) = self.store.selected() else {
                Self::welcome(ui);
                return;
            };

            let mut scroll_area = egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .scroll_source(
                    egui::scroll_area::ScrollSource::SCROLL_BAR
                        | egui::scroll_area::ScrollSource::MOUSE_WHEEL,
                );

            let scroll_top = self.metrics.map(|m| m.scroll_top).unwrap_or(0.0);
            let mut smooth_delta = None;
            match self.pending_scroll.take() {
                Some(request) if request.behavior == ScrollBehavior::Instant => {
                    scroll_area = scroll_area.vertical_scroll_offset(request.offset_from(scroll_top));
                }
                Some(request) => smooth_delta = Some(request.delta_from(scroll_top)),
                None => {}
            }

            // Text re-wraps at a new width, so recorded heading positions are stale
            let content_width = ui.available_width();
            if self.metrics.is_some_and(|m| m.relayout_needed(content_width)) {
                log::debug!("Content width changed to {}, re-recording headings", content_width);
                self.cache.clear_header_positions();
            }

            let cache = &mut self.cache;
            let scroll_output = scroll_area.show_viewport(ui, |ui, _viewport| {
                if let Some(delta) = smooth_delta {
                    // Positive egui deltas move the content down, i.e. scroll up
                    ui.scroll_with_delta(egui::vec2(0.0, -delta));
                }
                cache.set_scroll_offset(heading_origin(ui.max_rect().top()));

                CommonMarkViewer::new()
                    .max_image_width(Some(800))
                    .indentation_spaces(2)
                    .show_alt_text_on_hover(true)
                    .syntax_theme_dark("base16-ocean.dark")
                    .syntax_theme_light("base16-ocean.light")
                    .line_height(1.5)
                    .paragraph_spacing(1.5)
                    .heading_spacing_above(2.0)
                    .heading_spacing_below(0.5)
                    .show(ui, cache, &doc.content);
            });

            let metrics = ViewportMetrics {
                scroll_top: scroll_output.state.offset.y,
                scroll_height: scroll_output.content_size.y,
                client_height: scroll_output.inner_rect.height(),
                content_width,
            };
            self.metrics = Some(metrics);

            let controls = ScrollControls::from_metrics(
                metrics.scroll_top,
                metrics.scroll_height,
                metrics.client_height,
            );
            if controls.visible {
                scroll_buttons(ctx, scroll_output.inner_rect, controls, actions);
            }
        });
        if clear_error {
            self.error_message = None;
        }
    }

    fn drop_overlay(&self, ctx: &egui::Context) {
        if !self.is_dragging {
            return;
        }
        let screen_rect = ctx.available_rect();
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("drop_overlay"),
        ));

        painter.rect_filled(
            screen_rect,
            0.0,
            egui::Color32::from_rgba_unmultiplied(0, 0, 0, 180),
        );

        painter.text(
            screen_rect.center(),
            egui::Align2::CENTER_CENTER,
            "Drop markdown file here",
            egui::FontId::proportional(24.0),
            egui::Color32::WHITE,
        );
    }
}

/// Shorten long titles for the side panels, respecting char boundaries
fn truncate_title(title: &str) -> String {
    if title.chars().count() > MAX_TITLE_CHARS {
        let head: String = title.chars().take(MAX_TITLE_CHARS - 3).collect();
        format!("{head}...")
    } else {
        title.to_string()
    }
}

fn outline_ui(
    ui: &mut egui::Ui,
    nodes: &[OutlineNode],
    navigator: &OutlineNavigator,
    depth: usize,
    actions: &mut Vec<Action>,
) {
    for node in nodes {
        let expanded = navigator.is_expanded(node.id());
        ui.horizontal(|ui| {
            if node.has_children() {
                let icon = if expanded { "⏷" } else { "⏵" };
                if ui.small_button(icon).clicked() {
                    actions.push(Action::ToggleExpand(node.id().to_string()));
                }
            } else if depth == 0 {
                // Line up with siblings that have a toggle
                ui.add_space(22.0);
            }

            let text = egui::RichText::new(truncate_title(&node.heading.text));
            let text = match node.heading.level {
                1 => text.strong().size(15.0),
                2 => text.strong(),
                _ => text,
            };
            if ui.selectable_label(false, text).clicked() {
                actions.push(Action::Navigate(node.id().to_string()));
            }
        });

        if node.has_children() && expanded {
            ui.indent(node.id(), |ui| {
                outline_ui(ui, &node.children, navigator, depth + 1, actions);
            });
        }
    }
}

fn scroll_buttons(
    ctx: &egui::Context,
    content_rect: egui::Rect,
    controls: ScrollControls,
    actions: &mut Vec<Action>,
) {
    egui::Area::new(egui::Id::new("scroll_controls"))
        .order(egui::Order::Foreground)
        .fixed_pos(content_rect.right_bottom() - egui::vec2(48.0, 88.0))
        .show(ctx, |ui| {
            ui.vertical(|ui| {
                if controls.show_top_button()
                    && ui.button("⬆").on_hover_text("Scroll to top").clicked()
                {
                    actions.push(Action::ScrollToTop);
                }
                if controls.show_bottom_button()
                    && ui.button("⬇").on_hover_text("Scroll to bottom").clicked()
                {
                    actions.push(Action::ScrollToBottom);
                }
            });
        });
}

impl eframe::App for ReaderApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        persistence::save_documents(storage, self.store.documents());
        persistence::save_dark_mode(storage, self.dark_mode);
    }

    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        self.sync_outline();

        ctx.set_visuals(if self.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });
        ctx.style_mut(|style| {
            style.url_in_tooltip = true;
        });
        ctx.send_viewport_cmd(egui::ViewportCommand::Title(self.window_title()));

        let mut actions = Vec::new();
        self.handle_shortcuts(ctx, &mut actions);
        self.handle_dropped_files(ctx, &mut actions);

        self.menu_bar(ctx, &mut actions);
        self.document_sidebar(ctx, &mut actions);
        self.outline_panel(ctx, &mut actions);
        self.content(ctx, &mut actions);
        self.drop_overlay(ctx);

        let had_actions = !actions.is_empty();
        for action in actions {
            if matches!(action, Action::Quit) {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                continue;
            }
            self.apply(action);
        }

        if let Some(storage) = frame.storage_mut() {
            self.persist(storage);
        }
        if had_actions || self.pending_scroll.is_some() {
            ctx.request_repaint();
        }
    }
}
