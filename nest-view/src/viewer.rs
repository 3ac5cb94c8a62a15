//! Live nested-circle layout viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a [`Layout`] and implements
//! [`eframe::App`] to step it, draw it and tweak its constants through an
//! egui UI.

use eframe::App;
use glam::DVec2;
use nest_core::partition::fit_region;
use nest_core::{
    Canvas, Circle, Colour, Layout, LayoutConfig, LayoutResult, Outcome, StopSignal, Tree,
};
use rand::rng;
use tracing::{debug, error, info};

use crate::scenes::Scene;

/// Drawing surface assumed until the first frame reports the real one.
const INITIAL_SURFACE: egui::Vec2 = egui::Vec2::new(800.0, 600.0);

fn to_color32(c: Colour) -> egui::Color32 {
    egui::Color32::from_rgb(c.r, c.g, c.b)
}

/// Maps layout coordinates onto the central panel.
///
/// ### Fields
/// - `focus` - Layout point drawn at the panel centre before panning; the
///   centre of the root region after every spread.
/// - `zoom` - Screen pixels per layout unit.
/// - `pan` - Screen offset added by dragging.
///
/// Layout y grows upwards, screen y downwards.
#[derive(Clone, Copy, Debug)]
struct Camera {
    focus: DVec2,
    zoom: f32,
    pan: egui::Vec2,
}

impl Camera {
    fn looking_at(focus: DVec2) -> Self {
        Self {
            focus,
            zoom: 1.0,
            pan: egui::Vec2::ZERO,
        }
    }

    fn world_to_screen(&self, p: DVec2, rect: egui::Rect) -> egui::Pos2 {
        let offset = (p - self.focus).as_vec2() * self.zoom;
        rect.center() + self.pan + egui::vec2(offset.x, -offset.y)
    }

    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> DVec2 {
        let offset = (p - rect.center() - self.pan) / self.zoom;
        self.focus + DVec2::new(offset.x as f64, -offset.y as f64)
    }
}

/// [`Canvas`] backed by an egui painter for the current frame.
struct PainterCanvas<'a> {
    painter: &'a egui::Painter,
    rect: egui::Rect,
    camera: Camera,
}

impl Canvas for PainterCanvas<'_> {
    fn clear(&mut self, colour: Colour) {
        self.painter.rect_filled(self.rect, 0.0, to_color32(colour));
    }

    fn circle(&mut self, center: DVec2, radius: f64, colour: Colour) {
        self.painter.circle_stroke(
            self.camera.world_to_screen(center, self.rect),
            radius as f32 * self.camera.zoom,
            egui::Stroke::new(1.0, to_color32(colour)),
        );
    }

    fn polygon(&mut self, corners: &[DVec2], colour: Colour) {
        let points = corners
            .iter()
            .map(|&c| self.camera.world_to_screen(c, self.rect))
            .collect();
        self.painter.add(egui::Shape::closed_line(
            points,
            egui::Stroke::new(1.0, to_color32(colour)),
        ));
    }

    fn present(&mut self) {
        // egui submits the frame once `update` returns.
    }
}

/// Escape asks the viewer to quit.
struct QuitKey<'a>(&'a egui::Context);

impl StopSignal for QuitKey<'_> {
    fn stop_requested(&mut self) -> bool {
        self.0.input(|i| i.key_pressed(egui::Key::Escape))
    }
}

/// Main application state for the viewer.
///
/// ### Fields
/// - `layout` - The running simulation.
/// - `cfg` - Constants being edited in the side panel; applied on restart.
/// - `scene` - Which demo tree to build on restart.
/// - `surface` - Size of the central panel the root region is fitted to.
/// - `running` - Whether steps are taken automatically each frame.
/// - `steps_per_frame` - How many solver steps run per repaint while running.
/// - `outcome` - Why the last run stopped, if it did.
/// - `last_error` - Message of the last layout error, shown in the status bar.
pub struct Viewer {
    layout: Layout,
    cfg: LayoutConfig,
    scene: Scene,
    surface: egui::Vec2,

    rng: rand::rngs::ThreadRng,

    running: bool,
    steps_per_frame: usize,
    camera: Camera,

    outcome: Option<Outcome>,
    last_error: Option<String>,
}

/// Root region for a panel of `surface` pixels at zoom 1.
fn region_for(surface: egui::Vec2, cfg: &LayoutConfig) -> Circle {
    fit_region(surface.x as f64, surface.y as f64, cfg)
}

fn build_layout(
    scene: Scene,
    cfg: LayoutConfig,
    region: Circle,
    rng: &mut impl rand::Rng,
) -> LayoutResult<Layout> {
    let mut tree = Tree::new();
    tree.graft(&scene.shape(rng))?;
    let mut layout = Layout::new(tree, cfg)?;
    layout.spread(region)?;
    Ok(layout)
}

impl Viewer {
    /// Creates a viewer showing the dog scene, spread and paused.
    pub fn new(cfg: LayoutConfig) -> LayoutResult<Self> {
        let mut rng = rng();
        let scene = Scene::Dog;
        let region = region_for(INITIAL_SURFACE, &cfg);
        let layout = build_layout(scene, cfg, region, &mut rng)?;

        Ok(Self {
            layout,
            cfg,
            scene,
            surface: INITIAL_SURFACE,
            rng,
            running: false,
            steps_per_frame: 1,
            camera: Camera::looking_at(region.center),
            outcome: None,
            last_error: None,
        })
    }

    /// Rebuilds the selected scene with the edited constants and stops
    /// auto-running. On failure the previous layout stays on screen.
    fn reset(&mut self) {
        let region = region_for(self.surface, &self.cfg);
        match build_layout(self.scene, self.cfg, region, &mut self.rng) {
            Ok(layout) => {
                info!(scene = self.scene.label(), nodes = layout.tree().len(), "reset");
                self.layout = layout;
                self.camera = Camera::looking_at(region.center);
                self.last_error = None;
            }
            Err(e) => self.report(e),
        }
        self.outcome = None;
        self.running = false;
    }

    /// Records the panel size. A layout that has not stepped yet is spread
    /// again to fill the new size; one in progress keeps its placements.
    fn fit_to(&mut self, surface: egui::Vec2) {
        if surface == self.surface || surface.x <= 0.0 || surface.y <= 0.0 {
            return;
        }
        self.surface = surface;
        if self.layout.iterations() > 0 {
            return;
        }

        let region = region_for(surface, self.layout.config());
        match self.layout.spread(region) {
            Ok(()) => {
                debug!(width = surface.x, height = surface.y, "refitted root region");
                self.camera = Camera::looking_at(region.center);
            }
            Err(e) => self.report(e),
        }
    }

    fn report(&mut self, e: nest_core::LayoutError) {
        error!("{e}");
        self.last_error = Some(e.to_string());
        self.running = false;
    }

    /// Advances the simulation by one solver step and records why it
    /// should stop, if it should.
    fn step_once(&mut self) {
        match self.layout.step() {
            Ok(energy) => {
                if energy <= self.layout.config().min_energy {
                    self.outcome = Some(Outcome::Converged);
                    self.running = false;
                    info!(iterations = self.layout.iterations(), "converged");
                } else if self.layout.iterations() >= self.layout.config().max_iterations {
                    self.outcome = Some(Outcome::IterationLimit);
                    self.running = false;
                }
            }
            Err(e) => self.report(e),
        }
    }

    /// One config row: the field name, then a drag value clamped to `range`.
    fn config_row<N: egui::emath::Numeric>(
        ui: &mut egui::Ui,
        name: &str,
        value: &mut N,
        range: std::ops::RangeInclusive<N>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(format!("{name}:"));
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Builds the top panel UI (run controls, stepping, scene, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                    if self.running {
                        self.outcome = None;
                    }
                }

                if ui.button("Step").clicked() {
                    self.step_once();
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                egui::ComboBox::from_label("Scene")
                    .selected_text(self.scene.label())
                    .show_ui(ui, |ui| {
                        for scene in Scene::ALL {
                            ui.selectable_value(&mut self.scene, scene, scene.label());
                        }
                    });

                ui.add(
                    egui::DragValue::new(&mut self.steps_per_frame)
                        .prefix("steps/frame = ")
                        .range(1..=100),
                );

                ui.separator();
                ui.add(egui::Slider::new(&mut self.camera.zoom, 0.1..=10.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (iterations, energy, nodes, outcome).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                match self.layout.energy() {
                    Some(e) => ui.label(format!("energy = {e:.3e}")),
                    None => ui.label("energy = -"),
                };
                ui.label(format!("iterations = {}", self.layout.iterations()));
                ui.separator();
                ui.label(format!("nodes = {}", self.layout.tree().len()));
                if let Some(outcome) = self.outcome {
                    ui.label(format!("{outcome:?}"));
                }
                if let Some(msg) = &self.last_error {
                    ui.colored_label(egui::Color32::RED, msg.as_str());
                }
            });
        });
    }

    /// Builds the right-hand panel for the layout constants.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Config");

                let cfg = &mut self.cfg;

                ui.separator();
                ui.label("Partitioning");
                Self::config_row(
                    ui,
                    "size_proportion",
                    &mut cfg.size_proportion,
                    0.05..=0.5,
                    0.005,
                );
                Self::config_row(ui, "min_gap", &mut cfg.min_gap, 0.0..=50.0, 0.1);
                Self::config_row(
                    ui,
                    "matched",
                    &mut cfg.matched_radius_proportion,
                    0.01..=1.0,
                    0.005,
                );
                Self::config_row(
                    ui,
                    "unmatched",
                    &mut cfg.unmatched_radius_proportion,
                    0.01..=1.0,
                    0.005,
                );
                Self::config_row(
                    ui,
                    "circle",
                    &mut cfg.circle_radius_proportion,
                    0.01..=1.0,
                    0.005,
                );

                ui.separator();
                ui.label("Gathering");
                Self::config_row(ui, "gather_base", &mut cfg.gather_base, 0.0..=5.0, 0.01);
                Self::config_row(
                    ui,
                    "max_gather_force",
                    &mut cfg.max_gather_force,
                    0.01..=10.0,
                    0.01,
                );
                Self::config_row(
                    ui,
                    "gather_proportion",
                    &mut cfg.gather_proportion,
                    0.1..=100.0,
                    0.1,
                );

                ui.separator();
                ui.label("Repulsion");
                Self::config_row(
                    ui,
                    "force_proportion",
                    &mut cfg.force_proportion,
                    1.0..=100_000.0,
                    10.0,
                );
                Self::config_row(
                    ui,
                    "max_repulsion_force",
                    &mut cfg.max_repulsion_force,
                    0.01..=100.0,
                    0.1,
                );

                ui.separator();
                ui.label("Termination");
                Self::config_row(ui, "min_energy", &mut cfg.min_energy, 0.0..=1.0, 1e-6);
                Self::config_row(
                    ui,
                    "max_iterations",
                    &mut cfg.max_iterations,
                    1..=1_000_000,
                    10.0,
                );

                ui.separator();
                if ui.button("Apply and restart").clicked() {
                    self.reset();
                }
                if ui.button("Reset cfg to default").clicked() {
                    self.cfg = LayoutConfig::default();
                }
            });
    }

    /// Builds the central panel where the layout is drawn.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);
            self.fit_to(rect.size());

            // Pan with drag.
            if response.dragged() {
                self.camera.pan += response.drag_delta();
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                let world_before = self.camera.screen_to_world(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.camera.zoom = (self.camera.zoom * factor).clamp(0.1, 10.0);

                let screen_after = self.camera.world_to_screen(world_before, rect);
                self.camera.pan += pointer_screen - screen_after;
            }

            if self.running {
                for _ in 0..self.steps_per_frame {
                    self.step_once();
                    if !self.running {
                        break;
                    }
                }
                ctx.request_repaint();
            }

            let mut canvas = PainterCanvas {
                painter: &painter,
                rect,
                camera: self.camera,
            };
            if let Err(e) = self.layout.draw(&mut canvas) {
                self.report(e);
            }
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    ///
    /// Escape closes the window before anything else runs.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if QuitKey(ctx).stop_requested() {
            info!(iterations = self.layout.iterations(), "quit requested");
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}
