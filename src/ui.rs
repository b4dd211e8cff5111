use crate::renderer::scene_lines::project_to_screen;
use solarvis_rs::body::BodyHandle;
use solarvis_rs::camera::{CameraController, Focus, FollowMode};
use solarvis_rs::ephemeris::J2000;
use solarvis_rs::input::CursorKind;
use solarvis_rs::settings::Settings;
use solarvis_rs::world::World;

/// What the UI asks the app to do after the pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct UiResponse {
    pub jump_to_now: bool,
}

pub struct Ui {
    time_scale_exponent: f32,
}

fn toggle_label(open: bool, name: &str) -> String {
    if open {
        format!("✅ {name}")
    } else {
        format!("⬜ {name}")
    }
}

impl Ui {
    pub fn new(settings: &Settings) -> Self {
        Self {
            time_scale_exponent: settings.display.time_scale.max(1.0e-3).log10() as f32,
        }
    }

    pub fn show(
        &mut self,
        ctx: &egui::Context,
        settings: &mut Settings,
        camera: &mut CameraController,
        world: &World,
    ) -> UiResponse {
        let mut response = UiResponse::default();

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                let mut windows_changed = false;
                if ui.button(toggle_label(settings.ui.show_bodies, "Bodies")).clicked() {
                    settings.ui.show_bodies = !settings.ui.show_bodies;
                    windows_changed = true;
                }
                if ui.button(toggle_label(settings.ui.show_camera, "Camera")).clicked() {
                    settings.ui.show_camera = !settings.ui.show_camera;
                    windows_changed = true;
                }
                if ui.button(toggle_label(settings.ui.show_time, "Time")).clicked() {
                    settings.ui.show_time = !settings.ui.show_time;
                    windows_changed = true;
                }
                if windows_changed {
                    settings.ui.save();
                }

                ui.separator();

                let display = &mut settings.display;
                let mut changed = false;
                changed |= ui.checkbox(&mut display.show_orbits, "Orbits").changed();
                changed |= ui
                    .checkbox(&mut display.show_lagrange_points, "Lagrange")
                    .changed();
                changed |= ui.checkbox(&mut display.show_labels, "Labels").changed();
                changed |= ui
                    .color_edit_button_rgb(&mut display.background_color)
                    .changed();
                if changed {
                    display.save();
                }
            });
        });

        if settings.ui.show_bodies {
            self.show_bodies_window(ctx, settings, camera, world);
        }
        if settings.ui.show_camera {
            self.show_camera_window(ctx, settings, camera, world);
        }
        if settings.ui.show_time {
            response.jump_to_now = self.show_time_window(ctx, settings, world);
        }

        if settings.display.show_labels {
            self.show_labels(ctx, camera, world);
        }
        self.show_context_menu(ctx, camera, world);
        self.show_hover_tooltip(ctx, camera, world);

        if camera.cursor_kind() == CursorKind::Pointer && !ctx.is_pointer_over_area() {
            ctx.set_cursor_icon(egui::CursorIcon::PointingHand);
        }

        response
    }

    fn show_bodies_window(
        &mut self,
        ctx: &egui::Context,
        settings: &mut Settings,
        camera: &mut CameraController,
        world: &World,
    ) {
        let mut select: Option<BodyHandle> = None;
        let mut focus: Option<BodyHandle> = None;
        let mut surface: Option<BodyHandle> = None;
        let mut lagrange: Option<(String, nalgebra_glm::Vec3, f32)> = None;

        egui::Window::new("🪐 Bodies")
            .default_width(260.0)
            .resizable(true)
            .open(&mut settings.ui.show_bodies)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    egui::Grid::new("bodies_grid")
                        .num_columns(3)
                        .striped(true)
                        .show(ui, |ui| {
                            for (handle, body) in world.bodies.iter() {
                                let selected = camera.selected() == Some(handle);
                                if ui.selectable_label(selected, &body.name).clicked() {
                                    select = Some(handle);
                                }
                                if ui.small_button("Focus").clicked() {
                                    focus = Some(handle);
                                }
                                if ui.small_button("Surface").clicked() {
                                    surface = Some(handle);
                                }
                                ui.end_row();
                            }
                        });

                    if !world.lagrange_points.is_empty() {
                        ui.separator();
                        egui::CollapsingHeader::new("Lagrange points")
                            .default_open(false)
                            .show(ui, |ui| {
                                for point in &world.lagrange_points {
                                    ui.horizontal(|ui| {
                                        ui.label(&point.name);
                                        if ui.small_button("Focus").clicked() {
                                            lagrange = Some((
                                                point.name.clone(),
                                                point.position,
                                                point.radius,
                                            ));
                                        }
                                    });
                                }
                            });
                    }
                });
            });

        if !settings.ui.show_bodies {
            settings.ui.save();
        }

        if let Some(handle) = select {
            camera.select_body(Some(handle));
        }
        if let Some(handle) = focus {
            camera.focus_on_body(world, handle);
        }
        if let Some(handle) = surface {
            camera.enter_surface_view(world, handle, None);
        }
        if let Some((name, position, radius)) = lagrange {
            camera.focus_on_lagrange_point(world, &name, position, radius);
        }
    }

    fn show_camera_window(
        &mut self,
        ctx: &egui::Context,
        settings: &mut Settings,
        camera: &mut CameraController,
        world: &World,
    ) {
        let mut reset = false;
        let mut toggle_follow = false;
        let mut exit_surface = false;
        let mut clear_focus = false;

        egui::Window::new("🎥 Camera")
            .default_width(280.0)
            .resizable(true)
            .open(&mut settings.ui.show_camera)
            .show(ctx, |ui| {
                let target = match camera.focus() {
                    Focus::None => "free flight".to_owned(),
                    Focus::Body(handle) => world
                        .body(*handle)
                        .map(|b| b.name.clone())
                        .unwrap_or_else(|| "<gone>".to_owned()),
                    Focus::LagrangePoint(point) => point.name.clone(),
                };
                ui.label(format!("Focus: {target}"));
                ui.label(format!("Mode: {:?}", camera.follow_mode()));

                let position = camera.position();
                ui.label(format!(
                    "Position: ({:.3}, {:.3}, {:.3})",
                    position.x, position.y, position.z
                ));
                let (yaw, pitch, roll) = camera.state().get_orientation();
                ui.label(format!(
                    "Yaw {:.1}°  Pitch {:.1}°  Roll {:.1}°",
                    yaw, pitch, roll
                ));
                if let Some(view) = camera.surface_view() {
                    ui.label(format!(
                        "Lat {:.3}°  Lon {:.3}°",
                        view.latitude.to_degrees(),
                        view.longitude.to_degrees()
                    ));
                }
                let proximity = camera.proximity(world);
                if let Some(body) = proximity.nearest.and_then(|h| world.body(h)) {
                    ui.label(format!(
                        "Nearest: {} ({:.3} above surface, x{:.3})",
                        body.name, proximity.surface_distance, proximity.multiplier
                    ));
                }

                ui.separator();

                let (speed_min, speed_max) = {
                    let s = camera.settings();
                    (s.speed_min, s.speed_max)
                };
                let mut changed = false;
                ui.label("Speed:");
                changed |= ui
                    .add(
                        egui::Slider::new(
                            &mut camera.settings_mut().move_speed,
                            speed_min..=speed_max,
                        )
                        .logarithmic(true),
                    )
                    .changed();
                ui.label("Field of view:");
                changed |= ui
                    .add(
                        egui::Slider::new(&mut camera.settings_mut().fov_degrees, 10.0..=120.0)
                            .suffix("°"),
                    )
                    .changed();
                changed |= ui
                    .checkbox(
                        &mut camera.settings_mut().double_click_enters_surface,
                        "Double-click enters surface view",
                    )
                    .changed();
                if changed {
                    settings.camera = camera.settings().clone();
                    settings.camera.save();
                }

                ui.separator();

                ui.horizontal(|ui| {
                    let follow_label = match camera.follow_mode() {
                        FollowMode::Geostationary => "Follow: geostationary",
                        _ => "Follow: fixed",
                    };
                    let is_body = matches!(camera.focus(), Focus::Body(_));
                    if ui
                        .add_enabled(
                            is_body && camera.follow_mode() != FollowMode::Surface,
                            egui::Button::new(follow_label),
                        )
                        .clicked()
                    {
                        toggle_follow = true;
                    }
                    if camera.follow_mode() == FollowMode::Surface
                        && ui.button("Leave surface").clicked()
                    {
                        exit_surface = true;
                    }
                });
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(camera.is_focused(), egui::Button::new("Clear focus"))
                        .clicked()
                    {
                        clear_focus = true;
                    }
                    if ui.button("Reset Camera").clicked() {
                        reset = true;
                    }
                });
            });

        if !settings.ui.show_camera {
            settings.ui.save();
        }

        if toggle_follow {
            camera.toggle_follow_mode();
        }
        if exit_surface {
            camera.exit_surface_view(world);
        }
        if clear_focus {
            camera.clear_focus();
        }
        if reset {
            camera.reset(world);
        }
    }

    fn show_time_window(
        &mut self,
        ctx: &egui::Context,
        settings: &mut Settings,
        world: &World,
    ) -> bool {
        let mut jump_to_now = false;

        egui::Window::new("🕒 Time")
            .default_width(260.0)
            .resizable(true)
            .open(&mut settings.ui.show_time)
            .show(ctx, |ui| {
                ui.label(format!("JD {:.5}", world.julian_date));
                ui.label(format!("{:+.2} days from J2000", world.julian_date - J2000));

                let display = &mut settings.display;
                let mut changed = false;
                ui.label("Days per second (log10):");
                if ui
                    .add(egui::Slider::new(&mut self.time_scale_exponent, -3.0..=3.0))
                    .changed()
                {
                    display.time_scale = 10f64.powf(self.time_scale_exponent as f64);
                    changed = true;
                }
                ui.label(format!("x{:.3} days/s", display.time_scale));

                ui.horizontal(|ui| {
                    let label = if display.paused { "▶ Resume" } else { "⏸ Pause" };
                    if ui.button(label).clicked() {
                        display.paused = !display.paused;
                        changed = true;
                    }
                    if ui.button("Now").clicked() {
                        jump_to_now = true;
                    }
                });

                if changed {
                    display.save();
                }
            });

        if !settings.ui.show_time {
            settings.ui.save();
        }

        jump_to_now
    }

    fn show_labels(&self, ctx: &egui::Context, camera: &CameraController, world: &World) {
        let view_proj = camera.projection_matrix(world) * camera.view_matrix();
        let ppp = ctx.pixels_per_point();
        let screen = camera.screen_size();
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Background,
            egui::Id::new("body_labels"),
        ));
        let font_id = egui::FontId::proportional(13.0);

        for (_, body) in world.bodies.iter() {
            let Some((x, y)) = project_to_screen(&body.position, &view_proj, screen) else {
                continue;
            };
            let color = body.color.map(|c| (c.clamp(0.0, 1.0) * 255.0) as u8);
            painter.text(
                egui::pos2(x / ppp + 6.0, y / ppp - 6.0),
                egui::Align2::LEFT_BOTTOM,
                &body.name,
                font_id.clone(),
                egui::Color32::from_rgb(color[0], color[1], color[2]),
            );
        }
    }

    fn show_hover_tooltip(&self, ctx: &egui::Context, camera: &CameraController, world: &World) {
        if camera.context_menu().is_some() || ctx.is_pointer_over_area() {
            return;
        }
        let Some(body) = camera.hovered().and_then(|h| world.body(h)) else {
            return;
        };
        let ppp = ctx.pixels_per_point();
        let (x, y) = camera.cursor_position();

        egui::Area::new(egui::Id::new("hover_tooltip"))
            .order(egui::Order::Tooltip)
            .fixed_pos(egui::pos2(x / ppp + 16.0, y / ppp + 16.0))
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.strong(&body.name);
                    if let Some(city) = camera.hovered_city() {
                        ui.label(city);
                    }
                });
            });
    }

    fn show_context_menu(&self, ctx: &egui::Context, camera: &mut CameraController, world: &World) {
        let Some(menu) = camera.context_menu().copied() else {
            return;
        };
        let ppp = ctx.pixels_per_point();
        let target = menu.target.and_then(|h| world.body(h).map(|b| (h, b)));

        let mut close = false;
        let mut focus = None;
        let mut surface = None;
        let mut clear_focus = false;
        let mut reset = false;

        egui::Area::new(egui::Id::new("context_menu"))
            .order(egui::Order::Foreground)
            .fixed_pos(egui::pos2(menu.x / ppp, menu.y / ppp))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_min_width(140.0);
                    match target {
                        Some((handle, body)) => {
                            ui.strong(&body.name);
                            ui.separator();
                            if ui.button("Focus").clicked() {
                                focus = Some(handle);
                            }
                            if ui.button("Surface view").clicked() {
                                surface = Some(handle);
                            }
                        }
                        None => {
                            if ui
                                .add_enabled(camera.is_focused(), egui::Button::new("Clear focus"))
                                .clicked()
                            {
                                clear_focus = true;
                            }
                            if ui.button("Reset camera").clicked() {
                                reset = true;
                            }
                        }
                    }
                    ui.separator();
                    if ui.button("Close").clicked() {
                        close = true;
                    }
                });
            });

        if let Some(handle) = focus {
            camera.focus_on_body(world, handle);
            close = true;
        }
        if let Some(handle) = surface {
            camera.enter_surface_view(world, handle, None);
            close = true;
        }
        if clear_focus {
            camera.clear_focus();
            close = true;
        }
        if reset {
            camera.reset(world);
            close = true;
        }
        if close {
            camera.close_context_menu();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_labels_mark_open_windows() {
        assert_eq!(toggle_label(true, "Time"), "✅ Time");
        assert_eq!(toggle_label(false, "Time"), "⬜ Time");
    }
}
