#[cfg(feature = "gui")]
use eframe::egui;

#[cfg(feature = "gui")]
use gridseq::{
    midi_note_name, pattern::PlayMode, EngineConfig, MidirHost, PlaybackEvent, Sequencer,
    StepSymbol,
};

#[cfg(feature = "gui")]
const CONFIG_FILE: &str = "gridseq.toml";

#[cfg(feature = "gui")]
fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    let config = match EngineConfig::load(CONFIG_FILE) {
        Ok(config) => config,
        Err(gridseq::EngineError::Io(_)) => EngineConfig::default(),
        Err(e) => {
            log::warn!("Ignoring {}: {}", CONFIG_FILE, e);
            EngineConfig::default()
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 560.0])
            .with_title("GRIDSEQ - Pattern Sequencer"),
        ..Default::default()
    };

    eframe::run_native(
        "GRIDSEQ",
        options,
        Box::new(|_cc| Ok(Box::new(SequencerApp::new(config)))),
    )
}

#[cfg(not(feature = "gui"))]
fn main() {
    eprintln!("This binary requires the 'gui' feature to be enabled");
    std::process::exit(1);
}

#[cfg(feature = "gui")]
struct SequencerApp {
    sequencer: Sequencer,
    host: MidirHost,

    // UI state
    connected_port: Option<String>,
    selected_group: usize,
    current_visual_step: usize,
    lit_pads: Vec<(usize, usize)>,
    log_lines: Vec<String>,
}

#[cfg(feature = "gui")]
impl SequencerApp {
    fn new(config: EngineConfig) -> Self {
        let mut host = MidirHost::new(config.client_name.clone());
        let mut sequencer = Sequencer::new(config);
        let connected_port = sequencer.connect(&mut host).ok();

        Self {
            sequencer,
            host,
            connected_port,
            selected_group: 0,
            current_visual_step: 0,
            lit_pads: Vec::new(),
            log_lines: Vec::new(),
        }
    }

    fn handle_playback_events(&mut self) {
        // Step triggers for a tick arrive just ahead of its clock event
        let mut fired = Vec::new();
        for event in self.sequencer.poll_events() {
            match event {
                PlaybackEvent::ClockTick(step) => {
                    self.current_visual_step = step;
                    self.lit_pads = std::mem::take(&mut fired);
                }
                PlaybackEvent::StepTriggered { group, pad, .. } => {
                    fired.push((group, pad));
                }
                PlaybackEvent::Log(line) => {
                    self.log_lines.push(line);
                    if self.log_lines.len() > 6 {
                        self.log_lines.remove(0);
                    }
                }
            }
        }
        // Previews fire outside the clock
        self.lit_pads.extend(fired);
    }

    fn transport_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if self.sequencer.is_running() {
                if ui.button("⏹ Stop").clicked() {
                    self.sequencer.stop();
                }
            } else if ui.button("▶ Play").clicked() {
                let _ = self.sequencer.start();
            }

            ui.add_space(20.0);

            let mut bpm = self.sequencer.transport().bpm();
            if ui.add(egui::Slider::new(&mut bpm, 20..=300).text("BPM")).changed() {
                self.sequencer.set_bpm(bpm);
            }

            let mut swing = self.sequencer.transport().swing();
            if ui
                .add(egui::Slider::new(&mut swing, 0.0..=100.0).text("Swing %"))
                .changed()
            {
                self.sequencer.set_swing(swing);
            }

            let mut bars = self.sequencer.transport().global_bars();
            if ui.add(egui::Slider::new(&mut bars, 1..=64).text("Bars")).changed() {
                self.sequencer.set_global_bars(bars);
            }

            let mut humanize = self.sequencer.transport().humanize();
            if ui.checkbox(&mut humanize, "Humanize").changed() {
                self.sequencer.set_humanize(humanize);
            }

            let mut send_transport = self.sequencer.transport().send_transport();
            if ui.checkbox(&mut send_transport, "Send transport").changed() {
                self.sequencer.set_send_transport(send_transport);
            }
        });
    }

    fn pad_grid(&mut self, ui: &mut egui::Ui) {
        let group = self.selected_group;
        let is_playing = self.sequencer.is_running();

        for pad in 0..gridseq::pattern::PADS_PER_GROUP {
            ui.horizontal(|ui| {
                let lit = self.lit_pads.contains(&(group, pad));
                let Some(state) = self.sequencer.pad_mut(group, pad) else {
                    return;
                };

                let label = match state.play_mode {
                    PlayMode::Single => midi_note_name(state.base_note()),
                    PlayMode::Chord => format!(
                        "{}{}",
                        state.chord.quality.name(),
                        state.chord.extension.name()
                    ),
                };
                let name = egui::Button::new(format!("{:>2} {}", pad + 1, label))
                    .min_size(egui::vec2(90.0, 14.0))
                    .fill(if lit {
                        egui::Color32::from_rgb(100, 200, 100)
                    } else {
                        egui::Color32::from_rgb(40, 40, 40)
                    });
                let preview = ui.add(name).clicked();
                ui.checkbox(&mut state.muted, "M");

                for step in 0..gridseq::pattern::STEPS {
                    let is_current = is_playing && self.current_visual_step == step;
                    let fill = match state.step(step) {
                        _ if is_current => egui::Color32::from_rgb(100, 200, 100),
                        StepSymbol::High => egui::Color32::from_rgb(60, 60, 220),
                        StepSymbol::Mid => egui::Color32::from_rgb(60, 60, 160),
                        StepSymbol::Low => egui::Color32::from_rgb(60, 60, 100),
                        StepSymbol::Off if step % 4 == 0 => egui::Color32::from_rgb(55, 55, 55),
                        StepSymbol::Off => egui::Color32::from_rgb(35, 35, 35),
                    };
                    let cell = egui::Button::new("")
                        .min_size(egui::vec2(12.0, 14.0))
                        .fill(fill);
                    if ui.add(cell).clicked() {
                        state.cycle_step(step);
                    }
                }

                if preview {
                    let _ = self.sequencer.preview_pad(group, pad);
                }
            });
        }
    }
}

#[cfg(feature = "gui")]
impl eframe::App for SequencerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint();

        self.sequencer.tick();
        self.handle_playback_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("GRIDSEQ - Pattern Sequencer");
            ui.add_space(10.0);

            ui.horizontal(|ui| {
                ui.label("MIDI Output:");
                match &self.connected_port {
                    Some(name) => {
                        ui.label(name.as_str());
                    }
                    None => {
                        ui.colored_label(egui::Color32::YELLOW, "⚠ No MIDI output connected");
                    }
                }
                if ui.button("Reconnect").clicked() {
                    self.connected_port = self.sequencer.connect(&mut self.host).ok();
                }
            });

            ui.add_space(10.0);
            self.transport_controls(ui);
            ui.add_space(10.0);

            ui.horizontal(|ui| {
                ui.label("Group:");
                for group in 0..gridseq::pattern::GROUP_COUNT {
                    ui.selectable_value(
                        &mut self.selected_group,
                        group,
                        format!("{} (ch {})", group + 1, group + 1),
                    );
                }
            });

            ui.add_space(5.0);
            self.pad_grid(ui);

            ui.separator();
            ui.label("Click steps to cycle Off → High → Mid → Low, click a pad name to preview it");
            for line in &self.log_lines {
                ui.label(line.as_str());
            }
        });
    }
}
