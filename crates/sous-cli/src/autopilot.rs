//! Headless player
//!
//! Drives a kitchen from each mini-game's readout so recipes can be played
//! from the command line. The skill level decides how precisely it aims.

use std::f64::consts::TAU;

use clap::ValueEnum;
use sous_core::{DVec2, ProgressionSink};
use sous_game::{GamePhase, Kitchen};
use sous_minigames::games::ChoppingParams;
use sous_minigames::scoring::plating::{Food, Garnish, PlateItem};
use sous_minigames::{Key, MiniGameInput, MiniGameKind, PlateTool, Readout};

/// Tilt below which the measuring cup has stopped pouring
const POUR_THRESHOLD: f64 = 0.3;

/// How well the autopilot plays
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Skill {
    /// Hits every mark
    #[default]
    Perfect,
    /// Close, but not exact
    Good,
    /// Rushed and careless
    Sloppy,
    /// Touches nothing and lets every timer run out
    Idle,
}

impl Skill {
    /// Chop offset from the slice mark
    fn chop_offset(&self) -> f64 {
        match self {
            Skill::Perfect => 0.0,
            Skill::Good => 0.03,
            _ => 0.08,
        }
    }

    /// Knob offset from the target level
    fn knob_offset(&self) -> f64 {
        match self {
            Skill::Perfect => 0.0,
            Skill::Good => 0.06,
            _ => 0.3,
        }
    }

    /// Where to stop pouring relative to the line
    fn pour_stop(&self) -> f64 {
        match self {
            Skill::Perfect => -0.005,
            Skill::Good => -0.04,
            _ => 0.12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pour {
    Start,
    Pouring,
    Settling,
}

/// Scripted player
#[derive(Debug, Clone)]
pub struct Autopilot {
    skill: Skill,
    /// Step the per-game state belongs to
    step: Option<usize>,
    angle: f64,
    elapsed: f64,
    pour: Pour,
    plating: Vec<MiniGameInput>,
}

impl Autopilot {
    pub fn new(skill: Skill) -> Self {
        Self {
            skill,
            step: None,
            angle: 0.0,
            elapsed: 0.0,
            pour: Pour::Start,
            plating: Vec::new(),
        }
    }

    pub fn skill(&self) -> Skill {
        self.skill
    }

    /// Send this tick's input. Call once per simulation tick, before
    /// [`Kitchen::tick`].
    pub fn drive<P: ProgressionSink>(&mut self, kitchen: &mut Kitchen<P>, dt: f64) {
        if self.skill == Skill::Idle || kitchen.game().is_paused() {
            return;
        }
        match kitchen.game().phase() {
            GamePhase::Cooking => {
                if let Err(e) = kitchen.advance_step() {
                    log::warn!("Autopilot could not advance: {e}");
                }
            }
            GamePhase::MiniGame => {
                let (Some(kind), Some(readout)) =
                    (kitchen.game().current_mini_game(), kitchen.readout())
                else {
                    return;
                };
                let step = kitchen.game().current_step_index();
                if self.step != Some(step) {
                    self.begin(step, kind);
                }
                self.elapsed += dt;
                for input in self.inputs(kind, &readout, dt) {
                    kitchen.handle_input(&input);
                }
            }
            _ => {}
        }
    }

    fn begin(&mut self, step: usize, kind: MiniGameKind) {
        log::debug!("Autopilot taking {kind} at step {}", step + 1);
        self.step = Some(step);
        self.angle = 0.0;
        self.elapsed = 0.0;
        self.pour = Pour::Start;
        self.plating = if kind == MiniGameKind::Plating {
            plating_script(self.skill)
        } else {
            Vec::new()
        };
    }

    fn inputs(&mut self, kind: MiniGameKind, readout: &Readout, dt: f64) -> Vec<MiniGameInput> {
        match kind {
            MiniGameKind::Chopping => self.chop(readout),
            MiniGameKind::Stirring => self.stir(dt),
            MiniGameKind::HeatControl => self.heat(readout),
            MiniGameKind::Measuring => self.measure(readout),
            MiniGameKind::Plating => self.plating.pop().into_iter().collect(),
        }
    }

    fn chop(&self, readout: &Readout) -> Vec<MiniGameInput> {
        let (Some(cue), Some(tool)) = (readout.cue, readout.tool) else {
            return Vec::new();
        };
        let reach = ChoppingParams::default().knife_reach;
        let aim = (cue.x + self.skill.chop_offset()).clamp(-reach, reach);
        let mut inputs = vec![MiniGameInput::pointer(aim / reach, 0.0)];
        if (tool.x - aim).abs() < 0.004 {
            inputs.push(MiniGameInput::KeyDown(Key::Space));
        }
        inputs
    }

    fn stir(&mut self, dt: f64) -> Vec<MiniGameInput> {
        let (rate, radius) = match self.skill {
            Skill::Perfect => (TAU * 0.6, 0.7),
            Skill::Good => (TAU * 0.6, 0.7 + 0.2 * (self.elapsed * 3.0).sin()),
            // Alternates between a splashing whirl and a sensible pace
            _ if self.elapsed % 2.0 < 1.0 => (TAU * 1.6, 0.9),
            _ => (TAU * 0.5, 0.4),
        };
        self.angle += rate * dt;
        let at = DVec2::from_angle(self.angle) * radius;
        vec![MiniGameInput::pointer(at.x, at.y)]
    }

    fn heat(&self, readout: &Readout) -> Vec<MiniGameInput> {
        let Some(cue) = readout.cue else {
            return Vec::new();
        };
        let level = (cue.x + self.skill.knob_offset()).clamp(0.0, 1.0);
        vec![
            MiniGameInput::PointerDown,
            MiniGameInput::pointer(level * 2.0 - 1.0, 0.0),
        ]
    }

    fn measure(&mut self, readout: &Readout) -> Vec<MiniGameInput> {
        let (Some(cue), Some(tool)) = (readout.cue, readout.tool) else {
            return Vec::new();
        };
        let (amount, tilt) = (tool.x, tool.y);
        match self.pour {
            Pour::Start => {
                self.pour = Pour::Pouring;
                vec![MiniGameInput::PointerDown, MiniGameInput::pointer(0.0, 1.0)]
            }
            Pour::Pouring if amount >= cue.x + self.skill.pour_stop() => {
                self.pour = Pour::Settling;
                vec![MiniGameInput::pointer(0.0, 0.0)]
            }
            Pour::Pouring => vec![MiniGameInput::pointer(0.0, 1.0)],
            Pour::Settling if tilt <= POUR_THRESHOLD => {
                self.pour = Pour::Start;
                vec![MiniGameInput::KeyDown(Key::Space)]
            }
            Pour::Settling => Vec::new(),
        }
    }
}

/// Plating moves in reverse order, one per tick
fn plating_script(skill: Skill) -> Vec<MiniGameInput> {
    let items: &[(PlateItem, f64, f64)] = match skill {
        Skill::Perfect => &[
            (PlateItem::Food(Food::Steak), 0.0, 0.0),
            (PlateItem::Food(Food::Potato), 0.4, 0.0),
            (PlateItem::Food(Food::Vegetable), -0.4, 0.0),
            (PlateItem::Garnish(Garnish::Lemon), 0.1, 0.1),
            (PlateItem::Garnish(Garnish::Flower), 0.0, 0.4),
            (PlateItem::Garnish(Garnish::Parsley), 0.0, -0.4),
        ],
        Skill::Good => &[
            (PlateItem::Food(Food::Chicken), 0.0, 0.0),
            (PlateItem::Food(Food::Rice), 0.5, 0.1),
            (PlateItem::Garnish(Garnish::Basil), -0.3, 0.3),
        ],
        _ => &[(PlateItem::Food(Food::Fish), 0.9, 0.9)],
    };

    let mut script = Vec::new();
    for &(item, x, y) in items {
        script.extend([
            MiniGameInput::Select(PlateTool::Item(item)),
            MiniGameInput::pointer(x, y),
            MiniGameInput::PointerDown,
            MiniGameInput::PointerUp,
        ]);
    }
    if skill == Skill::Perfect {
        script.extend([
            MiniGameInput::Select(PlateTool::Sauce),
            MiniGameInput::pointer(-0.8, -0.8),
            MiniGameInput::PointerDown,
        ]);
        script.extend((0..10).map(|i| MiniGameInput::pointer(-0.8 + 0.1 * i as f64, -0.8)));
        script.push(MiniGameInput::PointerUp);
    }
    script.push(MiniGameInput::KeyDown(Key::Enter));
    script.reverse();
    script
}

#[cfg(test)]
mod tests {
    use super::*;
    use sous_core::{DeltaTime, NullProgression};
    use sous_minigames::MiniGameConfig;
    use sous_recipes::Catalog;

    const DT: f64 = 1.0 / 60.0;

    fn play(skill: Skill, recipe_id: &str) -> Kitchen<NullProgression> {
        let recipe = Catalog::builtin().unwrap().get(recipe_id).unwrap().clone();
        let mut kitchen = Kitchen::new(NullProgression);
        kitchen.go_to_recipe_select();
        kitchen.start_recipe(&recipe).unwrap();

        let mut pilot = Autopilot::new(skill);
        for _ in 0..60 * 600 {
            if kitchen.game().phase() == GamePhase::RecipeComplete {
                break;
            }
            pilot.drive(&mut kitchen, DT);
            kitchen.tick(DeltaTime(DT));
        }
        kitchen
    }

    fn single_step(kind: MiniGameKind, skill: Skill) -> u32 {
        let mut recipe = Catalog::builtin().unwrap().get("omelette").unwrap().clone();
        recipe.steps.truncate(1);
        recipe.steps[0].mini_game = Some(MiniGameConfig::new(kind, 3));

        let mut kitchen = Kitchen::new(NullProgression);
        kitchen.go_to_recipe_select();
        kitchen.start_recipe(&recipe).unwrap();
        let mut pilot = Autopilot::new(skill);
        for _ in 0..60 * 120 {
            if kitchen.game().phase() == GamePhase::RecipeComplete {
                break;
            }
            pilot.drive(&mut kitchen, DT);
            kitchen.tick(DeltaTime(DT));
        }
        assert_eq!(kitchen.game().phase(), GamePhase::RecipeComplete);
        kitchen.game().total_score()
    }

    #[test]
    fn test_perfect_beats_sloppy_on_every_game() {
        for kind in MiniGameKind::ALL {
            let perfect = single_step(kind, Skill::Perfect);
            let sloppy = single_step(kind, Skill::Sloppy);
            assert!(perfect > sloppy, "{kind}: perfect {perfect} vs sloppy {sloppy}");
        }
    }

    #[test]
    fn test_perfect_chopping_and_plating() {
        assert_eq!(single_step(MiniGameKind::Chopping, Skill::Perfect), 100);
        assert_eq!(single_step(MiniGameKind::Plating, Skill::Perfect), 100);
    }

    #[test]
    fn test_perfect_run_earns_three_stars() {
        let kitchen = play(Skill::Perfect, "omelette");
        assert_eq!(kitchen.game().phase(), GamePhase::RecipeComplete);
        assert_eq!(kitchen.game().star_rating(), 3);
    }

    #[test]
    fn test_idle_run_still_finishes() {
        let kitchen = play(Skill::Idle, "scrambled_eggs");
        assert_eq!(kitchen.game().phase(), GamePhase::RecipeComplete);
        assert_eq!(kitchen.game().star_rating(), 1);
    }

    #[test]
    fn test_plating_script_ends_with_submit() {
        for skill in [Skill::Perfect, Skill::Good, Skill::Sloppy] {
            let script = plating_script(skill);
            assert_eq!(script.first(), Some(&MiniGameInput::KeyDown(Key::Enter)));
        }
    }
}
