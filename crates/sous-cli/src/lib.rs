//! # Sous CLI
//!
//! Command-line front end for the Sous cooking game.
//!
//! ## Commands
//! - `recipes` - List and filter the recipe catalog
//! - `show` - Print one recipe in full
//! - `play` - Cook a recipe with the autopilot and save the result
//! - `unlock` - Buy a locked recipe with coins
//! - `profile` - Show or reset the player profile

pub mod autopilot;

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;

use sous_core::{FrameDriver, SimConfig};
use sous_game::{GameEvent, GamePhase, Kitchen, RecipeReport};
use sous_minigames::SessionOutcome;
use sous_progression::save::{epoch_day, unix_now};
use sous_progression::{SaveData, SaveStore, achievements};
use sous_recipes::{Catalog, Cuisine, Difficulty, HealthTags, Recipe, RecipeCategory, RecipeQuery, SortKey};

pub use autopilot::{Autopilot, Skill};

/// Frames after which a headless attempt is abandoned
const MAX_FRAMES: u64 = 60 * 60 * 30;

/// Sous cooking game CLI
#[derive(Parser)]
#[command(name = "sous")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the save files
    #[arg(short, long, default_value = ".sous")]
    pub save_dir: PathBuf,

    /// Recipe catalog to use instead of the built-in one
    #[arg(short, long)]
    pub recipes: Option<PathBuf>,

    /// Simulation settings (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List recipes
    Recipes {
        /// Only this category
        #[arg(long)]
        category: Option<RecipeCategory>,

        /// Only this cuisine
        #[arg(long)]
        cuisine: Option<Cuisine>,

        /// Only this difficulty (1-5)
        #[arg(short, long)]
        difficulty: Option<u8>,

        /// Required health tags
        #[arg(short, long)]
        tag: Vec<HealthTags>,

        /// Longest total time in minutes
        #[arg(long)]
        max_time: Option<u32>,

        /// Text to look for in names, descriptions and ingredients
        #[arg(short, long)]
        search: Option<String>,

        /// Sort order (name, difficulty, time, category)
        #[arg(long, default_value = "name")]
        sort: SortKey,

        /// Only recipes the player has unlocked
        #[arg(long)]
        unlocked: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one recipe
    Show {
        /// Recipe id
        id: String,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Cook a recipe with the autopilot
    Play {
        /// Recipe id
        id: String,

        /// How well the autopilot plays
        #[arg(long, value_enum, default_value_t = Skill::Perfect)]
        skill: Skill,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Unlock a recipe with coins
    Unlock {
        /// Recipe id
        id: String,
    },

    /// Show the player profile
    Profile {
        /// Delete all save data
        #[arg(long)]
        reset: bool,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },
}

/// Everything `play` reports back
#[derive(Debug, Clone, Serialize)]
pub struct PlayReport {
    pub result: RecipeReport,
    pub mini_games: Vec<SessionOutcome>,
    pub achievements: Vec<String>,
    pub player_level: u32,
    pub coins: u64,
}

/// Execute the CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let filter = if cli.verbose { "debug" } else { "info" };
    // A logger may already be installed when called more than once in-process
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).try_init();

    let catalog = load_catalog(cli.recipes.as_deref())?;
    let store = SaveStore::new(&cli.save_dir);

    match cli.command {
        Commands::Recipes {
            category,
            cuisine,
            difficulty,
            tag,
            max_time,
            search,
            sort,
            unlocked,
            json,
        } => {
            let mut query = RecipeQuery::new();
            if let Some(category) = category {
                query = query.category(category);
            }
            if let Some(cuisine) = cuisine {
                query = query.cuisine(cuisine);
            }
            if let Some(difficulty) = difficulty {
                query = query.difficulty(Difficulty::new(difficulty)?);
            }
            let tags = tag.into_iter().fold(HealthTags::empty(), |acc, t| acc | t);
            if !tags.is_empty() {
                query = query.tag(tags);
            }
            if let Some(max) = max_time {
                query = query.total_time(0..=max);
            }
            if let Some(search) = search {
                query = query.search(search);
            }

            let save = store.load();
            let recipes: Vec<&Recipe> = list_recipes(&catalog, &query, sort)
                .into_iter()
                .filter(|r| !unlocked || save.progression.is_unlocked(&r.id))
                .collect();

            if json {
                let summaries: Vec<_> = recipes.iter().map(|r| r.summary()).collect();
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                print_recipe_table(&recipes, &save);
            }
        }

        Commands::Show { id, json } => {
            let recipe = find_recipe(&catalog, &id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(recipe)?);
            } else {
                print_recipe(recipe);
            }
        }

        Commands::Play { id, skill, json } => {
            let config = load_config(cli.config.as_deref())?;
            let mut save = store.load();
            let report = play_recipe(&catalog, &mut save, &id, skill, &config)?;
            store.save(&mut save)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_play_report(&report);
            }
        }

        Commands::Unlock { id } => {
            let mut save = store.load();
            let cost = unlock_recipe(&catalog, &mut save, &id)?;
            store.save(&mut save)?;
            println!(
                "Unlocked {} for {} coins ({} left)",
                id, cost, save.progression.coins
            );
        }

        Commands::Profile { reset, json } => {
            if reset {
                store.clear()?;
                println!("Profile reset");
                return Ok(());
            }
            let save = store.load();
            if json {
                println!("{}", save.to_json()?);
            } else {
                print_profile(&save);
            }
        }
    }

    Ok(())
}

/// The catalog at `path`, or the built-in one
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    let catalog = match path {
        Some(path) => Catalog::from_path(path)
            .with_context(|| format!("Failed to load recipes from {}", path.display()))?,
        None => Catalog::builtin()?,
    };
    log::debug!("Catalog has {} recipes", catalog.len());
    Ok(catalog)
}

/// Simulation settings from `path`, or the defaults
pub fn load_config(path: Option<&Path>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    Ok(SimConfig::from_json(&json)?)
}

fn find_recipe<'a>(catalog: &'a Catalog, id: &str) -> Result<&'a Recipe> {
    catalog
        .get(id)
        .with_context(|| format!("Unknown recipe '{id}'"))
}

/// Recipes matching `query` in `sort` order
pub fn list_recipes<'a>(catalog: &'a Catalog, query: &RecipeQuery, sort: SortKey) -> Vec<&'a Recipe> {
    let mut recipes = catalog.query(query);
    sous_recipes::catalog::sort_recipes(&mut recipes, sort);
    recipes
}

/// Buy `id` with the save's coins. Returns the price paid.
pub fn unlock_recipe(catalog: &Catalog, save: &mut SaveData, id: &str) -> Result<u64> {
    let recipe = find_recipe(catalog, id)?;
    save.progression.purchase(recipe)?;
    Ok(recipe.unlock.coin_cost)
}

/// Cook `id` headlessly and fold the result into `save`
pub fn play_recipe(
    catalog: &Catalog,
    save: &mut SaveData,
    id: &str,
    skill: Skill,
    config: &SimConfig,
) -> Result<PlayReport> {
    let recipe = find_recipe(catalog, id)?;
    if !save.progression.is_unlocked(id) {
        bail!("Recipe '{id}' is locked, unlock it first");
    }

    let now = unix_now();
    save.player.last_played = now;
    save.progression.update_streak(epoch_day(now));

    let outcomes = Rc::new(RefCell::new(Vec::new()));
    let result = {
        let mut kitchen = Kitchen::new(&mut save.progression);
        let sink = Rc::clone(&outcomes);
        kitchen.events_mut().subscribe(move |event: &GameEvent| match event {
            GameEvent::MiniGameFinished { outcome, .. } => sink.borrow_mut().push(outcome.clone()),
            GameEvent::Notice(notice) => match &notice.message {
                Some(message) => log::info!("{}: {}", notice.title, message),
                None => log::info!("{}", notice.title),
            },
            _ => {}
        });

        kitchen.go_to_recipe_select();
        kitchen.start_recipe(recipe)?;
        log::info!("Cooking {} with the {:?} autopilot", recipe.name, skill);

        let mut driver = FrameDriver::new(config.clone());
        let mut pilot = Autopilot::new(skill);
        let mut frames = 0;
        while kitchen.game().phase() != GamePhase::RecipeComplete {
            if frames >= MAX_FRAMES {
                bail!("Gave up on '{id}' after {frames} frames");
            }
            driver.advance(config.fixed_timestep, |dt| {
                pilot.drive(&mut kitchen, dt.as_secs());
                kitchen.tick(dt);
            });
            frames += 1;
        }
        kitchen
            .last_report()
            .cloned()
            .context("Recipe finished without a result")?
    };

    let mini_games = outcomes.take();
    for outcome in &mini_games {
        save.statistics.record_mini_game(outcome.score.value());
    }
    save.statistics.record_recipe(
        result.completion.percentage,
        result.completion.stars,
        result.completion.elapsed,
    );
    let unlocked = achievements::refresh(&mut save.achievements, &save.progression, &save.statistics, now);

    Ok(PlayReport {
        result,
        mini_games,
        achievements: unlocked,
        player_level: save.progression.level,
        coins: save.progression.coins,
    })
}

fn stars(count: u8) -> String {
    (0..3).map(|i| if i < count { '*' } else { '.' }).collect()
}

fn print_recipe_table(recipes: &[&Recipe], save: &SaveData) {
    println!(
        "{:<18} {:<22} {:<12} {:<10} {:>5}  {:<5} {}",
        "ID", "NAME", "CATEGORY", "CUISINE", "MIN", "BEST", "STATUS"
    );
    for recipe in recipes {
        let best = save
            .progression
            .stats(&recipe.id)
            .map_or(0, |s| s.best_stars);
        let status = if save.progression.is_unlocked(&recipe.id) {
            "unlocked".to_string()
        } else {
            format!(
                "lvl {} / {} coins",
                recipe.unlock.player_level, recipe.unlock.coin_cost
            )
        };
        println!(
            "{:<18} {:<22} {:<12} {:<10} {:>5}  {:<5} {}",
            recipe.id,
            recipe.name,
            recipe.category,
            recipe.cuisine,
            recipe.total_time(),
            stars(best),
            status
        );
    }
    println!("{} recipes", recipes.len());
}

fn print_recipe(recipe: &Recipe) {
    println!("{} ({})", recipe.name, recipe.id);
    if !recipe.description.is_empty() {
        println!("  {}", recipe.description);
    }
    println!(
        "  {} / {} / difficulty {} ({})",
        recipe.category,
        recipe.cuisine,
        recipe.difficulty,
        recipe.difficulty.tier()
    );
    println!(
        "  {} min prep, {} min cook, serves {}, about ${:.2}",
        recipe.prep_time,
        recipe.cook_time,
        recipe.servings,
        recipe.total_cost()
    );
    if !recipe.health_tags.is_empty() {
        println!("  Tags: {}", recipe.health_tags);
    }
    if !recipe.allergens.is_empty() {
        println!("  Allergens: {}", recipe.allergens);
    }
    let n = &recipe.nutrition;
    println!(
        "  {} kcal, {:.0}g protein, {:.0}g carbs, {:.0}g fat",
        n.calories, n.protein, n.carbs, n.fat
    );

    println!("Ingredients:");
    for ingredient in &recipe.ingredients {
        let optional = if ingredient.optional { " (optional)" } else { "" };
        println!(
            "  - {} {} {}{}",
            ingredient.quantity, ingredient.unit, ingredient.name, optional
        );
    }

    println!("Steps:");
    for (i, step) in recipe.steps.iter().enumerate() {
        let game = step
            .mini_game
            .map(|m| format!(" [{} d{}]", m.kind, m.difficulty))
            .unwrap_or_default();
        println!("  {}. {}{}", i + 1, step.title, game);
        println!("     {}", step.instruction);
    }

    println!(
        "Unlock: level {}, {} coins. Rewards: {} XP, {} coins",
        recipe.unlock.player_level,
        recipe.unlock.coin_cost,
        recipe.rewards.base_xp,
        recipe.rewards.base_coins
    );
}

fn print_play_report(report: &PlayReport) {
    let result = &report.result;
    println!("{} complete", result.recipe_name);
    for (i, outcome) in report.mini_games.iter().enumerate() {
        let timed_out = if outcome.timed_out { " (time up)" } else { "" };
        println!(
            "  {}. {:<13} {:>3}{}",
            i + 1,
            outcome.kind.name(),
            outcome.score,
            timed_out
        );
    }
    println!(
        "Score {} ({:.1}%) {}  in {:.1}s",
        result.completion.total_score,
        result.completion.percentage,
        stars(result.completion.stars),
        result.completion.elapsed
    );
    println!(
        "+{} XP, +{} coins{}",
        result.level.xp_awarded,
        result.reward.coins,
        if result.reward.first_completion { " (first time bonus)" } else { "" }
    );
    if result.level.leveled_up() {
        println!("Level up! Now level {}", result.level.new_level);
        for id in &result.level.unlocked_recipes {
            println!("  New recipe: {id}");
        }
    }
    for id in &report.achievements {
        println!("Achievement unlocked: {id}");
    }
    println!("Level {}, {} coins", report.player_level, report.coins);
}

fn print_profile(save: &SaveData) {
    let p = &save.progression;
    println!("{} - {} (level {})", save.player.name, p.title().name(), p.level);
    println!(
        "  XP {}/{} ({:.0}%), total {}",
        p.current_xp,
        p.xp_for_next_level(),
        p.level_progress_percent(),
        p.total_xp
    );
    println!("  Coins {}, streak {} day(s) x{:.1}", p.coins, p.streak, p.streak_multiplier());
    println!("  Unlocked: {}", p.unlocked.iter().cloned().collect::<Vec<_>>().join(", "));

    if !p.recipes.is_empty() {
        println!("Recipes:");
        for (id, stats) in &p.recipes {
            println!(
                "  {:<18} cooked {:>3}x  best {:>3}  {}",
                id,
                stats.times_cooked,
                stats.best_score,
                stars(stats.best_stars)
            );
        }
    }

    let s = &save.statistics;
    println!(
        "Statistics: {} recipes, {} mini-games, average {:.1}%, {:.0}s cooking",
        s.total_recipes_completed, s.total_mini_games_played, s.average_score, s.total_play_time
    );

    println!("Achievements:");
    for a in &save.achievements {
        let mark = if a.unlocked { 'x' } else { ' ' };
        println!("  [{}] {} - {} ({}/{})", mark, a.name, a.description, a.progress, a.target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sous_core::ProgressionSink;

    fn catalog() -> Catalog {
        Catalog::builtin().unwrap()
    }

    #[test]
    fn test_cli_parses_play() {
        let cli = Cli::try_parse_from(["sous", "--save-dir", "/tmp/x", "play", "pancakes", "--skill", "good"]).unwrap();
        assert_eq!(cli.save_dir, PathBuf::from("/tmp/x"));
        match cli.command {
            Commands::Play { id, skill, json } => {
                assert_eq!(id, "pancakes");
                assert_eq!(skill, Skill::Good);
                assert!(!json);
            }
            _ => panic!("expected play"),
        }
    }

    #[test]
    fn test_cli_parses_recipe_filters() {
        let cli = Cli::try_parse_from([
            "sous", "recipes", "--category", "breakfast", "--tag", "vegetarian", "--sort", "time",
        ])
        .unwrap();
        match cli.command {
            Commands::Recipes { category, tag, sort, .. } => {
                assert_eq!(category, Some(RecipeCategory::Breakfast));
                assert_eq!(tag, vec![HealthTags::VEGETARIAN]);
                assert_eq!(sort, SortKey::Time);
            }
            _ => panic!("expected recipes"),
        }

        assert!(Cli::try_parse_from(["sous", "recipes", "--category", "brunch"]).is_err());
    }

    #[test]
    fn test_list_recipes_sorted() {
        let catalog = catalog();
        let all = list_recipes(&catalog, &RecipeQuery::new(), SortKey::Time);
        assert_eq!(all.len(), catalog.len());
        assert!(all.windows(2).all(|w| w[0].total_time() <= w[1].total_time()));
    }

    #[test]
    fn test_play_locked_recipe_fails() {
        let mut save = SaveData::default();
        let err = play_recipe(&catalog(), &mut save, "gourmet_steak", Skill::Perfect, &SimConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("locked"));
        assert!(play_recipe(&catalog(), &mut save, "nope", Skill::Perfect, &SimConfig::default()).is_err());
    }

    #[test]
    fn test_play_updates_save() {
        let mut save = SaveData::default();
        let report = play_recipe(&catalog(), &mut save, "grilled_cheese", Skill::Perfect, &SimConfig::default()).unwrap();

        assert_eq!(report.result.completion.stars, 3);
        assert_eq!(report.mini_games.len(), 2);
        assert!(report.achievements.contains(&"first_recipe".to_string()));
        assert_eq!(save.statistics.total_recipes_completed, 1);
        assert_eq!(save.statistics.total_mini_games_played, 2);
        assert_eq!(save.progression.stats("grilled_cheese").unwrap().times_cooked, 1);
        assert!(!save.progression.is_first_completion("grilled_cheese"));
        assert_eq!(save.progression.streak, 1);
        assert_eq!(report.coins, save.progression.coins);
    }

    #[test]
    fn test_unlock_spends_coins() {
        let catalog = catalog();
        let mut save = SaveData::default();
        save.progression.level = 3;
        let before = save.progression.coins;

        let cost = unlock_recipe(&catalog, &mut save, "omelette").unwrap();
        assert_eq!(cost, 50);
        assert_eq!(save.progression.coins, before - 50);
        assert!(save.progression.is_unlocked("omelette"));
        assert!(unlock_recipe(&catalog, &mut save, "omelette").is_err());
        assert!(unlock_recipe(&catalog, &mut save, "gourmet_steak").is_err());
    }

    #[test]
    fn test_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.json");
        fs::write(&path, r#"{"fixed_timestep": 0.01, "max_frame_time": 0.05}"#).unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.fixed_timestep, 0.01);
        assert_eq!(config.time_scale, 1.0);

        fs::write(&path, r#"{"fixed_timestep": 0.0}"#).unwrap();
        assert!(load_config(Some(&path)).is_err());
        assert!(load_config(Some(&dir.path().join("missing.json"))).is_err());
    }

    #[test]
    fn test_execute_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let save_dir = dir.path().join("save");
        let run = |args: &[&str]| {
            let mut argv = vec!["sous", "--save-dir", save_dir.to_str().unwrap()];
            argv.extend_from_slice(args);
            execute(Cli::try_parse_from(argv).unwrap())
        };

        run(&["play", "pancakes", "--skill", "good"]).unwrap();
        let save = SaveStore::new(&save_dir).load();
        assert_eq!(save.statistics.total_recipes_completed, 1);

        run(&["profile", "--reset"]).unwrap();
        let save = SaveStore::new(&save_dir).load();
        assert_eq!(save.statistics.total_recipes_completed, 0);
    }
}
