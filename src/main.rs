//! Terminal front end: pick a team on stdin, then battle the configured trainer.
//!
//! Usage: `exploration-battle [--json] [--config battle.ron]`

use exploration_battle::{
    player_choices, ActionId, BattleConfig, BattleController, BattleOutcome, BattlePresenter,
    CollaboratorError, MenuMode, MoveOption, NoAnimation, PanelData, SwitchOption, TeamSelection,
};
use serde_json::json;
use std::error::Error;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

/// Prints everything to stdout, either as prose or as one JSON object per line.
struct TerminalPresenter {
    json: bool,
}

impl TerminalPresenter {
    fn emit(&self, value: serde_json::Value) -> Result<(), CollaboratorError> {
        let line = serde_json::to_string(&value)
            .map_err(|e| CollaboratorError::new("terminal", e.to_string()))?;
        self.write_line(&line)
    }

    fn write_line(&self, line: &str) -> Result<(), CollaboratorError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", line)
            .and_then(|_| stdout.flush())
            .map_err(|e| CollaboratorError::new("terminal", e.to_string()))
    }
}

fn panel_line(panel: &PanelData) -> String {
    let status = if panel.status.is_empty() {
        String::new()
    } else {
        format!(" [{}]", panel.status)
    };
    format!(
        "{} Lv{}  HP {}/{}{}",
        panel.name, panel.level, panel.current_hp, panel.max_hp, status
    )
}

impl BattlePresenter for TerminalPresenter {
    fn show_message(&mut self, message: &str) -> Result<(), CollaboratorError> {
        if self.json {
            return self.emit(json!({ "type": "message", "text": message }));
        }
        self.write_line(message)
    }

    fn update_panels(&mut self, player: &PanelData, opponent: &PanelData) -> Result<(), CollaboratorError> {
        if self.json {
            return self.emit(json!({ "type": "panels", "player": player, "opponent": opponent }));
        }
        self.write_line(&format!("  Foe: {}", panel_line(opponent)))?;
        self.write_line(&format!("  You: {}", panel_line(player)))
    }

    fn show_action_menu(&mut self, actions: &[ActionId]) -> Result<(), CollaboratorError> {
        if self.json {
            return self.emit(json!({ "type": "action_menu", "actions": actions }));
        }
        let entries: Vec<String> = actions
            .iter()
            .enumerate()
            .map(|(i, a)| format!("{}) {}", i + 1, a))
            .collect();
        self.write_line(&entries.join("   "))
    }

    fn show_move_menu(&mut self, moves: &[MoveOption]) -> Result<(), CollaboratorError> {
        if self.json {
            return self.emit(json!({ "type": "move_menu", "moves": moves }));
        }
        for m in moves {
            self.write_line(&format!(
                "{}) {:<14} {:<9} PP {}/{}",
                m.index + 1,
                m.name,
                m.move_type,
                m.current_pp,
                m.max_pp
            ))?;
        }
        self.write_line("0) Back")
    }

    fn show_switch_menu(&mut self, options: &[SwitchOption]) -> Result<(), CollaboratorError> {
        if self.json {
            return self.emit(json!({ "type": "switch_menu", "options": options }));
        }
        for option in options {
            let marker = if option.is_active { " (in battle)" } else { "" };
            self.write_line(&format!("{}) {}{}", option.index + 1, panel_line(&option.panel), marker))?;
        }
        self.write_line("0) Back")
    }
}

struct Args {
    json: bool,
    config_path: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        json: false,
        config_path: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => args.json = true,
            "--config" => {
                args.config_path = Some(iter.next().ok_or("--config needs a path")?);
            }
            other => return Err(format!("unknown argument: {}", other)),
        }
    }
    Ok(args)
}

fn load_config(args: &Args) -> Result<BattleConfig, Box<dyn Error>> {
    let base = match &args.config_path {
        Some(path) => BattleConfig::load(path)?,
        None => BattleConfig::default(),
    };
    let mut config = base.with_env_overrides();
    if args.json {
        config = BattleConfig {
            turn_delay_ms: 0,
            replacement_delay_ms: 0,
            finish_delay_ms: 0,
            ..config
        };
    }
    Ok(config)
}

async fn next_line(lines: &mut Lines<BufReader<Stdin>>) -> Result<Option<String>, std::io::Error> {
    Ok(lines.next_line().await?.map(|l| l.trim().to_string()))
}

/// Interactive team picking. Accepts names or list numbers; `done` ends early.
async fn choose_team(
    presenter: &mut TerminalPresenter,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<Option<TeamSelection>, Box<dyn Error>> {
    let choices = player_choices()?;
    let mut selection = TeamSelection::new();

    presenter.show_message("Choose up to three Pokémon (name or number, 'done' to start):")?;
    for (i, template) in choices.iter().enumerate() {
        presenter.show_message(&format!(
            "{}) {} Lv{} {}",
            i + 1,
            template.name,
            template.level,
            template.types.join("/")
        ))?;
    }

    while !selection.is_complete() {
        let Some(input) = next_line(lines).await? else {
            return Ok(None);
        };
        if input.eq_ignore_ascii_case("done") {
            if selection.is_empty() {
                presenter.show_message("Pick at least one Pokémon first.")?;
                continue;
            }
            break;
        }
        let name = match input.parse::<usize>() {
            Ok(n) if (1..=choices.len()).contains(&n) => choices[n - 1].name.clone(),
            _ => input,
        };
        let result = if selection.is_selected(&name) {
            selection.deselect(&name)
        } else {
            selection.select(&name)
        };
        match result {
            Ok(()) => presenter.show_message(&selection.summary())?,
            Err(error) => presenter.show_message(&format!("{}.", error))?,
        }
    }
    Ok(Some(selection))
}

fn parse_index(input: &str) -> Option<usize> {
    input.parse::<usize>().ok().filter(|n| *n > 0).map(|n| n - 1)
}

fn parse_action(input: &str) -> Option<ActionId> {
    if let Some(index) = parse_index(input) {
        return ActionId::ALL.get(index).copied();
    }
    ActionId::ALL
        .into_iter()
        .find(|a| {
            a.label().eq_ignore_ascii_case(input)
                || (*a == ActionId::Pokemon && input.eq_ignore_ascii_case("pokemon"))
        })
}

async fn run_battle(
    controller: &mut BattleController,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<(), Box<dyn Error>> {
    while controller.state().is_some() {
        let Some(input) = next_line(lines).await? else {
            controller.abort();
            break;
        };
        let back = input == "0" || input.eq_ignore_ascii_case("back");

        let result = match controller.menu_mode() {
            Some(MenuMode::Action) => match parse_action(&input) {
                Some(action) => controller.submit_action_choice(action).await,
                None => continue,
            },
            Some(MenuMode::Moves | MenuMode::Switch) if back => {
                controller.cancel();
                Ok(())
            }
            Some(MenuMode::Moves) => match parse_index(&input) {
                Some(index) => controller.submit_move_choice(index).await,
                None => continue,
            },
            Some(MenuMode::Switch) => match parse_index(&input) {
                Some(index) => controller.submit_switch_choice(index).await,
                None => continue,
            },
            None => break,
        };

        // Rejections were already shown to the player.
        if let Err(error) = result {
            tracing::debug!(error = %error, input = %input, "input rejected");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;
    let config = load_config(&args)?;
    config.validate()?;
    let opponent = config.opponent.clone();
    tracing::debug!(?config, "configuration loaded");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut presenter = TerminalPresenter { json: args.json };

    let Some(selection) = choose_team(&mut presenter, &mut lines).await? else {
        tracing::info!("input closed before a team was chosen");
        return Ok(());
    };

    let json = args.json;
    let mut controller = BattleController::new(
        config,
        Box::new(presenter),
        Box::new(NoAnimation),
        Box::new(move |outcome: BattleOutcome| {
            if json {
                println!("{}", json!({ "type": "battle_ended", "outcome": outcome }));
            }
        }),
    );

    controller.start_battle(&selection.templates(), &opponent)?;
    run_battle(&mut controller, &mut lines).await?;

    match controller.last_outcome() {
        Some(outcome) => tracing::info!(%outcome, "battle over"),
        None => tracing::info!("battle abandoned"),
    }
    Ok(())
}
