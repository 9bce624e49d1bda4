//! Line-oriented review loop.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use wordcards::{InteractionMode, Phase, Quality, Study};

const WRAP_WIDTH: usize = 64;

// ══════════════════════════════════════════════════════════════════════════
// Rendering
// ══════════════════════════════════════════════════════════════════════════

fn print_wrapped(prefix: &str, text: &str) {
    let options = textwrap::Options::new(WRAP_WIDTH)
        .initial_indent(prefix)
        .subsequent_indent("    ");
    println!("{}", textwrap::fill(text, options));
}

fn render_front(study: &Study) {
    let session = study.session();
    let Some(item) = session.current() else {
        return;
    };

    println!();
    let mut header = format!("── Card {} of {}", session.position() + 1, session.len());
    if let Some(category) = &item.card.category {
        header.push_str(&format!(" · {}", category));
    }
    if item.progress.mastered {
        header.push_str(" · mastered");
    }
    println!("{}", header);
    print_wrapped("  Q ", &item.card.front);
}

fn render_back(study: &Study) {
    let session = study.session();
    let Some(item) = session.current() else {
        return;
    };

    match session.verdict() {
        Some(true) => println!("  ✓ Correct"),
        Some(false) => println!("  ✗ You wrote: {}", session.answer().trim()),
        None => {}
    }
    print_wrapped("  A ", &item.card.back);
    if let Some(language) = &item.card.target_language {
        println!("    ({})", language);
    }
    if let Some(example) = &item.card.example {
        print_wrapped("  e.g. ", example);
    }
}

fn grading_prompt(study: &Study) -> String {
    let choices: Vec<String> = study
        .preview()
        .map(|preview| {
            preview
                .iter()
                .map(|(quality, days)| format!("[{}] {} ({}d)", quality.key(), quality.name(), days))
                .collect()
        })
        .unwrap_or_default();
    format!("{}  [n]ext [p]rev [s]huffle [q]uit", choices.join(" "))
}

// ══════════════════════════════════════════════════════════════════════════
// Input
// ══════════════════════════════════════════════════════════════════════════

enum Action {
    Grade(Quality),
    Next,
    Previous,
    Shuffle,
    Reload,
    Quit,
}

fn parse_action(input: &str) -> Option<Action> {
    let mut chars = input.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return None;
    };
    if let Some(quality) = Quality::from_key(c) {
        return Some(Action::Grade(quality));
    }
    match c {
        'n' => Some(Action::Next),
        'p' => Some(Action::Previous),
        's' => Some(Action::Shuffle),
        'r' => Some(Action::Reload),
        'q' => Some(Action::Quit),
        _ => None,
    }
}

/// What a line typed on the front side of a card means.
#[derive(Debug, PartialEq, Eq)]
enum FrontInput<'a> {
    Reveal,
    Answer(&'a str),
    Command(&'a str),
    /// Nothing typed yet; ask again.
    Nothing,
}

fn front_input(mode: InteractionMode, input: &str) -> FrontInput<'_> {
    match mode {
        InteractionMode::Flip if input.is_empty() => FrontInput::Reveal,
        InteractionMode::Typing if input.is_empty() => FrontInput::Nothing,
        InteractionMode::Typing if !input.starts_with(':') => FrontInput::Answer(input),
        _ => FrontInput::Command(input.trim_start_matches(':')),
    }
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, text: &str) -> Result<Option<String>> {
    println!("{}", text);
    Ok(lines.next_line().await?)
}

// ══════════════════════════════════════════════════════════════════════════
// Main loop
// ══════════════════════════════════════════════════════════════════════════

/// Run an interactive review until the user quits or input ends.
pub async fn run(study: &mut Study, shuffle: bool) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut rng = rand::rng();

    let loaded = if shuffle {
        study.load_shuffled(&mut rng).await
    } else {
        study.load().await
    };
    if let Err(e) = loaded {
        eprintln!("Could not load cards: {}", e);
    }

    loop {
        if study.session().is_stale() {
            println!("(cards changed elsewhere, [r] reloads)");
        }

        let phase = study.session().phase();
        let input = match phase {
            Phase::Loading => {
                let reason = study.session().load_error().unwrap_or("not loaded");
                prompt(&mut lines, &format!("Cards unavailable: {}  [r]etry [q]uit", reason)).await?
            }
            Phase::Empty => {
                println!();
                if study.filters().only_due {
                    println!("All done! Nothing else is due today.");
                } else {
                    println!("No cards match these filters.");
                }
                prompt(&mut lines, "[r]eload [q]uit").await?
            }
            Phase::Presenting => {
                render_front(study);
                let hint = match study.mode() {
                    InteractionMode::Flip => "Enter to reveal  [n]ext [p]rev [s]huffle [q]uit",
                    InteractionMode::Typing => "Type the answer  (:n :p :s :q)",
                };
                prompt(&mut lines, hint).await?
            }
            Phase::Revealed | Phase::Grading => {
                render_back(study);
                prompt(&mut lines, &grading_prompt(study)).await?
            }
        };

        let Some(input) = input else {
            return Ok(());
        };
        let input = input.trim();

        // Answers and reveals only make sense on the front side.
        let command = if phase == Phase::Presenting {
            match front_input(study.mode(), input) {
                FrontInput::Reveal => {
                    study.reveal()?;
                    continue;
                }
                FrontInput::Answer(answer) => {
                    study.set_answer(answer)?;
                    study.check()?;
                    continue;
                }
                FrontInput::Nothing => continue,
                FrontInput::Command(command) => command,
            }
        } else {
            input.trim_start_matches(':')
        };

        let Some(action) = parse_action(command) else {
            println!("?");
            continue;
        };

        let outcome = match action {
            Action::Quit => return Ok(()),
            Action::Grade(quality) => study.grade(quality).await,
            Action::Next => study.next(),
            Action::Previous => study.previous(),
            Action::Shuffle => study.shuffle(&mut rng),
            Action::Reload => study.load().await,
        };
        if let Err(e) = outcome {
            println!("! {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_line_reveals_a_flip_card() {
        assert_eq!(front_input(InteractionMode::Flip, ""), FrontInput::Reveal);
        assert_eq!(front_input(InteractionMode::Flip, "n"), FrontInput::Command("n"));
    }

    #[test]
    fn empty_typed_answer_asks_again() {
        assert_eq!(front_input(InteractionMode::Typing, ""), FrontInput::Nothing);
        assert_eq!(front_input(InteractionMode::Typing, "pies"), FrontInput::Answer("pies"));
        assert_eq!(front_input(InteractionMode::Typing, ":q"), FrontInput::Command("q"));
    }

    #[test]
    fn single_key_actions() {
        assert!(matches!(parse_action("2"), Some(Action::Grade(Quality::Pass))));
        assert!(matches!(parse_action("q"), Some(Action::Quit)));
        assert!(parse_action("").is_none());
        assert!(parse_action("qq").is_none());
    }
}
