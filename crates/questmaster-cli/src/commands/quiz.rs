//! Interactive quiz: answers come from stdin while a one-second ticker
//! drives the per-question countdown. A slower ticker refreshes the
//! session so long quizzes still autosave.

use std::time::Duration;

use questmaster_core::{AppController, Config, QuizResult, TickOutcome, Ticker};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::open_session;

const HELP: &str = "answer with 1-4, n = next, p = previous, s = submit, q = quit";

pub async fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = open_session(config)?;
    app.start_quiz()?;
    println!("{HELP}");
    show_question(&app);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = Ticker::start(Duration::from_secs(1));
    let mut refresh = Ticker::start(Duration::from_secs(config.session.refresh_interval_secs.max(1)));

    loop {
        tokio::select! {
            tick = ticker.tick() => {
                if tick.is_none() {
                    break;
                }
                match app.quiz_tick()? {
                    TickOutcome::Counting { remaining_secs } => {
                        if remaining_secs == 10 || remaining_secs <= 3 {
                            println!("  {remaining_secs}s left");
                        }
                    }
                    TickOutcome::Advanced { .. } => show_question(&app),
                    TickOutcome::AutoSubmitted(result) => {
                        show_result(&result);
                        break;
                    }
                }
            }
            Some(_) = refresh.tick() => {
                app.tick();
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    // stdin closed before submitting
                    app.reset_quiz();
                    break;
                };
                match line.trim() {
                    "s" => {
                        let result = app.submit_quiz()?;
                        show_result(&result);
                        break;
                    }
                    "q" => {
                        app.reset_quiz();
                        break;
                    }
                    "n" => {
                        app.next_question()?;
                        show_question(&app);
                    }
                    "p" => {
                        app.prev_question()?;
                        show_question(&app);
                    }
                    other => match other.parse::<usize>() {
                        Ok(choice) if choice >= 1 => match app.select_answer(choice - 1) {
                            Ok(()) => println!("  selected {choice}"),
                            Err(e) => println!("  {e}"),
                        },
                        _ => println!("{HELP}"),
                    },
                }
            }
        }
    }

    ticker.stop();
    refresh.stop();
    Ok(())
}

fn show_question(app: &AppController) {
    let Some(session) = app.quiz().session() else {
        return;
    };
    let question = session.current_question();
    println!();
    println!(
        "Question {}/{} ({}s)",
        session.current_index() + 1,
        session.questions().len(),
        session.remaining_secs()
    );
    println!("{}", question.prompt);
    for (i, option) in question.options.iter().enumerate() {
        let mark = if session.selected() == Some(i) { "*" } else { " " };
        println!(" {mark}{}. {option}", i + 1);
    }
}

fn show_result(result: &QuizResult) {
    println!();
    println!(
        "{}/{} correct ({:.0}%), +{} coins",
        result.correct,
        result.total,
        result.percentage(),
        result.coins_earned
    );
    println!("{}", result.message());
}
