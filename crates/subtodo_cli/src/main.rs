use clap::{CommandFactory, Parser};
use std::io::{self, BufRead};
use subtodo_cli::cli::{Cli, Command};
use subtodo_core::config::{Palette, load_config_or_default, palette_for_theme};
use subtodo_core::error::AppError;
use subtodo_core::model::{Filter, Task};
use subtodo_core::task_store::{TaskStore, VisibleTask};
use tabled::settings::Style;
use tabled::{Table, Tabled};

fn status_label(task: &Task) -> &'static str {
    if task.completed { "completed" } else { "active" }
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Task")]
    text: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn print_tasks_plain(rows: &[VisibleTask], filter: Filter, palette: &Palette) {
    let heading = format!("{} task(s), filter: {}", rows.len(), filter.as_str());
    println!("{}", palette.accentize(&heading));

    if rows.is_empty() {
        println!("{}", palette.mutedize("Nothing to show."));
        return;
    }

    let table_rows: Vec<TaskRow> = rows
        .iter()
        .map(|row| TaskRow {
            id: row.task.id.clone(),
            text: if row.is_subtask {
                format!("  {}", row.task.text)
            } else {
                row.task.text.clone()
            },
            status: status_label(&row.task).to_string(),
        })
        .collect();

    println!("{}", Table::new(table_rows).with(Style::sharp()));
}

fn print_tasks_json(rows: &[VisibleTask]) {
    let mut payload = Vec::with_capacity(rows.len());
    for row in rows {
        payload.push(serde_json::json!({
            "id": row.task.id,
            "text": row.task.text,
            "completed": row.task.completed,
            "parentId": row.task.parent_id,
            "subtask": row.is_subtask,
        }));
    }
    println!("{}", serde_json::Value::Array(payload));
}

fn print_task_json(task: &Task) {
    let json = serde_json::json!({
        "id": task.id,
        "text": task.text,
        "completed": task.completed,
        "parentId": task.parent_id,
    });
    println!("{}", json);
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(current.clone());
                current.clear();
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_command(store: &mut TaskStore, cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Command::Add { text, parent } => {
            let text = match text {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::invalid_input("text is required")),
            };

            let task = store.add(&text, parent.as_deref())?;
            if cli.json {
                print_task_json(&task);
            } else if task.is_subtask() {
                println!("Added subtask: {} ({})", task.text, task.id);
            } else {
                println!("Added task: {} ({})", task.text, task.id);
            }
        }
        Command::Toggle { id } => {
            store.toggle(&id)?;
            match store.get(&id) {
                Some(task) => {
                    if cli.json {
                        print_task_json(task);
                    } else {
                        println!(
                            "Toggled task: {} ({}) is now {}",
                            task.text,
                            task.id,
                            status_label(task)
                        );
                    }
                }
                None => println!("No task with id {id}; nothing to toggle."),
            }
        }
        Command::Delete { id } => {
            let deleted = store.get(&id).cloned();
            store.delete(&id)?;
            match deleted {
                Some(task) => {
                    if cli.json {
                        print_task_json(&task);
                    } else {
                        println!("Deleted task: {} ({})", task.text, task.id);
                    }
                }
                None => println!("No task with id {id}; nothing to delete."),
            }
        }
        Command::Move { id, target } => {
            store.reparent(&id, &target)?;
            match store.get(&id) {
                Some(task) => {
                    if cli.json {
                        print_task_json(task);
                    } else {
                        println!("Moved task: {} ({}) onto {}", task.text, task.id, target);
                    }
                }
                None => println!("No task with id {id}; nothing to move."),
            }
        }
        Command::Filter { value } => {
            store.set_filter(Filter::parse(&value));
            if cli.json {
                println!("{}", serde_json::json!({ "filter": store.filter().as_str() }));
            } else {
                println!("Filter set to {}", store.filter().as_str());
            }
        }
        Command::List { filter } => {
            if let Some(raw) = filter.as_deref() {
                store.set_filter(Filter::parse(raw));
            }

            let rows = store.visible_tasks();
            if cli.json {
                print_tasks_json(&rows);
            } else {
                let config = load_config_or_default();
                let palette = palette_for_theme(config.theme.as_deref());
                print_tasks_plain(&rows, store.filter(), &palette);
            }
        }
    }

    Ok(())
}

fn run_interactive() -> Result<(), AppError> {
    let mut store = TaskStore::open_default()?;
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("subtodo".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) if err.use_stderr() => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
            Err(err) => {
                let _ = err.print();
                continue;
            }
        };

        if let Err(err) = run_command(&mut store, cli) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn main() {
    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive() {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.use_stderr() => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
        Err(err) => {
            let _ = err.print();
            return;
        }
    };

    let mut store = match TaskStore::open_default() {
        Ok(store) => store,
        Err(err) => {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(&mut store, cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
